//! Reference-counted handle over an engine value with automatic GC protection

use std::fmt;
use std::rc::Rc;

use tracing::trace;

use crate::context::JscContext;
use crate::counters;
use crate::engine::{Completion, Engine, JsType};
use crate::number;

/// A JavaScript value kept alive for as long as the handle exists
///
/// Construction pins the native value against the engine's garbage
/// collector and dropping the handle releases that pin. Every clone holds
/// its own pin, so the value stays protected until the last handle over it
/// is gone.
///
/// Conversions and property accessors never fail. When the engine throws,
/// the exception is reported once to the owning [`JscContext`] and the call
/// returns a fallback: NaN for numbers, an empty string, the context's
/// exception value for getters, `false` for predicates, nothing for setters.
///
/// # Thread Safety
///
/// This type is `!Send` and `!Sync`: it shares its context through an
/// `Rc`, and values are tied to the thread that owns the engine.
pub struct JscValue<E: Engine> {
    value: E::Value,
    ctx: Rc<JscContext<E>>,
}

impl<E: Engine> JscValue<E> {
    /// Wrap a native value, pinning it for the lifetime of the handle
    pub fn new(value: E::Value, ctx: &Rc<JscContext<E>>) -> Self {
        ctx.engine().protect(value);
        counters::record_construct();
        trace!(context = %ctx.config().name, value = ?value, "JscValue: new");
        Self {
            value,
            ctx: Rc::clone(ctx),
        }
    }

    /// Create a `RegExp` object from pattern and flags.
    ///
    /// A pattern or flags the engine rejects is reported like any other
    /// engine exception and yields the context's exception value.
    pub fn regexp(pattern: &str, flags: &str, ctx: &Rc<JscContext<E>>) -> Self {
        let engine = ctx.engine();
        match engine.make_regexp(pattern, flags) {
            Ok(object) => Self::new(engine.object_to_value(object), ctx),
            Err(exception) => ctx.value_from_notify_exception(exception),
        }
    }

    /// Get the raw value reference
    pub fn raw(&self) -> E::Value {
        self.value
    }

    /// Get the owning context
    pub fn context(&self) -> &Rc<JscContext<E>> {
        &self.ctx
    }

    fn engine(&self) -> &E {
        self.ctx.engine()
    }

    pub fn js_type(&self) -> JsType {
        self.engine().type_of(self.value)
    }

    pub fn is_undefined(&self) -> bool {
        self.js_type() == JsType::Undefined
    }

    pub fn is_null(&self) -> bool {
        self.js_type() == JsType::Null
    }

    pub fn is_object(&self) -> bool {
        self.js_type() == JsType::Object
    }

    /// Convert to boolean
    pub fn to_boolean(&self) -> bool {
        self.engine().to_boolean(self.value)
    }

    /// Convert to number, or NaN if the engine throws
    pub fn to_number(&self) -> f64 {
        match self.engine().to_number(self.value) {
            Ok(number) => number,
            Err(exception) => {
                self.ctx.notify_exception(exception);
                f64::NAN
            }
        }
    }

    /// ECMA-262 ToInt32 of [`to_number`](Self::to_number)
    pub fn to_int32(&self) -> i32 {
        number::to_int32(self.to_number())
    }

    /// ECMA-262 ToUint32 of [`to_number`](Self::to_number)
    pub fn to_uint32(&self) -> u32 {
        number::to_uint32(self.to_number())
    }

    /// Convert to string, or an empty string if the engine throws
    pub fn to_js_string(&self) -> String {
        match self.engine().to_string_copy(self.value) {
            Ok(string) => string,
            Err(exception) => {
                self.ctx.notify_exception(exception);
                String::new()
            }
        }
    }

    fn to_object(&self) -> Completion<E::Object, E::Value> {
        self.engine().to_object(self.value)
    }

    /// Get a property by name
    pub fn value_for_property(&self, name: &str) -> JscValue<E> {
        let object = match self.to_object() {
            Ok(object) => object,
            Err(exception) => return self.ctx.value_from_notify_exception(exception),
        };

        match self.engine().get_property(object, name) {
            Ok(value) => JscValue::new(value, &self.ctx),
            Err(exception) => self.ctx.value_from_notify_exception(exception),
        }
    }

    /// Set a property by name.
    ///
    /// `value` must belong to the same context as `self`.
    pub fn set_value_for_property(&self, value: &JscValue<E>, name: &str) {
        debug_assert!(
            Rc::ptr_eq(&self.ctx, &value.ctx),
            "value belongs to another context"
        );
        let object = match self.to_object() {
            Ok(object) => object,
            Err(exception) => {
                self.ctx.notify_exception(exception);
                return;
            }
        };

        if let Err(exception) = self.engine().set_property(object, name, value.value) {
            self.ctx.notify_exception(exception);
        }
    }

    /// Delete a property, returning the engine's verdict
    pub fn delete_property(&self, name: &str) -> bool {
        let object = match self.to_object() {
            Ok(object) => object,
            Err(exception) => {
                self.ctx.notify_exception(exception);
                return false;
            }
        };

        match self.engine().delete_property(object, name) {
            Ok(deleted) => deleted,
            Err(exception) => {
                self.ctx.notify_exception(exception);
                false
            }
        }
    }

    /// Check if a property exists
    pub fn has_property(&self, name: &str) -> bool {
        match self.to_object() {
            Ok(object) => self.engine().has_property(object, name),
            Err(exception) => {
                self.ctx.notify_exception(exception);
                false
            }
        }
    }

    /// Get array element by index
    pub fn value_at_index(&self, index: u32) -> JscValue<E> {
        let object = match self.to_object() {
            Ok(object) => object,
            Err(exception) => return self.ctx.value_from_notify_exception(exception),
        };

        match self.engine().get_property_at_index(object, index) {
            Ok(value) => JscValue::new(value, &self.ctx),
            Err(exception) => self.ctx.value_from_notify_exception(exception),
        }
    }

    /// Set array element by index. Same context rule as
    /// [`set_value_for_property`](Self::set_value_for_property).
    pub fn set_value_at_index(&self, value: &JscValue<E>, index: u32) {
        debug_assert!(
            Rc::ptr_eq(&self.ctx, &value.ctx),
            "value belongs to another context"
        );
        let object = match self.to_object() {
            Ok(object) => object,
            Err(exception) => {
                self.ctx.notify_exception(exception);
                return;
            }
        };

        if let Err(exception) = self
            .engine()
            .set_property_at_index(object, index, value.value)
        {
            self.ctx.notify_exception(exception);
        }
    }
}

impl<E: Engine> Clone for JscValue<E> {
    fn clone(&self) -> Self {
        trace!(value = ?self.value, "JscValue: clone");
        Self::new(self.value, &self.ctx)
    }

    /// Copy assignment: release the held value, then adopt and pin `source`.
    /// Assigning from a handle over the same value is a no-op.
    fn clone_from(&mut self, source: &Self) {
        if *self == *source {
            return;
        }
        trace!(from = ?self.value, to = ?source.value, "JscValue: assign");

        self.engine().unprotect(self.value);
        self.value = source.value;
        self.ctx = Rc::clone(&source.ctx);
        self.engine().protect(self.value);
    }
}

impl<E: Engine> Drop for JscValue<E> {
    fn drop(&mut self) {
        trace!(value = ?self.value, "JscValue: drop");
        self.engine().unprotect(self.value);
        counters::record_destruct();
    }
}

/// Engine identity: the same native value in the same context
impl<E: Engine> PartialEq for JscValue<E> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value && Rc::ptr_eq(&self.ctx, &other.ctx)
    }
}

impl<E: Engine> Eq for JscValue<E> {}

impl<E: Engine> fmt::Debug for JscValue<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JscValue({:?} in {})", self.value, self.ctx.config().name)
    }
}
