//! The engine boundary consumed by [`JscValue`](crate::JscValue).
//!
//! Everything behind this trait belongs to the wrapped engine: value
//! storage, garbage collection, coercion rules and property semantics.
//! The wrapper only sequences these calls and decides what to do when one
//! of them throws.

use std::fmt;

use thiserror::Error;

/// An exception thrown by the engine during a coercion or property access.
///
/// Carries the thrown native value, the same way the C API hands back an
/// exception `JSValueRef` through its out-parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("engine exception: {0:?}")]
pub struct EngineException<V: fmt::Debug>(pub V);

impl<V: fmt::Debug + Copy> EngineException<V> {
    /// The thrown native value
    pub fn value(&self) -> V {
        self.0
    }
}

/// Outcome of a fallible engine call: the result, or what the engine threw.
pub type Completion<T, V> = Result<T, EngineException<V>>;

/// Engine-level type tag of a value (mirrors `JSType`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JsType {
    Undefined,
    Null,
    Boolean,
    Number,
    String,
    Object,
    Symbol,
}

/// Operations the wrapper needs from a JavaScript engine.
///
/// `Value` is the engine's opaque reference into its managed value space
/// and `Object` the reference returned by object coercion. Both are plain
/// copyable handles; keeping them alive is the caller's job via
/// [`protect`](Engine::protect) / [`unprotect`](Engine::unprotect).
pub trait Engine {
    type Value: Copy + Eq + fmt::Debug;
    type Object: Copy + fmt::Debug;

    /// Pin a value against garbage collection. Pins nest.
    fn protect(&self, value: Self::Value);

    /// Release one pin taken by [`protect`](Engine::protect).
    fn unprotect(&self, value: Self::Value);

    fn type_of(&self, value: Self::Value) -> JsType;

    fn to_boolean(&self, value: Self::Value) -> bool;

    fn to_number(&self, value: Self::Value) -> Completion<f64, Self::Value>;

    /// Copy of the value's string representation
    fn to_string_copy(&self, value: Self::Value) -> Completion<String, Self::Value>;

    fn to_object(&self, value: Self::Value) -> Completion<Self::Object, Self::Value>;

    fn object_to_value(&self, object: Self::Object) -> Self::Value;

    fn get_property(
        &self,
        object: Self::Object,
        name: &str,
    ) -> Completion<Self::Value, Self::Value>;

    fn set_property(
        &self,
        object: Self::Object,
        name: &str,
        value: Self::Value,
    ) -> Completion<(), Self::Value>;

    fn delete_property(&self, object: Self::Object, name: &str)
    -> Completion<bool, Self::Value>;

    /// Property lookup. Cannot throw.
    fn has_property(&self, object: Self::Object, name: &str) -> bool;

    fn get_property_at_index(
        &self,
        object: Self::Object,
        index: u32,
    ) -> Completion<Self::Value, Self::Value>;

    fn set_property_at_index(
        &self,
        object: Self::Object,
        index: u32,
        value: Self::Value,
    ) -> Completion<(), Self::Value>;

    // Value creation

    fn make_undefined(&self) -> Self::Value;

    fn make_null(&self) -> Self::Value;

    fn make_boolean(&self, value: bool) -> Self::Value;

    fn make_number(&self, value: f64) -> Self::Value;

    fn make_string(&self, value: &str) -> Self::Value;

    fn make_object(&self) -> Self::Object;

    fn make_array(&self, elements: &[Self::Value]) -> Completion<Self::Object, Self::Value>;

    /// Construct a `RegExp` from pattern and flags source text
    fn make_regexp(&self, pattern: &str, flags: &str) -> Completion<Self::Object, Self::Value>;
}
