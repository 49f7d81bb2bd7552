//! Shared execution context: engine binding plus the exception channel.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::config::{ContextConfig, ExceptionValue};
use crate::engine::{Engine, EngineException};
use crate::value::JscValue;

type ExceptionHandler<V> = Box<dyn FnMut(&EngineException<V>)>;

/// A JavaScript execution context
///
/// Owns the engine binding and is shared by every [`JscValue`] created
/// under it through an `Rc`, so the engine outlives all of its handles.
/// Engine exceptions raised while a handle talks to the engine are
/// reported here exactly once.
///
/// # Thread Safety
///
/// This type is `!Send` and `!Sync`. Handles hold an `Rc` to it and the
/// engine is not reentrant across threads.
pub struct JscContext<E: Engine> {
    engine: E,
    config: ContextConfig,
    exception_count: Cell<u64>,
    /// Most recent exception, pinned by the context while held
    last_exception: Cell<Option<EngineException<E::Value>>>,
    handler: RefCell<Option<ExceptionHandler<E::Value>>>,
    /// Bumped on every install or clear of the handler
    handler_generation: Cell<u64>,
}

impl<E: Engine> JscContext<E> {
    /// Create a context over an engine binding with default settings
    pub fn new(engine: E) -> Rc<Self> {
        Self::with_config(engine, ContextConfig::default())
    }

    pub fn with_config(engine: E, config: ContextConfig) -> Rc<Self> {
        Rc::new(Self {
            engine,
            config,
            exception_count: Cell::new(0),
            last_exception: Cell::new(None),
            handler: RefCell::new(None),
            handler_generation: Cell::new(0),
        })
    }

    /// Get the engine binding
    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    /// Install a callback invoked for every reported exception.
    /// Replaces any previous handler.
    pub fn set_exception_handler(&self, handler: impl FnMut(&EngineException<E::Value>) + 'static) {
        *self.handler.borrow_mut() = Some(Box::new(handler));
        self.handler_generation.set(self.handler_generation.get() + 1);
    }

    pub fn clear_exception_handler(&self) {
        self.handler.borrow_mut().take();
        self.handler_generation.set(self.handler_generation.get() + 1);
    }

    /// Report an engine exception to this context's error channel
    pub fn notify_exception(&self, exception: EngineException<E::Value>) {
        self.exception_count.set(self.exception_count.get() + 1);
        debug!(
            context = %self.config.name,
            exception = ?exception.value(),
            count = self.exception_count.get(),
            "engine exception"
        );

        if self.config.record_last_exception {
            self.engine.protect(exception.value());
            if let Some(previous) = self.last_exception.replace(Some(exception)) {
                self.engine.unprotect(previous.value());
            }
        }

        // The handler may call back into this context, so it must not stay
        // borrowed while it runs. It goes back only if it was neither
        // replaced nor cleared in the meantime.
        let generation = self.handler_generation.get();
        let handler = self.handler.borrow_mut().take();
        if let Some(mut handler) = handler {
            handler(&exception);
            if self.handler_generation.get() == generation {
                *self.handler.borrow_mut() = Some(handler);
            }
        }
    }

    /// Report an exception and return the handle getters yield in its place
    pub fn value_from_notify_exception(
        self: &Rc<Self>,
        exception: EngineException<E::Value>,
    ) -> JscValue<E> {
        self.notify_exception(exception);
        match self.config.exception_value {
            ExceptionValue::Thrown => JscValue::new(exception.value(), self),
            ExceptionValue::Undefined => self.undefined(),
        }
    }

    /// Number of exceptions reported so far
    pub fn exception_count(&self) -> u64 {
        self.exception_count.get()
    }

    /// The most recently reported exception, if recording is enabled
    pub fn last_exception(&self) -> Option<EngineException<E::Value>> {
        self.last_exception.get()
    }

    /// Take the most recent exception as a handle, clearing the record
    pub fn take_last_exception(self: &Rc<Self>) -> Option<JscValue<E>> {
        let exception = self.last_exception.take()?;
        let value = JscValue::new(exception.value(), self);
        self.engine.unprotect(exception.value());
        Some(value)
    }

    // Value factories

    pub fn undefined(self: &Rc<Self>) -> JscValue<E> {
        JscValue::new(self.engine.make_undefined(), self)
    }

    pub fn null(self: &Rc<Self>) -> JscValue<E> {
        JscValue::new(self.engine.make_null(), self)
    }

    pub fn boolean(self: &Rc<Self>, b: bool) -> JscValue<E> {
        JscValue::new(self.engine.make_boolean(b), self)
    }

    pub fn number(self: &Rc<Self>, n: f64) -> JscValue<E> {
        JscValue::new(self.engine.make_number(n), self)
    }

    pub fn string(self: &Rc<Self>, s: &str) -> JscValue<E> {
        JscValue::new(self.engine.make_string(s), self)
    }

    /// Create an empty plain object
    pub fn object(self: &Rc<Self>) -> JscValue<E> {
        let object = self.engine.make_object();
        JscValue::new(self.engine.object_to_value(object), self)
    }

    /// Create an array holding the given elements in order
    pub fn array(self: &Rc<Self>, elements: &[&JscValue<E>]) -> JscValue<E> {
        let raw: Vec<E::Value> = elements.iter().map(|v| v.raw()).collect();
        match self.engine.make_array(&raw) {
            Ok(array) => JscValue::new(self.engine.object_to_value(array), self),
            Err(exception) => self.value_from_notify_exception(exception),
        }
    }
}

impl<E: Engine> Drop for JscContext<E> {
    fn drop(&mut self) {
        if let Some(exception) = self.last_exception.take() {
            self.engine.unprotect(exception.value());
        }
    }
}

impl<E: Engine> fmt::Debug for JscContext<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JscContext")
            .field("name", &self.config.name)
            .field("exception_count", &self.exception_count.get())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sandbox::SandboxEngine;

    #[test]
    fn test_factories() {
        let ctx = JscContext::new(SandboxEngine::new());
        assert!(ctx.undefined().is_undefined());
        assert!(ctx.null().is_null());
        assert!(ctx.boolean(true).to_boolean());
        assert_eq!(ctx.number(42.0).to_number(), 42.0);
        assert_eq!(ctx.string("hello").to_js_string(), "hello");
        assert!(ctx.object().is_object());
    }

    #[test]
    fn test_array_factory() {
        let ctx = JscContext::new(SandboxEngine::new());
        let one = ctx.number(1.0);
        let two = ctx.string("two");
        let array = ctx.array(&[&one, &two]);
        assert_eq!(array.value_at_index(0), one);
        assert_eq!(array.value_at_index(1), two);
        assert_eq!(array.value_for_property("length").to_int32(), 2);
        assert_eq!(array.to_js_string(), "1,two");
    }

    #[test]
    fn test_notify_counts_and_records() {
        let ctx = JscContext::new(SandboxEngine::new());
        let error = ctx.engine().make_error("TypeError", "boom");

        ctx.notify_exception(EngineException(error));

        assert_eq!(ctx.exception_count(), 1);
        assert_eq!(ctx.last_exception(), Some(EngineException(error)));
        assert_eq!(ctx.engine().protect_count(error), 1);
    }

    #[test]
    fn test_take_last_exception_moves_pin_to_handle() {
        let ctx = JscContext::new(SandboxEngine::new());
        let error = ctx.engine().make_error("Error", "oops");
        ctx.notify_exception(EngineException(error));

        let taken = ctx.take_last_exception().unwrap();
        assert_eq!(taken.raw(), error);
        assert_eq!(ctx.engine().protect_count(error), 1);
        assert!(ctx.last_exception().is_none());

        drop(taken);
        assert_eq!(ctx.engine().protect_count(error), 0);
    }

    #[test]
    fn test_replaced_exception_is_unpinned() {
        let ctx = JscContext::new(SandboxEngine::new());
        let first = ctx.engine().make_error("Error", "first");
        let second = ctx.engine().make_error("Error", "second");

        ctx.notify_exception(EngineException(first));
        ctx.notify_exception(EngineException(second));

        assert_eq!(ctx.engine().protect_count(first), 0);
        assert_eq!(ctx.engine().protect_count(second), 1);
        assert_eq!(ctx.exception_count(), 2);
    }

    #[test]
    fn test_recording_disabled() {
        let config = ContextConfig::new().with_record_last_exception(false);
        let ctx = JscContext::with_config(SandboxEngine::new(), config);
        let error = ctx.engine().make_error("Error", "unrecorded");

        ctx.notify_exception(EngineException(error));

        assert_eq!(ctx.exception_count(), 1);
        assert!(ctx.last_exception().is_none());
        assert_eq!(ctx.engine().protect_count(error), 0);
    }

    #[test]
    fn test_handler_invoked_once_per_exception() {
        let ctx = JscContext::new(SandboxEngine::new());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        ctx.set_exception_handler(move |exception| sink.borrow_mut().push(exception.value()));

        let error = ctx.engine().make_error("RangeError", "out of range");
        ctx.notify_exception(EngineException(error));

        assert_eq!(*seen.borrow(), vec![error]);

        ctx.clear_exception_handler();
        ctx.notify_exception(EngineException(error));
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn test_handler_may_reenter_context() {
        let ctx = JscContext::new(SandboxEngine::new());
        let weak = Rc::downgrade(&ctx);
        let reentered = Rc::new(Cell::new(false));
        let flag = Rc::clone(&reentered);
        ctx.set_exception_handler(move |_| {
            if let Some(ctx) = weak.upgrade() {
                // Coercing a symbol throws again while the handler runs
                let symbol = ctx.engine().make_symbol("inner");
                let value = JscValue::new(symbol, &ctx);
                assert!(value.to_number().is_nan());
                flag.set(true);
            }
        });

        let error = ctx.engine().make_error("Error", "outer");
        ctx.notify_exception(EngineException(error));

        assert!(reentered.get());
        assert_eq!(ctx.exception_count(), 2);
    }

    #[test]
    fn test_handler_clearing_itself_stays_cleared() {
        let ctx = JscContext::new(SandboxEngine::new());
        let weak = Rc::downgrade(&ctx);
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        ctx.set_exception_handler(move |_| {
            counter.set(counter.get() + 1);
            if let Some(ctx) = weak.upgrade() {
                ctx.clear_exception_handler();
            }
        });

        let error = ctx.engine().make_error("Error", "once");
        ctx.notify_exception(EngineException(error));
        ctx.notify_exception(EngineException(error));

        assert_eq!(calls.get(), 1);
        assert_eq!(ctx.exception_count(), 2);
    }

    #[test]
    fn test_handler_replacing_itself_installs_replacement() {
        let ctx = JscContext::new(SandboxEngine::new());
        let weak = Rc::downgrade(&ctx);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let first = Rc::clone(&seen);
        ctx.set_exception_handler(move |_| {
            first.borrow_mut().push("first");
            if let Some(ctx) = weak.upgrade() {
                let second = Rc::clone(&first);
                ctx.set_exception_handler(move |_| second.borrow_mut().push("second"));
            }
        });

        let error = ctx.engine().make_error("Error", "swap");
        ctx.notify_exception(EngineException(error));
        ctx.notify_exception(EngineException(error));

        assert_eq!(*seen.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn test_value_from_notify_exception_sentinels() {
        let ctx = JscContext::new(SandboxEngine::new());
        let error = ctx.engine().make_error("Error", "thrown");
        let sentinel = ctx.value_from_notify_exception(EngineException(error));
        assert_eq!(sentinel.raw(), error);

        let config = ContextConfig::new().with_exception_value(ExceptionValue::Undefined);
        let ctx = JscContext::with_config(SandboxEngine::new(), config);
        let error = ctx.engine().make_error("Error", "thrown");
        let sentinel = ctx.value_from_notify_exception(EngineException(error));
        assert!(sentinel.is_undefined());
        assert_eq!(ctx.exception_count(), 1);
    }
}
