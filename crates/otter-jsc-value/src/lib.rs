//! Reference-counted value handles over a JavaScriptCore-style engine.
//!
//! A [`JscValue`] pins one engine value against garbage collection for as
//! long as the handle (or any clone of it) is alive, and offers the usual
//! conversions and property accessors on top of the raw engine calls.
//! Engine exceptions never escape a handle: they are reported to the
//! owning [`JscContext`] and the call falls back to a benign result.
//!
//! The engine itself sits behind the [`Engine`] trait. [`SandboxEngine`] is
//! an in-memory implementation used for tests and for embedding without a
//! native library.
//!
//! # Example
//!
//! ```
//! use otter_jsc_value::{JscContext, SandboxEngine};
//!
//! let ctx = JscContext::new(SandboxEngine::new());
//! let obj = ctx.object();
//! obj.set_value_for_property(&ctx.number(4294967297.0), "n");
//! assert_eq!(obj.value_for_property("n").to_int32(), 1);
//!
//! // Property access on undefined throws inside the engine; the handle
//! // reports it and hands back the context's exception value instead.
//! let missing = ctx.undefined().value_for_property("n");
//! assert_eq!(ctx.exception_count(), 1);
//! assert_eq!(missing.value_for_property("name").to_js_string(), "TypeError");
//! ```
//!
//! # Thread Safety
//!
//! [`JscContext`] and [`JscValue`] are `!Send` and `!Sync`. Engines are
//! driven from the thread that owns them.
//!
//! ```compile_fail
//! use otter_jsc_value::{JscContext, SandboxEngine};
//! use std::thread;
//!
//! let ctx = JscContext::new(SandboxEngine::new());
//! let value = ctx.number(1.0);
//! thread::spawn(move || {
//!     value.to_number(); // Error: JscValue is !Send
//! });
//! ```

mod config;
mod context;
mod counters;
mod engine;
mod error;
pub mod number;
pub mod sandbox;
mod value;

pub use config::{ContextConfig, ExceptionValue};
pub use context::JscContext;
pub use counters::{LifecycleCounters, lifecycle_counters};
pub use engine::{Completion, Engine, EngineException, JsType};
pub use error::{JscError, JscResult};
pub use sandbox::{ProtectEvent, SandboxEngine, SandboxRef};
pub use value::JscValue;
