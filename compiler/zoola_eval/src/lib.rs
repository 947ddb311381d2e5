//! Zoola Eval - tree-walking evaluator for the zoola scripting engine.
//!
//! Walks a [`zoola_ir::SyntaxTree`] and produces values, mutating a
//! parent-linked scope chain, propagating `return`/`break`/`continue` as
//! tagged results, coercing operands along the primitive promotion ladder
//! and driving script-level try/catch/finally.
//!
//! # Architecture
//!
//! - [`value`]: closed [`Value`] enum; `Void` and `Null` are distinct markers
//! - `scope`: generational arena of scope records addressed by [`ScopeId`]
//! - `call_stack`: per-context stack of activations holding scope handles
//! - `lvalue`: [`LeftValue`] over variables, array elements, fields, properties
//! - `operators`, `unary_operators`, `coercion`: operator and conversion rules
//! - `completion`: the control-signal protocol
//! - [`interpreter`]: one rule per node kind, the exception state machine
//! - [`host`]: capabilities consumed from the embedding, plus [`BasicHost`]
//!
//! # Sharing
//!
//! An [`Interpreter`] is single-threaded. Contexts built from one
//! [`SharedRuntime`] share the interner, the host, generated classes,
//! `synchronized` monitors and string-literal identity, and may run on
//! different threads.
//!
//! ```text
//! let mut interp = InterpreterBuilder::new().build();
//! let value = interp.eval(&tree)?;
//! ```

mod call_stack;
mod class_cache;
mod coercion;
mod completion;
mod config;
pub mod errors;
pub mod host;
pub mod interpreter;
mod logging;
mod lvalue;
mod monitor;
mod operators;
mod runtime;
mod scope;
mod stack;
mod unary_operators;
pub mod value;

pub use call_stack::{CallFrame, CallStack};
pub use coercion::{instance_of, is_assignable, try_convert, Conversion};
pub use completion::{Completion, ControlSignal, ExecResult, SignalKind};
pub use config::{EvalConfig, DEFAULT_MAX_CALL_DEPTH};
pub use errors::{
    BacktraceFrame, EvalBacktrace, EvalError, EvalErrorKind, EvalResult, FaultClass, HostError,
};
pub use host::{BasicHost, ClassGenerator, ClassSpec, HostResolver, IterableAdapter};
pub use interpreter::{Interpreter, InterpreterBuilder, ScopedInterpreter};
pub use logging::{init_tracing, LOG_ENV};
pub use lvalue::LeftValue;
pub use monitor::MonitorRegistry;
pub use operators::binary_values;
pub use runtime::SharedRuntime;
pub use scope::{ScopeArena, ScopeId, ScopeKind, Slot, SlotType};
pub use unary_operators::unary_value;
pub use value::{Primitive, TypeRef, Value};

#[cfg(test)]
mod tests;
