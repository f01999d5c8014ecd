//! Routine interpreter
//!
//! This module provides the core execution logic:
//! - [`engine`]: Main interpreter, call activation and trace hooks
//! - [`errors`]: Runtime error types
//! - [`console`]: Captured `console.log` output
//! - [`constants`]: Reserved tracking names and execution limits
//!
//! # Execution Model
//!
//! The interpreter walks the AST directly. A program is loaded once (its
//! top-level statements run and its functions are hoisted), then the entry
//! routine is invoked with evaluated arguments.
//!
//! When tracing, every activation of the entry routine is recorded into a
//! [`TraceContext`](crate::trace::TraceContext), either by the interpreter
//! itself or by instrumented routine text calling `createNode`.
//!
//! # Built-in Functions
//!
//! `console.log`, `Math`, and the array/string methods are implemented
//! directly in the interpreter rather than as separate modules.

mod builtins;
pub mod console;
pub mod constants;
pub mod engine;
pub mod errors;
mod expressions;
mod ops;
mod statements;

pub use console::{Console, ConsoleLine};
pub use engine::{ExecutionLimits, Interpreter, TraceMode};
pub use errors::RuntimeError;
