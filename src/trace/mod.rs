//! Call-tree recording
//!
//! - [`node`]: the trace data model and its invariants
//! - [`context`]: the per-run builder the interpreter records into
//! - [`executor`]: runs a routine under one of the trace strategies

pub mod context;
pub mod executor;
pub mod node;

pub use context::TraceContext;
pub use executor::{TraceError, TraceExecutor, TraceOptions, TraceRun, TraceStrategy};
pub use node::{Trace, TraceDefect, TraceNode, TraceValue};
