//! Source instrumentation of the entry routine
//!
//! Turns an uninstrumented routine into one that records its own call tree:
//!
//! ```text
//! source → signature (tracking params) → call sites (depth + parent) → body (node + returns)
//! ```
//!
//! - [`splitter`]: nesting-aware parameter/argument list splitting
//! - [`signature`]: locating the declaration, appending tracking parameters
//! - [`call_sites`]: passing trace context through recursive calls
//! - [`body`]: node creation prologue and return capture
//!
//! All of it is textual. Strings and comments are recognized (see [`scan`])
//! but the routine is otherwise not parsed, so the rewriting follows the
//! conventional surface syntax only.

pub mod body;
pub mod call_sites;
pub mod scan;
pub mod signature;
pub mod splitter;

pub use call_sites::rewrite_recursive_calls;
pub use signature::{augment_signature, locate_declaration, Declaration};
pub use splitter::split_parameters;

use crate::interpreter::constants::DEFAULT_ENTRY_NAME;
use thiserror::Error;

/// Structural problems with the routine text
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InstrumentError {
    #[error("No top-level declaration 'function {name}(...)' found")]
    RoutineNotFound { name: String },

    #[error("Malformed declaration of '{name}': {reason}")]
    MalformedDeclaration { name: String, reason: String },
}

/// Instrumented routine text plus what was learned about its signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstrumentedRoutine {
    /// The whole program with the entry routine instrumented
    pub source: String,
    /// Declared parameter names, tracking parameters excluded
    pub params: Vec<String>,
    /// Number of user parameters
    pub arity: usize,
}

#[derive(Debug, Clone)]
pub struct Instrumenter {
    entry_name: String,
}

impl Instrumenter {
    pub fn new(entry_name: impl Into<String>) -> Self {
        Instrumenter {
            entry_name: entry_name.into(),
        }
    }

    pub fn entry_name(&self) -> &str {
        &self.entry_name
    }

    pub fn instrument(&self, source: &str) -> Result<InstrumentedRoutine, InstrumentError> {
        body::inject(source, &self.entry_name)
    }
}

impl Default for Instrumenter {
    fn default() -> Self {
        Instrumenter::new(DEFAULT_ENTRY_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_entry_name() {
        let routine = Instrumenter::new("walk")
            .instrument("function walk(node) { return walk(node.next); }")
            .unwrap();
        assert!(routine
            .source
            .contains("walk(node.next, depthRecursionGraph + 1, currentNode)"));
    }

    #[test]
    fn test_error_messages() {
        let err = Instrumenter::default().instrument("let x;").unwrap_err();
        assert_eq!(
            err.to_string(),
            "No top-level declaration 'function fn(...)' found"
        );
    }
}
