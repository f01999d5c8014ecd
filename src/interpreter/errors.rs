//! Runtime error types for the routine interpreter
//!
//! This module defines [`RuntimeError`], which represents all errors that can occur
//! during program execution (as opposed to parse errors or instrumentation errors).
//!
//! All runtime errors are fatal: they halt the run and no trace is produced.

use crate::parser::ast::SourceLocation;
use thiserror::Error;

/// Runtime errors that can occur during execution
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    /// Reference to a name with no binding
    #[error("'{name}' is not defined at line {}", .location.line)]
    UndefinedVariable {
        name: String,
        location: SourceLocation,
    },

    /// Call to a name with no function binding or built-in
    #[error("Undefined function '{name}' at line {}", .location.line)]
    UndefinedFunction {
        name: String,
        location: SourceLocation,
    },

    /// Call of a value that is not a function
    #[error("'{name}' is not a function at line {}", .location.line)]
    NotCallable {
        name: String,
        location: SourceLocation,
    },

    /// Attempted to reassign a `const` binding
    #[error("Assignment to constant variable '{name}' at line {}", .location.line)]
    ConstAssignment {
        name: String,
        location: SourceLocation,
    },

    /// Operation applied to a value of the wrong kind
    #[error("Type error at line {}: {message}", .location.line)]
    TypeError {
        message: String,
        location: SourceLocation,
    },

    /// Left-hand side that cannot be assigned to
    #[error("Invalid assignment target at line {}", .location.line)]
    InvalidAssignmentTarget { location: SourceLocation },

    /// Unsupported operation or feature
    #[error("Unsupported operation: {message} at line {}", .location.line)]
    UnsupportedOperation {
        message: String,
        location: SourceLocation,
    },

    /// `break`, `continue` or `return` outside of their enclosing construct
    #[error("Illegal '{keyword}' statement at line {}", .location.line)]
    IllegalJump {
        keyword: &'static str,
        location: SourceLocation,
    },

    /// Too many nested routine activations
    #[error("Maximum call stack size exceeded ({limit} nested calls) at line {}", .location.line)]
    CallDepthExceeded {
        limit: usize,
        location: SourceLocation,
    },

    /// Step budget exhausted, usually a non-terminating loop
    #[error("Execution step limit of {limit} exceeded at line {}", .location.line)]
    StepLimitExceeded {
        limit: u64,
        location: SourceLocation,
    },

    /// The run recorded as many trace nodes as it may
    #[error("Node limit of {limit} recorded calls exceeded at line {}", .location.line)]
    NodeLimitExceeded {
        limit: usize,
        location: SourceLocation,
    },

    /// The entry routine is not bound to a function after loading
    #[error("Entry routine '{name}' is not a function")]
    EntryNotCallable { name: String },

    /// Recorded calls do not form a single tree
    #[error("Recorded calls do not form a call tree: {reason}")]
    InconsistentTrace { reason: String },
}

impl RuntimeError {
    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            RuntimeError::UndefinedVariable { location, .. }
            | RuntimeError::UndefinedFunction { location, .. }
            | RuntimeError::NotCallable { location, .. }
            | RuntimeError::ConstAssignment { location, .. }
            | RuntimeError::TypeError { location, .. }
            | RuntimeError::InvalidAssignmentTarget { location }
            | RuntimeError::UnsupportedOperation { location, .. }
            | RuntimeError::IllegalJump { location, .. }
            | RuntimeError::CallDepthExceeded { location, .. }
            | RuntimeError::StepLimitExceeded { location, .. }
            | RuntimeError::NodeLimitExceeded { location, .. } => Some(location),
            RuntimeError::EntryNotCallable { .. } | RuntimeError::InconsistentTrace { .. } => None,
        }
    }

    pub(crate) fn type_error(message: impl Into<String>, location: SourceLocation) -> Self {
        RuntimeError::TypeError {
            message: message.into(),
            location,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_line() {
        let err = RuntimeError::UndefinedVariable {
            name: "memo".to_string(),
            location: SourceLocation::new(4, 9),
        };
        assert_eq!(err.to_string(), "'memo' is not defined at line 4");
        assert_eq!(err.location(), Some(&SourceLocation::new(4, 9)));
    }

    #[test]
    fn test_errors_without_location() {
        let err = RuntimeError::EntryNotCallable {
            name: "fn".to_string(),
        };
        assert!(err.location().is_none());
    }
}
