//! Running a routine and collecting its call tree
//!
//! [`TraceExecutor::run`] takes routine text and an optional argument list,
//! and returns the [`Trace`] of one invocation of the entry routine. Each run
//! uses a fresh interpreter and trace context; nothing carries over.
//!
//! Two strategies produce the same trace for routines that only call
//! themselves directly:
//!
//! - [`TraceStrategy::EvaluatorHooks`]: the source runs unchanged and the
//!   interpreter records entry-routine activations itself
//! - [`TraceStrategy::SourceRewrite`]: the source is instrumented first and
//!   the rewritten text records itself through `createNode`

use crate::instrument::{locate_declaration, InstrumentError, Instrumenter};
use crate::interpreter::constants::DEFAULT_ENTRY_NAME;
use crate::interpreter::engine::{ExecutionLimits, Interpreter, TraceMode};
use crate::interpreter::errors::RuntimeError;
use crate::parser::{ParseError, Parser};
use crate::trace::node::{Trace, TraceValue};
use thiserror::Error;

/// Host stack reserved for one run; deep user recursion recurses the evaluator
const RUN_STACK_SIZE: usize = 256 * 1024 * 1024;

/// How invocations of the entry routine are recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TraceStrategy {
    #[default]
    EvaluatorHooks,
    SourceRewrite,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceOptions {
    /// Name of the routine to trace
    pub entry_name: String,
    pub strategy: TraceStrategy,
    pub limits: ExecutionLimits,
}

impl Default for TraceOptions {
    fn default() -> Self {
        TraceOptions {
            entry_name: DEFAULT_ENTRY_NAME.to_string(),
            strategy: TraceStrategy::default(),
            limits: ExecutionLimits::default(),
        }
    }
}

/// Everything that can end a run without a trace
#[derive(Debug, Error)]
pub enum TraceError {
    /// The entry routine's declaration is missing or malformed
    #[error("{0}")]
    Structural(#[from] InstrumentError),

    /// The routine (or the argument list) does not parse
    #[error("Compilation error: {0}")]
    Compilation(#[from] ParseError),

    /// The routine failed while running
    #[error("Execution error: {0}")]
    Execution(#[from] RuntimeError),

    /// The run reached more calls than the caller allows; `nodes` is the
    /// count at which it stopped
    #[error("Trace too large: reached {nodes} calls, the limit is {limit}")]
    TooLarge { nodes: usize, limit: usize },
}

/// Result of one successful run
#[derive(Debug, Clone)]
pub struct TraceRun {
    pub trace: Trace,
    /// Captured `console.log` lines
    pub output: Vec<String>,
    /// The text that was executed, when the source was rewritten
    pub instrumented_source: Option<String>,
    /// Value returned by the root invocation
    pub result: TraceValue,
}

#[derive(Debug, Clone, Default)]
pub struct TraceExecutor {
    options: TraceOptions,
}

impl TraceExecutor {
    pub fn new(options: TraceOptions) -> Self {
        TraceExecutor { options }
    }

    pub fn options(&self) -> &TraceOptions {
        &self.options
    }

    /// Trace one invocation of the entry routine.
    ///
    /// `args` is the text of the top-level argument list (`"5, [1, 2]"`);
    /// `None` or blank calls the routine with no arguments so its defaults
    /// apply. Runs on a dedicated thread with a large stack.
    pub fn run(&self, source: &str, args: Option<&str>) -> Result<TraceRun, TraceError> {
        let span = tracing::info_span!(
            "trace_run",
            entry = %self.options.entry_name,
            strategy = ?self.options.strategy
        );

        std::thread::scope(|scope| {
            let worker = std::thread::Builder::new()
                .name("rectrace-run".to_string())
                .stack_size(RUN_STACK_SIZE)
                .spawn_scoped(scope, || span.in_scope(|| self.run_inline(source, args)));

            match worker {
                Ok(handle) => handle
                    .join()
                    .unwrap_or_else(|panic| std::panic::resume_unwind(panic)),
                Err(e) => {
                    tracing::warn!("could not spawn run thread ({}), running inline", e);
                    span.in_scope(|| self.run_inline(source, args))
                }
            }
        })
    }

    fn run_inline(&self, source: &str, args: Option<&str>) -> Result<TraceRun, TraceError> {
        let entry = self.options.entry_name.as_str();

        let (instrumented, arity) = match self.options.strategy {
            TraceStrategy::EvaluatorHooks => {
                locate_declaration(source, entry)?;
                (None, None)
            }
            TraceStrategy::SourceRewrite => {
                let routine = Instrumenter::new(entry).instrument(source)?;
                (Some(routine.source), Some(routine.arity))
            }
        };

        let program_text = instrumented.as_deref().unwrap_or(source);
        let program = Parser::new(program_text)?.parse_program()?;
        tracing::debug!(statements = program.nodes.len(), "program parsed");

        let arg_exprs = match args {
            Some(text) if !text.trim().is_empty() => Parser::new(text)?.parse_argument_list()?,
            _ => Vec::new(),
        };

        let mode = match self.options.strategy {
            TraceStrategy::EvaluatorHooks => TraceMode::EvaluatorHooks,
            TraceStrategy::SourceRewrite => TraceMode::SourceRewrite,
        };
        let mut interpreter = Interpreter::new(program, self.options.limits, mode);
        interpreter.load()?;

        let mut values = interpreter.evaluate_arguments(&arg_exprs)?;
        // Extra arguments would land in the tracking parameters
        if let Some(arity) = arity {
            values.truncate(arity);
        }

        let result = interpreter
            .call_entry(entry, values)
            .map_err(|e| match e {
                RuntimeError::NodeLimitExceeded { limit, .. } => {
                    tracing::warn!(limit, "run stopped at the node limit");
                    TraceError::TooLarge {
                        nodes: limit + 1,
                        limit,
                    }
                }
                e => TraceError::Execution(e),
            })?;
        let trace = interpreter.take_trace()?;

        tracing::info!(
            nodes = trace.len(),
            max_depth = trace.max_depth(),
            steps = interpreter.steps(),
            "trace complete"
        );

        Ok(TraceRun {
            trace,
            output: interpreter.console().output(),
            instrumented_source: instrumented,
            result: result.to_trace_value(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn executor(strategy: TraceStrategy) -> TraceExecutor {
        TraceExecutor::new(TraceOptions {
            strategy,
            ..TraceOptions::default()
        })
    }

    const FIB: &str = "function fn(n) {\n  if (n < 2) return n;\n  return fn(n - 1) + fn(n - 2);\n}";

    #[test]
    fn test_strategies_agree() {
        let hooks = executor(TraceStrategy::EvaluatorHooks)
            .run(FIB, Some("4"))
            .unwrap();
        let rewrite = executor(TraceStrategy::SourceRewrite)
            .run(FIB, Some("4"))
            .unwrap();

        assert_eq!(hooks.trace, rewrite.trace);
        assert_eq!(hooks.result, TraceValue::Number(3.0));
        assert!(hooks.instrumented_source.is_none());
        assert!(rewrite.instrumented_source.is_some());
    }

    #[test]
    fn test_defaults_are_the_input() {
        let run = executor(TraceStrategy::EvaluatorHooks)
            .run("function fn(n = 2) { return n <= 0 ? 0 : fn(n - 1); }", None)
            .unwrap();
        assert_eq!(run.trace.len(), 3);
        assert_eq!(run.trace.nodes[0].format_params(), "2");
    }

    #[test]
    fn test_error_kinds() {
        let exec = executor(TraceStrategy::EvaluatorHooks);
        assert!(matches!(
            exec.run("function main() {}", None),
            Err(TraceError::Structural(_))
        ));
        assert!(matches!(
            exec.run("function fn() { return 1 +; }", None),
            Err(TraceError::Compilation(_))
        ));
        assert!(matches!(
            exec.run("function fn() { return missing; }", None),
            Err(TraceError::Execution(_))
        ));
    }

    #[test]
    fn test_node_limit_stops_the_run() {
        for strategy in [TraceStrategy::EvaluatorHooks, TraceStrategy::SourceRewrite] {
            let exec = TraceExecutor::new(TraceOptions {
                strategy,
                limits: ExecutionLimits {
                    max_nodes: Some(5),
                    ..ExecutionLimits::default()
                },
                ..TraceOptions::default()
            });
            let err = exec.run(FIB, Some("4")).unwrap_err();
            assert!(matches!(err, TraceError::TooLarge { nodes: 6, limit: 5 }), "{:?}", err);

            // Nine calls fit under a limit of nine
            let exec = TraceExecutor::new(TraceOptions {
                strategy,
                limits: ExecutionLimits {
                    max_nodes: Some(9),
                    ..ExecutionLimits::default()
                },
                ..TraceOptions::default()
            });
            assert_eq!(exec.run(FIB, Some("4")).unwrap().trace.len(), 9);
        }
    }

    #[test]
    fn test_console_output_is_returned() {
        let run = executor(TraceStrategy::SourceRewrite)
            .run("function fn(n) { console.log('at', n); return n; }", Some("7"))
            .unwrap();
        assert_eq!(run.output, vec!["at 7"]);
    }
}
