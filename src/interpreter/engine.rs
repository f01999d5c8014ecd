// Execution engine for the routine interpreter

use crate::interpreter::console::Console;
use crate::interpreter::constants::{
    is_tracking_param, DEFAULT_MAX_CALL_DEPTH, DEFAULT_MAX_STEPS,
};
use crate::interpreter::errors::RuntimeError;
use crate::memory::stack::Stack;
use crate::memory::value::{JsObject, Value};
use crate::parser::ast::*;
use crate::trace::context::{
    TraceContext, NODE_CHILDREN_FIELD, NODE_ID_FIELD, NODE_RETURN_FIELD,
};
use crate::trace::node::{Trace, TraceValue};
use std::cell::RefCell;
use std::rc::Rc;

/// How (and whether) the interpreter records entry-routine invocations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TraceMode {
    /// Plain execution, nothing is recorded
    #[default]
    Off,
    /// The interpreter records each activation of the entry routine itself
    EvaluatorHooks,
    /// Instrumented text records itself through the `createNode` built-in
    SourceRewrite,
}

/// Guards against runaway recursion and non-terminating loops
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionLimits {
    /// Maximum nested routine activations
    pub max_call_depth: usize,
    /// Maximum executed statements plus loop iterations
    pub max_steps: u64,
    /// Maximum recorded trace nodes; `None` records without bound
    pub max_nodes: Option<usize>,
}

impl Default for ExecutionLimits {
    fn default() -> Self {
        ExecutionLimits {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            max_steps: DEFAULT_MAX_STEPS,
            max_nodes: None,
        }
    }
}

/// Outcome of executing a statement
#[derive(Debug, Clone)]
pub(crate) enum ControlFlow {
    Normal,
    Break(SourceLocation),
    Continue(SourceLocation),
    Return(Value),
}

/// The tree-walking interpreter for one loaded program
pub struct Interpreter {
    /// Parsed program; its top-level statements run once in [`Interpreter::load`]
    program: Program,

    /// Call stack; frame 0 holds globals
    pub(crate) stack: Stack,

    /// Mock console for console.log output
    pub(crate) console: Console,

    limits: ExecutionLimits,

    pub(crate) mode: TraceMode,

    /// Nodes recorded during the current run
    pub(crate) trace: TraceContext,

    /// The function whose activations are traced under evaluator hooks
    traced_entry: Option<Rc<FunctionDef>>,

    /// Only the entry call is recorded, not calls made while loading
    recording: bool,

    steps: u64,

    /// Current source location being executed
    pub(crate) current_location: SourceLocation,
}

impl Interpreter {
    pub fn new(program: Program, limits: ExecutionLimits, mode: TraceMode) -> Self {
        Interpreter {
            program,
            stack: Stack::new(),
            console: Console::new(),
            limits,
            mode,
            trace: TraceContext::new(),
            traced_entry: None,
            recording: false,
            steps: 0,
            current_location: SourceLocation::new(1, 1),
        }
    }

    /// Hoist top-level functions and run the top-level statements once
    pub fn load(&mut self) -> Result<(), RuntimeError> {
        let program = std::mem::take(&mut self.program);
        let result = self.execute_statements(&program.nodes);
        self.program = program;

        match result? {
            ControlFlow::Normal => Ok(()),
            ControlFlow::Return(_) => Err(RuntimeError::IllegalJump {
                keyword: "return",
                location: self.current_location,
            }),
            ControlFlow::Break(location) => Err(RuntimeError::IllegalJump {
                keyword: "break",
                location,
            }),
            ControlFlow::Continue(location) => Err(RuntimeError::IllegalJump {
                keyword: "continue",
                location,
            }),
        }
    }

    /// Evaluate invocation arguments in the global scope
    pub fn evaluate_arguments(&mut self, args: &[AstNode]) -> Result<Vec<Value>, RuntimeError> {
        self.evaluate_list(args)
    }

    /// Invoke the named routine with evaluated arguments, recording the trace
    pub fn call_entry(&mut self, name: &str, args: Vec<Value>) -> Result<Value, RuntimeError> {
        let def = match self.stack.lookup(name).map(|b| b.value.clone()) {
            Some(Value::Function(def)) => def,
            _ => {
                return Err(RuntimeError::EntryNotCallable {
                    name: name.to_string(),
                })
            }
        };

        if self.mode == TraceMode::EvaluatorHooks {
            self.traced_entry = Some(Rc::clone(&def));
        }

        tracing::debug!(entry = name, args = args.len(), mode = ?self.mode, "invoking entry routine");
        self.recording = true;
        let result = self.call_function_value(&def, args, def.location);
        self.recording = false;
        result
    }

    /// Close the run and hand out the recorded trace
    pub fn take_trace(&mut self) -> Result<Trace, RuntimeError> {
        std::mem::take(&mut self.trace).finish()
    }

    pub fn console(&self) -> &Console {
        &self.console
    }

    /// Statements and loop iterations executed so far
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Count one unit of work against the step budget
    pub(crate) fn tick(&mut self, location: SourceLocation) -> Result<(), RuntimeError> {
        self.steps += 1;
        if self.steps > self.limits.max_steps {
            return Err(RuntimeError::StepLimitExceeded {
                limit: self.limits.max_steps,
                location,
            });
        }
        Ok(())
    }

    /// Record a trace node, failing once the node budget is spent
    fn record_node(
        &mut self,
        params: Vec<(String, TraceValue)>,
        depth: usize,
        parent: Option<usize>,
        location: SourceLocation,
    ) -> Result<usize, RuntimeError> {
        if let Some(limit) = self.limits.max_nodes {
            if self.trace.len() >= limit {
                tracing::debug!(limit, "node limit reached");
                return Err(RuntimeError::NodeLimitExceeded { limit, location });
            }
        }
        Ok(self.trace.create_node(params, depth, parent))
    }

    /// Call a user-defined function
    pub(crate) fn call_function_value(
        &mut self,
        def: &Rc<FunctionDef>,
        args: Vec<Value>,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        if self.stack.depth() >= self.limits.max_call_depth {
            return Err(RuntimeError::CallDepthExceeded {
                limit: self.limits.max_call_depth,
                location,
            });
        }

        let traced = self.recording
            && self
                .traced_entry
                .as_ref()
                .is_some_and(|entry| Rc::ptr_eq(entry, def));
        let parent = if traced {
            self.stack.nearest_trace_node()
        } else {
            None
        };

        self.stack.push_frame(def.name.clone(), None);
        let result = self.run_activation(def, args, traced, parent, location);
        self.stack.pop_frame();
        result
    }

    fn run_activation(
        &mut self,
        def: &Rc<FunctionDef>,
        args: Vec<Value>,
        traced: bool,
        parent: Option<usize>,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        self.bind_parameters(def, args)?;

        if traced {
            let depth = parent
                .and_then(|p| self.trace.depth_of(p))
                .map_or(0, |d| d + 1);
            let params = def
                .params
                .iter()
                .filter(|p| !is_tracking_param(&p.name))
                .map(|p| {
                    let value = self
                        .stack
                        .lookup(&p.name)
                        .map(|b| b.value.to_trace_value())
                        .unwrap_or(TraceValue::Undefined);
                    (p.name.clone(), value)
                })
                .collect();
            let id = self.record_node(params, depth, parent, location)?;
            self.stack.current_frame_mut().trace_node = Some(id);
        }

        match self.execute_statements(&def.body)? {
            ControlFlow::Return(value) => Ok(value),
            ControlFlow::Normal => Ok(Value::Undefined),
            ControlFlow::Break(location) => Err(RuntimeError::IllegalJump {
                keyword: "break",
                location,
            }),
            ControlFlow::Continue(location) => Err(RuntimeError::IllegalJump {
                keyword: "continue",
                location,
            }),
        }
    }

    /// Bind arguments to parameters; defaults fill missing or undefined arguments
    fn bind_parameters(&mut self, def: &FunctionDef, args: Vec<Value>) -> Result<(), RuntimeError> {
        let mut args = args.into_iter();

        for param in &def.params {
            let mut value = args.next().unwrap_or_default();
            if matches!(value, Value::Undefined) {
                if let Some(default) = &param.default {
                    value = self.evaluate_expr(default)?;
                }
            }
            self.stack
                .current_frame_mut()
                .declare_function_scoped(&param.name, value);
        }

        Ok(())
    }

    /// The `createNode(params, depth)` built-in of instrumented routines.
    ///
    /// Returns the node object the instrumented body links into its parent
    /// and fills with the return value.
    pub(crate) fn create_node_object(
        &mut self,
        args: Vec<Value>,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let mut args = args.into_iter();
        let params = args.next().unwrap_or_default();
        let depth = args.next().map_or(0.0, |d| d.to_number());

        let id = if self.recording {
            let snapshot = match &params {
                Value::Object(obj) => obj
                    .borrow()
                    .entries()
                    .map(|(k, v)| (k.clone(), v.to_trace_value()))
                    .collect(),
                _ => Vec::new(),
            };
            let depth = if depth.is_finite() && depth >= 0.0 {
                depth as usize
            } else {
                0
            };
            Some(self.record_node(snapshot, depth, None, location)?)
        } else {
            None
        };

        let mut node = JsObject::new();
        node.set(
            NODE_ID_FIELD,
            id.map_or(Value::Null, |id| Value::Number(id as f64)),
        );
        node.set("params", params);
        node.set(
            crate::interpreter::constants::DEPTH_PARAM,
            Value::Number(depth),
        );
        node.set(NODE_CHILDREN_FIELD, Value::array(Vec::new()));
        node.set(NODE_RETURN_FIELD, Value::Null);

        let handle = Rc::new(RefCell::new(node));
        if let Some(id) = id {
            self.trace.attach_handle(id, Rc::clone(&handle));
        }
        Ok(Value::Object(handle))
    }

    /// Execute a statement list in the current scope, hoisting function declarations
    pub(crate) fn execute_statements(
        &mut self,
        statements: &[AstNode],
    ) -> Result<ControlFlow, RuntimeError> {
        self.hoist_functions(statements);

        for stmt in statements {
            let flow = self.execute_statement(stmt)?;
            if !matches!(flow, ControlFlow::Normal) {
                return Ok(flow);
            }
        }

        Ok(ControlFlow::Normal)
    }

    /// Execute a statement list in a fresh block scope
    pub(crate) fn execute_block(
        &mut self,
        statements: &[AstNode],
    ) -> Result<ControlFlow, RuntimeError> {
        self.stack.current_frame_mut().push_scope();
        let result = self.execute_statements(statements);
        self.stack.current_frame_mut().pop_scope();
        result
    }

    fn hoist_functions(&mut self, statements: &[AstNode]) {
        for stmt in statements {
            if let AstNode::FunctionDecl(def) = stmt {
                self.stack.current_frame_mut().declare(
                    &def.name,
                    Value::Function(Rc::clone(def)),
                    false,
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    fn load(source: &str, mode: TraceMode) -> Interpreter {
        let program = Parser::new(source).unwrap().parse_program().unwrap();
        let mut interp = Interpreter::new(program, ExecutionLimits::default(), mode);
        interp.load().unwrap();
        interp
    }

    #[test]
    fn test_call_entry_returns_value() {
        let mut interp = load(
            "function fn(n) { if (n <= 1) return 1; return n * fn(n - 1); }",
            TraceMode::Off,
        );
        let result = interp.call_entry("fn", vec![Value::Number(5.0)]).unwrap();
        assert_eq!(result.to_number(), 120.0);
        assert!(interp.take_trace().unwrap().is_empty());
    }

    #[test]
    fn test_default_parameters_see_earlier_params() {
        let mut interp = load("function fn(a, b = a * 2) { return a + b; }", TraceMode::Off);
        let result = interp.call_entry("fn", vec![Value::Number(3.0)]).unwrap();
        assert_eq!(result.to_number(), 9.0);
    }

    #[test]
    fn test_hooks_record_tree() {
        let mut interp = load(
            "function fn(n) { if (n < 2) return n; return fn(n - 1) + fn(n - 2); }",
            TraceMode::EvaluatorHooks,
        );
        interp.call_entry("fn", vec![Value::Number(3.0)]).unwrap();
        let trace = interp.take_trace().unwrap();

        assert_eq!(trace.len(), 5);
        assert_eq!(trace.nodes[0].children, vec![1, 4]);
        assert_eq!(trace.nodes[0].return_value, Some(TraceValue::Number(2.0)));
    }

    #[test]
    fn test_calls_during_load_are_not_traced() {
        let mut interp = load(
            "function fn(n) { return n <= 0 ? 0 : fn(n - 1); }\nlet warm = fn(3);",
            TraceMode::EvaluatorHooks,
        );
        interp.call_entry("fn", vec![Value::Number(1.0)]).unwrap();
        assert_eq!(interp.take_trace().unwrap().len(), 2);
    }

    #[test]
    fn test_call_depth_limit() {
        let program = Parser::new("function fn(n) { return fn(n + 1); }")
            .unwrap()
            .parse_program()
            .unwrap();
        let limits = ExecutionLimits {
            max_call_depth: 25,
            ..ExecutionLimits::default()
        };
        let mut interp = Interpreter::new(program, limits, TraceMode::Off);
        interp.load().unwrap();

        let err = interp.call_entry("fn", vec![Value::Number(0.0)]).unwrap_err();
        assert!(matches!(err, RuntimeError::CallDepthExceeded { limit: 25, .. }));
    }

    #[test]
    fn test_step_limit() {
        let program = Parser::new("function fn() { while (true) {} }")
            .unwrap()
            .parse_program()
            .unwrap();
        let limits = ExecutionLimits {
            max_steps: 1_000,
            ..ExecutionLimits::default()
        };
        let mut interp = Interpreter::new(program, limits, TraceMode::Off);
        interp.load().unwrap();

        let err = interp.call_entry("fn", vec![]).unwrap_err();
        assert!(matches!(err, RuntimeError::StepLimitExceeded { .. }));
    }

    #[test]
    fn test_entry_must_be_function() {
        let mut interp = load("let fn = 3;", TraceMode::EvaluatorHooks);
        let err = interp.call_entry("fn", vec![]).unwrap_err();
        assert!(matches!(err, RuntimeError::EntryNotCallable { .. }));
    }

    #[test]
    fn test_top_level_return_rejected() {
        let program = Parser::new("return 1;").unwrap().parse_program().unwrap();
        let mut interp = Interpreter::new(program, ExecutionLimits::default(), TraceMode::Off);
        assert!(matches!(
            interp.load(),
            Err(RuntimeError::IllegalJump { keyword: "return", .. })
        ));
    }
}
