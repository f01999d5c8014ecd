//! Statement execution implementation
//!
//! This module handles the execution of all statement types, including:
//!
//! - Variable declarations (`let`, `const`, `var`)
//! - Control flow (if/else, while, do-while, for, for-of)
//! - Returns, including return-value capture for traced activations
//! - Blocks and expression statements
//!
//! # Implementation
//!
//! All statement execution methods are implemented as `pub(crate)` methods
//! on the [`Interpreter`] struct. Each returns a [`ControlFlow`] so that
//! `break`, `continue` and `return` unwind through nested blocks without
//! interpreter-wide flags.

use crate::interpreter::engine::{ControlFlow, Interpreter};
use crate::interpreter::errors::RuntimeError;
use crate::memory::value::Value;
use crate::parser::ast::*;

/// What a loop does after one execution of its body
enum LoopStep {
    Next,
    Exit,
    Propagate(ControlFlow),
}

impl LoopStep {
    fn from_flow(flow: ControlFlow) -> Self {
        match flow {
            ControlFlow::Normal | ControlFlow::Continue(_) => LoopStep::Next,
            ControlFlow::Break(_) => LoopStep::Exit,
            ControlFlow::Return(value) => LoopStep::Propagate(ControlFlow::Return(value)),
        }
    }
}

impl Interpreter {
    /// Execute a single statement
    pub(crate) fn execute_statement(&mut self, stmt: &AstNode) -> Result<ControlFlow, RuntimeError> {
        let location = stmt.location();
        self.current_location = location;
        self.tick(location)?;

        match stmt {
            // Hoisted when the enclosing statement list was entered
            AstNode::FunctionDecl(_) => Ok(ControlFlow::Normal),

            AstNode::VarDecl {
                kind, declarations, ..
            } => {
                self.execute_var_decl(*kind, declarations)?;
                Ok(ControlFlow::Normal)
            }

            AstNode::Return { expr, .. } => self.execute_return(expr.as_deref()),

            AstNode::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                if self.evaluate_expr(condition)?.is_truthy() {
                    self.execute_block(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute_block(else_branch)
                } else {
                    Ok(ControlFlow::Normal)
                }
            }

            AstNode::While {
                condition, body, ..
            } => {
                loop {
                    self.tick(location)?;
                    if !self.evaluate_expr(condition)?.is_truthy() {
                        break;
                    }
                    match LoopStep::from_flow(self.execute_block(body)?) {
                        LoopStep::Next => {}
                        LoopStep::Exit => break,
                        LoopStep::Propagate(flow) => return Ok(flow),
                    }
                }
                Ok(ControlFlow::Normal)
            }

            AstNode::DoWhile {
                body, condition, ..
            } => {
                loop {
                    self.tick(location)?;
                    match LoopStep::from_flow(self.execute_block(body)?) {
                        LoopStep::Next => {}
                        LoopStep::Exit => break,
                        LoopStep::Propagate(flow) => return Ok(flow),
                    }
                    if !self.evaluate_expr(condition)?.is_truthy() {
                        break;
                    }
                }
                Ok(ControlFlow::Normal)
            }

            AstNode::For {
                init,
                condition,
                increment,
                body,
                ..
            } => {
                // The header gets its own scope so `let i` does not leak
                self.stack.current_frame_mut().push_scope();
                let result = self.execute_for(
                    init.as_deref(),
                    condition.as_deref(),
                    increment.as_deref(),
                    body,
                    location,
                );
                self.stack.current_frame_mut().pop_scope();
                result
            }

            AstNode::ForOf {
                kind,
                name,
                iterable,
                body,
                location,
            } => self.execute_for_of(*kind, name, iterable, body, *location),

            AstNode::Break { location } => Ok(ControlFlow::Break(*location)),
            AstNode::Continue { location } => Ok(ControlFlow::Continue(*location)),

            AstNode::Block { statements, .. } => self.execute_block(statements),

            AstNode::ExpressionStatement { expr, .. } => {
                self.evaluate_expr(expr)?;
                Ok(ControlFlow::Normal)
            }

            expr => {
                self.evaluate_expr(expr)?;
                Ok(ControlFlow::Normal)
            }
        }
    }

    pub(crate) fn execute_var_decl(
        &mut self,
        kind: DeclKind,
        declarations: &[Declarator],
    ) -> Result<(), RuntimeError> {
        for decl in declarations {
            let value = match &decl.init {
                Some(init) => Some(self.evaluate_expr(init)?),
                None => None,
            };

            let frame = self.stack.current_frame_mut();
            match kind {
                DeclKind::Var => {
                    // Redeclaring a var without an initializer keeps its value
                    if value.is_some() || frame.lookup(&decl.name).is_none() {
                        frame.declare_function_scoped(&decl.name, value.unwrap_or_default());
                    }
                }
                DeclKind::Let | DeclKind::Const => {
                    frame.declare(&decl.name, value.unwrap_or_default(), kind == DeclKind::Const);
                }
            }
        }
        Ok(())
    }

    /// Execute `return`; in a traced activation the value is captured into its node
    pub(crate) fn execute_return(
        &mut self,
        expr: Option<&AstNode>,
    ) -> Result<ControlFlow, RuntimeError> {
        let Some(expr) = expr else {
            return Ok(ControlFlow::Return(Value::Undefined));
        };

        let value = self.evaluate_expr(expr)?;

        if let Some(id) = self.stack.current_frame().trace_node {
            if !value.is_nullish() {
                self.trace.record_return(id, value.to_trace_value());
            }
        }

        Ok(ControlFlow::Return(value))
    }

    fn execute_for(
        &mut self,
        init: Option<&AstNode>,
        condition: Option<&AstNode>,
        increment: Option<&AstNode>,
        body: &[AstNode],
        location: SourceLocation,
    ) -> Result<ControlFlow, RuntimeError> {
        if let Some(init) = init {
            match init {
                AstNode::VarDecl {
                    kind, declarations, ..
                } => self.execute_var_decl(*kind, declarations)?,
                expr => {
                    self.evaluate_expr(expr)?;
                }
            }
        }

        loop {
            self.tick(location)?;

            if let Some(condition) = condition {
                if !self.evaluate_expr(condition)?.is_truthy() {
                    break;
                }
            }

            match LoopStep::from_flow(self.execute_block(body)?) {
                LoopStep::Next => {}
                LoopStep::Exit => break,
                LoopStep::Propagate(flow) => return Ok(flow),
            }

            if let Some(increment) = increment {
                self.evaluate_expr(increment)?;
            }
        }

        Ok(ControlFlow::Normal)
    }

    fn execute_for_of(
        &mut self,
        kind: DeclKind,
        name: &str,
        iterable: &AstNode,
        body: &[AstNode],
        location: SourceLocation,
    ) -> Result<ControlFlow, RuntimeError> {
        let value = self.evaluate_expr(iterable)?;
        let items = self.iterate_value(value, location)?;

        for item in items {
            self.tick(location)?;

            let frame = self.stack.current_frame_mut();
            frame.push_scope();
            match kind {
                DeclKind::Var => frame.declare_function_scoped(name, item),
                DeclKind::Let | DeclKind::Const => {
                    frame.declare(name, item, kind == DeclKind::Const)
                }
            }

            let flow = self.execute_statements(body);
            self.stack.current_frame_mut().pop_scope();

            match LoopStep::from_flow(flow?) {
                LoopStep::Next => {}
                LoopStep::Exit => break,
                LoopStep::Propagate(flow) => return Ok(flow),
            }
        }

        Ok(ControlFlow::Normal)
    }

    /// Elements visited by `for-of` and spread: array items or string characters
    pub(crate) fn iterate_value(
        &self,
        value: Value,
        location: SourceLocation,
    ) -> Result<Vec<Value>, RuntimeError> {
        match value {
            Value::Array(items) => Ok(items.borrow().clone()),
            Value::Str(s) => Ok(s
                .chars()
                .map(|c| Value::string(&c.to_string()))
                .collect()),
            other => Err(RuntimeError::type_error(
                format!("{} is not iterable", other.to_display_string()),
                location,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::interpreter::engine::{ExecutionLimits, Interpreter, TraceMode};
    use crate::parser::Parser;

    fn run(source: &str) -> f64 {
        let program = Parser::new(source).unwrap().parse_program().unwrap();
        let mut interp = Interpreter::new(program, ExecutionLimits::default(), TraceMode::Off);
        interp.load().unwrap();
        interp.call_entry("fn", vec![]).unwrap().to_number()
    }

    #[test]
    fn test_for_loop_with_break_and_continue() {
        let source = "function fn() {
            let total = 0;
            for (let i = 0; i < 10; i++) {
                if (i % 2 === 0) continue;
                if (i > 7) break;
                total += i;
            }
            return total;
        }";
        assert_eq!(run(source), 16.0);
    }

    #[test]
    fn test_while_and_do_while() {
        let source = "function fn() {
            let n = 0;
            while (n < 5) n++;
            do { n += 10; } while (n < 30);
            return n;
        }";
        assert_eq!(run(source), 35.0);
    }

    #[test]
    fn test_for_of_sum() {
        let source = "function fn() {
            let total = 0;
            for (const x of [1, 2, 3]) { total += x; }
            return total;
        }";
        assert_eq!(run(source), 6.0);
    }

    #[test]
    fn test_block_scoping() {
        let source = "function fn() {
            let x = 1;
            { let x = 2; }
            return x;
        }";
        assert_eq!(run(source), 1.0);
    }

    #[test]
    fn test_return_from_inside_loop() {
        let source = "function fn() {
            for (let i = 0; ; i++) { if (i === 4) return i; }
        }";
        assert_eq!(run(source), 4.0);
    }

    #[test]
    fn test_const_reassignment_fails() {
        let source = "function fn() { const x = 1; x = 2; return x; }";
        let program = Parser::new(source).unwrap().parse_program().unwrap();
        let mut interp = Interpreter::new(program, ExecutionLimits::default(), TraceMode::Off);
        interp.load().unwrap();
        assert!(interp.call_entry("fn", vec![]).is_err());
    }
}
