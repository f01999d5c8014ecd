//! Expression evaluation implementation
//!
//! This module handles evaluation of all expression types:
//!
//! - Literals: numbers, strings, booleans, `null`, `undefined`
//! - Array and object literals (with spread)
//! - Short-circuit logical operators (`&&`, `||`, `??`) and the ternary
//! - Function calls, method calls and `new`
//!
//! Operators, assignment and property access live in the `ops` submodules;
//! built-in functions and methods in `builtins`.
//!
//! # Implementation
//!
//! All evaluation methods are implemented as `pub(crate)` methods on the
//! [`Interpreter`] struct.

use crate::interpreter::constants::CREATE_NODE;
use crate::interpreter::engine::{Interpreter, TraceMode};
use crate::interpreter::errors::RuntimeError;
use crate::memory::value::{JsObject, Value};
use crate::parser::ast::*;

impl Interpreter {
    /// Evaluate an expression to a value
    pub(crate) fn evaluate_expr(&mut self, expr: &AstNode) -> Result<Value, RuntimeError> {
        match expr {
            AstNode::NumberLiteral(n, _) => Ok(Value::Number(*n)),
            AstNode::StringLiteral(s, _) => Ok(Value::string(s)),
            AstNode::BoolLiteral(b, _) => Ok(Value::Bool(*b)),
            AstNode::Null { .. } => Ok(Value::Null),
            AstNode::Undefined { .. } => Ok(Value::Undefined),

            AstNode::Variable(name, location) => self.lookup_variable(name, *location),

            AstNode::ArrayLiteral { elements, .. } => Ok(Value::array(self.evaluate_list(elements)?)),

            AstNode::ObjectLiteral { properties, .. } => {
                let mut obj = JsObject::new();
                for (key, value_expr) in properties {
                    let value = self.evaluate_expr(value_expr)?;
                    obj.set(key.as_str(), value);
                }
                Ok(Value::object(obj))
            }

            AstNode::Spread { location, .. } => Err(RuntimeError::UnsupportedOperation {
                message: "spread outside of an array literal or call".to_string(),
                location: *location,
            }),

            AstNode::Assignment { lhs, rhs, location } => self.assign(lhs, rhs, *location),

            AstNode::CompoundAssignment {
                lhs,
                op,
                rhs,
                location,
            } => self.compound_assign(lhs, *op, rhs, *location),

            AstNode::BinaryOp {
                op,
                left,
                right,
                location,
            } => {
                let left_val = self.evaluate_expr(left)?;

                // Short-circuit operators
                match op {
                    BinOp::And if !left_val.is_truthy() => return Ok(left_val),
                    BinOp::Or if left_val.is_truthy() => return Ok(left_val),
                    BinOp::Nullish if !left_val.is_nullish() => return Ok(left_val),
                    BinOp::And | BinOp::Or | BinOp::Nullish => return self.evaluate_expr(right),
                    _ => {}
                }

                let right_val = self.evaluate_expr(right)?;
                self.binary_op(*op, &left_val, &right_val, *location)
            }

            AstNode::UnaryOp {
                op,
                operand,
                location,
            } => self.unary_op(*op, operand, *location),

            AstNode::TernaryOp {
                condition,
                true_expr,
                false_expr,
                ..
            } => {
                if self.evaluate_expr(condition)?.is_truthy() {
                    self.evaluate_expr(true_expr)
                } else {
                    self.evaluate_expr(false_expr)
                }
            }

            AstNode::FunctionCall {
                name,
                args,
                location,
            } => self.call_named(name, args, *location),

            AstNode::MethodCall {
                object,
                method,
                args,
                location,
            } => self.call_method(object, method, args, *location),

            AstNode::New {
                constructor,
                args,
                location,
            } => {
                let args = self.evaluate_list(args)?;
                self.construct(constructor, args, *location)
            }

            AstNode::MemberAccess {
                object,
                member,
                location,
            } => self.member_access(object, member, *location),

            AstNode::IndexAccess {
                object,
                index,
                location,
            } => self.index_access(object, index, *location),

            other => Err(RuntimeError::UnsupportedOperation {
                message: "statement used as an expression".to_string(),
                location: other.location(),
            }),
        }
    }

    /// Resolve a variable, falling back to global constants such as `Infinity`
    pub(crate) fn lookup_variable(
        &self,
        name: &str,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        if let Some(binding) = self.stack.lookup(name) {
            return Ok(binding.value.clone());
        }

        Self::builtin_constant(name).ok_or_else(|| RuntimeError::UndefinedVariable {
            name: name.to_string(),
            location,
        })
    }

    /// Evaluate call arguments or array elements, expanding spreads
    pub(crate) fn evaluate_list(&mut self, exprs: &[AstNode]) -> Result<Vec<Value>, RuntimeError> {
        let mut values = Vec::with_capacity(exprs.len());

        for expr in exprs {
            if let AstNode::Spread { expr, location } = expr {
                let spread = self.evaluate_expr(expr)?;
                values.extend(self.iterate_value(spread, *location)?);
            } else {
                values.push(self.evaluate_expr(expr)?);
            }
        }

        Ok(values)
    }

    /// Call a function by name: user functions first, then built-ins
    fn call_named(
        &mut self,
        name: &str,
        args: &[AstNode],
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let callee = self.stack.lookup(name).map(|binding| binding.value.clone());

        match callee {
            Some(Value::Function(def)) => {
                let args = self.evaluate_list(args)?;
                self.call_function_value(&def, args, location)
            }
            Some(_) => Err(RuntimeError::NotCallable {
                name: name.to_string(),
                location,
            }),
            None => {
                let args = self.evaluate_list(args)?;

                if name == CREATE_NODE && self.mode == TraceMode::SourceRewrite {
                    return self.create_node_object(args, location);
                }

                self.call_global_builtin(name, args, location)?
                    .ok_or_else(|| RuntimeError::UndefinedFunction {
                        name: name.to_string(),
                        location,
                    })
            }
        }
    }
}
