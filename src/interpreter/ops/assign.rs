//! Assignment and update operators
//!
//! An assignment target is first resolved to a [`Place`]: a variable, an
//! array slot, an object property, or an array's `length`. Reading and
//! writing then go through the place, so `x += 1`, `a[i]++` and
//! `memo[key] = v` share one code path. Containers are shared
//! `Rc<RefCell<..>>` handles, so writing through a place mutates the same
//! array or object every alias sees.

use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::ops::access::array_index;
use crate::memory::value::{ArrayRef, ObjectRef, Value};
use crate::parser::ast::*;

/// Largest array an element or `length` write may grow to
const MAX_ARRAY_LENGTH: usize = 1 << 24;

/// A resolved assignment target
pub(crate) enum Place {
    Variable(String),
    Element(ArrayRef, usize),
    Property(ObjectRef, String),
    Length(ArrayRef),
}

impl Interpreter {
    /// Resolve an l-value expression into a place that can be read and written
    pub(crate) fn resolve_place(&mut self, target: &AstNode) -> Result<Place, RuntimeError> {
        match target {
            AstNode::Variable(name, _) => Ok(Place::Variable(name.clone())),

            AstNode::MemberAccess {
                object,
                member,
                location,
            } => {
                let object = self.evaluate_expr(object)?;
                property_place(object, member.clone(), *location)
            }

            AstNode::IndexAccess {
                object,
                index,
                location,
            } => {
                let object = self.evaluate_expr(object)?;
                let index = self.evaluate_expr(index)?;

                if let (Value::Array(items), Value::Number(n)) = (&object, &index) {
                    if let Some(i) = array_index(*n) {
                        return Ok(Place::Element(items.clone(), i));
                    }
                }
                property_place(object, index.to_display_string(), *location)
            }

            other => Err(RuntimeError::InvalidAssignmentTarget {
                location: other.location(),
            }),
        }
    }

    pub(crate) fn read_place(
        &self,
        place: &Place,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        Ok(match place {
            Place::Variable(name) => self.lookup_variable(name, location)?,
            Place::Element(items, i) => items.borrow().get(*i).cloned().unwrap_or_default(),
            Place::Property(obj, key) => obj.borrow().get(key).cloned().unwrap_or_default(),
            Place::Length(items) => Value::Number(items.borrow().len() as f64),
        })
    }

    pub(crate) fn write_place(
        &mut self,
        place: Place,
        value: Value,
        location: SourceLocation,
    ) -> Result<(), RuntimeError> {
        match place {
            Place::Variable(name) => match self.stack.lookup_mut(&name) {
                Some(binding) if binding.is_const => {
                    return Err(RuntimeError::ConstAssignment { name, location })
                }
                Some(binding) => binding.value = value,
                // Sloppy-mode implicit global
                None => self
                    .stack
                    .global_frame_mut()
                    .declare_function_scoped(&name, value),
            },

            Place::Element(items, i) => {
                if i >= MAX_ARRAY_LENGTH {
                    return Err(RuntimeError::type_error("Invalid array length", location));
                }
                let mut items = items.borrow_mut();
                if i >= items.len() {
                    items.resize(i + 1, Value::Undefined);
                }
                items[i] = value;
            }

            Place::Property(obj, key) => obj.borrow_mut().set(key, value),

            Place::Length(items) => {
                let len = match value {
                    Value::Number(n) => array_index(n).filter(|&len| len <= MAX_ARRAY_LENGTH),
                    _ => None,
                }
                .ok_or_else(|| RuntimeError::type_error("Invalid array length", location))?;
                items.borrow_mut().resize(len, Value::Undefined);
            }
        }
        Ok(())
    }

    /// `target = rhs`; evaluates to the assigned value
    pub(crate) fn assign(
        &mut self,
        target: &AstNode,
        rhs: &AstNode,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let place = self.resolve_place(target)?;
        let value = self.evaluate_expr(rhs)?;
        self.write_place(place, value.clone(), location)?;
        Ok(value)
    }

    /// `target op= rhs`
    pub(crate) fn compound_assign(
        &mut self,
        target: &AstNode,
        op: BinOp,
        rhs: &AstNode,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let place = self.resolve_place(target)?;
        let current = self.read_place(&place, location)?;
        let rhs = self.evaluate_expr(rhs)?;
        let value = self.binary_op(op, &current, &rhs, location)?;
        self.write_place(place, value.clone(), location)?;
        Ok(value)
    }

    /// `++x`, `--x`, `x++`, `x--`
    pub(crate) fn update(
        &mut self,
        op: UnOp,
        target: &AstNode,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let place = self.resolve_place(target)?;
        let old = self.read_place(&place, location)?.to_number();
        let new = match op {
            UnOp::PreInc | UnOp::PostInc => old + 1.0,
            _ => old - 1.0,
        };
        self.write_place(place, Value::Number(new), location)?;

        Ok(match op {
            UnOp::PreInc | UnOp::PreDec => Value::Number(new),
            _ => Value::Number(old),
        })
    }
}

fn property_place(
    object: Value,
    key: String,
    location: SourceLocation,
) -> Result<Place, RuntimeError> {
    match object {
        Value::Object(obj) => Ok(Place::Property(obj, key)),
        Value::Array(items) if key == "length" => Ok(Place::Length(items)),
        Value::Array(items) => match key.parse::<f64>().ok().and_then(array_index) {
            Some(i) => Ok(Place::Element(items, i)),
            None => Err(RuntimeError::UnsupportedOperation {
                message: format!("setting non-index property '{}' on an array", key),
                location,
            }),
        },
        other => Err(RuntimeError::type_error(
            format!(
                "Cannot set properties of {} (setting '{}')",
                other.to_display_string(),
                key
            ),
            location,
        )),
    }
}

#[cfg(test)]
mod tests {
    use crate::interpreter::engine::{ExecutionLimits, Interpreter, TraceMode};
    use crate::interpreter::errors::RuntimeError;
    use crate::memory::value::Value;
    use crate::parser::Parser;

    fn call(source: &str) -> Result<Value, RuntimeError> {
        let program = Parser::new(source).unwrap().parse_program().unwrap();
        let mut interp = Interpreter::new(program, ExecutionLimits::default(), TraceMode::Off);
        interp.load()?;
        interp.call_entry("fn", vec![])
    }

    #[test]
    fn test_element_write_grows_array() {
        let v = call("function fn() { const a = []; a[2] = 5; return a.length; }").unwrap();
        assert_eq!(v.to_number(), 3.0);
    }

    #[test]
    fn test_memo_object_is_shared() {
        let source = "function fill(memo) { memo['k'] = 1; }
        function fn() { const memo = {}; fill(memo); return memo.k; }";
        assert_eq!(call(source).unwrap().to_number(), 1.0);
    }

    #[test]
    fn test_postfix_and_prefix() {
        let v = call("function fn() { let i = 1; const a = i++; const b = ++i; return a * 10 + b; }")
            .unwrap();
        assert_eq!(v.to_number(), 13.0);
    }

    #[test]
    fn test_length_truncates() {
        let v = call("function fn() { const a = [1, 2, 3]; a.length = 1; return a.length; }")
            .unwrap();
        assert_eq!(v.to_number(), 1.0);
    }

    #[test]
    fn test_undeclared_assignment_becomes_global() {
        let v = call("function fn() { total = 4; return total; }").unwrap();
        assert_eq!(v.to_number(), 4.0);
    }

    #[test]
    fn test_write_to_undefined_property_fails() {
        let err = call("function fn() { let o; o.x = 1; }").unwrap_err();
        assert!(matches!(err, RuntimeError::TypeError { .. }));
    }
}
