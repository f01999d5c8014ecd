use crate::interpreter::builtins::is_namespace;
use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::memory::value::Value;
use crate::parser::ast::{AstNode, SourceLocation};

/// Convert a number to an array index if it is a non-negative integer
#[inline]
pub(crate) fn array_index(n: f64) -> Option<usize> {
    if n >= 0.0 && n.fract() == 0.0 && n <= usize::MAX as f64 {
        Some(n as usize)
    } else {
        None
    }
}

impl Interpreter {
    /// `object.member`
    pub(crate) fn member_access(
        &mut self,
        object: &AstNode,
        member: &str,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        // `Math.PI` and friends, unless the program shadows the namespace
        if let AstNode::Variable(name, _) = object {
            if is_namespace(name) && self.stack.lookup(name).is_none() {
                return Self::namespace_constant(name, member).ok_or_else(|| {
                    RuntimeError::UnsupportedOperation {
                        message: format!("{}.{} is not available", name, member),
                        location,
                    }
                });
            }
        }

        let value = self.evaluate_expr(object)?;
        self.get_property(&value, member, location)
    }

    /// `object[index]`
    pub(crate) fn index_access(
        &mut self,
        object: &AstNode,
        index: &AstNode,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let value = self.evaluate_expr(object)?;
        let index = self.evaluate_expr(index)?;

        if let (Value::Array(items), Value::Number(n)) = (&value, &index) {
            return Ok(array_index(*n)
                .and_then(|i| items.borrow().get(i).cloned())
                .unwrap_or_default());
        }

        self.get_property(&value, &index.to_display_string(), location)
    }

    /// Read a property by key; missing properties are `undefined`
    pub(crate) fn get_property(
        &self,
        value: &Value,
        key: &str,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        match value {
            Value::Array(items) => {
                let items = items.borrow();
                if key == "length" {
                    return Ok(Value::Number(items.len() as f64));
                }
                Ok(key
                    .parse::<f64>()
                    .ok()
                    .and_then(array_index)
                    .and_then(|i| items.get(i).cloned())
                    .unwrap_or_default())
            }

            Value::Str(s) => {
                if key == "length" {
                    return Ok(Value::Number(s.chars().count() as f64));
                }
                Ok(key
                    .parse::<f64>()
                    .ok()
                    .and_then(array_index)
                    .and_then(|i| s.chars().nth(i))
                    .map(|c| Value::string(&c.to_string()))
                    .unwrap_or_default())
            }

            Value::Object(obj) => Ok(obj.borrow().get(key).cloned().unwrap_or_default()),

            Value::Null | Value::Undefined => Err(RuntimeError::type_error(
                format!(
                    "Cannot read properties of {} (reading '{}')",
                    value.to_display_string(),
                    key
                ),
                location,
            )),

            Value::Function(def) if key == "name" => Ok(Value::string(&def.name)),
            Value::Function(def) if key == "length" => Ok(Value::Number(def.params.len() as f64)),

            Value::Number(_) | Value::Bool(_) | Value::Function(_) => Ok(Value::Undefined),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_array_index() {
        assert_eq!(array_index(3.0), Some(3));
        assert_eq!(array_index(-1.0), None);
        assert_eq!(array_index(1.5), None);
        assert_eq!(array_index(f64::NAN), None);
    }
}
