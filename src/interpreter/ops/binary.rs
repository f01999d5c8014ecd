use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::memory::value::Value;
use crate::parser::ast::{BinOp, SourceLocation};

impl Interpreter {
    /// Apply a non-short-circuit binary operator to two evaluated operands
    pub(crate) fn binary_op(
        &self,
        op: BinOp,
        left: &Value,
        right: &Value,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        match op {
            BinOp::Add => Ok(add_values(left, right)),

            BinOp::Sub => Ok(Value::Number(left.to_number() - right.to_number())),
            BinOp::Mul => Ok(Value::Number(left.to_number() * right.to_number())),
            BinOp::Div => Ok(Value::Number(left.to_number() / right.to_number())),
            // f64 `%` truncates like the language's remainder operator
            BinOp::Mod => Ok(Value::Number(left.to_number() % right.to_number())),
            BinOp::Pow => Ok(Value::Number(left.to_number().powf(right.to_number()))),

            BinOp::StrictEq => Ok(Value::Bool(left.strict_equals(right))),
            BinOp::StrictNe => Ok(Value::Bool(!left.strict_equals(right))),
            BinOp::Eq => Ok(Value::Bool(left.loose_equals(right))),
            BinOp::Ne => Ok(Value::Bool(!left.loose_equals(right))),

            BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => {
                Ok(Value::Bool(compare_values(op, left, right)))
            }

            BinOp::In => {
                let key = left.to_display_string();
                match right {
                    Value::Object(obj) => Ok(Value::Bool(obj.borrow().contains_key(&key))),
                    Value::Array(items) => {
                        let len = items.borrow().len();
                        let found = key == "length"
                            || key.parse::<usize>().is_ok_and(|index| index < len);
                        Ok(Value::Bool(found))
                    }
                    other => Err(RuntimeError::type_error(
                        format!(
                            "Cannot use 'in' operator to search for '{}' in {}",
                            key,
                            other.to_display_string()
                        ),
                        location,
                    )),
                }
            }

            BinOp::And | BinOp::Or | BinOp::Nullish => Err(RuntimeError::UnsupportedOperation {
                message: format!("'{}' must be evaluated lazily", op.symbol()),
                location,
            }),
        }
    }
}

/// Containers take part in `+` through their string form
fn to_primitive(value: &Value) -> Value {
    match value {
        Value::Array(_) | Value::Object(_) | Value::Function(_) => {
            Value::string(&value.to_display_string())
        }
        other => other.clone(),
    }
}

fn add_values(left: &Value, right: &Value) -> Value {
    let left = to_primitive(left);
    let right = to_primitive(right);

    if matches!(left, Value::Str(_)) || matches!(right, Value::Str(_)) {
        let mut joined = left.to_display_string();
        joined.push_str(&right.to_display_string());
        return Value::string(&joined);
    }

    Value::Number(left.to_number() + right.to_number())
}

/// Relational comparison: lexicographic for two strings, numeric otherwise.
/// Any comparison involving NaN is false.
fn compare_values(op: BinOp, left: &Value, right: &Value) -> bool {
    let left = to_primitive(left);
    let right = to_primitive(right);

    if let (Value::Str(a), Value::Str(b)) = (&left, &right) {
        return match op {
            BinOp::Lt => a < b,
            BinOp::Le => a <= b,
            BinOp::Gt => a > b,
            _ => a >= b,
        };
    }

    let (a, b) = (left.to_number(), right.to_number());
    match op {
        BinOp::Lt => a < b,
        BinOp::Le => a <= b,
        BinOp::Gt => a > b,
        _ => a >= b,
    }
}
