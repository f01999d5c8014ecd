use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::memory::value::Value;
use crate::parser::ast::{AstNode, SourceLocation, UnOp};

impl Interpreter {
    pub(crate) fn unary_op(
        &mut self,
        op: UnOp,
        operand: &AstNode,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        match op {
            UnOp::Neg => Ok(Value::Number(-self.evaluate_expr(operand)?.to_number())),
            UnOp::Plus => Ok(Value::Number(self.evaluate_expr(operand)?.to_number())),
            UnOp::Not => Ok(Value::Bool(!self.evaluate_expr(operand)?.is_truthy())),

            UnOp::TypeOf => {
                // typeof never throws on an undeclared name
                if let AstNode::Variable(name, loc) = operand {
                    return Ok(match self.lookup_variable(name, *loc) {
                        Ok(value) => Value::string(value.type_name()),
                        Err(_) => Value::string("undefined"),
                    });
                }
                let value = self.evaluate_expr(operand)?;
                Ok(Value::string(value.type_name()))
            }

            UnOp::PreInc | UnOp::PreDec | UnOp::PostInc | UnOp::PostDec => {
                self.update(op, operand, location)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::interpreter::engine::{ExecutionLimits, Interpreter, TraceMode};
    use crate::parser::Parser;

    fn call(body: &str) -> String {
        let source = format!("function fn() {{ {} }}", body);
        let program = Parser::new(&source).unwrap().parse_program().unwrap();
        let mut interp = Interpreter::new(program, ExecutionLimits::default(), TraceMode::Off);
        interp.load().unwrap();
        interp.call_entry("fn", vec![]).unwrap().to_display_string()
    }

    #[test]
    fn test_typeof() {
        assert_eq!(call("return typeof missing;"), "undefined");
        assert_eq!(call("return typeof [];"), "object");
        assert_eq!(call("return typeof fn;"), "function");
        assert_eq!(call("return typeof '';"), "string");
    }

    #[test]
    fn test_negation_and_not() {
        assert_eq!(call("return -'3';"), "-3");
        assert_eq!(call("return !0;"), "true");
        assert_eq!(call("return +true;"), "1");
    }
}
