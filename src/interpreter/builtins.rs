//! Built-in function implementations
//!
//! This module provides the library surface that routines can call without
//! defining it themselves. Everything is implemented directly on the
//! [`Interpreter`] rather than in user code.
//!
//! # Supported Built-ins
//!
//! - Globals: `String`, `Number`, `Boolean`, `parseInt`, `parseFloat`, `isNaN`,
//!   `Infinity`, `NaN`
//! - Namespaces: `Math`, `console.log`, `Array.isArray`/`Array.from`,
//!   `Object.keys`/`Object.values`, `Number.isInteger`, `JSON.stringify`
//! - Array methods: `push`, `pop`, `shift`, `unshift`, `slice`, `concat`,
//!   `join`, `includes`, `indexOf`, `reverse`, `fill`, `toString`
//! - String methods: `slice`, `substring`, `charAt`, `includes`, `indexOf`,
//!   `split`, `toUpperCase`, `toLowerCase`, `trim`, `toString`
//! - `new Array(..)` and `new Object()`
//!
//! # Implementation Notes
//!
//! - A program may shadow a namespace (`let Math = ..`); the built-in is only
//!   used when the name is unbound
//! - `console.log` output is captured in the interpreter's [`Console`], never
//!   written to the terminal
//!
//! [`Console`]: crate::interpreter::console::Console

use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::ops::access::array_index;
use crate::memory::value::{JsObject, Value};
use crate::parser::ast::{AstNode, SourceLocation};
use crate::trace::node::format_number;

const NAMESPACES: &[&str] = &["Math", "console", "Array", "Object", "Number", "JSON"];

/// Whether `name` is a built-in namespace object such as `Math`
pub(crate) fn is_namespace(name: &str) -> bool {
    NAMESPACES.contains(&name)
}

fn unsupported(message: String, location: SourceLocation) -> RuntimeError {
    RuntimeError::UnsupportedOperation { message, location }
}

fn number_arg(args: &[Value], i: usize) -> f64 {
    args.get(i).map_or(f64::NAN, Value::to_number)
}

/// Resolve a possibly negative start/end argument against a length
fn relative_index(arg: Option<&Value>, len: usize, default: usize) -> usize {
    let Some(value) = arg.filter(|v| !matches!(v, Value::Undefined)) else {
        return default;
    };
    let n = value.to_number();
    if n.is_nan() {
        return 0;
    }
    let n = n.trunc();
    if n < 0.0 {
        (len as f64 + n).max(0.0) as usize
    } else {
        n.min(len as f64) as usize
    }
}

impl Interpreter {
    /// Global value bindings that are not keywords
    pub(crate) fn builtin_constant(name: &str) -> Option<Value> {
        match name {
            "Infinity" => Some(Value::Number(f64::INFINITY)),
            "NaN" => Some(Value::Number(f64::NAN)),
            _ => None,
        }
    }

    /// Constant properties of namespaces, e.g. `Math.PI`
    pub(crate) fn namespace_constant(namespace: &str, member: &str) -> Option<Value> {
        let n = match (namespace, member) {
            ("Math", "PI") => std::f64::consts::PI,
            ("Math", "E") => std::f64::consts::E,
            ("Math", "LN2") => std::f64::consts::LN_2,
            ("Math", "SQRT2") => std::f64::consts::SQRT_2,
            ("Number", "MAX_SAFE_INTEGER") => 9_007_199_254_740_991.0,
            ("Number", "MIN_SAFE_INTEGER") => -9_007_199_254_740_991.0,
            ("Number", "POSITIVE_INFINITY") => f64::INFINITY,
            ("Number", "NEGATIVE_INFINITY") => f64::NEG_INFINITY,
            ("Number", "EPSILON") => f64::EPSILON,
            _ => return None,
        };
        Some(Value::Number(n))
    }

    /// Global built-in functions; `None` if `name` is not one
    pub(crate) fn call_global_builtin(
        &mut self,
        name: &str,
        args: Vec<Value>,
        _location: SourceLocation,
    ) -> Result<Option<Value>, RuntimeError> {
        let first = args.first().cloned().unwrap_or_default();

        let value = match name {
            "String" => Value::string(&first.to_display_string()),
            "Number" if args.is_empty() => Value::Number(0.0),
            "Number" => Value::Number(first.to_number()),
            "Boolean" => Value::Bool(first.is_truthy()),
            "isNaN" => Value::Bool(first.to_number().is_nan()),
            "parseFloat" => Value::Number(parse_float_prefix(&first.to_display_string())),
            "parseInt" => {
                let radix = args.get(1).map_or(10.0, Value::to_number);
                let radix = if radix.is_nan() || radix == 0.0 { 10 } else { radix as u32 };
                Value::Number(parse_int_prefix(&first.to_display_string(), radix))
            }
            _ => return Ok(None),
        };

        Ok(Some(value))
    }

    /// `object.method(args)`: namespaces, function-valued properties, then
    /// built-in methods of the receiver's type
    pub(crate) fn call_method(
        &mut self,
        object: &AstNode,
        method: &str,
        args: &[AstNode],
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        if let AstNode::Variable(name, _) = object {
            if is_namespace(name) && self.stack.lookup(name).is_none() {
                let args = self.evaluate_list(args)?;
                return self.call_namespace(name, method, args, location);
            }
        }

        let receiver = self.evaluate_expr(object)?;

        if let Value::Object(obj) = &receiver {
            let property = obj.borrow().get(method).cloned();
            match property {
                Some(Value::Function(def)) => {
                    let args = self.evaluate_list(args)?;
                    return self.call_function_value(&def, args, location);
                }
                Some(other) if method != "hasOwnProperty" => {
                    return Err(RuntimeError::NotCallable {
                        name: format!("{} ({})", method, other.type_name()),
                        location,
                    });
                }
                _ => {}
            }
        }

        let args = self.evaluate_list(args)?;
        self.call_value_method(&receiver, method, args, location)
    }

    fn call_namespace(
        &mut self,
        namespace: &str,
        method: &str,
        args: Vec<Value>,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        match (namespace, method) {
            ("console", "log") => {
                let line = args
                    .iter()
                    .map(|arg| match arg {
                        Value::Str(s) => s.to_string(),
                        other => other.to_trace_value().to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(" ");
                self.console.log(line, location);
                Ok(Value::Undefined)
            }

            ("Math", _) => math_function(method, &args)
                .map(Value::Number)
                .ok_or_else(|| unsupported(format!("Math.{} is not available", method), location)),

            ("Array", "isArray") => Ok(Value::Bool(matches!(args.first(), Some(Value::Array(_))))),
            ("Array", "from") => {
                let source = args.into_iter().next().unwrap_or_default();
                Ok(Value::array(self.iterate_value(source, location)?))
            }

            ("Object", "keys") | ("Object", "values") => match args.first() {
                Some(Value::Object(obj)) => {
                    let obj = obj.borrow();
                    let items = if method == "keys" {
                        obj.keys().iter().map(|k| Value::string(k)).collect()
                    } else {
                        obj.entries().map(|(_, v)| v.clone()).collect()
                    };
                    Ok(Value::array(items))
                }
                Some(Value::Array(items)) => {
                    let items = items.borrow();
                    Ok(Value::array(if method == "keys" {
                        (0..items.len())
                            .map(|i| Value::string(&i.to_string()))
                            .collect()
                    } else {
                        items.clone()
                    }))
                }
                _ => Err(RuntimeError::type_error(
                    "Cannot convert undefined or null to object",
                    location,
                )),
            },

            ("Number", "isInteger") => Ok(Value::Bool(matches!(
                args.first(),
                Some(Value::Number(n)) if n.is_finite() && n.fract() == 0.0
            ))),

            ("JSON", "stringify") => {
                let value = args.first().cloned().unwrap_or_default();
                if matches!(value, Value::Undefined) {
                    return Ok(Value::Undefined);
                }
                serde_json::to_string(&value.to_trace_value())
                    .map(|json| Value::string(&json))
                    .map_err(|e| RuntimeError::type_error(e.to_string(), location))
            }

            _ => Err(unsupported(
                format!("{}.{} is not available", namespace, method),
                location,
            )),
        }
    }

    /// Built-in methods of arrays, strings and plain objects
    fn call_value_method(
        &mut self,
        receiver: &Value,
        method: &str,
        args: Vec<Value>,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        match receiver {
            Value::Array(items) => {
                let len = items.borrow().len();

                match method {
                    "push" => {
                        let mut items = items.borrow_mut();
                        items.extend(args);
                        Ok(Value::Number(items.len() as f64))
                    }
                    "pop" => Ok(items.borrow_mut().pop().unwrap_or_default()),
                    "shift" if len == 0 => Ok(Value::Undefined),
                    "shift" => Ok(items.borrow_mut().remove(0)),
                    "unshift" => {
                        let mut items = items.borrow_mut();
                        items.splice(0..0, args);
                        Ok(Value::Number(items.len() as f64))
                    }
                    "slice" => {
                        let start = relative_index(args.first(), len, 0);
                        let end = relative_index(args.get(1), len, len);
                        let slice = if start < end {
                            items.borrow()[start..end].to_vec()
                        } else {
                            Vec::new()
                        };
                        Ok(Value::array(slice))
                    }
                    "concat" => {
                        let mut joined = items.borrow().clone();
                        for arg in args {
                            match arg {
                                Value::Array(other) => joined.extend(other.borrow().iter().cloned()),
                                other => joined.push(other),
                            }
                        }
                        Ok(Value::array(joined))
                    }
                    "join" => {
                        let separator = match args.first() {
                            None | Some(Value::Undefined) => ",".to_string(),
                            Some(sep) => sep.to_display_string(),
                        };
                        let parts: Vec<String> = items
                            .borrow()
                            .iter()
                            .map(|v| {
                                if v.is_nullish() {
                                    String::new()
                                } else {
                                    v.to_display_string()
                                }
                            })
                            .collect();
                        Ok(Value::string(&parts.join(&separator)))
                    }
                    "includes" => {
                        let needle = args.first().cloned().unwrap_or_default();
                        let found = items.borrow().iter().any(|v| {
                            v.strict_equals(&needle)
                                || matches!((v, &needle), (Value::Number(a), Value::Number(b)) if a.is_nan() && b.is_nan())
                        });
                        Ok(Value::Bool(found))
                    }
                    "indexOf" => {
                        let needle = args.first().cloned().unwrap_or_default();
                        let index = items
                            .borrow()
                            .iter()
                            .position(|v| v.strict_equals(&needle))
                            .map_or(-1.0, |i| i as f64);
                        Ok(Value::Number(index))
                    }
                    "reverse" => {
                        items.borrow_mut().reverse();
                        Ok(receiver.clone())
                    }
                    "fill" => {
                        let value = args.first().cloned().unwrap_or_default();
                        let start = relative_index(args.get(1), len, 0);
                        let end = relative_index(args.get(2), len, len);
                        for slot in items.borrow_mut().iter_mut().take(end).skip(start) {
                            *slot = value.clone();
                        }
                        Ok(receiver.clone())
                    }
                    "toString" => Ok(Value::string(&receiver.to_display_string())),
                    _ => Err(RuntimeError::NotCallable {
                        name: format!("array.{}", method),
                        location,
                    }),
                }
            }

            Value::Str(s) => string_method(s, method, &args).ok_or_else(|| {
                RuntimeError::NotCallable {
                    name: format!("string.{}", method),
                    location,
                }
            }),

            Value::Object(obj) if method == "hasOwnProperty" => {
                let key = args.first().map(Value::to_display_string).unwrap_or_default();
                Ok(Value::Bool(obj.borrow().contains_key(&key)))
            }

            Value::Number(n) if method == "toString" => Ok(Value::string(&format_number(*n))),
            Value::Number(n) if method == "toFixed" => {
                let digits = args.first().map_or(0.0, Value::to_number);
                let digits = if digits.is_nan() { 0 } else { digits.clamp(0.0, 100.0) as usize };
                Ok(Value::string(&format!("{:.*}", digits, n)))
            }

            Value::Null | Value::Undefined => Err(RuntimeError::type_error(
                format!(
                    "Cannot read properties of {} (reading '{}')",
                    receiver.to_display_string(),
                    method
                ),
                location,
            )),

            other => Err(RuntimeError::NotCallable {
                name: format!("{}.{}", other.type_name(), method),
                location,
            }),
        }
    }

    /// `new Name(args)`
    pub(crate) fn construct(
        &mut self,
        constructor: &str,
        args: Vec<Value>,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        match constructor {
            "Array" => match args.as_slice() {
                [Value::Number(n)] => {
                    let len = array_index(*n)
                        .ok_or_else(|| RuntimeError::type_error("Invalid array length", location))?;
                    Ok(Value::array(vec![Value::Undefined; len]))
                }
                _ => Ok(Value::array(args)),
            },
            "Object" => Ok(Value::object(JsObject::new())),
            other => Err(unsupported(format!("'new {}' is not supported", other), location)),
        }
    }
}

fn math_function(method: &str, args: &[Value]) -> Option<f64> {
    let x = number_arg(args, 0);
    Some(match method {
        "max" => args
            .iter()
            .map(Value::to_number)
            .try_fold(f64::NEG_INFINITY, |acc, n| (!n.is_nan()).then(|| acc.max(n)))
            .unwrap_or(f64::NAN),
        "min" => args
            .iter()
            .map(Value::to_number)
            .try_fold(f64::INFINITY, |acc, n| (!n.is_nan()).then(|| acc.min(n)))
            .unwrap_or(f64::NAN),
        "floor" => x.floor(),
        "ceil" => x.ceil(),
        // Halves round towards +Infinity
        "round" => (x + 0.5).floor(),
        "trunc" => x.trunc(),
        "abs" => x.abs(),
        "sqrt" => x.sqrt(),
        "cbrt" => x.cbrt(),
        "log" => x.ln(),
        "log2" => x.log2(),
        "log10" => x.log10(),
        "exp" => x.exp(),
        "pow" => x.powf(number_arg(args, 1)),
        "sign" if x.is_nan() || x == 0.0 => x,
        "sign" => x.signum(),
        _ => return None,
    })
}

fn string_method(s: &str, method: &str, args: &[Value]) -> Option<Value> {
    let chars: Vec<char> = s.chars().collect();
    let len = chars.len();
    let arg_string = |i: usize| args.get(i).map(Value::to_display_string).unwrap_or_default();

    Some(match method {
        "slice" => {
            let start = relative_index(args.first(), len, 0);
            let end = relative_index(args.get(1), len, len);
            let out: String = if start < end {
                chars[start..end].iter().collect()
            } else {
                String::new()
            };
            Value::string(&out)
        }
        "substring" => {
            let clamp = |v: Option<&Value>, default: usize| match v {
                None | Some(Value::Undefined) => default,
                Some(v) => {
                    let n = v.to_number();
                    if n.is_nan() {
                        0
                    } else {
                        n.clamp(0.0, len as f64) as usize
                    }
                }
            };
            let a = clamp(args.first(), 0);
            let b = clamp(args.get(1), len);
            let (start, end) = if a <= b { (a, b) } else { (b, a) };
            Value::string(&chars[start..end].iter().collect::<String>())
        }
        "charAt" => {
            let i = args.first().map_or(0.0, Value::to_number);
            let c = array_index(i)
                .and_then(|i| chars.get(i))
                .map(|c| c.to_string())
                .unwrap_or_default();
            Value::string(&c)
        }
        "includes" => Value::Bool(s.contains(arg_string(0).as_str())),
        "indexOf" => {
            let needle = arg_string(0);
            let index = s
                .find(needle.as_str())
                .map_or(-1.0, |byte| s[..byte].chars().count() as f64);
            Value::Number(index)
        }
        "split" => {
            let parts: Vec<Value> = match args.first() {
                None | Some(Value::Undefined) => vec![Value::string(s)],
                Some(sep) => {
                    let sep = sep.to_display_string();
                    if sep.is_empty() {
                        chars.iter().map(|c| Value::string(&c.to_string())).collect()
                    } else {
                        s.split(sep.as_str()).map(Value::string).collect()
                    }
                }
            };
            Value::array(parts)
        }
        "toUpperCase" => Value::string(&s.to_uppercase()),
        "toLowerCase" => Value::string(&s.to_lowercase()),
        "trim" => Value::string(s.trim()),
        "toString" => Value::string(s),
        _ => return None,
    })
}

/// `parseFloat`: longest numeric prefix after leading whitespace
fn parse_float_prefix(s: &str) -> f64 {
    let s = s.trim_start();
    if s.starts_with("Infinity") || s.starts_with("+Infinity") {
        return f64::INFINITY;
    }
    if s.starts_with("-Infinity") {
        return f64::NEG_INFINITY;
    }

    let mut best = f64::NAN;
    for (i, c) in s.char_indices() {
        if !(c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E')) {
            break;
        }
        if let Ok(n) = s[..i + c.len_utf8()].parse::<f64>() {
            best = n;
        }
    }
    best
}

/// `parseInt`: optional sign then digits of `radix`
fn parse_int_prefix(s: &str, radix: u32) -> f64 {
    if !(2..=36).contains(&radix) {
        return f64::NAN;
    }
    let s = s.trim_start();
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };

    let mut value: Option<f64> = None;
    for c in digits.chars() {
        let Some(d) = c.to_digit(radix) else { break };
        value = Some(value.unwrap_or(0.0) * radix as f64 + d as f64);
    }

    match value {
        Some(v) if negative => -v,
        Some(v) => v,
        None => f64::NAN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::engine::{ExecutionLimits, TraceMode};
    use crate::parser::Parser;

    fn run(body: &str) -> (Value, Vec<String>) {
        let source = format!("function fn() {{ {} }}", body);
        let program = Parser::new(&source).unwrap().parse_program().unwrap();
        let mut interp = Interpreter::new(program, ExecutionLimits::default(), TraceMode::Off);
        interp.load().unwrap();
        let value = interp.call_entry("fn", vec![]).unwrap();
        (value, interp.console().output())
    }

    fn eval(body: &str) -> String {
        run(body).0.to_display_string()
    }

    #[test]
    fn test_math() {
        assert_eq!(eval("return Math.max(1, 7, 3);"), "7");
        assert_eq!(eval("return Math.min();"), "Infinity");
        assert_eq!(eval("return Math.floor(7 / 2);"), "3");
        assert_eq!(eval("return Math.round(-2.5);"), "-2");
        assert_eq!(eval("return Math.max(1, NaN);"), "NaN");
    }

    #[test]
    fn test_array_methods() {
        assert_eq!(eval("const a = [1, 2]; a.push(3); return a.join('-');"), "1-2-3");
        assert_eq!(eval("return [1, 2, 3, 4].slice(1, -1);"), "2,3");
        assert_eq!(eval("return [1, 2].concat([3], 4);"), "1,2,3,4");
        assert_eq!(eval("return [3, 1].indexOf(1);"), "1");
        assert_eq!(eval("return new Array(3).fill(0);"), "0,0,0");
        assert_eq!(eval("const a = [1, 2, 3]; a.shift(); return a;"), "2,3");
    }

    #[test]
    fn test_string_methods() {
        assert_eq!(eval("return 'hello'.slice(1, 3);"), "el");
        assert_eq!(eval("return 'a,b,c'.split(',').length;"), "3");
        assert_eq!(eval("return 'abc'.charAt(2);"), "c");
        assert_eq!(eval("return 'Abc'.toUpperCase();"), "ABC");
        assert_eq!(eval("return 'abc'.substring(2, 0);"), "ab");
    }

    #[test]
    fn test_console_log_is_captured() {
        let (_, output) = run("console.log('n =', 3, [1, 2]); return 0;");
        assert_eq!(output, vec!["n = 3 [1,2]"]);
    }

    #[test]
    fn test_json_stringify_memo_key() {
        assert_eq!(eval("return JSON.stringify([1, 2]);"), "[1,2]");
    }

    #[test]
    fn test_object_helpers() {
        assert_eq!(eval("return Object.keys({ a: 1, b: 2 });"), "a,b");
        assert_eq!(eval("const m = { k: 1 }; return m.hasOwnProperty('k');"), "true");
        assert_eq!(eval("return 'x' in { x: undefined };"), "true");
    }

    #[test]
    fn test_parse_helpers() {
        assert_eq!(parse_int_prefix("42px", 10), 42.0);
        assert_eq!(parse_int_prefix("-ff", 16), -255.0);
        assert!(parse_int_prefix("px", 10).is_nan());
        assert_eq!(parse_float_prefix(" 3.5e1x"), 35.0);
    }

    #[test]
    fn test_shadowed_namespace() {
        let (value, _) = run("const Math = { max: 5 }; return Math.max;");
        assert_eq!(value.to_number(), 5.0);
    }
}
