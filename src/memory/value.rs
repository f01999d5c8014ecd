//! Runtime value representation
//!
//! This module defines the [`Value`] enum, which represents all possible runtime
//! values of the routine language.
//!
//! # Value Types
//!
//! - [`Value::Number`]: IEEE double, the only numeric type
//! - [`Value::Bool`], [`Value::Str`], [`Value::Null`], [`Value::Undefined`]
//! - [`Value::Array`], [`Value::Object`]: shared, mutable containers with
//!   reference semantics (two bindings may alias the same array)
//! - [`Value::Function`]: a reference to a declared function
//!
//! Containers are `Rc<RefCell<..>>` because a memoization cache passed down
//! a recursion must be the same object in every activation.

use crate::parser::ast::FunctionDef;
use crate::trace::node::{format_number, TraceValue};
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::rc::Rc;

/// Nesting depth at which snapshots stop descending into containers
const MAX_SNAPSHOT_DEPTH: usize = 8;

pub type ArrayRef = Rc<RefCell<Vec<Value>>>;
pub type ObjectRef = Rc<RefCell<JsObject>>;

/// Runtime values in the interpreter
#[derive(Debug, Clone, Default)]
pub enum Value {
    Number(f64),
    Bool(bool),
    Str(Rc<str>),
    Null,
    #[default]
    Undefined,
    Array(ArrayRef),
    Object(ObjectRef),
    Function(Rc<FunctionDef>),
}

/// Plain object: string keys with insertion order preserved
#[derive(Debug, Clone, Default)]
pub struct JsObject {
    fields: FxHashMap<String, Value>,
    order: Vec<String>,
}

impl JsObject {
    pub fn new() -> Self {
        JsObject::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        if !self.fields.contains_key(&key) {
            self.order.push(key.clone());
        }
        self.fields.insert(key, value);
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Keys in insertion order
    pub fn keys(&self) -> &[String] {
        &self.order
    }

    /// Entries in insertion order
    pub fn entries(&self) -> impl Iterator<Item = (&String, &Value)> + '_ {
        self.order
            .iter()
            .filter_map(|key| self.fields.get(key).map(|value| (key, value)))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl Value {
    pub fn string(s: &str) -> Self {
        Value::Str(Rc::from(s))
    }

    pub fn array(items: Vec<Value>) -> Self {
        Value::Array(Rc::new(RefCell::new(items)))
    }

    pub fn object(obj: JsObject) -> Self {
        Value::Object(Rc::new(RefCell::new(obj)))
    }

    /// Result of the `typeof` operator
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Bool(_) => "boolean",
            Value::Str(_) => "string",
            Value::Undefined => "undefined",
            Value::Function(_) => "function",
            Value::Null | Value::Array(_) | Value::Object(_) => "object",
        }
    }

    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Null | Value::Undefined)
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Bool(b) => *b,
            Value::Str(s) => !s.is_empty(),
            Value::Null | Value::Undefined => false,
            Value::Array(_) | Value::Object(_) | Value::Function(_) => true,
        }
    }

    /// Numeric conversion (`Number(x)`)
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Number(n) => *n,
            Value::Bool(b) => f64::from(u8::from(*b)),
            Value::Null => 0.0,
            Value::Undefined | Value::Object(_) | Value::Function(_) => f64::NAN,
            Value::Str(s) => parse_numeric_string(s),
            Value::Array(_) => parse_numeric_string(&self.to_display_string()),
        }
    }

    /// String conversion (`String(x)`, `+` concatenation, property keys)
    pub fn to_display_string(&self) -> String {
        match self {
            Value::Number(n) => format_number(*n),
            Value::Bool(b) => b.to_string(),
            Value::Str(s) => s.to_string(),
            Value::Null => "null".to_string(),
            Value::Undefined => "undefined".to_string(),
            Value::Array(items) => items
                .borrow()
                .iter()
                .map(|v| {
                    if v.is_nullish() {
                        String::new()
                    } else {
                        v.to_display_string()
                    }
                })
                .collect::<Vec<_>>()
                .join(","),
            Value::Object(_) => "[object Object]".to_string(),
            Value::Function(def) => format!("function {}() {{ [code] }}", def.name),
        }
    }

    /// `===` comparison; containers compare by identity
    pub fn strict_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Null, Value::Null) | (Value::Undefined, Value::Undefined) => true,
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// `==` comparison with the usual primitive coercions
    pub fn loose_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (a, b) if a.is_nullish() && b.is_nullish() => true,
            (a, b) if a.is_nullish() || b.is_nullish() => false,
            (Value::Number(_), Value::Str(_))
            | (Value::Str(_), Value::Number(_))
            | (Value::Bool(_), _)
            | (_, Value::Bool(_)) => self.to_number() == other.to_number(),
            (Value::Array(_), Value::Str(_) | Value::Number(_))
            | (Value::Str(_) | Value::Number(_), Value::Array(_)) => {
                let (container, primitive) = if matches!(self, Value::Array(_)) {
                    (self, other)
                } else {
                    (other, self)
                };
                Value::string(&container.to_display_string()).loose_equals(primitive)
            }
            _ => self.strict_equals(other),
        }
    }

    /// Detach this value from the interpreter for recording in a trace
    pub fn to_trace_value(&self) -> TraceValue {
        self.snapshot(0)
    }

    fn snapshot(&self, depth: usize) -> TraceValue {
        match self {
            Value::Number(n) => TraceValue::Number(*n),
            Value::Bool(b) => TraceValue::Bool(*b),
            Value::Str(s) => TraceValue::Str(s.to_string()),
            Value::Null => TraceValue::Null,
            Value::Undefined => TraceValue::Undefined,
            Value::Function(def) => TraceValue::Function(def.name.clone()),
            Value::Array(_) | Value::Object(_) if depth >= MAX_SNAPSHOT_DEPTH => {
                TraceValue::Str("...".to_string())
            }
            Value::Array(items) => TraceValue::Array(
                items
                    .borrow()
                    .iter()
                    .map(|v| v.snapshot(depth + 1))
                    .collect(),
            ),
            Value::Object(obj) => TraceValue::Object(
                obj.borrow()
                    .entries()
                    .map(|(k, v)| (k.clone(), v.snapshot(depth + 1)))
                    .collect(),
            ),
        }
    }
}

/// `Number("...")`: surrounding whitespace ignored, empty string is zero
fn parse_numeric_string(s: &str) -> f64 {
    let trimmed = s.trim();
    match trimmed {
        "" => 0.0,
        "Infinity" | "+Infinity" => f64::INFINITY,
        "-Infinity" => f64::NEG_INFINITY,
        _ if trimmed.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') => f64::NAN,
        _ => trimmed.parse::<f64>().unwrap_or(f64::NAN),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthiness() {
        assert!(!Value::Number(0.0).is_truthy());
        assert!(!Value::Number(f64::NAN).is_truthy());
        assert!(!Value::string("").is_truthy());
        assert!(Value::array(vec![]).is_truthy());
        assert!(!Value::Undefined.is_truthy());
    }

    #[test]
    fn test_to_number() {
        assert_eq!(Value::string(" 42 ").to_number(), 42.0);
        assert_eq!(Value::string("").to_number(), 0.0);
        assert!(Value::string("abc").to_number().is_nan());
        assert_eq!(Value::Bool(true).to_number(), 1.0);
        assert_eq!(Value::array(vec![Value::Number(7.0)]).to_number(), 7.0);
    }

    #[test]
    fn test_display_string() {
        let arr = Value::array(vec![Value::Number(1.0), Value::Null, Value::string("x")]);
        assert_eq!(arr.to_display_string(), "1,,x");
        assert_eq!(Value::Number(2.5).to_display_string(), "2.5");
    }

    #[test]
    fn test_equality() {
        let arr = Value::array(vec![]);
        assert!(arr.strict_equals(&arr.clone()));
        assert!(!arr.strict_equals(&Value::array(vec![])));
        assert!(Value::Null.loose_equals(&Value::Undefined));
        assert!(!Value::Null.strict_equals(&Value::Undefined));
        assert!(Value::string("1").loose_equals(&Value::Number(1.0)));
        assert!(Value::Bool(true).loose_equals(&Value::Number(1.0)));
    }

    #[test]
    fn test_object_insertion_order() {
        let mut obj = JsObject::new();
        obj.set("b", Value::Number(1.0));
        obj.set("a", Value::Number(2.0));
        obj.set("b", Value::Number(3.0));
        assert_eq!(obj.keys(), &["b".to_string(), "a".to_string()]);
        assert_eq!(obj.get("b").map(Value::to_number), Some(3.0));
    }

    #[test]
    fn test_snapshot_cycle_is_bounded() {
        let arr = Value::array(vec![]);
        if let Value::Array(items) = &arr {
            items.borrow_mut().push(arr.clone());
        }
        let snapshot = arr.to_trace_value();
        assert!(matches!(snapshot, TraceValue::Array(_)));
    }
}
