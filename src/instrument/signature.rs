//! Locating the entry routine's declaration and augmenting its signature

use crate::instrument::scan::CodeMap;
use crate::instrument::splitter::{parameter_name, split_parameters};
use crate::instrument::InstrumentError;
use crate::interpreter::constants::{DEPTH_PARAM, PARENT_PARAM};
use regex::Regex;

/// Byte offsets of the parts of a routine declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Declaration {
    /// Start of the `function` keyword
    pub start: usize,
    pub params_open: usize,
    pub params_close: usize,
    pub body_open: usize,
    pub body_close: usize,
}

impl Declaration {
    pub fn params<'a>(&self, source: &'a str) -> &'a str {
        &source[self.params_open + 1..self.params_close]
    }

    pub fn body<'a>(&self, source: &'a str) -> &'a str {
        &source[self.body_open + 1..self.body_close]
    }
}

/// Find the top-level `function <entry>(...) { ... }` declaration
pub fn locate_declaration(source: &str, entry: &str) -> Result<Declaration, InstrumentError> {
    let pattern = format!(r"\bfunction\s+{}\s*\(", regex::escape(entry));
    let header = Regex::new(&pattern).map_err(|e| InstrumentError::MalformedDeclaration {
        name: entry.to_string(),
        reason: e.to_string(),
    })?;

    let map = CodeMap::new(source);
    let found = header
        .find_iter(source)
        .find(|m| map.is_code(m.start()) && map.brace_depth_at(m.start()) == 0)
        .ok_or_else(|| InstrumentError::RoutineNotFound {
            name: entry.to_string(),
        })?;

    let malformed = |reason: &str| InstrumentError::MalformedDeclaration {
        name: entry.to_string(),
        reason: reason.to_string(),
    };

    let params_open = found.end() - 1;
    let params_close = map
        .matching_close(params_open)
        .ok_or_else(|| malformed("unbalanced parameter list"))?;

    let body_open = map.skip_whitespace(params_close + 1);
    if map.byte(body_open) != Some(b'{') {
        return Err(malformed("expected '{' after the parameter list"));
    }
    let body_close = map
        .matching_close(body_open)
        .ok_or_else(|| malformed("unbalanced braces in the body"))?;

    Ok(Declaration {
        start: found.start(),
        params_open,
        params_close,
        body_open,
        body_close,
    })
}

/// Append the tracking parameters to the entry routine's declaration.
///
/// Only the header is rewritten. If both tracking parameters are already
/// declared the source is returned unchanged.
pub fn augment_signature(source: &str, entry: &str) -> Result<String, InstrumentError> {
    let decl = locate_declaration(source, entry)?;
    let mut params = split_parameters(decl.params(source));

    let declares = |name: &str| params.iter().any(|p| parameter_name(p) == name);
    let missing: Vec<String> = [(DEPTH_PARAM, "0"), (PARENT_PARAM, "null")]
        .into_iter()
        .filter(|(name, _)| !declares(name))
        .map(|(name, default)| format!("{} = {}", name, default))
        .collect();

    if missing.is_empty() {
        return Ok(source.to_string());
    }

    params.extend(missing);
    tracing::debug!(entry, params = params.len(), "augmented signature");

    Ok(format!(
        "{}{}{}",
        &source[..decl.params_open + 1],
        params.join(", "),
        &source[decl.params_close..]
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_appends_tracking_parameters() {
        let out = augment_signature("function fn(n, memo = {}) { return n; }", "fn").unwrap();
        assert_eq!(
            out,
            "function fn(n, memo = {}, depthRecursionGraph = 0, parentNodeRecursionGraph = null) { return n; }"
        );
    }

    #[test]
    fn test_zero_parameters() {
        let out = augment_signature("function fn() {}", "fn").unwrap();
        assert_eq!(
            out,
            "function fn(depthRecursionGraph = 0, parentNodeRecursionGraph = null) {}"
        );
    }

    #[test]
    fn test_augmenting_twice_is_a_no_op() {
        let once = augment_signature("function fn(a, b) { return a; }", "fn").unwrap();
        let twice = augment_signature(&once, "fn").unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_longer_names_and_strings_are_ignored() {
        let src = "const s = 'function fn() {}';\nfunction fnx(a) {}\nfunction fn(a) { return a; }";
        let decl = locate_declaration(src, "fn").unwrap();
        assert_eq!(decl.params(src), "a");
        assert_eq!(decl.body(src), " return a; ");
    }

    #[test]
    fn test_nested_declaration_is_not_the_entry() {
        let src = "function outer() { function fn(x) { return x; } }";
        assert!(matches!(
            locate_declaration(src, "fn"),
            Err(InstrumentError::RoutineNotFound { .. })
        ));
    }

    #[test]
    fn test_missing_and_malformed() {
        assert!(matches!(
            augment_signature("function factorial(n) {}", "fn"),
            Err(InstrumentError::RoutineNotFound { .. })
        ));
        assert!(matches!(
            augment_signature("function fn(n { }", "fn"),
            Err(InstrumentError::MalformedDeclaration { .. })
        ));
        assert!(matches!(
            augment_signature("function fn(n) return n;", "fn"),
            Err(InstrumentError::MalformedDeclaration { .. })
        ));
    }
}
