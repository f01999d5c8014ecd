//! Rewriting recursive call sites to pass trace context

use crate::instrument::scan::{is_ident_byte, CodeMap};
use crate::instrument::splitter::{is_tracking_argument, split_parameters};
use crate::interpreter::constants::{DEPTH_PARAM, NODE_VAR};

/// Rewrite every direct call of `entry` in `code` to pass the next depth and
/// the caller's trace node as trailing arguments.
///
/// Tracking arguments already present are dropped before the new ones are
/// appended, so rewriting is idempotent. When `arity` is known, calls are
/// padded with `undefined` (or truncated) to that many user arguments so
/// the tracking arguments bind to the tracking parameters. Argument text is
/// rewritten recursively, so `fn(fn(n - 1))` has both calls rewritten.
///
/// Calls inside strings or comments, member calls (`obj.fn(`) and the
/// routine's own declaration header are left alone, as is a call whose
/// parentheses never balance.
pub fn rewrite_recursive_calls(code: &str, entry: &str, arity: Option<usize>) -> String {
    if entry.is_empty() {
        return code.to_string();
    }

    let map = CodeMap::new(code);
    let mut out = String::with_capacity(code.len() + 64);
    let mut copied = 0;
    let mut cursor = 0;

    while let Some(offset) = code[cursor..].find(entry) {
        let start = cursor + offset;
        let end = start + entry.len();
        cursor = end;

        let Some(open) = call_open_paren(&map, code, start, end) else {
            continue;
        };
        let Some(close) = map.matching_close(open) else {
            continue;
        };

        let inner = rewrite_recursive_calls(&code[open + 1..close], entry, arity);
        let mut args: Vec<String> = split_parameters(&inner)
            .into_iter()
            .filter(|arg| !is_tracking_argument(arg))
            .collect();

        let has_spread = args.iter().any(|arg| arg.starts_with("..."));
        if let (Some(arity), false) = (arity, has_spread) {
            args.resize(arity, "undefined".to_string());
        }
        args.push(format!("{} + 1", DEPTH_PARAM));
        args.push(NODE_VAR.to_string());

        out.push_str(&code[copied..start]);
        out.push_str(entry);
        out.push('(');
        out.push_str(&args.join(", "));
        out.push(')');

        copied = close + 1;
        cursor = close + 1;
    }

    out.push_str(&code[copied..]);
    out
}

/// If `entry` at `start..end` is a direct call, the index of its `(`
fn call_open_paren(map: &CodeMap, code: &str, start: usize, end: usize) -> Option<usize> {
    if !map.is_code(start) {
        return None;
    }
    if map.byte(end).is_some_and(is_ident_byte) {
        return None;
    }

    if let Some((prev_index, prev)) = map.previous_significant(start) {
        if is_ident_byte(prev) && prev_index + 1 == start {
            return None;
        }
        if prev == b'.' {
            return None;
        }
        // `function fn(` is the declaration, not a call
        if code[..=prev_index].ends_with("function") {
            let keyword_start = prev_index + 1 - "function".len();
            if keyword_start == 0 || !map.byte(keyword_start - 1).is_some_and(is_ident_byte) {
                return None;
            }
        }
    }

    let open = map.skip_whitespace(end);
    (map.byte(open) == Some(b'(')).then_some(open)
}
