//! Injecting node creation and return capture into the entry routine's body

use crate::instrument::call_sites::rewrite_recursive_calls;
use crate::instrument::scan::CodeMap;
use crate::instrument::signature::{augment_signature, locate_declaration};
use crate::instrument::splitter::{is_tracking_argument, parameter_name, split_parameters};
use crate::instrument::{InstrumentError, InstrumentedRoutine};
use crate::interpreter::constants::{CREATE_NODE, DEPTH_PARAM, NODE_VAR, PARENT_PARAM, RETURN_TEMP};
use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

static RETURN_KEYWORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\breturn\b").unwrap());

/// Bytes that leave an expression unfinished when they end a line
const TRAILING_OPERATORS: &[u8] = b"+-*/%&|^!=<>?:,.";

/// Bytes that carry the expression on when they start the next line
const LEADING_OPERATORS: &[u8] = b".?:+-*/%&|^=<>,([";

static NESTED_FUNCTION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bfunction\b").unwrap());

/// Instrument the entry routine declared in `source`.
///
/// The signature gains the tracking parameters, the body starts by creating
/// and linking its trace node, recursive calls pass the trace context on,
/// and each `return <expr>` stores its value in the node before returning.
/// Text outside the entry routine is copied unchanged.
pub fn inject(source: &str, entry: &str) -> Result<InstrumentedRoutine, InstrumentError> {
    let original = locate_declaration(source, entry)?;
    let params: Vec<String> = split_parameters(original.params(source))
        .iter()
        .filter(|p| !is_tracking_argument(p))
        .map(|p| parameter_name(p).to_string())
        .collect();
    let arity = params.len();

    let augmented = augment_signature(source, entry)?;
    let decl = locate_declaration(&augmented, entry)?;
    let body = decl.body(&augmented);

    let body_map = CodeMap::new(body);
    let already_instrumented = body
        .match_indices(CREATE_NODE)
        .any(|(i, _)| body_map.is_code(i));

    let new_body = if already_instrumented {
        tracing::debug!(entry, "body already instrumented, refreshing call sites only");
        rewrite_outside_nested_functions(body, |segment| {
            rewrite_recursive_calls(segment, entry, Some(arity))
        })
    } else {
        let rewritten = rewrite_outside_nested_functions(body, |segment| {
            capture_returns(&rewrite_recursive_calls(segment, entry, Some(arity)))
        });
        format!("{}{}", prologue(&params), rewritten)
    };

    let instrumented = format!(
        "{}{}{}",
        &augmented[..decl.body_open + 1],
        new_body,
        &augmented[decl.body_close..]
    );

    tracing::debug!(entry, arity, bytes = instrumented.len(), "routine instrumented");

    Ok(InstrumentedRoutine {
        source: instrumented,
        params,
        arity,
    })
}

/// Node creation and parent linking placed at the top of the body
fn prologue(params: &[String]) -> String {
    let fields = if params.is_empty() {
        "{}".to_string()
    } else {
        format!("{{ {} }}", params.join(", "))
    };
    format!(
        "\n  const {node} = {create}({fields}, {depth});\n  if ({parent}) {parent}.children.push({node});",
        node = NODE_VAR,
        create = CREATE_NODE,
        fields = fields,
        depth = DEPTH_PARAM,
        parent = PARENT_PARAM,
    )
}

/// Wrap each `return <expr>` so the value is stored in the current node.
///
/// A return ends at its `;`, at the bracket closing the enclosing block, or
/// at a line break where the parser would insert a semicolon. Bare returns
/// are left as they are.
fn capture_returns(code: &str) -> String {
    let map = CodeMap::new(code);
    let mut out = String::with_capacity(code.len() * 2);
    let mut copied = 0;

    for m in RETURN_KEYWORD.find_iter(code) {
        if m.start() < copied || !map.is_code(m.start()) {
            continue;
        }
        // `obj.return` is a property, not a statement
        if map.previous_token_byte(m.start()).is_some_and(|(_, b)| b == b'.') {
            continue;
        }
        let Some(span) = return_span(&map, code, m.end()) else {
            continue;
        };

        out.push_str(&code[copied..m.start()]);
        out.push_str(&format!(
            "{{ const {tmp} = {expr}; {node}.returnValue = {tmp}; return {tmp}; }}",
            tmp = RETURN_TEMP,
            expr = &code[span.expr],
            node = NODE_VAR,
        ));
        copied = span.end;
    }

    out.push_str(&code[copied..]);
    out
}

/// Where a return's expression sits and where the whole statement ends
struct ReturnSpan {
    expr: Range<usize>,
    end: usize,
}

/// Span of the return whose keyword ends at `from`. `None` for a bare
/// return, or when the expression runs past the end of `code`.
fn return_span(map: &CodeMap, code: &str, from: usize) -> Option<ReturnSpan> {
    let (start, first) = map.next_token_byte(from)?;
    let bytes = code.as_bytes();
    if matches!(first, b';' | b'}' | b')' | b']') || bytes[from..start].contains(&b'\n') {
        return None;
    }

    let mut depth = 0usize;
    let mut i = start;
    let (stop, has_semicolon) = loop {
        let Some(&b) = bytes.get(i) else {
            if depth > 0 || ends_mid_expression(map, i) {
                return None;
            }
            break (i, false);
        };
        if map.is_code(i) {
            match b {
                b'(' | b'[' | b'{' => depth += 1,
                b')' | b']' | b'}' if depth == 0 => break (i, false),
                b')' | b']' | b'}' => depth -= 1,
                b';' if depth == 0 => break (i, true),
                b'\n' if depth == 0 && !continues_after_line_break(map, i) => break (i, false),
                _ => {}
            }
        }
        i += 1;
    };

    let (last, _) = map.previous_token_byte(stop)?;
    if last < start {
        return None;
    }
    let expr_end = last + 1;
    Some(ReturnSpan {
        expr: start..expr_end,
        end: if has_semicolon { stop + 1 } else { expr_end },
    })
}

/// Whether the last token before `pos` is an operator still waiting for its
/// right-hand side
fn ends_mid_expression(map: &CodeMap, pos: usize) -> bool {
    let Some((i, b)) = map.previous_token_byte(pos) else {
        return false;
    };
    if !map.is_code(i) || !TRAILING_OPERATORS.contains(&b) {
        return false;
    }
    // `n++` and `n--` are complete
    let postfix =
        matches!(b, b'+' | b'-') && i > 0 && map.is_code(i - 1) && map.byte(i - 1) == Some(b);
    !postfix
}

/// Whether the expression goes on past the line break at `newline`
fn continues_after_line_break(map: &CodeMap, newline: usize) -> bool {
    if ends_mid_expression(map, newline) {
        return true;
    }
    let Some((i, b)) = map.next_token_byte(newline + 1) else {
        return false;
    };
    if !map.is_code(i) {
        return false;
    }
    match b {
        // A line starting with `++`/`--` is a new statement
        b'+' | b'-' => map.byte(i + 1) != Some(b),
        b'!' => map.byte(i + 1) == Some(b'='),
        _ => LEADING_OPERATORS.contains(&b),
    }
}

/// Apply `rewrite` to the parts of `body` outside nested function
/// declarations, which keep their own returns and recursion untouched
fn rewrite_outside_nested_functions(body: &str, rewrite: impl Fn(&str) -> String) -> String {
    let map = CodeMap::new(body);
    let mut out = String::with_capacity(body.len() * 2);
    let mut copied = 0;

    for m in NESTED_FUNCTION.find_iter(body) {
        if m.start() < copied || !map.is_code(m.start()) {
            continue;
        }
        let Some(span_end) = nested_function_end(&map, body, m.end()) else {
            continue;
        };

        out.push_str(&rewrite(&body[copied..m.start()]));
        out.push_str(&body[m.start()..=span_end]);
        copied = span_end + 1;
    }

    out.push_str(&rewrite(&body[copied..]));
    out
}

/// Index of the `}` closing a nested function whose keyword ends at `from`
fn nested_function_end(map: &CodeMap, body: &str, from: usize) -> Option<usize> {
    let open_paren = (from..body.len()).find(|&i| map.is_code(i) && map.byte(i) == Some(b'('))?;
    let close_paren = map.matching_close(open_paren)?;
    let open_brace = map.skip_whitespace(close_paren + 1);
    if map.byte(open_brace) != Some(b'{') {
        return None;
    }
    map.matching_close(open_brace)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factorial_is_instrumented() {
        let routine = inject(
            "function fn(n) {\n  if (n <= 1) return 1;\n  return n * fn(n - 1);\n}",
            "fn",
        )
        .unwrap();

        assert_eq!(routine.params, vec!["n"]);
        assert_eq!(routine.arity, 1);
        let src = &routine.source;
        assert!(src.starts_with(
            "function fn(n, depthRecursionGraph = 0, parentNodeRecursionGraph = null) {\n  const currentNode = createNode({ n }, depthRecursionGraph);"
        ));
        assert!(src.contains("if (parentNodeRecursionGraph) parentNodeRecursionGraph.children.push(currentNode);"));
        assert!(src.contains(
            "if (n <= 1) { const returnValueResult = 1; currentNode.returnValue = returnValueResult; return returnValueResult; }"
        ));
        assert!(src.contains(
            "const returnValueResult = n * fn(n - 1, depthRecursionGraph + 1, currentNode);"
        ));
    }

    #[test]
    fn test_helpers_outside_entry_are_untouched() {
        let source = "function helper(x) { return fn(x); }\nfunction fn(n) { return n; }";
        let routine = inject(source, "fn").unwrap();
        assert!(routine
            .source
            .starts_with("function helper(x) { return fn(x); }\n"));
    }

    #[test]
    fn test_nested_function_is_left_alone() {
        let source = "function fn(n) { function sq(k) { return k * k; } return sq(n); }";
        let routine = inject(source, "fn").unwrap();
        assert!(routine.source.contains("function sq(k) { return k * k; }"));
        assert!(routine.source.contains("const returnValueResult = sq(n);"));
    }

    #[test]
    fn test_return_inside_string_is_not_captured() {
        let out = capture_returns("log('return x;'); return y;");
        assert_eq!(
            out,
            "log('return x;'); { const returnValueResult = y; currentNode.returnValue = returnValueResult; return returnValueResult; }"
        );
    }

    fn captured(expr: &str) -> String {
        format!(
            "{{ const returnValueResult = {}; currentNode.returnValue = returnValueResult; return returnValueResult; }}",
            expr
        )
    }

    #[test]
    fn test_returns_without_semicolons() {
        let out = capture_returns("\n  if (n <= 1) return 1\n  return n * fn(n - 1)\n");
        assert_eq!(
            out,
            format!("\n  if (n <= 1) {}\n  {}\n", captured("1"), captured("n * fn(n - 1)"))
        );
    }

    #[test]
    fn test_return_before_closing_brace() {
        let out = capture_returns("if (a) { return a } return b");
        assert_eq!(out, format!("if (a) {{ {} }} {}", captured("a"), captured("b")));
    }

    #[test]
    fn test_multi_line_returns() {
        let out = capture_returns("return fn(n - 1) +\n    fn(n - 2);");
        assert_eq!(out, captured("fn(n - 1) +\n    fn(n - 2)"));

        let out = capture_returns("return n <= 1\n    ? n\n    : fn(n - 1);\n");
        assert_eq!(out, format!("{}\n", captured("n <= 1\n    ? n\n    : fn(n - 1)")));

        let out = capture_returns("return [\n  a,\n  b\n]\nx++");
        assert_eq!(out, format!("{}\nx++", captured("[\n  a,\n  b\n]")));
    }

    #[test]
    fn test_semicolon_inside_string() {
        assert_eq!(capture_returns("return 'a;b';"), captured("'a;b'"));
        assert_eq!(capture_returns("return \"}\" + x;"), captured("\"}\" + x"));
    }

    #[test]
    fn test_trailing_comment_stays_outside() {
        let out = capture_returns("return x // done\nreturn y; /* end */");
        assert_eq!(
            out,
            format!("{} // done\n{} /* end */", captured("x"), captured("y"))
        );
    }

    #[test]
    fn test_bare_returns_and_properties_are_left_alone() {
        for code in ["if (a) return\nf(a)", "return;", "if (a) { return }", "o.return(1);"] {
            assert_eq!(capture_returns(code), code);
        }
    }

    #[test]
    fn test_injecting_twice_keeps_a_single_prologue() {
        let once = inject("function fn(n) { return n <= 0 ? 0 : fn(n - 1); }", "fn").unwrap();
        let twice = inject(&once.source, "fn").unwrap();
        assert_eq!(once.source, twice.source);
        assert_eq!(twice.params, vec!["n"]);
    }

    #[test]
    fn test_missing_routine() {
        assert!(matches!(
            inject("const x = 1;", "fn"),
            Err(InstrumentError::RoutineNotFound { .. })
        ));
    }
}
