//! Nesting-aware splitting of comma-separated parameter and argument lists

use crate::interpreter::constants::{is_tracking_param, DEPTH_PARAM, NODE_VAR};

/// Split a parameter or argument list on its top-level commas.
///
/// Commas nested inside `()`, `[]`, `{}` or a quoted string do not split.
/// Each piece is trimmed. An empty or blank list yields no pieces, and a
/// trailing comma does not produce an empty last piece.
pub fn split_parameters(list: &str) -> Vec<String> {
    if list.trim().is_empty() {
        return Vec::new();
    }

    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut nesting: i32 = 0;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for c in list.chars() {
        if let Some(q) = quote {
            current.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }

        match c {
            '"' | '\'' | '`' => {
                quote = Some(c);
                current.push(c);
            }
            '(' | '[' | '{' => {
                nesting += 1;
                current.push(c);
            }
            ')' | ']' | '}' => {
                nesting -= 1;
                current.push(c);
            }
            ',' if nesting == 0 => {
                pieces.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }

    let last = current.trim();
    if !last.is_empty() {
        pieces.push(last.to_string());
    }

    pieces
}

/// Name part of a declared parameter (`n = 3` → `n`)
pub fn parameter_name(param: &str) -> &str {
    param.split('=').next().unwrap_or(param).trim()
}

/// Whether an argument or parameter is one of the tracking pair, in either
/// its declared form or the form the call-site rewriter appends
pub fn is_tracking_argument(arg: &str) -> bool {
    let compact: String = arg.chars().filter(|c| !c.is_whitespace()).collect();
    is_tracking_param(parameter_name(arg))
        || compact == format!("{}+1", DEPTH_PARAM)
        || compact == NODE_VAR
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_list() {
        assert_eq!(split_parameters("a, b ,c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_nested_calls_do_not_split() {
        assert_eq!(split_parameters("f(1,2), g(3,4)"), vec!["f(1,2)", "g(3,4)"]);
        assert_eq!(
            split_parameters("arr = [1, 2], memo = {a: 1, b: 2}"),
            vec!["arr = [1, 2]", "memo = {a: 1, b: 2}"]
        );
    }

    #[test]
    fn test_strings_are_opaque() {
        assert_eq!(split_parameters("'a,b', \"(\""), vec!["'a,b'", "\"(\""]);
    }

    #[test]
    fn test_empty_and_trailing() {
        assert!(split_parameters("").is_empty());
        assert!(split_parameters("   ").is_empty());
        assert_eq!(split_parameters("a, b,"), vec!["a", "b"]);
        assert_eq!(split_parameters("a,,b"), vec!["a", "", "b"]);
    }

    #[test]
    fn test_k_commas_give_k_plus_one() {
        for k in 0..6 {
            let list = (0..=k).map(|i| format!("p{}", i)).collect::<Vec<_>>().join(",");
            assert_eq!(split_parameters(&list).len(), k + 1);
        }
    }

    #[test]
    fn test_tracking_arguments() {
        assert!(is_tracking_argument("depthRecursionGraph + 1"));
        assert!(is_tracking_argument("currentNode"));
        assert!(is_tracking_argument("depthRecursionGraph = 0"));
        assert!(is_tracking_argument("parentNodeRecursionGraph = null"));
        assert!(!is_tracking_argument("n - 1"));
        assert!(!is_tracking_argument("currentNodes"));
    }
}
