// Integration tests for the textual instrumentation pipeline

use rectrace::instrument::{
    augment_signature, rewrite_recursive_calls, split_parameters, InstrumentError, Instrumenter,
};
use rectrace::parser::Parser;

#[test]
fn test_split_respects_nesting() {
    assert_eq!(split_parameters("f(1,2), g(3,4)"), vec!["f(1,2)", "g(3,4)"]);
    assert_eq!(
        split_parameters("a = [1, 2], b = { x: 1, y: 2 }, c"),
        vec!["a = [1, 2]", "b = { x: 1, y: 2 }", "c"]
    );
    assert!(split_parameters("").is_empty());
}

#[test]
fn test_split_count_matches_top_level_commas() {
    for list in ["a", "a, b", "a, b, c", "x, [y, z], q(r, s), t"] {
        let depth_zero_commas = {
            let mut depth = 0i32;
            list.chars()
                .filter(|&c| {
                    match c {
                        '(' | '[' | '{' => depth += 1,
                        ')' | ']' | '}' => depth -= 1,
                        _ => {}
                    }
                    c == ',' && depth == 0
                })
                .count()
        };
        assert_eq!(split_parameters(list).len(), depth_zero_commas + 1, "{}", list);
    }
}

#[test]
fn test_signature_augmentation_is_idempotent() {
    let source = "function fn(n, memo = {}) {\n  return n;\n}";
    let once = augment_signature(source, "fn").expect("declaration present");
    let twice = augment_signature(&once, "fn").expect("declaration present");
    assert_eq!(once, twice);
    assert!(once.starts_with(
        "function fn(n, memo = {}, depthRecursionGraph = 0, parentNodeRecursionGraph = null)"
    ));
}

#[test]
fn test_call_rewriting_is_idempotent() {
    let body = "return fn(n - 1) + fn(fn(n - 2));";
    let once = rewrite_recursive_calls(body, "fn", Some(1));
    assert_eq!(once, rewrite_recursive_calls(&once, "fn", Some(1)));
    assert_eq!(once.matches("currentNode").count(), 3);
}

#[test]
fn test_instrumentation_is_idempotent() {
    let source = include_str!("../demos/fibonacci.js");
    let instrumenter = Instrumenter::default();
    let once = instrumenter.instrument(source).expect("first pass");
    let twice = instrumenter.instrument(&once.source).expect("second pass");
    assert_eq!(once.source, twice.source);
    assert_eq!(twice.params, vec!["n"]);
}

#[test]
fn test_instrumented_text_parses() {
    for source in [
        include_str!("../demos/fibonacci.js"),
        include_str!("../demos/factorial.js"),
        include_str!("../demos/subsets.js"),
        include_str!("../demos/memo_fib.js"),
        include_str!("../demos/hanoi.js"),
    ] {
        let routine = Instrumenter::default()
            .instrument(source)
            .expect("demo routines declare fn");
        Parser::new(&routine.source)
            .and_then(|mut parser| parser.parse_program())
            .unwrap_or_else(|e| panic!("{}\n---\n{}", e, routine.source));
    }
}

#[test]
fn test_every_return_is_captured() {
    let routine = Instrumenter::default()
        .instrument(include_str!("../demos/memo_fib.js"))
        .expect("memo_fib declares fn");
    assert_eq!(routine.source.matches("currentNode.returnValue = ").count(), 3);
    assert!(routine.source.starts_with("// rectrace demos/memo_fib.js"));
    assert!(routine.source.contains("const memo = {};"));
}

#[test]
fn test_returns_in_every_form_are_captured() {
    let source = "function fn(n) {\n  if (n === 0) return 'a;b'\n  if (n === 1) return fn(n - 1) +\n    'c'\n  return fn(n - 1); // tail\n}\n";
    let routine = Instrumenter::default()
        .instrument(source)
        .expect("routine declares fn");

    assert_eq!(routine.source.matches("currentNode.returnValue = ").count(), 3);
    assert!(routine.source.contains("const returnValueResult = 'a;b';"));
    assert!(routine.source.contains(
        "const returnValueResult = fn(n - 1, depthRecursionGraph + 1, currentNode) +\n    'c';"
    ));
    assert!(routine.source.contains("return returnValueResult; } // tail"));
    Parser::new(&routine.source)
        .and_then(|mut parser| parser.parse_program())
        .unwrap_or_else(|e| panic!("{}\n---\n{}", e, routine.source));
}

#[test]
fn test_missing_declaration() {
    let err = Instrumenter::default()
        .instrument("function fib(n) { return n; }")
        .unwrap_err();
    assert_eq!(err, InstrumentError::RoutineNotFound { name: "fn".into() });
}
