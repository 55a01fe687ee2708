//! E2E: match validation and rewriting.

mod common;

use common::{assert_go_contains, compile_err, compile_ok_with};
use dingo_base::DiagnosticKind;
use dingo_compile::{Config, NilSafety};

const VALUE_ENUM: &str = "enum Value {\n\tInt(int),\n\tStr(string),\n}\n";

fn with_value_enum(body: &str) -> String {
    format!("package main\n\n{}\n{}", VALUE_ENUM, body)
}

// === TAG SWITCH REWRITE ===

#[test]
fn e2e_match_rewrites_to_tag_switch() {
    let source = with_value_enum(
        "func describe(v Value) {\n\tmatch v {\n\t\tInt(n) => consume(n),\n\t\tStr(s) => consumeStr(s),\n\t}\n}\n\nfunc consume(n int) {\n}\n\nfunc consumeStr(s string) {\n}\n",
    );
    assert_go_contains(
        &source,
        &[
            "// DINGO_MATCH_START mode=stmt scrutinee=v",
            "switch v.tag {",
            "case ValueTagInt:",
            "n := *v.int0",
            "case ValueTagStr:",
            "s := *v.str0",
            "// DINGO_MATCH_END",
        ],
    );
}

#[test]
fn e2e_match_accepts_constructor_style_patterns() {
    let source = with_value_enum(
        "func describe(v Value) {\n\tmatch v {\n\t\tValue_Int(n) => consume(n),\n\t\t_ => skip(),\n\t}\n}\n\nfunc consume(n int) {\n}\n\nfunc skip() {\n}\n",
    );
    assert_go_contains(&source, &["case ValueTagInt:", "n := *v.int0", "default:"]);
}

// === NIL SAFETY MODES ===

#[test]
fn e2e_nil_safety_on_guards_dereference() {
    let source = with_value_enum(
        "func f(v Value) {\n\tmatch v {\n\t\tInt(n) => consume(n),\n\t\t_ => skip(),\n\t}\n}\n\nfunc consume(n int) {\n}\n\nfunc skip() {\n}\n",
    );
    assert_go_contains(
        &source,
        &[
            "if v.int0 == nil {",
            "panic(\"match binding Int: nil payload\")",
        ],
    );
}

#[test]
fn e2e_nil_safety_off_emits_no_guard() {
    let mut config = Config::default();
    config.nil_safety_checks = NilSafety::Off;
    let source = with_value_enum(
        "func f(v Value) {\n\tmatch v {\n\t\tInt(n) => consume(n),\n\t\t_ => skip(),\n\t}\n}\n\nfunc consume(n int) {\n}\n\nfunc skip() {\n}\n",
    );
    let code = compile_ok_with(&source, &config).go_code;
    assert!(!code.contains("nil payload"), "off mode must not guard:\n{}", code);
    assert!(code.contains("n := *v.int0"));
}

#[test]
fn e2e_nil_safety_debug_gates_on_flag() {
    let mut config = Config::default();
    config.nil_safety_checks = NilSafety::Debug;
    let source = with_value_enum(
        "func f(v Value) {\n\tmatch v {\n\t\tInt(n) => consume(n),\n\t\t_ => skip(),\n\t}\n}\n\nfunc consume(n int) {\n}\n\nfunc skip() {\n}\n",
    );
    let code = compile_ok_with(&source, &config).go_code;
    assert!(code.contains("if __dingoDebug && v.int0 == nil {"));
    assert!(code.contains("var __dingoDebug = os.Getenv(\"DINGO_DEBUG\") != \"\""));
    assert!(code.contains("\"os\""));
}

// === EXHAUSTIVENESS ===

#[test]
fn e2e_non_exhaustive_match_scenario() {
    let source = "package main\n\nfunc check(r Result<int, error>) {\n\tmatch r {\n\t\tOk(x) => consume(x),\n\t}\n}\n\nfunc consume(x int) {\n}\n";
    let failure = compile_err(source);
    let missing: Vec<_> = failure
        .diagnostics
        .iter()
        .filter(|d| matches!(&d.kind, DiagnosticKind::NonExhaustiveMatch { missing } if missing == &vec!["Err".to_string()]))
        .collect();
    assert_eq!(missing.len(), 1, "expected exactly the Err-missing diagnostic");
    assert!(failure.diagnostics[0].hint.as_deref().unwrap_or("").contains("wildcard"));
}

#[test]
fn e2e_wildcard_closes_any_match() {
    let source = with_value_enum(
        "func f(v Value) {\n\tmatch v {\n\t\tInt(n) => consume(n),\n\t\t_ => skip(),\n\t}\n}\n\nfunc consume(n int) {\n}\n\nfunc skip() {\n}\n",
    );
    common::compile_ok(&source);
}

#[test]
fn e2e_guarded_arm_does_not_cover_its_variant() {
    let source = with_value_enum(
        "func f(v Value) {\n\tmatch v {\n\t\tInt(n) if n > 0 => consume(n),\n\t\tStr(s) => consumeStr(s),\n\t}\n}\n\nfunc consume(n int) {\n}\n\nfunc consumeStr(s string) {\n}\n",
    );
    let failure = compile_err(&source);
    assert!(failure
        .diagnostics
        .iter()
        .any(|d| matches!(&d.kind, DiagnosticKind::NonExhaustiveMatch { missing } if missing.contains(&"Int".to_string()))));
}

// === GUARDS ===

#[test]
fn e2e_guard_becomes_condition_switch() {
    let source = with_value_enum(
        "func f(v Value) {\n\tmatch v {\n\t\tInt(n) if n > 0 => consume(n),\n\t\tInt(n) => consume(n),\n\t\tStr(s) => consumeStr(s),\n\t}\n}\n\nfunc consume(n int) {\n}\n\nfunc consumeStr(s string) {\n}\n",
    );
    assert_go_contains(
        &source,
        &["case v.tag == ValueTagInt && ((*v.int0) > 0):"],
    );
}

#[test]
fn e2e_guard_on_wildcard_is_an_error() {
    let source = with_value_enum(
        "func f(v Value) {\n\tmatch v {\n\t\t_ if true => skip(),\n\t\t_ => skip(),\n\t}\n}\n\nfunc skip() {\n}\n",
    );
    let failure = compile_err(&source);
    assert!(failure
        .diagnostics
        .iter()
        .any(|d| matches!(d.kind, DiagnosticKind::GuardOnWildcard)));
}

// === DUPLICATES AND UNSUPPORTED PATTERNS ===

#[test]
fn e2e_duplicate_arm_is_an_error() {
    let source = with_value_enum(
        "func f(v Value) {\n\tmatch v {\n\t\tInt(n) => consume(n),\n\t\tInt(m) => consume(m),\n\t\tStr(s) => consumeStr(s),\n\t}\n}\n\nfunc consume(n int) {\n}\n\nfunc consumeStr(s string) {\n}\n",
    );
    let failure = compile_err(&source);
    assert!(failure
        .diagnostics
        .iter()
        .any(|d| matches!(&d.kind, DiagnosticKind::DuplicateArm { variant } if variant == "Int")));
}

#[test]
fn e2e_literal_patterns_are_unsupported() {
    let source = with_value_enum(
        "func f(v Value) {\n\tmatch v {\n\t\t1 => one(),\n\t\t_ => skip(),\n\t}\n}\n\nfunc one() {\n}\n\nfunc skip() {\n}\n",
    );
    let failure = compile_err(&source);
    assert!(failure
        .diagnostics
        .iter()
        .any(|d| matches!(d.kind, DiagnosticKind::UnsupportedPattern { .. })));
}

#[test]
fn e2e_unknown_variant_is_a_pattern_mismatch() {
    let source = with_value_enum(
        "func f(v Value) {\n\tmatch v {\n\t\tFloat(x) => consume(x),\n\t\t_ => skip(),\n\t}\n}\n\nfunc consume(n int) {\n}\n\nfunc skip() {\n}\n",
    );
    let failure = compile_err(&source);
    assert!(failure
        .diagnostics
        .iter()
        .any(|d| matches!(d.kind, DiagnosticKind::PatternTypeMismatch { .. })));
}

// === EXPRESSION CONTEXT ===

#[test]
fn e2e_expression_match_scenario() {
    let source = "package main\n\nenum Shape {\n\tCircle{radius: float64},\n\tRectangle{width: float64, height: float64},\n}\n\nfunc area(shape Shape) float64 {\n\tlet area: float64 = match shape {\n\t\tCircle{radius} => 3.14 * radius * radius,\n\t\tRectangle{width, height} => width * height,\n\t}\n\treturn area\n}\n";
    assert_go_contains(
        source,
        &[
            "var area float64 = func() float64 {",
            "switch shape.tag {",
            "case ShapeTagCircle:",
            "radius := *shape.circle0",
            "return 3.14 * radius * radius",
            "case ShapeTagRectangle:",
            "return width * height",
            "panic(\"unreachable: non-exhaustive match\")",
            "}()",
        ],
    );
}

#[test]
fn e2e_expression_match_over_unknown_type_requires_wildcard() {
    let source = "package main\n\nfunc pick(n int) int {\n\tlet x = match mystery() {\n\t\t_ => n,\n\t}\n\t_ = x\n\treturn n\n}\n";
    // `mystery` is undeclared, so the scrutinee type is unknown; the
    // wildcard-only match must still compile structurally, and the
    // scrutinee still gets evaluated.
    let output = common::compile_ok(source);
    assert!(output.go_code.contains("switch mystery(); {"));
}

// === TUPLE SCRUTINEES ===

#[test]
fn e2e_tuple_match_cartesian_coverage() {
    let source = "package main\n\nfunc f(a Result<int, error>, b Result<int, error>) {\n\tmatch (a, b) {\n\t\t(Ok(x), Ok(y)) => both(x, y),\n\t\t(Ok(x), Err(e)) => first(x, e),\n\t\t(Err(e), _) => second(e),\n\t}\n}\n\nfunc both(x int, y int) {\n}\n\nfunc first(x int, e error) {\n}\n\nfunc second(e error) {\n}\n";
    assert_go_contains(
        source,
        &[
            "case a.tag == Result_int_errorTagOk && b.tag == Result_int_errorTagOk:",
            "x := *a.ok0",
            "y := *b.ok0",
        ],
    );
}

#[test]
fn e2e_tuple_match_missing_combination_fails() {
    let source = "package main\n\nfunc f(a Result<int, error>, b Result<int, error>) {\n\tmatch (a, b) {\n\t\t(Ok(x), Ok(y)) => both(x, y),\n\t\t(Err(e), _) => second(e),\n\t}\n}\n\nfunc both(x int, y int) {\n}\n\nfunc second(e error) {\n}\n";
    let failure = compile_err(source);
    assert!(failure
        .diagnostics
        .iter()
        .any(|d| matches!(&d.kind, DiagnosticKind::NonExhaustiveMatch { missing } if missing.iter().any(|m| m.contains("Ok, Err")))));
}

// === CONSECUTIVE MATCHES ===

#[test]
fn e2e_consecutive_matches_stay_separate() {
    let source = with_value_enum(
        "func f(v Value, w Value) {\n\tmatch v {\n\t\t_ => skip(),\n\t}\n\tmatch w {\n\t\t_ => skip(),\n\t}\n}\n\nfunc skip() {\n}\n",
    );
    let code = common::go(&source);
    assert_eq!(code.matches("// DINGO_MATCH_START").count(), 2);
    assert_eq!(code.matches("// DINGO_MATCH_END").count(), 2);
}
