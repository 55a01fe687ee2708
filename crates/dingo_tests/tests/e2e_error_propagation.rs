//! E2E: error-propagation expansion (`?`).

mod common;

use common::{assert_go_contains, compile_err, compile_ok};
use dingo_base::DiagnosticKind;
use dingo_compile::{Config, ErrorPropSyntax};

// === SIMPLE PROPAGATION ===

#[test]
fn e2e_simple_propagation_scenario() {
    let source = "package main\n\nfunc readConfig(path: string) ([]byte, error) {\n\tlet data = ReadFile(path)?\n\treturn data, nil\n}\n";
    assert_go_contains(
        source,
        &[
            "func readConfig(path string) ([]byte, error) {",
            "// dingo:s:1",
            "__tmp0, __err := os.ReadFile(path)",
            "if __err != nil {",
            "return nil, __err",
            "data := __tmp0",
            "// dingo:e:1",
            "return data, nil",
            "import \"os\"",
        ],
    );
}

#[test]
fn e2e_generated_envelope_parses_and_reformats_stably() {
    let source = "package main\n\nfunc readConfig(path: string) ([]byte, error) {\n\tlet data = ReadFile(path)?\n\treturn data, nil\n}\n";
    let first = compile_ok(source).go_code;
    let second = compile_ok(source).go_code;
    assert_eq!(first, second);
}

// === WRAPPED ERROR ===

#[test]
fn e2e_wrapped_error_uses_errorf_and_imports_fmt() {
    let source = "package main\n\nfunc readConfig(path: string) ([]byte, error) {\n\tlet data = ReadFile(path)? \"failed to read config\"\n\treturn data, nil\n}\n";
    assert_go_contains(
        source,
        &[
            "fmt.Errorf(\"failed to read config: %w\", __err)",
            "\"fmt\"",
            "\"os\"",
        ],
    );
}

#[test]
fn e2e_wrapped_error_handles_embedded_quotes() {
    let source = "package main\n\nfunc f() (int, error) {\n\tlet n = parse()? \"bad \\\"config\\\" file\"\n\treturn n, nil\n}\n\nfunc parse() (int, error) {\n\treturn 0, nil\n}\n";
    assert_go_contains(source, &["fmt.Errorf(\"bad \\\"config\\\" file: %w\", __err)"]);
}

// === ERROR-ONLY CALLS ===

#[test]
fn e2e_error_only_call_binds_no_tmp() {
    let source = "package main\n\nfunc save(path: string) error {\n\twriteAll(path)?\n\treturn nil\n}\n\nfunc writeAll(path: string) error {\n\treturn nil\n}\n";
    let code = common::go(source);
    assert!(code.contains("__err0 := writeAll(path)"));
    assert!(!code.contains("__tmp"), "error-only call must bind no __tmpN:\n{}", code);
    assert!(code.contains("return __err0"));
}

// === RETURN CONTEXT ===

#[test]
fn e2e_return_context_rebuilds_value_tuple() {
    let source = "package main\n\nfunc load(path: string) (string, error) {\n\treturn fetch(path)?\n}\n\nfunc fetch(path: string) (string, error) {\n\treturn \"\", nil\n}\n";
    assert_go_contains(
        source,
        &[
            "__tmp0, __err := fetch(path)",
            "return \"\", __err",
            "return __tmp0, nil",
        ],
    );
}

// === ZERO VALUES ===

#[test]
fn e2e_guard_zero_values_match_return_types() {
    let source = "package main\n\ntype Config struct {\n\tname string\n}\n\nfunc f() (int, string, *Config, []byte, map[string]int, Config, error) {\n\tlet a, b, c, d, e, g = produce()?\n\treturn a, b, c, d, e, g, nil\n}\n\nfunc produce() (int, string, *Config, []byte, map[string]int, Config, error) {\n\treturn 0, \"\", nil, nil, nil, Config{}, nil\n}\n";
    assert_go_contains(
        source,
        &["return 0, \"\", nil, nil, nil, Config{}, __err"],
    );
}

// === COUNTERS ===

#[test]
fn e2e_counters_are_monotonic_per_file() {
    let source = "package main\n\nfunc f() (int, error) {\n\tlet a = g()?\n\tlet b = g()?\n\treturn a + b, nil\n}\n\nfunc g() (int, error) {\n\treturn 1, nil\n}\n";
    assert_go_contains(
        source,
        &["__tmp0", "__tmp1", "// dingo:s:1", "// dingo:e:1", "// dingo:s:2", "// dingo:e:2"],
    );
}

// === DIAGNOSTICS ===

#[test]
fn e2e_propagation_outside_function_fails() {
    let failure = compile_err("package main\n\nlet x = f()?\n");
    assert!(failure
        .diagnostics
        .iter()
        .any(|d| matches!(d.kind, DiagnosticKind::PropagationOutsideFunction)));
}

#[test]
fn e2e_propagation_from_non_error_function_fails() {
    let failure = compile_err(
        "package main\n\nfunc pure(n: int) int {\n\tlet x = half(n)?\n\treturn x\n}\n",
    );
    assert!(!failure.diagnostics.is_empty());
}

#[test]
fn e2e_message_on_non_call_fails() {
    let failure = compile_err(
        "package main\n\nfunc f() (int, error) {\n\tlet x = value? \"oops\"\n\treturn x, nil\n}\n",
    );
    assert!(failure
        .diagnostics
        .iter()
        .any(|d| matches!(d.kind, DiagnosticKind::MessageOnNonErrorCall)));
}

// === ALTERNATE SURFACE SYNTAX ===

#[test]
fn e2e_bang_syntax() {
    let mut config = Config::default();
    config.error_propagation_syntax = ErrorPropSyntax::Bang;
    let source = "package main\n\nfunc f() (bool, error) {\n\tlet ok = check()!\n\treturn !ok, nil\n}\n\nfunc check() (bool, error) {\n\treturn true, nil\n}\n";
    let output = common::compile_ok_with(source, &config);
    assert!(output.go_code.contains("__tmp0, __err := check()"));
    assert!(output.go_code.contains("return !ok, nil"));
}

#[test]
fn e2e_try_syntax() {
    let mut config = Config::default();
    config.error_propagation_syntax = ErrorPropSyntax::Try;
    let source = "package main\n\nfunc f() (int, error) {\n\tlet n = try parse(\"5\")\n\treturn n, nil\n}\n\nfunc parse(s: string) (int, error) {\n\treturn 5, nil\n}\n";
    let output = common::compile_ok_with(source, &config);
    assert!(output.go_code.contains("__tmp0, __err := parse(\"5\")"));
}

#[test]
fn e2e_fresh_err_names_when_reuse_disabled() {
    let mut config = Config::default();
    config.reuse_err_variable = false;
    let source = "package main\n\nfunc f() (int, error) {\n\tlet a = g()?\n\tlet b = g()?\n\treturn a + b, nil\n}\n\nfunc g() (int, error) {\n\treturn 1, nil\n}\n";
    let output = common::compile_ok_with(source, &config);
    assert!(output.go_code.contains("__err0"));
    assert!(output.go_code.contains("__err1"));
}
