//! E2E: the line-level surface rewrites — type annotations, `let`,
//! generic brackets, unqualified stdlib symbols.

mod common;

use common::assert_go_contains;

// === TYPE ANNOTATIONS ===

#[test]
fn e2e_colon_annotations_become_native_params() {
    let source = "package main\n\nfunc greet(name: string, times: int) string {\n\treturn name\n}\n";
    assert_go_contains(source, &["func greet(name string, times int) string {"]);
}

#[test]
fn e2e_arrow_return_types_are_rewritten() {
    let source = "package main\n\nfunc area(r: float64) -> float64 {\n\treturn r * r\n}\n";
    assert_go_contains(source, &["func area(r float64) float64 {"]);
}

#[test]
fn e2e_multi_line_signatures_are_buffered() {
    let source = "package main\n\nfunc join(\n\tleft: string,\n\tright: string,\n) -> string {\n\treturn left + right\n}\n";
    assert_go_contains(source, &["left string,", "right string,", ") string {"]);
}

#[test]
fn e2e_map_literal_colons_are_untouched() {
    let source = "package main\n\nfunc f() map[string]int {\n\treturn map[string]int{\"a\": 1, \"b\": 2}\n}\n";
    assert_go_contains(source, &["map[string]int{\"a\": 1, \"b\": 2}"]);
}

// === LET BINDINGS ===

#[test]
fn e2e_let_becomes_short_declaration() {
    let source = "package main\n\nfunc f() int {\n\tlet x = 41\n\treturn x + 1\n}\n";
    assert_go_contains(source, &["x := 41"]);
}

#[test]
fn e2e_annotated_let_becomes_var() {
    let source = "package main\n\nfunc f() int {\n\tlet x: int = 41\n\treturn x\n}\n";
    assert_go_contains(source, &["var x int = 41"]);
}

#[test]
fn e2e_identifiers_containing_let_survive() {
    let source = "package main\n\nfunc f() string {\n\toutlet := \"power\"\n\treturn outlet\n}\n";
    assert_go_contains(source, &["outlet := \"power\""]);
}

// === GENERIC BRACKETS ===

#[test]
fn e2e_generic_brackets_become_square() {
    let source = "package main\n\nfunc f(p Pair<int, string>) int {\n\treturn p.First()\n}\n";
    assert_go_contains(source, &["func f(p Pair[int, string]) int {"]);
}

#[test]
fn e2e_comparisons_survive_the_generic_rewrite() {
    let source = "package main\n\nfunc f(Count int, x int) bool {\n\treturn Count < 10 && x > 2\n}\n";
    assert_go_contains(source, &["return Count < 10 && x > 2"]);
}

// === UNQUALIFIED SYMBOLS ===

#[test]
fn e2e_stdlib_calls_are_qualified_with_imports() {
    let source = "package main\n\nfunc f(n int) string {\n\tPrintln(\"value\")\n\treturn Itoa(n)\n}\n";
    assert_go_contains(
        source,
        &["fmt.Println(\"value\")", "strconv.Itoa(n)", "\"fmt\"", "\"strconv\""],
    );
}

#[test]
fn e2e_local_definitions_shadow_the_stdlib_table() {
    let source = "package main\n\nfunc Println(s string) {\n}\n\nfunc f() {\n\tPrintln(\"local\")\n}\n";
    let code = common::go(source);
    assert!(code.contains("\tPrintln(\"local\")"));
    assert!(!code.contains("fmt.Println"), "local definition must win:\n{}", code);
}

#[test]
fn e2e_selector_calls_are_never_requalified() {
    let source = "package main\n\ntype Logger struct {\n\tprefix string\n}\n\nfunc (l Logger) Println(s string) {\n}\n\nfunc f(l Logger) {\n\tl.Println(\"x\")\n}\n";
    let code = common::go(source);
    assert!(code.contains("l.Println(\"x\")"));
    assert!(!code.contains("l.fmt.Println"));
}

// === PLAIN GO PASSES THROUGH ===

#[test]
fn e2e_plain_go_round_trips() {
    let source = "package main\n\nimport \"fmt\"\n\nfunc main() {\n\tfor i := 0; i < 3; i++ {\n\t\tfmt.Println(i)\n\t}\n}\n";
    let code = common::go(source);
    assert_eq!(code, source);
}
