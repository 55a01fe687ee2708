//! E2E: enum lowering to tagged structs.

mod common;

use common::{assert_go_contains, compile_err};
use dingo_base::DiagnosticKind;

// === UNIT VARIANTS ===

#[test]
fn e2e_unit_enum_scaffolding() {
    let source = "package main\n\nenum Color {\n\tRed,\n\tGreen,\n\tBlue,\n}\n";
    assert_go_contains(
        source,
        &[
            "type ColorTag uint8",
            "ColorTagRed ColorTag = iota",
            "ColorTagGreen",
            "ColorTagBlue",
            "type Color struct {",
            "tag ColorTag",
            "func Color_Red() Color {",
            "return Color{tag: ColorTagRed}",
        ],
    );
}

#[test]
fn e2e_single_unit_variant_gets_predicate() {
    let source = "package main\n\nenum Marker {\n\tPresent,\n}\n";
    assert_go_contains(
        source,
        &[
            "func (v Marker) IsPresent() bool {",
            "return v.tag == MarkerTagPresent",
        ],
    );
}

// === TUPLE VARIANTS ===

#[test]
fn e2e_tuple_variant_pointer_fields_scenario() {
    let source = "package main\n\nenum Value {\n\tInt(int),\n\tStr(string),\n}\n\nfunc mk() Value {\n\treturn Value_Int(5)\n}\n";
    assert_go_contains(
        source,
        &[
            "int0 *int",
            "str0 *string",
            "func Value_Int(a0 int) Value {",
            "return Value{tag: ValueTagInt, int0: &a0}",
            "func (v Value) IsInt() bool {",
            "func (v Value) IsStr() bool {",
        ],
    );
}

// === STRUCT VARIANTS ===

#[test]
fn e2e_struct_variant_constructor_uses_field_names() {
    let source = "package main\n\nenum Shape {\n\tCircle{radius: float64},\n\tRectangle{width: float64, height: float64},\n}\n";
    assert_go_contains(
        source,
        &[
            "circle0 *float64",
            "rectangle0 *float64",
            "rectangle1 *float64",
            "func Shape_Circle(radius float64) Shape {",
            "func Shape_Rectangle(width float64, height float64) Shape {",
        ],
    );
}

// === PREDICATES ARE INJECTED AFTER IMPORTS ===

#[test]
fn e2e_injected_declarations_precede_user_code() {
    let source = "package main\n\nenum Color {\n\tRed,\n}\n\nfunc use(c Color) bool {\n\treturn c.IsRed()\n}\n";
    let code = common::go(source);
    let is_red = code.find("func (v Color) IsRed() bool").expect("predicate");
    let user = code.find("func use(c Color) bool").expect("user func");
    assert!(is_red < user, "injected declarations must precede user code:\n{}", code);
}

// === BOUNDARY CASES ===

#[test]
fn e2e_empty_enum_is_exactly_one_error_and_no_output() {
    let failure = compile_err("package main\n\nenum Nothing {\n}\n");
    let empties: Vec<_> = failure
        .diagnostics
        .iter()
        .filter(|d| matches!(d.kind, DiagnosticKind::EmptyEnum { .. }))
        .collect();
    assert_eq!(empties.len(), 1);
}

#[test]
fn e2e_unbalanced_enum_reports_braces() {
    let failure = compile_err("package main\n\nenum Broken {\n\tRed,\n");
    assert!(failure
        .diagnostics
        .iter()
        .any(|d| matches!(d.kind, DiagnosticKind::UnbalancedBraces { construct: "enum" })));
}

#[test]
fn e2e_enum_payload_may_use_option_types() {
    let source = "package main\n\nenum Node {\n\tLeaf(int),\n\tIndirect(Option<int>),\n}\n";
    assert_go_contains(
        source,
        &[
            "indirect0 *Option_int",
            "type Option_int struct {",
            "func Option_int_Some(v int) Option_int {",
        ],
    );
}
