//! E2E: source-map assembly, lookups, and determinism.

mod common;

use common::compile_ok;

const PROPAGATION: &str = "package main\n\nfunc readConfig(path: string) ([]byte, error) {\n\tlet data = ReadFile(path)?\n\treturn data, nil\n}\n";

// === IDENTITY MAPPINGS ===

#[test]
fn e2e_untransformed_lines_keep_identity_mappings() {
    let output = compile_ok(PROPAGATION);
    // Line 5 of the Dingo source (`return data, nil`) is untransformed
    // and must still be mapped — omission caused the historical
    // go-to-definition bug.
    assert!(
        output.source_map.forward(5).is_some(),
        "identity mapping for line 5 missing: {:?}",
        output.source_map.mappings
    );
    // The package clause maps too.
    assert!(output.source_map.forward(1).is_some());
}

#[test]
fn e2e_every_output_code_line_resolves_to_dingo_source() {
    let output = compile_ok(PROPAGATION);
    let source_lines = PROPAGATION.lines().count() as u32;
    for mapping in &output.source_map.mappings {
        assert!(
            mapping.original_line >= 1 && mapping.original_line <= source_lines,
            "mapping points outside the source: {:?}",
            mapping
        );
    }
}

// === EXPANSION MAPS BACK TO THE ? LINE ===

#[test]
fn e2e_expansion_lines_map_to_the_propagation_line() {
    let output = compile_ok(PROPAGATION);
    let go_lines: Vec<&str> = output.go_code.lines().collect();
    let guard_line = go_lines
        .iter()
        .position(|l| l.contains("if __err != nil {"))
        .expect("guard line") as u32
        + 1;
    let record = output
        .source_map
        .reverse(guard_line)
        .expect("guard line must be mapped");
    // The `?` sits on line 4 of the Dingo source.
    assert_eq!(record.original_line, 4);
}

#[test]
fn e2e_reverse_lookup_earliest_insertion_wins() {
    let output = compile_ok(PROPAGATION);
    for mapping in &output.source_map.mappings {
        let first = output.source_map.reverse(mapping.generated_line).unwrap();
        // Whatever we iterate to later can never displace the first
        // record for the same generated line.
        assert_eq!(first.generated_line, mapping.generated_line);
    }
    // At most one record per generated line.
    let mut seen = std::collections::HashSet::new();
    for mapping in &output.source_map.mappings {
        assert!(
            seen.insert((mapping.generated_line, mapping.generated_column)),
            "duplicate mapping for generated position: {:?}",
            mapping
        );
    }
}

// === SERIALIZATION ===

#[test]
fn e2e_map_json_schema() {
    let output = compile_ok(PROPAGATION);
    let json = output.source_map.to_json().unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed["version"], 1);
    assert_eq!(parsed["dingo_file"], "test.dgo");
    assert_eq!(parsed["go_file"], "test.go");
    assert!(parsed["mappings"].as_array().is_some_and(|m| !m.is_empty()));
    let first = &parsed["mappings"][0];
    for key in ["generated_line", "generated_column", "original_line", "original_column", "length"] {
        assert!(first.get(key).is_some(), "missing key {}", key);
    }
}

// === DETERMINISM ===

#[test]
fn e2e_pipeline_is_deterministic() {
    let source = "package main\n\nenum Color {\n\tRed,\n\tGreen,\n}\n\nfunc pick(c Color) Result<int, error> {\n\tmatch c {\n\t\tRed => handle(),\n\t\t_ => handle(),\n\t}\n\treturn Ok(1)\n}\n\nfunc handle() {\n}\n";
    let first = compile_ok(source);
    let second = compile_ok(source);
    assert_eq!(first.go_code, second.go_code);
    assert_eq!(
        first.source_map.to_json().unwrap(),
        second.source_map.to_json().unwrap()
    );
}

#[test]
fn e2e_injected_declarations_are_name_sorted() {
    let source = "package main\n\nenum Zebra {\n\tStripe,\n}\n\nenum Ant {\n\tWorker,\n}\n";
    let code = compile_ok(source).go_code;
    let ant = code.find("func (v Ant) IsWorker() bool").unwrap();
    let zebra = code.find("func (v Zebra) IsStripe() bool").unwrap();
    assert!(ant < zebra, "injected methods must sort by receiver name:\n{}", code);
}
