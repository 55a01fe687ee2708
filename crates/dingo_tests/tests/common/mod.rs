//! Shared helpers for the e2e suite.

#![allow(dead_code)]

use dingo_compile::{compile_source, CompileFailure, CompileOutput, Config, Style};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
    Style::set_enabled(false);
}

/// Compiles with the default configuration, panicking with rendered
/// diagnostics on failure.
pub fn compile_ok(source: &str) -> CompileOutput {
    compile_ok_with(source, &Config::default())
}

pub fn compile_ok_with(source: &str, config: &Config) -> CompileOutput {
    init();
    match compile_source(source, config, "test.dgo", "test.go") {
        Ok(output) => output,
        Err(failure) => panic!(
            "expected successful compile, got:\n{}",
            dingo_compile::render_all(&failure.diagnostics, source)
        ),
    }
}

/// Compiles expecting failure, returning the accumulated diagnostics.
pub fn compile_err(source: &str) -> CompileFailure {
    compile_err_with(source, &Config::default())
}

pub fn compile_err_with(source: &str, config: &Config) -> CompileFailure {
    init();
    match compile_source(source, config, "test.dgo", "test.go") {
        Ok(output) => panic!("expected failure, got output:\n{}", output.go_code),
        Err(failure) => failure,
    }
}

/// The generated Go text for a default-config compile.
pub fn go(source: &str) -> String {
    compile_ok(source).go_code
}

/// Asserts the generated Go contains every needle, with context on
/// failure.
pub fn assert_go_contains(source: &str, needles: &[&str]) {
    let code = go(source);
    for needle in needles {
        assert!(
            code.contains(needle),
            "generated Go missing {:?}:\n{}",
            needle,
            code
        );
    }
}
