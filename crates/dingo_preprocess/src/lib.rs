//! # dingo-preprocess
//!
//! The first stage of the dingo pipeline: an ordered chain of text
//! processors that lower Dingo surface syntax into syntactically valid Go.
//!
//! # Pipeline Position
//!
//! ```text
//! Dingo Source (.dgo)
//!       │
//!       ▼
//! ┌───────────────────┐
//! │ 1. Annotations    │ param: T → param T, -> T → T
//! ├───────────────────┤
//! │ 2. Propagation    │ expr? → capture/guard/bind envelope (strict)
//! ├───────────────────┤
//! │ 3. Enums          │ enum blocks → tag/struct/constructors
//! ├───────────────────┤
//! │ 4. Match          │ match blocks → sentinel switch skeletons
//! ├───────────────────┤
//! │ 5. Generics       │ Name<A,B> → Name[A,B], Result/Option mangling
//! ├───────────────────┤
//! │ 6. Let            │ let x = v → x := v
//! ├───────────────────┤
//! │ 7. Symbols        │ ReadFile( → os.ReadFile(
//! └───────────────────┘
//!       │
//!       ▼
//! Go text + position map + descriptors
//! ```
//!
//! Each processor is pure over its input buffer and produces the next
//! stage's buffer plus a per-line position map back to stage 0. The
//! contract downstream is strict: the final buffer must parse with the
//! standard Go grammar, so every construct this crate cannot lower is
//! reported as a positioned diagnostic instead of being left behind.
//!
//! # Example
//!
//! ```
//! use dingo_preprocess::{preprocess, PreprocessOptions};
//! use dingo_base::DiagnosticBag;
//!
//! let source = "func half(n: int) -> int {\n\tlet h = n / 2\n\treturn h\n}\n";
//! let mut diags = DiagnosticBag::new();
//! let out = preprocess(source, &PreprocessOptions::default(), &mut diags);
//! assert!(diags.is_empty());
//! assert!(out.buffer.text().contains("func half(n int) int {"));
//! assert!(out.buffer.text().contains("h := n / 2"));
//! ```

pub mod buffer;
pub mod chain;
pub mod enums;
pub mod error_prop;
pub mod funcs;
pub mod generics;
pub mod keywords;
pub mod pattern;
pub mod scan;
pub mod symbols;
pub mod type_ann;

pub use buffer::SourceBuffer;
pub use chain::{
    run_chain as preprocess, ErrorSyntax, MatchSyntax, PassContext, PreprocessOptions,
    PreprocessOutput, Processor,
};
pub use enums::{EnumDescriptor, VariantDescriptor, VariantKind};
pub use funcs::{zero_value, FunctionContext};
pub use generics::{OptionInstance, ResultInstance};

#[cfg(test)]
mod tests {
    use super::*;
    use dingo_base::DiagnosticBag;

    #[test]
    fn full_chain_scenario_simple_propagation() {
        let source = "func readConfig(path: string) ([]byte, error) {\n\tlet data = ReadFile(path)?\n\treturn data, nil\n}\n";
        let mut diags = DiagnosticBag::new();
        let out = preprocess(source, &PreprocessOptions::default(), &mut diags);
        assert!(diags.is_empty(), "diagnostics: {:?}", diags.iter().collect::<Vec<_>>());
        let text = out.buffer.text();
        assert!(text.contains("func readConfig(path string) ([]byte, error) {"));
        assert!(text.contains("// dingo:s:1"));
        assert!(text.contains("__tmp0, __err := os.ReadFile(path)"));
        assert!(text.contains("\t\treturn nil, __err"));
        assert!(text.contains("\tdata := __tmp0"));
        assert!(text.contains("// dingo:e:1"));
        assert!(out.imports.contains("os"));
    }

    #[test]
    fn full_chain_enum_and_match() {
        let source = "enum Color {\n\tRed,\n\tGreen,\n}\n\nfunc show(c Color) {\n\tmatch c {\n\t\tRed => Println(\"red\"),\n\t\t_ => Println(\"other\"),\n\t}\n}\n";
        let mut diags = DiagnosticBag::new();
        let out = preprocess(source, &PreprocessOptions::default(), &mut diags);
        assert!(diags.is_empty(), "diagnostics: {:?}", diags.iter().collect::<Vec<_>>());
        let text = out.buffer.text();
        assert!(text.contains("type ColorTag uint8"));
        assert!(text.contains("// DINGO_MATCH_START mode=stmt scrutinee=c"));
        assert!(text.contains("fmt.Println(\"red\")"));
        assert_eq!(out.enums.len(), 1);
    }

    #[test]
    fn map_length_matches_buffer_at_every_stage() {
        let source = "func f() (int, error) {\n\tlet a = g()?\n\treturn a, nil\n}\n";
        let mut diags = DiagnosticBag::new();
        let out = preprocess(source, &PreprocessOptions::default(), &mut diags);
        assert_eq!(out.map.len(), out.buffer.line_count());
    }

    #[test]
    fn identity_lines_stay_identity() {
        let source = "func f() (int, error) {\n\tlet a = g()?\n\treturn a, nil\n}\n";
        let mut diags = DiagnosticBag::new();
        let out = preprocess(source, &PreprocessOptions::default(), &mut diags);
        // The closing brace never changed; its mapping must still exist
        // and be an identity record.
        let last = out.map.origin(out.buffer.line_count() as u32).unwrap();
        assert!(!last.transformed);
        assert_eq!(last.line, 4);
    }

    #[test]
    fn strict_abort_stops_the_chain() {
        let source = "let x = f()?\n";
        let mut diags = DiagnosticBag::new();
        let out = preprocess(source, &PreprocessOptions::default(), &mut diags);
        assert!(out.aborted);
        assert!(diags.has_errors());
    }
}
