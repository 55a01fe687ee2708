//! Processor 1: colon type annotations and arrow return types.
//!
//! Rewrites `param: Type` to `param Type` inside parameter lists, and the
//! `) -> ReturnType {` arrow form to native `) ReturnType {`. The rewrite
//! only activates between the parentheses that follow a `func` token (and
//! in the return segment after them), so colons in composite literals,
//! maps, and labels are untouched. Parameter lists spanning multiple lines
//! stay active until the closing parenthesis.

use crate::buffer::SourceBuffer;
use crate::chain::{derive_origin, origin_of, PassContext, Processor};
use crate::scan;
use dingo_base::{Diagnostic, DiagnosticKind, PosMap};

pub struct TypeAnnotationProcessor;

/// Rewrite state carried across lines for multi-line parameter lists.
#[derive(Default)]
struct SigState {
    /// Paren depth of an open parameter list; 0 when not inside one.
    depth: i32,
    /// A `func` token was seen and its `(` is still expected.
    awaiting_paren: bool,
    /// The parameter list closed on this line; a return arrow may follow.
    after_params: bool,
}

impl Processor for TypeAnnotationProcessor {
    fn name(&self) -> &'static str {
        "type-annotations"
    }

    fn process(
        &mut self,
        input: &SourceBuffer,
        map: &PosMap,
        ctx: &mut PassContext<'_>,
    ) -> (SourceBuffer, PosMap) {
        let mut out_lines = Vec::with_capacity(input.line_count());
        let mut out_map = dingo_base::PosMap::new();
        let mut state = SigState::default();

        for (n, line) in input.lines() {
            let origin = origin_of(map, n);
            let (rewritten, first_change) = rewrite_line(line, &mut state, ctx, n, map);
            match first_change {
                Some(col) => out_map.push(derive_origin(origin, col)),
                None => out_map.push(origin),
            }
            out_lines.push(rewritten);
            // Only an open parameter list survives a line boundary.
            state.awaiting_paren = false;
            state.after_params = false;
        }
        (SourceBuffer::from_lines(out_lines), out_map)
    }
}

/// Rewrites one line, returning the new text and the column of the first
/// change (if any).
fn rewrite_line(
    line: &str,
    state: &mut SigState,
    ctx: &mut PassContext<'_>,
    line_no: u32,
    map: &PosMap,
) -> (String, Option<usize>) {
    let bytes = line.as_bytes();
    let mut out: Vec<u8> = Vec::with_capacity(line.len());
    let mut first_change = None;
    let mut i = 0;

    // String/comment tracking local to the line.
    let mut in_str = false;
    let mut in_raw = false;
    let mut in_char = false;

    while i < bytes.len() {
        let b = bytes[i];

        if in_str {
            out.push(b);
            if b == b'\\' && i + 1 < bytes.len() {
                out.push(bytes[i + 1]);
                i += 2;
                continue;
            }
            if b == b'"' {
                in_str = false;
            }
            i += 1;
            continue;
        }
        if in_raw {
            out.push(b);
            if b == b'`' {
                in_raw = false;
            }
            i += 1;
            continue;
        }
        if in_char {
            out.push(b);
            if b == b'\\' && i + 1 < bytes.len() {
                out.push(bytes[i + 1]);
                i += 2;
                continue;
            }
            if b == b'\'' {
                in_char = false;
            }
            i += 1;
            continue;
        }

        match b {
            b'"' => {
                in_str = true;
                out.push(b'"');
                i += 1;
            }
            b'`' => {
                in_raw = true;
                out.push(b'`');
                i += 1;
            }
            b'\'' => {
                in_char = true;
                out.push(b'\'');
                i += 1;
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                out.extend_from_slice(&bytes[i..]);
                break;
            }
            b'f' if is_func_token(line, i) => {
                state.awaiting_paren = true;
                out.extend_from_slice(b"func");
                i += 4;
            }
            b'(' => {
                if state.awaiting_paren || state.after_params {
                    state.awaiting_paren = false;
                    state.after_params = false;
                    state.depth = state.depth.max(0) + 1;
                } else if state.depth > 0 {
                    state.depth += 1;
                }
                out.push(b'(');
                i += 1;
            }
            b')' if state.depth > 0 => {
                state.depth -= 1;
                if state.depth == 0 {
                    state.after_params = true;
                }
                out.push(b')');
                i += 1;
            }
            b':' if state.depth > 0 && bytes.get(i + 1) != Some(&b'=') => {
                // Annotation colon: `name: Type` → `name Type`.
                let mut j = i + 1;
                while j < bytes.len() && bytes[j] == b' ' {
                    j += 1;
                }
                let malformed = j >= bytes.len() || matches!(bytes[j], b',' | b')');
                if malformed {
                    let origin = origin_of(map, line_no);
                    ctx.diags.push(Diagnostic::error(
                        DiagnosticKind::MalformedTypeAnnotation,
                        ctx.span_at(derive_origin(origin, i), 1),
                    ));
                    out.push(b':');
                    i += 1;
                    continue;
                }
                first_change.get_or_insert(i);
                out.push(b' ');
                i = j;
            }
            b'-' if bytes.get(i + 1) == Some(&b'>') && (state.depth > 0 || state.after_params) => {
                // Return arrow: `) -> T` → `) T`.
                first_change.get_or_insert(i);
                while out.last() == Some(&b' ') {
                    out.pop();
                }
                out.push(b' ');
                i += 2;
                while i < bytes.len() && bytes[i] == b' ' {
                    i += 1;
                }
            }
            b'{' if state.after_params => {
                state.after_params = false;
                out.push(b'{');
                i += 1;
            }
            _ => {
                out.push(b);
                i += 1;
            }
        }
    }
    (String::from_utf8_lossy(&out).into_owned(), first_change)
}

/// True when `func` appears at `idx` as a standalone token.
fn is_func_token(line: &str, idx: usize) -> bool {
    line[idx..].starts_with("func") && scan::token_boundary(line, idx, 4)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::PreprocessOptions;
    use dingo_base::DiagnosticBag;

    fn run(src: &str) -> (String, DiagnosticBag) {
        let options = PreprocessOptions::default();
        let mut diags = DiagnosticBag::new();
        let mut ctx = PassContext::new(src, &options, &mut diags);
        let input = SourceBuffer::new(src);
        let map = dingo_base::PosMap::identity(input.line_count());
        let (out, _) = TypeAnnotationProcessor.process(&input, &map, &mut ctx);
        (out.text().to_string(), diags)
    }

    #[test]
    fn rewrites_parameter_annotation() {
        let (out, diags) = run("func readConfig(path: string) ([]byte, error) {\n}\n");
        assert!(out.contains("func readConfig(path string) ([]byte, error) {"));
        assert!(diags.is_empty());
    }

    #[test]
    fn rewrites_arrow_return() {
        let (out, _) = run("func area(r: float64) -> float64 {\n}\n");
        assert!(out.contains("func area(r float64) float64 {"));
    }

    #[test]
    fn leaves_map_literals_alone() {
        let src = "func f() {\n\tm := map[string]int{\"a\": 1, \"b\": 2}\n}\n";
        let (out, _) = run(src);
        assert!(out.contains("{\"a\": 1, \"b\": 2}"));
    }

    #[test]
    fn leaves_labels_and_strings_alone() {
        let (out, _) = run("func f() {\n\ts := \"a: b\"\n\t_ = s\n}\n");
        assert!(out.contains("\"a: b\""));
    }

    #[test]
    fn handles_multi_line_signature() {
        let src = "func process(\n\ta: string,\n\tb: int,\n) -> (string, error) {\n}\n";
        let (out, _) = run(src);
        assert!(out.contains("\ta string,"));
        assert!(out.contains("\tb int,"));
        assert!(out.contains(") (string, error) {"));
    }

    #[test]
    fn rewrites_closure_annotations() {
        let (out, _) = run("func f() {\n\tcb := func(x: int) -> int { return x }\n}\n");
        assert!(out.contains("cb := func(x int) int { return x }"));
    }

    #[test]
    fn short_var_decl_is_not_an_annotation() {
        let (out, _) = run("func f(n: int) {\n\tx := n\n\t_ = x\n}\n");
        assert!(out.contains("x := n"));
        assert!(out.contains("func f(n int) {"));
    }

    #[test]
    fn missing_type_reports_malformed_annotation() {
        let (_, diags) = run("func f(path: ) {\n}\n");
        assert_eq!(diags.len(), 1);
        assert!(diags
            .iter()
            .any(|d| matches!(d.kind, DiagnosticKind::MalformedTypeAnnotation)));
    }

    #[test]
    fn receiver_annotations_rewrite() {
        let (out, _) = run("func (s: *Server) handle(req: Request) -> error {\n}\n");
        assert!(out.contains("func (s *Server) handle(req Request) error {"));
    }
}
