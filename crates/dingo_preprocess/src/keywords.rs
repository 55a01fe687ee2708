//! Processor 6: `let` bindings.
//!
//! `let x = v` becomes the short declaration `x := v`; the annotated form
//! `let x: T = v` becomes `var x T = v`. Matching is token-bounded, so
//! identifiers containing the letters "let" (`outlet`, `letters`) are
//! untouched. Most `let` lines never reach this stage — the error
//! propagation and match processors consume the ones they expand — which
//! leaves exactly the plain bindings here.

use crate::buffer::SourceBuffer;
use crate::chain::{derive_origin, origin_of, PassContext, Processor};
use crate::scan;
use dingo_base::PosMap;

pub struct LetProcessor;

impl Processor for LetProcessor {
    fn name(&self) -> &'static str {
        "let-bindings"
    }

    fn process(
        &mut self,
        input: &SourceBuffer,
        map: &PosMap,
        _ctx: &mut PassContext<'_>,
    ) -> (SourceBuffer, PosMap) {
        let mut out_lines = Vec::with_capacity(input.line_count());
        let mut out_map = PosMap::new();

        for (n, line) in input.lines() {
            let origin = origin_of(map, n);
            match rewrite_let(line) {
                Some((rewritten, col)) => {
                    out_map.push(derive_origin(origin, col));
                    out_lines.push(rewritten);
                }
                None => {
                    out_map.push(origin);
                    out_lines.push(line.to_string());
                }
            }
        }
        (SourceBuffer::from_lines(out_lines), out_map)
    }
}

/// Rewrites a `let` line, returning the new text and the keyword column.
fn rewrite_let(line: &str) -> Option<(String, usize)> {
    let kw = scan::find_code(line, "let")?;
    if !scan::token_boundary(line, kw, 3) {
        return None;
    }
    // Declaration position only: nothing but whitespace before the keyword.
    if !line[..kw].trim().is_empty() {
        return None;
    }
    let indent = &line[..kw];
    let rest = line[kw + 3..].strip_prefix([' ', '\t'])?.trim_start();

    let eq = scan::find_code(rest, "=")?;
    if rest.as_bytes().get(eq + 1) == Some(&b'=') || (eq > 0 && rest.as_bytes()[eq - 1] == b':') {
        return None;
    }
    let head = rest[..eq].trim();
    let value = rest[eq + 1..].trim_start();

    match head.find(':') {
        Some(colon) => {
            let name = head[..colon].trim();
            let ty = head[colon + 1..].trim();
            if name.is_empty() || ty.is_empty() {
                return None;
            }
            Some((format!("{}var {} {} = {}", indent, name, ty, value), kw))
        }
        None => Some((format!("{}{} := {}", indent, head, value), kw)),
    }
}
