//! Processor 4: `match` blocks.
//!
//! Locates `match scrutinee { … }` by balanced-brace scanning (a greedy
//! scan merges consecutive matches — the historical bug this module is
//! shaped around) and rewrites each into a sentinel-marked `switch`
//! skeleton the match plugin completes:
//!
//! ```text
//! // DINGO_MATCH_START mode=stmt scrutinee=r
//! switch {
//! case __dingo_arm("Ok(x)"):
//!     use(x)
//! default:
//!     fallback()
//! }
//! // DINGO_MATCH_END
//! ```
//!
//! Arm patterns (and guards) travel verbatim inside the `__dingo_arm`
//! marker string; the plugin parses them, checks exhaustiveness against
//! the scrutinee's type, and rewrites the cases into tag comparisons with
//! binding statements. A `match` in expression position is wrapped in an
//! immediately-invoked function literal whose arms `return` their value.

use crate::buffer::SourceBuffer;
use crate::chain::{derive_origin, origin_of, MatchSyntax, PassContext, Processor};
use crate::scan;
use dingo_base::{Diagnostic, DiagnosticKind, LineOrigin, PosMap};

pub struct MatchProcessor;

impl Processor for MatchProcessor {
    fn name(&self) -> &'static str {
        "pattern-match"
    }

    fn process(
        &mut self,
        input: &SourceBuffer,
        map: &PosMap,
        ctx: &mut PassContext<'_>,
    ) -> (SourceBuffer, PosMap) {
        let mut out_lines = Vec::with_capacity(input.line_count());
        let mut out_map = PosMap::new();
        let line_count = input.line_count() as u32;
        let mut n = 1u32;

        while n <= line_count {
            let line = input.line(n);
            let Some(header) = match_header(line) else {
                out_lines.push(line.to_string());
                out_map.push(origin_of(map, n));
                n += 1;
                continue;
            };
            let origin = origin_of(map, n);
            let t_origin = derive_origin(origin, header.match_col);

            if ctx.options.match_syntax == MatchSyntax::Swift {
                ctx.diags.push(
                    Diagnostic::error(
                        DiagnosticKind::SwiftMatchSyntax,
                        ctx.span_at(t_origin, 5),
                    )
                    .with_hint("set match.syntax = \"rust\""),
                );
                out_lines.push(line.to_string());
                out_map.push(origin);
                n += 1;
                continue;
            }

            let Some(end) = scan::scan_balanced(
                |l| input.line(l),
                line_count,
                n,
                header.brace_col,
                b'{',
                b'}',
            ) else {
                ctx.diags.push(Diagnostic::error(
                    DiagnosticKind::UnbalancedBraces { construct: "match" },
                    ctx.span_at(t_origin, 5),
                ));
                out_lines.push(line.to_string());
                out_map.push(origin);
                n += 1;
                continue;
            };

            match parse_arms(input, n, header.brace_col, end) {
                Ok(arms) => {
                    emit_switch(
                        input, map, &header, &arms, end, t_origin, &mut out_lines, &mut out_map,
                    );
                }
                Err((message, bad_line)) => {
                    let bad_origin = origin_of(map, bad_line);
                    ctx.diags.push(Diagnostic::error(
                        DiagnosticKind::Custom(message),
                        ctx.span_at(bad_origin, input.line(bad_line).trim().len()),
                    ));
                    // Lenient: leave the block untouched.
                    for l in n..=end.line {
                        out_lines.push(input.line(l).to_string());
                        out_map.push(origin_of(map, l));
                    }
                }
            }
            n = end.line + 1;
        }
        (SourceBuffer::from_lines(out_lines), out_map)
    }
}

/// A recognised `match` header line.
struct MatchHeader {
    /// Text before the `match` token (empty in statement context).
    prefix: String,
    /// The scrutinee expression text.
    scrutinee: String,
    /// Byte column of the `match` token.
    match_col: usize,
    /// Byte column of the opening brace.
    brace_col: usize,
    indent: String,
}

impl MatchHeader {
    fn is_expression(&self) -> bool {
        !self.prefix.trim().is_empty()
    }
}

/// One parsed arm.
struct Arm {
    pattern: String,
    guard: Option<String>,
    /// Body lines (single expression or flattened block statements), with
    /// their 1-based input line numbers.
    body: Vec<(u32, String)>,
    header_line: u32,
}

fn match_header(line: &str) -> Option<MatchHeader> {
    let code = scan::strip_line_comment(line);
    let kw = scan::find_code(code, "match")?;
    if !scan::token_boundary(code, kw, 5) {
        return None;
    }
    // `match` must begin the statement or follow a binding/return prefix.
    let prefix = &code[..kw];
    let prefix_trim = prefix.trim();
    if !prefix_trim.is_empty()
        && !(prefix_trim.ends_with('=') || prefix_trim.ends_with("return") || prefix_trim.ends_with('('))
    {
        return None;
    }
    let after = &code[kw + 5..];
    if !after.starts_with([' ', '\t']) {
        return None;
    }
    // First top-level brace after the scrutinee.
    let brace_rel = {
        let mut depth = 0i32;
        let mut found = None;
        for (idx, b) in scan::code_bytes(after) {
            match b {
                b'(' | b'[' => depth += 1,
                b')' | b']' => depth -= 1,
                b'{' if depth == 0 => {
                    found = Some(idx);
                    break;
                }
                _ => {}
            }
        }
        found?
    };
    let scrutinee = after[..brace_rel].trim().to_string();
    if scrutinee.is_empty() {
        return None;
    }
    Some(MatchHeader {
        prefix: prefix.to_string(),
        scrutinee,
        match_col: kw,
        brace_col: kw + 5 + brace_rel,
        indent: scan::indent_of(line).to_string(),
    })
}

/// Parses the arm list between the braces of a match block.
fn parse_arms(
    input: &SourceBuffer,
    start_line: u32,
    brace_col: usize,
    end: scan::BlockEnd,
) -> Result<Vec<Arm>, (String, u32)> {
    let mut arms = Vec::new();
    let mut l = start_line;

    // Anything after the opening brace on the header line is the first arm.
    let mut pending: Option<(u32, String)> = {
        let raw = scan::strip_line_comment(input.line(start_line));
        let limit = if end.line == start_line { end.col.min(raw.len()) } else { raw.len() };
        let rest = raw[(brace_col + 1).min(limit)..limit].trim();
        if rest.is_empty() {
            None
        } else {
            Some((start_line, rest.to_string()))
        }
    };
    l += 1;

    loop {
        let (line_no, text) = match pending.take() {
            Some(item) => item,
            None => {
                if l > end.line {
                    break;
                }
                let raw = scan::strip_line_comment(input.line(l));
                let text = if l == end.line { raw[..end.col.min(raw.len())].trim() } else { raw.trim() };
                let item = (l, text.to_string());
                l += 1;
                if item.1.is_empty() {
                    continue;
                }
                item
            }
        };

        let Some(arrow) = find_arrow(&text) else {
            return Err((format!("malformed match arm: {:?}", text), line_no));
        };
        let head = text[..arrow].trim();
        let tail = text[arrow + 2..].trim();
        let (pattern, guard) = split_guard(head);
        if pattern.is_empty() {
            return Err(("match arm has no pattern".to_string(), line_no));
        }

        let mut body = Vec::new();
        if tail.starts_with('{') {
            // Block body, possibly spanning lines.
            let content_after = tail[1..].trim_end_matches(',').trim();
            let closes_inline = {
                let mut depth = 0i32;
                let mut inline = false;
                for (_, b) in scan::code_bytes(tail) {
                    match b {
                        b'{' => depth += 1,
                        b'}' => {
                            depth -= 1;
                            if depth == 0 {
                                inline = true;
                            }
                        }
                        _ => {}
                    }
                }
                inline
            };
            if closes_inline {
                let inner = content_after.trim_end_matches('}').trim();
                if !inner.is_empty() {
                    body.push((line_no, inner.to_string()));
                }
            } else {
                // Consume until the block closes.
                let mut depth = 1i32;
                while l <= end.line {
                    let raw = scan::strip_line_comment(input.line(l));
                    let limit = if l == end.line { end.col.min(raw.len()) } else { raw.len() };
                    let slice = &raw[..limit];
                    let mut closed_at = None;
                    for (idx, b) in scan::code_bytes(slice) {
                        match b {
                            b'{' => depth += 1,
                            b'}' => {
                                depth -= 1;
                                if depth == 0 {
                                    closed_at = Some(idx);
                                    break;
                                }
                            }
                            _ => {}
                        }
                    }
                    match closed_at {
                        Some(idx) => {
                            let before = slice[..idx].trim();
                            if !before.is_empty() {
                                body.push((l, before.to_string()));
                            }
                            l += 1;
                            break;
                        }
                        None => {
                            let trimmed = slice.trim();
                            if !trimmed.is_empty() {
                                body.push((l, trimmed.to_string()));
                            }
                            l += 1;
                        }
                    }
                }
            }
        } else {
            let expr = tail.trim_end_matches(',').trim();
            if expr.is_empty() {
                return Err(("match arm has an empty body".to_string(), line_no));
            }
            body.push((line_no, expr.to_string()));
        }

        arms.push(Arm {
            pattern: pattern.to_string(),
            guard: guard.map(str::to_string),
            body,
            header_line: line_no,
        });
    }

    if arms.is_empty() {
        return Err(("match has no arms".to_string(), start_line));
    }
    Ok(arms)
}

/// Finds the `=>` separator at nesting depth zero.
fn find_arrow(text: &str) -> Option<usize> {
    let mut depth = 0i32;
    let bytes = text.as_bytes();
    for (idx, b) in scan::code_bytes(text) {
        match b {
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => depth -= 1,
            b'=' if depth == 0 && bytes.get(idx + 1) == Some(&b'>') => return Some(idx),
            _ => {}
        }
    }
    None
}

/// Splits `pattern if guard` at a top-level `if` token.
fn split_guard(head: &str) -> (&str, Option<&str>) {
    let mut depth = 0i32;
    for (idx, b) in scan::code_bytes(head) {
        match b {
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => depth -= 1,
            b'i' if depth == 0
                && head[idx..].starts_with("if")
                && scan::token_boundary(head, idx, 2)
                && idx > 0 =>
            {
                return (head[..idx].trim(), Some(head[idx + 2..].trim()));
            }
            _ => {}
        }
    }
    (head.trim(), None)
}

/// Emits the sentinel-marked switch skeleton for one match.
#[allow(clippy::too_many_arguments)]
fn emit_switch(
    input: &SourceBuffer,
    map: &PosMap,
    header: &MatchHeader,
    arms: &[Arm],
    end: scan::BlockEnd,
    t_origin: LineOrigin,
    out_lines: &mut Vec<String>,
    out_map: &mut PosMap,
) {
    let indent = &header.indent;
    let expression = header.is_expression();
    let mode = if expression { "expr" } else { "stmt" };

    let mut push = |text: String, origin: LineOrigin, out_map: &mut PosMap| {
        out_lines.push(text);
        out_map.push(origin);
    };

    let inner = if expression {
        let (binding, result_ty) = rewrite_binding_prefix(&header.prefix);
        push(
            format!("{}{}func() {} {{", indent, binding, result_ty),
            t_origin,
            out_map,
        );
        format!("{}\t", indent)
    } else {
        indent.clone()
    };

    push(
        format!(
            "{}// DINGO_MATCH_START mode={} scrutinee={}",
            inner, mode, header.scrutinee
        ),
        t_origin,
        out_map,
    );
    push(format!("{}switch {{", inner), t_origin, out_map);

    for arm in arms {
        let arm_origin = derive_origin(origin_of(map, arm.header_line), 0);
        if arm.pattern == "_" && arm.guard.is_none() {
            push(format!("{}default:", inner), arm_origin, out_map);
        } else {
            let mut marker = arm.pattern.clone();
            if let Some(guard) = &arm.guard {
                marker.push_str(" if ");
                marker.push_str(guard);
            }
            push(
                format!("{}case __dingo_arm({}):", inner, quote(&marker)),
                arm_origin,
                out_map,
            );
        }
        for (i, (body_line, text)) in arm.body.iter().enumerate() {
            let body_origin = origin_of(map, *body_line);
            // In expression position the arm's final line is its value;
            // any earlier block statements run first.
            if expression && i == arm.body.len() - 1 {
                push(format!("{}\treturn {}", inner, text), derive_origin(body_origin, 0), out_map);
            } else {
                push(format!("{}\t{}", inner, text), body_origin, out_map);
            }
        }
    }

    push(format!("{}}}", inner), t_origin, out_map);
    push(format!("{}// DINGO_MATCH_END", inner), t_origin, out_map);

    if expression {
        push(format!("{}\tpanic(\"unreachable: non-exhaustive match\")", indent), t_origin, out_map);
        // Anything after the closing brace of the match rides along.
        let raw = scan::strip_line_comment(input.line(end.line));
        let trailing = raw[(end.col + 1).min(raw.len())..].trim();
        push(format!("{}}}(){}", indent, trailing), t_origin, out_map);
    }
}

/// Rewrites a `let`-style prefix into native Go binding syntax, returning
/// the binding text and the wrapper function's result type.
fn rewrite_binding_prefix(prefix: &str) -> (String, String) {
    let trimmed = prefix.trim();
    if let Some(rest) = trimmed.strip_prefix("let ") {
        let rest = rest.trim_end_matches('=').trim();
        match rest.find(':') {
            Some(colon) => {
                let name = rest[..colon].trim();
                let ty = rest[colon + 1..].trim();
                return (format!("var {} {} = ", name, ty), ty.to_string());
            }
            None => return (format!("{} := ", rest), "any".to_string()),
        }
    }
    if trimmed.ends_with('(') {
        (trimmed.to_string(), "any".to_string())
    } else {
        (format!("{} ", trimmed), "any".to_string())
    }
}

/// Quotes a pattern string for embedding in the `__dingo_arm` marker.
fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}
