//! Processor 2: error propagation (`?`).
//!
//! Detects `expr?` and `expr? "message"` in assignment, return, and bare
//! statement positions and rewrites each into the four-part expansion:
//!
//! ```text
//! // dingo:s:1
//! __tmp0, __err0 := ReadFile(path)
//! if __err0 != nil {
//!     return nil, __err0
//! }
//! data := __tmp0
//! // dingo:e:1
//! ```
//!
//! The guard returns the canonical zero value for every result of the
//! enclosing function but the final error. The message form wraps with
//! `fmt.Errorf("…: %w", err)` and records the `fmt` import requirement.
//! A call whose only result is the error binds no `__tmpK` at all.
//!
//! This processor is **always strict**: a silently unexpanded `?` would
//! only resurface as an inscrutable parse error downstream.

use crate::buffer::SourceBuffer;
use crate::chain::{derive_origin, origin_of, ErrorSyntax, PassContext, Processor};
use crate::funcs;
use crate::scan;
use dingo_base::{Diagnostic, DiagnosticKind, LineOrigin, PosMap};

pub struct ErrorPropProcessor;

impl Processor for ErrorPropProcessor {
    fn name(&self) -> &'static str {
        "error-propagation"
    }

    fn strict(&self) -> bool {
        true
    }

    fn process(
        &mut self,
        input: &SourceBuffer,
        map: &PosMap,
        ctx: &mut PassContext<'_>,
    ) -> (SourceBuffer, PosMap) {
        // Function contexts are discovered here, after the annotation
        // rewrite made signatures native Go.
        ctx.funcs = funcs::scan_functions(|n| input.line(n), input.line_count() as u32);

        let mut out_lines: Vec<String> = Vec::with_capacity(input.line_count());
        let mut out_map = PosMap::new();

        for (n, line) in input.lines() {
            let origin = origin_of(map, n);
            match detect(line, ctx.options.error_syntax) {
                Some(found) => {
                    expand(line, found, n, origin, ctx, &mut out_lines, &mut out_map);
                }
                None => {
                    out_lines.push(line.to_string());
                    out_map.push(origin);
                }
            }
        }
        (SourceBuffer::from_lines(out_lines), out_map)
    }
}

/// Statement shape the propagation token was found in.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PropContext {
    /// `let x = expr?` / `x := expr?`; holds the comma-separated names and
    /// an optional `let` type annotation.
    Assign { names: Vec<String>, annotation: Option<String> },
    Return,
    Bare,
}

#[derive(Debug)]
struct Found {
    context: PropContext,
    /// The call expression without the propagation token.
    call: String,
    /// The message string literal, quotes included.
    message: Option<String>,
    /// Byte column of the propagation token in the line.
    token_col: usize,
}

/// Detects a propagation token in `line`, returning the decomposition.
fn detect(line: &str, syntax: ErrorSyntax) -> Option<Found> {
    let code = scan::strip_line_comment(line);
    let trimmed = code.trim();
    if trimmed.is_empty() {
        return None;
    }

    let (context, rhs, rhs_offset) = if let Some(rest) = strip_keyword(trimmed, "return") {
        (PropContext::Return, rest, code.len() - rest.len())
    } else if let Some(rest) = strip_keyword(trimmed, "let") {
        let (names, annotation, value) = split_let(rest)?;
        (
            PropContext::Assign { names, annotation },
            value,
            code.len() - value.len(),
        )
    } else if let Some(idx) = scan::find_code(code, ":=") {
        let names: Vec<String> = scan::split_top_level(&code[..idx], b',')
            .into_iter()
            .map(|s| s.trim().to_string())
            .collect();
        let value = code[idx + 2..].trim_start();
        (
            PropContext::Assign { names, annotation: None },
            value,
            code.len() - value.len(),
        )
    } else {
        (PropContext::Bare, trimmed, code.len() - trimmed.len())
    };

    let (call, message, token_col) = match syntax {
        ErrorSyntax::Question => strip_postfix(rhs, b'?')?,
        ErrorSyntax::Bang => strip_postfix(rhs, b'!')?,
        ErrorSyntax::Try => strip_try(rhs)?,
    };
    Some(Found {
        context,
        call: call.to_string(),
        message,
        token_col: rhs_offset + token_col,
    })
}

/// Strips a leading keyword with a token boundary, returning the rest.
fn strip_keyword<'a>(s: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = s.strip_prefix(keyword)?;
    if rest.starts_with([' ', '\t']) {
        Some(rest.trim_start())
    } else {
        None
    }
}

/// Splits the body of a `let` binding into (names, annotation, value).
fn split_let(rest: &str) -> Option<(Vec<String>, Option<String>, &str)> {
    let eq = scan::find_code(rest, "=")?;
    // `:=` or `==` here would not be a let binding.
    if rest.as_bytes().get(eq + 1) == Some(&b'=') || (eq > 0 && rest.as_bytes()[eq - 1] == b':') {
        return None;
    }
    let head = rest[..eq].trim();
    let value = rest[eq + 1..].trim_start();
    let (names_part, annotation) = match head.find(':') {
        Some(colon) => (
            head[..colon].trim(),
            Some(head[colon + 1..].trim().to_string()),
        ),
        None => (head, None),
    };
    let names = scan::split_top_level(names_part, b',')
        .into_iter()
        .map(|s| s.trim().to_string())
        .collect();
    Some((names, annotation, value))
}

/// Finds a top-level postfix propagation token in `rhs`.
///
/// Returns `(call, message, token_col)` where `token_col` is relative to
/// `rhs`. The token must sit at nesting depth zero with only an optional
/// string literal after it.
fn strip_postfix(rhs: &str, token: u8) -> Option<(&str, Option<String>, usize)> {
    let mut depth = 0i32;
    for (idx, b) in scan::code_bytes(rhs) {
        match b {
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => depth -= 1,
            _ if b == token && depth == 0 => {
                if token == b'!' {
                    // `!=` and prefix negation are not propagation.
                    if rhs.as_bytes().get(idx + 1) == Some(&b'=') {
                        continue;
                    }
                    let postfix = match rhs[..idx].trim_end().as_bytes().last().copied() {
                        Some(b')') | Some(b']') => true,
                        Some(prev) => scan::is_ident_byte(prev),
                        None => false,
                    };
                    if !postfix {
                        continue;
                    }
                }
                let call = rhs[..idx].trim_end();
                if call.is_empty() {
                    return None;
                }
                let after = rhs[idx + 1..].trim();
                let message = if after.is_empty() {
                    None
                } else if after.starts_with('"') {
                    Some(after.to_string())
                } else {
                    // Something other than a message follows; not ours.
                    return None;
                };
                return Some((call, message, idx));
            }
            _ => {}
        }
    }
    None
}

/// Handles the `try expr` prefix form.
fn strip_try(rhs: &str) -> Option<(&str, Option<String>, usize)> {
    let rest = strip_keyword(rhs, "try")?;
    let (call, message) = split_trailing_message(rest);
    Some((call, message, 0))
}

/// Splits an optional trailing string-literal message off a call.
fn split_trailing_message(text: &str) -> (&str, Option<String>) {
    let trimmed = text.trim_end();
    if !trimmed.ends_with('"') {
        return (trimmed, None);
    }
    // Walk code bytes to find where the final string literal starts.
    let bytes = trimmed.as_bytes();
    let mut idx = trimmed.len() - 1;
    loop {
        if idx == 0 {
            return (trimmed, None);
        }
        idx -= 1;
        if bytes[idx] == b'"' && (idx == 0 || bytes[idx - 1] != b'\\') {
            break;
        }
    }
    let before = trimmed[..idx].trim_end();
    if before.ends_with(')') {
        (before, Some(trimmed[idx..].to_string()))
    } else {
        (trimmed, None)
    }
}

/// Emits the four-part expansion for one detected propagation.
#[allow(clippy::too_many_arguments)]
fn expand(
    line: &str,
    found: Found,
    line_no: u32,
    origin: LineOrigin,
    ctx: &mut PassContext<'_>,
    out_lines: &mut Vec<String>,
    out_map: &mut PosMap,
) {
    let indent = scan::indent_of(line);
    let t_origin = derive_origin(origin, found.token_col);

    let Some(func) = funcs::enclosing(&ctx.funcs, line_no) else {
        ctx.diags.push(Diagnostic::error(
            DiagnosticKind::PropagationOutsideFunction,
            ctx.span_at(t_origin, 1),
        ));
        out_lines.push(line.to_string());
        out_map.push(origin);
        return;
    };
    if func.results.last().map(String::as_str) != Some("error") {
        ctx.diags.push(
            Diagnostic::error(
                DiagnosticKind::Custom(format!(
                    "cannot propagate from {}: it does not return error",
                    func.name
                )),
                ctx.span_at(t_origin, 1),
            )
            .with_hint("add error to the function's return types"),
        );
        out_lines.push(line.to_string());
        out_map.push(origin);
        return;
    }
    if found.message.is_some() && !found.call.trim_end().ends_with(')') {
        ctx.diags.push(Diagnostic::error(
            DiagnosticKind::MessageOnNonErrorCall,
            ctx.span_at(t_origin, 1),
        ));
        out_lines.push(line.to_string());
        out_map.push(origin);
        return;
    }

    // Value-result count of the call, derived from the statement shape.
    let value_count = match &found.context {
        PropContext::Assign { names, .. } => names.len(),
        PropContext::Return => func.results.len() - 1,
        PropContext::Bare => 0,
    };

    let base = ctx.tmp_counter;
    ctx.tmp_counter += value_count.max(1) as u32;
    let envelope = {
        ctx.envelope_counter += 1;
        ctx.envelope_counter
    };

    let tmps: Vec<String> = (0..value_count)
        .map(|i| format!("__tmp{}", base + i as u32))
        .collect();
    let err = if ctx.options.reuse_err_variable && !tmps.is_empty() {
        "__err".to_string()
    } else {
        format!("__err{}", base)
    };

    let mut push = |text: String, map_origin: LineOrigin, out_map: &mut PosMap| {
        out_lines.push(text);
        out_map.push(map_origin);
    };

    push(format!("{}// dingo:s:{}", indent, envelope), t_origin, out_map);

    // (a) capture
    let capture_lhs = if tmps.is_empty() {
        err.clone()
    } else {
        format!("{}, {}", tmps.join(", "), err)
    };
    push(
        format!("{}{} := {}", indent, capture_lhs, found.call),
        t_origin,
        out_map,
    );

    // (b) zero-value-aware guard
    push(format!("{}if {} != nil {{", indent, err), t_origin, out_map);
    let propagated = match &found.message {
        Some(message) => {
            ctx.imports.insert("fmt".to_string());
            format!("fmt.Errorf({}, {})", wrap_format(message), err)
        }
        None => err.clone(),
    };
    let mut guard_values: Vec<String> = func.results[..func.results.len() - 1]
        .iter()
        .map(|ty| funcs::zero_value(ty))
        .collect();
    guard_values.push(propagated);
    push(
        format!("{}\treturn {}", indent, guard_values.join(", ")),
        t_origin,
        out_map,
    );
    push(format!("{}}}", indent), t_origin, out_map);

    // (c) the original binding
    match &found.context {
        PropContext::Assign { names, annotation } => match annotation {
            Some(ty) => push(
                format!("{}var {} {} = {}", indent, names.join(", "), ty, tmps.join(", ")),
                t_origin,
                out_map,
            ),
            None => push(
                format!("{}{} := {}", indent, names.join(", "), tmps.join(", ")),
                t_origin,
                out_map,
            ),
        },
        PropContext::Return => {
            let mut values = tmps.clone();
            values.push("nil".to_string());
            push(format!("{}return {}", indent, values.join(", ")), t_origin, out_map);
        }
        PropContext::Bare => {}
    }

    // (d) closing marker
    push(format!("{}// dingo:e:{}", indent, envelope), t_origin, out_map);
}

/// Splices `: %w` into the user's message literal.
fn wrap_format(message: &str) -> String {
    if message.len() >= 2 && message.ends_with('"') {
        format!("{}: %w\"", &message[..message.len() - 1])
    } else {
        // Malformed literal; wrap defensively as a whole.
        format!("{}+\": %w\"", message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::PreprocessOptions;
    use dingo_base::DiagnosticBag;

    fn run_with(src: &str, options: PreprocessOptions) -> (String, DiagnosticBag) {
        let mut diags = DiagnosticBag::new();
        let mut ctx = PassContext::new(src, &options, &mut diags);
        let input = SourceBuffer::new(src);
        let map = PosMap::identity(input.line_count());
        let (out, out_map) = ErrorPropProcessor.process(&input, &map, &mut ctx);
        assert_eq!(out_map.len(), out.line_count());
        (out.text().to_string(), diags)
    }

    fn run(src: &str) -> (String, DiagnosticBag) {
        run_with(src, PreprocessOptions::default())
    }

    #[test]
    fn expands_simple_assignment() {
        let src = "func readConfig(path string) ([]byte, error) {\n\tlet data = ReadFile(path)?\n\treturn data, nil\n}\n";
        let (out, diags) = run(src);
        assert!(diags.is_empty());
        assert!(out.contains("\t// dingo:s:1"));
        assert!(out.contains("\t__tmp0, __err := ReadFile(path)"));
        assert!(out.contains("\tif __err != nil {"));
        assert!(out.contains("\t\treturn nil, __err"));
        assert!(out.contains("\tdata := __tmp0"));
        assert!(out.contains("\t// dingo:e:1"));
    }

    #[test]
    fn expands_wrapped_message() {
        let src = "func readConfig(path string) ([]byte, error) {\n\tlet data = ReadFile(path)? \"failed to read config\"\n\treturn data, nil\n}\n";
        let (out, diags) = run(src);
        assert!(diags.is_empty());
        assert!(out.contains("fmt.Errorf(\"failed to read config: %w\", __err)"));
    }

    #[test]
    fn message_records_fmt_import() {
        let src = "func f() error {\n\tg()? \"ctx\"\n\treturn nil\n}\n";
        let options = PreprocessOptions::default();
        let mut diags = DiagnosticBag::new();
        let mut ctx = PassContext::new(src, &options, &mut diags);
        let input = SourceBuffer::new(src);
        let map = PosMap::identity(input.line_count());
        ErrorPropProcessor.process(&input, &map, &mut ctx);
        assert!(ctx.imports.contains("fmt"));
    }

    #[test]
    fn error_only_call_binds_no_tmp() {
        let src = "func save(path string) error {\n\twriteAll(path)?\n\treturn nil\n}\n";
        let (out, diags) = run(src);
        assert!(diags.is_empty());
        assert!(out.contains("\t__err0 := writeAll(path)"));
        assert!(!out.contains("__tmp"));
        assert!(out.contains("\t\treturn __err0"));
    }

    #[test]
    fn return_context_returns_tmps_and_nil() {
        let src = "func load(path string) (string, error) {\n\treturn fetch(path)?\n}\n";
        let (out, diags) = run(src);
        assert!(diags.is_empty());
        assert!(out.contains("\t__tmp0, __err := fetch(path)"));
        assert!(out.contains("\t\treturn \"\", __err"));
        assert!(out.contains("\treturn __tmp0, nil"));
    }

    #[test]
    fn zero_values_follow_return_types() {
        let src = "func f() (int, *User, map[string]int, Config, error) {\n\tlet a, b, c, d = g()?\n\treturn a, b, c, d, nil\n}\n";
        let (out, _) = run(src);
        assert!(out.contains("\t\treturn 0, nil, nil, Config{}, __err"));
    }

    #[test]
    fn propagation_outside_function_is_an_error() {
        let (_, diags) = run("let x = f()?\n");
        assert!(diags.has_errors());
        assert!(diags
            .iter()
            .any(|d| matches!(d.kind, DiagnosticKind::PropagationOutsideFunction)));
    }

    #[test]
    fn non_error_function_is_an_error() {
        let src = "func pure(n int) int {\n\tlet x = f(n)?\n\treturn x\n}\n";
        let (_, diags) = run(src);
        assert!(diags.has_errors());
    }

    #[test]
    fn counters_increase_monotonically() {
        let src = "func f() (int, error) {\n\tlet a = g()?\n\tlet b = h()?\n\treturn a + b, nil\n}\n";
        let (out, _) = run(src);
        assert!(out.contains("__tmp0"));
        assert!(out.contains("__tmp1"));
        assert!(out.contains("// dingo:s:1"));
        assert!(out.contains("// dingo:s:2"));
    }

    #[test]
    fn fresh_err_names_when_reuse_disabled() {
        let src = "func f() (int, error) {\n\tlet a = g()?\n\tlet b = h()?\n\treturn a + b, nil\n}\n";
        let options = PreprocessOptions {
            reuse_err_variable: false,
            ..PreprocessOptions::default()
        };
        let (out, _) = run_with(src, options);
        assert!(out.contains("__err0"));
        assert!(out.contains("__err1"));
    }

    #[test]
    fn bang_syntax_detects_postfix_only() {
        let src = "func f() (bool, error) {\n\tlet ok = check()!\n\treturn !ok, nil\n}\n";
        let options = PreprocessOptions {
            error_syntax: ErrorSyntax::Bang,
            ..PreprocessOptions::default()
        };
        let (out, diags) = run_with(src, options);
        assert!(diags.is_empty());
        assert!(out.contains("__tmp0, __err := check()"));
        assert!(out.contains("return !ok, nil"));
    }

    #[test]
    fn try_prefix_syntax() {
        let src = "func f() (int, error) {\n\tlet n = try parse(\"5\")\n\treturn n, nil\n}\n";
        let options = PreprocessOptions {
            error_syntax: ErrorSyntax::Try,
            ..PreprocessOptions::default()
        };
        let (out, diags) = run_with(src, options);
        assert!(diags.is_empty());
        assert!(out.contains("__tmp0, __err := parse(\"5\")"));
    }

    #[test]
    fn question_in_string_is_ignored() {
        let src = "func f() {\n\ts := \"what?\"\n\t_ = s\n}\n";
        let (out, diags) = run(src);
        assert!(diags.is_empty());
        assert!(out.contains("s := \"what?\""));
    }

    #[test]
    fn annotated_let_binds_with_var() {
        let src = "func f() (int, error) {\n\tlet n: int = parse()?\n\treturn n, nil\n}\n";
        let (out, diags) = run(src);
        assert!(diags.is_empty());
        assert!(out.contains("\tvar n int = __tmp0"));
    }

    #[test]
    fn message_on_non_call_is_an_error() {
        let src = "func f() (int, error) {\n\tlet x = value? \"oops\"\n\treturn x, nil\n}\n";
        let (_, diags) = run(src);
        assert!(diags
            .iter()
            .any(|d| matches!(d.kind, DiagnosticKind::MessageOnNonErrorCall)));
    }
}
