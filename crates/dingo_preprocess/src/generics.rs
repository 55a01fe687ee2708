//! Processor 5: angle-bracket generics and Result/Option type mangling.
//!
//! `Name<A, B>` becomes the native `Name[A, B]` when `Name` is an
//! uppercase-initial identifier immediately followed by `<` and the
//! bracket content is balanced, type-shaped text. Comparison expressions
//! never qualify: `a < b` has a space, `Count < 10 && x > 2` fails the
//! charset test.
//!
//! `Result<T, E>` and `Option<T>` are special: instead of brackets they
//! mangle into concrete type names (`Result_int_error`, `Option_User`)
//! and the instantiation is recorded for the synthesis plugin. Sanitising
//! maps `interface{}` to `any`, flattens `pkg.Name` to `pkg_Name`, and
//! encodes container shapes (`[]byte` → `Slice_byte`); the mapping is
//! injective per file.

use crate::buffer::SourceBuffer;
use crate::chain::{derive_origin, origin_of, PassContext, Processor};
use crate::scan;
use dingo_base::{PosMap, Span};

/// A distinct `Result<T, E>` use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultInstance {
    pub mangled: String,
    /// Go text of the Ok payload type.
    pub ok: String,
    /// Go text of the Err payload type.
    pub err: String,
    pub span: Span,
}

/// A distinct `Option<T>` use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionInstance {
    pub mangled: String,
    /// Go text of the Some payload type.
    pub some: String,
    pub span: Span,
}

pub struct GenericsProcessor;

impl Processor for GenericsProcessor {
    fn name(&self) -> &'static str {
        "generic-brackets"
    }

    fn process(
        &mut self,
        input: &SourceBuffer,
        map: &PosMap,
        ctx: &mut PassContext<'_>,
    ) -> (SourceBuffer, PosMap) {
        let mut out_lines = Vec::with_capacity(input.line_count());
        let mut out_map = PosMap::new();

        for (n, line) in input.lines() {
            let origin = origin_of(map, n);
            let span = ctx.span_at(origin, line.trim_end().len());
            let mut collector = Collector { ctx: &mut *ctx, span };
            let (rewritten, changed_at) = rewrite_text(line, &mut collector);
            match changed_at {
                Some(col) => out_map.push(derive_origin(origin, col)),
                None => out_map.push(origin),
            }
            out_lines.push(rewritten);
        }

        // Descriptor payload types must match the Go text the buffer now
        // carries (enum scaffolding passed through this stage too).
        let mut enums = std::mem::take(&mut ctx.enums);
        for descriptor in &mut enums {
            let span = descriptor.span;
            for variant in &mut descriptor.variants {
                let mut collector = Collector { ctx: &mut *ctx, span };
                match &mut variant.kind {
                    crate::enums::VariantKind::Unit => {}
                    crate::enums::VariantKind::Tuple(types) => {
                        for ty in types {
                            *ty = rewrite_text(ty, &mut collector).0;
                        }
                    }
                    crate::enums::VariantKind::Struct(fields) => {
                        for (_, ty) in fields {
                            *ty = rewrite_text(ty, &mut collector).0;
                        }
                    }
                }
            }
        }
        ctx.enums = enums;

        (SourceBuffer::from_lines(out_lines), out_map)
    }
}

/// Shared sink for recorded instantiations.
struct Collector<'a, 'b> {
    ctx: &'a mut PassContext<'b>,
    span: Span,
}

impl Collector<'_, '_> {
    fn record_result(&mut self, mangled: &str, ok: &str, err: &str) {
        if self.ctx.results.iter().any(|r| r.mangled == mangled) {
            return;
        }
        self.ctx.results.push(ResultInstance {
            mangled: mangled.to_string(),
            ok: ok.to_string(),
            err: err.to_string(),
            span: self.span,
        });
    }

    fn record_option(&mut self, mangled: &str, some: &str) {
        if self.ctx.option_insts.iter().any(|o| o.mangled == mangled) {
            return;
        }
        self.ctx.option_insts.push(OptionInstance {
            mangled: mangled.to_string(),
            some: some.to_string(),
            span: self.span,
        });
    }

    fn enabled(&self) -> bool {
        self.ctx.options.result_type_enabled
    }
}

/// Rewrites every generic bracket in `text`, returning the new text and
/// the column of the first change.
fn rewrite_text(text: &str, collector: &mut Collector<'_, '_>) -> (String, Option<usize>) {
    let bytes = text.as_bytes();
    let code: std::collections::HashSet<usize> =
        scan::code_bytes(text).into_iter().map(|(i, _)| i).collect();
    let mut out: Vec<u8> = Vec::with_capacity(text.len());
    let mut first_change = None;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        if b.is_ascii_uppercase() && code.contains(&i) && starts_ident(bytes, i) {
            let ident_end = ident_end(bytes, i);
            if bytes.get(ident_end) == Some(&b'<') {
                if let Some(close) = balanced_angle(text, ident_end, &code) {
                    let name = &text[i..ident_end];
                    let content = &text[ident_end + 1..close];
                    if type_shaped(content) {
                        if let Some(rewritten) = rewrite_generic(name, content, collector) {
                            first_change.get_or_insert(i);
                            out.extend_from_slice(rewritten.as_bytes());
                            i = close + 1;
                            continue;
                        }
                    }
                }
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    (String::from_utf8_lossy(&out).into_owned(), first_change)
}

fn starts_ident(bytes: &[u8], idx: usize) -> bool {
    idx == 0 || !scan::is_ident_byte(bytes[idx - 1])
}

fn ident_end(bytes: &[u8], start: usize) -> usize {
    let mut end = start;
    while end < bytes.len() && scan::is_ident_byte(bytes[end]) {
        end += 1;
    }
    end
}

/// Finds the `>` closing the `<` at `open`, line-local and code-only.
fn balanced_angle(text: &str, open: usize, code: &std::collections::HashSet<usize>) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0i32;
    let mut i = open;
    while i < bytes.len() {
        if code.contains(&i) {
            match bytes[i] {
                b'<' => depth += 1,
                b'>' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(i);
                    }
                }
                _ => {}
            }
        }
        i += 1;
    }
    None
}

/// True when the bracket content looks like a type list, not a comparison.
fn type_shaped(content: &str) -> bool {
    !content.is_empty()
        && content.bytes().all(|b| {
            b.is_ascii_alphanumeric()
                || matches!(b, b'_' | b',' | b' ' | b'.' | b'*' | b'[' | b']' | b'<' | b'>' | b'{' | b'}')
        })
        && content.bytes().any(|b| b.is_ascii_alphabetic())
}

/// Rewrites one `Name<content>` occurrence.
fn rewrite_generic(
    name: &str,
    content: &str,
    collector: &mut Collector<'_, '_>,
) -> Option<String> {
    let args: Vec<String> = scan::split_top_level(content, b',')
        .into_iter()
        .map(|arg| {
            let (converted, _) = rewrite_text(arg.trim(), collector);
            converted
        })
        .collect();

    match name {
        "Result" if collector.enabled() => {
            if args.len() != 2 {
                return None;
            }
            let mangled = format!("Result_{}_{}", sanitize(&args[0]), sanitize(&args[1]));
            collector.record_result(&mangled, &args[0], &args[1]);
            Some(mangled)
        }
        "Option" if collector.enabled() => {
            if args.len() != 1 {
                return None;
            }
            let mangled = format!("Option_{}", sanitize(&args[0]));
            collector.record_option(&mangled, &args[0]);
            Some(mangled)
        }
        _ => Some(format!("{}[{}]", name, args.join(", "))),
    }
}

/// Sanitises a Go type text into an identifier-safe mangling component.
pub fn sanitize(ty: &str) -> String {
    let ty = ty.trim();
    if ty == "interface{}" {
        return "any".to_string();
    }
    let mut out = String::with_capacity(ty.len());
    let mut rest = ty;
    loop {
        if let Some(r) = rest.strip_prefix("[]") {
            out.push_str("Slice_");
            rest = r;
        } else if let Some(r) = rest.strip_prefix('*') {
            out.push_str("Ptr_");
            rest = r;
        } else if let Some(r) = rest.strip_prefix("map[") {
            out.push_str("Map_");
            rest = r;
        } else {
            break;
        }
    }
    for c in rest.chars() {
        match c {
            '.' => out.push('_'),
            ']' => out.push('_'),
            '[' => out.push('_'),
            ' ' | '{' | '}' | '*' => {}
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::PreprocessOptions;
    use dingo_base::DiagnosticBag;

    fn run(src: &str) -> (String, Vec<ResultInstance>, Vec<OptionInstance>) {
        let options = PreprocessOptions::default();
        let mut diags = DiagnosticBag::new();
        let mut ctx = PassContext::new(src, &options, &mut diags);
        let input = SourceBuffer::new(src);
        let map = PosMap::identity(input.line_count());
        let (out, out_map) = GenericsProcessor.process(&input, &map, &mut ctx);
        assert_eq!(out_map.len(), out.line_count());
        (out.text().to_string(), ctx.results.clone(), ctx.option_insts.clone())
    }

    #[test]
    fn rewrites_generic_brackets() {
        let (out, _, _) = run("var x Pair<int, string>\n");
        assert!(out.contains("var x Pair[int, string]"));
    }

    #[test]
    fn mangles_result_and_records_instance() {
        let (out, results, _) = run("func f() Result<int, error> {\n}\n");
        assert!(out.contains("func f() Result_int_error {"));
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].mangled, "Result_int_error");
        assert_eq!(results[0].ok, "int");
        assert_eq!(results[0].err, "error");
    }

    #[test]
    fn mangles_option_instance() {
        let (out, _, options) = run("func find(id int) Option<User> {\n}\n");
        assert!(out.contains("func find(id int) Option_User {"));
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].some, "User");
    }

    #[test]
    fn deduplicates_instances_per_file() {
        let (_, results, _) = run("var a Result<int, error>\nvar b Result<int, error>\n");
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn nested_generics_mangle_inside_out() {
        let (out, results, options) = run("var x Result<Option<int>, error>\n");
        assert!(out.contains("var x Result_Option_int_error"));
        assert_eq!(options[0].mangled, "Option_int");
        assert_eq!(results[0].ok, "Option_int");
    }

    #[test]
    fn comparisons_are_left_alone() {
        let (out, _, _) = run("if Count < 10 && x > 2 {\n}\n");
        assert!(out.contains("if Count < 10 && x > 2 {"));
        let (out, _, _) = run("ok := a < b\n");
        assert!(out.contains("ok := a < b"));
    }

    #[test]
    fn lowercase_identifiers_never_qualify() {
        let (out, _, _) = run("x := min<int>(a, b)\n");
        assert!(out.contains("min<int>"));
    }

    #[test]
    fn sanitize_flattens_shapes() {
        assert_eq!(sanitize("int"), "int");
        assert_eq!(sanitize("interface{}"), "any");
        assert_eq!(sanitize("pkg.Name"), "pkg_Name");
        assert_eq!(sanitize("[]byte"), "Slice_byte");
        assert_eq!(sanitize("*User"), "Ptr_User");
        assert_eq!(sanitize("map[string]int"), "Map_string_int");
    }

    #[test]
    fn strings_are_not_rewritten() {
        let (out, _, _) = run("s := \"Result<int, error>\"\n");
        assert!(out.contains("\"Result<int, error>\""));
    }
}
