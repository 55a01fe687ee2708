//! Processor 3: `enum` blocks.
//!
//! Locates `enum Name { … }` blocks by balanced-brace scanning, parses the
//! variants into an [`EnumDescriptor`], and replaces the block with the Go
//! scaffolding: a tag type, an `iota` const block, the backing struct (one
//! pointer field per payload position), and one constructor per variant.
//! Variant pointer fields stay nil unless the variant is active, which is
//! what makes variant testing and destructuring cheap.
//!
//! The descriptors are kept in the pass context; the enum plugin consumes
//! them to inject `Is{Variant}()` predicates and the match plugin consults
//! them for exhaustiveness.

use crate::buffer::SourceBuffer;
use crate::chain::{derive_origin, origin_of, PassContext, Processor};
use crate::scan;
use dingo_base::{Diagnostic, DiagnosticKind, PosMap, Span};

/// Payload shape of one enum variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariantKind {
    Unit,
    /// Ordered payload types.
    Tuple(Vec<String>),
    /// Ordered `(field_name, type)` pairs.
    Struct(Vec<(String, String)>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantDescriptor {
    pub name: String,
    pub kind: VariantKind,
}

impl VariantDescriptor {
    /// Ordered payload types regardless of shape.
    pub fn payload_types(&self) -> Vec<&str> {
        match &self.kind {
            VariantKind::Unit => Vec::new(),
            VariantKind::Tuple(types) => types.iter().map(String::as_str).collect(),
            VariantKind::Struct(fields) => fields.iter().map(|(_, ty)| ty.as_str()).collect(),
        }
    }

    /// Field names for struct variants, positional names otherwise.
    pub fn binding_names(&self) -> Vec<String> {
        match &self.kind {
            VariantKind::Unit => Vec::new(),
            VariantKind::Tuple(types) => {
                (0..types.len()).map(|i| format!("a{}", i)).collect()
            }
            VariantKind::Struct(fields) => {
                fields.iter().map(|(name, _)| name.clone()).collect()
            }
        }
    }
}

/// A parsed `enum` declaration.
#[derive(Debug, Clone)]
pub struct EnumDescriptor {
    pub name: String,
    pub variants: Vec<VariantDescriptor>,
    /// Span of the `enum` header in the Dingo source.
    pub span: Span,
}

impl EnumDescriptor {
    /// `{TypeName}Tag` — the tag type name.
    pub fn tag_type(&self) -> String {
        format!("{}Tag", self.name)
    }

    /// `{TypeName}Tag{VariantName}` — a tag constant.
    pub fn tag_const(&self, variant: &str) -> String {
        format!("{}Tag{}", self.name, variant)
    }

    /// `{lowervariant}{index}` — a payload pointer field.
    pub fn field_name(&self, variant: &str, index: usize) -> String {
        format!("{}{}", variant.to_lowercase(), index)
    }

    /// `{TypeName}_{VariantName}` — a variant constructor.
    pub fn constructor(&self, variant: &str) -> String {
        format!("{}_{}", self.name, variant)
    }

    pub fn variant(&self, name: &str) -> Option<&VariantDescriptor> {
        self.variants.iter().find(|v| v.name == name)
    }
}

pub struct EnumProcessor;

impl Processor for EnumProcessor {
    fn name(&self) -> &'static str {
        "enums"
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
            let Some((name, brace_col)) = enum_header(line) else {
                out_lines.push(line.to_string());
                out_map.push(origin_of(map, n));
                n += 1;
                continue;
            };
            let origin = origin_of(map, n);
            let kw_col = scan::find_code(line, "enum").unwrap_or(0);
            let t_origin = derive_origin(origin, kw_col);
            let header_span = ctx.span_at(t_origin, "enum ".len() + name.len());

            let Some(end) = scan::scan_balanced(
                |l| input.line(l),
                line_count,
                n,
                brace_col,
                b'{',
                b'}',
            ) else {
                ctx.diags.push(Diagnostic::error(
                    DiagnosticKind::UnbalancedBraces { construct: "enum" },
                    header_span,
                ));
                out_lines.push(line.to_string());
                out_map.push(origin);
                n += 1;
                continue;
            };

            // Interior text between the braces.
            let mut body = String::new();
            for l in n..=end.line {
                let text = scan::strip_line_comment(input.line(l));
                let from = if l == n { brace_col + 1 } else { 0 };
                let to = if l == end.line { end.col.min(text.len()) } else { text.len() };
                if from < to {
                    body.push_str(&text[from..to]);
                }
                body.push('\n');
            }

            match parse_variants(&body) {
                Ok(variants) if variants.is_empty() => {
                    ctx.diags.push(
                        Diagnostic::error(
                            DiagnosticKind::EmptyEnum { name: name.clone() },
                            header_span,
                        )
                        .with_hint("declare at least one variant"),
                    );
                }
                Ok(variants) => {
                    let descriptor = EnumDescriptor {
                        name: name.clone(),
                        variants,
                        span: header_span,
                    };
                    check_collisions(&descriptor, header_span, ctx);
                    emit_scaffolding(&descriptor, t_origin, &mut out_lines, &mut out_map);
                    ctx.enums.push(descriptor);
                }
                Err(message) => {
                    ctx.diags.push(Diagnostic::error(
                        DiagnosticKind::Custom(message),
                        header_span,
                    ));
                }
            }
            n = end.line + 1;
        }
        (SourceBuffer::from_lines(out_lines), out_map)
    }
}

/// Matches `enum Name {`, returning the name and the brace column.
fn enum_header(line: &str) -> Option<(String, usize)> {
    let kw = scan::find_code(line, "enum")?;
    if !scan::token_boundary(line, kw, 4) {
        return None;
    }
    // Only a declaration position: nothing but whitespace before it.
    if !line[..kw].trim().is_empty() {
        return None;
    }
    let rest = line[kw + 4..].trim_start();
    let name_len = rest
        .bytes()
        .position(|b| !scan::is_ident_byte(b))
        .unwrap_or(rest.len());
    if name_len == 0 {
        return None;
    }
    let name = &rest[..name_len];
    if !name.starts_with(|c: char| c.is_ascii_uppercase()) {
        return None;
    }
    let brace_col = scan::find_code(line, "{")?;
    Some((name.to_string(), brace_col))
}

/// Parses the interior of an enum block into variant descriptors.
fn parse_variants(body: &str) -> Result<Vec<VariantDescriptor>, String> {
    let joined = body.replace('\n', ",");
    let mut variants = Vec::new();
    for part in scan::split_top_level(&joined, b',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        variants.push(parse_variant(part)?);
    }
    Ok(variants)
}

fn parse_variant(text: &str) -> Result<VariantDescriptor, String> {
    let name_len = text
        .bytes()
        .position(|b| !scan::is_ident_byte(b))
        .unwrap_or(text.len());
    if name_len == 0 {
        return Err(format!("malformed enum variant: {:?}", text));
    }
    let name = text[..name_len].to_string();
    let rest = text[name_len..].trim();

    if rest.is_empty() {
        return Ok(VariantDescriptor { name, kind: VariantKind::Unit });
    }
    if rest.starts_with('(') && rest.ends_with(')') {
        let inner = &rest[1..rest.len() - 1];
        let types = scan::split_top_level(inner, b',')
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>();
        if types.is_empty() {
            return Err(format!("tuple variant {} has no payload types", name));
        }
        return Ok(VariantDescriptor { name, kind: VariantKind::Tuple(types) });
    }
    if rest.starts_with('{') && rest.ends_with('}') {
        let inner = &rest[1..rest.len() - 1];
        let mut fields = Vec::new();
        for field in scan::split_top_level(inner, b',') {
            let field = field.trim();
            if field.is_empty() {
                continue;
            }
            // `name: type` or `name type`.
            let (field_name, ty) = match field.find(':') {
                Some(colon) => (field[..colon].trim(), field[colon + 1..].trim()),
                None => match field.find(' ') {
                    Some(space) => (field[..space].trim(), field[space..].trim()),
                    None => return Err(format!("malformed field in variant {}: {:?}", name, field)),
                },
            };
            if field_name.is_empty() || ty.is_empty() {
                return Err(format!("malformed field in variant {}: {:?}", name, field));
            }
            fields.push((field_name.to_string(), ty.to_string()));
        }
        if fields.is_empty() {
            return Err(format!("struct variant {} has no fields", name));
        }
        return Ok(VariantDescriptor { name, kind: VariantKind::Struct(fields) });
    }
    Err(format!("malformed enum variant: {:?}", text))
}

/// Duplicate variants and case-colliding payload fields are declaration
/// errors.
fn check_collisions(descriptor: &EnumDescriptor, span: Span, ctx: &mut PassContext<'_>) {
    for (i, variant) in descriptor.variants.iter().enumerate() {
        if descriptor.variants[..i].iter().any(|v| v.name == variant.name) {
            ctx.diags.push(Diagnostic::error(
                DiagnosticKind::Custom(format!(
                    "variant {} declared more than once",
                    variant.name
                )),
                span,
            ));
        }
        if descriptor.variants[..i]
            .iter()
            .any(|v| v.name.to_lowercase() == variant.name.to_lowercase() && v.name != variant.name)
        {
            ctx.diags.push(Diagnostic::error(
                DiagnosticKind::VariantFieldCollision {
                    variant: variant.name.clone(),
                    field: descriptor.field_name(&variant.name, 0),
                },
                span,
            ));
        }
    }
}

/// Emits the Go scaffolding for one enum.
fn emit_scaffolding(
    descriptor: &EnumDescriptor,
    origin: dingo_base::LineOrigin,
    out_lines: &mut Vec<String>,
    out_map: &mut PosMap,
) {
    let mut push = |text: String| {
        out_lines.push(text);
        out_map.push(origin);
    };

    // Tag type and constants.
    push(format!("type {} uint8", descriptor.tag_type()));
    push(String::new());
    push("const (".to_string());
    for (i, variant) in descriptor.variants.iter().enumerate() {
        if i == 0 {
            push(format!(
                "\t{} {} = iota",
                descriptor.tag_const(&variant.name),
                descriptor.tag_type()
            ));
        } else {
            push(format!("\t{}", descriptor.tag_const(&variant.name)));
        }
    }
    push(")".to_string());
    push(String::new());

    // Backing struct.
    push(format!("type {} struct {{", descriptor.name));
    push(format!("\ttag {}", descriptor.tag_type()));
    for variant in &descriptor.variants {
        for (i, ty) in variant.payload_types().iter().enumerate() {
            push(format!("\t{} *{}", descriptor.field_name(&variant.name, i), ty));
        }
    }
    push("}".to_string());

    // Constructors.
    for variant in &descriptor.variants {
        push(String::new());
        let params: Vec<String> = variant
            .binding_names()
            .iter()
            .zip(variant.payload_types())
            .map(|(name, ty)| format!("{} {}", name, ty))
            .collect();
        push(format!(
            "func {}({}) {} {{",
            descriptor.constructor(&variant.name),
            params.join(", "),
            descriptor.name
        ));
        let mut fields = vec![format!("tag: {}", descriptor.tag_const(&variant.name))];
        for (i, name) in variant.binding_names().iter().enumerate() {
            fields.push(format!("{}: &{}", descriptor.field_name(&variant.name, i), name));
        }
        push(format!("\treturn {}{{{}}}", descriptor.name, fields.join(", ")));
        push("}".to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::PreprocessOptions;
    use dingo_base::DiagnosticBag;

    fn run(src: &str) -> (String, Vec<EnumDescriptor>, DiagnosticBag) {
        let options = PreprocessOptions::default();
        let mut diags = DiagnosticBag::new();
        let mut ctx = PassContext::new(src, &options, &mut diags);
        let input = SourceBuffer::new(src);
        let map = PosMap::identity(input.line_count());
        let (out, out_map) = EnumProcessor.process(&input, &map, &mut ctx);
        assert_eq!(out_map.len(), out.line_count());
        let enums = ctx.enums.clone();
        (out.text().to_string(), enums, diags)
    }

    #[test]
    fn parses_unit_variants() {
        let (out, enums, diags) = run("enum Color {\n\tRed,\n\tGreen,\n\tBlue,\n}\n");
        assert!(diags.is_empty());
        assert_eq!(enums.len(), 1);
        assert_eq!(enums[0].variants.len(), 3);
        assert!(enums[0].variants.iter().all(|v| v.kind == VariantKind::Unit));
        assert!(out.contains("type ColorTag uint8"));
        assert!(out.contains("\tColorTagRed ColorTag = iota"));
        assert!(out.contains("func Color_Red() Color {"));
        assert!(out.contains("\treturn Color{tag: ColorTagRed}"));
    }

    #[test]
    fn parses_tuple_variants_with_pointer_fields() {
        let (out, enums, diags) = run("enum Value {\n\tInt(int),\n\tStr(string),\n}\n");
        assert!(diags.is_empty());
        let value = &enums[0];
        assert_eq!(value.variant("Int").unwrap().kind, VariantKind::Tuple(vec!["int".into()]));
        assert!(out.contains("\tint0 *int"));
        assert!(out.contains("\tstr0 *string"));
        assert!(out.contains("func Value_Int(a0 int) Value {"));
        assert!(out.contains("\treturn Value{tag: ValueTagInt, int0: &a0}"));
    }

    #[test]
    fn parses_struct_variants() {
        let (out, enums, diags) =
            run("enum Shape {\n\tCircle{radius: float64},\n\tRectangle{width: float64, height: float64},\n}\n");
        assert!(diags.is_empty());
        let shape = &enums[0];
        assert_eq!(
            shape.variant("Rectangle").unwrap().binding_names(),
            vec!["width", "height"]
        );
        assert!(out.contains("\tcircle0 *float64"));
        assert!(out.contains("\trectangle0 *float64"));
        assert!(out.contains("\trectangle1 *float64"));
        assert!(out.contains("func Shape_Circle(radius float64) Shape {"));
    }

    #[test]
    fn empty_enum_is_one_error_and_no_declarations() {
        let (out, enums, diags) = run("enum Nothing {\n}\n");
        assert_eq!(diags.len(), 1);
        assert!(diags
            .iter()
            .any(|d| matches!(d.kind, DiagnosticKind::EmptyEnum { .. })));
        assert!(enums.is_empty());
        assert!(!out.contains("Nothing"));
    }

    #[test]
    fn single_unit_variant_compiles() {
        let (out, enums, diags) = run("enum Marker {\n\tPresent,\n}\n");
        assert!(diags.is_empty());
        assert_eq!(enums[0].variants.len(), 1);
        assert!(out.contains("func Marker_Present() Marker {"));
    }

    #[test]
    fn unbalanced_braces_report_and_leave_text() {
        let (out, _, diags) = run("enum Broken {\n\tRed,\n");
        assert!(diags
            .iter()
            .any(|d| matches!(d.kind, DiagnosticKind::UnbalancedBraces { construct: "enum" })));
        assert!(out.contains("enum Broken {"));
    }

    #[test]
    fn consecutive_enums_do_not_merge() {
        let (out, enums, diags) = run("enum A {\n\tX,\n}\n\nenum B {\n\tY,\n}\n");
        assert!(diags.is_empty());
        assert_eq!(enums.len(), 2);
        assert!(out.contains("func A_X() A {"));
        assert!(out.contains("func B_Y() B {"));
    }

    #[test]
    fn duplicate_variant_is_an_error() {
        let (_, _, diags) = run("enum Twice {\n\tRed,\n\tRed,\n}\n");
        assert!(diags.has_errors());
    }

    #[test]
    fn non_enum_lines_pass_through() {
        let (out, enums, _) = run("x := 1\nif enumerate(x) {\n}\n");
        assert!(enums.is_empty());
        assert!(out.contains("if enumerate(x) {"));
    }
}
