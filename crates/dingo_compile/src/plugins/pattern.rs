//! Match plugin: sentinel discovery, exhaustiveness, binding synthesis.
//!
//! The preprocessor leaves `match` constructs as condition switches whose
//! cases are `__dingo_arm("<pattern>")` markers under a
//! `DINGO_MATCH_START` comment. This plugin:
//!
//! 1. determines the scrutinee's static type through the inference
//!    service;
//! 2. checks exhaustiveness — the union of unguarded arms must cover
//!    every variant, or a wildcard arm must be present (guarded arms
//!    never count as coverage);
//! 3. rewrites the cases into tag comparisons with binding statements
//!    that dereference the payload pointers, with configurable nil
//!    guards; and
//! 4. validates the rest of the arm taxonomy: duplicate arms, guards on
//!    wildcards, unsupported (literal) patterns, arity mismatches.
//!
//! Matches without guards or tuple scrutinees become tag switches
//! (`switch s.tag { case ValueTagInt: … }`); anything needing per-arm
//! conditions becomes a condition switch evaluated in arm order, which
//! preserves first-match-wins semantics.

use crate::config::NilSafety;
use crate::context::PluginContext;
use crate::infer::{InferService, Scope, SumType};
use crate::plugin::Plugin;
use dingo_base::{DiagnosticKind, Interner, Span, Symbol};
use dingo_goparse::ast::{
    AssignOp, BinaryOp, Block, CaseClause, Decl, Expr, FuncDecl, Ident, Stmt, StmtNode,
};
use dingo_goparse::parser::Parser;
use dingo_goparse::token::LitKind;
use dingo_preprocess::scan;
use std::collections::{HashMap, HashSet};

#[derive(Default)]
pub struct MatchPlugin;

impl Plugin for MatchPlugin {
    fn name(&self) -> &'static str {
        "pattern-match"
    }

    fn transform(&mut self, ctx: &mut PluginContext<'_>) {
        let mut file = std::mem::replace(
            &mut ctx.file,
            dingo_goparse::ast::File {
                package: Ident::synthetic(Symbol::EMPTY),
                imports: Vec::new(),
                decls: Vec::new(),
                span: Span::default(),
            },
        );

        let errors = {
            let mut worker = Worker {
                service: InferService {
                    types: &ctx.types,
                    enums: &ctx.enums,
                    results: &ctx.results,
                    options: &ctx.options,
                },
                nil_safety: ctx.config.nil_safety_checks,
                errors: Vec::new(),
                fresh: 0,
            };
            for decl in &mut file.decls {
                if let Decl::Func(func) = decl {
                    worker.walk_func(func, ctx.interner);
                }
            }
            worker.errors
        };

        ctx.file = file;
        for (span, kind, hint) in errors {
            match hint {
                Some(hint) => ctx.error_with_hint(span, kind, &hint),
                None => ctx.error_at(span, kind),
            }
        }
    }
}

// ─── Arm model ──────────────────────────────────────────────────────────

/// One position of a (possibly tuple) pattern.
#[derive(Debug, Clone)]
struct PatPos {
    /// `None` for a wildcard position.
    variant: Option<String>,
    /// `(binding_name, payload_index)` pairs.
    bindings: Vec<(String, usize)>,
}

#[derive(Debug, Clone)]
struct ArmSpec {
    positions: Vec<PatPos>,
    guard: Option<String>,
    body: Vec<StmtNode>,
    is_default: bool,
    span: Span,
}

impl ArmSpec {
    fn is_wildcard(&self) -> bool {
        self.is_default || self.positions.iter().all(|p| p.variant.is_none())
    }
}

// ─── Worker ─────────────────────────────────────────────────────────────

struct Worker<'s> {
    service: InferService<'s>,
    nil_safety: NilSafety,
    errors: Vec<(Span, DiagnosticKind, Option<String>)>,
    fresh: u32,
}

impl<'s> Worker<'s> {
    fn walk_func(&mut self, func: &mut FuncDecl, interner: &mut Interner) {
        let scope = self.service.function_scope(func, interner);
        if let Some(body) = &mut func.body {
            self.walk_block(body, &scope, interner);
        }
    }

    fn walk_block(&mut self, block: &mut Block, scope: &Scope, interner: &mut Interner) {
        for node in &mut block.stmts {
            let marker = node.marker("DINGO_MATCH_START").map(str::to_string);
            if let (Some(marker), Stmt::Switch { .. }) = (marker, &node.stmt) {
                self.rewrite_match(&mut node.stmt, &marker, scope, interner);
            }
            self.walk_stmt(&mut node.stmt, scope, interner);
        }
    }

    /// Recurses into every nested block, including function literals
    /// (the expression-context wrapper lives inside one).
    fn walk_stmt(&mut self, stmt: &mut Stmt, scope: &Scope, interner: &mut Interner) {
        match stmt {
            Stmt::If { init, then, els, cond, .. } => {
                if let Some(init) = init {
                    self.walk_stmt(init, scope, interner);
                }
                self.walk_expr(cond, scope, interner);
                self.walk_block(then, scope, interner);
                if let Some(els) = els {
                    self.walk_stmt(els, scope, interner);
                }
            }
            Stmt::For { init, cond, post, body, .. } => {
                if let Some(init) = init {
                    self.walk_stmt(init, scope, interner);
                }
                if let Some(cond) = cond {
                    self.walk_expr(cond, scope, interner);
                }
                if let Some(post) = post {
                    self.walk_stmt(post, scope, interner);
                }
                self.walk_block(body, scope, interner);
            }
            Stmt::Range { expr, body, .. } => {
                self.walk_expr(expr, scope, interner);
                self.walk_block(body, scope, interner);
            }
            Stmt::Switch { init, tag, cases, .. } => {
                if let Some(init) = init {
                    self.walk_stmt(init, scope, interner);
                }
                if let Some(tag) = tag {
                    self.walk_expr(tag, scope, interner);
                }
                for case in cases {
                    for node in &mut case.body {
                        let marker = node.marker("DINGO_MATCH_START").map(str::to_string);
                        if let (Some(marker), Stmt::Switch { .. }) = (marker, &node.stmt) {
                            self.rewrite_match(&mut node.stmt, &marker, scope, interner);
                        }
                        self.walk_stmt(&mut node.stmt, scope, interner);
                    }
                }
            }
            Stmt::Block(block) => self.walk_block(block, scope, interner),
            Stmt::Assign { lhs, rhs, .. } => {
                for expr in lhs.iter_mut().chain(rhs.iter_mut()) {
                    self.walk_expr(expr, scope, interner);
                }
            }
            Stmt::Expr(expr)
            | Stmt::Defer { call: expr, .. }
            | Stmt::Go { call: expr, .. } => self.walk_expr(expr, scope, interner),
            Stmt::Return { exprs, .. } => {
                for expr in exprs {
                    self.walk_expr(expr, scope, interner);
                }
            }
            Stmt::Var(spec) | Stmt::Const(spec) => {
                for expr in &mut spec.values {
                    self.walk_expr(expr, scope, interner);
                }
            }
            _ => {}
        }
    }

    fn walk_expr(&mut self, expr: &mut Expr, scope: &Scope, interner: &mut Interner) {
        match expr {
            Expr::FuncLit { body, .. } => self.walk_block(body, scope, interner),
            Expr::Call { func, args, .. } => {
                self.walk_expr(func, scope, interner);
                for arg in args {
                    self.walk_expr(arg, scope, interner);
                }
            }
            Expr::Binary { lhs, rhs, .. } => {
                self.walk_expr(lhs, scope, interner);
                self.walk_expr(rhs, scope, interner);
            }
            Expr::Unary { expr: inner, .. }
            | Expr::Star { expr: inner, .. }
            | Expr::Paren { expr: inner, .. }
            | Expr::Selector { expr: inner, .. } => self.walk_expr(inner, scope, interner),
            Expr::Index { expr: inner, indices, .. } => {
                self.walk_expr(inner, scope, interner);
                for index in indices {
                    self.walk_expr(index, scope, interner);
                }
            }
            Expr::Composite { elems, .. } => {
                for elem in elems {
                    self.walk_expr(&mut elem.value, scope, interner);
                }
            }
            _ => {}
        }
    }

    // ─── The rewrite itself ─────────────────────────────────────────────

    fn rewrite_match(
        &mut self,
        stmt: &mut Stmt,
        marker: &str,
        scope: &Scope,
        interner: &mut Interner,
    ) {
        let span = stmt.span();
        let Some((is_expr, scrutinee_text)) = parse_marker(marker) else {
            self.error(span, DiagnosticKind::Custom("malformed match sentinel".into()), None);
            return;
        };

        // Tuple scrutinees: `(a, b)` with more than one top-level part.
        let scrutinee_texts = split_scrutinee(&scrutinee_text);
        let mut scrutinees = Vec::new();
        for text in &scrutinee_texts {
            match Parser::standalone_expr(text, interner) {
                Ok(expr) => scrutinees.push(expr),
                Err(_) => {
                    self.error(
                        span,
                        DiagnosticKind::Custom(format!("cannot parse match scrutinee {:?}", text)),
                        None,
                    );
                    return;
                }
            }
        }

        // One sum type per scrutinee position, when determinable.
        let sums: Vec<Option<SumType<'s>>> = scrutinees
            .iter()
            .map(|expr| {
                self.service
                    .type_of_expr(expr, scope, interner)
                    .and_then(|ty| self.service.sum_type(&ty))
            })
            .collect();

        let Stmt::Switch { cases, .. } = stmt else { return };
        let Some(arms) = self.parse_arms(cases, &sums, span, interner) else {
            return;
        };

        if !self.validate(&arms, &sums, span) {
            return;
        }

        // Bind non-trivial scrutinees once, in the switch init. A match
        // with only wildcard arms never reads the scrutinee, and an
        // unread binding would not compile.
        let mut init = None;
        let needs_binding = scrutinees.iter().any(|e| !matches!(e, Expr::Ident(_)))
            && arms.iter().any(|a| !a.is_default);
        let scrut_refs: Vec<Expr> = if needs_binding {
            let mut names = Vec::new();
            for _ in &scrutinees {
                let name = interner.intern(&format!("__match{}", self.fresh));
                self.fresh += 1;
                names.push(name);
            }
            init = Some(Box::new(Stmt::Assign {
                lhs: names
                    .iter()
                    .map(|sym| Expr::Ident(Ident::new(*sym, span)))
                    .collect(),
                op: AssignOp::Define,
                rhs: scrutinees.clone(),
                span,
            }));
            names
                .into_iter()
                .map(|sym| Expr::Ident(Ident::new(sym, span)))
                .collect()
        } else {
            // Wildcard-only matches still evaluate the scrutinee.
            if scrutinees.len() == 1 && !matches!(scrutinees[0], Expr::Ident(_)) {
                init = Some(Box::new(Stmt::Expr(scrutinees[0].clone())));
            }
            scrutinees.clone()
        };

        let has_guards = arms.iter().any(|a| a.guard.is_some());
        let tuple = scrutinees.len() > 1;
        let tag_mode = !has_guards && !tuple && sums[0].is_some();

        let mut new_cases = Vec::new();
        for arm in &arms {
            let case = if tag_mode {
                self.build_tag_case(arm, &sums[0], &scrut_refs[0], span, interner)
            } else {
                self.build_cond_case(arm, &sums, &scrut_refs, span, interner)
            };
            match case {
                Some(case) => new_cases.push(case),
                None => return,
            }
        }

        // Deterministic case order for expression wrappers: variant
        // declaration order, default last.
        if is_expr && tag_mode {
            if let Some(sum) = &sums[0] {
                let order: Vec<String> = sum.variants();
                new_cases.sort_by_key(|case: &CaseClause| {
                    if case.exprs.is_empty() {
                        return order.len();
                    }
                    arm_variant_index(case, &order, interner)
                });
            }
        }

        let tag = if tag_mode {
            Some(selector(scrut_refs[0].clone(), interner.intern("tag"), span))
        } else {
            None
        };
        *stmt = Stmt::Switch { init, tag, cases: new_cases, span };
    }

    /// Parses every case's `__dingo_arm` marker into an [`ArmSpec`].
    fn parse_arms(
        &mut self,
        cases: &[CaseClause],
        sums: &[Option<SumType<'s>>],
        span: Span,
        interner: &Interner,
    ) -> Option<Vec<ArmSpec>> {
        let mut arms = Vec::new();
        for case in cases {
            if case.exprs.is_empty() {
                arms.push(ArmSpec {
                    positions: vec![
                        PatPos { variant: None, bindings: Vec::new() };
                        sums.len()
                    ],
                    guard: None,
                    body: case.body.clone(),
                    is_default: true,
                    span: case.span,
                });
                continue;
            }
            let Some(pattern_text) = arm_marker_text(case, interner) else {
                // An ordinary switch that merely sits inside a match
                // region; nothing to do for it.
                return None;
            };
            let (pattern_part, guard) = split_guard_text(&pattern_text);
            match self.parse_pattern(&pattern_part, sums, case.span) {
                Some(positions) => arms.push(ArmSpec {
                    positions,
                    guard,
                    body: case.body.clone(),
                    is_default: false,
                    span: case.span,
                }),
                None => return None,
            }
        }
        if arms.is_empty() {
            self.error(span, DiagnosticKind::Custom("match has no arms".into()), None);
            return None;
        }
        Some(arms)
    }

    /// Parses one pattern text against the scrutinee positions.
    fn parse_pattern(
        &mut self,
        text: &str,
        sums: &[Option<SumType<'s>>],
        span: Span,
    ) -> Option<Vec<PatPos>> {
        let parts: Vec<String> = if sums.len() > 1 {
            let trimmed = text.trim();
            if !trimmed.starts_with('(') || !trimmed.ends_with(')') {
                self.error(
                    span,
                    DiagnosticKind::UnsupportedPattern { form: text.to_string() },
                    Some("tuple scrutinees take tuple patterns like (Ok(x), _)".into()),
                );
                return None;
            }
            scan::split_top_level(&trimmed[1..trimmed.len() - 1], b',')
                .into_iter()
                .map(|p| p.trim().to_string())
                .collect()
        } else {
            vec![text.trim().to_string()]
        };

        if parts.len() != sums.len() {
            self.error(
                span,
                DiagnosticKind::PatternTypeMismatch {
                    expected: format!("{} positions", sums.len()),
                    found: format!("{} subpatterns", parts.len()),
                },
                None,
            );
            return None;
        }

        let mut positions = Vec::new();
        for (part, sum) in parts.iter().zip(sums) {
            positions.push(self.parse_position(part, sum, span)?);
        }
        Some(positions)
    }

    fn parse_position(
        &mut self,
        text: &str,
        sum: &Option<SumType<'s>>,
        span: Span,
    ) -> Option<PatPos> {
        let text = text.trim();
        if text == "_" {
            return Some(PatPos { variant: None, bindings: Vec::new() });
        }
        if text.starts_with(|c: char| c.is_ascii_digit() || c == '"' || c == '\'') {
            self.error(
                span,
                DiagnosticKind::UnsupportedPattern { form: text.to_string() },
                Some("literal patterns are not supported; bind and guard instead".into()),
            );
            return None;
        }

        let name_end = text
            .bytes()
            .position(|b| !scan::is_ident_byte(b))
            .unwrap_or(text.len());
        let name = &text[..name_end];
        let rest = text[name_end..].trim();

        let Some(sum) = sum else {
            self.error(
                span,
                DiagnosticKind::Custom(format!(
                    "cannot match variant pattern {:?} against a value of unknown type",
                    text
                )),
                Some("only a wildcard arm is possible here".into()),
            );
            return None;
        };

        // Accept both the surface variant name and the constructor form.
        let variant = sum
            .variants()
            .into_iter()
            .find(|v| v == name || format!("{}_{}", sum.type_name(), v) == name);
        let Some(variant) = variant else {
            self.error(
                span,
                DiagnosticKind::PatternTypeMismatch {
                    expected: sum.type_name().to_string(),
                    found: name.to_string(),
                },
                None,
            );
            return None;
        };

        let payload = sum.payload(&variant);
        let mut bindings = Vec::new();
        if rest.is_empty() {
            // Unit-style pattern; fine even for payload variants (no
            // destructuring requested).
        } else if rest.starts_with('(') && rest.ends_with(')') {
            let names: Vec<&str> = scan::split_top_level(&rest[1..rest.len() - 1], b',')
                .into_iter()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect();
            if names.len() != payload.len() {
                self.error(
                    span,
                    DiagnosticKind::PatternTypeMismatch {
                        expected: format!("{} payload values", payload.len()),
                        found: format!("{} bindings", names.len()),
                    },
                    None,
                );
                return None;
            }
            for (i, binding) in names.iter().enumerate() {
                if *binding != "_" {
                    bindings.push((binding.to_string(), i));
                }
            }
        } else if rest.starts_with('{') && rest.ends_with('}') {
            let SumType::Enum(descriptor) = sum else {
                self.error(
                    span,
                    DiagnosticKind::UnsupportedPattern { form: text.to_string() },
                    None,
                );
                return None;
            };
            let Some(field_names) = descriptor.variant(&variant).map(|v| v.binding_names())
            else {
                return None;
            };
            for field in scan::split_top_level(&rest[1..rest.len() - 1], b',') {
                let field = field.trim();
                if field.is_empty() {
                    continue;
                }
                // `field` or `field: alias`.
                let (field_name, binding) = match field.find(':') {
                    Some(colon) => (field[..colon].trim(), field[colon + 1..].trim()),
                    None => (field, field),
                };
                let Some(index) = field_names.iter().position(|f| f == field_name) else {
                    self.error(
                        span,
                        DiagnosticKind::PatternTypeMismatch {
                            expected: variant.clone(),
                            found: field_name.to_string(),
                        },
                        None,
                    );
                    return None;
                };
                bindings.push((binding.to_string(), index));
            }
        } else {
            self.error(
                span,
                DiagnosticKind::UnsupportedPattern { form: text.to_string() },
                None,
            );
            return None;
        }

        Some(PatPos { variant: Some(variant), bindings })
    }

    /// Duplicate arms, wildcard guards, exhaustiveness.
    fn validate(
        &mut self,
        arms: &[ArmSpec],
        sums: &[Option<SumType<'s>>],
        span: Span,
    ) -> bool {
        let mut ok = true;

        for arm in arms {
            if arm.is_wildcard() && arm.guard.is_some() {
                self.error(arm.span, DiagnosticKind::GuardOnWildcard, None);
                ok = false;
            }
        }

        // Duplicate unguarded single-scrutinee arms.
        if sums.len() == 1 {
            let mut seen = HashSet::new();
            for arm in arms {
                if arm.guard.is_some() || arm.is_default {
                    continue;
                }
                if let Some(variant) = &arm.positions[0].variant {
                    if !seen.insert(variant.clone()) {
                        self.error(
                            arm.span,
                            DiagnosticKind::DuplicateArm { variant: variant.clone() },
                            None,
                        );
                        ok = false;
                    }
                }
            }
        }

        let has_wildcard = arms.iter().any(|a| a.is_wildcard() && a.guard.is_none());
        if has_wildcard {
            return ok;
        }

        // Unknown scrutinee types claim no exhaustiveness; they simply
        // require the wildcard we just found absent.
        if sums.iter().any(Option::is_none) {
            self.error(
                span,
                DiagnosticKind::Custom(
                    "match over a value of unknown type requires a wildcard arm".into(),
                ),
                Some("add a wildcard arm".into()),
            );
            return false;
        }

        // Cartesian coverage by unguarded arms.
        let variant_axes: Vec<Vec<String>> = sums
            .iter()
            .map(|s| s.as_ref().map(|s| s.variants()).unwrap_or_default())
            .collect();
        let mut missing = Vec::new();
        for combo in cartesian(&variant_axes) {
            let covered = arms.iter().any(|arm| {
                arm.guard.is_none()
                    && !arm.is_default
                    && arm
                        .positions
                        .iter()
                        .zip(&combo)
                        .all(|(pos, v)| pos.variant.as_deref().map(|p| p == v).unwrap_or(true))
            });
            if !covered {
                missing.push(if combo.len() == 1 {
                    combo[0].clone()
                } else {
                    format!("({})", combo.join(", "))
                });
            }
        }
        if !missing.is_empty() {
            self.error(
                span,
                DiagnosticKind::NonExhaustiveMatch { missing },
                Some("add a wildcard arm".into()),
            );
            ok = false;
        }
        ok
    }

    /// A `case {Type}Tag{Variant}:` clause with bindings.
    fn build_tag_case(
        &mut self,
        arm: &ArmSpec,
        sum: &Option<SumType<'s>>,
        scrut: &Expr,
        span: Span,
        interner: &mut Interner,
    ) -> Option<CaseClause> {
        let mut body = Vec::new();
        let exprs = if arm.is_default {
            Vec::new()
        } else {
            let sum = sum.as_ref()?;
            let variant = arm.positions[0].variant.as_ref()?;
            self.push_bindings(&mut body, &arm.positions[0], sum, scrut, span, interner);
            vec![Expr::Ident(Ident::new(
                interner.intern(&sum.tag_const(variant)),
                span,
            ))]
        };
        body.extend(arm.body.iter().cloned());
        Some(CaseClause {
            leading: Vec::new(),
            exprs,
            body,
            span: arm.span,
        })
    }

    /// A condition-switch clause: tag comparisons plus the substituted
    /// guard.
    fn build_cond_case(
        &mut self,
        arm: &ArmSpec,
        sums: &[Option<SumType<'s>>],
        scruts: &[Expr],
        span: Span,
        interner: &mut Interner,
    ) -> Option<CaseClause> {
        if arm.is_default {
            return Some(CaseClause {
                leading: Vec::new(),
                exprs: Vec::new(),
                body: arm.body.clone(),
                span: arm.span,
            });
        }

        let mut condition: Option<Expr> = None;
        let mut substitutions: HashMap<String, Expr> = HashMap::new();
        let mut body = Vec::new();

        for ((pos, sum), scrut) in arm.positions.iter().zip(sums).zip(scruts) {
            if let Some(variant) = &pos.variant {
                let sum = sum.as_ref()?;
                let tag_cmp = Expr::Binary {
                    op: BinaryOp::Eq,
                    lhs: Box::new(selector(scrut.clone(), interner.intern("tag"), span)),
                    rhs: Box::new(Expr::Ident(Ident::new(
                        interner.intern(&sum.tag_const(variant)),
                        span,
                    ))),
                    span,
                };
                condition = Some(match condition {
                    Some(lhs) => Expr::Binary {
                        op: BinaryOp::LogicalAnd,
                        lhs: Box::new(lhs),
                        rhs: Box::new(tag_cmp),
                        span,
                    },
                    None => tag_cmp,
                });
                for (binding, index) in &pos.bindings {
                    let field = interner.intern(&sum.field_name(variant, *index));
                    let deref = Expr::Paren {
                        expr: Box::new(Expr::Star {
                            expr: Box::new(selector(scrut.clone(), field, span)),
                            span,
                        }),
                        span,
                    };
                    substitutions.insert(binding.clone(), deref);
                }
                self.push_bindings(&mut body, pos, sum, scrut, span, interner);
            }
        }

        if let Some(guard_text) = &arm.guard {
            let Ok(mut guard) = Parser::standalone_expr(guard_text, interner) else {
                self.error(
                    arm.span,
                    DiagnosticKind::Custom(format!("cannot parse guard {:?}", guard_text)),
                    None,
                );
                return None;
            };
            substitute(&mut guard, &substitutions, interner);
            condition = Some(match condition {
                Some(lhs) => Expr::Binary {
                    op: BinaryOp::LogicalAnd,
                    lhs: Box::new(lhs),
                    rhs: Box::new(Expr::Paren { expr: Box::new(guard), span }),
                    span,
                },
                None => guard,
            });
        }

        body.extend(arm.body.iter().cloned());
        // An all-wildcard tuple arm with no guard matches unconditionally.
        let condition = condition
            .unwrap_or_else(|| Expr::Ident(Ident::new(interner.intern("true"), span)));
        Some(CaseClause {
            leading: Vec::new(),
            exprs: vec![condition],
            body,
            span: arm.span,
        })
    }

    /// Binding statements: optional nil guard, deref binding, use-silencer.
    fn push_bindings(
        &mut self,
        body: &mut Vec<StmtNode>,
        pos: &PatPos,
        sum: &SumType<'s>,
        scrut: &Expr,
        span: Span,
        interner: &mut Interner,
    ) {
        let Some(variant) = &pos.variant else { return };
        for (binding, index) in &pos.bindings {
            let field = interner.intern(&sum.field_name(variant, *index));
            let field_expr = selector(scrut.clone(), field, span);

            match self.nil_safety {
                NilSafety::Off => {}
                NilSafety::On | NilSafety::Debug => {
                    let nil_check = Expr::Binary {
                        op: BinaryOp::Eq,
                        lhs: Box::new(field_expr.clone()),
                        rhs: Box::new(Expr::Ident(Ident::new(interner.intern("nil"), span))),
                        span,
                    };
                    let cond = if self.nil_safety == NilSafety::Debug {
                        Expr::Binary {
                            op: BinaryOp::LogicalAnd,
                            lhs: Box::new(Expr::Ident(Ident::new(
                                interner.intern("__dingoDebug"),
                                span,
                            ))),
                            rhs: Box::new(nil_check),
                            span,
                        }
                    } else {
                        nil_check
                    };
                    let message = format!("match binding {}: nil payload", variant);
                    body.push(StmtNode::bare(Stmt::If {
                        init: None,
                        cond,
                        then: Block {
                            stmts: vec![StmtNode::bare(Stmt::Expr(Expr::Call {
                                func: Box::new(Expr::Ident(Ident::new(
                                    interner.intern("panic"),
                                    span,
                                ))),
                                args: vec![Expr::Lit {
                                    kind: LitKind::String,
                                    value: format!("{:?}", message),
                                    span,
                                }],
                                ellipsis: false,
                                span,
                            }))],
                            trailing: Vec::new(),
                            span,
                        },
                        els: None,
                        span,
                    }));
                }
            }

            let binding_sym = interner.intern(binding);
            body.push(StmtNode::bare(Stmt::Assign {
                lhs: vec![Expr::Ident(Ident::new(binding_sym, span))],
                op: AssignOp::Define,
                rhs: vec![Expr::Star { expr: Box::new(field_expr), span }],
                span,
            }));
            // Bindings the arm body never reads must not break the build.
            body.push(StmtNode::bare(Stmt::Assign {
                lhs: vec![Expr::Ident(Ident::new(interner.intern("_"), span))],
                op: AssignOp::Assign,
                rhs: vec![Expr::Ident(Ident::new(binding_sym, span))],
                span,
            }));
        }
    }

    fn error(&mut self, span: Span, kind: DiagnosticKind, hint: Option<String>) {
        self.errors.push((span, kind, hint));
    }
}

// ─── Helpers ────────────────────────────────────────────────────────────

/// Parses `mode=… scrutinee=…` out of the sentinel marker text.
fn parse_marker(marker: &str) -> Option<(bool, String)> {
    let rest = marker.trim_start();
    let (mode, rest) = if let Some(r) = rest.strip_prefix("mode=expr ") {
        (true, r)
    } else if let Some(r) = rest.strip_prefix("mode=stmt ") {
        (false, r)
    } else {
        (false, rest)
    };
    let scrutinee = rest.trim_start().strip_prefix("scrutinee=")?;
    Some((mode, scrutinee.trim().to_string()))
}

/// Splits `(a, b)` scrutinee text into positions; single otherwise.
fn split_scrutinee(text: &str) -> Vec<String> {
    let trimmed = text.trim();
    if trimmed.starts_with('(') && trimmed.ends_with(')') {
        let parts: Vec<String> = scan::split_top_level(&trimmed[1..trimmed.len() - 1], b',')
            .into_iter()
            .map(|p| p.trim().to_string())
            .collect();
        if parts.len() > 1 {
            return parts;
        }
    }
    vec![trimmed.to_string()]
}

/// Extracts the pattern text of a `case __dingo_arm("…"):` clause.
fn arm_marker_text(case: &CaseClause, interner: &Interner) -> Option<String> {
    let Expr::Call { func, args, .. } = case.exprs.first()? else {
        return None;
    };
    let func_id = func.as_ident()?;
    if interner.resolve(func_id.sym) != "__dingo_arm" {
        return None;
    }
    let Some(Expr::Lit { kind: LitKind::String, value, .. }) = args.first() else {
        return None;
    };
    Some(unquote(value))
}

/// Undoes the quoting applied when the preprocessor embedded the pattern.
fn unquote(value: &str) -> String {
    let inner = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value);
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Splits `pattern if guard` at a top-level `if` token.
fn split_guard_text(text: &str) -> (String, Option<String>) {
    let mut depth = 0i32;
    let bytes = text.as_bytes();
    for (idx, b) in scan::code_bytes(text) {
        match b {
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => depth -= 1,
            b'i' if depth == 0
                && idx > 0
                && text[idx..].starts_with("if")
                && scan::token_boundary(text, idx, 2)
                && bytes[idx - 1] == b' ' =>
            {
                return (
                    text[..idx].trim().to_string(),
                    Some(text[idx + 2..].trim().to_string()),
                );
            }
            _ => {}
        }
    }
    (text.trim().to_string(), None)
}

fn selector(expr: Expr, sel: Symbol, span: Span) -> Expr {
    Expr::Selector {
        expr: Box::new(expr),
        sel: Ident::new(sel, span),
        span,
    }
}

/// Replaces binding identifiers in a guard with payload dereferences.
fn substitute(expr: &mut Expr, subs: &HashMap<String, Expr>, interner: &Interner) {
    match expr {
        Expr::Ident(id) => {
            if let Some(replacement) = subs.get(interner.resolve(id.sym)) {
                *expr = replacement.clone();
            }
        }
        Expr::Call { func, args, .. } => {
            substitute(func, subs, interner);
            for arg in args {
                substitute(arg, subs, interner);
            }
        }
        Expr::Binary { lhs, rhs, .. } => {
            substitute(lhs, subs, interner);
            substitute(rhs, subs, interner);
        }
        Expr::Unary { expr: inner, .. }
        | Expr::Star { expr: inner, .. }
        | Expr::Paren { expr: inner, .. }
        | Expr::Selector { expr: inner, .. } => substitute(inner, subs, interner),
        Expr::Index { expr: inner, indices, .. } => {
            substitute(inner, subs, interner);
            for index in indices {
                substitute(index, subs, interner);
            }
        }
        _ => {}
    }
}

/// Index of a tag case's variant in declaration order, for stable sorting.
fn arm_variant_index(case: &CaseClause, order: &[String], interner: &Interner) -> usize {
    let Some(Expr::Ident(id)) = case.exprs.first() else {
        return order.len();
    };
    let name = interner.resolve(id.sym);
    order
        .iter()
        .position(|v| name.ends_with(&format!("Tag{}", v)))
        .unwrap_or(order.len())
}

/// All combinations across the variant axes.
fn cartesian(axes: &[Vec<String>]) -> Vec<Vec<String>> {
    let mut combos: Vec<Vec<String>> = vec![Vec::new()];
    for axis in axes {
        let mut next = Vec::new();
        for combo in &combos {
            for variant in axis {
                let mut extended = combo.clone();
                extended.push(variant.clone());
                next.push(extended);
            }
        }
        combos = next;
    }
    combos
}
