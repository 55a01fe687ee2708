//! Result/Option synthesis plugin.
//!
//! For each distinct `Result<T, E>` / `Option<T>` instantiation used in
//! the file this plugin injects exactly one scaffolding set — tag type,
//! tag constants, backing struct, constructors — plus the full helper
//! suite (13 methods on Result, 8 on Option).
//!
//! The type-parametric helpers are emitted endomorphically: `Map` takes
//! `func(T) T` and `MapErr` takes `func(E) E`, because a method on a
//! concrete Go struct cannot carry its own type parameter. `Filter` is
//! the one cross-type method; it returns the matching `Option_T` and
//! registers that instantiation.
//!
//! During Transform it resolves *bare* constructor calls (`Ok(x)`,
//! `Err(e)`, `Some(x)`, `None`) to their instantiated names. Resolution
//! order is fixed: the expected type at the use position first (assignment
//! target, enclosing return type, call argument), then the argument's own
//! type for `Ok`/`Some` (the error side defaults to `error`). A bare
//! constructor that resolves to nothing is a hard diagnostic — never a
//! silently emitted placeholder.

use crate::context::PluginContext;
use crate::infer::{InferService, Scope};
use crate::plugin::Plugin;
use crate::synth;
use dingo_base::{DiagnosticKind, Interner, Span, Symbol};
use dingo_goparse::ast::{AssignOp, Block, Decl, Expr, FuncDecl, Stmt};
use dingo_goparse::printer::type_to_string;
use dingo_preprocess::generics::sanitize;
use dingo_preprocess::{OptionInstance, ResultInstance};
use std::fmt::Write;

#[derive(Default)]
pub struct ResultOptionPlugin;

impl Plugin for ResultOptionPlugin {
    fn name(&self) -> &'static str {
        "result-option"
    }

    fn transform(&mut self, ctx: &mut PluginContext<'_>) {
        if !ctx.config.result_type_enabled {
            return;
        }
        let mut file = std::mem::replace(
            &mut ctx.file,
            dingo_goparse::ast::File {
                package: dingo_goparse::ast::Ident::synthetic(Symbol::EMPTY),
                imports: Vec::new(),
                decls: Vec::new(),
                span: Span::default(),
            },
        );

        let mut outcome = {
            let mut rewriter = Rewriter {
                service: InferService {
                    types: &ctx.types,
                    enums: &ctx.enums,
                    results: &ctx.results,
                    options: &ctx.options,
                },
                ok: ctx.interner.intern("Ok"),
                err: ctx.interner.intern("Err"),
                some: ctx.interner.intern("Some"),
                none: ctx.interner.intern("None"),
                errors: Vec::new(),
                new_results: Vec::new(),
                new_options: Vec::new(),
            };
            for decl in &mut file.decls {
                if let Decl::Func(func) = decl {
                    rewriter.rewrite_func(func, ctx.interner);
                }
            }
            Outcome {
                errors: rewriter.errors,
                new_results: rewriter.new_results,
                new_options: rewriter.new_options,
            }
        };

        ctx.file = file;
        for (span, kind, hint) in outcome.errors.drain(..) {
            match hint {
                Some(hint) => ctx.error_with_hint(span, kind, &hint),
                None => ctx.error_at(span, kind),
            }
        }
        for instance in outcome.new_results {
            if !ctx.results.iter().any(|r| r.mangled == instance.mangled) {
                ctx.results.push(instance);
            }
        }
        for instance in outcome.new_options {
            if !ctx.options.iter().any(|o| o.mangled == instance.mangled) {
                ctx.options.push(instance);
            }
        }
    }

    fn inject(&mut self, ctx: &mut PluginContext<'_>) {
        if !ctx.config.result_type_enabled {
            return;
        }
        // Result.Filter returns the matching Option; make sure those
        // instantiations exist before generating.
        let filter_options: Vec<OptionInstance> = ctx
            .results
            .iter()
            .filter_map(|r| {
                let mangled = format!("Option_{}", sanitize(&r.ok));
                if ctx.options.iter().any(|o| o.mangled == mangled) {
                    None
                } else {
                    Some(OptionInstance { mangled, some: r.ok.clone(), span: r.span })
                }
            })
            .collect();
        ctx.options.extend(filter_options);

        let results = ctx.results.clone();
        for instance in &results {
            let text = result_scaffolding(instance);
            let decls = synth::parse_decls(&text, ctx.interner, instance.span);
            ctx.injected.extend(decls);
        }
        let options = ctx.options.clone();
        for instance in &options {
            let text = option_scaffolding(instance);
            let decls = synth::parse_decls(&text, ctx.interner, instance.span);
            ctx.injected.extend(decls);
        }
    }
}

struct Outcome {
    errors: Vec<(Span, DiagnosticKind, Option<String>)>,
    new_results: Vec<ResultInstance>,
    new_options: Vec<OptionInstance>,
}

/// Walks function bodies rewriting bare constructors with expected-type
/// context carried down from the statement level.
struct Rewriter<'s> {
    service: InferService<'s>,
    ok: Symbol,
    err: Symbol,
    some: Symbol,
    none: Symbol,
    errors: Vec<(Span, DiagnosticKind, Option<String>)>,
    new_results: Vec<ResultInstance>,
    new_options: Vec<OptionInstance>,
}

impl Rewriter<'_> {
    fn rewrite_func(&mut self, func: &mut FuncDecl, interner: &mut Interner) {
        let scope = self.service.function_scope(func, interner);
        if let Some(body) = &mut func.body {
            self.rewrite_block(body, &scope, interner);
        }
    }

    fn rewrite_block(&mut self, block: &mut Block, scope: &Scope, interner: &mut Interner) {
        for node in &mut block.stmts {
            self.rewrite_stmt(&mut node.stmt, scope, interner);
        }
    }

    fn rewrite_stmt(&mut self, stmt: &mut Stmt, scope: &Scope, interner: &mut Interner) {
        match stmt {
            Stmt::Var(spec) | Stmt::Const(spec) => {
                let expected = spec
                    .ty
                    .as_ref()
                    .map(|t| dingo_goparse::printer::type_to_string(t, interner));
                for value in &mut spec.values {
                    self.rewrite_expr(value, expected.as_deref(), scope, interner);
                }
            }
            Stmt::Assign { lhs, op, rhs, .. } => {
                let expectations: Vec<Option<String>> = lhs
                    .iter()
                    .map(|target| {
                        if *op == AssignOp::Assign {
                            target
                                .as_ident()
                                .and_then(|id| scope.vars.get(&id.sym).cloned())
                        } else {
                            None
                        }
                    })
                    .collect();
                for (i, value) in rhs.iter_mut().enumerate() {
                    let expected = expectations.get(i).and_then(|e| e.as_deref());
                    self.rewrite_expr(value, expected, scope, interner);
                }
            }
            Stmt::Expr(expr) => self.rewrite_expr(expr, None, scope, interner),
            Stmt::IncDec { expr, .. } => self.rewrite_expr(expr, None, scope, interner),
            Stmt::Return { exprs, .. } => {
                let expectations = scope.results.clone();
                let exprs_len = exprs.len();
                for (i, expr) in exprs.iter_mut().enumerate() {
                    let expected = if exprs_len == expectations.len() {
                        expectations.get(i).map(String::as_str)
                    } else {
                        None
                    };
                    // Single-value return of a multi-result function still
                    // pins the first slot.
                    let expected = expected.or_else(|| {
                        if i == 0 { expectations.first().map(String::as_str) } else { None }
                    });
                    self.rewrite_expr(expr, expected, scope, interner);
                }
            }
            Stmt::If { init, cond, then, els, .. } => {
                if let Some(init) = init {
                    self.rewrite_stmt(init, scope, interner);
                }
                self.rewrite_expr(cond, None, scope, interner);
                self.rewrite_block(then, scope, interner);
                if let Some(els) = els {
                    self.rewrite_stmt(els, scope, interner);
                }
            }
            Stmt::For { init, cond, post, body, .. } => {
                if let Some(init) = init {
                    self.rewrite_stmt(init, scope, interner);
                }
                if let Some(cond) = cond {
                    self.rewrite_expr(cond, None, scope, interner);
                }
                if let Some(post) = post {
                    self.rewrite_stmt(post, scope, interner);
                }
                self.rewrite_block(body, scope, interner);
            }
            Stmt::Range { expr, body, .. } => {
                self.rewrite_expr(expr, None, scope, interner);
                self.rewrite_block(body, scope, interner);
            }
            Stmt::Switch { init, tag, cases, .. } => {
                if let Some(init) = init {
                    self.rewrite_stmt(init, scope, interner);
                }
                if let Some(tag) = tag {
                    self.rewrite_expr(tag, None, scope, interner);
                }
                for case in cases {
                    // Sentinel arm markers hold pattern strings, not
                    // expressions; leave them for the match plugin.
                    for node in &mut case.body {
                        self.rewrite_stmt(&mut node.stmt, scope, interner);
                    }
                }
            }
            Stmt::Block(block) => self.rewrite_block(block, scope, interner),
            Stmt::Defer { call, .. } | Stmt::Go { call, .. } => {
                self.rewrite_expr(call, None, scope, interner)
            }
            Stmt::Send { chan, value, .. } => {
                self.rewrite_expr(chan, None, scope, interner);
                self.rewrite_expr(value, None, scope, interner);
            }
            _ => {}
        }
    }

    fn rewrite_expr(
        &mut self,
        expr: &mut Expr,
        expected: Option<&str>,
        scope: &Scope,
        interner: &mut Interner,
    ) {
        // Bare `None` in a known Option position.
        if let Expr::Ident(id) = expr {
            if id.sym == self.none {
                match expected.filter(|e| self.is_option(e)) {
                    Some(mangled) => {
                        let ctor = interner.intern(&format!("{}_None", mangled));
                        let span = id.span;
                        *expr = Expr::Call {
                            func: Box::new(Expr::Ident(dingo_goparse::ast::Ident::new(ctor, span))),
                            args: Vec::new(),
                            ellipsis: false,
                            span,
                        };
                    }
                    None => {
                        self.errors.push((
                            id.span,
                            DiagnosticKind::CannotInferType { constructor: "None".to_string() },
                            Some("annotate the return type or use an explicit Option_T_None()".to_string()),
                        ));
                    }
                }
                return;
            }
        }

        if let Expr::Call { func, args, span, .. } = expr {
            if let Some(func_id) = func.as_ident() {
                let variant = if func_id.sym == self.ok {
                    Some("Ok")
                } else if func_id.sym == self.err {
                    Some("Err")
                } else if func_id.sym == self.some {
                    Some("Some")
                } else {
                    None
                };
                if let Some(variant) = variant {
                    self.resolve_constructor(variant, func, args, *span, expected, scope, interner);
                    return;
                }
            }
        }

        // Ordinary recursion with whatever argument context is known.
        match expr {
            Expr::Call { func, args, .. } => {
                let param_types: Option<Vec<String>> = func
                    .as_ident()
                    .and_then(|id| self.service.types.func(id.sym))
                    .map(|sig| sig.params.clone());
                self.rewrite_expr(func, None, scope, interner);
                for (i, arg) in args.iter_mut().enumerate() {
                    let expected = param_types
                        .as_ref()
                        .and_then(|params| params.get(i))
                        .map(String::as_str);
                    self.rewrite_expr(arg, expected, scope, interner);
                }
            }
            Expr::Paren { expr: inner, .. } => self.rewrite_expr(inner, expected, scope, interner),
            Expr::Unary { expr: inner, .. } | Expr::Star { expr: inner, .. } => {
                self.rewrite_expr(inner, None, scope, interner)
            }
            Expr::Binary { lhs, rhs, .. } => {
                self.rewrite_expr(lhs, None, scope, interner);
                self.rewrite_expr(rhs, None, scope, interner);
            }
            Expr::Selector { expr: inner, .. } | Expr::Index { expr: inner, .. } => {
                self.rewrite_expr(inner, None, scope, interner)
            }
            Expr::Composite { elems, .. } => {
                for elem in elems {
                    self.rewrite_expr(&mut elem.value, None, scope, interner);
                }
            }
            Expr::FuncLit { results, body, .. } => {
                // The literal's own results pin returns inside it.
                let inner_scope = Scope {
                    vars: scope.vars.clone(),
                    results: results.iter().map(|r| type_to_string(&r.ty, interner)).collect(),
                };
                self.rewrite_block(body, &inner_scope, interner);
            }
            _ => {}
        }
    }

    /// Resolves one bare constructor call in place.
    #[allow(clippy::too_many_arguments)]
    fn resolve_constructor(
        &mut self,
        variant: &str,
        func: &mut Expr,
        args: &mut [Expr],
        span: Span,
        expected: Option<&str>,
        scope: &Scope,
        interner: &mut Interner,
    ) {
        // Rewrite the payload first so nested constructors resolve too.
        for arg in args.iter_mut() {
            self.rewrite_expr(arg, None, scope, interner);
        }

        let target = self.target_type(variant, expected, args, scope, interner);
        match target {
            Some(mangled) => {
                let ctor = interner.intern(&format!("{}_{}", mangled, variant));
                if let Expr::Ident(id) = func {
                    id.sym = ctor;
                }
            }
            None => {
                let (kind, hint) = match (variant, expected) {
                    ("Err", _) => (
                        DiagnosticKind::CannotInferType { constructor: "Err()".to_string() },
                        "annotate the return type or use an explicit Result_T_E_Err()",
                    ),
                    (_, Some(_)) => (
                        DiagnosticKind::AmbiguousResultType,
                        "the expected type here is not a Result or Option",
                    ),
                    _ => (
                        DiagnosticKind::CannotInferType {
                            constructor: format!("{}()", variant),
                        },
                        "annotate the binding or return type",
                    ),
                };
                self.errors.push((span, kind, Some(hint.to_string())));
            }
        }
    }

    /// Picks the instantiated type for a bare constructor: the expected
    /// type when it is a matching sum type, the argument's mono type
    /// otherwise.
    fn target_type(
        &mut self,
        variant: &str,
        expected: Option<&str>,
        args: &[Expr],
        scope: &Scope,
        interner: &Interner,
    ) -> Option<String> {
        // (1) expected type at the use position.
        if let Some(expected) = expected {
            let matches = match variant {
                "Ok" | "Err" => self.is_result(expected),
                _ => self.is_option(expected),
            };
            if matches {
                return Some(expected.to_string());
            }
        }
        // (2) the argument's mono type; the error side widens to `error`.
        let arg_ty = args
            .first()
            .and_then(|arg| self.service.type_of_expr(arg, scope, interner))?;
        match variant {
            "Ok" => {
                let mangled = format!("Result_{}_error", sanitize(&arg_ty));
                self.register_result(&mangled, &arg_ty, "error");
                Some(mangled)
            }
            "Some" => {
                let mangled = format!("Option_{}", sanitize(&arg_ty));
                self.register_option(&mangled, &arg_ty);
                Some(mangled)
            }
            _ => None,
        }
    }

    fn is_result(&self, name: &str) -> bool {
        self.service.results.iter().any(|r| r.mangled == name)
            || self.new_results.iter().any(|r| r.mangled == name)
    }

    fn is_option(&self, name: &str) -> bool {
        self.service.options.iter().any(|o| o.mangled == name)
            || self.new_options.iter().any(|o| o.mangled == name)
    }

    fn register_result(&mut self, mangled: &str, ok: &str, err: &str) {
        if self.is_result(mangled) {
            return;
        }
        self.new_results.push(ResultInstance {
            mangled: mangled.to_string(),
            ok: ok.to_string(),
            err: err.to_string(),
            span: Span::default(),
        });
    }

    fn register_option(&mut self, mangled: &str, some: &str) {
        if self.is_option(mangled) {
            return;
        }
        self.new_options.push(OptionInstance {
            mangled: mangled.to_string(),
            some: some.to_string(),
            span: Span::default(),
        });
    }
}

// ─── Scaffolding text ───────────────────────────────────────────────────

/// The complete Result scaffolding: tag, struct, constructors, and the
/// 13-method helper suite.
///
/// `Map` and `MapErr` are endomorphic (`func(T) T`, `func(E) E`); Go
/// methods on concrete receivers cannot introduce a fresh type parameter,
/// so type-changing transformations stay at the call site.
fn result_scaffolding(instance: &ResultInstance) -> String {
    let m = &instance.mangled;
    let t = &instance.ok;
    let e = &instance.err;
    let opt = format!("Option_{}", sanitize(t));
    let mut out = String::new();

    let _ = write!(
        out,
        "type {m}Tag uint8\n\n\
         const (\n\t{m}TagOk {m}Tag = iota\n\t{m}TagErr\n)\n\n\
         type {m} struct {{\n\ttag {m}Tag\n\tok0 *{t}\n\terr0 *{e}\n}}\n\n\
         func {m}_Ok(v {t}) {m} {{\n\treturn {m}{{tag: {m}TagOk, ok0: &v}}\n}}\n\n\
         func {m}_Err(e {e}) {m} {{\n\treturn {m}{{tag: {m}TagErr, err0: &e}}\n}}\n\n\
         func (r {m}) IsOk() bool {{\n\treturn r.tag == {m}TagOk\n}}\n\n\
         func (r {m}) IsErr() bool {{\n\treturn r.tag == {m}TagErr\n}}\n\n\
         func (r {m}) Unwrap() {t} {{\n\tif r.tag != {m}TagOk {{\n\t\tpanic(\"called Unwrap on Err value of {m}\")\n\t}}\n\treturn *r.ok0\n}}\n\n\
         func (r {m}) UnwrapOr(def {t}) {t} {{\n\tif r.tag == {m}TagOk {{\n\t\treturn *r.ok0\n\t}}\n\treturn def\n}}\n\n\
         func (r {m}) UnwrapErr() {e} {{\n\tif r.tag != {m}TagErr {{\n\t\tpanic(\"called UnwrapErr on Ok value of {m}\")\n\t}}\n\treturn *r.err0\n}}\n\n\
         func (r {m}) UnwrapOrElse(f func({e}) {t}) {t} {{\n\tif r.tag == {m}TagOk {{\n\t\treturn *r.ok0\n\t}}\n\treturn f(*r.err0)\n}}\n\n\
         func (r {m}) Map(f func({t}) {t}) {m} {{\n\tif r.tag == {m}TagOk {{\n\t\treturn {m}_Ok(f(*r.ok0))\n\t}}\n\treturn r\n}}\n\n\
         func (r {m}) MapErr(f func({e}) {e}) {m} {{\n\tif r.tag == {m}TagErr {{\n\t\treturn {m}_Err(f(*r.err0))\n\t}}\n\treturn r\n}}\n\n\
         func (r {m}) Filter(pred func({t}) bool) {opt} {{\n\tif r.tag == {m}TagOk && pred(*r.ok0) {{\n\t\treturn {opt}_Some(*r.ok0)\n\t}}\n\treturn {opt}_None()\n}}\n\n\
         func (r {m}) AndThen(f func({t}) {m}) {m} {{\n\tif r.tag == {m}TagOk {{\n\t\treturn f(*r.ok0)\n\t}}\n\treturn r\n}}\n\n\
         func (r {m}) OrElse(f func({e}) {m}) {m} {{\n\tif r.tag == {m}TagErr {{\n\t\treturn f(*r.err0)\n\t}}\n\treturn r\n}}\n\n\
         func (r {m}) And(other {m}) {m} {{\n\tif r.tag == {m}TagOk {{\n\t\treturn other\n\t}}\n\treturn r\n}}\n\n\
         func (r {m}) Or(other {m}) {m} {{\n\tif r.tag == {m}TagOk {{\n\t\treturn r\n\t}}\n\treturn other\n}}\n"
    );
    out
}

/// The complete Option scaffolding: tag, struct, constructors, and the
/// 8-method helper suite.
fn option_scaffolding(instance: &OptionInstance) -> String {
    let m = &instance.mangled;
    let t = &instance.some;
    let mut out = String::new();

    let _ = write!(
        out,
        "type {m}Tag uint8\n\n\
         const (\n\t{m}TagSome {m}Tag = iota\n\t{m}TagNone\n)\n\n\
         type {m} struct {{\n\ttag {m}Tag\n\tsome0 *{t}\n}}\n\n\
         func {m}_Some(v {t}) {m} {{\n\treturn {m}{{tag: {m}TagSome, some0: &v}}\n}}\n\n\
         func {m}_None() {m} {{\n\treturn {m}{{tag: {m}TagNone}}\n}}\n\n\
         func (o {m}) IsSome() bool {{\n\treturn o.tag == {m}TagSome\n}}\n\n\
         func (o {m}) IsNone() bool {{\n\treturn o.tag == {m}TagNone\n}}\n\n\
         func (o {m}) Unwrap() {t} {{\n\tif o.tag != {m}TagSome {{\n\t\tpanic(\"called Unwrap on None value of {m}\")\n\t}}\n\treturn *o.some0\n}}\n\n\
         func (o {m}) UnwrapOr(def {t}) {t} {{\n\tif o.tag == {m}TagSome {{\n\t\treturn *o.some0\n\t}}\n\treturn def\n}}\n\n\
         func (o {m}) UnwrapOrElse(f func() {t}) {t} {{\n\tif o.tag == {m}TagSome {{\n\t\treturn *o.some0\n\t}}\n\treturn f()\n}}\n\n\
         func (o {m}) Map(f func({t}) {t}) {m} {{\n\tif o.tag == {m}TagSome {{\n\t\treturn {m}_Some(f(*o.some0))\n\t}}\n\treturn o\n}}\n\n\
         func (o {m}) AndThen(f func({t}) {m}) {m} {{\n\tif o.tag == {m}TagSome {{\n\t\treturn f(*o.some0)\n\t}}\n\treturn o\n}}\n\n\
         func (o {m}) Filter(pred func({t}) bool) {m} {{\n\tif o.tag == {m}TagSome && pred(*o.some0) {{\n\t\treturn o\n\t}}\n\treturn {m}_None()\n}}\n"
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result_instance() -> ResultInstance {
        ResultInstance {
            mangled: "Result_int_error".to_string(),
            ok: "int".to_string(),
            err: "error".to_string(),
            span: Span::default(),
        }
    }

    #[test]
    fn result_scaffolding_has_thirteen_methods() {
        let text = result_scaffolding(&result_instance());
        for method in [
            "IsOk", "IsErr", "Unwrap", "UnwrapOr", "UnwrapErr", "UnwrapOrElse", "Map",
            "MapErr", "Filter", "AndThen", "OrElse", "And", "Or",
        ] {
            assert!(
                text.contains(&format!(") {}(", method)),
                "missing method {}",
                method
            );
        }
        assert!(text.contains("panic(\"called Unwrap on Err value of Result_int_error\")"));
    }

    #[test]
    fn option_scaffolding_has_eight_methods() {
        let instance = OptionInstance {
            mangled: "Option_User".to_string(),
            some: "User".to_string(),
            span: Span::default(),
        };
        let text = option_scaffolding(&instance);
        for method in [
            "IsSome", "IsNone", "Unwrap", "UnwrapOr", "UnwrapOrElse", "Map", "AndThen", "Filter",
        ] {
            assert!(
                text.contains(&format!(") {}(", method)),
                "missing method {}",
                method
            );
        }
    }

    #[test]
    fn scaffolding_parses_as_go() {
        let mut interner = Interner::new();
        let decls = synth::parse_decls(
            &result_scaffolding(&result_instance()),
            &mut interner,
            Span::default(),
        );
        // 1 tag type + 1 const group + 1 struct + 2 constructors + 13 methods.
        assert_eq!(decls.len(), 18);
    }

    #[test]
    fn filter_references_matching_option() {
        let text = result_scaffolding(&result_instance());
        assert!(text.contains("Option_int_Some(*r.ok0)"));
        assert!(text.contains("return Option_int_None()"));
    }
}
