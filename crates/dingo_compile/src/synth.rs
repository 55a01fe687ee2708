//! Declaration synthesis from generated Go text.
//!
//! Plugins describe the scaffolding they inject as Go source text and run
//! it through the same parser as user code — one grammar, one printer, no
//! hand-built AST trees. The parsed declarations are then *respanned*: a
//! synthesized node's spans point into the throwaway synthesis buffer, so
//! every span is overwritten with the anchor span of the construct that
//! caused the synthesis (the `enum` block, the Result instantiation).
//! That keeps the source-map invariant that every record points at a
//! position that exists in the Dingo source.

use dingo_base::{Interner, Span};
use dingo_goparse::ast::{
    Block, CaseClause, CompositeElem, Decl, Expr, Field, FuncDecl, GenDecl, Param, Stmt,
    StmtNode, TypeDecl, TypeExpr, ValueSpec,
};
use dingo_goparse::parse_file;

/// Parses top-level declarations out of generated Go text, anchoring all
/// spans at `anchor`.
///
/// Returns an empty list (and logs) if the text fails to parse — that is
/// a bug in the calling plugin's generator, not in user code, so it must
/// not surface as a user diagnostic.
pub fn parse_decls(text: &str, interner: &mut Interner, anchor: Span) -> Vec<Decl> {
    let source = format!("package synth\n\n{}", text);
    match parse_file(&source, interner) {
        Ok(file) => {
            let mut decls = file.decls;
            for decl in &mut decls {
                respan_decl(decl, anchor);
            }
            decls
        }
        Err(err) => {
            log::error!("synthesized declaration failed to parse: {} in:\n{}", err, text);
            Vec::new()
        }
    }
}

/// Overwrites every span in a declaration with `anchor`.
pub fn respan_decl(decl: &mut Decl, anchor: Span) {
    match decl {
        Decl::Func(func) => respan_func(func, anchor),
        Decl::Type(ty) => respan_type_decl(ty, anchor),
        Decl::Const(gen) | Decl::Var(gen) => respan_gen(gen, anchor),
    }
}

fn respan_func(func: &mut FuncDecl, anchor: Span) {
    func.span = anchor;
    func.name.span = anchor;
    if let Some(receiver) = &mut func.receiver {
        respan_param(receiver, anchor);
    }
    for param in &mut func.params {
        respan_param(param, anchor);
    }
    for result in &mut func.results {
        respan_param(result, anchor);
    }
    if let Some(body) = &mut func.body {
        respan_block(body, anchor);
    }
}

fn respan_type_decl(decl: &mut TypeDecl, anchor: Span) {
    decl.span = anchor;
    decl.name.span = anchor;
    respan_type(&mut decl.ty, anchor);
}

fn respan_gen(gen: &mut GenDecl, anchor: Span) {
    gen.span = anchor;
    for spec in &mut gen.specs {
        respan_spec(spec, anchor);
    }
}

fn respan_spec(spec: &mut ValueSpec, anchor: Span) {
    spec.span = anchor;
    for name in &mut spec.names {
        name.span = anchor;
    }
    if let Some(ty) = &mut spec.ty {
        respan_type(ty, anchor);
    }
    for value in &mut spec.values {
        respan_expr(value, anchor);
    }
}

fn respan_param(param: &mut Param, anchor: Span) {
    param.span = anchor;
    if let Some(name) = &mut param.name {
        name.span = anchor;
    }
    respan_type(&mut param.ty, anchor);
}

fn respan_field(field: &mut Field, anchor: Span) {
    field.span = anchor;
    for name in &mut field.names {
        name.span = anchor;
    }
    respan_type(&mut field.ty, anchor);
}

pub fn respan_type(ty: &mut TypeExpr, anchor: Span) {
    match ty {
        TypeExpr::Name(id) => id.span = anchor,
        TypeExpr::Qualified { pkg, name, span } => {
            pkg.span = anchor;
            name.span = anchor;
            *span = anchor;
        }
        TypeExpr::Pointer { elem, span } | TypeExpr::Slice { elem, span } | TypeExpr::Paren { elem, span } => {
            respan_type(elem, anchor);
            *span = anchor;
        }
        TypeExpr::Array { len, elem, span } => {
            respan_expr(len, anchor);
            respan_type(elem, anchor);
            *span = anchor;
        }
        TypeExpr::Map { key, value, span } => {
            respan_type(key, anchor);
            respan_type(value, anchor);
            *span = anchor;
        }
        TypeExpr::Chan { elem, span, .. } => {
            respan_type(elem, anchor);
            *span = anchor;
        }
        TypeExpr::Func { params, results, span } => {
            for param in params {
                respan_param(param, anchor);
            }
            for result in results {
                respan_param(result, anchor);
            }
            *span = anchor;
        }
        TypeExpr::Struct { fields, span } => {
            for field in fields {
                respan_field(field, anchor);
            }
            *span = anchor;
        }
        TypeExpr::Interface { methods, span } => {
            for method in methods {
                respan_field(method, anchor);
            }
            *span = anchor;
        }
        TypeExpr::Generic { name, args, span } => {
            name.span = anchor;
            for arg in args {
                respan_type(arg, anchor);
            }
            *span = anchor;
        }
    }
}

pub fn respan_block(block: &mut Block, anchor: Span) {
    block.span = anchor;
    for comment in &mut block.trailing {
        comment.span = anchor;
    }
    for node in &mut block.stmts {
        respan_stmt_node(node, anchor);
    }
}

fn respan_stmt_node(node: &mut StmtNode, anchor: Span) {
    for comment in &mut node.leading {
        comment.span = anchor;
    }
    respan_stmt(&mut node.stmt, anchor);
}

pub fn respan_stmt(stmt: &mut Stmt, anchor: Span) {
    match stmt {
        Stmt::Var(spec) | Stmt::Const(spec) => respan_spec(spec, anchor),
        Stmt::Assign { lhs, rhs, span, .. } => {
            for expr in lhs.iter_mut().chain(rhs.iter_mut()) {
                respan_expr(expr, anchor);
            }
            *span = anchor;
        }
        Stmt::Expr(expr) => respan_expr(expr, anchor),
        Stmt::IncDec { expr, span, .. } => {
            respan_expr(expr, anchor);
            *span = anchor;
        }
        Stmt::Return { exprs, span } => {
            for expr in exprs {
                respan_expr(expr, anchor);
            }
            *span = anchor;
        }
        Stmt::If { init, cond, then, els, span } => {
            if let Some(init) = init {
                respan_stmt(init, anchor);
            }
            respan_expr(cond, anchor);
            respan_block(then, anchor);
            if let Some(els) = els {
                respan_stmt(els, anchor);
            }
            *span = anchor;
        }
        Stmt::For { init, cond, post, body, span } => {
            if let Some(init) = init {
                respan_stmt(init, anchor);
            }
            if let Some(cond) = cond {
                respan_expr(cond, anchor);
            }
            if let Some(post) = post {
                respan_stmt(post, anchor);
            }
            respan_block(body, anchor);
            *span = anchor;
        }
        Stmt::Range { key, value, expr, body, span, .. } => {
            if let Some(key) = key {
                respan_expr(key, anchor);
            }
            if let Some(value) = value {
                respan_expr(value, anchor);
            }
            respan_expr(expr, anchor);
            respan_block(body, anchor);
            *span = anchor;
        }
        Stmt::Switch { init, tag, cases, span } => {
            if let Some(init) = init {
                respan_stmt(init, anchor);
            }
            if let Some(tag) = tag {
                respan_expr(tag, anchor);
            }
            for case in cases {
                respan_case(case, anchor);
            }
            *span = anchor;
        }
        Stmt::Block(block) => respan_block(block, anchor),
        Stmt::Defer { call, span } | Stmt::Go { call, span } => {
            respan_expr(call, anchor);
            *span = anchor;
        }
        Stmt::Send { chan, value, span } => {
            respan_expr(chan, anchor);
            respan_expr(value, anchor);
            *span = anchor;
        }
        Stmt::Break { label, span } | Stmt::Continue { label, span } => {
            if let Some(label) = label {
                label.span = anchor;
            }
            *span = anchor;
        }
        Stmt::Fallthrough { span } | Stmt::Empty { span } => *span = anchor,
    }
}

fn respan_case(case: &mut CaseClause, anchor: Span) {
    case.span = anchor;
    for comment in &mut case.leading {
        comment.span = anchor;
    }
    for expr in &mut case.exprs {
        respan_expr(expr, anchor);
    }
    for node in &mut case.body {
        respan_stmt_node(node, anchor);
    }
}

pub fn respan_expr(expr: &mut Expr, anchor: Span) {
    match expr {
        Expr::Ident(id) => id.span = anchor,
        Expr::Lit { span, .. } => *span = anchor,
        Expr::Composite { ty, elems, span } => {
            if let Some(ty) = ty {
                respan_type(ty, anchor);
            }
            for elem in elems {
                respan_elem(elem, anchor);
            }
            *span = anchor;
        }
        Expr::FuncLit { params, results, body, span } => {
            for param in params {
                respan_param(param, anchor);
            }
            for result in results {
                respan_param(result, anchor);
            }
            respan_block(body, anchor);
            *span = anchor;
        }
        Expr::Selector { expr, sel, span } => {
            respan_expr(expr, anchor);
            sel.span = anchor;
            *span = anchor;
        }
        Expr::Index { expr, indices, span } => {
            respan_expr(expr, anchor);
            for index in indices {
                respan_expr(index, anchor);
            }
            *span = anchor;
        }
        Expr::SliceExpr { expr, low, high, max, span } => {
            respan_expr(expr, anchor);
            for part in [low, high, max].into_iter().flatten() {
                respan_expr(part, anchor);
            }
            *span = anchor;
        }
        Expr::Call { func, args, span, .. } => {
            respan_expr(func, anchor);
            for arg in args {
                respan_expr(arg, anchor);
            }
            *span = anchor;
        }
        Expr::Unary { expr, span, .. } | Expr::Star { expr, span } | Expr::Paren { expr, span } => {
            respan_expr(expr, anchor);
            *span = anchor;
        }
        Expr::Binary { lhs, rhs, span, .. } => {
            respan_expr(lhs, anchor);
            respan_expr(rhs, anchor);
            *span = anchor;
        }
        Expr::TypeAssert { expr, ty, span } => {
            respan_expr(expr, anchor);
            if let Some(ty) = ty {
                respan_type(ty, anchor);
            }
            *span = anchor;
        }
        Expr::Type(ty) => respan_type(ty, anchor),
    }
}

fn respan_elem(elem: &mut CompositeElem, anchor: Span) {
    elem.span = anchor;
    if let Some(key) = &mut elem.key {
        respan_expr(key, anchor);
    }
    respan_expr(&mut elem.value, anchor);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_decls_respans_to_anchor() {
        let mut interner = Interner::new();
        let anchor = Span::new(42, 60);
        let decls = parse_decls(
            "func IsRed(c Color) bool {\n\treturn c.tag == ColorTagRed\n}\n",
            &mut interner,
            anchor,
        );
        assert_eq!(decls.len(), 1);
        assert_eq!(decls[0].span(), anchor);
        let Decl::Func(func) = &decls[0] else { panic!("expected func") };
        assert_eq!(func.body.as_ref().unwrap().stmts[0].stmt.span(), anchor);
    }

    #[test]
    fn malformed_synthesis_yields_no_decls() {
        let mut interner = Interner::new();
        let decls = parse_decls("func {broken", &mut interner, Span::default());
        assert!(decls.is_empty());
    }
}
