//! Type inference service.
//!
//! Answers the context-shaped queries the plugins need against the
//! package-scope tables collected by the resolver, extended with
//! best-effort local typing of function bodies. The walk carries an
//! explicit scope stack — the owned-AST substitute for walking a parent
//! map upward.
//!
//! The service never guesses: a query that cannot be answered returns
//! `None` ("insufficient context") and the calling plugin decides whether
//! that is an error worth a targeted diagnostic.

use dingo_base::{Interner, Symbol};
use dingo_goparse::ast::{Expr, FuncDecl, Stmt, StmtNode};
use dingo_goparse::printer::type_to_string;
use dingo_goparse::resolve::TypeInfo;
use dingo_goparse::token::LitKind;
use dingo_preprocess::{EnumDescriptor, OptionInstance, ResultInstance};
use std::collections::HashMap;

/// A sum-shaped type the match plugin can check exhaustiveness over.
#[derive(Debug, Clone, Copy)]
pub enum SumType<'a> {
    Result(&'a ResultInstance),
    Option(&'a OptionInstance),
    Enum(&'a EnumDescriptor),
}

impl<'a> SumType<'a> {
    pub fn type_name(&self) -> &'a str {
        match self {
            SumType::Result(r) => &r.mangled,
            SumType::Option(o) => &o.mangled,
            SumType::Enum(e) => &e.name,
        }
    }

    /// The variant names exhaustiveness is checked against.
    pub fn variants(&self) -> Vec<String> {
        match self {
            SumType::Result(_) => vec!["Ok".to_string(), "Err".to_string()],
            SumType::Option(_) => vec!["Some".to_string(), "None".to_string()],
            SumType::Enum(e) => e.variants.iter().map(|v| v.name.clone()).collect(),
        }
    }

    /// Payload types of one variant.
    pub fn payload(&self, variant: &str) -> Vec<String> {
        match self {
            SumType::Result(r) => match variant {
                "Ok" => vec![r.ok.clone()],
                "Err" => vec![r.err.clone()],
                _ => Vec::new(),
            },
            SumType::Option(o) => match variant {
                "Some" => vec![o.some.clone()],
                _ => Vec::new(),
            },
            SumType::Enum(e) => e
                .variant(variant)
                .map(|v| v.payload_types().iter().map(|t| t.to_string()).collect())
                .unwrap_or_default(),
        }
    }

    /// The payload pointer field for a variant position.
    pub fn field_name(&self, variant: &str, index: usize) -> String {
        match self {
            SumType::Result(_) | SumType::Option(_) => {
                format!("{}{}", variant.to_lowercase(), index)
            }
            SumType::Enum(e) => e.field_name(variant, index),
        }
    }

    /// The tag constant for a variant.
    pub fn tag_const(&self, variant: &str) -> String {
        format!("{}Tag{}", self.type_name(), variant)
    }
}

/// Local bindings of one function body plus its return types.
#[derive(Debug, Default, Clone)]
pub struct Scope {
    pub vars: HashMap<Symbol, String>,
    pub results: Vec<String>,
}

/// The inference service over one file's type information.
pub struct InferService<'a> {
    pub types: &'a TypeInfo,
    pub enums: &'a [EnumDescriptor],
    pub results: &'a [ResultInstance],
    pub options: &'a [OptionInstance],
}

impl<'a> InferService<'a> {
    /// Classifies a type name as Result, Option, or enum.
    pub fn sum_type(&self, name: &str) -> Option<SumType<'a>> {
        if let Some(r) = self.results.iter().find(|r| r.mangled == name) {
            return Some(SumType::Result(r));
        }
        if let Some(o) = self.options.iter().find(|o| o.mangled == name) {
            return Some(SumType::Option(o));
        }
        self.enums.iter().find(|e| e.name == name).map(SumType::Enum)
    }

    /// Builds the local scope of a function: parameters, receiver, and
    /// every binding the body introduces with an inferable type.
    pub fn function_scope(&self, func: &FuncDecl, interner: &Interner) -> Scope {
        let mut scope = Scope {
            vars: HashMap::new(),
            results: func
                .results
                .iter()
                .map(|r| type_to_string(&r.ty, interner))
                .collect(),
        };
        if let Some(receiver) = &func.receiver {
            if let Some(name) = &receiver.name {
                scope.vars.insert(name.sym, type_to_string(&receiver.ty, interner));
            }
        }
        for param in &func.params {
            if let Some(name) = &param.name {
                scope.vars.insert(name.sym, type_to_string(&param.ty, interner));
            }
        }
        if let Some(body) = &func.body {
            self.collect_block(&body.stmts, &mut scope, interner);
        }
        scope
    }

    fn collect_block(&self, stmts: &[StmtNode], scope: &mut Scope, interner: &Interner) {
        for node in stmts {
            self.collect_stmt(&node.stmt, scope, interner);
        }
    }

    fn collect_stmt(&self, stmt: &Stmt, scope: &mut Scope, interner: &Interner) {
        match stmt {
            Stmt::Var(spec) | Stmt::Const(spec) => {
                let declared = spec.ty.as_ref().map(|t| type_to_string(t, interner));
                for (i, name) in spec.names.iter().enumerate() {
                    let ty = declared
                        .clone()
                        .or_else(|| spec.values.get(i).and_then(|v| self.type_of_expr(v, scope, interner)));
                    if let Some(ty) = ty {
                        scope.vars.insert(name.sym, ty);
                    }
                }
            }
            Stmt::Assign { lhs, op, rhs, .. } => {
                if *op == dingo_goparse::ast::AssignOp::Define {
                    self.collect_define(lhs, rhs, scope, interner);
                }
            }
            Stmt::If { init, then, els, .. } => {
                if let Some(init) = init {
                    self.collect_stmt(init, scope, interner);
                }
                self.collect_block(&then.stmts, scope, interner);
                if let Some(els) = els {
                    self.collect_stmt(els, scope, interner);
                }
            }
            Stmt::For { init, body, .. } => {
                if let Some(init) = init {
                    self.collect_stmt(init, scope, interner);
                }
                self.collect_block(&body.stmts, scope, interner);
            }
            Stmt::Range { key, value, expr, body, define, .. } => {
                if *define {
                    if let Some(key) = key.as_ref().and_then(Expr::as_ident) {
                        scope.vars.insert(key.sym, "int".to_string());
                    }
                    if let Some(value) = value.as_ref().and_then(Expr::as_ident) {
                        if let Some(elem) = self
                            .type_of_expr(expr, scope, interner)
                            .and_then(|t| element_type(&t))
                        {
                            scope.vars.insert(value.sym, elem);
                        }
                    }
                }
                self.collect_block(&body.stmts, scope, interner);
            }
            Stmt::Switch { init, cases, .. } => {
                if let Some(init) = init {
                    self.collect_stmt(init, scope, interner);
                }
                for case in cases {
                    self.collect_block(&case.body, scope, interner);
                }
            }
            Stmt::Block(block) => self.collect_block(&block.stmts, scope, interner),
            _ => {}
        }
    }

    fn collect_define(
        &self,
        lhs: &[Expr],
        rhs: &[Expr],
        scope: &mut Scope,
        interner: &Interner,
    ) {
        if lhs.len() == rhs.len() {
            for (target, value) in lhs.iter().zip(rhs) {
                if let (Some(ident), Some(ty)) =
                    (target.as_ident(), self.type_of_expr(value, scope, interner))
                {
                    scope.vars.insert(ident.sym, ty);
                }
            }
            return;
        }
        // Multi-value call: x, y := f()
        if rhs.len() == 1 {
            if let Expr::Call { func, .. } = &rhs[0] {
                if let Some(ident) = func.as_ident() {
                    if let Some(sig) = self.types.func(ident.sym) {
                        for (target, ty) in lhs.iter().zip(&sig.results) {
                            if let Some(target) = target.as_ident() {
                                scope.vars.insert(target.sym, ty.clone());
                            }
                        }
                    }
                }
            }
        }
    }

    /// Best-effort canonical type of an expression.
    pub fn type_of_expr(
        &self,
        expr: &Expr,
        scope: &Scope,
        interner: &Interner,
    ) -> Option<String> {
        match expr {
            Expr::Ident(id) => {
                let name = interner.resolve(id.sym);
                match name {
                    "true" | "false" => return Some("bool".to_string()),
                    "nil" => return None,
                    _ => {}
                }
                if let Some(ty) = scope.vars.get(&id.sym) {
                    return Some(ty.clone());
                }
                self.types.global(id.sym).filter(|t| !t.is_empty()).map(str::to_string)
            }
            Expr::Lit { kind, .. } => Some(
                match kind {
                    LitKind::Int => "int",
                    LitKind::Float => "float64",
                    LitKind::Imag => "complex128",
                    LitKind::Char => "rune",
                    LitKind::String => "string",
                }
                .to_string(),
            ),
            Expr::Composite { ty: Some(ty), .. } => Some(type_to_string(ty, interner)),
            Expr::Call { func, .. } => self.call_result_type(func, scope, interner),
            Expr::Unary { op, expr, .. } => match op {
                dingo_goparse::ast::UnaryOp::Addr => self
                    .type_of_expr(expr, scope, interner)
                    .map(|t| format!("*{}", t)),
                dingo_goparse::ast::UnaryOp::Not => Some("bool".to_string()),
                _ => self.type_of_expr(expr, scope, interner),
            },
            Expr::Binary { op, lhs, rhs, .. } => {
                use dingo_goparse::ast::BinaryOp::*;
                match op {
                    Eq | NotEq | Lt | LtEq | Gt | GtEq | LogicalAnd | LogicalOr => {
                        Some("bool".to_string())
                    }
                    _ => self
                        .type_of_expr(lhs, scope, interner)
                        .or_else(|| self.type_of_expr(rhs, scope, interner)),
                }
            }
            Expr::Star { expr, .. } => self
                .type_of_expr(expr, scope, interner)
                .and_then(|t| t.strip_prefix('*').map(str::to_string)),
            Expr::Paren { expr, .. } => self.type_of_expr(expr, scope, interner),
            Expr::Index { expr, .. } => self
                .type_of_expr(expr, scope, interner)
                .and_then(|t| element_type(&t)),
            Expr::TypeAssert { ty: Some(ty), .. } => Some(type_to_string(ty, interner)),
            Expr::Type(ty) => Some(type_to_string(ty, interner)),
            _ => None,
        }
    }

    /// The first result type of a call expression.
    fn call_result_type(
        &self,
        func: &Expr,
        scope: &Scope,
        interner: &Interner,
    ) -> Option<String> {
        match func {
            Expr::Ident(id) => {
                let name = interner.resolve(id.sym);
                // Variant constructor: `{Type}_{Variant}`.
                if let Some(ty) = self.constructor_type(name) {
                    return Some(ty);
                }
                // Conversion: `T(x)` for a declared type.
                if self.types.is_type(id.sym) {
                    return Some(name.to_string());
                }
                if builtin_type(name) {
                    return Some(name.to_string());
                }
                self.types.func(id.sym).and_then(|sig| sig.results.first().cloned())
            }
            Expr::Selector { expr, sel, .. } => {
                let base = self.type_of_expr(expr, scope, interner)?;
                let base = base.trim_start_matches('*');
                self.types
                    .method(base, sel.sym)
                    .and_then(|sig| sig.results.first().cloned())
            }
            Expr::Paren { expr, .. } => self.call_result_type(expr, scope, interner),
            _ => None,
        }
    }

    /// Maps a constructor name back to its sum type.
    pub fn constructor_type(&self, name: &str) -> Option<String> {
        for r in self.results {
            if name == format!("{}_Ok", r.mangled) || name == format!("{}_Err", r.mangled) {
                return Some(r.mangled.clone());
            }
        }
        for o in self.options {
            if name == format!("{}_Some", o.mangled) || name == format!("{}_None", o.mangled) {
                return Some(o.mangled.clone());
            }
        }
        for e in self.enums {
            for v in &e.variants {
                if name == e.constructor(&v.name) {
                    return Some(e.name.clone());
                }
            }
        }
        None
    }
}

/// The element type of an indexable canonical type text.
fn element_type(ty: &str) -> Option<String> {
    if let Some(elem) = ty.strip_prefix("[]") {
        return Some(elem.to_string());
    }
    if let Some(rest) = ty.strip_prefix("map[") {
        let close = rest.find(']')?;
        return Some(rest[close + 1..].to_string());
    }
    if ty == "string" {
        return Some("byte".to_string());
    }
    None
}

fn builtin_type(name: &str) -> bool {
    matches!(
        name,
        "int" | "int8" | "int16" | "int32" | "int64" | "uint" | "uint8" | "uint16" | "uint32"
            | "uint64" | "uintptr" | "byte" | "rune" | "float32" | "float64" | "string" | "bool"
            | "any" | "error" | "complex64" | "complex128"
    )
}
