//! Owned Go AST.
//!
//! Nodes are plain owned trees (`Box`/`Vec`), mutated in place by the plugin
//! pipeline and printed back out by [`crate::printer`]. Every node carries a
//! [`Span`] into the buffer it was parsed from; the printer propagates those
//! spans into per-line origin records for the source map.
//!
//! Statements and declarations carry *leading comments*. The preprocessor
//! communicates with the plugin pipeline through marker comments, so trivia
//! survival is part of this module's contract, not a nicety.

use dingo_base::{Span, Symbol};

pub use crate::lexer::RawComment as Comment;
pub use crate::token::LitKind;

/// An identifier with its span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ident {
    pub sym: Symbol,
    pub span: Span,
}

impl Ident {
    pub fn new(sym: Symbol, span: Span) -> Self {
        Self { sym, span }
    }

    /// A synthesized identifier with no real source position.
    pub fn synthetic(sym: Symbol) -> Self {
        Self { sym, span: Span::default() }
    }
}

/// A parsed Go source file.
#[derive(Debug, Clone)]
pub struct File {
    pub package: Ident,
    pub imports: Vec<ImportDecl>,
    pub decls: Vec<Decl>,
    pub span: Span,
}

/// A single import line. Grouped imports are flattened at parse time and
/// regrouped by the printer.
#[derive(Debug, Clone)]
pub struct ImportDecl {
    pub leading: Vec<Comment>,
    pub alias: Option<Ident>,
    /// Quoted path text, quotes included.
    pub path: String,
    pub span: Span,
}

/// A top-level declaration.
#[derive(Debug, Clone)]
pub enum Decl {
    Func(FuncDecl),
    Type(TypeDecl),
    Const(GenDecl),
    Var(GenDecl),
}

impl Decl {
    pub fn span(&self) -> Span {
        match self {
            Decl::Func(d) => d.span,
            Decl::Type(d) => d.span,
            Decl::Const(d) | Decl::Var(d) => d.span,
        }
    }

    pub fn leading(&self) -> &[Comment] {
        match self {
            Decl::Func(d) => &d.leading,
            Decl::Type(d) => &d.leading,
            Decl::Const(d) | Decl::Var(d) => &d.leading,
        }
    }

    /// The name this declaration is deduplicated and sorted by.
    pub fn name(&self) -> Option<Symbol> {
        match self {
            Decl::Func(d) => Some(d.name.sym),
            Decl::Type(d) => Some(d.name.sym),
            Decl::Const(d) | Decl::Var(d) => {
                d.specs.first().and_then(|s| s.names.first()).map(|i| i.sym)
            }
        }
    }
}

/// A function or method declaration.
#[derive(Debug, Clone)]
pub struct FuncDecl {
    pub leading: Vec<Comment>,
    pub receiver: Option<Param>,
    pub name: Ident,
    pub params: Vec<Param>,
    pub results: Vec<Param>,
    pub body: Option<Block>,
    pub span: Span,
}

/// A parameter, result, or receiver entry.
#[derive(Debug, Clone)]
pub struct Param {
    pub name: Option<Ident>,
    pub ty: TypeExpr,
    /// `true` for a final `...T` parameter.
    pub variadic: bool,
    pub span: Span,
}

impl Param {
    pub fn anonymous(ty: TypeExpr) -> Self {
        let span = ty.span();
        Self { name: None, ty, variadic: false, span }
    }
}

/// A `type` declaration (`type Name T` or `type Name = T`).
#[derive(Debug, Clone)]
pub struct TypeDecl {
    pub leading: Vec<Comment>,
    pub name: Ident,
    pub alias: bool,
    pub ty: TypeExpr,
    pub span: Span,
}

/// A `const` or `var` declaration, possibly grouped.
#[derive(Debug, Clone)]
pub struct GenDecl {
    pub leading: Vec<Comment>,
    pub specs: Vec<ValueSpec>,
    /// `true` when the source used the parenthesised group form.
    pub grouped: bool,
    pub span: Span,
}

/// One `names [type] [= values]` line of a const/var declaration.
#[derive(Debug, Clone)]
pub struct ValueSpec {
    pub names: Vec<Ident>,
    pub ty: Option<TypeExpr>,
    pub values: Vec<Expr>,
    pub span: Span,
}

/// A struct field (or interface method in degenerate form).
#[derive(Debug, Clone)]
pub struct Field {
    pub names: Vec<Ident>,
    pub ty: TypeExpr,
    pub tag: Option<String>,
    pub span: Span,
}

/// A type expression.
#[derive(Debug, Clone)]
pub enum TypeExpr {
    /// `int`, `error`, `Result_int_error`.
    Name(Ident),
    /// `pkg.Name`.
    Qualified { pkg: Ident, name: Ident, span: Span },
    /// `*T`.
    Pointer { elem: Box<TypeExpr>, span: Span },
    /// `[]T`.
    Slice { elem: Box<TypeExpr>, span: Span },
    /// `[N]T`.
    Array { len: Box<Expr>, elem: Box<TypeExpr>, span: Span },
    /// `map[K]V`.
    Map { key: Box<TypeExpr>, value: Box<TypeExpr>, span: Span },
    /// `chan T`, `<-chan T`, `chan<- T`.
    Chan { dir: ChanDir, elem: Box<TypeExpr>, span: Span },
    /// `func(params) results`.
    Func { params: Vec<Param>, results: Vec<Param>, span: Span },
    /// `struct { ... }`.
    Struct { fields: Vec<Field>, span: Span },
    /// `interface { ... }`; methods are `Field`s with `Func` types.
    Interface { methods: Vec<Field>, span: Span },
    /// `Name[T, U]` — generic instantiation.
    Generic { name: Ident, args: Vec<TypeExpr>, span: Span },
    /// `(T)`.
    Paren { elem: Box<TypeExpr>, span: Span },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChanDir {
    Both,
    Send,
    Recv,
}

impl TypeExpr {
    pub fn span(&self) -> Span {
        match self {
            TypeExpr::Name(id) => id.span,
            TypeExpr::Qualified { span, .. }
            | TypeExpr::Pointer { span, .. }
            | TypeExpr::Slice { span, .. }
            | TypeExpr::Array { span, .. }
            | TypeExpr::Map { span, .. }
            | TypeExpr::Chan { span, .. }
            | TypeExpr::Func { span, .. }
            | TypeExpr::Struct { span, .. }
            | TypeExpr::Interface { span, .. }
            | TypeExpr::Generic { span, .. }
            | TypeExpr::Paren { span, .. } => *span,
        }
    }
}

/// A braced statement list.
///
/// `trailing` keeps comments that sit between the last statement and the
/// closing brace; the `// dingo:e:N` envelope marker lands there when the
/// expansion is the last thing in a block.
#[derive(Debug, Clone, Default)]
pub struct Block {
    pub stmts: Vec<StmtNode>,
    pub trailing: Vec<Comment>,
    pub span: Span,
}

/// A statement together with the comments that preceded it.
#[derive(Debug, Clone)]
pub struct StmtNode {
    pub leading: Vec<Comment>,
    pub stmt: Stmt,
}

impl StmtNode {
    pub fn bare(stmt: Stmt) -> Self {
        Self { leading: Vec::new(), stmt }
    }

    /// Finds a leading line comment starting with `prefix`, returning the
    /// text after the prefix.
    pub fn marker(&self, prefix: &str) -> Option<&str> {
        self.leading.iter().find_map(|c| {
            c.text
                .strip_prefix("//")
                .map(str::trim_start)
                .and_then(|t| t.strip_prefix(prefix))
        })
    }
}

/// Assignment statement operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,  // =
    Define,  // :=
    Add,     // +=
    Sub,     // -=
    Mul,     // *=
    Div,     // /=
    Rem,     // %=
    And,     // &=
    Or,      // |=
    Xor,     // ^=
    Shl,     // <<=
    Shr,     // >>=
    AndNot,  // &^=
}

#[derive(Debug, Clone)]
pub enum Stmt {
    /// Local `var`/`const` declaration.
    Var(ValueSpec),
    Const(ValueSpec),
    /// Assignment or short variable declaration.
    Assign {
        lhs: Vec<Expr>,
        op: AssignOp,
        rhs: Vec<Expr>,
        span: Span,
    },
    Expr(Expr),
    IncDec {
        expr: Expr,
        inc: bool,
        span: Span,
    },
    Return {
        exprs: Vec<Expr>,
        span: Span,
    },
    If {
        init: Option<Box<Stmt>>,
        cond: Expr,
        then: Block,
        /// `else` branch: a `Block` statement or another `If`.
        els: Option<Box<Stmt>>,
        span: Span,
    },
    For {
        init: Option<Box<Stmt>>,
        cond: Option<Expr>,
        post: Option<Box<Stmt>>,
        body: Block,
        span: Span,
    },
    Range {
        key: Option<Expr>,
        value: Option<Expr>,
        define: bool,
        expr: Expr,
        body: Block,
        span: Span,
    },
    Switch {
        init: Option<Box<Stmt>>,
        tag: Option<Expr>,
        cases: Vec<CaseClause>,
        span: Span,
    },
    Block(Block),
    Defer {
        call: Expr,
        span: Span,
    },
    Go {
        call: Expr,
        span: Span,
    },
    Break {
        label: Option<Ident>,
        span: Span,
    },
    Continue {
        label: Option<Ident>,
        span: Span,
    },
    Fallthrough {
        span: Span,
    },
    Send {
        chan: Expr,
        value: Expr,
        span: Span,
    },
    Empty {
        span: Span,
    },
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Var(spec) | Stmt::Const(spec) => spec.span,
            Stmt::Assign { span, .. }
            | Stmt::IncDec { span, .. }
            | Stmt::Return { span, .. }
            | Stmt::If { span, .. }
            | Stmt::For { span, .. }
            | Stmt::Range { span, .. }
            | Stmt::Switch { span, .. }
            | Stmt::Defer { span, .. }
            | Stmt::Go { span, .. }
            | Stmt::Break { span, .. }
            | Stmt::Continue { span, .. }
            | Stmt::Fallthrough { span }
            | Stmt::Send { span, .. }
            | Stmt::Empty { span } => *span,
            Stmt::Expr(e) => e.span(),
            Stmt::Block(b) => b.span,
        }
    }
}

/// One `case`/`default` clause of a `switch`.
#[derive(Debug, Clone)]
pub struct CaseClause {
    pub leading: Vec<Comment>,
    /// Empty for `default:`.
    pub exprs: Vec<Expr>,
    pub body: Vec<StmtNode>,
    pub span: Span,
}

/// A composite-literal element, optionally keyed.
#[derive(Debug, Clone)]
pub struct CompositeElem {
    pub key: Option<Expr>,
    pub value: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,  // +
    Minus, // -
    Not,   // !
    Xor,   // ^
    Addr,  // &
    Recv,  // <-
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    And,
    Or,
    Xor,
    AndNot,
    Shl,
    Shr,
    LogicalAnd,
    LogicalOr,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

#[derive(Debug, Clone)]
pub enum Expr {
    Ident(Ident),
    Lit {
        kind: LitKind,
        /// Raw source text, quotes and all.
        value: String,
        span: Span,
    },
    Composite {
        /// Absent for inner literals whose type is implied by context.
        ty: Option<Box<TypeExpr>>,
        elems: Vec<CompositeElem>,
        span: Span,
    },
    FuncLit {
        params: Vec<Param>,
        results: Vec<Param>,
        body: Block,
        span: Span,
    },
    Selector {
        expr: Box<Expr>,
        sel: Ident,
        span: Span,
    },
    Index {
        expr: Box<Expr>,
        indices: Vec<Expr>,
        span: Span,
    },
    SliceExpr {
        expr: Box<Expr>,
        low: Option<Box<Expr>>,
        high: Option<Box<Expr>>,
        max: Option<Box<Expr>>,
        span: Span,
    },
    Call {
        func: Box<Expr>,
        args: Vec<Expr>,
        ellipsis: bool,
        span: Span,
    },
    Unary {
        op: UnaryOp,
        expr: Box<Expr>,
        span: Span,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
        span: Span,
    },
    Star {
        expr: Box<Expr>,
        span: Span,
    },
    Paren {
        expr: Box<Expr>,
        span: Span,
    },
    TypeAssert {
        expr: Box<Expr>,
        /// `None` for `x.(type)` in type switches.
        ty: Option<TypeExpr>,
        span: Span,
    },
    /// A type used in expression position (conversions, `make`/`new` args).
    Type(TypeExpr),
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Ident(id) => id.span,
            Expr::Lit { span, .. }
            | Expr::Composite { span, .. }
            | Expr::FuncLit { span, .. }
            | Expr::Selector { span, .. }
            | Expr::Index { span, .. }
            | Expr::SliceExpr { span, .. }
            | Expr::Call { span, .. }
            | Expr::Unary { span, .. }
            | Expr::Binary { span, .. }
            | Expr::Star { span, .. }
            | Expr::Paren { span, .. }
            | Expr::TypeAssert { span, .. } => *span,
            Expr::Type(ty) => ty.span(),
        }
    }

    /// The bare identifier symbol of this expression, if it is one.
    pub fn as_ident(&self) -> Option<Ident> {
        match self {
            Expr::Ident(id) => Some(*id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stmt_node_marker_strips_prefix() {
        let node = StmtNode {
            leading: vec![Comment {
                text: "// DINGO_MATCH_START scrutinee=r".to_string(),
                span: Span::default(),
            }],
            stmt: Stmt::Empty { span: Span::default() },
        };
        assert_eq!(node.marker("DINGO_MATCH_START"), Some(" scrutinee=r"));
        assert_eq!(node.marker("DINGO_MATCH_END"), None);
    }

    #[test]
    fn decl_name_reads_first_spec() {
        let spec = ValueSpec {
            names: vec![Ident::synthetic(Symbol::EMPTY)],
            ty: None,
            values: vec![],
            span: Span::default(),
        };
        let decl = Decl::Var(GenDecl {
            leading: vec![],
            specs: vec![spec],
            grouped: false,
            span: Span::default(),
        });
        assert_eq!(decl.name(), Some(Symbol::EMPTY));
    }
}
