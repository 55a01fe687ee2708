//! Recursive-descent parser for the generated-Go subset.
//!
//! The grammar coverage is driven by what the preprocessor can emit plus the
//! ordinary Go a Dingo user writes around the extensions: all declaration
//! forms, the full statement set minus type switches, `select`, labels and
//! `goto`, and expressions with Go operator precedence.
//!
//! Composite-literal ambiguity (`if x {` vs `T{}`) follows go/parser: bare
//! composite literals are rejected inside `if`/`for`/`switch` headers and
//! must be parenthesised there.
//!
//! Parse errors carry the span in the *parsed buffer*; the pipeline driver
//! resolves them back to Dingo coordinates through the position map.

use crate::ast::*;
use crate::lexer::Lexer;
use crate::token::{LitKind, Token, TokenKind};
use dingo_base::{Interner, Span};
use std::fmt;

/// A positioned parse failure.
#[derive(Debug, Clone)]
pub struct ParseError {
    pub message: String,
    pub span: Span,
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self { message: message.into(), span }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}..{}", self.message, self.span.start, self.span.end)
    }
}

impl std::error::Error for ParseError {}

/// Parses a complete Go source file.
pub fn parse_file(src: &str, interner: &mut Interner) -> Result<File, ParseError> {
    let lexed = Lexer::new(src).tokenize(interner)?;
    Parser::new(lexed.tokens, lexed.leading).file()
}

/// Token-stream parser. Construct via [`parse_file`] unless the caller
/// needs expression-level entry points (the match plugin parses guard
/// strings this way).
pub struct Parser {
    tokens: Vec<Token>,
    leading: Vec<Vec<Comment>>,
    pos: usize,
    /// When false, a bare `Ident{` is not a composite literal (header rule).
    allow_lit: bool,
}

impl Parser {
    pub fn new(tokens: Vec<Token>, leading: Vec<Vec<Comment>>) -> Self {
        Self { tokens, leading, pos: 0, allow_lit: true }
    }

    /// Parses a standalone expression, requiring all input be consumed.
    pub fn standalone_expr(src: &str, interner: &mut Interner) -> Result<Expr, ParseError> {
        let lexed = Lexer::new(src).tokenize(interner)?;
        let mut parser = Parser::new(lexed.tokens, lexed.leading);
        let expr = parser.expr()?;
        parser.skip_semis();
        if parser.peek() != &TokenKind::Eof {
            return Err(parser.unexpected("end of expression"));
        }
        Ok(expr)
    }

    // ─── Token plumbing ─────────────────────────────────────────────────

    fn peek(&self) -> &TokenKind {
        &self.tokens[self.pos].kind
    }

    fn peek_at(&self, ahead: usize) -> &TokenKind {
        let idx = (self.pos + ahead).min(self.tokens.len() - 1);
        &self.tokens[idx].kind
    }

    fn span(&self) -> Span {
        self.tokens[self.pos].span
    }

    fn prev_span(&self) -> Span {
        self.tokens[self.pos.saturating_sub(1)].span
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.peek() == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        if self.peek() == &kind {
            Ok(self.advance())
        } else {
            Err(ParseError::new(
                format!("expected {}, found {}", kind.describe(), self.peek().describe()),
                self.span(),
            ))
        }
    }

    fn unexpected(&self, what: &str) -> ParseError {
        ParseError::new(
            format!("expected {}, found {}", what, self.peek().describe()),
            self.span(),
        )
    }

    fn ident(&mut self) -> Result<Ident, ParseError> {
        match self.peek() {
            TokenKind::Ident(sym) => {
                let sym = *sym;
                let span = self.span();
                self.advance();
                Ok(Ident::new(sym, span))
            }
            _ => Err(self.unexpected("identifier")),
        }
    }

    /// Takes the comments leading the current token.
    fn take_leading(&mut self) -> Vec<Comment> {
        std::mem::take(&mut self.leading[self.pos])
    }

    fn skip_semis(&mut self) {
        while self.peek() == &TokenKind::Semicolon {
            self.advance();
        }
    }

    fn expect_semi(&mut self) -> Result<(), ParseError> {
        // A closing brace or paren terminates a statement without one.
        if matches!(self.peek(), TokenKind::RBrace | TokenKind::RParen | TokenKind::Eof) {
            return Ok(());
        }
        self.expect(TokenKind::Semicolon)?;
        Ok(())
    }

    // ─── File and declarations ──────────────────────────────────────────

    pub fn file(&mut self) -> Result<File, ParseError> {
        let start = self.span();
        self.skip_semis();
        self.take_leading();
        self.expect(TokenKind::Package)?;
        let package = self.ident()?;
        self.expect_semi()?;
        self.skip_semis();

        let mut imports = Vec::new();
        while self.peek() == &TokenKind::Import {
            self.import_decl(&mut imports)?;
            self.skip_semis();
        }

        let mut decls = Vec::new();
        while self.peek() != &TokenKind::Eof {
            self.decl(&mut decls)?;
            self.skip_semis();
        }
        Ok(File {
            package,
            imports,
            decls,
            span: start.merge(self.prev_span()),
        })
    }

    fn import_decl(&mut self, imports: &mut Vec<ImportDecl>) -> Result<(), ParseError> {
        let leading = self.take_leading();
        self.expect(TokenKind::Import)?;
        if self.eat(&TokenKind::LParen) {
            self.skip_semis();
            let mut first = true;
            while self.peek() != &TokenKind::RParen {
                let spec_leading = if first { leading.clone() } else { self.take_leading() };
                first = false;
                imports.push(self.import_spec(spec_leading)?);
                self.skip_semis();
            }
            self.expect(TokenKind::RParen)?;
        } else {
            imports.push(self.import_spec(leading)?);
        }
        self.expect_semi()
    }

    fn import_spec(&mut self, leading: Vec<Comment>) -> Result<ImportDecl, ParseError> {
        let start = self.span();
        let alias = match self.peek() {
            TokenKind::Ident(_) => Some(self.ident()?),
            TokenKind::Dot => {
                self.advance();
                None // dot imports are flattened; the alias is not kept
            }
            _ => None,
        };
        let path = match self.peek().clone() {
            TokenKind::Literal { kind: LitKind::String, value } => {
                self.advance();
                value
            }
            _ => return Err(self.unexpected("import path")),
        };
        Ok(ImportDecl {
            leading,
            alias,
            path,
            span: start.merge(self.prev_span()),
        })
    }

    fn decl(&mut self, decls: &mut Vec<Decl>) -> Result<(), ParseError> {
        match self.peek() {
            TokenKind::Func => {
                let func = self.func_decl()?;
                decls.push(Decl::Func(func));
                Ok(())
            }
            TokenKind::Type => self.type_decl(decls),
            TokenKind::Const => {
                let gen = self.gen_decl(TokenKind::Const)?;
                decls.push(Decl::Const(gen));
                Ok(())
            }
            TokenKind::Var => {
                let gen = self.gen_decl(TokenKind::Var)?;
                decls.push(Decl::Var(gen));
                Ok(())
            }
            _ => Err(self.unexpected("declaration")),
        }
    }

    fn func_decl(&mut self) -> Result<FuncDecl, ParseError> {
        let leading = self.take_leading();
        let start = self.span();
        self.expect(TokenKind::Func)?;

        let receiver = if self.peek() == &TokenKind::LParen {
            let mut params = self.params()?;
            if params.len() != 1 {
                return Err(ParseError::new("method receiver must be a single parameter", start));
            }
            Some(params.remove(0))
        } else {
            None
        };

        let name = self.ident()?;
        let params = self.params()?;
        let results = self.results()?;
        let body = if self.peek() == &TokenKind::LBrace {
            Some(self.block()?)
        } else {
            None
        };
        self.expect_semi()?;
        Ok(FuncDecl {
            leading,
            receiver,
            name,
            params,
            results,
            body,
            span: start.merge(self.prev_span()),
        })
    }

    /// Parses a parenthesised parameter list, resolving Go's shared-type
    /// grouping (`a, b int`) and anonymous-parameter forms.
    fn params(&mut self) -> Result<Vec<Param>, ParseError> {
        self.expect(TokenKind::LParen)?;
        let mut entries: Vec<(Option<TypeExpr>, TypeExpr, bool, Span)> = Vec::new();
        while self.peek() != &TokenKind::RParen {
            let start = self.span();
            let variadic = self.eat(&TokenKind::Ellipsis);
            let first = self.type_expr()?;
            // `name Type` or `name ...Type`: the first part was really a name.
            let entry = if !variadic && self.starts_type() || self.peek() == &TokenKind::Ellipsis {
                let inner_variadic = self.eat(&TokenKind::Ellipsis);
                let ty = self.type_expr()?;
                (Some(first), ty, inner_variadic, start.merge(self.prev_span()))
            } else {
                (None, first, variadic, start.merge(self.prev_span()))
            };
            entries.push(entry);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RParen)?;
        self.resolve_params(entries)
    }

    fn resolve_params(
        &self,
        entries: Vec<(Option<TypeExpr>, TypeExpr, bool, Span)>,
    ) -> Result<Vec<Param>, ParseError> {
        let named = entries.iter().any(|(name, ..)| name.is_some());
        if !named {
            // All entries are anonymous types.
            return Ok(entries
                .into_iter()
                .map(|(_, ty, variadic, span)| Param { name: None, ty, variadic, span })
                .collect());
        }
        // Typeless entries are names sharing the next typed entry's type.
        let mut params = Vec::new();
        let mut pending: Vec<(Ident, Span)> = Vec::new();
        for (name, ty, variadic, span) in entries {
            match name {
                Some(name_ty) => {
                    let ident = type_as_name(&name_ty)
                        .ok_or_else(|| ParseError::new("mixed named and unnamed parameters", span))?;
                    for (p, p_span) in pending.drain(..) {
                        params.push(Param {
                            name: Some(p),
                            ty: ty.clone(),
                            variadic: false,
                            span: p_span,
                        });
                    }
                    params.push(Param { name: Some(ident), ty, variadic, span });
                }
                None => {
                    let ident = type_as_name(&ty)
                        .ok_or_else(|| ParseError::new("mixed named and unnamed parameters", span))?;
                    pending.push((ident, span));
                }
            }
        }
        if !pending.is_empty() {
            return Err(ParseError::new(
                "parameter names without a type",
                pending[0].1,
            ));
        }
        Ok(params)
    }

    fn results(&mut self) -> Result<Vec<Param>, ParseError> {
        if self.peek() == &TokenKind::LParen {
            return self.params();
        }
        if self.starts_type() {
            let ty = self.type_expr()?;
            return Ok(vec![Param::anonymous(ty)]);
        }
        Ok(Vec::new())
    }

    fn starts_type(&self) -> bool {
        matches!(
            self.peek(),
            TokenKind::Ident(_)
                | TokenKind::Star
                | TokenKind::LBracket
                | TokenKind::Map
                | TokenKind::Chan
                | TokenKind::Arrow
                | TokenKind::Func
                | TokenKind::Struct
                | TokenKind::Interface
                | TokenKind::LParen
        )
    }

    fn type_decl(&mut self, decls: &mut Vec<Decl>) -> Result<(), ParseError> {
        let leading = self.take_leading();
        let start = self.span();
        self.expect(TokenKind::Type)?;
        if self.eat(&TokenKind::LParen) {
            self.skip_semis();
            let mut first = true;
            while self.peek() != &TokenKind::RParen {
                let spec_leading = if first { leading.clone() } else { self.take_leading() };
                first = false;
                let spec_start = self.span();
                decls.push(Decl::Type(self.type_spec(spec_leading, spec_start)?));
                self.skip_semis();
            }
            self.expect(TokenKind::RParen)?;
        } else {
            decls.push(Decl::Type(self.type_spec(leading, start)?));
        }
        self.expect_semi()
    }

    fn type_spec(&mut self, leading: Vec<Comment>, start: Span) -> Result<TypeDecl, ParseError> {
        let name = self.ident()?;
        let alias = self.eat(&TokenKind::Assign);
        let ty = self.type_expr()?;
        Ok(TypeDecl {
            leading,
            name,
            alias,
            ty,
            span: start.merge(self.prev_span()),
        })
    }

    fn gen_decl(&mut self, keyword: TokenKind) -> Result<GenDecl, ParseError> {
        let leading = self.take_leading();
        let start = self.span();
        self.expect(keyword)?;
        let mut specs = Vec::new();
        let grouped = self.eat(&TokenKind::LParen);
        if grouped {
            self.skip_semis();
            while self.peek() != &TokenKind::RParen {
                specs.push(self.value_spec()?);
                self.skip_semis();
            }
            self.expect(TokenKind::RParen)?;
        } else {
            specs.push(self.value_spec()?);
        }
        self.expect_semi()?;
        Ok(GenDecl {
            leading,
            specs,
            grouped,
            span: start.merge(self.prev_span()),
        })
    }

    fn value_spec(&mut self) -> Result<ValueSpec, ParseError> {
        let start = self.span();
        let mut names = vec![self.ident()?];
        while self.eat(&TokenKind::Comma) {
            names.push(self.ident()?);
        }
        let ty = if self.starts_type() && self.peek() != &TokenKind::Semicolon {
            Some(self.type_expr()?)
        } else {
            None
        };
        let mut values = Vec::new();
        if self.eat(&TokenKind::Assign) {
            values = self.expr_list()?;
        }
        Ok(ValueSpec {
            names,
            ty,
            values,
            span: start.merge(self.prev_span()),
        })
    }

    // ─── Types ──────────────────────────────────────────────────────────

    pub fn type_expr(&mut self) -> Result<TypeExpr, ParseError> {
        let start = self.span();
        match self.peek().clone() {
            TokenKind::Ident(_) => {
                let name = self.ident()?;
                if self.eat(&TokenKind::Dot) {
                    let sel = self.ident()?;
                    return Ok(TypeExpr::Qualified {
                        pkg: name,
                        name: sel,
                        span: start.merge(self.prev_span()),
                    });
                }
                if self.peek() == &TokenKind::LBracket
                    && !matches!(self.peek_at(1), TokenKind::RBracket)
                {
                    self.advance();
                    let mut args = vec![self.type_expr()?];
                    while self.eat(&TokenKind::Comma) {
                        args.push(self.type_expr()?);
                    }
                    self.expect(TokenKind::RBracket)?;
                    return Ok(TypeExpr::Generic {
                        name,
                        args,
                        span: start.merge(self.prev_span()),
                    });
                }
                Ok(TypeExpr::Name(name))
            }
            TokenKind::Star => {
                self.advance();
                let elem = self.type_expr()?;
                Ok(TypeExpr::Pointer {
                    elem: Box::new(elem),
                    span: start.merge(self.prev_span()),
                })
            }
            TokenKind::LBracket => {
                self.advance();
                if self.eat(&TokenKind::RBracket) {
                    let elem = self.type_expr()?;
                    return Ok(TypeExpr::Slice {
                        elem: Box::new(elem),
                        span: start.merge(self.prev_span()),
                    });
                }
                let len = self.expr()?;
                self.expect(TokenKind::RBracket)?;
                let elem = self.type_expr()?;
                Ok(TypeExpr::Array {
                    len: Box::new(len),
                    elem: Box::new(elem),
                    span: start.merge(self.prev_span()),
                })
            }
            TokenKind::Map => {
                self.advance();
                self.expect(TokenKind::LBracket)?;
                let key = self.type_expr()?;
                self.expect(TokenKind::RBracket)?;
                let value = self.type_expr()?;
                Ok(TypeExpr::Map {
                    key: Box::new(key),
                    value: Box::new(value),
                    span: start.merge(self.prev_span()),
                })
            }
            TokenKind::Chan => {
                self.advance();
                let dir = if self.eat(&TokenKind::Arrow) { ChanDir::Send } else { ChanDir::Both };
                let elem = self.type_expr()?;
                Ok(TypeExpr::Chan {
                    dir,
                    elem: Box::new(elem),
                    span: start.merge(self.prev_span()),
                })
            }
            TokenKind::Arrow => {
                self.advance();
                self.expect(TokenKind::Chan)?;
                let elem = self.type_expr()?;
                Ok(TypeExpr::Chan {
                    dir: ChanDir::Recv,
                    elem: Box::new(elem),
                    span: start.merge(self.prev_span()),
                })
            }
            TokenKind::Func => {
                self.advance();
                let params = self.params()?;
                let results = self.results()?;
                Ok(TypeExpr::Func {
                    params,
                    results,
                    span: start.merge(self.prev_span()),
                })
            }
            TokenKind::Struct => {
                self.advance();
                self.expect(TokenKind::LBrace)?;
                self.skip_semis();
                let mut fields = Vec::new();
                while self.peek() != &TokenKind::RBrace {
                    fields.push(self.field()?);
                    self.skip_semis();
                }
                self.expect(TokenKind::RBrace)?;
                Ok(TypeExpr::Struct {
                    fields,
                    span: start.merge(self.prev_span()),
                })
            }
            TokenKind::Interface => {
                self.advance();
                self.expect(TokenKind::LBrace)?;
                self.skip_semis();
                let mut methods = Vec::new();
                while self.peek() != &TokenKind::RBrace {
                    methods.push(self.interface_elem()?);
                    self.skip_semis();
                }
                self.expect(TokenKind::RBrace)?;
                Ok(TypeExpr::Interface {
                    methods,
                    span: start.merge(self.prev_span()),
                })
            }
            TokenKind::LParen => {
                self.advance();
                let elem = self.type_expr()?;
                self.expect(TokenKind::RParen)?;
                Ok(TypeExpr::Paren {
                    elem: Box::new(elem),
                    span: start.merge(self.prev_span()),
                })
            }
            _ => Err(self.unexpected("type")),
        }
    }

    fn field(&mut self) -> Result<Field, ParseError> {
        let start = self.span();
        // Embedded field: a type with no preceding name list.
        let first = self.type_expr()?;
        let (names, ty) = if self.starts_type() || self.peek() == &TokenKind::Comma {
            let mut names = vec![type_as_name(&first)
                .ok_or_else(|| ParseError::new("field name expected", start))?];
            while self.eat(&TokenKind::Comma) {
                names.push(self.ident()?);
            }
            let ty = self.type_expr()?;
            (names, ty)
        } else {
            (Vec::new(), first)
        };
        let tag = match self.peek().clone() {
            TokenKind::Literal { kind: LitKind::String, value } => {
                self.advance();
                Some(value)
            }
            _ => None,
        };
        Ok(Field {
            names,
            ty,
            tag,
            span: start.merge(self.prev_span()),
        })
    }

    fn interface_elem(&mut self) -> Result<Field, ParseError> {
        let start = self.span();
        let name = self.ident()?;
        if self.peek() == &TokenKind::LParen {
            let params = self.params()?;
            let results = self.results()?;
            let span = start.merge(self.prev_span());
            Ok(Field {
                names: vec![name],
                ty: TypeExpr::Func { params, results, span },
                tag: None,
                span,
            })
        } else {
            // Embedded interface.
            Ok(Field {
                names: Vec::new(),
                ty: TypeExpr::Name(name),
                tag: None,
                span: start.merge(self.prev_span()),
            })
        }
    }

    // ─── Statements ─────────────────────────────────────────────────────

    pub fn block(&mut self) -> Result<Block, ParseError> {
        let start = self.span();
        self.expect(TokenKind::LBrace)?;
        self.skip_semis();
        let mut stmts = Vec::new();
        while !matches!(self.peek(), TokenKind::RBrace | TokenKind::Eof) {
            let leading = self.take_leading();
            let stmt = self.stmt()?;
            stmts.push(StmtNode { leading, stmt });
            self.skip_semis();
        }
        let trailing = self.take_leading();
        self.expect(TokenKind::RBrace)?;
        Ok(Block {
            stmts,
            trailing,
            span: start.merge(self.prev_span()),
        })
    }

    fn stmt(&mut self) -> Result<Stmt, ParseError> {
        match self.peek() {
            TokenKind::Var => {
                self.advance();
                let spec = self.value_spec()?;
                self.expect_semi()?;
                Ok(Stmt::Var(spec))
            }
            TokenKind::Const => {
                self.advance();
                let spec = self.value_spec()?;
                self.expect_semi()?;
                Ok(Stmt::Const(spec))
            }
            TokenKind::Return => {
                let start = self.span();
                self.advance();
                let exprs = if matches!(self.peek(), TokenKind::Semicolon | TokenKind::RBrace) {
                    Vec::new()
                } else {
                    self.expr_list()?
                };
                self.expect_semi()?;
                Ok(Stmt::Return { exprs, span: start.merge(self.prev_span()) })
            }
            TokenKind::If => self.if_stmt(),
            TokenKind::For => self.for_stmt(),
            TokenKind::Switch => self.switch_stmt(),
            TokenKind::LBrace => Ok(Stmt::Block(self.block()?)),
            TokenKind::Defer => {
                let start = self.span();
                self.advance();
                let call = self.expr()?;
                self.expect_semi()?;
                Ok(Stmt::Defer { call, span: start.merge(self.prev_span()) })
            }
            TokenKind::Go => {
                let start = self.span();
                self.advance();
                let call = self.expr()?;
                self.expect_semi()?;
                Ok(Stmt::Go { call, span: start.merge(self.prev_span()) })
            }
            TokenKind::Break => {
                let start = self.span();
                self.advance();
                let label = if matches!(self.peek(), TokenKind::Ident(_)) {
                    Some(self.ident()?)
                } else {
                    None
                };
                self.expect_semi()?;
                Ok(Stmt::Break { label, span: start.merge(self.prev_span()) })
            }
            TokenKind::Continue => {
                let start = self.span();
                self.advance();
                let label = if matches!(self.peek(), TokenKind::Ident(_)) {
                    Some(self.ident()?)
                } else {
                    None
                };
                self.expect_semi()?;
                Ok(Stmt::Continue { label, span: start.merge(self.prev_span()) })
            }
            TokenKind::Fallthrough => {
                let span = self.span();
                self.advance();
                self.expect_semi()?;
                Ok(Stmt::Fallthrough { span })
            }
            TokenKind::Semicolon => {
                let span = self.span();
                self.advance();
                Ok(Stmt::Empty { span })
            }
            TokenKind::Select | TokenKind::Goto => Err(self.unexpected("statement")),
            _ => {
                let stmt = self.simple_stmt()?;
                self.expect_semi()?;
                Ok(stmt)
            }
        }
    }

    /// An expression, assignment, short declaration, send, or inc/dec.
    fn simple_stmt(&mut self) -> Result<Stmt, ParseError> {
        let start = self.span();
        let lhs = self.expr_list()?;

        let assign_op = match self.peek() {
            TokenKind::Assign => Some(AssignOp::Assign),
            TokenKind::Define => Some(AssignOp::Define),
            TokenKind::PlusAssign => Some(AssignOp::Add),
            TokenKind::MinusAssign => Some(AssignOp::Sub),
            TokenKind::StarAssign => Some(AssignOp::Mul),
            TokenKind::SlashAssign => Some(AssignOp::Div),
            TokenKind::PercentAssign => Some(AssignOp::Rem),
            TokenKind::AmpAssign => Some(AssignOp::And),
            TokenKind::PipeAssign => Some(AssignOp::Or),
            TokenKind::CaretAssign => Some(AssignOp::Xor),
            TokenKind::ShlAssign => Some(AssignOp::Shl),
            TokenKind::ShrAssign => Some(AssignOp::Shr),
            TokenKind::AmpCaretAssign => Some(AssignOp::AndNot),
            _ => None,
        };
        if let Some(op) = assign_op {
            self.advance();
            let rhs = self.expr_list()?;
            return Ok(Stmt::Assign {
                lhs,
                op,
                rhs,
                span: start.merge(self.prev_span()),
            });
        }

        if lhs.len() != 1 {
            return Err(ParseError::new("expected assignment", start));
        }
        let expr = lhs.into_iter().next().unwrap();

        match self.peek() {
            TokenKind::Inc | TokenKind::Dec => {
                let inc = self.peek() == &TokenKind::Inc;
                self.advance();
                Ok(Stmt::IncDec { expr, inc, span: start.merge(self.prev_span()) })
            }
            TokenKind::Arrow => {
                self.advance();
                let value = self.expr()?;
                Ok(Stmt::Send {
                    chan: expr,
                    value,
                    span: start.merge(self.prev_span()),
                })
            }
            _ => Ok(Stmt::Expr(expr)),
        }
    }

    fn if_stmt(&mut self) -> Result<Stmt, ParseError> {
        let start = self.span();
        self.expect(TokenKind::If)?;
        let saved = self.allow_lit;
        self.allow_lit = false;
        let mut init = None;
        let mut cond_stmt = self.simple_stmt()?;
        if self.eat(&TokenKind::Semicolon) {
            init = Some(Box::new(cond_stmt));
            cond_stmt = self.simple_stmt()?;
        }
        self.allow_lit = saved;
        let cond = match cond_stmt {
            Stmt::Expr(e) => e,
            other => {
                return Err(ParseError::new("expected condition expression", other.span()));
            }
        };
        let then = self.block()?;
        let els = if self.eat(&TokenKind::Else) {
            if self.peek() == &TokenKind::If {
                Some(Box::new(self.if_stmt()?))
            } else {
                Some(Box::new(Stmt::Block(self.block()?)))
            }
        } else {
            self.expect_semi()?;
            None
        };
        Ok(Stmt::If {
            init,
            cond,
            then,
            els,
            span: start.merge(self.prev_span()),
        })
    }

    fn for_stmt(&mut self) -> Result<Stmt, ParseError> {
        let start = self.span();
        self.expect(TokenKind::For)?;
        let saved = self.allow_lit;
        self.allow_lit = false;

        // `for {`
        if self.peek() == &TokenKind::LBrace {
            self.allow_lit = saved;
            let body = self.block()?;
            self.expect_semi()?;
            return Ok(Stmt::For {
                init: None,
                cond: None,
                post: None,
                body,
                span: start.merge(self.prev_span()),
            });
        }

        // `for range x {`
        if self.peek() == &TokenKind::Range {
            self.advance();
            let expr = self.expr()?;
            self.allow_lit = saved;
            let body = self.block()?;
            self.expect_semi()?;
            return Ok(Stmt::Range {
                key: None,
                value: None,
                define: false,
                expr,
                body,
                span: start.merge(self.prev_span()),
            });
        }

        let first = self.simple_stmt_or_range(start)?;
        match first {
            RangeOrSimple::Range(stmt) => {
                self.allow_lit = saved;
                let stmt = self.finish_range(stmt, start)?;
                Ok(stmt)
            }
            RangeOrSimple::Simple(stmt) => {
                if self.peek() == &TokenKind::LBrace {
                    // `for cond {`
                    self.allow_lit = saved;
                    let cond = match stmt {
                        Stmt::Expr(e) => e,
                        other => {
                            return Err(ParseError::new(
                                "expected loop condition",
                                other.span(),
                            ))
                        }
                    };
                    let body = self.block()?;
                    self.expect_semi()?;
                    return Ok(Stmt::For {
                        init: None,
                        cond: Some(cond),
                        post: None,
                        body,
                        span: start.merge(self.prev_span()),
                    });
                }
                // `for init; cond; post {`
                self.expect(TokenKind::Semicolon)?;
                let cond = if self.peek() == &TokenKind::Semicolon {
                    None
                } else {
                    Some(self.expr()?)
                };
                self.expect(TokenKind::Semicolon)?;
                let post = if self.peek() == &TokenKind::LBrace {
                    None
                } else {
                    Some(Box::new(self.simple_stmt()?))
                };
                self.allow_lit = saved;
                let body = self.block()?;
                self.expect_semi()?;
                Ok(Stmt::For {
                    init: Some(Box::new(stmt)),
                    cond,
                    post,
                    body,
                    span: start.merge(self.prev_span()),
                })
            }
        }
    }

    fn simple_stmt_or_range(&mut self, start: Span) -> Result<RangeOrSimple, ParseError> {
        let lhs = self.expr_list()?;
        let define = match self.peek() {
            TokenKind::Define => true,
            TokenKind::Assign => false,
            TokenKind::Inc | TokenKind::Dec => {
                let inc = self.peek() == &TokenKind::Inc;
                self.advance();
                let expr = lhs.into_iter().next().unwrap();
                return Ok(RangeOrSimple::Simple(Stmt::IncDec {
                    expr,
                    inc,
                    span: start.merge(self.prev_span()),
                }));
            }
            _ => {
                if lhs.len() != 1 {
                    return Err(ParseError::new("expected assignment", start));
                }
                return Ok(RangeOrSimple::Simple(Stmt::Expr(lhs.into_iter().next().unwrap())));
            }
        };
        self.advance();
        if self.peek() == &TokenKind::Range {
            self.advance();
            let expr = self.expr()?;
            let mut iter = lhs.into_iter();
            let key = iter.next();
            let value = iter.next();
            return Ok(RangeOrSimple::Range(Stmt::Range {
                key,
                value,
                define,
                expr,
                body: Block::default(),
                span: start,
            }));
        }
        let rhs = self.expr_list()?;
        Ok(RangeOrSimple::Simple(Stmt::Assign {
            lhs,
            op: if define { AssignOp::Define } else { AssignOp::Assign },
            rhs,
            span: start.merge(self.prev_span()),
        }))
    }

    fn finish_range(&mut self, stmt: Stmt, start: Span) -> Result<Stmt, ParseError> {
        match stmt {
            Stmt::Range { key, value, define, expr, .. } => {
                let body = self.block()?;
                self.expect_semi()?;
                Ok(Stmt::Range {
                    key,
                    value,
                    define,
                    expr,
                    body,
                    span: start.merge(self.prev_span()),
                })
            }
            other => Ok(other),
        }
    }

    fn switch_stmt(&mut self) -> Result<Stmt, ParseError> {
        let start = self.span();
        self.expect(TokenKind::Switch)?;
        let saved = self.allow_lit;
        self.allow_lit = false;

        let mut init = None;
        let mut tag = None;
        if self.peek() != &TokenKind::LBrace {
            let first = self.simple_stmt()?;
            if self.eat(&TokenKind::Semicolon) {
                init = Some(Box::new(first));
                if self.peek() != &TokenKind::LBrace {
                    match self.simple_stmt()? {
                        Stmt::Expr(e) => tag = Some(e),
                        other => {
                            return Err(ParseError::new("expected switch tag", other.span()))
                        }
                    }
                }
            } else {
                match first {
                    Stmt::Expr(e) => tag = Some(e),
                    other => return Err(ParseError::new("expected switch tag", other.span())),
                }
            }
        }
        self.allow_lit = saved;

        self.expect(TokenKind::LBrace)?;
        self.skip_semis();
        let mut cases = Vec::new();
        while !matches!(self.peek(), TokenKind::RBrace | TokenKind::Eof) {
            cases.push(self.case_clause()?);
        }
        self.expect(TokenKind::RBrace)?;
        self.expect_semi()?;
        Ok(Stmt::Switch {
            init,
            tag,
            cases,
            span: start.merge(self.prev_span()),
        })
    }

    fn case_clause(&mut self) -> Result<CaseClause, ParseError> {
        let leading = self.take_leading();
        let start = self.span();
        let exprs = match self.peek() {
            TokenKind::Case => {
                self.advance();
                self.expr_list()?
            }
            TokenKind::Default => {
                self.advance();
                Vec::new()
            }
            _ => return Err(self.unexpected("'case' or 'default'")),
        };
        self.expect(TokenKind::Colon)?;
        self.skip_semis();
        let mut body = Vec::new();
        while !matches!(
            self.peek(),
            TokenKind::Case | TokenKind::Default | TokenKind::RBrace | TokenKind::Eof
        ) {
            let leading = self.take_leading();
            let stmt = self.stmt()?;
            body.push(StmtNode { leading, stmt });
            self.skip_semis();
        }
        Ok(CaseClause {
            leading,
            exprs,
            body,
            span: start.merge(self.prev_span()),
        })
    }

    // ─── Expressions ────────────────────────────────────────────────────

    pub fn expr_list(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut exprs = vec![self.expr()?];
        while self.eat(&TokenKind::Comma) {
            exprs.push(self.expr()?);
        }
        Ok(exprs)
    }

    pub fn expr(&mut self) -> Result<Expr, ParseError> {
        self.binary_expr(1)
    }

    fn binary_expr(&mut self, min_prec: u8) -> Result<Expr, ParseError> {
        let mut lhs = self.unary_expr()?;
        loop {
            let prec = self.peek().precedence();
            if prec < min_prec {
                return Ok(lhs);
            }
            let op = binary_op(self.peek()).ok_or_else(|| self.unexpected("operator"))?;
            self.advance();
            let rhs = self.binary_expr(prec + 1)?;
            let span = lhs.span().merge(rhs.span());
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                span,
            };
        }
    }

    fn unary_expr(&mut self) -> Result<Expr, ParseError> {
        let start = self.span();
        let op = match self.peek() {
            TokenKind::Plus => Some(UnaryOp::Plus),
            TokenKind::Minus => Some(UnaryOp::Minus),
            TokenKind::Not => Some(UnaryOp::Not),
            TokenKind::Caret => Some(UnaryOp::Xor),
            TokenKind::Amp => Some(UnaryOp::Addr),
            TokenKind::Arrow => Some(UnaryOp::Recv),
            TokenKind::Star => {
                self.advance();
                let expr = self.unary_expr()?;
                let span = start.merge(self.prev_span());
                return Ok(Expr::Star { expr: Box::new(expr), span });
            }
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            let expr = self.unary_expr()?;
            let span = start.merge(self.prev_span());
            return Ok(Expr::Unary { op, expr: Box::new(expr), span });
        }
        self.primary_expr()
    }

    fn primary_expr(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.operand()?;
        loop {
            match self.peek() {
                TokenKind::Dot => {
                    self.advance();
                    if self.eat(&TokenKind::LParen) {
                        // Type assertion: x.(T) or x.(type).
                        let ty = if self.peek() == &TokenKind::Type {
                            self.advance();
                            None
                        } else {
                            Some(self.type_expr()?)
                        };
                        self.expect(TokenKind::RParen)?;
                        let span = expr.span().merge(self.prev_span());
                        expr = Expr::TypeAssert { expr: Box::new(expr), ty, span };
                    } else {
                        let sel = self.ident()?;
                        let span = expr.span().merge(sel.span);
                        expr = Expr::Selector { expr: Box::new(expr), sel, span };
                    }
                }
                TokenKind::LParen => {
                    self.advance();
                    let saved = self.allow_lit;
                    self.allow_lit = true;
                    let mut args = Vec::new();
                    let mut ellipsis = false;
                    while self.peek() != &TokenKind::RParen {
                        args.push(self.expr()?);
                        if self.eat(&TokenKind::Ellipsis) {
                            ellipsis = true;
                        }
                        if !self.eat(&TokenKind::Comma) {
                            break;
                        }
                    }
                    self.allow_lit = saved;
                    self.expect(TokenKind::RParen)?;
                    let span = expr.span().merge(self.prev_span());
                    expr = Expr::Call {
                        func: Box::new(expr),
                        args,
                        ellipsis,
                        span,
                    };
                }
                TokenKind::LBracket => {
                    self.advance();
                    let saved = self.allow_lit;
                    self.allow_lit = true;
                    // Slice or index.
                    if self.peek() == &TokenKind::Colon {
                        expr = self.finish_slice(expr, None)?;
                    } else {
                        let first = self.expr()?;
                        if self.peek() == &TokenKind::Colon {
                            expr = self.finish_slice(expr, Some(first))?;
                        } else {
                            let mut indices = vec![first];
                            while self.eat(&TokenKind::Comma) {
                                indices.push(self.expr()?);
                            }
                            self.expect(TokenKind::RBracket)?;
                            let span = expr.span().merge(self.prev_span());
                            expr = Expr::Index {
                                expr: Box::new(expr),
                                indices,
                                span,
                            };
                        }
                    }
                    self.allow_lit = saved;
                }
                TokenKind::LBrace if self.allow_lit && is_literal_type(&expr) => {
                    let ty = expr_to_type(&expr)
                        .ok_or_else(|| self.unexpected("composite literal type"))?;
                    let elems = self.composite_body()?;
                    let span = ty.span().merge(self.prev_span());
                    expr = Expr::Composite {
                        ty: Some(Box::new(ty)),
                        elems,
                        span,
                    };
                }
                _ => return Ok(expr),
            }
        }
    }

    fn finish_slice(&mut self, expr: Expr, low: Option<Expr>) -> Result<Expr, ParseError> {
        self.expect(TokenKind::Colon)?;
        let high = if matches!(self.peek(), TokenKind::RBracket | TokenKind::Colon) {
            None
        } else {
            Some(Box::new(self.expr()?))
        };
        let max = if self.eat(&TokenKind::Colon) {
            Some(Box::new(self.expr()?))
        } else {
            None
        };
        self.expect(TokenKind::RBracket)?;
        let span = expr.span().merge(self.prev_span());
        Ok(Expr::SliceExpr {
            expr: Box::new(expr),
            low: low.map(Box::new),
            high,
            max,
            span,
        })
    }

    fn operand(&mut self) -> Result<Expr, ParseError> {
        let start = self.span();
        match self.peek().clone() {
            TokenKind::Ident(sym) => {
                self.advance();
                Ok(Expr::Ident(Ident::new(sym, start)))
            }
            TokenKind::Literal { kind, value } => {
                self.advance();
                Ok(Expr::Lit { kind, value, span: start })
            }
            TokenKind::LParen => {
                self.advance();
                let saved = self.allow_lit;
                self.allow_lit = true;
                let inner = self.expr()?;
                self.allow_lit = saved;
                self.expect(TokenKind::RParen)?;
                let span = start.merge(self.prev_span());
                Ok(Expr::Paren { expr: Box::new(inner), span })
            }
            TokenKind::Func => {
                self.advance();
                let params = self.params()?;
                let results = self.results()?;
                if self.peek() == &TokenKind::LBrace {
                    let saved = self.allow_lit;
                    self.allow_lit = true;
                    let body = self.block()?;
                    self.allow_lit = saved;
                    let span = start.merge(self.prev_span());
                    Ok(Expr::FuncLit { params, results, body, span })
                } else {
                    let span = start.merge(self.prev_span());
                    Ok(Expr::Type(TypeExpr::Func { params, results, span }))
                }
            }
            // Composite literals and conversions headed by a type syntax.
            TokenKind::LBracket | TokenKind::Map | TokenKind::Struct | TokenKind::Interface
            | TokenKind::Chan => {
                let ty = self.type_expr()?;
                match self.peek() {
                    TokenKind::LBrace => {
                        let elems = self.composite_body()?;
                        let span = start.merge(self.prev_span());
                        Ok(Expr::Composite {
                            ty: Some(Box::new(ty)),
                            elems,
                            span,
                        })
                    }
                    _ => Ok(Expr::Type(ty)),
                }
            }
            _ => Err(self.unexpected("expression")),
        }
    }

    fn composite_body(&mut self) -> Result<Vec<CompositeElem>, ParseError> {
        self.expect(TokenKind::LBrace)?;
        let saved = self.allow_lit;
        self.allow_lit = true;
        self.skip_semis();
        let mut elems = Vec::new();
        while !matches!(self.peek(), TokenKind::RBrace | TokenKind::Eof) {
            let start = self.span();
            let first = self.composite_value()?;
            let elem = if self.eat(&TokenKind::Colon) {
                let value = self.composite_value()?;
                CompositeElem {
                    key: Some(first),
                    value,
                    span: start.merge(self.prev_span()),
                }
            } else {
                CompositeElem {
                    key: None,
                    value: first,
                    span: start.merge(self.prev_span()),
                }
            };
            elems.push(elem);
            if !self.eat(&TokenKind::Comma) {
                self.skip_semis();
                break;
            }
            self.skip_semis();
        }
        self.allow_lit = saved;
        self.expect(TokenKind::RBrace)?;
        Ok(elems)
    }

    /// A composite element value: an expression or a nested untyped literal.
    fn composite_value(&mut self) -> Result<Expr, ParseError> {
        if self.peek() == &TokenKind::LBrace {
            let start = self.span();
            let elems = self.composite_body()?;
            return Ok(Expr::Composite {
                ty: None,
                elems,
                span: start.merge(self.prev_span()),
            });
        }
        self.expr()
    }
}

enum RangeOrSimple {
    Range(Stmt),
    Simple(Stmt),
}

fn binary_op(kind: &TokenKind) -> Option<BinaryOp> {
    let op = match kind {
        TokenKind::OrOr => BinaryOp::LogicalOr,
        TokenKind::AndAnd => BinaryOp::LogicalAnd,
        TokenKind::EqEq => BinaryOp::Eq,
        TokenKind::NotEq => BinaryOp::NotEq,
        TokenKind::Lt => BinaryOp::Lt,
        TokenKind::LtEq => BinaryOp::LtEq,
        TokenKind::Gt => BinaryOp::Gt,
        TokenKind::GtEq => BinaryOp::GtEq,
        TokenKind::Plus => BinaryOp::Add,
        TokenKind::Minus => BinaryOp::Sub,
        TokenKind::Pipe => BinaryOp::Or,
        TokenKind::Caret => BinaryOp::Xor,
        TokenKind::Star => BinaryOp::Mul,
        TokenKind::Slash => BinaryOp::Div,
        TokenKind::Percent => BinaryOp::Rem,
        TokenKind::Shl => BinaryOp::Shl,
        TokenKind::Shr => BinaryOp::Shr,
        TokenKind::Amp => BinaryOp::And,
        TokenKind::AmpCaret => BinaryOp::AndNot,
        _ => return None,
    };
    Some(op)
}

/// Extracts a bare name from a type expression parsed where a name belongs.
fn type_as_name(ty: &TypeExpr) -> Option<Ident> {
    match ty {
        TypeExpr::Name(id) => Some(*id),
        _ => None,
    }
}

/// True when a parsed expression can head a composite literal.
fn is_literal_type(expr: &Expr) -> bool {
    matches!(
        expr,
        Expr::Ident(_) | Expr::Selector { .. } | Expr::Index { .. } | Expr::Type(_)
    )
}

/// Reinterprets an expression as the type of a composite literal.
fn expr_to_type(expr: &Expr) -> Option<TypeExpr> {
    match expr {
        Expr::Ident(id) => Some(TypeExpr::Name(*id)),
        Expr::Selector { expr, sel, span } => match expr.as_ref() {
            Expr::Ident(pkg) => Some(TypeExpr::Qualified {
                pkg: *pkg,
                name: *sel,
                span: *span,
            }),
            _ => None,
        },
        Expr::Index { expr, indices, span } => {
            let name = expr.as_ident()?;
            let args = indices
                .iter()
                .map(|idx| match idx {
                    Expr::Ident(id) => Some(TypeExpr::Name(*id)),
                    Expr::Type(ty) => Some(ty.clone()),
                    _ => None,
                })
                .collect::<Option<Vec<_>>>()?;
            Some(TypeExpr::Generic { name, args, span: *span })
        }
        Expr::Type(ty) => Some(ty.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> File {
        let mut interner = Interner::new();
        parse_file(src, &mut interner).unwrap()
    }

    #[test]
    fn parses_package_and_imports() {
        let file = parse("package main\n\nimport (\n\t\"fmt\"\n\t\"os\"\n)\n");
        assert_eq!(file.imports.len(), 2);
        assert_eq!(file.imports[0].path, "\"fmt\"");
    }

    #[test]
    fn parses_function_with_grouped_params() {
        let file = parse("package p\n\nfunc add(a, b int) int {\n\treturn a + b\n}\n");
        let Decl::Func(func) = &file.decls[0] else { panic!("expected func") };
        assert_eq!(func.params.len(), 2);
        assert!(func.params.iter().all(|p| p.name.is_some()));
        assert_eq!(func.results.len(), 1);
    }

    #[test]
    fn parses_method_with_receiver() {
        let file = parse("package p\n\nfunc (r Result_int_error) IsOk() bool {\n\treturn r.tag == 0\n}\n");
        let Decl::Func(func) = &file.decls[0] else { panic!("expected func") };
        assert!(func.receiver.is_some());
    }

    #[test]
    fn parses_struct_type_decl() {
        let file = parse(
            "package p\n\ntype Value struct {\n\ttag uint8\n\tint0 *int\n\tstr0 *string\n}\n",
        );
        let Decl::Type(decl) = &file.decls[0] else { panic!("expected type") };
        let TypeExpr::Struct { fields, .. } = &decl.ty else { panic!("expected struct") };
        assert_eq!(fields.len(), 3);
    }

    #[test]
    fn parses_const_group_with_iota() {
        let file = parse(
            "package p\n\nconst (\n\tValueTagInt ValueTag = iota\n\tValueTagStr\n)\n",
        );
        let Decl::Const(gen) = &file.decls[0] else { panic!("expected const") };
        assert!(gen.grouped);
        assert_eq!(gen.specs.len(), 2);
    }

    #[test]
    fn parses_switch_with_cases_and_leading_comments() {
        let file = parse(
            "package p\n\nfunc f(x int) int {\n\t// DINGO_MATCH_START scrutinee=x\n\tswitch x {\n\tcase 1:\n\t\treturn 1\n\tdefault:\n\t\treturn 0\n\t}\n\t// DINGO_MATCH_END\n}\n",
        );
        let Decl::Func(func) = &file.decls[0] else { panic!("expected func") };
        let body = func.body.as_ref().unwrap();
        let node = &body.stmts[0];
        assert!(node.marker("DINGO_MATCH_START").is_some());
        let Stmt::Switch { cases, .. } = &node.stmt else { panic!("expected switch") };
        assert_eq!(cases.len(), 2);
        assert!(cases[1].exprs.is_empty());
    }

    #[test]
    fn bare_composite_rejected_in_if_header() {
        // `if x {` must parse as condition + block, not composite literal.
        let file = parse("package p\n\nfunc f(x bool) {\n\tif x {\n\t\treturn\n\t}\n}\n");
        let Decl::Func(func) = &file.decls[0] else { panic!("expected func") };
        let Stmt::If { cond, .. } = &func.body.as_ref().unwrap().stmts[0].stmt else {
            panic!("expected if")
        };
        assert!(matches!(cond, Expr::Ident(_)));
    }

    #[test]
    fn parses_composite_literals_in_expressions() {
        let file = parse("package p\n\nvar x = []int{1, 2, 3}\nvar m = map[string]int{\"a\": 1}\n");
        assert_eq!(file.decls.len(), 2);
    }

    #[test]
    fn parses_short_decl_and_calls() {
        let file = parse(
            "package p\n\nfunc f() error {\n\t__tmp0, __err0 := os.ReadFile(\"x\")\n\tif __err0 != nil {\n\t\treturn __err0\n\t}\n\t_ = __tmp0\n\treturn nil\n}\n",
        );
        let Decl::Func(func) = &file.decls[0] else { panic!("expected func") };
        assert_eq!(func.body.as_ref().unwrap().stmts.len(), 4);
    }

    #[test]
    fn parses_func_literal_iife() {
        let file = parse(
            "package p\n\nfunc f(x int) any {\n\tarea := func() any {\n\t\treturn x\n\t}()\n\treturn area\n}\n",
        );
        let Decl::Func(func) = &file.decls[0] else { panic!("expected func") };
        let Stmt::Assign { rhs, .. } = &func.body.as_ref().unwrap().stmts[0].stmt else {
            panic!("expected assign")
        };
        assert!(matches!(rhs[0], Expr::Call { .. }));
    }

    #[test]
    fn parses_for_range() {
        let file = parse("package p\n\nfunc f(xs []int) {\n\tfor i, v := range xs {\n\t\t_ = i\n\t\t_ = v\n\t}\n}\n");
        let Decl::Func(func) = &file.decls[0] else { panic!("expected func") };
        assert!(matches!(func.body.as_ref().unwrap().stmts[0].stmt, Stmt::Range { .. }));
    }

    #[test]
    fn parses_generic_type_instantiation() {
        let file = parse("package p\n\nvar x Pair[int, string]\n");
        let Decl::Var(gen) = &file.decls[0] else { panic!("expected var") };
        assert!(matches!(gen.specs[0].ty, Some(TypeExpr::Generic { .. })));
    }

    #[test]
    fn standalone_expr_parses_guards() {
        let mut interner = Interner::new();
        let expr = Parser::standalone_expr("x > 0 && x < 10", &mut interner).unwrap();
        assert!(matches!(expr, Expr::Binary { op: BinaryOp::LogicalAnd, .. }));
    }

    #[test]
    fn parse_error_reports_span() {
        let mut interner = Interner::new();
        let err = parse_file("package p\n\nfunc {\n", &mut interner).unwrap_err();
        assert!(err.span.start > 0);
        assert!(err.message.contains("identifier"));
    }

    #[test]
    fn trailing_block_comments_survive() {
        let file = parse(
            "package p\n\nfunc f() {\n\tx := 1\n\t_ = x\n\t// dingo:e:1\n}\n",
        );
        let Decl::Func(func) = &file.decls[0] else { panic!("expected func") };
        let block = func.body.as_ref().unwrap();
        assert_eq!(block.trailing.len(), 1);
        assert!(block.trailing[0].text.contains("dingo:e:1"));
    }
}
