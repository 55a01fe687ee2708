//! Deterministic gofmt-style printer.
//!
//! Output is canonical: tab indentation, fixed operator spacing, grouped
//! imports, one blank line between top-level declarations. Printing is a
//! pure function of the AST, so printing the parse of the printer's own
//! output reproduces it byte for byte.
//!
//! Alongside the text, the printer records a per-line *origin span*: the
//! span of the statement or declaration that produced the line, in the
//! coordinates of the buffer the AST was parsed from. The source-map
//! assembler composes these with the preprocessor's position map to reach
//! Dingo coordinates. Synthesized declarations carry the span their plugin
//! anchored them to (the `enum` block, the first constructor use), so even
//! injected lines map somewhere sensible.

use crate::ast::*;
use dingo_base::{Interner, Span};

/// Printer output: the Go text plus one origin entry per line.
#[derive(Debug, Clone)]
pub struct PrintedFile {
    pub text: String,
    /// `line_origins[i]` is the origin of line `i + 1`; `None` for blank
    /// and structural lines.
    pub line_origins: Vec<Option<Span>>,
}

/// Prints a [`File`] into canonical Go text.
pub struct Printer<'a> {
    interner: &'a Interner,
    out: String,
    indent: usize,
    line_origins: Vec<Option<Span>>,
    origin_stack: Vec<Span>,
    pending_origin: Option<Span>,
    line_dirty: bool,
}

impl<'a> Printer<'a> {
    pub fn new(interner: &'a Interner) -> Self {
        Self {
            interner,
            out: String::new(),
            indent: 0,
            line_origins: Vec::new(),
            origin_stack: Vec::new(),
            pending_origin: None,
            line_dirty: false,
        }
    }

    /// Prints the file and returns the text plus line origins.
    pub fn print(mut self, file: &File) -> PrintedFile {
        self.with_origin(file.package.span, |p| {
            p.word("package ");
            p.ident(&file.package);
        });
        self.nl();

        if !file.imports.is_empty() {
            self.nl();
            self.print_imports(&file.imports);
        }

        for decl in &file.decls {
            self.nl();
            self.print_decl(decl);
        }

        if self.line_dirty {
            self.nl();
        }
        PrintedFile {
            text: self.out,
            line_origins: self.line_origins,
        }
    }

    // ─── Low-level emission ─────────────────────────────────────────────

    fn word(&mut self, s: &str) {
        if s.is_empty() {
            return;
        }
        if !self.line_dirty {
            self.line_dirty = true;
            self.pending_origin = self.origin_stack.last().copied();
            for _ in 0..self.indent {
                self.out.push('\t');
            }
        }
        self.out.push_str(s);
    }

    fn nl(&mut self) {
        self.out.push('\n');
        self.line_origins.push(self.pending_origin.take());
        self.line_dirty = false;
    }

    fn ident(&mut self, id: &Ident) {
        let name = self.interner.resolve(id.sym).to_string();
        self.word(&name);
    }

    fn comments(&mut self, comments: &[Comment]) {
        for comment in comments {
            self.origin_stack.push(comment.span);
            let text = comment.text.clone();
            self.word(&text);
            self.nl();
            self.origin_stack.pop();
        }
    }

    fn with_origin<F: FnOnce(&mut Self)>(&mut self, span: Span, f: F) {
        self.origin_stack.push(span);
        f(self);
        self.origin_stack.pop();
    }

    // ─── Declarations ───────────────────────────────────────────────────

    fn print_imports(&mut self, imports: &[ImportDecl]) {
        if imports.len() == 1 {
            let import = &imports[0];
            self.comments(&import.leading);
            self.with_origin(import.span, |p| {
                p.word("import ");
                if let Some(alias) = &import.alias {
                    p.ident(alias);
                    p.word(" ");
                }
                let path = import.path.clone();
                p.word(&path);
            });
            self.nl();
            return;
        }
        self.word("import (");
        self.nl();
        self.indent += 1;
        for import in imports {
            self.comments(&import.leading);
            self.with_origin(import.span, |p| {
                if let Some(alias) = &import.alias {
                    p.ident(alias);
                    p.word(" ");
                }
                let path = import.path.clone();
                p.word(&path);
            });
            self.nl();
        }
        self.indent -= 1;
        self.word(")");
        self.nl();
    }

    pub fn print_decl(&mut self, decl: &Decl) {
        self.with_origin(decl.span(), |p| match decl {
            Decl::Func(func) => p.print_func(func),
            Decl::Type(ty) => p.print_type_decl(ty),
            Decl::Const(gen) => p.print_gen_decl("const", gen),
            Decl::Var(gen) => p.print_gen_decl("var", gen),
        });
    }

    fn print_func(&mut self, func: &FuncDecl) {
        self.comments(&func.leading);
        self.word("func ");
        if let Some(receiver) = &func.receiver {
            self.word("(");
            self.print_param(receiver);
            self.word(") ");
        }
        self.ident(&func.name);
        self.print_signature(&func.params, &func.results);
        if let Some(body) = &func.body {
            self.word(" ");
            self.print_block(body);
        }
        self.nl();
    }

    fn print_signature(&mut self, params: &[Param], results: &[Param]) {
        self.word("(");
        for (i, param) in params.iter().enumerate() {
            if i > 0 {
                self.word(", ");
            }
            self.print_param(param);
        }
        self.word(")");
        match results {
            [] => {}
            [single] if single.name.is_none() => {
                self.word(" ");
                self.print_type(&single.ty);
            }
            _ => {
                self.word(" (");
                for (i, result) in results.iter().enumerate() {
                    if i > 0 {
                        self.word(", ");
                    }
                    self.print_param(result);
                }
                self.word(")");
            }
        }
    }

    fn print_param(&mut self, param: &Param) {
        if let Some(name) = &param.name {
            self.ident(name);
            self.word(" ");
        }
        if param.variadic {
            self.word("...");
        }
        self.print_type(&param.ty);
    }

    fn print_type_decl(&mut self, decl: &TypeDecl) {
        self.comments(&decl.leading);
        self.word("type ");
        self.ident(&decl.name);
        if decl.alias {
            self.word(" = ");
        } else {
            self.word(" ");
        }
        self.print_type(&decl.ty);
        self.nl();
    }

    fn print_gen_decl(&mut self, keyword: &str, decl: &GenDecl) {
        self.comments(&decl.leading);
        if decl.grouped || decl.specs.len() > 1 {
            self.word(keyword);
            self.word(" (");
            self.nl();
            self.indent += 1;
            for spec in &decl.specs {
                self.with_origin(spec.span, |p| p.print_value_spec(spec));
                self.nl();
            }
            self.indent -= 1;
            self.word(")");
            self.nl();
        } else {
            self.word(keyword);
            self.word(" ");
            self.print_value_spec(&decl.specs[0]);
            self.nl();
        }
    }

    fn print_value_spec(&mut self, spec: &ValueSpec) {
        for (i, name) in spec.names.iter().enumerate() {
            if i > 0 {
                self.word(", ");
            }
            self.ident(name);
        }
        if let Some(ty) = &spec.ty {
            self.word(" ");
            self.print_type(ty);
        }
        if !spec.values.is_empty() {
            self.word(" = ");
            for (i, value) in spec.values.iter().enumerate() {
                if i > 0 {
                    self.word(", ");
                }
                self.print_expr(value);
            }
        }
    }

    // ─── Types ──────────────────────────────────────────────────────────

    pub fn print_type(&mut self, ty: &TypeExpr) {
        match ty {
            TypeExpr::Name(id) => self.ident(id),
            TypeExpr::Qualified { pkg, name, .. } => {
                self.ident(pkg);
                self.word(".");
                self.ident(name);
            }
            TypeExpr::Pointer { elem, .. } => {
                self.word("*");
                self.print_type(elem);
            }
            TypeExpr::Slice { elem, .. } => {
                self.word("[]");
                self.print_type(elem);
            }
            TypeExpr::Array { len, elem, .. } => {
                self.word("[");
                self.print_expr(len);
                self.word("]");
                self.print_type(elem);
            }
            TypeExpr::Map { key, value, .. } => {
                self.word("map[");
                self.print_type(key);
                self.word("]");
                self.print_type(value);
            }
            TypeExpr::Chan { dir, elem, .. } => {
                match dir {
                    ChanDir::Both => self.word("chan "),
                    ChanDir::Send => self.word("chan<- "),
                    ChanDir::Recv => self.word("<-chan "),
                }
                self.print_type(elem);
            }
            TypeExpr::Func { params, results, .. } => {
                self.word("func");
                self.print_signature(params, results);
            }
            TypeExpr::Struct { fields, .. } => {
                if fields.is_empty() {
                    self.word("struct{}");
                    return;
                }
                self.word("struct {");
                self.nl();
                self.indent += 1;
                for field in fields {
                    self.print_field(field);
                    self.nl();
                }
                self.indent -= 1;
                self.word("}");
            }
            TypeExpr::Interface { methods, .. } => {
                if methods.is_empty() {
                    self.word("interface{}");
                    return;
                }
                self.word("interface {");
                self.nl();
                self.indent += 1;
                for method in methods {
                    self.print_field(method);
                    self.nl();
                }
                self.indent -= 1;
                self.word("}");
            }
            TypeExpr::Generic { name, args, .. } => {
                self.ident(name);
                self.word("[");
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        self.word(", ");
                    }
                    self.print_type(arg);
                }
                self.word("]");
            }
            TypeExpr::Paren { elem, .. } => {
                self.word("(");
                self.print_type(elem);
                self.word(")");
            }
        }
    }

    fn print_field(&mut self, field: &Field) {
        for (i, name) in field.names.iter().enumerate() {
            if i > 0 {
                self.word(", ");
            }
            self.ident(name);
        }
        // Method fields carry their signature in a Func type.
        if field.names.len() == 1 {
            if let TypeExpr::Func { params, results, .. } = &field.ty {
                self.print_signature(params, results);
                return;
            }
        }
        if !field.names.is_empty() {
            self.word(" ");
        }
        self.print_type(&field.ty);
        if let Some(tag) = &field.tag {
            self.word(" ");
            let tag = tag.clone();
            self.word(&tag);
        }
    }

    // ─── Statements ─────────────────────────────────────────────────────

    pub fn print_block(&mut self, block: &Block) {
        self.word("{");
        self.nl();
        self.indent += 1;
        for node in &block.stmts {
            self.print_stmt_node(node);
        }
        self.comments(&block.trailing);
        self.indent -= 1;
        self.word("}");
    }

    fn print_stmt_node(&mut self, node: &StmtNode) {
        self.comments(&node.leading);
        self.with_origin(node.stmt.span(), |p| {
            p.print_stmt(&node.stmt);
        });
    }

    fn print_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Var(spec) => {
                self.word("var ");
                self.print_value_spec(spec);
                self.nl();
            }
            Stmt::Const(spec) => {
                self.word("const ");
                self.print_value_spec(spec);
                self.nl();
            }
            Stmt::Assign { lhs, op, rhs, .. } => {
                for (i, expr) in lhs.iter().enumerate() {
                    if i > 0 {
                        self.word(", ");
                    }
                    self.print_expr(expr);
                }
                self.word(assign_op_str(*op));
                for (i, expr) in rhs.iter().enumerate() {
                    if i > 0 {
                        self.word(", ");
                    }
                    self.print_expr(expr);
                }
                self.nl();
            }
            Stmt::Expr(expr) => {
                self.print_expr(expr);
                self.nl();
            }
            Stmt::IncDec { expr, inc, .. } => {
                self.print_expr(expr);
                self.word(if *inc { "++" } else { "--" });
                self.nl();
            }
            Stmt::Return { exprs, .. } => {
                self.word("return");
                for (i, expr) in exprs.iter().enumerate() {
                    self.word(if i == 0 { " " } else { ", " });
                    self.print_expr(expr);
                }
                self.nl();
            }
            Stmt::If { init, cond, then, els, .. } => {
                self.word("if ");
                if let Some(init) = init {
                    self.print_inline_stmt(init);
                    self.word("; ");
                }
                self.print_expr(cond);
                self.word(" ");
                self.print_block(then);
                match els {
                    Some(els) => {
                        self.word(" else ");
                        match els.as_ref() {
                            Stmt::Block(block) => {
                                self.print_block(block);
                                self.nl();
                            }
                            other => self.print_stmt(other),
                        }
                    }
                    None => self.nl(),
                }
            }
            Stmt::For { init, cond, post, body, .. } => {
                self.word("for ");
                match (init, cond, post) {
                    (None, None, None) => {}
                    (None, Some(cond), None) => {
                        self.print_expr(cond);
                        self.word(" ");
                    }
                    _ => {
                        if let Some(init) = init {
                            self.print_inline_stmt(init);
                        }
                        self.word("; ");
                        if let Some(cond) = cond {
                            self.print_expr(cond);
                        }
                        self.word("; ");
                        if let Some(post) = post {
                            self.print_inline_stmt(post);
                        }
                        self.word(" ");
                    }
                }
                self.print_block(body);
                self.nl();
            }
            Stmt::Range { key, value, define, expr, body, .. } => {
                self.word("for ");
                if let Some(key) = key {
                    self.print_expr(key);
                    if let Some(value) = value {
                        self.word(", ");
                        self.print_expr(value);
                    }
                    self.word(if *define { " := " } else { " = " });
                }
                self.word("range ");
                self.print_expr(expr);
                self.word(" ");
                self.print_block(body);
                self.nl();
            }
            Stmt::Switch { init, tag, cases, .. } => {
                self.word("switch ");
                if let Some(init) = init {
                    self.print_inline_stmt(init);
                    self.word("; ");
                }
                if let Some(tag) = tag {
                    self.print_expr(tag);
                    self.word(" ");
                }
                self.word("{");
                self.nl();
                for case in cases {
                    self.print_case(case);
                }
                self.word("}");
                self.nl();
            }
            Stmt::Block(block) => {
                self.print_block(block);
                self.nl();
            }
            Stmt::Defer { call, .. } => {
                self.word("defer ");
                self.print_expr(call);
                self.nl();
            }
            Stmt::Go { call, .. } => {
                self.word("go ");
                self.print_expr(call);
                self.nl();
            }
            Stmt::Break { label, .. } => {
                self.word("break");
                if let Some(label) = label {
                    self.word(" ");
                    self.ident(label);
                }
                self.nl();
            }
            Stmt::Continue { label, .. } => {
                self.word("continue");
                if let Some(label) = label {
                    self.word(" ");
                    self.ident(label);
                }
                self.nl();
            }
            Stmt::Fallthrough { .. } => {
                self.word("fallthrough");
                self.nl();
            }
            Stmt::Send { chan, value, .. } => {
                self.print_expr(chan);
                self.word(" <- ");
                self.print_expr(value);
                self.nl();
            }
            Stmt::Empty { .. } => {}
        }
    }

    /// Prints a statement without its trailing newline (headers).
    fn print_inline_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Assign { lhs, op, rhs, .. } => {
                for (i, expr) in lhs.iter().enumerate() {
                    if i > 0 {
                        self.word(", ");
                    }
                    self.print_expr(expr);
                }
                self.word(assign_op_str(*op));
                for (i, expr) in rhs.iter().enumerate() {
                    if i > 0 {
                        self.word(", ");
                    }
                    self.print_expr(expr);
                }
            }
            Stmt::Expr(expr) => self.print_expr(expr),
            Stmt::IncDec { expr, inc, .. } => {
                self.print_expr(expr);
                self.word(if *inc { "++" } else { "--" });
            }
            other => {
                // Headers only ever hold simple statements.
                log::warn!("unexpected statement form in header: {:?}", other.span());
            }
        }
    }

    fn print_case(&mut self, case: &CaseClause) {
        self.comments(&case.leading);
        self.with_origin(case.span, |p| {
            if case.exprs.is_empty() {
                p.word("default:");
            } else {
                p.word("case ");
                for (i, expr) in case.exprs.iter().enumerate() {
                    if i > 0 {
                        p.word(", ");
                    }
                    p.print_expr(expr);
                }
                p.word(":");
            }
        });
        self.nl();
        self.indent += 1;
        for node in &case.body {
            self.print_stmt_node(node);
        }
        self.indent -= 1;
    }

    // ─── Expressions ────────────────────────────────────────────────────

    pub fn print_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Ident(id) => self.ident(id),
            Expr::Lit { value, .. } => {
                let value = value.clone();
                self.word(&value);
            }
            Expr::Composite { ty, elems, .. } => {
                if let Some(ty) = ty {
                    self.print_type(ty);
                }
                self.word("{");
                for (i, elem) in elems.iter().enumerate() {
                    if i > 0 {
                        self.word(", ");
                    }
                    if let Some(key) = &elem.key {
                        self.print_expr(key);
                        self.word(": ");
                    }
                    self.print_expr(&elem.value);
                }
                self.word("}");
            }
            Expr::FuncLit { params, results, body, .. } => {
                self.word("func");
                self.print_signature(params, results);
                self.word(" ");
                self.print_block(body);
            }
            Expr::Selector { expr, sel, .. } => {
                self.print_expr(expr);
                self.word(".");
                self.ident(sel);
            }
            Expr::Index { expr, indices, .. } => {
                self.print_expr(expr);
                self.word("[");
                for (i, index) in indices.iter().enumerate() {
                    if i > 0 {
                        self.word(", ");
                    }
                    self.print_expr(index);
                }
                self.word("]");
            }
            Expr::SliceExpr { expr, low, high, max, .. } => {
                self.print_expr(expr);
                self.word("[");
                if let Some(low) = low {
                    self.print_expr(low);
                }
                self.word(":");
                if let Some(high) = high {
                    self.print_expr(high);
                }
                if let Some(max) = max {
                    self.word(":");
                    self.print_expr(max);
                }
                self.word("]");
            }
            Expr::Call { func, args, ellipsis, .. } => {
                self.print_expr(func);
                self.word("(");
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        self.word(", ");
                    }
                    self.print_expr(arg);
                }
                if *ellipsis {
                    self.word("...");
                }
                self.word(")");
            }
            Expr::Unary { op, expr, .. } => {
                self.word(match op {
                    UnaryOp::Plus => "+",
                    UnaryOp::Minus => "-",
                    UnaryOp::Not => "!",
                    UnaryOp::Xor => "^",
                    UnaryOp::Addr => "&",
                    UnaryOp::Recv => "<-",
                });
                self.print_expr(expr);
            }
            Expr::Binary { op, lhs, rhs, .. } => {
                self.print_expr(lhs);
                self.word(" ");
                self.word(binary_op_str(*op));
                self.word(" ");
                self.print_expr(rhs);
            }
            Expr::Star { expr, .. } => {
                self.word("*");
                self.print_expr(expr);
            }
            Expr::Paren { expr, .. } => {
                self.word("(");
                self.print_expr(expr);
                self.word(")");
            }
            Expr::TypeAssert { expr, ty, .. } => {
                self.print_expr(expr);
                self.word(".(");
                match ty {
                    Some(ty) => self.print_type(ty),
                    None => self.word("type"),
                }
                self.word(")");
            }
            Expr::Type(ty) => self.print_type(ty),
        }
    }
}

fn assign_op_str(op: AssignOp) -> &'static str {
    match op {
        AssignOp::Assign => " = ",
        AssignOp::Define => " := ",
        AssignOp::Add => " += ",
        AssignOp::Sub => " -= ",
        AssignOp::Mul => " *= ",
        AssignOp::Div => " /= ",
        AssignOp::Rem => " %= ",
        AssignOp::And => " &= ",
        AssignOp::Or => " |= ",
        AssignOp::Xor => " ^= ",
        AssignOp::Shl => " <<= ",
        AssignOp::Shr => " >>= ",
        AssignOp::AndNot => " &^= ",
    }
}

fn binary_op_str(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "+",
        BinaryOp::Sub => "-",
        BinaryOp::Mul => "*",
        BinaryOp::Div => "/",
        BinaryOp::Rem => "%",
        BinaryOp::And => "&",
        BinaryOp::Or => "|",
        BinaryOp::Xor => "^",
        BinaryOp::AndNot => "&^",
        BinaryOp::Shl => "<<",
        BinaryOp::Shr => ">>",
        BinaryOp::LogicalAnd => "&&",
        BinaryOp::LogicalOr => "||",
        BinaryOp::Eq => "==",
        BinaryOp::NotEq => "!=",
        BinaryOp::Lt => "<",
        BinaryOp::LtEq => "<=",
        BinaryOp::Gt => ">",
        BinaryOp::GtEq => ">=",
    }
}

/// Renders a type expression to its canonical single-line form.
///
/// This is the textual type representation the inference service and the
/// Result/Option mangler key on.
pub fn type_to_string(ty: &TypeExpr, interner: &Interner) -> String {
    match ty {
        TypeExpr::Name(id) => interner.resolve(id.sym).to_string(),
        TypeExpr::Qualified { pkg, name, .. } => {
            format!("{}.{}", interner.resolve(pkg.sym), interner.resolve(name.sym))
        }
        TypeExpr::Pointer { elem, .. } => format!("*{}", type_to_string(elem, interner)),
        TypeExpr::Slice { elem, .. } => format!("[]{}", type_to_string(elem, interner)),
        TypeExpr::Array { elem, .. } => format!("[n]{}", type_to_string(elem, interner)),
        TypeExpr::Map { key, value, .. } => format!(
            "map[{}]{}",
            type_to_string(key, interner),
            type_to_string(value, interner)
        ),
        TypeExpr::Chan { elem, .. } => format!("chan {}", type_to_string(elem, interner)),
        TypeExpr::Func { .. } => "func".to_string(),
        TypeExpr::Struct { .. } => "struct".to_string(),
        TypeExpr::Interface { methods, .. } if methods.is_empty() => "any".to_string(),
        TypeExpr::Interface { .. } => "interface".to_string(),
        TypeExpr::Generic { name, args, .. } => {
            let args: Vec<_> = args.iter().map(|a| type_to_string(a, interner)).collect();
            format!("{}[{}]", interner.resolve(name.sym), args.join(", "))
        }
        TypeExpr::Paren { elem, .. } => type_to_string(elem, interner),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_file;

    fn round_trip(src: &str) -> String {
        let mut interner = Interner::new();
        let file = parse_file(src, &mut interner).unwrap();
        Printer::new(&interner).print(&file).text
    }

    #[test]
    fn prints_canonical_function() {
        let out = round_trip("package p\nfunc add(a,b int)int{return a+b}\n");
        assert_eq!(
            out,
            "package p\n\nfunc add(a int, b int) int {\n\treturn a + b\n}\n"
        );
    }

    #[test]
    fn printing_is_idempotent() {
        let src = "package main\n\nimport (\n\t\"fmt\"\n\t\"os\"\n)\n\nfunc main() {\n\tdata, err := os.ReadFile(\"config\")\n\tif err != nil {\n\t\tfmt.Println(err)\n\t\treturn\n\t}\n\t_ = data\n}\n";
        let once = round_trip(src);
        let twice = round_trip(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn records_line_origins_for_statements() {
        let src = "package p\n\nfunc f() int {\n\tx := 1\n\treturn x\n}\n";
        let mut interner = Interner::new();
        let file = parse_file(src, &mut interner).unwrap();
        let printed = Printer::new(&interner).print(&file);
        let lines: Vec<&str> = printed.text.lines().collect();
        let x_line = lines.iter().position(|l| l.contains("x := 1")).unwrap();
        let origin = printed.line_origins[x_line].expect("statement line must have an origin");
        assert_eq!(&src[origin.start..origin.end], "x := 1");
    }

    #[test]
    fn blank_lines_have_no_origin() {
        let src = "package p\n\nfunc f() {\n}\n";
        let mut interner = Interner::new();
        let file = parse_file(src, &mut interner).unwrap();
        let printed = Printer::new(&interner).print(&file);
        // Line 2 is the blank separator before the func decl.
        assert_eq!(printed.line_origins[1], None);
    }

    #[test]
    fn prints_switch_with_sentinel_comments() {
        let src = "package p\n\nfunc f(x int) {\n\t// DINGO_MATCH_START scrutinee=x\n\tswitch x {\n\tcase 1:\n\t\treturn\n\tdefault:\n\t\treturn\n\t}\n\t// DINGO_MATCH_END\n}\n";
        let out = round_trip(src);
        assert!(out.contains("// DINGO_MATCH_START scrutinee=x"));
        assert!(out.contains("// DINGO_MATCH_END"));
        assert!(out.contains("\tcase 1:"));
    }

    #[test]
    fn prints_struct_and_const_group() {
        let src = "package p\n\ntype ValueTag = uint8\n\nconst (\n\tValueTagInt ValueTag = iota\n\tValueTagStr\n)\n\ntype Value struct {\n\ttag ValueTag\n\tint0 *int\n}\n";
        let out = round_trip(src);
        assert!(out.contains("type ValueTag = uint8"));
        assert!(out.contains("\tValueTagInt ValueTag = iota\n\tValueTagStr\n"));
        assert!(out.contains("\tint0 *int\n"));
    }

    #[test]
    fn type_to_string_canonical_forms() {
        let mut interner = Interner::new();
        let file = parse_file(
            "package p\n\nvar a []byte\nvar b map[string]int\nvar c *User\nvar d interface{}\n",
            &mut interner,
        )
        .unwrap();
        let types: Vec<String> = file
            .decls
            .iter()
            .map(|d| {
                let Decl::Var(gen) = d else { panic!("expected var") };
                type_to_string(gen.specs[0].ty.as_ref().unwrap(), &interner)
            })
            .collect();
        assert_eq!(types, vec!["[]byte", "map[string]int", "*User", "any"]);
    }

    #[test]
    fn else_chains_stay_on_one_line() {
        let src = "package p\n\nfunc f(x int) int {\n\tif x > 0 {\n\t\treturn 1\n\t} else if x < 0 {\n\t\treturn -1\n\t} else {\n\t\treturn 0\n\t}\n}\n";
        let out = round_trip(src);
        assert!(out.contains("\t} else if x < 0 {"));
        assert!(out.contains("\t} else {"));
    }
}
