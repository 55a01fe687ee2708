//! # dingo-goparse
//!
//! Go lexer, AST, parser, and printer for the dingo pipeline.
//!
//! The preprocessor's contract is that its output is syntactically valid Go,
//! so this crate is an *adapter*, not a language front-end of its own: it
//! parses the generated-Go subset into an owned AST the plugin pipeline can
//! mutate, and prints it back out deterministically.
//!
//! # Pipeline Position
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │ Dingo Source → Preprocessor → HERE (parse) → Plugins → ... │
//! └────────────────────────────────────────────────────────────┘
//!                                        ↓
//!                            HERE (print) → Go Source
//! ```
//!
//! # What survives parsing
//!
//! Comment trivia is attached to the statement or declaration it precedes.
//! This is load-bearing: the preprocessor communicates with the plugin
//! pipeline through marker comments (`// DINGO_MATCH_START …`,
//! `// dingo:s:N`), and those must still be visible on AST nodes.
//!
//! # Printing
//!
//! [`Printer`] emits canonical gofmt-style text (tab indentation, fixed
//! spacing) and records, for every output line, the span of the node that
//! produced it. The source-map assembler composes those spans with the
//! preprocessor's position map to recover Dingo coordinates.

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod printer;
pub mod resolve;
pub mod token;

pub use ast::{
    Block, CaseClause, Comment, CompositeElem, Decl, Expr, Field, File, FuncDecl, GenDecl,
    Ident, ImportDecl, Param, Stmt, StmtNode, TypeDecl, TypeExpr, ValueSpec,
};
pub use lexer::Lexer;
pub use parser::{parse_file, ParseError, Parser};
pub use printer::{PrintedFile, Printer};
pub use resolve::{FuncSig, Resolver, TypeInfo};
pub use token::{Token, TokenKind};
