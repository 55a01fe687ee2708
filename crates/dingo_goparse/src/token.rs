//! Token types for the Go lexer and parser.
//!
//! The token set covers the Go language surface the preprocessor can emit.
//! Operator precedence follows the Go specification:
//!
//! | Precedence | Operators |
//! |------------|-----------|
//! | 5 | `*` `/` `%` `<<` `>>` `&` `&^` |
//! | 4 | `+` `-` `\|` `^` |
//! | 3 | `==` `!=` `<` `<=` `>` `>=` |
//! | 2 | `&&` |
//! | 1 | `\|\|` |

use dingo_base::{Span, Symbol};

/// A lexed token with its source span.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// Literal flavour carried by [`TokenKind::Literal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LitKind {
    Int,
    Float,
    Imag,
    Char,
    /// Interpreted (`"…"`) or raw (`` `…` ``) string; the raw text keeps its quotes.
    String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Identifier or non-keyword name.
    Ident(Symbol),
    /// Numeric, character, or string literal; the value is the raw source text.
    Literal { kind: LitKind, value: String },

    // Keywords
    Break,
    Case,
    Chan,
    Const,
    Continue,
    Default,
    Defer,
    Else,
    Fallthrough,
    For,
    Func,
    Go,
    Goto,
    If,
    Import,
    Interface,
    Map,
    Package,
    Range,
    Return,
    Select,
    Struct,
    Switch,
    Type,
    Var,

    // Operators and delimiters
    Plus,        // +
    Minus,       // -
    Star,        // *
    Slash,       // /
    Percent,     // %
    Amp,         // &
    Pipe,        // |
    Caret,       // ^
    Shl,         // <<
    Shr,         // >>
    AmpCaret,    // &^
    AndAnd,      // &&
    OrOr,        // ||
    Arrow,       // <-
    Inc,         // ++
    Dec,         // --
    EqEq,        // ==
    Lt,          // <
    Gt,          // >
    Assign,      // =
    Not,         // !
    NotEq,       // !=
    LtEq,        // <=
    GtEq,        // >=
    Define,      // :=
    Ellipsis,    // ...
    LParen,      // (
    LBracket,    // [
    LBrace,      // {
    RParen,      // )
    RBracket,    // ]
    RBrace,      // }
    Comma,       // ,
    Semicolon,   // ; (explicit or inserted)
    Colon,       // :
    Dot,         // .
    // Compound assignment
    PlusAssign,     // +=
    MinusAssign,    // -=
    StarAssign,     // *=
    SlashAssign,    // /=
    PercentAssign,  // %=
    AmpAssign,      // &=
    PipeAssign,     // |=
    CaretAssign,    // ^=
    ShlAssign,      // <<=
    ShrAssign,      // >>=
    AmpCaretAssign, // &^=

    /// End of input.
    Eof,
}

impl TokenKind {
    /// Binary operator precedence per the Go spec; 0 for non-operators.
    pub fn precedence(&self) -> u8 {
        match self {
            TokenKind::OrOr => 1,
            TokenKind::AndAnd => 2,
            TokenKind::EqEq
            | TokenKind::NotEq
            | TokenKind::Lt
            | TokenKind::LtEq
            | TokenKind::Gt
            | TokenKind::GtEq => 3,
            TokenKind::Plus | TokenKind::Minus | TokenKind::Pipe | TokenKind::Caret => 4,
            TokenKind::Star
            | TokenKind::Slash
            | TokenKind::Percent
            | TokenKind::Shl
            | TokenKind::Shr
            | TokenKind::Amp
            | TokenKind::AmpCaret => 5,
            _ => 0,
        }
    }

    /// True for tokens that trigger automatic semicolon insertion when they
    /// end a line.
    pub fn ends_statement(&self) -> bool {
        matches!(
            self,
            TokenKind::Ident(_)
                | TokenKind::Literal { .. }
                | TokenKind::Break
                | TokenKind::Continue
                | TokenKind::Fallthrough
                | TokenKind::Return
                | TokenKind::Inc
                | TokenKind::Dec
                | TokenKind::RParen
                | TokenKind::RBracket
                | TokenKind::RBrace
        )
    }

    /// Looks up a keyword, returning `None` for ordinary identifiers.
    pub fn keyword(word: &str) -> Option<TokenKind> {
        let kind = match word {
            "break" => TokenKind::Break,
            "case" => TokenKind::Case,
            "chan" => TokenKind::Chan,
            "const" => TokenKind::Const,
            "continue" => TokenKind::Continue,
            "default" => TokenKind::Default,
            "defer" => TokenKind::Defer,
            "else" => TokenKind::Else,
            "fallthrough" => TokenKind::Fallthrough,
            "for" => TokenKind::For,
            "func" => TokenKind::Func,
            "go" => TokenKind::Go,
            "goto" => TokenKind::Goto,
            "if" => TokenKind::If,
            "import" => TokenKind::Import,
            "interface" => TokenKind::Interface,
            "map" => TokenKind::Map,
            "package" => TokenKind::Package,
            "range" => TokenKind::Range,
            "return" => TokenKind::Return,
            "select" => TokenKind::Select,
            "struct" => TokenKind::Struct,
            "switch" => TokenKind::Switch,
            "type" => TokenKind::Type,
            "var" => TokenKind::Var,
            _ => return None,
        };
        Some(kind)
    }

    /// Human-readable token description for diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::Ident(_) => "identifier",
            TokenKind::Literal { .. } => "literal",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::Comma => "','",
            TokenKind::Semicolon => "';'",
            TokenKind::Colon => "':'",
            TokenKind::Assign => "'='",
            TokenKind::Define => "':='",
            TokenKind::Eof => "end of file",
            TokenKind::Package => "'package'",
            TokenKind::Func => "'func'",
            TokenKind::Case => "'case'",
            TokenKind::Default => "'default'",
            _ => "token",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_lookup_finds_keywords() {
        assert_eq!(TokenKind::keyword("func"), Some(TokenKind::Func));
        assert_eq!(TokenKind::keyword("switch"), Some(TokenKind::Switch));
        assert_eq!(TokenKind::keyword("result"), None);
    }

    #[test]
    fn precedence_matches_go_spec() {
        assert_eq!(TokenKind::OrOr.precedence(), 1);
        assert_eq!(TokenKind::AndAnd.precedence(), 2);
        assert_eq!(TokenKind::EqEq.precedence(), 3);
        assert_eq!(TokenKind::Plus.precedence(), 4);
        assert_eq!(TokenKind::Star.precedence(), 5);
        assert_eq!(TokenKind::LBrace.precedence(), 0);
    }

    #[test]
    fn statement_enders_trigger_semicolon_insertion() {
        assert!(TokenKind::RParen.ends_statement());
        assert!(TokenKind::Return.ends_statement());
        assert!(!TokenKind::Comma.ends_statement());
        assert!(!TokenKind::LBrace.ends_statement());
    }
}
