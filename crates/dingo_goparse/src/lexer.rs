//! Hand-rolled Go scanner with automatic semicolon insertion.
//!
//! The lexer walks the byte buffer directly. Two behaviours matter for the
//! rest of the pipeline:
//!
//! - **Semicolon insertion.** Go's grammar is semicolon-terminated; the
//!   scanner inserts a [`TokenKind::Semicolon`] at each newline that follows
//!   a statement-ending token, exactly as `go/scanner` does. The parser can
//!   therefore treat line structure uniformly.
//! - **Comment trivia.** Comments are not tokens. They are collected into a
//!   side table keyed by the index of the token they precede, so the parser
//!   can attach them as leading trivia. The preprocessor's sentinel comments
//!   ride through the AST this way.

use crate::parser::ParseError;
use crate::token::{LitKind, Token, TokenKind};
use dingo_base::{Interner, Span};

/// A source comment, including its `//` or `/* */` delimiters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawComment {
    pub text: String,
    pub span: Span,
}

/// Lexer output: the token stream plus leading-comment trivia.
///
/// `leading[i]` holds the comments that appeared between token `i-1` and
/// token `i`.
pub struct LexOutput {
    pub tokens: Vec<Token>,
    pub leading: Vec<Vec<RawComment>>,
}

/// Byte-oriented Go scanner.
pub struct Lexer<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    /// Kind of the last emitted non-trivia token, for semicolon insertion.
    last: Option<TokenKind>,
    pending_comments: Vec<RawComment>,
    tokens: Vec<Token>,
    leading: Vec<Vec<RawComment>>,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
            last: None,
            pending_comments: Vec::new(),
            tokens: Vec::new(),
            leading: Vec::new(),
        }
    }

    /// Scans the whole buffer into a token stream.
    pub fn tokenize(mut self, interner: &mut Interner) -> Result<LexOutput, ParseError> {
        loop {
            self.skip_blank()?;
            if self.pos >= self.bytes.len() {
                break;
            }
            let start = self.pos;
            let kind = self.scan_token(interner)?;
            self.emit(kind, Span::new(start, self.pos));
        }
        // Close the final line even without a trailing newline.
        if self.last.as_ref().is_some_and(|k| k.ends_statement()) {
            self.emit(TokenKind::Semicolon, Span::point(self.pos));
        }
        self.emit(TokenKind::Eof, Span::point(self.pos));
        Ok(LexOutput { tokens: self.tokens, leading: self.leading })
    }

    fn emit(&mut self, kind: TokenKind, span: Span) {
        self.last = Some(kind.clone());
        self.leading.push(std::mem::take(&mut self.pending_comments));
        self.tokens.push(Token::new(kind, span));
    }

    /// Skips whitespace and comments, inserting semicolons at newlines.
    fn skip_blank(&mut self) -> Result<(), ParseError> {
        loop {
            match self.bytes.get(self.pos) {
                Some(b' ') | Some(b'\t') | Some(b'\r') => self.pos += 1,
                Some(b'\n') => {
                    if self.last.as_ref().is_some_and(|k| k.ends_statement()) {
                        let span = Span::point(self.pos);
                        self.pos += 1;
                        self.emit(TokenKind::Semicolon, span);
                    } else {
                        self.pos += 1;
                    }
                }
                Some(b'/') if self.bytes.get(self.pos + 1) == Some(&b'/') => {
                    let start = self.pos;
                    while self.pos < self.bytes.len() && self.bytes[self.pos] != b'\n' {
                        self.pos += 1;
                    }
                    self.pending_comments.push(RawComment {
                        text: self.src[start..self.pos].to_string(),
                        span: Span::new(start, self.pos),
                    });
                }
                Some(b'/') if self.bytes.get(self.pos + 1) == Some(&b'*') => {
                    let start = self.pos;
                    self.pos += 2;
                    let mut crossed = false;
                    loop {
                        match self.bytes.get(self.pos) {
                            None => {
                                return Err(ParseError::new(
                                    "unterminated block comment",
                                    Span::new(start, self.pos),
                                ))
                            }
                            Some(b'\n') => {
                                crossed = true;
                                self.pos += 1;
                            }
                            Some(b'*') if self.bytes.get(self.pos + 1) == Some(&b'/') => {
                                self.pos += 2;
                                break;
                            }
                            Some(_) => self.pos += 1,
                        }
                    }
                    self.pending_comments.push(RawComment {
                        text: self.src[start..self.pos].to_string(),
                        span: Span::new(start, self.pos),
                    });
                    // A comment containing newlines acts as a newline.
                    if crossed && self.last.as_ref().is_some_and(|k| k.ends_statement()) {
                        self.emit(TokenKind::Semicolon, Span::point(self.pos));
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn scan_token(&mut self, interner: &mut Interner) -> Result<TokenKind, ParseError> {
        let b = self.bytes[self.pos];
        if b.is_ascii_alphabetic() || b == b'_' || b >= 0x80 {
            return Ok(self.scan_ident(interner));
        }
        if b.is_ascii_digit() {
            return self.scan_number();
        }
        match b {
            b'"' => self.scan_string(),
            b'`' => self.scan_raw_string(),
            b'\'' => self.scan_char(),
            b'.' if self.peek(1).is_some_and(|c| c.is_ascii_digit()) => self.scan_number(),
            _ => self.scan_operator(),
        }
    }

    fn peek(&self, ahead: usize) -> Option<u8> {
        self.bytes.get(self.pos + ahead).copied()
    }

    fn scan_ident(&mut self, interner: &mut Interner) -> TokenKind {
        let start = self.pos;
        while self.pos < self.bytes.len() {
            let b = self.bytes[self.pos];
            if b.is_ascii_alphanumeric() || b == b'_' || b >= 0x80 {
                self.pos += 1;
            } else {
                break;
            }
        }
        let word = &self.src[start..self.pos];
        TokenKind::keyword(word).unwrap_or_else(|| TokenKind::Ident(interner.intern(word)))
    }

    fn scan_number(&mut self) -> Result<TokenKind, ParseError> {
        let start = self.pos;
        let mut kind = LitKind::Int;

        if self.bytes[self.pos] == b'0'
            && self.peek(1).is_some_and(|c| matches!(c, b'x' | b'X' | b'o' | b'O' | b'b' | b'B'))
        {
            self.pos += 2;
            while self.pos < self.bytes.len()
                && (self.bytes[self.pos].is_ascii_alphanumeric() || self.bytes[self.pos] == b'_')
            {
                self.pos += 1;
            }
        } else {
            while self.pos < self.bytes.len()
                && (self.bytes[self.pos].is_ascii_digit() || self.bytes[self.pos] == b'_')
            {
                self.pos += 1;
            }
            if self.peek(0) == Some(b'.') && self.peek(1) != Some(b'.') {
                kind = LitKind::Float;
                self.pos += 1;
                while self.pos < self.bytes.len()
                    && (self.bytes[self.pos].is_ascii_digit() || self.bytes[self.pos] == b'_')
                {
                    self.pos += 1;
                }
            }
            if self.peek(0).is_some_and(|c| matches!(c, b'e' | b'E')) {
                kind = LitKind::Float;
                self.pos += 1;
                if self.peek(0).is_some_and(|c| matches!(c, b'+' | b'-')) {
                    self.pos += 1;
                }
                while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_digit() {
                    self.pos += 1;
                }
            }
        }
        if self.peek(0) == Some(b'i') {
            kind = LitKind::Imag;
            self.pos += 1;
        }
        Ok(TokenKind::Literal {
            kind,
            value: self.src[start..self.pos].to_string(),
        })
    }

    fn scan_string(&mut self) -> Result<TokenKind, ParseError> {
        let start = self.pos;
        self.pos += 1;
        loop {
            match self.bytes.get(self.pos) {
                None | Some(b'\n') => {
                    return Err(ParseError::new(
                        "unterminated string literal",
                        Span::new(start, self.pos),
                    ))
                }
                Some(b'\\') => self.pos += 2,
                Some(b'"') => {
                    self.pos += 1;
                    break;
                }
                Some(_) => self.pos += 1,
            }
        }
        Ok(TokenKind::Literal {
            kind: LitKind::String,
            value: self.src[start..self.pos].to_string(),
        })
    }

    fn scan_raw_string(&mut self) -> Result<TokenKind, ParseError> {
        let start = self.pos;
        self.pos += 1;
        loop {
            match self.bytes.get(self.pos) {
                None => {
                    return Err(ParseError::new(
                        "unterminated raw string literal",
                        Span::new(start, self.pos),
                    ))
                }
                Some(b'`') => {
                    self.pos += 1;
                    break;
                }
                Some(_) => self.pos += 1,
            }
        }
        Ok(TokenKind::Literal {
            kind: LitKind::String,
            value: self.src[start..self.pos].to_string(),
        })
    }

    fn scan_char(&mut self) -> Result<TokenKind, ParseError> {
        let start = self.pos;
        self.pos += 1;
        loop {
            match self.bytes.get(self.pos) {
                None | Some(b'\n') => {
                    return Err(ParseError::new(
                        "unterminated character literal",
                        Span::new(start, self.pos),
                    ))
                }
                Some(b'\\') => self.pos += 2,
                Some(b'\'') => {
                    self.pos += 1;
                    break;
                }
                Some(_) => self.pos += 1,
            }
        }
        Ok(TokenKind::Literal {
            kind: LitKind::Char,
            value: self.src[start..self.pos].to_string(),
        })
    }

    fn scan_operator(&mut self) -> Result<TokenKind, ParseError> {
        let b = self.bytes[self.pos];
        let b1 = self.peek(1);
        let b2 = self.peek(2);

        macro_rules! tok {
            ($kind:expr, $len:expr) => {{
                self.pos += $len;
                return Ok($kind);
            }};
        }

        match (b, b1, b2) {
            (b'<', Some(b'<'), Some(b'=')) => tok!(TokenKind::ShlAssign, 3),
            (b'>', Some(b'>'), Some(b'=')) => tok!(TokenKind::ShrAssign, 3),
            (b'&', Some(b'^'), Some(b'=')) => tok!(TokenKind::AmpCaretAssign, 3),
            (b'.', Some(b'.'), Some(b'.')) => tok!(TokenKind::Ellipsis, 3),
            (b'<', Some(b'<'), _) => tok!(TokenKind::Shl, 2),
            (b'>', Some(b'>'), _) => tok!(TokenKind::Shr, 2),
            (b'&', Some(b'^'), _) => tok!(TokenKind::AmpCaret, 2),
            (b'&', Some(b'&'), _) => tok!(TokenKind::AndAnd, 2),
            (b'|', Some(b'|'), _) => tok!(TokenKind::OrOr, 2),
            (b'<', Some(b'-'), _) => tok!(TokenKind::Arrow, 2),
            (b'+', Some(b'+'), _) => tok!(TokenKind::Inc, 2),
            (b'-', Some(b'-'), _) => tok!(TokenKind::Dec, 2),
            (b'=', Some(b'='), _) => tok!(TokenKind::EqEq, 2),
            (b'!', Some(b'='), _) => tok!(TokenKind::NotEq, 2),
            (b'<', Some(b'='), _) => tok!(TokenKind::LtEq, 2),
            (b'>', Some(b'='), _) => tok!(TokenKind::GtEq, 2),
            (b':', Some(b'='), _) => tok!(TokenKind::Define, 2),
            (b'+', Some(b'='), _) => tok!(TokenKind::PlusAssign, 2),
            (b'-', Some(b'='), _) => tok!(TokenKind::MinusAssign, 2),
            (b'*', Some(b'='), _) => tok!(TokenKind::StarAssign, 2),
            (b'/', Some(b'='), _) => tok!(TokenKind::SlashAssign, 2),
            (b'%', Some(b'='), _) => tok!(TokenKind::PercentAssign, 2),
            (b'&', Some(b'='), _) => tok!(TokenKind::AmpAssign, 2),
            (b'|', Some(b'='), _) => tok!(TokenKind::PipeAssign, 2),
            (b'^', Some(b'='), _) => tok!(TokenKind::CaretAssign, 2),
            (b'+', _, _) => tok!(TokenKind::Plus, 1),
            (b'-', _, _) => tok!(TokenKind::Minus, 1),
            (b'*', _, _) => tok!(TokenKind::Star, 1),
            (b'/', _, _) => tok!(TokenKind::Slash, 1),
            (b'%', _, _) => tok!(TokenKind::Percent, 1),
            (b'&', _, _) => tok!(TokenKind::Amp, 1),
            (b'|', _, _) => tok!(TokenKind::Pipe, 1),
            (b'^', _, _) => tok!(TokenKind::Caret, 1),
            (b'<', _, _) => tok!(TokenKind::Lt, 1),
            (b'>', _, _) => tok!(TokenKind::Gt, 1),
            (b'=', _, _) => tok!(TokenKind::Assign, 1),
            (b'!', _, _) => tok!(TokenKind::Not, 1),
            (b'(', _, _) => tok!(TokenKind::LParen, 1),
            (b'[', _, _) => tok!(TokenKind::LBracket, 1),
            (b'{', _, _) => tok!(TokenKind::LBrace, 1),
            (b')', _, _) => tok!(TokenKind::RParen, 1),
            (b']', _, _) => tok!(TokenKind::RBracket, 1),
            (b'}', _, _) => tok!(TokenKind::RBrace, 1),
            (b',', _, _) => tok!(TokenKind::Comma, 1),
            (b';', _, _) => tok!(TokenKind::Semicolon, 1),
            (b':', _, _) => tok!(TokenKind::Colon, 1),
            (b'.', _, _) => tok!(TokenKind::Dot, 1),
            _ => Err(ParseError::new(
                format!("unexpected character {:?}", b as char),
                Span::new(self.pos, self.pos + 1),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        let mut interner = Interner::new();
        Lexer::new(src)
            .tokenize(&mut interner)
            .unwrap()
            .tokens
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn scans_identifiers_and_keywords() {
        let mut interner = Interner::new();
        let out = Lexer::new("func main").tokenize(&mut interner).unwrap();
        assert_eq!(out.tokens[0].kind, TokenKind::Func);
        match &out.tokens[1].kind {
            TokenKind::Ident(sym) => assert_eq!(interner.resolve(*sym), "main"),
            other => panic!("expected identifier, got {:?}", other),
        }
    }

    #[test]
    fn inserts_semicolon_after_statement_enders() {
        let toks = kinds("x := 1\ny := 2\n");
        let semis = toks.iter().filter(|k| **k == TokenKind::Semicolon).count();
        assert_eq!(semis, 2);
    }

    #[test]
    fn no_semicolon_after_open_brace() {
        let toks = kinds("func main() {\n}\n");
        // The newline after `{` must not produce a semicolon.
        let brace_idx = toks.iter().position(|k| *k == TokenKind::LBrace).unwrap();
        assert_ne!(toks[brace_idx + 1], TokenKind::Semicolon);
    }

    #[test]
    fn inserts_semicolon_at_eof_without_newline() {
        let toks = kinds("x := 1");
        assert_eq!(toks[toks.len() - 2], TokenKind::Semicolon);
        assert_eq!(toks[toks.len() - 1], TokenKind::Eof);
    }

    #[test]
    fn collects_comments_as_leading_trivia() {
        let mut interner = Interner::new();
        let out = Lexer::new("// DINGO_MATCH_START scrutinee=r\nswitch {\n}")
            .tokenize(&mut interner)
            .unwrap();
        assert_eq!(out.tokens[0].kind, TokenKind::Switch);
        assert_eq!(out.leading[0].len(), 1);
        assert!(out.leading[0][0].text.contains("DINGO_MATCH_START"));
    }

    #[test]
    fn scans_number_forms() {
        let toks = kinds("42 3.14 0xFF 1e9 2i");
        let lits: Vec<_> = toks
            .iter()
            .filter_map(|k| match k {
                TokenKind::Literal { kind, value } => Some((*kind, value.clone())),
                _ => None,
            })
            .collect();
        assert_eq!(lits.len(), 5);
        assert_eq!(lits[0], (LitKind::Int, "42".into()));
        assert_eq!(lits[1].0, LitKind::Float);
        assert_eq!(lits[2].0, LitKind::Int);
        assert_eq!(lits[3].0, LitKind::Float);
        assert_eq!(lits[4].0, LitKind::Imag);
    }

    #[test]
    fn scans_string_forms() {
        let toks = kinds(r#""with \" escape" `raw` 'c'"#);
        let lit_count = toks
            .iter()
            .filter(|k| matches!(k, TokenKind::Literal { .. }))
            .count();
        assert_eq!(lit_count, 3);
    }

    #[test]
    fn unterminated_string_is_an_error() {
        let mut interner = Interner::new();
        assert!(Lexer::new("\"oops\n").tokenize(&mut interner).is_err());
    }

    #[test]
    fn compound_operators_lex_greedily() {
        let toks = kinds("a <<= 1");
        assert!(toks.contains(&TokenKind::ShlAssign));
        let toks = kinds("a &^ b");
        assert!(toks.contains(&TokenKind::AmpCaret));
    }
}
