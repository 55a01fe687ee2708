//! Shared scanning utilities for the text processors.
//!
//! Every processor that looks for Dingo constructs must ignore matches
//! inside string literals, character literals, and comments, and the
//! block-shaped constructs (`enum`, `match`) are located by *balanced-brace
//! scanning*, never by greedy pattern matching — a greedy scan merges
//! consecutive blocks.

/// Byte-class state while walking a line of Go-ish text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Code,
    Str,
    RawStr,
    Char,
    LineComment,
}

/// Walks `line` yielding `(byte_index, byte)` pairs for code bytes only,
/// skipping string/char literals and line comments.
///
/// The walk is line-local: raw strings spanning lines are not the
/// preprocessor's concern (its constructs never contain them).
pub fn code_bytes(line: &str) -> Vec<(usize, u8)> {
    let bytes = line.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut state = ScanState::Code;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        match state {
            ScanState::Code => match b {
                b'"' => state = ScanState::Str,
                b'`' => state = ScanState::RawStr,
                b'\'' => state = ScanState::Char,
                b'/' if bytes.get(i + 1) == Some(&b'/') => state = ScanState::LineComment,
                _ => out.push((i, b)),
            },
            ScanState::Str => match b {
                b'\\' => i += 1,
                b'"' => state = ScanState::Code,
                _ => {}
            },
            ScanState::RawStr => {
                if b == b'`' {
                    state = ScanState::Code;
                }
            }
            ScanState::Char => match b {
                b'\\' => i += 1,
                b'\'' => state = ScanState::Code,
                _ => {}
            },
            ScanState::LineComment => break,
        }
        i += 1;
    }
    out
}

/// Finds `pat` in `line` at a code position (outside strings and comments).
pub fn find_code(line: &str, pat: &str) -> Option<usize> {
    if pat.is_empty() {
        return None;
    }
    let code = code_bytes(line);
    let pat_bytes = pat.as_bytes();
    'outer: for window_start in 0..code.len() {
        let (start_idx, _) = code[window_start];
        // The match must be contiguous in the original text.
        if start_idx + pat_bytes.len() > line.len() {
            break;
        }
        for (k, expected) in pat_bytes.iter().enumerate() {
            match code.get(window_start + k) {
                Some(&(idx, b)) if idx == start_idx + k && b == *expected => {}
                _ => continue 'outer,
            }
        }
        return Some(start_idx);
    }
    None
}

/// True when the byte at `idx` starts/ends at a token boundary: the
/// neighbouring bytes are not identifier characters.
pub fn token_boundary(line: &str, start: usize, len: usize) -> bool {
    let bytes = line.as_bytes();
    let before_ok = start == 0 || !is_ident_byte(bytes[start - 1]);
    let after = start + len;
    let after_ok = after >= bytes.len() || !is_ident_byte(bytes[after]);
    before_ok && after_ok
}

pub fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Outcome of a balanced multi-line block scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockEnd {
    /// 1-based line of the closing delimiter.
    pub line: u32,
    /// Byte column of the closing delimiter within that line.
    pub col: usize,
}

/// Scans forward from `(start_line, start_col)` for the brace that closes
/// the one at the start position. `lines` is indexed by 1-based line via
/// the provided lookup. Returns `None` if the input ends unbalanced.
pub fn scan_balanced<'a, F>(
    line_at: F,
    line_count: u32,
    start_line: u32,
    start_col: usize,
    open: u8,
    close: u8,
) -> Option<BlockEnd>
where
    F: Fn(u32) -> &'a str,
{
    let mut depth = 0usize;
    let mut line = start_line;
    while line <= line_count {
        let text = line_at(line);
        let from = if line == start_line { start_col } else { 0 };
        for (idx, b) in code_bytes(text) {
            if idx < from {
                continue;
            }
            if b == open {
                depth += 1;
            } else if b == close {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(BlockEnd { line, col: idx });
                }
            }
        }
        line += 1;
    }
    None
}

/// Splits `s` at top-level `sep` bytes: separators inside `()`, `[]`,
/// `{}`, `<>`, or string literals do not split.
pub fn split_top_level(s: &str, sep: u8) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    let code: Vec<(usize, u8)> = code_bytes(s);
    for &(idx, b) in &code {
        match b {
            b'(' | b'[' | b'{' | b'<' => depth += 1,
            b')' | b']' | b'}' | b'>' => depth -= 1,
            _ if b == sep && depth == 0 => {
                parts.push(&s[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}

/// Strips a trailing line comment from `line`, returning the code prefix.
pub fn strip_line_comment(line: &str) -> &str {
    let bytes = line.as_bytes();
    let mut state = ScanState::Code;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        match state {
            ScanState::Code => match b {
                b'"' => state = ScanState::Str,
                b'`' => state = ScanState::RawStr,
                b'\'' => state = ScanState::Char,
                b'/' if bytes.get(i + 1) == Some(&b'/') => return &line[..i],
                _ => {}
            },
            ScanState::Str => match b {
                b'\\' => i += 1,
                b'"' => state = ScanState::Code,
                _ => {}
            },
            ScanState::RawStr => {
                if b == b'`' {
                    state = ScanState::Code;
                }
            }
            ScanState::Char => match b {
                b'\\' => i += 1,
                b'\'' => state = ScanState::Code,
                _ => {}
            },
            ScanState::LineComment => unreachable!(),
        }
        i += 1;
    }
    line
}

/// Leading whitespace of a line, for indentation-preserving rewrites.
pub fn indent_of(line: &str) -> &str {
    let end = line
        .as_bytes()
        .iter()
        .position(|b| *b != b' ' && *b != b'\t')
        .unwrap_or(line.len());
    &line[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_code_skips_strings_and_comments() {
        assert_eq!(find_code("let x = 1", "let"), Some(0));
        assert_eq!(find_code("s := \"let\"", "let"), None);
        assert_eq!(find_code("x := 1 // let", "let"), None);
        assert_eq!(find_code("y := f()? ", "?"), Some(8));
        assert_eq!(find_code("s := \"?\"", "?"), None);
    }

    #[test]
    fn token_boundary_rejects_identifier_neighbours() {
        let line = "outlet := 1";
        let idx = line.find("let").unwrap();
        assert!(!token_boundary(line, idx, 3));
        assert!(token_boundary("let x = 1", 0, 3));
    }

    #[test]
    fn scan_balanced_finds_matching_brace() {
        let lines = ["enum Value {", "    Int(int),", "    Str(string),", "}"];
        let end = scan_balanced(
            |n| lines[(n - 1) as usize],
            lines.len() as u32,
            1,
            11,
            b'{',
            b'}',
        )
        .unwrap();
        assert_eq!(end, BlockEnd { line: 4, col: 0 });
    }

    #[test]
    fn scan_balanced_does_not_merge_consecutive_blocks() {
        let lines = ["match a {", "    _ => 1,", "}", "match b {", "    _ => 2,", "}"];
        let end = scan_balanced(
            |n| lines[(n - 1) as usize],
            lines.len() as u32,
            1,
            8,
            b'{',
            b'}',
        )
        .unwrap();
        assert_eq!(end.line, 3);
    }

    #[test]
    fn scan_balanced_reports_unbalanced_input() {
        let lines = ["enum Broken {", "    Red,"];
        let end = scan_balanced(
            |n| lines[(n - 1) as usize],
            lines.len() as u32,
            1,
            12,
            b'{',
            b'}',
        );
        assert!(end.is_none());
    }

    #[test]
    fn split_top_level_respects_nesting() {
        assert_eq!(split_top_level("int, string", b','), vec!["int", " string"]);
        assert_eq!(
            split_top_level("map[string]int, Pair<int, bool>", b','),
            vec!["map[string]int", " Pair<int, bool>"]
        );
        assert_eq!(
            split_top_level("f(a, b), c", b','),
            vec!["f(a, b)", " c"]
        );
    }

    #[test]
    fn strip_line_comment_keeps_strings() {
        assert_eq!(strip_line_comment("x := 1 // note"), "x := 1 ");
        assert_eq!(strip_line_comment("s := \"a // b\""), "s := \"a // b\"");
    }

    #[test]
    fn indent_of_reads_leading_whitespace() {
        assert_eq!(indent_of("\t\tx := 1"), "\t\t");
        assert_eq!(indent_of("    y"), "    ");
        assert_eq!(indent_of("z"), "");
    }
}
