//! Immutable per-stage source buffers.
//!
//! Each processor receives a [`SourceBuffer`] and produces a new one; the
//! previous stage's buffer is never mutated. The buffer keeps a
//! newline-indexed line table so processors and the driver can convert
//! between byte offsets and line/column positions without rescanning.

use dingo_base::{LineIndex, Position, Span};

/// An immutable text buffer with a line table.
#[derive(Debug, Clone)]
pub struct SourceBuffer {
    text: String,
    index: LineIndex,
}

impl SourceBuffer {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let index = LineIndex::new(&text);
        Self { text, index }
    }

    /// Rebuilds a buffer from output lines (no trailing newline is added
    /// for an empty line list).
    pub fn from_lines(lines: Vec<String>) -> Self {
        let mut text = lines.join("\n");
        if !text.is_empty() {
            text.push('\n');
        }
        Self::new(text)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn index(&self) -> &LineIndex {
        &self.index
    }

    pub fn line_count(&self) -> usize {
        // A trailing newline does not open a new logical line.
        if self.text.ends_with('\n') {
            self.index.line_count() - 1
        } else {
            self.index.line_count()
        }
    }

    /// The content of 1-based `line`, without its newline.
    pub fn line(&self, line: u32) -> &str {
        let start = match self.index.line_start(line) {
            Some(start) => start,
            None => return "",
        };
        let end = self
            .index
            .line_start(line + 1)
            .map(|next| next.saturating_sub(1))
            .unwrap_or(self.text.len());
        &self.text[start..end]
    }

    /// Iterates logical lines with their 1-based numbers.
    pub fn lines(&self) -> impl Iterator<Item = (u32, &str)> {
        (1..=self.line_count() as u32).map(move |n| (n, self.line(n)))
    }

    /// Converts a byte offset in this buffer into a position.
    pub fn position(&self, offset: usize) -> Position {
        self.index.position(offset)
    }

    /// The span of 1-based `line` within this buffer.
    pub fn line_span(&self, line: u32) -> Span {
        let start = self.index.line_start(line).unwrap_or(self.text.len());
        let len = self.line(line).len();
        Span::new(start, start + len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_access_is_one_based() {
        let buffer = SourceBuffer::new("first\nsecond\nthird\n");
        assert_eq!(buffer.line(1), "first");
        assert_eq!(buffer.line(3), "third");
        assert_eq!(buffer.line_count(), 3);
    }

    #[test]
    fn trailing_newline_does_not_add_a_line() {
        assert_eq!(SourceBuffer::new("a\nb").line_count(), 2);
        assert_eq!(SourceBuffer::new("a\nb\n").line_count(), 2);
    }

    #[test]
    fn from_lines_round_trips() {
        let buffer = SourceBuffer::from_lines(vec!["x := 1".into(), "y := 2".into()]);
        assert_eq!(buffer.text(), "x := 1\ny := 2\n");
        assert_eq!(buffer.line(2), "y := 2");
    }

    #[test]
    fn line_span_covers_content() {
        let buffer = SourceBuffer::new("ab\ncdef\n");
        let span = buffer.line_span(2);
        assert_eq!(&buffer.text()[span.start..span.end], "cdef");
    }
}
