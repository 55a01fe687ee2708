//! User-visible diagnostic rendering.
//!
//! Each diagnostic renders as a one-line summary, the offending source
//! line with a caret underline, any secondary notes, and a trailing
//! `hint:` line when a suggested fix exists:
//!
//! ```text
//! error: non-exhaustive match, missing variant: Err
//!
//!    3 | match r {
//!      | ^^^^^
//!      | hint: add a wildcard arm
//! ```

use crate::style::Style;
use dingo_base::{Diagnostic, LineIndex, Severity};

/// Renders one diagnostic against the Dingo source it points into.
pub fn render_diagnostic(diag: &Diagnostic, source: &str) -> String {
    let index = LineIndex::new(source);
    let pos = index.position(diag.span.start);
    let line_text = line_at(source, &index, pos.line);
    let col = pos.column.saturating_sub(1) as usize;
    let len = diag.span.len().max(1).min(line_text.len().saturating_sub(col).max(1));

    let label = match diag.severity {
        Severity::Error => Style::bold_red("error"),
        Severity::Warning => Style::yellow("warning"),
    };
    let line_no = Style::blue(&format!("{:4}", pos.line));
    let pipe = Style::blue("|");
    let underline = Style::red(&format!("{}{}", " ".repeat(col), "^".repeat(len)));

    let mut out = format!(
        "{}: {}\n\n{} {} {}\n     {} {}",
        label, diag.kind, line_no, pipe, line_text, pipe, underline
    );
    for note in &diag.notes {
        out.push_str(&format!("\n     {} note: {}", pipe, note.message));
    }
    if let Some(hint) = &diag.hint {
        out.push_str(&format!("\n     {} {}: {}", pipe, Style::cyan("hint"), hint));
    }
    out
}

/// Renders a diagnostic list separated by blank lines.
pub fn render_all(diags: &[Diagnostic], source: &str) -> String {
    diags
        .iter()
        .map(|d| render_diagnostic(d, source))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn line_at<'a>(source: &'a str, index: &LineIndex, line: u32) -> &'a str {
    let start = index.line_start(line).unwrap_or(0);
    let end = source[start..]
        .find('\n')
        .map(|off| start + off)
        .unwrap_or(source.len());
    &source[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use dingo_base::{DiagnosticKind, Span};

    #[test]
    fn renders_summary_line_and_caret() {
        Style::set_enabled(false);
        let source = "match r {\n\tOk(x) => x,\n}\n";
        let diag = Diagnostic::error(
            DiagnosticKind::NonExhaustiveMatch { missing: vec!["Err".into()] },
            Span::new(0, 5),
        )
        .with_hint("add a wildcard arm");
        let rendered = render_diagnostic(&diag, source);
        assert!(rendered.contains("error: non-exhaustive match, missing variant: Err"));
        assert!(rendered.contains("   1 | match r {"));
        assert!(rendered.contains("^^^^^"));
        assert!(rendered.contains("hint: add a wildcard arm"));
    }

    #[test]
    fn renders_warning_label() {
        Style::set_enabled(false);
        let diag = Diagnostic::warning(
            DiagnosticKind::Custom("shadowed declaration".into()),
            Span::new(0, 1),
        );
        let rendered = render_diagnostic(&diag, "x := 1\n");
        assert!(rendered.starts_with("warning:"));
    }
}
