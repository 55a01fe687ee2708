//! Positioned diagnostics and the bounded accumulator.
//!
//! Every diagnostic carries a [`Span`] in *Dingo* source coordinates — the
//! reporting site is responsible for resolving generated-text positions back
//! through the position map before constructing one. The pipeline keeps
//! running after an error so that a single compilation surfaces as many
//! issues as possible; [`DiagnosticBag`] enforces the hard cap that keeps
//! pathological inputs from accumulating unbounded memory.

use crate::span::Span;
use std::fmt;

/// How bad a diagnostic is.
///
/// Errors suppress output emission; warnings never do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// The diagnostic taxonomy.
///
/// Variants follow the failure surfaces of the pipeline: preprocessor,
/// parser, type inference, match validation, and declaration synthesis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticKind {
    // Preprocessor
    UnbalancedBraces {
        construct: &'static str,
    },
    MalformedTypeAnnotation,
    PropagationOutsideFunction,
    MessageOnNonErrorCall,
    EmptyEnum {
        name: String,
    },
    SwiftMatchSyntax,
    InvalidEncoding {
        offset: usize,
    },

    // Parser (forwarded from the Go parser with resolved positions)
    ParseFailure {
        message: String,
    },

    // Type inference
    CannotInferType {
        constructor: String,
    },
    AmbiguousResultType,

    // Match validation
    NonExhaustiveMatch {
        missing: Vec<String>,
    },
    DuplicateArm {
        variant: String,
    },
    GuardOnWildcard,
    PatternTypeMismatch {
        expected: String,
        found: String,
    },

    // Declarations
    VariantFieldCollision {
        variant: String,
        field: String,
    },
    UnsupportedPattern {
        form: String,
    },

    /// Free-form diagnostic for conditions outside the fixed taxonomy.
    Custom(String),
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticKind::UnbalancedBraces { construct } => {
                write!(f, "unbalanced braces in {} block", construct)
            }
            DiagnosticKind::MalformedTypeAnnotation => {
                write!(f, "malformed type annotation")
            }
            DiagnosticKind::PropagationOutsideFunction => {
                write!(f, "error propagation used outside a function body")
            }
            DiagnosticKind::MessageOnNonErrorCall => {
                write!(f, "error message attached to a call that returns no error")
            }
            DiagnosticKind::EmptyEnum { name } => {
                write!(f, "enum {} has no variants", name)
            }
            DiagnosticKind::SwiftMatchSyntax => {
                write!(f, "swift-style match syntax is deprecated; use rust-style arms")
            }
            DiagnosticKind::InvalidEncoding { offset } => {
                write!(f, "invalid UTF-8 at byte offset {}", offset)
            }
            DiagnosticKind::ParseFailure { message } => write!(f, "{}", message),
            DiagnosticKind::CannotInferType { constructor } => {
                write!(f, "cannot infer type for bare {}", constructor)
            }
            DiagnosticKind::AmbiguousResultType => {
                write!(f, "ambiguous Result type at call site")
            }
            DiagnosticKind::NonExhaustiveMatch { missing } => {
                if missing.len() == 1 {
                    write!(f, "non-exhaustive match, missing variant: {}", missing[0])
                } else {
                    write!(f, "non-exhaustive match, missing variants: {}", missing.join(", "))
                }
            }
            DiagnosticKind::DuplicateArm { variant } => {
                write!(f, "duplicate arm for {}", variant)
            }
            DiagnosticKind::GuardOnWildcard => {
                write!(f, "guard on wildcard is meaningless")
            }
            DiagnosticKind::PatternTypeMismatch { expected, found } => {
                write!(f, "pattern type mismatch: expected {}, found {}", expected, found)
            }
            DiagnosticKind::VariantFieldCollision { variant, field } => {
                write!(f, "variant {} field {} collides with another variant", variant, field)
            }
            DiagnosticKind::UnsupportedPattern { form } => {
                write!(f, "unsupported pattern form: {}", form)
            }
            DiagnosticKind::Custom(message) => write!(f, "{}", message),
        }
    }
}

/// A secondary position attached to a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub message: String,
    pub span: Option<Span>,
}

/// An error or warning annotated with its Dingo source location.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub severity: Severity,
    /// Primary position in the Dingo source.
    pub span: Span,
    /// Optional secondary positions.
    pub notes: Vec<Note>,
    /// Suggested fix, rendered as a trailing `hint:` line.
    pub hint: Option<String>,
}

impl Diagnostic {
    /// An error diagnostic with no hint or notes.
    pub fn error(kind: DiagnosticKind, span: Span) -> Self {
        Self {
            kind,
            severity: Severity::Error,
            span,
            notes: Vec::new(),
            hint: None,
        }
    }

    /// A warning diagnostic with no hint or notes.
    pub fn warning(kind: DiagnosticKind, span: Span) -> Self {
        Self {
            kind,
            severity: Severity::Warning,
            span,
            notes: Vec::new(),
            hint: None,
        }
    }

    /// Attaches a suggested fix.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Attaches a secondary note.
    pub fn with_note(mut self, message: impl Into<String>, span: Option<Span>) -> Self {
        self.notes.push(Note { message: message.into(), span });
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {} at {}..{}", label, self.kind, self.span.start, self.span.end)
    }
}

/// Hard cap on accumulated diagnostics per file.
pub const DIAGNOSTIC_CAP: usize = 100;

/// A bounded accumulator of diagnostics.
///
/// Pushes past [`DIAGNOSTIC_CAP`] are counted but dropped; the pipeline
/// keeps running either way.
#[derive(Debug, Default)]
pub struct DiagnosticBag {
    diagnostics: Vec<Diagnostic>,
    dropped: usize,
}

impl DiagnosticBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a diagnostic, dropping it if the cap is reached.
    pub fn push(&mut self, diag: Diagnostic) {
        if self.diagnostics.len() >= DIAGNOSTIC_CAP {
            self.dropped += 1;
            return;
        }
        self.diagnostics.push(diag);
    }

    /// Returns `true` if any accumulated diagnostic is an error.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// Number of diagnostics dropped after the cap was reached.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    /// Consumes the bag, returning the accumulated diagnostics.
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_display_includes_label_and_span() {
        let diag = Diagnostic::error(
            DiagnosticKind::MalformedTypeAnnotation,
            Span::new(5, 10),
        );
        let rendered = diag.to_string();
        assert!(rendered.starts_with("error:"));
        assert!(rendered.contains("5..10"));
    }

    #[test]
    fn non_exhaustive_message_lists_missing_variants() {
        let one = DiagnosticKind::NonExhaustiveMatch { missing: vec!["Err".into()] };
        assert_eq!(one.to_string(), "non-exhaustive match, missing variant: Err");

        let two = DiagnosticKind::NonExhaustiveMatch {
            missing: vec!["Green".into(), "Blue".into()],
        };
        assert!(two.to_string().contains("Green, Blue"));
    }

    #[test]
    fn bag_tracks_errors_and_warnings() {
        let mut bag = DiagnosticBag::new();
        bag.push(Diagnostic::warning(DiagnosticKind::AmbiguousResultType, Span::default()));
        assert!(!bag.has_errors());
        bag.push(Diagnostic::error(DiagnosticKind::GuardOnWildcard, Span::default()));
        assert!(bag.has_errors());
        assert_eq!(bag.len(), 2);
    }

    #[test]
    fn bag_drops_past_cap() {
        let mut bag = DiagnosticBag::new();
        for _ in 0..DIAGNOSTIC_CAP + 7 {
            bag.push(Diagnostic::error(DiagnosticKind::GuardOnWildcard, Span::default()));
        }
        assert_eq!(bag.len(), DIAGNOSTIC_CAP);
        assert_eq!(bag.dropped(), 7);
    }

    #[test]
    fn with_hint_and_note_attach() {
        let diag = Diagnostic::error(
            DiagnosticKind::NonExhaustiveMatch { missing: vec!["Err".into()] },
            Span::new(0, 4),
        )
        .with_hint("add a wildcard arm")
        .with_note("match begins here", Some(Span::new(0, 5)));
        assert_eq!(diag.hint.as_deref(), Some("add a wildcard arm"));
        assert_eq!(diag.notes.len(), 1);
    }
}
