//! # dingo-base
//!
//! Pure structural atoms for the dingo translator.
//!
//! This crate provides the foundational types used throughout dingo:
//!
//! - [`Span`]/[`Position`]/[`LineIndex`] — source location tracking
//! - [`Interner`]/[`Symbol`] — string interning for O(1) equality
//! - [`Diagnostic`]/[`DiagnosticBag`] — positioned errors with a bounded accumulator
//! - [`PosMap`]/[`MappingRecord`] — position maps from generated text back to source
//!
//! # Design Principles
//!
//! This crate has **no knowledge of Go or Dingo syntax and no I/O**. It provides
//! only generic, reusable infrastructure that the preprocessor, parser, and
//! compile pipeline build upon.
//!
//! # Example
//!
//! ```
//! use dingo_base::{Interner, LineIndex, Span};
//!
//! let mut interner = Interner::new();
//! let sym = interner.intern("readConfig");
//! assert_eq!(interner.resolve(sym), "readConfig");
//!
//! let index = LineIndex::new("let x = 1\nreturn x\n");
//! assert_eq!(index.position(10).line, 2);
//! ```

pub mod diag;
pub mod intern;
pub mod mapping;
pub mod span;

pub use diag::{Diagnostic, DiagnosticBag, DiagnosticKind, Severity};
pub use intern::{Interner, Symbol};
pub use mapping::{LineOrigin, MappingRecord, PosMap};
pub use span::{LineIndex, Position, Span};
