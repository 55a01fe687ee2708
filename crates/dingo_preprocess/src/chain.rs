//! The processor chain.
//!
//! Processors run in a fixed order (reordering breaks downstream scans):
//!
//! 1. type annotations → native parameter syntax
//! 2. error propagation (`?`) — always strict
//! 3. `enum` blocks → tag/struct/constructor scaffolding
//! 4. `match` blocks → sentinel-marked `switch` skeletons
//! 5. generic brackets and Result/Option mangling
//! 6. `let` bindings
//! 7. unqualified stdlib symbol resolution
//!
//! Each processor is pure over its input buffer: it produces a new buffer
//! plus the next stage's position map. A *strict* processor aborts the
//! chain when it records an error (a silently unexpanded `?` would only
//! surface as a confusing parse error later); lenient processors leave the
//! offending span untouched and keep going.

use crate::buffer::SourceBuffer;
use crate::enums::EnumDescriptor;
use crate::funcs::FunctionContext;
use crate::generics::{OptionInstance, ResultInstance};
use dingo_base::{DiagnosticBag, LineIndex, LineOrigin, PosMap, Span};
use std::collections::BTreeSet;

/// Surface token used for error propagation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorSyntax {
    #[default]
    Question,
    Bang,
    Try,
}

/// Accepted `match` arm syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchSyntax {
    #[default]
    Rust,
    /// Deprecated; rejected with a diagnostic at first use.
    Swift,
}

/// The configuration slice the preprocessor consumes.
#[derive(Debug, Clone)]
pub struct PreprocessOptions {
    pub error_syntax: ErrorSyntax,
    pub reuse_err_variable: bool,
    pub match_syntax: MatchSyntax,
    pub result_type_enabled: bool,
}

impl Default for PreprocessOptions {
    fn default() -> Self {
        Self {
            error_syntax: ErrorSyntax::Question,
            reuse_err_variable: true,
            match_syntax: MatchSyntax::Rust,
            result_type_enabled: true,
        }
    }
}

/// Mutable state threaded through the chain.
pub struct PassContext<'a> {
    pub options: &'a PreprocessOptions,
    pub diags: &'a mut DiagnosticBag,
    /// Line table of the stage-0 Dingo source, for diagnostic spans.
    pub source_index: LineIndex,
    /// Function contexts discovered after the annotation rewrite.
    pub funcs: Vec<FunctionContext>,
    /// Enum descriptors collected by the enum processor.
    pub enums: Vec<EnumDescriptor>,
    /// Result instantiations recorded by the mangler.
    pub results: Vec<ResultInstance>,
    /// Option instantiations recorded by the mangler.
    pub option_insts: Vec<OptionInstance>,
    /// Import paths the emission layer must ensure are present.
    pub imports: BTreeSet<String>,
    /// Monotone counter for `__tmpK`/`__errK` names.
    pub tmp_counter: u32,
    /// Monotone counter for `dingo:s:N`/`dingo:e:N` envelopes.
    pub envelope_counter: u32,
}

impl<'a> PassContext<'a> {
    pub fn new(source: &str, options: &'a PreprocessOptions, diags: &'a mut DiagnosticBag) -> Self {
        Self {
            options,
            diags,
            source_index: LineIndex::new(source),
            funcs: Vec::new(),
            enums: Vec::new(),
            results: Vec::new(),
            option_insts: Vec::new(),
            imports: BTreeSet::new(),
            tmp_counter: 0,
            envelope_counter: 0,
        }
    }

    /// A byte span in the Dingo source at the given origin position.
    pub fn span_at(&self, origin: LineOrigin, len: usize) -> Span {
        match self.source_index.offset(origin.line, origin.column) {
            Some(offset) => Span::new(offset, offset + len),
            None => Span::default(),
        }
    }
}

/// One text transformation stage.
pub trait Processor {
    fn name(&self) -> &'static str;

    /// Strict processors abort the chain on error.
    fn strict(&self) -> bool {
        false
    }

    fn process(
        &mut self,
        input: &SourceBuffer,
        map: &PosMap,
        ctx: &mut PassContext<'_>,
    ) -> (SourceBuffer, PosMap);
}

/// The result of running the chain over one file.
pub struct PreprocessOutput {
    pub buffer: SourceBuffer,
    pub map: PosMap,
    pub enums: Vec<EnumDescriptor>,
    pub results: Vec<ResultInstance>,
    pub option_insts: Vec<OptionInstance>,
    pub imports: BTreeSet<String>,
    /// True when a strict processor aborted the chain.
    pub aborted: bool,
}

/// Runs the default processor chain over `source`.
pub fn run_chain(
    source: &str,
    options: &PreprocessOptions,
    diags: &mut DiagnosticBag,
) -> PreprocessOutput {
    let processors: Vec<Box<dyn Processor>> = vec![
        Box::new(crate::type_ann::TypeAnnotationProcessor),
        Box::new(crate::error_prop::ErrorPropProcessor),
        Box::new(crate::enums::EnumProcessor),
        Box::new(crate::pattern::MatchProcessor),
        Box::new(crate::generics::GenericsProcessor),
        Box::new(crate::keywords::LetProcessor),
        Box::new(crate::symbols::SymbolProcessor),
    ];
    run_processors(source, processors, options, diags)
}

fn run_processors(
    source: &str,
    mut processors: Vec<Box<dyn Processor>>,
    options: &PreprocessOptions,
    diags: &mut DiagnosticBag,
) -> PreprocessOutput {
    let mut buffer = SourceBuffer::new(source);
    let mut map = PosMap::identity(buffer.line_count());
    let mut ctx = PassContext::new(source, options, diags);
    let mut aborted = false;

    for processor in processors.iter_mut() {
        let errors_before = ctx.diags.len();
        let (next_buffer, next_map) = processor.process(&buffer, &map, &mut ctx);
        debug_assert_eq!(next_map.len(), next_buffer.line_count());
        log::debug!(
            "processor {} complete: {} -> {} lines",
            processor.name(),
            buffer.line_count(),
            next_buffer.line_count()
        );
        buffer = next_buffer;
        map = next_map;
        if processor.strict() && ctx.diags.len() > errors_before {
            log::debug!("strict processor {} reported errors, aborting chain", processor.name());
            aborted = true;
            break;
        }
    }

    PreprocessOutput {
        buffer,
        map,
        enums: ctx.enums,
        results: ctx.results,
        option_insts: ctx.option_insts,
        imports: ctx.imports,
        aborted,
    }
}

/// Derives the origin of a transformed output line from the input line it
/// replaces. A line an earlier processor already transformed keeps its
/// origin; an identity line becomes transformed at `col_in_input`.
pub fn derive_origin(input_origin: LineOrigin, col_in_input: usize) -> LineOrigin {
    if input_origin.transformed {
        input_origin
    } else {
        LineOrigin::transformed(input_origin.line, col_in_input as u32 + 1)
    }
}

/// The identity origin for input line `line`, defaulting sensibly when the
/// map is shorter than the buffer (never expected; guards against panics).
pub fn origin_of(map: &PosMap, line: u32) -> LineOrigin {
    map.origin(line).unwrap_or(LineOrigin::identity(line))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_origin_marks_transformation_once() {
        let identity = LineOrigin::identity(4);
        let derived = derive_origin(identity, 8);
        assert!(derived.transformed);
        assert_eq!(derived.line, 4);
        assert_eq!(derived.column, 9);

        // A second derivation keeps the first transformation's origin.
        let again = derive_origin(derived, 0);
        assert_eq!(again, derived);
    }

    #[test]
    fn chain_runs_identity_on_plain_go() {
        let source = "package main\n\nfunc main() {\n\tx := 1\n\t_ = x\n}\n";
        let mut diags = DiagnosticBag::new();
        let out = run_chain(source, &PreprocessOptions::default(), &mut diags);
        assert!(!out.aborted);
        assert!(diags.is_empty());
        assert_eq!(out.buffer.text(), source);
        // Every line keeps an identity mapping.
        assert!(out.map.iter().all(|o| !o.transformed));
    }
}
