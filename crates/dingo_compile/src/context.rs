//! The per-file plugin context.
//!
//! Created fresh at pipeline entry and discarded at exit. The user AST and
//! the injected-declarations accumulator are deliberately separate trees:
//! splicing synthesized declarations into the user AST made them inherit
//! leading comments from neighbouring user code, so the two are merged
//! only at print time.

use crate::config::Config;
use dingo_base::{Diagnostic, DiagnosticBag, DiagnosticKind, Interner, LineIndex, PosMap, Span};
use dingo_goparse::ast::{Decl, File};
use dingo_preprocess::{EnumDescriptor, OptionInstance, ResultInstance, SourceBuffer};
use std::collections::BTreeSet;

/// Shared state for one plugin-pipeline run.
pub struct PluginContext<'a> {
    pub interner: &'a mut Interner,
    /// The user AST, mutated in place during Transform.
    pub file: File,
    /// The injected-declarations tree, merged at print time.
    pub injected: Vec<Decl>,
    /// Package-scope type information from the resolver.
    pub types: dingo_goparse::resolve::TypeInfo,
    pub enums: Vec<EnumDescriptor>,
    pub results: Vec<ResultInstance>,
    pub options: Vec<OptionInstance>,
    pub config: &'a Config,
    pub diags: &'a mut DiagnosticBag,
    /// Position map of the preprocessed buffer back to the Dingo source.
    pub pos_map: &'a PosMap,
    /// The preprocessed buffer the AST was parsed from.
    pub buffer: &'a SourceBuffer,
    /// Line table of the original Dingo source.
    pub source_index: &'a LineIndex,
    /// Import paths emission must guarantee.
    pub imports_needed: BTreeSet<String>,
    fresh: u32,
}

impl<'a> PluginContext<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        interner: &'a mut Interner,
        file: File,
        types: dingo_goparse::resolve::TypeInfo,
        enums: Vec<EnumDescriptor>,
        results: Vec<ResultInstance>,
        options: Vec<OptionInstance>,
        config: &'a Config,
        diags: &'a mut DiagnosticBag,
        pos_map: &'a PosMap,
        buffer: &'a SourceBuffer,
        source_index: &'a LineIndex,
        imports_needed: BTreeSet<String>,
    ) -> Self {
        Self {
            interner,
            file,
            injected: Vec::new(),
            types,
            enums,
            results,
            options,
            config,
            diags,
            pos_map,
            buffer,
            source_index,
            imports_needed,
            fresh: 0,
        }
    }

    /// A fresh synthesized identifier with the given prefix.
    pub fn fresh_name(&mut self, prefix: &str) -> String {
        let name = format!("__{}{}", prefix, self.fresh);
        self.fresh += 1;
        name
    }

    /// Resolves a span in the preprocessed buffer to Dingo source bytes.
    ///
    /// Every diagnostic a plugin reports goes through this, so errors
    /// always carry user-side positions.
    pub fn dingo_span(&self, span: Span) -> Span {
        let pos = self.buffer.position(span.start);
        let Some(origin) = self.pos_map.origin(pos.line) else {
            return Span::default();
        };
        let column = if origin.transformed { origin.column } else { pos.column };
        match self.source_index.offset(origin.line, column) {
            Some(offset) => Span::new(offset, offset + span.len().max(1)),
            None => Span::default(),
        }
    }

    /// Reports an error at a preprocessed-buffer position.
    pub fn error_at(&mut self, span: Span, kind: DiagnosticKind) {
        let resolved = self.dingo_span(span);
        self.diags.push(Diagnostic::error(kind, resolved));
    }

    /// Reports an error with a suggested fix.
    pub fn error_with_hint(&mut self, span: Span, kind: DiagnosticKind, hint: &str) {
        let resolved = self.dingo_span(span);
        self.diags.push(Diagnostic::error(kind, resolved).with_hint(hint));
    }
}
