//! The bidirectional source map.
//!
//! Assembled once at emission time from the printer's per-line origin
//! spans composed with the preprocessor's position map. Two policies are
//! load-bearing and fixed:
//!
//! - **Identity mappings are recorded, never omitted.** Untransformed
//!   lines still get a record; their absence was the root cause of the
//!   historical wrong-line go-to-definition jumps.
//! - **Earliest insertion wins.** When two mappings target the same
//!   generated position (the boundary of a `?` expansion is the common
//!   case), the first one inserted is authoritative and later ones are
//!   dropped — an identity mapping can never override a transformed one.

use dingo_base::{LineIndex, MappingRecord, PosMap, Position, Span};
use dingo_goparse::PrintedFile;
use dingo_preprocess::SourceBuffer;
use serde::{Deserialize, Serialize};

/// Schema version of the `.go.map` JSON.
pub const SOURCE_MAP_VERSION: u32 = 1;

/// The serialized source map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMap {
    pub version: u32,
    pub dingo_file: String,
    pub go_file: String,
    pub mappings: Vec<MappingRecord>,
}

impl SourceMap {
    /// Forward lookup: the generated position for a Dingo line.
    ///
    /// Used to re-emit compiler diagnostics at user-side positions.
    pub fn forward(&self, original_line: u32) -> Option<&MappingRecord> {
        self.mappings.iter().find(|m| m.original_line == original_line)
    }

    /// Reverse lookup: the Dingo position for a generated line. The
    /// earliest inserted mapping wins.
    pub fn reverse(&self, generated_line: u32) -> Option<&MappingRecord> {
        self.mappings.iter().find(|m| m.generated_line == generated_line)
    }

    /// Reverse lookup with a nearest-line fallback, for consumers (the
    /// LSP proxy) that must answer something even between mappings.
    pub fn reverse_nearest(&self, generated_line: u32) -> Option<&MappingRecord> {
        if let Some(exact) = self.reverse(generated_line) {
            return Some(exact);
        }
        for offset in 1..=5u32 {
            if generated_line > offset {
                if let Some(record) = self.reverse(generated_line - offset) {
                    return Some(record);
                }
            }
            if let Some(record) = self.reverse(generated_line + offset) {
                return Some(record);
            }
        }
        None
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(text: &str) -> serde_json::Result<SourceMap> {
        serde_json::from_str(text)
    }
}

/// Incremental builder enforcing the duplicate-prevention policy.
#[derive(Debug, Default)]
pub struct SourceMapBuilder {
    mappings: Vec<MappingRecord>,
}

impl SourceMapBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a record unless its generated position is already mapped.
    /// Returns `true` when the record was kept.
    pub fn add(&mut self, record: MappingRecord) -> bool {
        let occupied = self.mappings.iter().any(|m| {
            m.generated_line == record.generated_line
                && m.generated_column == record.generated_column
        });
        if occupied {
            return false;
        }
        self.mappings.push(record);
        true
    }

    pub fn build(self, dingo_file: &str, go_file: &str) -> SourceMap {
        SourceMap {
            version: SOURCE_MAP_VERSION,
            dingo_file: dingo_file.to_string(),
            go_file: go_file.to_string(),
            mappings: self.mappings,
        }
    }
}

/// Composes printed line origins with the preprocessor position map into
/// the final source map.
///
/// `printed` carries, per output line, a span into the preprocessed
/// buffer; `pos_map` maps preprocessed lines back to Dingo positions.
pub fn assemble(
    printed: &PrintedFile,
    buffer: &SourceBuffer,
    pos_map: &PosMap,
    source_index: &LineIndex,
    dingo_file: &str,
    go_file: &str,
) -> SourceMap {
    let mut builder = SourceMapBuilder::new();
    for (i, origin_span) in printed.line_origins.iter().enumerate() {
        let generated_line = i as u32 + 1;
        let Some(span) = origin_span else { continue };
        // Synthesized nodes with no anchor carry an empty default span.
        if span.start == 0 && span.end == 0 {
            continue;
        }
        let Some(record) = resolve_span(*span, buffer, pos_map, source_index, generated_line)
        else {
            continue;
        };
        builder.add(record);
    }
    builder.build(dingo_file, go_file)
}

/// Resolves a preprocessed-buffer span to a Dingo-source mapping record.
fn resolve_span(
    span: Span,
    buffer: &SourceBuffer,
    pos_map: &PosMap,
    source_index: &LineIndex,
    generated_line: u32,
) -> Option<MappingRecord> {
    let pos: Position = buffer.position(span.start);
    let origin = pos_map.origin(pos.line)?;
    let (original_line, original_column) = if origin.transformed {
        (origin.line, origin.column)
    } else {
        (origin.line, pos.column)
    };
    // The original position must exist in the Dingo source.
    source_index.offset(original_line, original_column)?;
    Some(MappingRecord {
        generated_line,
        generated_column: 1,
        original_line,
        original_column,
        length: span.len() as u32,
        name: None,
    })
}
