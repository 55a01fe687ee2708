//! Position maps from generated text back to Dingo source.
//!
//! Two representations live here:
//!
//! - [`PosMap`] is the *forward* map threaded through the preprocessor chain:
//!   one [`LineOrigin`] per line of the current-stage buffer, pointing at the
//!   stage-0 line that produced it. Each processor builds the next stage's
//!   map from its input's map, so later stages never need to re-derive
//!   origins.
//! - [`MappingRecord`] is the serialized record of the `.go.map` JSON schema,
//!   assembled once at emission time.
//!
//! Identity lines (untransformed code) are recorded, not omitted. Reverse
//! lookup with missing identity mappings was the root cause of historical
//! go-to-definition bugs, so [`PosMap`] makes the identity entry the default
//! and transformation the exception.

use serde::{Deserialize, Serialize};

/// The stage-0 origin of one line in a later-stage buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineOrigin {
    /// Originating line in the Dingo source, 1-based.
    pub line: u32,
    /// Originating column in the Dingo source, 1-based.
    pub column: u32,
    /// `true` if a processor rewrote this line; identity lines stay `false`.
    pub transformed: bool,
}

impl LineOrigin {
    /// An identity origin at column 1 of the given source line.
    pub fn identity(line: u32) -> Self {
        Self { line, column: 1, transformed: false }
    }

    /// A transformed origin pointing at the given source position.
    pub fn transformed(line: u32, column: u32) -> Self {
        Self { line, column, transformed: true }
    }
}

/// Forward map from a stage-N buffer's lines to stage-0 positions.
#[derive(Debug, Clone, Default)]
pub struct PosMap {
    origins: Vec<LineOrigin>,
}

impl PosMap {
    /// An identity map for a buffer of `line_count` lines.
    pub fn identity(line_count: usize) -> Self {
        Self {
            origins: (1..=line_count as u32).map(LineOrigin::identity).collect(),
        }
    }

    /// An empty map to be filled by a processor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the origin for the next output line.
    pub fn push(&mut self, origin: LineOrigin) {
        self.origins.push(origin);
    }

    /// The origin of `line` (1-based) in the stage-0 source.
    pub fn origin(&self, line: u32) -> Option<LineOrigin> {
        self.origins.get(line.saturating_sub(1) as usize).copied()
    }

    /// Number of mapped lines; equals the buffer's line count at every stage.
    pub fn len(&self) -> usize {
        self.origins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.origins.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LineOrigin> {
        self.origins.iter()
    }
}

/// One record of the `.go.map` JSON schema.
///
/// All positions are 1-based. `length` is the byte length of the originating
/// span; `name` carries the identifier a mapping is anchored to, when any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingRecord {
    pub generated_line: u32,
    pub generated_column: u32,
    pub original_line: u32,
    pub original_column: u32,
    pub length: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}
