//! # dingo-compile
//!
//! The dingo compilation pipeline: Dingo source in, formatted Go plus a
//! bidirectional source map out.
//!
//! # Pipeline Overview
//!
//! ```text
//! Dingo Source (.dgo)
//!       │
//!       ▼
//! ┌───────────────────┐
//! │ 1. Preprocessor   │ text chain → valid Go + position map
//! └─────────┬─────────┘
//!           ▼
//! ┌───────────────────┐
//! │ 2. Parser         │ standard Go grammar → AST
//! └─────────┬─────────┘
//!           ▼
//! ┌───────────────────┐
//! │ 3. Resolver       │ package scope for type inference
//! └─────────┬─────────┘
//!           ▼
//! ┌───────────────────┐
//! │ 4. Plugins        │ Discover → Transform → Inject
//! └─────────┬─────────┘
//!           ▼
//! ┌───────────────────┐
//! │ 5. Emit           │ merge, print, source map, files
//! └─────────┬─────────┘
//!           ▼
//!   foo.go + foo.go.map
//! ```
//!
//! A single file's compilation is single-threaded and non-suspending; no
//! global mutable state is shared between invocations, so a build driver
//! may compile many files in parallel with one pipeline each.
//!
//! Errors accumulate in a bounded bag with Dingo-resolved positions; the
//! pipeline runs to completion so one invocation surfaces as many issues
//! as possible, and **no output file is written when any error exists**.
//!
//! # Example
//!
//! ```
//! use dingo_compile::{compile_source, Config};
//!
//! let source = "package main\n\nfunc double(n: int) -> int {\n\tlet d = n * 2\n\treturn d\n}\n";
//! let out = compile_source(source, &Config::default(), "double.dgo", "double.go").unwrap();
//! assert!(out.go_code.contains("func double(n int) int {"));
//! assert!(out.source_map.mappings.iter().any(|m| m.original_line == 3));
//! ```

pub mod compile;
pub mod config;
pub mod context;
pub mod emit;
pub mod infer;
pub mod plugin;
pub mod plugins;
pub mod render;
pub mod sourcemap;
pub mod style;
pub mod synth;

pub use compile::{compile_file, compile_source, CompileArtifacts, CompileFailure, CompileOutput};
pub use config::{
    BuildStrategy, Config, ConfigOverlay, ErrorPropSyntax, GoInterop, MatchSyntaxConfig,
    NilSafety, SourcemapFormat,
};
pub use context::PluginContext;
pub use plugin::{Plugin, PluginPipeline};
pub use render::{render_all, render_diagnostic};
pub use sourcemap::{SourceMap, SourceMapBuilder, SOURCE_MAP_VERSION};
pub use style::Style;
