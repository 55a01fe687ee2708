//! Compilation entry points.
//!
//! [`compile_source`] runs the full pipeline over one buffer and returns
//! generated Go plus the source map; [`compile_file`] adds the filesystem
//! contract (UTF-8 validation, output paths per build strategy, no files
//! written when any error exists).

use crate::config::Config;
use crate::context::PluginContext;
use crate::emit;
use crate::plugin::PluginPipeline;
use crate::sourcemap::{self, SourceMap};
use dingo_base::{Diagnostic, DiagnosticBag, DiagnosticKind, Interner, LineIndex, PosMap, Span};
use dingo_preprocess::{preprocess, SourceBuffer};
use std::fmt;
use std::path::{Path, PathBuf};

/// Successful compilation of one file.
#[derive(Debug)]
pub struct CompileOutput {
    pub go_code: String,
    pub source_map: SourceMap,
    /// Non-fatal diagnostics (captured resolver output and the like).
    pub warnings: Vec<Diagnostic>,
}

/// Failed compilation: the accumulated diagnostics, no output produced.
#[derive(Debug)]
pub struct CompileFailure {
    pub diagnostics: Vec<Diagnostic>,
}

impl fmt::Display for CompileFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let errors = self
            .diagnostics
            .iter()
            .filter(|d| d.severity == dingo_base::Severity::Error)
            .count();
        write!(f, "compilation failed with {} error(s)", errors)
    }
}

impl std::error::Error for CompileFailure {}

/// Compiles Dingo source text into Go plus a source map.
pub fn compile_source(
    source: &str,
    config: &Config,
    dingo_file: &str,
    go_file: &str,
) -> Result<CompileOutput, CompileFailure> {
    let source_index = LineIndex::new(source);
    let mut diags = DiagnosticBag::new();

    // Stage 1: the preprocessor chain.
    let options = config.preprocess_options();
    let pre = preprocess(source, &options, &mut diags);
    if pre.aborted || diags.has_errors() {
        return Err(fail(diags));
    }

    // Stage 2: the standard Go grammar over the intermediate text.
    let mut interner = Interner::new();
    let file = match dingo_goparse::parse_file(pre.buffer.text(), &mut interner) {
        Ok(file) => file,
        Err(err) => {
            let span = to_dingo_span(err.span, &pre.buffer, &pre.map, &source_index);
            diags.push(Diagnostic::error(
                DiagnosticKind::ParseFailure { message: err.message },
                span,
            ));
            return Err(fail(diags));
        }
    };

    // Stage 3: package-scope resolution; its diagnostics surface as
    // warnings, never silently dropped.
    let types = dingo_goparse::Resolver::resolve(&file, &interner);
    for warning in types.warnings() {
        let span = to_dingo_span(warning.span, &pre.buffer, &pre.map, &source_index);
        diags.push(Diagnostic::warning(
            DiagnosticKind::Custom(warning.message.clone()),
            span,
        ));
    }

    // Stage 4: the plugin pipeline.
    let mut ctx = PluginContext::new(
        &mut interner,
        file,
        types,
        pre.enums,
        pre.results,
        pre.option_insts,
        config,
        &mut diags,
        &pre.map,
        &pre.buffer,
        &source_index,
        pre.imports,
    );
    PluginPipeline::standard().run(&mut ctx);

    let PluginContext {
        mut file,
        injected,
        imports_needed,
        ..
    } = ctx;

    if diags.has_errors() {
        return Err(fail(diags));
    }

    // Stage 5: merge, print, map.
    emit::merge_imports(&mut file, &imports_needed);
    emit::merge_injected(&mut file, injected, &interner);
    let printed = emit::print_file(&file, &interner);
    let source_map = sourcemap::assemble(
        &printed,
        &pre.buffer,
        &pre.map,
        &source_index,
        dingo_file,
        go_file,
    );

    log::debug!(
        "compiled {}: {} lines of Go, {} mappings, {} warning(s)",
        dingo_file,
        printed.line_origins.len(),
        source_map.mappings.len(),
        diags.len(),
    );
    Ok(CompileOutput {
        go_code: printed.text,
        source_map,
        warnings: diags.into_vec(),
    })
}

/// Artifacts written by [`compile_file`].
#[derive(Debug)]
pub struct CompileArtifacts {
    pub go_path: PathBuf,
    pub map_path: Option<PathBuf>,
    pub output: CompileOutput,
}

/// Compiles a `.dgo` file and writes the `.go` (+ `.go.map`) outputs.
pub fn compile_file(path: &Path, config: &Config) -> Result<CompileArtifacts, CompileFailure> {
    let bytes = std::fs::read(path).map_err(|err| CompileFailure {
        diagnostics: vec![Diagnostic::error(
            DiagnosticKind::Custom(format!("cannot read {}: {}", path.display(), err)),
            Span::default(),
        )],
    })?;
    let source = String::from_utf8(bytes).map_err(|err| {
        let offset = err.utf8_error().valid_up_to();
        CompileFailure {
            diagnostics: vec![Diagnostic::error(
                DiagnosticKind::InvalidEncoding { offset },
                Span::point(offset),
            )],
        }
    })?;

    let paths = emit::output_paths(path, config);
    let dingo_name = path.to_string_lossy().into_owned();
    let go_name = paths.go_file.to_string_lossy().into_owned();
    let output = compile_source(&source, config, &dingo_name, &go_name)?;

    emit::write_output(&paths, &output.go_code, &output.source_map, config).map_err(|err| {
        CompileFailure {
            diagnostics: vec![Diagnostic::error(
                DiagnosticKind::Custom(format!("cannot write output: {}", err)),
                Span::default(),
            )],
        }
    })?;

    Ok(CompileArtifacts {
        go_path: paths.go_file,
        map_path: paths.map_file,
        output,
    })
}

fn fail(diags: DiagnosticBag) -> CompileFailure {
    CompileFailure { diagnostics: diags.into_vec() }
}

/// Resolves a span in the preprocessed buffer back to Dingo source bytes.
fn to_dingo_span(
    span: Span,
    buffer: &SourceBuffer,
    map: &PosMap,
    source_index: &LineIndex,
) -> Span {
    let pos = buffer.position(span.start);
    let Some(origin) = map.origin(pos.line) else {
        return Span::default();
    };
    let column = if origin.transformed { origin.column } else { pos.column };
    match source_index.offset(origin.line, column) {
        Some(offset) => Span::new(offset, offset + span.len().max(1)),
        None => Span::default(),
    }
}
