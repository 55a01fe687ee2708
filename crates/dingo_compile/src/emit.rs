//! AST merge, printing, and file emission.
//!
//! The injected-declarations tree joins the user AST only here: imports
//! first, then injected declarations sorted by name, then user
//! declarations in source order. Sorting makes emission deterministic —
//! the same input and configuration always produce byte-identical output,
//! which the golden tests rely on.

use crate::config::{BuildStrategy, Config, SourcemapFormat};
use crate::sourcemap::SourceMap;
use dingo_base::{Interner, Span};
use dingo_goparse::ast::{Decl, File, ImportDecl};
use dingo_goparse::{PrintedFile, Printer};
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Ensures every required import path is present, then sorts the import
/// block by path.
pub fn merge_imports(file: &mut File, needed: &BTreeSet<String>) {
    for path in needed {
        let quoted = format!("\"{}\"", path);
        if !file.imports.iter().any(|imp| imp.path == quoted) {
            file.imports.push(ImportDecl {
                leading: Vec::new(),
                alias: None,
                path: quoted,
                span: Span::default(),
            });
        }
    }
    file.imports.sort_by(|a, b| a.path.cmp(&b.path));
}

/// Splices the injected declarations ahead of the user declarations,
/// name-sorted for determinism.
pub fn merge_injected(file: &mut File, mut injected: Vec<Decl>, interner: &Interner) {
    injected.sort_by_key(|decl| decl_sort_key(decl, interner));
    let user = std::mem::take(&mut file.decls);
    file.decls = injected;
    file.decls.extend(user);
}

fn decl_sort_key(decl: &Decl, interner: &Interner) -> String {
    let name = decl
        .name()
        .map(|sym| interner.resolve(sym).to_string())
        .unwrap_or_default();
    // Methods sort with their receiver type so each scaffolding block
    // stays contiguous.
    match decl {
        Decl::Func(func) => match &func.receiver {
            Some(receiver) => format!(
                "{}::{}",
                dingo_goparse::printer::type_to_string(&receiver.ty, interner),
                name
            ),
            None => name,
        },
        _ => name,
    }
}

/// Prints the merged file.
pub fn print_file(file: &File, interner: &Interner) -> PrintedFile {
    Printer::new(interner).print(file)
}

/// Paths produced for one compiled input.
#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub go_file: PathBuf,
    pub map_file: Option<PathBuf>,
}

/// Computes output paths per the build strategy.
pub fn output_paths(input: &Path, config: &Config) -> OutputPaths {
    let file_stem = input.file_stem().unwrap_or_default();
    let go_name = {
        let mut name = file_stem.to_os_string();
        name.push(".go");
        name
    };
    let go_file = match config.build_strategy {
        BuildStrategy::Suffix => input.with_file_name(go_name),
        BuildStrategy::Target => config.build_out_dir.join(go_name),
    };
    let map_file = if config.sourcemaps_enabled
        && matches!(
            config.sourcemaps_format,
            SourcemapFormat::Separate | SourcemapFormat::Both
        ) {
        let mut name = go_file.as_os_str().to_os_string();
        name.push(".map");
        Some(PathBuf::from(name))
    } else {
        None
    };
    OutputPaths { go_file, map_file }
}

/// Writes the `.go` file (and `.go.map` per configuration).
///
/// The caller guarantees the error accumulator was empty; this function
/// never writes partial output.
pub fn write_output(
    paths: &OutputPaths,
    go_code: &str,
    source_map: &SourceMap,
    config: &Config,
) -> io::Result<()> {
    if let Some(parent) = paths.go_file.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let inline = config.sourcemaps_enabled
        && matches!(
            config.sourcemaps_format,
            SourcemapFormat::Inline | SourcemapFormat::Both
        );
    if inline {
        let json = serde_json::to_string(source_map)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        let mut text = go_code.to_string();
        text.push_str(&format!("\n// dingo:sourcemap {}\n", json));
        fs::write(&paths.go_file, text)?;
    } else {
        fs::write(&paths.go_file, go_code)?;
    }

    if let Some(map_file) = &paths.map_file {
        let json = source_map
            .to_json()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(map_file, json)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dingo_goparse::parse_file;

    #[test]
    fn merge_imports_adds_and_sorts() {
        let mut interner = Interner::new();
        let mut file = parse_file("package main\n\nimport \"os\"\n", &mut interner).unwrap();
        let mut needed = BTreeSet::new();
        needed.insert("fmt".to_string());
        needed.insert("os".to_string());
        merge_imports(&mut file, &needed);
        let paths: Vec<&str> = file.imports.iter().map(|i| i.path.as_str()).collect();
        assert_eq!(paths, vec!["\"fmt\"", "\"os\""]);
    }

    #[test]
    fn merge_injected_sorts_by_name_before_user_decls() {
        let mut interner = Interner::new();
        let mut file = parse_file("package main\n\nfunc main() {\n}\n", &mut interner).unwrap();
        let injected = parse_file(
            "package synth\n\ntype Zeta struct {\n\tx int\n}\n\ntype Alpha struct {\n\ty int\n}\n",
            &mut interner,
        )
        .unwrap()
        .decls;
        merge_injected(&mut file, injected, &interner);
        let names: Vec<String> = file
            .decls
            .iter()
            .filter_map(|d| d.name().map(|s| interner.resolve(s).to_string()))
            .collect();
        assert_eq!(names, vec!["Alpha", "Zeta", "main"]);
    }

    #[test]
    fn output_paths_follow_strategy() {
        let mut config = Config::default();
        let paths = output_paths(Path::new("src/app.dgo"), &config);
        assert_eq!(paths.go_file, Path::new("src/app.go"));
        assert_eq!(paths.map_file.as_deref(), Some(Path::new("src/app.go.map")));

        config.build_strategy = BuildStrategy::Target;
        config.build_out_dir = PathBuf::from("dingo-out");
        let paths = output_paths(Path::new("src/app.dgo"), &config);
        assert_eq!(paths.go_file, Path::new("dingo-out/app.go"));
    }

    #[test]
    fn disabled_sourcemaps_emit_no_map_path() {
        let mut config = Config::default();
        config.sourcemaps_enabled = false;
        let paths = output_paths(Path::new("app.dgo"), &config);
        assert!(paths.map_file.is_none());
    }
}
