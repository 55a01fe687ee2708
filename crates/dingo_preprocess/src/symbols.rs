//! Processor 7: unqualified stdlib symbol resolution.
//!
//! Dingo lets users call a curated set of Go standard-library functions
//! without the package qualifier; this processor puts the qualifier back.
//! A bare call `ReadFile(path)` becomes `os.ReadFile(path)` and the `os`
//! import is recorded for the emission layer. Calls whose base name is
//! defined in the current package are skipped, as are selector calls
//! (`cfg.ReadFile(…)`) and function declarations themselves.
//!
//! The symbol table is a static name → (package, import path) map; it is
//! the only process-wide state in the pipeline and is consumed read-only.

use crate::buffer::SourceBuffer;
use crate::chain::{derive_origin, origin_of, PassContext, Processor};
use crate::funcs;
use crate::scan;
use dingo_base::PosMap;
use std::collections::BTreeSet;

/// Bare function name → (package qualifier, import path).
pub const STDLIB_SYMBOLS: &[(&str, &str, &str)] = &[
    // fmt
    ("Errorf", "fmt", "fmt"),
    ("Fprintf", "fmt", "fmt"),
    ("Print", "fmt", "fmt"),
    ("Printf", "fmt", "fmt"),
    ("Println", "fmt", "fmt"),
    ("Sprint", "fmt", "fmt"),
    ("Sprintf", "fmt", "fmt"),
    // os
    ("Create", "os", "os"),
    ("Exit", "os", "os"),
    ("Getenv", "os", "os"),
    ("Mkdir", "os", "os"),
    ("MkdirAll", "os", "os"),
    ("Open", "os", "os"),
    ("ReadFile", "os", "os"),
    ("Remove", "os", "os"),
    ("Stat", "os", "os"),
    ("WriteFile", "os", "os"),
    // strings
    ("Contains", "strings", "strings"),
    ("HasPrefix", "strings", "strings"),
    ("HasSuffix", "strings", "strings"),
    ("Join", "strings", "strings"),
    ("Repeat", "strings", "strings"),
    ("ReplaceAll", "strings", "strings"),
    ("Split", "strings", "strings"),
    ("ToLower", "strings", "strings"),
    ("ToUpper", "strings", "strings"),
    ("TrimSpace", "strings", "strings"),
    // strconv
    ("Atoi", "strconv", "strconv"),
    ("FormatInt", "strconv", "strconv"),
    ("Itoa", "strconv", "strconv"),
    ("ParseFloat", "strconv", "strconv"),
    ("ParseInt", "strconv", "strconv"),
    ("Quote", "strconv", "strconv"),
    // math
    ("Abs", "math", "math"),
    ("Ceil", "math", "math"),
    ("Floor", "math", "math"),
    ("Pow", "math", "math"),
    ("Sqrt", "math", "math"),
    // time
    ("Now", "time", "time"),
    ("Since", "time", "time"),
    ("Sleep", "time", "time"),
    // encoding/json
    ("Marshal", "json", "encoding/json"),
    ("MarshalIndent", "json", "encoding/json"),
    ("Unmarshal", "json", "encoding/json"),
    // io
    ("ReadAll", "io", "io"),
];

fn lookup(name: &str) -> Option<(&'static str, &'static str)> {
    STDLIB_SYMBOLS
        .iter()
        .find(|(n, _, _)| *n == name)
        .map(|(_, pkg, path)| (*pkg, *path))
}

pub struct SymbolProcessor;

impl Processor for SymbolProcessor {
    fn name(&self) -> &'static str {
        "symbol-resolution"
    }

    fn process(
        &mut self,
        input: &SourceBuffer,
        map: &PosMap,
        ctx: &mut PassContext<'_>,
    ) -> (SourceBuffer, PosMap) {
        // Per-package cache of locally defined function names; a local
        // definition always wins over the stdlib table.
        let locals: BTreeSet<String> =
            funcs::scan_function_names(|n| input.line(n), input.line_count() as u32);

        let mut out_lines = Vec::with_capacity(input.line_count());
        let mut out_map = PosMap::new();

        for (n, line) in input.lines() {
            let origin = origin_of(map, n);
            let (rewritten, first_change) = qualify_line(line, &locals, ctx);
            match first_change {
                Some(col) => out_map.push(derive_origin(origin, col)),
                None => out_map.push(origin),
            }
            out_lines.push(rewritten);
        }
        (SourceBuffer::from_lines(out_lines), out_map)
    }
}

/// Qualifies bare stdlib calls on one line.
fn qualify_line(
    line: &str,
    locals: &BTreeSet<String>,
    ctx: &mut PassContext<'_>,
) -> (String, Option<usize>) {
    let bytes = line.as_bytes();
    let code: std::collections::HashSet<usize> =
        scan::code_bytes(line).into_iter().map(|(i, _)| i).collect();
    let mut out: Vec<u8> = Vec::with_capacity(line.len());
    let mut first_change = None;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        if b.is_ascii_uppercase() && code.contains(&i) && starts_token(line, bytes, i) {
            let end = ident_end(bytes, i);
            let name = &line[i..end];
            if bytes.get(end) == Some(&b'(') && !locals.contains(name) {
                if let Some((pkg, path)) = lookup(name) {
                    first_change.get_or_insert(i);
                    out.extend_from_slice(pkg.as_bytes());
                    out.push(b'.');
                    out.extend_from_slice(name.as_bytes());
                    ctx.imports.insert(path.to_string());
                    i = end;
                    continue;
                }
            }
            out.extend_from_slice(&bytes[i..end]);
            i = end;
            continue;
        }
        out.push(b);
        i += 1;
    }
    (String::from_utf8_lossy(&out).into_owned(), first_change)
}

/// The identifier at `idx` is a call base only if it does not follow a
/// selector dot, an identifier byte, or a `func` keyword.
fn starts_token(line: &str, bytes: &[u8], idx: usize) -> bool {
    if idx == 0 {
        return true;
    }
    let prev = bytes[idx - 1];
    if scan::is_ident_byte(prev) || prev == b'.' {
        return false;
    }
    // `func ReadFile(` is a declaration, not a call.
    let before = line[..idx].trim_end();
    !before.ends_with("func")
}

fn ident_end(bytes: &[u8], start: usize) -> usize {
    let mut end = start;
    while end < bytes.len() && scan::is_ident_byte(bytes[end]) {
        end += 1;
    }
    end
}
