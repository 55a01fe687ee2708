//! Function-context discovery.
//!
//! The error-propagation expansion needs to know, for the function
//! enclosing each `?`, the ordered return types — the generated guard
//! returns a zero value for every result but the final error. Contexts are
//! discovered by a line scan over the post-annotation buffer (signatures
//! are native Go syntax by then) with balanced-brace tracking for body
//! extents.

use crate::scan;
use std::collections::BTreeSet;

/// An enclosing function discovered during preprocessing.
#[derive(Debug, Clone)]
pub struct FunctionContext {
    pub name: String,
    /// Ordered textual return types.
    pub results: Vec<String>,
    /// 1-based line of the `func` keyword.
    pub header_line: u32,
    /// 1-based line of the opening brace.
    pub body_start: u32,
    /// 1-based line of the closing brace.
    pub body_end: u32,
}

impl FunctionContext {
    /// True when `line` falls inside this function's body.
    pub fn contains(&self, line: u32) -> bool {
        line >= self.body_start && line <= self.body_end
    }
}

/// Finds the innermost function containing `line`.
///
/// Function literals are not tracked separately; the enclosing declared
/// function's signature governs `?` expansion, matching the surface rule
/// that `?` propagates out of the declared function.
pub fn enclosing(contexts: &[FunctionContext], line: u32) -> Option<&FunctionContext> {
    contexts
        .iter()
        .filter(|ctx| ctx.contains(line))
        .min_by_key(|ctx| ctx.body_end - ctx.body_start)
}

/// Scans a buffer for function declarations.
pub fn scan_functions<'a, F>(line_at: F, line_count: u32) -> Vec<FunctionContext>
where
    F: Fn(u32) -> &'a str,
{
    let mut contexts = Vec::new();
    let mut line = 1u32;
    while line <= line_count {
        let text = line_at(line);
        let trimmed = text.trim_start();
        if !trimmed.starts_with("func") || scan::find_code(text, "func") != Some(text.len() - trimmed.len()) {
            line += 1;
            continue;
        }
        let after_kw = &trimmed[4..];
        if !after_kw.starts_with([' ', '\t', '(']) {
            line += 1;
            continue;
        }

        // Join header lines until the opening brace appears in code.
        let header_line = line;
        let mut header = String::new();
        let mut brace_line = None;
        let mut scan_line = line;
        while scan_line <= line_count {
            let part = line_at(scan_line);
            let code = scan::strip_line_comment(part);
            header.push_str(code);
            header.push(' ');
            if let Some(col) = scan::find_code(part, "{") {
                brace_line = Some((scan_line, col));
                break;
            }
            scan_line += 1;
        }
        let Some((body_start, brace_col)) = brace_line else {
            line += 1;
            continue;
        };

        let Some(parsed) = parse_header(&header) else {
            line = body_start + 1;
            continue;
        };

        let body_end = scan::scan_balanced(
            &line_at,
            line_count,
            body_start,
            brace_col,
            b'{',
            b'}',
        )
        .map(|end| end.line)
        .unwrap_or(line_count);

        contexts.push(FunctionContext {
            name: parsed.0,
            results: parsed.1,
            header_line,
            body_start,
            body_end,
        });
        line = body_start + 1;
    }
    contexts
}

/// Names of every declared function, for the local-definition cache of the
/// unqualified-symbol processor.
pub fn scan_function_names<'a, F>(line_at: F, line_count: u32) -> BTreeSet<String>
where
    F: Fn(u32) -> &'a str,
{
    scan_functions(line_at, line_count)
        .into_iter()
        .map(|ctx| ctx.name)
        .collect()
}

/// Parses a joined `func …{` header into (name, result types).
fn parse_header(header: &str) -> Option<(String, Vec<String>)> {
    let after_func = header.trim_start().strip_prefix("func")?.trim_start();

    // Skip a method receiver.
    let rest = if after_func.starts_with('(') {
        let close = matching_paren(after_func, 0)?;
        after_func[close + 1..].trim_start()
    } else {
        after_func
    };

    // Function name.
    let name_end = rest
        .as_bytes()
        .iter()
        .position(|b| !scan::is_ident_byte(*b))
        .unwrap_or(rest.len());
    if name_end == 0 {
        return None;
    }
    let name = rest[..name_end].to_string();
    let after_name = rest[name_end..].trim_start();
    if !after_name.starts_with('(') {
        return None;
    }
    let params_close = matching_paren(after_name, 0)?;
    let results_text = after_name[params_close + 1..].trim();
    let brace = results_text.find('{').unwrap_or(results_text.len());
    let results_text = results_text[..brace].trim();

    Some((name, parse_results(results_text)))
}

/// Splits a results segment (``, `T`, `(A, B)`, `(n A, m B)`) into types.
pub fn parse_results(results: &str) -> Vec<String> {
    let results = results.trim();
    if results.is_empty() {
        return Vec::new();
    }
    let inner = if results.starts_with('(') && results.ends_with(')') {
        &results[1..results.len() - 1]
    } else {
        results
    };
    if inner.trim().is_empty() {
        return Vec::new();
    }
    scan::split_top_level(inner, b',')
        .into_iter()
        .map(|part| {
            let part = part.trim();
            // Named result: `n int` — the name is a plain identifier that
            // is not itself a type-forming keyword.
            if let Some(space) = part.find(' ') {
                let (head, tail) = part.split_at(space);
                let type_keyword =
                    matches!(head, "chan" | "map" | "func" | "struct" | "interface");
                if !type_keyword && head.bytes().all(scan::is_ident_byte) && !tail.trim().is_empty()
                {
                    return tail.trim().to_string();
                }
            }
            part.to_string()
        })
        .collect()
}

/// Finds the `)` matching the `(` at `open_idx`, string-aware.
fn matching_paren(s: &str, open_idx: usize) -> Option<usize> {
    let mut depth = 0i32;
    for (idx, b) in scan::code_bytes(s) {
        if idx < open_idx {
            continue;
        }
        match b {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }
    None
}

/// The canonical Go zero value for a textual return type.
pub fn zero_value(ty: &str) -> String {
    let ty = ty.trim();
    if ty.starts_with('*')
        || ty.starts_with("[]")
        || ty.starts_with("map[")
        || ty.starts_with("chan")
        || ty.starts_with("<-chan")
        || ty.starts_with("func")
        || ty == "error"
        || ty == "any"
        || ty == "interface{}"
    {
        return "nil".to_string();
    }
    match ty {
        "int" | "int8" | "int16" | "int32" | "int64" | "uint" | "uint8" | "uint16"
        | "uint32" | "uint64" | "uintptr" | "byte" | "rune" | "float32" | "float64"
        | "complex64" | "complex128" => "0".to_string(),
        "string" => "\"\"".to_string(),
        "bool" => "false".to_string(),
        _ => format!("{}{{}}", ty),
    }
}
