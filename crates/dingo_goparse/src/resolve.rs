//! Package-scope symbol and type collection.
//!
//! This is the narrow stand-in for the host language's type checker: it
//! collects the declarations the type-inference service needs to answer
//! context queries — function signatures, declared types, package-level
//! variable and constant types. Local (function-body) typing is layered on
//! top by the inference service itself.
//!
//! Diagnostics produced here (duplicate definitions, unresolvable
//! references) are *returned*, never discarded; the pipeline re-emits them
//! as warnings with Dingo-resolved positions. Silent error-swallowing in
//! this layer has historically masked real bugs.

use crate::ast::{Decl, File, TypeExpr};
use crate::printer::type_to_string;
use dingo_base::{Interner, Span, Symbol};
use std::collections::HashMap;

/// A function signature in canonical textual types.
#[derive(Debug, Clone)]
pub struct FuncSig {
    pub name: Symbol,
    pub params: Vec<String>,
    pub results: Vec<String>,
    pub span: Span,
}

/// A positioned resolver warning.
#[derive(Debug, Clone)]
pub struct ResolveWarning {
    pub message: String,
    pub span: Span,
}

/// Package-level symbol and type tables.
#[derive(Debug, Default)]
pub struct TypeInfo {
    funcs: HashMap<Symbol, FuncSig>,
    /// Methods keyed by (receiver type name, method name).
    methods: HashMap<(String, Symbol), FuncSig>,
    /// Declared type name → canonical underlying type text.
    types: HashMap<Symbol, String>,
    /// Package-level var/const name → canonical declared type text.
    globals: HashMap<Symbol, String>,
    warnings: Vec<ResolveWarning>,
}

impl TypeInfo {
    /// The signature of a package-level function.
    pub fn func(&self, name: Symbol) -> Option<&FuncSig> {
        self.funcs.get(&name)
    }

    /// The signature of a method on the named receiver type.
    pub fn method(&self, receiver: &str, name: Symbol) -> Option<&FuncSig> {
        self.methods.get(&(receiver.to_string(), name))
    }

    /// True if `name` is declared as a type in this package.
    pub fn is_type(&self, name: Symbol) -> bool {
        self.types.contains_key(&name)
    }

    /// The canonical underlying type of a declared type.
    pub fn underlying(&self, name: Symbol) -> Option<&str> {
        self.types.get(&name).map(String::as_str)
    }

    /// The declared type of a package-level var or const.
    pub fn global(&self, name: Symbol) -> Option<&str> {
        self.globals.get(&name).map(String::as_str)
    }

    /// True if `name` is any package-level definition (function, type,
    /// var, or const). The unqualified-symbol processor's local cache is
    /// the preprocessor-side equivalent of this query.
    pub fn defines(&self, name: Symbol) -> bool {
        self.funcs.contains_key(&name)
            || self.types.contains_key(&name)
            || self.globals.contains_key(&name)
    }

    pub fn warnings(&self) -> &[ResolveWarning] {
        &self.warnings
    }

    fn warn(&mut self, message: String, span: Span) {
        self.warnings.push(ResolveWarning { message, span });
    }
}

/// Collects package-scope information from a parsed file.
pub struct Resolver;

impl Resolver {
    pub fn resolve(file: &File, interner: &Interner) -> TypeInfo {
        let mut info = TypeInfo::default();
        for decl in &file.decls {
            match decl {
                Decl::Func(func) => {
                    let sig = FuncSig {
                        name: func.name.sym,
                        params: func
                            .params
                            .iter()
                            .map(|p| type_to_string(&p.ty, interner))
                            .collect(),
                        results: func
                            .results
                            .iter()
                            .map(|r| type_to_string(&r.ty, interner))
                            .collect(),
                        span: func.span,
                    };
                    match &func.receiver {
                        Some(receiver) => {
                            let recv_ty = receiver_base(&receiver.ty, interner);
                            let key = (recv_ty, func.name.sym);
                            if info.methods.insert(key, sig).is_some() {
                                info.warn(
                                    format!(
                                        "method {} redeclared on the same receiver",
                                        interner.resolve(func.name.sym)
                                    ),
                                    func.name.span,
                                );
                            }
                        }
                        None => {
                            if info.funcs.insert(func.name.sym, sig).is_some() {
                                info.warn(
                                    format!(
                                        "function {} redeclared in this package",
                                        interner.resolve(func.name.sym)
                                    ),
                                    func.name.span,
                                );
                            }
                        }
                    }
                }
                Decl::Type(ty) => {
                    let underlying = type_to_string(&ty.ty, interner);
                    if info.types.insert(ty.name.sym, underlying).is_some() {
                        info.warn(
                            format!(
                                "type {} redeclared in this package",
                                interner.resolve(ty.name.sym)
                            ),
                            ty.name.span,
                        );
                    }
                }
                Decl::Const(gen) | Decl::Var(gen) => {
                    for spec in &gen.specs {
                        let declared = spec.ty.as_ref().map(|t| type_to_string(t, interner));
                        for name in &spec.names {
                            if let Some(ty) = &declared {
                                info.globals.insert(name.sym, ty.clone());
                            } else {
                                // Untyped spec: the type comes from the value;
                                // record presence with an unknown type.
                                info.globals.entry(name.sym).or_default();
                            }
                        }
                    }
                }
            }
        }
        info
    }
}

/// Strips pointers and parens off a receiver type to its base name.
fn receiver_base(ty: &TypeExpr, interner: &Interner) -> String {
    match ty {
        TypeExpr::Pointer { elem, .. } | TypeExpr::Paren { elem, .. } => {
            receiver_base(elem, interner)
        }
        other => type_to_string(other, interner),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_file;

    fn resolve(src: &str) -> (TypeInfo, Interner) {
        let mut interner = Interner::new();
        let file = parse_file(src, &mut interner).unwrap();
        let info = Resolver::resolve(&file, &interner);
        (info, interner)
    }

    #[test]
    fn collects_function_signatures() {
        let (info, mut interner) = resolve(
            "package p\n\nfunc readConfig(path string) ([]byte, error) {\n\treturn nil, nil\n}\n",
        );
        let sym = interner.intern("readConfig");
        let sig = info.func(sym).expect("signature");
        assert_eq!(sig.params, vec!["string"]);
        assert_eq!(sig.results, vec!["[]byte", "error"]);
    }

    #[test]
    fn collects_methods_by_receiver_base() {
        let (info, mut interner) = resolve(
            "package p\n\ntype Counter struct {\n\tn int\n}\n\nfunc (c *Counter) Add(d int) int {\n\treturn c.n + d\n}\n",
        );
        let add = interner.intern("Add");
        assert!(info.method("Counter", add).is_some());
        assert!(info.is_type(interner.intern("Counter")));
    }

    #[test]
    fn collects_global_types() {
        let (info, mut interner) = resolve("package p\n\nvar debug bool\nconst limit int = 100\n");
        assert_eq!(info.global(interner.intern("debug")), Some("bool"));
        assert_eq!(info.global(interner.intern("limit")), Some("int"));
    }

    #[test]
    fn warns_on_redeclaration_instead_of_dropping() {
        let (info, _) = resolve("package p\n\nfunc f() {\n}\n\nfunc f() {\n}\n");
        assert_eq!(info.warnings().len(), 1);
        assert!(info.warnings()[0].message.contains("redeclared"));
    }

    #[test]
    fn defines_covers_all_namespaces() {
        let (info, mut interner) = resolve(
            "package p\n\nfunc f() {\n}\n\ntype T struct {\n\tx int\n}\n\nvar v int\n",
        );
        for name in ["f", "T", "v"] {
            assert!(info.defines(interner.intern(name)), "{} should be defined", name);
        }
        assert!(!info.defines(interner.intern("missing")));
    }
}
