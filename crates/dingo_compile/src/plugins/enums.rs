//! Enum plugin.
//!
//! The preprocessor already emitted each enum's core scaffolding (tag
//! type, constants, backing struct, constructors) as text, so this plugin
//! contributes what the text stage could not: `Is{Variant}()` predicate
//! methods for code outside `match`, and the package-level debug flag the
//! nil-safety `debug` mode gates on.

use crate::config::NilSafety;
use crate::context::PluginContext;
use crate::plugin::Plugin;
use crate::synth;
use std::fmt::Write;

#[derive(Default)]
pub struct EnumPlugin;

impl Plugin for EnumPlugin {
    fn name(&self) -> &'static str {
        "enums"
    }

    fn inject(&mut self, ctx: &mut PluginContext<'_>) {
        let enums = ctx.enums.clone();
        for descriptor in &enums {
            let mut text = String::new();
            for variant in &descriptor.variants {
                let _ = write!(
                    text,
                    "func (v {name}) Is{variant}() bool {{\n\treturn v.tag == {tag}\n}}\n\n",
                    name = descriptor.name,
                    variant = variant.name,
                    tag = descriptor.tag_const(&variant.name),
                );
            }
            let decls = synth::parse_decls(&text, ctx.interner, descriptor.span);
            ctx.injected.extend(decls);
        }

        // The debug-mode nil guards read one package-level flag.
        let has_sum_types =
            !ctx.enums.is_empty() || !ctx.results.is_empty() || !ctx.options.is_empty();
        if ctx.config.nil_safety_checks == NilSafety::Debug && has_sum_types {
            let decls = synth::parse_decls(
                "var __dingoDebug = os.Getenv(\"DINGO_DEBUG\") != \"\"\n",
                ctx.interner,
                dingo_base::Span::default(),
            );
            ctx.injected.extend(decls);
            ctx.imports_needed.insert("os".to_string());
        }
    }
}
