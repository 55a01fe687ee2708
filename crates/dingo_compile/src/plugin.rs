//! The three-phase plugin pipeline.
//!
//! Plugins run in a fixed registration order through three phases:
//!
//! 1. **Discover** — scan the AST, populate indexes. No mutation.
//! 2. **Transform** — mutate AST nodes in place (constructor call sites,
//!    match sentinel rewrites).
//! 3. **Inject** — surrender pending top-level declarations into the
//!    shared injected-declarations tree.
//!
//! Plugin errors land in the bounded accumulator and never abort the
//! pipeline: a single run surfaces as many issues as possible, and the
//! driver decides afterwards whether output may be written.

use crate::context::PluginContext;

/// One pipeline plugin.
pub trait Plugin {
    fn name(&self) -> &'static str;

    /// Phase 1: read-only scan populating plugin-local indexes.
    fn discover(&mut self, _ctx: &mut PluginContext<'_>) {}

    /// Phase 2: in-place AST mutation.
    fn transform(&mut self, _ctx: &mut PluginContext<'_>) {}

    /// Phase 3: surrender synthesized top-level declarations.
    fn inject(&mut self, _ctx: &mut PluginContext<'_>) {}
}

/// The fixed-order pipeline.
pub struct PluginPipeline {
    plugins: Vec<Box<dyn Plugin>>,
}

impl PluginPipeline {
    /// The standard plugin set, in registration order.
    pub fn standard() -> Self {
        Self {
            plugins: vec![
                Box::new(crate::plugins::result_option::ResultOptionPlugin::default()),
                Box::new(crate::plugins::enums::EnumPlugin::default()),
                Box::new(crate::plugins::pattern::MatchPlugin::default()),
            ],
        }
    }

    /// Runs all three phases over all plugins, then deduplicates the
    /// injected declarations by their declared name.
    pub fn run(&mut self, ctx: &mut PluginContext<'_>) {
        for plugin in &mut self.plugins {
            log::debug!("plugin {}: discover", plugin.name());
            plugin.discover(ctx);
        }
        for plugin in &mut self.plugins {
            log::debug!("plugin {}: transform", plugin.name());
            plugin.transform(ctx);
        }
        for plugin in &mut self.plugins {
            log::debug!("plugin {}: inject", plugin.name());
            plugin.inject(ctx);
        }
        dedup_injected(ctx);
    }
}

/// Drops injected declarations whose qualified name already appeared; the
/// first injection wins.
fn dedup_injected(ctx: &mut PluginContext<'_>) {
    let mut seen = std::collections::HashSet::new();
    let mut injected = std::mem::take(&mut ctx.injected);
    let interner: &dingo_base::Interner = ctx.interner;
    injected.retain(|decl| {
        let key = match decl.name() {
            Some(sym) => {
                // Methods share a name across receivers; qualify by the
                // receiver's printed type.
                let receiver = match decl {
                    dingo_goparse::ast::Decl::Func(f) => f
                        .receiver
                        .as_ref()
                        .map(|r| dingo_goparse::printer::type_to_string(&r.ty, interner))
                        .unwrap_or_default(),
                    _ => String::new(),
                };
                format!("{}::{}", receiver, interner.resolve(sym))
            }
            None => return true,
        };
        seen.insert(key)
    });
    ctx.injected = injected;
}
