//! Configuration schema and layered resolution.
//!
//! Configuration is a TOML file named `dingo.toml`. Resolution order is
//! CLI overrides ▸ project file ▸ user-home file ▸ built-in defaults; each
//! layer only overrides the keys it actually sets, which is why loading
//! goes through the all-optional [`ConfigOverlay`] before collapsing into
//! the concrete [`Config`].

use dingo_preprocess::{ErrorSyntax, MatchSyntax, PreprocessOptions};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPropSyntax {
    #[default]
    Question,
    Bang,
    Try,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NilSafety {
    #[default]
    On,
    Off,
    Debug,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchSyntaxConfig {
    #[default]
    Rust,
    Swift,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GoInterop {
    #[default]
    OptIn,
    Auto,
    Disabled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourcemapFormat {
    #[default]
    Separate,
    Inline,
    Both,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildStrategy {
    /// Emit `foo.go` beside `foo.dgo`.
    #[default]
    Suffix,
    /// Emit into a shadow output directory.
    Target,
}

/// Fully resolved configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub error_propagation_syntax: ErrorPropSyntax,
    pub reuse_err_variable: bool,
    pub nil_safety_checks: NilSafety,
    pub match_syntax: MatchSyntaxConfig,
    pub result_type_enabled: bool,
    pub go_interop: GoInterop,
    pub sourcemaps_enabled: bool,
    pub sourcemaps_format: SourcemapFormat,
    pub build_strategy: BuildStrategy,
    pub build_out_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            error_propagation_syntax: ErrorPropSyntax::Question,
            reuse_err_variable: true,
            nil_safety_checks: NilSafety::On,
            match_syntax: MatchSyntaxConfig::Rust,
            result_type_enabled: true,
            go_interop: GoInterop::OptIn,
            sourcemaps_enabled: true,
            sourcemaps_format: SourcemapFormat::Separate,
            build_strategy: BuildStrategy::Suffix,
            build_out_dir: PathBuf::from("dingo-out"),
        }
    }
}

impl Config {
    /// The slice of configuration the preprocessor consumes.
    pub fn preprocess_options(&self) -> PreprocessOptions {
        PreprocessOptions {
            error_syntax: match self.error_propagation_syntax {
                ErrorPropSyntax::Question => ErrorSyntax::Question,
                ErrorPropSyntax::Bang => ErrorSyntax::Bang,
                ErrorPropSyntax::Try => ErrorSyntax::Try,
            },
            reuse_err_variable: self.reuse_err_variable,
            match_syntax: match self.match_syntax {
                MatchSyntaxConfig::Rust => MatchSyntax::Rust,
                MatchSyntaxConfig::Swift => MatchSyntax::Swift,
            },
            result_type_enabled: self.result_type_enabled,
        }
    }

    /// Resolves configuration: `overrides` ▸ project file ▸ home file ▸
    /// defaults.
    pub fn resolve(project_dir: Option<&Path>, overrides: &ConfigOverlay) -> Config {
        let mut config = Config::default();
        if let Some(home) = dirs::home_dir() {
            if let Some(overlay) = ConfigOverlay::load(&home.join(".dingo.toml")) {
                overlay.apply(&mut config);
            }
        }
        if let Some(dir) = project_dir {
            if let Some(overlay) = ConfigOverlay::load(&dir.join("dingo.toml")) {
                overlay.apply(&mut config);
            }
        }
        overrides.apply(&mut config);
        config
    }
}

// ─── TOML overlay (all keys optional) ───────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConfigOverlay {
    pub error_propagation_syntax: Option<ErrorPropSyntax>,
    pub reuse_err_variable: Option<bool>,
    pub nil_safety_checks: Option<NilSafety>,
    #[serde(rename = "match")]
    pub match_section: MatchSection,
    pub features: FeaturesSection,
    pub sourcemaps: SourcemapsSection,
    pub build: BuildSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MatchSection {
    pub syntax: Option<MatchSyntaxConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FeaturesSection {
    pub result_type: ResultTypeSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ResultTypeSection {
    pub enabled: Option<bool>,
    pub go_interop: Option<GoInterop>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SourcemapsSection {
    pub enabled: Option<bool>,
    pub format: Option<SourcemapFormat>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BuildSection {
    pub strategy: Option<BuildStrategy>,
    pub out_dir: Option<PathBuf>,
}

impl ConfigOverlay {
    /// Parses an overlay from TOML text.
    pub fn from_toml(text: &str) -> Result<ConfigOverlay, toml::de::Error> {
        toml::from_str(text)
    }

    /// Loads an overlay file; a missing or unreadable file is simply no
    /// overlay, a malformed one is logged and skipped.
    pub fn load(path: &Path) -> Option<ConfigOverlay> {
        let text = fs::read_to_string(path).ok()?;
        match Self::from_toml(&text) {
            Ok(overlay) => Some(overlay),
            Err(err) => {
                log::warn!("ignoring malformed config {}: {}", path.display(), err);
                None
            }
        }
    }

    /// Applies every key this overlay sets onto `config`.
    pub fn apply(&self, config: &mut Config) {
        if let Some(v) = self.error_propagation_syntax {
            config.error_propagation_syntax = v;
        }
        if let Some(v) = self.reuse_err_variable {
            config.reuse_err_variable = v;
        }
        if let Some(v) = self.nil_safety_checks {
            config.nil_safety_checks = v;
        }
        if let Some(v) = self.match_section.syntax {
            config.match_syntax = v;
        }
        if let Some(v) = self.features.result_type.enabled {
            config.result_type_enabled = v;
        }
        if let Some(v) = self.features.result_type.go_interop {
            config.go_interop = v;
        }
        if let Some(v) = self.sourcemaps.enabled {
            config.sourcemaps_enabled = v;
        }
        if let Some(v) = self.sourcemaps.format {
            config.sourcemaps_format = v;
        }
        if let Some(v) = self.build.strategy {
            config.build_strategy = v;
        }
        if let Some(v) = &self.build.out_dir {
            config.build_out_dir = v.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_equals_defaults() {
        let overlay = ConfigOverlay::from_toml("").unwrap();
        let mut config = Config::default();
        overlay.apply(&mut config);
        assert_eq!(config, Config::default());
    }

    #[test]
    fn full_schema_parses() {
        let overlay = ConfigOverlay::from_toml(
            r#"
error_propagation_syntax = "bang"
reuse_err_variable = false
nil_safety_checks = "debug"

[match]
syntax = "swift"

[features.result_type]
enabled = false
go_interop = "auto"

[sourcemaps]
enabled = false
format = "inline"

[build]
strategy = "target"
out_dir = "generated"
"#,
        )
        .unwrap();
        let mut config = Config::default();
        overlay.apply(&mut config);
        assert_eq!(config.error_propagation_syntax, ErrorPropSyntax::Bang);
        assert!(!config.reuse_err_variable);
        assert_eq!(config.nil_safety_checks, NilSafety::Debug);
        assert_eq!(config.match_syntax, MatchSyntaxConfig::Swift);
        assert!(!config.result_type_enabled);
        assert_eq!(config.go_interop, GoInterop::Auto);
        assert!(!config.sourcemaps_enabled);
        assert_eq!(config.sourcemaps_format, SourcemapFormat::Inline);
        assert_eq!(config.build_strategy, BuildStrategy::Target);
        assert_eq!(config.build_out_dir, PathBuf::from("generated"));
    }

    #[test]
    fn partial_overlay_keeps_other_defaults() {
        let overlay = ConfigOverlay::from_toml("reuse_err_variable = false\n").unwrap();
        let mut config = Config::default();
        overlay.apply(&mut config);
        assert!(!config.reuse_err_variable);
        assert_eq!(config.nil_safety_checks, NilSafety::On);
        assert!(config.sourcemaps_enabled);
    }

    #[test]
    fn later_layers_override_earlier() {
        let home = ConfigOverlay::from_toml("nil_safety_checks = \"off\"\n").unwrap();
        let project = ConfigOverlay::from_toml("nil_safety_checks = \"debug\"\n").unwrap();
        let mut config = Config::default();
        home.apply(&mut config);
        project.apply(&mut config);
        assert_eq!(config.nil_safety_checks, NilSafety::Debug);
    }

    #[test]
    fn preprocess_options_mirror_config() {
        let mut config = Config::default();
        config.error_propagation_syntax = ErrorPropSyntax::Try;
        config.result_type_enabled = false;
        let options = config.preprocess_options();
        assert_eq!(options.error_syntax, ErrorSyntax::Try);
        assert!(!options.result_type_enabled);
        assert_eq!(options.match_syntax, MatchSyntax::Rust);
    }
}
