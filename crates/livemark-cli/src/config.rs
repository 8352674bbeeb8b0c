//! CLI configuration stored as KDL.
//!
//! ```kdl
//! strong-class "lp-strong-fix"
//! marker-class "lp-strong-marker-fix"
//! render-math true
//! log-level "info"
//! ```
//!
//! Every key is optional; a missing file means defaults.

use std::path::{Path, PathBuf};

use kdl::KdlDocument;
use livemark_core::{DecorationConfig, SmolStr};
use miette::{Diagnostic, IntoDiagnostic, Result, WrapErr};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub decorations: DecorationConfig,
    /// Whether to render math replacements at all.
    pub render_math: bool,
    /// Default tracing filter when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            decorations: DecorationConfig::default(),
            render_math: true,
            log_level: "warn".to_owned(),
        }
    }
}

#[derive(thiserror::Error, Debug, Diagnostic)]
pub enum ConfigError {
    #[error("config key `{key}` expects a {expected}")]
    #[diagnostic(code(livemark::config::type_mismatch), help("check {path}"))]
    TypeMismatch {
        key: &'static str,
        expected: &'static str,
        path: String,
    },
}

impl Config {
    /// Load from `path`, or defaults if the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).into_diagnostic()?;
        Self::parse(&content, &path.display().to_string())
    }

    /// Parse KDL config text. `origin` names the source in diagnostics.
    pub fn parse(content: &str, origin: &str) -> Result<Self> {
        // kdl reports through an older miette, so go through std::error::Error.
        let doc: KdlDocument = content
            .parse()
            .into_diagnostic()
            .wrap_err_with(|| format!("failed to parse config {origin}"))?;
        let mut config = Self::default();

        if let Some(class) = string_arg(&doc, "strong-class", origin)? {
            config.decorations.strong_class = SmolStr::new(class);
        }
        if let Some(class) = string_arg(&doc, "marker-class", origin)? {
            config.decorations.marker_class = SmolStr::new(class);
        }
        if let Some(level) = string_arg(&doc, "log-level", origin)? {
            config.log_level = level.to_owned();
        }
        if let Some(node) = doc.get("render-math") {
            config.render_math = node
                .entries()
                .first()
                .and_then(|entry| entry.value().as_bool())
                .ok_or_else(|| ConfigError::TypeMismatch {
                    key: "render-math",
                    expected: "boolean",
                    path: origin.to_owned(),
                })?;
        }

        Ok(config)
    }
}

fn string_arg<'a>(doc: &'a KdlDocument, key: &'static str, origin: &str) -> Result<Option<&'a str>> {
    let Some(node) = doc.get(key) else {
        return Ok(None);
    };
    let value = node
        .entries()
        .first()
        .and_then(|entry| entry.value().as_string())
        .ok_or_else(|| ConfigError::TypeMismatch {
            key,
            expected: "string",
            path: origin.to_owned(),
        })?;
    Ok(Some(value))
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("livemark").join("config.kdl"))
}
