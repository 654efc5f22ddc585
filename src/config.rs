//! Options for resolution and validation passes.
//!
//! Options can be built in code or loaded from TOML:
//!
//! ```toml
//! ambiguity = "first_wins"
//! apply_defaults = true
//! warnings_as_errors = false
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

/// How a decoded choice with more than one populated payload is resolved.
///
/// Both policies adopt the first populated variant in schema order; they differ in whether
/// the ambiguity is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ambiguity {
    /// Report `InconsistentChoice` listing every populated variant.
    #[default]
    Strict,
    /// Silently keep the first populated variant.
    FirstWins,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidationOptions {
    pub ambiguity: Ambiguity,
    /// Adopt schema default variants for choices nothing was decoded into.
    pub apply_defaults: bool,
    /// Report advisories (deprecated, under review) as errors.
    pub warnings_as_errors: bool,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        ValidationOptions {
            ambiguity: Ambiguity::Strict,
            apply_defaults: true,
            warnings_as_errors: false,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML: {0}")]
    Toml(#[from] toml::de::Error),
}

impl ValidationOptions {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }
}
