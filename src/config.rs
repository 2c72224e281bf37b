//! Configuration loading
//!
//! `defaults/hilite.default.toml` is embedded into the crate so that the
//! documented defaults and the runtime behavior stay in sync. Callers layer
//! user files and command-line overrides on top of it with [`Loader`] before
//! deserializing into [`HiliteConfig`].

use crate::tokenizer::TokenizerConfig;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/hilite.default.toml");

#[derive(Debug, Clone, Deserialize)]
pub struct HiliteConfig {
    pub tokenizer: TokenizerConfig,
    pub output: OutputConfig,
}

/// Settings for `hilite tokenize`.
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub format: String,
    #[serde(default)]
    pub language: Option<String>,
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override, e.g. `output.format`.
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    pub fn build(self) -> Result<HiliteConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<HiliteConfig, ConfigError> {
    Loader::new().build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::DEFAULT_MAX_DEPTH;
    use std::io::Write;

    #[test]
    fn loads_default_config() {
        let config = load_defaults().expect("defaults to deserialize");
        assert_eq!(config.tokenizer, TokenizerConfig::default());
        assert_eq!(config.tokenizer.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(config.output.format, "treeviz");
        assert_eq!(config.output.language, None);
    }

    #[test]
    fn supports_overrides() {
        let config = Loader::new()
            .set_override("output.format", "json")
            .unwrap()
            .set_override("tokenizer.max_depth", 4i64)
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(config.output.format, "json");
        assert_eq!(config.tokenizer.max_depth, 4);
    }

    #[test]
    fn layers_user_file() {
        let path = std::env::temp_dir().join(format!("hilite-config-{}.toml", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[output]\nlanguage = \"bash\"").unwrap();

        let config = Loader::new().with_file(&path).build().unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.output.language.as_deref(), Some("bash"));
        assert_eq!(config.output.format, "treeviz");
    }

    #[test]
    fn optional_file_may_be_missing() {
        let config = Loader::new()
            .with_optional_file("/nonexistent/hilite.toml")
            .build()
            .unwrap();
        assert_eq!(config.output.format, "treeviz");
    }

    #[test]
    fn required_file_must_exist() {
        assert!(Loader::new()
            .with_file("/nonexistent/hilite.toml")
            .build()
            .is_err());
    }
}
