#![deny(missing_docs)]

//! # Generator Configuration
//!
//! Options that shape identifier derivation and failure policy. Loaded from a
//! YAML or JSON file (camelCase keys); every field has a default so an empty
//! file is valid.

use crate::error::{AppError, AppResult};
use crate::naming::{
    sanitize_package_name, ReservedWords, DEFAULT_RESERVED_MODEL_SUFFIX,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Configuration for one generation session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GeneratorConfig {
    /// Raw package name; sanitized before use.
    pub package_name: Option<String>,
    /// Words reserved in addition to the built-in keyword list.
    pub reserved_words: Vec<String>,
    /// Suffix for model names that collide with a reserved word.
    pub reserved_model_suffix: String,
    /// Treat error-severity diagnostics as a failed run.
    pub strict: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            package_name: None,
            reserved_words: Vec::new(),
            reserved_model_suffix: DEFAULT_RESERVED_MODEL_SUFFIX.to_string(),
            strict: false,
        }
    }
}

impl GeneratorConfig {
    /// Parses a configuration from YAML (or JSON, which is valid YAML).
    pub fn from_yaml_str(content: &str) -> AppResult<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a configuration file. `.json` is parsed as JSON, anything else as YAML.
    pub fn from_path(path: &Path) -> AppResult<Self> {
        let content = fs::read_to_string(path)?;
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("yaml");
        match ext {
            "json" => {
                let config: Self = serde_json::from_str(&content).map_err(|e| {
                    AppError::Config(format!("Failed to parse config {:?}: {}", path, e))
                })?;
                config.validate()?;
                Ok(config)
            }
            _ => Self::from_yaml_str(&content),
        }
    }

    fn validate(&self) -> AppResult<()> {
        if self.reserved_model_suffix.is_empty() {
            return Err(AppError::Config(
                "reservedModelSuffix must not be empty".into(),
            ));
        }
        if let Some(word) = self.reserved_words.iter().find(|w| w.trim().is_empty()) {
            return Err(AppError::Config(format!(
                "reservedWords contains a blank entry: {:?}",
                word
            )));
        }
        Ok(())
    }

    /// The sanitized package name.
    pub fn resolved_package_name(&self) -> String {
        sanitize_package_name(self.package_name.as_deref())
    }

    /// Built-in reserved words plus the configured extras.
    pub fn reserved(&self) -> ReservedWords {
        let mut words = ReservedWords::default();
        words.extend(self.reserved_words.iter().map(String::as_str));
        words
    }
}
