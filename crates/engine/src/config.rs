use std::collections::BTreeMap;

use serde::Deserialize;

use crate::classify::DEFAULT_COOLDOWN_DAYS;
use crate::error::EngineError;
use crate::schema;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// One validation run, described in TOML:
///
/// ```toml
/// name = "Weekly deposit check"
/// upload = "upload.csv"
/// reference = "reference.csv"
/// cooldown_days = 7
///
/// [mapping]
/// "client id" = "customer number"
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ValidationConfig {
    pub name: String,
    pub upload: String,
    pub reference: String,
    #[serde(default = "default_cooldown")]
    pub cooldown_days: i64,
    /// Canonical key → source header, resolving columns the cleaned
    /// header match does not find.
    #[serde(default)]
    pub mapping: BTreeMap<String, String>,
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_cooldown() -> i64 {
    DEFAULT_COOLDOWN_DAYS
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub json: Option<String>,
    #[serde(default)]
    pub csv: Option<String>,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ValidationConfig {
    pub fn from_toml(input: &str) -> Result<Self, EngineError> {
        let config: ValidationConfig =
            toml::from_str(input).map_err(|e| EngineError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.upload.trim().is_empty() {
            return Err(EngineError::ConfigValidation("upload path is empty".into()));
        }
        if self.reference.trim().is_empty() {
            return Err(EngineError::ConfigValidation("reference path is empty".into()));
        }
        if self.cooldown_days < 1 {
            return Err(EngineError::ConfigValidation(format!(
                "cooldown_days must be at least 1, got {}",
                self.cooldown_days
            )));
        }
        for key in self.mapping.keys() {
            if !schema::is_canonical_key(key) {
                return Err(EngineError::ConfigValidation(format!(
                    "mapping key '{key}' is not a canonical column (expected one of: {})",
                    schema::REQUIRED_COLUMNS
                        .iter()
                        .map(|(k, _)| *k)
                        .collect::<Vec<_>>()
                        .join(", ")
                )));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
