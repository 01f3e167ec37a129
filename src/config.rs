//! Engine configuration.
//!
//! Defaults match the layout the web service ships with: artifacts under
//! `models/`, telemetry in `data/telemetry.json`. Environment variables
//! prefixed `PHISHGUARD_` override individual values.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::models::tokenizer::DEFAULT_SEQUENCE_LENGTH;
use crate::telemetry::aggregator::TelemetryConfig;
use crate::telemetry::stats::{DEFAULT_RESPONSE_WINDOW, MAX_RESPONSE_WINDOW};

/// Seconds between background telemetry persists.
pub const DEFAULT_PERSIST_INTERVAL_SECS: u64 = 60;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub model_dir: PathBuf,
    pub vectorizer_file: String,
    /// A `.onnx` name selects the ONNX backend.
    pub tabular_model_file: String,
    pub tokenizer_file: String,
    pub sequence_model_file: String,
    pub sequence_length: usize,
    pub telemetry_path: PathBuf,
    pub persist_interval_secs: u64,
    pub response_window: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            vectorizer_file: "vectorizer.json".to_string(),
            tabular_model_file: "random_forest.json".to_string(),
            tokenizer_file: "tokenizer.json".to_string(),
            sequence_model_file: "lstm.onnx".to_string(),
            sequence_length: DEFAULT_SEQUENCE_LENGTH,
            telemetry_path: PathBuf::from("data/telemetry.json"),
            persist_interval_secs: DEFAULT_PERSIST_INTERVAL_SECS,
            response_window: DEFAULT_RESPONSE_WINDOW,
        }
    }
}

fn parse_positive<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialEq + Default,
{
    match value.trim().parse::<T>() {
        Ok(parsed) if parsed != T::default() => Ok(parsed),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

impl EngineConfig {
    /// Defaults overlaid with `PHISHGUARD_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Read a JSON config file; absent keys keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from `lookup`, keyed by environment variable name.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("PHISHGUARD_MODEL_DIR") {
            self.model_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("PHISHGUARD_VECTORIZER_FILE") {
            self.vectorizer_file = v;
        }
        if let Some(v) = lookup("PHISHGUARD_TABULAR_MODEL_FILE") {
            self.tabular_model_file = v;
        }
        if let Some(v) = lookup("PHISHGUARD_TOKENIZER_FILE") {
            self.tokenizer_file = v;
        }
        if let Some(v) = lookup("PHISHGUARD_SEQUENCE_MODEL_FILE") {
            self.sequence_model_file = v;
        }
        if let Some(v) = lookup("PHISHGUARD_SEQUENCE_LENGTH") {
            self.sequence_length = parse_positive("PHISHGUARD_SEQUENCE_LENGTH", &v)?;
        }
        if let Some(v) = lookup("PHISHGUARD_TELEMETRY_PATH") {
            self.telemetry_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("PHISHGUARD_PERSIST_INTERVAL_SECS") {
            self.persist_interval_secs = parse_positive("PHISHGUARD_PERSIST_INTERVAL_SECS", &v)?;
        }
        if let Some(v) = lookup("PHISHGUARD_RESPONSE_WINDOW") {
            self.response_window = parse_positive("PHISHGUARD_RESPONSE_WINDOW", &v)?;
        }
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let checks = [
            ("sequence_length", self.sequence_length as u64),
            ("persist_interval_secs", self.persist_interval_secs),
            ("response_window", self.response_window as u64),
        ];
        for (key, value) in checks {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: "0".to_string(),
                });
            }
        }
        if self.response_window > MAX_RESPONSE_WINDOW {
            return Err(ConfigError::InvalidValue {
                key: "response_window".to_string(),
                value: self.response_window.to_string(),
            });
        }
        Ok(())
    }

    pub fn vectorizer_path(&self) -> PathBuf {
        self.model_dir.join(&self.vectorizer_file)
    }

    pub fn tabular_model_path(&self) -> PathBuf {
        self.model_dir.join(&self.tabular_model_file)
    }

    pub fn tokenizer_path(&self) -> PathBuf {
        self.model_dir.join(&self.tokenizer_file)
    }

    pub fn sequence_model_path(&self) -> PathBuf {
        self.model_dir.join(&self.sequence_model_file)
    }

    pub fn telemetry(&self) -> TelemetryConfig {
        TelemetryConfig {
            path: self.telemetry_path.clone(),
            persist_interval: Duration::from_secs(self.persist_interval_secs),
            window_capacity: self.response_window,
        }
    }
}
