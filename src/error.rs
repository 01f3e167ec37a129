//! Error types.
//!
//! None of these abort a prediction: model errors downgrade an adapter
//! to "unavailable", telemetry errors are logged by the aggregator.

use thiserror::Error;

/// Loading or running a model artifact failed.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("artifact io error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("artifact parse error at {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid artifact: {0}")]
    InvalidArtifact(String),

    #[error("input shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("invalid model output: {0}")]
    InvalidOutput(String),

    #[error("inference backend error: {0}")]
    Backend(String),

    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),
}

/// Reading or writing the persisted telemetry record failed.
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("telemetry io error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("telemetry serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Engine configuration could not be built.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },

    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
