//! PhishGuard Core - phishing detection engine and request telemetry
//!
//! Classifies a submitted URL and/or message body as phishing or
//! legitimate. The implementation prioritizes:
//!
//! 1. **Availability** - a result is always produced; learned models are
//!    optional and the rule-based scorer is the last rung of the ladder
//! 2. **Logging** - every decision logged with its scan id, never the
//!    raw submission
//! 3. **Concurrency** - prediction is read-only; telemetry is the only
//!    shared mutable state and sits behind one lock
//!
//! ## Architecture
//!
//! The crate is organized into modules:
//! - `features` - URL and content feature extraction
//! - `scoring` - labels and the weighted rule-based scorer
//! - `models` - tabular and sequence model adapters
//! - `engine` - detector, ensemble vote and detection results
//! - `telemetry` - rolling statistics and crash-safe persistence
//! - `config` - engine configuration from defaults, env or JSON
//! - `logging` - structured logging with scan context
//!
//! Python bindings live behind the `python` feature.

pub mod config;
pub mod engine;
pub mod error;
pub mod features;
pub mod logging;
pub mod models;
pub mod scoring;
pub mod telemetry;

#[cfg(feature = "python")]
mod python;

pub use config::EngineConfig;
pub use engine::{DetectionResult, DetectorStatus, ModelUsed, PhishingDetector, Stage, MODEL_VERSION};
pub use error::{ConfigError, ModelError, TelemetryError};
pub use scoring::Prediction;
pub use telemetry::{TelemetryAggregator, TelemetryConfig, TelemetrySnapshot};

/// Install the process logger: millisecond timestamps, Info by default,
/// `RUST_LOG` overrides. Safe to call more than once.
pub fn init_logger() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .try_init();
}
