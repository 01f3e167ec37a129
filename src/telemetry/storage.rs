//! Persisted telemetry file.
//!
//! The file is one JSON object rewritten whole on every persist. Loading
//! is tolerant: a missing file, unparsable JSON, or a field of the wrong
//! shape falls back to the default for that field only.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::TelemetryError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedTelemetry {
    pub api_calls: u64,
    pub phishing_detections: u64,
    pub legitimate_detections: u64,
    pub average_response_time: f64,
    /// Serialized as RFC 3339 UTC.
    pub start_time: DateTime<Utc>,
}

impl PersistedTelemetry {
    pub fn zeroed(start_time: DateTime<Utc>) -> Self {
        Self {
            api_calls: 0,
            phishing_detections: 0,
            legitimate_detections: 0,
            average_response_time: 0.0,
            start_time,
        }
    }

    /// Read each known key independently, keeping `defaults` for any key
    /// that is absent or malformed.
    pub fn from_value(value: &Value, defaults: Self) -> Self {
        let count = |key: &str, default: u64| value.get(key).and_then(value_to_count).unwrap_or(default);

        Self {
            api_calls: count("api_calls", defaults.api_calls),
            phishing_detections: count("phishing_detections", defaults.phishing_detections),
            legitimate_detections: count("legitimate_detections", defaults.legitimate_detections),
            average_response_time: value
                .get("average_response_time")
                .and_then(value_to_float)
                .filter(|v| v.is_finite() && *v >= 0.0)
                .unwrap_or(defaults.average_response_time),
            start_time: value
                .get("start_time")
                .and_then(value_to_timestamp)
                .unwrap_or(defaults.start_time),
        }
    }
}

fn value_to_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0)
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn value_to_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// RFC 3339, or a naive ISO-8601 timestamp taken as UTC.
fn value_to_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    let text = value.as_str()?.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Location of the telemetry file.
#[derive(Debug, Clone)]
pub struct TelemetryStore {
    path: PathBuf,
}

impl TelemetryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the prior snapshot. Never fails; problems are logged and the
    /// affected fields come from `defaults`.
    pub fn load(&self, defaults: PersistedTelemetry) -> PersistedTelemetry {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("TELEMETRY_FRESH_START path={}", self.path.display());
                return defaults;
            }
            Err(e) => {
                log::warn!("TELEMETRY_LOAD_FAILED path={} error={}", self.path.display(), e);
                return defaults;
            }
        };

        match serde_json::from_str::<Value>(&text) {
            Ok(value @ Value::Object(_)) => {
                let loaded = PersistedTelemetry::from_value(&value, defaults);
                log::info!(
                    "TELEMETRY_LOADED path={} api_calls={}",
                    self.path.display(),
                    loaded.api_calls
                );
                loaded
            }
            Ok(_) => {
                log::warn!("TELEMETRY_LOAD_FAILED path={} error=not a JSON object", self.path.display());
                defaults
            }
            Err(e) => {
                log::warn!("TELEMETRY_LOAD_FAILED path={} error={}", self.path.display(), e);
                defaults
            }
        }
    }

    /// Write the whole record to a sibling temp file, then rename it over
    /// the target so readers never see a partial file.
    pub fn save(&self, record: &PersistedTelemetry) -> Result<(), TelemetryError> {
        let json = serde_json::to_string_pretty(record)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| TelemetryError::Io {
                path: parent.display().to_string(),
                source,
            })?;
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json).map_err(|source| TelemetryError::Io {
            path: tmp.display().to_string(),
            source,
        })?;
        fs::rename(&tmp, &self.path).map_err(|source| TelemetryError::Io {
            path: self.path.display().to_string(),
            source,
        })?;
        log::debug!(
            "TELEMETRY_SAVED path={} api_calls={}",
            self.path.display(),
            record.api_calls
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn epoch() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-02-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = TelemetryStore::new(dir.path().join("absent.json"));
        assert_eq!(store.load(PersistedTelemetry::zeroed(epoch())), PersistedTelemetry::zeroed(epoch()));
    }

    #[test]
    fn test_corrupt_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("telemetry.json");
        fs::write(&path, "{not json").unwrap();
        let store = TelemetryStore::new(&path);
        assert_eq!(store.load(PersistedTelemetry::zeroed(epoch())), PersistedTelemetry::zeroed(epoch()));

        fs::write(&path, "[1, 2, 3]").unwrap();
        assert_eq!(store.load(PersistedTelemetry::zeroed(epoch())).api_calls, 0);
    }

    #[test]
    fn test_per_field_fallback() {
        let value = json!({
            "api_calls": 12,
            "phishing_detections": "4",
            "legitimate_detections": -3,
            "average_response_time": "fast",
            "start_time": "2025-12-31T08:30:00.250000"
        });
        let loaded = PersistedTelemetry::from_value(&value, PersistedTelemetry::zeroed(epoch()));
        assert_eq!(loaded.api_calls, 12);
        assert_eq!(loaded.phishing_detections, 4);
        assert_eq!(loaded.legitimate_detections, 0);
        assert_eq!(loaded.average_response_time, 0.0);
        assert_eq!(loaded.start_time.to_rfc3339(), "2025-12-31T08:30:00.250+00:00");
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = TelemetryStore::new(dir.path().join("nested/data/telemetry.json"));
        let record = PersistedTelemetry {
            api_calls: 9,
            phishing_detections: 2,
            legitimate_detections: 7,
            average_response_time: 41.5,
            start_time: epoch(),
        };

        store.save(&record).unwrap();
        assert!(!store.path().with_extension("tmp").exists());

        let raw: Value = serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(raw["start_time"], "2026-02-01T00:00:00Z");

        let loaded = store.load(PersistedTelemetry::zeroed(Utc::now()));
        assert_eq!(loaded, record);
    }
}
