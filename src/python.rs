//! Python bindings.
//!
//! `PhishingEngine` owns one detector and one telemetry aggregator, so the
//! web layer can classify and collect statistics in-process.

use std::path::PathBuf;
use std::time::Instant;

use pyo3::exceptions::{PyIOError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};

use crate::config::EngineConfig;
use crate::engine::detector::PhishingDetector;
use crate::error::{ConfigError, TelemetryError};
use crate::init_logger;
use crate::telemetry::aggregator::TelemetryAggregator;

fn config_err(e: ConfigError) -> PyErr {
    PyValueError::new_err(e.to_string())
}

fn telemetry_err(e: TelemetryError) -> PyErr {
    PyIOError::new_err(e.to_string())
}

#[pyclass(name = "PhishingEngine")]
pub struct PhishingEngine {
    detector: PhishingDetector,
    telemetry: TelemetryAggregator,
}

#[pymethods]
impl PhishingEngine {
    /// Build the engine from a JSON config file, or from `PHISHGUARD_*`
    /// environment variables when no path is given.
    #[new]
    #[pyo3(signature = (config_path=None))]
    fn new(config_path: Option<PathBuf>) -> PyResult<Self> {
        init_logger();
        let config = match config_path {
            Some(path) => EngineConfig::from_json_file(&path).map_err(config_err)?,
            None => EngineConfig::from_env().map_err(config_err)?,
        };
        Ok(Self {
            detector: PhishingDetector::from_config(&config),
            telemetry: TelemetryAggregator::start(config.telemetry()),
        })
    }

    /// Classify a message body and/or URL. The call is timed and recorded
    /// in telemetry.
    #[pyo3(signature = (content=None, url=None))]
    fn predict(
        &self,
        py: Python<'_>,
        content: Option<String>,
        url: Option<String>,
    ) -> PyResult<Py<PyAny>> {
        let detector = &self.detector;
        let started = Instant::now();
        let result = py.allow_threads(|| detector.predict(content.as_deref(), url.as_deref()));
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        self.telemetry.record(&result, elapsed_ms);

        let dict = PyDict::new(py);
        dict.set_item("prediction", result.prediction.as_str())?;
        dict.set_item("confidence", result.confidence)?;
        dict.set_item("scan_id", &result.scan_id)?;
        dict.set_item("scan_time", result.scan_time.to_rfc3339())?;
        dict.set_item("features_analyzed", PyList::new(py, result.stage_names()))?;
        dict.set_item("model_used", result.model_used.as_str())?;
        dict.set_item("response_time_ms", elapsed_ms)?;
        Ok(dict.into())
    }

    fn statistics(&self, py: Python<'_>) -> PyResult<Py<PyAny>> {
        let snap = self.telemetry.snapshot();
        let dict = PyDict::new(py);
        dict.set_item("api_calls", snap.api_calls)?;
        dict.set_item("phishing_detections", snap.phishing_detections)?;
        dict.set_item("legitimate_detections", snap.legitimate_detections)?;
        dict.set_item("average_response_time", snap.average_response_time)?;
        dict.set_item("start_time", snap.start_time.to_rfc3339())?;
        dict.set_item("phishing_percentage", snap.phishing_percentage)?;
        dict.set_item("uptime_seconds", snap.uptime_seconds)?;
        dict.set_item("uptime_hours", snap.uptime_hours)?;
        dict.set_item("response_samples", snap.response_samples)?;
        Ok(dict.into())
    }

    fn status(&self, py: Python<'_>) -> PyResult<Py<PyAny>> {
        let status = self.detector.status();
        let dict = PyDict::new(py);
        dict.set_item("model_version", status.model_version)?;
        dict.set_item("fallback_only", status.fallback_only)?;

        let models = PyList::empty(py);
        for info in status.models {
            let model = PyDict::new(py);
            model.set_item("name", info.name)?;
            model.set_item("available", info.available)?;
            model.set_item("backend", info.backend)?;
            model.set_item("reason", info.reason)?;
            let artifacts = PyList::empty(py);
            for artifact in info.artifacts {
                let entry = PyDict::new(py);
                entry.set_item("path", artifact.path)?;
                entry.set_item("sha256", artifact.sha256)?;
                artifacts.append(entry)?;
            }
            model.set_item("artifacts", artifacts)?;
            models.append(model)?;
        }
        dict.set_item("models", models)?;
        Ok(dict.into())
    }

    /// Stop background persistence and write telemetry one last time.
    fn shutdown(&self, py: Python<'_>) -> PyResult<()> {
        let telemetry = &self.telemetry;
        py.allow_threads(|| telemetry.shutdown()).map_err(telemetry_err)
    }
}

/// Python module definition
#[pymodule]
fn phishguard_core(_py: Python<'_>, m: &PyModule) -> PyResult<()> {
    m.add_class::<PhishingEngine>()?;
    m.add("MODEL_VERSION", crate::engine::detector::MODEL_VERSION)?;
    Ok(())
}
