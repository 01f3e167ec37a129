//! ONNX Runtime classifier backend.
//!
//! Runs an exported classifier with a single `[1, width]` float input.
//! When the graph has several outputs (label + probabilities), the last
//! one is read. A single value is taken as the phishing probability; a
//! wider row is read as per-class probabilities with phishing at index 1.

use std::path::Path;

use ndarray::Array2;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;
use parking_lot::Mutex;

use crate::error::ModelError;

use super::artifact::{read_artifact, ArtifactFingerprint};
use super::sequence::SequenceClassifier;
use super::tabular::TabularClassifier;

pub struct OnnxClassifier {
    // Session::run needs exclusive access.
    session: Mutex<Session>,
    output_name: String,
}

impl OnnxClassifier {
    pub fn load(path: &Path) -> Result<(Self, ArtifactFingerprint), ModelError> {
        let (bytes, fingerprint) = read_artifact(path)?;

        let session = Session::builder()
            .map_err(|e| ModelError::Backend(format!("session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| ModelError::Backend(format!("optimization level: {}", e)))?
            .commit_from_memory(&bytes)
            .map_err(|e| ModelError::Backend(format!("load model: {}", e)))?;

        let output_name = session
            .outputs
            .last()
            .map(|o| o.name.clone())
            .ok_or_else(|| ModelError::InvalidArtifact("model defines no outputs".into()))?;

        log::info!(
            "ONNX_SESSION_READY path={} output={}",
            fingerprint.path,
            output_name
        );

        Ok((
            Self {
                session: Mutex::new(session),
                output_name,
            },
            fingerprint,
        ))
    }

    fn run(&self, row: Vec<f32>) -> Result<f64, ModelError> {
        let width = row.len();
        let input = Array2::<f32>::from_shape_vec((1, width), row)
            .map_err(|e| ModelError::Backend(format!("input array: {}", e)))?;
        let input_tensor = Value::from_array(input)
            .map_err(|e| ModelError::Backend(format!("input tensor: {}", e)))?;

        let mut session = self.session.lock();
        let outputs = session
            .run(ort::inputs![input_tensor])
            .map_err(|e| ModelError::Backend(format!("inference: {}", e)))?;
        let output = outputs
            .get(&self.output_name)
            .ok_or_else(|| ModelError::InvalidOutput(format!("missing {}", self.output_name)))?;
        let (_, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| ModelError::InvalidOutput(format!("extract: {}", e)))?;

        phishing_probability_from_output(data)
    }
}

/// Interpret a classifier's output row.
pub fn phishing_probability_from_output(data: &[f32]) -> Result<f64, ModelError> {
    match data {
        [] => Err(ModelError::InvalidOutput("empty output".into())),
        [p] => Ok(*p as f64),
        [_, p, ..] => Ok(*p as f64),
    }
}

impl TabularClassifier for OnnxClassifier {
    fn backend(&self) -> &'static str {
        "onnx"
    }

    fn expected_width(&self) -> Option<usize> {
        None
    }

    fn phishing_probability(&self, features: &[f32]) -> Result<f64, ModelError> {
        self.run(features.to_vec())
    }
}

impl SequenceClassifier for OnnxClassifier {
    fn backend(&self) -> &'static str {
        "onnx"
    }

    fn phishing_probability(&self, sequence: &[i64]) -> Result<f64, ModelError> {
        self.run(sequence.iter().map(|id| *id as f32).collect())
    }
}
