//! Sequence model adapter (word tokenizer + LSTM classifier).

use std::path::Path;

use crate::error::ModelError;
use crate::logging::structured::LogContext;
use crate::{log_info, log_warn};

use super::adapter::{model_text, ModelAdapter, ModelInfo, ModelState, ModelVerdict};
use super::artifact::ArtifactFingerprint;
use super::tokenizer::WordTokenizer;

/// Name reported when the sequence model decides alone.
pub const SEQUENCE_MODEL_NAME: &str = "lstm";

/// A classifier over a fixed-length id sequence.
pub trait SequenceClassifier: Send + Sync {
    fn backend(&self) -> &'static str;

    /// Probability of the phishing class for one padded sequence.
    fn phishing_probability(&self, sequence: &[i64]) -> Result<f64, ModelError>;
}

/// Loaded tokenizer + classifier pair.
pub struct SequenceModel {
    tokenizer: WordTokenizer,
    classifier: Box<dyn SequenceClassifier>,
    sequence_length: usize,
    artifacts: Vec<ArtifactFingerprint>,
}

impl SequenceModel {
    fn predict(&self, text: &str) -> Result<ModelVerdict, ModelError> {
        let sequence = self.tokenizer.encode(text, self.sequence_length);
        let p = self.classifier.phishing_probability(&sequence)?;
        ModelVerdict::from_phishing_probability(p)
    }
}

/// Adapter over an optional sequence model.
pub struct SequenceAdapter {
    state: ModelState<SequenceModel>,
}

impl SequenceAdapter {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            state: ModelState::unavailable(reason),
        }
    }

    pub fn from_parts(
        tokenizer: WordTokenizer,
        classifier: Box<dyn SequenceClassifier>,
        sequence_length: usize,
    ) -> Self {
        if sequence_length == 0 {
            return Self::unavailable("sequence length must be positive");
        }
        Self {
            state: ModelState::Available(SequenceModel {
                tokenizer,
                classifier,
                sequence_length,
                artifacts: Vec::new(),
            }),
        }
    }

    /// Load the tokenizer and the ONNX sequence classifier.
    ///
    /// Never fails: any load error is logged and the adapter reports
    /// itself unavailable.
    pub fn load(tokenizer_path: &Path, model_path: &Path, sequence_length: usize) -> Self {
        match Self::try_load(tokenizer_path, model_path, sequence_length) {
            Ok(adapter) => adapter,
            Err(e) => {
                log::warn!("MODEL_UNAVAILABLE model={} reason={}", SEQUENCE_MODEL_NAME, e);
                Self::unavailable(e.to_string())
            }
        }
    }

    fn try_load(
        tokenizer_path: &Path,
        model_path: &Path,
        sequence_length: usize,
    ) -> Result<Self, ModelError> {
        let (classifier, model_print) = load_classifier(model_path)?;
        let (tokenizer, tokenizer_print) = WordTokenizer::load(tokenizer_path)?;

        log::info!(
            "MODEL_LOADED model={} backend={} vocabulary={} sequence_length={} tokenizer_sha256={} model_sha256={}",
            SEQUENCE_MODEL_NAME,
            classifier.backend(),
            tokenizer.vocabulary_size(),
            sequence_length,
            tokenizer_print.sha256,
            model_print.sha256
        );

        let mut adapter = Self::from_parts(tokenizer, classifier, sequence_length);
        if let ModelState::Available(model) = &mut adapter.state {
            model.artifacts = vec![tokenizer_print, model_print];
        }
        Ok(adapter)
    }
}

#[cfg(feature = "onnx")]
fn load_classifier(
    path: &Path,
) -> Result<(Box<dyn SequenceClassifier>, ArtifactFingerprint), ModelError> {
    let (classifier, fingerprint) = super::onnx::OnnxClassifier::load(path)?;
    Ok((Box::new(classifier), fingerprint))
}

#[cfg(not(feature = "onnx"))]
fn load_classifier(
    _path: &Path,
) -> Result<(Box<dyn SequenceClassifier>, ArtifactFingerprint), ModelError> {
    Err(ModelError::BackendUnavailable(
        "onnx support not compiled in".into(),
    ))
}

impl ModelAdapter for SequenceAdapter {
    fn name(&self) -> &'static str {
        SEQUENCE_MODEL_NAME
    }

    fn is_available(&self) -> bool {
        self.state.is_available()
    }

    fn try_predict(
        &self,
        url: Option<&str>,
        content: Option<&str>,
        ctx: &LogContext,
    ) -> Option<ModelVerdict> {
        let model = match &self.state {
            ModelState::Unavailable { .. } => return None,
            ModelState::Available(model) => model,
        };
        let text = model_text(url, content)?;
        let ctx = ctx.with_stage("sequential_patterns");

        match model.predict(&text) {
            Ok(verdict) => {
                log_info!(
                    ctx,
                    "MODEL_PREDICTED",
                    model = SEQUENCE_MODEL_NAME,
                    prediction = verdict.prediction.as_str(),
                    probability = verdict.probability,
                );
                Some(verdict)
            }
            Err(e) => {
                log_warn!(
                    ctx,
                    "MODEL_PREDICT_FAILED",
                    model = SEQUENCE_MODEL_NAME,
                    error = e.to_string(),
                );
                None
            }
        }
    }

    fn info(&self) -> ModelInfo {
        match &self.state {
            ModelState::Unavailable { reason } => ModelInfo {
                name: SEQUENCE_MODEL_NAME,
                available: false,
                backend: None,
                reason: Some(reason.clone()),
                artifacts: Vec::new(),
            },
            ModelState::Available(model) => ModelInfo {
                name: SEQUENCE_MODEL_NAME,
                available: true,
                backend: Some(model.classifier.backend()),
                reason: None,
                artifacts: model.artifacts.clone(),
            },
        }
    }
}
