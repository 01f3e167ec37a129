//! Tabular model adapter (TF-IDF vectorizer + random forest).

use std::path::Path;

use crate::error::ModelError;
use crate::logging::structured::LogContext;
use crate::{log_info, log_warn};

use super::adapter::{model_text, ModelAdapter, ModelInfo, ModelState, ModelVerdict};
use super::artifact::ArtifactFingerprint;
use super::forest::RandomForest;
use super::vectorizer::TfidfVectorizer;

/// Name reported when the tabular model decides alone.
pub const TABULAR_MODEL_NAME: &str = "random_forest";

/// A classifier over a dense feature row.
pub trait TabularClassifier: Send + Sync {
    fn backend(&self) -> &'static str;

    /// Row width the classifier was trained on, when it is known.
    fn expected_width(&self) -> Option<usize>;

    /// Probability of the phishing class for one row.
    fn phishing_probability(&self, features: &[f32]) -> Result<f64, ModelError>;
}

/// Loaded vectorizer + classifier pair.
pub struct TabularModel {
    vectorizer: TfidfVectorizer,
    classifier: Box<dyn TabularClassifier>,
    artifacts: Vec<ArtifactFingerprint>,
}

impl TabularModel {
    fn predict(&self, text: &str) -> Result<ModelVerdict, ModelError> {
        let row = self.vectorizer.transform(text);
        let p = self.classifier.phishing_probability(&row)?;
        ModelVerdict::from_phishing_probability(p)
    }
}

/// Adapter over an optional tabular model.
pub struct TabularAdapter {
    state: ModelState<TabularModel>,
}

impl TabularAdapter {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            state: ModelState::unavailable(reason),
        }
    }

    /// Assemble an adapter from an already loaded vectorizer and classifier.
    ///
    /// A width disagreement between the two makes the adapter unavailable.
    pub fn from_parts(vectorizer: TfidfVectorizer, classifier: Box<dyn TabularClassifier>) -> Self {
        Self::assemble(vectorizer, classifier, Vec::new())
    }

    fn assemble(
        vectorizer: TfidfVectorizer,
        classifier: Box<dyn TabularClassifier>,
        artifacts: Vec<ArtifactFingerprint>,
    ) -> Self {
        if let Some(expected) = classifier.expected_width() {
            if expected != vectorizer.width() {
                let reason = format!(
                    "vectorizer emits {} columns but classifier expects {}",
                    vectorizer.width(),
                    expected
                );
                log::warn!("MODEL_UNAVAILABLE model={} reason={}", TABULAR_MODEL_NAME, reason);
                return Self::unavailable(reason);
            }
        }
        Self {
            state: ModelState::Available(TabularModel {
                vectorizer,
                classifier,
                artifacts,
            }),
        }
    }

    /// Load the vectorizer and classifier artifacts.
    ///
    /// Never fails: any load error is logged and the adapter reports
    /// itself unavailable. A `.onnx` classifier path selects the ONNX
    /// backend.
    pub fn load(vectorizer_path: &Path, model_path: &Path) -> Self {
        match Self::try_load(vectorizer_path, model_path) {
            Ok(adapter) => adapter,
            Err(e) => {
                log::warn!("MODEL_UNAVAILABLE model={} reason={}", TABULAR_MODEL_NAME, e);
                Self::unavailable(e.to_string())
            }
        }
    }

    fn try_load(vectorizer_path: &Path, model_path: &Path) -> Result<Self, ModelError> {
        let (vectorizer, vectorizer_print) = TfidfVectorizer::load(vectorizer_path)?;
        let (classifier, model_print) = load_classifier(model_path)?;

        log::info!(
            "MODEL_LOADED model={} backend={} columns={} vectorizer_sha256={} model_sha256={}",
            TABULAR_MODEL_NAME,
            classifier.backend(),
            vectorizer.width(),
            vectorizer_print.sha256,
            model_print.sha256
        );

        Ok(Self::assemble(
            vectorizer,
            classifier,
            vec![vectorizer_print, model_print],
        ))
    }
}

fn is_onnx(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("onnx"))
        .unwrap_or(false)
}

#[cfg(feature = "onnx")]
fn load_classifier(
    path: &Path,
) -> Result<(Box<dyn TabularClassifier>, ArtifactFingerprint), ModelError> {
    if is_onnx(path) {
        let (classifier, fingerprint) = super::onnx::OnnxClassifier::load(path)?;
        return Ok((Box::new(classifier), fingerprint));
    }
    let (forest, fingerprint) = RandomForest::load(path)?;
    Ok((Box::new(forest), fingerprint))
}

#[cfg(not(feature = "onnx"))]
fn load_classifier(
    path: &Path,
) -> Result<(Box<dyn TabularClassifier>, ArtifactFingerprint), ModelError> {
    if is_onnx(path) {
        return Err(ModelError::BackendUnavailable(
            "onnx support not compiled in".into(),
        ));
    }
    let (forest, fingerprint) = RandomForest::load(path)?;
    Ok((Box::new(forest), fingerprint))
}

impl ModelAdapter for TabularAdapter {
    fn name(&self) -> &'static str {
        TABULAR_MODEL_NAME
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
        let ctx = ctx.with_stage("text_patterns");

        match model.predict(&text) {
            Ok(verdict) => {
                log_info!(
                    ctx,
                    "MODEL_PREDICTED",
                    model = TABULAR_MODEL_NAME,
                    prediction = verdict.prediction.as_str(),
                    probability = verdict.probability,
                );
                Some(verdict)
            }
            Err(e) => {
                log_warn!(
                    ctx,
                    "MODEL_PREDICT_FAILED",
                    model = TABULAR_MODEL_NAME,
                    error = e.to_string(),
                );
                None
            }
        }
    }

    fn info(&self) -> ModelInfo {
        match &self.state {
            ModelState::Unavailable { reason } => ModelInfo {
                name: TABULAR_MODEL_NAME,
                available: false,
                backend: None,
                reason: Some(reason.clone()),
                artifacts: Vec::new(),
            },
            ModelState::Available(model) => ModelInfo {
                name: TABULAR_MODEL_NAME,
                available: true,
                backend: Some(model.classifier.backend()),
                reason: None,
                artifacts: model.artifacts.clone(),
            },
        }
    }
}
