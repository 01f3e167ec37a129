//! Shared adapter contract.

use serde::Serialize;

use crate::error::ModelError;
use crate::logging::structured::LogContext;
use crate::scoring::label::Prediction;

use super::artifact::ArtifactFingerprint;

/// Availability of a model, decided once at construction.
#[derive(Debug)]
pub enum ModelState<H> {
    Unavailable { reason: String },
    Available(H),
}

impl<H> ModelState<H> {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        ModelState::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, ModelState::Available(_))
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            ModelState::Unavailable { reason } => Some(reason),
            ModelState::Available(_) => None,
        }
    }
}

/// A model's answer for one submission.
///
/// `probability` is the model's probability for `prediction`, so it is
/// always at least 0.5.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModelVerdict {
    pub prediction: Prediction,
    pub probability: f64,
}

impl ModelVerdict {
    /// Build a verdict from the probability of the phishing class.
    pub fn from_phishing_probability(p: f64) -> Result<Self, ModelError> {
        if !p.is_finite() || !(0.0..=1.0).contains(&p) {
            return Err(ModelError::InvalidOutput(format!(
                "probability out of range: {}",
                p
            )));
        }
        Ok(if p >= 0.5 {
            ModelVerdict {
                prediction: Prediction::Phishing,
                probability: p,
            }
        } else {
            ModelVerdict {
                prediction: Prediction::Legitimate,
                probability: 1.0 - p,
            }
        })
    }
}

/// Status of one adapter, for health reporting.
#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub name: &'static str,
    pub available: bool,
    pub backend: Option<&'static str>,
    pub reason: Option<String>,
    pub artifacts: Vec<ArtifactFingerprint>,
}

/// Uniform contract over the learned models.
///
/// Implementations are read-only after construction, so one instance can
/// serve concurrent predictions.
pub trait ModelAdapter: Send + Sync {
    /// Name reported as `model_used` when this adapter decides alone.
    fn name(&self) -> &'static str;

    fn is_available(&self) -> bool;

    /// Predict, or return `None` when the model is unavailable or fails
    /// on this input. Never panics on malformed input.
    fn try_predict(
        &self,
        url: Option<&str>,
        content: Option<&str>,
        ctx: &LogContext,
    ) -> Option<ModelVerdict>;

    fn info(&self) -> ModelInfo;
}

/// Join the supplied inputs into the single text the models were trained on.
pub fn model_text(url: Option<&str>, content: Option<&str>) -> Option<String> {
    match (url, content) {
        (Some(u), Some(c)) => Some(format!("{} {}", u, c)),
        (Some(u), None) => Some(u.to_string()),
        (None, Some(c)) => Some(c.to_string()),
        (None, None) => None,
    }
}
