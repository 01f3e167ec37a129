//! Weighted ensemble vote.
//!
//! Combines the tabular and sequence verdicts when both models answered.
//! Labels are coded phishing = 1, legitimate = 0; the weighted label score
//! decides the label and the same weights average the confidences.

use serde::{Deserialize, Serialize};

use crate::models::adapter::ModelVerdict;
use crate::scoring::label::Prediction;

pub const TABULAR_WEIGHT: f64 = 0.6;
pub const SEQUENCE_WEIGHT: f64 = 0.4;

/// Weighted label score at or above which the ensemble says phishing.
pub const VOTE_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnsembleWeights {
    pub tabular: f64,
    pub sequence: f64,
    pub vote_threshold: f64,
}

impl Default for EnsembleWeights {
    fn default() -> Self {
        Self {
            tabular: TABULAR_WEIGHT,
            sequence: SEQUENCE_WEIGHT,
            vote_threshold: VOTE_THRESHOLD,
        }
    }
}

/// Ensemble decision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EnsembleVote {
    pub prediction: Prediction,
    pub confidence: f64,
    pub label_score: f64,
}

impl EnsembleWeights {
    pub fn combine(&self, tabular: &ModelVerdict, sequence: &ModelVerdict) -> EnsembleVote {
        let label_score = tabular.prediction.as_binary() * self.tabular
            + sequence.prediction.as_binary() * self.sequence;
        let confidence = tabular.probability * self.tabular + sequence.probability * self.sequence;
        let prediction = if label_score >= self.vote_threshold {
            Prediction::Phishing
        } else {
            Prediction::Legitimate
        };

        EnsembleVote {
            prediction,
            confidence: confidence.clamp(0.0, 1.0),
            label_score,
        }
    }
}
