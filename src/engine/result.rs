//! Detection result.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::scoring::label::Prediction;

/// Which decision path produced the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelUsed {
    Fallback,
    RandomForest,
    Lstm,
    Ensemble,
}

impl ModelUsed {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelUsed::Fallback => "fallback",
            ModelUsed::RandomForest => "random_forest",
            ModelUsed::Lstm => "lstm",
            ModelUsed::Ensemble => "ensemble",
        }
    }
}

/// A processing stage that ran during a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    UrlAnalysis,
    ContentAnalysis,
    TextPatterns,
    SequentialPatterns,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::UrlAnalysis => "url_analysis",
            Stage::ContentAnalysis => "content_analysis",
            Stage::TextPatterns => "text_patterns",
            Stage::SequentialPatterns => "sequential_patterns",
        }
    }
}

/// Outcome of one prediction call, owned by the caller once returned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionResult {
    pub prediction: Prediction,
    pub confidence: f64,
    pub scan_id: String,
    pub scan_time: DateTime<Utc>,
    /// Stages in the order they ran.
    pub features_analyzed: Vec<Stage>,
    pub model_used: ModelUsed,
}

impl DetectionResult {
    pub fn is_phishing(&self) -> bool {
        self.prediction.is_phishing()
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.features_analyzed.iter().map(Stage::as_str).collect()
    }
}
