//! Phishing detector.
//!
//! Runs one scan end to end:
//! 1. URL and content feature extraction
//! 2. Tabular and sequence model attempts (independent)
//! 3. Ensemble vote, single-model adoption, or rule-based fallback
//! 4. Result assembly with the stages that actually ran

use serde::Serialize;

use crate::config::EngineConfig;
use crate::features::{extract_content_features, extract_url_features};
use crate::{log_debug, log_info, log_warn};
use crate::models::adapter::{ModelAdapter, ModelInfo, ModelVerdict};
use crate::models::sequence::SequenceAdapter;
use crate::models::tabular::TabularAdapter;
use crate::scoring::rules;

use super::context::ScanContext;
use super::ensemble::EnsembleWeights;
use super::result::{DetectionResult, ModelUsed, Stage};

/// Version reported by health checks.
pub const MODEL_VERSION: &str = "1.0.0";

/// Health report for the detector and its models.
#[derive(Debug, Clone, Serialize)]
pub struct DetectorStatus {
    pub model_version: &'static str,
    pub models: Vec<ModelInfo>,
    /// True when every prediction will take the rule-based path.
    pub fallback_only: bool,
}

pub struct PhishingDetector {
    tabular: Box<dyn ModelAdapter>,
    sequence: Box<dyn ModelAdapter>,
    weights: EnsembleWeights,
}

/// Drop empty and whitespace-only inputs.
fn present(input: Option<&str>) -> Option<&str> {
    input.map(str::trim).filter(|s| !s.is_empty())
}

impl PhishingDetector {
    pub fn new(tabular: Box<dyn ModelAdapter>, sequence: Box<dyn ModelAdapter>) -> Self {
        Self {
            tabular,
            sequence,
            weights: EnsembleWeights::default(),
        }
    }

    /// Detector with no learned models; every scan uses the rules.
    pub fn rule_based_only() -> Self {
        Self::new(
            Box::new(TabularAdapter::unavailable("not configured")),
            Box::new(SequenceAdapter::unavailable("not configured")),
        )
    }

    /// Load whatever artifacts the config points at. Missing or broken
    /// artifacts leave that adapter unavailable; this never fails.
    pub fn from_config(config: &EngineConfig) -> Self {
        let tabular = TabularAdapter::load(&config.vectorizer_path(), &config.tabular_model_path());
        let sequence = SequenceAdapter::load(
            &config.tokenizer_path(),
            &config.sequence_model_path(),
            config.sequence_length,
        );
        let detector = Self::new(Box::new(tabular), Box::new(sequence));
        log::info!(
            "DETECTOR_READY tabular={} sequence={}",
            detector.tabular.is_available(),
            detector.sequence.is_available()
        );
        detector
    }

    pub fn with_weights(mut self, weights: EnsembleWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Classify a URL and/or message body.
    ///
    /// Always produces a result. Model failures fall through to the next
    /// rung of the ladder; with no input at all the neutral fallback is
    /// returned.
    pub fn predict(&self, content: Option<&str>, url: Option<&str>) -> DetectionResult {
        let scan = ScanContext::new();
        let ctx = scan.log_context();
        let content = present(content);
        let url = present(url);

        if content.is_none() && url.is_none() {
            log_warn!(ctx, "EMPTY_SUBMISSION", reason = "neither url nor content supplied");
        }

        let mut stages = Vec::with_capacity(4);

        let url_features = url.map(|u| {
            stages.push(Stage::UrlAnalysis);
            extract_url_features(u)
        });
        let content_features = content.map(|c| {
            stages.push(Stage::ContentAnalysis);
            extract_content_features(c)
        });

        let tabular = self.tabular.try_predict(url, content, &ctx);
        if tabular.is_some() {
            stages.push(Stage::TextPatterns);
        }
        let sequence = self.sequence.try_predict(url, content, &ctx);
        if sequence.is_some() {
            stages.push(Stage::SequentialPatterns);
        }

        let (prediction, confidence, model_used) = match (tabular, sequence) {
            (Some(t), Some(s)) => {
                let vote = self.weights.combine(&t, &s);
                (vote.prediction, vote.confidence, ModelUsed::Ensemble)
            }
            (Some(ModelVerdict { prediction, probability }), None) => {
                (prediction, probability, ModelUsed::RandomForest)
            }
            (None, Some(ModelVerdict { prediction, probability })) => {
                (prediction, probability, ModelUsed::Lstm)
            }
            (None, None) => {
                let fallback = rules::score(url_features.as_ref(), content_features.as_ref());
                if !fallback.triggered.is_empty() {
                    log_debug!(ctx, "RULES_TRIGGERED", rules = fallback.triggered);
                }
                (fallback.prediction, fallback.confidence, ModelUsed::Fallback)
            }
        };

        log_info!(
            ctx,
            "SCAN_COMPLETE",
            prediction = prediction.as_str(),
            confidence = confidence,
            model_used = model_used.as_str()
        );

        DetectionResult {
            prediction,
            confidence: confidence.clamp(0.0, 1.0),
            scan_id: scan.scan_id,
            scan_time: scan.scan_time,
            features_analyzed: stages,
            model_used,
        }
    }

    pub fn status(&self) -> DetectorStatus {
        DetectorStatus {
            model_version: MODEL_VERSION,
            models: vec![self.tabular.info(), self.sequence.info()],
            fallback_only: !self.tabular.is_available() && !self.sequence.is_available(),
        }
    }
}

impl Default for PhishingDetector {
    fn default() -> Self {
        Self::rule_based_only()
    }
}
