//! TF-IDF text vectorizer.
//!
//! Loads the JSON export of a fitted word-level TF-IDF vectorizer and
//! reproduces its transform: `\b\w\w+\b` tokens, optional lowercasing,
//! word n-grams, optional sublinear tf, then l1/l2 row normalization.

use std::collections::HashMap;
use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;

use crate::error::ModelError;

use super::artifact::{load_json, ArtifactFingerprint};

lazy_static! {
    /// Default scikit-learn token pattern
    static ref TOKEN_PATTERN: Regex = Regex::new(r"\b\w\w+\b").unwrap();
}

fn default_true() -> bool {
    true
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

fn default_norm() -> Option<String> {
    Some("l2".to_string())
}

/// On-disk form of the vectorizer.
#[derive(Debug, Clone, Deserialize)]
pub struct VectorizerSpec {
    pub vocabulary: HashMap<String, usize>,
    pub idf: Vec<f64>,
    #[serde(default = "default_true")]
    pub lowercase: bool,
    #[serde(default = "default_ngram_range")]
    pub ngram_range: (usize, usize),
    #[serde(default)]
    pub sublinear_tf: bool,
    #[serde(default = "default_norm")]
    pub norm: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Norm {
    L1,
    L2,
    None,
}

/// A fitted TF-IDF vectorizer.
#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    lowercase: bool,
    ngram_range: (usize, usize),
    sublinear_tf: bool,
    norm: Norm,
}

impl TfidfVectorizer {
    pub fn from_spec(spec: VectorizerSpec) -> Result<Self, ModelError> {
        let width = spec.idf.len();
        if width == 0 {
            return Err(ModelError::InvalidArtifact("vectorizer has empty idf".into()));
        }
        if let Some((term, &index)) = spec.vocabulary.iter().find(|(_, index)| **index >= width) {
            return Err(ModelError::InvalidArtifact(format!(
                "vocabulary term {:?} maps to column {} but idf has {} entries",
                term, index, width
            )));
        }
        let (min_n, max_n) = spec.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(ModelError::InvalidArtifact(format!(
                "invalid ngram_range ({}, {})",
                min_n, max_n
            )));
        }
        let norm = match spec.norm.as_deref() {
            Some("l2") => Norm::L2,
            Some("l1") => Norm::L1,
            None | Some("none") => Norm::None,
            Some(other) => {
                return Err(ModelError::InvalidArtifact(format!(
                    "unsupported norm {:?}",
                    other
                )))
            }
        };

        Ok(Self {
            vocabulary: spec.vocabulary,
            idf: spec.idf,
            lowercase: spec.lowercase,
            ngram_range: spec.ngram_range,
            sublinear_tf: spec.sublinear_tf,
            norm,
        })
    }

    pub fn load(path: &Path) -> Result<(Self, ArtifactFingerprint), ModelError> {
        let (spec, fingerprint) = load_json::<VectorizerSpec>(path)?;
        Ok((Self::from_spec(spec)?, fingerprint))
    }

    /// Number of output columns.
    pub fn width(&self) -> usize {
        self.idf.len()
    }

    /// Transform one document into a dense feature row.
    pub fn transform(&self, text: &str) -> Vec<f32> {
        let normalized;
        let text = if self.lowercase {
            normalized = text.to_lowercase();
            normalized.as_str()
        } else {
            text
        };

        let tokens: Vec<&str> = TOKEN_PATTERN.find_iter(text).map(|m| m.as_str()).collect();

        let mut counts: HashMap<usize, f64> = HashMap::new();
        let (min_n, max_n) = self.ngram_range;
        for n in min_n..=max_n {
            for window in tokens.windows(n) {
                let gram = window.join(" ");
                if let Some(&column) = self.vocabulary.get(&gram) {
                    *counts.entry(column).or_insert(0.0) += 1.0;
                }
            }
        }

        let mut row = vec![0.0f64; self.width()];
        for (column, count) in counts {
            let tf = if self.sublinear_tf {
                1.0 + count.ln()
            } else {
                count
            };
            row[column] = tf * self.idf[column];
        }

        let scale = match self.norm {
            Norm::L2 => row.iter().map(|v| v * v).sum::<f64>().sqrt(),
            Norm::L1 => row.iter().map(|v| v.abs()).sum::<f64>(),
            Norm::None => 1.0,
        };
        if scale > 0.0 {
            for value in row.iter_mut() {
                *value /= scale;
            }
        }

        row.into_iter().map(|v| v as f32).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(json: serde_json::Value) -> VectorizerSpec {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_transform_l2_normalized() {
        let vectorizer = TfidfVectorizer::from_spec(spec(serde_json::json!({
            "vocabulary": {"verify": 0, "account": 1, "hello": 2},
            "idf": [2.0, 1.0, 1.0]
        })))
        .unwrap();

        let row = vectorizer.transform("Verify your ACCOUNT now");
        let norm = (4.0f64 + 1.0).sqrt();
        assert!((row[0] as f64 - 2.0 / norm).abs() < 1e-6);
        assert!((row[1] as f64 - 1.0 / norm).abs() < 1e-6);
        assert_eq!(row[2], 0.0);
    }

    #[test]
    fn test_bigrams_and_no_norm() {
        let vectorizer = TfidfVectorizer::from_spec(spec(serde_json::json!({
            "vocabulary": {"click here": 0, "click": 1},
            "idf": [1.5, 1.0],
            "ngram_range": [1, 2],
            "norm": null
        })))
        .unwrap();

        let row = vectorizer.transform("click here, click here");
        assert_eq!(row, vec![3.0, 2.0]);
    }

    #[test]
    fn test_sublinear_tf() {
        let vectorizer = TfidfVectorizer::from_spec(spec(serde_json::json!({
            "vocabulary": {"bank": 0},
            "idf": [1.0],
            "sublinear_tf": true,
            "norm": "none"
        })))
        .unwrap();

        let row = vectorizer.transform("bank bank bank");
        assert!((row[0] as f64 - (1.0 + 3.0f64.ln())).abs() < 1e-6);
    }

    #[test]
    fn test_unknown_text_is_zero_row() {
        let vectorizer = TfidfVectorizer::from_spec(spec(serde_json::json!({
            "vocabulary": {"bank": 0},
            "idf": [1.0]
        })))
        .unwrap();
        assert_eq!(vectorizer.transform("nothing relevant"), vec![0.0]);
        assert_eq!(vectorizer.transform(""), vec![0.0]);
    }

    #[test]
    fn test_rejects_out_of_range_vocabulary() {
        let result = TfidfVectorizer::from_spec(spec(serde_json::json!({
            "vocabulary": {"bank": 3},
            "idf": [1.0]
        })));
        assert!(matches!(result, Err(ModelError::InvalidArtifact(_))));
    }

    #[test]
    fn test_rejects_bad_ngram_range() {
        let result = TfidfVectorizer::from_spec(spec(serde_json::json!({
            "vocabulary": {},
            "idf": [1.0],
            "ngram_range": [2, 1]
        })));
        assert!(result.is_err());
    }
}
