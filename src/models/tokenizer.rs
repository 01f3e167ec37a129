//! Word-index tokenizer.
//!
//! Reads a word-index tokenizer export, either the plain form
//! `{"word_index": {...}, ...}` or the nested form where the settings sit
//! under `"config"` and `word_index` is itself a JSON-encoded string.
//! Text becomes a fixed-length id sequence: truncated at the end when
//! too long, right-padded with [`PADDING_ID`] when too short.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde_json::Value;

use crate::error::ModelError;

use super::artifact::{load_json, ArtifactFingerprint};

/// Sequence length the sequence model was trained on.
pub const DEFAULT_SEQUENCE_LENGTH: usize = 200;

/// Neutral filler id; never assigned to a word.
pub const PADDING_ID: i64 = 0;

/// Characters stripped before splitting when the export names none.
pub const DEFAULT_FILTERS: &str = "!\"#$%&()*+,-./:;<=>?@[\\]^_`{|}~\t\n";

#[derive(Debug, Clone)]
pub struct WordTokenizer {
    word_index: HashMap<String, i64>,
    lower: bool,
    filters: HashSet<char>,
    oov_id: Option<i64>,
    num_words: Option<usize>,
}

impl WordTokenizer {
    pub fn new(word_index: HashMap<String, i64>) -> Result<Self, ModelError> {
        if let Some((word, id)) = word_index.iter().find(|(_, id)| **id <= PADDING_ID) {
            return Err(ModelError::InvalidArtifact(format!(
                "word {:?} has reserved id {}",
                word, id
            )));
        }
        Ok(Self {
            word_index,
            lower: true,
            filters: DEFAULT_FILTERS.chars().collect(),
            oov_id: None,
            num_words: None,
        })
    }

    pub fn with_oov_token(mut self, token: &str) -> Self {
        self.oov_id = self.word_index.get(token).copied();
        self
    }

    pub fn with_num_words(mut self, num_words: Option<usize>) -> Self {
        self.num_words = num_words;
        self
    }

    pub fn from_json_value(value: &Value) -> Result<Self, ModelError> {
        let config = value.get("config").unwrap_or(value);

        let word_index: HashMap<String, i64> = match config.get("word_index") {
            Some(Value::String(encoded)) => serde_json::from_str(encoded).map_err(|e| {
                ModelError::InvalidArtifact(format!("word_index string is not JSON: {}", e))
            })?,
            Some(object @ Value::Object(_)) => serde_json::from_value(object.clone())
                .map_err(|e| ModelError::InvalidArtifact(format!("bad word_index: {}", e)))?,
            _ => {
                return Err(ModelError::InvalidArtifact(
                    "tokenizer has no word_index".into(),
                ))
            }
        };

        let mut tokenizer = Self::new(word_index)?;
        if let Some(lower) = config.get("lower").and_then(Value::as_bool) {
            tokenizer.lower = lower;
        }
        if let Some(filters) = config.get("filters").and_then(Value::as_str) {
            tokenizer.filters = filters.chars().collect();
        }
        if let Some(token) = config.get("oov_token").and_then(Value::as_str) {
            tokenizer = tokenizer.with_oov_token(token);
        }
        let num_words = config
            .get("num_words")
            .and_then(Value::as_u64)
            .map(|n| n as usize);
        Ok(tokenizer.with_num_words(num_words))
    }

    pub fn load(path: &Path) -> Result<(Self, ArtifactFingerprint), ModelError> {
        let (value, fingerprint) = load_json::<Value>(path)?;
        Ok((Self::from_json_value(&value)?, fingerprint))
    }

    pub fn vocabulary_size(&self) -> usize {
        self.word_index.len()
    }

    /// Map text to word ids, without padding.
    ///
    /// Unknown or out-of-range words become the OOV id when one is
    /// configured and are dropped otherwise.
    pub fn texts_to_sequence(&self, text: &str) -> Vec<i64> {
        let cleaned: String = text
            .chars()
            .map(|c| if self.filters.contains(&c) { ' ' } else { c })
            .collect();
        let cleaned = if self.lower {
            cleaned.to_lowercase()
        } else {
            cleaned
        };

        cleaned
            .split_whitespace()
            .filter_map(|word| {
                let id = self.word_index.get(word).copied().filter(|id| match self.num_words {
                    Some(limit) => (*id as usize) < limit,
                    None => true,
                });
                id.or(self.oov_id)
            })
            .collect()
    }

    /// Map text to exactly `length` ids.
    pub fn encode(&self, text: &str, length: usize) -> Vec<i64> {
        pad_sequence(self.texts_to_sequence(text), length)
    }
}

/// Truncate at the end, then right-pad with [`PADDING_ID`].
pub fn pad_sequence(mut ids: Vec<i64>, length: usize) -> Vec<i64> {
    ids.truncate(length);
    ids.resize(length, PADDING_ID);
    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenizer() -> WordTokenizer {
        WordTokenizer::from_json_value(&serde_json::json!({
            "word_index": {"<OOV>": 1, "your": 2, "account": 3, "verify": 4, "rare": 9},
            "oov_token": "<OOV>",
            "num_words": 5
        }))
        .unwrap()
    }

    #[test]
    fn test_texts_to_sequence_with_oov() {
        let ids = tokenizer().texts_to_sequence("Verify your ACCOUNT, stranger! rare");
        assert_eq!(ids, vec![4, 2, 3, 1, 1]);
    }

    #[test]
    fn test_unknown_words_dropped_without_oov() {
        let tokenizer = WordTokenizer::new(HashMap::from([
            ("verify".to_string(), 1),
            ("account".to_string(), 2),
        ]))
        .unwrap();
        assert_eq!(tokenizer.texts_to_sequence("verify this account"), vec![1, 2]);
    }

    #[test]
    fn test_encode_pads_right() {
        let ids = tokenizer().encode("verify account", 5);
        assert_eq!(ids, vec![4, 3, 0, 0, 0]);
    }

    #[test]
    fn test_encode_truncates_end() {
        let ids = tokenizer().encode("your your your verify", 2);
        assert_eq!(ids, vec![2, 2]);
    }

    #[test]
    fn test_default_length_is_fixed() {
        let long_text = "verify ".repeat(500);
        assert_eq!(tokenizer().encode(&long_text, DEFAULT_SEQUENCE_LENGTH).len(), 200);
        assert_eq!(tokenizer().encode("", DEFAULT_SEQUENCE_LENGTH), vec![0; 200]);
    }

    #[test]
    fn test_nested_export_with_encoded_word_index() {
        let export = serde_json::json!({
            "class_name": "Tokenizer",
            "config": {
                "lower": true,
                "oov_token": "<OOV>",
                "word_index": "{\"<OOV>\": 1, \"bank\": 2}"
            }
        });
        let tokenizer = WordTokenizer::from_json_value(&export).unwrap();
        assert_eq!(tokenizer.vocabulary_size(), 2);
        assert_eq!(tokenizer.texts_to_sequence("Bank wire"), vec![2, 1]);
    }

    #[test]
    fn test_rejects_reserved_padding_id() {
        let result = WordTokenizer::from_json_value(&serde_json::json!({
            "word_index": {"bank": 0}
        }));
        assert!(matches!(result, Err(ModelError::InvalidArtifact(_))));
    }

    #[test]
    fn test_missing_word_index() {
        assert!(WordTokenizer::from_json_value(&serde_json::json!({"lower": true})).is_err());
    }
}
