//! Message content feature extraction.

use serde::{Deserialize, Serialize};

use super::patterns::{
    ACTION_PATTERN, CREDENTIAL_PATTERN, EMBEDDED_URL_PATTERN, PERSONAL_INFO_PATTERN,
    THREAT_PATTERN, URGENT_PATTERN,
};

/// Feature record derived from one message body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentFeatures {
    pub content_length: usize,
    pub has_urgent_language: bool,
    pub has_action_language: bool,
    pub has_threat_language: bool,
    pub url_count: usize,
    pub has_credential_request: bool,
    pub has_personal_info_request: bool,
}

/// Extract features from message text.
///
/// `content_length` counts characters, not bytes.
pub fn extract_content_features(text: &str) -> ContentFeatures {
    ContentFeatures {
        content_length: text.chars().count(),
        has_urgent_language: URGENT_PATTERN.is_match(text),
        has_action_language: ACTION_PATTERN.is_match(text),
        has_threat_language: THREAT_PATTERN.is_match(text),
        url_count: EMBEDDED_URL_PATTERN.find_iter(text).count(),
        has_credential_request: CREDENTIAL_PATTERN.is_match(text),
        has_personal_info_request: PERSONAL_INFO_PATTERN.is_match(text),
    }
}
