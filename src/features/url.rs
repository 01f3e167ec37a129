//! URL feature extraction.
//!
//! Derives structural signals (host shape, IP literal, `@` tricks) and
//! suspicious-term flags from a single URL string.

use serde::{Deserialize, Serialize};
use url::{ParseError, Url};

use super::patterns::{IP_ADDRESS_PATTERN, SUSPICIOUS_URL_PATTERN};

/// Feature record derived from one URL.
///
/// `Default` is the all-zero record returned for unparsable input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlFeatures {
    pub domain_length: usize,
    pub has_ip_address: bool,
    pub has_at_symbol: bool,
    pub has_double_slash_in_path: bool,
    pub domain_dash_count: usize,
    /// Number of dots in the host (`example.com` has 1).
    pub domain_subdomain_count: usize,
    pub path_length: usize,
    pub has_suspicious_path: bool,
    pub query_length: usize,
    pub has_suspicious_query: bool,
}

/// Extract features from a URL.
///
/// Scheme-less input such as `example.com/login` is parsed as `http://`.
/// Anything the parser still rejects yields [`UrlFeatures::default`].
pub fn extract_url_features(raw: &str) -> UrlFeatures {
    let raw = raw.trim();
    let parsed = match parse_lenient(raw) {
        Some(url) => url,
        None => {
            log::debug!("URL_PARSE_FAILED length={}", raw.len());
            return UrlFeatures::default();
        }
    };

    let domain = parsed.host_str().unwrap_or("");
    let path = parsed.path();
    let query = parsed.query().unwrap_or("");

    UrlFeatures {
        domain_length: domain.len(),
        has_ip_address: IP_ADDRESS_PATTERN.is_match(raw),
        has_at_symbol: raw.contains('@'),
        has_double_slash_in_path: path.contains("//"),
        domain_dash_count: domain.matches('-').count(),
        domain_subdomain_count: domain.matches('.').count(),
        path_length: path.len(),
        has_suspicious_path: SUSPICIOUS_URL_PATTERN.is_match(path),
        query_length: query.len(),
        has_suspicious_query: SUSPICIOUS_URL_PATTERN.is_match(query),
    }
}

fn parse_lenient(raw: &str) -> Option<Url> {
    if raw.is_empty() {
        return None;
    }
    match Url::parse(raw) {
        Ok(url) => Some(url),
        Err(ParseError::RelativeUrlWithoutBase) => Url::parse(&format!("http://{}", raw)).ok(),
        Err(_) => None,
    }
}
