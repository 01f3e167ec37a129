//! Rule-based phishing scorer.
//!
//! Each present feature group contributes a fixed weight per fired rule.
//! The weighted sum is normalized by the total weight of the groups that
//! were supplied, so a submission that trips every rule scores 1.0.
//!
//! The weights and thresholds are hand-tuned and kept verbatim; they are
//! definitional for this scorer rather than fitted to data.

use serde::Serialize;

use crate::features::{ContentFeatures, UrlFeatures};

use super::label::Prediction;

/// Normalized score above which a submission is labelled phishing.
pub const PHISHING_SCORE_THRESHOLD: f64 = 0.15;

/// Confidence floor shared by both labels.
pub const CONFIDENCE_BASE: f64 = 0.6;
pub const PHISHING_CONFIDENCE_SCALE: f64 = 0.35;
pub const PHISHING_CONFIDENCE_CAP: f64 = 0.95;
pub const LEGITIMATE_CONFIDENCE_SCALE: f64 = 0.3;
pub const LEGITIMATE_CONFIDENCE_CAP: f64 = 0.9;

/// Confidence reported when no feature group was supplied.
pub const NEUTRAL_CONFIDENCE: f64 = 0.5;

/// Domain longer than this fires `long_domain`.
pub const LONG_DOMAIN_THRESHOLD: usize = 30;
pub const DOMAIN_DASH_THRESHOLD: usize = 2;
pub const SUBDOMAIN_THRESHOLD: usize = 3;
pub const CONTENT_URL_THRESHOLD: usize = 3;

/// Sum of all URL rule weights.
pub const URL_GROUP_WEIGHT: f64 = 1.30;
/// Sum of all content rule weights.
pub const CONTENT_GROUP_WEIGHT: f64 = 1.05;

/// A single weighted rule over a feature record.
pub struct Rule<F> {
    pub name: &'static str,
    pub weight: f64,
    pub fires: fn(&F) -> bool,
}

pub const URL_RULES: &[Rule<UrlFeatures>] = &[
    Rule { name: "ip_address", weight: 0.25, fires: |f| f.has_ip_address },
    Rule { name: "at_symbol", weight: 0.20, fires: |f| f.has_at_symbol },
    Rule { name: "double_slash_in_path", weight: 0.15, fires: |f| f.has_double_slash_in_path },
    Rule { name: "long_domain", weight: 0.15, fires: |f| f.domain_length > LONG_DOMAIN_THRESHOLD },
    Rule { name: "dashed_domain", weight: 0.10, fires: |f| f.domain_dash_count > DOMAIN_DASH_THRESHOLD },
    Rule { name: "deep_subdomains", weight: 0.15, fires: |f| f.domain_subdomain_count > SUBDOMAIN_THRESHOLD },
    Rule { name: "suspicious_path", weight: 0.20, fires: |f| f.has_suspicious_path },
    Rule { name: "suspicious_query", weight: 0.10, fires: |f| f.has_suspicious_query },
];

pub const CONTENT_RULES: &[Rule<ContentFeatures>] = &[
    Rule { name: "urgent_language", weight: 0.15, fires: |f| f.has_urgent_language },
    Rule { name: "action_language", weight: 0.10, fires: |f| f.has_action_language },
    Rule { name: "threat_language", weight: 0.20, fires: |f| f.has_threat_language },
    Rule { name: "many_links", weight: 0.15, fires: |f| f.url_count > CONTENT_URL_THRESHOLD },
    Rule { name: "credential_request", weight: 0.25, fires: |f| f.has_credential_request },
    Rule { name: "personal_info_request", weight: 0.20, fires: |f| f.has_personal_info_request },
];

/// Outcome of rule-based scoring.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleScore {
    pub prediction: Prediction,
    pub confidence: f64,
    /// Triggered weight over the weight of the supplied groups, in `[0, 1]`.
    pub normalized_score: f64,
    /// Names of the rules that fired, URL rules first.
    pub triggered: Vec<&'static str>,
}

fn apply<F>(rules: &[Rule<F>], features: &F, triggered: &mut Vec<&'static str>) -> f64 {
    rules
        .iter()
        .filter(|rule| (rule.fires)(features))
        .map(|rule| {
            triggered.push(rule.name);
            rule.weight
        })
        .sum()
}

/// Score whichever feature groups are present.
///
/// Pure and deterministic: identical inputs always give identical output.
pub fn score(url: Option<&UrlFeatures>, content: Option<&ContentFeatures>) -> RuleScore {
    let mut triggered = Vec::new();
    let mut total = 0.0;
    let mut denominator = 0.0;

    if let Some(features) = url {
        total += apply(URL_RULES, features, &mut triggered);
        denominator += URL_GROUP_WEIGHT;
    }
    if let Some(features) = content {
        total += apply(CONTENT_RULES, features, &mut triggered);
        denominator += CONTENT_GROUP_WEIGHT;
    }

    if denominator == 0.0 {
        return RuleScore {
            prediction: Prediction::Legitimate,
            confidence: NEUTRAL_CONFIDENCE,
            normalized_score: 0.0,
            triggered,
        };
    }

    let normalized_score = (total / denominator).clamp(0.0, 1.0);
    let (prediction, confidence) = if normalized_score > PHISHING_SCORE_THRESHOLD {
        (
            Prediction::Phishing,
            (CONFIDENCE_BASE + normalized_score * PHISHING_CONFIDENCE_SCALE)
                .min(PHISHING_CONFIDENCE_CAP),
        )
    } else {
        (
            Prediction::Legitimate,
            (CONFIDENCE_BASE + (1.0 - normalized_score) * LEGITIMATE_CONFIDENCE_SCALE)
                .min(LEGITIMATE_CONFIDENCE_CAP),
        )
    };

    RuleScore {
        prediction,
        confidence,
        normalized_score,
        triggered,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{extract_content_features, extract_url_features};
    use proptest::prelude::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_group_weights_match_rule_tables() {
        let url_sum: f64 = URL_RULES.iter().map(|r| r.weight).sum();
        let content_sum: f64 = CONTENT_RULES.iter().map(|r| r.weight).sum();
        assert!(approx(url_sum, URL_GROUP_WEIGHT));
        assert!(approx(content_sum, CONTENT_GROUP_WEIGHT));
    }

    #[test]
    fn test_no_groups_is_neutral() {
        let result = score(None, None);
        assert_eq!(result.prediction, Prediction::Legitimate);
        assert_eq!(result.confidence, NEUTRAL_CONFIDENCE);
        assert!(result.triggered.is_empty());
    }

    #[test]
    fn test_ip_login_url_is_phishing() {
        let features = extract_url_features("http://192.168.1.1/login");
        let result = score(Some(&features), None);
        assert_eq!(result.prediction, Prediction::Phishing);
        assert!(approx(result.normalized_score, 0.45 / URL_GROUP_WEIGHT));
        assert!(approx(
            result.confidence,
            0.6 + (0.45 / URL_GROUP_WEIGHT) * 0.35
        ));
        assert_eq!(result.triggered, vec!["ip_address", "suspicious_path"]);
    }

    #[test]
    fn test_clean_url_is_legitimate_with_max_confidence() {
        let features = extract_url_features("https://example.com/about");
        let result = score(Some(&features), None);
        assert_eq!(result.prediction, Prediction::Legitimate);
        assert_eq!(result.normalized_score, 0.0);
        assert!(approx(result.confidence, 0.9));
    }

    #[test]
    fn test_urgent_password_content_is_phishing() {
        let features = extract_content_features(
            "Urgent: verify your password immediately or your account will be suspended",
        );
        let result = score(None, Some(&features));
        assert_eq!(result.prediction, Prediction::Phishing);
        assert!(approx(result.normalized_score, 0.70 / CONTENT_GROUP_WEIGHT));
    }

    #[test]
    fn test_every_rule_fired_caps_confidence() {
        let url = UrlFeatures {
            domain_length: 40,
            has_ip_address: true,
            has_at_symbol: true,
            has_double_slash_in_path: true,
            domain_dash_count: 3,
            domain_subdomain_count: 4,
            path_length: 10,
            has_suspicious_path: true,
            query_length: 10,
            has_suspicious_query: true,
        };
        let result = score(Some(&url), None);
        assert!(approx(result.normalized_score, 1.0));
        assert!(result.confidence <= PHISHING_CONFIDENCE_CAP);
        assert!(approx(result.confidence, 0.95));
    }

    #[test]
    fn test_both_groups_share_denominator() {
        let url = UrlFeatures {
            has_ip_address: true,
            ..UrlFeatures::default()
        };
        let content = ContentFeatures::default();
        let result = score(Some(&url), Some(&content));
        let expected = 0.25 / (URL_GROUP_WEIGHT + CONTENT_GROUP_WEIGHT);
        assert!(approx(result.normalized_score, expected));
        // 0.106 stays under the threshold once content dilutes the score.
        assert_eq!(result.prediction, Prediction::Legitimate);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        // A lone urgent phrase scores 0.15 / 1.05 ≈ 0.143.
        let content = ContentFeatures {
            has_urgent_language: true,
            ..ContentFeatures::default()
        };
        assert_eq!(score(None, Some(&content)).prediction, Prediction::Legitimate);
    }

    fn url_features() -> impl Strategy<Value = UrlFeatures> {
        (
            (0usize..80, any::<bool>(), any::<bool>(), any::<bool>(), 0usize..6),
            (0usize..8, 0usize..100, any::<bool>(), 0usize..100, any::<bool>()),
        )
            .prop_map(|((dl, ip, at, ds, dash), (sub, pl, sp, ql, sq))| UrlFeatures {
                domain_length: dl,
                has_ip_address: ip,
                has_at_symbol: at,
                has_double_slash_in_path: ds,
                domain_dash_count: dash,
                domain_subdomain_count: sub,
                path_length: pl,
                has_suspicious_path: sp,
                query_length: ql,
                has_suspicious_query: sq,
            })
    }

    fn content_features() -> impl Strategy<Value = ContentFeatures> {
        (
            0usize..5000,
            any::<bool>(),
            any::<bool>(),
            any::<bool>(),
            0usize..10,
            any::<bool>(),
            any::<bool>(),
        )
            .prop_map(|(len, urgent, action, threat, urls, cred, pii)| ContentFeatures {
                content_length: len,
                has_urgent_language: urgent,
                has_action_language: action,
                has_threat_language: threat,
                url_count: urls,
                has_credential_request: cred,
                has_personal_info_request: pii,
            })
    }

    proptest! {
        #[test]
        fn prop_confidence_within_bounds(
            url in proptest::option::of(url_features()),
            content in proptest::option::of(content_features()),
        ) {
            let result = score(url.as_ref(), content.as_ref());
            prop_assert!((0.0..=1.0).contains(&result.confidence));
            prop_assert!((0.0..=1.0).contains(&result.normalized_score));
            if result.prediction.is_phishing() {
                prop_assert!(result.confidence <= PHISHING_CONFIDENCE_CAP);
            } else {
                prop_assert!(result.confidence <= LEGITIMATE_CONFIDENCE_CAP);
            }
        }

        #[test]
        fn prop_scoring_is_deterministic(
            url in proptest::option::of(url_features()),
            content in proptest::option::of(content_features()),
        ) {
            let first = score(url.as_ref(), content.as_ref());
            let second = score(url.as_ref(), content.as_ref());
            prop_assert_eq!(first, second);
        }
    }
}
