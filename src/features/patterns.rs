//! Phishing term patterns.
//!
//! Term lists are matched case-insensitively; a feature flag only needs
//! the first hit, so every list is compiled into a single alternation.

use lazy_static::lazy_static;
use regex::Regex;

/// Terms that mark a URL path or query as suspicious.
pub const SUSPICIOUS_URL_TERMS: &[&str] = &[
    "login", "verify", "account", "banking", "password", "confirm", "paypal", "secure", "credit",
    "bank", "security", "update", "signin", "webscr",
];

/// Pressure and time-limit language.
pub const URGENT_TERMS: &[&str] = &[
    "urgent",
    "immediately",
    "as soon as possible",
    "right away",
    "act now",
    "within 24 hours",
    "expires",
    "final notice",
    "attention",
];

/// Calls to action that lead the reader to a link or form.
pub const ACTION_TERMS: &[&str] = &[
    "click here",
    "click the link",
    "click below",
    "verify",
    "confirm",
    "update your",
    "log in",
    "login",
    "sign in",
    "follow the link",
];

/// Consequences threatened if the reader does not comply.
pub const THREAT_TERMS: &[&str] = &[
    "suspended",
    "suspend",
    "terminated",
    "locked",
    "disabled",
    "deactivated",
    "closed",
    "unauthorized",
    "suspicious activity",
    "legal action",
    "restricted",
];

/// Requests for login secrets.
pub const CREDENTIAL_TERMS: &[&str] = &[
    "password",
    "passcode",
    "username",
    "user name",
    "credentials",
    "pin number",
    "security question",
    "one-time code",
];

/// Requests for identity or financial details.
pub const PERSONAL_INFO_TERMS: &[&str] = &[
    "social security",
    "ssn",
    "date of birth",
    "credit card",
    "card number",
    "bank account",
    "account number",
    "routing number",
    "mother's maiden name",
    "billing information",
];

/// Build a case-insensitive alternation over a term list.
///
/// Multi-word terms tolerate any run of whitespace between words.
fn term_regex(terms: &[&str]) -> Regex {
    let alternation = terms
        .iter()
        .map(|term| {
            term.split_whitespace()
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join(r"\s+")
        })
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!("(?i)(?:{})", alternation)).unwrap()
}

lazy_static! {
    /// Dotted-quad IPv4 anywhere in the URL
    pub static ref IP_ADDRESS_PATTERN: Regex = Regex::new(
        r"\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}"
    ).unwrap();

    /// Links embedded in message text
    pub static ref EMBEDDED_URL_PATTERN: Regex = Regex::new(
        r"https?://\S+"
    ).unwrap();

    pub static ref SUSPICIOUS_URL_PATTERN: Regex = term_regex(SUSPICIOUS_URL_TERMS);
    pub static ref URGENT_PATTERN: Regex = term_regex(URGENT_TERMS);
    pub static ref ACTION_PATTERN: Regex = term_regex(ACTION_TERMS);
    pub static ref THREAT_PATTERN: Regex = term_regex(THREAT_TERMS);
    pub static ref CREDENTIAL_PATTERN: Regex = term_regex(CREDENTIAL_TERMS);
    pub static ref PERSONAL_INFO_PATTERN: Regex = term_regex(PERSONAL_INFO_TERMS);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_term_matching_is_case_insensitive() {
        assert!(SUSPICIOUS_URL_PATTERN.is_match("/LOGIN.php"));
        assert!(URGENT_PATTERN.is_match("URGENT: read this"));
        assert!(!SUSPICIOUS_URL_PATTERN.is_match("/about/team"));
    }

    #[test]
    fn test_multi_word_terms_allow_extra_whitespace() {
        assert!(ACTION_PATTERN.is_match("please click   here"));
        assert!(PERSONAL_INFO_PATTERN.is_match("your Social\nSecurity number"));
    }

    #[test]
    fn test_embedded_url_pattern() {
        let text = "see http://a.example and https://b.example/x?y=1 or ftp://c";
        assert_eq!(EMBEDDED_URL_PATTERN.find_iter(text).count(), 2);
    }

    #[test]
    fn test_ip_pattern() {
        assert!(IP_ADDRESS_PATTERN.is_match("http://1.2.3.4/"));
        assert!(!IP_ADDRESS_PATTERN.is_match("http://1.2.3/"));
    }
}
