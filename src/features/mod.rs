//! Feature extraction module.
//!
//! Maps raw (already sanitized) URL and message strings to fixed-shape
//! feature records consumed by the rule-based scorer.
//! - `url` - URL structure and suspicious-term flags
//! - `content` - message body language and request flags
//! - `patterns` - shared term lists and compiled regexes

pub mod content;
pub mod patterns;
pub mod url;

pub use self::content::*;
pub use self::url::*;
