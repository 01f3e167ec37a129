//! Scoring module.
//!
//! Deterministic, explainable scoring used whenever no learned model
//! produces a verdict:
//! - `label` - the phishing/legitimate label shared by every scorer
//! - `rules` - weighted rule table and normalized suspicion score

pub mod label;
pub mod rules;

pub use label::*;
pub use rules::*;
