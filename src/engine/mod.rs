//! Detection engine module.
//!
//! Orchestrates one prediction per call:
//! - Feature extraction for each supplied input
//! - Tabular and sequence model attempts
//! - Weighted ensemble vote, single-model adoption, or rule-based fallback
//! - Result assembly

pub mod context;
pub mod detector;
pub mod ensemble;
pub mod result;

pub use context::*;
pub use detector::*;
pub use ensemble::*;
pub use result::*;
