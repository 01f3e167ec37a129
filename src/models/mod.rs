//! Model adapters.
//!
//! Each adapter wraps an optional externally trained artifact and exposes
//! the same contract: try to predict, or report that it cannot.
//! - `adapter` - shared `ModelAdapter` trait and availability state
//! - `artifact` - artifact loading and SHA-256 fingerprints
//! - `vectorizer` / `forest` / `tabular` - TF-IDF + random forest path
//! - `tokenizer` / `sequence` - padded token sequence + LSTM path
//! - `onnx` - ONNX Runtime classifier backend (feature `onnx`)

pub mod adapter;
pub mod artifact;
pub mod forest;
#[cfg(feature = "onnx")]
pub mod onnx;
pub mod sequence;
pub mod tabular;
pub mod tokenizer;
pub mod vectorizer;

pub use adapter::*;
pub use artifact::*;
pub use sequence::{SequenceAdapter, SequenceClassifier};
pub use tabular::{TabularAdapter, TabularClassifier};
