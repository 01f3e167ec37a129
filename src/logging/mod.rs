//! Logging helpers.
//!
//! The process logger is `env_logger` (see `init_logger` at the crate
//! root); this module only shapes the lines the engine emits.

pub mod structured;

pub use structured::*;
