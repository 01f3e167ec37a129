//! Request telemetry.
//!
//! Thread-safe rolling statistics over completed predictions:
//! - `stats` - counters, bounded response-time window, snapshots
//! - `storage` - persisted file format and crash-safe writes
//! - `aggregator` - shared handle, background persistence, shutdown

pub mod aggregator;
pub mod stats;
pub mod storage;

pub use aggregator::*;
pub use stats::*;
pub use storage::*;
