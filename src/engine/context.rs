//! Scan context.
//!
//! Identity and timing of one prediction call.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::logging::structured::LogContext;

/// Context for a single scan.
#[derive(Debug, Clone)]
pub struct ScanContext {
    pub scan_id: String,
    pub scan_time: DateTime<Utc>,
}

impl ScanContext {
    /// Fresh scan with a random (v4) id stamped at the current instant.
    pub fn new() -> Self {
        Self {
            scan_id: Uuid::new_v4().to_string(),
            scan_time: Utc::now(),
        }
    }

    pub fn log_context(&self) -> LogContext {
        LogContext::new(&self.scan_id)
    }
}

impl Default for ScanContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_ids_are_unique() {
        let a = ScanContext::new();
        let b = ScanContext::new();
        assert_ne!(a.scan_id, b.scan_id);
        assert!(Uuid::parse_str(&a.scan_id).is_ok());
        assert!(b.scan_time >= a.scan_time);
    }
}
