//! Scan-scoped log lines.
//!
//! Every engine event is written as `[scan=<id>] [stage=<stage>] EVENT key=value ...`
//! so a single scan can be followed through the log with one grep.
//! Values are `Debug`-formatted; callers pass lengths and flags, never the
//! submitted text.

use std::fmt;

/// Identity stamped on every line logged during a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogContext {
    pub scan_id: String,
    pub stage: Option<&'static str>,
}

impl LogContext {
    pub fn new(scan_id: &str) -> Self {
        Self {
            scan_id: scan_id.to_owned(),
            stage: None,
        }
    }

    /// Same scan, narrowed to one processing stage.
    pub fn with_stage(&self, stage: &'static str) -> Self {
        Self {
            stage: Some(stage),
            ..self.clone()
        }
    }
}

impl fmt::Display for LogContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[scan={}]", self.scan_id)?;
        if let Some(stage) = self.stage {
            write!(f, " [stage={}]", stage)?;
        }
        Ok(())
    }
}

/// Log `EVENT key=value ...` at `$level` behind the scan context.
#[macro_export]
macro_rules! log_event {
    ($level:expr, $ctx:expr, $event:expr $(, $key:ident = $value:expr)* $(,)?) => {
        log::log!(
            $level,
            concat!("{} {}", $(" ", stringify!($key), "={:?}"),*),
            $ctx,
            $event
            $(, $value)*
        )
    };
}

#[macro_export]
macro_rules! log_info {
    ($($args:tt)+) => { $crate::log_event!(log::Level::Info, $($args)+) };
}

#[macro_export]
macro_rules! log_warn {
    ($($args:tt)+) => { $crate::log_event!(log::Level::Warn, $($args)+) };
}

#[macro_export]
macro_rules! log_debug {
    ($($args:tt)+) => { $crate::log_event!(log::Level::Debug, $($args)+) };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_display() {
        let ctx = LogContext::new("scan-123");
        assert_eq!(ctx.to_string(), "[scan=scan-123]");
        assert_eq!(
            ctx.with_stage("text_patterns").to_string(),
            "[scan=scan-123] [stage=text_patterns]"
        );
    }

    #[test]
    fn test_event_macros_accept_fields() {
        let ctx = LogContext::new("scan-456").with_stage("url_analysis");
        crate::log_info!(ctx, "SCAN_COMPLETE", prediction = "phishing", confidence = 0.82);
        crate::log_warn!(ctx, "MODEL_FAILED", reason = "shape mismatch");
        crate::log_debug!(ctx, "NO_FIELDS");
    }
}
