//! Rolling statistics.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::scoring::label::Prediction;

use super::storage::PersistedTelemetry;

/// Response-time samples retained for the rolling average.
pub const DEFAULT_RESPONSE_WINDOW: usize = 1000;

/// Largest accepted window; configs above this are rejected.
pub const MAX_RESPONSE_WINDOW: usize = 1_000_000;

/// Mutable statistics record. Not synchronized; the aggregator owns the lock.
#[derive(Debug, Clone)]
pub struct TelemetryStats {
    api_calls: u64,
    phishing_detections: u64,
    legitimate_detections: u64,
    start_time: DateTime<Utc>,
    window: VecDeque<f64>,
    capacity: usize,
    /// Average carried over from disk, reported until the first new sample.
    restored_average: f64,
}

/// Point-in-time copy of the statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetrySnapshot {
    pub api_calls: u64,
    pub phishing_detections: u64,
    pub legitimate_detections: u64,
    /// Mean of the retained samples, in milliseconds.
    pub average_response_time: f64,
    pub start_time: DateTime<Utc>,
    pub phishing_percentage: f64,
    pub uptime_seconds: f64,
    pub uptime_hours: f64,
    pub response_samples: usize,
}

impl TelemetryStats {
    pub fn new(start_time: DateTime<Utc>, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            api_calls: 0,
            phishing_detections: 0,
            legitimate_detections: 0,
            start_time,
            window: VecDeque::with_capacity(capacity.min(DEFAULT_RESPONSE_WINDOW)),
            capacity,
            restored_average: 0.0,
        }
    }

    /// Restore counters from disk. The window starts empty; the persisted
    /// average is reported only until a new sample arrives.
    pub fn from_persisted(persisted: &PersistedTelemetry, capacity: usize) -> Self {
        let mut stats = Self::new(persisted.start_time, capacity);
        stats.api_calls = persisted.api_calls;
        stats.phishing_detections = persisted.phishing_detections;
        stats.legitimate_detections = persisted.legitimate_detections;
        stats.restored_average = persisted.average_response_time;
        stats
    }

    pub fn record(&mut self, prediction: Prediction, response_time_ms: f64) {
        self.api_calls += 1;
        match prediction {
            Prediction::Phishing => self.phishing_detections += 1,
            Prediction::Legitimate => self.legitimate_detections += 1,
        }
        if response_time_ms.is_finite() {
            self.push_sample(response_time_ms.max(0.0));
        }
    }

    fn push_sample(&mut self, sample: f64) {
        if self.window.len() == self.capacity {
            self.window.pop_front();
        }
        self.window.push_back(sample);
    }

    /// Mean of exactly the retained samples, or the restored average
    /// while the window is still empty.
    pub fn average_response_time(&self) -> f64 {
        if self.window.is_empty() {
            return self.restored_average;
        }
        self.window.iter().sum::<f64>() / self.window.len() as f64
    }

    pub fn window_len(&self) -> usize {
        self.window.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn snapshot(&self, now: DateTime<Utc>) -> TelemetrySnapshot {
        let detections = self.phishing_detections + self.legitimate_detections;
        let phishing_percentage = if detections == 0 {
            0.0
        } else {
            self.phishing_detections as f64 / detections as f64 * 100.0
        };
        let uptime_seconds = ((now - self.start_time).num_milliseconds() as f64 / 1000.0).max(0.0);

        TelemetrySnapshot {
            api_calls: self.api_calls,
            phishing_detections: self.phishing_detections,
            legitimate_detections: self.legitimate_detections,
            average_response_time: self.average_response_time(),
            start_time: self.start_time,
            phishing_percentage,
            uptime_seconds,
            uptime_hours: uptime_seconds / 3600.0,
            response_samples: self.window.len(),
        }
    }

    pub fn to_persisted(&self) -> PersistedTelemetry {
        PersistedTelemetry {
            api_calls: self.api_calls,
            phishing_detections: self.phishing_detections,
            legitimate_detections: self.legitimate_detections,
            average_response_time: self.average_response_time(),
            start_time: self.start_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use proptest::prelude::*;

    fn start() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-03-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_empty_snapshot() {
        let stats = TelemetryStats::new(start(), 10);
        let snap = stats.snapshot(start());
        assert_eq!(snap.api_calls, 0);
        assert_eq!(snap.phishing_percentage, 0.0);
        assert_eq!(snap.average_response_time, 0.0);
        assert_eq!(snap.uptime_seconds, 0.0);
    }

    #[test]
    fn test_record_counts_and_percentage() {
        let mut stats = TelemetryStats::new(start(), 10);
        stats.record(Prediction::Phishing, 10.0);
        stats.record(Prediction::Legitimate, 20.0);
        stats.record(Prediction::Legitimate, 30.0);
        stats.record(Prediction::Legitimate, 40.0);

        let snap = stats.snapshot(start() + Duration::hours(2));
        assert_eq!(snap.api_calls, 4);
        assert_eq!(snap.phishing_detections, 1);
        assert_eq!(snap.legitimate_detections, 3);
        assert_eq!(snap.phishing_percentage, 25.0);
        assert_eq!(snap.average_response_time, 25.0);
        assert_eq!(snap.uptime_seconds, 7200.0);
        assert_eq!(snap.uptime_hours, 2.0);
    }

    #[test]
    fn test_window_evicts_oldest() {
        let mut stats = TelemetryStats::new(start(), 3);
        for ms in [100.0, 1.0, 2.0, 3.0] {
            stats.record(Prediction::Legitimate, ms);
        }
        assert_eq!(stats.window_len(), 3);
        assert_eq!(stats.average_response_time(), 2.0);
        assert_eq!(stats.snapshot(start()).api_calls, 4);
    }

    #[test]
    fn test_bad_samples() {
        let mut stats = TelemetryStats::new(start(), 5);
        stats.record(Prediction::Phishing, f64::NAN);
        stats.record(Prediction::Phishing, -4.0);
        assert_eq!(stats.window_len(), 1);
        assert_eq!(stats.average_response_time(), 0.0);
        assert_eq!(stats.snapshot(start()).phishing_detections, 2);
    }

    #[test]
    fn test_zero_capacity_keeps_one_sample() {
        let mut stats = TelemetryStats::new(start(), 0);
        stats.record(Prediction::Phishing, 5.0);
        stats.record(Prediction::Phishing, 7.0);
        assert_eq!(stats.capacity(), 1);
        assert_eq!(stats.average_response_time(), 7.0);
    }

    #[test]
    fn test_restored_average_yields_to_new_samples() {
        let mut persisted = PersistedTelemetry::zeroed(start());
        persisted.api_calls = 5;
        persisted.legitimate_detections = 5;
        persisted.average_response_time = 10.0;

        let mut stats = TelemetryStats::from_persisted(&persisted, 10);
        assert_eq!(stats.average_response_time(), 10.0);
        assert_eq!(stats.snapshot(start()).response_samples, 0);

        stats.record(Prediction::Legitimate, 100.0);
        let snap = stats.snapshot(start());
        assert_eq!(snap.average_response_time, 100.0);
        assert_eq!(snap.response_samples, 1);
        assert_eq!(snap.api_calls, 6);
    }

    #[test]
    fn test_huge_capacity_does_not_preallocate() {
        let mut stats = TelemetryStats::new(start(), usize::MAX / 2);
        stats.record(Prediction::Phishing, 4.0);
        assert_eq!(stats.capacity(), usize::MAX / 2);
        assert_eq!(stats.average_response_time(), 4.0);
    }

    #[test]
    fn test_persisted_round_trip_keeps_counters() {
        let mut stats = TelemetryStats::new(start(), 10);
        stats.record(Prediction::Phishing, 12.0);
        stats.record(Prediction::Legitimate, 18.0);

        let restored = TelemetryStats::from_persisted(&stats.to_persisted(), 10);
        let snap = restored.snapshot(start());
        assert_eq!(snap.api_calls, 2);
        assert_eq!(snap.phishing_detections, 1);
        assert_eq!(snap.average_response_time, 15.0);
        assert_eq!(snap.start_time, start());
    }

    proptest! {
        #[test]
        fn window_bounded_and_mean_exact(
            capacity in 1usize..50,
            samples in prop::collection::vec(0.0f64..5000.0, 0..200),
        ) {
            let mut stats = TelemetryStats::new(start(), capacity);
            for (i, ms) in samples.iter().enumerate() {
                let label = if i % 2 == 0 { Prediction::Phishing } else { Prediction::Legitimate };
                stats.record(label, *ms);
            }
            prop_assert!(stats.window_len() <= capacity);

            let retained: Vec<f64> = samples.iter().rev().take(capacity).copied().collect();
            let expected = if retained.is_empty() {
                0.0
            } else {
                retained.iter().sum::<f64>() / retained.len() as f64
            };
            prop_assert!((stats.average_response_time() - expected).abs() < 1e-6);

            let snap = stats.snapshot(start());
            prop_assert_eq!(snap.api_calls, samples.len() as u64);
            prop_assert_eq!(snap.phishing_detections + snap.legitimate_detections, snap.api_calls);
            prop_assert!((0.0..=100.0).contains(&snap.phishing_percentage));
        }
    }
}
