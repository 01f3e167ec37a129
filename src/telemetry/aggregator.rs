//! Telemetry aggregator.
//!
//! One lock guards the whole statistics record, so `record` and
//! `snapshot` never observe each other half-done. A background thread
//! persists on a fixed interval; `shutdown` stops it, waits for it, and
//! writes one final time.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::Utc;
use parking_lot::Mutex;

use crate::engine::result::DetectionResult;
use crate::error::TelemetryError;
use crate::scoring::label::Prediction;

use super::stats::{TelemetrySnapshot, TelemetryStats, DEFAULT_RESPONSE_WINDOW};
use super::storage::{PersistedTelemetry, TelemetryStore};

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub path: PathBuf,
    pub persist_interval: Duration,
    pub window_capacity: usize,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/telemetry.json"),
            persist_interval: Duration::from_secs(60),
            window_capacity: DEFAULT_RESPONSE_WINDOW,
        }
    }
}

struct Shared {
    stats: Mutex<TelemetryStats>,
    store: TelemetryStore,
    /// Serializes writers of the telemetry file and its temp file.
    write_lock: Mutex<()>,
}

impl Shared {
    /// Copy under the stats lock; save under the write lock. Saves land
    /// on disk in the order their copies were taken.
    fn persist(&self) -> Result<(), TelemetryError> {
        let _writing = self.write_lock.lock();
        let record = self.stats.lock().to_persisted();
        self.store.save(&record)
    }
}

struct Worker {
    stop: Sender<()>,
    handle: JoinHandle<()>,
}

/// Shared, thread-safe request statistics with periodic persistence.
pub struct TelemetryAggregator {
    shared: Arc<Shared>,
    worker: Mutex<Option<Worker>>,
    shut_down: AtomicBool,
}

impl TelemetryAggregator {
    /// Load any prior snapshot and start the persistence thread.
    pub fn start(config: TelemetryConfig) -> Self {
        let aggregator = Self::without_worker(&config);
        let shared = Arc::clone(&aggregator.shared);
        let (stop, stop_rx) = mpsc::channel::<()>();
        let interval = config.persist_interval;

        let spawned = thread::Builder::new()
            .name("telemetry-persist".to_string())
            .spawn(move || loop {
                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {
                        if let Err(e) = shared.persist() {
                            log::warn!("TELEMETRY_PERSIST_FAILED error={}", e);
                        }
                    }
                    // Stop signal, or the aggregator was dropped.
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            });

        match spawned {
            Ok(handle) => {
                *aggregator.worker.lock() = Some(Worker { stop, handle });
                log::info!(
                    "TELEMETRY_STARTED path={} interval_secs={}",
                    config.path.display(),
                    interval.as_secs()
                );
            }
            Err(e) => log::error!("TELEMETRY_WORKER_SPAWN_FAILED error={}", e),
        }
        aggregator
    }

    /// Aggregator with no background thread; persists only on demand
    /// and at shutdown.
    pub fn without_worker(config: &TelemetryConfig) -> Self {
        let store = TelemetryStore::new(&config.path);
        let persisted = store.load(PersistedTelemetry::zeroed(Utc::now()));
        let stats = TelemetryStats::from_persisted(&persisted, config.window_capacity);
        Self {
            shared: Arc::new(Shared {
                stats: Mutex::new(stats),
                store,
                write_lock: Mutex::new(()),
            }),
            worker: Mutex::new(None),
            shut_down: AtomicBool::new(false),
        }
    }

    pub fn record(&self, result: &DetectionResult, response_time_ms: f64) {
        self.record_prediction(result.prediction, response_time_ms);
    }

    pub fn record_prediction(&self, prediction: Prediction, response_time_ms: f64) {
        self.shared.stats.lock().record(prediction, response_time_ms);
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        self.shared.stats.lock().snapshot(Utc::now())
    }

    /// Persist now, on the calling thread.
    pub fn persist(&self) -> Result<(), TelemetryError> {
        self.shared.persist()
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }

    /// Stop the background thread and write the final snapshot. Only the
    /// first call does any work.
    pub fn shutdown(&self) -> Result<(), TelemetryError> {
        if self.shut_down.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        if let Some(worker) = self.worker.lock().take() {
            // A send error means the thread already exited.
            let _ = worker.stop.send(());
            if worker.handle.join().is_err() {
                log::error!("TELEMETRY_WORKER_PANICKED");
            }
        }
        let result = self.shared.persist();
        match &result {
            Ok(()) => log::info!(
                "TELEMETRY_SHUTDOWN path={} api_calls={}",
                self.shared.store.path().display(),
                self.shared.stats.lock().snapshot(Utc::now()).api_calls
            ),
            Err(e) => log::warn!("TELEMETRY_FINAL_PERSIST_FAILED error={}", e),
        }
        result
    }
}

impl Drop for TelemetryAggregator {
    fn drop(&mut self) {
        let _ = self.shutdown();
    }
}
