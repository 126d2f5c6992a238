//! Telemetry for medpredict
//!
//! In-process event collection and counters for served predictions,
//! failures and stress reports.

use crate::errors::FailureKind;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

/// Maximum number of events retained for inspection
pub const MAX_RETAINED_EVENTS: usize = 1000;

/// Telemetry event types
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TelemetryEvent {
    ModelLoaded {
        model: String,
        version: String,
        timestamp: DateTime<Utc>,
    },
    PredictionServed {
        label: String,
        latency_ms: u64,
        timestamp: DateTime<Utc>,
    },
    PredictionFailed {
        kind: FailureKind,
        timestamp: DateTime<Utc>,
    },
    StressReportServed {
        real_data_days: usize,
        timestamp: DateTime<Utc>,
    },
}

/// Telemetry statistics
#[derive(Debug, Clone, Default, Serialize)]
pub struct TelemetryStats {
    pub predictions_served: usize,
    pub predictions_failed: usize,
    pub user_errors: usize,
    pub model_errors: usize,
    pub total_latency_ms: u64,
    pub stress_reports: usize,
    pub models_loaded: usize,
}

impl TelemetryStats {
    pub fn mean_latency_ms(&self) -> f64 {
        if self.predictions_served == 0 {
            0.0
        } else {
            self.total_latency_ms as f64 / self.predictions_served as f64
        }
    }
}

/// Telemetry collector; clones share the same counters
#[derive(Clone)]
pub struct TelemetryCollector {
    events: Arc<Mutex<VecDeque<TelemetryEvent>>>,
    stats: Arc<Mutex<TelemetryStats>>,
    start_time: Instant,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl TelemetryCollector {
    /// Create a new telemetry collector
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(VecDeque::with_capacity(MAX_RETAINED_EVENTS))),
            stats: Arc::new(Mutex::new(TelemetryStats::default())),
            start_time: Instant::now(),
        }
    }

    /// Record an event
    pub fn record(&self, event: TelemetryEvent) {
        {
            let mut stats = lock(&self.stats);
            match &event {
                TelemetryEvent::ModelLoaded { .. } => {
                    stats.models_loaded += 1;
                }
                TelemetryEvent::PredictionServed { latency_ms, .. } => {
                    stats.predictions_served += 1;
                    stats.total_latency_ms += latency_ms;
                }
                TelemetryEvent::PredictionFailed { kind, .. } => {
                    stats.predictions_failed += 1;
                    if kind.is_user_error() {
                        stats.user_errors += 1;
                    } else {
                        stats.model_errors += 1;
                    }
                }
                TelemetryEvent::StressReportServed { .. } => {
                    stats.stress_reports += 1;
                }
            }
        }

        let mut events = lock(&self.events);
        if events.len() >= MAX_RETAINED_EVENTS {
            events.pop_front();
        }
        events.push_back(event);
    }

    /// Get current statistics
    pub fn get_stats(&self) -> TelemetryStats {
        lock(&self.stats).clone()
    }

    /// Get elapsed time since start
    pub fn elapsed(&self) -> std::time::Duration {
        self.start_time.elapsed()
    }

    /// Get recent events (last n, oldest first)
    pub fn recent_events(&self, n: usize) -> Vec<TelemetryEvent> {
        let events = lock(&self.events);
        let start = events.len().saturating_sub(n);
        events.iter().skip(start).cloned().collect()
    }

    /// Share of requests that produced a prediction
    pub fn success_rate(&self) -> f64 {
        let stats = lock(&self.stats);
        let total = stats.predictions_served + stats.predictions_failed;
        if total == 0 {
            1.0
        } else {
            stats.predictions_served as f64 / total as f64
        }
    }
}

impl Default for TelemetryCollector {
    fn default() -> Self {
        Self::new()
    }
}
