//! Benchmark Result Record
//!
//! The machine-readable record of one completed run:
//! - `run_id: Uuid`
//! - `target_id: String` (the query expression)
//! - `metrics: serde_json::Value`
//! - `timestamp: chrono::DateTime<chrono::Utc>`

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Record of a completed benchmark run.
///
/// Only successful runs produce a record; a failed run reports nothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkResult {
    /// Unique identifier for this run
    pub run_id: Uuid,

    /// The query expression that was benchmarked
    pub target_id: String,

    /// JSON object containing benchmark metrics
    ///
    /// Fields written by the profiler:
    /// - `engine`, `mode`, `iterations`
    /// - `mean_us`, `min_us`, `max_us`, `median_us`, `p95_us`, `p99_us`
    /// - `total_ms`: wall time of the timed loop
    /// - `throughput`: evaluations per second
    pub metrics: Value,

    /// UTC timestamp when the run finished
    pub timestamp: DateTime<Utc>,
}

impl BenchmarkResult {
    /// Create a new record with a fresh run id and the current timestamp.
    pub fn new(target_id: impl Into<String>, metrics: Value) -> Self {
        Self::with_timestamp(target_id, metrics, Utc::now())
    }

    /// Create a record with a specific timestamp.
    ///
    /// Useful for testing or when replaying historical benchmark data.
    pub fn with_timestamp(
        target_id: impl Into<String>,
        metrics: Value,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            target_id: target_id.into(),
            metrics,
            timestamp,
        }
    }

    /// Get the mean per-iteration time in microseconds if available.
    pub fn mean_us(&self) -> Option<f64> {
        self.metrics.get("mean_us").and_then(|v| v.as_f64())
    }

    /// Get the iteration count if available.
    pub fn iterations(&self) -> Option<u64> {
        self.metrics.get("iterations").and_then(|v| v.as_u64())
    }

    /// Get the throughput if available.
    pub fn throughput(&self) -> Option<f64> {
        self.metrics.get("throughput").and_then(|v| v.as_f64())
    }
}
