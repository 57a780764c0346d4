//! Latency statistics over per-iteration samples.

use serde::{Deserialize, Serialize};

/// Summary of per-iteration elapsed times, all in microseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatencyStats {
    /// Number of samples
    pub samples: usize,
    /// Arithmetic mean: sum of samples divided by the sample count
    pub mean_us: f64,
    /// Fastest sample
    pub min_us: u64,
    /// Slowest sample
    pub max_us: u64,
    /// Median sample
    pub median_us: u64,
    /// 95th percentile
    pub p95_us: u64,
    /// 99th percentile
    pub p99_us: u64,
}

impl LatencyStats {
    /// Compute statistics. Returns `None` for an empty sample set.
    pub fn from_samples(samples: &[u64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }

        let total: u128 = samples.iter().map(|&s| u128::from(s)).sum();
        let mean_us = total as f64 / samples.len() as f64;

        let mut sorted = samples.to_vec();
        sorted.sort_unstable();
        let n = sorted.len();

        Some(Self {
            samples: n,
            mean_us,
            min_us: sorted[0],
            max_us: sorted[n - 1],
            median_us: sorted[n / 2],
            p95_us: sorted[percentile_index(n, 0.95)],
            p99_us: sorted[percentile_index(n, 0.99)],
        })
    }
}

fn percentile_index(len: usize, quantile: f64) -> usize {
    ((len as f64 * quantile) as usize).min(len - 1)
}
