//! Benchmarks module
//!
//! The measurement loop and everything that reports on it:
//! - [`run_benchmark`], the timed loop
//! - [`QuerySource`] strategies for cached and fresh preparation
//! - [`LatencyStats`] aggregation
//! - [`BenchmarkResult`] report records and their I/O
//!
//! A run moves through `Idle → WarmingUp → Timing(1..=N) → Aggregating →
//! Done`. Any engine error moves it to `Failed`, which is terminal; samples
//! collected so far are dropped with the error.

pub mod io;
pub mod result;
pub mod source;
pub mod stats;

pub use result::BenchmarkResult;
pub use source::{Cached, Fresh, QuerySource};
pub use stats::LatencyStats;

use crate::adapters::PolicyEngine;
use crate::config::{Mode, RunConfig};
use crate::session::Session;
use crate::{Error, Result};

use serde::Serialize;
use serde_json::json;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace};

/// Where a run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    /// Nothing has happened yet
    Idle,
    /// Preparing inputs and absorbing first-call costs
    WarmingUp,
    /// Timing iteration `iteration` of `of`
    Timing {
        /// 1-based iteration number
        iteration: usize,
        /// Total iterations
        of: usize,
    },
    /// Computing statistics
    Aggregating,
    /// Finished successfully
    Done,
    /// Aborted by an error
    Failed,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunPhase::Idle => write!(f, "idle"),
            RunPhase::WarmingUp => write!(f, "warming-up"),
            RunPhase::Timing { iteration, of } => write!(f, "timing({}/{})", iteration, of),
            RunPhase::Aggregating => write!(f, "aggregating"),
            RunPhase::Done => write!(f, "done"),
            RunPhase::Failed => write!(f, "failed"),
        }
    }
}

fn transition(phase: &mut RunPhase, next: RunPhase) {
    if matches!(next, RunPhase::Timing { .. }) {
        trace!(from = %phase, to = %next, "phase transition");
    } else {
        debug!(from = %phase, to = %next, "phase transition");
    }
    *phase = next;
}

/// Outcome of a completed run.
#[derive(Debug)]
pub struct BenchmarkOutcome<O> {
    /// Mode the run used
    pub mode: Mode,
    /// Number of timed iterations
    pub iterations: usize,
    /// Per-iteration latency summary
    pub stats: LatencyStats,
    /// Wall time of the whole timed loop
    pub wall_time: Duration,
    /// Final iteration's result set, retained only when output display was requested
    pub output: Option<O>,
}

impl<O: Serialize> BenchmarkOutcome<O> {
    /// Mean per-iteration time in microseconds.
    pub fn mean_us(&self) -> f64 {
        self.stats.mean_us
    }

    /// The headline line printed on success.
    pub fn summary_line(&self) -> String {
        format!("average eval time = {:.2} microseconds", self.mean_us())
    }

    /// Serialize the retained result set as indented JSON.
    pub fn render_output(&self) -> Result<Option<String>> {
        self.output
            .as_ref()
            .map(serde_json::to_string_pretty)
            .transpose()
            .map_err(Error::from)
    }

    /// Evaluations per second over the timed loop.
    pub fn throughput(&self) -> f64 {
        let secs = self.wall_time.as_secs_f64();
        if secs > 0.0 {
            self.iterations as f64 / secs
        } else {
            0.0
        }
    }

    /// Build the report record for this run.
    pub fn to_result(&self, engine: &str, session: &Session) -> BenchmarkResult {
        let metrics = json!({
            "engine": engine,
            "mode": self.mode,
            "iterations": self.iterations,
            "mean_us": self.stats.mean_us,
            "min_us": self.stats.min_us,
            "max_us": self.stats.max_us,
            "median_us": self.stats.median_us,
            "p95_us": self.stats.p95_us,
            "p99_us": self.stats.p99_us,
            "total_ms": self.wall_time.as_secs_f64() * 1000.0,
            "throughput": self.throughput(),
            "policy_count": session.policy_sources().len(),
            "has_data": session.external_data().is_some(),
            "has_input": session.input().is_some(),
            "target": session.target().kind(),
        });

        BenchmarkResult::new(session.expression(), metrics)
    }
}

/// Run the benchmark loop.
///
/// Performs one untimed warm-up evaluation against a null input, then
/// exactly `config.iterations()` timed evaluations. In cached mode the
/// session is compiled once before the warm-up and compilation is never
/// timed; in fresh mode every timed window covers compile plus evaluate.
///
/// The first engine error aborts the run and is returned as-is.
pub fn run_benchmark<E: PolicyEngine>(
    engine: &E,
    session: &Session,
    config: &RunConfig,
) -> Result<BenchmarkOutcome<E::Output>> {
    let mut phase = RunPhase::Idle;

    info!(
        engine = engine.name(),
        mode = %config.mode(),
        iterations = config.iterations(),
        "Starting benchmark"
    );

    let result = execute(engine, session, config, &mut phase);

    match &result {
        Ok(outcome) => {
            transition(&mut phase, RunPhase::Done);
            info!(
                mean_us = outcome.stats.mean_us,
                min_us = outcome.stats.min_us,
                max_us = outcome.stats.max_us,
                "Benchmark completed"
            );
        }
        Err(err) => {
            // The caller reports the error itself.
            debug!(phase = %phase, error = %err, "Benchmark aborted");
            transition(&mut phase, RunPhase::Failed);
        }
    }

    result
}

fn execute<E: PolicyEngine>(
    engine: &E,
    session: &Session,
    config: &RunConfig,
    phase: &mut RunPhase,
) -> Result<BenchmarkOutcome<E::Output>> {
    transition(phase, RunPhase::WarmingUp);

    let input = engine.prepare_input(session.input())?;
    let warm_up_input = engine.prepare_input(Some(&serde_json::Value::Null))?;

    match config.mode() {
        Mode::Cached => {
            let mut source = Cached::prepare(engine, session)?;
            measure(engine, &mut source, &input, &warm_up_input, config, phase)
        }
        Mode::Fresh => {
            let mut source = Fresh::new(session);
            measure(engine, &mut source, &input, &warm_up_input, config, phase)
        }
    }
}

fn measure<E, S>(
    engine: &E,
    source: &mut S,
    input: &E::Input,
    warm_up_input: &E::Input,
    config: &RunConfig,
    phase: &mut RunPhase,
) -> Result<BenchmarkOutcome<E::Output>>
where
    E: PolicyEngine,
    S: QuerySource<E>,
{
    let query = source.next_query(engine)?;
    engine.evaluate(query, warm_up_input)?;
    source.release();

    let iterations = config.iterations();
    let mut samples = Vec::with_capacity(iterations);
    let mut last = None;

    let loop_start = Instant::now();
    for i in 1..=iterations {
        transition(phase, RunPhase::Timing { iteration: i, of: iterations });

        let start = Instant::now();
        let query = source.next_query(engine)?;
        let output = engine.evaluate(query, input)?;
        let elapsed = start.elapsed();

        source.release();
        samples.push(u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX));

        if config.show_output() && i == iterations {
            last = Some(output);
        }
    }
    let wall_time = loop_start.elapsed();

    transition(phase, RunPhase::Aggregating);
    let stats = LatencyStats::from_samples(&samples)
        .ok_or_else(|| Error::internal("benchmark loop recorded no samples"))?;

    Ok(BenchmarkOutcome {
        mode: source.mode(),
        iterations,
        stats,
        wall_time,
        output: last,
    })
}
