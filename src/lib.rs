//! # Policy Profile
//!
//! Latency profiler for policy evaluation engines. It measures, in
//! microseconds, how long an engine takes to evaluate a compiled query
//! against an input document, averaged over a fixed number of iterations.
//!
//! ## Modes
//!
//! - **Cached** (default): the query is prepared once, outside the timed
//!   region; each iteration times evaluation only.
//! - **Fresh**: the query is prepared again in every iteration and the
//!   preparation is timed together with evaluation.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use policy_profile::adapters::RegoEngine;
//! use policy_profile::benchmarks::run_benchmark;
//! use policy_profile::{Mode, RunConfig, Session};
//!
//! fn main() -> policy_profile::Result<()> {
//!     let session = Session::builder()
//!         .with_policy("example.rego", "package example\n\ndefault allow = true\n")?
//!         .with_input(serde_json::json!({"x": 1}))
//!         .with_query("data.example.allow")
//!         .build()?;
//!
//!     let config = RunConfig::new(Some(1000))?.with_mode(Mode::Cached);
//!     let outcome = run_benchmark(&RegoEngine::new(), &session, &config)?;
//!     println!("{}", outcome.summary_line());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod adapters;
pub mod benchmarks;
pub mod config;
pub mod error;
pub mod session;
pub mod telemetry;

// Re-export main types for convenience
pub use adapters::{EngineError, PolicyEngine, RegoEngine};
pub use benchmarks::{run_benchmark, BenchmarkOutcome, BenchmarkResult};
pub use config::{Mode, RunConfig};
pub use error::{Error, Result};
pub use session::{Session, SessionBuilder, Target};
