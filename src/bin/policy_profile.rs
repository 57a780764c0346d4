//! Policy Profile CLI
//!
//! Measures the average evaluation time of one query or rule.
//!
//! Usage:
//!   policy-profile [OPTIONS] --num-iterations <N> <QUERY>
//!   policy-profile [OPTIONS] --num-iterations <N> --rule <RULE>
//!
//! Options:
//!   -d, --data <PATH>             Policy source or data document (repeatable)
//!   -i, --input <PATH>            Input document
//!   -n, --num-iterations <N>      Number of timed iterations
//!   -r, --rule <RULE>             Evaluate a rule path instead of a query
//!   -s, --show-output[=<BOOL>]    Print the final result as indented JSON
//!   -f, --fresh-query[=<BOOL>]    Prepare the query anew in every iteration
//!   -v, --verbose                 Enable debug logging
//!   --log-format <FORMAT>         Log format: text or json
//!   --json                        Print the run report as JSON
//!   --report <PATH>               Write the run report to a file

use clap::{ArgAction, Parser};
use policy_profile::benchmarks::{io, run_benchmark};
use policy_profile::session::{load_session, SessionSpec};
use policy_profile::telemetry::{self, LogFormat};
use policy_profile::{Mode, PolicyEngine, RegoEngine, Result, RunConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

/// Policy evaluation latency profiler
#[derive(Parser, Debug)]
#[command(name = "policy-profile")]
#[command(author = "LLM Policy Engine Team")]
#[command(version)]
#[command(about = "Profile policy evaluation time")]
struct Args {
    /// Policy source or data document. `.json`, `.yaml` and `.yml` files are
    /// merged into the data document; anything else is policy source.
    #[arg(long, short, value_name = "policy.rego|data.json")]
    data: Vec<PathBuf>,

    /// Input document (json or yaml)
    #[arg(long, short, value_name = "input.json")]
    input: Option<PathBuf>,

    /// Number of iterations
    #[arg(long, short, value_name = "N")]
    num_iterations: Option<usize>,

    /// Rule path to evaluate instead of a query
    #[arg(long, short, value_name = "RULE")]
    rule: Option<String>,

    /// Show the final iteration's output
    #[arg(
        long,
        short,
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_value_t = false,
        default_missing_value = "true"
    )]
    show_output: bool,

    /// Use a fresh query in each iteration
    #[arg(
        long,
        short,
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_value_t = false,
        default_missing_value = "true"
    )]
    fresh_query: bool,

    /// Enable debug logging
    #[arg(long, short)]
    verbose: bool,

    /// Log format
    #[arg(long, value_enum, env = "POLICY_PROFILE_LOG_FORMAT", default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Print the run report as JSON after the average line
    #[arg(long)]
    json: bool,

    /// Write the run report to this file
    #[arg(long, value_name = "PATH")]
    report: Option<PathBuf>,

    /// Query expression
    #[arg(value_name = "QUERY")]
    queries: Vec<String>,
}

impl Args {
    fn run_config(&self) -> Result<RunConfig> {
        Ok(RunConfig::new(self.num_iterations)?
            .with_mode(Mode::from_fresh_flag(self.fresh_query))
            .with_show_output(self.show_output))
    }

    fn session_spec(&self) -> SessionSpec {
        SessionSpec {
            data: self.data.clone(),
            input: self.input.clone(),
            queries: self.queries.clone(),
            rule: self.rule.clone(),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = telemetry::init_logging(args.verbose, args.log_format) {
        eprintln!("error[{}]: {}", e.category(), e);
        return ExitCode::from(e.exit_code());
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error[{}]: {}", e.category(), e);
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let config = args.run_config()?;
    let session = load_session(&args.session_spec()).await?;

    let engine = RegoEngine::new();
    let outcome = run_benchmark(&engine, &session, &config)?;

    if let Some(rendered) = outcome.render_output()? {
        println!("{}", rendered);
    }
    println!("{}", outcome.summary_line());

    if args.json || args.report.is_some() {
        let record = outcome.to_result(engine.name(), &session);
        if args.json {
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        if let Some(path) = &args.report {
            io::write_report(&record, path)?;
            info!("Report written to {}", path.display());
        }
    }

    Ok(())
}
