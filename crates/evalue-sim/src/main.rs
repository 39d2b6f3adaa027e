use std::error::Error;
use std::fs;
use std::io::Write;
use std::path::Path;

use clap::{Parser, Subcommand};
use commands::{
    ci::{self, CiArgs},
    continuation::{self, ContinuationArgs},
    plan::{self, PlanArgs},
    test::{self, TestArgs},
};
use evalue_plan::to_canonical_json_pretty;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "evalue-sim", about = "Anytime-valid two-sample testing with e-values")]
struct Cli {
    /// Log debug events (overridden by RUST_LOG).
    #[arg(long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a sequential e-value test over a CSV of observations.
    Test(TestArgs),
    /// Confidence interval for the difference in group means.
    Ci(CiArgs),
    /// Plan the sample size of an experiment.
    Plan(PlanArgs),
    /// Compare Type-I error of monitoring strategies on simulated data.
    Continuation(ContinuationArgs),
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Command::Test(args) => test::run(&args),
        Command::Ci(args) => ci::run(&args),
        Command::Plan(args) => plan::run(&args),
        Command::Continuation(args) => continuation::run(&args),
    }
}

/// Writes `value` as canonical pretty JSON to `out`, or to stdout.
pub(crate) fn write_json<T: Serialize>(out: Option<&Path>, value: &T) -> Result<(), Box<dyn Error>> {
    let text = to_canonical_json_pretty(value)?;
    match out {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, text)?;
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{text}")?;
        }
    }
    Ok(())
}
