use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use evalue_plan::{optional_continuation, MonitorConfig};

use crate::write_json;

#[derive(Args, Debug)]
pub struct ContinuationArgs {
    /// YAML study configuration.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Master seed (overrides the configuration).
    #[arg(long)]
    pub seed: Option<u64>,
    /// Number of simulated experiments (overrides the configuration).
    #[arg(long)]
    pub trials: Option<usize>,
    /// Worker threads (overrides the configuration).
    #[arg(long)]
    pub threads: Option<usize>,
    /// Write the report here instead of stdout.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

pub fn run(args: &ContinuationArgs) -> Result<(), Box<dyn Error>> {
    let mut config = match &args.config {
        Some(path) => MonitorConfig::load(path)?,
        None => MonitorConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(trials) = args.trials {
        config.num_samples = trials;
    }
    if let Some(threads) = args.threads {
        config.threads = threads;
    }

    let report = optional_continuation(&config)?;
    write_json(args.out.as_deref(), &report)
}
