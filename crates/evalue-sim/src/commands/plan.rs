use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use evalue_plan::{get_n_plan, PlanConfig};

use crate::write_json;

#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Significance level.
    #[arg(long, default_value_t = 0.05)]
    pub alpha: f64,
    /// One minus the desired power.
    #[arg(long, default_value_t = 0.2)]
    pub beta: f64,
    /// Minimal relevant standardized effect size.
    #[arg(long, allow_hyphen_values = true)]
    pub delta_min: f64,
    /// YAML planner configuration.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Master seed (overrides the configuration).
    #[arg(long)]
    pub seed: Option<u64>,
    /// Number of simulated experiments (overrides the configuration).
    #[arg(long)]
    pub trials: Option<usize>,
    /// Allocation ratio n2/n1 (overrides the configuration).
    #[arg(long)]
    pub ratio: Option<f64>,
    /// Worker threads (overrides the configuration).
    #[arg(long)]
    pub threads: Option<usize>,
    /// Include per-trial e-value traces in the report.
    #[arg(long)]
    pub traces: bool,
    /// Write the report here instead of stdout.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

pub fn run(args: &PlanArgs) -> Result<(), Box<dyn Error>> {
    let mut config = match &args.config {
        Some(path) => PlanConfig::load(path)?,
        None => PlanConfig {
            keep_traces: false,
            ..PlanConfig::default()
        },
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(trials) = args.trials {
        config.num_samples = trials;
    }
    if let Some(ratio) = args.ratio {
        config.ratio = ratio;
    }
    if let Some(threads) = args.threads {
        config.threads = threads;
    }
    if args.traces {
        config.keep_traces = true;
    }

    let plan = get_n_plan(args.alpha, args.beta, args.delta_min, &config)?;
    write_json(args.out.as_deref(), &plan)
}
