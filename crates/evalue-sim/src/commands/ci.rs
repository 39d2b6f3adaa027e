use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use evalue_mom::{Mom, TStatistic};
use serde::Serialize;

use super::data::{load_observations, split};
use crate::write_json;

#[derive(Args, Debug)]
pub struct CiArgs {
    /// CSV file with `group,value` rows.
    #[arg(long)]
    pub data: PathBuf,
    /// Minimal relevant standardized effect size.
    #[arg(long, allow_hyphen_values = true)]
    pub delta_min: f64,
    /// Significance level.
    #[arg(long, default_value_t = 0.05)]
    pub alpha: f64,
    /// Write the report here instead of stdout.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct CiReport {
    alpha: f64,
    delta_min: f64,
    n1: usize,
    n2: usize,
    difference: f64,
    e_value: f64,
    bounded: bool,
    /// `None` when the interval is unbounded.
    lower: Option<f64>,
    upper: Option<f64>,
}

pub fn run(args: &CiArgs) -> Result<(), Box<dyn Error>> {
    let rows = load_observations(&args.data)?;
    let (x, y) = split(&rows);
    let mom = Mom::new(args.delta_min);
    let ts = TStatistic::new(&x, &y, 0.0)?;
    let ci = mom.confidence_interval(&x, &y, args.alpha)?;

    let report = CiReport {
        alpha: args.alpha,
        delta_min: args.delta_min,
        n1: x.len(),
        n2: y.len(),
        difference: ts.mean1 - ts.mean2,
        e_value: mom.e_value_t(ts.t, ts.nu, ts.n_eff),
        bounded: ci.is_bounded(),
        lower: ci.lower.is_finite().then_some(ci.lower),
        upper: ci.upper.is_finite().then_some(ci.upper),
    };
    write_json(args.out.as_deref(), &report)
}
