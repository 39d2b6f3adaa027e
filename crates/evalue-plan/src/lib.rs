#![deny(missing_docs)]
#![doc = "Sample-size planning and Monte-Carlo validation for the moment-prior e-process."]

/// Planner and study configuration.
pub mod config;
/// Fixed-design root search and the Monte-Carlo planner.
pub mod planner;
/// Canonical JSON helpers for reports.
pub mod serde;
/// Quantiles of simulated stopping times.
pub mod stat;
/// Optional-stopping and optional-continuation studies.
pub mod studies;

pub use config::{MonitorConfig, PlanConfig, DEFAULT_SEED};
pub use planner::{get_n_plan, n_plan_batch, NPlan};
pub use crate::serde::{from_json_slice, to_canonical_json_bytes, to_canonical_json_pretty};
pub use studies::{
    optional_continuation, stopping_probability, two_sided_p_value, ContinuationReport,
    GaussianPairs, SamplePair, Strategy, StrategyRate,
};
