//! Monte-Carlo studies of the e-process under simulated data.

use evalue_core::{check_alpha, ErrorInfo, EvalueError, PlanProvenance, RngHandle, SchemaVersion};
use evalue_dist::reg_inc_beta;
use evalue_mom::{Mom, TStatistic};
use rand::Rng;
use rand_distr::StandardNormal;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::MonitorConfig;

fn study_error(code: &str, message: &str) -> EvalueError {
    EvalueError::Plan(ErrorInfo::new(code, message))
}

/// Paired samples of one simulated experiment, in arrival order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplePair {
    /// Group A observations.
    pub x: Vec<f64>,
    /// Group B observations.
    pub y: Vec<f64>,
}

/// Unit-variance Gaussian experiments where group B is shifted by `delta`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GaussianPairs {
    /// Mean of group B minus mean of group A.
    pub delta: f64,
}

impl GaussianPairs {
    /// Draws `num_samples` experiments of `sample_len` observations per
    /// group. Experiment `i` uses substream `i` of `seed`.
    pub fn generate(&self, num_samples: usize, sample_len: usize, seed: u64) -> Vec<SamplePair> {
        (0..num_samples)
            .into_par_iter()
            .map(|index| {
                let mut rng = RngHandle::substream(seed, index as u64);
                self.draw(sample_len, &mut rng)
            })
            .collect()
    }

    /// Draws a single experiment from `rng`.
    pub fn draw(&self, sample_len: usize, rng: &mut RngHandle) -> SamplePair {
        let mut x = Vec::with_capacity(sample_len);
        let mut y = Vec::with_capacity(sample_len);
        for _ in 0..sample_len {
            x.push(rng.sample::<f64, _>(StandardNormal));
            y.push(self.delta + rng.sample::<f64, _>(StandardNormal));
        }
        SamplePair { x, y }
    }
}

/// Running sums for one group.
#[derive(Default)]
struct Running {
    n: usize,
    sum: f64,
    sumsq: f64,
}

impl Running {
    fn push(&mut self, value: f64) {
        self.n += 1;
        self.sum += value;
        self.sumsq += value * value;
    }
}

/// T statistic after every paired observation from the second one on.
/// Entry `i` uses `i + 2` observations per group.
fn t_path(sample: &SamplePair, horizon: usize, phi0: f64) -> Result<Vec<TStatistic>, EvalueError> {
    let mut a = Running::default();
    let mut b = Running::default();
    let mut path = Vec::with_capacity(horizon.saturating_sub(1));
    for (&x, &y) in sample.x.iter().zip(&sample.y).take(horizon) {
        a.push(x);
        b.push(y);
        if a.n >= 2 {
            path.push(TStatistic::from_sufficient(
                a.n, a.sum, a.sumsq, b.n, b.sum, b.sumsq, phi0,
            )?);
        }
    }
    Ok(path)
}

fn check_horizon(data: &[SamplePair], n: usize) -> Result<(), EvalueError> {
    if n < 2 {
        return Err(EvalueError::Domain(
            ErrorInfo::new("horizon", "at least two observations per group are needed")
                .with_context("n", n.to_string()),
        ));
    }
    if let Some(short) = data.iter().find(|s| s.x.len().min(s.y.len()) < n) {
        return Err(EvalueError::Domain(
            ErrorInfo::new("horizon", "samples are shorter than the horizon")
                .with_context("n", n.to_string())
                .with_context("sample_len", short.x.len().min(short.y.len()).to_string()),
        ));
    }
    Ok(())
}

/// Fraction of experiments whose e-value for `H0: mean(x) - mean(y) = phi0`
/// reaches `1/alpha` within the first `n` observations per group.
///
/// With `phi0` set to the true difference this estimates the Type-I error of
/// optional stopping, which must not exceed `alpha`.
pub fn stopping_probability(
    data: &[SamplePair],
    mom: &Mom,
    alpha: f64,
    n: usize,
    phi0: f64,
) -> Result<f64, EvalueError> {
    check_alpha(alpha)?;
    check_horizon(data, n)?;
    if data.is_empty() {
        return Err(study_error("empty-study", "no samples to evaluate"));
    }
    let threshold = 1.0 / alpha;
    let stopped: Result<Vec<bool>, EvalueError> = data
        .par_iter()
        .map(|sample| {
            let path = t_path(sample, n, phi0)?;
            Ok(path
                .iter()
                .any(|ts| mom.e_value_t(ts.t, ts.nu, ts.n_eff) >= threshold))
        })
        .collect();
    let stopped = stopped?.into_iter().filter(|&hit| hit).count();
    Ok(stopped as f64 / data.len() as f64)
}

/// Two-sided p-value of a t statistic with `nu` degrees of freedom.
pub fn two_sided_p_value(t: f64, nu: f64) -> f64 {
    reg_inc_beta(nu / 2.0, 0.5, nu / (nu + t * t))
}

/// Monitoring strategy compared by [`optional_continuation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// p-value tested once at the horizon.
    PValueEnd,
    /// p-value tested after every batch, stopping at the first rejection.
    PValueContinuation,
    /// e-value tested once at the horizon.
    EValueEnd,
    /// e-value tested after every batch, stopping at the first rejection.
    EValueContinuation,
    /// e-value tested after every observation.
    EValueOptionalStopping,
}

impl Strategy {
    /// Every strategy, in report order.
    pub const ALL: [Strategy; 5] = [
        Strategy::PValueEnd,
        Strategy::PValueContinuation,
        Strategy::EValueEnd,
        Strategy::EValueContinuation,
        Strategy::EValueOptionalStopping,
    ];
}

/// Rejection rate of one strategy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrategyRate {
    /// Monitoring strategy.
    pub strategy: Strategy,
    /// Experiments in which the strategy rejected the null.
    pub rejections: usize,
    /// Rejection fraction; the Type-I error when `true_delta` is 0.
    pub rate: f64,
}

/// Outcome of [`optional_continuation`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContinuationReport {
    /// Settings of the study.
    pub config: MonitorConfig,
    /// Rates in [`Strategy::ALL`] order.
    pub rates: Vec<StrategyRate>,
    /// Seed and trial count that reproduce the study.
    pub provenance: PlanProvenance,
}

impl ContinuationReport {
    /// Rejection rate of `strategy`.
    pub fn rate(&self, strategy: Strategy) -> f64 {
        self.rates
            .iter()
            .find(|rate| rate.strategy == strategy)
            .map_or(f64::NAN, |rate| rate.rate)
    }
}

/// Which strategies rejected in a single experiment.
fn monitor_experiment(
    sample: &SamplePair,
    config: &MonitorConfig,
    mom: &Mom,
) -> Result<[bool; 5], EvalueError> {
    let horizon = config.horizon();
    let path = t_path(sample, horizon, 0.0)?;
    let threshold = 1.0 / config.alpha;
    let e_values: Vec<f64> = path
        .iter()
        .map(|ts| mom.e_value_t(ts.t, ts.nu, ts.n_eff))
        .collect();
    let p_value = |index: usize| two_sided_p_value(path[index].t, path[index].nu);
    // Entry i holds i + 2 observations per group.
    let looks: Vec<usize> = (1..=config.num_batches)
        .map(|batch| batch * config.batch_size - 2)
        .collect();
    let last = path.len() - 1;

    Ok([
        p_value(last) < config.alpha,
        looks.iter().any(|&i| p_value(i) < config.alpha),
        e_values[last] > threshold,
        looks.iter().any(|&i| e_values[i] > threshold),
        e_values.iter().any(|&e| e > threshold),
    ])
}

/// Simulates experiments and reports how often each monitoring strategy
/// rejects.
///
/// Under the null (`true_delta = 0`) the p-value tested at the end and every
/// e-value strategy stay at or below `alpha`, while re-testing the p-value
/// after every batch inflates the Type-I error.
pub fn optional_continuation(config: &MonitorConfig) -> Result<ContinuationReport, EvalueError> {
    config.validate()?;
    let mom = Mom::new(config.delta_min);
    let horizon = config.horizon();
    let generator = GaussianPairs {
        delta: config.true_delta,
    };

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .build()
        .map_err(|err| study_error("thread-pool", &err.to_string()))?;
    let outcomes: Result<Vec<[bool; 5]>, EvalueError> = pool.install(|| {
        (0..config.num_samples)
            .into_par_iter()
            .map(|index| {
                let mut rng = RngHandle::substream(config.seed, index as u64);
                let sample = generator.draw(horizon, &mut rng);
                monitor_experiment(&sample, config, &mom)
            })
            .collect()
    });
    let outcomes = outcomes?;

    let rates: Vec<StrategyRate> = Strategy::ALL
        .iter()
        .enumerate()
        .map(|(slot, &strategy)| {
            let rejections = outcomes.iter().filter(|hits| hits[slot]).count();
            StrategyRate {
                strategy,
                rejections,
                rate: rejections as f64 / outcomes.len() as f64,
            }
        })
        .collect();
    for rate in &rates {
        info!(strategy = ?rate.strategy, rate = rate.rate, "monitoring strategy");
    }

    Ok(ContinuationReport {
        config: config.clone(),
        rates,
        provenance: PlanProvenance {
            schema_version: SchemaVersion::default(),
            seed: config.seed,
            num_samples: config.num_samples,
            ratio: 1.0,
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
        },
    })
}
