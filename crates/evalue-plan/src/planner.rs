//! Sample-size planning for the moment-prior e-process.
//!
//! Planning runs in two stages. A deterministic root search finds the
//! fixed-design size `Batch` at which the e-value of a typical
//! (beta-quantile) t statistic under the minimal effect reaches `1/alpha`.
//! Experiments are then simulated under that effect with optional stopping
//! to find the size `N` that still achieves power `1 - beta`, and the mean
//! size actually used when stopping early.

use evalue_core::{
    check_alpha, check_open_unit, ErrorInfo, EvalueError, PlanProvenance, RngHandle,
    SchemaVersion,
};
use evalue_dist::{brent, find_bracket_mono, normal_quantile, NoncentralT};
use evalue_mom::{Mom, TStatistic};
use rand::Rng;
use rand_distr::StandardNormal;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::PlanConfig;
use crate::stat::{percentile, sorted_stop_times};

/// Absorbs rounding in `n_eff·(1 + ratio)` so an exact size is not bumped up.
const SIZE_SLACK: f64 = 1e-9;

fn plan_error(code: &str, message: &str) -> EvalueError {
    EvalueError::Plan(ErrorInfo::new(code, message))
}

/// Result of [`get_n_plan`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NPlan {
    /// Group-1 size that reaches power `1 - beta` with optional stopping.
    pub n: usize,
    /// Expected group-1 size actually used when stopping early, capped at `n`.
    pub mean: usize,
    /// Group-1 size of the fixed design without early stopping.
    pub batch: usize,
    /// Group-2 size of the fixed design.
    pub batch_n2: usize,
    /// Per-trial e-values at each checkpoint up to the stop (empty unless
    /// traces are kept).
    pub e_value_traces: Vec<Vec<f64>>,
    /// Per-trial stopping time in group-1 observations; `None` if the trial
    /// never crossed `1/alpha`.
    pub stop_times: Vec<Option<usize>>,
    /// Seed and settings that reproduce the simulation.
    pub provenance: PlanProvenance,
}

fn check_effect(delta_min: f64) -> Result<(), EvalueError> {
    if delta_min.is_finite() && delta_min != 0.0 {
        return Ok(());
    }
    Err(EvalueError::Domain(
        ErrorInfo::new("zero-effect", "delta_min must be finite and non-zero")
            .with_context("delta_min", delta_min.to_string()),
    ))
}

fn check_ratio(ratio: f64) -> Result<(), EvalueError> {
    if ratio.is_finite() && ratio > 0.0 {
        return Ok(());
    }
    Err(EvalueError::Domain(
        ErrorInfo::new("ratio", "ratio must be positive and finite")
            .with_context("ratio", ratio.to_string()),
    ))
}

/// Fixed-design group sizes `(n1, n2)` for a test at level `alpha` with
/// power `1 - beta` against `delta_min`, where `ratio = n2/n1`.
///
/// Solves for the effective sample size `n_eff` at which the e-value of the
/// beta-quantile of the noncentral t distribution (with `nu = n1 + n2 - 2`
/// and noncentrality `sqrt(n_eff)·|delta_min|`) equals `1/alpha`.
pub fn n_plan_batch(
    alpha: f64,
    beta: f64,
    delta_min: f64,
    ratio: f64,
) -> Result<(usize, usize), EvalueError> {
    check_alpha(alpha)?;
    check_open_unit("beta", beta)?;
    check_effect(delta_min)?;
    check_ratio(ratio)?;

    let mom = Mom::new(delta_min);
    let threshold = 1.0 / alpha;
    let effect = delta_min.abs();
    let nu_per_n_eff = (1.0 + ratio) * (1.0 + ratio) / ratio;
    let f = |n_eff: f64| {
        let nu = nu_per_n_eff * n_eff - 2.0;
        let t_beta = NoncentralT::new(nu, n_eff.sqrt() * effect).quantile(beta);
        mom.e_value_t(t_beta, nu, n_eff) - threshold
    };

    // Two observations per group is the smallest design with a t statistic.
    let floor = 2.0 * ratio.max(1.0) / (1.0 + ratio);
    if f(floor) >= 0.0 {
        let (n1, n2) = group_sizes(floor, ratio);
        debug!(alpha, beta, delta_min, ratio, n1, n2, "smallest design already has power");
        return Ok((n1, n2));
    }

    // Two-sided z-test sample size as a starting point, kept above the floor
    // so the search never leaves the region where nu > 0.
    let z = normal_quantile(1.0 - alpha / 2.0) + normal_quantile(1.0 - beta);
    let guess = (z / effect).powi(2).max(floor);
    let (a, b) = find_bracket_mono(f, guess);
    // Shrinking below the floor only happens when f(guess) > 0 > f(floor).
    let (a, b) = if a.min(b) < floor {
        (floor, guess)
    } else {
        (a, b)
    };
    let n_eff = brent(f, a, b, f64::EPSILON.powf(0.25)).map_err(|err| {
        EvalueError::Plan(
            ErrorInfo::new("batch-root", "could not solve for the fixed-design size")
                .with_context("alpha", alpha.to_string())
                .with_context("beta", beta.to_string())
                .with_context("delta_min", delta_min.to_string())
                .with_context("cause", err.to_string()),
        )
    })?;

    let (n1, n2) = group_sizes(n_eff, ratio);
    debug!(alpha, beta, delta_min, ratio, n_eff, n1, n2, "fixed-design size");
    Ok((n1, n2))
}

/// Group sizes `(n1, n2)` with `n2 = ratio·n1` for effective sample size
/// `n_eff = n1·n2/(n1 + n2)`, rounded up.
fn group_sizes(n_eff: f64, ratio: f64) -> (usize, usize) {
    let round_up = |size: f64| (size - SIZE_SLACK).ceil() as usize;
    (
        round_up(n_eff * (1.0 + ratio) / ratio),
        round_up(n_eff * (1.0 + ratio)),
    )
}

/// Group sizes evaluated by each simulated trial: `(i, ceil(ratio·i))`.
fn checkpoints(batch: usize, ratio: f64) -> Vec<(usize, usize)> {
    (1..=batch)
        .map(|i| (i, (ratio * i as f64).ceil() as usize))
        .collect()
}

/// Prefix sums of values and squared values; index `k` covers the first `k`
/// observations.
struct Cumulative {
    sum: Vec<f64>,
    sumsq: Vec<f64>,
}

impl Cumulative {
    fn from_draws(draws: &[f64]) -> Self {
        let mut sum = Vec::with_capacity(draws.len() + 1);
        let mut sumsq = Vec::with_capacity(draws.len() + 1);
        sum.push(0.0);
        sumsq.push(0.0);
        let (mut s, mut ss) = (0.0, 0.0);
        for &value in draws {
            s += value;
            ss += value * value;
            sum.push(s);
            sumsq.push(ss);
        }
        Self { sum, sumsq }
    }
}

struct TrialOutcome {
    stop: Option<usize>,
    trace: Vec<f64>,
}

struct TrialSetup<'a> {
    mom: Mom,
    threshold: f64,
    delta_min: f64,
    length: usize,
    checkpoints: &'a [(usize, usize)],
    keep_trace: bool,
}

fn simulate_trial(setup: &TrialSetup<'_>, rng: &mut RngHandle) -> Result<TrialOutcome, EvalueError> {
    let half = setup.delta_min / 2.0;
    let a: Vec<f64> = (0..setup.length)
        .map(|_| half + rng.sample::<f64, _>(StandardNormal))
        .collect();
    let b: Vec<f64> = (0..setup.length)
        .map(|_| -half + rng.sample::<f64, _>(StandardNormal))
        .collect();
    let a = Cumulative::from_draws(&a);
    let b = Cumulative::from_draws(&b);

    let mut trace = Vec::new();
    for &(n1, n2) in setup.checkpoints {
        let e_value = if n1 + n2 <= 2 {
            1.0
        } else {
            let ts = TStatistic::from_sufficient(
                n1, a.sum[n1], a.sumsq[n1], n2, b.sum[n2], b.sumsq[n2], 0.0,
            )?;
            setup.mom.e_value_t(ts.t, ts.nu, ts.n_eff)
        };
        if setup.keep_trace {
            trace.push(e_value);
        }
        if e_value > setup.threshold {
            return Ok(TrialOutcome {
                stop: Some(n1),
                trace,
            });
        }
    }
    Ok(TrialOutcome { stop: None, trace })
}

/// Plans the sample size of a two-sample experiment monitored with the
/// moment-prior e-process.
///
/// Simulates `config.num_samples` experiments under the minimal effect, each
/// stopped the first time its e-value exceeds `1/alpha` or at `Batch`
/// otherwise. `N` is the `(1 - beta)` quantile of the stopping times and
/// `Mean` the average stopping time capped at `N`, so that
/// `Mean <= N <= Batch`. Results depend on `config.seed` only, never on the
/// number of threads.
pub fn get_n_plan(
    alpha: f64,
    beta: f64,
    delta_min: f64,
    config: &PlanConfig,
) -> Result<NPlan, EvalueError> {
    config.validate()?;
    let (batch, batch_n2) = n_plan_batch(alpha, beta, delta_min, config.ratio)?;
    let checkpoints = checkpoints(batch, config.ratio);
    let length = checkpoints
        .last()
        .map_or(batch, |&(n1, n2)| n1.max(n2))
        .max(batch_n2);

    let setup = TrialSetup {
        mom: Mom::new(delta_min),
        threshold: 1.0 / alpha,
        delta_min,
        length,
        checkpoints: &checkpoints,
        keep_trace: config.keep_traces,
    };

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .build()
        .map_err(|err| plan_error("thread-pool", &err.to_string()))?;
    let outcomes: Result<Vec<TrialOutcome>, EvalueError> = pool.install(|| {
        (0..config.num_samples)
            .into_par_iter()
            .map(|index| {
                let mut rng = RngHandle::substream(config.seed, index as u64);
                simulate_trial(&setup, &mut rng)
            })
            .collect()
    });
    let outcomes = outcomes?;

    let stop_times: Vec<Option<usize>> = outcomes.iter().map(|outcome| outcome.stop).collect();
    let sorted = sorted_stop_times(&stop_times);
    let quantile = percentile(&sorted, 1.0 - beta);
    let n = if quantile.is_finite() {
        (quantile.ceil() as usize).min(batch)
    } else {
        batch
    };
    let capped_total: usize = stop_times
        .iter()
        .map(|stop| stop.map_or(n, |time| time.min(n)))
        .sum();
    let mean = (capped_total as f64 / stop_times.len() as f64).ceil() as usize;

    let stopped = stop_times.iter().filter(|stop| stop.is_some()).count();
    info!(
        n,
        mean,
        batch,
        stopped,
        trials = config.num_samples,
        "sample size planned"
    );

    let e_value_traces = if config.keep_traces {
        outcomes.into_iter().map(|outcome| outcome.trace).collect()
    } else {
        Vec::new()
    };

    Ok(NPlan {
        n,
        mean,
        batch,
        batch_n2,
        e_value_traces,
        stop_times,
        provenance: PlanProvenance {
            schema_version: SchemaVersion::default(),
            seed: config.seed,
            num_samples: config.num_samples,
            ratio: config.ratio,
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkpoints_follow_ratio() {
        assert_eq!(checkpoints(3, 1.0), vec![(1, 1), (2, 2), (3, 3)]);
        assert_eq!(checkpoints(3, 1.5), vec![(1, 2), (2, 3), (3, 5)]);
    }

    #[test]
    fn cumulative_sums_start_at_zero() {
        let c = Cumulative::from_draws(&[1.0, -2.0, 3.0]);
        assert_eq!(c.sum, vec![0.0, 1.0, -1.0, 2.0]);
        assert_eq!(c.sumsq, vec![0.0, 1.0, 5.0, 14.0]);
    }

    #[test]
    fn batch_rejects_invalid_inputs() {
        assert!(matches!(
            n_plan_batch(0.05, 0.2, 0.0, 1.0),
            Err(EvalueError::Domain(_))
        ));
        assert!(n_plan_batch(0.05, 1.0, 0.5, 1.0).is_err());
        assert!(n_plan_batch(0.05, 0.2, 0.5, -1.0).is_err());
    }
}
