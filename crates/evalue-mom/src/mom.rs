//! Moment-prior (Mom) e-process for the two-sample t-test.
//!
//! The e-value is the Bayes factor of a normal-moment prior on the
//! standardized effect against the point null, written in closed form with a
//! Gaussian hypergeometric function. Rejecting the first time it exceeds
//! `1/alpha` keeps the false-positive rate at `alpha` by Ville's inequality.

use evalue_core::{check_alpha, EvalueError};
use evalue_dist::{brent, hyp2f1};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::tstat::TStatistic;

/// Moment order of the prior.
const K: f64 = 1.0;

/// First upper end tried when inverting the e-value. The two-sided 95%
/// critical t value for the smallest sample is about 12.7.
const CI_INITIAL_UPPER: f64 = 12.0;

/// Number of times the upper end is doubled before giving up.
const CI_MAX_DOUBLINGS: i32 = 15;

/// Moment-prior e-process with prior scale `g`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mom {
    /// Prior scale, `delta_min² / 2`.
    pub g: f64,
}

/// Interval for the difference in group means.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    /// Lower end, possibly `-inf`.
    pub lower: f64,
    /// Upper end, possibly `+inf`.
    pub upper: f64,
}

impl ConfidenceInterval {
    /// The interval `(-inf, +inf)`, returned when the data cannot bound the
    /// effect.
    pub fn unbounded() -> Self {
        Self {
            lower: f64::NEG_INFINITY,
            upper: f64::INFINITY,
        }
    }

    /// Whether both ends are finite.
    pub fn is_bounded(&self) -> bool {
        self.lower.is_finite() && self.upper.is_finite()
    }

    /// Whether `value` lies inside the closed interval.
    pub fn contains(&self, value: f64) -> bool {
        self.lower <= value && value <= self.upper
    }
}

impl Mom {
    /// Builds the e-process tuned to the minimal clinically relevant
    /// standardized effect size `delta_min`.
    pub fn new(delta_min: f64) -> Self {
        Self {
            g: delta_min * delta_min / 2.0,
        }
    }

    /// E-value for `H0: mean(x) = mean(y)`.
    pub fn e_value(&self, x: &[f64], y: &[f64]) -> Result<f64, EvalueError> {
        self.e_value_with_null(x, y, 0.0)
    }

    /// E-value for `H0: mean(x) - mean(y) = phi0`.
    pub fn e_value_with_null(&self, x: &[f64], y: &[f64], phi0: f64) -> Result<f64, EvalueError> {
        let ts = TStatistic::new(x, y, phi0)?;
        Ok(self.e_value_t(ts.t, ts.nu, ts.n_eff))
    }

    /// E-value of a t statistic with `nu` degrees of freedom and effective
    /// sample size `n_eff`.
    pub fn e_value_t(&self, t: f64, nu: f64, n_eff: f64) -> f64 {
        let ng = n_eff * self.g;
        let shrink = (1.0 + ng).powf(-K - 0.5);
        // t²/(nu + t²) tends to 1 as |t| grows; keep the limit for infinite t.
        let share = if t.is_infinite() {
            1.0
        } else {
            t * t / (nu + t * t)
        };
        let z = share * ng / (1.0 + ng);
        shrink * hyp2f1((nu + 1.0) / 2.0, K + 0.5, 0.5, z)
    }

    /// Confidence interval for `mean(x) - mean(y)` at level `1 - alpha`.
    ///
    /// Inverts the e-value: the interval holds every shift `phi0` whose
    /// e-value stays below `1/alpha`. When the e-value cannot reach `1/alpha`
    /// for any t (small samples), the unbounded interval is returned.
    pub fn confidence_interval(
        &self,
        x: &[f64],
        y: &[f64],
        alpha: f64,
    ) -> Result<ConfidenceInterval, EvalueError> {
        check_alpha(alpha)?;
        let ts = TStatistic::new(x, y, 0.0)?;
        let threshold = 1.0 / alpha;
        let f = |t: f64| self.e_value_t(t, ts.nu, ts.n_eff) - threshold;

        let limit = CI_INITIAL_UPPER * 2f64.powi(CI_MAX_DOUBLINGS);
        let mut upper = CI_INITIAL_UPPER;
        while upper < limit {
            match brent(f, 0.0, upper, f64::EPSILON) {
                Ok(t_alpha) => {
                    let width = ts.sp / ts.n_eff.sqrt() * t_alpha;
                    let center = ts.mean1 - ts.mean2;
                    debug!(t_alpha, width, "confidence interval solved");
                    return Ok(ConfidenceInterval {
                        lower: center - width,
                        upper: center + width,
                    });
                }
                Err(err) => debug!(upper, %err, "no root below upper end"),
            }
            upper *= 2.0;
        }

        warn!(
            nu = ts.nu,
            n_eff = ts.n_eff,
            alpha,
            "e-value never reaches 1/alpha; interval is unbounded"
        );
        Ok(ConfidenceInterval::unbounded())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn e_value_at_zero_is_prior_shrinkage() {
        let mom = Mom::new(0.8);
        for (nu, n_eff) in [(2.0, 1.0), (10.0, 3.0), (250.0, 63.0)] {
            let expected = (1.0 + n_eff * mom.g).powf(-1.5);
            assert!((mom.e_value_t(0.0, nu, n_eff) - expected).abs() < 1e-15);
        }
    }

    #[test]
    fn e_value_is_bounded_in_t() {
        let mom = Mom::new(0.51765);
        let sup = mom.e_value_t(f64::INFINITY, 12.0, 3.5);
        assert!(sup.is_finite());
        assert!(mom.e_value_t(1e6, 12.0, 3.5) <= sup * (1.0 + 1e-12));
        assert_eq!(mom.e_value_t(-4.0, 12.0, 3.5), mom.e_value_t(4.0, 12.0, 3.5));
    }

    #[test]
    fn rejects_invalid_alpha() {
        let mom = Mom::new(0.5);
        let x = [1.0, 2.0, 3.0];
        let err = mom.confidence_interval(&x, &x, 1.5).unwrap_err();
        assert!(matches!(err, EvalueError::Domain(_)));
    }

    #[test]
    fn interval_helpers() {
        let ci = ConfidenceInterval::unbounded();
        assert!(!ci.is_bounded());
        assert!(ci.contains(1e300));
        let ci = ConfidenceInterval {
            lower: -1.0,
            upper: 2.0,
        };
        assert!(ci.is_bounded());
        assert!(!ci.contains(2.5));
    }
}
