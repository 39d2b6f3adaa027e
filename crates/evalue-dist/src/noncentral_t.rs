//! Noncentral Student t distribution.
//!
//! The CDF follows Lenth's AS 243 algorithm with the corrections used by R's
//! `pnt`: a twin Poisson-weighted series of incomplete beta functions, with a
//! normal approximation (Abramowitz & Stegun 26.7.10) when the series cannot
//! be started or does not converge.

use tracing::{debug, warn};

use crate::root::{brent, find_bracket_mono};
use crate::special::{ln_gamma, normal_cdf, normal_quantile, normal_tail, reg_inc_beta};

const ITERATION_CAP: usize = 1000;
const ERROR_BOUND: f64 = 1e-12;
const ROUNDING_SLACK: f64 = 1e-10;
const QUANTILE_TOLERANCE: f64 = 1e-12;

const SQRT_2_OVER_PI: f64 = 0.797_884_560_802_865_4;
const LN_SQRT_PI: f64 = 0.572_364_942_924_700_1;

/// Noncentral t distribution with `nu` degrees of freedom and noncentrality
/// parameter `ncp`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoncentralT {
    /// Degrees of freedom, must be positive.
    pub nu: f64,
    /// Noncentrality parameter.
    pub ncp: f64,
}

/// State of the twin series after an iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
enum SeriesState {
    Running,
    Converged(f64),
    /// Remaining Poisson mass went negative beyond rounding slack.
    RoundingGuard(f64),
    /// Series unusable; use the normal approximation.
    OverflowFallback,
}

struct TwinSeries {
    x: f64,
    lambda: f64,
    a: f64,
    b: f64,
    p: f64,
    q: f64,
    s: f64,
    xodd: f64,
    xeven: f64,
    godd: f64,
    geven: f64,
    tnc: f64,
}

impl TwinSeries {
    /// Initial terms for `|t|` and the sign-adjusted noncentrality.
    fn start(nu: f64, t: f64, del: f64) -> Result<Self, SeriesState> {
        let t2 = t * t;
        let x = t2 / (t2 + nu);
        if x <= 0.0 {
            return Err(SeriesState::Converged(0.0));
        }

        let lambda = del * del;
        let p = 0.5 * (-0.5 * lambda).exp();
        if p == 0.0 {
            return Err(SeriesState::OverflowFallback);
        }
        let q = SQRT_2_OVER_PI * p * del;
        let mut s = 0.5 - p;
        if s < 1e-7 {
            s = -0.5 * (-0.5 * lambda).exp_m1();
        }

        let a = 0.5;
        let b = 0.5 * nu;
        let rxb = (nu / (t2 + nu)).powf(b);
        let albeta = LN_SQRT_PI + ln_gamma(b) - ln_gamma(0.5 + b);
        let xodd = reg_inc_beta(a, b, x);
        let godd = 2.0 * rxb * (a * x.ln() - albeta).exp();
        let xeven = 1.0 - rxb;
        let geven = b * x * rxb;
        let tnc = p * xodd + q * xeven;

        Ok(Self {
            x,
            lambda,
            a,
            b,
            p,
            q,
            s,
            xodd,
            xeven,
            godd,
            geven,
            tnc,
        })
    }

    fn advance(&mut self, iteration: usize) -> SeriesState {
        let it = iteration as f64;
        self.a += 1.0;
        self.xodd -= self.godd;
        self.xeven -= self.geven;
        self.godd *= self.x * (self.a + self.b - 1.0) / self.a;
        self.geven *= self.x * (self.a + self.b - 0.5) / (self.a + 0.5);
        self.p *= self.lambda / (2.0 * it);
        self.q *= self.lambda / (2.0 * it + 1.0);
        self.s -= self.p;
        self.tnc += self.p * self.xodd + self.q * self.xeven;

        if self.s < -ROUNDING_SLACK {
            return SeriesState::RoundingGuard(self.tnc);
        }
        if self.s <= 0.0 && iteration > 1 {
            return SeriesState::Converged(self.tnc);
        }
        let error_bound = 2.0 * self.s * (self.xodd - self.godd);
        if error_bound.abs() < ERROR_BOUND {
            return SeriesState::Converged(self.tnc);
        }
        SeriesState::Running
    }

    fn run(mut self) -> SeriesState {
        for iteration in 1..=ITERATION_CAP {
            match self.advance(iteration) {
                SeriesState::Running => continue,
                done => return done,
            }
        }
        warn!(cap = ITERATION_CAP, lambda = self.lambda, "noncentral t series did not converge");
        SeriesState::OverflowFallback
    }
}

impl NoncentralT {
    /// Creates a distribution with `nu` degrees of freedom and noncentrality
    /// `ncp`.
    pub fn new(nu: f64, ncp: f64) -> Self {
        Self { nu, ncp }
    }

    /// Cumulative distribution function `P(T <= t)`.
    ///
    /// Returns NaN when `nu` is not positive or any argument is NaN.
    pub fn cdf(&self, t: f64) -> f64 {
        let nu = self.nu;
        if nu.is_nan() || nu <= 0.0 || t.is_nan() || self.ncp.is_nan() {
            return f64::NAN;
        }

        if t.is_infinite() {
            return if t > 0.0 { 1.0 } else { 0.0 };
        }

        let (negdel, tt, del) = if t >= 0.0 {
            (false, t, self.ncp)
        } else {
            (true, -t, -self.ncp)
        };

        let state = match TwinSeries::start(nu, tt, del) {
            Ok(series) => series.run(),
            Err(state) => state,
        };

        match state {
            SeriesState::Converged(tnc) => finish(tnc, del, negdel),
            SeriesState::RoundingGuard(tnc) => {
                debug!(nu, ncp = self.ncp, t, "noncentral t series hit rounding guard");
                finish(tnc, del, negdel)
            }
            SeriesState::Running | SeriesState::OverflowFallback => {
                debug!(nu, ncp = self.ncp, t, "noncentral t using normal approximation");
                let s = 1.0 / (4.0 * nu);
                normal_tail(
                    tt * (1.0 - s),
                    del,
                    (1.0 + tt * tt * 2.0 * s).sqrt(),
                    !negdel,
                )
            }
        }
    }

    /// Quantile function, the inverse of [`NoncentralT::cdf`].
    ///
    /// Returns `-inf`/`+inf` at 0 and 1 and NaN when `p` lies outside
    /// `[0, 1]`, `nu` is not positive, or the inversion fails.
    pub fn quantile(&self, p: f64) -> f64 {
        if self.nu.is_nan() || self.nu <= 0.0 || p.is_nan() || !(0.0..=1.0).contains(&p) {
            return f64::NAN;
        }
        if p == 0.0 {
            return f64::NEG_INFINITY;
        }
        if p == 1.0 {
            return f64::INFINITY;
        }

        let guess = self.ncp + normal_quantile(p);
        let guess = if guess == 0.0 { 1.0 } else { guess };
        let (a, b) = find_bracket_mono(|t| self.cdf(t) - p, guess);
        match brent(|t| self.cdf(t) - p, a, b, QUANTILE_TOLERANCE) {
            Ok(root) => root,
            Err(err) => {
                warn!(nu = self.nu, ncp = self.ncp, p, %err, "noncentral t quantile failed");
                f64::NAN
            }
        }
    }
}

fn finish(tnc: f64, del: f64, negdel: bool) -> f64 {
    let p = (tnc + normal_cdf(-del)).min(1.0);
    if negdel {
        0.5 - p + 0.5
    } else {
        p
    }
}
