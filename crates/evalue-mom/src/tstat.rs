//! Two-sample pooled-variance t statistic.

use evalue_core::{ErrorInfo, EvalueError};
use serde::{Deserialize, Serialize};

/// Summary of a two-sample comparison under a pooled variance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TStatistic {
    /// Degrees of freedom `n1 + n2 - 2`.
    pub nu: f64,
    /// Effective sample size `n1·n2/(n1 + n2)`.
    pub n_eff: f64,
    /// Mean of the first group.
    pub mean1: f64,
    /// Mean of the second group.
    pub mean2: f64,
    /// Pooled standard deviation.
    pub sp: f64,
    /// The t statistic.
    pub t: f64,
}

fn insufficient(n1: usize, n2: usize) -> EvalueError {
    EvalueError::Data(
        ErrorInfo::new(
            "insufficient-observations",
            "not enough observations for a pooled variance",
        )
        .with_context("n1", n1.to_string())
        .with_context("n2", n2.to_string()),
    )
}

impl TStatistic {
    /// Computes the statistic for `mean(x) - mean(y) = phi0`.
    pub fn new(x: &[f64], y: &[f64], phi0: f64) -> Result<Self, EvalueError> {
        if x.len() < 2 || y.len() < 2 {
            return Err(insufficient(x.len(), y.len()));
        }
        let (mean1, ss1) = mean_and_deviance(x);
        let (mean2, ss2) = mean_and_deviance(y);
        Ok(Self::assemble(
            x.len() as f64,
            mean1,
            ss1,
            y.len() as f64,
            mean2,
            ss2,
            phi0,
        ))
    }

    /// Computes the statistic from running sums and sums of squares.
    ///
    /// Unlike [`TStatistic::new`], a group may hold a single observation as
    /// long as the pooled variance has at least one degree of freedom.
    pub fn from_sufficient(
        n1: usize,
        sum1: f64,
        sumsq1: f64,
        n2: usize,
        sum2: f64,
        sumsq2: f64,
        phi0: f64,
    ) -> Result<Self, EvalueError> {
        if n1 == 0 || n2 == 0 || n1 + n2 < 3 {
            return Err(insufficient(n1, n2));
        }
        let (n1, n2) = (n1 as f64, n2 as f64);
        let mean1 = sum1 / n1;
        let mean2 = sum2 / n2;
        let ss1 = (sumsq1 - sum1 * mean1).max(0.0);
        let ss2 = (sumsq2 - sum2 * mean2).max(0.0);
        Ok(Self::assemble(n1, mean1, ss1, n2, mean2, ss2, phi0))
    }

    fn assemble(n1: f64, mean1: f64, ss1: f64, n2: f64, mean2: f64, ss2: f64, phi0: f64) -> Self {
        let nu = n1 + n2 - 2.0;
        let n_eff = n1 * n2 / (n1 + n2);
        let sp = ((ss1 + ss2) / nu).sqrt();
        let t = n_eff.sqrt() * (mean1 - mean2 - phi0) / sp;
        Self {
            nu,
            n_eff,
            mean1,
            mean2,
            sp,
            t,
        }
    }
}

fn mean_and_deviance(values: &[f64]) -> (f64, f64) {
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let deviance = values.iter().map(|v| (v - mean) * (v - mean)).sum();
    (mean, deviance)
}
