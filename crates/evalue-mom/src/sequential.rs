//! Observation-by-observation testing with optional stopping.

use std::fmt::{self, Display};
use std::str::FromStr;

use evalue_core::{check_alpha, ErrorInfo, EvalueError};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::mom::Mom;

/// Arm of a two-sample experiment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Group {
    /// First group, `x`.
    A,
    /// Second group, `y`.
    B,
}

impl FromStr for Group {
    type Err = EvalueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1" | "a" | "A" => Ok(Group::A),
            "2" | "b" | "B" => Ok(Group::B),
            other => Err(EvalueError::Data(
                ErrorInfo::new("unknown-group", "group label must be 1/2 or a/b")
                    .with_context("group", other),
            )),
        }
    }
}

impl Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Group::A => write!(f, "a"),
            Group::B => write!(f, "b"),
        }
    }
}

/// Outcome of the test after an observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Decision {
    /// A group still has fewer than two observations.
    Insufficient,
    /// Evidence is below `1/alpha`; keep collecting.
    Continue,
    /// The e-value has crossed `1/alpha`; the null is rejected.
    Reject,
}

/// Result of a single [`SequentialTest::push`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Number of observations seen so far, both groups combined.
    pub observation: usize,
    /// E-value after this observation, if it could be computed.
    pub e_value: Option<f64>,
    /// Decision after this observation.
    pub decision: Decision,
}

/// Sequential two-sample test that evaluates the e-process after every
/// observation and stops the first time it exceeds `1/alpha`.
///
/// Observations pushed after the stop are still recorded and their e-values
/// reported; the decision stays [`Decision::Reject`].
#[derive(Debug, Clone)]
pub struct SequentialTest {
    mom: Mom,
    alpha: f64,
    x: Vec<f64>,
    y: Vec<f64>,
    history: Vec<f64>,
    stopped_at: Option<usize>,
}

impl SequentialTest {
    /// Creates a test at significance level `alpha`.
    pub fn new(mom: Mom, alpha: f64) -> Result<Self, EvalueError> {
        check_alpha(alpha)?;
        Ok(Self {
            mom,
            alpha,
            x: Vec::new(),
            y: Vec::new(),
            history: Vec::new(),
            stopped_at: None,
        })
    }

    /// Records an observation and re-evaluates the e-process.
    pub fn push(&mut self, group: Group, value: f64) -> Result<Step, EvalueError> {
        if !value.is_finite() {
            return Err(EvalueError::Data(
                ErrorInfo::new("non-finite-observation", "observations must be finite")
                    .with_context("group", group.to_string())
                    .with_context("value", value.to_string()),
            ));
        }
        match group {
            Group::A => self.x.push(value),
            Group::B => self.y.push(value),
        }
        let observation = self.observations();

        if self.x.len() < 2 || self.y.len() < 2 {
            return Ok(Step {
                observation,
                e_value: None,
                decision: Decision::Insufficient,
            });
        }

        let e_value = self.mom.e_value(&self.x, &self.y)?;
        self.history.push(e_value);
        if self.stopped_at.is_none() && e_value > 1.0 / self.alpha {
            debug!(observation, e_value, "null rejected");
            self.stopped_at = Some(observation);
        }
        let decision = if self.stopped_at.is_some() {
            Decision::Reject
        } else {
            Decision::Continue
        };
        Ok(Step {
            observation,
            e_value: Some(e_value),
            decision,
        })
    }

    /// Observation count at which the null was first rejected.
    pub fn stopped_at(&self) -> Option<usize> {
        self.stopped_at
    }

    /// E-values computed so far, one per observation once both groups have
    /// two observations.
    pub fn history(&self) -> &[f64] {
        &self.history
    }

    /// Total observations pushed.
    pub fn observations(&self) -> usize {
        self.x.len() + self.y.len()
    }

    /// Observations of each group.
    pub fn groups(&self) -> (&[f64], &[f64]) {
        (&self.x, &self.y)
    }

    /// Significance level of the test.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }
}
