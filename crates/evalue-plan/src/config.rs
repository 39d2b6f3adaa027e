//! YAML-configurable settings for the planner and the monitoring study.

use std::fs;
use std::path::Path;

use evalue_core::{check_alpha, ErrorInfo, EvalueError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Master seed used when the caller does not provide one.
pub const DEFAULT_SEED: u64 = 0x0E7A_15AF_E5EE_D001;

fn config_error(code: &str, message: impl Into<String>) -> EvalueError {
    EvalueError::Config(ErrorInfo::new(code, message))
}

fn invalid_field(code: &str, message: &str, field: &str, value: impl ToString) -> EvalueError {
    EvalueError::Config(ErrorInfo::new(code, message).with_context(field, value.to_string()))
}

/// Settings of the Monte-Carlo sample-size planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanConfig {
    /// Allocation ratio `n2/n1` between the groups.
    #[serde(default = "default_ratio")]
    pub ratio: f64,
    /// Number of simulated experiments.
    #[serde(default = "default_num_samples")]
    pub num_samples: usize,
    /// Master seed; trial `i` draws from substream `i`.
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Worker threads (0 lets rayon decide).
    #[serde(default)]
    pub threads: usize,
    /// Keep the per-trial e-value traces in the result.
    #[serde(default = "default_keep_traces")]
    pub keep_traces: bool,
}

fn default_ratio() -> f64 {
    1.0
}

fn default_num_samples() -> usize {
    1000
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}

fn default_keep_traces() -> bool {
    true
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            ratio: default_ratio(),
            num_samples: default_num_samples(),
            seed: default_seed(),
            threads: 0,
            keep_traces: default_keep_traces(),
        }
    }
}

impl PlanConfig {
    /// Checks that the settings describe a runnable simulation.
    pub fn validate(&self) -> Result<(), EvalueError> {
        if !(self.ratio.is_finite() && self.ratio > 0.0) {
            return Err(invalid_field(
                "ratio",
                "ratio must be positive and finite",
                "ratio",
                self.ratio,
            ));
        }
        if self.num_samples == 0 {
            return Err(config_error("num-samples", "at least one trial is required"));
        }
        Ok(())
    }

    /// Parses and validates a YAML document.
    pub fn from_yaml_str(text: &str) -> Result<Self, EvalueError> {
        let config: Self = parse_yaml(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a YAML file.
    pub fn load(path: &Path) -> Result<Self, EvalueError> {
        Self::from_yaml_str(&read_config(path)?)
    }
}

/// Settings of the optional-continuation study, which compares the Type-I
/// error of p-value and e-value monitoring strategies on simulated data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Significance level.
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    /// Minimal relevant effect the e-process is tuned to.
    #[serde(default = "default_delta_min")]
    pub delta_min: f64,
    /// Standardized effect used to generate data (0 simulates the null).
    #[serde(default)]
    pub true_delta: f64,
    /// Number of simulated experiments.
    #[serde(default = "default_num_samples")]
    pub num_samples: usize,
    /// Number of interim looks for the batch strategies.
    #[serde(default = "default_num_batches")]
    pub num_batches: usize,
    /// Observations per group added between looks.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Master seed.
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Worker threads (0 lets rayon decide).
    #[serde(default)]
    pub threads: usize,
}

fn default_alpha() -> f64 {
    0.05
}

fn default_delta_min() -> f64 {
    0.51765
}

fn default_num_batches() -> usize {
    5
}

fn default_batch_size() -> usize {
    40
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            alpha: default_alpha(),
            delta_min: default_delta_min(),
            true_delta: 0.0,
            num_samples: default_num_samples(),
            num_batches: default_num_batches(),
            batch_size: default_batch_size(),
            seed: default_seed(),
            threads: 0,
        }
    }
}

impl MonitorConfig {
    /// Observations per group at the final look.
    pub fn horizon(&self) -> usize {
        self.num_batches * self.batch_size
    }

    /// Checks that the settings describe a runnable study.
    pub fn validate(&self) -> Result<(), EvalueError> {
        check_alpha(self.alpha)
            .map_err(|err| config_error("alpha", err.info().message.clone()))?;
        if !(self.delta_min.is_finite() && self.delta_min != 0.0) {
            return Err(invalid_field(
                "delta-min",
                "delta_min must be finite and non-zero",
                "delta_min",
                self.delta_min,
            ));
        }
        if !self.true_delta.is_finite() {
            return Err(config_error("true-delta", "true_delta must be finite"));
        }
        if self.num_samples == 0 || self.num_batches == 0 {
            return Err(config_error(
                "empty-study",
                "num_samples and num_batches must be positive",
            ));
        }
        if self.batch_size < 2 {
            return Err(invalid_field(
                "batch-size",
                "batch_size must be at least 2",
                "batch_size",
                self.batch_size,
            ));
        }
        Ok(())
    }

    /// Parses and validates a YAML document.
    pub fn from_yaml_str(text: &str) -> Result<Self, EvalueError> {
        let config: Self = parse_yaml(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a YAML file.
    pub fn load(path: &Path) -> Result<Self, EvalueError> {
        Self::from_yaml_str(&read_config(path)?)
    }
}

fn parse_yaml<T: DeserializeOwned>(text: &str) -> Result<T, EvalueError> {
    serde_yaml::from_str(text).map_err(|err| config_error("config-parse", err.to_string()))
}

fn read_config(path: &Path) -> Result<String, EvalueError> {
    fs::read_to_string(path).map_err(|err| {
        EvalueError::Config(
            ErrorInfo::new("config-read", err.to_string())
                .with_context("path", path.display().to_string()),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = PlanConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, PlanConfig::default());
        assert_eq!(config.seed, DEFAULT_SEED);
        let monitor = MonitorConfig::from_yaml_str("{}").unwrap();
        assert_eq!(monitor.horizon(), 200);
    }

    #[test]
    fn rejects_bad_ratio() {
        let err = PlanConfig::from_yaml_str("ratio: -1.0").unwrap_err();
        assert!(matches!(err, EvalueError::Config(_)));
        assert_eq!(err.info().code, "ratio");
        assert_eq!(err.info().context["ratio"], "-1");
    }

    #[test]
    fn rejects_malformed_yaml() {
        let err = PlanConfig::from_yaml_str("num_samples: [").unwrap_err();
        assert_eq!(err.info().code, "config-parse");
    }
}
