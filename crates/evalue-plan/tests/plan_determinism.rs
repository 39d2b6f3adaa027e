use evalue_core::EvalueError;
use evalue_plan::{get_n_plan, PlanConfig};

const ALPHA: f64 = 0.05;
const BETA: f64 = 0.2;
const DELTA_MIN: f64 = 0.51765;

#[test]
fn planned_sizes_fall_in_monte_carlo_band() -> Result<(), EvalueError> {
    let plan = get_n_plan(ALPHA, BETA, DELTA_MIN, &PlanConfig::default())?;
    assert_eq!(plan.batch, 113);
    assert_eq!(plan.batch_n2, 113);
    assert!((85..=105).contains(&plan.n), "N = {}", plan.n);
    assert!((48..=64).contains(&plan.mean), "Mean = {}", plan.mean);
    assert!(plan.mean <= plan.n && plan.n <= plan.batch);
    assert_eq!(plan.stop_times.len(), 1000);
    assert_eq!(plan.e_value_traces.len(), 1000);
    Ok(())
}

#[test]
fn traces_end_at_the_stopping_checkpoint() -> Result<(), EvalueError> {
    let config = PlanConfig {
        num_samples: 200,
        ..PlanConfig::default()
    };
    let plan = get_n_plan(ALPHA, BETA, DELTA_MIN, &config)?;
    for (trace, stop) in plan.e_value_traces.iter().zip(&plan.stop_times) {
        match stop {
            Some(n) => {
                assert_eq!(trace.len(), *n);
                assert!(*trace.last().unwrap() > 1.0 / ALPHA);
                assert!(trace[..trace.len() - 1].iter().all(|&e| e <= 1.0 / ALPHA));
            }
            None => {
                assert_eq!(trace.len(), plan.batch);
                assert!(trace.iter().all(|&e| e <= 1.0 / ALPHA));
            }
        }
        // First checkpoint has a single observation per group.
        assert_eq!(trace[0], 1.0);
    }
    Ok(())
}

#[test]
fn identical_seeds_agree_across_thread_counts() -> Result<(), EvalueError> {
    let base = PlanConfig {
        num_samples: 300,
        seed: 42,
        ..PlanConfig::default()
    };
    let single = get_n_plan(ALPHA, BETA, DELTA_MIN, &PlanConfig { threads: 1, ..base.clone() })?;
    let multi = get_n_plan(ALPHA, BETA, DELTA_MIN, &PlanConfig { threads: 4, ..base.clone() })?;
    assert_eq!(single, multi);

    let other = get_n_plan(ALPHA, BETA, DELTA_MIN, &PlanConfig { seed: 43, ..base })?;
    assert_ne!(single.stop_times, other.stop_times);
    assert_eq!(other.provenance.seed, 43);
    Ok(())
}

#[test]
fn traces_can_be_dropped() -> Result<(), EvalueError> {
    let config = PlanConfig {
        num_samples: 50,
        keep_traces: false,
        ..PlanConfig::default()
    };
    let plan = get_n_plan(ALPHA, BETA, DELTA_MIN, &config)?;
    assert!(plan.e_value_traces.is_empty());
    assert_eq!(plan.stop_times.len(), 50);
    Ok(())
}

#[test]
fn invalid_config_is_rejected() {
    let config = PlanConfig {
        num_samples: 0,
        ..PlanConfig::default()
    };
    let err = get_n_plan(ALPHA, BETA, DELTA_MIN, &config).unwrap_err();
    assert!(matches!(err, EvalueError::Config(_)));
}
