use evalue_core::EvalueError;
use evalue_plan::{get_n_plan, n_plan_batch, PlanConfig};
use proptest::prelude::*;

fn small_config(ratio: f64, trials: usize) -> PlanConfig {
    PlanConfig {
        ratio,
        num_samples: trials,
        keep_traces: false,
        ..PlanConfig::default()
    }
}

#[test]
fn large_effects_have_a_fixed_design() -> Result<(), EvalueError> {
    for (alpha, beta, delta_min) in [(0.05, 0.2, 5.0), (0.2, 0.5, 2.0), (0.2, 0.5, 2.5), (0.2, 0.5, 3.0)] {
        let (n1, n2) = n_plan_batch(alpha, beta, delta_min, 1.0)?;
        assert!(n1 >= 2 && n1 <= 10, "delta_min={delta_min}: n1={n1}");
        assert_eq!(n1, n2);
    }
    Ok(())
}

#[test]
fn overpowered_designs_use_two_observations_per_group() -> Result<(), EvalueError> {
    assert_eq!(n_plan_batch(0.05, 0.2, 20.0, 1.0)?, (2, 2));
    assert_eq!(n_plan_batch(0.2, 0.5, 5.0, 1.0)?, (2, 2));
    assert_eq!(n_plan_batch(0.05, 0.2, 5.0, 0.1)?, (20, 2));
    assert_eq!(n_plan_batch(0.05, 0.2, 5.0, 10.0)?, (2, 20));
    Ok(())
}

#[test]
fn planned_sizes_are_ordered_across_designs() -> Result<(), EvalueError> {
    let levels = [(0.05, 0.2), (0.2, 0.5), (0.01, 0.1)];
    for delta_min in [0.4, 1.0, 2.0, 5.0, 20.0] {
        for ratio in [0.1, 1.0, 2.5] {
            for (alpha, beta) in levels {
                let plan = get_n_plan(alpha, beta, delta_min, &small_config(ratio, 40))?;
                assert!(
                    plan.mean <= plan.n && plan.n <= plan.batch,
                    "delta_min={delta_min} ratio={ratio} alpha={alpha} beta={beta}: \
                     mean={} n={} batch={}",
                    plan.mean,
                    plan.n,
                    plan.batch
                );
                assert!(plan.batch >= 2 && plan.batch_n2 >= 2);
            }
        }
    }
    Ok(())
}

#[test]
fn unbalanced_default_effect_plan() -> Result<(), EvalueError> {
    let plan = get_n_plan(0.05, 0.2, 0.51765, &small_config(0.1, 200))?;
    assert!(plan.mean <= plan.n && plan.n <= plan.batch);
    // n2 = ceil(ratio·n1) at the fixed design.
    assert!(plan.batch_n2 * 10 >= plan.batch && plan.batch_n2 * 10 <= plan.batch + 10);
    // Fewer second-group observations call for many more in the first group.
    assert!(plan.batch > 113);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn fixed_design_exists_for_valid_inputs(
        delta_min in 0.3f64..8.0,
        alpha in 0.005f64..0.3,
        beta in 0.05f64..0.6,
        ratio in 0.1f64..10.0,
    ) {
        let (n1, n2) = n_plan_batch(alpha, beta, delta_min, ratio)
            .map_err(|err| TestCaseError::fail(err.to_string()))?;
        prop_assert!(n1 >= 2 && n2 >= 2, "n1={} n2={}", n1, n2);
        let scaled = ratio * n1 as f64;
        prop_assert!(n2 as f64 <= scaled + 1.0 && n2 as f64 >= scaled - ratio - 1e-6);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    #[test]
    fn mean_never_exceeds_n_nor_batch(
        delta_min in 0.8f64..6.0,
        alpha in 0.01f64..0.2,
        beta in 0.05f64..0.5,
        ratio in 0.25f64..4.0,
        seed in any::<u64>(),
    ) {
        let config = PlanConfig { seed, ..small_config(ratio, 16) };
        let plan = get_n_plan(alpha, beta, delta_min, &config)
            .map_err(|err| TestCaseError::fail(err.to_string()))?;
        prop_assert!(plan.mean <= plan.n);
        prop_assert!(plan.n <= plan.batch);
        prop_assert_eq!(plan.stop_times.len(), 16);
    }
}
