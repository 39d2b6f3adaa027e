use evalue_mom::Mom;
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn e_value_grows_with_absolute_t(
        delta in 0.1f64..1.5,
        n1 in 2usize..200,
        n2 in 2usize..200,
        t in 0.0f64..8.0,
        step in 0.01f64..2.0,
    ) {
        let mom = Mom::new(delta);
        let (a, b) = (n1 as f64, n2 as f64);
        let nu = a + b - 2.0;
        let n_eff = a * b / (a + b);
        let low = mom.e_value_t(t, nu, n_eff);
        let high = mom.e_value_t(t + step, nu, n_eff);
        prop_assert!(low.is_finite() && low > 0.0);
        prop_assert!(high >= low * (1.0 - 1e-12));
        prop_assert_eq!(mom.e_value_t(-t, nu, n_eff), low);
    }

    #[test]
    fn e_value_of_null_t_is_below_one(delta in 0.05f64..2.0, n1 in 2usize..500, n2 in 2usize..500) {
        let mom = Mom::new(delta);
        let (a, b) = (n1 as f64, n2 as f64);
        prop_assert!(mom.e_value_t(0.0, a + b - 2.0, a * b / (a + b)) < 1.0);
    }
}
