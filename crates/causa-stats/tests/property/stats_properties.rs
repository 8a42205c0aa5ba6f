use causa_core::graph::nodes_from_names;
use causa_core::traits::IndependenceTest;
use causa_stats::linalg::SquareMatrix;
use causa_stats::{DataSet, FisherZTest};
use proptest::prelude::*;

fn dataset(columns: Vec<Vec<f64>>) -> DataSet {
    let names: Vec<String> = (0..columns.len()).map(|i| format!("V{i}")).collect();
    DataSet::from_columns(nodes_from_names(&names), columns).unwrap()
}

fn columns(vars: usize, rows: usize) -> impl Strategy<Value = Vec<Vec<f64>>> {
    prop::collection::vec(prop::collection::vec(-10.0f64..10.0, rows), vars)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn fisher_z_p_value_is_a_probability_or_degenerate(cols in columns(3, 40)) {
        let test = FisherZTest::new(&dataset(cols), 0.05).unwrap();
        for z in [vec![], vec![2]] {
            let result = test.check_independence(0, 1, &z);
            prop_assert!(result.is_degenerate() || (0.0..=1.0).contains(&result.p_value));
            if result.is_degenerate() {
                prop_assert!(result.independent);
            }
        }
    }

    #[test]
    fn fisher_z_is_symmetric(cols in columns(4, 30)) {
        let test = FisherZTest::new(&dataset(cols), 0.05).unwrap();
        let a = test.check_independence(0, 3, &[1]);
        let b = test.check_independence(3, 0, &[1]);
        prop_assert_eq!(a.independent, b.independent);
        if !a.is_degenerate() {
            prop_assert!((a.p_value - b.p_value).abs() < 1e-9);
        }
    }

    #[test]
    fn inverse_of_spd_matrix_recovers_identity(entries in prop::collection::vec(-3.0f64..3.0, 16)) {
        // A = M M^T + I is symmetric positive definite.
        let m = SquareMatrix::from_fn(4, |i, j| entries[i * 4 + j]);
        let a = SquareMatrix::from_fn(4, |i, j| {
            let dot: f64 = (0..4).map(|k| m.get(i, k) * m.get(j, k)).sum();
            dot + if i == j { 1.0 } else { 0.0 }
        });
        let inv = a.inverse().unwrap();
        for i in 0..4 {
            for j in 0..4 {
                let v: f64 = (0..4).map(|k| a.get(i, k) * inv.get(k, j)).sum();
                let expected = if i == j { 1.0 } else { 0.0 };
                prop_assert!((v - expected).abs() < 1e-6, "({}, {}) = {}", i, j, v);
            }
        }
    }
}
