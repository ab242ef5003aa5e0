//! Property-based tests for tree-based tensors
//!
//! Random trees, active sets and shapes; every property is checked against
//! the dense tensor.

#[cfg(test)]
mod tests {
    use crate::{ActiveNodes, RandOptions, TreeBasedTensor, Truncator, TruncationSweep};
    use htensor_core::FullTensor;
    use htensor_tree::{ArityInterval, DimensionTree};
    use proptest::prelude::*;
    use scirs2_core::random::{SeedableRng, StdRng};
    use std::sync::Arc;

    // Dense references are built for every case; keep the count small
    fn proptest_config() -> ProptestConfig {
        ProptestConfig {
            cases: 12,
            ..ProptestConfig::default()
        }
    }

    fn random_tensor(order: usize, seed: u64) -> TreeBasedTensor {
        let mut rng = StdRng::seed_from_u64(seed);
        let tree = DimensionTree::random(order, ArityInterval::default(), &mut rng).unwrap();
        let active = ActiveNodes::random(&tree, &mut rng);
        let shape = (0..order).map(|mu| 2 + (mu + seed as usize) % 2).collect();
        let options = RandOptions::new().with_shape(shape).with_active(active);
        TreeBasedTensor::rand(Arc::new(tree), &options, &mut rng).unwrap()
    }

    fn close(a: &FullTensor, b: &FullTensor, tol: f64) -> bool {
        (a - b).norm() <= tol * a.norm().max(1e-300)
    }

    proptest! {
        #![proptest_config(proptest_config())]

        #[test]
        fn sum_matches_dense(order in 2usize..6, seed in 0u64..1000) {
            let x = random_tensor(order, seed);
            let y = x.scale(-0.5);
            let z = (&x + &y).unwrap();
            let expected = x.full().unwrap().checked_add(&y.full().unwrap()).unwrap();
            prop_assert!(close(&expected, &z.full().unwrap(), 1e-10));
        }

        #[test]
        fn hadamard_matches_dense(order in 2usize..5, seed in 0u64..1000) {
            let x = random_tensor(order, seed);
            let y = x.scale(2.0);
            let z = x.hadamard(&y).unwrap();
            let xf = x.full().unwrap();
            let expected = FullTensor::from_array(xf.as_array() * &y.full().unwrap().into_array());
            prop_assert!(close(&expected, &z.full().unwrap(), 1e-10));
        }

        #[test]
        fn norm_matches_dense(order in 2usize..6, seed in 0u64..1000) {
            let x = random_tensor(order, seed);
            let dense = x.full().unwrap().norm();
            prop_assert!((x.norm().unwrap() - dense).abs() <= 1e-10 * dense);
        }

        #[test]
        fn change_root_preserves_entries(order in 2usize..6, seed in 0u64..1000, pick in 0usize..64) {
            let x = random_tensor(order, seed);
            let tree = x.tree();
            let candidates: Vec<usize> = (0..tree.nb_nodes())
                .filter(|&a| a == tree.root() || tree.children(tree.root()).len() > 1)
                .collect();
            let node = candidates[pick % candidates.len()];
            let y = x.change_root(node).unwrap();
            prop_assert!(close(&x.full().unwrap(), &y.full().unwrap(), 1e-10));
        }

        #[test]
        fn activation_round_trip(order in 2usize..6, seed in 0u64..1000) {
            let x = random_tensor(order, seed);
            let all: Vec<usize> = (0..x.tree().nb_nodes()).collect();
            let y = x.activate_nodes(&all).unwrap();
            prop_assert_eq!(y.active_nodes().len(), x.tree().nb_nodes());
            let leaves = x.tree().leaves();
            let z = y.inactivate_nodes(&leaves).unwrap();
            prop_assert!(close(&x.full().unwrap(), &z.full().unwrap(), 1e-10));
        }

        #[test]
        fn total_sum_matches_dense(order in 1usize..6, seed in 0u64..1000) {
            let x = random_tensor(order, seed);
            let dense = x.full().unwrap().sum();
            prop_assert!((x.sum().unwrap() - dense).abs() <= 1e-10 * dense.abs().max(1.0));
        }

        #[test]
        fn truncation_error_within_tolerance(
            order in 2usize..6,
            seed in 0u64..1000,
            tol in 1e-6f64..0.5,
            top_down in any::<bool>(),
        ) {
            let x = random_tensor(order, seed);
            let sweep = if top_down { TruncationSweep::RootToLeaves } else { TruncationSweep::LeavesToRoot };
            let y = Truncator::new(tol).unwrap().with_sweep(sweep).hsvd(&x).unwrap();
            let xf = x.full().unwrap();
            let err = (&xf - &y.full().unwrap()).norm() / xf.norm();
            prop_assert!(err <= tol * (1.0 + 1e-8) + 1e-12);
        }
    }
}
