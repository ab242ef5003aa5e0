//! Integration tests for tree-based tensors
//!
//! End-to-end workflows: random generation, algebra, truncation, partial
//! sums and structural transforms, checked against dense tensors.

use htensor_core::{FullTensor, TensorError};
use htensor_decomp::{
    ActiveNodes, RandOptions, Reduced, TreeBasedTensor, TruncationInput, TruncationSweep,
    Truncator,
};
use htensor_tree::{ArityInterval, DimensionTree};
use scirs2_core::ndarray_ext::{ArrayD, IxDyn};
use scirs2_core::random::{SeedableRng, StdRng};
use std::sync::Arc;

fn relative_error(reference: &FullTensor, approx: &FullTensor) -> f64 {
    (reference - approx).norm() / reference.norm()
}

#[test]
fn test_triangle_inequality_order_8() {
    let tree = Arc::new(DimensionTree::linear(8).unwrap());
    let mut rng = StdRng::seed_from_u64(10);
    let options = RandOptions::new().with_shape(vec![2; 8]);
    let x = TreeBasedTensor::rand(tree.clone(), &options, &mut rng).unwrap();
    let y = TreeBasedTensor::rand(tree, &options, &mut rng).unwrap();

    let sum = (&x + &y).unwrap();
    let lhs = sum.norm().unwrap();
    let rhs = x.norm().unwrap() + y.norm().unwrap();
    assert!(lhs <= rhs * (1.0 + 1e-12));

    // ranks add up on every non-root active node
    let root = sum.tree().root();
    for alpha in sum.active_nodes() {
        if alpha != root {
            assert_eq!(sum.ranks()[alpha], x.ranks()[alpha] + y.ranks()[alpha]);
        }
    }

    let diff = (&x - &y).unwrap();
    let expected = &x.full().unwrap() - &y.full().unwrap();
    assert!(relative_error(&expected, &diff.full().unwrap()) < 1e-10);
}

#[test]
fn test_full_has_expected_shape() {
    let mut rng = StdRng::seed_from_u64(11);
    for (tree, active) in [
        (DimensionTree::linear(5).unwrap(), ActiveNodes::All),
        (DimensionTree::balanced(5).unwrap(), ActiveNodes::Internal),
    ] {
        let options = RandOptions::new().with_shape(vec![3; 5]).with_active(active);
        let x = TreeBasedTensor::rand(Arc::new(tree), &options, &mut rng).unwrap();
        let full = x.full().unwrap();
        assert_eq!(full.shape(), &[3, 3, 3, 3, 3]);
        assert!((full.norm() - x.norm().unwrap()).abs() < 1e-10 * full.norm());
    }
}

#[test]
fn test_change_root_round_trip() {
    let tree = Arc::new(DimensionTree::balanced(6).unwrap());
    let mut rng = StdRng::seed_from_u64(12);
    let x = TreeBasedTensor::rand(tree.clone(), &RandOptions::new(), &mut rng).unwrap();
    let reference = x.full().unwrap();

    for node in 1..tree.nb_nodes() {
        let y = x.change_root(node).unwrap();
        assert_eq!(y.tree().root(), node);
        assert!(relative_error(&reference, &y.full().unwrap()) < 1e-10);

        let back = y.change_root(tree.root()).unwrap();
        assert_eq!(back.tree().as_ref(), tree.as_ref());
        assert!(relative_error(&reference, &back.full().unwrap()) < 1e-10);
    }
}

#[test]
fn test_activation_round_trip() {
    let tree = Arc::new(DimensionTree::linear(5).unwrap());
    let mut rng = StdRng::seed_from_u64(13);
    let options = RandOptions::new().with_active(ActiveNodes::TensorTrain);
    let x = TreeBasedTensor::rand(tree.clone(), &options, &mut rng).unwrap();
    let reference = x.full().unwrap();

    let leaves = tree.leaves();
    let y = x.activate_nodes(&leaves).unwrap();
    assert!(leaves.iter().all(|&a| y.is_active(a)));
    assert!(relative_error(&reference, &y.full().unwrap()) < 1e-10);

    let z = y.inactivate_nodes(&leaves).unwrap();
    assert!(leaves.iter().all(|&a| !z.is_active(a)));
    assert!(relative_error(&reference, &z.full().unwrap()) < 1e-10);

    // the other way round, starting from every node active
    let internal: Vec<usize> = tree
        .internal_nodes()
        .into_iter()
        .filter(|&a| a != tree.root())
        .collect();
    let w = y.inactivate_nodes(&internal).unwrap();
    let v = w.activate_nodes(&internal).unwrap();
    assert!(internal.iter().all(|&a| v.is_active(a)));
    assert!(relative_error(&reference, &w.full().unwrap()) < 1e-10);
    assert!(relative_error(&reference, &v.full().unwrap()) < 1e-10);

    assert!(matches!(
        x.inactivate_nodes(&[tree.root()]),
        Err(TensorError::InvalidArgument(_))
    ));
}

#[test]
fn test_reduce_sum_of_constant() {
    // 2.0 everywhere on a trivial tree with rank-1 cores
    let tree = Arc::new(DimensionTree::trivial(3).unwrap());
    let shape = vec![2, 3, 4];
    let cores = vec![
        Some(ArrayD::from_elem(IxDyn(&[1, 1, 1]), 2.0)),
        Some(ArrayD::ones(IxDyn(&[2, 1]))),
        Some(ArrayD::ones(IxDyn(&[3, 1]))),
        Some(ArrayD::ones(IxDyn(&[4, 1]))),
    ];
    let x = TreeBasedTensor::from_cores(tree, cores, shape).unwrap();

    let total = x.reduce_sum(None).unwrap().into_scalar().unwrap();
    assert!((total - 48.0).abs() < 1e-12);

    match x.reduce_sum(Some(&[0, 2])).unwrap() {
        Reduced::Tensor(t) => {
            assert_eq!(t.shape(), &[3]);
            let full = t.full().unwrap();
            assert!(full.as_array().iter().all(|&v| (v - 16.0).abs() < 1e-12));
        }
        Reduced::Scalar(_) => panic!("one dimension should remain"),
    }
}

#[test]
fn test_truncation_workflow() {
    let mut rng = StdRng::seed_from_u64(14);
    let tree = Arc::new(
        DimensionTree::random(6, ArityInterval::new(2, 3).unwrap(), &mut rng).unwrap(),
    );
    let options = RandOptions::new().with_shape(vec![3; 6]);
    let x = TreeBasedTensor::rand(tree.clone(), &options, &mut rng).unwrap();
    let y = TreeBasedTensor::rand(tree.clone(), &options, &mut rng).unwrap();
    let z = (&x + &y.scale(1e-3)).unwrap();
    let reference = z.full().unwrap();

    for sweep in [TruncationSweep::LeavesToRoot, TruncationSweep::RootToLeaves] {
        for tol in [1e-1, 1e-3, 1e-8] {
            let truncator = Truncator::new(tol).unwrap().with_sweep(sweep);
            let t = truncator.compress(TruncationInput::Tree(&z)).unwrap();
            assert!(relative_error(&reference, &t.full().unwrap()) <= tol * (1.0 + 1e-8));
            assert!(t.storage() <= z.storage());

            let d = truncator
                .compress(TruncationInput::Full {
                    tensor: &reference,
                    tree: tree.clone(),
                    active: ActiveNodes::All,
                })
                .unwrap();
            assert!(relative_error(&reference, &d.full().unwrap()) <= tol * (1.0 + 1e-8));
        }
    }
}

#[test]
fn test_dense_compression_with_rank_cap() {
    let mut rng = StdRng::seed_from_u64(15);
    let dense = FullTensor::randn(&[4, 4, 4, 4], &mut rng);
    let tree = Arc::new(DimensionTree::balanced(4).unwrap());
    let truncator = Truncator::new(0.0).unwrap().with_max_rank(3).unwrap();
    let x = truncator
        .hsvd_full(&dense, tree, &ActiveNodes::Internal)
        .unwrap();
    for alpha in x.active_nodes() {
        assert!(x.ranks()[alpha] <= 3);
    }
    assert!(relative_error(&dense, &x.full().unwrap()) < 1.0);
}

#[test]
fn test_subtree_basis_reconstructs_node_subspace() {
    let tree = Arc::new(DimensionTree::balanced(4).unwrap());
    let mut rng = StdRng::seed_from_u64(16);
    let options = RandOptions::new().with_shape(vec![2, 3, 2, 3]);
    let x = TreeBasedTensor::rand(tree.clone(), &options, &mut rng).unwrap();

    let node = tree.children(tree.root())[0];
    let basis = x.subtree_basis(node).unwrap();
    assert_eq!(basis.len(), x.ranks()[node]);
    for b in &basis {
        assert_eq!(b.shape(), &[2, 3]);
    }

    let whole = x.subtree_basis(tree.root()).unwrap();
    assert_eq!(whole.len(), 1);
    assert!(relative_error(&x.full().unwrap(), &whole[0].full().unwrap()) < 1e-12);
}

#[test]
fn test_incompatible_trees_rejected() {
    let mut rng = StdRng::seed_from_u64(17);
    let options = RandOptions::new().with_shape(vec![2; 4]);
    let x = TreeBasedTensor::rand(
        Arc::new(DimensionTree::linear(4).unwrap()),
        &options,
        &mut rng,
    )
    .unwrap();
    let y = TreeBasedTensor::rand(
        Arc::new(DimensionTree::balanced(4).unwrap()),
        &options,
        &mut rng,
    )
    .unwrap();
    assert!(matches!(&x + &y, Err(TensorError::ShapeMismatch(_))));
    assert!(matches!(x.dot(&y), Err(TensorError::ShapeMismatch(_))));
}
