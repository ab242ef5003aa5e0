//! Benchmarks for hierarchical SVD and tree-based tensor operations
//!
//! Linear and balanced trees of growing order with all nodes active.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use htensor_core::FullTensor;
use htensor_decomp::{ActiveNodes, RandOptions, TreeBasedTensor, TruncationSweep, Truncator};
use htensor_tree::DimensionTree;
use scirs2_core::random::{SeedableRng, StdRng};
use std::hint::black_box;
use std::sync::Arc;

fn random_pair(tree: DimensionTree, size: usize, rank: usize) -> (TreeBasedTensor, TreeBasedTensor) {
    let tree = Arc::new(tree);
    let mut ranks = vec![rank; tree.nb_nodes()];
    ranks[tree.root()] = 1;
    let options = RandOptions::new()
        .with_shape(vec![size; tree.order()])
        .with_ranks(ranks);
    let mut rng = StdRng::seed_from_u64(42);
    let x = TreeBasedTensor::rand(tree.clone(), &options, &mut rng).unwrap();
    let y = TreeBasedTensor::rand(tree, &options, &mut rng).unwrap();
    (x, y)
}

fn bench_hsvd_tree(c: &mut Criterion) {
    let mut group = c.benchmark_group("hsvd_tree");

    for &order in &[4, 8, 16] {
        for sweep in [TruncationSweep::LeavesToRoot, TruncationSweep::RootToLeaves] {
            let (x, y) = random_pair(DimensionTree::balanced(order).unwrap(), 8, 6);
            let sum = (&x + &y).unwrap();
            let truncator = Truncator::new(1e-8).unwrap().with_sweep(sweep);

            group.bench_with_input(
                BenchmarkId::new(format!("{:?}", sweep), order),
                &(sum, truncator),
                |b, (sum, truncator)| b.iter(|| black_box(truncator.hsvd(black_box(sum)))),
            );
        }
    }

    group.finish();
}

fn bench_hsvd_full(c: &mut Criterion) {
    let mut group = c.benchmark_group("hsvd_full");
    group.sample_size(10);

    for &(order, size) in &[(4, 10), (5, 8), (6, 6)] {
        let mut rng = StdRng::seed_from_u64(7);
        let dense = FullTensor::rand(&vec![size; order], &mut rng);
        let tree = Arc::new(DimensionTree::balanced(order).unwrap());
        let truncator = Truncator::new(1e-2).unwrap();

        group.throughput(Throughput::Elements(dense.len() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}^{}", size, order)),
            &(dense, tree, truncator),
            |b, (dense, tree, truncator)| {
                b.iter(|| {
                    black_box(truncator.hsvd_full(
                        black_box(dense),
                        Arc::clone(tree),
                        &ActiveNodes::All,
                    ))
                })
            },
        );
    }

    group.finish();
}

fn bench_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree_tensor_ops");

    for &order in &[8, 16, 32] {
        let (x, y) = random_pair(DimensionTree::linear(order).unwrap(), 4, 4);

        group.bench_with_input(BenchmarkId::new("dot", order), &(x.clone(), y.clone()), |b, (x, y)| {
            b.iter(|| black_box(x.dot(black_box(y))))
        });
        group.bench_with_input(BenchmarkId::new("add", order), &(x.clone(), y), |b, (x, y)| {
            b.iter(|| black_box(black_box(x) + black_box(y)))
        });
        group.bench_with_input(BenchmarkId::new("sum", order), &x, |b, x| {
            b.iter(|| black_box(x.sum()))
        });
        group.bench_with_input(BenchmarkId::new("change_root", order), &x, |b, x| {
            b.iter(|| black_box(x.change_root(black_box(1))))
        });
    }

    group.finish();
}

criterion_group!(hsvd_benches, bench_hsvd_tree, bench_hsvd_full);
criterion_group!(operation_benches, bench_operations);
criterion_main!(hsvd_benches, operation_benches);
