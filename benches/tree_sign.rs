use crate::bench_utils::{shape_label, BUDGETS};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::OsRng;
use rand::RngCore;
use std::time::{Duration, Instant};
use treesig::params::OTS_N;
use treesig::{CapacityOptimizedTree, StatelessConfig, StatelessTree};

mod bench_utils;

static ALG_NAME: &str = "sign";

fn sign_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!("tree_{}", ALG_NAME));
    group.sample_size(10);

    for budget in BUDGETS {
        let shape = CapacityOptimizedTree::from_budget(budget).unwrap().shape();

        group.bench_function(
            BenchmarkId::new("capacity_optimized", shape_label(shape)),
            |b| {
                b.iter_custom(|num_iters| {
                    let mut total = Duration::ZERO;
                    let mut tree = CapacityOptimizedTree::from_budget(budget).unwrap();
                    let mut digest = [0u8; OTS_N];

                    for _ in 0..num_iters {
                        // Start over once the tree runs dry
                        if tree.signatures_left() == 0 {
                            tree = CapacityOptimizedTree::from_budget(budget).unwrap();
                        }
                        OsRng.fill_bytes(&mut digest);

                        let start = Instant::now();
                        black_box(tree.sign(&digest).unwrap());
                        total += start.elapsed();
                    }
                    total
                });
            },
        );

        let config = StatelessConfig {
            max_signature_bytes: budget,
            collision_bound_bits: 0,
        };
        group.bench_function(BenchmarkId::new("stateless", shape_label(shape)), |b| {
            b.iter_custom(|num_iters| {
                let mut total = Duration::ZERO;
                let mut tree = StatelessTree::generate(config).unwrap();
                let mut digest = [0u8; OTS_N];

                for _ in 0..num_iters {
                    if tree.signatures_left() == 0 {
                        tree = StatelessTree::generate(config).unwrap();
                    }
                    OsRng.fill_bytes(&mut digest);

                    let start = Instant::now();
                    black_box(tree.sign(&digest).unwrap());
                    total += start.elapsed();
                }
                total
            });
        });
    }

    group.finish();
}

criterion_group!(benches, sign_benchmarks);
criterion_main!(benches);
