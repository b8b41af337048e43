// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

#![cfg(feature = "compare_rstar")]

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use understory_kdtree::KdTree;

use rstar::RTree;

fn gen_grid_points(n: usize, cell: f64) -> Vec<[f64; 2]> {
    let mut out = Vec::with_capacity(n * n);
    for y in 0..n {
        for x in 0..n {
            // Offset odd rows so nearest queries are not all ties.
            let shift = if y % 2 == 1 { cell * 0.5 } else { 0.0 };
            out.push([x as f64 * cell + shift, y as f64 * cell]);
        }
    }
    out
}

fn bench_nearest_external_compare_f64(c: &mut Criterion) {
    let mut group = c.benchmark_group("nearest_external_compare_f64");
    for &n in &[64usize, 128] {
        let points = gen_grid_points(n, 10.0);
        let queries: Vec<[f64; 2]> = (0..256)
            .map(|i| [(i * 37 % 640) as f64 + 0.3, (i * 91 % 640) as f64 + 0.7])
            .collect();
        group.throughput(Throughput::Elements((n * n) as u64));

        group.bench_function(format!("understory_build_nearest_n{n}"), |b| {
            b.iter_batched(
                KdTree::<f64, u32, 2>::new,
                |mut tree| {
                    for (i, p) in points.iter().enumerate() {
                        let _ = tree.insert(*p, i as u32);
                    }
                    for q in &queries {
                        black_box(tree.find_nearest(*q));
                    }
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("rstar_build_nearest_n{n}"), |b| {
            b.iter_batched(
                RTree::<[f64; 2]>::new,
                |mut tree| {
                    for p in &points {
                        tree.insert(*p);
                    }
                    for q in &queries {
                        black_box(tree.nearest_neighbor(q));
                    }
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("rstar_build_nearest_bulk_n{n}"), |b| {
            b.iter_batched(
                || points.clone(),
                |pts| {
                    let tree = RTree::bulk_load(pts);
                    for q in &queries {
                        black_box(tree.nearest_neighbor(q));
                    }
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_nearest_external_compare_f64);
criterion_main!(benches);
