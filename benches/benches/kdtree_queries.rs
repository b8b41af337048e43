// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use understory_kdtree::{KdTree, sq_dist};

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f64(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) / ((1u64 << 53) as f64)
    }
}

fn gen_random_points<const D: usize>(count: usize, extent: f64, seed: u64) -> Vec<[f64; D]> {
    let mut rng = Rng::new(seed);
    (0..count)
        .map(|_| core::array::from_fn(|_| rng.next_f64() * extent))
        .collect()
}

fn gen_grid_points(n: usize, cell: f64) -> Vec<[f64; 2]> {
    let mut out = Vec::with_capacity(n * n);
    for y in 0..n {
        for x in 0..n {
            out.push([x as f64 * cell, y as f64 * cell]);
        }
    }
    out
}

fn build<const D: usize>(points: &[[f64; D]]) -> KdTree<f64, u32, D> {
    let mut tree = KdTree::new();
    for (i, p) in points.iter().enumerate() {
        let _ = tree.insert(*p, i as u32);
    }
    tree
}

fn brute_nearest<const D: usize>(points: &[[f64; D]], q: &[f64; D]) -> usize {
    let mut best = (0, f64::INFINITY);
    for (i, p) in points.iter().enumerate() {
        let d = sq_dist(p, q);
        if d < best.1 {
            best = (i, d);
        }
    }
    best.0
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("kdtree_build");
    for &n in &[1_000usize, 10_000] {
        let random = gen_random_points::<2>(n, 1000.0, 0xC0FFEE);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("insert_random_n{n}"), |b| {
            b.iter(|| black_box(build(&random)))
        });
    }
    // Row-major grid input is partially sorted and produces a deep tree.
    let grid = gen_grid_points(64, 10.0);
    group.throughput(Throughput::Elements(grid.len() as u64));
    group.bench_function("insert_grid_64x64", |b| b.iter(|| black_box(build(&grid))));
    group.finish();
}

fn bench_nearest(c: &mut Criterion) {
    let mut group = c.benchmark_group("kdtree_nearest");
    for &n in &[1_000usize, 10_000] {
        let points = gen_random_points::<3>(n, 1000.0, 42);
        let queries = gen_random_points::<3>(256, 1000.0, 7);
        let tree = build(&points);
        group.throughput(Throughput::Elements(queries.len() as u64));

        group.bench_function(format!("kdtree_nearest_n{n}"), |b| {
            b.iter(|| {
                for q in &queries {
                    black_box(tree.find_nearest(*q));
                }
            })
        });
        group.bench_function(format!("kdtree_n_nearest_k8_n{n}"), |b| {
            b.iter(|| {
                for q in &queries {
                    black_box(tree.find_n_nearest(*q, 8));
                }
            })
        });
        group.bench_function(format!("kdtree_close_to_r50_n{n}"), |b| {
            b.iter(|| {
                for q in &queries {
                    black_box(tree.find_close_to(*q, 50.0));
                }
            })
        });
        group.bench_function(format!("brute_nearest_n{n}"), |b| {
            b.iter(|| {
                for q in &queries {
                    black_box(brute_nearest(&points, q));
                }
            })
        });
    }
    group.finish();
}

fn bench_erase(c: &mut Criterion) {
    let mut group = c.benchmark_group("kdtree_erase");
    let n = 4_096usize;
    let points = gen_random_points::<2>(n, 1000.0, 99);
    group.throughput(Throughput::Elements(n as u64 / 2));
    group.bench_function("erase_half_random_n4096", |b| {
        b.iter_batched(
            || {
                let mut tree = KdTree::<f64, u32, 2>::new();
                let ids: Vec<_> = points
                    .iter()
                    .enumerate()
                    .map(|(i, p)| tree.insert(*p, i as u32))
                    .collect();
                (tree, ids)
            },
            |(mut tree, ids)| {
                for id in ids.iter().step_by(2) {
                    let _ = black_box(tree.erase(*id));
                }
                black_box(tree.len());
            },
            BatchSize::SmallInput,
        )
    });
    group.bench_function("erase_root_repeatedly_n4096", |b| {
        b.iter_batched(
            || build(&points),
            |mut tree| {
                while let Some(root) = tree.root() {
                    let _ = black_box(tree.erase(root));
                }
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

criterion_group!(benches, bench_build, bench_nearest, bench_erase);
criterion_main!(benches);
