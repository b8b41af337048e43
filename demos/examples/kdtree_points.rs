// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Planar k-d tree with `kurbo` points.
//!
//! Scatter points on a spiral, then answer nearest and radius queries with [`kurbo::Point`].
//!
//! Run:
//! - `cargo run -p understory_kdtree_demos --example kdtree_points`

use kurbo::Point;
use understory_kdtree::KdTree2;

fn main() {
    let mut tree: KdTree2<f64, usize> = KdTree2::new();
    for i in 0..200 {
        let t = i as f64 * 0.3;
        let p = Point::new(t.cos() * t * 4.0, t.sin() * t * 4.0);
        let _ = tree.insert_point(p, i);
    }
    println!("{} points, depth {}", tree.len(), tree.depth());

    let cursor = Point::new(12.0, -30.0);
    if let Some(id) = tree.nearest_to_point(cursor) {
        let p = tree.point(id).unwrap_or(Point::ORIGIN);
        println!(
            "nearest to {cursor:?}: #{:?} at {p:?}, distance {:.3}",
            tree.data(id),
            p.distance(cursor)
        );
    }

    let radius = 15.0;
    let mut hits: Vec<_> = tree
        .close_to_point(cursor, radius)
        .into_iter()
        .filter_map(|id| tree.data(id).copied())
        .collect();
    hits.sort_unstable();
    println!("{} points within {radius}: {hits:?}", hits.len());

    for n in tree.n_nearest_to_point(Point::ORIGIN, 5) {
        println!(
            "  #{:?} at distance {:.3}",
            tree.data(n.id),
            n.sq_dist.sqrt()
        );
    }
}
