// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Basic usage of the Understory k-d tree: insert, query, erase, and self-check.

use understory_kdtree::KdTree;

fn main() {
    let mut tree: KdTree<f64, u32, 2> = KdTree::new();
    let ids: Vec<_> = [[0.0, 0.0], [5.0, 4.0], [2.0, 3.0], [8.0, 1.0], [9.0, 6.0]]
        .into_iter()
        .zip(0..)
        .map(|(p, i)| tree.insert(p, i))
        .collect();

    // Nearest and k-nearest
    let nearest = tree.find_nearest([6.0, 4.0]);
    println!(
        "nearest to (6,4): {:?}",
        nearest.and_then(|id| tree.position(id))
    );
    for n in tree.find_n_nearest([6.0, 4.0], 3) {
        println!("  {:?} sq_dist={}", tree.position(n.id), n.sq_dist);
    }

    // Erase an interior node
    let removed = tree.erase(ids[1]);
    println!("erased: {removed:?}, len={}, ok={}", tree.len(), tree.is_ok());
    let order: Vec<_> = tree.iter().map(|n| *n.position).collect();
    println!("pre-order: {order:?}");
}
