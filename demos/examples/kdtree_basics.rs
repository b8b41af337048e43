// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! k-d tree basics.
//!
//! Build a small 2-D tree, walk it, query it, and erase an interior node.
//!
//! Run:
//! - `cargo run -p understory_kdtree_demos --example kdtree_basics`

use understory_kdtree::{KdTree2, NodeId};

fn dump(tree: &KdTree2<i32, &str>, id: Option<NodeId>, depth: usize) {
    let Some(id) = id else {
        return;
    };
    let Some(node) = tree.get(id) else {
        return;
    };
    println!(
        "{:indent$}{} {:?} (split on {})",
        "",
        node.data,
        node.position,
        if node.axis == 0 { 'x' } else { 'y' },
        indent = depth * 2
    );
    let (left, right) = tree.children(id).unwrap_or_default();
    dump(tree, left, depth + 1);
    dump(tree, right, depth + 1);
}

fn main() {
    let mut tree = KdTree2::new();
    for (p, name) in [
        ((7, 2), "a"),
        ((5, 4), "b"),
        ((9, 6), "c"),
        ((2, 3), "d"),
        ((4, 7), "e"),
        ((8, 1), "f"),
    ] {
        let _ = tree.insert(p, name);
    }

    println!("{} points, depth {}", tree.len(), tree.depth());
    dump(&tree, tree.root(), 0);

    for axis in 0..2 {
        let lo = tree.find_min(axis).ok().flatten().and_then(|id| tree.data(id));
        let hi = tree.find_max(axis).ok().flatten().and_then(|id| tree.data(id));
        println!("axis {axis}: min {lo:?}, max {hi:?}");
    }

    let q = (6, 5);
    if let Some(id) = tree.find_nearest(q) {
        println!("nearest to {q:?}: {:?}", tree.get(id).map(|n| *n.data));
    }
    for n in tree.find_n_nearest(q, 3) {
        println!("  {:?} at squared distance {}", tree.data(n.id), n.sq_dist);
    }
    let within: Vec<_> = tree
        .find_close_to(q, 3)
        .into_iter()
        .filter_map(|id| tree.data(id))
        .collect();
    println!("strictly within 3 of {q:?}: {within:?}");

    // Erase the root's left child; its replacement keeps its own handle.
    if let Some(b) = tree.find((5, 4)) {
        match tree.erase(b) {
            Ok(name) => println!("erased {name}"),
            Err(e) => println!("erase failed: {e}"),
        }
    }
    println!("after erase: {} points, consistent: {}", tree.len(), tree.is_ok());
    dump(&tree, tree.root(), 0);
}
