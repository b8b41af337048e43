// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Watch deletion at work.
//!
//! Installs a `tracing` subscriber at TRACE level so every node exchange performed while
//! erasing is printed, then erases nodes from a 3-D tree and checks consistency after each.
//!
//! Run:
//! - `cargo run -p understory_kdtree_demos --example kdtree_erase_trace`

use tracing::Level;
use understory_kdtree::KdTree3;

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(Level::TRACE)
        .with_target(false)
        .init();

    let mut tree: KdTree3<i64, char> = KdTree3::new();
    let ids: Vec<_> = [
        (50, 50, 50),
        (20, 80, 10),
        (70, 30, 90),
        (10, 60, 40),
        (30, 90, 70),
        (60, 10, 20),
        (90, 40, 60),
        (25, 85, 15),
    ]
    .into_iter()
    .zip('a'..)
    .map(|(p, c)| tree.insert(p, c))
    .collect();
    tracing::info!(len = tree.len(), depth = tree.depth(), "built tree");

    for &id in ids.iter().take(4) {
        match tree.erase(id) {
            Ok(c) => tracing::info!(erased = %c, len = tree.len(), ok = tree.is_ok(), "erased"),
            Err(e) => tracing::error!(error = %e, "erase failed"),
        }
    }

    // A second erase of the same handle is rejected and leaves the tree untouched.
    if let Err(e) = tree.erase(ids[0]) {
        tracing::info!(error = %e, len = tree.len(), "stale handle rejected");
    }

    tree.clear();
    tracing::info!(len = tree.len(), "cleared");
}
