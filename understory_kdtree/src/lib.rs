// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_kdtree --heading-base-level=0

//! Understory k-d tree: a mutable k-dimensional tree of points with payloads.
//!
//! - Insert points one at a time and erase them by handle, in any order.
//! - Exact-match lookup, per-axis minimum and maximum.
//! - Nearest neighbor, `k` nearest neighbors (sorted), and fixed-radius queries.
//! - Structural self-check with [`KdTree::is_ok`].
//!
//! The tree is generic over the coordinate scalar `T` (`f32`, `f64`, `i32`, `i64`), the payload
//! `P`, and the dimension count `D` as a const generic. Squared distances are accumulated in a
//! widened type (f32→f64, f64→f64, i32→i64, i64→i128), exposed as [`Coord::Acc`].
//!
//! Nodes are addressed by [`NodeId`] handles. Erasing an interior node moves other nodes
//! around inside the tree, but their handles keep naming the same point and payload.
//!
//! The tree does not rebalance: its shape follows insertion order, and sorted input produces
//! a list-shaped tree. All traversals use explicit stacks, so such trees are slow but safe.
//!
//! # Example
//!
//! ```rust
//! use understory_kdtree::KdTree;
//!
//! let mut tree: KdTree<f64, &str, 2> = KdTree::new();
//! let _ = tree.insert([7.0, 2.0], "a");
//! let b = tree.insert([5.0, 4.0], "b");
//! let _ = tree.insert([9.0, 6.0], "c");
//! let _ = tree.insert([2.0, 3.0], "d");
//!
//! // Nearest neighbor.
//! let id = tree.find_nearest([3.0, 3.0]).unwrap();
//! assert_eq!(tree.data(id), Some(&"d"));
//!
//! // The two nearest, closest first.
//! let near = tree.find_n_nearest([6.0, 3.0], 2);
//! assert_eq!(near.len(), 2);
//! assert!(near[0].sq_dist <= near[1].sq_dist);
//!
//! // Everything strictly within radius 3.5.
//! assert_eq!(tree.find_close_to([8.0, 4.0], 3.5).len(), 3);
//!
//! // Erase by handle; the tree stays consistent.
//! assert_eq!(tree.erase(b), Ok("b"));
//! assert_eq!(tree.len(), 3);
//! assert!(tree.is_ok());
//! ```
//!
//! Fixed-dimension aliases [`KdTree2`], [`KdTree3`], and [`KdTree4`] are provided, and
//! `KdTree2<f64, P>` accepts [`kurbo::Point`] through methods such as
//! [`KdTree::insert_point`] and [`KdTree::nearest_to_point`].
//!
//! ### Float semantics
//!
//! This crate assumes no NaNs for floating-point coordinates. A NaN coordinate never compares
//! less than anything, so it always descends right, and it never matches in [`KdTree::find`].
//!
//! ## Features
//!
//! - `std` (default): forwards to `kurbo/std` and `tracing/std`.
//! - `libm`: `no_std` math for `kurbo`.

#![no_std]

extern crate alloc;

pub mod error;
pub mod fixed;
pub mod node;
pub mod search;
pub mod tree;
pub mod types;

pub use error::Error;
pub use fixed::{KdTree2, KdTree3, KdTree4};
pub use node::NodeId;
pub use search::Neighbor;
pub use tree::{KdTree, NodeRef};
pub use types::{Coord, CoordAcc, axis_sq_dist, sq_dist};

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn insert_query_erase_roundtrip() {
        let mut tree: KdTree<f32, u32, 3> = KdTree::new();
        let a = tree.insert([0.0, 0.0, 0.0], 1);
        let b = tree.insert([1.0, 1.0, 1.0], 2);
        let c = tree.insert([-1.0, 2.0, 0.5], 3);
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.find_nearest([0.9, 0.9, 0.9]), Some(b));
        assert_eq!(tree.find_min(0), Ok(Some(c)));

        assert_eq!(tree.erase(a), Ok(1));
        assert!(tree.is_ok());
        assert_eq!(tree.find([0.0, 0.0, 0.0]), None);
        let left: Vec<_> = tree.iter().map(|n| *n.data).collect();
        assert_eq!(left.len(), 2);
        assert!(left.contains(&2) && left.contains(&3));
        // f32 distances are reported in f64.
        let near = tree.find_n_nearest([1.0, 1.0, 0.0], 1);
        assert_eq!(near[0].sq_dist, 1.0_f64);
    }

    #[test]
    fn debug_is_summary_only() {
        let mut tree: KdTree<i32, (), 2> = KdTree::default();
        let _ = tree.insert([1, 2], ());
        let s = alloc::format!("{tree:?}");
        assert!(s.starts_with("KdTree"));
        assert!(s.contains("nodes_alive: 1"));
    }
}
