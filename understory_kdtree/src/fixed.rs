// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fixed-dimension aliases and `kurbo` interop for planar trees.
//!
//! Every point-taking method on [`KdTree`] accepts `impl Into<[T; D]>`, so tuples can be
//! passed directly:
//!
//! ```rust
//! use understory_kdtree::KdTree3;
//!
//! let mut tree: KdTree3<i32, &str> = KdTree3::new();
//! let _ = tree.insert((1, 2, 3), "a");
//! let _ = tree.insert((4, 5, 6), "b");
//! let id = tree.find_nearest((3, 4, 5)).unwrap();
//! assert_eq!(tree.data(id), Some(&"b"));
//! ```

use alloc::vec::Vec;

use kurbo::Point;

use crate::node::NodeId;
use crate::search::Neighbor;
use crate::tree::KdTree;

/// Two-dimensional k-d tree.
pub type KdTree2<T, P> = KdTree<T, P, 2>;
/// Three-dimensional k-d tree.
pub type KdTree3<T, P> = KdTree<T, P, 3>;
/// Four-dimensional k-d tree.
pub type KdTree4<T, P> = KdTree<T, P, 4>;

#[inline]
fn coords(p: Point) -> [f64; 2] {
    [p.x, p.y]
}

impl<P> KdTree<f64, P, 2> {
    /// Insert a [`Point`].
    pub fn insert_point(&mut self, p: Point, data: P) -> NodeId {
        self.insert(coords(p), data)
    }

    /// Find a node stored at exactly `p`.
    pub fn find_point(&self, p: Point) -> Option<NodeId> {
        self.find(coords(p))
    }

    /// Node closest to `p`.
    pub fn nearest_to_point(&self, p: Point) -> Option<NodeId> {
        self.find_nearest(coords(p))
    }

    /// The `k` nodes closest to `p`, nearest first.
    pub fn n_nearest_to_point(&self, p: Point, k: usize) -> Vec<Neighbor<f64>> {
        self.find_n_nearest(coords(p), k)
    }

    /// Nodes strictly within `radius` of `p`.
    pub fn close_to_point(&self, p: Point, radius: f64) -> Vec<NodeId> {
        self.find_close_to(coords(p), radius)
    }

    /// Position of a live node as a [`Point`].
    pub fn point(&self, id: NodeId) -> Option<Point> {
        self.position(id).map(|&[x, y]| Point::new(x, y))
    }
}
