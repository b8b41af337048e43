// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Nearest, k-nearest, and radius queries.
//!
//! All three are branch-and-bound walks over the subtree at a root slot. At each node the
//! query descends first into the side of the splitting hyperplane that holds the query point
//! (the near side). The far side can only hold a closer point if the squared distance from the
//! query to the hyperplane, `(point[axis] - position[axis])²`, does not exceed the current
//! bound, so it is deferred and skipped when that test fails.
//!
//! Walks use an explicit stack of `(slot, gate)` pairs, where `gate` is the hyperplane
//! distance that must still be within bounds when the entry is popped (`None` for near sides).
//! Far entries are pushed before near ones so that the near subtree is fully explored, and the
//! bound tightened, before the far gate is evaluated.

use alloc::collections::BinaryHeap;
use alloc::vec;
use alloc::vec::Vec;
use core::cmp::Ordering;

use crate::node::{NodeId, Nodes, Side};
use crate::types::{Coord, axis_sq_dist, gt, lt, sq_dist};

/// One result of a k-nearest query.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Neighbor<A> {
    /// The matched node.
    pub id: NodeId,
    /// Squared Euclidean distance from the query point.
    pub sq_dist: A,
}

/// Heap entry ordered by distance, then by visit order, so the heap top is the current worst.
struct Candidate<A> {
    sq_dist: A,
    seq: usize,
    slot: usize,
}

impl<A: PartialOrd> Ord for Candidate<A> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sq_dist
            .partial_cmp(&other.sq_dist)
            .unwrap_or(Ordering::Equal)
            .then(self.seq.cmp(&other.seq))
    }
}

impl<A: PartialOrd> PartialOrd for Candidate<A> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<A: PartialOrd> PartialEq for Candidate<A> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<A: PartialOrd> Eq for Candidate<A> {}

impl<T: Coord, P, const D: usize> Nodes<T, P, D> {
    /// Push a node's children for a walk: far side gated by its hyperplane distance, then near.
    fn push_children(
        &self,
        idx: usize,
        point: &[T; D],
        stack: &mut Vec<(usize, Option<T::Acc>)>,
    ) {
        let n = self.node(idx);
        let (near, far) = match n.side_for(point) {
            Side::Right => (n.right, n.left),
            Side::Left => (n.left, n.right),
        };
        if let Some(f) = far {
            let plane = axis_sq_dist(point[n.axis], n.position[n.axis]);
            stack.push((f, Some(plane)));
        }
        if let Some(c) = near {
            stack.push((c, None));
        }
    }

    /// Closest node to `point` below `root`, with its squared distance.
    ///
    /// Ties keep the node found first.
    pub(crate) fn find_nearest(&self, root: usize, point: &[T; D]) -> (usize, T::Acc) {
        let mut best = (root, sq_dist(point, &self.node(root).position));
        let mut stack = vec![(root, None)];
        while let Some((idx, gate)) = stack.pop() {
            if gate.is_some_and(|plane| gt(plane, best.1)) {
                continue;
            }
            let d = sq_dist(point, &self.node(idx).position);
            if lt(d, best.1) {
                best = (idx, d);
            }
            self.push_children(idx, point, &mut stack);
        }
        best
    }

    /// The `k` closest nodes to `point` below `root`, nearest first.
    ///
    /// Once `k` candidates are held, a node displaces the current worst only when strictly
    /// closer, so among equidistant nodes the ones visited first are kept.
    pub(crate) fn find_n_nearest(
        &self,
        root: usize,
        point: &[T; D],
        k: usize,
    ) -> Vec<(usize, T::Acc)> {
        if k == 0 {
            return Vec::new();
        }
        let mut heap: BinaryHeap<Candidate<T::Acc>> = BinaryHeap::with_capacity(k + 1);
        let mut seq = 0_usize;
        let mut stack = vec![(root, None)];
        while let Some((idx, gate)) = stack.pop() {
            if let (Some(plane), true) = (gate, heap.len() == k)
                && heap.peek().is_some_and(|worst| gt(plane, worst.sq_dist))
            {
                continue;
            }
            let d = sq_dist(point, &self.node(idx).position);
            let admit = heap.len() < k || heap.peek().is_some_and(|worst| lt(d, worst.sq_dist));
            if admit {
                heap.push(Candidate {
                    sq_dist: d,
                    seq,
                    slot: idx,
                });
                if heap.len() > k {
                    let _ = heap.pop();
                }
            }
            seq += 1;
            self.push_children(idx, point, &mut stack);
        }
        heap.into_sorted_vec()
            .into_iter()
            .map(|c| (c.slot, c.sq_dist))
            .collect()
    }

    /// Every node below `root` whose squared distance to `point` is strictly less than
    /// `sq_radius`, appended in visit order.
    ///
    /// A side is pruned exactly when its hyperplane lies farther than the radius; the side
    /// holding the query point is never pruned.
    pub(crate) fn find_close_to(
        &self,
        root: usize,
        point: &[T; D],
        sq_radius: T::Acc,
        out: &mut Vec<usize>,
    ) {
        let mut stack = vec![(root, None)];
        while let Some((idx, gate)) = stack.pop() {
            if gate.is_some_and(|plane| gt(plane, sq_radius)) {
                continue;
            }
            if lt(sq_dist(point, &self.node(idx).position), sq_radius) {
                out.push(idx);
            }
            self.push_children(idx, point, &mut stack);
        }
    }
}
