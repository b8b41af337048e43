// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public `KdTree` API: root ownership, queries, and deletion.

use alloc::vec::Vec;
use core::fmt;

use crate::error::Error;
use crate::node::{NodeId, Nodes, next_owner};
use crate::search::Neighbor;
use crate::types::{Coord, lt};

/// Read-only view of one stored point, as yielded by [`KdTree::iter`] and [`KdTree::get`].
#[derive(Clone, Debug)]
pub struct NodeRef<'a, T, P, const D: usize> {
    /// Handle of the node.
    pub id: NodeId,
    /// Stored coordinates.
    pub position: &'a [T; D],
    /// Stored payload.
    pub data: &'a P,
    /// Axis this node splits on (its depth modulo `D`).
    pub axis: usize,
}

/// Mutable k-d tree over `D`-dimensional points of scalar `T`, each carrying a payload `P`.
///
/// The tree is unbalanced: its shape is determined by insertion order. Points equal to a
/// node's coordinate on its split axis go to the right subtree.
///
/// Cloning produces an independent tree with its own identity: handles from the original are
/// stale in the clone and vice versa. Use [`find`](Self::find) to locate points in a clone.
pub struct KdTree<T, P, const D: usize> {
    nodes: Nodes<T, P, D>,
    root: Option<usize>,
}

impl<T, P, const D: usize> fmt::Debug for KdTree<T, P, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KdTree")
            .field("dimensions", &D)
            .field("nodes_alive", &self.nodes.alive())
            .field("slots_total", &self.nodes.total_slots())
            .field("free_list", &self.nodes.free_slots())
            .field("has_root", &self.root.is_some())
            .finish_non_exhaustive()
    }
}

impl<T: Clone, P: Clone, const D: usize> Clone for KdTree<T, P, D> {
    fn clone(&self) -> Self {
        let mut nodes = self.nodes.clone();
        nodes.set_owner(next_owner());
        Self {
            nodes,
            root: self.root,
        }
    }
}

impl<T: Coord, P, const D: usize> Default for KdTree<T, P, D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Coord, P, const D: usize> KdTree<T, P, D> {
    /// Create an empty tree.
    pub fn new() -> Self {
        const { assert!(D > 0, "a k-d tree needs at least one dimension") };
        Self {
            nodes: Nodes::new(next_owner()),
            root: None,
        }
    }

    /// Number of stored points.
    pub fn len(&self) -> usize {
        self.nodes.alive()
    }

    /// True if the tree holds no points.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Number of levels on the longest root-to-leaf path; 0 for an empty tree.
    pub fn depth(&self) -> usize {
        self.root.map_or(0, |r| self.nodes.depth(r))
    }

    /// Handle of the root node.
    pub fn root(&self) -> Option<NodeId> {
        self.root.map(|r| self.nodes.id(r))
    }

    /// Returns true if `id` refers to a live node of this tree.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.nodes.resolve(id).is_ok()
    }

    /// View of a live node.
    pub fn get(&self, id: NodeId) -> Option<NodeRef<'_, T, P, D>> {
        let idx = self.nodes.resolve(id).ok()?;
        Some(self.node_ref(idx))
    }

    /// Coordinates of a live node.
    pub fn position(&self, id: NodeId) -> Option<&[T; D]> {
        let idx = self.nodes.resolve(id).ok()?;
        Some(&self.nodes.node(idx).position)
    }

    /// Payload of a live node.
    pub fn data(&self, id: NodeId) -> Option<&P> {
        let idx = self.nodes.resolve(id).ok()?;
        Some(&self.nodes.node(idx).data)
    }

    /// Mutable payload of a live node. Coordinates cannot be changed in place.
    pub fn data_mut(&mut self, id: NodeId) -> Option<&mut P> {
        let idx = self.nodes.resolve(id).ok()?;
        Some(&mut self.nodes.node_mut(idx).data)
    }

    /// Split axis of a live node.
    pub fn axis(&self, id: NodeId) -> Option<usize> {
        let idx = self.nodes.resolve(id).ok()?;
        Some(self.nodes.node(idx).axis)
    }

    /// Parent of a live node; `None` for the root or a stale handle.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        let idx = self.nodes.resolve(id).ok()?;
        self.nodes.node(idx).parent.map(|p| self.nodes.id(p))
    }

    /// Left and right children of a live node.
    pub fn children(&self, id: NodeId) -> Option<(Option<NodeId>, Option<NodeId>)> {
        let idx = self.nodes.resolve(id).ok()?;
        let n = self.nodes.node(idx);
        Some((
            n.left.map(|c| self.nodes.id(c)),
            n.right.map(|c| self.nodes.id(c)),
        ))
    }

    /// True if the node is live and has no children.
    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.nodes
            .resolve(id)
            .is_ok_and(|idx| self.nodes.node(idx).is_leaf())
    }

    /// Number of nodes in the subtree rooted at `id`, including `id`.
    pub fn subtree_len(&self, id: NodeId) -> Option<usize> {
        let idx = self.nodes.resolve(id).ok()?;
        Some(self.nodes.size(idx))
    }

    /// Insert a point with its payload and return the handle of the new node.
    ///
    /// Duplicate points are stored as separate nodes.
    pub fn insert(&mut self, point: impl Into<[T; D]>, data: P) -> NodeId {
        let point = point.into();
        let idx = match self.root {
            Some(r) => self.nodes.insert(r, point, data),
            None => {
                let r = self.nodes.insert_root(point, data);
                self.root = Some(r);
                r
            }
        };
        self.nodes.id(idx)
    }

    /// Find a node whose coordinates equal `point` exactly.
    ///
    /// When the same point was inserted more than once, any one of its nodes may be returned.
    pub fn find(&self, point: impl Into<[T; D]>) -> Option<NodeId> {
        let point = point.into();
        let r = self.root?;
        self.nodes.find(r, &point).map(|idx| self.nodes.id(idx))
    }

    /// Node with the smallest coordinate along `axis`, or `None` for an empty tree.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AxisOutOfRange`] if `axis >= D`.
    pub fn find_min(&self, axis: usize) -> Result<Option<NodeId>, Error> {
        self.check_axis(axis)?;
        Ok(self
            .root
            .map(|r| self.nodes.id(self.nodes.find_min(r, axis))))
    }

    /// Node with the largest coordinate along `axis`, or `None` for an empty tree.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AxisOutOfRange`] if `axis >= D`.
    pub fn find_max(&self, axis: usize) -> Result<Option<NodeId>, Error> {
        self.check_axis(axis)?;
        Ok(self
            .root
            .map(|r| self.nodes.id(self.nodes.find_max(r, axis))))
    }

    /// Node closest to `point` by Euclidean distance.
    pub fn find_nearest(&self, point: impl Into<[T; D]>) -> Option<NodeId> {
        let point = point.into();
        let r = self.root?;
        let (idx, _) = self.nodes.find_nearest(r, &point);
        Some(self.nodes.id(idx))
    }

    /// The `k` nodes closest to `point`, nearest first.
    ///
    /// Returns every node when `k >= self.len()`. Among equidistant nodes at the cut-off,
    /// the ones reached first by the traversal are kept.
    pub fn find_n_nearest(&self, point: impl Into<[T; D]>, k: usize) -> Vec<Neighbor<T::Acc>> {
        let point = point.into();
        let Some(r) = self.root else {
            return Vec::new();
        };
        self.nodes
            .find_n_nearest(r, &point, k)
            .into_iter()
            .map(|(idx, sq_dist)| Neighbor {
                id: self.nodes.id(idx),
                sq_dist,
            })
            .collect()
    }

    /// Nodes strictly closer than `radius` to `point`, in no particular order.
    ///
    /// A negative radius matches nothing.
    pub fn find_close_to(&self, point: impl Into<[T; D]>, radius: T) -> Vec<NodeId> {
        let r = T::widen(radius);
        if lt(r, T::acc_zero()) {
            return Vec::new();
        }
        self.find_close_to_sq(point, T::acc_square(r))
    }

    /// Nodes whose squared distance to `point` is strictly less than `sq_radius`.
    pub fn find_close_to_sq(&self, point: impl Into<[T; D]>, sq_radius: T::Acc) -> Vec<NodeId> {
        let point = point.into();
        let mut out = Vec::new();
        if let Some(r) = self.root {
            self.nodes.find_close_to(r, &point, sq_radius, &mut out);
        }
        out.into_iter().map(|idx| self.nodes.id(idx)).collect()
    }

    /// Remove a node and return its payload.
    ///
    /// An interior node is first exchanged with a replacement from its own subtree (the
    /// minimum along its split axis) until it reaches a leaf position, where it is unlinked.
    /// Replacement nodes keep their handles; only `id` becomes stale.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StaleHandle`] if `id` is not live or was issued by another tree
    /// (including a clone of this one), or [`Error::InvariantViolated`] if the node is not
    /// linked under this tree's root. The tree is unchanged in both cases.
    pub fn erase(&mut self, id: NodeId) -> Result<P, Error> {
        let idx = self.nodes.resolve(id).inspect_err(|_| {
            tracing::warn!(?id, "erase called with a stale handle");
        })?;
        self.ensure_linked(idx).inspect_err(|e| {
            tracing::warn!(?id, error = %e, "erase called with a node outside this tree");
        })?;

        loop {
            let (parent, left, right, axis) = {
                let n = self.nodes.node(idx);
                (n.parent, n.left, n.right, n.axis)
            };
            match (left, right) {
                (None, None) => {
                    match parent {
                        Some(p) => {
                            let side = self.nodes.side_of(p, idx)?;
                            self.nodes.set_child(p, side, None);
                        }
                        None => self.root = None,
                    }
                    tracing::trace!(slot = idx, "unlinked leaf");
                    return Ok(self.nodes.free(idx).data);
                }
                (_, Some(r)) => {
                    let successor = self.nodes.find_min(r, axis);
                    tracing::trace!(slot = idx, successor, "swapping with right-subtree minimum");
                    self.nodes.swap(idx, successor)?;
                    if self.root == Some(idx) {
                        self.root = Some(successor);
                    }
                }
                (Some(l), None) => {
                    let successor = self.nodes.find_min(l, axis);
                    tracing::trace!(slot = idx, successor, "swapping with left-subtree minimum");
                    self.nodes.swap(idx, successor)?;
                    // The left subtree is now bounded below by the successor, so it moves right.
                    self.nodes.flip_children(successor);
                    if self.root == Some(idx) {
                        self.root = Some(successor);
                    }
                }
            }
        }
    }

    /// Remove every node. All outstanding handles become stale.
    pub fn clear(&mut self) {
        tracing::debug!(nodes = self.nodes.alive(), "clearing k-d tree");
        self.nodes.clear();
        self.root = None;
    }

    /// Verify the structural invariants of the whole tree.
    ///
    /// Every point must lie on the correct side of the split of each of its ancestors, split
    /// axes must cycle with depth starting at 0, every child must link back to its parent,
    /// and every live node must be reachable from the root.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvariantViolated`] describing the first violation found.
    pub fn check(&self) -> Result<(), Error> {
        let reachable = match self.root {
            Some(r) => self.nodes.check(r)?,
            None => 0,
        };
        if reachable != self.nodes.alive() {
            return Err(Error::InvariantViolated(
                "live nodes are not all reachable from the root",
            ));
        }
        Ok(())
    }

    /// Whether [`check`](Self::check) passes. Has no side effects.
    pub fn is_ok(&self) -> bool {
        let res = self.check();
        if let Err(e) = res {
            tracing::warn!(error = %e, "k-d tree consistency check failed");
        }
        res.is_ok()
    }

    /// Handles of all nodes in pre-order (node, left subtree, right subtree).
    ///
    /// The handles reflect the current shape; erasing reorders the tree.
    pub fn to_vec(&self) -> Vec<NodeId> {
        self.slots()
            .into_iter()
            .map(|idx| self.nodes.id(idx))
            .collect()
    }

    /// Iterate over all nodes in pre-order.
    pub fn iter(&self) -> impl Iterator<Item = NodeRef<'_, T, P, D>> + '_ {
        self.slots().into_iter().map(|idx| self.node_ref(idx))
    }

    fn slots(&self) -> Vec<usize> {
        let mut out = Vec::with_capacity(self.nodes.alive());
        if let Some(r) = self.root {
            self.nodes.collect(r, &mut out);
        }
        out
    }

    fn node_ref(&self, idx: usize) -> NodeRef<'_, T, P, D> {
        let n = self.nodes.node(idx);
        NodeRef {
            id: self.nodes.id(idx),
            position: &n.position,
            data: &n.data,
            axis: n.axis,
        }
    }

    fn check_axis(&self, axis: usize) -> Result<(), Error> {
        if axis < D {
            Ok(())
        } else {
            Err(Error::AxisOutOfRange {
                axis,
                dimensions: D,
            })
        }
    }

    /// Walk the parent chain from `idx` and require it to end at this tree's root.
    fn ensure_linked(&self, idx: usize) -> Result<(), Error> {
        let mut cur = idx;
        for _ in 0..self.nodes.alive() {
            match self.nodes.node(cur).parent {
                Some(p) => {
                    let _ = self.nodes.side_of(p, cur)?;
                    cur = p;
                }
                None if self.root == Some(cur) => return Ok(()),
                None => {
                    return Err(Error::InvariantViolated(
                        "node is not reachable from the root",
                    ));
                }
            }
        }
        Err(Error::InvariantViolated("parent chain does not terminate"))
    }
}
