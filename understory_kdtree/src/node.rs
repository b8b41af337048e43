// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node storage and the subtree algorithms rooted at a node.
//!
//! Nodes live in a slot arena owned by the tree. Links between nodes are slot indices:
//! `left` and `right` are owning in the logical sense (a slot is reachable from exactly one
//! parent slot, or is the root), while `parent` is a back-reference used for navigation and
//! for the link surgery performed by [`Nodes::swap`].

use alloc::vec;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicU32, Ordering};

use crate::error::Error;
use crate::types::{Coord, goes_right, gt, lt};

/// Identifier for a node in a [`KdTree`](crate::KdTree).
///
/// This is a small, copyable handle that stays stable across mutations of *other* nodes but
/// becomes invalid when the node it names is erased or the tree is cleared.
/// It consists of a slot index, a generation counter, and the id of the issuing tree.
///
/// ## Semantics
///
/// - On insert, a fresh slot is allocated with generation `1`.
/// - On erase, the slot is freed; any existing `NodeId` that pointed to that slot is now stale.
/// - On reuse of a freed slot, its generation is incremented, producing a new, distinct `NodeId`.
/// - A slot whose generation reaches `u32::MAX` is retired instead of reused.
///
/// Erasing an interior node relocates other nodes within the tree, but a relocated node keeps
/// its slot, so its `NodeId` still names the same point and payload afterwards.
///
/// ### Liveness
///
/// Use [`KdTree::is_alive`](crate::KdTree::is_alive) to check whether a `NodeId` still refers
/// to a live node. Stale `NodeId`s never alias a different live node because the generation
/// must match. Every tree, including each clone, carries its own id, so a handle presented
/// to a tree other than the one that issued it is rejected as stale.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeId(pub(crate) u32, pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32, owner: u32) -> Self {
        Self(idx, generation, owner)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Side {
    Left,
    Right,
}

#[derive(Clone, Debug)]
pub(crate) struct Node<T, P, const D: usize> {
    pub(crate) position: [T; D],
    pub(crate) data: P,
    pub(crate) axis: usize,
    pub(crate) parent: Option<usize>,
    pub(crate) left: Option<usize>,
    pub(crate) right: Option<usize>,
}

impl<T: Coord, P, const D: usize> Node<T, P, D> {
    fn new(position: [T; D], data: P, axis: usize, parent: Option<usize>) -> Self {
        Self {
            position,
            data,
            axis,
            parent,
            left: None,
            right: None,
        }
    }

    pub(crate) fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    pub(crate) fn child(&self, side: Side) -> Option<usize> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    /// Which side of this node's splitting hyperplane `point` falls on.
    pub(crate) fn side_for(&self, point: &[T; D]) -> Side {
        if goes_right(point[self.axis], self.position[self.axis]) {
            Side::Right
        } else {
            Side::Left
        }
    }

    fn matches(&self, point: &[T; D]) -> bool {
        self.position.iter().zip(point).all(|(a, b)| a == b)
    }
}

static NEXT_OWNER: AtomicU32 = AtomicU32::new(1);

/// A fresh tree id. Wraps after `u32::MAX` trees have been created in one process.
pub(crate) fn next_owner() -> u32 {
    NEXT_OWNER.fetch_add(1, Ordering::Relaxed)
}

/// Slot arena holding every node of one tree.
#[derive(Clone)]
pub(crate) struct Nodes<T, P, const D: usize> {
    owner: u32,
    slots: Vec<Option<Node<T, P, D>>>,
    generations: Vec<u32>, // last generation per slot (persists across frees)
    free_list: Vec<usize>,
    alive: usize,
}

impl<T, P, const D: usize> Nodes<T, P, D> {
    pub(crate) const fn new(owner: u32) -> Self {
        Self {
            owner,
            slots: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            alive: 0,
        }
    }

    /// Re-tag the arena, invalidating every handle issued under the previous id.
    pub(crate) fn set_owner(&mut self, owner: u32) {
        self.owner = owner;
    }

    pub(crate) fn alive(&self) -> usize {
        self.alive
    }

    pub(crate) fn total_slots(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn free_slots(&self) -> usize {
        self.free_list.len()
    }

    #[allow(
        clippy::cast_possible_truncation,
        reason = "NodeId uses 32-bit indices by design."
    )]
    pub(crate) fn id(&self, idx: usize) -> NodeId {
        NodeId::new(idx as u32, self.generations[idx], self.owner)
    }

    /// Map a handle to its slot, rejecting freed or reused slots and foreign handles.
    pub(crate) fn resolve(&self, id: NodeId) -> Result<usize, Error> {
        if id.2 != self.owner {
            return Err(Error::StaleHandle(id));
        }
        let idx = id.idx();
        match (self.slots.get(idx), self.generations.get(idx)) {
            (Some(Some(_)), Some(&generation)) if generation == id.1 => Ok(idx),
            _ => Err(Error::StaleHandle(id)),
        }
    }

    /// Access a live slot; panics if `idx` is not linked into the tree.
    pub(crate) fn node(&self, idx: usize) -> &Node<T, P, D> {
        self.slots[idx].as_ref().expect("dangling node slot")
    }

    pub(crate) fn node_mut(&mut self, idx: usize) -> &mut Node<T, P, D> {
        self.slots[idx].as_mut().expect("dangling node slot")
    }

    fn alloc(&mut self, node: Node<T, P, D>) -> usize {
        self.alive += 1;
        if let Some(idx) = self.free_list.pop() {
            // Slots on the free list never sit at `u32::MAX`; see `recycle`.
            self.generations[idx] += 1;
            self.slots[idx] = Some(node);
            idx
        } else {
            self.slots.push(Some(node));
            self.generations.push(1);
            self.slots.len() - 1
        }
    }

    /// Release a slot. The caller must already have unlinked it from its parent.
    pub(crate) fn free(&mut self, idx: usize) -> Node<T, P, D> {
        let node = self.slots[idx].take().expect("dangling node slot");
        self.recycle(idx);
        self.alive -= 1;
        node
    }

    /// Queue an empty slot for reuse unless its generations are used up.
    fn recycle(&mut self, idx: usize) {
        if self.generations[idx] < u32::MAX {
            self.free_list.push(idx);
        }
    }

    /// Drop every node while keeping slot generations, so all outstanding handles go stale.
    pub(crate) fn clear(&mut self) {
        self.free_list.clear();
        for slot in &mut self.slots {
            *slot = None;
        }
        for idx in (0..self.slots.len()).rev() {
            self.recycle(idx);
        }
        self.alive = 0;
    }

    pub(crate) fn set_child(&mut self, parent: usize, side: Side, child: Option<usize>) {
        let p = self.node_mut(parent);
        match side {
            Side::Left => p.left = child,
            Side::Right => p.right = child,
        }
    }

    /// Which child slot of `parent` holds `child`.
    pub(crate) fn side_of(&self, parent: usize, child: usize) -> Result<Side, Error> {
        let p = self.node(parent);
        if p.left == Some(child) {
            Ok(Side::Left)
        } else if p.right == Some(child) {
            Ok(Side::Right)
        } else {
            Err(Error::InvariantViolated(
                "parent does not hold the node in either child slot",
            ))
        }
    }

    /// Exchange a node's left and right subtrees.
    pub(crate) fn flip_children(&mut self, idx: usize) {
        let n = self.node_mut(idx);
        core::mem::swap(&mut n.left, &mut n.right);
    }

    /// Exchange the tree positions of `a` and `b`.
    ///
    /// Parents, children, and the links pointing at each node are rewired so that `a` sits
    /// where `b` was and vice versa. Positions and payloads stay with their nodes; the split
    /// axes are exchanged, since an axis belongs to a depth in the tree rather than to a node.
    ///
    /// All links are validated before anything is rewritten, so an error leaves the
    /// structure untouched.
    pub(crate) fn swap(&mut self, a: usize, b: usize) -> Result<(), Error> {
        if a == b {
            return Ok(());
        }
        let (pa, la, ra, axis_a) = {
            let n = self.node(a);
            (n.parent, n.left, n.right, n.axis)
        };
        let (pb, lb, rb, axis_b) = {
            let n = self.node(b);
            (n.parent, n.left, n.right, n.axis)
        };

        if pa == Some(b) && pb == Some(a) {
            return Err(Error::InvariantViolated("two nodes are each other's parent"));
        }
        if pa == Some(b) {
            return self.swap(b, a);
        }

        if pb == Some(a) {
            // `b` is a direct child of `a`: `a` moves below `b` into the freed slot.
            let b_side = self.side_of(a, b)?;
            let a_side = match pa {
                Some(p) => Some(self.side_of(p, a)?),
                None => None,
            };

            {
                let n = self.node_mut(a);
                n.parent = Some(b);
                n.left = lb;
                n.right = rb;
            }
            {
                let n = self.node_mut(b);
                n.parent = pa;
                match b_side {
                    Side::Left => {
                        n.left = Some(a);
                        n.right = ra;
                    }
                    Side::Right => {
                        n.left = la;
                        n.right = Some(a);
                    }
                }
            }
            for c in [lb, rb].into_iter().flatten() {
                self.node_mut(c).parent = Some(a);
            }
            let sibling = match b_side {
                Side::Left => ra,
                Side::Right => la,
            };
            if let Some(s) = sibling {
                self.node_mut(s).parent = Some(b);
            }
            if let (Some(p), Some(side)) = (pa, a_side) {
                self.set_child(p, side, Some(b));
            }
        } else {
            let a_side = match pa {
                Some(p) => Some(self.side_of(p, a)?),
                None => None,
            };
            let b_side = match pb {
                Some(p) => Some(self.side_of(p, b)?),
                None => None,
            };

            for c in [la, ra].into_iter().flatten() {
                self.node_mut(c).parent = Some(b);
            }
            for c in [lb, rb].into_iter().flatten() {
                self.node_mut(c).parent = Some(a);
            }
            {
                let n = self.node_mut(a);
                n.parent = pb;
                n.left = lb;
                n.right = rb;
            }
            {
                let n = self.node_mut(b);
                n.parent = pa;
                n.left = la;
                n.right = ra;
            }
            // Sides were captured up front, so siblings under one parent swap correctly.
            if let (Some(p), Some(side)) = (pa, a_side) {
                self.set_child(p, side, Some(b));
            }
            if let (Some(p), Some(side)) = (pb, b_side) {
                self.set_child(p, side, Some(a));
            }
        }

        self.node_mut(a).axis = axis_b;
        self.node_mut(b).axis = axis_a;
        Ok(())
    }
}

impl<T: Coord, P, const D: usize> Nodes<T, P, D> {
    /// Create a parentless node on axis 0.
    pub(crate) fn insert_root(&mut self, position: [T; D], data: P) -> usize {
        self.alloc(Node::new(position, data, 0, None))
    }

    /// Insert below `root`, creating a new leaf where the descent runs out of children.
    ///
    /// Duplicate points are not special-cased; they descend right and become new nodes.
    pub(crate) fn insert(&mut self, root: usize, position: [T; D], data: P) -> usize {
        let mut idx = root;
        loop {
            let (side, next, axis) = {
                let n = self.node(idx);
                let side = n.side_for(&position);
                (side, n.child(side), n.axis)
            };
            match next {
                Some(c) => idx = c,
                None => {
                    let child = self.alloc(Node::new(position, data, (axis + 1) % D, Some(idx)));
                    self.set_child(idx, side, Some(child));
                    return child;
                }
            }
        }
    }

    /// Exact-match search below `root`.
    pub(crate) fn find(&self, root: usize, point: &[T; D]) -> Option<usize> {
        let mut idx = root;
        loop {
            let n = self.node(idx);
            if n.matches(point) {
                return Some(idx);
            }
            idx = n.child(n.side_for(point))?;
        }
    }

    /// Node with the smallest coordinate along `axis` in the subtree at `root`.
    ///
    /// Where a node splits on `axis` itself, everything to its right is at least as large,
    /// so only the left side is searched. Ties keep the first candidate in pre-order.
    pub(crate) fn find_min(&self, root: usize, axis: usize) -> usize {
        self.find_extreme(root, axis, Side::Left)
    }

    /// Node with the largest coordinate along `axis` in the subtree at `root`.
    pub(crate) fn find_max(&self, root: usize, axis: usize) -> usize {
        self.find_extreme(root, axis, Side::Right)
    }

    fn find_extreme(&self, root: usize, axis: usize, toward: Side) -> usize {
        let better = |candidate: T, best: T| match toward {
            Side::Left => lt(candidate, best),
            Side::Right => gt(candidate, best),
        };
        let mut best: Option<usize> = None;
        let mut stack = vec![root];
        while let Some(idx) = stack.pop() {
            let n = self.node(idx);
            if n.axis == axis {
                if let Some(c) = n.child(toward) {
                    stack.push(c);
                    continue;
                }
            } else {
                stack.extend(n.right);
                stack.extend(n.left);
            }
            let replace = match best {
                None => true,
                Some(b) => better(n.position[axis], self.node(b).position[axis]),
            };
            if replace {
                best = Some(idx);
            }
        }
        best.unwrap_or(root)
    }

    /// Number of levels in the subtree at `root` (a lone node has depth 1).
    pub(crate) fn depth(&self, root: usize) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(root, 1_usize)];
        while let Some((idx, level)) = stack.pop() {
            deepest = deepest.max(level);
            let n = self.node(idx);
            for c in [n.left, n.right].into_iter().flatten() {
                stack.push((c, level + 1));
            }
        }
        deepest
    }

    /// Number of nodes in the subtree at `root`, including `root`.
    pub(crate) fn size(&self, root: usize) -> usize {
        let mut count = 0;
        let mut stack = vec![root];
        while let Some(idx) = stack.pop() {
            count += 1;
            let n = self.node(idx);
            stack.extend(n.left);
            stack.extend(n.right);
        }
        count
    }

    /// Append the subtree at `root` in pre-order: node, left subtree, right subtree.
    pub(crate) fn collect(&self, root: usize, out: &mut Vec<usize>) {
        let mut stack = vec![root];
        while let Some(idx) = stack.pop() {
            out.push(idx);
            let n = self.node(idx);
            stack.extend(n.right);
            stack.extend(n.left);
        }
    }

    /// Verify the subtree at `root` against every structural invariant.
    ///
    /// Each node must lie inside the half-spaces carved out by all of its ancestors (not just
    /// its parent), its axis must follow its parent's axis cyclically, and every child must
    /// link back to the node holding it. Returns the number of nodes visited.
    pub(crate) fn check(&self, root: usize) -> Result<usize, Error> {
        let r = self.node(root);
        if r.parent.is_some() {
            return Err(Error::InvariantViolated("root has a parent"));
        }
        if r.axis != 0 {
            return Err(Error::InvariantViolated("root does not split on axis 0"));
        }

        let mut visited = 0;
        // Per axis: inclusive lower bound from right turns, exclusive upper bound from left turns.
        let mut stack = vec![(root, [None::<T>; D], [None::<T>; D])];
        while let Some((idx, lower, upper)) = stack.pop() {
            visited += 1;
            if visited > self.alive {
                return Err(Error::InvariantViolated("more reachable nodes than live slots"));
            }
            let n = self.node(idx);
            for a in 0..D {
                let v = n.position[a];
                if lower[a].is_some_and(|lo| lt(v, lo)) {
                    return Err(Error::InvariantViolated(
                        "point lies left of a split it descends right from",
                    ));
                }
                if upper[a].is_some_and(|hi| !lt(v, hi)) {
                    return Err(Error::InvariantViolated(
                        "point lies right of a split it descends left from",
                    ));
                }
            }
            if n.left.is_some() && n.left == n.right {
                return Err(Error::InvariantViolated("both child slots hold the same node"));
            }
            let split = n.position[n.axis];
            for (side, child) in [(Side::Left, n.left), (Side::Right, n.right)] {
                let Some(c) = child else {
                    continue;
                };
                let Some(Some(cn)) = self.slots.get(c) else {
                    return Err(Error::InvariantViolated("child slot points at a freed node"));
                };
                if cn.parent != Some(idx) {
                    return Err(Error::InvariantViolated(
                        "child does not link back to its parent",
                    ));
                }
                if cn.axis != (n.axis + 1) % D {
                    return Err(Error::InvariantViolated("split axis does not cycle with depth"));
                }
                let (mut lo, mut hi) = (lower, upper);
                match side {
                    Side::Left => hi[n.axis] = Some(split),
                    Side::Right => lo[n.axis] = Some(split),
                }
                stack.push((c, lo, hi));
            }
        }
        Ok(visited)
    }
}
