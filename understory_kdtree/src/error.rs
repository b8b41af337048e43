// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Contract violations reported by [`KdTree`](crate::KdTree).

use core::fmt;

use crate::node::NodeId;

/// Errors returned when a caller breaks the tree's contract or the structure is found corrupt.
///
/// None of these are recoverable runtime conditions: empty-tree queries return `None` or an
/// empty result instead. An operation that returns an error leaves the tree untouched.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// The handle does not refer to a live node of this tree.
    StaleHandle(NodeId),
    /// An axis index was not smaller than the tree's dimension count.
    AxisOutOfRange {
        /// The requested axis.
        axis: usize,
        /// The tree's dimension count.
        dimensions: usize,
    },
    /// A parent/child link or partition constraint does not hold.
    InvariantViolated(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StaleHandle(id) => write!(f, "stale node handle {id:?}"),
            Self::AxisOutOfRange { axis, dimensions } => {
                write!(f, "axis {axis} out of range for {dimensions} dimensions")
            }
            Self::InvariantViolated(what) => write!(f, "k-d tree invariant violated: {what}"),
        }
    }
}

impl core::error::Error for Error {}
