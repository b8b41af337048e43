// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Coordinate scalars and distance helpers.

use core::cmp::Ordering;
use core::fmt::Debug;
use core::ops::Sub;

/// Numeric coordinate abstraction for k-d tree points.
///
/// Distances are only ever compared, never reported as lengths, so the tree works with
/// squared Euclidean distances throughout. Those are accumulated in an associated widened
/// type (f32→f64, f64→f64, i32→i64, i64→i128). A coordinate difference always fits the
/// accumulator; squaring and summing saturate at the accumulator's maximum for integers, so
/// distances are total for every input but points beyond that bound compare as equally far.
pub trait Coord: Copy + PartialOrd + Debug {
    /// Widened accumulator type for squared distances.
    type Acc: Copy + PartialOrd + Sub<Output = Self::Acc> + Debug;

    /// Convert a coordinate to the accumulator type.
    fn widen(v: Self) -> Self::Acc;

    /// Zero value for the accumulator type.
    fn acc_zero() -> Self::Acc;

    /// `a + b`, saturating for integer accumulators.
    fn acc_add(a: Self::Acc, b: Self::Acc) -> Self::Acc;

    /// `a * a`, saturating for integer accumulators.
    fn acc_square(a: Self::Acc) -> Self::Acc;
}

impl Coord for f32 {
    type Acc = f64;

    #[inline]
    fn widen(v: Self) -> Self::Acc {
        f64::from(v)
    }

    #[inline]
    fn acc_zero() -> Self::Acc {
        0.0
    }

    #[inline]
    fn acc_add(a: Self::Acc, b: Self::Acc) -> Self::Acc {
        a + b
    }

    #[inline]
    fn acc_square(a: Self::Acc) -> Self::Acc {
        a * a
    }
}

impl Coord for f64 {
    type Acc = Self;

    #[inline]
    fn widen(v: Self) -> Self::Acc {
        v
    }

    #[inline]
    fn acc_zero() -> Self::Acc {
        0.0
    }

    #[inline]
    fn acc_add(a: Self::Acc, b: Self::Acc) -> Self::Acc {
        a + b
    }

    #[inline]
    fn acc_square(a: Self::Acc) -> Self::Acc {
        a * a
    }
}

impl Coord for i32 {
    type Acc = i64;

    #[inline]
    fn widen(v: Self) -> Self::Acc {
        i64::from(v)
    }

    #[inline]
    fn acc_zero() -> Self::Acc {
        0
    }

    #[inline]
    fn acc_add(a: Self::Acc, b: Self::Acc) -> Self::Acc {
        a.saturating_add(b)
    }

    #[inline]
    fn acc_square(a: Self::Acc) -> Self::Acc {
        a.saturating_mul(a)
    }
}

impl Coord for i64 {
    type Acc = i128;

    #[inline]
    fn widen(v: Self) -> Self::Acc {
        i128::from(v)
    }

    #[inline]
    fn acc_zero() -> Self::Acc {
        0
    }

    #[inline]
    fn acc_add(a: Self::Acc, b: Self::Acc) -> Self::Acc {
        a.saturating_add(b)
    }

    #[inline]
    fn acc_square(a: Self::Acc) -> Self::Acc {
        a.saturating_mul(a)
    }
}

/// Helper alias for the widened accumulator type associated with a coordinate `T`.
pub type CoordAcc<T> = <T as Coord>::Acc;

/// Squared distance between two coordinates along a single axis.
#[inline]
pub fn axis_sq_dist<T: Coord>(a: T, b: T) -> T::Acc {
    T::acc_square(T::widen(a) - T::widen(b))
}

/// Squared Euclidean distance between two points.
#[inline]
pub fn sq_dist<T: Coord, const D: usize>(a: &[T; D], b: &[T; D]) -> T::Acc {
    a.iter()
        .zip(b)
        .fold(T::acc_zero(), |acc, (&x, &y)| T::acc_add(acc, axis_sq_dist(x, y)))
}

/// Partition rule shared by every traversal: ties go right.
#[inline]
pub(crate) fn goes_right<T: PartialOrd>(value: T, split: T) -> bool {
    !lt(value, split)
}

pub(crate) fn lt<T: PartialOrd>(a: T, b: T) -> bool {
    a.partial_cmp(&b)
        .map(|o| o == Ordering::Less)
        .unwrap_or(false)
}

pub(crate) fn gt<T: PartialOrd>(a: T, b: T) -> bool {
    a.partial_cmp(&b)
        .map(|o| o == Ordering::Greater)
        .unwrap_or(false)
}
