// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Pointwise combination rules for two profiles.
//!
//! A [`BinaryOperation`] says what to produce where only the left operand
//! has a value, where only the right one does, and where both do. Every case
//! may return `None`, which leaves a gap in the output, or an error, which
//! aborts the evaluation.

use crate::{Interval, Result};
use std::fmt;
use std::sync::Arc;

type LeftFn<L, O> = dyn Fn(&L, Interval) -> Result<Option<O>> + Send + Sync;
type RightFn<R, O> = dyn Fn(&R, Interval) -> Result<Option<O>> + Send + Sync;
type CombineFn<L, R, O> = dyn Fn(&L, &R, Interval) -> Result<Option<O>> + Send + Sync;

/// Three-case combination of a left value type `L` and a right value type
/// `R` into an output `O`.
pub struct BinaryOperation<L, R, O> {
    left: Arc<LeftFn<L, O>>,
    right: Arc<RightFn<R, O>>,
    combine: Arc<CombineFn<L, R, O>>,
}

impl<L, R, O> Clone for BinaryOperation<L, R, O> {
    fn clone(&self) -> Self {
        BinaryOperation {
            left: Arc::clone(&self.left),
            right: Arc::clone(&self.right),
            combine: Arc::clone(&self.combine),
        }
    }
}

impl<L, R, O> fmt::Debug for BinaryOperation<L, R, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BinaryOperation").finish_non_exhaustive()
    }
}

impl<L: 'static, R: 'static, O: 'static> BinaryOperation<L, R, O> {
    /// Builds an operation from three infallible cases.
    pub fn cases<FL, FR, FC>(left: FL, right: FR, combine: FC) -> Self
    where
        FL: Fn(&L, Interval) -> Option<O> + Send + Sync + 'static,
        FR: Fn(&R, Interval) -> Option<O> + Send + Sync + 'static,
        FC: Fn(&L, &R, Interval) -> Option<O> + Send + Sync + 'static,
    {
        Self::try_cases(
            move |l, i| Ok(left(l, i)),
            move |r, i| Ok(right(r, i)),
            move |l, r, i| Ok(combine(l, r, i)),
        )
    }

    /// Builds an operation from three fallible cases.
    pub fn try_cases<FL, FR, FC>(left: FL, right: FR, combine: FC) -> Self
    where
        FL: Fn(&L, Interval) -> Result<Option<O>> + Send + Sync + 'static,
        FR: Fn(&R, Interval) -> Result<Option<O>> + Send + Sync + 'static,
        FC: Fn(&L, &R, Interval) -> Result<Option<O>> + Send + Sync + 'static,
    {
        BinaryOperation {
            left: Arc::new(left),
            right: Arc::new(right),
            combine: Arc::new(combine),
        }
    }

    /// Builds all three cases from one function over optional operands.
    ///
    /// The function is never called with both operands absent.
    pub fn single_function<F>(f: F) -> Self
    where
        F: Fn(Option<&L>, Option<&R>, Interval) -> Option<O> + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        let (fl, fr) = (Arc::clone(&f), Arc::clone(&f));
        Self::cases(
            move |l, i| fl(Some(l), None, i),
            move |r, i| fr(None, Some(r), i),
            move |l, r, i| f(Some(l), Some(r), i),
        )
    }

    /// Produces a value only where both operands are present.
    pub fn combine_or_none<F>(f: F) -> Self
    where
        F: Fn(&L, &R, Interval) -> O + Send + Sync + 'static,
    {
        Self::cases(|_, _| None, |_, _| None, move |l, r, i| Some(f(l, r, i)))
    }

    /// Fallible form of [`BinaryOperation::combine_or_none`].
    pub fn try_combine_or_none<F>(f: F) -> Self
    where
        F: Fn(&L, &R, Interval) -> Result<O> + Send + Sync + 'static,
    {
        Self::try_cases(
            |_, _| Ok(None),
            |_, _| Ok(None),
            move |l, r, i| f(l, r, i).map(Some),
        )
    }

    #[inline]
    pub fn left(&self, l: &L, interval: Interval) -> Result<Option<O>> {
        (self.left)(l, interval)
    }

    #[inline]
    pub fn right(&self, r: &R, interval: Interval) -> Result<Option<O>> {
        (self.right)(r, interval)
    }

    #[inline]
    pub fn combine(&self, l: &L, r: &R, interval: Interval) -> Result<Option<O>> {
        (self.combine)(l, r, interval)
    }
}

impl<V: Clone + 'static> BinaryOperation<V, V, V> {
    /// Passes a lone operand through unchanged and combines where both exist.
    pub fn combine_or_identity<F>(f: F) -> Self
    where
        F: Fn(&V, &V, Interval) -> V + Send + Sync + 'static,
    {
        Self::cases(
            |l, _| Some(l.clone()),
            |r, _| Some(r.clone()),
            move |l, r, i| Some(f(l, r, i)),
        )
    }
}
