// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Lazy timelines and the list primitives every combinator is built from.
//!
//! A [`Timeline<V>`] is a pure function from a query [`Interval`] to the
//! payloads that cover (a subset of) it. Nothing is computed until
//! [`Timeline::evaluate`] is called, and calling it twice with the same bounds
//! recomputes unless the timeline was wrapped with [`Timeline::memoized`].
//!
//! The free functions operate on start-sorted payload lists:
//! - [`sort_by_start`]: stable sort by start, ties broken by end
//! - [`coalesce`] / [`coalesce_by`]: merge touching segments with equal values
//! - [`truncate`]: clip a list to bounds

use crate::{IntervalLike, Interval, Result, Segment};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, trace};

type EvalFn<V> = dyn Fn(Interval) -> Result<Vec<V>> + Send + Sync;

/// A lazily evaluated, shareable function from bounds to payloads.
///
/// Cloning a timeline is cheap; clones share the same function.
pub struct Timeline<V> {
    eval: Arc<EvalFn<V>>,
}

impl<V> Clone for Timeline<V> {
    fn clone(&self) -> Self {
        Timeline {
            eval: Arc::clone(&self.eval),
        }
    }
}

impl<V> fmt::Debug for Timeline<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timeline").finish_non_exhaustive()
    }
}

impl<V: 'static> Timeline<V> {
    /// Wraps an evaluation function.
    ///
    /// The function must only return payloads contained in the bounds it is
    /// given; for segment timelines the payloads must also be start-sorted
    /// and non-overlapping.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Interval) -> Result<Vec<V>> + Send + Sync + 'static,
    {
        Timeline { eval: Arc::new(f) }
    }

    /// A timeline with nothing in it.
    pub fn empty() -> Self {
        Self::new(|_| Ok(Vec::new()))
    }

    /// Evaluates the timeline on `bounds`.
    ///
    /// Empty bounds short-circuit to an empty list without running the
    /// underlying function.
    pub fn evaluate(&self, bounds: Interval) -> Result<Vec<V>> {
        if bounds.is_empty() {
            return Ok(Vec::new());
        }
        (self.eval)(bounds)
    }
}

impl<V: IntervalLike + Send + Sync + 'static> Timeline<V> {
    /// A timeline over a fixed list, clipping each item to the query bounds.
    ///
    /// The list is sorted by start once, up front.
    pub fn from_list(mut items: Vec<V>) -> Self {
        sort_by_start(&mut items);
        let items = Arc::new(items);
        Self::new(move |bounds| Ok(truncate(items.iter().cloned(), &bounds)))
    }

    /// Caches results per bounds.
    ///
    /// The cache is keyed by exact interval equality, not overlap: querying
    /// `[0, 10]` and then `[0, 5]` evaluates twice. Errors are not cached.
    /// Every distinct bounds queried stays in the cache for the life of the
    /// timeline; nothing is evicted.
    pub fn memoized(self) -> Self {
        let cache: Arc<Mutex<HashMap<Interval, Vec<V>>>> = Arc::default();
        Self::new(move |bounds| {
            if let Some(hit) = cache
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .get(&bounds)
            {
                debug!(%bounds, "timeline cache hit");
                return Ok(hit.clone());
            }
            debug!(%bounds, "timeline cache miss");
            let result = self.evaluate(bounds)?;
            cache
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(bounds, result.clone());
            Ok(result)
        })
    }
}

/// Stable sort by start time, ties broken by end time.
pub fn sort_by_start<T: IntervalLike>(items: &mut [T]) {
    items.sort_by(|a, b| {
        let (a, b) = (a.interval(), b.interval());
        a.compare_starts(&b).then_with(|| a.compare_ends(&b))
    });
}

/// Whether `items` is already in [`sort_by_start`] order.
pub fn is_sorted_by_start<T: IntervalLike>(items: &[T]) -> bool {
    items.windows(2).all(|pair| {
        let (a, b) = (pair[0].interval(), pair[1].interval());
        a.compare_starts(&b).then_with(|| a.compare_ends(&b)) != Ordering::Greater
    })
}

/// Clips every item to `bounds`, dropping those left empty.
pub fn truncate<T: IntervalLike>(items: impl IntoIterator<Item = T>, bounds: &Interval) -> Vec<T> {
    items.into_iter().filter_map(|item| item.bound(bounds)).collect()
}

/// Coalesces a start-sorted segment list using `PartialEq` on the values.
pub fn coalesce<V: Clone + PartialEq>(segments: Vec<Segment<V>>) -> Vec<Segment<V>> {
    coalesce_by(segments, |a, b| a == b)
}

/// Coalesces a start-sorted segment list.
///
/// Touching or overlapping neighbours with equal values (per `equals`) are
/// merged. Neighbours with different values that overlap are cut so they
/// abut exactly: the later segment wins from its start onward, and whatever
/// is left of the earlier one after the later ends is kept. Empty segments
/// are dropped. The output has no two touching segments with equal values.
pub fn coalesce_by<V, F>(segments: Vec<Segment<V>>, equals: F) -> Vec<Segment<V>>
where
    V: Clone,
    F: Fn(&V, &V) -> bool,
{
    let mut result = Vec::with_capacity(segments.len());
    let mut iter = segments.into_iter().filter(|s| !s.interval.is_empty());
    let Some(mut buffer) = iter.next() else {
        return result;
    };

    for next in iter {
        let comparison = buffer.interval.compare_end_to_start(&next.interval);
        if comparison == Ordering::Less {
            result.push(std::mem::replace(&mut buffer, next));
        } else if equals(&buffer.value, &next.value) {
            if buffer.interval.compare_ends(&next.interval) == Ordering::Less {
                buffer.interval.end = next.interval.end;
                buffer.interval.end_inclusivity = next.interval.end_inclusivity;
            }
        } else if comparison == Ordering::Equal {
            result.push(std::mem::replace(&mut buffer, next));
        } else {
            let head = Interval::between(
                buffer.interval.start,
                next.interval.start,
                buffer.interval.start_inclusivity,
                next.interval.start_inclusivity.opposite(),
            );
            if !head.is_empty() {
                result.push(buffer.with_interval(head));
            }
            if buffer.interval.compare_ends(&next.interval) == Ordering::Greater {
                let tail = Interval::between(
                    next.interval.end,
                    buffer.interval.end,
                    next.interval.end_inclusivity.opposite(),
                    buffer.interval.end_inclusivity,
                );
                result.push(next);
                buffer = buffer.with_interval(tail);
            } else {
                buffer = next;
            }
        }
    }
    result.push(buffer);
    trace!(segments = result.len(), "coalesced");
    result
}
