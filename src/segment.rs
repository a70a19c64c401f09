// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Timeline payloads.
//!
//! Anything stored in a [`Timeline`](crate::Timeline) carries an interval and
//! can be clipped to a query; that contract is [`IntervalLike`]. The main
//! payload is [`Segment<V>`]: a value that holds over its whole interval.

use crate::Interval;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A payload that occupies an interval of time.
pub trait IntervalLike: Clone {
    /// The interval this object occupies.
    fn interval(&self) -> Interval;

    /// A copy of this object moved to a different interval.
    fn with_interval(&self, interval: Interval) -> Self;

    /// Clips this object to `bounds`, or `None` if nothing is left.
    fn bound(&self, bounds: &Interval) -> Option<Self> {
        let clipped = Interval::intersect(&self.interval(), bounds);
        if clipped.is_empty() {
            None
        } else {
            Some(self.with_interval(clipped))
        }
    }
}

impl IntervalLike for Interval {
    #[inline]
    fn interval(&self) -> Interval {
        *self
    }

    #[inline]
    fn with_interval(&self, interval: Interval) -> Self {
        interval
    }
}

/// A value paired with the interval over which it holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment<V> {
    pub value: V,
    pub interval: Interval,
}

impl<V> Segment<V> {
    pub fn new(value: V, interval: Interval) -> Self {
        Segment { value, interval }
    }

    /// Transforms the value, keeping the interval.
    pub fn map_value<W>(self, f: impl FnOnce(V) -> W) -> Segment<W> {
        Segment::new(f(self.value), self.interval)
    }

    /// Replaces the value, keeping the interval.
    pub fn with_value<W>(&self, value: W) -> Segment<W> {
        Segment::new(value, self.interval)
    }
}

impl<V> Segment<Option<V>> {
    /// Turns a segment of an optional value into an optional segment.
    ///
    /// `None` means "no value here": the segment becomes a gap.
    pub fn transpose(self) -> Option<Segment<V>> {
        let interval = self.interval;
        self.value.map(|value| Segment::new(value, interval))
    }
}

impl<V: Clone> IntervalLike for Segment<V> {
    #[inline]
    fn interval(&self) -> Interval {
        self.interval
    }

    #[inline]
    fn with_interval(&self, interval: Interval) -> Self {
        Segment::new(self.value.clone(), interval)
    }
}

impl<V: fmt::Debug> fmt::Display for Segment<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} over {}", self.value, self.interval)
    }
}
