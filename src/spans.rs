// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Possibly-overlapping collections of interval-like objects.
//!
//! Unlike a [`Profile`], a [`Spans`] collection may hold overlapping items
//! and never coalesces them. Spans are reduced back into profiles with
//! [`Spans::flatten_into_profile`], [`Spans::combine_into_profile`] or one of
//! the ready-made reductions such as [`Spans::count_active`].

use crate::profile::{map2_segments, ProfileValue};
use crate::time::{self, Duration};
use crate::timeline::{coalesce, sort_by_start, truncate};
use crate::{
    BinaryOperation, Inclusivity, Interval, IntervalLike, LinearEquation, Profile, ProfileKind,
    Real, Result, Segment, Timeline, TimelineError, Windows,
};
use std::cmp::Ordering;
use std::fmt;
use tracing::debug;

/// A lazy collection of interval-like objects that may overlap.
pub struct Spans<S> {
    timeline: Timeline<S>,
}

impl<S> Clone for Spans<S> {
    fn clone(&self) -> Self {
        Spans {
            timeline: self.timeline.clone(),
        }
    }
}

impl<S> fmt::Debug for Spans<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Spans").finish_non_exhaustive()
    }
}

impl<S: IntervalLike + Send + Sync + 'static> Spans<S> {
    /// Wraps a timeline. Items must be start-sorted and within the bounds.
    pub fn new(timeline: Timeline<S>) -> Self {
        Spans { timeline }
    }

    /// Spans over a fixed list.
    pub fn from_list(items: Vec<S>) -> Self {
        Self::new(Timeline::from_list(items))
    }

    pub fn timeline(&self) -> &Timeline<S> {
        &self.timeline
    }

    /// Evaluates the spans on `bounds`.
    pub fn collect(&self, bounds: Interval) -> Result<Vec<S>> {
        self.timeline.evaluate(bounds)
    }

    /// Keeps only the spans for which `predicate` holds.
    pub fn filter<F>(&self, predicate: F) -> Self
    where
        F: Fn(&S) -> bool + Send + Sync + 'static,
    {
        let source = self.timeline.clone();
        Self::new(Timeline::new(move |bounds| {
            let mut kept = source.evaluate(bounds)?;
            kept.retain(|span| predicate(span));
            Ok(kept)
        }))
    }

    /// Moves each span to the interval `f` returns for it.
    ///
    /// `bounds_map` must invert the movement; see [`Profile::map_intervals`].
    pub fn map_intervals<F, B>(&self, f: F, bounds_map: B) -> Self
    where
        F: Fn(&S) -> Interval + Send + Sync + 'static,
        B: Fn(Interval) -> Interval + Send + Sync + 'static,
    {
        let source = self.timeline.clone();
        Self::new(Timeline::new(move |bounds| {
            let moved = source
                .evaluate(bounds_map(bounds))?
                .into_iter()
                .map(|span| span.with_interval(f(&span)));
            let mut moved = truncate(moved, &bounds);
            sort_by_start(&mut moved);
            Ok(moved)
        }))
    }

    /// The instant each span starts.
    ///
    /// A span that began before the evaluation bounds reports the start of
    /// the bounds.
    pub fn starts(&self) -> Self {
        self.map_intervals(|span| Interval::at(span.interval().start), |bounds| bounds)
    }

    /// The instant each span ends; clipped like [`Spans::starts`].
    pub fn ends(&self) -> Self {
        self.map_intervals(|span| Interval::at(span.interval().end), |bounds| bounds)
    }

    /// Moves every start by `shift_start` and every end by `shift_end`.
    ///
    /// Spans left empty are dropped.
    pub fn shift_endpoints(&self, shift_start: Duration, shift_end: Duration) -> Self {
        let earliest = shift_start.min(shift_end);
        let latest = shift_start.max(shift_end);
        self.map_intervals(
            move |span| span.interval().shift_by(shift_start, shift_end),
            move |bounds| {
                Interval::between(
                    time::saturating_sub(bounds.start, latest),
                    time::saturating_sub(bounds.end, earliest),
                    bounds.start_inclusivity,
                    bounds.end_inclusivity,
                )
            },
        )
    }

    /// Overlays two collections without changing either.
    pub fn merge(&self, other: &Spans<S>) -> Self {
        let (left, right) = (self.timeline.clone(), other.timeline.clone());
        Self::new(Timeline::new(move |bounds| {
            let mut merged = left.evaluate(bounds)?;
            merged.extend(right.evaluate(bounds)?);
            sort_by_start(&mut merged);
            Ok(merged)
        }))
    }

    /// Keeps the spans that overlap a true window.
    ///
    /// With `truncate_marginal`, each kept span is cut to its overlaps with
    /// the true windows (one piece per window); otherwise it is kept whole.
    pub fn filter_by_windows(&self, windows: &Windows, truncate_marginal: bool) -> Self {
        let source = self.timeline.clone();
        let trues = windows.spans();
        Self::new(Timeline::new(move |bounds| {
            let windows = trues.collect(bounds)?;
            let mut result = Vec::new();
            for span in source.evaluate(bounds)? {
                let interval = span.interval();
                let first = windows
                    .partition_point(|w| w.compare_end_to_start(&interval) == Ordering::Less);
                let mut overlaps = windows[first..]
                    .iter()
                    .take_while(|w| interval.compare_end_to_start(*w) != Ordering::Less)
                    .map(|w| Interval::intersect(w, &interval))
                    .filter(|overlap| !overlap.is_empty());
                if truncate_marginal {
                    result.extend(overlaps.map(|overlap| span.with_interval(overlap)));
                } else if overlaps.next().is_some() {
                    result.push(span);
                }
            }
            sort_by_start(&mut result);
            Ok(result)
        }))
    }

    /// True where a span satisfying `predicate` is active, false elsewhere.
    pub fn highlight<F>(&self, predicate: F) -> Windows
    where
        F: Fn(&S) -> bool + Send + Sync + 'static,
    {
        self.filter(predicate).active()
    }

    /// Links every span to the first span of `other` that starts at or after
    /// its end.
    ///
    /// The link covers `[from.end, to.start]`. Spans with nothing to link to
    /// are linked to the end of the bounds (with `to` empty) if
    /// `connect_to_bounds` is set, and dropped otherwise.
    pub fn connect_to<U>(&self, other: &Spans<U>, connect_to_bounds: bool) -> Spans<Connection<S, U>>
    where
        U: IntervalLike + Send + Sync + 'static,
    {
        let (from_source, to_source) = (self.timeline.clone(), other.timeline.clone());
        Spans::new(Timeline::new(move |bounds: Interval| {
            let mut froms = from_source.evaluate(bounds)?;
            froms.sort_by(|a, b| a.interval().compare_ends(&b.interval()));
            let mut tos = to_source.evaluate(bounds)?;
            sort_by_start(&mut tos);

            let mut result = Vec::with_capacity(froms.len());
            let mut next = 0;
            for from in froms {
                let start = from.interval().end;
                while next < tos.len()
                    && from.interval().compare_end_to_start(&tos[next].interval()) == Ordering::Greater
                {
                    next += 1;
                }
                match tos.get(next) {
                    Some(to) => result.push(Connection {
                        interval: Interval::closed(start, to.interval().start),
                        from,
                        to: Some(to.clone()),
                    }),
                    None if connect_to_bounds => result.push(Connection {
                        interval: Interval::between(
                            start,
                            bounds.end,
                            Inclusivity::Inclusive,
                            bounds.end_inclusivity,
                        ),
                        from,
                        to: None,
                    }),
                    None => break,
                }
            }
            Ok(truncate(result, &bounds))
        }))
    }
}

/// A link between a span and a later span of another collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Connection<F, T> {
    /// From the end of `from` to the start of `to`.
    pub interval: Interval,
    pub from: F,
    /// `None` when the link runs to the end of the bounds instead.
    pub to: Option<T>,
}

impl<F: Clone, T: Clone> IntervalLike for Connection<F, T> {
    fn interval(&self) -> Interval {
        self.interval
    }

    fn with_interval(&self, interval: Interval) -> Self {
        Connection {
            interval,
            ..self.clone()
        }
    }
}

impl<S: IntervalLike + Send + Sync + 'static> Spans<S> {
    /// Splits every span into `pieces` equal sub-spans.
    ///
    /// Rounding remainders go to the last piece. `internal_start` and
    /// `internal_end` set the inclusivity at the cut points; the outer ends
    /// keep the original inclusivities. With `strict`, a span that touches
    /// the evaluation bounds (and so may have been clipped) is an error.
    ///
    /// Fails immediately if `pieces` is zero; the other failures surface
    /// during evaluation.
    pub fn split(
        &self,
        pieces: usize,
        internal_start: Inclusivity,
        internal_end: Inclusivity,
        strict: bool,
    ) -> Result<Self> {
        if pieces == 0 {
            return Err(TimelineError::InvalidSplitCount);
        }
        if pieces == 1 {
            return Ok(self.clone());
        }
        let source = self.timeline.clone();
        let count = i64::try_from(pieces).unwrap_or(i64::MAX);
        Ok(Self::new(Timeline::new(move |bounds: Interval| {
            let mut result = Vec::new();
            for span in source.evaluate(bounds)? {
                let interval = span.interval();
                if interval.is_point() {
                    return Err(TimelineError::InstantaneousSplit { interval });
                }
                if strict
                    && (interval.compare_starts(&bounds) == Ordering::Equal
                        || interval.compare_ends(&bounds) == Ordering::Equal)
                {
                    return Err(TimelineError::SplitAtBounds { interval, bounds });
                }
                let total = time::total_micros(interval.duration());
                let width = total / count;
                if width == 0 {
                    return Err(TimelineError::SplitTooFine {
                        micros: total,
                        pieces,
                    });
                }
                let step = time::micros(width);
                let (mut start, mut start_inclusivity) = (interval.start, interval.start_inclusivity);
                for index in 0..pieces {
                    let (end, end_inclusivity) = if index + 1 == pieces {
                        (interval.end, interval.end_inclusivity)
                    } else {
                        (start + step, internal_end)
                    };
                    result.push(span.with_interval(Interval::between(
                        start,
                        end,
                        start_inclusivity,
                        end_inclusivity,
                    )));
                    start = end;
                    start_inclusivity = internal_start;
                }
            }
            debug!(spans = result.len(), pieces, "split spans");
            Ok(result)
        })))
    }
}

impl<V: ProfileValue> Spans<Segment<V>> {
    /// Every segment of a profile, as a span.
    pub fn from_profile(profile: &Profile<V>) -> Self {
        Spans::new(profile.timeline().clone())
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Reductions into profiles
// ═══════════════════════════════════════════════════════════════════════════

impl<S: IntervalLike + Send + Sync + 'static> Spans<S> {
    /// Turns each span into a segment with value `f(span)`.
    ///
    /// Where spans overlap, the one that starts later wins.
    pub fn flatten_into_profile<V, F>(&self, f: F, kind: ProfileKind) -> Profile<V>
    where
        V: ProfileValue,
        F: Fn(&S) -> V + Send + Sync + 'static,
    {
        let source = self.timeline.clone();
        Profile::new(
            Timeline::new(move |bounds| {
                let mut segments: Vec<Segment<V>> = source
                    .evaluate(bounds)?
                    .iter()
                    .map(|span| Segment::new(f(span), span.interval()))
                    .collect();
                sort_by_start(&mut segments);
                Ok(coalesce(segments))
            }),
            kind,
        )
    }

    /// Folds every span into an accumulated profile with `op`.
    ///
    /// `op.left` turns a lone span into a value, `op.right` keeps the
    /// accumulator where no span is present, and `op.combine` folds a span
    /// into the accumulator where both exist. Overlapping spans are handled
    /// in successive non-overlapping batches.
    pub fn combine_into_profile<V>(&self, op: BinaryOperation<S, V, V>, kind: ProfileKind) -> Profile<V>
    where
        V: ProfileValue,
    {
        let source = self.timeline.clone();
        Profile::new(
            Timeline::new(move |bounds| {
                let mut remaining = source.evaluate(bounds)?;
                sort_by_start(&mut remaining);
                let mut accumulated: Vec<Segment<V>> = Vec::new();
                while !remaining.is_empty() {
                    let mut batch = Vec::new();
                    let mut deferred = Vec::new();
                    let mut last: Option<Interval> = None;
                    for span in remaining {
                        let interval = span.interval();
                        let fits = last.map_or(true, |last| {
                            last.compare_end_to_start(&interval) != Ordering::Greater
                        });
                        if fits {
                            last = Some(interval);
                            batch.push(Segment::new(span, interval));
                        } else {
                            deferred.push(span);
                        }
                    }
                    accumulated = map2_segments(&batch, &accumulated, &op)?;
                    remaining = deferred;
                }
                Ok(accumulated)
            }),
            kind,
        )
    }

    /// How many spans are active at each instant; zero where none are.
    pub fn count_active(&self) -> Profile<i64> {
        self.combine_into_profile(
            BinaryOperation::cases(
                |_: &S, _| Some(1),
                |count: &i64, _| Some(*count),
                |_: &S, count: &i64, _| Some(count + 1),
            ),
            ProfileKind::Discrete,
        )
        .assign_gaps_value(0)
    }

    /// True where at least one span is active, false elsewhere.
    pub fn active(&self) -> Windows {
        Windows::from(self.flatten_into_profile(|_| true, ProfileKind::Windows)).assign_gaps(false)
    }

    /// The running total of active span time from the start of the bounds,
    /// in `unit`s.
    ///
    /// Overlapping spans each count: two spans active over the same second
    /// add two seconds. Use [`Windows::accumulated_duration`] on
    /// [`Spans::active`] to count covered time once.
    pub fn accumulated_duration(&self, unit: Duration) -> Real {
        let rates = self
            .count_active()
            .map_values_into(|count, _| LinearEquation::constant(*count as f64), ProfileKind::Real);
        Real::from(rates).integrate(unit)
    }

    /// Active span time within the `range` ahead of each instant, in
    /// `unit`s, counted like [`Spans::accumulated_duration`].
    pub fn rolling_duration(&self, range: Duration, unit: Duration) -> Real {
        self.accumulated_duration(unit).shifted_difference(range)
    }
}
