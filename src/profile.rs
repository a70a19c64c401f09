// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Piecewise-constant profiles.
//!
//! A [`Profile<V>`] is a lazy [`Timeline`] of [`Segment`]s that, once
//! evaluated, are start-sorted, pairwise non-overlapping and coalesced: no
//! two touching segments carry equal values. Gaps are allowed and mean "no
//! value here".
//!
//! Every combinator returns a new profile that wraps the previous one, so
//! building a pipeline costs nothing until [`Profile::collect`] is called.
//! Binary combinators all go through [`map2_segments`], a single linear
//! sweep over both inputs driven by a [`BinaryOperation`].
//!
//! Two kinds of profile have dedicated wrappers with extra operations:
//! [`Windows`] (`Profile<bool>`) and [`Real`] (`Profile<LinearEquation>`).
//! A generic pipeline can recover them with [`Profile::specialize`].

use crate::timeline::{coalesce, sort_by_start, truncate};
use crate::{
    time, BinaryOperation, Duration, Inclusivity, Interval, LinearEquation, Real, Result,
    Segment, Session, Spans, Timeline, TimelineError, Windows,
};
use serde::de::DeserializeOwned;
use std::any::Any;
use std::cmp::Ordering;
use std::fmt;
use tracing::trace;

/// Bound shared by every profile value type.
pub trait ProfileValue: Clone + PartialEq + fmt::Debug + Send + Sync + 'static {}

impl<T> ProfileValue for T where T: Clone + PartialEq + fmt::Debug + Send + Sync + 'static {}

/// Which wrapper a profile belongs to, kept across generic operations so
/// [`Profile::specialize`] can restore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileKind {
    Real,
    Discrete,
    Windows,
    Other,
}

/// A profile recovered into its most specific wrapper.
#[derive(Debug, Clone)]
pub enum Specialized<V> {
    Windows(Windows),
    Real(Real),
    Plain(Profile<V>),
}

/// A lazy, piecewise-constant function of time.
pub struct Profile<V> {
    segments: Timeline<Segment<V>>,
    kind: ProfileKind,
}

impl<V> Clone for Profile<V> {
    fn clone(&self) -> Self {
        Profile {
            segments: self.segments.clone(),
            kind: self.kind,
        }
    }
}

impl<V> fmt::Debug for Profile<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Profile").field("kind", &self.kind).finish_non_exhaustive()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Construction
// ═══════════════════════════════════════════════════════════════════════════

impl<V: ProfileValue> Profile<V> {
    /// Wraps a segment timeline. The timeline must honour the profile
    /// invariants (sorted, non-overlapping, coalesced, within bounds).
    pub fn new(segments: Timeline<Segment<V>>, kind: ProfileKind) -> Self {
        Profile { segments, kind }
    }

    /// A profile with no segments.
    pub fn empty() -> Self {
        Self::new(Timeline::empty(), ProfileKind::Other)
    }

    /// A profile equal to `value` everywhere.
    pub fn value(value: V) -> Self {
        Self::new(
            Timeline::new(move |bounds| Ok(vec![Segment::new(value.clone(), bounds)])),
            ProfileKind::Other,
        )
    }

    /// A profile equal to `value` over `interval` and absent elsewhere.
    pub fn value_within(value: V, interval: Interval) -> Self {
        Self::from_segments(vec![Segment::new(value, interval)])
    }

    /// A profile over a fixed list of segments.
    ///
    /// The list is sorted and coalesced once; where segments with different
    /// values overlap, the later one in start order wins.
    pub fn from_segments(mut segments: Vec<Segment<V>>) -> Self {
        sort_by_start(&mut segments);
        Self::new(Timeline::from_list(coalesce(segments)), ProfileKind::Other)
    }

    /// A profile read from an external resource, decoding each value with
    /// serde.
    pub fn resource(session: &Session, name: &str) -> Self
    where
        V: DeserializeOwned,
    {
        let segments = session.decoded_resource(name, |segment| {
            serde_json::from_value(segment.value.clone()).map_err(|e| e.to_string())
        });
        Self::new(
            Timeline::new(move |bounds| Ok(coalesce(segments.evaluate(bounds)?))),
            ProfileKind::Other,
        )
    }

    /// The same segments tagged with a different kind.
    pub fn with_kind(self, kind: ProfileKind) -> Self {
        Profile { kind, ..self }
    }

    pub fn kind(&self) -> ProfileKind {
        self.kind
    }

    /// The underlying segment timeline.
    pub fn timeline(&self) -> &Timeline<Segment<V>> {
        &self.segments
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Evaluation
// ═══════════════════════════════════════════════════════════════════════════

impl<V: ProfileValue> Profile<V> {
    /// Evaluates the profile on `bounds`.
    pub fn collect(&self, bounds: Interval) -> Result<Vec<Segment<V>>> {
        trace!(kind = ?self.kind, %bounds, "collecting profile");
        let result = self.segments.evaluate(bounds)?;
        trace!(kind = ?self.kind, segments = result.len(), "collected profile");
        Ok(result)
    }

    /// The value at a single instant, if any.
    ///
    /// Fails with [`TimelineError::AmbiguousValue`] if the profile produced
    /// more than one segment at `time`.
    pub fn value_at(&self, time: Duration) -> Result<Option<V>> {
        let mut found = self.collect(Interval::at(time))?;
        if found.len() > 1 {
            return Err(TimelineError::AmbiguousValue { time });
        }
        Ok(found.pop().map(|s| s.value))
    }

    /// Whether any segment in `bounds` satisfies `predicate`.
    pub fn any(&self, predicate: impl Fn(&V, Interval) -> bool, bounds: Interval) -> Result<bool> {
        Ok(self
            .collect(bounds)?
            .iter()
            .any(|s| predicate(&s.value, s.interval)))
    }

    /// Whether every segment in `bounds` satisfies `predicate`.
    ///
    /// Gaps are not checked.
    pub fn all(&self, predicate: impl Fn(&V, Interval) -> bool, bounds: Interval) -> Result<bool> {
        Ok(self
            .collect(bounds)?
            .iter()
            .all(|s| predicate(&s.value, s.interval)))
    }

    /// Calls `observer` with every evaluation result, passing it through.
    pub fn inspect<F>(&self, observer: F) -> Self
    where
        F: Fn(&[Segment<V>], Interval) + Send + Sync + 'static,
    {
        let source = self.segments.clone();
        Self::new(
            Timeline::new(move |bounds| {
                let result = source.evaluate(bounds)?;
                observer(&result, bounds);
                Ok(result)
            }),
            self.kind,
        )
    }

    /// Caches evaluation results per exact bounds.
    pub fn memoized(&self) -> Self {
        Self::new(self.segments.clone().memoized(), self.kind)
    }

    /// Recovers the dedicated wrapper for windows and real profiles.
    pub fn specialize(self) -> Specialized<V> {
        let any: &dyn Any = &self;
        match self.kind {
            ProfileKind::Windows => {
                if let Some(windows) = any.downcast_ref::<Profile<bool>>() {
                    return Specialized::Windows(Windows::from(windows.clone()));
                }
            }
            ProfileKind::Real => {
                if let Some(real) = any.downcast_ref::<Profile<LinearEquation>>() {
                    return Specialized::Real(Real::from(real.clone()));
                }
            }
            ProfileKind::Discrete | ProfileKind::Other => {}
        }
        Specialized::Plain(self)
    }

    /// Each segment as a span.
    pub fn into_spans(self) -> Spans<Segment<V>> {
        Spans::new(self.segments)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Unary operations
// ═══════════════════════════════════════════════════════════════════════════

impl<V: ProfileValue> Profile<V> {
    /// General per-segment map.
    ///
    /// `bounds_map` turns the requested bounds into the bounds the source is
    /// evaluated on; `f` must move segments accordingly. The result is
    /// clipped back to the requested bounds, sorted and coalesced.
    pub fn map<W, F, B>(&self, f: F, bounds_map: B, kind: ProfileKind) -> Profile<W>
    where
        W: ProfileValue,
        F: Fn(Segment<V>) -> Segment<W> + Send + Sync + 'static,
        B: Fn(Interval) -> Interval + Send + Sync + 'static,
    {
        let source = self.segments.clone();
        Profile::new(
            Timeline::new(move |bounds| {
                let mapped = source.evaluate(bounds_map(bounds))?.into_iter().map(&f);
                let mut mapped = truncate(mapped, &bounds);
                sort_by_start(&mut mapped);
                Ok(coalesce(mapped))
            }),
            kind,
        )
    }

    /// Maps each segment to any number of segments within its interval.
    pub fn flat_map<W, F>(&self, f: F, kind: ProfileKind) -> Profile<W>
    where
        W: ProfileValue,
        F: Fn(&Segment<V>) -> Vec<Segment<W>> + Send + Sync + 'static,
    {
        let source = self.segments.clone();
        Profile::new(
            Timeline::new(move |bounds| {
                let mut mapped = Vec::new();
                for segment in source.evaluate(bounds)? {
                    mapped.extend(truncate(f(&segment), &segment.interval));
                }
                sort_by_start(&mut mapped);
                Ok(coalesce(truncate(mapped, &bounds)))
            }),
            kind,
        )
    }

    /// Maps values, keeping intervals and kind.
    pub fn map_values<F>(&self, f: F) -> Self
    where
        F: Fn(&V, Interval) -> V + Send + Sync + 'static,
    {
        self.map_values_into(f, self.kind)
    }

    /// Maps values into another type.
    pub fn map_values_into<W, F>(&self, f: F, kind: ProfileKind) -> Profile<W>
    where
        W: ProfileValue,
        F: Fn(&V, Interval) -> W + Send + Sync + 'static,
    {
        self.map(
            move |s| Segment::new(f(&s.value, s.interval), s.interval),
            |bounds| bounds,
            kind,
        )
    }

    /// Moves each segment to the interval `f` returns for it.
    ///
    /// `bounds_map` must invert the movement so the source is queried where
    /// the moved segments come from.
    pub fn map_intervals<F, B>(&self, f: F, bounds_map: B) -> Self
    where
        F: Fn(&Segment<V>) -> Interval + Send + Sync + 'static,
        B: Fn(Interval) -> Interval + Send + Sync + 'static,
    {
        self.map(
            move |s| {
                let interval = f(&s);
                Segment::new(s.value, interval)
            },
            bounds_map,
            self.kind,
        )
    }

    /// Keeps only the segments for which `predicate` holds.
    pub fn filter<F>(&self, predicate: F) -> Self
    where
        F: Fn(&V, Interval) -> bool + Send + Sync + 'static,
    {
        let source = self.segments.clone();
        Self::new(
            Timeline::new(move |bounds| {
                let mut kept = source.evaluate(bounds)?;
                kept.retain(|s| predicate(&s.value, s.interval));
                Ok(kept)
            }),
            self.kind,
        )
    }

    /// The intervals of the segments for which `predicate` holds.
    pub fn isolate<F>(&self, predicate: F) -> Spans<Interval>
    where
        F: Fn(&V, Interval) -> bool + Send + Sync + 'static,
    {
        let source = self.segments.clone();
        Spans::new(Timeline::new(move |bounds| {
            Ok(source
                .evaluate(bounds)?
                .into_iter()
                .filter(|s| predicate(&s.value, s.interval))
                .map(|s| s.interval)
                .collect())
        }))
    }

    /// True where `predicate` holds, false everywhere else in the bounds.
    pub fn highlight<F>(&self, predicate: F) -> Windows
    where
        F: Fn(&V, Interval) -> bool + Send + Sync + 'static,
    {
        Windows::from(self.map_values_into(predicate, ProfileKind::Windows)).assign_gaps(false)
    }

    /// Restricts the profile to `interval`; outside it the profile is empty.
    pub fn select(&self, interval: Interval) -> Self {
        let source = self.segments.clone();
        Self::new(
            Timeline::new(move |bounds| source.evaluate(Interval::intersect(&bounds, &interval))),
            self.kind,
        )
    }

    /// Moves the whole profile by `shift` (positive is later).
    pub fn shift_by(&self, shift: Duration) -> Self {
        let back = time::saturating_sub(Duration::zero(), shift);
        self.map_intervals(
            move |s| s.interval.shift_by(shift, shift),
            move |bounds| bounds.shift_by(back, back),
        )
    }

    /// Removes the profile's values over `interval`, leaving a gap.
    pub fn unset(&self, interval: Interval) -> Self {
        self.flat_map(
            move |s| {
                s.interval
                    .subtract(&interval)
                    .into_iter()
                    .map(|i| Segment::new(s.value.clone(), i))
                    .collect()
            },
            self.kind,
        )
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Binary operations
// ═══════════════════════════════════════════════════════════════════════════

impl<V: ProfileValue> Profile<V> {
    /// Combines two profiles pointwise.
    pub fn map2_values<R, O>(
        &self,
        other: &Profile<R>,
        op: BinaryOperation<V, R, O>,
        kind: ProfileKind,
    ) -> Profile<O>
    where
        R: ProfileValue,
        O: ProfileValue,
    {
        let (left, right) = (self.segments.clone(), other.segments.clone());
        Profile::new(
            Timeline::new(move |bounds| {
                map2_segments(&left.evaluate(bounds)?, &right.evaluate(bounds)?, &op)
            }),
            kind,
        )
    }

    /// Combines two profiles where every overlap can produce several
    /// segments, each within the overlap.
    pub fn flat_map2_values<R, O>(
        &self,
        other: &Profile<R>,
        op: BinaryOperation<V, R, Vec<Segment<O>>>,
        kind: ProfileKind,
    ) -> Profile<O>
    where
        R: ProfileValue,
        O: ProfileValue,
    {
        let nested = self.map2_values(other, op, ProfileKind::Other);
        Profile::new(
            Timeline::new(move |bounds| {
                let mut flat = Vec::new();
                for outer in nested.segments.evaluate(bounds)? {
                    flat.extend(truncate(outer.value, &outer.interval));
                }
                sort_by_start(&mut flat);
                Ok(coalesce(flat))
            }),
            kind,
        )
    }

    /// Overwrites this profile with `other` wherever `other` has a value.
    pub fn set(&self, other: &Profile<V>) -> Self {
        self.map2_values(
            other,
            BinaryOperation::combine_or_identity(|_: &V, r: &V, _| r.clone()),
            self.kind,
        )
    }

    /// Overwrites this profile with `value` over `interval`.
    pub fn set_value(&self, value: V, interval: Interval) -> Self {
        self.set(&Profile::value_within(value, interval))
    }

    /// Fills the gaps of this profile with `default`.
    pub fn assign_gaps(&self, default: &Profile<V>) -> Self {
        default.set(self).with_kind(self.kind)
    }

    /// Fills the gaps of this profile with a constant.
    pub fn assign_gaps_value(&self, default: V) -> Self {
        self.assign_gaps(&Profile::value(default))
    }

    /// True where both profiles have equal values, false where both have
    /// different values, and a gap where either is missing.
    pub fn equal_to(&self, other: &Profile<V>) -> Windows {
        Windows::from(self.map2_values(
            other,
            BinaryOperation::combine_or_none(|l: &V, r: &V, _| l == r),
            ProfileKind::Windows,
        ))
    }

    /// Negation of [`Profile::equal_to`].
    pub fn not_equal_to(&self, other: &Profile<V>) -> Windows {
        Windows::from(self.map2_values(
            other,
            BinaryOperation::combine_or_none(|l: &V, r: &V, _| l != r),
            ProfileKind::Windows,
        ))
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Edge detection
// ═══════════════════════════════════════════════════════════════════════════

impl<V: ProfileValue> Profile<V> {
    /// Marks instants where the profile's value moves from one segment to
    /// the next.
    ///
    /// At each segment boundary a point is produced:
    /// - between two touching segments, `combine(previous, next)`
    /// - where a segment starts after a gap or at the bounds, `right(segment)`
    /// - where a segment ends before a gap or at the bounds, `left(segment)`
    ///
    /// Segment interiors are `false`. `None` from the operation leaves a gap.
    pub fn edges(&self, edge_filter: BinaryOperation<V, V, bool>) -> Windows {
        let source = self.segments.clone();
        Windows::from(Profile::new(
            Timeline::new(move |bounds| {
                let segments = source.evaluate(bounds)?;
                let mut result: Vec<Segment<bool>> = Vec::with_capacity(segments.len() * 3);
                for (index, current) in segments.iter().enumerate() {
                    let interval = current.interval;
                    let previous = index
                        .checked_sub(1)
                        .and_then(|i| segments.get(i))
                        .filter(|p| p.interval.compare_end_to_start(&interval) == Ordering::Equal);
                    let touches_next = segments
                        .get(index + 1)
                        .is_some_and(|n| interval.compare_end_to_start(&n.interval) == Ordering::Equal);

                    let start = Interval::at(interval.start);
                    let rising = match previous {
                        Some(previous) => edge_filter.combine(&previous.value, &current.value, start)?,
                        None => edge_filter.right(&current.value, start)?,
                    };
                    // a one-instant gap puts the previous end point here too
                    let rising = if result.last().is_some_and(|last| last.interval == start) {
                        result
                            .pop()
                            .map(|falling| rising.map_or(falling.value, |r| r || falling.value))
                    } else {
                        rising
                    };
                    push_some(&mut result, rising, start);

                    let interior = Interval::between(
                        interval.start,
                        interval.end,
                        Inclusivity::Exclusive,
                        Inclusivity::Exclusive,
                    );
                    push_some(&mut result, Some(false), interior);

                    if !touches_next {
                        let end = Interval::at(interval.end);
                        let falling = edge_filter.left(&current.value, end)?;
                        push_some(&mut result, falling, end);
                    }
                }
                Ok(coalesce(truncate(result, &bounds)))
            }),
            ProfileKind::Windows,
        ))
    }

    /// True at instants where the value changes between touching segments.
    pub fn changes(&self) -> Windows {
        self.edges(BinaryOperation::combine_or_none(|l: &V, r: &V, _| l != r))
    }

    /// True at instants where the value goes from `from` to `to`.
    pub fn transitions(&self, from: V, to: V) -> Windows {
        let (from_left, from_combine) = (from.clone(), from);
        let (to_right, to_combine) = (to.clone(), to);
        self.edges(BinaryOperation::cases(
            move |l: &V, _| if *l == from_left { None } else { Some(false) },
            move |r: &V, _| if *r == to_right { None } else { Some(false) },
            move |l: &V, r: &V, _| Some(*l == from_combine && *r == to_combine),
        ))
    }
}

fn push_some<O>(result: &mut Vec<Segment<O>>, value: Option<O>, interval: Interval) {
    if let Some(value) = value {
        if !interval.is_empty() {
            result.push(Segment::new(value, interval));
        }
    }
}

/// Sweeps two start-sorted, non-overlapping segment lists in one pass.
///
/// Where only one side has a value, `op.left` or `op.right` decides the
/// output; where both do, `op.combine`. The output is sorted and coalesced
/// and covers exactly the instants where `op` returned a value.
pub fn map2_segments<L, R, O>(
    left: &[Segment<L>],
    right: &[Segment<R>],
    op: &BinaryOperation<L, R, O>,
) -> Result<Vec<Segment<O>>>
where
    L: Clone + 'static,
    R: Clone + 'static,
    O: Clone + PartialEq + 'static,
{
    let mut result = Vec::with_capacity(left.len() + right.len());
    let mut lefts = left.iter().cloned();
    let mut rights = right.iter().cloned();
    let mut l = lefts.next();
    let mut r = rights.next();

    loop {
        match (l.take(), r.take()) {
            (None, None) => break,
            (Some(ls), None) => {
                push_some(&mut result, op.left(&ls.value, ls.interval)?, ls.interval);
                l = lefts.next();
            }
            (None, Some(rs)) => {
                push_some(&mut result, op.right(&rs.value, rs.interval)?, rs.interval);
                r = rights.next();
            }
            (Some(ls), Some(rs)) => {
                let (li, ri) = (ls.interval, rs.interval);
                match li.compare_starts(&ri) {
                    Ordering::Less if li.compare_end_to_start(&ri) != Ordering::Greater => {
                        push_some(&mut result, op.left(&ls.value, li)?, li);
                        l = lefts.next();
                        r = Some(rs);
                    }
                    Ordering::Less => {
                        let head = Interval::between(
                            li.start,
                            ri.start,
                            li.start_inclusivity,
                            ri.start_inclusivity.opposite(),
                        );
                        push_some(&mut result, op.left(&ls.value, head)?, head);
                        let rest = Interval::between(
                            ri.start,
                            li.end,
                            ri.start_inclusivity,
                            li.end_inclusivity,
                        );
                        l = Some(Segment::new(ls.value, rest));
                        r = Some(rs);
                    }
                    Ordering::Greater if ri.compare_end_to_start(&li) != Ordering::Greater => {
                        push_some(&mut result, op.right(&rs.value, ri)?, ri);
                        l = Some(ls);
                        r = rights.next();
                    }
                    Ordering::Greater => {
                        let head = Interval::between(
                            ri.start,
                            li.start,
                            ri.start_inclusivity,
                            li.start_inclusivity.opposite(),
                        );
                        push_some(&mut result, op.right(&rs.value, head)?, head);
                        let rest = Interval::between(
                            li.start,
                            ri.end,
                            li.start_inclusivity,
                            ri.end_inclusivity,
                        );
                        l = Some(ls);
                        r = Some(Segment::new(rs.value, rest));
                    }
                    Ordering::Equal => match li.compare_ends(&ri) {
                        Ordering::Less => {
                            push_some(&mut result, op.combine(&ls.value, &rs.value, li)?, li);
                            let tail = Interval::between(
                                li.end,
                                ri.end,
                                li.end_inclusivity.opposite(),
                                ri.end_inclusivity,
                            );
                            l = lefts.next();
                            r = Some(Segment::new(rs.value, tail));
                        }
                        Ordering::Greater => {
                            push_some(&mut result, op.combine(&ls.value, &rs.value, ri)?, ri);
                            let tail = Interval::between(
                                ri.end,
                                li.end,
                                ri.end_inclusivity.opposite(),
                                li.end_inclusivity,
                            );
                            l = Some(Segment::new(ls.value, tail));
                            r = rights.next();
                        }
                        Ordering::Equal => {
                            push_some(&mut result, op.combine(&ls.value, &rs.value, li)?, li);
                            l = lefts.next();
                            r = rights.next();
                        }
                    },
                }
            }
        }
    }
    Ok(coalesce(result))
}
