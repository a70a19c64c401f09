// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Boolean profiles.
//!
//! [`Windows`] wraps a `Profile<bool>` and adds boolean algebra, duration
//! filters and edge shifting. It dereferences to the underlying profile, so
//! every generic [`Profile`] operation is available too.
//!
//! Gaps are "unknown", not "false":
//! - `and` is false wherever either side is false, even over the other's gap
//! - `or` is true wherever either side is true, even over the other's gap
//! - `not` keeps gaps as gaps
//!
//! Use [`Windows::assign_gaps`] to make a decision for the gaps explicitly.

use crate::profile::map2_segments;
use crate::timeline::{coalesce, truncate};
use crate::{
    time, BinaryOperation, Duration, Interval, Profile, ProfileKind, Real, Result, Segment,
    Session, Spans, Timeline,
};
use std::ops::Deref;

/// A lazy boolean profile.
#[derive(Debug, Clone)]
pub struct Windows(Profile<bool>);

impl From<Profile<bool>> for Windows {
    fn from(profile: Profile<bool>) -> Self {
        Windows(profile.with_kind(ProfileKind::Windows))
    }
}

impl From<Windows> for Profile<bool> {
    fn from(windows: Windows) -> Self {
        windows.0
    }
}

impl Deref for Windows {
    type Target = Profile<bool>;

    fn deref(&self) -> &Profile<bool> {
        &self.0
    }
}

impl Windows {
    /// Wraps a boolean segment timeline.
    pub fn new(segments: Timeline<Segment<bool>>) -> Self {
        Windows(Profile::new(segments, ProfileKind::Windows))
    }

    /// `value` everywhere.
    pub fn value(value: bool) -> Self {
        Profile::value(value).into()
    }

    /// `value` over `interval`, a gap elsewhere.
    pub fn value_within(value: bool, interval: Interval) -> Self {
        Profile::value_within(value, interval).into()
    }

    pub fn from_segments(segments: Vec<Segment<bool>>) -> Self {
        Profile::from_segments(segments).into()
    }

    /// Windows read from an external boolean resource.
    pub fn resource(session: &Session, name: &str) -> Self {
        Profile::resource(session, name).into()
    }

    pub fn into_profile(self) -> Profile<bool> {
        self.0
    }

    pub fn as_profile(&self) -> &Profile<bool> {
        &self.0
    }

    // ── Boolean algebra ───────────────────────────────────────────────────

    /// Logical and. False wins over a gap.
    pub fn and(&self, other: &Windows) -> Windows {
        self.0
            .map2_values(
                &other.0,
                BinaryOperation::cases(
                    |l: &bool, _| if *l { None } else { Some(false) },
                    |r: &bool, _| if *r { None } else { Some(false) },
                    |l: &bool, r: &bool, _| Some(*l && *r),
                ),
                ProfileKind::Windows,
            )
            .into()
    }

    /// Logical or. True wins over a gap.
    pub fn or(&self, other: &Windows) -> Windows {
        self.0
            .map2_values(
                &other.0,
                BinaryOperation::cases(
                    |l: &bool, _| if *l { Some(true) } else { None },
                    |r: &bool, _| if *r { Some(true) } else { None },
                    |l: &bool, r: &bool, _| Some(*l || *r),
                ),
                ProfileKind::Windows,
            )
            .into()
    }

    /// Logical not. Gaps stay gaps.
    pub fn not(&self) -> Windows {
        self.0.map_values(|v: &bool, _| !v).into()
    }

    /// Union that treats a gap on one side as "use the other side".
    pub fn add(&self, other: &Windows) -> Windows {
        self.0
            .map2_values(
                &other.0,
                BinaryOperation::combine_or_identity(|l: &bool, r: &bool, _| *l || *r),
                ProfileKind::Windows,
            )
            .into()
    }

    /// Replaces the windows' gaps with `default`.
    pub fn assign_gaps(&self, default: bool) -> Windows {
        self.0.assign_gaps_value(default).into()
    }

    /// Restricts the windows to `interval`.
    pub fn select(&self, interval: Interval) -> Windows {
        self.0.select(interval).into()
    }

    // ── Duration filters ──────────────────────────────────────────────────

    /// Sets true windows shorter than `min` or longer than `max` to false.
    ///
    /// Both limits are inclusive. Durations are measured after clipping to
    /// the evaluation bounds, so a window cut by the bounds may look shorter
    /// than it is.
    pub fn falsify_by_duration(&self, min: Option<Duration>, max: Option<Duration>) -> Windows {
        self.0
            .map_values(move |v, interval| {
                let d = interval.duration();
                *v && min.map_or(true, |min| d >= min) && max.map_or(true, |max| d <= max)
            })
            .into()
    }

    /// Keeps only true windows of at least `min`.
    pub fn longer_than(&self, min: Duration) -> Windows {
        self.falsify_by_duration(Some(min), None)
    }

    /// Keeps only true windows of at most `max`.
    pub fn shorter_than(&self, max: Duration) -> Windows {
        self.falsify_by_duration(None, Some(max))
    }

    // ── Edges ─────────────────────────────────────────────────────────────

    /// Moves rising edges by `shift_rising` and falling edges by
    /// `shift_falling`.
    ///
    /// A true window `[s, e]` becomes `[s + shift_rising, e + shift_falling]`
    /// and a false window `[s, e]` becomes `[s + shift_falling, e +
    /// shift_rising]`. Where a moved true window and a moved false window
    /// overlap, true wins.
    pub fn shift_by(&self, shift_rising: Duration, shift_falling: Duration) -> Windows {
        let source = self.0.timeline().clone();
        let earliest = shift_rising.min(shift_falling);
        let latest = shift_rising.max(shift_falling);
        Windows::new(Timeline::new(move |bounds: Interval| {
            let expanded = Interval::between(
                time::saturating_sub(bounds.start, latest),
                time::saturating_sub(bounds.end, earliest),
                bounds.start_inclusivity,
                bounds.end_inclusivity,
            );
            let mut trues = Vec::new();
            let mut falses = Vec::new();
            for segment in source.evaluate(expanded)? {
                if segment.value {
                    let moved = segment.interval.shift_by(shift_rising, shift_falling);
                    trues.push(Segment::new(true, moved));
                } else {
                    let moved = segment.interval.shift_by(shift_falling, shift_rising);
                    falses.push(Segment::new(false, moved));
                }
            }
            // each class moves uniformly, so both lists stay start-sorted
            let merged = map2_segments(
                &coalesce(falses),
                &coalesce(trues),
                &BinaryOperation::combine_or_identity(|_: &bool, t: &bool, _| *t),
            )?;
            Ok(coalesce(truncate(merged, &bounds)))
        }))
    }

    /// True at instants where the windows go from false to true.
    pub fn starts(&self) -> Windows {
        self.0.transitions(false, true)
    }

    /// True at instants where the windows go from true to false.
    pub fn ends(&self) -> Windows {
        self.0.transitions(true, false)
    }

    /// True at every rising or falling edge, counting a gap as false.
    pub fn all_edges(&self) -> Windows {
        self.0.edges(BinaryOperation::cases(
            |l: &bool, _| Some(*l),
            |r: &bool, _| Some(*r),
            |l: &bool, r: &bool, _| Some(l != r),
        ))
    }

    // ── Conversions ───────────────────────────────────────────────────────

    /// The true windows as spans.
    pub fn spans(&self) -> Spans<Interval> {
        let source = self.0.timeline().clone();
        Spans::new(Timeline::new(move |bounds| {
            Ok(source
                .evaluate(bounds)?
                .into_iter()
                .filter(|s| s.value)
                .map(|s| s.interval)
                .collect())
        }))
    }

    // ── Durations ─────────────────────────────────────────────────────────

    /// The running total of true time from the start of the bounds, in
    /// `unit`s.
    pub fn accumulated_duration(&self, unit: Duration) -> Real {
        self.spans().accumulated_duration(unit)
    }

    /// How much of the `range` ahead of each instant is true, in `unit`s.
    pub fn rolling_duration(&self, range: Duration, unit: Duration) -> Real {
        self.spans().rolling_duration(range, unit)
    }

    /// Whether the windows are true over all of `bounds` with no gaps.
    pub fn is_always_true(&self, bounds: Interval) -> Result<bool> {
        let segments = self.0.collect(bounds)?;
        Ok(matches!(segments.as_slice(), [only] if only.value && only.interval == bounds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::micros;
    use crate::Inclusivity::{Exclusive, Inclusive};
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn co(start: i64, end: i64) -> Interval {
        Interval::between_closed_open(micros(start), micros(end))
    }

    fn seg(value: bool, interval: Interval) -> Segment<bool> {
        Segment::new(value, interval)
    }

    fn sample() -> Windows {
        Windows::from_segments(vec![seg(true, co(0, 4)), seg(false, co(4, 6)), seg(true, co(6, 10))])
    }

    #[test_case(true, true, true)]
    #[test_case(true, false, false)]
    #[test_case(false, true, false)]
    #[test_case(false, false, false)]
    fn test_and_truth_table(a: bool, b: bool, expected: bool) {
        let bounds = co(0, 10);
        let result = Windows::value(a).and(&Windows::value(b));
        assert_eq!(result.collect(bounds).unwrap(), vec![seg(expected, bounds)]);
    }

    #[test_case(true, true, true)]
    #[test_case(true, false, true)]
    #[test_case(false, true, true)]
    #[test_case(false, false, false)]
    fn test_or_truth_table(a: bool, b: bool, expected: bool) {
        let bounds = co(0, 10);
        let result = Windows::value(a).or(&Windows::value(b));
        assert_eq!(result.collect(bounds).unwrap(), vec![seg(expected, bounds)]);
    }

    #[test]
    fn test_gap_semantics() {
        let bounds = co(0, 10);
        let partial_false = Windows::value_within(false, co(0, 5));
        let partial_true = Windows::value_within(true, co(0, 5));

        // false dominates a gap in `and`, true dominates a gap in `or`
        assert_eq!(
            partial_false.and(&Windows::value(true)).collect(bounds).unwrap(),
            vec![seg(false, co(0, 5))]
        );
        assert_eq!(
            partial_true.or(&Windows::value(false)).collect(bounds).unwrap(),
            vec![seg(true, co(0, 5))]
        );
        assert_eq!(
            partial_true.add(&Windows::value(false)).collect(bounds).unwrap(),
            vec![seg(true, co(0, 5)), seg(false, co(5, 10))]
        );
        assert_eq!(
            partial_true.assign_gaps(false).collect(bounds).unwrap(),
            vec![seg(true, co(0, 5)), seg(false, co(5, 10))]
        );
    }

    #[test]
    fn test_not_is_involution() {
        let bounds = co(0, 10);
        let w = sample();
        assert_eq!(w.not().not().collect(bounds).unwrap(), w.collect(bounds).unwrap());
        assert_eq!(
            w.not().collect(bounds).unwrap(),
            vec![seg(false, co(0, 4)), seg(true, co(4, 6)), seg(false, co(6, 10))]
        );
    }

    #[test]
    fn test_falsify_by_duration_limits_are_inclusive() {
        let bounds = co(0, 10);
        let w = sample();
        assert_eq!(
            w.longer_than(micros(4)).collect(bounds).unwrap(),
            w.collect(bounds).unwrap()
        );
        assert_eq!(
            w.shorter_than(micros(3)).collect(bounds).unwrap(),
            vec![seg(false, co(0, 10))]
        );
        assert_eq!(
            w.longer_than(micros(5)).collect(bounds).unwrap(),
            vec![seg(false, co(0, 10))]
        );
    }

    #[test]
    fn test_shift_by_moves_edges_independently() {
        let bounds = co(-20, 30);
        let w = Windows::from_segments(vec![
            seg(false, co(0, 5)),
            seg(true, co(5, 10)),
            seg(false, co(10, 15)),
        ]);
        let shifted = w.shift_by(micros(1), micros(3));
        assert_eq!(
            shifted.collect(bounds).unwrap(),
            vec![seg(false, co(3, 6)), seg(true, co(6, 13)), seg(false, co(13, 16))]
        );
    }

    #[test]
    fn test_shift_by_closes_short_false_windows() {
        let bounds = co(-20, 30);
        let w = Windows::from_segments(vec![
            seg(true, co(0, 2)),
            seg(false, co(2, 3)),
            seg(true, co(3, 5)),
        ]);
        // delaying falling edges by more than the false window lasts swallows it
        let shifted = w.shift_by(micros(0), micros(2));
        assert_eq!(shifted.collect(bounds).unwrap(), vec![seg(true, co(0, 7))]);
    }

    #[test]
    fn test_shift_by_queries_outside_bounds() {
        let w = Windows::from_segments(vec![seg(true, co(0, 5)), seg(false, co(5, 20))]);
        let shifted = w.shift_by(micros(10), micros(10));
        assert_eq!(shifted.collect(co(10, 12)).unwrap(), vec![seg(true, co(10, 12))]);
    }

    fn truth_at(windows: &Windows, bounds: Interval, t: Duration) -> Option<bool> {
        windows
            .collect(bounds)
            .unwrap()
            .into_iter()
            .find(|s| s.interval.contains(t))
            .map(|s| s.value)
    }

    #[test]
    fn test_starts_and_ends() {
        let bounds = co(0, 10);
        let w = sample();
        let starts = w.starts();
        assert_eq!(truth_at(&starts, bounds, micros(6)), Some(true));
        assert_eq!(truth_at(&starts, bounds, micros(4)), Some(false));
        assert_eq!(truth_at(&starts, bounds, micros(2)), Some(false));
        // already true at the start of the bounds: not known to be a start
        assert_eq!(truth_at(&starts, bounds, micros(0)), None);

        let ends = w.ends();
        assert_eq!(truth_at(&ends, bounds, micros(4)), Some(true));
        assert_eq!(truth_at(&ends, bounds, micros(6)), Some(false));
        assert_eq!(ends.collect(bounds).unwrap().iter().filter(|s| s.value).count(), 1);
    }

    #[test]
    fn test_all_edges_counts_gaps_as_false() {
        let bounds = Interval::closed(micros(0), micros(10));
        let w = Windows::value_within(true, Interval::between(micros(2), micros(5), Inclusive, Exclusive));
        let edges = w.all_edges().collect(bounds).unwrap();
        assert_eq!(
            edges,
            vec![
                seg(true, Interval::at(micros(2))),
                seg(false, Interval::between(micros(2), micros(5), Exclusive, Exclusive)),
                seg(true, Interval::at(micros(5))),
            ]
        );
    }

    #[test]
    fn test_all_edges_across_single_instant_gap() {
        let bounds = Interval::closed(micros(0), micros(10));
        let w = Windows::from_segments(vec![
            seg(true, co(0, 5)),
            seg(false, Interval::between(micros(5), micros(10), Exclusive, Inclusive)),
        ]);
        assert_eq!(
            w.all_edges().collect(bounds).unwrap(),
            vec![
                seg(true, Interval::at(micros(0))),
                seg(false, Interval::between(micros(0), micros(5), Exclusive, Exclusive)),
                seg(true, Interval::at(micros(5))),
                seg(false, Interval::between(micros(5), micros(10), Exclusive, Inclusive)),
            ]
        );
    }

    #[test]
    fn test_spans_are_true_windows() {
        let spans = sample().spans().collect(co(0, 10)).unwrap();
        assert_eq!(spans, vec![co(0, 4), co(6, 10)]);
    }

    #[test]
    fn test_is_always_true() {
        assert!(Windows::value(true).is_always_true(co(0, 3)).unwrap());
        assert!(!sample().is_always_true(co(0, 10)).unwrap());
        assert!(!Windows::value_within(true, co(0, 2)).is_always_true(co(0, 3)).unwrap());
    }
}
