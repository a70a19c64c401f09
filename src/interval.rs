// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Time intervals with independently inclusive or exclusive endpoints.
//!
//! This module provides:
//! - [`Inclusivity`]: whether an endpoint belongs to the interval
//! - [`Interval`]: a range of [`Duration`] offsets on the timeline
//!
//! Boundary semantics matter everywhere in this crate: `[0, 5)` and `[5, 10]`
//! meet exactly, `[0, 5]` and `[5, 10]` overlap at one instant, and `[0, 5)`
//! and `(5, 10]` leave the instant `5` uncovered.

use crate::time::{self, Duration};
use serde::{ser::SerializeStruct, Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;

/// Whether an interval contains one of its endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Inclusivity {
    Inclusive,
    Exclusive,
}

impl Inclusivity {
    /// Returns the opposite inclusivity.
    ///
    /// Used when cutting an interval in two: the piece before the cut ends with
    /// the opposite of the inclusivity the piece after the cut starts with.
    #[inline]
    pub fn opposite(self) -> Self {
        match self {
            Inclusivity::Inclusive => Inclusivity::Exclusive,
            Inclusivity::Exclusive => Inclusivity::Inclusive,
        }
    }

    /// Orders inclusivities by how much they restrict an interval.
    ///
    /// `Exclusive` is more restrictive than `Inclusive`.
    #[inline]
    pub fn compare_restrictiveness(self, other: Self) -> Ordering {
        match (self, other) {
            (Inclusivity::Exclusive, Inclusivity::Inclusive) => Ordering::Greater,
            (Inclusivity::Inclusive, Inclusivity::Exclusive) => Ordering::Less,
            _ => Ordering::Equal,
        }
    }

    /// `true` if this is `Exclusive` and `other` is `Inclusive`.
    #[inline]
    pub fn more_restrictive_than(self, other: Self) -> bool {
        self.compare_restrictiveness(other) == Ordering::Greater
    }
}

/// A range of time on the timeline.
///
/// An `Interval` is empty when it ends before it starts, or when it has zero
/// width and excludes either endpoint. The exact endpoints of an empty
/// interval carry no meaning; [`Interval::empty`] is the canonical one.
///
/// # Examples
///
/// ```
/// use tempoline::{time::micros, Inclusivity, Interval};
///
/// let a = Interval::between_closed_open(micros(0), micros(10));
/// let b = Interval::between(micros(5), micros(20), Inclusivity::Exclusive, Inclusivity::Inclusive);
///
/// let overlap = Interval::intersect(&a, &b);
/// assert_eq!(
///     overlap,
///     Interval::between(micros(5), micros(10), Inclusivity::Exclusive, Inclusivity::Exclusive)
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Interval {
    pub start: Duration,
    pub end: Duration,
    pub start_inclusivity: Inclusivity,
    pub end_inclusivity: Inclusivity,
}

impl Interval {
    /// Creates an interval with explicit endpoint inclusivities.
    pub fn between(
        start: Duration,
        end: Duration,
        start_inclusivity: Inclusivity,
        end_inclusivity: Inclusivity,
    ) -> Self {
        Interval {
            start,
            end,
            start_inclusivity,
            end_inclusivity,
        }
    }

    /// Creates an interval containing both endpoints.
    pub fn closed(start: Duration, end: Duration) -> Self {
        Self::between(start, end, Inclusivity::Inclusive, Inclusivity::Inclusive)
    }

    /// Creates an interval that contains its start and excludes its end.
    pub fn between_closed_open(start: Duration, end: Duration) -> Self {
        Self::between(start, end, Inclusivity::Inclusive, Inclusivity::Exclusive)
    }

    /// A zero-width interval containing only `t`.
    pub fn at(t: Duration) -> Self {
        Self::closed(t, t)
    }

    /// The canonical empty interval.
    pub fn empty() -> Self {
        Self::between(
            Duration::zero(),
            Duration::zero(),
            Inclusivity::Exclusive,
            Inclusivity::Exclusive,
        )
    }

    /// The widest representable interval, used as the unbounded horizon.
    pub fn forever() -> Self {
        Self::closed(time::min_time(), time::max_time())
    }

    #[inline]
    pub fn includes_start(&self) -> bool {
        self.start_inclusivity == Inclusivity::Inclusive
    }

    #[inline]
    pub fn includes_end(&self) -> bool {
        self.end_inclusivity == Inclusivity::Inclusive
    }

    /// Whether this interval contains no instants.
    pub fn is_empty(&self) -> bool {
        match self.end.cmp(&self.start) {
            Ordering::Less => true,
            Ordering::Greater => false,
            Ordering::Equal => !(self.includes_start() && self.includes_end()),
        }
    }

    /// Whether this interval contains exactly one instant.
    pub fn is_point(&self) -> bool {
        self.start == self.end && self.includes_start() && self.includes_end()
    }

    /// Length of the interval; zero when empty.
    pub fn duration(&self) -> Duration {
        if self.is_empty() {
            Duration::zero()
        } else {
            self.end - self.start
        }
    }

    /// Compares the starts of two intervals.
    ///
    /// At equal times an inclusive start comes before an exclusive one.
    /// Assumes neither interval is empty.
    pub fn compare_starts(&self, other: &Self) -> Ordering {
        self.start.cmp(&other.start).then_with(|| {
            match (self.start_inclusivity, other.start_inclusivity) {
                (Inclusivity::Inclusive, Inclusivity::Exclusive) => Ordering::Less,
                (Inclusivity::Exclusive, Inclusivity::Inclusive) => Ordering::Greater,
                _ => Ordering::Equal,
            }
        })
    }

    /// Compares the ends of two intervals.
    ///
    /// At equal times an exclusive end comes before an inclusive one.
    /// Assumes neither interval is empty.
    pub fn compare_ends(&self, other: &Self) -> Ordering {
        self.end.cmp(&other.end).then_with(|| {
            match (self.end_inclusivity, other.end_inclusivity) {
                (Inclusivity::Exclusive, Inclusivity::Inclusive) => Ordering::Less,
                (Inclusivity::Inclusive, Inclusivity::Exclusive) => Ordering::Greater,
                _ => Ordering::Equal,
            }
        })
    }

    /// Compares the end of this interval to the start of `other`.
    ///
    /// - `Less`: this ends strictly before `other` starts (there is a gap)
    /// - `Equal`: this meets `other` exactly, no gap and no overlap
    /// - `Greater`: this ends after `other` starts (they overlap)
    ///
    /// So `[a, b)` vs `[b, c)` is `Equal`, `[a, b]` vs `[b, c]` is `Greater`
    /// and `[a, b)` vs `(b, c]` is `Less`. Assumes neither interval is empty.
    pub fn compare_end_to_start(&self, other: &Self) -> Ordering {
        self.end.cmp(&other.start).then_with(|| {
            if self.end_inclusivity != other.start_inclusivity {
                Ordering::Equal
            } else if self.includes_end() {
                Ordering::Greater
            } else {
                Ordering::Less
            }
        })
    }

    /// Opposite of [`Interval::compare_end_to_start`].
    pub fn compare_start_to_end(&self, other: &Self) -> Ordering {
        other.compare_end_to_start(self).reverse()
    }

    /// Whether this interval precedes `other` and touches it without overlap.
    pub fn meets(&self, other: &Self) -> bool {
        self.end == other.start && self.end_inclusivity != other.start_inclusivity
    }

    /// Whether this interval meets, or is met by, `other`.
    pub fn adjacent_to(&self, other: &Self) -> bool {
        self.meets(other) || other.meets(self)
    }

    /// Whether `t` lies inside this interval.
    pub fn contains(&self, t: Duration) -> bool {
        !Self::intersect(self, &Self::at(t)).is_empty()
    }

    /// Whether every instant of `other` lies inside this interval.
    pub fn contains_interval(&self, other: &Self) -> bool {
        other.is_empty() || Self::intersect(self, other) == *other
    }

    /// The overlap of two intervals.
    ///
    /// Takes the later start and the earlier end; at equal times the more
    /// restrictive inclusivity wins. Returns [`Interval::empty`] when there
    /// is no overlap.
    pub fn intersect(a: &Self, b: &Self) -> Self {
        if a.is_empty() || b.is_empty() {
            return Self::empty();
        }
        let (start, start_inclusivity) = if a.compare_starts(b) == Ordering::Greater {
            (a.start, a.start_inclusivity)
        } else {
            (b.start, b.start_inclusivity)
        };
        let (end, end_inclusivity) = if a.compare_ends(b) == Ordering::Less {
            (a.end, a.end_inclusivity)
        } else {
            (b.end, b.end_inclusivity)
        };
        let result = Self::between(start, end, start_inclusivity, end_inclusivity);
        if result.is_empty() {
            Self::empty()
        } else {
            result
        }
    }

    /// Method form of [`Interval::intersect`].
    #[inline]
    pub fn intersection(&self, other: &Self) -> Self {
        Self::intersect(self, other)
    }

    /// The union of two intervals: one interval if they overlap or meet,
    /// otherwise both (in start order). Empty inputs are dropped.
    pub fn union(&self, other: &Self) -> Vec<Self> {
        if self.is_empty() || other.is_empty() {
            return [*self, *other].into_iter().filter(|i| !i.is_empty()).collect();
        }
        if self.intersection(other).is_empty() && !self.adjacent_to(other) {
            let mut both = vec![*self, *other];
            both.sort_by(|a, b| a.compare_starts(b));
            return both;
        }
        let (start, start_inclusivity) = if self.compare_starts(other) == Ordering::Less {
            (self.start, self.start_inclusivity)
        } else {
            (other.start, other.start_inclusivity)
        };
        let (end, end_inclusivity) = if self.compare_ends(other) == Ordering::Greater {
            (self.end, self.end_inclusivity)
        } else {
            (other.end, other.end_inclusivity)
        };
        vec![Self::between(start, end, start_inclusivity, end_inclusivity)]
    }

    /// The smallest interval containing both.
    pub fn hull(&self, other: &Self) -> Self {
        match self.union(other).as_slice() {
            [] => Self::empty(),
            [single] => *single,
            [first, .., last] => {
                Self::between(first.start, last.end, first.start_inclusivity, last.end_inclusivity)
            }
        }
    }

    /// Removes every instant of `other` from this interval.
    ///
    /// Returns zero, one or two intervals.
    pub fn subtract(&self, other: &Self) -> Vec<Self> {
        if self.is_empty() {
            return Vec::new();
        }
        if self.intersection(other).is_empty() {
            return vec![*self];
        }
        let left = Self::between(
            self.start,
            other.start,
            self.start_inclusivity,
            other.start_inclusivity.opposite(),
        );
        let right = Self::between(
            other.end,
            self.end,
            other.end_inclusivity.opposite(),
            self.end_inclusivity,
        );
        [left, right].into_iter().filter(|i| !i.is_empty()).collect()
    }

    /// Shifts the start and end independently, saturating at the axis limits.
    pub fn shift_by(&self, shift_start: Duration, shift_end: Duration) -> Self {
        Self::between(
            time::saturating_add(self.start, shift_start),
            time::saturating_add(self.end, shift_end),
            self.start_inclusivity,
            self.end_inclusivity,
        )
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "(empty)");
        }
        let open = if self.includes_start() { '[' } else { '(' };
        let close = if self.includes_end() { ']' } else { ')' };
        write!(f, "{open}{}, {}{close}", self.start, self.end)
    }
}

// Durations are serialised as whole microseconds relative to the plan start.
impl Serialize for Interval {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut s = serializer.serialize_struct("Interval", 4)?;
        s.serialize_field("start_us", &time::total_micros(self.start))?;
        s.serialize_field("end_us", &time::total_micros(self.end))?;
        s.serialize_field("start_inclusivity", &self.start_inclusivity)?;
        s.serialize_field("end_inclusivity", &self.end_inclusivity)?;
        s.end()
    }
}

impl<'de> Deserialize<'de> for Interval {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        fn inclusive() -> Inclusivity {
            Inclusivity::Inclusive
        }

        #[derive(Deserialize)]
        struct Raw {
            start_us: i64,
            end_us: i64,
            #[serde(default = "inclusive")]
            start_inclusivity: Inclusivity,
            #[serde(default = "inclusive")]
            end_inclusivity: Inclusivity,
        }

        let raw = Raw::deserialize(deserializer)?;
        Ok(Interval::between(
            time::micros(raw.start_us),
            time::micros(raw.end_us),
            raw.start_inclusivity,
            raw.end_inclusivity,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::micros;
    use test_case::test_case;
    use Inclusivity::{Exclusive, Inclusive};

    fn iv(start: i64, end: i64, si: Inclusivity, ei: Inclusivity) -> Interval {
        Interval::between(micros(start), micros(end), si, ei)
    }

    #[test]
    fn test_emptiness() {
        assert!(!iv(0, 0, Inclusive, Inclusive).is_empty());
        assert!(iv(0, 0, Inclusive, Exclusive).is_empty());
        assert!(iv(0, 0, Exclusive, Inclusive).is_empty());
        assert!(iv(5, 4, Inclusive, Inclusive).is_empty());
        assert!(!iv(0, 1, Exclusive, Exclusive).is_empty());
        assert!(Interval::empty().is_empty());
        assert!(Interval::at(micros(3)).is_point());
    }

    #[test]
    fn test_duration() {
        assert_eq!(iv(2, 9, Exclusive, Exclusive).duration(), micros(7));
        assert_eq!(iv(9, 2, Inclusive, Inclusive).duration(), Duration::zero());
    }

    #[test]
    fn test_compare_starts_inclusive_first() {
        let a = iv(0, 5, Inclusive, Inclusive);
        let b = iv(0, 5, Exclusive, Inclusive);
        assert_eq!(a.compare_starts(&b), Ordering::Less);
        assert_eq!(b.compare_starts(&a), Ordering::Greater);
        assert_eq!(a.compare_starts(&a), Ordering::Equal);
    }

    #[test]
    fn test_compare_ends_exclusive_first() {
        let a = iv(0, 5, Inclusive, Exclusive);
        let b = iv(0, 5, Inclusive, Inclusive);
        assert_eq!(a.compare_ends(&b), Ordering::Less);
        assert_eq!(b.compare_ends(&a), Ordering::Greater);
    }

    #[test]
    fn test_compare_end_to_start() {
        let meets = (iv(0, 5, Inclusive, Exclusive), iv(5, 9, Inclusive, Exclusive));
        let overlaps = (iv(0, 5, Inclusive, Inclusive), iv(5, 9, Inclusive, Inclusive));
        let gap = (iv(0, 5, Inclusive, Exclusive), iv(5, 9, Exclusive, Exclusive));

        assert_eq!(meets.0.compare_end_to_start(&meets.1), Ordering::Equal);
        assert_eq!(overlaps.0.compare_end_to_start(&overlaps.1), Ordering::Greater);
        assert_eq!(gap.0.compare_end_to_start(&gap.1), Ordering::Less);
        assert!(meets.0.meets(&meets.1));
        assert!(meets.1.adjacent_to(&meets.0));
    }

    #[test_case(Inclusive, Inclusive, Ordering::Greater; "both include the instant")]
    #[test_case(Inclusive, Exclusive, Ordering::Equal; "end includes it")]
    #[test_case(Exclusive, Inclusive, Ordering::Equal; "start includes it")]
    #[test_case(Exclusive, Exclusive, Ordering::Less; "neither includes it")]
    fn test_end_to_start_at_shared_instant(end: Inclusivity, start: Inclusivity, expected: Ordering) {
        let earlier = iv(0, 5, Inclusive, end);
        let later = iv(5, 9, start, Inclusive);
        assert_eq!(earlier.compare_end_to_start(&later), expected);
        assert_eq!(later.compare_start_to_end(&earlier), expected.reverse());
        assert_eq!(earlier.meets(&later), expected == Ordering::Equal);
    }

    #[test]
    fn test_intersection_picks_restrictive_bounds() {
        let a = iv(0, 10, Inclusive, Inclusive);
        let b = iv(0, 10, Exclusive, Exclusive);
        assert_eq!(Interval::intersect(&a, &b), b);

        let c = iv(5, 15, Inclusive, Exclusive);
        assert_eq!(a.intersection(&c), iv(5, 10, Inclusive, Inclusive));
    }

    #[test]
    fn test_intersection_touching_edges() {
        let a = iv(0, 3, Inclusive, Exclusive);
        let b = iv(3, 8, Inclusive, Exclusive);
        assert!(a.intersection(&b).is_empty());

        let c = iv(0, 3, Inclusive, Inclusive);
        assert_eq!(c.intersection(&b), Interval::at(micros(3)));
    }

    #[test]
    fn test_intersection_with_forever_is_identity() {
        let a = iv(-4, 17, Exclusive, Inclusive);
        assert_eq!(Interval::intersect(&a, &Interval::forever()), a);
    }

    #[test]
    fn test_contains() {
        let a = iv(0, 10, Exclusive, Inclusive);
        assert!(!a.contains(micros(0)));
        assert!(a.contains(micros(10)));
        assert!(a.contains_interval(&iv(2, 10, Inclusive, Inclusive)));
        assert!(!a.contains_interval(&iv(0, 10, Inclusive, Inclusive)));
    }

    #[test]
    fn test_union_and_hull() {
        let a = iv(0, 5, Inclusive, Exclusive);
        let b = iv(5, 9, Inclusive, Inclusive);
        assert_eq!(a.union(&b), vec![iv(0, 9, Inclusive, Inclusive)]);

        let c = iv(7, 12, Exclusive, Exclusive);
        let d = iv(0, 2, Inclusive, Inclusive);
        assert_eq!(c.union(&d), vec![d, c]);
        assert_eq!(c.hull(&d), iv(0, 12, Inclusive, Exclusive));
    }

    #[test]
    fn test_subtract_splits() {
        let a = iv(0, 10, Inclusive, Inclusive);
        let hole = iv(3, 6, Inclusive, Exclusive);
        assert_eq!(
            a.subtract(&hole),
            vec![iv(0, 3, Inclusive, Exclusive), iv(6, 10, Inclusive, Inclusive)]
        );
        assert_eq!(a.subtract(&Interval::forever()), vec![]);
        assert_eq!(a.subtract(&iv(20, 30, Inclusive, Inclusive)), vec![a]);
    }

    #[test]
    fn test_shift_by_saturates() {
        let a = iv(0, 10, Inclusive, Exclusive);
        assert_eq!(a.shift_by(micros(2), micros(-3)), iv(2, 7, Inclusive, Exclusive));

        let shifted = Interval::forever().shift_by(micros(1), micros(1));
        assert_eq!(shifted.end, time::max_time());
    }

    #[test]
    fn test_inclusivity_helpers() {
        assert_eq!(Inclusive.opposite(), Exclusive);
        assert!(Exclusive.more_restrictive_than(Inclusive));
        assert!(!Inclusive.more_restrictive_than(Exclusive));
        assert_eq!(Inclusive.compare_restrictiveness(Inclusive), Ordering::Equal);
    }

    #[test]
    fn test_display() {
        assert_eq!(Interval::empty().to_string(), "(empty)");
        let a = Interval::between_closed_open(micros(0), micros(1_000_000));
        assert_eq!(a.to_string(), format!("[{}, {})", micros(0), micros(1_000_000)));
    }

    #[test]
    fn test_serde_uses_microsecond_fields() {
        let a = iv(1, 2, Inclusive, Exclusive);
        let json = serde_json::to_string(&a).unwrap();
        assert!(json.contains("\"start_us\":1"));
        assert!(json.contains("\"end_us\":2"));

        let back: Interval = serde_json::from_str(&json).unwrap();
        assert_eq!(back, a);

        let closed: Interval = serde_json::from_str(r#"{"start_us":0,"end_us":5}"#).unwrap();
        assert_eq!(closed, iv(0, 5, Inclusive, Inclusive));
    }
}
