// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Linear functions of time, the value type of real profiles.
//!
//! A [`LinearEquation`] is anchored at an instant: `value(t) = initial_value
//! + rate · (t - initial_time)`, with `rate` in units per second. Two
//! equations describing the same line from different anchors compare equal.

use crate::time::{self, Duration};
use crate::{Inclusivity, Interval, Segment};
use qtty::Seconds;
use serde::{Deserialize, Serialize};
use std::fmt;

/// `value(t) = initial_value + rate · (t - initial_time)`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LinearEquation {
    #[serde(rename = "initial_time_us", with = "crate::time::serde_micros")]
    pub initial_time: Duration,
    pub initial_value: f64,
    /// Change per second.
    pub rate: f64,
}

impl PartialEq for LinearEquation {
    /// Two equations are equal when they describe the same line.
    fn eq(&self, other: &Self) -> bool {
        self.rate == other.rate && self.initial_value == other.value_at(self.initial_time)
    }
}

impl LinearEquation {
    pub fn new(initial_time: Duration, initial_value: f64, rate: f64) -> Self {
        LinearEquation {
            initial_time,
            initial_value,
            rate,
        }
    }

    /// A horizontal line at `value`.
    pub fn constant(value: f64) -> Self {
        Self::new(Duration::zero(), value, 0.0)
    }

    /// Value of the line at `t`.
    pub fn value_at(&self, t: Duration) -> f64 {
        let elapsed: Seconds = time::seconds(t - self.initial_time);
        self.initial_value + self.rate * elapsed.value()
    }

    /// The same line anchored at `t`.
    pub fn shift_initial_time(&self, t: Duration) -> Self {
        Self::new(t, self.value_at(t), self.rate)
    }

    pub fn is_constant(&self) -> bool {
        self.rate == 0.0
    }

    pub fn negate(&self) -> Self {
        Self::new(self.initial_time, -self.initial_value, -self.rate)
    }

    /// Scales the line by `factor`.
    pub fn times(&self, factor: f64) -> Self {
        Self::new(self.initial_time, self.initial_value * factor, self.rate * factor)
    }

    pub fn divided_by(&self, divisor: f64) -> Self {
        Self::new(self.initial_time, self.initial_value / divisor, self.rate / divisor)
    }

    /// Pointwise sum, anchored at this equation's initial time.
    pub fn plus(&self, other: &Self) -> Self {
        let other = other.shift_initial_time(self.initial_time);
        Self::new(
            self.initial_time,
            self.initial_value + other.initial_value,
            self.rate + other.rate,
        )
    }

    pub fn minus(&self, other: &Self) -> Self {
        self.plus(&other.negate())
    }

    /// The instant where the two lines cross, rounded to the nearest
    /// microsecond.
    ///
    /// `None` for parallel lines, or when the crossing falls off the axis.
    pub fn intersection_point_with(&self, other: &Self) -> Option<Duration> {
        if self.rate == other.rate {
            return None;
        }
        let offset =
            (other.value_at(self.initial_time) - self.initial_value) / (self.rate - other.rate);
        if !offset.is_finite() {
            return None;
        }
        let offset = time::from_seconds(Seconds::new(offset));
        self.initial_time
            .checked_add(&offset)
            .filter(|t| (time::min_time()..=time::max_time()).contains(t))
    }

    /// Compares this line against `other` over `bounds`.
    ///
    /// Produces up to three boolean segments (before, at and after the
    /// crossing), each clipped to `bounds`; a single one when the lines are
    /// parallel or cross outside `bounds`.
    pub fn compare<F>(&self, other: &Self, cmp: F, bounds: Interval) -> Vec<Segment<bool>>
    where
        F: Fn(f64, f64) -> bool,
    {
        let holds_at = |t: Duration| cmp(self.value_at(t), other.value_at(t));
        let Some(crossing) = self.intersection_point_with(other) else {
            return vec![Segment::new(
                cmp(self.initial_value, other.value_at(self.initial_time)),
                bounds,
            )];
        };
        let pieces = [
            (
                Interval::between(
                    bounds.start,
                    crossing,
                    bounds.start_inclusivity,
                    Inclusivity::Exclusive,
                ),
                bounds.start,
            ),
            (Interval::at(crossing), crossing),
            (
                Interval::between(
                    crossing,
                    bounds.end,
                    Inclusivity::Exclusive,
                    bounds.end_inclusivity,
                ),
                bounds.end,
            ),
        ];
        pieces
            .into_iter()
            .filter_map(|(piece, sample)| {
                let piece = Interval::intersect(&piece, &bounds);
                (!piece.is_empty()).then(|| Segment::new(holds_at(sample), piece))
            })
            .collect()
    }

    /// `|self|` over `bounds`, split at the zero crossing if there is one.
    pub fn abs(&self, bounds: Interval) -> Vec<Segment<LinearEquation>> {
        let root = self
            .intersection_point_with(&Self::constant(0.0))
            .filter(|root| bounds.contains(*root));
        match root {
            Some(root) => {
                let slope = self.rate.abs();
                [
                    Segment::new(
                        Self::new(root, 0.0, -slope),
                        Interval::between(
                            bounds.start,
                            root,
                            bounds.start_inclusivity,
                            Inclusivity::Exclusive,
                        ),
                    ),
                    Segment::new(
                        Self::new(root, 0.0, slope),
                        Interval::between(
                            root,
                            bounds.end,
                            Inclusivity::Inclusive,
                            bounds.end_inclusivity,
                        ),
                    ),
                ]
                .into_iter()
                .filter(|s| !s.interval.is_empty())
                .collect()
            }
            None => {
                let start_value = self.value_at(bounds.start);
                let positive = start_value > 0.0 || (start_value == 0.0 && self.rate >= 0.0);
                let line = if positive { *self } else { self.negate() };
                vec![Segment::new(line, bounds)]
            }
        }
    }
}

impl fmt::Display for LinearEquation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} + {}/s · (t - {})",
            self.initial_value, self.rate, self.initial_time
        )
    }
}
