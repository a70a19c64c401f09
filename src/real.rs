// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Piecewise-linear real profiles.
//!
//! [`Real`] wraps a `Profile<LinearEquation>` and adds arithmetic,
//! comparisons, derivatives and integration. Arithmetic between two profiles
//! is defined only where both have a value; the `_scalar` variants treat the
//! scalar as a constant profile.
//!
//! Some operations only make sense for piecewise-constant inputs and fail
//! during evaluation otherwise:
//!
//! | Operation            | Requirement                               |
//! |----------------------|-------------------------------------------|
//! | [`Real::times`]      | at most one operand non-constant at a time |
//! | [`Real::divided_by`] | constant divisor                          |
//! | [`Real::pow`]        | constant exponent, constant base unless the exponent is 0 or 1 |
//! | [`Real::integrate`]  | constant input, no gaps                   |

use crate::profile::ProfileKind;
use crate::time::{self, Duration};
use crate::timeline::{coalesce, truncate};
use crate::{
    BinaryOperation, Inclusivity, Interval, LinearEquation, Profile, Segment, Session, Timeline,
    TimelineError, Windows,
};
use serde_json::Value as JsonValue;
use std::cmp::Ordering;
use std::ops::Deref;

/// A lazy piecewise-linear profile.
#[derive(Debug, Clone)]
pub struct Real(Profile<LinearEquation>);

impl From<Profile<LinearEquation>> for Real {
    fn from(profile: Profile<LinearEquation>) -> Self {
        Real(profile.with_kind(ProfileKind::Real))
    }
}

impl From<Real> for Profile<LinearEquation> {
    fn from(real: Real) -> Self {
        real.0
    }
}

impl Deref for Real {
    type Target = Profile<LinearEquation>;

    fn deref(&self) -> &Profile<LinearEquation> {
        &self.0
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Construction
// ═══════════════════════════════════════════════════════════════════════════

impl Real {
    pub fn new(segments: Timeline<Segment<LinearEquation>>) -> Self {
        Real(Profile::new(segments, ProfileKind::Real))
    }

    /// A constant everywhere.
    pub fn value(value: f64) -> Self {
        Self::linear(LinearEquation::constant(value))
    }

    /// A constant over `interval`, a gap elsewhere.
    pub fn value_within(value: f64, interval: Interval) -> Self {
        Profile::value_within(LinearEquation::constant(value), interval).into()
    }

    /// A single line everywhere.
    pub fn linear(equation: LinearEquation) -> Self {
        Profile::value(equation).into()
    }

    pub fn from_segments(segments: Vec<Segment<LinearEquation>>) -> Self {
        Profile::from_segments(segments).into()
    }

    /// A real profile read from an external resource.
    ///
    /// Each value is either a plain number (a constant) or an object
    /// `{"initial": number, "rate": number}` describing a line that starts at
    /// `initial` at the beginning of its segment.
    pub fn resource(session: &Session, name: &str) -> Self {
        let segments = session.decoded_resource(name, decode_linear);
        Real::new(Timeline::new(move |bounds| Ok(coalesce(segments.evaluate(bounds)?))))
    }

    pub fn into_profile(self) -> Profile<LinearEquation> {
        self.0
    }

    pub fn as_profile(&self) -> &Profile<LinearEquation> {
        &self.0
    }
}

fn decode_linear(segment: &Segment<JsonValue>) -> Result<LinearEquation, String> {
    if let Some(constant) = segment.value.as_f64() {
        return Ok(LinearEquation::constant(constant));
    }
    let object = segment
        .value
        .as_object()
        .ok_or_else(|| format!("value was not an object or a number: {}", segment.value))?;
    let field = |name: &str| -> Result<f64, String> {
        object
            .get(name)
            .ok_or_else(|| format!("`{name}` not found"))?
            .as_f64()
            .ok_or_else(|| format!("`{name}` was not a number"))
    };
    Ok(LinearEquation::new(
        segment.interval.start,
        field("initial")?,
        field("rate")?,
    ))
}

// ═══════════════════════════════════════════════════════════════════════════
// Arithmetic
// ═══════════════════════════════════════════════════════════════════════════

impl Real {
    fn combine<F>(&self, other: &Real, f: F) -> Real
    where
        F: Fn(&LinearEquation, &LinearEquation, Interval) -> crate::Result<LinearEquation>
            + Send
            + Sync
            + 'static,
    {
        self.0
            .map2_values(&other.0, BinaryOperation::try_combine_or_none(f), ProfileKind::Real)
            .into()
    }

    pub fn negate(&self) -> Real {
        self.0.map_values(|v: &LinearEquation, _| v.negate()).into()
    }

    /// Absolute value; segments that cross zero are split at the crossing.
    pub fn abs(&self) -> Real {
        self.0
            .flat_map(|s: &Segment<LinearEquation>| s.value.abs(s.interval), ProfileKind::Real)
            .into()
    }

    pub fn plus(&self, other: &Real) -> Real {
        self.combine(other, |l, r, _| Ok(l.plus(r)))
    }

    pub fn minus(&self, other: &Real) -> Real {
        self.combine(other, |l, r, _| Ok(l.minus(r)))
    }

    /// Product of two profiles. Fails where both operands vary at once.
    pub fn times(&self, other: &Real) -> Real {
        self.combine(other, |l, r, interval| {
            if !l.is_constant() && !r.is_constant() {
                return Err(TimelineError::NonConstantProduct { at: interval.start });
            }
            let r = r.shift_initial_time(l.initial_time);
            Ok(LinearEquation::new(
                l.initial_time,
                l.initial_value * r.initial_value,
                l.rate * r.initial_value + r.rate * l.initial_value,
            ))
        })
    }

    /// Quotient of two profiles. Fails where the divisor varies.
    pub fn divided_by(&self, other: &Real) -> Real {
        self.combine(other, |l, r, interval| {
            if !r.is_constant() {
                return Err(TimelineError::NonConstantDivisor { at: interval.start });
            }
            Ok(l.divided_by(r.initial_value))
        })
    }

    /// `self` raised to the power of `exponent`.
    ///
    /// A gap in either operand stays a gap, even where the exponent is zero.
    pub fn pow(&self, exponent: &Real) -> Real {
        self.combine(exponent, |base, exponent, interval| {
            let at = interval.start;
            if !exponent.is_constant() {
                return Err(TimelineError::NonConstantExponent { at });
            }
            let e = exponent.initial_value;
            if e == 0.0 {
                return Ok(LinearEquation::constant(1.0));
            }
            if e == 1.0 {
                return Ok(*base);
            }
            if !base.is_constant() {
                return Err(TimelineError::NonConstantExponent { at });
            }
            let value = base.initial_value.powf(e);
            if value.is_nan() {
                return Err(TimelineError::ExponentNaN {
                    base: base.initial_value,
                    exponent: e,
                    at,
                });
            }
            Ok(LinearEquation::constant(value))
        })
    }

    pub fn sqrt(&self) -> Real {
        self.root(2.0)
    }

    /// The `n`th root.
    pub fn root(&self, n: f64) -> Real {
        self.pow_scalar(1.0 / n)
    }

    pub fn plus_scalar(&self, value: f64) -> Real {
        self.plus(&Real::value(value))
    }

    pub fn minus_scalar(&self, value: f64) -> Real {
        self.minus(&Real::value(value))
    }

    pub fn times_scalar(&self, factor: f64) -> Real {
        self.0.map_values(move |v: &LinearEquation, _| v.times(factor)).into()
    }

    pub fn divided_by_scalar(&self, divisor: f64) -> Real {
        self.0
            .map_values(move |v: &LinearEquation, _| v.divided_by(divisor))
            .into()
    }

    pub fn pow_scalar(&self, exponent: f64) -> Real {
        self.pow(&Real::value(exponent))
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Calculus
// ═══════════════════════════════════════════════════════════════════════════

impl Real {
    /// Derivative, per second.
    pub fn rate(&self) -> Real {
        self.0
            .map_values(|v: &LinearEquation, _| LinearEquation::constant(v.rate))
            .into()
    }

    /// Derivative, per `unit` of time.
    pub fn rate_per(&self, unit: Duration) -> Real {
        let unit_seconds = time::seconds(unit).value();
        self.0
            .map_values(move |v: &LinearEquation, _| LinearEquation::constant(v.rate * unit_seconds))
            .into()
    }

    /// Integral from the start of the evaluation bounds, treating each value
    /// as a rate per `unit` of time.
    ///
    /// The input must be piecewise constant and cover the bounds from their
    /// start without gaps.
    pub fn integrate(&self, unit: Duration) -> Real {
        let source = self.0.timeline().clone();
        let per_second = 1.0 / time::seconds(unit).value();
        Real::new(Timeline::new(move |bounds: Interval| {
            let mut result = Vec::new();
            let mut previous: Option<Interval> = None;
            let mut accumulated = 0.0;
            for segment in source.evaluate(bounds)? {
                let interval = segment.interval;
                let gap = match previous {
                    None if interval.compare_starts(&bounds) != Ordering::Equal => {
                        Some(Interval::between(
                            bounds.start,
                            interval.start,
                            bounds.start_inclusivity,
                            interval.start_inclusivity.opposite(),
                        ))
                    }
                    Some(prev) if prev.compare_end_to_start(&interval) != Ordering::Equal => {
                        Some(Interval::between(
                            prev.end,
                            interval.start,
                            prev.end_inclusivity.opposite(),
                            interval.start_inclusivity.opposite(),
                        ))
                    }
                    _ => None,
                };
                if let Some(gap) = gap {
                    return Err(TimelineError::IntegrateGap { gap });
                }
                if !segment.value.is_constant() {
                    return Err(TimelineError::IntegrateNonConstant { interval });
                }
                let rate = segment.value.initial_value * per_second;
                result.push(Segment::new(
                    LinearEquation::new(interval.start, accumulated, rate),
                    interval,
                ));
                accumulated += rate * time::seconds(interval.duration()).value();
                previous = Some(interval);
            }
            Ok(result)
        }))
    }

    /// Moves the whole profile by `shift`, lines included.
    pub fn shift_by(&self, shift: Duration) -> Real {
        let back = time::saturating_sub(Duration::zero(), shift);
        self.0
            .map(
                move |s: Segment<LinearEquation>| {
                    let eq = s.value;
                    Segment::new(
                        LinearEquation::new(
                            time::saturating_add(eq.initial_time, shift),
                            eq.initial_value,
                            eq.rate,
                        ),
                        s.interval.shift_by(shift, shift),
                    )
                },
                move |bounds| bounds.shift_by(back, back),
                ProfileKind::Real,
            )
            .into()
    }

    /// `self(t + range) - self(t)`.
    ///
    /// Both sides come from one evaluation over the bounds widened by
    /// `range`, so a bounds-relative input such as [`Real::integrate`] keeps
    /// a single origin.
    pub fn shifted_difference(&self, range: Duration) -> Real {
        let source = self.0.timeline().clone();
        Real::new(Timeline::new(move |bounds: Interval| {
            let reach = bounds.hull(&bounds.shift_by(range, range));
            let fixed = Real::from_segments(source.evaluate(reach)?);
            fixed
                .shift_by(time::saturating_sub(Duration::zero(), range))
                .minus(&fixed)
                .collect(bounds)
        }))
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Comparisons and edges
// ═══════════════════════════════════════════════════════════════════════════

impl Real {
    /// Pointwise comparison; exact at the instant where the lines cross.
    pub fn compare<F>(&self, other: &Real, cmp: F) -> Windows
    where
        F: Fn(f64, f64) -> bool + Send + Sync + 'static,
    {
        self.0
            .flat_map2_values(
                &other.0,
                BinaryOperation::combine_or_none(move |l: &LinearEquation, r: &LinearEquation, i| {
                    l.compare(r, &cmp, i)
                }),
                ProfileKind::Windows,
            )
            .into()
    }

    pub fn equal_to(&self, other: &Real) -> Windows {
        self.compare(other, |l, r| l == r)
    }

    pub fn not_equal_to(&self, other: &Real) -> Windows {
        self.compare(other, |l, r| l != r)
    }

    pub fn less_than(&self, other: &Real) -> Windows {
        self.compare(other, |l, r| l < r)
    }

    pub fn less_than_or_equal(&self, other: &Real) -> Windows {
        self.compare(other, |l, r| l <= r)
    }

    pub fn greater_than(&self, other: &Real) -> Windows {
        self.compare(other, |l, r| l > r)
    }

    pub fn greater_than_or_equal(&self, other: &Real) -> Windows {
        self.compare(other, |l, r| l >= r)
    }

    /// True where the profile is changing: inside non-constant segments and
    /// at discontinuities between touching segments.
    pub fn changes(&self) -> Windows {
        let source = self.0.timeline().clone();
        Windows::new(Timeline::new(move |bounds: Interval| {
            let segments = source.evaluate(bounds)?;
            let mut result = Vec::with_capacity(segments.len() * 3);
            for (index, current) in segments.iter().enumerate() {
                let interval = current.interval;
                let eq = current.value;
                let previous = index
                    .checked_sub(1)
                    .and_then(|i| segments.get(i))
                    .filter(|p| p.interval.compare_end_to_start(&interval) == Ordering::Equal);
                let touches_next = segments
                    .get(index + 1)
                    .is_some_and(|n| interval.compare_end_to_start(&n.interval) == Ordering::Equal);

                let at_start = match previous {
                    Some(previous) => {
                        let before = previous.value;
                        Some(
                            before.value_at(interval.start) != eq.value_at(interval.start)
                                || !before.is_constant()
                                || !eq.is_constant(),
                        )
                    }
                    None if interval.compare_starts(&bounds) == Ordering::Equal => {
                        Some(!eq.is_constant())
                    }
                    None => None,
                };
                if let Some(changing) = at_start {
                    result.push(Segment::new(changing, Interval::at(interval.start)));
                }
                result.push(Segment::new(
                    !eq.is_constant(),
                    Interval::between(
                        interval.start,
                        interval.end,
                        Inclusivity::Exclusive,
                        Inclusivity::Exclusive,
                    ),
                ));
                if !touches_next && interval.includes_end() {
                    result.push(Segment::new(!eq.is_constant(), Interval::at(interval.end)));
                }
            }
            Ok(coalesce(truncate(result, &bounds)))
        }))
    }

    /// True at instants where the value jumps from `from` to `to`.
    pub fn transitions(&self, from: f64, to: f64) -> Windows {
        self.0.edges(BinaryOperation::cases(
            move |l: &LinearEquation, i: Interval| {
                if l.value_at(i.start) == from {
                    None
                } else {
                    Some(false)
                }
            },
            move |r: &LinearEquation, i: Interval| {
                if r.value_at(i.start) == to {
                    None
                } else {
                    Some(false)
                }
            },
            move |l: &LinearEquation, r: &LinearEquation, i: Interval| {
                Some(l.value_at(i.start) == from && r.value_at(i.start) == to)
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::micros;
    use crate::Inclusivity::{Exclusive, Inclusive};
    use crate::{InMemoryProvider, Session};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const SECOND: i64 = 1_000_000;

    fn secs(s: i64) -> Duration {
        micros(s * SECOND)
    }

    fn closed(a: i64, b: i64) -> Interval {
        Interval::closed(secs(a), secs(b))
    }

    fn ramp() -> Real {
        Real::linear(LinearEquation::new(Duration::zero(), 0.0, 1.0))
    }

    fn values_at(real: &Real, t: Duration) -> Option<f64> {
        real.value_at(t).unwrap().map(|eq| eq.value_at(t))
    }

    #[test]
    fn test_arithmetic_between_profiles() {
        let a = Real::value(4.0);
        let sum = a.plus(&ramp());
        assert_eq!(values_at(&sum, secs(3)), Some(7.0));
        assert_eq!(values_at(&a.minus(&ramp()), secs(3)), Some(1.0));
        assert_eq!(values_at(&ramp().times(&a), secs(3)), Some(12.0));
        assert_eq!(values_at(&ramp().divided_by(&a), secs(2)), Some(0.5));
        assert_eq!(values_at(&ramp().negate(), secs(2)), Some(-2.0));
        assert_eq!(values_at(&ramp().times_scalar(3.0), secs(2)), Some(6.0));
    }

    #[test]
    fn test_arithmetic_is_gap_where_either_missing() {
        let partial = Real::value_within(1.0, closed(0, 5));
        let sum = partial.plus(&Real::value(1.0));
        assert_eq!(sum.collect(closed(0, 10)).unwrap().len(), 1);
        assert_eq!(values_at(&sum, secs(7)), None);
    }

    #[test]
    fn test_product_of_two_ramps_fails() {
        let product = ramp().times(&ramp());
        assert_eq!(
            product.collect(closed(0, 1)),
            Err(TimelineError::NonConstantProduct { at: secs(0) })
        );
    }

    #[test]
    fn test_division_by_ramp_fails() {
        assert!(matches!(
            Real::value(1.0).divided_by(&ramp()).collect(closed(0, 1)),
            Err(TimelineError::NonConstantDivisor { .. })
        ));
    }

    #[test]
    fn test_pow_and_roots() {
        let nine = Real::value(9.0);
        assert_eq!(values_at(&nine.sqrt(), secs(0)), Some(3.0));
        assert_eq!(values_at(&nine.pow_scalar(2.0), secs(0)), Some(81.0));
        // exponent 1 passes a ramp through, exponent 0 flattens it
        assert_eq!(values_at(&ramp().pow_scalar(1.0), secs(5)), Some(5.0));
        assert_eq!(values_at(&ramp().pow_scalar(0.0), secs(5)), Some(1.0));
        assert!(matches!(
            ramp().pow_scalar(2.0).collect(closed(0, 1)),
            Err(TimelineError::NonConstantExponent { .. })
        ));
        assert!(matches!(
            Real::value(-1.0).sqrt().collect(closed(0, 1)),
            Err(TimelineError::ExponentNaN { .. })
        ));
    }

    #[test]
    fn test_pow_zero_keeps_base_gaps() {
        let partial = Real::value_within(2.0, closed(0, 2));
        assert_eq!(
            partial.pow_scalar(0.0).collect(closed(0, 4)).unwrap(),
            vec![Segment::new(LinearEquation::constant(1.0), closed(0, 2))]
        );
        assert_eq!(values_at(&partial.pow_scalar(0.0), secs(3)), None);
    }

    #[test]
    fn test_shifted_difference_of_integral_ignores_bounds_origin() {
        let rates = Real::value(1.0);
        let window = rates.integrate(Duration::seconds(1)).shifted_difference(secs(2));
        assert_eq!(values_at(&window, secs(5)), Some(2.0));
        let segments = window.collect(closed(3, 6)).unwrap();
        assert!(segments.iter().all(|s| (s.value.value_at(s.interval.start) - 2.0).abs() < 1e-9));
    }

    #[test]
    fn test_abs_splits_at_zero() {
        let shifted = ramp().minus_scalar(2.0).abs();
        let segments = shifted.collect(closed(0, 4)).unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(values_at(&shifted, secs(0)), Some(2.0));
        assert_eq!(values_at(&shifted, secs(4)), Some(2.0));
    }

    #[test]
    fn test_rates() {
        let r = ramp().times_scalar(2.0);
        assert_eq!(values_at(&r.rate(), secs(1)), Some(2.0));
        assert_eq!(values_at(&r.rate_per(Duration::minutes(1)), secs(1)), Some(120.0));
    }

    #[test]
    fn test_integrate_piecewise_constant() {
        let rates = Real::from_segments(vec![
            Segment::new(LinearEquation::constant(1.0), Interval::between_closed_open(secs(0), secs(2))),
            Segment::new(LinearEquation::constant(3.0), closed(2, 4)),
        ]);
        let integral = rates.integrate(Duration::seconds(1)).collect(closed(0, 4)).unwrap();
        assert_eq!(
            integral,
            vec![
                Segment::new(LinearEquation::new(secs(0), 0.0, 1.0), Interval::between_closed_open(secs(0), secs(2))),
                Segment::new(LinearEquation::new(secs(2), 2.0, 3.0), closed(2, 4)),
            ]
        );
        assert_eq!(integral[1].value.value_at(secs(4)), 8.0);

        // per-minute rates accumulate sixty times slower
        let per_minute = rates.integrate(Duration::minutes(1)).collect(closed(0, 4)).unwrap();
        assert!((per_minute[1].value.value_at(secs(4)) - 8.0 / 60.0).abs() < 1e-12);
    }

    #[test]
    fn test_integrate_rejects_gaps_and_ramps() {
        let gappy = Real::value_within(1.0, closed(1, 4));
        assert_eq!(
            gappy.integrate(Duration::seconds(1)).collect(closed(0, 4)),
            Err(TimelineError::IntegrateGap {
                gap: Interval::between(secs(0), secs(1), Inclusive, Exclusive)
            })
        );
        assert!(matches!(
            ramp().integrate(Duration::seconds(1)).collect(closed(0, 4)),
            Err(TimelineError::IntegrateNonConstant { .. })
        ));
    }

    #[test]
    fn test_shift_moves_lines() {
        let shifted = ramp().shift_by(secs(2));
        assert_eq!(values_at(&shifted, secs(2)), Some(0.0));
        assert_eq!(values_at(&ramp().shifted_difference(secs(3)), secs(10)), Some(3.0));
    }

    #[test]
    fn test_compare_against_constant() {
        let bounds = closed(0, 10);
        let above = Real::value(4.0).greater_than(&ramp());
        assert_eq!(
            above.collect(bounds).unwrap(),
            vec![
                Segment::new(true, Interval::between(secs(0), secs(4), Inclusive, Exclusive)),
                Segment::new(false, Interval::closed(secs(4), secs(10))),
            ]
        );
        let equal = Real::value(4.0).equal_to(&ramp());
        assert_eq!(equal.value_at(secs(4)).unwrap(), Some(true));
        assert_eq!(equal.value_at(secs(5)).unwrap(), Some(false));
        assert_eq!(
            Real::value(4.0).less_than_or_equal(&ramp()).value_at(secs(4)).unwrap(),
            Some(true)
        );
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
    fn test_changes_marks_ramps_and_jumps() {
        let bounds = closed(0, 6);
        let profile = Real::from_segments(vec![
            Segment::new(LinearEquation::constant(1.0), Interval::between_closed_open(secs(0), secs(2))),
            Segment::new(LinearEquation::constant(5.0), Interval::between_closed_open(secs(2), secs(4))),
            Segment::new(LinearEquation::new(secs(4), 5.0, 1.0), closed(4, 6)),
        ]);
        let changes = profile.changes();
        assert_eq!(truth_at(&changes, bounds, secs(0)), Some(false));
        assert_eq!(truth_at(&changes, bounds, secs(1)), Some(false));
        assert_eq!(truth_at(&changes, bounds, secs(2)), Some(true));
        assert_eq!(truth_at(&changes, bounds, secs(3)), Some(false));
        assert_eq!(truth_at(&changes, bounds, secs(5)), Some(true));
        assert_eq!(truth_at(&changes, bounds, secs(6)), Some(true));
    }

    #[test]
    fn test_transitions_between_values() {
        let bounds = closed(0, 4);
        let profile = Real::from_segments(vec![
            Segment::new(LinearEquation::constant(1.0), Interval::between_closed_open(secs(0), secs(2))),
            Segment::new(LinearEquation::constant(5.0), closed(2, 4)),
        ]);
        let up = profile.transitions(1.0, 5.0);
        assert_eq!(truth_at(&up, bounds, secs(2)), Some(true));
        assert_eq!(truth_at(&up, bounds, secs(1)), Some(false));
        let down = profile.transitions(5.0, 1.0);
        assert_eq!(truth_at(&down, bounds, secs(2)), Some(false));
    }

    #[test]
    fn test_resource_accepts_numbers_and_lines() {
        let provider = InMemoryProvider::new().with_resource(
            "battery",
            vec![
                Segment::new(json!(10.0), Interval::between_closed_open(secs(0), secs(5))),
                Segment::new(json!({"initial": 10.0, "rate": -1.0}), closed(5, 10)),
            ],
        );
        let session = Session::new(provider);
        let battery = Real::resource(&session, "battery");

        assert_eq!(values_at(&battery, secs(2)), Some(10.0));
        // anchored at the start of the stored segment, not of the query
        assert_eq!(values_at(&battery, secs(8)), Some(7.0));

        let broken = InMemoryProvider::new()
            .with_resource("bad", vec![Segment::new(json!("high"), closed(0, 1))]);
        let result = Real::resource(&Session::new(broken), "bad").collect(closed(0, 1));
        assert!(matches!(result, Err(TimelineError::ResourceShape { .. })));
    }
}
