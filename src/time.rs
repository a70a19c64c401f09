// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! The timeline axis.
//!
//! Every instant on a timeline is a [`Duration`]: a signed offset from the
//! (externally known) plan start, with microsecond resolution. Interval
//! arithmetic stays in exact integer microseconds; only rates and values of
//! linear equations go through floating point, expressed as [`Seconds`]
//! quantities.
//!
//! The representable axis is `[-(2^63 - 1) µs, 2^63 - 1 µs]`, see
//! [`min_time`] and [`max_time`]. Shifts saturate at those limits instead of
//! overflowing.

use chrono::{DateTime, Utc};
use qtty::{Days, Second, Seconds};

/// An offset on the timeline, relative to the plan start.
pub type Duration = chrono::Duration;

const MICROS_PER_SECOND: f64 = 1_000_000.0;
const MILLIS_PER_SECOND: f64 = 1_000.0;

/// Earliest instant on the axis.
#[inline]
pub fn min_time() -> Duration {
    Duration::microseconds(-i64::MAX)
}

/// Latest instant on the axis.
#[inline]
pub fn max_time() -> Duration {
    Duration::microseconds(i64::MAX)
}

/// Shorthand for a duration of `us` microseconds.
#[inline]
pub fn micros(us: i64) -> Duration {
    Duration::microseconds(us)
}

/// Clamps a duration into `[min_time(), max_time()]`.
#[inline]
pub fn clamp(d: Duration) -> Duration {
    d.clamp(min_time(), max_time())
}

/// `a + b`, saturating at the ends of the axis.
pub fn saturating_add(a: Duration, b: Duration) -> Duration {
    match a.checked_add(&b) {
        Some(sum) => clamp(sum),
        None if b > Duration::zero() => max_time(),
        None => min_time(),
    }
}

/// `a - b`, saturating at the ends of the axis.
pub fn saturating_sub(a: Duration, b: Duration) -> Duration {
    match a.checked_sub(&b) {
        Some(diff) => clamp(diff),
        None if b > Duration::zero() => min_time(),
        None => max_time(),
    }
}

/// Whole microseconds in `d`, saturating for durations outside `i64` range.
pub fn total_micros(d: Duration) -> i64 {
    match d.num_microseconds() {
        Some(us) => us,
        None if d > Duration::zero() => i64::MAX,
        None => -i64::MAX,
    }
}

/// Converts a duration to a physical [`Seconds`] quantity.
///
/// Durations that overflow `i64` microseconds (only possible for differences
/// between far-apart instants) fall back to millisecond precision.
pub fn seconds(d: Duration) -> Seconds {
    match d.num_microseconds() {
        Some(us) => Seconds::new(us as f64 / MICROS_PER_SECOND),
        None => Seconds::new(d.num_milliseconds() as f64 / MILLIS_PER_SECOND),
    }
}

/// Converts a [`Seconds`] quantity to the nearest whole-microsecond duration,
/// saturating at the ends of the axis. NaN maps to zero.
pub fn from_seconds(s: Seconds) -> Duration {
    let us = (s.value() * MICROS_PER_SECOND).round();
    if us.is_nan() {
        return Duration::zero();
    }
    // `as` saturates, so infinities land on the axis limits.
    clamp(Duration::microseconds(us as i64))
}

/// Converts a duration to a [`Days`] quantity; handy for reporting long spans.
pub fn days(d: Duration) -> Days {
    seconds(d).to::<qtty::Day>()
}

/// Converts a [`Days`] quantity back to a duration.
pub fn from_days(d: Days) -> Duration {
    from_seconds(d.to::<Second>())
}

/// Offset of `instant` relative to `epoch` (typically the plan start).
pub fn offset_from(epoch: DateTime<Utc>, instant: DateTime<Utc>) -> Duration {
    clamp(instant.signed_duration_since(epoch))
}

/// Absolute instant at `offset` after `epoch`.
///
/// Returns `None` if the result falls outside chrono's representable range.
pub fn instant_at(epoch: DateTime<Utc>, offset: Duration) -> Option<DateTime<Utc>> {
    epoch.checked_add_signed(offset)
}

/// Serde adapter storing a [`Duration`] as whole microseconds.
///
/// Use with `#[serde(with = "crate::time::serde_micros")]`.
pub mod serde_micros {
    use super::{micros, total_micros, Duration};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(total_micros(*d))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        i64::deserialize(deserializer).map(micros)
    }
}
