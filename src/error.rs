// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Error type shared by every timeline evaluation.
//!
//! Evaluation is lazy, so most of these errors surface from
//! [`Profile::collect`](crate::Profile::collect) even when the offending
//! operation was composed much earlier.

use crate::{Duration, Interval};
use thiserror::Error;

/// Errors raised while building or evaluating timelines.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TimelineError {
    /// `split` was asked for zero sub-spans.
    #[error("cannot split a span into zero sub-spans")]
    InvalidSplitCount,

    /// `split` was called on a span that contains a single instant.
    #[error("cannot split an instantaneous span {interval} into sub-spans")]
    InstantaneousSplit { interval: Interval },

    /// The requested sub-spans would be shorter than one microsecond.
    #[error("cannot split a span only {micros} microseconds long into {pieces} pieces")]
    SplitTooFine { micros: i64, pieces: usize },

    /// Strict `split` was asked to split a span that touches the query bounds.
    #[error("cannot split span {interval}: it touches the evaluation bounds {bounds} and may be truncated")]
    SplitAtBounds { interval: Interval, bounds: Interval },

    /// Both operands of a product vary with time over the same interval.
    #[error("cannot multiply two non-constant linear equations (at time {at})")]
    NonConstantProduct { at: Duration },

    /// The divisor of a real-profile division varies with time.
    #[error("cannot divide by a non-piecewise-constant linear equation (at time {at})")]
    NonConstantDivisor { at: Duration },

    /// Exponentiation needs a piecewise-constant base and exponent.
    #[error("cannot exponentiate non-piecewise-constant profiles (at time {at})")]
    NonConstantExponent { at: Duration },

    /// Exponentiation produced NaN.
    #[error("exponentiation {base} ^ {exponent} is not a number (at time {at})")]
    ExponentNaN { base: f64, exponent: f64, at: Duration },

    /// Integration requires gap-free input starting at the bounds.
    #[error("cannot integrate a real profile with gaps; gap: {gap}")]
    IntegrateGap { gap: Interval },

    /// Integration only supports piecewise-constant input.
    #[error("cannot integrate a real profile that is not piecewise constant (segment at {interval})")]
    IntegrateNonConstant { interval: Interval },

    /// More than one segment was found at a single instant.
    #[error("multiple segments exist at time {time}")]
    AmbiguousValue { time: Duration },

    /// The provider has no resource with that name.
    #[error("unknown resource `{0}`")]
    UnknownResource(String),

    /// The provider failed while fetching a resource.
    #[error("failed to fetch resource `{name}`: {message}")]
    ResourceFetch { name: String, message: String },

    /// A resource value could not be decoded into the requested type.
    #[error("resource `{name}` has an unexpected shape: {reason}")]
    ResourceShape { name: String, reason: String },

    /// An absolute instant was converted without a configured plan start.
    #[error("session has no plan start configured")]
    MissingPlanStart,

    /// Session configuration could not be parsed.
    #[error("invalid session configuration: {0}")]
    Config(String),
}

/// Result alias for timeline operations.
pub type Result<T> = std::result::Result<T, TimelineError>;

impl From<serde_json::Error> for TimelineError {
    fn from(err: serde_json::Error) -> Self {
        TimelineError::Config(err.to_string())
    }
}
