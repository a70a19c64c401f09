// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Lazy, composable timelines of time-varying values.
//!
//! Time is a signed microsecond offset from a plan start (see [`time`]). A
//! timeline is a recipe: nothing is computed until it is evaluated on a
//! bounding [`Interval`], and only the part inside the bounds is produced.
//!
//! # Core types
//!
//! - [`Interval`]: a contiguous range of time with inclusive or exclusive ends.
//! - [`Segment<V>`]: a value held over an interval.
//! - [`Timeline<V>`]: a lazy, bounds-driven producer of interval-like items.
//! - [`Profile<V>`]: sorted, non-overlapping, coalesced segments; gaps mean "no value".
//! - [`Windows`]: a boolean profile with set-like operations.
//! - [`Real`]: a piecewise-linear real profile built from [`LinearEquation`]s.
//! - [`Spans<S>`]: possibly overlapping intervals or segments, with reductions back to profiles.
//! - [`Session`]: a resource source plus the plan start used for wall-clock conversion.
//!
//! # Profile kinds
//!
//! Every [`Profile`] carries a [`ProfileKind`] tag so generic pipelines can
//! recover the specialised wrapper with [`Profile::specialize`]:
//!
//! | Kind | Value type | Wrapper |
//! |------|------------|---------|
//! | [`ProfileKind::Windows`] | `bool` | [`Windows`] |
//! | [`ProfileKind::Real`] | [`LinearEquation`] | [`Real`] |
//! | [`ProfileKind::Discrete`] | any [`ProfileValue`] | plain [`Profile`] |
//! | [`ProfileKind::Other`] | any [`ProfileValue`] | plain [`Profile`] |
//!
//! # Errors
//!
//! Constructing a pipeline never fails (with the exception of
//! [`Spans::split`] with a zero count). Domain errors such as a non-constant
//! divisor or an ambiguous [`Profile::value_at`] surface as
//! [`TimelineError`] when the pipeline is evaluated.

mod binary_operation;
mod error;
mod interval;
mod linear_equation;
pub mod profile;
mod real;
mod segment;
mod session;
mod spans;
pub mod time;
pub mod timeline;
mod windows;

// ── Re-exports ────────────────────────────────────────────────────────────

pub use binary_operation::BinaryOperation;
pub use error::{Result, TimelineError};
pub use interval::{Inclusivity, Interval};
pub use linear_equation::LinearEquation;
pub use profile::{Profile, ProfileKind, ProfileValue, Specialized};
pub use real::Real;
pub use segment::{IntervalLike, Segment};
pub use session::{InMemoryProvider, ResourceProvider, Session, SessionConfig};
pub use spans::{Connection, Spans};
pub use time::Duration;
pub use timeline::Timeline;
pub use windows::Windows;
