// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

use proptest::prelude::*;
use tempoline::time::micros;
use tempoline::timeline::coalesce;
use tempoline::{Inclusivity, Interval, LinearEquation, Segment, Windows};

const RANGE: i64 = 1_000;

fn inclusivity() -> impl Strategy<Value = Inclusivity> {
    prop_oneof![Just(Inclusivity::Inclusive), Just(Inclusivity::Exclusive)]
}

fn interval() -> impl Strategy<Value = Interval> {
    (-RANGE..RANGE, 0..RANGE, inclusivity(), inclusivity()).prop_map(|(start, len, si, ei)| {
        Interval::between(micros(start), micros(start + len), si, ei)
    })
}

/// Start-sorted, non-overlapping segments that may touch or leave gaps.
fn segments<V: Clone + std::fmt::Debug>(
    values: impl Strategy<Value = V>,
) -> impl Strategy<Value = Vec<Segment<V>>> {
    prop::collection::vec((values, 1..50_i64, 0..3_i64, inclusivity()), 0..12).prop_map(|raw| {
        let mut cursor = 0;
        let mut start_inclusivity = Inclusivity::Inclusive;
        let mut segments = Vec::with_capacity(raw.len());
        for (value, len, gap, end_inclusivity) in raw {
            let start = cursor + gap;
            if gap > 0 {
                start_inclusivity = Inclusivity::Inclusive;
            }
            let interval = Interval::between(
                micros(start),
                micros(start + len),
                start_inclusivity,
                end_inclusivity,
            );
            segments.push(Segment::new(value, interval));
            cursor = start + len;
            start_inclusivity = end_inclusivity.opposite();
        }
        segments
    })
}

proptest! {
    #[test]
    fn intersect_is_commutative(a in interval(), b in interval()) {
        prop_assert_eq!(Interval::intersect(&a, &b), Interval::intersect(&b, &a));
    }

    #[test]
    fn intersect_is_associative(a in interval(), b in interval(), c in interval()) {
        prop_assert_eq!(
            Interval::intersect(&Interval::intersect(&a, &b), &c),
            Interval::intersect(&a, &Interval::intersect(&b, &c))
        );
    }

    #[test]
    fn forever_is_the_intersect_identity(a in interval()) {
        prop_assume!(!a.is_empty());
        prop_assert_eq!(Interval::intersect(&a, &Interval::forever()), a);
    }

    #[test]
    fn coalesce_is_idempotent(input in segments(0_u8..3)) {
        let once = coalesce(input);
        prop_assert_eq!(coalesce(once.clone()), once);
    }

    #[test]
    fn coalesced_neighbours_differ_or_leave_a_gap(input in segments(0_u8..3)) {
        let once = coalesce(input);
        for pair in once.windows(2) {
            prop_assert!(!(pair[0].value == pair[1].value && pair[0].interval.meets(&pair[1].interval)));
        }
    }

    #[test]
    fn double_negation_is_identity(input in segments(any::<bool>())) {
        let w = Windows::from_segments(input);
        let bounds = Interval::closed(micros(-RANGE), micros(RANGE));
        prop_assert_eq!(w.not().not().collect(bounds).unwrap(), w.collect(bounds).unwrap());
    }

    #[test]
    fn rebasing_keeps_the_line(
        anchor in -RANGE..RANGE,
        value in -100.0_f64..100.0,
        rate in -10.0_f64..10.0,
        new_anchor in -RANGE..RANGE,
        offset in -RANGE..RANGE,
    ) {
        let eq = LinearEquation::new(micros(anchor * 1_000), value, rate);
        let rebased = eq.shift_initial_time(micros(new_anchor * 1_000));
        let (a, b) = (eq.value_at(micros(offset * 1_000)), rebased.value_at(micros(offset * 1_000)));
        prop_assert!((a - b).abs() <= 1e-9 * (1.0 + a.abs()));
    }
}
