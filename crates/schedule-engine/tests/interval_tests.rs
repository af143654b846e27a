//! Tests for interval primitives and overlap detection.

use std::cmp::Ordering;

use chrono::{DateTime, TimeZone, Utc};
use schedule_engine::conflict::{find_overlaps, validate_working_intervals, Overlap};
use schedule_engine::interval::{
    self, compare_by_start, is_valid, overlaps, Bounded, Interval, SpecialistId,
};

fn at(hour: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 4, 28, hour, min, 0).unwrap()
}

fn span(start: (u32, u32), end: (u32, u32)) -> Interval {
    Interval::new(at(start.0, start.1), at(end.0, end.1))
}

// ── Primitives ──────────────────────────────────────────────────────────────

#[test]
fn overlapping_intervals_detected() {
    assert!(overlaps(&span((9, 0), (10, 0)), &span((9, 30), (10, 30))));
    assert!(overlaps(&span((9, 0), (12, 0)), &span((10, 0), (11, 0))));
}

#[test]
fn touching_intervals_do_not_overlap() {
    assert!(!overlaps(&span((9, 0), (10, 0)), &span((10, 0), (11, 0))));
    assert!(!overlaps(&span((10, 0), (11, 0)), &span((9, 0), (10, 0))));
}

#[test]
fn validity_requires_positive_length() {
    assert!(is_valid(&span((9, 0), (9, 1))));
    assert!(!is_valid(&span((9, 0), (9, 0))));
    assert!(!is_valid(&span((10, 0), (9, 0))));
}

#[test]
fn compare_by_start_orders_ascending() {
    assert_eq!(compare_by_start(&span((9, 0), (10, 0)), &span((11, 0), (12, 0))), Ordering::Less);
    assert_eq!(compare_by_start(&span((9, 0), (10, 0)), &span((9, 0), (12, 0))), Ordering::Equal);
}

#[test]
fn sort_by_start_is_stable_for_equal_starts() {
    let mut items = vec![
        span((11, 0), (12, 0)),
        span((9, 0), (11, 0)),
        span((9, 0), (10, 0)),
    ];

    interval::sort_by_start(&mut items);

    assert_eq!(items, vec![span((9, 0), (11, 0)), span((9, 0), (10, 0)), span((11, 0), (12, 0))]);
}

#[test]
fn contains_is_bounds_inclusive() {
    let shift = span((9, 0), (18, 0));

    assert!(shift.contains(&span((9, 0), (18, 0))));
    assert!(shift.contains(&span((10, 0), (11, 0))));
    assert!(!shift.contains(&span((8, 30), (9, 30))));
    assert_eq!(shift.duration_ms(), 9 * 3_600_000);
}

#[test]
fn specialist_ids_normalise_numbers_and_strings() {
    assert_eq!(SpecialistId::from(42_i64), SpecialistId::from("42"));
    assert_eq!(SpecialistId::from("42").to_string(), "42");
}

// ── Overlap detection ───────────────────────────────────────────────────────

#[test]
fn find_overlaps_reports_pairs_with_minutes() {
    let items = vec![
        span((9, 0), (10, 0)),
        span((9, 30), (10, 30)),
        span((12, 0), (13, 0)),
    ];

    let found = find_overlaps(&items);

    assert_eq!(
        found,
        vec![Overlap {
            first: 0,
            second: 1,
            overlap_minutes: 30
        }]
    );
}

#[test]
fn adjacent_entries_are_not_overlaps() {
    let items = vec![span((9, 0), (10, 0)), span((10, 0), (11, 0))];

    assert!(find_overlaps(&items).is_empty());
}

#[test]
fn invalid_entries_never_overlap() {
    let items = vec![span((9, 0), (12, 0)), span((11, 0), (10, 0))];

    assert!(find_overlaps(&items).is_empty());
}

#[test]
fn working_interval_form_validation() {
    let items = vec![
        span((9, 0), (11, 30)),
        span((11, 0), (12, 0)),
        span((13, 0), (12, 30)),
        span((14, 0), (18, 0)),
    ];

    assert_eq!(validate_working_intervals(&items), vec![false, false, false, true]);
}
