//! Tests for day ranges, weekly repetition and the working-day span.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use schedule_engine::calendar::{
    day_range, local_day, repeat_weekly, DEFAULT_REPEAT_WEEKS, MAX_REPEAT_WEEKS,
};
use schedule_engine::interval::Interval;
use schedule_engine::timeline::TimelineSegment;
use schedule_engine::workday::WorkingDay;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn at(d: u32, hour: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 4, d, hour, min, 0).unwrap()
}

fn minute(hour: u32, min: u32) -> u32 {
    hour * 60 + min
}

// ── Day ranges ──────────────────────────────────────────────────────────────

#[test]
fn day_range_is_inclusive() {
    let days = day_range(date(2025, 4, 28), date(2025, 5, 1));

    assert_eq!(
        days,
        vec![date(2025, 4, 28), date(2025, 4, 29), date(2025, 4, 30), date(2025, 5, 1)]
    );
}

#[test]
fn day_range_single_day_and_inverted() {
    assert_eq!(day_range(date(2025, 4, 28), date(2025, 4, 28)), vec![date(2025, 4, 28)]);
    assert!(day_range(date(2025, 4, 29), date(2025, 4, 28)).is_empty());
}

#[test]
fn local_day_uses_timezone() {
    let tz = chrono_tz::Europe::Moscow;

    assert_eq!(local_day(at(27, 21, 30), &tz), date(2025, 4, 28));
    assert_eq!(local_day(at(27, 20, 59), &tz), date(2025, 4, 27));
}

// ── Weekly repetition ───────────────────────────────────────────────────────

#[test]
fn repeat_weekly_shifts_intervals_by_whole_weeks() {
    let template = vec![Interval::new(at(28, 6, 0), at(28, 9, 0))];

    let copies = repeat_weekly(&template, date(2025, 4, 28), 3, |_| false);

    assert_eq!(copies.len(), 3);
    assert_eq!(copies[1].day, date(2025, 5, 5));
    assert_eq!(copies[2].day, date(2025, 5, 12));
    assert_eq!(
        copies[2].intervals[0].start,
        Utc.with_ymd_and_hms(2025, 5, 12, 6, 0, 0).unwrap()
    );
}

#[test]
fn repeat_weekly_skips_excluded_days_but_keeps_the_first() {
    let template = vec![Interval::new(at(28, 6, 0), at(28, 9, 0))];
    let holidays = [date(2025, 4, 28), date(2025, 5, 12)];

    let copies = repeat_weekly(&template, date(2025, 4, 28), 4, |day| holidays.contains(&day));

    let days: Vec<NaiveDate> = copies.iter().map(|c| c.day).collect();
    assert_eq!(days, vec![date(2025, 4, 28), date(2025, 5, 5), date(2025, 5, 19)]);
}

#[test]
fn default_repeat_is_a_year() {
    let copies = repeat_weekly(&[], date(2025, 1, 6), DEFAULT_REPEAT_WEEKS, |_| false);

    assert_eq!(copies.len(), 52);
    assert_eq!(copies.last().unwrap().day, date(2025, 12, 29));
}

#[test]
fn max_repeat_is_ten_years() {
    let copies = repeat_weekly(&[], date(2025, 1, 6), MAX_REPEAT_WEEKS, |_| false);

    assert_eq!(copies.len(), 520);
}

#[test]
fn repeat_weekly_stops_at_the_end_of_the_calendar() {
    let near_end = NaiveDate::MAX - Duration::weeks(2);

    let copies = repeat_weekly(&[], near_end, u32::MAX, |_| false);

    let days: Vec<NaiveDate> = copies.iter().map(|c| c.day).collect();
    assert_eq!(
        days,
        vec![near_end, near_end + Duration::weeks(1), NaiveDate::MAX]
    );
}

#[test]
fn repeat_weekly_stops_when_an_interval_leaves_the_range() {
    let last_noon = NaiveDate::MAX.and_hms_opt(12, 0, 0).unwrap().and_utc();
    let template = vec![Interval::new(last_noon - Duration::hours(3), last_noon)];

    let copies = repeat_weekly(&template, date(2025, 4, 28), 4, |_| false);

    assert_eq!(copies.len(), 1);
    assert_eq!(copies[0].intervals, template);
}

// ── Working-day span ────────────────────────────────────────────────────────

#[test]
fn working_day_spans_earliest_start_to_latest_end() {
    let intervals = vec![
        Interval::new(at(28, 6, 0), at(28, 8, 30)),
        Interval::new(at(29, 9, 30), at(29, 16, 0)),
        Interval::new(at(30, 5, 0), at(30, 4, 0)),
    ];

    let day = WorkingDay::from_intervals(&intervals, &Utc).unwrap();

    assert_eq!(day.start_minute, minute(6, 0));
    assert_eq!(day.end_minute, minute(16, 0));
    assert_eq!(day.duration_minutes(), 600);
}

#[test]
fn working_day_is_in_local_time() {
    let intervals = vec![Interval::new(at(28, 6, 0), at(28, 15, 0))];

    let day = WorkingDay::from_intervals(&intervals, &chrono_tz::Europe::Moscow).unwrap();

    assert_eq!(day.start_minute, minute(9, 0));
    assert_eq!(day.end_minute, minute(18, 0));
}

#[test]
fn shift_ending_at_local_midnight_spans_to_end_of_day() {
    // 15:00-21:00 UTC is 18:00-24:00 in Moscow
    let intervals = vec![
        Interval::new(at(28, 6, 0), at(28, 12, 0)),
        Interval::new(at(29, 15, 0), at(29, 21, 0)),
    ];

    let day = WorkingDay::from_intervals(&intervals, &chrono_tz::Europe::Moscow).unwrap();

    assert_eq!(day.start_minute, minute(9, 0));
    assert_eq!(day.end_minute, 1440);
    assert_eq!(day.duration_minutes(), 15 * 60);
}

#[test]
fn lone_shift_ending_at_midnight_has_a_span() {
    let intervals = vec![Interval::new(at(28, 18, 0), at(29, 0, 0))];

    let day = WorkingDay::from_intervals(&intervals, &Utc).unwrap();

    assert_eq!(day.start_minute, minute(18, 0));
    assert_eq!(day.end_minute, 1440);
}

#[test]
fn working_day_parses_clock_strings() {
    let day = WorkingDay::parse("09:00", "24:00").unwrap();

    assert_eq!(day.start_minute, minute(9, 0));
    assert_eq!(day.end_minute, 1440);
    assert!(WorkingDay::parse("19:00", "09:00").is_none());
    assert!(WorkingDay::parse("24:00", "24:00").is_none());
    assert!(WorkingDay::parse("09:75", "19:00").is_none());
}

#[test]
fn working_day_needs_valid_intervals() {
    let none: Vec<Interval> = vec![];
    assert!(WorkingDay::from_intervals(&none, &Utc).is_none());
}

#[test]
fn segment_share_of_working_day() {
    let day = WorkingDay {
        start_minute: minute(9, 0),
        end_minute: minute(19, 0),
    };

    let segment = TimelineSegment::free(at(28, 9, 0), at(28, 11, 30));

    assert!((day.share_percent(&segment) - 25.0).abs() < 1e-9);
}
