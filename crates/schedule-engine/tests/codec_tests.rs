//! Tests for packed interval decoding and feed normalisation.

use chrono::{NaiveDate, TimeZone, Utc};
use schedule_engine::appointment::AppointmentStatus;
use schedule_engine::codec::{
    decode_appointment_list, decode_interval_list, decode_packed, decode_schedules,
    decode_work_schedules, encode_packed, parse_day, parse_instant, parse_timezone,
    DEFAULT_TIMEZONE,
};
use schedule_engine::error::ScheduleError;
use schedule_engine::interval::SpecialistId;

fn moscow() -> chrono_tz::Tz {
    parse_timezone(DEFAULT_TIMEZONE).unwrap()
}

// ── Packed intervals ────────────────────────────────────────────────────────

#[test]
fn decode_packed_epoch_millis() {
    // 2025-04-28 06:00Z - 08:30Z
    let interval = decode_packed("1745820000000:1745829000000").unwrap();

    assert_eq!(interval.start, Utc.with_ymd_and_hms(2025, 4, 28, 6, 0, 0).unwrap());
    assert_eq!(interval.end, Utc.with_ymd_and_hms(2025, 4, 28, 8, 30, 0).unwrap());
    assert_eq!(encode_packed(&interval), "1745820000000:1745829000000");
}

#[test]
fn decode_packed_rejects_malformed_text() {
    for raw in ["", "1745820000000", "abc:def", "1:2:3", "1745820000000-1745829000000"] {
        assert!(
            matches!(decode_packed(raw), Err(ScheduleError::InvalidPackedInterval(_))),
            "'{}' should be rejected",
            raw
        );
    }
}

#[test]
fn decode_packed_rejects_out_of_range_timestamps() {
    let result = decode_packed(&format!("0:{}", i64::MAX));

    assert!(matches!(result, Err(ScheduleError::TimestampOutOfRange(_))));
}

#[test]
fn decode_packed_keeps_inverted_bounds_for_caller_validation() {
    let interval = decode_packed("2000:1000").unwrap();

    assert!(!schedule_engine::interval::is_valid(&interval));
}

// ── Instants and days ───────────────────────────────────────────────────────

#[test]
fn parse_instant_accepts_rfc3339_and_naive() {
    let expected = Utc.with_ymd_and_hms(2025, 4, 28, 6, 0, 0).unwrap();

    assert_eq!(parse_instant("2025-04-28T09:00:00+03:00").unwrap(), expected);
    assert_eq!(parse_instant("2025-04-28T06:00:00.000Z").unwrap(), expected);
    assert_eq!(parse_instant("2025-04-28T06:00:00").unwrap(), expected);
    assert!(parse_instant("28.04.2025").is_err());
}

#[test]
fn parse_day_buckets_utc_midnight_shift_into_local_day() {
    // Local midnight in Moscow is 21:00Z the previous day.
    let day = parse_day("2025-04-27T21:00:00.000Z", &moscow()).unwrap();

    assert_eq!(day, NaiveDate::from_ymd_opt(2025, 4, 28).unwrap());
    assert_eq!(
        parse_day("2025-04-28", &moscow()).unwrap(),
        NaiveDate::from_ymd_opt(2025, 4, 28).unwrap()
    );
}

#[test]
fn unknown_timezone_is_an_error() {
    assert!(matches!(parse_timezone("Mars/Olympus"), Err(ScheduleError::InvalidTimezone(_))));
}

// ── Feeds ───────────────────────────────────────────────────────────────────

#[test]
fn schedules_feed_groups_by_specialist_and_day() {
    let json = r#"[
        {"specialist_id": 12, "date": "2025-04-27T21:00:00.000Z", "appointments": [
            {"id": 501, "start": "2025-04-28T06:00:00Z", "end": "2025-04-28T07:00:00Z",
             "patient": {"id": 77, "type": "LOG"}, "status": "confirmed"},
            {"id": 502, "start": "2025-04-28T08:00:00Z", "end": null,
             "patient": {"id": 78, "type": "DEF"}, "status": "booked"}
        ]},
        {"specialist_id": "12", "date": "2025-04-29", "appointments": []}
    ]"#;

    let decoded = decode_schedules(json, &moscow()).unwrap();
    let days = &decoded[&SpecialistId::from("12")];

    assert_eq!(decoded.len(), 1);
    assert_eq!(days.len(), 2);
    let first = &days[&NaiveDate::from_ymd_opt(2025, 4, 28).unwrap()];
    assert_eq!(first.len(), 1, "appointment with a missing bound is dropped");
    assert_eq!(first[0].id, "501");
    assert_eq!(first[0].patient.id, "77");
    assert_eq!(first[0].patient.kind, "LOG");
    assert_eq!(first[0].status, AppointmentStatus::Confirmed);
    assert!(days[&NaiveDate::from_ymd_opt(2025, 4, 29).unwrap()].is_empty());
}

#[test]
fn work_schedules_feed_accepts_packed_and_object_intervals() {
    let json = r#"[
        {"specialist_id": 3, "date": "2025-04-28", "schedule": {"id": 9, "intervals": [
            "1745820000000:1745829000000",
            {"start": "2025-04-28T09:30:00Z", "end": "2025-04-28T16:00:00Z"},
            {"start": "2025-04-28T17:00:00Z"},
            "garbage"
        ]}}
    ]"#;

    let decoded = decode_work_schedules(json, &moscow()).unwrap();
    let day = NaiveDate::from_ymd_opt(2025, 4, 28).unwrap();
    let intervals = &decoded[&SpecialistId::from("3")][&day];

    assert_eq!(intervals.len(), 2);
    assert_eq!(intervals[1].end, Utc.with_ymd_and_hms(2025, 4, 28, 16, 0, 0).unwrap());
}

#[test]
fn unknown_status_is_dropped_and_missing_status_defaults_to_booked() {
    let json = r#"[
        {"id": "a", "start": "2025-04-28T06:00:00Z", "end": "2025-04-28T07:00:00Z",
         "patient": {"id": "1", "type": "LOG"}, "status": "free"},
        {"id": "b", "start": "2025-04-28T07:00:00Z", "end": "2025-04-28T08:00:00Z",
         "patient": {"id": "1"}}
    ]"#;

    let decoded = decode_appointment_list(json).unwrap();

    assert_eq!(decoded.len(), 1);
    assert_eq!(decoded[0].id, "b");
    assert_eq!(decoded[0].status, AppointmentStatus::Booked);
    assert_eq!(decoded[0].patient.kind, "");
}

#[test]
fn broken_json_is_an_error() {
    assert!(matches!(decode_interval_list("[1, 2"), Err(ScheduleError::FeedParse(_))));
    assert!(decode_schedules(r#"[{"date": "2025-04-28"}]"#, &moscow()).is_err());
}

#[test]
fn unparseable_row_date_is_an_error() {
    let json = r#"[{"specialist_id": 1, "date": "tomorrow", "appointments": []}]"#;

    assert!(matches!(
        decode_schedules(json, &moscow()),
        Err(ScheduleError::InvalidDateTime { .. })
    ));
}
