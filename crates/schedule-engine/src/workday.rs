//! The working-day span shared by every day column.
//!
//! Timeline blocks are drawn with a height proportional to their share of the
//! working day: from the earliest local start to the latest local end of any
//! working interval across all specialists and days.
//!
//! Bounds are minutes since local midnight, so a shift ending at midnight
//! ends at `1440` rather than wrapping to `00:00`.

use chrono::{DateTime, TimeZone, Timelike};
use serde::{Deserialize, Serialize};

use crate::interval::{self, Bounded};

pub const MINUTES_PER_DAY: u32 = 24 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingDay {
    pub start_minute: u32,
    pub end_minute: u32,
}

impl WorkingDay {
    /// Span from the earliest local start time to the latest local end time.
    ///
    /// An interval that runs past local midnight counts up to the end of its
    /// first day. Returns `None` when there is no valid interval or the
    /// resulting span is empty.
    pub fn from_intervals<'a, I, B, Tz>(intervals: I, tz: &Tz) -> Option<Self>
    where
        I: IntoIterator<Item = &'a B>,
        B: Bounded + 'a,
        Tz: TimeZone,
    {
        let mut span: Option<(u32, u32)> = None;
        for item in intervals.into_iter().filter(|item| interval::is_valid(*item)) {
            let start = item.start().with_timezone(tz);
            let end = item.end().with_timezone(tz);
            let start_minute = minute_of_day(&start);
            let end_minute = if end.date_naive() > start.date_naive() {
                MINUTES_PER_DAY
            } else {
                ceil_minute_of_day(&end)
            };
            span = Some(match span {
                None => (start_minute, end_minute),
                Some((s, e)) => (s.min(start_minute), e.max(end_minute)),
            });
        }

        match span {
            Some((start_minute, end_minute)) if start_minute < end_minute => Some(Self {
                start_minute,
                end_minute,
            }),
            _ => None,
        }
    }

    /// Parse a `"HH:MM"` pair; `"24:00"` is accepted as an end.
    pub fn parse(start: &str, end: &str) -> Option<Self> {
        let start_minute = parse_clock(start).filter(|m| *m < MINUTES_PER_DAY)?;
        let end_minute = parse_clock(end)?;
        (start_minute < end_minute).then_some(Self {
            start_minute,
            end_minute,
        })
    }

    pub fn duration_minutes(&self) -> i64 {
        i64::from(self.end_minute) - i64::from(self.start_minute)
    }

    /// Share of the working day covered by `segment`, in percent.
    pub fn share_percent<B: Bounded + ?Sized>(&self, segment: &B) -> f64 {
        let day_ms = self.duration_minutes() * 60_000;
        if day_ms <= 0 {
            return 0.0;
        }
        segment.duration_ms() as f64 / day_ms as f64 * 100.0
    }
}

fn minute_of_day<Tz: TimeZone>(at: &DateTime<Tz>) -> u32 {
    at.hour() * 60 + at.minute()
}

fn ceil_minute_of_day<Tz: TimeZone>(at: &DateTime<Tz>) -> u32 {
    let partial = at.second() > 0 || at.nanosecond() > 0;
    minute_of_day(at) + u32::from(partial)
}

fn parse_clock(value: &str) -> Option<u32> {
    let (hours, minutes) = value.trim().split_once(':')?;
    let hours: u32 = hours.parse().ok()?;
    let minutes: u32 = minutes.parse().ok()?;
    if minutes >= 60 {
        return None;
    }
    let total = hours.checked_mul(60)?.checked_add(minutes)?;
    (total <= MINUTES_PER_DAY).then_some(total)
}
