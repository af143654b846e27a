//! Calendar helpers: the day columns of a queried range and weekly
//! repetition of a day's working intervals.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::interval::Interval;

/// How many weeks a new working schedule is repeated for by default.
pub const DEFAULT_REPEAT_WEEKS: u32 = 52;

/// Longest repetition accepted from user input: ten years.
pub const MAX_REPEAT_WEEKS: u32 = 520;

/// Every day from `from` to `to`, both inclusive. Empty when `from > to`.
pub fn day_range(from: NaiveDate, to: NaiveDate) -> Vec<NaiveDate> {
    from.iter_days().take_while(|day| *day <= to).collect()
}

/// Calendar day of `instant` in the given timezone.
pub fn local_day<Tz: TimeZone>(instant: DateTime<Utc>, tz: &Tz) -> NaiveDate {
    instant.with_timezone(tz).date_naive()
}

/// One generated copy of a weekly working schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyCopy {
    pub day: NaiveDate,
    pub intervals: Vec<Interval>,
}

/// Copy `template` (the working intervals of `first_day`) onto the same
/// weekday for `weeks` weeks, shifting every interval by whole weeks.
///
/// Days for which `is_excluded` returns true (e.g. public holidays) are
/// skipped but still count towards `weeks`. The first day is always kept:
/// it is the day the schedule was entered for. Generation stops early, with a
/// warning, at the first week that falls outside chrono's date range.
pub fn repeat_weekly<F>(
    template: &[Interval],
    first_day: NaiveDate,
    weeks: u32,
    is_excluded: F,
) -> Vec<WeeklyCopy>
where
    F: Fn(NaiveDate) -> bool,
{
    let mut copies = Vec::new();
    for week in 0..weeks {
        let shifted = Duration::try_weeks(i64::from(week))
            .and_then(|shift| Some((shift, first_day.checked_add_signed(shift)?)));
        let Some((shift, day)) = shifted else {
            warn!(
                "weekly repeat from {} stops after {} weeks: date out of range",
                first_day, week
            );
            break;
        };
        if week > 0 && is_excluded(day) {
            continue;
        }
        let shifted: Option<Vec<Interval>> =
            template.iter().map(|i| i.checked_shift(shift)).collect();
        let Some(intervals) = shifted else {
            warn!(
                "weekly repeat from {} stops after {} weeks: interval out of range",
                first_day, week
            );
            break;
        };
        copies.push(WeeklyCopy { day, intervals });
    }
    copies
}
