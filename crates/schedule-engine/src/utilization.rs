//! Scheduled vs booked time, per day and per specialist.
//!
//! For every specialist the aggregator sums the length of declared working
//! intervals (scheduled) and of appointments (booked), both per calendar day
//! and over the whole queried range. The utilization percentage is
//! `booked / scheduled * 100`, rounded to one decimal with a trailing `.0`
//! stripped (`85.0` -> `"85%"`, `85.25` -> `"85.3%"`).
//!
//! Nothing here divides by zero or fails. A statistic is always one of:
//!
//! - [`Stat::Pending`]: the feeds have not been loaded yet
//! - [`Stat::NoData`]: nothing is known for the cell, or time is booked with
//!   no scheduled time to compare it with
//! - [`Stat::Computed`]: a percentage can be shown

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::appointment::Appointment;
use crate::day::{DayMap, SpecialistDays};
use crate::interval::{self, Bounded, Interval, SpecialistId};

/// Scheduled and booked durations for one cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtilizationPoint {
    pub scheduled_ms: i64,
    pub booked_ms: i64,
}

impl UtilizationPoint {
    pub fn new(scheduled_ms: i64, booked_ms: i64) -> Self {
        Self {
            scheduled_ms,
            booked_ms,
        }
    }

    /// Percentage rounded to one decimal, or `None` when there is booked time
    /// but no scheduled time. An all-zero point is `0`.
    pub fn percent(&self) -> Option<f64> {
        if self.scheduled_ms <= 0 {
            return (self.booked_ms == 0).then_some(0.0);
        }
        let raw = self.booked_ms as f64 * 100.0 / self.scheduled_ms as f64;
        Some((raw * 10.0).round() / 10.0)
    }

    /// Display form of [`percent`](Self::percent), e.g. `"85%"` or `"85.3%"`.
    pub fn percent_label(&self) -> Option<String> {
        self.percent().map(format_percent)
    }

    fn add(&mut self, other: UtilizationPoint) {
        self.scheduled_ms += other.scheduled_ms;
        self.booked_ms += other.booked_ms;
    }
}

/// Format an already rounded percentage: one decimal, `.0` dropped.
pub fn format_percent(value: f64) -> String {
    let text = format!("{:.1}", value);
    match text.strip_suffix(".0") {
        Some(whole) => format!("{}%", whole),
        None => format!("{}%", text),
    }
}

/// Three-state statistic handed to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Stat {
    Pending,
    NoData,
    Computed(UtilizationPoint),
}

impl Stat {
    /// Classify a looked-up point; a missing point means no data.
    pub fn from_point(point: Option<&UtilizationPoint>) -> Self {
        match point {
            Some(point) if point.percent().is_some() => Stat::Computed(*point),
            _ => Stat::NoData,
        }
    }

    /// Percent label for computed statistics.
    pub fn label(&self) -> Option<String> {
        match self {
            Stat::Computed(point) => point.percent_label(),
            Stat::Pending | Stat::NoData => None,
        }
    }
}

/// Aggregation result for one specialist.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialistUtilization {
    pub per_day: BTreeMap<NaiveDate, UtilizationPoint>,
    pub total: UtilizationPoint,
}

impl SpecialistUtilization {
    pub fn day_stat(&self, day: NaiveDate) -> Stat {
        Stat::from_point(self.per_day.get(&day))
    }

    pub fn total_stat(&self) -> Stat {
        Stat::from_point(Some(&self.total))
    }
}

/// Sum scheduled and booked time for one specialist.
///
/// A day present in only one of the maps gets zero for the missing side.
/// Invalid intervals contribute nothing.
pub fn aggregate(
    schedule_by_day: &DayMap<Appointment>,
    work_schedule_by_day: &DayMap<Interval>,
) -> SpecialistUtilization {
    let mut result = SpecialistUtilization::default();

    for (day, intervals) in work_schedule_by_day {
        let point = UtilizationPoint::new(total_duration_ms(intervals), 0);
        result.per_day.entry(*day).or_default().add(point);
        result.total.add(point);
    }

    for (day, appointments) in schedule_by_day {
        let point = UtilizationPoint::new(0, total_duration_ms(appointments));
        result.per_day.entry(*day).or_default().add(point);
        result.total.add(point);
    }

    result
}

/// Statistic for a single specialist/day straight from its collections.
///
/// `None` on either side means the data is still loading.
pub fn day_stat_of(appointments: Option<&[Appointment]>, working: Option<&[Interval]>) -> Stat {
    match (appointments, working) {
        (Some(appointments), Some(working)) => {
            let point =
                UtilizationPoint::new(total_duration_ms(working), total_duration_ms(appointments));
            Stat::from_point(Some(&point))
        }
        _ => Stat::Pending,
    }
}

fn total_duration_ms<T: Bounded>(items: &[T]) -> i64 {
    items
        .iter()
        .filter(|item| interval::is_valid(*item))
        .map(|item| item.duration_ms())
        .sum()
}

/// Utilization of every specialist over the loaded date range.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtilizationReport {
    /// `None` until both feeds have been loaded.
    specialists: Option<BTreeMap<SpecialistId, SpecialistUtilization>>,
}

impl UtilizationReport {
    pub fn pending() -> Self {
        Self { specialists: None }
    }

    /// Aggregate every specialist that appears in either feed. If either feed
    /// is missing the whole report is pending.
    pub fn build(
        schedules: Option<&SpecialistDays<Appointment>>,
        work_schedules: Option<&SpecialistDays<Interval>>,
    ) -> Self {
        let (Some(schedules), Some(work_schedules)) = (schedules, work_schedules) else {
            return Self::pending();
        };

        let empty_schedule = DayMap::new();
        let empty_work = DayMap::new();
        let mut specialists = BTreeMap::new();
        for id in schedules.keys().chain(work_schedules.keys()) {
            if specialists.contains_key(id) {
                continue;
            }
            let by_day = schedules.get(id).unwrap_or(&empty_schedule);
            let work_by_day = work_schedules.get(id).unwrap_or(&empty_work);
            specialists.insert(id.clone(), aggregate(by_day, work_by_day));
        }

        Self {
            specialists: Some(specialists),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.specialists.is_none()
    }

    pub fn specialist(&self, specialist: &SpecialistId) -> Option<&SpecialistUtilization> {
        self.specialists.as_ref()?.get(specialist)
    }

    pub fn specialists(&self) -> impl Iterator<Item = (&SpecialistId, &SpecialistUtilization)> {
        self.specialists.iter().flatten()
    }

    pub fn day_stat(&self, specialist: &SpecialistId, day: NaiveDate) -> Stat {
        match &self.specialists {
            None => Stat::Pending,
            Some(all) => all
                .get(specialist)
                .map_or(Stat::NoData, |utilization| utilization.day_stat(day)),
        }
    }

    pub fn total_stat(&self, specialist: &SpecialistId) -> Stat {
        match &self.specialists {
            None => Stat::Pending,
            Some(all) => all
                .get(specialist)
                .map_or(Stat::NoData, SpecialistUtilization::total_stat),
        }
    }
}
