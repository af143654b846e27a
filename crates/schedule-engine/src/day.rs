//! One specialist's schedule for one calendar day, plus the map shapes the
//! decoded feeds are delivered in.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::appointment::Appointment;
use crate::conflict::{self, Overlap};
use crate::interval::{self, Bounded, Interval, SpecialistId};
use crate::timeline::{self, TimelineSegment};

/// Per-day collections for one specialist.
pub type DayMap<T> = BTreeMap<NaiveDate, Vec<T>>;

/// Per-day collections for every specialist.
pub type SpecialistDays<T> = BTreeMap<SpecialistId, DayMap<T>>;

/// Working intervals and appointments of one specialist on one day.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DaySchedule {
    pub working: Vec<Interval>,
    pub appointments: Vec<Appointment>,
}

impl DaySchedule {
    pub fn new(working: Vec<Interval>, appointments: Vec<Appointment>) -> Self {
        Self {
            working,
            appointments,
        }
    }

    /// Look up one specialist/day in the decoded feeds. Missing entries
    /// become empty collections.
    pub fn from_feeds(
        work: &SpecialistDays<Interval>,
        schedules: &SpecialistDays<Appointment>,
        specialist: &SpecialistId,
        day: NaiveDate,
    ) -> Self {
        let working = work
            .get(specialist)
            .and_then(|days| days.get(&day))
            .cloned()
            .unwrap_or_default();
        let appointments = schedules
            .get(specialist)
            .and_then(|days| days.get(&day))
            .cloned()
            .unwrap_or_default();
        Self::new(working, appointments)
    }

    /// True when no valid working interval is declared for the day.
    pub fn has_no_working_hours(&self) -> bool {
        !self.working.iter().any(interval::is_valid)
    }

    pub fn timeline(&self) -> Vec<TimelineSegment> {
        timeline::reconcile(&self.appointments, &self.working)
    }

    /// The first working interval that fully contains `range`, with its index.
    pub fn containing_working_interval<B: Bounded + ?Sized>(
        &self,
        range: &B,
    ) -> Option<(usize, &Interval)> {
        self.working
            .iter()
            .enumerate()
            .find(|(_, working)| interval::is_valid(*working) && working.contains(range))
    }

    /// Appointments lying entirely inside `range`, in start order.
    pub fn appointments_within<B: Bounded + ?Sized>(&self, range: &B) -> Vec<&Appointment> {
        let mut found: Vec<&Appointment> = self
            .appointments
            .iter()
            .filter(|appointment| {
                range.start() <= appointment.start && appointment.end <= range.end()
            })
            .collect();
        interval::sort_by_start(&mut found);
        found
    }

    /// A working interval may only be removed while nothing is booked in it.
    pub fn can_remove_working_interval(&self, index: usize) -> bool {
        match self.working.get(index) {
            Some(working) => self.appointments_within(working).is_empty(),
            None => false,
        }
    }

    /// Pairs of appointments booked over each other.
    pub fn double_bookings(&self) -> Vec<Overlap> {
        conflict::find_overlaps(&self.appointments)
    }
}
