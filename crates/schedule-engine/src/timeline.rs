//! Reconcile one specialist's working hours and appointments for a day into a
//! single ordered, gapless timeline.
//!
//! Working intervals are walked in start order. Inside each one, appointments
//! are emitted verbatim and the gaps between them are filled with `free`
//! segments. Between consecutive working intervals an `na` segment covers the
//! off-shift gap. Time before the first or after the last working interval is
//! not represented.

use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::appointment::{Appointment, AppointmentStatus, Patient};
use crate::interval::{self, Bounded, Interval};

/// Label of one timeline segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentStatus {
    Booked,
    Confirmed,
    Free,
    /// Off-shift gap between two working intervals.
    #[serde(rename = "na")]
    NotAvailable,
}

impl From<AppointmentStatus> for SegmentStatus {
    fn from(status: AppointmentStatus) -> Self {
        match status {
            AppointmentStatus::Booked => SegmentStatus::Booked,
            AppointmentStatus::Confirmed => SegmentStatus::Confirmed,
        }
    }
}

/// One labeled, time-bounded unit of a reconciled day.
///
/// `patient` and `appointment_id` are set iff the segment comes from an
/// appointment (`booked` or `confirmed`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineSegment {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub patient: Option<Patient>,
    pub status: SegmentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appointment_id: Option<String>,
}

impl TimelineSegment {
    pub fn free(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start,
            end,
            patient: None,
            status: SegmentStatus::Free,
            appointment_id: None,
        }
    }

    pub fn not_available(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start,
            end,
            patient: None,
            status: SegmentStatus::NotAvailable,
            appointment_id: None,
        }
    }

    pub fn from_appointment(appointment: &Appointment) -> Self {
        Self {
            start: appointment.start,
            end: appointment.end,
            patient: Some(appointment.patient.clone()),
            status: appointment.status.into(),
            appointment_id: Some(appointment.id.clone()),
        }
    }

    /// True for `booked` and `confirmed` segments.
    pub fn is_occupied(&self) -> bool {
        matches!(
            self.status,
            SegmentStatus::Booked | SegmentStatus::Confirmed
        )
    }
}

impl Bounded for TimelineSegment {
    fn start(&self) -> DateTime<Utc> {
        self.start
    }

    fn end(&self) -> DateTime<Utc> {
        self.end
    }
}

/// Build the timeline for one specialist on one day.
///
/// Invalid working intervals and appointments (`start >= end`) are dropped.
/// Appointments are matched to the working interval that fully contains them;
/// an appointment straddling a shift boundary matches none and is left out.
///
/// The result is sorted by start and contiguous inside each working interval.
pub fn reconcile(
    appointments: &[Appointment],
    working_intervals: &[Interval],
) -> Vec<TimelineSegment> {
    let mut working = interval::retain_valid(working_intervals, "working interval");
    interval::sort_by_start(&mut working);
    let appointments = interval::retain_valid(appointments, "appointment");

    let mut segments = Vec::new();
    for (idx, block) in working.iter().enumerate() {
        if idx > 0 {
            let previous = &working[idx - 1];
            if previous.end < block.start {
                segments.push(TimelineSegment::not_available(previous.end, block.start));
            } else if previous.end > block.start {
                warn!(
                    "working intervals overlap: {} - {} and {} - {}",
                    previous.start, previous.end, block.start, block.end
                );
            }
        }
        fill_block(block, &appointments, &mut segments);
    }

    segments.sort_by(interval::compare_by_start);
    segments
}

/// Emit the appointments inside `block` and the free gaps around them.
fn fill_block(block: &Interval, appointments: &[Appointment], out: &mut Vec<TimelineSegment>) {
    let mut inside: Vec<&Appointment> = appointments
        .iter()
        .filter(|appointment| block.contains(*appointment))
        .collect();
    interval::sort_by_start(&mut inside);

    let mut cursor = block.start;
    for appointment in inside {
        if appointment.start > cursor {
            out.push(TimelineSegment::free(cursor, appointment.start));
        } else if appointment.start < cursor {
            // Overlapping bookings are a data problem upstream; keep both as-is.
            warn!(
                "appointment {} starts at {} before the previous one ends at {}",
                appointment.id, appointment.start, cursor
            );
        }
        out.push(TimelineSegment::from_appointment(appointment));
        cursor = cursor.max(appointment.end);
    }

    if cursor < block.end {
        out.push(TimelineSegment::free(cursor, block.end));
    }
}
