//! Decoding of transport data into engine types.
//!
//! The CRM stores working intervals packed as `"startEpochMs:endEpochMs"` and
//! delivers schedules as loosely typed JSON rows (ids as numbers or strings,
//! dates as ISO dates or datetimes). This module is the single place where
//! those shapes are turned into [`Interval`], [`Appointment`] and
//! [`SpecialistDays`]. The engine itself never sees the packed form.
//!
//! Entries with a missing or unparseable bound are dropped with a log line,
//! matching the engine's policy for invalid intervals. Only structurally
//! broken JSON is an error.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::appointment::{Appointment, AppointmentStatus, Patient};
use crate::calendar;
use crate::day::SpecialistDays;
use crate::error::{Result, ScheduleError};
use crate::interval::{Interval, SpecialistId};

/// Timezone the clinic's days are bucketed in unless configured otherwise.
pub const DEFAULT_TIMEZONE: &str = "Europe/Moscow";

/// Decode a packed `"startEpochMs:endEpochMs"` interval.
///
/// The bounds are not checked for order; use [`crate::interval::is_valid`].
pub fn decode_packed(raw: &str) -> Result<Interval> {
    let invalid = || ScheduleError::InvalidPackedInterval(raw.to_string());

    let (start, end) = raw.trim().split_once(':').ok_or_else(invalid)?;
    let start: i64 = start.trim().parse().map_err(|_| invalid())?;
    let end: i64 = end.trim().parse().map_err(|_| invalid())?;

    Ok(Interval::new(from_epoch_ms(start)?, from_epoch_ms(end)?))
}

/// Inverse of [`decode_packed`].
pub fn encode_packed(interval: &Interval) -> String {
    format!(
        "{}:{}",
        interval.start.timestamp_millis(),
        interval.end.timestamp_millis()
    )
}

fn from_epoch_ms(ms: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms).ok_or(ScheduleError::TimestampOutOfRange(ms))
}

/// Parse an ISO 8601 instant.
///
/// Accepts RFC 3339 (with offset) and naive `YYYY-MM-DDTHH:MM:SS[.fff]`, which
/// is interpreted as UTC.
pub fn parse_instant(value: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|ndt| ndt.and_utc())
        .map_err(|e| ScheduleError::InvalidDateTime {
            value: value.to_string(),
            message: e.to_string(),
        })
}

/// Parse the `date` of a feed row into a calendar day.
///
/// A bare `YYYY-MM-DD` is taken as is; a full datetime is converted to the
/// local day in `tz` (the CRM sends local midnight as a UTC instant).
pub fn parse_day(value: &str, tz: &Tz) -> Result<NaiveDate> {
    if let Ok(day) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(day);
    }
    parse_instant(value).map(|instant| calendar::local_day(instant, tz))
}

pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse()
        .map_err(|_| ScheduleError::InvalidTimezone(name.to_string()))
}

// ---------------------------------------------------------------------------
// Feed rows as delivered by the data-access layer
// ---------------------------------------------------------------------------

/// An id that arrives either as a JSON number or a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Number(i64),
    Text(String),
}

impl fmt::Display for RawId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawId::Number(n) => write!(f, "{}", n),
            RawId::Text(s) => f.write_str(s),
        }
    }
}

impl From<RawId> for SpecialistId {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Number(n) => SpecialistId::from(n),
            RawId::Text(s) => SpecialistId::from(s),
        }
    }
}

/// A working interval, either packed or as an object of ISO strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawInterval {
    Packed(String),
    Bounds {
        start: Option<String>,
        end: Option<String>,
    },
}

impl RawInterval {
    /// `None` (logged) when a bound is missing or unparseable.
    pub fn decode(&self) -> Option<Interval> {
        let decoded = match self {
            RawInterval::Packed(raw) => decode_packed(raw),
            RawInterval::Bounds {
                start: Some(start),
                end: Some(end),
            } => parse_instant(start)
                .and_then(|start| parse_instant(end).map(|end| Interval::new(start, end))),
            RawInterval::Bounds { .. } => {
                debug!("dropping working interval with a missing bound: {:?}", self);
                return None;
            }
        };
        decoded
            .map_err(|e| warn!("dropping working interval: {}", e))
            .ok()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPatient {
    pub id: RawId,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAppointment {
    pub id: RawId,
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default)]
    pub patient: Option<RawPatient>,
    #[serde(default)]
    pub status: Option<String>,
}

impl RawAppointment {
    /// `None` (logged) when a bound, the patient or a known status is missing.
    pub fn decode(&self) -> Option<Appointment> {
        let (Some(start), Some(end)) = (&self.start, &self.end) else {
            debug!("dropping appointment {} with a missing bound", self.id);
            return None;
        };
        let Some(patient) = &self.patient else {
            debug!("dropping appointment {} without a patient", self.id);
            return None;
        };
        let status = match self.status.as_deref() {
            None => AppointmentStatus::Booked,
            Some(code) => match AppointmentStatus::parse(code) {
                Some(status) => status,
                None => {
                    warn!("dropping appointment {} with status '{}'", self.id, code);
                    return None;
                }
            },
        };
        let bounds =
            parse_instant(start).and_then(|start| parse_instant(end).map(|end| (start, end)));
        let (start, end) = match bounds {
            Ok(bounds) => bounds,
            Err(e) => {
                warn!("dropping appointment {}: {}", self.id, e);
                return None;
            }
        };

        Some(Appointment {
            id: self.id.to_string(),
            start,
            end,
            patient: Patient {
                id: patient.id.to_string(),
                kind: patient.kind.clone().unwrap_or_default(),
            },
            status,
        })
    }
}

/// One row of the schedules feed: a specialist's appointments on a day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRow {
    pub specialist_id: RawId,
    pub date: String,
    #[serde(default)]
    pub appointments: Vec<RawAppointment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawWorkSchedule {
    #[serde(default)]
    pub id: Option<RawId>,
    #[serde(default)]
    pub intervals: Vec<RawInterval>,
}

/// One row of the work-schedules feed: a specialist's working hours on a day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkScheduleRow {
    pub specialist_id: RawId,
    pub date: String,
    pub schedule: RawWorkSchedule,
}

/// Group schedule rows by specialist and local day.
///
/// A row whose date cannot be parsed is an error: silently moving
/// appointments to another day would corrupt the statistics.
pub fn group_schedules(rows: &[ScheduleRow], tz: &Tz) -> Result<SpecialistDays<Appointment>> {
    let mut grouped = SpecialistDays::new();
    for row in rows {
        let day = parse_day(&row.date, tz)?;
        let entry: &mut Vec<Appointment> = grouped
            .entry(SpecialistId::from(row.specialist_id.clone()))
            .or_default()
            .entry(day)
            .or_default();
        entry.extend(row.appointments.iter().filter_map(RawAppointment::decode));
    }
    Ok(grouped)
}

/// Group work-schedule rows by specialist and local day.
pub fn group_work_schedules(
    rows: &[WorkScheduleRow],
    tz: &Tz,
) -> Result<SpecialistDays<Interval>> {
    let mut grouped = SpecialistDays::new();
    for row in rows {
        let day = parse_day(&row.date, tz)?;
        let entry: &mut Vec<Interval> = grouped
            .entry(SpecialistId::from(row.specialist_id.clone()))
            .or_default()
            .entry(day)
            .or_default();
        entry.extend(row.schedule.intervals.iter().filter_map(RawInterval::decode));
    }
    Ok(grouped)
}

/// Decode the JSON body of the schedules feed.
pub fn decode_schedules(json: &str, tz: &Tz) -> Result<SpecialistDays<Appointment>> {
    let rows: Vec<ScheduleRow> = serde_json::from_str(json)?;
    group_schedules(&rows, tz)
}

/// Decode the JSON body of the work-schedules feed.
pub fn decode_work_schedules(json: &str, tz: &Tz) -> Result<SpecialistDays<Interval>> {
    let rows: Vec<WorkScheduleRow> = serde_json::from_str(json)?;
    group_work_schedules(&rows, tz)
}

/// Decode a flat JSON array of appointments for a single day.
pub fn decode_appointment_list(json: &str) -> Result<Vec<Appointment>> {
    let raw: Vec<RawAppointment> = serde_json::from_str(json)?;
    Ok(raw.iter().filter_map(RawAppointment::decode).collect())
}

/// Decode a flat JSON array of working intervals (packed or objects).
pub fn decode_interval_list(json: &str) -> Result<Vec<Interval>> {
    let raw: Vec<RawInterval> = serde_json::from_str(json)?;
    Ok(raw.iter().filter_map(RawInterval::decode).collect())
}
