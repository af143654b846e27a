//! Booked and confirmed appointment intervals.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::interval::Bounded;

/// The patient an appointment is booked for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Patient {
    pub id: String,
    /// Short code describing the kind of visit.
    #[serde(rename = "type")]
    pub kind: String,
}

/// Stored appointment status. `free` and `na` only exist on the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Booked,
    Confirmed,
}

impl AppointmentStatus {
    /// Parse the status code used by the CRM feed.
    pub fn parse(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "booked" => Some(Self::Booked),
            "confirmed" => Some(Self::Confirmed),
            _ => None,
        }
    }
}

/// An appointment inside one specialist's working day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    /// Opaque CRM item id, stable across sessions.
    pub id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub patient: Patient,
    pub status: AppointmentStatus,
}

impl Bounded for Appointment {
    fn start(&self) -> DateTime<Utc> {
        self.start
    }

    fn end(&self) -> DateTime<Utc> {
        self.end
    }
}
