//! # schedule-engine
//!
//! Timeline reconciliation and utilization statistics for specialist schedules.
//!
//! Given a specialist's declared working intervals for a day and the
//! appointments booked inside them, the engine derives a gapless timeline of
//! labeled segments (booked, confirmed, free, not available). In parallel it
//! sums scheduled and booked time per day and per specialist and turns the
//! ratio into a percentage label.
//!
//! Both computations are pure: no I/O, no shared state. Everything that talks
//! to the CRM lives outside this crate; [`codec`] is the only place where raw
//! transport shapes are turned into the types below.
//!
//! ## Modules
//!
//! - [`interval`] — `Interval` value type and overlap/ordering primitives
//! - [`appointment`] — booked/confirmed appointment intervals
//! - [`conflict`] — pairwise overlap detection and working-interval validation
//! - [`timeline`] — reconcile working hours and appointments into segments
//! - [`day`] — one specialist's schedule for one day
//! - [`utilization`] — scheduled vs booked aggregation and percent labels
//! - [`workday`] — working-day span used to size timeline blocks
//! - [`calendar`] — day ranges and weekly schedule repetition
//! - [`codec`] — packed `"start:end"` decoding and feed normalisation
//! - [`error`] — Error types

pub mod appointment;
pub mod calendar;
pub mod codec;
pub mod conflict;
pub mod day;
pub mod error;
pub mod interval;
pub mod timeline;
pub mod utilization;
pub mod workday;

pub use appointment::{Appointment, AppointmentStatus, Patient};
pub use conflict::{find_overlaps, validate_working_intervals};
pub use day::DaySchedule;
pub use error::ScheduleError;
pub use interval::{Interval, SpecialistId};
pub use timeline::{reconcile, SegmentStatus, TimelineSegment};
pub use utilization::{aggregate, SpecialistUtilization, Stat, UtilizationPoint, UtilizationReport};
pub use workday::WorkingDay;
