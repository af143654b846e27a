//! Error types for schedule-engine boundary operations.
//!
//! Only decoding of transport data can fail. Reconciliation and aggregation
//! never return errors: malformed intervals are dropped and missing data is
//! reported through [`crate::utilization::Stat`].

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("Invalid packed interval: {0}")]
    InvalidPackedInterval(String),

    #[error("Timestamp out of range: {0}")]
    TimestampOutOfRange(i64),

    #[error("Invalid datetime '{value}': {message}")]
    InvalidDateTime { value: String, message: String },

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Feed parse error: {0}")]
    FeedParse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
