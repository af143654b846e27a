//! Interval value type and the comparison primitives the rest of the engine
//! is built on.
//!
//! All intervals are half-open `[start, end)`: an interval that ends exactly
//! when another starts does not overlap it. An interval is valid only when
//! `start < end`; zero-length and inverted intervals are dropped by callers
//! rather than reported as errors.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

/// Canonical specialist identifier.
///
/// The CRM hands out ids as numbers in some payloads and strings in others;
/// both are normalised to a string at the decoding boundary.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpecialistId(pub String);

impl fmt::Display for SpecialistId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SpecialistId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for SpecialistId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<i64> for SpecialistId {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

/// Anything with a start and an end instant.
///
/// Implemented by working intervals, appointments and timeline segments so the
/// primitives below can compare any of them against each other.
pub trait Bounded {
    fn start(&self) -> DateTime<Utc>;
    fn end(&self) -> DateTime<Utc>;

    /// Length of the interval in milliseconds (negative when inverted).
    fn duration_ms(&self) -> i64 {
        (self.end() - self.start()).num_milliseconds()
    }
}

impl<T: Bounded + ?Sized> Bounded for &T {
    fn start(&self) -> DateTime<Utc> {
        (**self).start()
    }

    fn end(&self) -> DateTime<Utc> {
        (**self).end()
    }
}

/// A span of absolute time, e.g. one declared block of working hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Interval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// True when `other` lies entirely inside this interval (bounds inclusive).
    pub fn contains<B: Bounded + ?Sized>(&self, other: &B) -> bool {
        self.start <= other.start() && other.end() <= self.end
    }

    /// Shift both bounds by the same amount.
    ///
    /// `None` when either bound leaves the representable range.
    pub fn checked_shift(&self, by: Duration) -> Option<Self> {
        Some(Self {
            start: self.start.checked_add_signed(by)?,
            end: self.end.checked_add_signed(by)?,
        })
    }
}

impl Bounded for Interval {
    fn start(&self) -> DateTime<Utc> {
        self.start
    }

    fn end(&self) -> DateTime<Utc> {
        self.end
    }
}

/// True iff the interval has positive length.
pub fn is_valid<B: Bounded + ?Sized>(interval: &B) -> bool {
    interval.start() < interval.end()
}

/// Two intervals overlap iff `a.start < b.end && b.start < a.end`.
///
/// Touching endpoints are not an overlap.
pub fn overlaps<A: Bounded + ?Sized, B: Bounded + ?Sized>(a: &A, b: &B) -> bool {
    a.start() < b.end() && b.start() < a.end()
}

/// Ascending order by start instant.
///
/// Equal starts compare equal, so a stable sort keeps their input order.
pub fn compare_by_start<A: Bounded, B: Bounded>(a: &A, b: &B) -> Ordering {
    a.start().cmp(&b.start())
}

/// Stable in-place sort by start instant.
pub fn sort_by_start<T: Bounded>(items: &mut [T]) {
    items.sort_by(compare_by_start);
}

/// Copy out the valid entries of `items`, logging every one that is dropped.
pub(crate) fn retain_valid<T: Bounded + Clone + fmt::Debug>(items: &[T], kind: &str) -> Vec<T> {
    items
        .iter()
        .filter(|item| {
            let valid = is_valid(*item);
            if !valid {
                debug!("dropping invalid {}: {:?}", kind, item);
            }
            valid
        })
        .cloned()
        .collect()
}
