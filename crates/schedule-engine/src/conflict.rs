//! Detect overlapping intervals within one list.
//!
//! Used to validate a day's working intervals before they are saved and to
//! surface double-booked appointments. Adjacent intervals (one ends exactly
//! when the next starts) are NOT overlaps.

use serde::{Deserialize, Serialize};

use crate::interval::{self, Bounded};

/// A detected overlap between two entries of the same list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Overlap {
    /// Index of the earlier entry in the input.
    pub first: usize,
    /// Index of the later entry in the input.
    pub second: usize,
    pub overlap_minutes: i64,
}

/// Find all pairwise overlaps among the valid entries of `items`.
///
/// The overlap duration is `min(a.end, b.end) - max(a.start, b.start)`.
/// Invalid entries never take part in an overlap.
pub fn find_overlaps<T: Bounded>(items: &[T]) -> Vec<Overlap> {
    let mut overlaps = Vec::new();

    for (i, a) in items.iter().enumerate() {
        if !interval::is_valid(a) {
            continue;
        }
        for (j, b) in items.iter().enumerate().skip(i + 1) {
            if interval::is_valid(b) && interval::overlaps(a, b) {
                let overlap_start = a.start().max(b.start());
                let overlap_end = a.end().min(b.end());
                overlaps.push(Overlap {
                    first: i,
                    second: j,
                    overlap_minutes: (overlap_end - overlap_start).num_minutes(),
                });
            }
        }
    }

    overlaps
}

/// Per-entry validity of a day's working intervals as entered in the
/// schedule form.
///
/// An entry is valid when it has positive length and does not overlap any
/// other valid entry.
pub fn validate_working_intervals<T: Bounded>(intervals: &[T]) -> Vec<bool> {
    let mut valid: Vec<bool> = intervals.iter().map(|i| interval::is_valid(i)).collect();
    for overlap in find_overlaps(intervals) {
        valid[overlap.first] = false;
        valid[overlap.second] = false;
    }
    valid
}
