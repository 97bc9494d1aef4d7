//! Reporting period resolution.

use chrono::{DateTime, FixedOffset, Months, TimeZone};
use serde::Serialize;

use crate::error::{Result, WorklogError};
use crate::timestamp;

/// A half-open `[start, end)` reporting period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

impl DateRange {
    /// Creates a range, rejecting empty or inverted bounds.
    pub fn new(start: DateTime<FixedOffset>, end: DateTime<FixedOffset>) -> Result<Self> {
        if start >= end {
            return Err(WorklogError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Returns true if `instant` lies within the range.
    pub fn contains(&self, instant: DateTime<FixedOffset>) -> bool {
        instant >= self.start && instant < self.end
    }
}

/// Resolves caller-supplied bounds into a [`DateRange`].
///
/// A missing start defaults to one calendar month before `now`; a missing end
/// defaults to `now`. Bounds without an offset are localized in `tz`, and a
/// date-only bound means local midnight of that date.
pub fn resolve_range<Tz: TimeZone>(
    start: Option<&str>,
    end: Option<&str>,
    now: DateTime<Tz>,
    tz: &Tz,
) -> Result<DateRange> {
    let now = now.fixed_offset();
    let start = match start {
        Some(value) => timestamp::parse_instant(value, tz)?,
        // Only out-of-range dates near chrono's limits fail here.
        None => now.checked_sub_months(Months::new(1)).unwrap_or(now),
    };
    let end = match end {
        Some(value) => timestamp::parse_instant(value, tz)?,
        None => now,
    };
    DateRange::new(start, end)
}
