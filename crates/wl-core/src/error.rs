//! Error taxonomy for a worklog aggregation run.

use chrono::{DateTime, FixedOffset, NaiveDate};
use thiserror::Error;

/// Errors that abort an aggregation run.
///
/// No partial report is produced once one of these is returned.
#[derive(Debug, Error)]
pub enum WorklogError {
    /// An event endpoint or range bound is not an ISO-8601 date or date-time.
    #[error("malformed timestamp {value:?}: expected YYYY-MM-DD or an ISO 8601 date-time")]
    MalformedTimestamp { value: String },

    /// No calendar matched the requested name.
    #[error("calendar {name:?} not found")]
    CalendarNotFound {
        name: String,
        /// Display names of the calendars that were available.
        available: Vec<String>,
    },

    /// The calendar source failed to list calendars or deliver a page.
    #[error("failed to fetch from calendar source: {0}")]
    UpstreamFetch(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// An event ends before it starts and the anomaly policy is `abort`.
    #[error("event on {day} ends before it starts ({start} > {end})")]
    AnomalousDuration {
        day: NaiveDate,
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    },

    /// The resolved range is empty or inverted.
    #[error("invalid range: start {start} is not before end {end}")]
    InvalidRange {
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    },

    /// An hourly rate that is negative or not a finite number.
    #[error("invalid hourly rate {value:?}: must be a finite, non-negative number")]
    InvalidRate { value: String },
}

impl WorklogError {
    /// Wraps a source error as an upstream failure, keeping it as `source()`.
    pub fn upstream<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::UpstreamFetch(Box::new(err))
    }
}

/// Result alias used across the crate.
pub type Result<T, E = WorklogError> = std::result::Result<T, E>;
