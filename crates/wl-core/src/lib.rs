//! Core worklog aggregation for calendar billing.
//!
//! This crate contains the fundamental types and logic for:
//! - Timestamp normalization: all-day dates and date-times to zoned instants
//! - Worklog folding: per-day minutes and merged descriptions, hourly rounding
//! - Billing: pricing period totals at an hourly rate
//! - Aggregation: sequencing the above against a pluggable calendar source

pub mod aggregate;
pub mod billing;
mod error;
pub mod event;
pub mod range;
pub mod source;
pub mod timestamp;
pub mod worklog;

pub use aggregate::{Report, ReportRequest, Stage, aggregate};
pub use billing::{Billing, HourlyRate};
pub use error::{Result, WorklogError};
pub use event::{CalendarEntry, CalendarEvent, EventEndpoint, EventPage, EventStatus};
pub use range::{DateRange, resolve_range};
pub use source::{CalendarDirectory, EventPages, EventSource, resolve_calendar_id};
pub use worklog::{
    AnomalyPolicy, DailySummary, DayAccumulator, FoldStats, PeriodTotals, Worklog, summarize,
};
