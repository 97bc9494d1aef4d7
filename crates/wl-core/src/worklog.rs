//! Folding calendar events into a per-day worklog.
//!
//! # Algorithm Summary
//!
//! 1. Skip cancelled events
//! 2. Normalize start and end, drop events starting outside the period, key
//!    the event by the civil date of its start
//! 3. Add the floored duration in minutes to that day, append its description
//! 4. Summarize: round each day up to whole hours, cap at 24, total the period
//!
//! An event that crosses midnight is attributed wholly to its start day.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::error::{Result, WorklogError};
use crate::event::{CalendarEvent, EventPage};
use crate::range::DateRange;
use crate::timestamp;

/// Billed hours never exceed this per day.
pub const DAILY_CAP_HOURS: u32 = 24;

const DESCRIPTION_SEPARATOR: &str = ", ";

/// What to do with an event that ends before it starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AnomalyPolicy {
    /// Count the event as zero minutes but keep its description.
    #[default]
    Clamp,
    /// Drop the event entirely.
    Skip,
    /// Fail the run with `AnomalousDuration`.
    Abort,
}

impl AnomalyPolicy {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Clamp => "clamp",
            Self::Skip => "skip",
            Self::Abort => "abort",
        }
    }
}

impl fmt::Display for AnomalyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AnomalyPolicy {
    type Err = UnknownAnomalyPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "clamp" => Ok(Self::Clamp),
            "skip" => Ok(Self::Skip),
            "abort" => Ok(Self::Abort),
            _ => Err(UnknownAnomalyPolicy(s.to_string())),
        }
    }
}

impl Serialize for AnomalyPolicy {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for AnomalyPolicy {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Error type for unknown anomaly policy strings.
#[derive(Debug, Clone)]
pub struct UnknownAnomalyPolicy(String);

impl fmt::Display for UnknownAnomalyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown anomaly policy: {} (expected clamp, skip or abort)",
            self.0
        )
    }
}

impl std::error::Error for UnknownAnomalyPolicy {}

/// Accumulated work for one day.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DayEntry {
    pub minutes: u64,
    /// Contributing descriptions joined with `", "` in fold order.
    pub description: String,
}

impl DayEntry {
    fn merge(&mut self, minutes: u64, description: &str) {
        self.minutes += minutes;
        if !self.description.is_empty() {
            self.description.push_str(DESCRIPTION_SEPARATOR);
        }
        self.description.push_str(description);
    }
}

/// Counters collected while folding, for logging and reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FoldStats {
    /// Events merged into a day.
    pub folded: usize,
    /// Cancelled events that were skipped.
    pub cancelled: usize,
    /// Events that ended before they started.
    pub anomalies: usize,
    /// Events whose start fell outside the reporting period.
    pub out_of_range: usize,
    /// Pages pulled from the source.
    pub pages: usize,
}

/// Per-day accumulator keyed by the civil date of each event's start.
#[derive(Debug, Clone, Default)]
pub struct DayAccumulator {
    days: BTreeMap<NaiveDate, DayEntry>,
    stats: FoldStats,
    policy: AnomalyPolicy,
    range: Option<DateRange>,
}

impl DayAccumulator {
    /// Creates an empty accumulator using the given anomaly policy.
    pub fn new(policy: AnomalyPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Restricts folding to events whose normalized start lies in `range`.
    ///
    /// Sources may return events that merely overlap the period; those that
    /// started before it (or at its end) are counted and dropped.
    #[must_use]
    pub const fn within(mut self, range: DateRange) -> Self {
        self.range = Some(range);
        self
    }

    /// Folds one event in.
    pub fn fold_event<Tz: TimeZone>(&mut self, event: &CalendarEvent, tz: &Tz) -> Result<()> {
        if event.is_cancelled() {
            tracing::debug!(summary = ?event.summary, "skipping cancelled event");
            self.stats.cancelled += 1;
            return Ok(());
        }

        let start = timestamp::normalize(&event.start, tz)?;
        let end = timestamp::normalize(&event.end, tz)?;
        let day = start.date_naive();

        if self.range.is_some_and(|range| !range.contains(start)) {
            tracing::debug!(%start, summary = ?event.summary, "event starts outside the period");
            self.stats.out_of_range += 1;
            return Ok(());
        }

        let minutes = if end < start {
            self.stats.anomalies += 1;
            match self.policy {
                AnomalyPolicy::Abort => {
                    return Err(WorklogError::AnomalousDuration { day, start, end });
                }
                AnomalyPolicy::Skip => {
                    tracing::warn!(%day, %start, %end, "event ends before it starts, skipping");
                    return Ok(());
                }
                AnomalyPolicy::Clamp => {
                    tracing::warn!(
                        %day,
                        %start,
                        %end,
                        "event ends before it starts, counting zero minutes"
                    );
                    0
                }
            }
        } else {
            u64::try_from((end - start).num_minutes()).unwrap_or_default()
        };

        self.days
            .entry(day)
            .or_default()
            .merge(minutes, event.worklog_text());
        self.stats.folded += 1;
        Ok(())
    }

    /// Folds every event of a page in order.
    pub fn fold_page<Tz: TimeZone>(&mut self, page: &EventPage, tz: &Tz) -> Result<()> {
        self.stats.pages += 1;
        for event in &page.items {
            self.fold_event(event, tz)?;
        }
        Ok(())
    }

    /// Returns the accumulated entry for a day, if any event landed on it.
    pub fn get(&self, day: NaiveDate) -> Option<&DayEntry> {
        self.days.get(&day)
    }

    pub fn stats(&self) -> FoldStats {
        self.stats
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

/// Folds a lazy sequence of pages into a fresh [`DayAccumulator`].
///
/// Pages are pulled one at a time; the next page is not requested until the
/// previous one has been folded. The first failing page aborts the fold.
pub fn reduce_pages<I, Tz>(pages: I, tz: &Tz, policy: AnomalyPolicy) -> Result<DayAccumulator>
where
    I: IntoIterator<Item = Result<EventPage>>,
    Tz: TimeZone,
{
    fold_pages(DayAccumulator::new(policy), pages, tz)
}

/// Like [`reduce_pages`], folding into a caller-configured accumulator.
pub fn fold_pages<I, Tz>(mut acc: DayAccumulator, pages: I, tz: &Tz) -> Result<DayAccumulator>
where
    I: IntoIterator<Item = Result<EventPage>>,
    Tz: TimeZone,
{
    for page in pages {
        let page = page?;
        tracing::debug!(events = page.items.len(), "folding page");
        acc.fold_page(&page, tz)?;
    }
    Ok(acc)
}

/// Billed hours for one day: minutes rounded up to whole hours, capped at 24.
pub fn capped_hours(minutes: u64) -> u32 {
    let hours = minutes.div_ceil(60);
    u32::try_from(hours).map_or(DAILY_CAP_HOURS, |h| h.min(DAILY_CAP_HOURS))
}

/// One line of the worklog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailySummary {
    pub day: NaiveDate,
    pub hours: u32,
    pub description: String,
}

/// Totals over every summarized day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PeriodTotals {
    pub total_hours: u64,
    pub workdays: usize,
}

/// Summarized worklog for a period, ordered by day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Worklog {
    pub days: Vec<DailySummary>,
    pub totals: PeriodTotals,
}

/// Turns the accumulator into ordered daily summaries and period totals.
///
/// Days that accumulated zero minutes are left out.
pub fn summarize(acc: DayAccumulator) -> Worklog {
    let days: Vec<DailySummary> = acc
        .days
        .into_iter()
        .filter(|(_, entry)| entry.minutes > 0)
        .map(|(day, entry)| DailySummary {
            day,
            hours: capped_hours(entry.minutes),
            description: entry.description,
        })
        .collect();

    let totals = PeriodTotals {
        total_hours: days.iter().map(|d| u64::from(d.hours)).sum(),
        workdays: days.len(),
    };

    Worklog { days, totals }
}
