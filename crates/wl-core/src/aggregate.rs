//! Aggregation run: range → fetch → reduce → summarize → price.

use std::fmt;

use chrono::{DateTime, TimeZone};
use serde::Serialize;

use crate::billing::{self, Billing, HourlyRate};
use crate::error::Result;
use crate::range::{self, DateRange};
use crate::source::{self, CalendarDirectory, EventPages, EventSource};
use crate::worklog::{self, AnomalyPolicy, DayAccumulator, FoldStats, Worklog};

/// Stages of a run, entered strictly in order and at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    ResolvingRange,
    Fetching,
    Reducing,
    Summarizing,
    Pricing,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::ResolvingRange => "resolving_range",
            Self::Fetching => "fetching",
            Self::Reducing => "reducing",
            Self::Summarizing => "summarizing",
            Self::Pricing => "pricing",
            Self::Done => "done",
        };
        write!(f, "{s}")
    }
}

/// What the caller asked for.
#[derive(Debug, Clone, Default)]
pub struct ReportRequest {
    /// Calendar display name, or `primary`/`default`.
    pub calendar: String,
    /// Inclusive start bound; defaults to one month before now.
    pub start: Option<String>,
    /// Exclusive end bound; defaults to now.
    pub end: Option<String>,
    pub hourly_rate: Option<HourlyRate>,
    pub anomaly_policy: AnomalyPolicy,
}

/// Outcome of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub calendar: String,
    pub calendar_id: String,
    pub range: DateRange,
    pub worklog: Worklog,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing: Option<Billing>,
    pub stats: FoldStats,
}

struct Progress {
    stage: Stage,
}

impl Progress {
    fn advance(&mut self, next: Stage) {
        debug_assert!(next > self.stage, "stage {next} entered after {}", self.stage);
        tracing::debug!(from = %self.stage, to = %next, "aggregation stage");
        self.stage = next;
    }
}

/// Runs one aggregation against `source`.
///
/// `now` anchors the default range; naive timestamps are localized in `tz`.
/// Any error aborts the run without a partial report.
pub fn aggregate<S, Tz>(
    source: &S,
    request: &ReportRequest,
    now: DateTime<Tz>,
    tz: &Tz,
) -> Result<Report>
where
    S: CalendarDirectory + EventSource + ?Sized,
    Tz: TimeZone,
{
    let mut progress = Progress {
        stage: Stage::ResolvingRange,
    };
    let range = range::resolve_range(request.start.as_deref(), request.end.as_deref(), now, tz)?;
    tracing::info!(
        calendar = %request.calendar,
        start = %range.start,
        end = %range.end,
        "aggregating worklog"
    );

    progress.advance(Stage::Fetching);
    let calendar_id = source::resolve_calendar_id(source, &request.calendar)?;
    let pages = EventPages::new(source, &calendar_id, &range);

    progress.advance(Stage::Reducing);
    let acc = DayAccumulator::new(request.anomaly_policy).within(range);
    let acc = worklog::fold_pages(acc, pages, tz)?;
    let stats = acc.stats();
    tracing::debug!(?stats, "folded events");

    progress.advance(Stage::Summarizing);
    let worklog = worklog::summarize(acc);

    progress.advance(Stage::Pricing);
    let billing = billing::price(&worklog.totals, request.hourly_rate);

    progress.advance(Stage::Done);
    Ok(Report {
        calendar: request.calendar.clone(),
        calendar_id,
        range,
        worklog,
        billing,
        stats,
    })
}
