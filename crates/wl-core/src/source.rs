//! Calendar source capabilities and pagination.
//!
//! The aggregation never talks to a calendar service directly; it is handed a
//! value implementing [`CalendarDirectory`] and [`EventSource`]. Production
//! code passes an HTTP client, tests pass canned pages.

use crate::error::{Result, WorklogError};
use crate::event::{CalendarEntry, EventPage};
use crate::range::DateRange;

/// Identifier of the account's primary calendar.
pub const PRIMARY_CALENDAR_ID: &str = "primary";

/// Lists the calendars the caller can read.
pub trait CalendarDirectory {
    type Error: std::error::Error + Send + Sync + 'static;

    fn list_calendars(&self) -> Result<Vec<CalendarEntry>, Self::Error>;
}

/// Fetches one page of events for a calendar and range.
///
/// Implementations must return recurring events expanded into instances.
pub trait EventSource {
    type Error: std::error::Error + Send + Sync + 'static;

    fn fetch_page(
        &self,
        calendar_id: &str,
        range: &DateRange,
        page_token: Option<&str>,
    ) -> Result<EventPage, Self::Error>;
}

/// Resolves a calendar name to its identifier.
///
/// `primary` and `default` (any case) resolve to the primary calendar without
/// listing. Otherwise the name must match a calendar's display name exactly,
/// ignoring case.
pub fn resolve_calendar_id<D>(directory: &D, name: &str) -> Result<String>
where
    D: CalendarDirectory + ?Sized,
{
    let wanted = name.trim();
    if wanted.eq_ignore_ascii_case("primary") || wanted.eq_ignore_ascii_case("default") {
        return Ok(PRIMARY_CALENDAR_ID.to_string());
    }

    let calendars = directory
        .list_calendars()
        .map_err(WorklogError::upstream)?;
    let wanted_lower = wanted.to_lowercase();

    if let Some(found) = calendars
        .iter()
        .find(|calendar| calendar.summary.to_lowercase() == wanted_lower)
    {
        tracing::debug!(name, id = %found.id, "resolved calendar");
        return Ok(found.id.clone());
    }

    Err(WorklogError::CalendarNotFound {
        name: name.to_string(),
        available: calendars.into_iter().map(|c| c.summary).collect(),
    })
}

/// Lazy sequence of event pages, driven by `next_page_token`.
///
/// Each call to `next` issues at most one request. After an error or the
/// last page the iterator is exhausted; restarting means building a new one.
pub struct EventPages<'a, S: ?Sized> {
    source: &'a S,
    calendar_id: &'a str,
    range: &'a DateRange,
    next_token: Option<String>,
    done: bool,
}

impl<'a, S> EventPages<'a, S>
where
    S: EventSource + ?Sized,
{
    pub const fn new(source: &'a S, calendar_id: &'a str, range: &'a DateRange) -> Self {
        Self {
            source,
            calendar_id,
            range,
            next_token: None,
            done: false,
        }
    }
}

impl<S> Iterator for EventPages<'_, S>
where
    S: EventSource + ?Sized,
{
    type Item = Result<EventPage>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let token = self.next_token.take();
        tracing::debug!(calendar_id = self.calendar_id, page_token = ?token, "fetching page");
        match self
            .source
            .fetch_page(self.calendar_id, self.range, token.as_deref())
        {
            Ok(page) => {
                self.next_token = page.next_page_token.clone().filter(|t| !t.is_empty());
                self.done = self.next_token.is_none();
                Some(Ok(page))
            }
            Err(err) => {
                self.done = true;
                Some(Err(WorklogError::upstream(err)))
            }
        }
    }
}
