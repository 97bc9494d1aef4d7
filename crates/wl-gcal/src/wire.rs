//! Google Calendar v3 response payloads and their mapping to core types.

use serde::Deserialize;
use wl_core::{CalendarEntry, CalendarEvent, EventEndpoint, EventStatus};

use crate::GcalError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CalendarListResponse {
    #[serde(default)]
    pub items: Vec<CalendarListEntry>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CalendarListEntry {
    id: String,
    #[serde(default)]
    summary: String,
    /// Name the user gave the calendar in their own list.
    summary_override: Option<String>,
}

impl From<CalendarListEntry> for CalendarEntry {
    fn from(entry: CalendarListEntry) -> Self {
        Self {
            id: entry.id,
            summary: entry
                .summary_override
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(entry.summary),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EventsResponse {
    #[serde(default)]
    pub items: Vec<GoogleEvent>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GoogleEvent {
    #[serde(default)]
    id: String,
    status: Option<String>,
    summary: Option<String>,
    description: Option<String>,
    start: Option<EventDateTime>,
    end: Option<EventDateTime>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventDateTime {
    date_time: Option<String>,
    date: Option<String>,
}

impl EventDateTime {
    fn into_endpoint(self) -> Option<EventEndpoint> {
        self.date_time
            .map(EventEndpoint::DateTime)
            .or_else(|| self.date.map(EventEndpoint::Date))
    }
}

impl GoogleEvent {
    /// Maps a wire event to a core event.
    ///
    /// Cancelled instances of recurring events may arrive without start/end;
    /// those are dropped here since they carry no time anyway.
    pub(crate) fn into_event(self) -> Result<Option<CalendarEvent>, GcalError> {
        let status = self.status.as_deref().and_then(|raw| {
            raw.parse::<EventStatus>()
                .inspect_err(|err| {
                    tracing::warn!(event_id = %self.id, %err, "ignoring event status");
                })
                .ok()
        });

        let start = self.start.and_then(EventDateTime::into_endpoint);
        let end = self.end.and_then(EventDateTime::into_endpoint);
        let (Some(start), Some(end)) = (start, end) else {
            if status == Some(EventStatus::Cancelled) {
                tracing::debug!(event_id = %self.id, "dropping cancelled event without times");
                return Ok(None);
            }
            return Err(GcalError::InvalidResponse(format!(
                "event {} is missing its start or end",
                self.id
            )));
        };

        Ok(Some(CalendarEvent {
            start,
            end,
            summary: self.summary,
            description: self.description,
            status,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> GoogleEvent {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn timed_event_maps_to_datetime_endpoints() {
        let event = parse(
            r#"{
                "id": "e1",
                "status": "confirmed",
                "summary": "Dev work",
                "start": {"dateTime": "2024-01-01T09:00:00+01:00", "timeZone": "Europe/Zagreb"},
                "end": {"dateTime": "2024-01-01T17:30:00+01:00"}
            }"#,
        )
        .into_event()
        .unwrap()
        .unwrap();

        assert_eq!(
            event.start,
            EventEndpoint::DateTime("2024-01-01T09:00:00+01:00".into())
        );
        assert_eq!(event.status, Some(EventStatus::Confirmed));
        assert_eq!(event.summary.as_deref(), Some("Dev work"));
    }

    #[test]
    fn all_day_event_maps_to_date_endpoints() {
        let event = parse(
            r#"{"id": "e2", "start": {"date": "2024-01-01"}, "end": {"date": "2024-01-02"}}"#,
        )
        .into_event()
        .unwrap()
        .unwrap();
        assert_eq!(event.start, EventEndpoint::Date("2024-01-01".into()));
        assert_eq!(event.end, EventEndpoint::Date("2024-01-02".into()));
    }

    #[test]
    fn cancelled_event_without_times_is_dropped() {
        let event = parse(r#"{"id": "e3", "status": "cancelled"}"#);
        assert!(event.into_event().unwrap().is_none());
    }

    #[test]
    fn cancelled_event_with_times_is_kept() {
        let event = parse(
            r#"{"id": "e4", "status": "cancelled",
                "start": {"date": "2024-01-01"}, "end": {"date": "2024-01-02"}}"#,
        )
        .into_event()
        .unwrap()
        .unwrap();
        assert!(event.is_cancelled());
    }

    #[test]
    fn confirmed_event_without_times_is_invalid() {
        let err = parse(r#"{"id": "e5", "status": "confirmed"}"#)
            .into_event()
            .unwrap_err();
        assert!(matches!(err, GcalError::InvalidResponse(_)));
    }

    #[test]
    fn unknown_status_is_ignored() {
        let event = parse(
            r#"{"id": "e6", "status": "mystery",
                "start": {"date": "2024-01-01"}, "end": {"date": "2024-01-02"}}"#,
        )
        .into_event()
        .unwrap()
        .unwrap();
        assert!(event.status.is_none());
    }

    #[test]
    fn calendar_entry_prefers_summary_override() {
        let entry: CalendarListEntry = serde_json::from_str(
            r#"{"id": "c1", "summary": "Team", "summaryOverride": "ACME project"}"#,
        )
        .unwrap();
        assert_eq!(CalendarEntry::from(entry).summary, "ACME project");
    }
}
