//! Calendar events as delivered by a calendar source.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One end of an event: a whole-day date or a date-time.
///
/// Raw text is kept as delivered; parsing happens when the event is folded so
/// that a bad value surfaces as a `MalformedTimestamp` for that event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum EventEndpoint {
    /// A civil date (`YYYY-MM-DD`) of an all-day event.
    Date(String),
    /// An ISO 8601 date-time, with or without a UTC offset.
    DateTime(String),
}

impl EventEndpoint {
    /// Returns the raw text of the endpoint.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Date(value) | Self::DateTime(value) => value,
        }
    }
}

/// Lifecycle status of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventStatus {
    Confirmed,
    Tentative,
    Cancelled,
}

impl EventStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Confirmed => "confirmed",
            Self::Tentative => "tentative",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EventStatus {
    type Err = UnknownEventStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "confirmed" => Ok(Self::Confirmed),
            "tentative" => Ok(Self::Tentative),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            _ => Err(UnknownEventStatus(s.to_string())),
        }
    }
}

impl Serialize for EventStatus {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EventStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Error type for unknown event status strings.
#[derive(Debug, Clone)]
pub struct UnknownEventStatus(String);

impl fmt::Display for UnknownEventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown event status: {}", self.0)
    }
}

impl std::error::Error for UnknownEventStatus {}

/// A single calendar event instance.
///
/// Recurring events are expected to arrive already expanded into instances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub start: EventEndpoint,
    pub end: EventEndpoint,
    /// Event title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Free-form event body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<EventStatus>,
}

impl CalendarEvent {
    /// Returns true if the event was cancelled and must not be billed.
    pub fn is_cancelled(&self) -> bool {
        self.status == Some(EventStatus::Cancelled)
    }

    /// Text used for the worklog: description, then summary, then `"unknown"`.
    ///
    /// Blank values are skipped; the result is trimmed.
    pub fn worklog_text(&self) -> &str {
        [self.description.as_deref(), self.summary.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|text| !text.is_empty())
            .unwrap_or("unknown")
    }
}

/// One page of events plus the token for the next page, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventPage {
    pub items: Vec<CalendarEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

/// A calendar the caller has access to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEntry {
    /// Source-specific calendar identifier.
    pub id: String,
    /// Display name used for lookup.
    pub summary: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(summary: Option<&str>, description: Option<&str>) -> CalendarEvent {
        CalendarEvent {
            start: EventEndpoint::DateTime("2024-01-01T09:00:00".into()),
            end: EventEndpoint::DateTime("2024-01-01T10:00:00".into()),
            summary: summary.map(Into::into),
            description: description.map(Into::into),
            status: None,
        }
    }

    #[test]
    fn worklog_text_prefers_description() {
        let e = event(Some("Title"), Some("  Body text "));
        assert_eq!(e.worklog_text(), "Body text");
    }

    #[test]
    fn worklog_text_falls_back_to_summary() {
        assert_eq!(event(Some(" Title "), None).worklog_text(), "Title");
        assert_eq!(event(Some("Title"), Some("   ")).worklog_text(), "Title");
    }

    #[test]
    fn worklog_text_defaults_to_unknown() {
        assert_eq!(event(None, None).worklog_text(), "unknown");
        assert_eq!(event(Some(""), Some("\n")).worklog_text(), "unknown");
    }

    #[test]
    fn status_parses_both_spellings_of_cancelled() {
        assert_eq!("cancelled".parse::<EventStatus>().unwrap(), EventStatus::Cancelled);
        assert_eq!("canceled".parse::<EventStatus>().unwrap(), EventStatus::Cancelled);
    }

    #[test]
    fn unknown_status_errors() {
        let err = "postponed".parse::<EventStatus>().unwrap_err();
        assert_eq!(err.to_string(), "unknown event status: postponed");
    }

    #[test]
    fn event_deserializes_with_optional_fields_missing() {
        let json = r#"{
            "start": {"kind": "date", "value": "2024-01-01"},
            "end": {"kind": "date", "value": "2024-01-02"}
        }"#;
        let parsed: CalendarEvent = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.start, EventEndpoint::Date("2024-01-01".into()));
        assert!(parsed.status.is_none());
        assert!(!parsed.is_cancelled());
    }

    #[test]
    fn cancelled_status_is_detected() {
        let mut e = event(Some("Standup"), None);
        e.status = Some(EventStatus::Cancelled);
        assert!(e.is_cancelled());
    }
}
