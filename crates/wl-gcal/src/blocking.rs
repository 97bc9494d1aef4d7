//! Blocking adapter exposing [`Client`] through the `wl-core` source traits.

use std::fmt;

use tokio::runtime::{Builder, Runtime};
use wl_core::{CalendarDirectory, CalendarEntry, DateRange, EventPage, EventSource};

use crate::{Client, GcalError};

/// Runs [`Client`] requests to completion on a private current-thread runtime.
///
/// Must not be used from within another tokio runtime.
pub struct BlockingClient {
    client: Client,
    runtime: Runtime,
}

impl fmt::Debug for BlockingClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockingClient")
            .field("client", &self.client)
            .finish_non_exhaustive()
    }
}

impl BlockingClient {
    pub fn new(client: Client) -> Result<Self, GcalError> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(GcalError::Runtime)?;
        Ok(Self { client, runtime })
    }
}

impl CalendarDirectory for BlockingClient {
    type Error = GcalError;

    fn list_calendars(&self) -> Result<Vec<CalendarEntry>, GcalError> {
        self.runtime.block_on(self.client.list_calendars())
    }
}

impl EventSource for BlockingClient {
    type Error = GcalError;

    fn fetch_page(
        &self,
        calendar_id: &str,
        range: &DateRange,
        page_token: Option<&str>,
    ) -> Result<EventPage, GcalError> {
        self.runtime
            .block_on(self.client.list_events(calendar_id, range, page_token))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::{TimeZone, Utc};
    use wiremock::matchers::{method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};
    use wl_core::{AnomalyPolicy, ReportRequest};

    use super::*;

    fn event(start: &str, end: &str, summary: &str) -> serde_json::Value {
        serde_json::json!({
            "id": summary,
            "summary": summary,
            "start": {"dateTime": start},
            "end": {"dateTime": end}
        })
    }

    #[test]
    fn aggregates_across_pages_through_core_traits() {
        // The mock server lives on its own runtime; the blocking client
        // drives its own.
        let server_runtime = tokio::runtime::Runtime::new().unwrap();
        let server = server_runtime.block_on(async {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path("/users/me/calendarList"))
                .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                    "items": [{"id": "acme@group.calendar.google.com", "summary": "ACME"}]
                })))
                .mount(&server)
                .await;
            Mock::given(method("GET"))
                .and(path("/calendars/acme@group.calendar.google.com/events"))
                .and(query_param_is_missing("pageToken"))
                .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                    "items": [event("2024-01-01T09:00:00Z", "2024-01-01T10:15:00Z", "Call")],
                    "nextPageToken": "2"
                })))
                .mount(&server)
                .await;
            Mock::given(method("GET"))
                .and(path("/calendars/acme@group.calendar.google.com/events"))
                .and(query_param("pageToken", "2"))
                .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                    "items": [event("2024-01-01T14:00:00Z", "2024-01-01T15:00:00Z", "Review")]
                })))
                .mount(&server)
                .await;
            server
        });

        let client =
            Client::with_options("token", &server.uri(), Duration::from_secs(5)).unwrap();
        let blocking = BlockingClient::new(client).unwrap();
        let request = ReportRequest {
            calendar: "acme".into(),
            start: Some("2024-01-01T00:00:00Z".into()),
            end: Some("2024-02-01T00:00:00Z".into()),
            hourly_rate: None,
            anomaly_policy: AnomalyPolicy::Clamp,
        };
        let now = Utc.with_ymd_and_hms(2024, 2, 15, 0, 0, 0).unwrap();

        let report = wl_core::aggregate(&blocking, &request, now, &Utc).unwrap();

        assert_eq!(report.calendar_id, "acme@group.calendar.google.com");
        assert_eq!(report.worklog.days.len(), 1);
        assert_eq!(report.worklog.days[0].hours, 3);
        assert_eq!(report.worklog.days[0].description, "Call, Review");
        assert_eq!(report.stats.pages, 2);
    }
}
