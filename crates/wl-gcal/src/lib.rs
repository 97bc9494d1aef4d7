//! Google Calendar API integration for calendar billing.
//!
//! Provides:
//! - An async [`Client`] for the calendar list and paginated event listing
//! - A [`BlockingClient`] implementing the `wl-core` source traits
//!
//! Authentication is a bearer access token supplied by the caller; obtaining
//! or refreshing it is out of scope.

mod blocking;
mod wire;

use std::fmt;
use std::time::Duration;

use chrono::SecondsFormat;
use reqwest::Url;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use wl_core::{CalendarEntry, DateRange, EventPage};

pub use blocking::BlockingClient;

/// Default request timeout for API calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const GOOGLE_CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";
/// Largest page size the events endpoint accepts without clamping.
const EVENTS_PAGE_SIZE: u32 = 250;

/// Google Calendar client errors.
#[derive(Debug, Error)]
pub enum GcalError {
    /// The provided access token was invalid.
    #[error("invalid access token: {reason}")]
    InvalidAccessToken { reason: &'static str },
    /// The API base URL cannot be used to build request URLs.
    #[error("invalid API base URL {url:?}")]
    InvalidBaseUrl { url: String },
    /// Failed to build HTTP client.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    /// Failed to start the runtime backing the blocking client.
    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),
    /// HTTP request failed.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// API returned an error response.
    #[error("Google Calendar API error ({status}): {message}")]
    Api { status: u16, message: String },
    /// Failed to parse response.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Google Calendar v3 client.
///
/// # Thread Safety
///
/// The client is safe to clone and share across threads. Each clone shares
/// the underlying HTTP connection pool.
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    access_token: String,
    base_url: Url,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url.as_str())
            .field("access_token", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Creates a client for the public Google endpoint with default timeout.
    pub fn new(access_token: impl Into<String>) -> Result<Self, GcalError> {
        Self::with_options(access_token, GOOGLE_CALENDAR_API_BASE, DEFAULT_TIMEOUT)
    }

    /// Creates a client against a specific API base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is empty or whitespace-only, if the base
    /// URL cannot carry path segments, or if the HTTP client fails to build.
    pub fn with_options(
        access_token: impl Into<String>,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, GcalError> {
        let access_token = access_token.into();

        if access_token.is_empty() {
            return Err(GcalError::InvalidAccessToken {
                reason: "access token cannot be empty",
            });
        }
        if access_token.trim().is_empty() {
            return Err(GcalError::InvalidAccessToken {
                reason: "access token cannot be whitespace-only",
            });
        }

        let base_url = Url::parse(base_url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| GcalError::InvalidBaseUrl {
                url: base_url.to_string(),
            })?;

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(GcalError::ClientBuild)?;

        Ok(Self {
            http,
            access_token,
            base_url,
        })
    }

    /// Lists every calendar on the user's calendar list, following pagination.
    pub async fn list_calendars(&self) -> Result<Vec<CalendarEntry>, GcalError> {
        let url = self.endpoint(&["users", "me", "calendarList"]);
        let mut calendars = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = Vec::new();
            if let Some(token) = &page_token {
                query.push(("pageToken", token.clone()));
            }
            let page: wire::CalendarListResponse = self.get(url.clone(), &query).await?;
            calendars.extend(page.items.into_iter().map(CalendarEntry::from));

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        tracing::debug!(count = calendars.len(), "listed calendars");
        Ok(calendars)
    }

    /// Fetches one page of event instances overlapping `range`.
    ///
    /// Recurring events are expanded server-side (`singleEvents=true`).
    pub async fn list_events(
        &self,
        calendar_id: &str,
        range: &DateRange,
        page_token: Option<&str>,
    ) -> Result<EventPage, GcalError> {
        let url = self.endpoint(&["calendars", calendar_id, "events"]);
        let mut query = vec![
            (
                "timeMin",
                range.start.to_rfc3339_opts(SecondsFormat::Secs, true),
            ),
            (
                "timeMax",
                range.end.to_rfc3339_opts(SecondsFormat::Secs, true),
            ),
            ("singleEvents", "true".to_string()),
            ("orderBy", "startTime".to_string()),
            ("maxResults", EVENTS_PAGE_SIZE.to_string()),
        ];
        if let Some(token) = page_token {
            query.push(("pageToken", token.to_string()));
        }

        let response: wire::EventsResponse = self.get(url, &query).await?;
        let mut items = Vec::with_capacity(response.items.len());
        for event in response.items {
            if let Some(event) = event.into_event()? {
                items.push(event);
            }
        }

        tracing::debug!(
            calendar_id,
            events = items.len(),
            has_next = response.next_page_token.is_some(),
            "fetched events page"
        );
        Ok(EventPage {
            items,
            next_page_token: response.next_page_token,
        })
    }

    /// Appends percent-encoded path segments to the base URL.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // `with_options` rejects cannot-be-a-base URLs.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
    ) -> Result<T, GcalError> {
        tracing::debug!(path = url.path(), "GET");
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.access_token)
            .query(query)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(parse_api_error(status.as_u16(), &body).unwrap_or_else(|| {
                GcalError::Api {
                    status: status.as_u16(),
                    message: body.trim().to_string(),
                }
            }));
        }

        serde_json::from_str(&body).map_err(|err| GcalError::InvalidResponse(err.to_string()))
    }
}

fn parse_api_error(status: u16, body: &str) -> Option<GcalError> {
    #[derive(Deserialize)]
    struct ErrorPayload {
        error: ErrorDetails,
    }

    #[derive(Deserialize)]
    struct ErrorDetails {
        message: String,
    }

    serde_json::from_str::<ErrorPayload>(body)
        .ok()
        .map(|payload| GcalError::Api {
            status,
            message: payload.error.message,
        })
}
