use super::models::{CalendarListPage, EventsPage};
use crate::agenda::{CalendarCatalog, CalendarEvent, CalendarInfo, EventSource, TimeWindow};
use crate::error::{google_calendar_error, GcalResult};
use async_trait::async_trait;
use chrono::SecondsFormat;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

/// Root of the Calendar v3 REST API
pub const API_BASE_URL: &str = "https://www.googleapis.com/calendar/v3/";

/// Upper bound the API accepts for `maxResults` on events
const PAGE_SIZE: &str = "250";

/// Read-only Google Calendar client holding an authorized access token
#[derive(Clone)]
pub struct GoogleCalendarClient {
    client: Client,
    access_token: String,
    base_url: Url,
}

impl GoogleCalendarClient {
    pub fn new(access_token: impl Into<String>) -> GcalResult<Self> {
        let base_url = Url::parse(API_BASE_URL)
            .map_err(|e| google_calendar_error(&format!("Failed to parse URL: {}", e)))?;
        Ok(Self::with_base_url(access_token, base_url))
    }

    /// Point the client at another API root
    pub fn with_base_url(access_token: impl Into<String>, base_url: Url) -> Self {
        Self {
            client: Client::new(),
            access_token: access_token.into(),
            base_url,
        }
    }

    /// Build `<base>/<segments...>`, percent-encoding each segment
    fn endpoint(&self, segments: &[&str]) -> GcalResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| google_calendar_error("API base URL cannot be a base"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> GcalResult<T> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| google_calendar_error(&format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(google_calendar_error(&format!("HTTP {} - {}", status, error_body)));
        }

        response
            .json()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to parse response: {}", e)))
    }
}

#[async_trait]
impl EventSource for GoogleCalendarClient {
    async fn list_events(&self, calendar_id: &str, window: &TimeWindow) -> GcalResult<Vec<CalendarEvent>> {
        let time_min = window.start.fixed_offset().to_rfc3339_opts(SecondsFormat::AutoSi, false);
        let time_max = window.end.fixed_offset().to_rfc3339_opts(SecondsFormat::AutoSi, false);

        let mut events = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = self.endpoint(&["calendars", calendar_id, "events"])?;
            {
                let mut query = url.query_pairs_mut();
                query
                    .append_pair("timeMin", &time_min)
                    .append_pair("timeMax", &time_max)
                    .append_pair("singleEvents", "true")
                    .append_pair("orderBy", "startTime")
                    .append_pair("maxResults", PAGE_SIZE);
                if let Some(token) = &page_token {
                    query.append_pair("pageToken", token);
                }
            }

            let page: EventsPage = self.get_json(url).await?;
            debug!("Fetched {} item(s) from {}", page.items.len(), calendar_id);

            for item in page.items.iter().filter(|item| !item.is_cancelled()) {
                match item.to_calendar_event() {
                    Ok(event) => events.push(event),
                    Err(anomaly) => warn!(
                        "Skipping event {} ({}) in calendar {}: {}",
                        item.id,
                        item.summary.as_deref().unwrap_or("untitled"),
                        calendar_id,
                        anomaly
                    ),
                }
            }

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(events)
    }
}

#[async_trait]
impl CalendarCatalog for GoogleCalendarClient {
    async fn list_calendars(&self) -> GcalResult<Vec<CalendarInfo>> {
        let mut calendars = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = self.endpoint(&["users", "me", "calendarList"])?;
            if let Some(token) = &page_token {
                url.query_pairs_mut().append_pair("pageToken", token);
            }

            let page: CalendarListPage = self.get_json(url).await?;
            calendars.extend(page.items.into_iter().map(CalendarInfo::from));

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(calendars)
    }
}
