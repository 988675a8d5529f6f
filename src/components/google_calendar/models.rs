use crate::agenda::{CalendarEvent, CalendarInfo, EventAnomaly};
use chrono::DateTime;
use serde::Deserialize;

/// Label used when an event has no summary
pub const UNTITLED_EVENT: &str = "(No title)";

/// One page of `GET /calendars/{id}/events`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsPage {
    #[serde(default)]
    pub items: Vec<ApiEvent>,
    pub next_page_token: Option<String>,
}

/// Event resource as returned by the Calendar v3 API
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEvent {
    #[serde(default)]
    pub id: String,
    pub status: Option<String>,
    pub summary: Option<String>,
    pub start: Option<ApiEventTime>,
    pub end: Option<ApiEventTime>,
}

/// `start` / `end` object: `dateTime` for timed events, `date` for all-day ones
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEventTime {
    pub date_time: Option<String>,
    pub date: Option<String>,
}

impl ApiEvent {
    pub fn is_cancelled(&self) -> bool {
        self.status.as_deref() == Some("cancelled")
    }

    /// Convert to the domain event, rejecting inconsistent timestamps
    pub fn to_calendar_event(&self) -> Result<CalendarEvent, EventAnomaly> {
        let summary = self
            .summary
            .clone()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| UNTITLED_EVENT.to_string());

        let start = self.start.as_ref().and_then(|t| t.date_time.as_deref());
        let end = self.end.as_ref().and_then(|t| t.date_time.as_deref());

        match (start, end) {
            (Some(start), Some(end)) => CalendarEvent::timed(summary, parse(start)?, parse(end)?),
            (None, None) => Ok(CalendarEvent::all_day(summary)),
            (Some(_), None) => Err(EventAnomaly::HalfTimed {
                present: "start",
                missing: "end",
            }),
            (None, Some(_)) => Err(EventAnomaly::HalfTimed {
                present: "end",
                missing: "start",
            }),
        }
    }
}

fn parse(timestamp: &str) -> Result<DateTime<chrono::FixedOffset>, EventAnomaly> {
    DateTime::parse_from_rfc3339(timestamp).map_err(|_| EventAnomaly::BadTimestamp(timestamp.to_string()))
}

/// One page of `GET /users/me/calendarList`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarListPage {
    #[serde(default)]
    pub items: Vec<ApiCalendarListEntry>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCalendarListEntry {
    pub id: String,
    #[serde(default)]
    pub summary: String,
}

impl From<ApiCalendarListEntry> for CalendarInfo {
    fn from(entry: ApiCalendarListEntry) -> Self {
        CalendarInfo {
            id: entry.id,
            summary: entry.summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agenda::EventTime;
    use serde_json::json;

    fn event(value: serde_json::Value) -> ApiEvent {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_timed_event() {
        let api = event(json!({
            "id": "abc",
            "status": "confirmed",
            "summary": "Standup",
            "start": { "dateTime": "2024-05-01T09:00:00+09:00", "timeZone": "Asia/Tokyo" },
            "end": { "dateTime": "2024-05-01T10:30:00+09:00", "timeZone": "Asia/Tokyo" }
        }));

        let converted = api.to_calendar_event().unwrap();
        assert_eq!(converted.summary, "Standup");
        match converted.time {
            EventTime::Timed { start, end } => assert_eq!((end - start).num_minutes(), 90),
            EventTime::AllDay => panic!("expected a timed event"),
        }
    }

    #[test]
    fn test_all_day_event() {
        let api = event(json!({
            "id": "bday",
            "summary": "Birthday",
            "start": { "date": "2024-05-01" },
            "end": { "date": "2024-05-02" }
        }));

        assert_eq!(api.to_calendar_event().unwrap(), CalendarEvent::all_day("Birthday"));
    }

    #[test]
    fn test_missing_summary() {
        let api = event(json!({
            "id": "x",
            "start": { "date": "2024-05-01" },
            "end": { "date": "2024-05-02" }
        }));

        assert_eq!(api.to_calendar_event().unwrap().summary, UNTITLED_EVENT);
    }

    #[test]
    fn test_anomalies() {
        let half = event(json!({
            "id": "half",
            "summary": "Half",
            "start": { "dateTime": "2024-05-01T09:00:00+09:00" },
            "end": { "date": "2024-05-01" }
        }));
        let reversed = event(json!({
            "id": "rev",
            "summary": "Reversed",
            "start": { "dateTime": "2024-05-01T11:00:00+09:00" },
            "end": { "dateTime": "2024-05-01T10:00:00+09:00" }
        }));
        let garbled = event(json!({
            "id": "bad",
            "summary": "Bad",
            "start": { "dateTime": "yesterday" },
            "end": { "dateTime": "2024-05-01T10:00:00+09:00" }
        }));

        assert!(matches!(half.to_calendar_event(), Err(EventAnomaly::HalfTimed { .. })));
        assert!(matches!(reversed.to_calendar_event(), Err(EventAnomaly::EndBeforeStart { .. })));
        assert!(matches!(garbled.to_calendar_event(), Err(EventAnomaly::BadTimestamp(_))));
    }

    #[test]
    fn test_pages() {
        let page: EventsPage = serde_json::from_value(json!({
            "kind": "calendar#events",
            "items": [
                { "id": "1", "status": "cancelled" },
                { "id": "2", "summary": "Kept", "start": { "date": "2024-05-01" }, "end": { "date": "2024-05-02" } }
            ],
            "nextPageToken": "next"
        }))
        .unwrap();

        assert_eq!(page.items.len(), 2);
        assert!(page.items[0].is_cancelled());
        assert_eq!(page.next_page_token.as_deref(), Some("next"));

        let calendars: CalendarListPage = serde_json::from_value(json!({
            "items": [{ "id": "primary@example.com", "summary": "Me", "accessRole": "owner" }]
        }))
        .unwrap();
        let info: CalendarInfo = calendars.items[0].clone().into();
        assert_eq!(info.id, "primary@example.com");
        assert!(calendars.next_page_token.is_none());
    }
}
