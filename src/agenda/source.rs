use super::models::CalendarEvent;
use super::window::TimeWindow;
use crate::error::GcalResult;
use async_trait::async_trait;

/// Something that can list the events of one calendar for a day
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Events whose start falls inside `window`, recurring events expanded,
    /// ordered by start time.
    async fn list_events(&self, calendar_id: &str, window: &TimeWindow) -> GcalResult<Vec<CalendarEvent>>;
}

/// A calendar the user can read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarInfo {
    pub id: String,
    pub summary: String,
}

/// Something that can enumerate the user's calendars
#[async_trait]
pub trait CalendarCatalog: Send + Sync {
    async fn list_calendars(&self) -> GcalResult<Vec<CalendarInfo>>;
}
