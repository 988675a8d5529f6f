use super::models::{CalendarEvent, EventTime, NormalizedEvent, Timeline};
use super::source::EventSource;
use super::window::TimeWindow;
use crate::error::{usage_error, Error, GcalResult};
use futures::future::try_join_all;
use tracing::debug;

/// Knobs for [`aggregate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregateOptions {
    /// Keep all-day events, placed at the window's midnight sentinel
    pub include_all_day: bool,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self {
            include_all_day: true,
        }
    }
}

/// Merge one day of events from several calendars into a single timeline.
///
/// Calendars are fetched concurrently. The first failing calendar aborts the
/// whole aggregation; no partial timeline is returned.
pub async fn aggregate<S>(
    calendar_ids: &[String],
    window: &TimeWindow,
    source: &S,
    options: AggregateOptions,
) -> GcalResult<Timeline>
where
    S: EventSource + ?Sized,
{
    let mut ids: Vec<&str> = Vec::with_capacity(calendar_ids.len());
    for id in calendar_ids {
        if !ids.contains(&id.as_str()) {
            ids.push(id.as_str());
        }
    }
    if ids.is_empty() {
        return Err(usage_error("No calendar ids given"));
    }

    debug!(
        "Aggregating {} calendar(s) between {} and {}",
        ids.len(),
        window.start,
        window.end
    );

    let fetches = ids.iter().map(|&calendar_id| async move {
        source
            .list_events(calendar_id, window)
            .await
            .map_err(|e| Error::SourceFetchFailed {
                calendar_id: calendar_id.to_string(),
                source: Box::new(e),
            })
    });

    // try_join_all yields results in input order, not completion order
    let per_calendar = try_join_all(fetches).await?;

    let mut normalized = Vec::new();
    for (calendar_id, events) in ids.iter().zip(per_calendar) {
        debug!("Calendar {} returned {} event(s)", calendar_id, events.len());
        normalized.extend(
            events
                .into_iter()
                .filter(|event| options.include_all_day || !event.is_all_day())
                .map(|event| normalize(event, window)),
        );
    }

    Ok(Timeline::new(normalized))
}

/// Express an event in the window's zone, giving all-day events the sentinel
pub fn normalize(event: CalendarEvent, window: &TimeWindow) -> NormalizedEvent {
    let zone = window.timezone();
    match event.time {
        EventTime::Timed { start, end } => NormalizedEvent {
            summary: event.summary,
            start: start.with_timezone(&zone),
            end: end.with_timezone(&zone),
            all_day: false,
        },
        EventTime::AllDay => NormalizedEvent {
            summary: event.summary,
            start: window.all_day_sentinel(),
            end: window.all_day_sentinel(),
            all_day: true,
        },
    }
}
