use chrono::{DateTime, Duration, FixedOffset};
use chrono_tz::Tz;
use thiserror::Error;

/// When an event happens, as reported by the calendar service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventTime {
    /// Concrete start and end instants, `start <= end`
    Timed {
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    },
    /// Whole-day entry without clock times
    AllDay,
}

/// Event data that cannot be placed on a timeline
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventAnomaly {
    #[error("event ends ({end}) before it starts ({start})")]
    EndBeforeStart {
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    },
    #[error("event has a {present} time but no {missing} time")]
    HalfTimed {
        present: &'static str,
        missing: &'static str,
    },
    #[error("unreadable timestamp '{0}'")]
    BadTimestamp(String),
}

/// A single occurrence fetched from one calendar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEvent {
    pub summary: String,
    pub time: EventTime,
}

impl CalendarEvent {
    /// Build a timed event, rejecting one that ends before it starts
    pub fn timed(
        summary: impl Into<String>,
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    ) -> Result<Self, EventAnomaly> {
        if end < start {
            return Err(EventAnomaly::EndBeforeStart { start, end });
        }
        Ok(Self {
            summary: summary.into(),
            time: EventTime::Timed { start, end },
        })
    }

    pub fn all_day(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            time: EventTime::AllDay,
        }
    }

    pub fn is_all_day(&self) -> bool {
        matches!(self.time, EventTime::AllDay)
    }
}

/// An event placed on the day's timeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedEvent {
    pub summary: String,
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
    /// Set when `start`/`end` are the midnight sentinel of an all-day event
    pub all_day: bool,
}

impl NormalizedEvent {
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// Events of one day ordered by `(start, end)`.
///
/// Equal keys keep the order they were handed in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timeline {
    events: Vec<NormalizedEvent>,
}

impl Timeline {
    pub fn new(mut events: Vec<NormalizedEvent>) -> Self {
        // Vec::sort_by is stable
        events.sort_by(|a, b| (a.start, a.end).cmp(&(b.start, b.end)));
        Self { events }
    }

    pub fn events(&self) -> &[NormalizedEvent] {
        &self.events
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NormalizedEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl<'a> IntoIterator for &'a Timeline {
    type Item = &'a NormalizedEvent;
    type IntoIter = std::slice::Iter<'a, NormalizedEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}
