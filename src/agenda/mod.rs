//! Day-window event aggregation: pick the day, merge the calendars, total the hours.

pub mod aggregator;
pub mod models;
pub mod source;
pub mod summary;
pub mod window;

pub use aggregator::{aggregate, AggregateOptions};
pub use models::{CalendarEvent, EventAnomaly, EventTime, NormalizedEvent, Timeline};
pub use source::{CalendarCatalog, CalendarInfo, EventSource};
pub use summary::{summarize, DurationSummary};
pub use window::{window_for_day, TimeWindow};
