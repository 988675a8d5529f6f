//! Text rendering for event listings and hour totals.

use crate::agenda::{CalendarInfo, DurationSummary, NormalizedEvent, Timeline};
use chrono::Duration;

/// How `events` lines are rendered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListingStyle {
    /// Print only the summary
    pub no_times: bool,
    /// Prefix every line with `- `
    pub markdown_list: bool,
}

pub fn render_calendars(calendars: &[CalendarInfo]) -> Vec<String> {
    calendars
        .iter()
        .map(|calendar| format!("{} {}", calendar.id, calendar.summary))
        .collect()
}

pub fn render_event(event: &NormalizedEvent, style: ListingStyle) -> String {
    let prefix = if style.markdown_list { "- " } else { "" };
    if style.no_times {
        format!("{}{}", prefix, event.summary)
    } else if event.all_day {
        // the sentinel may sit past midnight when the day starts in a DST gap
        format!("{}00:00 - 00:00 {}", prefix, event.summary)
    } else {
        format!(
            "{}{} - {} {}",
            prefix,
            event.start.format("%H:%M"),
            event.end.format("%H:%M"),
            event.summary
        )
    }
}

pub fn render_events(timeline: &Timeline, style: ListingStyle) -> Vec<String> {
    timeline.iter().map(|event| render_event(event, style)).collect()
}

/// `label - duration` per label, then a blank line and the total.
///
/// With `no_times` only the labels are printed and there is no total line.
pub fn render_hours(summary: &DurationSummary, no_times: bool) -> Vec<String> {
    if no_times {
        return summary.labels().map(str::to_string).collect();
    }

    let mut lines: Vec<String> = summary
        .entries()
        .iter()
        .map(|(label, duration)| format!("{} - {}", label, format_duration(*duration)))
        .collect();

    if let Some(total) = summary.total {
        lines.push(String::new());
        lines.push(format!("Total: {}", format_duration(total)));
    }
    lines
}

/// `H:MM:SS`, with a `N day(s), ` prefix from 24 hours on
pub fn format_duration(duration: Duration) -> String {
    let negative = duration < Duration::zero();
    let duration = if negative { -duration } else { duration };

    let total_seconds = duration.num_seconds();
    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3_600;
    let minutes = (total_seconds % 3_600) / 60;
    let seconds = total_seconds % 60;
    let micros = duration.subsec_nanos() / 1_000;

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    if days > 0 {
        out.push_str(&format!("{} day{}, ", days, if days == 1 { "" } else { "s" }));
    }
    out.push_str(&format!("{}:{:02}:{:02}", hours, minutes, seconds));
    if micros > 0 {
        out.push_str(&format!(".{:06}", micros));
    }
    out
}
