use super::models::Timeline;
use chrono::Duration;
use std::collections::HashMap;
use tracing::warn;

/// Time spent per event summary, in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DurationSummary {
    entries: Vec<(String, Duration)>,
    /// `None` when no timed event was seen, as opposed to a zero total
    pub total: Option<Duration>,
}

impl DurationSummary {
    pub fn entries(&self) -> &[(String, Duration)] {
        &self.entries
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(label, _)| label.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Sum `end - start` per summary label.
///
/// All-day events are ignored here even if the timeline still carries them.
pub fn summarize(timeline: &Timeline) -> DurationSummary {
    let mut entries: Vec<(String, Duration)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut total: Option<Duration> = None;

    for event in timeline.iter().filter(|e| !e.all_day) {
        let duration = event.duration();
        if duration < Duration::zero() {
            warn!(
                "Skipping '{}': ends at {} before it starts at {}",
                event.summary, event.end, event.start
            );
            continue;
        }

        match index.get(event.summary.as_str()) {
            Some(&i) => entries[i].1 = entries[i].1 + duration,
            None => {
                index.insert(event.summary.as_str(), entries.len());
                entries.push((event.summary.clone(), duration));
            }
        }
        total = Some(total.unwrap_or_else(Duration::zero) + duration);
    }

    DurationSummary { entries, total }
}
