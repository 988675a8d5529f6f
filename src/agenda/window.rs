use crate::error::{usage_error, GcalResult};
use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Bounds of one civil day in a fixed zone.
///
/// `end` is 23:59:59 plus 999 microseconds rather than the next midnight, so an
/// event starting exactly at the following midnight is never included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

impl TimeWindow {
    /// The civil date this window covers
    pub fn date(&self) -> NaiveDate {
        self.start.date_naive()
    }

    /// The zone both bounds are expressed in
    pub fn timezone(&self) -> Tz {
        self.start.timezone()
    }

    /// Placeholder instant given to all-day events so they sort first
    pub fn all_day_sentinel(&self) -> DateTime<Tz> {
        self.start
    }
}

/// Compute the window for `reference + day_offset` days as seen in `zone`.
pub fn window_for_day(reference: DateTime<Utc>, zone: Tz, day_offset: i64) -> GcalResult<TimeWindow> {
    let today = reference.with_timezone(&zone).date_naive();
    let day = Duration::try_days(day_offset)
        .and_then(|offset| today.checked_add_signed(offset))
        .ok_or_else(|| usage_error(&format!("Day offset out of range: {}", day_offset)))?;

    let start = first_instant_of(&zone, day);
    let end = last_instant_of(&zone, day);

    match (start, end) {
        (Some(start), Some(end)) => Ok(TimeWindow { start, end }),
        _ => Err(usage_error(&format!("Cannot represent {} in {}", day, zone))),
    }
}

// Midnight can fall inside a DST gap (e.g. America/Santiago), in which case the
// day starts at the first local time that exists.
fn first_instant_of(zone: &Tz, day: NaiveDate) -> Option<DateTime<Tz>> {
    let midnight = day.and_hms_opt(0, 0, 0)?;
    (0..=96).find_map(|step| earliest(zone, midnight + Duration::minutes(15 * step)))
}

fn last_instant_of(zone: &Tz, day: NaiveDate) -> Option<DateTime<Tz>> {
    let last = day.and_hms_micro_opt(23, 59, 59, 999)?;
    (0..=96).find_map(|step| latest(zone, last - Duration::minutes(15 * step)))
}

fn earliest(zone: &Tz, local: NaiveDateTime) -> Option<DateTime<Tz>> {
    match zone.from_local_datetime(&local) {
        LocalResult::Single(dt) => Some(dt),
        LocalResult::Ambiguous(first, _) => Some(first),
        LocalResult::None => None,
    }
}

fn latest(zone: &Tz, local: NaiveDateTime) -> Option<DateTime<Tz>> {
    match zone.from_local_datetime(&local) {
        LocalResult::Single(dt) => Some(dt),
        LocalResult::Ambiguous(_, second) => Some(second),
        LocalResult::None => None,
    }
}
