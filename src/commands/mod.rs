pub mod calendar;
pub mod format;

use crate::agenda::{window_for_day, CalendarCatalog, EventSource, TimeWindow};
use crate::config::{split_calendar_ids, Config};
use crate::error::{usage_error, GcalResult};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use format::ListingStyle;
use std::io::Write;

/// Command line of the `gcal` binary
#[derive(Debug, Parser)]
#[command(
    name = "gcal",
    author,
    version,
    about = "List and total one day of Google Calendar events"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Print `id summary` for every calendar you can read
    List,
    /// List the events of one day across calendars
    Events(EventsArgs),
    /// Total the time spent per event summary for one day
    Hour(HourArgs),
}

/// Which calendars and which day
#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct DayArgs {
    /// Comma-separated calendar ids (defaults to GCAL_CALENDARS)
    pub cal_ids: Option<String>,
    /// Day relative to today: 0 today, -1 yesterday, 1 tomorrow
    #[arg(allow_negative_numbers = true)]
    pub days: Option<i64>,
    /// Print summaries only
    #[arg(long)]
    pub no_times: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct EventsArgs {
    #[command(flatten)]
    pub day: DayArgs,
    /// Prefix each line with "- "
    #[arg(long)]
    pub markdown_list: bool,
    /// Leave out all-day events
    #[arg(long)]
    pub skip_entire: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct HourArgs {
    #[command(flatten)]
    pub day: DayArgs,
}

/// Calendars and window a day command works on, after defaults are applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayRequest {
    pub calendar_ids: Vec<String>,
    pub window: TimeWindow,
}

impl DayArgs {
    pub fn resolve(&self, config: &Config, now: DateTime<Utc>) -> GcalResult<DayRequest> {
        let calendar_ids = match &self.cal_ids {
            Some(raw) => split_calendar_ids(raw),
            None => config.default_calendars.clone(),
        };
        if calendar_ids.is_empty() {
            return Err(usage_error("No calendar ids given"));
        }

        let window = window_for_day(now, config.timezone, self.days.unwrap_or(0))?;
        Ok(DayRequest {
            calendar_ids,
            window,
        })
    }
}

/// Dispatch a parsed command
pub async fn run<C, W>(
    command: Command,
    config: &Config,
    service: &C,
    now: DateTime<Utc>,
    out: &mut W,
) -> GcalResult<()>
where
    C: EventSource + CalendarCatalog + ?Sized,
    W: Write,
{
    match command {
        Command::List => calendar::list_calendars(service, out).await,
        Command::Events(args) => {
            let request = args.day.resolve(config, now)?;
            let style = ListingStyle {
                no_times: args.day.no_times,
                markdown_list: args.markdown_list,
            };
            calendar::list_events(service, &request, style, args.skip_entire, out).await
        }
        Command::Hour(args) => {
            let request = args.day.resolve(config, now)?;
            calendar::calc_hours(service, &request, args.day.no_times, out).await
        }
    }
}
