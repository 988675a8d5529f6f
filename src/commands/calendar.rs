use super::format::{render_calendars, render_events, render_hours, ListingStyle};
use super::DayRequest;
use crate::agenda::{aggregate, summarize, AggregateOptions, CalendarCatalog, EventSource};
use crate::error::GcalResult;
use std::io::Write;
use tracing::info;

/// `list`: every readable calendar as `id summary`
pub async fn list_calendars<C, W>(catalog: &C, out: &mut W) -> GcalResult<()>
where
    C: CalendarCatalog + ?Sized,
    W: Write,
{
    let calendars = catalog.list_calendars().await?;
    write_lines(out, &render_calendars(&calendars))
}

/// `events`: one line per event of the requested day
pub async fn list_events<S, W>(
    source: &S,
    request: &DayRequest,
    style: ListingStyle,
    skip_all_day: bool,
    out: &mut W,
) -> GcalResult<()>
where
    S: EventSource + ?Sized,
    W: Write,
{
    let options = AggregateOptions {
        include_all_day: !skip_all_day,
    };
    let timeline = aggregate(&request.calendar_ids, &request.window, source, options).await?;
    info!("Listing {} event(s) for {}", timeline.len(), request.window.date());

    write_lines(out, &render_events(&timeline, style))
}

/// `hour`: time per summary for the requested day, all-day events excluded
pub async fn calc_hours<S, W>(source: &S, request: &DayRequest, no_times: bool, out: &mut W) -> GcalResult<()>
where
    S: EventSource + ?Sized,
    W: Write,
{
    let options = AggregateOptions {
        include_all_day: false,
    };
    let timeline = aggregate(&request.calendar_ids, &request.window, source, options).await?;
    let summary = summarize(&timeline);
    info!(
        "Summarized {} event(s) into {} label(s) for {}",
        timeline.len(),
        summary.entries().len(),
        request.window.date()
    );

    write_lines(out, &render_hours(&summary, no_times))
}

fn write_lines<W: Write>(out: &mut W, lines: &[String]) -> GcalResult<()> {
    for line in lines {
        writeln!(out, "{}", line)?;
    }
    out.flush()?;
    Ok(())
}
