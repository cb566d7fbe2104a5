//! Calendar table spanning the observed creation dates

use chrono::{Duration, NaiveDate};
use ticketsla_core::{CalendarDay, TicketRecord};
use tracing::{info, warn};

/// Rows left on an Excel sheet below the header
pub const MAX_CALENDAR_DAYS: i64 = 1_048_575;

/// One row per date from the earliest to the latest creation date, inclusive.
pub fn build_calendar(records: &[TicketRecord]) -> Vec<CalendarDay> {
    let dates = records.iter().filter_map(|r| r.dates.criacao.map(|c| c.date()));
    let (Some(first), Some(last)) = (dates.clone().min(), dates.max()) else {
        warn!("No creation dates; calendar is empty");
        return Vec::new();
    };

    let span = (last - first).num_days() + 1;
    if span > MAX_CALENDAR_DAYS {
        warn!(from = %first, to = %last, span, "Creation range exceeds a worksheet; calendar is empty");
        return Vec::new();
    }

    let calendar = days(first, last).map(CalendarDay::new).collect::<Vec<_>>();
    info!(from = %first, to = %last, days = calendar.len(), "Calendar built");
    calendar
}

fn days(first: NaiveDate, last: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    let count = (last - first).num_days().max(-1) + 1;
    (0..count).map(move |offset| first + Duration::days(offset))
}
