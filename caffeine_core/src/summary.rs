//! Intake and spend totals.

use crate::store::EventSource;
use crate::{ConsumptionEvent, IntakeSummary, Result};
use chrono::{DateTime, Duration, Utc};

/// Sum amounts and costs over a set of events.
pub fn summarize(events: &[ConsumptionEvent]) -> IntakeSummary {
    events.iter().fold(IntakeSummary::default(), |mut acc, e| {
        acc.intake += e.amount;
        acc.cost += e.cost;
        acc.count += 1;
        acc
    })
}

/// Totals for events in a window.
///
/// An open start means "since the Unix epoch"; an open end means "until a day
/// from `now`", so slightly future-dated events are still counted.
pub fn summary_between<S: EventSource + ?Sized>(
    source: &S,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Result<IntakeSummary> {
    let epoch = DateTime::<Utc>::UNIX_EPOCH;
    let start = start.unwrap_or(epoch).max(epoch);
    let end = end.unwrap_or(now + Duration::days(1));
    let events = source.fetch_events(start, end)?;
    let summary = summarize(&events);
    tracing::debug!(
        "Summary {} .. {}: {} events, {} mg, {} cost",
        start.to_rfc3339(),
        end.to_rfc3339(),
        summary.count,
        summary.intake,
        summary.cost
    );
    Ok(summary)
}
