//! CSV rendering of level series and event lists.

use crate::{ConsumptionEvent, Result, TimeSample};
use std::io::Write;

#[derive(Debug, serde::Serialize)]
struct SampleRow {
    timestamp: String,
    unix: i64,
    level: f64,
}

impl From<&TimeSample> for SampleRow {
    fn from(sample: &TimeSample) -> Self {
        SampleRow {
            timestamp: sample.timestamp.to_rfc3339(),
            unix: sample.timestamp.timestamp(),
            level: sample.level,
        }
    }
}

#[derive(Debug, serde::Serialize)]
struct EventRow<'a> {
    id: String,
    timestamp: String,
    description: &'a str,
    amount: f64,
    cost: i64,
}

impl<'a> From<&'a ConsumptionEvent> for EventRow<'a> {
    fn from(event: &'a ConsumptionEvent) -> Self {
        EventRow {
            id: event.id.to_string(),
            timestamp: event.timestamp.to_rfc3339(),
            description: &event.description,
            amount: event.amount,
            cost: event.cost,
        }
    }
}

/// Write samples as CSV with a header row.
pub fn write_series_csv<W: Write>(writer: W, series: &[TimeSample]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for sample in series {
        writer.serialize(SampleRow::from(sample))?;
    }
    writer.flush()?;
    tracing::debug!("Wrote {} samples as CSV", series.len());
    Ok(())
}

/// Write events as CSV with a header row.
pub fn write_events_csv<W: Write>(writer: W, events: &[ConsumptionEvent]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for event in events {
        writer.serialize(EventRow::from(event))?;
    }
    writer.flush()?;
    tracing::debug!("Wrote {} events as CSV", events.len());
    Ok(())
}
