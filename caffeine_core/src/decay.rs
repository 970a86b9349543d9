//! Half-life decay of consumed doses.
//!
//! Each event contributes `amount * 0.5^(elapsed_hours / half_life_hours)`
//! from its timestamp onward and nothing before it. The level at an instant
//! is the sum of every contribution.

use crate::ConsumptionEvent;
use chrono::{DateTime, Duration, Utc};

const NANOS_PER_HOUR: f64 = 3_600_000_000_000.0;
const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Fractional hours in a duration.
///
/// Nanosecond precision, falling back to milliseconds past ~292 years.
fn hours(d: Duration) -> f64 {
    match d.num_nanoseconds() {
        Some(nanos) => nanos as f64 / NANOS_PER_HOUR,
        None => d.num_milliseconds() as f64 / MILLIS_PER_HOUR,
    }
}

/// Remaining amount of a single event at time `t`.
///
/// Events after `t` contribute zero.
pub fn contribution(event: &ConsumptionEvent, t: DateTime<Utc>, half_life: Duration) -> f64 {
    if t < event.timestamp {
        return 0.0;
    }
    let elapsed = hours(t - event.timestamp);
    event.amount * 0.5_f64.powf(elapsed / hours(half_life))
}

/// Total level at time `t` across all events.
pub fn level_at(t: DateTime<Utc>, events: &[ConsumptionEvent], half_life: Duration) -> f64 {
    events
        .iter()
        .map(|e| contribution(e, t, half_life))
        .sum()
}
