//! Core domain types for the caffeine tracker.
//!
//! This module defines:
//! - Consumption events (the immutable input to every computation)
//! - Time samples and level series (the derived output)
//! - Intake summaries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Events
// ============================================================================

/// A single recorded dose.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ConsumptionEvent {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub description: String,
    /// Dose in milligrams
    pub amount: f64,
    /// Price paid in currency base units (cents)
    #[serde(default)]
    pub cost: i64,
}

impl ConsumptionEvent {
    /// Create a new event with a fresh id.
    pub fn new(
        timestamp: DateTime<Utc>,
        description: impl Into<String>,
        amount: f64,
        cost: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp,
            description: description.into(),
            amount,
            cost,
        }
    }
}

// ============================================================================
// Level series
// ============================================================================

/// One point on the level curve.
///
/// Serializes the timestamp as unix seconds so charting front ends can use it
/// directly.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct TimeSample {
    #[serde(with = "chrono::serde::ts_seconds")]
    pub timestamp: DateTime<Utc>,
    pub level: f64,
}

/// Samples ordered by timestamp (non-decreasing; equal neighbours allowed).
pub type LevelSeries = Vec<TimeSample>;

// ============================================================================
// Summary
// ============================================================================

/// Totals over a set of events.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct IntakeSummary {
    pub intake: f64,
    pub cost: i64,
    pub count: usize,
}
