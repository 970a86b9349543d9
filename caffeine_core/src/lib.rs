#![forbid(unsafe_code)]

//! Caffeine intake tracking and decaying level computation.
//!
//! This crate provides:
//! - Domain types (consumption events, level samples)
//! - The level series pipeline (resolution ladder, time grid, half-life
//!   decay, knot insertion)
//! - Persistence (JSONL event log)
//! - Collaborators around it: transaction classification, presets,
//!   summaries and CSV export

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod resolution;
pub mod grid;
pub mod decay;
pub mod series;
pub mod store;
pub mod summary;
pub mod classify;
pub mod presets;
pub mod export;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use resolution::{select_resolution, snap_down, Resolution};
pub use grid::{generate_grid, TimeGrid};
pub use decay::{contribution, level_at};
pub use series::{build_series, levels_between, SeriesParams};
pub use store::{read_events, EventSink, EventSource, JsonlEventLog};
pub use summary::{summarize, summary_between};
pub use classify::{default_classifier, Classifier, Transaction, TransactionDocument};
pub use presets::{find_preset, Preset};
