//! Numbered drinks that can be logged without typing the details.

use crate::ConsumptionEvent;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A predefined drink.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Preset {
    pub id: u32,
    pub description: String,
    pub amount: f64,
    #[serde(default)]
    pub cost: i64,
}

impl Preset {
    /// Event for this preset at the given time.
    pub fn to_event(&self, at: DateTime<Utc>) -> ConsumptionEvent {
        ConsumptionEvent::new(at, self.description.clone(), self.amount, self.cost)
    }
}

pub fn default_presets() -> Vec<Preset> {
    vec![
        Preset {
            id: 1,
            description: "Homemade Double Oat Latte".into(),
            amount: 160.0,
            cost: 250,
        },
        Preset {
            id: 2,
            description: "The Jolly Miller".into(),
            amount: 80.0,
            cost: 600,
        },
    ]
}

/// Look a preset up by number. Later entries shadow earlier ones.
pub fn find_preset(presets: &[Preset], id: u32) -> Option<&Preset> {
    presets.iter().rev().find(|p| p.id == id)
}
