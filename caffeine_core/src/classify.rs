//! Classification of bank transactions into consumption events.
//!
//! Two rules exist:
//! - Cafe purchases are matched against a menu of (merchant, price) pairs
//! - Supermarket purchases of a known espresso product are matched on the
//!   statement text and a price band

use crate::ConsumptionEvent;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const CAFE_CATEGORY: &str = "restaurants-and-cafes";
pub const GROCERY_CATEGORY: &str = "groceries";

/// A card transaction as reported by the bank.
#[derive(Clone, Debug, PartialEq)]
pub struct Transaction {
    pub description: String,
    pub raw_text: Option<String>,
    /// Signed amount in cents; debits are negative
    pub amount_base_units: i64,
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Absolute amount paid.
    pub fn cost(&self) -> i64 {
        self.amount_base_units.abs()
    }
}

// ============================================================================
// Webhook payload
// ============================================================================

/// Envelope of a transaction resource as served by the bank API.
#[derive(Debug, Deserialize)]
pub struct TransactionDocument {
    pub data: TransactionResource,
}

#[derive(Debug, Deserialize)]
pub struct TransactionResource {
    pub attributes: TransactionAttributes,
    #[serde(default)]
    pub relationships: Relationships,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionAttributes {
    pub description: String,
    pub raw_text: Option<String>,
    pub amount: Money,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Money {
    pub value_in_base_units: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct Relationships {
    #[serde(default)]
    pub category: Option<Related>,
}

#[derive(Debug, Deserialize)]
pub struct Related {
    pub data: Option<ResourceId>,
}

#[derive(Debug, Deserialize)]
pub struct ResourceId {
    pub id: String,
}

impl From<TransactionDocument> for Transaction {
    fn from(doc: TransactionDocument) -> Self {
        let TransactionResource {
            attributes,
            relationships,
        } = doc.data;
        Transaction {
            description: attributes.description,
            raw_text: attributes.raw_text,
            amount_base_units: attributes.amount.value_in_base_units,
            category: relationships
                .category
                .and_then(|c| c.data)
                .map(|d| d.id),
            created_at: attributes.created_at,
        }
    }
}

// ============================================================================
// Rules
// ============================================================================

/// A cafe order recognised by merchant name and exact price.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MenuItem {
    pub merchant: String,
    pub price: i64,
    pub amount: f64,
}

impl MenuItem {
    fn new(merchant: &str, price: i64, amount: f64) -> Self {
        Self {
            merchant: merchant.into(),
            price,
            amount,
        }
    }
}

/// Supermarket product matched by statement keywords and a price band.
#[derive(Clone, Debug, PartialEq)]
pub struct GroceryRule {
    pub keywords: Vec<String>,
    pub min_price: i64,
    pub max_price: i64,
    pub description: String,
    pub amount: f64,
}

/// Immutable rule set.
#[derive(Clone, Debug)]
pub struct Classifier {
    menu: HashMap<(String, i64), f64>,
    grocery: GroceryRule,
}

static DEFAULT_CLASSIFIER: Lazy<Classifier> = Lazy::new(|| Classifier::with_menu(&[]));

/// Shared classifier with only the built-in rules.
pub fn default_classifier() -> &'static Classifier {
    &DEFAULT_CLASSIFIER
}

fn default_menu() -> Vec<MenuItem> {
    vec![
        MenuItem::new("Charlie Bit Me Cafe", 680, 160.0),
        MenuItem::new("Charlie Bit Me Cafe", 700, 160.0),
        MenuItem::new("Charlie Bit Me Cafe", 580, 80.0),
        MenuItem::new("Georgie Boy Espresso", 550, 160.0),
        MenuItem::new("Georgie Boy Espresso", 600, 160.0),
        MenuItem::new("Chia Chia", 550, 160.0),
        MenuItem::new("Chia Chia", 540, 160.0),
        MenuItem::new("Chia Chia", 500, 80.0),
        MenuItem::new("Chia Chia", 590, 240.0),
        MenuItem::new("In a Rush", 560, 160.0),
        MenuItem::new("Mr Summit", 550, 160.0),
        MenuItem::new("The Other Brother", 600, 160.0),
    ]
}

fn default_grocery_rule() -> GroceryRule {
    GroceryRule {
        keywords: vec!["WOOLWORTHS".into(), "DOCK".into()],
        min_price: 200,
        max_price: 700,
        description: "Dare NAS Intense Espresso".into(),
        amount: 260.0,
    }
}

impl Classifier {
    /// Built-in rules plus `extra` menu items (extras win on conflict).
    pub fn with_menu(extra: &[MenuItem]) -> Self {
        let menu = default_menu()
            .iter()
            .chain(extra)
            .map(|item| ((item.merchant.clone(), item.price), item.amount))
            .collect();
        Self {
            menu,
            grocery: default_grocery_rule(),
        }
    }

    pub fn menu_len(&self) -> usize {
        self.menu.len()
    }

    /// Turn a transaction into an event, or `None` if it isn't a dose.
    pub fn classify(&self, txn: &Transaction) -> Option<ConsumptionEvent> {
        let event = match txn.category.as_deref() {
            Some(CAFE_CATEGORY) => self.classify_cafe(txn),
            Some(GROCERY_CATEGORY) => self.classify_grocery(txn),
            _ => None,
        };

        match &event {
            Some(e) => tracing::info!(
                "Classified '{}' ({}) as {} mg",
                txn.description,
                txn.cost(),
                e.amount
            ),
            None => tracing::debug!(
                "Transaction '{}' ({}) is not a consumption event",
                txn.description,
                txn.cost()
            ),
        }
        event
    }

    fn classify_cafe(&self, txn: &Transaction) -> Option<ConsumptionEvent> {
        let cost = txn.cost();
        let amount = self.menu.get(&(txn.description.clone(), cost))?;
        Some(ConsumptionEvent::new(
            txn.created_at,
            txn.description.clone(),
            *amount,
            cost,
        ))
    }

    fn classify_grocery(&self, txn: &Transaction) -> Option<ConsumptionEvent> {
        let raw = txn.raw_text.as_deref()?.to_uppercase();
        let rule = &self.grocery;

        if !rule.keywords.iter().all(|k| raw.contains(k.as_str())) {
            return None;
        }

        let cost = txn.cost();
        if cost < rule.min_price || cost > rule.max_price {
            return None;
        }

        Some(ConsumptionEvent::new(
            txn.created_at,
            rule.description.clone(),
            rule.amount,
            cost,
        ))
    }
}
