//! Stock pool models: items, ledger movements and price history

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Direction of a ledger movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementType {
    Entry,
    Exit,
}

impl MovementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::Entry => "entry",
            MovementType::Exit => "exit",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "entry" => Some(MovementType::Entry),
            "exit" => Some(MovementType::Exit),
            _ => None,
        }
    }

    /// Signed effect of `quantity` on the balance
    pub fn signed(&self, quantity: Decimal) -> Decimal {
        match self {
            MovementType::Entry => quantity,
            MovementType::Exit => -quantity,
        }
    }
}

/// Derived stock level of an item. Never set by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StockStatus {
    Normal,
    Critical,
    OutOfStock,
}

impl StockStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockStatus::Normal => "normal",
            StockStatus::Critical => "critical",
            StockStatus::OutOfStock => "out_of_stock",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "normal" => Some(StockStatus::Normal),
            "critical" => Some(StockStatus::Critical),
            "out_of_stock" => Some(StockStatus::OutOfStock),
            _ => None,
        }
    }

    /// Status for a balance against the item's minimum quantity
    pub fn derive(quantity: Decimal, min_quantity: Decimal) -> Self {
        if quantity <= Decimal::ZERO {
            StockStatus::OutOfStock
        } else if quantity <= min_quantity {
            StockStatus::Critical
        } else {
            StockStatus::Normal
        }
    }
}

impl std::fmt::Display for StockStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StockStatus::Normal => write!(f, "Normal"),
            StockStatus::Critical => write!(f, "Critical"),
            StockStatus::OutOfStock => write!(f, "Out of stock"),
        }
    }
}

/// A material held in the tenant's single stock pool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockItem {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub unit: String,
    pub min_quantity: Decimal,
    /// Cache of the movement log; never negative
    pub current_quantity: Decimal,
    pub average_price: Decimal,
    pub last_price: Option<Decimal>,
    pub last_entry_date: Option<DateTime<Utc>>,
    pub status: StockStatus,
    pub supplier_id: Option<Uuid>,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Append-only ledger entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockMovement {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub stock_item_id: Uuid,
    pub movement_type: MovementType,
    pub quantity: Decimal,
    pub unit_price: Option<Decimal>,
    pub movement_date: NaiveDate,
    pub responsible: Option<String>,
    /// Free-form counterparty tag, e.g. "purchase" or a project label
    pub origin_or_destination: String,
    pub project_id: Option<Uuid>,
    pub invoice_number: Option<String>,
    pub supplier_id: Option<Uuid>,
    pub notes: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Purchase price observed on a priced entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceHistoryEntry {
    pub id: Uuid,
    pub stock_item_id: Uuid,
    pub recorded_on: NaiveDate,
    pub price: Decimal,
    pub supplier_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Headline figures for a tenant's stock pool
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockKpis {
    pub total_items: i64,
    /// Items whose status is critical or out of stock
    pub critical_items: i64,
    /// Sum of current_quantity * average_price
    pub total_value: Decimal,
}

/// Result of folding the movement log of an item and comparing it with the cache
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Reconciliation {
    pub stock_item_id: Uuid,
    pub cached_quantity: Decimal,
    pub ledger_quantity: Decimal,
    pub movement_count: i64,
    pub consistent: bool,
}
