//! Replenishment purchases feeding the stock pool

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Lifecycle of a purchase request: `Pending` -> `Ordered` -> `Completed`,
/// with `Cancelled` reachable from either non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PurchaseRequestStatus {
    Pending,
    Ordered,
    Completed,
    Cancelled,
}

impl PurchaseRequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PurchaseRequestStatus::Pending => "pending",
            PurchaseRequestStatus::Ordered => "ordered",
            PurchaseRequestStatus::Completed => "completed",
            PurchaseRequestStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(PurchaseRequestStatus::Pending),
            "ordered" => Some(PurchaseRequestStatus::Ordered),
            "completed" => Some(PurchaseRequestStatus::Completed),
            "cancelled" => Some(PurchaseRequestStatus::Cancelled),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PurchaseRequestStatus::Completed | PurchaseRequestStatus::Cancelled
        )
    }

    pub fn mark_ordered(self) -> Result<Self, DomainError> {
        match self {
            PurchaseRequestStatus::Pending => Ok(PurchaseRequestStatus::Ordered),
            other => Err(other.invalid("order")),
        }
    }

    pub fn complete(self) -> Result<Self, DomainError> {
        match self {
            PurchaseRequestStatus::Ordered => Ok(PurchaseRequestStatus::Completed),
            other => Err(other.invalid("complete")),
        }
    }

    pub fn cancel(self) -> Result<Self, DomainError> {
        if self.is_terminal() {
            return Err(self.invalid("cancel"));
        }
        Ok(PurchaseRequestStatus::Cancelled)
    }

    fn invalid(self, action: &'static str) -> DomainError {
        DomainError::InvalidTransition {
            entity: "purchase request",
            action,
            status: self.as_str(),
        }
    }
}

/// Urgency of a purchase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PurchasePriority {
    Low,
    Medium,
    High,
}

impl PurchasePriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            PurchasePriority::Low => "low",
            PurchasePriority::Medium => "medium",
            PurchasePriority::High => "high",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "low" => Some(PurchasePriority::Low),
            "medium" => Some(PurchasePriority::Medium),
            "high" => Some(PurchasePriority::High),
            _ => None,
        }
    }

    /// Priority used when the caller gives none: an empty pool is urgent.
    pub fn for_balance(current_quantity: Decimal) -> Self {
        if current_quantity <= Decimal::ZERO {
            PurchasePriority::High
        } else {
            PurchasePriority::Medium
        }
    }
}

/// A request to buy stock for the pool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseRequest {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub stock_item_id: Uuid,
    pub item_name_snapshot: String,
    pub quantity: Decimal,
    pub priority: PurchasePriority,
    pub status: PurchaseRequestStatus,
    pub requested_by: Uuid,
    pub processed_by: Option<Uuid>,
    pub ordered_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub invoice_number: Option<String>,
    pub unit_price: Option<Decimal>,
    pub supplier_id: Option<Uuid>,
    /// Stock request whose shortfall spawned this purchase
    pub originating_stock_request_id: Option<Uuid>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
