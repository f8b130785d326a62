//! Project demand against the stock pool

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;
use crate::validation::validate_quantity;

/// Lifecycle of a stock request.
///
/// `Pending` -> `Approved` | `Rejected`; `Approved` -> `PartiallyDelivered` | `Delivered`;
/// `PartiallyDelivered` -> `PartiallyDelivered` | `Delivered`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StockRequestStatus {
    Pending,
    Approved,
    PartiallyDelivered,
    Delivered,
    Rejected,
}

impl StockRequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockRequestStatus::Pending => "pending",
            StockRequestStatus::Approved => "approved",
            StockRequestStatus::PartiallyDelivered => "partially_delivered",
            StockRequestStatus::Delivered => "delivered",
            StockRequestStatus::Rejected => "rejected",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(StockRequestStatus::Pending),
            "approved" => Some(StockRequestStatus::Approved),
            "partially_delivered" => Some(StockRequestStatus::PartiallyDelivered),
            "delivered" => Some(StockRequestStatus::Delivered),
            "rejected" => Some(StockRequestStatus::Rejected),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, StockRequestStatus::Delivered | StockRequestStatus::Rejected)
    }

    pub fn can_deliver(&self) -> bool {
        matches!(
            self,
            StockRequestStatus::Approved | StockRequestStatus::PartiallyDelivered
        )
    }

    /// Approval is an authorization gate only; it moves no stock.
    pub fn approve(self) -> Result<Self, DomainError> {
        match self {
            StockRequestStatus::Pending => Ok(StockRequestStatus::Approved),
            other => Err(other.invalid("approve")),
        }
    }

    pub fn reject(self) -> Result<Self, DomainError> {
        match self {
            StockRequestStatus::Pending => Ok(StockRequestStatus::Rejected),
            other => Err(other.invalid("reject")),
        }
    }

    fn invalid(self, action: &'static str) -> DomainError {
        DomainError::InvalidTransition {
            entity: "stock request",
            action,
            status: self.as_str(),
        }
    }
}

/// A project's request for quantity from the pool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockRequest {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub project_id: Uuid,
    pub stock_item_id: Uuid,
    /// Item name at creation time; unaffected by later catalog renames
    pub item_name_snapshot: String,
    pub quantity_requested: Decimal,
    pub quantity_delivered: Decimal,
    pub status: StockRequestStatus,
    pub requested_by: Uuid,
    /// Reviewer of the request, for both approval and rejection
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StockRequest {
    pub fn remaining(&self) -> Decimal {
        self.quantity_requested - self.quantity_delivered
    }
}

/// One shipment against a stock request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockRequestDelivery {
    pub id: Uuid,
    pub stock_request_id: Uuid,
    pub quantity: Decimal,
    pub notes: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Outcome of a delivery computed before any stock moves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryPlan {
    pub quantity: Decimal,
    pub delivered_after: Decimal,
    pub remaining_after: Decimal,
    pub status_after: StockRequestStatus,
}

impl DeliveryPlan {
    pub fn is_complete(&self) -> bool {
        self.status_after == StockRequestStatus::Delivered
    }
}

/// Validate a delivery of `quantity` against the request's current state
pub fn plan_delivery(
    status: StockRequestStatus,
    quantity_requested: Decimal,
    quantity_delivered: Decimal,
    quantity: Decimal,
) -> Result<DeliveryPlan, DomainError> {
    if !status.can_deliver() {
        return Err(status.invalid("deliver"));
    }
    validate_quantity(quantity)?;

    let remaining = quantity_requested - quantity_delivered;
    if quantity > remaining {
        return Err(DomainError::OverDelivery {
            requested: quantity,
            remaining,
        });
    }

    let delivered_after = quantity_delivered + quantity;
    let status_after = if delivered_after >= quantity_requested {
        StockRequestStatus::Delivered
    } else {
        StockRequestStatus::PartiallyDelivered
    };

    Ok(DeliveryPlan {
        quantity,
        delivered_after,
        remaining_after: quantity_requested - delivered_after,
        status_after,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_review_only_from_pending() {
        assert_eq!(
            StockRequestStatus::Pending.approve(),
            Ok(StockRequestStatus::Approved)
        );
        assert_eq!(
            StockRequestStatus::Pending.reject(),
            Ok(StockRequestStatus::Rejected)
        );
        for status in [
            StockRequestStatus::Approved,
            StockRequestStatus::PartiallyDelivered,
            StockRequestStatus::Delivered,
            StockRequestStatus::Rejected,
        ] {
            assert!(status.approve().is_err());
            assert!(status.reject().is_err());
        }
    }

    #[test]
    fn test_partial_then_full_delivery() {
        let first = plan_delivery(StockRequestStatus::Approved, dec!(50), dec!(0), dec!(15)).unwrap();
        assert_eq!(first.status_after, StockRequestStatus::PartiallyDelivered);
        assert_eq!(first.delivered_after, dec!(15));
        assert_eq!(first.remaining_after, dec!(35));

        let second = plan_delivery(first.status_after, dec!(50), first.delivered_after, dec!(35)).unwrap();
        assert!(second.is_complete());
        assert_eq!(second.remaining_after, dec!(0));
    }

    #[test]
    fn test_over_delivery_rejected() {
        let err = plan_delivery(StockRequestStatus::PartiallyDelivered, dec!(50), dec!(40), dec!(11))
            .unwrap_err();
        assert_eq!(
            err,
            DomainError::OverDelivery {
                requested: dec!(11),
                remaining: dec!(10)
            }
        );
    }

    #[test]
    fn test_delivery_requires_approval() {
        assert!(matches!(
            plan_delivery(StockRequestStatus::Pending, dec!(10), dec!(0), dec!(1)),
            Err(DomainError::InvalidTransition { action: "deliver", .. })
        ));
        assert!(plan_delivery(StockRequestStatus::Delivered, dec!(10), dec!(10), dec!(1)).is_err());
        assert!(plan_delivery(StockRequestStatus::Rejected, dec!(10), dec!(0), dec!(1)).is_err());
    }

    #[test]
    fn test_delivery_beyond_stored_precision_rejected() {
        assert!(matches!(
            plan_delivery(StockRequestStatus::Approved, dec!(10), dec!(0), dec!(1.00005)),
            Err(DomainError::TooPrecise { field: "quantity", .. })
        ));
    }

    #[test]
    fn test_non_positive_delivery_rejected() {
        assert_eq!(
            plan_delivery(StockRequestStatus::Approved, dec!(10), dec!(0), dec!(0)),
            Err(DomainError::NonPositive { field: "quantity" })
        );
    }
}
