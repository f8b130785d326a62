//! Notification events raised by the inventory workflows
//!
//! Delivery of notifications belongs to the notification module; this core only
//! decides when an event is raised and who it targets. Events are handed to a
//! [`NotificationSink`] after the triggering transaction has committed.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::ledger::StatusTransition;
use shared::{
    PurchasePriority, PurchaseRequest, StockItem, StockRequest, StockRequestStatus, StockStatus,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppResult;

/// Notification category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationCategory {
    Stock,
    StockRequest,
    PurchaseRequest,
}

impl NotificationCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationCategory::Stock => "stock",
            NotificationCategory::StockRequest => "stock_request",
            NotificationCategory::PurchaseRequest => "purchase_request",
        }
    }
}

/// Notification priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationPriority {
    Low,
    Normal,
    High,
}

impl NotificationPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationPriority::Low => "low",
            NotificationPriority::Normal => "normal",
            NotificationPriority::High => "high",
        }
    }
}

/// An event handed to the notification module.
///
/// Recipients are the union of `target_user_ids` and every user holding one of
/// `permission_codes` in the tenant.
#[derive(Debug, Clone, Serialize)]
pub struct NotificationEvent {
    pub tenant_id: Uuid,
    pub project_id: Option<Uuid>,
    pub category: NotificationCategory,
    pub event_type: String,
    pub title: String,
    pub body: String,
    pub priority: NotificationPriority,
    pub actor_user_id: Option<Uuid>,
    pub target_user_ids: Vec<Uuid>,
    pub permission_codes: Vec<String>,
    pub metadata: serde_json::Value,
}

/// Receiver of notification events
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn emit(&self, event: &NotificationEvent) -> AppResult<()>;
}

/// Sink writing into the `notifications` table read by the notification module
#[derive(Clone)]
pub struct PgNotificationSink {
    db: PgPool,
}

impl PgNotificationSink {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl NotificationSink for PgNotificationSink {
    async fn emit(&self, event: &NotificationEvent) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO notifications (
                tenant_id, project_id, category, event_type, title, body, priority,
                actor_user_id, target_user_ids, permission_codes, metadata
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(event.tenant_id)
        .bind(event.project_id)
        .bind(event.category.as_str())
        .bind(&event.event_type)
        .bind(&event.title)
        .bind(&event.body)
        .bind(event.priority.as_str())
        .bind(event.actor_user_id)
        .bind(&event.target_user_ids)
        .bind(&event.permission_codes)
        .bind(&event.metadata)
        .execute(&self.db)
        .await?;

        Ok(())
    }
}

/// Sink that only logs; used when notifications are disabled
#[derive(Clone, Default)]
pub struct LogNotificationSink;

#[async_trait]
impl NotificationSink for LogNotificationSink {
    async fn emit(&self, event: &NotificationEvent) -> AppResult<()> {
        tracing::info!(
            tenant_id = %event.tenant_id,
            event_type = %event.event_type,
            "Notification (not delivered): {}",
            event.title
        );
        Ok(())
    }
}

// ============================================================================
// Notification Trigger Helpers
// ============================================================================

/// Item crossed into a critical or empty level
pub fn create_low_stock_notification(
    item: &StockItem,
    transition: StatusTransition,
    actor_user_id: Uuid,
    warehouse_permission: &str,
) -> NotificationEvent {
    let (title, priority) = match transition.current {
        StockStatus::OutOfStock => (
            format!("Out of stock: {}", item.name),
            NotificationPriority::High,
        ),
        _ => (
            format!("Low stock: {}", item.name),
            NotificationPriority::Normal,
        ),
    };

    NotificationEvent {
        tenant_id: item.tenant_id,
        project_id: None,
        category: NotificationCategory::Stock,
        event_type: "stock.low_stock".to_string(),
        title,
        body: format!(
            "'{}' is now {}. Current: {} {}, minimum: {} {}",
            item.name,
            transition.current,
            item.current_quantity.normalize(),
            item.unit,
            item.min_quantity.normalize(),
            item.unit
        ),
        priority,
        actor_user_id: Some(actor_user_id),
        target_user_ids: Vec::new(),
        permission_codes: vec![warehouse_permission.to_string()],
        metadata: serde_json::json!({
            "stock_item_id": item.id,
            "previous_status": transition.previous.as_str(),
            "status": transition.current.as_str(),
            "current_quantity": item.current_quantity,
            "min_quantity": item.min_quantity,
        }),
    }
}

/// New project demand awaiting warehouse review
pub fn create_stock_request_created_notification(
    request: &StockRequest,
    project_name: &str,
    warehouse_permission: &str,
) -> NotificationEvent {
    NotificationEvent {
        tenant_id: request.tenant_id,
        project_id: Some(request.project_id),
        category: NotificationCategory::StockRequest,
        event_type: "stock_request.created".to_string(),
        title: format!("New stock request: {}", request.item_name_snapshot),
        body: format!(
            "Project '{}' requested {} of '{}'",
            project_name,
            request.quantity_requested.normalize(),
            request.item_name_snapshot
        ),
        priority: NotificationPriority::Normal,
        actor_user_id: Some(request.requested_by),
        target_user_ids: Vec::new(),
        permission_codes: vec![warehouse_permission.to_string()],
        metadata: request_metadata(request),
    }
}

/// Requester learns the outcome of the review
pub fn create_stock_request_reviewed_notification(
    request: &StockRequest,
    actor_user_id: Uuid,
) -> NotificationEvent {
    let quantity = request.quantity_requested.normalize();
    let (event_type, title, body) = if request.status == StockRequestStatus::Approved {
        (
            "stock_request.approved",
            format!("Stock request approved: {}", request.item_name_snapshot),
            format!(
                "Your request for {} of '{}' was approved and awaits delivery",
                quantity, request.item_name_snapshot
            ),
        )
    } else {
        let reason = request
            .rejection_reason
            .as_deref()
            .map(|r| format!(": {}", r))
            .unwrap_or_default();
        (
            "stock_request.rejected",
            format!("Stock request rejected: {}", request.item_name_snapshot),
            format!(
                "Your request for {} of '{}' was rejected{}",
                quantity, request.item_name_snapshot, reason
            ),
        )
    };

    NotificationEvent {
        tenant_id: request.tenant_id,
        project_id: Some(request.project_id),
        category: NotificationCategory::StockRequest,
        event_type: event_type.to_string(),
        title,
        body,
        priority: NotificationPriority::Normal,
        actor_user_id: Some(actor_user_id),
        target_user_ids: vec![request.requested_by],
        permission_codes: Vec::new(),
        metadata: request_metadata(request),
    }
}

/// Requester learns that a shipment left the warehouse
pub fn create_delivery_notification(
    request: &StockRequest,
    delivered_now: Decimal,
    actor_user_id: Uuid,
) -> NotificationEvent {
    let fully_delivered = request.status == StockRequestStatus::Delivered;
    let (event_type, title, body) = if fully_delivered {
        (
            "stock_request.delivered",
            format!("Stock request delivered: {}", request.item_name_snapshot),
            format!(
                "All {} of '{}' have been delivered",
                request.quantity_requested.normalize(),
                request.item_name_snapshot
            ),
        )
    } else {
        (
            "stock_request.partially_delivered",
            format!("Partial delivery: {}", request.item_name_snapshot),
            format!(
                "{} of '{}' delivered; {} of {} still pending",
                delivered_now.normalize(),
                request.item_name_snapshot,
                request.remaining().normalize(),
                request.quantity_requested.normalize()
            ),
        )
    };

    let mut metadata = request_metadata(request);
    metadata["delivered_now"] = serde_json::json!(delivered_now);

    NotificationEvent {
        tenant_id: request.tenant_id,
        project_id: Some(request.project_id),
        category: NotificationCategory::StockRequest,
        event_type: event_type.to_string(),
        title,
        body,
        priority: NotificationPriority::Normal,
        actor_user_id: Some(actor_user_id),
        target_user_ids: vec![request.requested_by],
        permission_codes: Vec::new(),
        metadata,
    }
}

/// Finance learns that a purchase is needed
pub fn create_purchase_requested_notification(
    purchase: &PurchaseRequest,
    project_id: Option<Uuid>,
    finance_permission: &str,
) -> NotificationEvent {
    let shortfall = purchase.originating_stock_request_id.is_some();
    let body = if shortfall {
        format!(
            "A stock request could not be fully served; {} of '{}' must be purchased",
            purchase.quantity.normalize(),
            purchase.item_name_snapshot
        )
    } else {
        format!(
            "Purchase of {} of '{}' was requested",
            purchase.quantity.normalize(),
            purchase.item_name_snapshot
        )
    };

    NotificationEvent {
        tenant_id: purchase.tenant_id,
        project_id,
        category: NotificationCategory::PurchaseRequest,
        event_type: if shortfall {
            "purchase_request.shortfall".to_string()
        } else {
            "purchase_request.created".to_string()
        },
        title: format!("Purchase needed: {}", purchase.item_name_snapshot),
        body,
        priority: match purchase.priority {
            PurchasePriority::High => NotificationPriority::High,
            PurchasePriority::Medium => NotificationPriority::Normal,
            PurchasePriority::Low => NotificationPriority::Low,
        },
        actor_user_id: Some(purchase.requested_by),
        target_user_ids: Vec::new(),
        permission_codes: vec![finance_permission.to_string()],
        metadata: purchase_metadata(purchase),
    }
}

/// Warehouse (and the waiting requester, if any) learn that stock arrived.
///
/// A purchase spawned by a shortfall tells its project that a delivery can now
/// be made rather than announcing a plain arrival.
pub fn create_purchase_completed_notification(
    purchase: &PurchaseRequest,
    actor_user_id: Uuid,
    linked_request: Option<&StockRequest>,
    warehouse_permission: &str,
) -> NotificationEvent {
    let (event_type, title, body, project_id, targets) = match linked_request {
        Some(request) => (
            "purchase_request.completed_for_request",
            format!("Ready for delivery: {}", purchase.item_name_snapshot),
            format!(
                "{} of '{}' arrived; the linked project is waiting for delivery of {} more",
                purchase.quantity.normalize(),
                purchase.item_name_snapshot,
                request.remaining().normalize()
            ),
            Some(request.project_id),
            vec![request.requested_by],
        ),
        None => (
            "purchase_request.completed",
            format!("Stock arrived: {}", purchase.item_name_snapshot),
            format!(
                "{} of '{}' were added to stock",
                purchase.quantity.normalize(),
                purchase.item_name_snapshot
            ),
            None,
            Vec::new(),
        ),
    };

    NotificationEvent {
        tenant_id: purchase.tenant_id,
        project_id,
        category: NotificationCategory::PurchaseRequest,
        event_type: event_type.to_string(),
        title,
        body,
        priority: NotificationPriority::Normal,
        actor_user_id: Some(actor_user_id),
        target_user_ids: targets,
        permission_codes: vec![warehouse_permission.to_string()],
        metadata: purchase_metadata(purchase),
    }
}

fn request_metadata(request: &StockRequest) -> serde_json::Value {
    serde_json::json!({
        "stock_request_id": request.id,
        "stock_item_id": request.stock_item_id,
        "status": request.status.as_str(),
        "quantity_requested": request.quantity_requested,
        "quantity_delivered": request.quantity_delivered,
    })
}

fn purchase_metadata(purchase: &PurchaseRequest) -> serde_json::Value {
    serde_json::json!({
        "purchase_request_id": purchase.id,
        "stock_item_id": purchase.stock_item_id,
        "status": purchase.status.as_str(),
        "priority": purchase.priority.as_str(),
        "quantity": purchase.quantity,
        "originating_stock_request_id": purchase.originating_stock_request_id,
    })
}
