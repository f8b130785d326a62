//! Notification and audit dispatch tests
//!
//! Tests for:
//! - After-commit emission reaches the sink
//! - Sink failures are swallowed and never reach the caller
//! - Event targeting for each workflow trigger

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use shared::ledger::StatusTransition;
use shared::{
    PurchasePriority, PurchaseRequest, PurchaseRequestStatus, StockItem, StockRequest,
    StockRequestStatus, StockStatus,
};
use sitestock_backend::config::NotificationConfig;
use sitestock_backend::error::{AppError, AppResult};
use sitestock_backend::services::audit::{AuditEntry, AuditSink};
use sitestock_backend::services::notification::{
    create_delivery_notification, create_low_stock_notification,
    create_purchase_completed_notification, create_purchase_requested_notification,
    create_stock_request_reviewed_notification, NotificationEvent, NotificationPriority,
    NotificationSink,
};
use sitestock_backend::services::Dispatcher;
use std::str::FromStr;
use uuid::Uuid;

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

#[derive(Default)]
struct RecordingSink {
    events: Mutex<Vec<NotificationEvent>>,
    audits: Mutex<Vec<AuditEntry>>,
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn emit(&self, event: &NotificationEvent) -> AppResult<()> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

#[async_trait]
impl AuditSink for RecordingSink {
    async fn log(&self, entry: &AuditEntry) -> AppResult<()> {
        self.audits.lock().unwrap().push(entry.clone());
        Ok(())
    }
}

struct FailingSink;

#[async_trait]
impl NotificationSink for FailingSink {
    async fn emit(&self, _event: &NotificationEvent) -> AppResult<()> {
        Err(AppError::Internal("notification module unavailable".to_string()))
    }
}

#[async_trait]
impl AuditSink for FailingSink {
    async fn log(&self, _entry: &AuditEntry) -> AppResult<()> {
        Err(AppError::Internal("audit module unavailable".to_string()))
    }
}

fn config() -> NotificationConfig {
    NotificationConfig {
        enabled: true,
        warehouse_permission: "stock_requests:deliver".to_string(),
        finance_permission: "purchase_requests:order".to_string(),
    }
}

fn item(quantity: Decimal, status: StockStatus) -> StockItem {
    StockItem {
        id: Uuid::new_v4(),
        tenant_id: Uuid::new_v4(),
        name: "Cement CP-II".to_string(),
        unit: "bag".to_string(),
        min_quantity: dec("25"),
        current_quantity: quantity,
        average_price: dec("5"),
        last_price: Some(dec("5")),
        last_entry_date: Some(Utc::now()),
        status,
        supplier_id: None,
        sort_order: 0,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn request(status: StockRequestStatus, delivered: Decimal) -> StockRequest {
    StockRequest {
        id: Uuid::new_v4(),
        tenant_id: Uuid::new_v4(),
        project_id: Uuid::new_v4(),
        stock_item_id: Uuid::new_v4(),
        item_name_snapshot: "Cement CP-II".to_string(),
        quantity_requested: dec("50"),
        quantity_delivered: delivered,
        status,
        requested_by: Uuid::new_v4(),
        approved_by: Some(Uuid::new_v4()),
        approved_at: Some(Utc::now()),
        rejection_reason: None,
        notes: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn purchase(originating: Option<Uuid>, priority: PurchasePriority) -> PurchaseRequest {
    PurchaseRequest {
        id: Uuid::new_v4(),
        tenant_id: Uuid::new_v4(),
        stock_item_id: Uuid::new_v4(),
        item_name_snapshot: "Cement CP-II".to_string(),
        quantity: dec("35"),
        priority,
        status: PurchaseRequestStatus::Pending,
        requested_by: Uuid::new_v4(),
        processed_by: None,
        ordered_at: None,
        completed_at: None,
        invoice_number: None,
        unit_price: None,
        supplier_id: None,
        originating_stock_request_id: originating,
        notes: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[tokio::test]
async fn test_notification_reaches_sink_after_spawn() {
    let sink = Arc::new(RecordingSink::default());
    let dispatcher = Dispatcher::new(sink.clone(), sink.clone(), config());

    let event = create_low_stock_notification(
        &item(dec("20"), StockStatus::Critical),
        StatusTransition::new(StockStatus::Normal, StockStatus::Critical),
        Uuid::new_v4(),
        dispatcher.warehouse_permission(),
    );
    dispatcher.notify(event).await.unwrap();

    let events = sink.events.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type, "stock.low_stock");
    assert_eq!(events[0].permission_codes, vec!["stock_requests:deliver".to_string()]);
}

#[tokio::test]
async fn test_failing_sinks_are_swallowed() {
    let dispatcher = Dispatcher::new(Arc::new(FailingSink), Arc::new(FailingSink), config());

    let event = create_stock_request_reviewed_notification(
        &request(StockRequestStatus::Approved, Decimal::ZERO),
        Uuid::new_v4(),
    );
    assert!(dispatcher.notify(event).await.is_ok());

    let entry = AuditEntry::new(
        Uuid::new_v4(),
        Uuid::new_v4(),
        "approve",
        "stock_request",
        Uuid::new_v4(),
    );
    assert!(dispatcher.audit(entry).await.is_ok());
}

#[tokio::test]
async fn test_audit_entry_carries_snapshots() {
    let sink = Arc::new(RecordingSink::default());
    let dispatcher = Dispatcher::new(sink.clone(), sink.clone(), config());

    let before = request(StockRequestStatus::Pending, Decimal::ZERO);
    let mut after = before.clone();
    after.status = StockRequestStatus::Rejected;

    dispatcher
        .audit(
            AuditEntry::new(after.tenant_id, Uuid::new_v4(), "reject", "stock_request", after.id)
                .before(&before)
                .after(&after),
        )
        .await
        .unwrap();

    let audits = sink.audits.lock().unwrap();
    assert_eq!(audits.len(), 1);
    assert_eq!(audits[0].before.as_ref().unwrap()["status"], "PENDING");
    assert_eq!(audits[0].after.as_ref().unwrap()["status"], "REJECTED");
}

#[test]
fn test_out_of_stock_alert_is_high_priority() {
    let event = create_low_stock_notification(
        &item(Decimal::ZERO, StockStatus::OutOfStock),
        StatusTransition::new(StockStatus::Critical, StockStatus::OutOfStock),
        Uuid::new_v4(),
        "stock_requests:deliver",
    );
    assert_eq!(event.priority, NotificationPriority::High);
    assert!(event.title.starts_with("Out of stock"));
}

#[test]
fn test_rejection_targets_requester_with_reason() {
    let mut rejected = request(StockRequestStatus::Rejected, Decimal::ZERO);
    rejected.rejection_reason = Some("Use the leftover from block B".to_string());

    let event = create_stock_request_reviewed_notification(&rejected, Uuid::new_v4());
    assert_eq!(event.event_type, "stock_request.rejected");
    assert_eq!(event.target_user_ids, vec![rejected.requested_by]);
    assert!(event.body.contains("leftover from block B"));
    assert!(event.permission_codes.is_empty());
}

#[test]
fn test_partial_and_full_delivery_events() {
    let partial = request(StockRequestStatus::PartiallyDelivered, dec("15"));
    let event = create_delivery_notification(&partial, dec("15"), Uuid::new_v4());
    assert_eq!(event.event_type, "stock_request.partially_delivered");
    assert_eq!(event.target_user_ids, vec![partial.requested_by]);
    assert_eq!(event.metadata["delivered_now"], serde_json::json!(dec("15")));

    let full = request(StockRequestStatus::Delivered, dec("50"));
    let event = create_delivery_notification(&full, dec("35"), Uuid::new_v4());
    assert_eq!(event.event_type, "stock_request.delivered");
}

#[test]
fn test_shortfall_purchase_targets_finance() {
    let shortfall = purchase(Some(Uuid::new_v4()), PurchasePriority::High);
    let project_id = Uuid::new_v4();

    let event =
        create_purchase_requested_notification(&shortfall, Some(project_id), "purchase_requests:order");
    assert_eq!(event.event_type, "purchase_request.shortfall");
    assert_eq!(event.project_id, Some(project_id));
    assert_eq!(event.priority, NotificationPriority::High);
    assert_eq!(event.permission_codes, vec!["purchase_requests:order".to_string()]);
}

#[test]
fn test_completion_of_linked_purchase_tells_waiting_project() {
    let waiting = request(StockRequestStatus::PartiallyDelivered, dec("15"));
    let linked = purchase(Some(waiting.id), PurchasePriority::High);

    let event = create_purchase_completed_notification(
        &linked,
        Uuid::new_v4(),
        Some(&waiting),
        "stock_requests:deliver",
    );
    assert_eq!(event.event_type, "purchase_request.completed_for_request");
    assert_eq!(event.project_id, Some(waiting.project_id));
    assert_eq!(event.target_user_ids, vec![waiting.requested_by]);

    let plain = purchase(None, PurchasePriority::Medium);
    let event =
        create_purchase_completed_notification(&plain, Uuid::new_v4(), None, "stock_requests:deliver");
    assert_eq!(event.event_type, "purchase_request.completed");
    assert!(event.target_user_ids.is_empty());
}
