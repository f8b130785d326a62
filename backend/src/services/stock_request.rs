//! Stock request workflow: project demand served from the pool
//!
//! Approval is an authorization gate and moves no stock. Stock leaves the pool
//! only when a delivery is recorded, and each delivery debits the ledger in the
//! same transaction that advances the request.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{
    normalize_text, plan_delivery, validate_quantity, PaginatedResponse, Pagination,
    PurchasePriority, PurchaseRequest, StockItem, StockMovement, StockRequest,
    StockRequestDelivery, StockRequestStatus,
};
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::external::ProjectDirectory;
use crate::services::audit::AuditEntry;
use crate::services::dispatch::Dispatcher;
use crate::services::ledger::{ProjectDebit, StockLedger};
use crate::services::notification::{
    create_delivery_notification, create_purchase_requested_notification,
    create_stock_request_created_notification, create_stock_request_reviewed_notification,
};
use crate::services::purchase_request::{CreatePurchaseRequestInput, PurchaseRequestWorkflow};

/// Stock request service
#[derive(Clone)]
pub struct StockRequestWorkflow {
    db: PgPool,
    ledger: StockLedger,
    purchases: PurchaseRequestWorkflow,
    projects: Arc<dyn ProjectDirectory>,
    dispatcher: Dispatcher,
}

/// Input for creating a stock request
#[derive(Debug, Clone, Deserialize)]
pub struct CreateStockRequestInput {
    pub project_id: Uuid,
    pub stock_item_id: Uuid,
    pub quantity: Decimal,
    pub notes: Option<String>,
}

/// Input for rejecting a stock request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RejectStockRequestInput {
    pub reason: Option<String>,
}

/// Input for delivering against a stock request
#[derive(Debug, Clone, Deserialize)]
pub struct DeliverStockRequestInput {
    pub quantity: Decimal,
    pub notes: Option<String>,
    /// Open a purchase request for whatever is still missing after this delivery
    #[serde(default)]
    pub spawn_purchase_for_remainder: bool,
}

/// Filter for listing stock requests
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StockRequestFilter {
    pub project_id: Option<Uuid>,
    pub status: Option<StockRequestStatus>,
}

/// Everything a delivery produced
#[derive(Debug, Clone, Serialize)]
pub struct DeliveryOutcome {
    pub request: StockRequest,
    pub delivery: StockRequestDelivery,
    pub movement: StockMovement,
    pub item: StockItem,
    /// Shortfall purchase, when one was requested and something remains
    pub purchase_request: Option<PurchaseRequest>,
}

#[derive(Debug, FromRow)]
struct StockRequestRow {
    id: Uuid,
    tenant_id: Uuid,
    project_id: Uuid,
    stock_item_id: Uuid,
    item_name_snapshot: String,
    quantity_requested: Decimal,
    quantity_delivered: Decimal,
    status: String,
    requested_by: Uuid,
    approved_by: Option<Uuid>,
    approved_at: Option<DateTime<Utc>>,
    rejection_reason: Option<String>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<StockRequestRow> for StockRequest {
    type Error = AppError;

    fn try_from(row: StockRequestRow) -> Result<Self, Self::Error> {
        let status = StockRequestStatus::from_str(&row.status).ok_or_else(|| {
            AppError::Internal(format!("Unknown stock request status '{}'", row.status))
        })?;

        Ok(StockRequest {
            id: row.id,
            tenant_id: row.tenant_id,
            project_id: row.project_id,
            stock_item_id: row.stock_item_id,
            item_name_snapshot: row.item_name_snapshot,
            quantity_requested: row.quantity_requested,
            quantity_delivered: row.quantity_delivered,
            status,
            requested_by: row.requested_by,
            approved_by: row.approved_by,
            approved_at: row.approved_at,
            rejection_reason: row.rejection_reason,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct DeliveryRow {
    id: Uuid,
    stock_request_id: Uuid,
    quantity: Decimal,
    notes: Option<String>,
    created_by: Uuid,
    created_at: DateTime<Utc>,
}

impl From<DeliveryRow> for StockRequestDelivery {
    fn from(row: DeliveryRow) -> Self {
        StockRequestDelivery {
            id: row.id,
            stock_request_id: row.stock_request_id,
            quantity: row.quantity,
            notes: row.notes,
            created_by: row.created_by,
            created_at: row.created_at,
        }
    }
}

impl StockRequestWorkflow {
    /// Create a new StockRequestWorkflow instance
    pub fn new(
        db: PgPool,
        ledger: StockLedger,
        purchases: PurchaseRequestWorkflow,
        projects: Arc<dyn ProjectDirectory>,
        dispatcher: Dispatcher,
    ) -> Self {
        Self {
            db,
            ledger,
            purchases,
            projects,
            dispatcher,
        }
    }

    /// Create a pending request on behalf of a project member
    pub async fn create(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        input: CreateStockRequestInput,
    ) -> AppResult<StockRequest> {
        validate_quantity(input.quantity)?;

        // An inaccessible project is reported exactly like a missing one
        let visible = self.projects.project_exists(tenant_id, input.project_id).await?
            && self
                .projects
                .user_has_project_access(user_id, input.project_id)
                .await?;
        if !visible {
            return Err(AppError::NotFound("Project".to_string()));
        }

        let item = self.ledger.item(tenant_id, input.stock_item_id).await?;

        let row = sqlx::query_as::<_, StockRequestRow>(
            r#"
            INSERT INTO stock_requests (
                tenant_id, project_id, stock_item_id, item_name_snapshot, quantity_requested,
                status, requested_by, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, tenant_id, project_id, stock_item_id, item_name_snapshot,
                      quantity_requested, quantity_delivered, status, requested_by,
                      approved_by, approved_at, rejection_reason, notes, created_at, updated_at
            "#,
        )
        .bind(tenant_id)
        .bind(input.project_id)
        .bind(item.id)
        .bind(&item.name)
        .bind(input.quantity)
        .bind(StockRequestStatus::Pending.as_str())
        .bind(user_id)
        .bind(normalize_text(input.notes))
        .fetch_one(&self.db)
        .await?;
        let request = StockRequest::try_from(row)?;

        tracing::info!(
            stock_request_id = %request.id,
            project_id = %request.project_id,
            stock_item_id = %request.stock_item_id,
            quantity = %request.quantity_requested,
            "Created stock request"
        );

        let project_name = self
            .projects
            .project_name(tenant_id, request.project_id)
            .await
            .ok()
            .flatten()
            .unwrap_or_else(|| request.project_id.to_string());

        self.dispatcher.notify(create_stock_request_created_notification(
            &request,
            &project_name,
            self.dispatcher.warehouse_permission(),
        ));
        self.dispatcher.audit(
            AuditEntry::new(tenant_id, user_id, "create", "stock_request", request.id)
                .after(&request),
        );

        Ok(request)
    }

    /// PENDING -> APPROVED
    pub async fn approve(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        stock_request_id: Uuid,
    ) -> AppResult<StockRequest> {
        let mut tx = self.db.begin().await?;
        let before = lock_request(&mut *tx, tenant_id, stock_request_id).await?;
        let status = before.status.approve()?;

        let row = sqlx::query_as::<_, StockRequestRow>(
            r#"
            UPDATE stock_requests
            SET status = $3, approved_by = $4, approved_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND tenant_id = $2
            RETURNING id, tenant_id, project_id, stock_item_id, item_name_snapshot,
                      quantity_requested, quantity_delivered, status, requested_by,
                      approved_by, approved_at, rejection_reason, notes, created_at, updated_at
            "#,
        )
        .bind(stock_request_id)
        .bind(tenant_id)
        .bind(status.as_str())
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        let request = StockRequest::try_from(row)?;

        tracing::info!(stock_request_id = %request.id, "Stock request approved");
        self.dispatcher
            .notify(create_stock_request_reviewed_notification(&request, user_id));
        self.audit_transition(user_id, "approve", &before, &request);

        Ok(request)
    }

    /// PENDING -> REJECTED
    pub async fn reject(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        stock_request_id: Uuid,
        input: RejectStockRequestInput,
    ) -> AppResult<StockRequest> {
        let mut tx = self.db.begin().await?;
        let before = lock_request(&mut *tx, tenant_id, stock_request_id).await?;
        let status = before.status.reject()?;

        let row = sqlx::query_as::<_, StockRequestRow>(
            r#"
            UPDATE stock_requests
            SET status = $3, approved_by = $4, approved_at = NOW(), rejection_reason = $5,
                updated_at = NOW()
            WHERE id = $1 AND tenant_id = $2
            RETURNING id, tenant_id, project_id, stock_item_id, item_name_snapshot,
                      quantity_requested, quantity_delivered, status, requested_by,
                      approved_by, approved_at, rejection_reason, notes, created_at, updated_at
            "#,
        )
        .bind(stock_request_id)
        .bind(tenant_id)
        .bind(status.as_str())
        .bind(user_id)
        .bind(normalize_text(input.reason))
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        let request = StockRequest::try_from(row)?;

        tracing::info!(stock_request_id = %request.id, "Stock request rejected");
        self.dispatcher
            .notify(create_stock_request_reviewed_notification(&request, user_id));
        self.audit_transition(user_id, "reject", &before, &request);

        Ok(request)
    }

    /// Ship part or all of the remaining quantity.
    ///
    /// The debit, the delivery row, the request update and the optional
    /// shortfall purchase commit together or not at all.
    pub async fn deliver(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        stock_request_id: Uuid,
        input: DeliverStockRequestInput,
    ) -> AppResult<DeliveryOutcome> {
        // Project is fixed at creation; its label is read outside the transaction
        let project_id = self.get(tenant_id, stock_request_id).await?.project_id;
        let project_label = self
            .projects
            .project_name(tenant_id, project_id)
            .await?
            .unwrap_or_else(|| project_id.to_string());

        let mut tx = self.db.begin().await?;
        let before = lock_request(&mut *tx, tenant_id, stock_request_id).await?;
        let plan = plan_delivery(
            before.status,
            before.quantity_requested,
            before.quantity_delivered,
            input.quantity,
        )?;
        let notes = normalize_text(input.notes);

        let entry = self
            .ledger
            .debit_for_project(
                &mut *tx,
                tenant_id,
                user_id,
                ProjectDebit {
                    stock_item_id: before.stock_item_id,
                    quantity: plan.quantity,
                    project_id: before.project_id,
                    project_label,
                    notes: notes.clone(),
                },
            )
            .await?;

        let delivery = sqlx::query_as::<_, DeliveryRow>(
            r#"
            INSERT INTO stock_request_deliveries (stock_request_id, quantity, notes, created_by)
            VALUES ($1, $2, $3, $4)
            RETURNING id, stock_request_id, quantity, notes, created_by, created_at
            "#,
        )
        .bind(stock_request_id)
        .bind(plan.quantity)
        .bind(&notes)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        let row = sqlx::query_as::<_, StockRequestRow>(
            r#"
            UPDATE stock_requests
            SET quantity_delivered = quantity_delivered + $3, status = $4, updated_at = NOW()
            WHERE id = $1 AND tenant_id = $2
            RETURNING id, tenant_id, project_id, stock_item_id, item_name_snapshot,
                      quantity_requested, quantity_delivered, status, requested_by,
                      approved_by, approved_at, rejection_reason, notes, created_at, updated_at
            "#,
        )
        .bind(stock_request_id)
        .bind(tenant_id)
        .bind(plan.quantity)
        .bind(plan.status_after.as_str())
        .fetch_one(&mut *tx)
        .await?;
        let request = StockRequest::try_from(row)?;

        let purchase_request = if input.spawn_purchase_for_remainder
            && plan.remaining_after > Decimal::ZERO
        {
            let purchase = self
                .purchases
                .insert(
                    &mut *tx,
                    tenant_id,
                    user_id,
                    CreatePurchaseRequestInput {
                        stock_item_id: request.stock_item_id,
                        quantity: plan.remaining_after,
                        priority: Some(PurchasePriority::for_balance(
                            entry.item.current_quantity,
                        )),
                        notes: Some(format!(
                            "Shortfall of stock request {} for {}",
                            request.id, entry.movement.origin_or_destination
                        )),
                        originating_stock_request_id: Some(request.id),
                    },
                )
                .await?;
            Some(purchase)
        } else {
            None
        };

        tx.commit().await?;

        tracing::info!(
            stock_request_id = %request.id,
            delivered = %plan.quantity,
            remaining = %plan.remaining_after,
            status = request.status.as_str(),
            "Stock request delivery recorded"
        );

        self.ledger.publish(user_id, &entry);
        self.dispatcher
            .notify(create_delivery_notification(&request, plan.quantity, user_id));
        if let Some(purchase) = &purchase_request {
            self.dispatcher.notify(create_purchase_requested_notification(
                purchase,
                Some(request.project_id),
                self.dispatcher.finance_permission(),
            ));
            self.dispatcher.audit(
                AuditEntry::new(tenant_id, user_id, "create", "purchase_request", purchase.id)
                    .after(purchase),
            );
        }
        self.audit_transition(user_id, "deliver", &before, &request);

        Ok(DeliveryOutcome {
            request,
            delivery: delivery.into(),
            movement: entry.movement,
            item: entry.item,
            purchase_request,
        })
    }

    /// Shipments of one request, newest first
    pub async fn list_deliveries(
        &self,
        tenant_id: Uuid,
        stock_request_id: Uuid,
    ) -> AppResult<Vec<StockRequestDelivery>> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM stock_requests WHERE id = $1 AND tenant_id = $2)",
        )
        .bind(stock_request_id)
        .bind(tenant_id)
        .fetch_one(&self.db)
        .await?;

        if !exists {
            return Err(AppError::NotFound("Stock request".to_string()));
        }

        let rows = sqlx::query_as::<_, DeliveryRow>(
            r#"
            SELECT id, stock_request_id, quantity, notes, created_by, created_at
            FROM stock_request_deliveries
            WHERE stock_request_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(stock_request_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get a stock request
    pub async fn get(&self, tenant_id: Uuid, stock_request_id: Uuid) -> AppResult<StockRequest> {
        let mut conn = self.db.acquire().await?;
        fetch_request(&mut *conn, tenant_id, stock_request_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Stock request".to_string()))
    }

    /// List stock requests, newest first
    pub async fn list(
        &self,
        tenant_id: Uuid,
        filter: &StockRequestFilter,
        pagination: &Pagination,
    ) -> AppResult<PaginatedResponse<StockRequest>> {
        let (offset, limit) = pagination.offset_limit();
        let status = filter.status.map(|s| s.as_str());

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM stock_requests
            WHERE tenant_id = $1
              AND ($2::UUID IS NULL OR project_id = $2)
              AND ($3::TEXT IS NULL OR status = $3)
            "#,
        )
        .bind(tenant_id)
        .bind(filter.project_id)
        .bind(status)
        .fetch_one(&self.db)
        .await?;

        let rows = sqlx::query_as::<_, StockRequestRow>(
            r#"
            SELECT id, tenant_id, project_id, stock_item_id, item_name_snapshot,
                   quantity_requested, quantity_delivered, status, requested_by,
                   approved_by, approved_at, rejection_reason, notes, created_at, updated_at
            FROM stock_requests
            WHERE tenant_id = $1
              AND ($2::UUID IS NULL OR project_id = $2)
              AND ($3::TEXT IS NULL OR status = $3)
            ORDER BY created_at DESC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(tenant_id)
        .bind(filter.project_id)
        .bind(status)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;

        let requests = rows
            .into_iter()
            .map(StockRequest::try_from)
            .collect::<AppResult<Vec<_>>>()?;

        Ok(PaginatedResponse::new(requests, pagination, total))
    }

    fn audit_transition(
        &self,
        user_id: Uuid,
        action: &'static str,
        before: &StockRequest,
        after: &StockRequest,
    ) {
        self.dispatcher.audit(
            AuditEntry::new(after.tenant_id, user_id, action, "stock_request", after.id)
                .before(before)
                .after(after),
        );
    }
}

/// Load a stock request on the given connection
pub(crate) async fn fetch_request(
    conn: &mut PgConnection,
    tenant_id: Uuid,
    stock_request_id: Uuid,
) -> AppResult<Option<StockRequest>> {
    let row = sqlx::query_as::<_, StockRequestRow>(
        r#"
        SELECT id, tenant_id, project_id, stock_item_id, item_name_snapshot,
               quantity_requested, quantity_delivered, status, requested_by,
               approved_by, approved_at, rejection_reason, notes, created_at, updated_at
        FROM stock_requests
        WHERE id = $1 AND tenant_id = $2
        "#,
    )
    .bind(stock_request_id)
    .bind(tenant_id)
    .fetch_optional(&mut *conn)
    .await?;

    row.map(StockRequest::try_from).transpose()
}

async fn lock_request(
    conn: &mut PgConnection,
    tenant_id: Uuid,
    stock_request_id: Uuid,
) -> AppResult<StockRequest> {
    let row = sqlx::query_as::<_, StockRequestRow>(
        r#"
        SELECT id, tenant_id, project_id, stock_item_id, item_name_snapshot,
               quantity_requested, quantity_delivered, status, requested_by,
               approved_by, approved_at, rejection_reason, notes, created_at, updated_at
        FROM stock_requests
        WHERE id = $1 AND tenant_id = $2
        FOR UPDATE
        "#,
    )
    .bind(stock_request_id)
    .bind(tenant_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| AppError::NotFound("Stock request".to_string()))?;

    row.try_into()
}
