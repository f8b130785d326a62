//! Purchase request workflow: replenishment of the stock pool

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::{
    normalize_text, validate_quantity, validate_unit_price, PaginatedResponse, Pagination,
    PurchasePriority, PurchaseRequest, PurchaseRequestStatus,
};
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::audit::AuditEntry;
use crate::services::dispatch::Dispatcher;
use crate::services::ledger::{PurchaseCredit, StockLedger};
use crate::services::notification::{
    create_purchase_completed_notification, create_purchase_requested_notification,
};
use crate::services::stock_request::fetch_request;

/// Purchase request service
#[derive(Clone)]
pub struct PurchaseRequestWorkflow {
    db: PgPool,
    ledger: StockLedger,
    dispatcher: Dispatcher,
}

/// Input for creating a purchase request
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePurchaseRequestInput {
    pub stock_item_id: Uuid,
    pub quantity: Decimal,
    pub priority: Option<PurchasePriority>,
    pub notes: Option<String>,
    pub originating_stock_request_id: Option<Uuid>,
}

/// Input for completing a purchase
#[derive(Debug, Clone, Deserialize)]
pub struct CompletePurchaseInput {
    pub unit_price: Decimal,
    pub invoice_number: Option<String>,
    pub supplier_id: Option<Uuid>,
}

/// Filter for listing purchase requests
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PurchaseRequestFilter {
    pub status: Option<PurchaseRequestStatus>,
}

#[derive(Debug, FromRow)]
struct PurchaseRow {
    id: Uuid,
    tenant_id: Uuid,
    stock_item_id: Uuid,
    item_name_snapshot: String,
    quantity: Decimal,
    priority: String,
    status: String,
    requested_by: Uuid,
    processed_by: Option<Uuid>,
    ordered_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    invoice_number: Option<String>,
    unit_price: Option<Decimal>,
    supplier_id: Option<Uuid>,
    originating_stock_request_id: Option<Uuid>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PurchaseRow> for PurchaseRequest {
    type Error = AppError;

    fn try_from(row: PurchaseRow) -> Result<Self, Self::Error> {
        let status = PurchaseRequestStatus::from_str(&row.status).ok_or_else(|| {
            AppError::Internal(format!("Unknown purchase request status '{}'", row.status))
        })?;
        let priority = PurchasePriority::from_str(&row.priority).ok_or_else(|| {
            AppError::Internal(format!("Unknown purchase priority '{}'", row.priority))
        })?;

        Ok(PurchaseRequest {
            id: row.id,
            tenant_id: row.tenant_id,
            stock_item_id: row.stock_item_id,
            item_name_snapshot: row.item_name_snapshot,
            quantity: row.quantity,
            priority,
            status,
            requested_by: row.requested_by,
            processed_by: row.processed_by,
            ordered_at: row.ordered_at,
            completed_at: row.completed_at,
            invoice_number: row.invoice_number,
            unit_price: row.unit_price,
            supplier_id: row.supplier_id,
            originating_stock_request_id: row.originating_stock_request_id,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl PurchaseRequestWorkflow {
    /// Create a new PurchaseRequestWorkflow instance
    pub fn new(db: PgPool, ledger: StockLedger, dispatcher: Dispatcher) -> Self {
        Self {
            db,
            ledger,
            dispatcher,
        }
    }

    /// Create a pending purchase request
    pub async fn create(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        input: CreatePurchaseRequestInput,
    ) -> AppResult<PurchaseRequest> {
        let mut tx = self.db.begin().await?;

        let project_id = match input.originating_stock_request_id {
            Some(request_id) => {
                let request = fetch_request(&mut *tx, tenant_id, request_id)
                    .await?
                    .ok_or_else(|| AppError::NotFound("Stock request".to_string()))?;
                if request.stock_item_id != input.stock_item_id {
                    return Err(AppError::validation(
                        "originating_stock_request_id",
                        "Stock request is for a different stock item",
                    ));
                }
                Some(request.project_id)
            }
            None => None,
        };

        let purchase = self.insert(&mut *tx, tenant_id, user_id, input).await?;
        tx.commit().await?;

        tracing::info!(
            purchase_request_id = %purchase.id,
            stock_item_id = %purchase.stock_item_id,
            priority = purchase.priority.as_str(),
            "Created purchase request"
        );

        self.dispatcher.notify(create_purchase_requested_notification(
            &purchase,
            project_id,
            self.dispatcher.finance_permission(),
        ));
        self.dispatcher.audit(
            AuditEntry::new(tenant_id, user_id, "create", "purchase_request", purchase.id)
                .after(&purchase),
        );

        Ok(purchase)
    }

    /// Insert a purchase request on the caller's transaction.
    ///
    /// Without an explicit priority, an item with nothing left in the pool is
    /// purchased with high priority.
    pub(crate) async fn insert(
        &self,
        conn: &mut PgConnection,
        tenant_id: Uuid,
        user_id: Uuid,
        input: CreatePurchaseRequestInput,
    ) -> AppResult<PurchaseRequest> {
        validate_quantity(input.quantity)?;

        let (name, current_quantity) = sqlx::query_as::<_, (String, Decimal)>(
            "SELECT name, current_quantity FROM stock_items WHERE id = $1 AND tenant_id = $2",
        )
        .bind(input.stock_item_id)
        .bind(tenant_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Stock item".to_string()))?;

        let priority = input
            .priority
            .unwrap_or_else(|| PurchasePriority::for_balance(current_quantity));

        let row = sqlx::query_as::<_, PurchaseRow>(
            r#"
            INSERT INTO purchase_requests (
                tenant_id, stock_item_id, item_name_snapshot, quantity, priority, status,
                requested_by, originating_stock_request_id, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, tenant_id, stock_item_id, item_name_snapshot, quantity, priority, status,
                      requested_by, processed_by, ordered_at, completed_at, invoice_number,
                      unit_price, supplier_id, originating_stock_request_id, notes,
                      created_at, updated_at
            "#,
        )
        .bind(tenant_id)
        .bind(input.stock_item_id)
        .bind(&name)
        .bind(input.quantity)
        .bind(priority.as_str())
        .bind(PurchaseRequestStatus::Pending.as_str())
        .bind(user_id)
        .bind(input.originating_stock_request_id)
        .bind(normalize_text(input.notes))
        .fetch_one(&mut *conn)
        .await?;

        row.try_into()
    }

    /// PENDING -> ORDERED
    pub async fn mark_ordered(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        purchase_request_id: Uuid,
    ) -> AppResult<PurchaseRequest> {
        let mut tx = self.db.begin().await?;
        let before = lock_purchase(&mut *tx, tenant_id, purchase_request_id).await?;
        let status = before.status.mark_ordered()?;

        let row = sqlx::query_as::<_, PurchaseRow>(
            r#"
            UPDATE purchase_requests
            SET status = $3, processed_by = $4, ordered_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND tenant_id = $2
            RETURNING id, tenant_id, stock_item_id, item_name_snapshot, quantity, priority, status,
                      requested_by, processed_by, ordered_at, completed_at, invoice_number,
                      unit_price, supplier_id, originating_stock_request_id, notes,
                      created_at, updated_at
            "#,
        )
        .bind(purchase_request_id)
        .bind(tenant_id)
        .bind(status.as_str())
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        let purchase = PurchaseRequest::try_from(row)?;

        tracing::info!(purchase_request_id = %purchase.id, "Purchase request ordered");
        self.audit_transition(user_id, "order", &before, &purchase);

        Ok(purchase)
    }

    /// ORDERED -> COMPLETED, crediting the ledger in the same transaction
    pub async fn complete(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        purchase_request_id: Uuid,
        input: CompletePurchaseInput,
    ) -> AppResult<PurchaseRequest> {
        validate_unit_price(input.unit_price)?;
        let invoice_number = normalize_text(input.invoice_number);

        let mut tx = self.db.begin().await?;
        let before = lock_purchase(&mut *tx, tenant_id, purchase_request_id).await?;
        let status = before.status.complete()?;

        let entry = self
            .ledger
            .credit_from_purchase(
                &mut *tx,
                tenant_id,
                user_id,
                PurchaseCredit {
                    stock_item_id: before.stock_item_id,
                    quantity: before.quantity,
                    unit_price: input.unit_price,
                    invoice_number: invoice_number.clone(),
                    supplier_id: input.supplier_id.or(before.supplier_id),
                    notes: Some(format!("Purchase request {}", before.id)),
                },
            )
            .await?;

        let row = sqlx::query_as::<_, PurchaseRow>(
            r#"
            UPDATE purchase_requests
            SET status = $3, processed_by = $4, completed_at = NOW(), invoice_number = $5,
                unit_price = $6, supplier_id = COALESCE($7, supplier_id), updated_at = NOW()
            WHERE id = $1 AND tenant_id = $2
            RETURNING id, tenant_id, stock_item_id, item_name_snapshot, quantity, priority, status,
                      requested_by, processed_by, ordered_at, completed_at, invoice_number,
                      unit_price, supplier_id, originating_stock_request_id, notes,
                      created_at, updated_at
            "#,
        )
        .bind(purchase_request_id)
        .bind(tenant_id)
        .bind(status.as_str())
        .bind(user_id)
        .bind(&invoice_number)
        .bind(input.unit_price)
        .bind(input.supplier_id)
        .fetch_one(&mut *tx)
        .await?;
        let purchase = PurchaseRequest::try_from(row)?;

        let linked_request = match purchase.originating_stock_request_id {
            Some(request_id) => fetch_request(&mut *tx, tenant_id, request_id).await?,
            None => None,
        };

        tx.commit().await?;

        tracing::info!(
            purchase_request_id = %purchase.id,
            stock_item_id = %purchase.stock_item_id,
            balance = %entry.item.current_quantity,
            "Purchase request completed"
        );

        self.ledger.publish(user_id, &entry);
        self.dispatcher.notify(create_purchase_completed_notification(
            &purchase,
            user_id,
            linked_request.as_ref(),
            self.dispatcher.warehouse_permission(),
        ));
        self.audit_transition(user_id, "complete", &before, &purchase);

        Ok(purchase)
    }

    /// PENDING | ORDERED -> CANCELLED
    pub async fn cancel(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        purchase_request_id: Uuid,
    ) -> AppResult<PurchaseRequest> {
        let mut tx = self.db.begin().await?;
        let before = lock_purchase(&mut *tx, tenant_id, purchase_request_id).await?;
        let status = before.status.cancel()?;

        let row = sqlx::query_as::<_, PurchaseRow>(
            r#"
            UPDATE purchase_requests
            SET status = $3, processed_by = $4, updated_at = NOW()
            WHERE id = $1 AND tenant_id = $2
            RETURNING id, tenant_id, stock_item_id, item_name_snapshot, quantity, priority, status,
                      requested_by, processed_by, ordered_at, completed_at, invoice_number,
                      unit_price, supplier_id, originating_stock_request_id, notes,
                      created_at, updated_at
            "#,
        )
        .bind(purchase_request_id)
        .bind(tenant_id)
        .bind(status.as_str())
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        let purchase = PurchaseRequest::try_from(row)?;

        tracing::info!(purchase_request_id = %purchase.id, "Purchase request cancelled");
        self.audit_transition(user_id, "cancel", &before, &purchase);

        Ok(purchase)
    }

    /// Get a purchase request
    pub async fn get(&self, tenant_id: Uuid, purchase_request_id: Uuid) -> AppResult<PurchaseRequest> {
        let row = sqlx::query_as::<_, PurchaseRow>(
            r#"
            SELECT id, tenant_id, stock_item_id, item_name_snapshot, quantity, priority, status,
                   requested_by, processed_by, ordered_at, completed_at, invoice_number,
                   unit_price, supplier_id, originating_stock_request_id, notes,
                   created_at, updated_at
            FROM purchase_requests
            WHERE id = $1 AND tenant_id = $2
            "#,
        )
        .bind(purchase_request_id)
        .bind(tenant_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Purchase request".to_string()))?;

        row.try_into()
    }

    /// List purchase requests: open work first, then by urgency, newest first
    pub async fn list(
        &self,
        tenant_id: Uuid,
        filter: &PurchaseRequestFilter,
        pagination: &Pagination,
    ) -> AppResult<PaginatedResponse<PurchaseRequest>> {
        let (offset, limit) = pagination.offset_limit();
        let status = filter.status.map(|s| s.as_str());

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM purchase_requests
            WHERE tenant_id = $1 AND ($2::TEXT IS NULL OR status = $2)
            "#,
        )
        .bind(tenant_id)
        .bind(status)
        .fetch_one(&self.db)
        .await?;

        let rows = sqlx::query_as::<_, PurchaseRow>(
            r#"
            SELECT id, tenant_id, stock_item_id, item_name_snapshot, quantity, priority, status,
                   requested_by, processed_by, ordered_at, completed_at, invoice_number,
                   unit_price, supplier_id, originating_stock_request_id, notes,
                   created_at, updated_at
            FROM purchase_requests
            WHERE tenant_id = $1 AND ($2::TEXT IS NULL OR status = $2)
            ORDER BY
                CASE status
                    WHEN 'pending' THEN 0
                    WHEN 'ordered' THEN 1
                    WHEN 'completed' THEN 2
                    ELSE 3
                END,
                CASE priority
                    WHEN 'high' THEN 0
                    WHEN 'medium' THEN 1
                    ELSE 2
                END,
                created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(tenant_id)
        .bind(status)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;

        let purchases = rows
            .into_iter()
            .map(PurchaseRequest::try_from)
            .collect::<AppResult<Vec<_>>>()?;

        Ok(PaginatedResponse::new(purchases, pagination, total))
    }

    fn audit_transition(
        &self,
        user_id: Uuid,
        action: &'static str,
        before: &PurchaseRequest,
        after: &PurchaseRequest,
    ) {
        self.dispatcher.audit(
            AuditEntry::new(after.tenant_id, user_id, action, "purchase_request", after.id)
                .before(before)
                .after(after),
        );
    }
}

async fn lock_purchase(
    conn: &mut PgConnection,
    tenant_id: Uuid,
    purchase_request_id: Uuid,
) -> AppResult<PurchaseRequest> {
    let row = sqlx::query_as::<_, PurchaseRow>(
        r#"
        SELECT id, tenant_id, stock_item_id, item_name_snapshot, quantity, priority, status,
               requested_by, processed_by, ordered_at, completed_at, invoice_number,
               unit_price, supplier_id, originating_stock_request_id, notes,
               created_at, updated_at
        FROM purchase_requests
        WHERE id = $1 AND tenant_id = $2
        FOR UPDATE
        "#,
    )
    .bind(purchase_request_id)
    .bind(tenant_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| AppError::NotFound("Purchase request".to_string()))?;

    row.try_into()
}
