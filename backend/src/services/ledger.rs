//! Stock ledger: the only writer of an item's running balance
//!
//! Every movement is appended to `stock_movements` and applied to the cached
//! balance columns of `stock_items` in the same transaction. Entries lock the
//! item row before recomputing the weighted average; exits go through a single
//! conditional decrement so that concurrent debits can never overdraw the pool.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Deserialize;
use shared::ledger::{cost_bearing, fold_movements, Balance, StatusTransition, PRICE_SCALE};
use shared::{
    normalize_text, validate_optional_unit_price, validate_quantity, validate_unit_price,
    MovementType, PaginatedResponse, Pagination, PriceHistoryEntry, Reconciliation, StockItem,
    StockKpis, StockMovement, StockStatus,
};
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::external::ProjectDirectory;
use crate::services::audit::AuditEntry;
use crate::services::dispatch::Dispatcher;
use crate::services::notification::create_low_stock_notification;

/// Counterparty tag of every purchase credit
pub const PURCHASE_ORIGIN: &str = "purchase";

/// Stock ledger service
#[derive(Clone)]
pub struct StockLedger {
    db: PgPool,
    projects: Arc<dyn ProjectDirectory>,
    dispatcher: Dispatcher,
}

/// Input for recording a manual movement
#[derive(Debug, Clone, Deserialize)]
pub struct RecordMovementInput {
    pub stock_item_id: Uuid,
    pub movement_type: MovementType,
    pub quantity: Decimal,
    pub unit_price: Option<Decimal>,
    pub movement_date: Option<NaiveDate>,
    pub responsible: Option<String>,
    pub origin_or_destination: String,
    pub project_id: Option<Uuid>,
    pub invoice_number: Option<String>,
    pub supplier_id: Option<Uuid>,
    pub notes: Option<String>,
}

/// Credit booked when a purchase request completes
#[derive(Debug, Clone)]
pub struct PurchaseCredit {
    pub stock_item_id: Uuid,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub invoice_number: Option<String>,
    pub supplier_id: Option<Uuid>,
    pub notes: Option<String>,
}

/// Debit booked when a stock request is delivered
#[derive(Debug, Clone)]
pub struct ProjectDebit {
    pub stock_item_id: Uuid,
    pub quantity: Decimal,
    pub project_id: Uuid,
    pub project_label: String,
    pub notes: Option<String>,
}

/// Filter for the tenant-wide movement list
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MovementFilter {
    pub stock_item_id: Option<Uuid>,
    pub movement_type: Option<MovementType>,
    pub project_id: Option<Uuid>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// A movement together with the item balance it produced
#[derive(Debug, Clone)]
pub struct LedgerEntry {
    pub movement: StockMovement,
    pub item: StockItem,
    pub transition: StatusTransition,
}

#[derive(Debug, FromRow)]
struct ItemRow {
    id: Uuid,
    tenant_id: Uuid,
    name: String,
    unit: String,
    min_quantity: Decimal,
    current_quantity: Decimal,
    average_price: Decimal,
    last_price: Option<Decimal>,
    last_entry_date: Option<DateTime<Utc>>,
    status: String,
    supplier_id: Option<Uuid>,
    sort_order: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ItemRow {
    fn stored_status(&self) -> StockStatus {
        StockStatus::from_str(&self.status)
            .unwrap_or_else(|| StockStatus::derive(self.current_quantity, self.min_quantity))
    }

    fn balance(&self) -> Balance {
        Balance {
            quantity: self.current_quantity,
            average_price: self.average_price,
            min_quantity: self.min_quantity,
            status: self.stored_status(),
        }
    }
}

impl From<ItemRow> for StockItem {
    fn from(row: ItemRow) -> Self {
        let status = row.stored_status();
        StockItem {
            id: row.id,
            tenant_id: row.tenant_id,
            name: row.name,
            unit: row.unit,
            min_quantity: row.min_quantity,
            current_quantity: row.current_quantity,
            average_price: row.average_price,
            last_price: row.last_price,
            last_entry_date: row.last_entry_date,
            status,
            supplier_id: row.supplier_id,
            sort_order: row.sort_order,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct MovementRow {
    id: Uuid,
    tenant_id: Uuid,
    stock_item_id: Uuid,
    movement_type: String,
    quantity: Decimal,
    unit_price: Option<Decimal>,
    movement_date: NaiveDate,
    responsible: Option<String>,
    origin_or_destination: String,
    project_id: Option<Uuid>,
    invoice_number: Option<String>,
    supplier_id: Option<Uuid>,
    notes: Option<String>,
    created_by: Uuid,
    created_at: DateTime<Utc>,
}

impl TryFrom<MovementRow> for StockMovement {
    type Error = AppError;

    fn try_from(row: MovementRow) -> Result<Self, Self::Error> {
        Ok(StockMovement {
            id: row.id,
            tenant_id: row.tenant_id,
            stock_item_id: row.stock_item_id,
            movement_type: parse_movement_type(&row.movement_type)?,
            quantity: row.quantity,
            unit_price: row.unit_price,
            movement_date: row.movement_date,
            responsible: row.responsible,
            origin_or_destination: row.origin_or_destination,
            project_id: row.project_id,
            invoice_number: row.invoice_number,
            supplier_id: row.supplier_id,
            notes: row.notes,
            created_by: row.created_by,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct PriceHistoryRow {
    id: Uuid,
    stock_item_id: Uuid,
    recorded_on: NaiveDate,
    price: Decimal,
    supplier_id: Option<Uuid>,
    created_at: DateTime<Utc>,
}

impl From<PriceHistoryRow> for PriceHistoryEntry {
    fn from(row: PriceHistoryRow) -> Self {
        PriceHistoryEntry {
            id: row.id,
            stock_item_id: row.stock_item_id,
            recorded_on: row.recorded_on,
            price: row.price,
            supplier_id: row.supplier_id,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct KpiRow {
    total_items: i64,
    critical_items: i64,
    total_value: Decimal,
}

#[derive(Debug, FromRow)]
struct LogRow {
    movement_type: String,
    quantity: Decimal,
}

fn parse_movement_type(value: &str) -> AppResult<MovementType> {
    MovementType::from_str(value)
        .ok_or_else(|| AppError::Internal(format!("Unknown movement type '{}'", value)))
}

impl StockLedger {
    /// Create a new StockLedger instance
    pub fn new(db: PgPool, projects: Arc<dyn ProjectDirectory>, dispatcher: Dispatcher) -> Self {
        Self {
            db,
            projects,
            dispatcher,
        }
    }

    /// Record a manual entry or exit in its own transaction
    pub async fn record_movement(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        input: RecordMovementInput,
    ) -> AppResult<LedgerEntry> {
        if let Some(project_id) = input.project_id {
            if !self.projects.project_exists(tenant_id, project_id).await? {
                return Err(AppError::NotFound("Project".to_string()));
            }
        }

        let mut tx = self.db.begin().await?;
        let entry = self.apply(&mut *tx, tenant_id, user_id, input).await?;
        tx.commit().await?;

        self.publish(user_id, &entry);
        Ok(entry)
    }

    /// Book a completed purchase as a priced entry.
    ///
    /// Runs on the caller's transaction; the caller commits and then calls
    /// [`StockLedger::publish`].
    pub async fn credit_from_purchase(
        &self,
        conn: &mut PgConnection,
        tenant_id: Uuid,
        user_id: Uuid,
        credit: PurchaseCredit,
    ) -> AppResult<LedgerEntry> {
        validate_unit_price(credit.unit_price)?;

        let input = RecordMovementInput {
            stock_item_id: credit.stock_item_id,
            movement_type: MovementType::Entry,
            quantity: credit.quantity,
            unit_price: Some(credit.unit_price),
            movement_date: None,
            responsible: None,
            origin_or_destination: PURCHASE_ORIGIN.to_string(),
            project_id: None,
            invoice_number: credit.invoice_number,
            supplier_id: credit.supplier_id,
            notes: credit.notes,
        };

        self.apply(conn, tenant_id, user_id, input).await
    }

    /// Book a delivery to a project as an exit tagged with that project.
    ///
    /// Runs on the caller's transaction; fails with `InsufficientStock` without
    /// touching the balance.
    pub async fn debit_for_project(
        &self,
        conn: &mut PgConnection,
        tenant_id: Uuid,
        user_id: Uuid,
        debit: ProjectDebit,
    ) -> AppResult<LedgerEntry> {
        let input = RecordMovementInput {
            stock_item_id: debit.stock_item_id,
            movement_type: MovementType::Exit,
            quantity: debit.quantity,
            unit_price: None,
            movement_date: None,
            responsible: None,
            origin_or_destination: debit.project_label,
            project_id: Some(debit.project_id),
            invoice_number: None,
            supplier_id: None,
            notes: debit.notes,
        };

        self.apply(conn, tenant_id, user_id, input).await
    }

    /// Decrement the balance only if it covers `quantity`.
    ///
    /// Returns `false` when the item is missing or the balance is too low; the
    /// check and the decrement are one statement.
    pub async fn try_debit(
        &self,
        conn: &mut PgConnection,
        tenant_id: Uuid,
        stock_item_id: Uuid,
        quantity: Decimal,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE stock_items
            SET current_quantity = current_quantity - $3, updated_at = NOW()
            WHERE id = $1 AND tenant_id = $2 AND current_quantity >= $3
            "#,
        )
        .bind(stock_item_id)
        .bind(tenant_id)
        .bind(quantity)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Emit the after-commit side effects of a ledger entry
    pub fn publish(&self, user_id: Uuid, entry: &LedgerEntry) {
        if entry.transition.fires_low_stock_alert() {
            tracing::info!(
                stock_item_id = %entry.item.id,
                previous = entry.transition.previous.as_str(),
                status = entry.transition.current.as_str(),
                "Stock level alert"
            );
            self.dispatcher.notify(create_low_stock_notification(
                &entry.item,
                entry.transition,
                user_id,
                self.dispatcher.warehouse_permission(),
            ));
        }

        self.dispatcher.audit(
            AuditEntry::new(
                entry.item.tenant_id,
                user_id,
                "create",
                "stock_movement",
                entry.movement.id,
            )
            .after(&entry.movement),
        );
    }

    async fn apply(
        &self,
        conn: &mut PgConnection,
        tenant_id: Uuid,
        user_id: Uuid,
        input: RecordMovementInput,
    ) -> AppResult<LedgerEntry> {
        validate_quantity(input.quantity)?;
        validate_optional_unit_price(input.unit_price)?;

        let origin_or_destination = normalize_text(Some(input.origin_or_destination.clone()))
            .ok_or_else(|| {
                AppError::validation("origin_or_destination", "Origin or destination is required")
            })?;

        let (item, transition) = match input.movement_type {
            MovementType::Entry => {
                self.apply_entry(conn, tenant_id, input.stock_item_id, input.quantity, input.unit_price)
                    .await?
            }
            MovementType::Exit => {
                self.apply_exit(conn, tenant_id, input.stock_item_id, input.quantity)
                    .await?
            }
        };

        let movement_date = input.movement_date.unwrap_or_else(|| Utc::now().date_naive());

        let row = sqlx::query_as::<_, MovementRow>(
            r#"
            INSERT INTO stock_movements (
                tenant_id, stock_item_id, movement_type, quantity, unit_price, movement_date,
                responsible, origin_or_destination, project_id, invoice_number, supplier_id,
                notes, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING id, tenant_id, stock_item_id, movement_type, quantity, unit_price,
                      movement_date, responsible, origin_or_destination, project_id,
                      invoice_number, supplier_id, notes, created_by, created_at
            "#,
        )
        .bind(tenant_id)
        .bind(input.stock_item_id)
        .bind(input.movement_type.as_str())
        .bind(input.quantity)
        .bind(input.unit_price)
        .bind(movement_date)
        .bind(normalize_text(input.responsible))
        .bind(&origin_or_destination)
        .bind(input.project_id)
        .bind(normalize_text(input.invoice_number))
        .bind(input.supplier_id)
        .bind(normalize_text(input.notes))
        .bind(user_id)
        .fetch_one(&mut *conn)
        .await?;

        if input.movement_type == MovementType::Entry {
            if let Some(price) = cost_bearing(input.unit_price) {
                sqlx::query(
                    r#"
                    INSERT INTO price_history (stock_item_id, recorded_on, price, supplier_id)
                    VALUES ($1, $2, $3, $4)
                    "#,
                )
                .bind(input.stock_item_id)
                .bind(movement_date)
                .bind(price)
                .bind(input.supplier_id)
                .execute(&mut *conn)
                .await?;
            }
        }

        let movement = StockMovement::try_from(row)?;

        tracing::info!(
            stock_item_id = %item.id,
            movement_type = movement.movement_type.as_str(),
            quantity = %movement.quantity,
            balance = %item.current_quantity,
            status = item.status.as_str(),
            "Recorded stock movement"
        );

        Ok(LedgerEntry {
            movement,
            item,
            transition,
        })
    }

    async fn apply_entry(
        &self,
        conn: &mut PgConnection,
        tenant_id: Uuid,
        stock_item_id: Uuid,
        quantity: Decimal,
        unit_price: Option<Decimal>,
    ) -> AppResult<(StockItem, StatusTransition)> {
        let current = sqlx::query_as::<_, ItemRow>(
            r#"
            SELECT id, tenant_id, name, unit, min_quantity, current_quantity, average_price,
                   last_price, last_entry_date, status, supplier_id, sort_order,
                   created_at, updated_at
            FROM stock_items
            WHERE id = $1 AND tenant_id = $2
            FOR UPDATE
            "#,
        )
        .bind(stock_item_id)
        .bind(tenant_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Stock item".to_string()))?;

        let mut balance = current.balance();
        let transition = balance.apply(MovementType::Entry, quantity, unit_price)?;
        let price = cost_bearing(unit_price);

        let row = sqlx::query_as::<_, ItemRow>(
            r#"
            UPDATE stock_items
            SET current_quantity = current_quantity + $3,
                average_price = $4,
                last_price = COALESCE($5, last_price),
                last_entry_date = CASE WHEN $5::NUMERIC IS NULL THEN last_entry_date ELSE NOW() END,
                status = $6,
                updated_at = NOW()
            WHERE id = $1 AND tenant_id = $2
            RETURNING id, tenant_id, name, unit, min_quantity, current_quantity, average_price,
                      last_price, last_entry_date, status, supplier_id, sort_order,
                      created_at, updated_at
            "#,
        )
        .bind(stock_item_id)
        .bind(tenant_id)
        .bind(quantity)
        .bind(balance.average_price)
        .bind(price)
        .bind(balance.status.as_str())
        .fetch_one(&mut *conn)
        .await?;

        Ok((row.into(), transition))
    }

    async fn apply_exit(
        &self,
        conn: &mut PgConnection,
        tenant_id: Uuid,
        stock_item_id: Uuid,
        quantity: Decimal,
    ) -> AppResult<(StockItem, StatusTransition)> {
        if !self
            .try_debit(&mut *conn, tenant_id, stock_item_id, quantity)
            .await?
        {
            let (name, available) = sqlx::query_as::<_, (String, Decimal)>(
                "SELECT name, current_quantity FROM stock_items WHERE id = $1 AND tenant_id = $2",
            )
            .bind(stock_item_id)
            .bind(tenant_id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| AppError::NotFound("Stock item".to_string()))?;

            return Err(AppError::InsufficientStock {
                item: name,
                requested: quantity,
                available,
            });
        }

        // The decrement holds the row lock; status still reflects the previous balance.
        let mut row = sqlx::query_as::<_, ItemRow>(
            r#"
            SELECT id, tenant_id, name, unit, min_quantity, current_quantity, average_price,
                   last_price, last_entry_date, status, supplier_id, sort_order,
                   created_at, updated_at
            FROM stock_items
            WHERE id = $1 AND tenant_id = $2
            "#,
        )
        .bind(stock_item_id)
        .bind(tenant_id)
        .fetch_one(&mut *conn)
        .await?;

        let mut balance = row.balance();
        let transition = balance.settle_status();

        if transition.changed() {
            sqlx::query("UPDATE stock_items SET status = $2 WHERE id = $1")
                .bind(stock_item_id)
                .bind(transition.current.as_str())
                .execute(&mut *conn)
                .await?;
            row.status = transition.current.as_str().to_string();
        }

        Ok((row.into(), transition))
    }

    /// Get a stock item
    pub async fn item(&self, tenant_id: Uuid, stock_item_id: Uuid) -> AppResult<StockItem> {
        let row = sqlx::query_as::<_, ItemRow>(
            r#"
            SELECT id, tenant_id, name, unit, min_quantity, current_quantity, average_price,
                   last_price, last_entry_date, status, supplier_id, sort_order,
                   created_at, updated_at
            FROM stock_items
            WHERE id = $1 AND tenant_id = $2
            "#,
        )
        .bind(stock_item_id)
        .bind(tenant_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Stock item".to_string()))?;

        Ok(row.into())
    }

    async fn ensure_item(&self, tenant_id: Uuid, stock_item_id: Uuid) -> AppResult<()> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM stock_items WHERE id = $1 AND tenant_id = $2)",
        )
        .bind(stock_item_id)
        .bind(tenant_id)
        .fetch_one(&self.db)
        .await?;

        if !exists {
            return Err(AppError::NotFound("Stock item".to_string()));
        }
        Ok(())
    }

    /// Movements of one item, newest first
    pub async fn item_movements(
        &self,
        tenant_id: Uuid,
        stock_item_id: Uuid,
        pagination: &Pagination,
    ) -> AppResult<PaginatedResponse<StockMovement>> {
        self.ensure_item(tenant_id, stock_item_id).await?;

        let filter = MovementFilter {
            stock_item_id: Some(stock_item_id),
            ..Default::default()
        };
        self.all_movements(tenant_id, &filter, pagination).await
    }

    /// Movements across the tenant, newest first
    pub async fn all_movements(
        &self,
        tenant_id: Uuid,
        filter: &MovementFilter,
        pagination: &Pagination,
    ) -> AppResult<PaginatedResponse<StockMovement>> {
        let (offset, limit) = pagination.offset_limit();
        let movement_type = filter.movement_type.map(|t| t.as_str());

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM stock_movements
            WHERE tenant_id = $1
              AND ($2::UUID IS NULL OR stock_item_id = $2)
              AND ($3::TEXT IS NULL OR movement_type = $3)
              AND ($4::UUID IS NULL OR project_id = $4)
              AND ($5::DATE IS NULL OR movement_date >= $5)
              AND ($6::DATE IS NULL OR movement_date <= $6)
            "#,
        )
        .bind(tenant_id)
        .bind(filter.stock_item_id)
        .bind(movement_type)
        .bind(filter.project_id)
        .bind(filter.from)
        .bind(filter.to)
        .fetch_one(&self.db)
        .await?;

        let rows = sqlx::query_as::<_, MovementRow>(
            r#"
            SELECT id, tenant_id, stock_item_id, movement_type, quantity, unit_price,
                   movement_date, responsible, origin_or_destination, project_id,
                   invoice_number, supplier_id, notes, created_by, created_at
            FROM stock_movements
            WHERE tenant_id = $1
              AND ($2::UUID IS NULL OR stock_item_id = $2)
              AND ($3::TEXT IS NULL OR movement_type = $3)
              AND ($4::UUID IS NULL OR project_id = $4)
              AND ($5::DATE IS NULL OR movement_date >= $5)
              AND ($6::DATE IS NULL OR movement_date <= $6)
            ORDER BY movement_date DESC, created_at DESC
            LIMIT $7 OFFSET $8
            "#,
        )
        .bind(tenant_id)
        .bind(filter.stock_item_id)
        .bind(movement_type)
        .bind(filter.project_id)
        .bind(filter.from)
        .bind(filter.to)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;

        let movements = rows
            .into_iter()
            .map(StockMovement::try_from)
            .collect::<AppResult<Vec<_>>>()?;

        Ok(PaginatedResponse::new(movements, pagination, total))
    }

    /// Purchase prices of one item, newest first
    pub async fn price_history(
        &self,
        tenant_id: Uuid,
        stock_item_id: Uuid,
        pagination: &Pagination,
    ) -> AppResult<PaginatedResponse<PriceHistoryEntry>> {
        self.ensure_item(tenant_id, stock_item_id).await?;
        let (offset, limit) = pagination.offset_limit();

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM price_history WHERE stock_item_id = $1",
        )
        .bind(stock_item_id)
        .fetch_one(&self.db)
        .await?;

        let rows = sqlx::query_as::<_, PriceHistoryRow>(
            r#"
            SELECT id, stock_item_id, recorded_on, price, supplier_id, created_at
            FROM price_history
            WHERE stock_item_id = $1
            ORDER BY recorded_on DESC, created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(stock_item_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;

        Ok(PaginatedResponse::new(
            rows.into_iter().map(Into::into).collect(),
            pagination,
            total,
        ))
    }

    /// Headline figures of the tenant's pool
    pub async fn kpis(&self, tenant_id: Uuid) -> AppResult<StockKpis> {
        let row = sqlx::query_as::<_, KpiRow>(
            r#"
            SELECT COUNT(*) AS total_items,
                   COUNT(*) FILTER (WHERE status <> 'normal') AS critical_items,
                   COALESCE(SUM(current_quantity * average_price), 0) AS total_value
            FROM stock_items
            WHERE tenant_id = $1
            "#,
        )
        .bind(tenant_id)
        .fetch_one(&self.db)
        .await?;

        Ok(StockKpis {
            total_items: row.total_items,
            critical_items: row.critical_items,
            total_value: row
                .total_value
                .round_dp_with_strategy(PRICE_SCALE, RoundingStrategy::MidpointAwayFromZero),
        })
    }

    /// Fold the movement log of an item and compare it with the cached balance
    pub async fn reconcile(&self, tenant_id: Uuid, stock_item_id: Uuid) -> AppResult<Reconciliation> {
        let item = self.item(tenant_id, stock_item_id).await?;

        let rows = sqlx::query_as::<_, LogRow>(
            r#"
            SELECT movement_type, quantity
            FROM stock_movements
            WHERE stock_item_id = $1 AND tenant_id = $2
            ORDER BY created_at
            "#,
        )
        .bind(stock_item_id)
        .bind(tenant_id)
        .fetch_all(&self.db)
        .await?;

        let movement_count = rows.len() as i64;
        let log = rows
            .into_iter()
            .map(|row| Ok((parse_movement_type(&row.movement_type)?, row.quantity)))
            .collect::<AppResult<Vec<_>>>()?;
        let ledger_quantity = fold_movements(log);

        let consistent = ledger_quantity == item.current_quantity;
        if !consistent {
            tracing::warn!(
                stock_item_id = %stock_item_id,
                cached = %item.current_quantity,
                ledger = %ledger_quantity,
                "Cached balance disagrees with movement log"
            );
        }

        Ok(Reconciliation {
            stock_item_id,
            cached_quantity: item.current_quantity,
            ledger_quantity,
            movement_count,
            consistent,
        })
    }
}
