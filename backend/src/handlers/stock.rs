//! HTTP handlers for the stock ledger

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use shared::{
    PaginatedResponse, Pagination, PriceHistoryEntry, Reconciliation, StockItem, StockKpis,
    StockMovement,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::{check_permission, CurrentUser};
use crate::services::ledger::{MovementFilter, RecordMovementInput};
use crate::AppState;

/// Movement and the item balance after it
#[derive(Debug, Serialize)]
pub struct MovementResponse {
    pub movement: StockMovement,
    pub item: StockItem,
}

/// Headline figures of the stock pool
pub async fn get_kpis(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<StockKpis>> {
    let kpis = state.ledger.kpis(current_user.0.tenant_id).await?;
    Ok(Json(kpis))
}

/// Record a manual entry or exit
pub async fn record_movement(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<RecordMovementInput>,
) -> AppResult<(StatusCode, Json<MovementResponse>)> {
    check_permission(&current_user.0, "stock:move")?;

    let entry = state
        .ledger
        .record_movement(current_user.0.tenant_id, current_user.0.user_id, input)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(MovementResponse {
            movement: entry.movement,
            item: entry.item,
        }),
    ))
}

/// List movements across the pool
pub async fn list_movements(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(filter): Query<MovementFilter>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<PaginatedResponse<StockMovement>>> {
    let movements = state
        .ledger
        .all_movements(current_user.0.tenant_id, &filter, &pagination)
        .await?;
    Ok(Json(movements))
}

/// Get a stock item
pub async fn get_item(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(item_id): Path<Uuid>,
) -> AppResult<Json<StockItem>> {
    let item = state.ledger.item(current_user.0.tenant_id, item_id).await?;
    Ok(Json(item))
}

/// List movements of one item
pub async fn list_item_movements(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(item_id): Path<Uuid>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<PaginatedResponse<StockMovement>>> {
    let movements = state
        .ledger
        .item_movements(current_user.0.tenant_id, item_id, &pagination)
        .await?;
    Ok(Json(movements))
}

/// List purchase prices of one item
pub async fn get_price_history(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(item_id): Path<Uuid>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<PaginatedResponse<PriceHistoryEntry>>> {
    let history = state
        .ledger
        .price_history(current_user.0.tenant_id, item_id, &pagination)
        .await?;
    Ok(Json(history))
}

/// Compare the cached balance of an item with its movement log
pub async fn reconcile_item(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(item_id): Path<Uuid>,
) -> AppResult<Json<Reconciliation>> {
    let result = state
        .ledger
        .reconcile(current_user.0.tenant_id, item_id)
        .await?;
    Ok(Json(result))
}
