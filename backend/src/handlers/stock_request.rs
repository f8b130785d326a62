//! HTTP handlers for stock requests

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use shared::{PaginatedResponse, Pagination, StockRequest, StockRequestDelivery};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::{check_permission, CurrentUser};
use crate::services::stock_request::{
    CreateStockRequestInput, DeliverStockRequestInput, DeliveryOutcome, RejectStockRequestInput,
    StockRequestFilter,
};
use crate::AppState;

/// List stock requests
pub async fn list_stock_requests(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(filter): Query<StockRequestFilter>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<PaginatedResponse<StockRequest>>> {
    let requests = state
        .stock_requests
        .list(current_user.0.tenant_id, &filter, &pagination)
        .await?;
    Ok(Json(requests))
}

/// Create a stock request for a project
pub async fn create_stock_request(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateStockRequestInput>,
) -> AppResult<(StatusCode, Json<StockRequest>)> {
    let request = state
        .stock_requests
        .create(current_user.0.tenant_id, current_user.0.user_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// Get a stock request
pub async fn get_stock_request(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(request_id): Path<Uuid>,
) -> AppResult<Json<StockRequest>> {
    let request = state
        .stock_requests
        .get(current_user.0.tenant_id, request_id)
        .await?;
    Ok(Json(request))
}

/// Approve a pending stock request
pub async fn approve_stock_request(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(request_id): Path<Uuid>,
) -> AppResult<Json<StockRequest>> {
    check_permission(&current_user.0, "stock_requests:approve")?;

    let request = state
        .stock_requests
        .approve(current_user.0.tenant_id, current_user.0.user_id, request_id)
        .await?;
    Ok(Json(request))
}

/// Reject a pending stock request
pub async fn reject_stock_request(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(request_id): Path<Uuid>,
    input: Option<Json<RejectStockRequestInput>>,
) -> AppResult<Json<StockRequest>> {
    check_permission(&current_user.0, "stock_requests:approve")?;
    let input = input.map(|Json(input)| input).unwrap_or_default();

    let request = state
        .stock_requests
        .reject(
            current_user.0.tenant_id,
            current_user.0.user_id,
            request_id,
            input,
        )
        .await?;
    Ok(Json(request))
}

/// Deliver part or all of an approved request
pub async fn deliver_stock_request(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(request_id): Path<Uuid>,
    Json(input): Json<DeliverStockRequestInput>,
) -> AppResult<Json<DeliveryOutcome>> {
    check_permission(&current_user.0, "stock_requests:deliver")?;

    let outcome = state
        .stock_requests
        .deliver(
            current_user.0.tenant_id,
            current_user.0.user_id,
            request_id,
            input,
        )
        .await?;
    Ok(Json(outcome))
}

/// List the deliveries of a stock request
pub async fn list_deliveries(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(request_id): Path<Uuid>,
) -> AppResult<Json<Vec<StockRequestDelivery>>> {
    let deliveries = state
        .stock_requests
        .list_deliveries(current_user.0.tenant_id, request_id)
        .await?;
    Ok(Json(deliveries))
}
