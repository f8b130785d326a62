//! HTTP handlers for purchase requests

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use shared::{PaginatedResponse, Pagination, PurchaseRequest};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::{check_permission, CurrentUser};
use crate::services::purchase_request::{
    CompletePurchaseInput, CreatePurchaseRequestInput, PurchaseRequestFilter,
};
use crate::AppState;

/// List purchase requests
pub async fn list_purchase_requests(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(filter): Query<PurchaseRequestFilter>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<PaginatedResponse<PurchaseRequest>>> {
    let purchases = state
        .purchase_requests
        .list(current_user.0.tenant_id, &filter, &pagination)
        .await?;
    Ok(Json(purchases))
}

/// Create a purchase request
pub async fn create_purchase_request(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreatePurchaseRequestInput>,
) -> AppResult<(StatusCode, Json<PurchaseRequest>)> {
    let purchase = state
        .purchase_requests
        .create(current_user.0.tenant_id, current_user.0.user_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(purchase)))
}

/// Get a purchase request
pub async fn get_purchase_request(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(purchase_id): Path<Uuid>,
) -> AppResult<Json<PurchaseRequest>> {
    let purchase = state
        .purchase_requests
        .get(current_user.0.tenant_id, purchase_id)
        .await?;
    Ok(Json(purchase))
}

/// Mark a purchase request as ordered
pub async fn order_purchase_request(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(purchase_id): Path<Uuid>,
) -> AppResult<Json<PurchaseRequest>> {
    check_permission(&current_user.0, "purchase_requests:order")?;

    let purchase = state
        .purchase_requests
        .mark_ordered(current_user.0.tenant_id, current_user.0.user_id, purchase_id)
        .await?;
    Ok(Json(purchase))
}

/// Complete an ordered purchase, crediting the stock pool
pub async fn complete_purchase_request(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(purchase_id): Path<Uuid>,
    Json(input): Json<CompletePurchaseInput>,
) -> AppResult<Json<PurchaseRequest>> {
    check_permission(&current_user.0, "purchase_requests:complete")?;

    let purchase = state
        .purchase_requests
        .complete(
            current_user.0.tenant_id,
            current_user.0.user_id,
            purchase_id,
            input,
        )
        .await?;
    Ok(Json(purchase))
}

/// Cancel an open purchase request.
///
/// Cancelling a completed or already cancelled purchase is a disallowed
/// transition and answers 422 `INVALID_STATE_TRANSITION`, like every other
/// action attempted from the wrong state.
pub async fn cancel_purchase_request(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(purchase_id): Path<Uuid>,
) -> AppResult<Json<PurchaseRequest>> {
    check_permission(&current_user.0, "purchase_requests:order")?;

    let purchase = state
        .purchase_requests
        .cancel(current_user.0.tenant_id, current_user.0.user_id, purchase_id)
        .await?;
    Ok(Json(purchase))
}
