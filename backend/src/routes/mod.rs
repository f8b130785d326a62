//! Route definitions for the SiteStock API

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Protected routes - stock ledger
        .nest("/stock", stock_routes(state.clone()))
        // Protected routes - project demand
        .nest("/stock-requests", stock_request_routes(state.clone()))
        // Protected routes - replenishment
        .nest("/purchase-requests", purchase_request_routes(state))
}

/// Stock ledger routes (protected)
fn stock_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/kpis", get(handlers::get_kpis))
        .route(
            "/movements",
            get(handlers::list_movements).post(handlers::record_movement),
        )
        .route("/items/:item_id", get(handlers::get_item))
        .route("/items/:item_id/movements", get(handlers::list_item_movements))
        .route("/items/:item_id/price-history", get(handlers::get_price_history))
        .route("/items/:item_id/reconcile", get(handlers::reconcile_item))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Stock request routes (protected)
fn stock_request_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_stock_requests).post(handlers::create_stock_request),
        )
        .route("/:request_id", get(handlers::get_stock_request))
        .route("/:request_id/approve", post(handlers::approve_stock_request))
        .route("/:request_id/reject", post(handlers::reject_stock_request))
        .route("/:request_id/deliver", post(handlers::deliver_stock_request))
        .route("/:request_id/deliveries", get(handlers::list_deliveries))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Purchase request routes (protected)
fn purchase_request_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_purchase_requests).post(handlers::create_purchase_request),
        )
        .route("/:purchase_id", get(handlers::get_purchase_request))
        .route("/:purchase_id/order", post(handlers::order_purchase_request))
        .route("/:purchase_id/complete", post(handlers::complete_purchase_request))
        .route("/:purchase_id/cancel", post(handlers::cancel_purchase_request))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
