//! SiteStock inventory core
//!
//! A centralized stock pool per tenant, consumed by construction projects
//! through stock requests and replenished through purchase requests.

use std::sync::Arc;

use axum::{routing::get, Router};
use sqlx::PgPool;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod external;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod services;

pub use config::Config;

use external::{PgProjectDirectory, ProjectDirectory};
use services::{
    AuditSink, Dispatcher, LogNotificationSink, NotificationSink, PgAuditLog, PgNotificationSink,
    PurchaseRequestWorkflow, StockLedger, StockRequestWorkflow,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<Config>,
    pub ledger: StockLedger,
    pub stock_requests: StockRequestWorkflow,
    pub purchase_requests: PurchaseRequestWorkflow,
}

impl AppState {
    /// Wire the services onto the Postgres-backed collaborators
    pub fn new(db: PgPool, config: Config) -> Self {
        let notifications: Arc<dyn NotificationSink> = if config.notifications.enabled {
            Arc::new(PgNotificationSink::new(db.clone()))
        } else {
            Arc::new(LogNotificationSink)
        };
        let audit: Arc<dyn AuditSink> = Arc::new(PgAuditLog::new(db.clone()));
        let projects: Arc<dyn ProjectDirectory> = Arc::new(PgProjectDirectory::new(db.clone()));

        let dispatcher = Dispatcher::new(notifications, audit, config.notifications.clone());
        Self::with_collaborators(db, config, projects, dispatcher)
    }

    /// Wire the services onto caller-supplied collaborators
    pub fn with_collaborators(
        db: PgPool,
        config: Config,
        projects: Arc<dyn ProjectDirectory>,
        dispatcher: Dispatcher,
    ) -> Self {
        let ledger = StockLedger::new(db.clone(), projects.clone(), dispatcher.clone());
        let purchase_requests =
            PurchaseRequestWorkflow::new(db.clone(), ledger.clone(), dispatcher.clone());
        let stock_requests = StockRequestWorkflow::new(
            db.clone(),
            ledger.clone(),
            purchase_requests.clone(),
            projects,
            dispatcher,
        );

        Self {
            db,
            config: Arc::new(config),
            ledger,
            stock_requests,
            purchase_requests,
        }
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", routes::api_routes(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "SiteStock API v1"
}
