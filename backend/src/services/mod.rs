//! Business logic services for the SiteStock inventory core

pub mod audit;
pub mod dispatch;
pub mod ledger;
pub mod notification;
pub mod purchase_request;
pub mod stock_request;

pub use audit::{AuditSink, PgAuditLog};
pub use dispatch::Dispatcher;
pub use ledger::StockLedger;
pub use notification::{LogNotificationSink, NotificationSink, PgNotificationSink};
pub use purchase_request::PurchaseRequestWorkflow;
pub use stock_request::StockRequestWorkflow;
