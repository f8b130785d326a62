//! HTTP handlers for the SiteStock API

pub mod health;
pub mod purchase_request;
pub mod stock;
pub mod stock_request;

pub use health::health_check;
pub use purchase_request::*;
pub use stock::*;
pub use stock_request::*;
