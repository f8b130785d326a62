//! Domain models for the SiteStock inventory platform

mod purchase_request;
mod stock;
mod stock_request;

pub use purchase_request::*;
pub use stock::*;
pub use stock_request::*;
