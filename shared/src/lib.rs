//! Shared types and domain rules for the SiteStock inventory platform
//!
//! This crate holds everything about the stock ledger and its fulfillment
//! workflows that does not touch I/O: enums and their persisted forms,
//! weighted-average costing, status derivation, and the request state machines.

pub mod error;
pub mod ledger;
pub mod models;
pub mod types;
pub mod validation;

pub use error::*;
pub use models::*;
pub use types::*;
pub use validation::*;
