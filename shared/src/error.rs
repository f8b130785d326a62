//! Domain rule violations

use rust_decimal::Decimal;
use thiserror::Error;

/// A rule of the ledger or of a workflow state machine was violated.
///
/// These carry no I/O context; the backend maps them onto its HTTP-facing error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("{field} must be greater than zero")]
    NonPositive { field: &'static str },

    #[error("{field} must not be negative")]
    Negative { field: &'static str },

    #[error("{field} allows at most {max_scale} decimal places")]
    TooPrecise { field: &'static str, max_scale: u32 },

    #[error("cannot {action} a {entity} that is {status}")]
    InvalidTransition {
        entity: &'static str,
        action: &'static str,
        status: &'static str,
    },

    #[error("delivery of {requested} exceeds the remaining {remaining}")]
    OverDelivery { requested: Decimal, remaining: Decimal },

    #[error("insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: Decimal, available: Decimal },
}
