//! # Billing Error Types
//!
//! Error types for the billing engine.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  CoreError (kirana-core)      DbError (kirana-db)                      │
//! │       │                            │                                    │
//! │       └──────────┬─────────────────┘                                    │
//! │                  ▼                                                      │
//! │  BillingError (this module) ← One type at the till boundary            │
//! │                  │                                                      │
//! │                  ▼                                                      │
//! │  Operator sees "Only 3 RICE-1KG in stock" / "Cannot make change"       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Domain failures keep their original type through `transparent` wrapping,
//! so callers can still match on `CoreError::InsufficientStock` and friends.

use thiserror::Error;

use kirana_core::CoreError;
use kirana_db::DbError;

/// Billing engine errors.
#[derive(Debug, Error)]
pub enum BillingError {
    /// A bill must have at least one line.
    #[error("Bill has no lines")]
    EmptyCart,

    /// Domain rule violation (stock, change, payment, validation).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Storage failure.
    #[error(transparent)]
    Db(#[from] DbError),

    /// Configuration file could not be read or parsed.
    #[error("Failed to load config: {0}")]
    ConfigLoad(String),

    /// Configuration loaded but holds unusable values.
    #[error("Invalid billing configuration: {0}")]
    InvalidConfig(String),
}

impl BillingError {
    /// `true` if a line asked for more units than the shelf holds.
    pub fn is_insufficient_stock(&self) -> bool {
        matches!(self, BillingError::Core(CoreError::InsufficientStock { .. }))
    }

    /// `true` if the drawer could not make exact change.
    pub fn is_change_not_available(&self) -> bool {
        matches!(self, BillingError::Core(CoreError::ChangeNotAvailable { .. }))
    }

    /// `true` if the tendered cash did not cover the bill.
    pub fn is_insufficient_payment(&self) -> bool {
        matches!(self, BillingError::Core(CoreError::InsufficientPayment { .. }))
    }
}

impl From<std::io::Error> for BillingError {
    fn from(err: std::io::Error) -> Self {
        BillingError::ConfigLoad(err.to_string())
    }
}

impl From<toml::de::Error> for BillingError {
    fn from(err: toml::de::Error) -> Self {
        BillingError::ConfigLoad(err.to_string())
    }
}

/// Result type for billing operations.
pub type BillingResult<T> = Result<T, BillingError>;
