//! # Error Types
//!
//! The two error enums the rest of the workspace builds on.
//!
//! [`ValidationError`] rejects malformed input before any business
//! logic runs. [`CoreError`] reports rule failures: a code that
//! matches no product, a shelf that cannot cover a line, a drawer
//! that cannot pay out change.
//!
//! ## Layering
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  ValidationError ──► CoreError ──► DbError ──► BillingError  │
//! │   bad input          rule broken   storage      the till     │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! `DbError` lives in `kirana-db`. The billing crate folds both
//! sides into `BillingError` with transparent wrapping, so a `match`
//! there still sees these variants.

use thiserror::Error;

/// Shorthand result for operations that fail with [`CoreError`].
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Business Rule Errors
// =============================================================================

/// Rule failures raised while pricing or settling a bill.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No catalog row matches the scanned code.
    ///
    /// ## When This Occurs
    /// - Mistyped or stale product code on a bill line
    /// - Product removed between listing and billing
    #[error("No product with code {0}")]
    ProductNotFound(String),

    /// The shelf cannot cover a bill line.
    ///
    /// Raised both by the pre-checkout stock read and by the guarded
    /// decrement inside the transaction when a concurrent bill takes
    /// the last units first.
    #[error("Only {available} of {code} in stock, requested {requested}")]
    InsufficientStock {
        code: String,
        available: i64,
        requested: i64,
    },

    /// The customer tendered less than the bill total.
    ///
    /// Checked before any row is written, so an underpaid bill leaves
    /// no trace in the database.
    #[error("Tendered {paid_paise} paise for a bill of {required_paise} paise")]
    InsufficientPayment {
        required_paise: i64,
        paid_paise: i64,
    },

    /// The drawer cannot pay out the exact change due.
    ///
    /// Whether this aborts the purchase or records it with a no-change
    /// marker is the caller's change policy, not decided here.
    ///
    /// ## Drawer Walk
    /// ```text
    /// owed ₹87, drawer holds ₹50 x1, ₹20 x1, ₹5 x2
    ///   take ₹50      ──► 37 left
    ///   take ₹20      ──► 17 left
    ///   take ₹5 x2    ──► 7 left, no notes remain
    ///   ChangeNotAvailable { amount: 87, short_by: 7 }
    /// ```
    #[error("Cannot make change for ₹{amount}: short by ₹{short_by}")]
    ChangeNotAvailable { amount: i64, short_by: i64 },

    /// No purchase row matches the requested id.
    #[error("No purchase with id {0}")]
    PurchaseNotFound(String),

    /// More lines than a single bill accepts.
    #[error("A bill is limited to {max} lines")]
    BillTooLarge { max: usize },

    /// One line asks for more units than the per-line cap allows.
    #[error("Quantity {requested} is over the per-line limit of {max}")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Input failed validation before any rule ran.
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Input Validation
// =============================================================================

/// Rejections produced by the `validation` module.
///
/// Each variant names the offending field so the till can point the
/// cashier at the box to fix.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or blank.
    #[error("{field} must not be empty")]
    Required { field: String },

    /// Text field over its length cap.
    #[error("{field} is longer than {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric field outside its accepted window.
    #[error("{field} must fall between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Zero or negative where only positive values make sense.
    #[error("{field} must be greater than zero")]
    MustBePositive { field: String },

    /// Shape is wrong: not an email, not a UUID, bad characters.
    #[error("{field} is not valid: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_error_names_the_shelf_count() {
        let err = CoreError::InsufficientStock {
            code: "RICE-1KG".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(err.to_string(), "Only 3 of RICE-1KG in stock, requested 5");
    }

    #[test]
    fn test_change_error_reports_the_shortfall() {
        let err = CoreError::ChangeNotAvailable {
            amount: 87,
            short_by: 7,
        };
        assert_eq!(err.to_string(), "Cannot make change for ₹87: short by ₹7");
    }

    #[test]
    fn test_out_of_range_names_both_bounds() {
        let err = ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: 999,
        };
        assert_eq!(err.to_string(), "quantity must fall between 1 and 999");
    }

    #[test]
    fn test_validation_error_wraps_into_core() {
        let err: CoreError = ValidationError::Required {
            field: "email".to_string(),
        }
        .into();
        assert!(matches!(err, CoreError::Validation(_)));
        assert_eq!(err.to_string(), "Invalid input: email must not be empty");
    }
}
