//! # kirana-core: Pure Business Logic for Kirana POS
//!
//! This crate is the **heart** of Kirana POS. It contains all business logic
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Kirana POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 kirana-billing (Billing Engine)                 │   │
//! │  │   compute_totals ──► generate_bill ──► reserve_change           │   │
//! │  │                            │                                    │   │
//! │  │                            └──► invoice dispatch (async)        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ kirana-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  invoice  │  │  change   │  │   │
//! │  │   │  Product  │  │   Money   │  │ LineItem  │  │ ChangeMaker│ │   │
//! │  │   │ Purchase  │  │  TaxCalc  │  │  Totals   │  │ Breakdown │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                   kirana-db (Database Layer)                    │   │
//! │  │             SQLite queries, migrations, repositories            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Customer, Purchase, Denomination)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`invoice`] - Line item math and invoice totals
//! - [`change`] - Greedy change making against the cash drawer
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in paise (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use kirana_core::money::Money;
//! use kirana_core::types::TaxRate;
//!
//! // Create money from paise (never from floats!)
//! let price = Money::from_paise(10050); // ₹100.50
//!
//! // Calculate tax on a line
//! let tax_rate = TaxRate::from_bps(1800); // 18% GST
//! let tax = price.calculate_tax(tax_rate);
//!
//! // Tax on ₹100.50 at 18% = ₹18.09
//! assert_eq!(tax.paise(), 1809);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod change;
pub mod error;
pub mod invoice;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use kirana_core::Money` instead of
// `use kirana_core::money::Money`

pub use change::ChangeMaker;
pub use error::{CoreError, CoreResult, ValidationError};
pub use invoice::{InvoiceCalculator, InvoiceTotals, LineItem};
pub use money::Money;
pub use types::*;
pub use validation::{
    validate_bill_size, validate_email, validate_paid_amount, validate_quantity,
    ValidationResult,
};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct lines allowed on a single bill
///
/// ## Business Reason
/// Prevents runaway carts and ensures reasonable transaction sizes.
/// Can be made configurable per-store in future versions.
pub const MAX_BILL_LINES: usize = 100;

/// Maximum quantity of a single product on a bill
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10)
/// Configurable per-store in future versions.
pub const MAX_LINE_QUANTITY: i64 = 999;
