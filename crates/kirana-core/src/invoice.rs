//! # Invoice Module
//!
//! Line item math and invoice totals.
//!
//! ## The Money Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Invoice Calculation Flow                            │
//! │                                                                         │
//! │  Product ──┬──► LineItem (frozen price, rate, quantity)                 │
//! │            │         │                                                  │
//! │            │         ├──► line_total  = unit_price × quantity           │
//! │            │         └──► tax_amount  = line_total × rate (half-up)     │
//! │            │                                                            │
//! │  lines ────┴──► InvoiceCalculator::compute                              │
//! │                      │                                                  │
//! │                      ├──► subtotal    = Σ line_total   (exact paise)    │
//! │                      ├──► tax_total   = Σ tax_amount   (exact paise)    │
//! │                      └──► grand_total = round_to_rupee(subtotal + tax)  │
//! │                                                                         │
//! │  The grand total is the ONLY rounded figure: the counter deals in       │
//! │  whole rupees, the ledger keeps exact paise underneath.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Stock is NOT checked here. The calculator is pure arithmetic; the
//! billing service verifies availability and the checkout transaction
//! enforces it with guarded decrements.

use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::{Product, TaxRate};

// =============================================================================
// Line Item
// =============================================================================

/// One line of a bill being computed.
///
/// ## Design Notes
/// - `product_id`: Reference to the product (for database writes later)
/// - Price, name and rate are frozen copies taken when the line is built.
///   A price edit in the catalog mid-checkout does not change this bill.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    /// Product ID (UUID)
    pub product_id: String,

    /// Product code at time of billing (frozen)
    pub code: String,

    /// Product name at time of billing (frozen)
    pub name: String,

    /// Price in paise at time of billing (frozen)
    pub unit_price_paise: i64,

    /// Tax rate in basis points at time of billing (frozen)
    pub tax_rate_bps: u32,

    /// Quantity billed
    pub quantity: i64,
}

impl LineItem {
    /// Creates a line item from a product and quantity.
    ///
    /// ## Price Freezing
    /// The price is captured at this moment. If the product price changes
    /// in the database, this line retains the price the shelf promised.
    pub fn from_product(product: &Product, quantity: i64) -> Self {
        LineItem {
            product_id: product.id.clone(),
            code: product.code.clone(),
            name: product.name.clone(),
            unit_price_paise: product.unit_price_paise,
            tax_rate_bps: product.tax_rate_bps,
            quantity,
        }
    }

    /// Line total before tax (unit price × quantity). Exact paise.
    pub fn line_total(&self) -> Money {
        Money::from_paise(self.unit_price_paise).multiply_quantity(self.quantity)
    }

    /// Tax amount for this line, rounded half-up to the paisa.
    pub fn tax_amount(&self) -> Money {
        self.line_total()
            .calculate_tax(TaxRate::from_bps(self.tax_rate_bps))
    }

    /// Line total including tax.
    pub fn total_with_tax(&self) -> Money {
        self.line_total() + self.tax_amount()
    }
}

// =============================================================================
// Invoice Totals
// =============================================================================

/// The three figures every bill ends with.
///
/// `subtotal` and `tax_total` are exact paise sums. `grand_total` is the
/// whole-rupee figure the customer actually pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceTotals {
    /// Sum of all line totals, before tax. Exact.
    pub subtotal: Money,

    /// Sum of all per-line tax amounts. Exact.
    pub tax_total: Money,

    /// (subtotal + tax_total) rounded half-up to the whole rupee.
    pub grand_total: Money,
}

impl InvoiceTotals {
    /// All-zero totals (an empty bill).
    pub fn zero() -> Self {
        InvoiceTotals {
            subtotal: Money::zero(),
            tax_total: Money::zero(),
            grand_total: Money::zero(),
        }
    }

    /// The paise gained or lost by rounding the grand total.
    ///
    /// Positive when rounding went up (customer pays the extra paise),
    /// negative when it went down. Printed on the receipt as "round off".
    pub fn rounding_adjustment(&self) -> Money {
        self.grand_total - (self.subtotal + self.tax_total)
    }
}

// =============================================================================
// Invoice Calculator
// =============================================================================

/// Computes invoice totals from a set of bill lines.
///
/// Pure arithmetic, deterministic, no I/O. Callers own stock checks and
/// persistence.
pub struct InvoiceCalculator;

impl InvoiceCalculator {
    /// Computes subtotal, tax total and rounded grand total.
    ///
    /// ## Guarantees
    /// - `subtotal == Σ line.line_total()` exactly
    /// - `tax_total == Σ line.tax_amount()` exactly
    /// - `grand_total` is a whole-rupee amount, half-up from
    ///   `subtotal + tax_total`
    /// - An empty slice yields all zeros
    ///
    /// ## Example
    /// ```rust
    /// use kirana_core::invoice::{InvoiceCalculator, LineItem};
    ///
    /// let lines = vec![LineItem {
    ///     product_id: "p1".to_string(),
    ///     code: "RICE-1KG".to_string(),
    ///     name: "Basmati Rice 1kg".to_string(),
    ///     unit_price_paise: 10050, // ₹100.50
    ///     tax_rate_bps: 0,
    ///     quantity: 1,
    /// }];
    ///
    /// let totals = InvoiceCalculator::compute(&lines);
    /// assert_eq!(totals.subtotal.paise(), 10050);
    /// assert_eq!(totals.grand_total.paise(), 10100); // ₹100.50 → ₹101
    /// ```
    pub fn compute(lines: &[LineItem]) -> InvoiceTotals {
        let mut subtotal = Money::zero();
        let mut tax_total = Money::zero();

        for line in lines {
            subtotal += line.line_total();
            tax_total += line.tax_amount();
        }

        InvoiceTotals {
            subtotal,
            tax_total,
            grand_total: (subtotal + tax_total).round_to_rupee(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
