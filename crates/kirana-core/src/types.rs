//! # Domain Types
//!
//! Core domain types used throughout Kirana POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │    Purchase     │   │  PurchaseItem   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  code (business)│   │  customer_id    │   │  purchase_id    │       │
//! │  │  name           │   │  grand_total    │   │  quantity       │       │
//! │  │  unit_price     │   │  change_due     │   │  line_total     │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    TaxRate      │   │  Denomination   │   │ ChangeBreakdown │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  bps (u32)      │   │  value (₹)      │   │  value → count  │       │
//! │  │  500 = 5.00%    │   │  available_count│   │  {"50":1,"5":2} │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business ID: (product code, customer email) - human-readable

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::money::Money;

// =============================================================================
// Cash Drawer Constants
// =============================================================================

/// The note and coin values a counter drawer is stocked with, largest first.
///
/// Change making walks this set from the 500-rupee note down to the
/// 1-rupee coin. The drawer table is seeded with exactly these values.
pub const STANDARD_NOTE_VALUES: [i64; 7] = [500, 200, 50, 20, 10, 5, 1];

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 500 bps = 5.00% (e.g., GST on packaged staples)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage (for convenience).
    pub fn from_percentage(pct: f64) -> Self {
        let bps = (pct * 100.0).round() as u32;
        TaxRate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    /// Checks if tax rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A customer identified by email.
///
/// The counter creates customers lazily: the first bill for an unknown
/// email inserts the row, later bills reuse it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Customer {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Email address - the business identifier, unique per store.
    pub email: String,

    /// When the customer was first seen.
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Product code - business identifier printed on the shelf label.
    pub code: String,

    /// Display name shown to the cashier and on the receipt.
    pub name: String,

    /// Units currently on the shelf. Never negative.
    pub available_stock: i64,

    /// Price per unit in paise (smallest currency unit).
    pub unit_price_paise: i64,

    /// Tax rate in basis points (500 = 5.00%).
    pub tax_rate_bps: u32,

    /// When the product was created.
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the unit price as a Money type.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_paise(self.unit_price_paise)
    }

    /// Returns the tax rate.
    #[inline]
    pub fn tax_rate(&self) -> TaxRate {
        TaxRate::from_bps(self.tax_rate_bps)
    }

    /// Checks whether the shelf holds enough units for the requested quantity.
    #[inline]
    pub fn can_supply(&self, quantity: i64) -> bool {
        self.available_stock >= quantity
    }
}

// =============================================================================
// Denomination
// =============================================================================

/// One slot of the cash drawer: a note (or coin) value and how many of it
/// the drawer currently holds.
///
/// `value` is in whole rupees and unique per drawer. `available_count`
/// never goes negative: every decrement runs as a guarded UPDATE inside
/// a transaction, and the schema carries a CHECK constraint as backstop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Denomination {
    /// Face value in whole rupees (500, 200, 50, ...).
    pub value: i64,

    /// How many notes/coins of this value the drawer holds.
    pub available_count: i64,
}

impl Denomination {
    /// Creates a denomination slot.
    #[inline]
    pub const fn new(value: i64, available_count: i64) -> Self {
        Denomination {
            value,
            available_count,
        }
    }

    /// Total cash value held in this slot.
    #[inline]
    pub fn slot_value(&self) -> Money {
        Money::from_rupees(self.value * self.available_count, 0)
    }
}

// =============================================================================
// Change Breakdown
// =============================================================================

/// Which notes make up a customer's change: face value → count handed out.
///
/// Serializes as a JSON object with stringified keys (`{"50":1,"20":1}`),
/// which is exactly the shape persisted on the purchase row.
///
/// Invariant: on a successful change computation,
/// `breakdown.total_value() == change due`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeBreakdown(BTreeMap<i64, i64>);

impl ChangeBreakdown {
    /// Creates an empty breakdown (no change due).
    pub fn new() -> Self {
        ChangeBreakdown(BTreeMap::new())
    }

    /// Records `count` notes of `value` rupees. Counts of zero are not stored.
    pub fn add(&mut self, value: i64, count: i64) {
        if count > 0 {
            self.0.insert(value, count);
        }
    }

    /// How many notes of `value` this breakdown hands out.
    pub fn count_for(&self, value: i64) -> i64 {
        self.0.get(&value).copied().unwrap_or(0)
    }

    /// True when no notes are handed out.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of distinct denominations used.
    pub fn denomination_count(&self) -> usize {
        self.0.len()
    }

    /// Total number of physical notes/coins handed out.
    pub fn note_count(&self) -> i64 {
        self.0.values().sum()
    }

    /// Total cash value of the breakdown.
    pub fn total_value(&self) -> Money {
        let rupees: i64 = self.0.iter().map(|(value, count)| value * count).sum();
        Money::from_rupees(rupees, 0)
    }

    /// Iterates largest note first - the order change is counted out.
    pub fn iter_descending(&self) -> impl Iterator<Item = (i64, i64)> + '_ {
        self.0.iter().rev().map(|(v, c)| (*v, *c))
    }
}

// =============================================================================
// Purchase
// =============================================================================

/// A committed purchase: the immutable record of one bill.
///
/// All monetary fields are paise. `grand_total_paise` is always a
/// whole-rupee amount (the invoice calculator rounds it half-up) and
/// `change_due_paise` is the whole-rupee change actually served.
///
/// `change_breakdown` is `None` when change was due but the drawer could
/// not make it - an explicit marker, never a silent omission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Purchase {
    pub id: String,
    pub customer_id: String,
    pub subtotal_paise: i64,
    pub tax_total_paise: i64,
    pub grand_total_paise: i64,
    pub paid_paise: i64,
    pub change_due_paise: i64,
    pub change_breakdown: Option<ChangeBreakdown>,
    pub created_at: DateTime<Utc>,
}

impl Purchase {
    /// Returns the subtotal as Money.
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_paise(self.subtotal_paise)
    }

    /// Returns the tax total as Money.
    #[inline]
    pub fn tax_total(&self) -> Money {
        Money::from_paise(self.tax_total_paise)
    }

    /// Returns the grand total as Money.
    #[inline]
    pub fn grand_total(&self) -> Money {
        Money::from_paise(self.grand_total_paise)
    }

    /// Returns the amount the customer tendered as Money.
    #[inline]
    pub fn paid(&self) -> Money {
        Money::from_paise(self.paid_paise)
    }

    /// Returns the change due as Money.
    #[inline]
    pub fn change_due(&self) -> Money {
        Money::from_paise(self.change_due_paise)
    }

    /// True when change was due but the drawer could not serve it.
    pub fn change_unavailable(&self) -> bool {
        self.change_due_paise > 0 && self.change_breakdown.is_none()
    }
}

// =============================================================================
// Purchase Item
// =============================================================================

/// A line item on a purchase.
/// Uses snapshot pattern to freeze product data at time of sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct PurchaseItem {
    pub id: String,
    pub purchase_id: String,
    pub product_id: String,
    /// Product code at time of sale (frozen).
    pub code_snapshot: String,
    /// Product name at time of sale (frozen).
    pub name_snapshot: String,
    /// Unit price in paise at time of sale (frozen).
    pub unit_price_paise: i64,
    /// Quantity sold.
    pub quantity: i64,
    /// Tax rate in basis points at time of sale (frozen).
    pub tax_rate_bps: u32,
    /// Line total before tax (unit_price × quantity).
    pub line_total_paise: i64,
    /// Tax for this line item.
    pub tax_paise: i64,
    pub created_at: DateTime<Utc>,
}

impl PurchaseItem {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_paise(self.unit_price_paise)
    }

    /// Returns the line total as Money.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_paise(self.line_total_paise)
    }

    /// Returns the line tax as Money.
    #[inline]
    pub fn tax_amount(&self) -> Money {
        Money::from_paise(self.tax_paise)
    }

    /// Line total including tax - the rightmost column on the receipt.
    #[inline]
    pub fn total_with_tax(&self) -> Money {
        self.line_total() + self.tax_amount()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
