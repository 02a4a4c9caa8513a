//! # Billing Service
//!
//! The checkout pipeline: cart in, committed purchase and receipt out.
//!
//! ## Checkout Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        generate_bill()                                  │
//! │                                                                         │
//! │  BillRequest                                                            │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  1. Validate email, tendered amount, line quantities                    │
//! │  2. Load products, fail fast on missing codes / obvious shortages       │
//! │  3. Compute totals (subtotal + tax, grand total rounded to rupee)       │
//! │  4. Reject underpayment before anything is written                      │
//! │  5. Resolve the customer (find or create by email)                      │
//! │      │                                                                  │
//! │      ▼            ┌──────────── one transaction ────────────┐           │
//! │  6. Reserve stock │ guarded decrement per line              │           │
//! │  7. Plan change   │ greedy walk over this tx's drawer view  │           │
//! │  8. Take notes    │ guarded decrement per denomination      │           │
//! │  9. Write purchase + line snapshots                         │           │
//! │ 10. COMMIT        └─────────────────────────────────────────┘           │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │ 11. Queue invoice notice (fire-and-forget, after commit only)           │
//! │ 12. Return Receipt                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Any error between steps 6 and 9 drops the transaction, which rolls the
//! whole checkout back. Two tills hammering the same shelf or the same
//! drawer slot are serialized by the guarded decrements: the loser's guard
//! matches zero rows and the loser's transaction never commits.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use kirana_core::{
    validate_bill_size, validate_email, validate_paid_amount, validate_quantity,
    ChangeBreakdown, ChangeMaker, CoreError, InvoiceCalculator, InvoiceTotals, LineItem, Money,
    Purchase, PurchaseItem,
};
use kirana_db::Database;

use crate::config::{BillingConfig, ChangePolicy};
use crate::error::{BillingError, BillingResult};
use crate::notify::NotifierHandle;

// =============================================================================
// Request Types
// =============================================================================

/// One cart line as the till sends it: a product code and how many.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    /// Product code as printed on the shelf label.
    pub code: String,

    /// Units requested.
    pub quantity: i64,
}

/// A complete checkout request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillRequest {
    /// Customer email; the customer record is created on first purchase.
    pub customer_email: String,

    /// Cart contents.
    pub lines: Vec<CartLine>,

    /// Cash tendered, in paise.
    pub paid_paise: i64,

    /// Per-request change policy. `None` uses the configured default.
    #[serde(default)]
    pub change_policy: Option<ChangePolicy>,
}

// =============================================================================
// Receipt Types
// =============================================================================

/// One printed line on the receipt.
#[derive(Debug, Clone, Serialize)]
pub struct ReceiptRow {
    pub code: String,
    pub name: String,
    pub unit_price_paise: i64,
    pub quantity: i64,
    pub tax_rate_bps: u32,
    pub line_total_paise: i64,
    pub tax_paise: i64,
    pub total_with_tax_paise: i64,
}

impl ReceiptRow {
    fn from_line(line: &LineItem) -> Self {
        ReceiptRow {
            code: line.code.clone(),
            name: line.name.clone(),
            unit_price_paise: line.unit_price_paise,
            quantity: line.quantity,
            tax_rate_bps: line.tax_rate_bps,
            line_total_paise: line.line_total().paise(),
            tax_paise: line.tax_amount().paise(),
            total_with_tax_paise: line.total_with_tax().paise(),
        }
    }
}

/// What the cashier hands back with the goods.
#[derive(Debug, Clone, Serialize)]
pub struct Receipt {
    /// Store name from configuration.
    pub store_name: String,

    /// The committed purchase, totals and change breakdown included.
    pub purchase: Purchase,

    /// Per-line detail in cart order.
    pub rows: Vec<ReceiptRow>,
}

// =============================================================================
// Billing Service
// =============================================================================

/// Coordinates validation, totals, stock, drawer and persistence.
///
/// Cheap to clone: the database pool and notifier handle are shared.
#[derive(Clone)]
pub struct BillingService {
    db: Arc<Database>,
    notifier: NotifierHandle,
    config: BillingConfig,
}

impl BillingService {
    /// Creates a billing service over an opened database.
    pub fn new(db: Arc<Database>, notifier: NotifierHandle, config: BillingConfig) -> Self {
        BillingService {
            db,
            notifier,
            config,
        }
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &BillingConfig {
        &self.config
    }

    // =========================================================================
    // Totals
    // =========================================================================

    /// Prices a cart without touching stock or the drawer.
    ///
    /// Used by the till to show a running total while the cart is still
    /// being filled.
    pub async fn compute_totals(&self, lines: &[CartLine]) -> BillingResult<InvoiceTotals> {
        let items = self.load_lines(lines).await?;
        Ok(InvoiceCalculator::compute(&items))
    }

    /// Resolves cart lines against the catalog.
    ///
    /// Fails fast on empty carts, oversize bills, bad quantities, unknown
    /// codes and shortages visible at read time. The authoritative stock
    /// check is the guarded decrement inside the checkout transaction;
    /// this pass just spares the customer a doomed checkout.
    async fn load_lines(&self, lines: &[CartLine]) -> BillingResult<Vec<LineItem>> {
        if lines.is_empty() {
            return Err(BillingError::EmptyCart);
        }
        validate_bill_size(lines.len()).map_err(CoreError::from)?;

        let mut items = Vec::with_capacity(lines.len());
        for line in lines {
            validate_quantity(line.quantity).map_err(CoreError::from)?;
            if line.quantity > self.config.billing.max_line_quantity {
                return Err(CoreError::QuantityTooLarge {
                    requested: line.quantity,
                    max: self.config.billing.max_line_quantity,
                }
                .into());
            }

            let product = self
                .db
                .products()
                .get_by_code(&line.code)
                .await?
                .ok_or_else(|| CoreError::ProductNotFound(line.code.clone()))?;

            if !product.can_supply(line.quantity) {
                return Err(CoreError::InsufficientStock {
                    code: product.code.clone(),
                    available: product.available_stock,
                    requested: line.quantity,
                }
                .into());
            }

            items.push(LineItem::from_product(&product, line.quantity));
        }

        Ok(items)
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Runs a complete checkout and returns the receipt.
    ///
    /// On success the purchase, its line snapshots, the stock decrements
    /// and the drawer decrements are all committed atomically, and an
    /// invoice notice is queued for background delivery.
    pub async fn generate_bill(&self, request: BillRequest) -> BillingResult<Receipt> {
        let email = validate_email(&request.customer_email).map_err(CoreError::from)?;
        validate_paid_amount(request.paid_paise).map_err(CoreError::from)?;

        let lines = self.load_lines(&request.lines).await?;
        let totals = InvoiceCalculator::compute(&lines);

        let paid = Money::from_paise(request.paid_paise);
        if paid < totals.grand_total {
            return Err(CoreError::InsufficientPayment {
                required_paise: totals.grand_total.paise(),
                paid_paise: paid.paise(),
            }
            .into());
        }

        // Change is settled in whole rupees; stray paise stay with the shop.
        let change_due = Money::from_rupees((paid - totals.grand_total).rupees(), 0);

        // Pool reads finish before the checkout transaction starts.
        let customer = self.db.customers().get_or_create(&email).await?;
        let policy = request.change_policy.unwrap_or(self.config.change_policy());

        let mut tx = self.db.purchases().begin_checkout().await?;

        for line in &lines {
            if !tx.reserve_stock(&line.product_id, line.quantity).await? {
                let available = tx.stock_of(&line.product_id).await?.unwrap_or(0);
                return Err(CoreError::InsufficientStock {
                    code: line.code.clone(),
                    available,
                    requested: line.quantity,
                }
                .into());
            }
        }

        // Plan change against the drawer as this transaction sees it, then
        // take the notes with the same guarded decrement as stock.
        let breakdown = if change_due.is_positive() {
            let drawer = tx.denominations_for_change().await?;
            match ChangeMaker::make_change(change_due.rupees(), &drawer) {
                Ok(plan) => {
                    for (value, count) in plan.iter_descending() {
                        if !tx.reserve_denomination(value, count).await? {
                            return Err(CoreError::ChangeNotAvailable {
                                amount: change_due.rupees(),
                                short_by: value * count,
                            }
                            .into());
                        }
                    }
                    Some(plan)
                }
                Err(CoreError::ChangeNotAvailable { amount, short_by }) => match policy {
                    ChangePolicy::Reject => {
                        return Err(CoreError::ChangeNotAvailable { amount, short_by }.into());
                    }
                    ChangePolicy::RecordUnavailable => {
                        warn!(
                            amount_rupees = amount,
                            short_by_rupees = short_by,
                            customer = %email,
                            "Drawer cannot make exact change, recording purchase without it"
                        );
                        None
                    }
                },
                Err(other) => return Err(other.into()),
            }
        } else {
            Some(ChangeBreakdown::new())
        };

        let now = Utc::now();
        let purchase = Purchase {
            id: Uuid::new_v4().to_string(),
            customer_id: customer.id.clone(),
            subtotal_paise: totals.subtotal.paise(),
            tax_total_paise: totals.tax_total.paise(),
            grand_total_paise: totals.grand_total.paise(),
            paid_paise: paid.paise(),
            change_due_paise: change_due.paise(),
            change_breakdown: breakdown,
            created_at: now,
        };
        tx.insert_purchase(&purchase).await?;

        let mut rows = Vec::with_capacity(lines.len());
        for line in &lines {
            let item = PurchaseItem {
                id: Uuid::new_v4().to_string(),
                purchase_id: purchase.id.clone(),
                product_id: line.product_id.clone(),
                code_snapshot: line.code.clone(),
                name_snapshot: line.name.clone(),
                unit_price_paise: line.unit_price_paise,
                quantity: line.quantity,
                tax_rate_bps: line.tax_rate_bps,
                line_total_paise: line.line_total().paise(),
                tax_paise: line.tax_amount().paise(),
                created_at: now,
            };
            tx.insert_item(&item).await?;
            rows.push(ReceiptRow::from_line(line));
        }

        tx.commit().await?;

        // The purchase is durable; only now does the notice go out.
        if self.config.notify_enabled() {
            self.notifier.notify(&purchase.id);
        }

        info!(
            purchase_id = %purchase.id,
            customer = %email,
            grand_total_paise = purchase.grand_total_paise,
            change_due_paise = purchase.change_due_paise,
            lines = rows.len(),
            "Purchase recorded"
        );

        Ok(Receipt {
            store_name: self.config.store_name().to_string(),
            purchase,
            rows,
        })
    }

    // =========================================================================
    // Drawer
    // =========================================================================

    /// Reserves change from the drawer outside a purchase.
    ///
    /// Used when the cashier settles change by hand, for instance after a
    /// purchase was recorded without a breakdown. Amounts of zero or less
    /// need no notes and return an empty breakdown.
    pub async fn reserve_change(&self, amount_rupees: i64) -> BillingResult<ChangeBreakdown> {
        if amount_rupees <= 0 {
            return Ok(ChangeBreakdown::new());
        }

        let mut tx = self.db.purchases().begin_checkout().await?;
        let drawer = tx.denominations_for_change().await?;
        let plan = ChangeMaker::make_change(amount_rupees, &drawer).map_err(BillingError::from)?;

        for (value, count) in plan.iter_descending() {
            if !tx.reserve_denomination(value, count).await? {
                return Err(CoreError::ChangeNotAvailable {
                    amount: amount_rupees,
                    short_by: value * count,
                }
                .into());
            }
        }

        tx.commit().await?;
        Ok(plan)
    }

    // =========================================================================
    // Purchase History
    // =========================================================================

    /// Lists a customer's purchases, newest first.
    ///
    /// An email with no customer record yields an empty list, not an error.
    pub async fn purchases_for(&self, email: &str) -> BillingResult<Vec<Purchase>> {
        let email = validate_email(email).map_err(CoreError::from)?;

        match self.db.customers().get_by_email(&email).await? {
            Some(customer) => Ok(self.db.purchases().list_by_customer(&customer.id).await?),
            None => Ok(Vec::new()),
        }
    }

    /// Fetches one purchase with its line snapshots.
    pub async fn purchase_detail(
        &self,
        purchase_id: &str,
    ) -> BillingResult<(Purchase, Vec<PurchaseItem>)> {
        let purchase = self
            .db
            .purchases()
            .get_by_id(purchase_id)
            .await?
            .ok_or_else(|| CoreError::PurchaseNotFound(purchase_id.to_string()))?;

        let items = self.db.purchases().get_items(purchase_id).await?;
        Ok((purchase, items))
    }

    /// True when the email belongs to a customer with at least one purchase.
    ///
    /// Malformed emails answer `false` rather than erroring; the till uses
    /// this for a returning-customer hint, not for validation.
    pub async fn has_previous_purchases(&self, email: &str) -> BillingResult<bool> {
        let email = match validate_email(email) {
            Ok(normalized) => normalized,
            Err(_) => return Ok(false),
        };

        match self.db.customers().get_by_email(&email).await? {
            Some(customer) => Ok(self.db.purchases().exists_for_customer(&customer.id).await?),
            None => Ok(false),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
