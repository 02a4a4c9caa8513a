//! # Purchase Repository
//!
//! Database operations for purchases, purchase items and the checkout
//! transaction.
//!
//! ## Checkout Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Checkout Lifecycle                                │
//! │                                                                         │
//! │  1. BEGIN                                                               │
//! │     └── begin_checkout() → CheckoutTx                                   │
//! │                                                                         │
//! │  2. RESERVE                                                             │
//! │     └── reserve_stock() per line (guarded decrement)                    │
//! │     └── denominations_for_change() → drawer snapshot                    │
//! │     └── reserve_denomination() per note value                           │
//! │                                                                         │
//! │  3. RECORD                                                              │
//! │     └── insert_purchase() → header row                                  │
//! │     └── insert_item() per line                                          │
//! │                                                                         │
//! │  4. COMMIT                                                              │
//! │     └── commit() → all writes become visible at once                    │
//! │     └── (drop without commit = rollback, nothing happened)              │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Guarded Decrements
//! Every checkout-time decrement carries its own precondition:
//!
//! ```sql
//! UPDATE products SET available_stock = available_stock - ?2
//! WHERE id = ?1 AND available_stock >= ?2
//! ```
//!
//! Zero rows affected means another till got there first. The caller sees
//! `false`, drops the transaction and nothing is half-applied.

use chrono::{DateTime, Utc};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::debug;

use crate::error::{DbError, DbResult};
use kirana_core::{ChangeBreakdown, Denomination, Purchase, PurchaseItem};

const PURCHASE_COLUMNS: &str = r#"
    id,
    customer_id,
    subtotal_paise,
    tax_total_paise,
    grand_total_paise,
    paid_paise,
    change_due_paise,
    change_breakdown,
    created_at
"#;

const ITEM_COLUMNS: &str = r#"
    id,
    purchase_id,
    product_id,
    code_snapshot,
    name_snapshot,
    unit_price_paise,
    quantity,
    tax_rate_bps,
    line_total_paise,
    tax_paise,
    created_at
"#;

/// Raw purchase row as stored; change_breakdown is a JSON TEXT column.
#[derive(Debug, sqlx::FromRow)]
struct PurchaseRow {
    id: String,
    customer_id: String,
    subtotal_paise: i64,
    tax_total_paise: i64,
    grand_total_paise: i64,
    paid_paise: i64,
    change_due_paise: i64,
    change_breakdown: Option<String>,
    created_at: DateTime<Utc>,
}

impl PurchaseRow {
    fn into_purchase(self) -> DbResult<Purchase> {
        let change_breakdown = match self.change_breakdown {
            Some(json) => Some(serde_json::from_str::<ChangeBreakdown>(&json)?),
            None => None,
        };

        Ok(Purchase {
            id: self.id,
            customer_id: self.customer_id,
            subtotal_paise: self.subtotal_paise,
            tax_total_paise: self.tax_total_paise,
            grand_total_paise: self.grand_total_paise,
            paid_paise: self.paid_paise,
            change_due_paise: self.change_due_paise,
            change_breakdown,
            created_at: self.created_at,
        })
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for purchase database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = PurchaseRepository::new(pool);
///
/// // Reads go straight through the pool
/// let history = repo.list_by_customer(&customer_id).await?;
///
/// // Writes go through a checkout transaction
/// let mut tx = repo.begin_checkout().await?;
/// ```
#[derive(Debug, Clone)]
pub struct PurchaseRepository {
    pool: SqlitePool,
}

impl PurchaseRepository {
    /// Creates a new PurchaseRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PurchaseRepository { pool }
    }

    /// Starts a checkout transaction.
    ///
    /// All stock and drawer decrements for one bill must go through the
    /// returned [`CheckoutTx`] so they commit or vanish together.
    pub async fn begin_checkout(&self) -> DbResult<CheckoutTx> {
        let tx = self.pool.begin().await?;
        Ok(CheckoutTx { tx })
    }

    /// Gets a purchase by ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Purchase))` - Purchase found
    /// * `Ok(None)` - Purchase not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Purchase>> {
        let sql = format!("SELECT {PURCHASE_COLUMNS} FROM purchases WHERE id = ?1");

        let row = sqlx::query_as::<_, PurchaseRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(PurchaseRow::into_purchase).transpose()
    }

    /// Gets the line items of a purchase, in the order they were rung up.
    pub async fn get_items(&self, purchase_id: &str) -> DbResult<Vec<PurchaseItem>> {
        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM purchase_items WHERE purchase_id = ?1 ORDER BY rowid"
        );

        let items = sqlx::query_as::<_, PurchaseItem>(&sql)
            .bind(purchase_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(items)
    }

    /// Lists a customer's purchases, newest first.
    pub async fn list_by_customer(&self, customer_id: &str) -> DbResult<Vec<Purchase>> {
        let sql = format!(
            r#"
            SELECT {PURCHASE_COLUMNS}
            FROM purchases
            WHERE customer_id = ?1
            ORDER BY created_at DESC, rowid DESC
            "#
        );

        let rows = sqlx::query_as::<_, PurchaseRow>(&sql)
            .bind(customer_id)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(PurchaseRow::into_purchase).collect()
    }

    /// `true` if the customer has at least one recorded purchase.
    ///
    /// Cheaper than `list_by_customer` when only the fact matters.
    pub async fn exists_for_customer(&self, customer_id: &str) -> DbResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM purchases WHERE customer_id = ?1)")
                .bind(customer_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    /// Counts total purchases (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM purchases")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Checkout Transaction
// =============================================================================

/// A single bill's writes, all-or-nothing.
///
/// Wraps one SQLite transaction. Stock decrements, drawer decrements and
/// the purchase rows ride together: `commit` makes them all visible,
/// dropping the value rolls them all back.
///
/// ## Why bool Returns
/// `reserve_stock` and `reserve_denomination` report guard failure as
/// `Ok(false)` rather than an error. The caller owns the business meaning
/// (insufficient stock vs drawer shortage) and builds its own typed error;
/// this layer only knows whether the row moved.
pub struct CheckoutTx {
    tx: Transaction<'static, Sqlite>,
}

impl CheckoutTx {
    /// Decrements product stock if enough is on the shelf.
    ///
    /// ## Returns
    /// * `Ok(true)` - Stock reserved
    /// * `Ok(false)` - Not enough stock (or unknown product); nothing changed
    pub async fn reserve_stock(&mut self, product_id: &str, quantity: i64) -> DbResult<bool> {
        debug!(product_id = %product_id, quantity = %quantity, "Reserving stock");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products
            SET available_stock = available_stock - ?2, updated_at = ?3
            WHERE id = ?1 AND available_stock >= ?2
            "#,
        )
        .bind(product_id)
        .bind(quantity)
        .bind(now)
        .execute(&mut *self.tx)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Reads a product's current stock inside this transaction.
    ///
    /// Used to report accurate numbers after a failed reservation.
    pub async fn stock_of(&mut self, product_id: &str) -> DbResult<Option<i64>> {
        let stock = sqlx::query_scalar::<_, i64>(
            "SELECT available_stock FROM products WHERE id = ?1",
        )
        .bind(product_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(stock)
    }

    /// Takes notes out of a drawer slot if enough are present.
    ///
    /// ## Returns
    /// * `Ok(true)` - Notes reserved
    /// * `Ok(false)` - Not enough notes (or unknown value); nothing changed
    pub async fn reserve_denomination(&mut self, value: i64, count: i64) -> DbResult<bool> {
        debug!(value = %value, count = %count, "Reserving change notes");

        let result = sqlx::query(
            r#"
            UPDATE denominations
            SET available_count = available_count - ?2
            WHERE value = ?1 AND available_count >= ?2
            "#,
        )
        .bind(value)
        .bind(count)
        .execute(&mut *self.tx)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Drawer contents as this transaction sees them, largest note first.
    ///
    /// The snapshot feeds `ChangeMaker::make_change`; because it is read
    /// inside the same transaction that applies the decrements, the plan
    /// cannot go stale before it is applied.
    pub async fn denominations_for_change(&mut self) -> DbResult<Vec<Denomination>> {
        let slots = sqlx::query_as::<_, Denomination>(
            r#"
            SELECT value, available_count
            FROM denominations
            ORDER BY value DESC
            "#,
        )
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(slots)
    }

    /// Inserts the purchase header row.
    pub async fn insert_purchase(&mut self, purchase: &Purchase) -> DbResult<()> {
        debug!(id = %purchase.id, "Inserting purchase");

        let breakdown_json = purchase
            .change_breakdown
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        sqlx::query(
            r#"
            INSERT INTO purchases (
                id, customer_id,
                subtotal_paise, tax_total_paise, grand_total_paise,
                paid_paise, change_due_paise, change_breakdown,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&purchase.id)
        .bind(&purchase.customer_id)
        .bind(purchase.subtotal_paise)
        .bind(purchase.tax_total_paise)
        .bind(purchase.grand_total_paise)
        .bind(purchase.paid_paise)
        .bind(purchase.change_due_paise)
        .bind(breakdown_json)
        .bind(purchase.created_at)
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    /// Inserts one line item.
    pub async fn insert_item(&mut self, item: &PurchaseItem) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO purchase_items (
                id, purchase_id, product_id,
                code_snapshot, name_snapshot,
                unit_price_paise, quantity, tax_rate_bps,
                line_total_paise, tax_paise,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&item.id)
        .bind(&item.purchase_id)
        .bind(&item.product_id)
        .bind(&item.code_snapshot)
        .bind(&item.name_snapshot)
        .bind(item.unit_price_paise)
        .bind(item.quantity)
        .bind(item.tax_rate_bps)
        .bind(item.line_total_paise)
        .bind(item.tax_paise)
        .bind(item.created_at)
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    /// Commits every write made through this transaction.
    pub async fn commit(self) -> DbResult<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use kirana_core::Product;
    use uuid::Uuid;

    async fn setup() -> (Database, Product, String) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            code: "RICE-1KG".to_string(),
            name: "Basmati Rice 1kg".to_string(),
            available_stock: 10,
            unit_price_paise: 9_500,
            tax_rate_bps: 500,
            created_at: now,
            updated_at: now,
        };
        db.products().insert(&product).await.unwrap();

        db.denominations().deposit(50, 2).await.unwrap();
        db.denominations().deposit(10, 5).await.unwrap();

        let customer = db.customers().get_or_create("asha@dukan.in").await.unwrap();

        (db, product, customer.id)
    }

    fn sample_purchase(customer_id: &str, breakdown: Option<ChangeBreakdown>) -> Purchase {
        Purchase {
            id: Uuid::new_v4().to_string(),
            customer_id: customer_id.to_string(),
            subtotal_paise: 19_000,
            tax_total_paise: 950,
            grand_total_paise: 20_000,
            paid_paise: 25_000,
            change_due_paise: 5_000,
            change_breakdown: breakdown,
            created_at: Utc::now(),
        }
    }

    fn sample_item(purchase: &Purchase, product: &Product) -> PurchaseItem {
        PurchaseItem {
            id: Uuid::new_v4().to_string(),
            purchase_id: purchase.id.clone(),
            product_id: product.id.clone(),
            code_snapshot: product.code.clone(),
            name_snapshot: product.name.clone(),
            unit_price_paise: product.unit_price_paise,
            quantity: 2,
            tax_rate_bps: product.tax_rate_bps,
            line_total_paise: 19_000,
            tax_paise: 950,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_commit_persists_everything() {
        let (db, product, customer_id) = setup().await;

        let mut breakdown = ChangeBreakdown::new();
        breakdown.add(50, 1);

        let purchase = sample_purchase(&customer_id, Some(breakdown));
        let item = sample_item(&purchase, &product);

        let mut tx = db.purchases().begin_checkout().await.unwrap();
        assert!(tx.reserve_stock(&product.id, 2).await.unwrap());
        assert!(tx.reserve_denomination(50, 1).await.unwrap());
        tx.insert_purchase(&purchase).await.unwrap();
        tx.insert_item(&item).await.unwrap();
        tx.commit().await.unwrap();

        let stored = db.purchases().get_by_id(&purchase.id).await.unwrap().unwrap();
        assert_eq!(stored.grand_total_paise, 20_000);
        let stored_breakdown = stored.change_breakdown.unwrap();
        assert_eq!(stored_breakdown.count_for(50), 1);

        let items = db.purchases().get_items(&purchase.id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].code_snapshot, "RICE-1KG");

        let shelf = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(shelf.available_stock, 8);

        let slot = db.denominations().get(50).await.unwrap().unwrap();
        assert_eq!(slot.available_count, 1);
    }

    #[tokio::test]
    async fn test_drop_without_commit_rolls_back() {
        let (db, product, _) = setup().await;

        let mut tx = db.purchases().begin_checkout().await.unwrap();
        assert!(tx.reserve_stock(&product.id, 5).await.unwrap());
        assert!(tx.reserve_denomination(50, 2).await.unwrap());
        drop(tx);

        let shelf = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(shelf.available_stock, 10);

        let slot = db.denominations().get(50).await.unwrap().unwrap();
        assert_eq!(slot.available_count, 2);
    }

    #[tokio::test]
    async fn test_reserve_stock_guard_refuses_oversell() {
        let (db, product, _) = setup().await;

        let mut tx = db.purchases().begin_checkout().await.unwrap();
        assert!(!tx.reserve_stock(&product.id, 11).await.unwrap());

        // Guard failure must not touch the row
        let stock = tx.stock_of(&product.id).await.unwrap().unwrap();
        assert_eq!(stock, 10);
    }

    #[tokio::test]
    async fn test_reserve_denomination_guard_refuses_overdraw() {
        let (db, _, _) = setup().await;

        let mut tx = db.purchases().begin_checkout().await.unwrap();
        assert!(!tx.reserve_denomination(50, 3).await.unwrap());
        assert!(!tx.reserve_denomination(2000, 1).await.unwrap());
        assert!(tx.reserve_denomination(10, 5).await.unwrap());
    }

    #[tokio::test]
    async fn test_denominations_for_change_sees_own_writes() {
        let (db, _, _) = setup().await;

        let mut tx = db.purchases().begin_checkout().await.unwrap();
        assert!(tx.reserve_denomination(10, 4).await.unwrap());

        let drawer = tx.denominations_for_change().await.unwrap();
        let ten = drawer.iter().find(|d| d.value == 10).unwrap();
        assert_eq!(ten.available_count, 1);

        // Largest note first, always
        let values: Vec<i64> = drawer.iter().map(|d| d.value).collect();
        assert_eq!(values, vec![500, 200, 50, 20, 10, 5, 1]);
    }

    #[tokio::test]
    async fn test_null_breakdown_round_trips_as_none() {
        let (db, _, customer_id) = setup().await;

        let purchase = sample_purchase(&customer_id, None);

        let mut tx = db.purchases().begin_checkout().await.unwrap();
        tx.insert_purchase(&purchase).await.unwrap();
        tx.commit().await.unwrap();

        let stored = db.purchases().get_by_id(&purchase.id).await.unwrap().unwrap();
        assert!(stored.change_breakdown.is_none());
        assert!(stored.change_unavailable());
    }

    #[tokio::test]
    async fn test_list_by_customer_newest_first() {
        let (db, _, customer_id) = setup().await;

        for _ in 0..3 {
            let purchase = sample_purchase(&customer_id, Some(ChangeBreakdown::new()));
            let mut tx = db.purchases().begin_checkout().await.unwrap();
            tx.insert_purchase(&purchase).await.unwrap();
            tx.commit().await.unwrap();
        }

        let history = db.purchases().list_by_customer(&customer_id).await.unwrap();
        assert_eq!(history.len(), 3);
        for pair in history.windows(2) {
            assert!(pair[0].created_at >= pair[1].created_at);
        }
    }

    #[tokio::test]
    async fn test_exists_for_customer() {
        let (db, _, customer_id) = setup().await;

        assert!(!db.purchases().exists_for_customer(&customer_id).await.unwrap());

        let purchase = sample_purchase(&customer_id, Some(ChangeBreakdown::new()));
        let mut tx = db.purchases().begin_checkout().await.unwrap();
        tx.insert_purchase(&purchase).await.unwrap();
        tx.commit().await.unwrap();

        assert!(db.purchases().exists_for_customer(&customer_id).await.unwrap());
    }
}
