//! # Product Repository
//!
//! Database operations for the product catalog.
//!
//! ## Key Operations
//! - Lookup by code (the till scans or types codes, not UUIDs)
//! - CRUD operations
//! - Restocking via delta updates
//!
//! ## Stock Updates
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Stock Update Strategy                                │
//! │                                                                         │
//! │  ❌ WRONG: Absolute update (loses concurrent sales)                    │
//! │     UPDATE products SET available_stock = 7 WHERE id = ?               │
//! │                                                                         │
//! │  ✅ CORRECT: Delta update with a floor guard                           │
//! │     UPDATE products                                                     │
//! │     SET available_stock = available_stock + ?delta                     │
//! │     WHERE id = ? AND available_stock + ?delta >= 0                     │
//! │                                                                         │
//! │  Checkout decrements go through CheckoutTx::reserve_stock so the       │
//! │  guard and the purchase insert share one transaction.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use kirana_core::Product;

const PRODUCT_COLUMNS: &str = r#"
    id,
    code,
    name,
    available_stock,
    unit_price_paise,
    tax_rate_bps,
    created_at,
    updated_at
"#;

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// // Lookup by code
/// let product = repo.get_by_code("RICE-1KG").await?;
///
/// // Receive a delivery
/// repo.restock(&product_id, 24).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");

        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Gets a product by its code.
    ///
    /// ## Arguments
    /// * `code` - Product code (e.g., "RICE-1KG")
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE code = ?1");

        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Lists the whole catalog, ordered by code.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY code");

        let products = sqlx::query_as::<_, Product>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Inserts a new product.
    ///
    /// ## Arguments
    /// * `product` - Product to insert (id should be generated beforehand)
    ///
    /// ## Returns
    /// * `Ok(())` - Inserted
    /// * `Err(DbError::UniqueViolation)` - Code already exists
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(code = %product.code, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, code, name, available_stock,
                unit_price_paise, tax_rate_bps,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&product.id)
        .bind(&product.code)
        .bind(&product.name)
        .bind(product.available_stock)
        .bind(product.unit_price_paise)
        .bind(product.tax_rate_bps)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates an existing product.
    ///
    /// Stock is intentionally NOT written here; use [`restock`] or a
    /// checkout transaction so counts only ever move by deltas.
    ///
    /// ## Returns
    /// * `Ok(())` - Update successful
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    ///
    /// [`restock`]: ProductRepository::restock
    pub async fn update(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, code = %product.code, "Writing product update");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products SET
                code = ?2,
                name = ?3,
                unit_price_paise = ?4,
                tax_rate_bps = ?5,
                updated_at = ?6
            WHERE id = ?1
            "#,
        )
        .bind(&product.id)
        .bind(&product.code)
        .bind(&product.name)
        .bind(product.unit_price_paise)
        .bind(product.tax_rate_bps)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }

        Ok(())
    }

    /// Adjusts product stock by a delta.
    ///
    /// The guard clause refuses adjustments that would take stock below
    /// zero, so a stale negative delta fails instead of corrupting the
    /// count.
    ///
    /// ## Arguments
    /// * `id` - Product ID
    /// * `delta` - Change in stock (positive for deliveries, negative for corrections)
    ///
    /// ## Returns
    /// * `Ok(())` - Stock adjusted
    /// * `Err(DbError::NotFound)` - Product missing or adjustment would go negative
    pub async fn restock(&self, id: &str, delta: i64) -> DbResult<()> {
        debug!(id = %id, delta = %delta, "Adjusting stock");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products
            SET
                available_stock = available_stock + ?2,
                updated_at = ?3
            WHERE id = ?1 AND available_stock + ?2 >= 0
            "#,
        )
        .bind(id)
        .bind(delta)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts total products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};
    use chrono::Utc;
    use kirana_core::Product;
    use uuid::Uuid;

    fn sample_product(code: &str, stock: i64) -> Product {
        let now = Utc::now();
        Product {
            id: Uuid::new_v4().to_string(),
            code: code.to_string(),
            name: format!("{code} test item"),
            available_stock: stock,
            unit_price_paise: 4_500,
            tax_rate_bps: 500,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get_by_code() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        let product = sample_product("DAL-1KG", 12);
        repo.insert(&product).await.unwrap();

        let fetched = repo.get_by_code("DAL-1KG").await.unwrap().unwrap();
        assert_eq!(fetched.id, product.id);
        assert_eq!(fetched.available_stock, 12);
        assert_eq!(fetched.unit_price_paise, 4_500);
        assert_eq!(fetched.tax_rate_bps, 500);
    }

    #[tokio::test]
    async fn test_duplicate_code_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        repo.insert(&sample_product("TEA-250G", 5)).await.unwrap();
        let err = repo.insert(&sample_product("TEA-250G", 9)).await.unwrap_err();

        assert!(err.is_unique_violation());
    }

    #[tokio::test]
    async fn test_restock_guards_against_negative() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        let product = sample_product("OIL-1L", 3);
        repo.insert(&product).await.unwrap();

        repo.restock(&product.id, 10).await.unwrap();
        let fetched = repo.get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(fetched.available_stock, 13);

        // Taking away more than exists must fail and leave the count alone
        let err = repo.restock(&product.id, -99).await.unwrap_err();
        assert!(matches!(err, crate::error::DbError::NotFound { .. }));

        let fetched = repo.get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(fetched.available_stock, 13);
    }

    #[tokio::test]
    async fn test_list_ordered_by_code() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        repo.insert(&sample_product("SUGAR-1KG", 2)).await.unwrap();
        repo.insert(&sample_product("ATTA-5KG", 7)).await.unwrap();

        let all = repo.list().await.unwrap();
        let codes: Vec<&str> = all.iter().map(|p| p.code.as_str()).collect();
        assert_eq!(codes, vec!["ATTA-5KG", "SUGAR-1KG"]);
    }

    #[tokio::test]
    async fn test_update_rewrites_catalog_fields() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        let mut product = sample_product("SOAP-75G", 40);
        repo.insert(&product).await.unwrap();

        product.name = "Bath Soap 75g".to_string();
        product.unit_price_paise = 3_200;
        repo.update(&product).await.unwrap();

        let fetched = repo.get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Bath Soap 75g");
        assert_eq!(fetched.unit_price_paise, 3_200);
        // Stock untouched by catalog updates
        assert_eq!(fetched.available_stock, 40);
    }
}
