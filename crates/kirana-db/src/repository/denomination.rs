//! # Denomination Repository
//!
//! Database operations for the cash drawer.
//!
//! The drawer is modeled as one row per note value. Checkout-time
//! decrements happen inside [`CheckoutTx`], never here; this repository
//! covers setup (float deposits) and reporting.
//!
//! [`CheckoutTx`]: crate::repository::purchase::CheckoutTx

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use kirana_core::{Denomination, Money};

/// Repository for cash drawer operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = DenominationRepository::new(pool);
///
/// // Morning float: twenty 50-rupee notes
/// repo.deposit(50, 20).await?;
///
/// // Drawer contents, largest note first
/// let drawer = repo.list_descending().await?;
/// ```
#[derive(Debug, Clone)]
pub struct DenominationRepository {
    pool: SqlitePool,
}

impl DenominationRepository {
    /// Creates a new DenominationRepository.
    pub fn new(pool: SqlitePool) -> Self {
        DenominationRepository { pool }
    }

    /// Sets the count for a note value, creating the slot if needed.
    ///
    /// ## Usage
    /// Cash reconciliation: the operator counts the drawer and writes
    /// the real numbers back.
    pub async fn upsert(&self, value: i64, count: i64) -> DbResult<()> {
        debug!(value = %value, count = %count, "Setting drawer slot");

        sqlx::query(
            r#"
            INSERT INTO denominations (value, available_count)
            VALUES (?1, ?2)
            ON CONFLICT(value) DO UPDATE SET available_count = excluded.available_count
            "#,
        )
        .bind(value)
        .bind(count)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Adds notes to a drawer slot.
    ///
    /// ## Arguments
    /// * `value` - Note value in rupees (slot must exist)
    /// * `count` - Number of notes to add (must be positive)
    ///
    /// ## Returns
    /// * `Ok(())` - Notes added
    /// * `Err(DbError::NotFound)` - No slot for this value
    pub async fn deposit(&self, value: i64, count: i64) -> DbResult<()> {
        debug!(value = %value, count = %count, "Depositing notes");

        let result = sqlx::query(
            r#"
            UPDATE denominations
            SET available_count = available_count + ?2
            WHERE value = ?1
            "#,
        )
        .bind(value)
        .bind(count)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Denomination", value.to_string()));
        }

        Ok(())
    }

    /// Gets a single drawer slot.
    ///
    /// ## Returns
    /// * `Ok(Some(Denomination))` - Slot found
    /// * `Ok(None)` - No slot for this value
    pub async fn get(&self, value: i64) -> DbResult<Option<Denomination>> {
        let slot = sqlx::query_as::<_, Denomination>(
            r#"
            SELECT value, available_count
            FROM denominations
            WHERE value = ?1
            "#,
        )
        .bind(value)
        .fetch_optional(&self.pool)
        .await?;

        Ok(slot)
    }

    /// Lists all drawer slots, largest note first.
    ///
    /// The descending order is what the greedy change planner expects;
    /// callers pass this slice straight to `ChangeMaker::make_change`.
    pub async fn list_descending(&self) -> DbResult<Vec<Denomination>> {
        let slots = sqlx::query_as::<_, Denomination>(
            r#"
            SELECT value, available_count
            FROM denominations
            ORDER BY value DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(slots)
    }

    /// Total cash in the drawer.
    ///
    /// ## Returns
    /// Sum of value × count across all slots, as [`Money`].
    pub async fn total_cash(&self) -> DbResult<Money> {
        let rupees: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(value * available_count), 0) FROM denominations",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(Money::from_rupees(rupees, 0))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_deposit_accumulates() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.denominations();

        repo.deposit(50, 10).await.unwrap();
        repo.deposit(50, 4).await.unwrap();

        let slot = repo.get(50).await.unwrap().unwrap();
        assert_eq!(slot.available_count, 14);
    }

    #[tokio::test]
    async fn test_upsert_overwrites_count() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.denominations();

        repo.deposit(20, 8).await.unwrap();
        repo.upsert(20, 3).await.unwrap();

        let slot = repo.get(20).await.unwrap().unwrap();
        assert_eq!(slot.available_count, 3);
    }

    #[tokio::test]
    async fn test_deposit_to_unknown_value_fails() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        // 2000-rupee notes were never seeded as a slot
        let err = db.denominations().deposit(2000, 1).await.unwrap_err();
        assert!(matches!(err, crate::error::DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_list_descending_order() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.denominations();

        repo.deposit(5, 100).await.unwrap();
        repo.deposit(500, 2).await.unwrap();

        let slots = repo.list_descending().await.unwrap();
        let values: Vec<i64> = slots.iter().map(|d| d.value).collect();
        assert_eq!(values, vec![500, 200, 50, 20, 10, 5, 1]);
    }

    #[tokio::test]
    async fn test_total_cash() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.denominations();

        repo.deposit(500, 2).await.unwrap();
        repo.deposit(20, 5).await.unwrap();
        repo.deposit(1, 7).await.unwrap();

        let total = repo.total_cash().await.unwrap();
        assert_eq!(total.rupees(), 1_107);
        assert!(total.is_whole_rupees());
    }
}
