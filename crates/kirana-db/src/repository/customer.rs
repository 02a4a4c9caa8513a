//! # Customer Repository
//!
//! Database operations for customers.
//!
//! Customers are identified by email at the counter. The till never asks
//! for a password or profile; a row springs into existence the first time
//! an email buys something.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use kirana_core::Customer;

/// Repository for customer database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = CustomerRepository::new(pool);
///
/// // Find or create by email
/// let customer = repo.get_or_create("asha@dukan.in").await?;
/// ```
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Gets a customer by email, creating one if none exists.
    ///
    /// ## Race Handling
    /// Two tills inserting the same email at once both end up with the
    /// same row: the loser of the UNIQUE race falls back to fetching the
    /// winner's insert.
    ///
    /// ## Arguments
    /// * `email` - Normalized (trimmed, lowercased) email address
    ///
    /// ## Returns
    /// * `Ok(Customer)` - Existing or freshly created customer
    pub async fn get_or_create(&self, email: &str) -> DbResult<Customer> {
        if let Some(existing) = self.get_by_email(email).await? {
            return Ok(existing);
        }

        let customer = Customer {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            created_at: Utc::now(),
        };

        debug!(email = %customer.email, "Creating customer");

        let inserted = sqlx::query(
            r#"
            INSERT INTO customers (id, email, created_at)
            VALUES (?1, ?2, ?3)
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.email)
        .bind(customer.created_at)
        .execute(&self.pool)
        .await;

        match inserted {
            Ok(_) => Ok(customer),
            Err(e) => {
                let err = DbError::from(e);
                if err.is_unique_violation() {
                    // Lost the insert race; the winner's row is what we want
                    self.get_by_email(email)
                        .await?
                        .ok_or_else(|| DbError::not_found("Customer", email))
                } else {
                    Err(err)
                }
            }
        }
    }

    /// Gets a customer by email.
    ///
    /// ## Returns
    /// * `Ok(Some(Customer))` - Customer found
    /// * `Ok(None)` - No customer with this email
    pub async fn get_by_email(&self, email: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, email, created_at
            FROM customers
            WHERE email = ?1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Gets a customer by ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Customer))` - Customer found
    /// * `Ok(None)` - Customer not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, email, created_at
            FROM customers
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Counts total customers (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers")
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

    #[tokio::test]
    async fn test_get_or_create_creates_once() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.customers();

        let first = repo.get_or_create("asha@dukan.in").await.unwrap();
        let second = repo.get_or_create("asha@dukan.in").await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_get_by_email_missing() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let found = db.customers().get_by_email("nobody@dukan.in").await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_get_by_id_roundtrip() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.customers();

        let created = repo.get_or_create("ravi@dukan.in").await.unwrap();
        let fetched = repo.get_by_id(&created.id).await.unwrap().unwrap();

        assert_eq!(fetched.email, "ravi@dukan.in");
    }
}
