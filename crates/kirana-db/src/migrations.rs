//! # Schema Migrations
//!
//! The SQL files under `migrations/sqlite/` are compiled into the
//! binary and replayed against every database the pool opens. sqlx
//! keeps a ledger table (`_sqlx_migrations`) so each file applies
//! exactly once, in filename order.
//!
//! Current set:
//! ```text
//! 001_initial_schema.sql       customers, products, purchases, drawer
//! 002_seed_denominations.sql   one empty slot per rupee note
//! ```
//!
//! To change the schema, add a new `NNN_description.sql` with the next
//! number. Shipped files never change: sqlx checksums each one and
//! refuses to start if history was edited.

use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;

/// Migration set embedded at compile time by `sqlx::migrate!`.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Applies every migration the ledger has not seen yet.
///
/// Safe to call on every startup: applied files are recorded in
/// `_sqlx_migrations` and skipped next time, and each pending file
/// runs inside its own transaction.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    MIGRATOR.run(pool).await?;

    info!(
        total = MIGRATOR.migrations.len(),
        "Schema migrations up to date"
    );
    Ok(())
}

/// Counts embedded vs applied migrations, for health reporting.
///
/// Returns `(embedded, applied)`. A database nobody migrated yet
/// reports `(n, 0)`.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<(usize, usize)> {
    let embedded = MIGRATOR.migrations.len();

    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
        .fetch_one(pool)
        .await
        .unwrap_or(0);

    Ok((embedded, applied as usize))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_fresh_database_reports_all_applied() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let (embedded, applied) = migration_status(db.pool()).await.unwrap();
        assert_eq!(embedded, applied);
        assert!(embedded >= 2);
    }

    #[tokio::test]
    async fn test_rerun_is_a_no_op() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        run_migrations(db.pool()).await.unwrap();
        run_migrations(db.pool()).await.unwrap();

        let (embedded, applied) = migration_status(db.pool()).await.unwrap();
        assert_eq!(embedded, applied);
    }
}
