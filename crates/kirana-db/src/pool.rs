//! # Database Pool Management
//!
//! Opens the shop's SQLite file and hands out repository handles.
//!
//! ```text
//!   DbConfig ──► Database::new ──► SqlitePool (WAL, foreign keys on)
//!                                      │
//!                    ┌─────────────────┼─────────────────┐
//!                    ▼                 ▼                 ▼
//!                checkout          history reads     invoice worker
//!                (the one writer)  (snapshot)        (snapshot)
//! ```
//!
//! WAL journal mode keeps history reads and the invoice dispatcher off the
//! checkout path: readers see a consistent snapshot while a checkout
//! transaction is writing.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::customer::CustomerRepository;
use crate::repository::denomination::DenominationRepository;
use crate::repository::product::ProductRepository;
use crate::repository::purchase::PurchaseRepository;

// =============================================================================
// Configuration
// =============================================================================

/// How to open the shop database.
///
/// The defaults suit a one-counter shop: a small pool, patient timeouts,
/// migrations applied on open.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Where the SQLite file lives. Created on first open.
    pub database_path: PathBuf,

    /// Pool ceiling. One writer plus a few readers is plenty for a till.
    pub max_connections: u32,

    /// Connections kept warm between customers.
    pub min_connections: u32,

    /// How long an acquire may wait for a free connection.
    pub connect_timeout: Duration,

    /// Idle connections above the minimum are closed after this.
    pub idle_timeout: Duration,

    /// How long a writer waits on SQLite's file lock before giving up.
    pub busy_timeout: Duration,

    /// Apply pending migrations when the pool opens.
    pub run_migrations: bool,
}

impl DbConfig {
    /// Configuration for a database file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            database_path: path.into(),
            max_connections: 4,
            min_connections: 1,
            connect_timeout: Duration::from_secs(10),
            idle_timeout: Duration::from_secs(300),
            busy_timeout: Duration::from_secs(5),
            run_migrations: true,
        }
    }

    /// Configuration for an isolated in-memory database.
    ///
    /// Single connection: every connection to `:memory:` would otherwise
    /// open its own empty database.
    pub fn in_memory() -> Self {
        Self::new(":memory:")
            .max_connections(1)
            .connect_timeout(Duration::from_secs(2))
    }

    /// Sets the pool ceiling.
    pub fn max_connections(mut self, ceiling: u32) -> Self {
        self.max_connections = ceiling;
        self
    }

    /// Sets the number of connections kept warm.
    pub fn min_connections(mut self, floor: u32) -> Self {
        self.min_connections = floor;
        self
    }

    /// Sets the acquire timeout.
    pub fn connect_timeout(mut self, wait: Duration) -> Self {
        self.connect_timeout = wait;
        self
    }

    /// Sets whether migrations run on open.
    pub fn run_migrations(mut self, apply: bool) -> Self {
        self.run_migrations = apply;
        self
    }

    /// SQLite options for this configuration.
    ///
    /// WAL with NORMAL synchronous gives snapshot reads beside the single
    /// writer; a power cut may cost the last commit but not the file.
    /// Foreign keys are opt-in per connection in SQLite, so they are
    /// switched on here.
    fn connect_options(&self) -> SqliteConnectOptions {
        SqliteConnectOptions::new()
            .filename(&self.database_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(self.busy_timeout)
            .foreign_keys(true)
    }

    /// Opens the pool this configuration describes. Schema state is the
    /// caller's concern.
    async fn open_pool(&self) -> DbResult<SqlitePool> {
        SqlitePoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .acquire_timeout(self.connect_timeout)
            .idle_timeout(Some(self.idle_timeout))
            .connect_with(self.connect_options())
            .await
            .map_err(|err| DbError::ConnectionFailed(err.to_string()))
    }
}

// =============================================================================
// Database
// =============================================================================

/// Open database, shared by everything that touches storage.
///
/// `Database` is `Clone` and cheap to pass around (the pool inside is an
/// `Arc`): the billing service, the invoice dispatcher, and the seed binary
/// each hold a handle, and every handle sees the same connections.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the pool and, unless disabled, brings the schema up to date.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(path = %config.database_path.display(), "Opening shop database");

        let pool = config.open_pool().await?;
        debug!(connections = config.max_connections, "Connection pool ready");

        if config.run_migrations {
            migrations::run_migrations(&pool).await?;
        }

        Ok(Self { pool })
    }

    /// Applies pending migrations. Idempotent; `new` already does this
    /// unless the configuration opted out.
    pub async fn run_migrations(&self) -> DbResult<()> {
        migrations::run_migrations(&self.pool).await
    }

    /// The customer repository.
    pub fn customers(&self) -> CustomerRepository {
        CustomerRepository::new(self.pool.clone())
    }

    /// The product catalog repository.
    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.pool.clone())
    }

    /// The cash drawer repository.
    pub fn denominations(&self) -> DenominationRepository {
        DenominationRepository::new(self.pool.clone())
    }

    /// The purchase repository. Checkout transactions start here.
    pub fn purchases(&self) -> PurchaseRepository {
        PurchaseRepository::new(self.pool.clone())
    }

    /// The raw pool, for queries no repository covers.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// `true` when the database answers a trivial query.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }

    /// Closes the pool. Every repository handle goes dead with it.
    pub async fn close(&self) {
        info!("Closing shop database");
        self.pool.close().await;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_in_memory() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.health_check().await, "fresh pool should answer SELECT 1");
    }

    #[tokio::test]
    async fn test_builder_overrides_defaults() {
        let config = DbConfig::new("/tmp/kirana-test.db")
            .max_connections(8)
            .min_connections(3)
            .connect_timeout(Duration::from_secs(3))
            .run_migrations(false);

        assert_eq!(config.max_connections, 8);
        assert_eq!(config.min_connections, 3);
        assert_eq!(config.connect_timeout, Duration::from_secs(3));
        assert!(!config.run_migrations);
        assert_eq!(config.busy_timeout, Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_migrations_can_be_deferred() {
        let db = Database::new(DbConfig::in_memory().run_migrations(false))
            .await
            .unwrap();

        db.run_migrations().await.unwrap();

        let slots = db.denominations().list_descending().await.unwrap();
        assert_eq!(slots.len(), 7);
    }

    #[tokio::test]
    async fn test_drawer_slots_seeded_by_migration() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let slots = db.denominations().list_descending().await.unwrap();
        let values: Vec<i64> = slots.iter().map(|d| d.value).collect();

        assert_eq!(values, vec![500, 200, 50, 20, 10, 5, 1]);
        assert!(slots.iter().all(|d| d.available_count == 0));
    }
}
