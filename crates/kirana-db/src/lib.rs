//! # kirana-db: Database Layer for Kirana POS
//!
//! This crate provides database access for the Kirana POS system.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Kirana POS Data Flow                             │
//! │                                                                         │
//! │  BillingService (generate_bill)                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     kirana-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ (purchase.rs) │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ SqlitePool    │    │ CustomerRepo  │    │ 001_init.sql │  │   │
//! │  │   │ Connection    │◄───│ ProductRepo   │    │ 002_seed.sql │  │   │
//! │  │   │ Management    │    │ DrawerRepo    │    │              │  │   │
//! │  │   │               │    │ PurchaseRepo  │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   ./data/kirana.db (WAL mode, foreign keys on)                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (customer, product, drawer, purchase)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kirana_db::{Database, DbConfig};
//!
//! // Create database with default config
//! let config = DbConfig::new("path/to/db.sqlite");
//! let db = Database::new(config).await?;
//!
//! // Use repositories
//! let product = db.products().get_by_code("RICE-1KG").await?;
//!
//! // Guarded multi-table writes go through a checkout transaction
//! let mut tx = db.purchases().begin_checkout().await?;
//! if tx.reserve_stock(&product_id, 2).await? {
//!     tx.commit().await?;
//! }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::customer::CustomerRepository;
pub use repository::denomination::DenominationRepository;
pub use repository::product::ProductRepository;
pub use repository::purchase::{CheckoutTx, PurchaseRepository};
