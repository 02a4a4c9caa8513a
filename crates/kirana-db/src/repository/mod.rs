//! # Repository Module
//!
//! Database repository implementations for Kirana POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  BillingService                                                        │
//! │       │                                                                 │
//! │       │  db.products().get_by_code("RICE-1KG")                         │
//! │       │  ↓                                                              │
//! │       ▼                                                                 │
//! │  ProductRepository                                                     │
//! │  ├── get_by_code(&self, code)                                          │
//! │  ├── get_by_id(&self, id)                                              │
//! │  ├── insert(&self, product)                                            │
//! │  └── restock(&self, id, delta)                                         │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Benefits:                                                              │
//! │  • Clean separation of concerns                                        │
//! │  • Easy to test (in-memory database)                                   │
//! │  • SQL is isolated in one place                                        │
//! │  • Can swap database implementations                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`customer::CustomerRepository`] - Customer lookup and get-or-create
//! - [`product::ProductRepository`] - Catalog CRUD and restocking
//! - [`denomination::DenominationRepository`] - Cash drawer slot management
//! - [`purchase::PurchaseRepository`] - Purchase history and checkout transactions

pub mod customer;
pub mod denomination;
pub mod product;
pub mod purchase;
