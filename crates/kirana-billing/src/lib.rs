//! # Kirana Billing
//!
//! The checkout engine: pricing, payment, change, persistence and
//! invoice notification, wired together over `kirana-core` and
//! `kirana-db`.
//!
//! ## Layer Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          kirana-billing                                 │
//! │                                                                         │
//! │   BillRequest ──► BillingService::generate_bill ──► Receipt             │
//! │                        │                   │                            │
//! │          ┌─────────────┘                   └──────────────┐             │
//! │          ▼                                                ▼             │
//! │   kirana-core                                      kirana-db            │
//! │   (totals, change plan,                     (checkout transaction,      │
//! │    validation)                               guarded decrements)        │
//! │                                                    │                    │
//! │                                    after commit    ▼                    │
//! │                              NotifierHandle ──► InvoiceDispatcher       │
//! │                                                    │                    │
//! │                                                    ▼                    │
//! │                                              InvoiceSender              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//! ```rust,no_run
//! use std::sync::Arc;
//! use kirana_billing::{
//!     BillingConfig, BillingService, BillRequest, CartLine,
//!     InvoiceDispatcher, LogSender,
//! };
//! use kirana_db::{Database, DbConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Arc::new(Database::new(DbConfig::new("kirana.db")).await?);
//! let config = BillingConfig::load_or_default(None);
//!
//! let (dispatcher, notifier) =
//!     InvoiceDispatcher::new(db.clone(), Arc::new(LogSender), config.notify.queue_capacity);
//! tokio::spawn(dispatcher.run());
//!
//! let billing = BillingService::new(db, notifier, config);
//! let receipt = billing
//!     .generate_bill(BillRequest {
//!         customer_email: "asha@dukan.in".to_string(),
//!         lines: vec![CartLine { code: "RICE-1KG".to_string(), quantity: 2 }],
//!         paid_paise: 25_000,
//!         change_policy: None,
//!     })
//!     .await?;
//! println!("change due: {} paise", receipt.purchase.change_due_paise);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod notify;
pub mod service;

// Re-export the main types for convenient access
pub use config::{BillingConfig, BillingSettings, ChangePolicy, NotifySettings, StoreSettings};
pub use error::{BillingError, BillingResult};
pub use notify::{
    InvoiceDispatcher, InvoiceNotice, InvoiceSender, LogSender, NoopSender, NotifierHandle,
    NotifyError,
};
pub use service::{BillRequest, BillingService, CartLine, Receipt, ReceiptRow};
