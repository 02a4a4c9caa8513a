//! # Invoice Notification
//!
//! Fire-and-forget invoice delivery after checkout.
//!
//! ## Dispatch Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Invoice Notification Flow                          │
//! │                                                                         │
//! │  BillingService                InvoiceDispatcher                        │
//! │  ──────────────                ─────────────────                        │
//! │  commit purchase                                                        │
//! │       │                                                                 │
//! │       ├── notify(purchase_id) ──► queue ──► recv()                      │
//! │       │      (try_send,                      │                          │
//! │       ▼       never blocks)                  ├── re-read purchase,      │
//! │  return receipt                              │   customer, items       │
//! │   to cashier                                 │   from the database      │
//! │                                              ▼                          │
//! │                                      InvoiceSender.send_invoice()       │
//! │                                      (failure logged, never             │
//! │                                       surfaces to checkout)             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A purchase is final the moment its transaction commits. Whatever happens
//! on the notification side (queue full, dispatcher gone, delivery error)
//! is logged and swallowed; the cashier's receipt is never held hostage.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use kirana_db::{Database, DbError};

// =============================================================================
// Invoice Notice
// =============================================================================

/// Snapshot of a committed purchase, shaped for delivery.
///
/// Built from a fresh database read, not from checkout-time state. The
/// dispatcher runs detached from the checkout path and must not trust
/// anything but what was actually committed.
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceNotice {
    /// Purchase this notice describes.
    pub purchase_id: String,

    /// Customer email the invoice is addressed to.
    pub email: String,

    /// Grand total in paise.
    pub grand_total_paise: i64,

    /// Change returned to the customer, in paise.
    pub change_due_paise: i64,

    /// Number of lines on the bill.
    pub item_count: usize,

    /// When the purchase was recorded.
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Notify Errors
// =============================================================================

/// Errors produced while building or delivering a notice.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// The committed purchase could not be re-read.
    #[error("Invoice lookup failed: {0}")]
    Lookup(String),

    /// The sender refused or failed to deliver.
    #[error("Invoice delivery failed: {0}")]
    SendFailed(String),
}

impl From<DbError> for NotifyError {
    fn from(err: DbError) -> Self {
        NotifyError::Lookup(err.to_string())
    }
}

// =============================================================================
// Invoice Sender Trait
// =============================================================================

/// Delivery seam for invoice notices.
///
/// The dispatcher owns the async plumbing; implementations only need to
/// hand one notice to the outside world (SMTP relay, webhook, printer).
pub trait InvoiceSender: Send + Sync {
    /// Delivers a single invoice notice.
    fn send_invoice(&self, notice: &InvoiceNotice) -> Result<(), NotifyError>;
}

/// Sender that writes the invoice to the log. Default for shops
/// without an email relay configured.
pub struct LogSender;

impl InvoiceSender for LogSender {
    fn send_invoice(&self, notice: &InvoiceNotice) -> Result<(), NotifyError> {
        info!(
            purchase_id = %notice.purchase_id,
            email = %notice.email,
            grand_total_paise = notice.grand_total_paise,
            change_due_paise = notice.change_due_paise,
            item_count = notice.item_count,
            "Invoice issued"
        );
        Ok(())
    }
}

/// Sender that discards notices.
pub struct NoopSender;

impl InvoiceSender for NoopSender {
    fn send_invoice(&self, _notice: &InvoiceNotice) -> Result<(), NotifyError> {
        Ok(())
    }
}

// =============================================================================
// Invoice Dispatcher
// =============================================================================

/// Background worker that turns queued purchase ids into delivered invoices.
///
/// Created together with its [`NotifierHandle`]; the dispatcher is moved
/// into a spawned task while the handle stays with the billing service.
pub struct InvoiceDispatcher {
    db: Arc<Database>,
    sender: Arc<dyn InvoiceSender>,
    notice_rx: mpsc::Receiver<String>,
    shutdown_rx: mpsc::Receiver<()>,
}

impl InvoiceDispatcher {
    /// Creates a dispatcher and the handle used to feed it.
    pub fn new(
        db: Arc<Database>,
        sender: Arc<dyn InvoiceSender>,
        queue_capacity: usize,
    ) -> (Self, NotifierHandle) {
        let (notice_tx, notice_rx) = mpsc::channel(queue_capacity.max(1));
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let dispatcher = InvoiceDispatcher {
            db,
            sender,
            notice_rx,
            shutdown_rx,
        };
        let handle = NotifierHandle {
            notice_tx: Some(notice_tx),
            shutdown_tx: Some(shutdown_tx),
        };

        (dispatcher, handle)
    }

    /// Runs the dispatch loop until shutdown or until every handle is gone.
    pub async fn run(mut self) {
        info!("Invoice dispatcher started");

        loop {
            tokio::select! {
                Some(purchase_id) = self.notice_rx.recv() => {
                    if let Err(e) = self.dispatch(&purchase_id).await {
                        warn!(
                            purchase_id = %purchase_id,
                            error = %e,
                            "Invoice notice failed"
                        );
                    }
                }
                _ = self.shutdown_rx.recv() => {
                    info!("Invoice dispatcher shutting down");
                    break;
                }
                else => break,
            }
        }
    }

    /// Rebuilds the notice from the database and hands it to the sender.
    async fn dispatch(&self, purchase_id: &str) -> Result<(), NotifyError> {
        let purchase = self
            .db
            .purchases()
            .get_by_id(purchase_id)
            .await?
            .ok_or_else(|| {
                NotifyError::Lookup(format!("Purchase not found: {}", purchase_id))
            })?;

        let customer = self
            .db
            .customers()
            .get_by_id(&purchase.customer_id)
            .await?
            .ok_or_else(|| {
                NotifyError::Lookup(format!("Customer not found: {}", purchase.customer_id))
            })?;

        let items = self.db.purchases().get_items(purchase_id).await?;

        let notice = InvoiceNotice {
            purchase_id: purchase.id.clone(),
            email: customer.email,
            grand_total_paise: purchase.grand_total_paise,
            change_due_paise: purchase.change_due_paise,
            item_count: items.len(),
            created_at: purchase.created_at,
        };

        self.sender.send_invoice(&notice)?;

        debug!(purchase_id = %purchase_id, "Invoice notice delivered");
        Ok(())
    }
}

// =============================================================================
// Notifier Handle
// =============================================================================

/// Cheap, cloneable front door to the dispatcher queue.
///
/// `notify` uses `try_send` so a slow or dead dispatcher can never stall
/// a checkout. A disabled handle (notifications turned off in config)
/// carries no channel at all.
#[derive(Debug, Clone)]
pub struct NotifierHandle {
    notice_tx: Option<mpsc::Sender<String>>,
    shutdown_tx: Option<mpsc::Sender<()>>,
}

impl NotifierHandle {
    /// Handle that silently drops every notice.
    pub fn disabled() -> Self {
        NotifierHandle {
            notice_tx: None,
            shutdown_tx: None,
        }
    }

    /// True when a dispatcher queue is attached.
    pub fn is_enabled(&self) -> bool {
        self.notice_tx.is_some()
    }

    /// Queues a purchase for invoice delivery. Never blocks, never fails
    /// the caller.
    pub fn notify(&self, purchase_id: &str) {
        let Some(tx) = &self.notice_tx else {
            debug!("Invoice notifications disabled, skipping notice");
            return;
        };

        match tx.try_send(purchase_id.to_string()) {
            Ok(()) => {
                debug!(purchase_id = %purchase_id, "Invoice notice queued");
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(
                    purchase_id = %purchase_id,
                    "Invoice queue full, dropping notice"
                );
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                warn!(
                    purchase_id = %purchase_id,
                    "Invoice dispatcher stopped, dropping notice"
                );
            }
        }
    }

    /// Asks the dispatcher to stop after the notice in flight.
    pub async fn shutdown(&self) {
        if let Some(tx) = &self.shutdown_tx {
            let _ = tx.send(()).await;
        }
    }
}
