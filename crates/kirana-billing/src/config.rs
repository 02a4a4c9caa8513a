//! # Billing Configuration
//!
//! Configuration management for the billing engine.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     KIRANA_STORE_NAME="Sharma General Store"                            │
//! │     KIRANA_CHANGE_POLICY=reject                                         │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ./kirana.toml (next to the till binary)                             │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     ChangePolicy::RecordUnavailable, queue capacity 64                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # kirana.toml
//! [store]
//! name = "Sharma General Store"
//!
//! [billing]
//! change_policy = "record_unavailable"  # record_unavailable | reject
//! max_line_quantity = 999
//!
//! [notify]
//! enabled = true
//! queue_capacity = 64
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::error::{BillingError, BillingResult};

/// The till is a single-directory install; a `kirana.toml` next to the
/// binary keeps the whole shop portable on a USB stick.
const DEFAULT_CONFIG_FILE: &str = "./kirana.toml";

// =============================================================================
// Change Policy
// =============================================================================

/// What to do when the drawer cannot make exact change.
///
/// ## Policy Comparison
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                     Change Policy Behavior                              │
/// │                                                                         │
/// │  RECORD_UNAVAILABLE (Default)       │  REJECT                           │
/// │  ────────────────────────────       │  ──────                           │
/// │  • Purchase commits anyway          │  • Whole checkout rolls back      │
/// │  • Breakdown stored as NULL         │  • Customer keeps their cash      │
/// │  • Drawer untouched                 │  • Stock goes back on the shelf   │
/// │  • Cashier settles change by hand   │  • Cashier asks for exact money   │
/// │  • Best for trusted neighborhoods   │  • Best for strict accounting     │
/// │                                                                         │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangePolicy {
    /// Commit the purchase with an explicit no-change marker.
    #[default]
    RecordUnavailable,

    /// Fail the checkout; nothing is written.
    Reject,
}

impl std::fmt::Display for ChangePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ChangePolicy::RecordUnavailable => "record_unavailable",
            ChangePolicy::Reject => "reject",
        };
        f.write_str(label)
    }
}

impl std::str::FromStr for ChangePolicy {
    type Err = BillingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        match normalized.as_str() {
            "record_unavailable" | "record" => Ok(ChangePolicy::RecordUnavailable),
            "reject" | "strict" => Ok(ChangePolicy::Reject),
            other => Err(BillingError::InvalidConfig(format!(
                "Unknown change policy: '{}'. Valid options: record_unavailable, reject",
                other
            ))),
        }
    }
}

// =============================================================================
// Store Settings
// =============================================================================

/// The shop identity printed on receipts and invoices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Human-readable store name.
    #[serde(default = "default_store_name")]
    pub name: String,
}

fn default_store_name() -> String {
    "Kirana Store".to_string()
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            name: default_store_name(),
        }
    }
}

// =============================================================================
// Billing Settings
// =============================================================================

/// Checkout behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillingSettings {
    /// What to do when the drawer cannot make exact change.
    #[serde(default)]
    pub change_policy: ChangePolicy,

    /// Per-line quantity cap for this store.
    /// Never exceeds the hard limit baked into validation (999).
    #[serde(default = "default_max_line_quantity")]
    pub max_line_quantity: i64,
}

fn default_max_line_quantity() -> i64 {
    kirana_core::MAX_LINE_QUANTITY
}

impl Default for BillingSettings {
    fn default() -> Self {
        BillingSettings {
            change_policy: ChangePolicy::default(),
            max_line_quantity: default_max_line_quantity(),
        }
    }
}

// =============================================================================
// Notify Settings
// =============================================================================

/// Invoice notification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifySettings {
    /// Whether to dispatch invoice notices at all.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Depth of the dispatch queue. When full, notices are dropped
    /// with a warning rather than blocking checkout.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

fn default_enabled() -> bool {
    true
}

fn default_queue_capacity() -> usize {
    64
}

impl Default for NotifySettings {
    fn default() -> Self {
        NotifySettings {
            enabled: default_enabled(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

// =============================================================================
// Main Billing Configuration
// =============================================================================

/// Complete billing configuration.
///
/// ## Example Config File
/// ```toml
/// [store]
/// name = "Sharma General Store"
///
/// [billing]
/// change_policy = "reject"
/// max_line_quantity = 50
///
/// [notify]
/// enabled = true
/// queue_capacity = 64
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BillingConfig {
    /// Store identity.
    #[serde(default)]
    pub store: StoreSettings,

    /// Checkout behavior.
    #[serde(default)]
    pub billing: BillingSettings,

    /// Notification behavior.
    #[serde(default)]
    pub notify: NotifySettings,
}

impl BillingConfig {
    /// Creates a new config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (kirana.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> BillingResult<Self> {
        let path = config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        let mut config = if path.exists() {
            info!(?path, "Loading billing config from file");
            toml::from_str::<Self>(&std::fs::read_to_string(&path)?)?
        } else {
            debug!(?path, "No config file at this path, starting from defaults");
            Self::default()
        };

        config.override_from_env();
        config.validate()?;
        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        match Self::load(config_path) {
            Ok(config) => config,
            Err(err) => {
                warn!(%err, "Billing config rejected, falling back to defaults");
                Self::default()
            }
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> BillingResult<()> {
        if self.store.name.trim().is_empty() {
            return Err(BillingError::InvalidConfig(
                "store name must not be empty".into(),
            ));
        }

        if self.billing.max_line_quantity < 1
            || self.billing.max_line_quantity > kirana_core::MAX_LINE_QUANTITY
        {
            return Err(BillingError::InvalidConfig(format!(
                "max_line_quantity must be between 1 and {}",
                kirana_core::MAX_LINE_QUANTITY
            )));
        }

        if self.notify.queue_capacity == 0 {
            return Err(BillingError::InvalidConfig(
                "notify queue_capacity must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies `KIRANA_*` environment variable overrides.
    fn override_from_env(&mut self) {
        if let Ok(name) = std::env::var("KIRANA_STORE_NAME") {
            debug!(store_name = %name, "Overriding store name from environment");
            self.store.name = name;
        }

        if let Ok(policy) = std::env::var("KIRANA_CHANGE_POLICY") {
            match policy.parse() {
                Ok(parsed) => {
                    debug!(policy = %policy, "Overriding change policy from environment");
                    self.billing.change_policy = parsed;
                }
                Err(_) => warn!(policy = %policy, "Unknown change policy in environment"),
            }
        }

        if let Ok(max) = std::env::var("KIRANA_MAX_LINE_QUANTITY") {
            if let Ok(m) = max.parse::<i64>() {
                self.billing.max_line_quantity = m;
            }
        }

        if let Ok(enabled) = std::env::var("KIRANA_NOTIFY_ENABLED") {
            match enabled.to_lowercase().as_str() {
                "1" | "true" | "yes" => self.notify.enabled = true,
                "0" | "false" | "no" => self.notify.enabled = false,
                _ => warn!(value = %enabled, "Unknown notify toggle in environment"),
            }
        }

        if let Ok(capacity) = std::env::var("KIRANA_NOTIFY_CAPACITY") {
            if let Ok(c) = capacity.parse::<usize>() {
                self.notify.queue_capacity = c;
            }
        }
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Returns the store name.
    pub fn store_name(&self) -> &str {
        &self.store.name
    }

    /// Returns the change policy.
    pub fn change_policy(&self) -> ChangePolicy {
        self.billing.change_policy
    }

    /// Returns true if invoice notifications are enabled.
    pub fn notify_enabled(&self) -> bool {
        self.notify.enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_policy_parsing() {
        assert_eq!(
            "record_unavailable".parse::<ChangePolicy>().unwrap(),
            ChangePolicy::RecordUnavailable
        );
        assert_eq!(
            "record".parse::<ChangePolicy>().unwrap(),
            ChangePolicy::RecordUnavailable
        );
        assert_eq!("reject".parse::<ChangePolicy>().unwrap(), ChangePolicy::Reject);
        assert_eq!(" STRICT ".parse::<ChangePolicy>().unwrap(), ChangePolicy::Reject);
        assert!("invalid".parse::<ChangePolicy>().is_err());
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = BillingConfig::default();
        config.validate().unwrap();

        assert_eq!(config.store.name, "Kirana Store");
        assert_eq!(config.billing.change_policy, ChangePolicy::RecordUnavailable);
        assert_eq!(config.billing.max_line_quantity, 999);
        assert!(config.notify.enabled);
        assert_eq!(config.notify.queue_capacity, 64);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = BillingConfig::default();

        config.store.name = "  ".to_string();
        assert!(matches!(
            config.validate(),
            Err(BillingError::InvalidConfig(_))
        ));

        config.store.name = "Test Store".to_string();
        config.notify.queue_capacity = 0;
        assert!(matches!(
            config.validate(),
            Err(BillingError::InvalidConfig(_))
        ));

        config.notify.queue_capacity = 8;
        config.billing.max_line_quantity = 10_000;
        assert!(matches!(
            config.validate(),
            Err(BillingError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: BillingConfig = toml::from_str(
            r#"
            [store]
            name = "Sharma General Store"

            [billing]
            change_policy = "reject"
            "#,
        )
        .unwrap();

        assert_eq!(config.store.name, "Sharma General Store");
        assert_eq!(config.billing.change_policy, ChangePolicy::Reject);
        // Untouched sections keep their defaults
        assert_eq!(config.billing.max_line_quantity, 999);
        assert_eq!(config.notify.queue_capacity, 64);
    }

    #[test]
    fn test_round_trips_through_toml() {
        let rendered = toml::to_string_pretty(&BillingConfig::default()).unwrap();
        let parsed: BillingConfig = toml::from_str(&rendered).unwrap();

        assert_eq!(parsed.store.name, "Kirana Store");
        assert_eq!(parsed.billing.change_policy, ChangePolicy::RecordUnavailable);
        assert_eq!(parsed.notify.queue_capacity, 64);
    }
}
