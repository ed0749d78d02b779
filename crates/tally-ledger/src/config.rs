//! # Ledger Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     TALLY_DB_PATH=/srv/shop/tally.db                                   │
//! │     TALLY_MAX_RETRIES=8                                                │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     $TALLY_CONFIG, or                                                  │
//! │     ~/.config/tally-shop/tally.toml (Linux)                            │
//! │     ~/Library/Application Support/com.tally.shop/tally.toml (macOS)    │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # tally.toml
//! [database]
//! path = "/srv/shop/tally.db"
//! max_connections = 5
//! busy_timeout_ms = 5000
//!
//! [ledger]
//! max_conflict_retries = 5
//! retry_backoff_ms = 20
//! recent_invoice_limit = 50
//!
//! [shop]
//! name = "Mama Ngozi Provisions"
//! currency = "NGN"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tally_db::DbConfig;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::retry::RetryPolicy;

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "TALLY_CONFIG";

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

// =============================================================================
// Sections
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite file. Defaults to the platform data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// How long a writer waits for SQLite's write lock.
    #[serde(default = "default_busy_timeout")]
    pub busy_timeout_ms: u64,
}

fn default_max_connections() -> u32 {
    5
}

fn default_busy_timeout() -> u64 {
    5_000
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: None,
            max_connections: default_max_connections(),
            busy_timeout_ms: default_busy_timeout(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerSettings {
    /// Extra attempts after a write conflict. 0 disables retrying.
    #[serde(default = "default_max_retries")]
    pub max_conflict_retries: u32,

    /// Backoff before the first retry; doubles on each further one.
    #[serde(default = "default_retry_backoff")]
    pub retry_backoff_ms: u64,

    /// Default page size for recent invoices.
    #[serde(default = "default_recent_limit")]
    pub recent_invoice_limit: i64,
}

fn default_max_retries() -> u32 {
    5
}

fn default_retry_backoff() -> u64 {
    20
}

fn default_recent_limit() -> i64 {
    50
}

impl Default for LedgerSettings {
    fn default() -> Self {
        LedgerSettings {
            max_conflict_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff(),
            recent_invoice_limit: default_recent_limit(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopSettings {
    #[serde(default = "default_shop_name")]
    pub name: String,

    /// ISO 4217 code shown next to amounts.
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_shop_name() -> String {
    "My Shop".to_string()
}

fn default_currency() -> String {
    "NGN".to_string()
}

impl Default for ShopSettings {
    fn default() -> Self {
        ShopSettings {
            name: default_shop_name(),
            currency: default_currency(),
        }
    }
}

// =============================================================================
// Ledger Configuration
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub ledger: LedgerSettings,

    #[serde(default)]
    pub shop: ShopSettings,
}

impl LedgerConfig {
    /// Loads configuration from file and environment.
    ///
    /// ## Arguments
    /// * `config_path` - Explicit file. Falls back to `TALLY_CONFIG`, then
    ///   the platform config directory. A missing file means defaults.
    ///
    /// ## Errors
    /// * `ConfigError::Parse` - File exists but is not valid TOML
    /// * `ConfigError::InvalidValue` - An override or value is out of range
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        let path = config_path
            .or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from))
            .or_else(Self::default_config_path);

        if let Some(path) = path {
            if path.exists() {
                info!(?path, "Loading ledger config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = Self::from_toml(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;

        Ok(config)
    }

    /// Like [`LedgerConfig::load`], falling back to defaults on any error.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load ledger config, using defaults");
            Self::default()
        })
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Applies `TALLY_*` overrides read through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("TALLY_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = Some(PathBuf::from(path));
        }
        if let Some(value) = lookup("TALLY_MAX_CONNECTIONS") {
            self.database.max_connections = parse_number("TALLY_MAX_CONNECTIONS", &value)?;
        }
        if let Some(value) = lookup("TALLY_BUSY_TIMEOUT_MS") {
            self.database.busy_timeout_ms = parse_number("TALLY_BUSY_TIMEOUT_MS", &value)?;
        }
        if let Some(value) = lookup("TALLY_MAX_RETRIES") {
            self.ledger.max_conflict_retries = parse_number("TALLY_MAX_RETRIES", &value)?;
        }
        if let Some(value) = lookup("TALLY_RETRY_BACKOFF_MS") {
            self.ledger.retry_backoff_ms = parse_number("TALLY_RETRY_BACKOFF_MS", &value)?;
        }
        if let Some(value) = lookup("TALLY_RECENT_LIMIT") {
            self.ledger.recent_invoice_limit = parse_number("TALLY_RECENT_LIMIT", &value)?;
        }
        if let Some(name) = lookup("TALLY_SHOP_NAME") {
            self.shop.name = name;
        }
        if let Some(currency) = lookup("TALLY_CURRENCY") {
            self.shop.currency = currency.to_uppercase();
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "database.max_connections must be greater than 0".into(),
            ));
        }
        if self.ledger.recent_invoice_limit <= 0 {
            return Err(ConfigError::InvalidValue(
                "ledger.recent_invoice_limit must be greater than 0".into(),
            ));
        }
        let currency = &self.shop.currency;
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(ConfigError::InvalidValue(format!(
                "shop.currency must be a three-letter code, got: {}",
                currency
            )));
        }
        Ok(())
    }

    /// Resolved database file.
    pub fn database_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(path) = &self.database.path {
            return Ok(path.clone());
        }
        directories::ProjectDirs::from("com", "tally", "shop")
            .map(|dirs| dirs.data_dir().join("tally.db"))
            .ok_or_else(|| ConfigError::MissingRequired("database.path".into()))
    }

    pub fn db_config(&self) -> Result<DbConfig, ConfigError> {
        Ok(DbConfig::new(self.database_path()?)
            .max_connections(self.database.max_connections)
            .busy_timeout(Duration::from_millis(self.database.busy_timeout_ms)))
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.ledger.max_conflict_retries,
            Duration::from_millis(self.ledger.retry_backoff_ms),
        )
    }

    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "tally", "shop")
            .map(|dirs| dirs.config_dir().join("tally.toml"))
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue(format!("{} is not a number: {}", key, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = LedgerConfig::default();
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.ledger.recent_invoice_limit, 50);
        assert_eq!(config.shop.currency, "NGN");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = LedgerConfig::from_toml(
            r#"
            [database]
            path = "/tmp/shop.db"

            [shop]
            name = "Corner Store"
            "#,
        )
        .unwrap();

        assert_eq!(config.database.path, Some(PathBuf::from("/tmp/shop.db")));
        assert_eq!(config.database.busy_timeout_ms, 5_000);
        assert_eq!(config.ledger.max_conflict_retries, 5);
        assert_eq!(config.shop.name, "Corner Store");
        assert_eq!(config.shop.currency, "NGN");
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("TALLY_DB_PATH", "/srv/tally.db"),
            ("TALLY_MAX_RETRIES", "8"),
            ("TALLY_CURRENCY", "usd"),
        ]);
        let mut config = LedgerConfig::default();
        config
            .apply_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.database_path().unwrap(), PathBuf::from("/srv/tally.db"));
        assert_eq!(config.ledger.max_conflict_retries, 8);
        assert_eq!(config.shop.currency, "USD");
    }

    #[test]
    fn test_bad_override_is_rejected() {
        let mut config = LedgerConfig::default();
        let err = config
            .apply_overrides(|key| (key == "TALLY_MAX_CONNECTIONS").then(|| "lots".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(_)));
    }

    #[test]
    fn test_validation() {
        let mut config = LedgerConfig::default();
        config.database.max_connections = 0;
        assert!(config.validate().is_err());

        let mut config = LedgerConfig::default();
        config.shop.currency = "Naira".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = LedgerConfig::load_or_default(Some(dir.path().join("absent.toml")));
        assert_eq!(config.ledger.retry_backoff_ms, 20);
    }

    #[test]
    fn test_toml_serialization() {
        let toml_str = toml::to_string_pretty(&LedgerConfig::default()).unwrap();
        assert!(toml_str.contains("[database]"));
        assert!(toml_str.contains("[ledger]"));
        assert!(toml_str.contains("[shop]"));
    }
}
