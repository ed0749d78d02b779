//! # Ledger Handle
//!
//! `Ledger` owns the database pool and the retry policy. Operations are
//! implemented as `impl Ledger` blocks in their own modules.
//!
//! ## Thread Safety
//! The pool inside `Database` is cheap to clone and safe to share, so one
//! `Ledger` can be cloned into every task that sells, restocks or reports.

use tally_db::{Database, DbTransaction};
use tracing::info;

use crate::config::LedgerConfig;
use crate::error::LedgerResult;
use crate::retry::RetryPolicy;

#[derive(Debug, Clone)]
pub struct Ledger {
    db: Database,
    retry: RetryPolicy,
    recent_invoice_limit: i64,
}

impl Ledger {
    /// Wraps an open database with default settings.
    pub fn new(db: Database) -> Self {
        let defaults = LedgerConfig::default();
        Ledger {
            db,
            retry: defaults.retry_policy(),
            recent_invoice_limit: defaults.ledger.recent_invoice_limit,
        }
    }

    /// Opens (and migrates) the configured database.
    ///
    /// ## Errors
    /// * `CONFIG_ERROR` - No database path could be resolved
    /// * `DATABASE_ERROR` - Connection or migration failed
    pub async fn open(config: &LedgerConfig) -> LedgerResult<Self> {
        let db_config = config.db_config()?;
        info!(path = ?db_config.database_path, shop = %config.shop.name, "Opening ledger");

        let db = Database::new(db_config).await?;
        Ok(Ledger {
            db,
            retry: config.retry_policy(),
            recent_invoice_limit: config.ledger.recent_invoice_limit,
        })
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    pub(crate) fn recent_invoice_limit(&self) -> i64 {
        self.recent_invoice_limit
    }

    /// Write transaction holding SQLite's write lock.
    pub(crate) async fn write(&self) -> LedgerResult<DbTransaction> {
        Ok(self.db.begin().await?)
    }

    /// Read transaction over one committed snapshot.
    pub(crate) async fn read(&self) -> LedgerResult<DbTransaction> {
        Ok(self.db.snapshot().await?)
    }
}
