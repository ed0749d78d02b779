//! # Scoped Transactions
//!
//! Every ledger operation runs inside exactly one [`DbTransaction`].
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  db.begin()                                                            │
//! │    BEGIN                                                               │
//! │    UPDATE write_sequence ... ← claims the write lock up front          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  tx.items() / tx.invoices() / tx.sales() ...                           │
//! │       │                                                                 │
//! │       ├── tx.commit()  → COMMIT, every write becomes visible at once   │
//! │       └── drop(tx)     → ROLLBACK, nothing happened                    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::{
    AccountRepository, CustomerRepository, InvoiceRepository, ItemRepository,
    LedgerEntryRepository, PriceChangeRepository, PurchaseRepository, SaleRepository,
};

/// An open database transaction with repository access.
///
/// Dropping the transaction without calling [`commit`](Self::commit) rolls
/// it back.
pub struct DbTransaction {
    tx: Transaction<'static, Sqlite>,
    writable: bool,
}

impl std::fmt::Debug for DbTransaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbTransaction")
            .field("writable", &self.writable)
            .finish_non_exhaustive()
    }
}

impl DbTransaction {
    pub(crate) async fn write(pool: &SqlitePool) -> DbResult<Self> {
        let mut tx = pool.begin().await?;

        // First statement is a write, so SQLite takes the RESERVED lock now
        // instead of failing later when a read lock cannot be upgraded.
        sqlx::query("UPDATE write_sequence SET tick = tick + 1 WHERE id = 1")
            .execute(&mut *tx)
            .await?;

        debug!("Write transaction started");
        Ok(DbTransaction { tx, writable: true })
    }

    pub(crate) async fn read(pool: &SqlitePool) -> DbResult<Self> {
        let tx = pool.begin().await?;
        Ok(DbTransaction {
            tx,
            writable: false,
        })
    }

    /// Whether this transaction holds the write lock.
    pub fn is_writable(&self) -> bool {
        self.writable
    }

    pub fn items(&mut self) -> ItemRepository<'_> {
        ItemRepository::new(&mut self.tx)
    }

    pub fn invoices(&mut self) -> InvoiceRepository<'_> {
        InvoiceRepository::new(&mut self.tx)
    }

    pub fn sales(&mut self) -> SaleRepository<'_> {
        SaleRepository::new(&mut self.tx)
    }

    pub fn purchases(&mut self) -> PurchaseRepository<'_> {
        PurchaseRepository::new(&mut self.tx)
    }

    pub fn accounts(&mut self) -> AccountRepository<'_> {
        AccountRepository::new(&mut self.tx)
    }

    pub fn ledger_entries(&mut self) -> LedgerEntryRepository<'_> {
        LedgerEntryRepository::new(&mut self.tx)
    }

    pub fn customers(&mut self) -> CustomerRepository<'_> {
        CustomerRepository::new(&mut self.tx)
    }

    pub fn price_changes(&mut self) -> PriceChangeRepository<'_> {
        PriceChangeRepository::new(&mut self.tx)
    }

    /// Commits every write made through this transaction.
    pub async fn commit(self) -> DbResult<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| match DbError::from(e) {
                DbError::Conflict(msg) => DbError::Conflict(msg),
                other => DbError::TransactionFailed(other.to_string()),
            })?;
        debug!("Transaction committed");
        Ok(())
    }

    /// Explicitly discards every write made through this transaction.
    pub async fn rollback(self) -> DbResult<()> {
        self.tx
            .rollback()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
        debug!("Transaction rolled back");
        Ok(())
    }
}
