//! # Balance Deriver
//!
//! Read-side views computed from the event rows on every call. Each view
//! reads inside one snapshot transaction, so it never sees a half-written
//! invoice and two calls with no write in between return identical results.

use tally_core::finance::{self, derive_account_balances};
use tally_core::{AccountBalance, DateRange, ProfitStats, ShopWorth};
use tally_db::DbTransaction;
use tracing::debug;

use crate::engine::Ledger;
use crate::error::LedgerResult;

impl Ledger {
    /// One entry per account, ordered by account name.
    pub async fn account_balances(&self) -> LedgerResult<Vec<AccountBalance>> {
        let mut tx = self.read().await?;
        balances_in(&mut tx).await
    }

    /// Revenue, cost and margin over sales in `range` (all time when `None`).
    pub async fn profit_stats(&self, range: Option<DateRange>) -> LedgerResult<ProfitStats> {
        let range = range.unwrap_or_default();

        let mut tx = self.read().await?;
        let sales = tx.sales().between(range.start, range.end).await?;

        let stats = ProfitStats::from_sales(&sales)?;
        debug!(sales = sales.len(), revenue = %stats.total_revenue, "Profit computed");
        Ok(stats)
    }

    /// Inventory at cost plus cash across all accounts.
    pub async fn shop_worth(&self) -> LedgerResult<ShopWorth> {
        let mut tx = self.read().await?;
        let items = tx.items().list().await?;
        let balances = balances_in(&mut tx).await?;

        Ok(finance::shop_worth(&items, &balances)?)
    }
}

async fn balances_in(tx: &mut DbTransaction) -> LedgerResult<Vec<AccountBalance>> {
    let accounts = tx.accounts().list().await?;
    let invoices = tx.invoices().all().await?;
    let purchases = tx.purchases().list(None).await?;
    let entries = tx.ledger_entries().list(None).await?;

    debug!(
        accounts = accounts.len(),
        invoices = invoices.len(),
        purchases = purchases.len(),
        entries = entries.len(),
        "Deriving account balances"
    );

    Ok(derive_account_balances(&accounts, &invoices, &purchases, &entries))
}
