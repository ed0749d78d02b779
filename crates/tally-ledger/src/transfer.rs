//! # Funds Transfer
//!
//! Moves money between payment accounts, or out of the shop entirely.
//! Balances are derived, so a transfer is a single ledger entry insert.

use chrono::Utc;
use tally_core::validation::clean_optional;
use tally_core::{CoreError, LedgerEntry, TransactionKind, TransferRequest};
use tally_db::new_id;
use tracing::info;

use crate::engine::Ledger;
use crate::error::LedgerResult;

impl Ledger {
    /// Records a transfer or withdrawal.
    ///
    /// A withdrawal never has a destination: any `to_account_id` supplied
    /// with `is_withdrawal = true` is dropped.
    ///
    /// ## Errors
    /// * `INVALID_AMOUNT` - Amount is not positive
    /// * `VALIDATION_ERROR` - Transfer without a destination, or to itself
    /// * `NOT_FOUND` - Source or destination account missing
    pub async fn transfer_funds(&self, request: TransferRequest) -> LedgerResult<LedgerEntry> {
        request.validate()?;

        let request = &request;
        self.retry_policy()
            .run("transfer_funds", move || self.record_transfer(request))
            .await
    }

    async fn record_transfer(&self, request: &TransferRequest) -> LedgerResult<LedgerEntry> {
        let mut tx = self.write().await?;

        let accounts = std::iter::once(request.from_account_id.as_str()).chain(request.destination());
        for account_id in accounts {
            if tx.accounts().get(account_id).await?.is_none() {
                return Err(CoreError::not_found("PaymentAccount", account_id).into());
            }
        }

        let entry = LedgerEntry {
            id: new_id(),
            from_account_id: request.from_account_id.clone(),
            to_account_id: request.destination().map(str::to_string),
            amount: request.amount,
            kind: if request.is_withdrawal {
                TransactionKind::Withdrawal
            } else {
                TransactionKind::Transfer
            },
            notes: clean_optional(request.notes.as_deref()),
            created_by: request.user_id.clone(),
            created_at: Utc::now(),
        };
        tx.ledger_entries().insert(&entry).await?;
        tx.commit().await?;

        info!(
            entry_id = %entry.id,
            from = %entry.from_account_id,
            to = ?entry.to_account_id,
            amount = %entry.amount,
            kind = ?entry.kind,
            "Funds moved"
        );

        Ok(entry)
    }

    /// Transfers and withdrawals, newest first, optionally touching one account.
    pub async fn list_transactions(&self, account_id: Option<&str>) -> LedgerResult<Vec<LedgerEntry>> {
        let mut tx = self.read().await?;
        Ok(tx.ledger_entries().list(account_id).await?)
    }
}
