//! # Payment Accounts

use chrono::Utc;
use tally_core::validation::clean_optional;
use tally_core::{NewAccount, PaymentAccount, ValidationError};
use tally_db::new_id;
use tracing::info;

use crate::engine::Ledger;
use crate::error::LedgerResult;

impl Ledger {
    pub async fn create_account(&self, new_account: NewAccount) -> LedgerResult<PaymentAccount> {
        new_account.validate()?;

        let account = PaymentAccount {
            id: new_id(),
            name: new_account.name.trim().to_string(),
            account_type: new_account.account_type,
            details: clean_optional(new_account.details.as_deref()),
            created_at: Utc::now(),
        };

        let mut tx = self.write().await?;
        tx.accounts().insert(&account).await?;
        tx.commit().await?;

        info!(account_id = %account.id, name = %account.name, "Payment account created");
        Ok(account)
    }

    /// Accounts ordered by name.
    pub async fn list_accounts(&self) -> LedgerResult<Vec<PaymentAccount>> {
        let mut tx = self.read().await?;
        Ok(tx.accounts().list().await?)
    }

    /// Deletes an account with no recorded history.
    ///
    /// ## Errors
    /// * `VALIDATION_ERROR` - Invoices, purchases or transfers reference it
    /// * `NOT_FOUND` - No such account
    pub async fn delete_account(&self, account_id: &str) -> LedgerResult<()> {
        let mut tx = self.write().await?;

        if tx.accounts().reference_count(account_id).await? > 0 {
            return Err(ValidationError::StillReferenced {
                entity: "PaymentAccount".to_string(),
                id: account_id.to_string(),
            }
            .into());
        }
        tx.accounts().delete(account_id).await?;
        tx.commit().await?;

        info!(account_id = %account_id, "Payment account deleted");
        Ok(())
    }
}
