//! # Payment Account Repository
//!
//! Accounts store no balance column. Balances are derived by the ledger
//! from invoices, purchases and ledger entries.

use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::{DbError, DbResult};
use tally_core::PaymentAccount;

#[derive(Debug)]
pub struct AccountRepository<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> AccountRepository<'c> {
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        AccountRepository { conn }
    }

    pub async fn insert(&mut self, account: &PaymentAccount) -> DbResult<()> {
        debug!(id = %account.id, name = %account.name, "Inserting payment account");

        sqlx::query(
            r#"
            INSERT INTO payment_accounts (id, name, account_type, details, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&account.id)
        .bind(&account.name)
        .bind(account.account_type)
        .bind(&account.details)
        .bind(account.created_at)
        .execute(&mut *self.conn)
        .await?;

        Ok(())
    }

    pub async fn get(&mut self, id: &str) -> DbResult<Option<PaymentAccount>> {
        let account = sqlx::query_as::<_, PaymentAccount>(
            "SELECT id, name, account_type, details, created_at FROM payment_accounts WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(account)
    }

    /// All accounts ordered by name.
    pub async fn list(&mut self) -> DbResult<Vec<PaymentAccount>> {
        let accounts = sqlx::query_as::<_, PaymentAccount>(
            "SELECT id, name, account_type, details, created_at FROM payment_accounts \
             ORDER BY name COLLATE NOCASE, id",
        )
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(accounts)
    }

    /// Number of invoices, purchases and ledger entries that name the account.
    pub async fn reference_count(&mut self, id: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT
                (SELECT COUNT(*) FROM invoices WHERE payment_account_id = ?1)
              + (SELECT COUNT(*) FROM purchases WHERE payment_account_id = ?1)
              + (SELECT COUNT(*) FROM ledger_entries
                 WHERE from_account_id = ?1 OR to_account_id = ?1)
            "#,
        )
        .bind(id)
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(count)
    }

    pub async fn delete(&mut self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting payment account");

        let result = sqlx::query("DELETE FROM payment_accounts WHERE id = ?1")
            .bind(id)
            .execute(&mut *self.conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("PaymentAccount", id));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::testing::{sample_account, test_db};
    use tally_core::AccountType;

    #[tokio::test]
    async fn test_insert_get_and_list() {
        let db = test_db().await;
        let pos = sample_account("Moniepoint POS", AccountType::PosTerminal);
        let bank = sample_account("GTBank", AccountType::BankAccount);

        let mut tx = db.begin().await.unwrap();
        tx.accounts().insert(&pos).await.unwrap();
        tx.accounts().insert(&bank).await.unwrap();

        let loaded = tx.accounts().get(&pos.id).await.unwrap().unwrap();
        assert_eq!(loaded.account_type, AccountType::PosTerminal);
        assert_eq!(tx.accounts().list().await.unwrap().len(), 2);
        assert_eq!(tx.accounts().reference_count(&pos.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete() {
        let db = test_db().await;
        let cash = sample_account("Drawer", AccountType::Cash);

        let mut tx = db.begin().await.unwrap();
        tx.accounts().insert(&cash).await.unwrap();
        tx.accounts().delete(&cash.id).await.unwrap();

        assert!(tx.accounts().get(&cash.id).await.unwrap().is_none());
        assert!(matches!(
            tx.accounts().delete(&cash.id).await,
            Err(DbError::NotFound { .. })
        ));
    }
}
