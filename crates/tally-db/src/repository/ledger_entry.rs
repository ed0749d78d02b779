//! # Ledger Entry Repository
//!
//! Transfers between accounts and withdrawals out of the shop.

use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::DbResult;
use tally_core::LedgerEntry;

const ENTRY_COLUMNS: &str = r#"
    id, from_account_id, to_account_id, amount, kind, notes, created_by, created_at
"#;

#[derive(Debug)]
pub struct LedgerEntryRepository<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> LedgerEntryRepository<'c> {
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        LedgerEntryRepository { conn }
    }

    pub async fn insert(&mut self, entry: &LedgerEntry) -> DbResult<()> {
        debug!(
            id = %entry.id,
            from = %entry.from_account_id,
            to = ?entry.to_account_id,
            amount = %entry.amount,
            "Inserting ledger entry"
        );

        sqlx::query(
            r#"
            INSERT INTO ledger_entries (
                id, from_account_id, to_account_id, amount, kind, notes, created_by, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&entry.id)
        .bind(&entry.from_account_id)
        .bind(&entry.to_account_id)
        .bind(entry.amount)
        .bind(entry.kind)
        .bind(&entry.notes)
        .bind(&entry.created_by)
        .bind(entry.created_at)
        .execute(&mut *self.conn)
        .await?;

        Ok(())
    }

    /// Entries touching `account_id` on either side, or every entry when
    /// `None`. Newest first.
    pub async fn list(&mut self, account_id: Option<&str>) -> DbResult<Vec<LedgerEntry>> {
        let sql = format!(
            "SELECT {ENTRY_COLUMNS} FROM ledger_entries \
             WHERE (?1 IS NULL OR from_account_id = ?1 OR to_account_id = ?1) \
             ORDER BY created_at DESC, rowid DESC"
        );

        let entries = sqlx::query_as::<_, LedgerEntry>(&sql)
            .bind(account_id)
            .fetch_all(&mut *self.conn)
            .await?;

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::new_id;
    use crate::repository::testing::{sample_account, test_db};
    use crate::DbError;
    use chrono::Utc;
    use tally_core::{AccountType, Money, TransactionKind};

    #[tokio::test]
    async fn test_list_matches_either_side() {
        let db = test_db().await;
        let pos = sample_account("POS", AccountType::PosTerminal);
        let bank = sample_account("Bank", AccountType::BankAccount);
        let drawer = sample_account("Drawer", AccountType::Cash);

        let transfer = LedgerEntry {
            id: new_id(),
            from_account_id: pos.id.clone(),
            to_account_id: Some(bank.id.clone()),
            amount: Money::from_major(200),
            kind: TransactionKind::Transfer,
            notes: None,
            created_by: "owner".to_string(),
            created_at: Utc::now(),
        };
        let withdrawal = LedgerEntry {
            id: new_id(),
            from_account_id: drawer.id.clone(),
            to_account_id: None,
            amount: Money::from_major(50),
            kind: TransactionKind::Withdrawal,
            notes: Some("fuel".to_string()),
            created_by: "owner".to_string(),
            created_at: Utc::now(),
        };

        let mut tx = db.begin().await.unwrap();
        for account in [&pos, &bank, &drawer] {
            tx.accounts().insert(account).await.unwrap();
        }
        tx.ledger_entries().insert(&transfer).await.unwrap();
        tx.ledger_entries().insert(&withdrawal).await.unwrap();

        assert_eq!(tx.ledger_entries().list(None).await.unwrap().len(), 2);
        assert_eq!(
            tx.ledger_entries().list(Some(&bank.id)).await.unwrap(),
            vec![transfer]
        );
        assert_eq!(tx.accounts().reference_count(&drawer.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_unknown_account_violates_foreign_key() {
        let db = test_db().await;
        let entry = LedgerEntry {
            id: new_id(),
            from_account_id: "nope".to_string(),
            to_account_id: None,
            amount: Money::from_major(1),
            kind: TransactionKind::Withdrawal,
            notes: None,
            created_by: "owner".to_string(),
            created_at: Utc::now(),
        };

        let mut tx = db.begin().await.unwrap();
        let err = tx.ledger_entries().insert(&entry).await.unwrap_err();

        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }
}
