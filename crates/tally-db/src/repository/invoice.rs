//! # Invoice Repository
//!
//! Invoice headers. Lines live in [`SaleRepository`](super::SaleRepository).
//!
//! ## Invoice Write Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  (one write transaction)                                               │
//! │                                                                         │
//! │  1. insert()      → header with total_amount = 0                       │
//! │  2. per line      → stock CAS + sale row                               │
//! │  3. set_total()   → total_amount = Σ line totals                       │
//! │  4. commit                                                              │
//! │                                                                         │
//! │  Readers never see step 1 without step 3.                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::{DbError, DbResult};
use tally_core::{Invoice, Money};

const INVOICE_COLUMNS: &str = r#"
    id, customer_id, customer_name, notes,
    payment_method, payment_account_id, total_amount,
    created_by, created_at
"#;

/// Repository for invoice headers.
#[derive(Debug)]
pub struct InvoiceRepository<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> InvoiceRepository<'c> {
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        InvoiceRepository { conn }
    }

    pub async fn insert(&mut self, invoice: &Invoice) -> DbResult<()> {
        debug!(id = %invoice.id, method = ?invoice.payment_method, "Inserting invoice");

        sqlx::query(
            r#"
            INSERT INTO invoices (
                id, customer_id, customer_name, notes,
                payment_method, payment_account_id, total_amount,
                created_by, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&invoice.id)
        .bind(&invoice.customer_id)
        .bind(&invoice.customer_name)
        .bind(&invoice.notes)
        .bind(invoice.payment_method)
        .bind(&invoice.payment_account_id)
        .bind(invoice.total_amount)
        .bind(&invoice.created_by)
        .bind(invoice.created_at)
        .execute(&mut *self.conn)
        .await?;

        Ok(())
    }

    /// Sets the invoice total once every line has been written.
    pub async fn set_total(&mut self, id: &str, total: Money) -> DbResult<()> {
        let result = sqlx::query("UPDATE invoices SET total_amount = ?2 WHERE id = ?1")
            .bind(id)
            .bind(total)
            .execute(&mut *self.conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Invoice", id));
        }

        Ok(())
    }

    pub async fn get(&mut self, id: &str) -> DbResult<Option<Invoice>> {
        let sql = format!("SELECT {INVOICE_COLUMNS} FROM invoices WHERE id = ?1");

        let invoice = sqlx::query_as::<_, Invoice>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await?;

        Ok(invoice)
    }

    /// Most recent invoices first.
    pub async fn recent(&mut self, limit: i64) -> DbResult<Vec<Invoice>> {
        let sql = format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices ORDER BY created_at DESC, rowid DESC LIMIT ?1"
        );

        let invoices = sqlx::query_as::<_, Invoice>(&sql)
            .bind(limit)
            .fetch_all(&mut *self.conn)
            .await?;

        Ok(invoices)
    }

    /// Invoices linked to a customer, most recent first.
    pub async fn by_customer(&mut self, customer_id: &str) -> DbResult<Vec<Invoice>> {
        let sql = format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices WHERE customer_id = ?1 \
             ORDER BY created_at DESC, rowid DESC"
        );

        let invoices = sqlx::query_as::<_, Invoice>(&sql)
            .bind(customer_id)
            .fetch_all(&mut *self.conn)
            .await?;

        Ok(invoices)
    }

    /// Invoices created in `[start, end)`, oldest first. Open bounds are `None`.
    pub async fn between(
        &mut self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> DbResult<Vec<Invoice>> {
        let sql = format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices \
             WHERE (?1 IS NULL OR created_at >= ?1) AND (?2 IS NULL OR created_at < ?2) \
             ORDER BY created_at, rowid"
        );

        let invoices = sqlx::query_as::<_, Invoice>(&sql)
            .bind(start)
            .bind(end)
            .fetch_all(&mut *self.conn)
            .await?;

        Ok(invoices)
    }

    /// Every invoice, oldest first.
    pub async fn all(&mut self) -> DbResult<Vec<Invoice>> {
        self.between(None, None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::new_id;
    use crate::repository::testing::test_db;
    use chrono::Duration;
    use tally_core::PaymentMethod;

    fn invoice_at(created_at: DateTime<Utc>) -> Invoice {
        Invoice {
            id: new_id(),
            customer_id: None,
            customer_name: Some("Walk-in".to_string()),
            notes: None,
            payment_method: PaymentMethod::Cash,
            payment_account_id: None,
            total_amount: Money::zero(),
            created_by: "cashier".to_string(),
            created_at,
        }
    }

    #[tokio::test]
    async fn test_insert_then_set_total() {
        let db = test_db().await;
        let invoice = invoice_at(Utc::now());

        let mut tx = db.begin().await.unwrap();
        tx.invoices().insert(&invoice).await.unwrap();
        tx.invoices()
            .set_total(&invoice.id, Money::from_major(3560))
            .await
            .unwrap();
        let loaded = tx.invoices().get(&invoice.id).await.unwrap().unwrap();

        assert_eq!(loaded.total_amount, Money::from_major(3560));
        assert_eq!(loaded.payment_method, PaymentMethod::Cash);
        assert_eq!(loaded.customer_name.as_deref(), Some("Walk-in"));
    }

    #[tokio::test]
    async fn test_recent_is_newest_first_and_limited() {
        let db = test_db().await;
        let now = Utc::now();

        let mut tx = db.begin().await.unwrap();
        let old = invoice_at(now - Duration::hours(2));
        let mid = invoice_at(now - Duration::hours(1));
        let new = invoice_at(now);
        for inv in [&old, &mid, &new] {
            tx.invoices().insert(inv).await.unwrap();
        }

        let recent = tx.invoices().recent(2).await.unwrap();
        let ids: Vec<&str> = recent.iter().map(|i| i.id.as_str()).collect();

        assert_eq!(ids, vec![new.id.as_str(), mid.id.as_str()]);
    }

    #[tokio::test]
    async fn test_between_is_half_open() {
        let db = test_db().await;
        let now = Utc::now();

        let mut tx = db.begin().await.unwrap();
        let inside = invoice_at(now - Duration::minutes(30));
        let at_end = invoice_at(now);
        tx.invoices().insert(&inside).await.unwrap();
        tx.invoices().insert(&at_end).await.unwrap();

        let found = tx
            .invoices()
            .between(Some(now - Duration::hours(1)), Some(now))
            .await
            .unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, inside.id);
        assert_eq!(tx.invoices().all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_set_total_on_missing_invoice() {
        let db = test_db().await;
        let mut tx = db.begin().await.unwrap();

        let err = tx
            .invoices()
            .set_total("missing", Money::zero())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
