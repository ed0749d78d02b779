//! # Sale Repository
//!
//! Invoice lines. Each row freezes the selling price and cost basis at the
//! moment of sale, so later price or cost changes never rewrite history.

use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::DbResult;
use tally_core::Sale;

const SALE_COLUMNS: &str = r#"
    id, invoice_id, item_id, customer_id,
    quantity, unit_kind, price_at_time, cost_at_time, total_amount,
    created_at
"#;

/// Repository for sale (invoice line) rows.
#[derive(Debug)]
pub struct SaleRepository<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> SaleRepository<'c> {
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        SaleRepository { conn }
    }

    pub async fn insert(&mut self, sale: &Sale) -> DbResult<()> {
        debug!(
            invoice_id = %sale.invoice_id,
            item_id = %sale.item_id,
            quantity = sale.quantity,
            unit = %sale.unit_kind,
            "Inserting sale"
        );

        sqlx::query(
            r#"
            INSERT INTO sales (
                id, invoice_id, item_id, customer_id,
                quantity, unit_kind, price_at_time, cost_at_time, total_amount,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.invoice_id)
        .bind(&sale.item_id)
        .bind(&sale.customer_id)
        .bind(sale.quantity)
        .bind(sale.unit_kind)
        .bind(sale.price_at_time)
        .bind(sale.cost_at_time)
        .bind(sale.total_amount)
        .bind(sale.created_at)
        .execute(&mut *self.conn)
        .await?;

        Ok(())
    }

    /// Lines of one invoice in the order they were written.
    pub async fn by_invoice(&mut self, invoice_id: &str) -> DbResult<Vec<Sale>> {
        let sql = format!("SELECT {SALE_COLUMNS} FROM sales WHERE invoice_id = ?1 ORDER BY rowid");

        let sales = sqlx::query_as::<_, Sale>(&sql)
            .bind(invoice_id)
            .fetch_all(&mut *self.conn)
            .await?;

        Ok(sales)
    }

    /// Sales created in `[start, end)`, newest first. Open bounds are `None`.
    pub async fn between(
        &mut self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> DbResult<Vec<Sale>> {
        let sql = format!(
            "SELECT {SALE_COLUMNS} FROM sales \
             WHERE (?1 IS NULL OR created_at >= ?1) AND (?2 IS NULL OR created_at < ?2) \
             ORDER BY created_at DESC, rowid DESC"
        );

        let sales = sqlx::query_as::<_, Sale>(&sql)
            .bind(start)
            .bind(end)
            .fetch_all(&mut *self.conn)
            .await?;

        debug!(count = sales.len(), "Loaded sales in range");
        Ok(sales)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::new_id;
    use crate::repository::testing::{sample_item, test_db};
    use tally_core::{Invoice, Money, PaymentMethod, UnitKind};

    #[tokio::test]
    async fn test_lines_keep_insertion_order_and_snapshots() {
        let db = test_db().await;
        let item = sample_item("Tissue", 10, 12, [5, 0, 0]);
        let now = Utc::now();
        let invoice = Invoice {
            id: new_id(),
            customer_id: None,
            customer_name: None,
            notes: None,
            payment_method: PaymentMethod::Cash,
            payment_account_id: None,
            total_amount: Money::zero(),
            created_by: "cashier".to_string(),
            created_at: now,
        };

        let line = |unit_kind: UnitKind, price: i64, cost: &str| Sale {
            id: new_id(),
            invoice_id: invoice.id.clone(),
            item_id: item.id.clone(),
            customer_id: None,
            quantity: 2,
            unit_kind,
            price_at_time: Money::from_major(price),
            cost_at_time: Money::parse(cost).unwrap(),
            total_amount: Money::from_major(price * 2),
            created_at: now,
        };
        let first = line(UnitKind::Roll, 320, "260.00");
        let second = line(UnitKind::Unit, 30, "21.67");

        let mut tx = db.begin().await.unwrap();
        tx.items().insert(&item).await.unwrap();
        tx.invoices().insert(&invoice).await.unwrap();
        tx.sales().insert(&first).await.unwrap();
        tx.sales().insert(&second).await.unwrap();

        let lines = tx.sales().by_invoice(&invoice.id).await.unwrap();

        assert_eq!(lines, vec![first, second]);
        assert_eq!(lines[1].cost_at_time, Money::parse("21.67").unwrap());
        assert_eq!(tx.sales().between(None, None).await.unwrap().len(), 2);
    }
}
