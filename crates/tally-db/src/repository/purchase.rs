//! # Purchase Repository
//!
//! Restock events. Purchases are append-only.

use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::DbResult;
use tally_core::Purchase;

const PURCHASE_COLUMNS: &str = r#"
    id, item_id, quantity, unit_kind, cost_per_unit_kind, total_cost,
    payment_account_id, notes, created_by, created_at
"#;

#[derive(Debug)]
pub struct PurchaseRepository<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> PurchaseRepository<'c> {
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        PurchaseRepository { conn }
    }

    pub async fn insert(&mut self, purchase: &Purchase) -> DbResult<()> {
        debug!(
            id = %purchase.id,
            item_id = %purchase.item_id,
            quantity = purchase.quantity,
            unit = %purchase.unit_kind,
            total = %purchase.total_cost,
            "Inserting purchase"
        );

        sqlx::query(
            r#"
            INSERT INTO purchases (
                id, item_id, quantity, unit_kind, cost_per_unit_kind, total_cost,
                payment_account_id, notes, created_by, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&purchase.id)
        .bind(&purchase.item_id)
        .bind(purchase.quantity)
        .bind(purchase.unit_kind)
        .bind(purchase.cost_per_unit_kind)
        .bind(purchase.total_cost)
        .bind(&purchase.payment_account_id)
        .bind(&purchase.notes)
        .bind(&purchase.created_by)
        .bind(purchase.created_at)
        .execute(&mut *self.conn)
        .await?;

        Ok(())
    }

    /// Purchases, newest first, optionally for a single item.
    pub async fn list(&mut self, item_id: Option<&str>) -> DbResult<Vec<Purchase>> {
        let sql = format!(
            "SELECT {PURCHASE_COLUMNS} FROM purchases \
             WHERE (?1 IS NULL OR item_id = ?1) \
             ORDER BY created_at DESC, rowid DESC"
        );

        let purchases = sqlx::query_as::<_, Purchase>(&sql)
            .bind(item_id)
            .fetch_all(&mut *self.conn)
            .await?;

        Ok(purchases)
    }
}
