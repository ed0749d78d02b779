//! # Price Change Repository
//!
//! Append-only audit trail of selling price edits.

use sqlx::SqliteConnection;

use crate::error::DbResult;
use tally_core::PriceChange;

#[derive(Debug)]
pub struct PriceChangeRepository<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> PriceChangeRepository<'c> {
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        PriceChangeRepository { conn }
    }

    pub async fn insert(&mut self, change: &PriceChange) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO price_changes (
                id, item_id,
                old_carton, new_carton, old_roll, new_roll, old_unit, new_unit,
                changed_by, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&change.id)
        .bind(&change.item_id)
        .bind(change.old_carton)
        .bind(change.new_carton)
        .bind(change.old_roll)
        .bind(change.new_roll)
        .bind(change.old_unit)
        .bind(change.new_unit)
        .bind(&change.changed_by)
        .bind(change.created_at)
        .execute(&mut *self.conn)
        .await?;

        Ok(())
    }

    /// Changes for one item, newest first.
    pub async fn for_item(&mut self, item_id: &str) -> DbResult<Vec<PriceChange>> {
        let changes = sqlx::query_as::<_, PriceChange>(
            r#"
            SELECT
                id, item_id,
                old_carton, new_carton, old_roll, new_roll, old_unit, new_unit,
                changed_by, created_at
            FROM price_changes
            WHERE item_id = ?1
            ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .bind(item_id)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(changes)
    }
}
