//! # Item Repository
//!
//! Database operations for items and their stock counters.
//!
//! ## Stock Updates
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    Stock Update Strategy                            │
//! │                                                                     │
//! │  The allocation planner computes the AFTER state from the item it  │
//! │  read. The write is a compare-and-set on stock_version:            │
//! │                                                                     │
//! │     UPDATE items SET stock_* = <after>,                            │
//! │                      stock_version = stock_version + 1             │
//! │     WHERE id = ? AND stock_version = <version read>                │
//! │                                                                     │
//! │  0 rows → someone else moved the stock → DbError::Conflict         │
//! │  The whole operation is rolled back and retried from a fresh read. │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::{DbError, DbResult};
use tally_core::{Item, Money, StockLevels};

const ITEM_COLUMNS: &str = r#"
    id, name, category,
    price_carton, price_roll, price_unit, base_unit_cost,
    rolls_per_carton, units_per_roll, units_per_carton,
    stock_cartons, stock_rolls, stock_units, stock_version,
    created_at, updated_at
"#;

/// Repository for item database operations.
#[derive(Debug)]
pub struct ItemRepository<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> ItemRepository<'c> {
    /// Creates a new ItemRepository over an open transaction.
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        ItemRepository { conn }
    }

    /// Gets an item by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Item))` - Item found
    /// * `Ok(None)` - Item not found
    pub async fn get(&mut self, id: &str) -> DbResult<Option<Item>> {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM items WHERE id = ?1");

        let item = sqlx::query_as::<_, Item>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await?;

        Ok(item)
    }

    /// Lists all items ordered by name.
    pub async fn list(&mut self) -> DbResult<Vec<Item>> {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM items ORDER BY name, id");

        let items = sqlx::query_as::<_, Item>(&sql)
            .fetch_all(&mut *self.conn)
            .await?;

        debug!(count = items.len(), "Listed items");
        Ok(items)
    }

    /// Inserts a new item.
    pub async fn insert(&mut self, item: &Item) -> DbResult<()> {
        debug!(id = %item.id, name = %item.name, "Inserting item");

        sqlx::query(
            r#"
            INSERT INTO items (
                id, name, category,
                price_carton, price_roll, price_unit, base_unit_cost,
                rolls_per_carton, units_per_roll, units_per_carton,
                stock_cartons, stock_rolls, stock_units, stock_version,
                created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3,
                ?4, ?5, ?6, ?7,
                ?8, ?9, ?10,
                ?11, ?12, ?13, ?14,
                ?15, ?16
            )
            "#,
        )
        .bind(&item.id)
        .bind(&item.name)
        .bind(&item.category)
        .bind(item.price_carton)
        .bind(item.price_roll)
        .bind(item.price_unit)
        .bind(item.base_unit_cost)
        .bind(item.rolls_per_carton)
        .bind(item.units_per_roll)
        .bind(item.units_per_carton)
        .bind(item.stock_cartons)
        .bind(item.stock_rolls)
        .bind(item.stock_units)
        .bind(item.stock_version)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&mut *self.conn)
        .await?;

        Ok(())
    }

    /// Updates descriptive fields, prices and ratios. Stock counters and
    /// the cost basis are never touched here.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - Item doesn't exist
    pub async fn update_details(&mut self, item: &Item) -> DbResult<()> {
        debug!(id = %item.id, "Updating item details");

        let result = sqlx::query(
            r#"
            UPDATE items SET
                name = ?2,
                category = ?3,
                price_carton = ?4,
                price_roll = ?5,
                price_unit = ?6,
                rolls_per_carton = ?7,
                units_per_roll = ?8,
                units_per_carton = ?9,
                updated_at = ?10
            WHERE id = ?1
            "#,
        )
        .bind(&item.id)
        .bind(&item.name)
        .bind(&item.category)
        .bind(item.price_carton)
        .bind(item.price_roll)
        .bind(item.price_unit)
        .bind(item.rolls_per_carton)
        .bind(item.units_per_roll)
        .bind(item.units_per_carton)
        .bind(item.updated_at)
        .execute(&mut *self.conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Item", &item.id));
        }

        Ok(())
    }

    /// Writes new stock counters if nobody else has since `expected_version`.
    ///
    /// ## Arguments
    /// * `id` - Item ID
    /// * `expected_version` - `stock_version` of the item the plan was built from
    /// * `after` - Counters after the plan is applied
    ///
    /// ## Errors
    /// * `DbError::Conflict` - The item's stock moved since it was read
    pub async fn apply_stock(
        &mut self,
        id: &str,
        expected_version: i64,
        after: &StockLevels,
    ) -> DbResult<()> {
        debug!(
            id = %id,
            version = expected_version,
            cartons = after.cartons,
            rolls = after.rolls,
            units = after.units,
            "Applying stock"
        );

        let result = sqlx::query(
            r#"
            UPDATE items SET
                stock_cartons = ?3,
                stock_rolls = ?4,
                stock_units = ?5,
                stock_version = stock_version + 1,
                updated_at = ?6
            WHERE id = ?1 AND stock_version = ?2
            "#,
        )
        .bind(id)
        .bind(expected_version)
        .bind(after.cartons)
        .bind(after.rolls)
        .bind(after.units)
        .bind(Utc::now())
        .execute(&mut *self.conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::conflict(format!(
                "stock of item {} changed since version {}",
                id, expected_version
            )));
        }

        Ok(())
    }

    /// Overwrites the per-Unit cost basis.
    pub async fn set_base_unit_cost(&mut self, id: &str, cost: Money) -> DbResult<()> {
        debug!(id = %id, cost = %cost, "Setting base unit cost");

        let result = sqlx::query("UPDATE items SET base_unit_cost = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(cost)
            .bind(Utc::now())
            .execute(&mut *self.conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Item", id));
        }

        Ok(())
    }

    /// Number of sales and purchases that reference the item.
    pub async fn usage_count(&mut self, id: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT
                (SELECT COUNT(*) FROM sales WHERE item_id = ?1)
              + (SELECT COUNT(*) FROM purchases WHERE item_id = ?1)
            "#,
        )
        .bind(id)
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(count)
    }

    /// Hard-deletes an item. Its price history goes with it.
    pub async fn delete(&mut self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting item");

        let result = sqlx::query("DELETE FROM items WHERE id = ?1")
            .bind(id)
            .execute(&mut *self.conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Item", id));
        }

        Ok(())
    }
}
