//! # Item Catalog
//!
//! Creating and editing items. Stock counters and the cost basis are not
//! editable here: stock moves only through sales and restocks, and the cost
//! basis only through restocks.

use chrono::Utc;
use tally_core::units::Structure;
use tally_core::validation::clean_optional;
use tally_core::{CoreError, Item, ItemUpdate, Money, NewItem, PriceChange};
use tally_db::new_id;
use tracing::info;

use crate::engine::Ledger;
use crate::error::{LedgerError, LedgerResult};

impl Ledger {
    /// Adds an item with its opening stock.
    ///
    /// `units_per_carton` is derived from the roll structure when both roll
    /// ratios are given, and defaults to 1 when nothing defines it.
    pub async fn create_item(&self, new_item: NewItem) -> LedgerResult<Item> {
        new_item.validate()?;
        let structure = Structure::normalize(
            new_item.rolls_per_carton,
            new_item.units_per_roll,
            new_item.units_per_carton,
        )?;

        let now = Utc::now();
        let item = Item {
            id: new_id(),
            name: new_item.name.trim().to_string(),
            category: clean_optional(new_item.category.as_deref()),
            price_carton: new_item.price_carton,
            price_roll: new_item.price_roll,
            price_unit: new_item.price_unit,
            base_unit_cost: new_item.base_unit_cost,
            rolls_per_carton: structure.rolls_per_carton,
            units_per_roll: structure.units_per_roll,
            units_per_carton: structure.units_per_carton,
            stock_cartons: new_item.stock_cartons,
            stock_rolls: new_item.stock_rolls,
            stock_units: new_item.stock_units,
            stock_version: 0,
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.write().await?;
        tx.items().insert(&item).await?;
        tx.commit().await?;

        info!(item_id = %item.id, name = %item.name, "Item created");
        Ok(item)
    }

    /// Edits name, category, prices and carton structure.
    ///
    /// A price edit appends a [`PriceChange`] in the same transaction.
    pub async fn update_item(&self, item_id: &str, update: ItemUpdate) -> LedgerResult<Item> {
        update.validate()?;

        let update = &update;
        self.retry_policy()
            .run("update_item", move || self.apply_item_update(item_id, update))
            .await
    }

    /// Price-only edit with history.
    pub async fn update_prices(
        &self,
        item_id: &str,
        user_id: &str,
        price_carton: Option<Money>,
        price_roll: Option<Money>,
        price_unit: Option<Money>,
    ) -> LedgerResult<Item> {
        self.update_item(
            item_id,
            ItemUpdate::prices(user_id, price_carton, price_roll, price_unit),
        )
        .await
    }

    async fn apply_item_update(&self, item_id: &str, update: &ItemUpdate) -> LedgerResult<Item> {
        let mut tx = self.write().await?;
        let before = tx
            .items()
            .get(item_id)
            .await?
            .ok_or_else(|| CoreError::ItemNotFound(item_id.to_string()))?;

        let mut item = before.clone();
        if let Some(name) = &update.name {
            item.name = name.trim().to_string();
        }
        if update.category.is_some() {
            item.category = clean_optional(update.category.as_deref());
        }
        item.price_carton = update.price_carton.unwrap_or(item.price_carton);
        item.price_roll = update.price_roll.unwrap_or(item.price_roll);
        item.price_unit = update.price_unit.unwrap_or(item.price_unit);

        let rolls_per_carton = update.rolls_per_carton.unwrap_or(before.rolls_per_carton);
        let units_per_roll = update.units_per_roll.unwrap_or(before.units_per_roll);
        let rolls_changed = update.rolls_per_carton.is_some() || update.units_per_roll.is_some();
        // A new roll structure re-derives units per carton unless one is given.
        let explicit_units = update.units_per_carton.or_else(|| {
            let rederive = rolls_changed && rolls_per_carton > 0 && units_per_roll > 0;
            (!rederive).then_some(before.units_per_carton)
        });
        let structure = Structure::normalize(rolls_per_carton, units_per_roll, explicit_units)?;
        item.rolls_per_carton = structure.rolls_per_carton;
        item.units_per_roll = structure.units_per_roll;
        item.units_per_carton = structure.units_per_carton;
        item.updated_at = Utc::now();

        tx.items().update_details(&item).await?;

        let prices_moved = item.price_carton != before.price_carton
            || item.price_roll != before.price_roll
            || item.price_unit != before.price_unit;
        if prices_moved {
            let change = PriceChange {
                id: new_id(),
                item_id: item.id.clone(),
                old_carton: before.price_carton,
                new_carton: item.price_carton,
                old_roll: before.price_roll,
                new_roll: item.price_roll,
                old_unit: before.price_unit,
                new_unit: item.price_unit,
                changed_by: update.user_id.clone(),
                created_at: item.updated_at,
            };
            tx.price_changes().insert(&change).await?;
        }

        tx.commit().await?;

        info!(item_id = %item.id, prices_moved, "Item updated");
        Ok(item)
    }

    /// Price edits for an item, newest first.
    pub async fn price_history(&self, item_id: &str) -> LedgerResult<Vec<PriceChange>> {
        let mut tx = self.read().await?;
        if tx.items().get(item_id).await?.is_none() {
            return Err(LedgerError::not_found("Item", item_id));
        }
        Ok(tx.price_changes().for_item(item_id).await?)
    }

    /// All items ordered by name.
    pub async fn list_items(&self) -> LedgerResult<Vec<Item>> {
        let mut tx = self.read().await?;
        Ok(tx.items().list().await?)
    }

    pub async fn get_item(&self, item_id: &str) -> LedgerResult<Item> {
        let mut tx = self.read().await?;
        tx.items()
            .get(item_id)
            .await?
            .ok_or_else(|| LedgerError::not_found("Item", item_id))
    }

    /// Deletes an item that no sale or purchase refers to.
    ///
    /// ## Errors
    /// * `ITEM_IN_USE` - Sales or purchases reference the item
    /// * `NOT_FOUND` - No such item
    pub async fn delete_item(&self, item_id: &str) -> LedgerResult<()> {
        let mut tx = self.write().await?;
        let item = tx
            .items()
            .get(item_id)
            .await?
            .ok_or_else(|| LedgerError::not_found("Item", item_id))?;

        let references = tx.items().usage_count(item_id).await?;
        if references > 0 {
            return Err(CoreError::ItemInUse {
                item: item.name,
                references,
            }
            .into());
        }

        tx.items().delete(item_id).await?;
        tx.commit().await?;

        info!(item_id = %item_id, "Item deleted");
        Ok(())
    }
}
