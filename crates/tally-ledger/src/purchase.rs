//! # Purchase Processor
//!
//! Restocking credits cartons or rolls and resets the item's cost basis to
//! the latest purchase price, normalised to one base Unit. Earlier sales
//! keep the `cost_at_time` they were recorded with.

use chrono::Utc;
use tally_core::allocation::plan_credit;
use tally_core::units::normalized_unit_cost;
use tally_core::validation::clean_optional;
use tally_core::{CoreError, Item, Purchase, RestockRequest};
use tally_db::new_id;
use tracing::info;

use crate::engine::Ledger;
use crate::error::LedgerResult;

impl Ledger {
    /// Records a purchase and credits stock.
    ///
    /// ## Returns
    /// The stored purchase and the item as it stands after the restock.
    ///
    /// ## Errors
    /// * `UNSUPPORTED_UNIT` - Loose units cannot be restocked
    /// * `INVALID_AMOUNT` - Cost is not positive
    /// * `NOT_FOUND` - Item or payment account missing
    /// * `CONFIGURATION_ERROR` - The purchase unit has no unit count to divide by
    pub async fn restock(&self, request: RestockRequest) -> LedgerResult<(Purchase, Item)> {
        request.validate()?;

        let request = &request;
        self.retry_policy()
            .run("restock", move || self.apply_restock(request))
            .await
    }

    async fn apply_restock(&self, request: &RestockRequest) -> LedgerResult<(Purchase, Item)> {
        let mut tx = self.write().await?;

        let item = tx
            .items()
            .get(&request.item_id)
            .await?
            .ok_or_else(|| CoreError::ItemNotFound(request.item_id.clone()))?;

        if let Some(account_id) = &request.payment_account_id {
            if tx.accounts().get(account_id).await?.is_none() {
                return Err(CoreError::not_found("PaymentAccount", account_id).into());
            }
        }

        let base_unit_cost = normalized_unit_cost(&item, request.unit_kind, request.cost_per_unit)?;
        let plan = plan_credit(&item, request.unit_kind, request.quantity)?;

        let total_cost = request
            .cost_per_unit
            .checked_mul_quantity(request.quantity)
            .ok_or_else(|| CoreError::invalid_amount("totalCost", "exceeds the supported range"))?;
        let purchase = Purchase {
            id: new_id(),
            item_id: item.id.clone(),
            quantity: request.quantity,
            unit_kind: request.unit_kind,
            cost_per_unit_kind: request.cost_per_unit,
            total_cost,
            payment_account_id: request.payment_account_id.clone(),
            notes: clean_optional(request.notes.as_deref()),
            created_by: request.user_id.clone(),
            created_at: Utc::now(),
        };
        tx.purchases().insert(&purchase).await?;
        tx.items()
            .apply_stock(&item.id, item.stock_version, &plan.after)
            .await?;
        tx.items().set_base_unit_cost(&item.id, base_unit_cost).await?;

        let updated = tx
            .items()
            .get(&item.id)
            .await?
            .ok_or_else(|| CoreError::ItemNotFound(item.id.clone()))?;
        tx.commit().await?;

        info!(
            purchase_id = %purchase.id,
            item_id = %updated.id,
            quantity = purchase.quantity,
            unit = %purchase.unit_kind,
            base_unit_cost = %updated.base_unit_cost,
            "Restock recorded"
        );

        Ok((purchase, updated))
    }

    /// Purchases, newest first, optionally for one item.
    pub async fn list_purchases(&self, item_id: Option<&str>) -> LedgerResult<Vec<Purchase>> {
        let mut tx = self.read().await?;
        Ok(tx.purchases().list(item_id).await?)
    }
}
