//! # Financial Aggregation
//!
//! Derived views over the immutable event rows. Nothing here is stored:
//! every figure is recomputed from invoices, purchases, ledger entries and
//! sales each time it is asked for.
//!
//! ## Account Balance
//! ```text
//!   netBalance = Σ invoices paid into the account
//!              + Σ transfers received
//!              − Σ purchases paid from the account
//!              − Σ transfers and withdrawals sent
//! ```

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Invoice, Item, LedgerEntry, PaymentAccount, Purchase, Sale};
use crate::units::total_units;

// =============================================================================
// Account Balances
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AccountStats {
    #[ts(type = "string")]
    pub total_sales: Money,
    #[ts(type = "string")]
    pub total_purchases: Money,
    #[ts(type = "string")]
    pub total_incoming: Money,
    #[ts(type = "string")]
    pub total_outgoing: Money,
    #[ts(type = "string")]
    pub net_balance: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AccountBalance {
    pub account: PaymentAccount,
    pub stats: AccountStats,
}

/// Replays the event rows into one balance per account, in `accounts` order.
///
/// Rows that reference no account (cash invoices without a drawer account,
/// unpaid purchases) do not move any balance.
pub fn derive_account_balances(
    accounts: &[PaymentAccount],
    invoices: &[Invoice],
    purchases: &[Purchase],
    entries: &[LedgerEntry],
) -> Vec<AccountBalance> {
    let mut stats: HashMap<&str, AccountStats> = accounts
        .iter()
        .map(|a| (a.id.as_str(), AccountStats::default()))
        .collect();

    for invoice in invoices {
        if let Some(s) = invoice
            .payment_account_id
            .as_deref()
            .and_then(|id| stats.get_mut(id))
        {
            s.total_sales += invoice.total_amount;
        }
    }

    for purchase in purchases {
        if let Some(s) = purchase
            .payment_account_id
            .as_deref()
            .and_then(|id| stats.get_mut(id))
        {
            s.total_purchases += purchase.total_cost;
        }
    }

    for entry in entries {
        if let Some(s) = stats.get_mut(entry.from_account_id.as_str()) {
            s.total_outgoing += entry.amount;
        }
        if let Some(s) = entry.to_account_id.as_deref().and_then(|id| stats.get_mut(id)) {
            s.total_incoming += entry.amount;
        }
    }

    accounts
        .iter()
        .map(|account| {
            let mut s = stats.remove(account.id.as_str()).unwrap_or_default();
            s.net_balance = s.total_sales + s.total_incoming - s.total_purchases - s.total_outgoing;
            AccountBalance {
                account: account.clone(),
                stats: s,
            }
        })
        .collect()
}

// =============================================================================
// Profit
// =============================================================================

/// Half-open time window `[start, end)`. Either side may be open.
///
/// A sale stamped exactly at `end` falls outside the window, so consecutive
/// days never count a sale twice. Use [`DateRange::day`] for a calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    #[ts(as = "Option<String>")]
    pub start: Option<DateTime<Utc>>,
    #[ts(as = "Option<String>")]
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        DateRange { start, end }
    }

    /// The whole UTC calendar day.
    pub fn day(date: NaiveDate) -> Self {
        let start = date.and_hms_opt(0, 0, 0).map(|t| t.and_utc());
        DateRange {
            start,
            end: start.map(|s| s + Duration::days(1)),
        }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start.map_or(true, |s| at >= s) && self.end.map_or(true, |e| at < e)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProfitStats {
    #[ts(type = "string")]
    pub total_revenue: Money,
    #[ts(type = "string")]
    pub total_cost: Money,
    #[ts(type = "string")]
    pub total_profit: Money,
    /// Percentage of revenue, two decimal places. Zero when there is no revenue.
    #[ts(type = "string")]
    pub margin: Decimal,
}

impl ProfitStats {
    /// Aggregates the given sales. Callers filter by date beforehand.
    ///
    /// ## Errors
    /// `InvalidAmount` when a total leaves the decimal range.
    pub fn from_sales(sales: &[Sale]) -> CoreResult<Self> {
        let mut total_revenue = Money::zero();
        let mut total_cost = Money::zero();
        for sale in sales {
            total_revenue = total_revenue
                .checked_add(sale.total_amount)
                .ok_or_else(|| beyond_range("totalRevenue"))?;
            total_cost = sale
                .line_cost()
                .and_then(|cost| total_cost.checked_add(cost))
                .ok_or_else(|| beyond_range("totalCost"))?;
        }
        let total_profit = total_revenue - total_cost;

        let margin = if total_revenue.is_zero() {
            Decimal::ZERO
        } else {
            total_profit
                .amount()
                .checked_div(total_revenue.amount())
                .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
                .ok_or_else(|| beyond_range("margin"))?
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        };

        Ok(ProfitStats {
            total_revenue,
            total_cost,
            total_profit,
            margin,
        })
    }
}

fn beyond_range(field: &str) -> CoreError {
    CoreError::invalid_amount(field, "exceeds the supported range")
}

// =============================================================================
// Shop Worth
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ShopWorth {
    #[ts(type = "string")]
    pub inventory_value: Money,
    #[ts(type = "string")]
    pub cash_in_hand: Money,
    #[ts(type = "string")]
    pub shop_worth: Money,
}

/// Stock at cost plus the sum of every account's derived balance.
///
/// ## Errors
/// - `Configuration` - an item's stock does not fit in base units
/// - `InvalidAmount` - the inventory value leaves the decimal range
pub fn shop_worth(items: &[Item], balances: &[AccountBalance]) -> CoreResult<ShopWorth> {
    let mut inventory_value = Money::zero();
    for item in items {
        let units = total_units(item)?;
        inventory_value = item
            .base_unit_cost
            .checked_mul_quantity(units)
            .and_then(|value| inventory_value.checked_add(value))
            .ok_or_else(|| beyond_range("inventoryValue"))?;
    }
    let cash_in_hand: Money = balances.iter().map(|b| b.stats.net_balance).sum();
    let shop_worth = inventory_value
        .checked_add(cash_in_hand)
        .ok_or_else(|| beyond_range("shopWorth"))?;

    Ok(ShopWorth {
        inventory_value: inventory_value.round_cents(),
        cash_in_hand,
        shop_worth: shop_worth.round_cents(),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
