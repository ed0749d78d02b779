//! # Domain Types
//!
//! Core domain types of the shop ledger.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Item       │   │     Invoice     │   │    Purchase     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  prices × 3     │◄──│  Sale (lines)   │   │  item_id        │       │
//! │  │  ratios × 3     │   │  total_amount   │   │  unit_kind      │       │
//! │  │  stock  × 3     │   │  payment acct   │   │  total_cost     │       │
//! │  │  base_unit_cost │   └────────┬────────┘   └────────┬────────┘       │
//! │  └─────────────────┘            │                     │                 │
//! │                                 ▼                     ▼                 │
//! │  ┌─────────────────┐   ┌─────────────────────────────────────────┐     │
//! │  │  LedgerEntry    │──►│           PaymentAccount                │     │
//! │  │  transfer or    │   │   no stored balance: always derived     │     │
//! │  │  withdrawal     │   └─────────────────────────────────────────┘     │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every row except `Item` and the directory records (accounts, customers)
//! is immutable once written. JSON field names are camelCase.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::allocation::StockLevels;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;

// =============================================================================
// Unit Kind
// =============================================================================

/// The three nested units of measure, largest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    Carton,
    Roll,
    Unit,
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitKind::Carton => write!(f, "carton"),
            UnitKind::Roll => write!(f, "roll"),
            UnitKind::Unit => write!(f, "unit"),
        }
    }
}

// =============================================================================
// Item
// =============================================================================

/// A stocked product.
///
/// Prices of zero mean the item is not sold in that unit. A ratio of zero
/// means that level of the hierarchy does not exist for this item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    pub name: String,
    pub category: Option<String>,

    #[ts(type = "string")]
    pub price_carton: Money,
    #[ts(type = "string")]
    pub price_roll: Money,
    #[ts(type = "string")]
    pub price_unit: Money,

    /// Cost of one Unit. Overwritten by every restock.
    #[ts(type = "string")]
    pub base_unit_cost: Money,

    pub rolls_per_carton: i64,
    pub units_per_roll: i64,
    pub units_per_carton: i64,

    pub stock_cartons: i64,
    pub stock_rolls: i64,
    pub stock_units: i64,

    /// Bumped by every stock mutation; guards compare-and-set updates.
    pub stock_version: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Item {
    /// Current stock counters.
    #[inline]
    pub fn stock(&self) -> StockLevels {
        StockLevels {
            cartons: self.stock_cartons,
            rolls: self.stock_rolls,
            units: self.stock_units,
        }
    }

    /// Returns the configured price for `unit`, whether or not it is sold.
    pub fn price_for(&self, unit: UnitKind) -> Money {
        match unit {
            UnitKind::Carton => self.price_carton,
            UnitKind::Roll => self.price_roll,
            UnitKind::Unit => self.price_unit,
        }
    }

    /// Returns the selling price for `unit`.
    ///
    /// ## Errors
    /// `UnitNotSold` when the item has no price in that unit.
    pub fn selling_price(&self, unit: UnitKind) -> CoreResult<Money> {
        let price = self.price_for(unit);
        if price.is_positive() {
            Ok(price)
        } else {
            Err(CoreError::UnitNotSold {
                item: self.name.clone(),
                unit,
            })
        }
    }
}

// =============================================================================
// Payment Method / Account Types
// =============================================================================

/// How an invoice was paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash into the drawer.
    Cash,
    /// Card payment on a POS terminal.
    Pos,
    /// Bank transfer.
    Transfer,
}

impl PaymentMethod {
    /// Non-cash payments always land in a named account.
    pub fn requires_account(&self) -> bool {
        !matches!(self, PaymentMethod::Cash)
    }
}

impl Default for PaymentMethod {
    fn default() -> Self {
        PaymentMethod::Cash
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    PosTerminal,
    BankAccount,
    Cash,
    Other,
}

/// A named money pool. Its balance is derived, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PaymentAccount {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub account_type: AccountType,
    pub details: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Invoice / Sale
// =============================================================================

/// A settled invoice header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: String,
    pub customer_id: Option<String>,
    /// Free-text name, or the linked customer's name at time of sale.
    pub customer_name: Option<String>,
    pub notes: Option<String>,
    pub payment_method: PaymentMethod,
    pub payment_account_id: Option<String>,
    /// Always the sum of the invoice's sale totals.
    #[ts(type = "string")]
    pub total_amount: Money,
    pub created_by: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// One line of a settled invoice. Prices and costs are frozen snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: String,
    pub invoice_id: String,
    pub item_id: String,
    pub customer_id: Option<String>,
    pub quantity: i64,
    pub unit_kind: UnitKind,
    #[ts(type = "string")]
    pub price_at_time: Money,
    /// Cost of one sold unit (a whole carton when `unit_kind` is Carton).
    #[ts(type = "string")]
    pub cost_at_time: Money,
    #[ts(type = "string")]
    pub total_amount: Money,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Sale {
    /// Cost basis of the whole line. `None` when it leaves the decimal range.
    #[inline]
    pub fn line_cost(&self) -> Option<Money> {
        self.cost_at_time.checked_mul_quantity(self.quantity)
    }
}

/// An invoice together with its lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SettledInvoice {
    #[serde(flatten)]
    pub invoice: Invoice,
    pub sales: Vec<Sale>,
}

// =============================================================================
// Purchase
// =============================================================================

/// A restock event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    pub id: String,
    pub item_id: String,
    pub quantity: i64,
    /// Carton or Roll only.
    pub unit_kind: UnitKind,
    #[ts(type = "string")]
    pub cost_per_unit_kind: Money,
    #[ts(type = "string")]
    pub total_cost: Money,
    pub payment_account_id: Option<String>,
    pub notes: Option<String>,
    pub created_by: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Ledger Entry (transfers and withdrawals)
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Money moves between two accounts.
    Transfer,
    /// Money leaves the shop.
    Withdrawal,
}

/// A transfer between accounts, or a withdrawal when `to_account_id` is None.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub id: String,
    pub from_account_id: String,
    pub to_account_id: Option<String>,
    #[ts(type = "string")]
    pub amount: Money,
    pub kind: TransactionKind,
    pub notes: Option<String>,
    pub created_by: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Customer
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// A customer with the number of invoices on file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSummary {
    #[serde(flatten)]
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    pub customer: Customer,
    pub invoice_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CustomerHistory {
    pub customer: Customer,
    pub invoices: Vec<SettledInvoice>,
}

// =============================================================================
// Price History
// =============================================================================

/// Audit row written whenever an item's selling prices change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PriceChange {
    pub id: String,
    pub item_id: String,
    #[ts(type = "string")]
    pub old_carton: Money,
    #[ts(type = "string")]
    pub new_carton: Money,
    #[ts(type = "string")]
    pub old_roll: Money,
    #[ts(type = "string")]
    pub new_roll: Money,
    #[ts(type = "string")]
    pub old_unit: Money,
    #[ts(type = "string")]
    pub new_unit: Money,
    pub changed_by: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
