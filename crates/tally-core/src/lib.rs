//! # tally-core: Pure Domain Logic for the Tally Shop Ledger
//!
//! This crate is the **heart** of Tally. It contains the multi-unit stock
//! model, the cascading allocation planner, and the financial read models
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tally Architecture                               │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Caller (UI / API layer)                      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    tally-ledger                                 │   │
//! │  │    create_invoice, restock, transfer_funds, account_balances    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ tally-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌────────────┐  ┌───────────┐  │   │
//! │  │   │   units   │  │allocation │  │  finance   │  │ requests  │  │   │
//! │  │   │ ratios    │  │ debit /   │  │ balances   │  │ validate  │  │   │
//! │  │   │ unit cost │  │ credit    │  │ profit     │  │           │  │   │
//! │  │   └───────────┘  └───────────┘  └────────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    tally-db (Database Layer)                    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Item, Invoice, Sale, Purchase, ...)
//! - [`money`] - Decimal money type
//! - [`units`] - Carton / Roll / Unit conversion
//! - [`allocation`] - Stock debit and credit planning
//! - [`finance`] - Account balances, profit, shop worth
//! - [`requests`] - Operation inputs and their validation
//! - [`validation`] - Field validators
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use tally_core::{allocation, Money, UnitKind};
//! # use tally_core::Item;
//! # let item = Item {
//! #     id: "i".into(), name: "Tissue".into(), category: None,
//! #     price_carton: Money::zero(), price_roll: Money::zero(), price_unit: Money::zero(),
//! #     base_unit_cost: Money::zero(),
//! #     rolls_per_carton: 10, units_per_roll: 12, units_per_carton: 120,
//! #     stock_cartons: 1, stock_rolls: 0, stock_units: 0, stock_version: 0,
//! #     created_at: chrono::Utc::now(), updated_at: chrono::Utc::now(),
//! # };
//!
//! // 1 carton of 10 rolls × 12 units, sell 8 units
//! let plan = allocation::plan_debit(&item, UnitKind::Unit, 8).unwrap();
//! assert_eq!((plan.after.cartons, plan.after.rolls, plan.after.units), (0, 9, 4));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod allocation;
pub mod error;
pub mod finance;
pub mod money;
pub mod requests;
pub mod types;
pub mod units;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use allocation::{StockLevels, StockMovement, StockPlan};
pub use error::{CoreError, CoreResult, ValidationError};
pub use finance::{AccountBalance, AccountStats, DateRange, ProfitStats, ShopWorth};
pub use money::Money;
pub use requests::*;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum lines on a single invoice.
pub const MAX_INVOICE_LINES: usize = 200;

/// Maximum quantity on a single line, in the line's unit.
pub const MAX_LINE_QUANTITY: i64 = 1_000_000;

/// Largest conversion ratio: rolls per carton, units per roll, and the
/// units-per-carton product.
pub const MAX_PACK_SIZE: i64 = 1_000_000;

/// Largest count a single stock counter may reach through item creation
/// or a restock.
pub const MAX_STOCK_COUNT: i64 = 1_000_000_000_000;

/// Largest price, cost or transfer amount, in major units.
pub const MAX_AMOUNT: i64 = 1_000_000_000_000;

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::Utc;

    use crate::money::Money;
    use crate::types::Item;

    /// An item with the given ratios and `[cartons, rolls, units]` stock.
    pub fn item(
        rolls_per_carton: i64,
        units_per_roll: i64,
        units_per_carton: i64,
        stock: [i64; 3],
    ) -> Item {
        Item {
            id: "item-1".to_string(),
            name: "Tissue".to_string(),
            category: None,
            price_carton: Money::from_major(3000),
            price_roll: Money::from_major(320),
            price_unit: Money::from_major(30),
            base_unit_cost: Money::zero(),
            rolls_per_carton,
            units_per_roll,
            units_per_carton,
            stock_cartons: stock[0],
            stock_rolls: stock[1],
            stock_units: stock[2],
            stock_version: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}
