//! # Repository Module
//!
//! Database repository implementations for the shop ledger.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  Ledger operation                                                      │
//! │       │                                                                 │
//! │       │  let mut tx = db.begin().await?;                               │
//! │       │  tx.items().get(id)                                            │
//! │       ▼                                                                 │
//! │  ItemRepository<'tx>  (borrows the open transaction)                   │
//! │  ├── get / list / insert / update_details                              │
//! │  ├── apply_stock (compare-and-set on stock_version)                    │
//! │  └── usage_count / delete                                              │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  A repository can only be reached through a transaction, so nothing   │
//! │  it writes is visible until the caller commits.                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ItemRepository`] - Items, stock counters, cost basis
//! - [`InvoiceRepository`] - Invoice headers
//! - [`SaleRepository`] - Invoice lines
//! - [`PurchaseRepository`] - Restocks
//! - [`AccountRepository`] - Payment accounts
//! - [`LedgerEntryRepository`] - Transfers and withdrawals
//! - [`CustomerRepository`] - Customers
//! - [`PriceChangeRepository`] - Price audit trail

pub mod account;
pub mod customer;
pub mod invoice;
pub mod item;
pub mod ledger_entry;
pub mod price_change;
pub mod purchase;
pub mod sale;

#[cfg(test)]
pub(crate) mod testing;

pub use account::AccountRepository;
pub use customer::CustomerRepository;
pub use invoice::InvoiceRepository;
pub use item::ItemRepository;
pub use ledger_entry::LedgerEntryRepository;
pub use price_change::PriceChangeRepository;
pub use purchase::PurchaseRepository;
pub use sale::SaleRepository;

/// Generates a new record ID.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
