//! # tally-ledger: Shop Ledger Engine
//!
//! Sales, restocks and transfers in, derived balances and profit out.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Tally Ledger                                   │
//! │                                                                         │
//! │   Caller (UI, HTTP, seed)                                               │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Ledger (THIS CRATE)                                             │  │
//! │  │                                                                  │  │
//! │  │  create_invoice   restock   transfer_funds     (write, retried)  │  │
//! │  │  account_balances profit_stats shop_worth      (snapshot reads)  │  │
//! │  │  catalog / accounts / customers                                  │  │
//! │  └──────────┬──────────────────────────────┬────────────────────────┘  │
//! │             │ plans                        │ one transaction per op    │
//! │             ▼                              ▼                            │
//! │  ┌──────────────────────┐       ┌──────────────────────────┐           │
//! │  │ tally-core           │       │ tally-db                 │           │
//! │  │ allocation, units,   │       │ Database, DbTransaction, │           │
//! │  │ finance, validation  │       │ repositories             │           │
//! │  └──────────────────────┘       └──────────────────────────┘           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! use tally_ledger::{init_tracing, Ledger, LedgerConfig};
//! use tally_core::{InvoiceLine, InvoiceRequest, UnitKind};
//!
//! init_tracing();
//! let ledger = Ledger::open(&LedgerConfig::load(None)?).await?;
//!
//! let settled = ledger
//!     .create_invoice(InvoiceRequest::cash(
//!         "cashier-1",
//!         vec![InvoiceLine::new(item_id, 8, UnitKind::Unit)],
//!     ))
//!     .await?;
//! ```

use tracing_subscriber::EnvFilter;

pub mod accounts;
pub mod catalog;
pub mod config;
pub mod customers;
pub mod engine;
pub mod error;
pub mod finance;
pub mod invoice;
pub mod purchase;
pub mod retry;
pub mod transfer;

pub use config::{ConfigError, LedgerConfig};
pub use engine::Ledger;
pub use error::{ErrorCode, LedgerError, LedgerResult};
pub use retry::RetryPolicy;

/// Default log filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,tally=debug,sqlx=warn";

/// Initializes the tracing subscriber.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Verbose logging
/// - `RUST_LOG=tally_ledger=trace` - Trace one crate
/// - Default: info for everything, debug for tally crates, warn for sqlx
///
/// Calling it again after a subscriber is installed does nothing.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
