//! Common helpers for ledger integration tests.
#![allow(dead_code)]

use std::path::Path;
use std::time::Duration;

use tally_core::{
    AccountType, InvoiceLine, InvoiceRequest, Item, Money, NewAccount, NewItem, PaymentAccount,
    Purchase, RestockRequest, SettledInvoice, UnitKind,
};
use tally_db::{Database, DbConfig};
use tally_ledger::{Ledger, LedgerResult, RetryPolicy};

pub const CASHIER: &str = "cashier-1";

/// Ledger over a private in-memory database.
pub async fn ledger() -> Ledger {
    let db = Database::new(DbConfig::in_memory())
        .await
        .expect("Failed to open in-memory database");
    Ledger::new(db).with_retry_policy(RetryPolicy::new(10, Duration::from_millis(2)))
}

/// Ledger over a WAL file with several pooled connections.
pub async fn file_ledger(dir: &Path) -> Ledger {
    let config = DbConfig::new(dir.join("tally.db"))
        .max_connections(8)
        .busy_timeout(Duration::from_secs(10));
    let db = Database::new(config)
        .await
        .expect("Failed to open file database");
    Ledger::new(db).with_retry_policy(RetryPolicy::new(20, Duration::from_millis(2)))
}

/// 10 rolls per carton, 12 units per roll, priced 3000 / 320 / 30.
pub async fn tissue(ledger: &Ledger, stock: [i64; 3]) -> Item {
    ledger
        .create_item(NewItem {
            name: "Tissue".to_string(),
            price_carton: Money::from_major(3000),
            price_roll: Money::from_major(320),
            price_unit: Money::from_major(30),
            rolls_per_carton: 10,
            units_per_roll: 12,
            stock_cartons: stock[0],
            stock_rolls: stock[1],
            stock_units: stock[2],
            ..Default::default()
        })
        .await
        .expect("Failed to create item")
}

pub async fn account(ledger: &Ledger, name: &str, account_type: AccountType) -> PaymentAccount {
    ledger
        .create_account(NewAccount::new(name, account_type))
        .await
        .expect("Failed to create account")
}

/// Single-line cash sale.
pub async fn sell(
    ledger: &Ledger,
    item: &Item,
    quantity: i64,
    unit_kind: UnitKind,
) -> LedgerResult<SettledInvoice> {
    ledger
        .create_invoice(InvoiceRequest::cash(
            CASHIER,
            vec![InvoiceLine::new(item.id.clone(), quantity, unit_kind)],
        ))
        .await
}

pub async fn restock(
    ledger: &Ledger,
    item: &Item,
    quantity: i64,
    unit_kind: UnitKind,
    cost: i64,
    account: Option<&PaymentAccount>,
) -> LedgerResult<(Purchase, Item)> {
    ledger
        .restock(RestockRequest {
            item_id: item.id.clone(),
            user_id: CASHIER.to_string(),
            quantity,
            unit_kind,
            cost_per_unit: Money::from_major(cost),
            payment_account_id: account.map(|a| a.id.clone()),
            notes: None,
        })
        .await
}

/// `[cartons, rolls, units]` as stored right now.
pub async fn stock_of(ledger: &Ledger, item: &Item) -> [i64; 3] {
    let item = ledger.get_item(&item.id).await.expect("Item vanished");
    [item.stock_cartons, item.stock_rolls, item.stock_units]
}

/// Stock in base units for the tissue structure.
pub fn units_of(stock: [i64; 3]) -> i64 {
    stock[0] * 120 + stock[1] * 12 + stock[2]
}
