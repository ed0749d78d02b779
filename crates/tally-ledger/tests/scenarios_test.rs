//! End-to-end shop scenarios: selling through the unit cascade, restocking,
//! racing for the last carton, and withdrawals.

mod common;

use common::{account, ledger, restock, sell, stock_of, tissue, CASHIER};
use tally_core::{AccountType, Money, TransactionKind, TransferRequest, UnitKind};
use tally_ledger::ErrorCode;

#[tokio::test]
async fn selling_loose_units_until_empty() {
    let ledger = ledger().await;
    let item = tissue(&ledger, [0, 0, 5]).await;

    let settled = sell(&ledger, &item, 5, UnitKind::Unit).await.unwrap();
    assert_eq!(settled.invoice.total_amount, Money::from_major(150));
    assert_eq!(stock_of(&ledger, &item).await, [0, 0, 0]);

    let err = sell(&ledger, &item, 1, UnitKind::Unit).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InsufficientStock);
    assert_eq!(stock_of(&ledger, &item).await, [0, 0, 0]);
}

#[tokio::test]
async fn selling_units_breaks_a_carton_then_a_roll() {
    let ledger = ledger().await;
    let item = tissue(&ledger, [1, 0, 0]).await;

    let settled = sell(&ledger, &item, 8, UnitKind::Unit).await.unwrap();

    assert_eq!(stock_of(&ledger, &item).await, [0, 9, 4]);
    assert_eq!(settled.sales.len(), 1);
    assert_eq!(settled.sales[0].price_at_time, Money::from_major(30));
    assert_eq!(settled.invoice.total_amount, Money::from_major(240));
}

#[tokio::test]
async fn restock_sets_cost_basis_for_later_sales() {
    let ledger = ledger().await;
    let bank = account(&ledger, "GTBank", AccountType::BankAccount).await;
    let item = tissue(&ledger, [0, 0, 0]).await;

    let (purchase, restocked) = restock(&ledger, &item, 2, UnitKind::Carton, 2400, Some(&bank))
        .await
        .unwrap();

    assert_eq!(purchase.total_cost, Money::from_major(4800));
    assert_eq!(restocked.base_unit_cost, Money::from_major(20));
    assert_eq!(restocked.stock_cartons, 2);

    let unit_sale = sell(&ledger, &item, 1, UnitKind::Unit).await.unwrap();
    assert_eq!(unit_sale.sales[0].cost_at_time, Money::from_major(20));

    let carton_sale = sell(&ledger, &item, 1, UnitKind::Carton).await.unwrap();
    assert_eq!(carton_sale.sales[0].cost_at_time, Money::from_major(2400));

    // 1 unit came out of the second carton, the first one sold whole.
    assert_eq!(stock_of(&ledger, &item).await, [0, 9, 11]);
}

#[tokio::test]
async fn two_buyers_race_for_the_last_carton() {
    let ledger = ledger().await;
    let item = tissue(&ledger, [1, 0, 0]).await;

    let (first, second) = tokio::join!(
        sell(&ledger, &item, 1, UnitKind::Carton),
        sell(&ledger, &item, 1, UnitKind::Carton),
    );

    let results = [first, second];
    let won = results.iter().filter(|r| r.is_ok()).count();
    let lost: Vec<_> = results.iter().filter_map(|r| r.as_ref().err()).collect();

    assert_eq!(won, 1);
    assert_eq!(lost.len(), 1);
    assert_eq!(lost[0].code, ErrorCode::InsufficientStock);
    assert_eq!(stock_of(&ledger, &item).await, [0, 0, 0]);
}

#[tokio::test]
async fn withdrawal_drops_the_destination() {
    let ledger = ledger().await;
    let pos = account(&ledger, "Moniepoint", AccountType::PosTerminal).await;
    let bank = account(&ledger, "GTBank", AccountType::BankAccount).await;

    let entry = ledger
        .transfer_funds(TransferRequest {
            user_id: CASHIER.to_string(),
            from_account_id: pos.id.clone(),
            to_account_id: Some(bank.id.clone()),
            amount: Money::from_major(5000),
            is_withdrawal: true,
            notes: Some("Owner drawing".to_string()),
        })
        .await
        .unwrap();

    assert_eq!(entry.to_account_id, None);
    assert_eq!(entry.kind, TransactionKind::Withdrawal);

    let stored = ledger.list_transactions(Some(&bank.id)).await.unwrap();
    assert!(stored.is_empty());

    let balances = ledger.account_balances().await.unwrap();
    let pos_stats = balances.iter().find(|b| b.account.id == pos.id).unwrap().stats;
    let bank_stats = balances.iter().find(|b| b.account.id == bank.id).unwrap().stats;

    assert_eq!(pos_stats.total_outgoing, Money::from_major(5000));
    assert_eq!(pos_stats.net_balance, Money::from_major(-5000));
    assert_eq!(bank_stats.total_incoming, Money::zero());
    assert_eq!(bank_stats.net_balance, Money::zero());
}
