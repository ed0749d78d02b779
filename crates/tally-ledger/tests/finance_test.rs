//! Derived balances, profit and shop worth, checked against hand-computed
//! replays of the same events.

mod common;

use chrono::{Duration, Utc};
use common::{account, ledger, restock, sell, tissue, CASHIER};
use tally_core::{
    AccountType, DateRange, InvoiceLine, InvoiceRequest, Money, PaymentMethod, TransferRequest,
    UnitKind,
};

#[tokio::test]
async fn balances_replay_invoices_purchases_and_transfers() {
    let ledger = ledger().await;
    let pos = account(&ledger, "Moniepoint", AccountType::PosTerminal).await;
    let bank = account(&ledger, "GTBank", AccountType::BankAccount).await;
    let item = tissue(&ledger, [0, 0, 0]).await;

    restock(&ledger, &item, 2, UnitKind::Carton, 2400, Some(&bank))
        .await
        .unwrap();
    ledger
        .create_invoice(
            InvoiceRequest::cash(CASHIER, vec![InvoiceLine::new(item.id.clone(), 1, UnitKind::Carton)])
                .paid_into(PaymentMethod::Pos, pos.id.clone()),
        )
        .await
        .unwrap();
    // Cash sale with no account moves no balance.
    sell(&ledger, &item, 3, UnitKind::Unit).await.unwrap();
    ledger
        .transfer_funds(TransferRequest {
            user_id: CASHIER.to_string(),
            from_account_id: pos.id.clone(),
            to_account_id: Some(bank.id.clone()),
            amount: Money::from_major(1000),
            is_withdrawal: false,
            notes: None,
        })
        .await
        .unwrap();

    let balances = ledger.account_balances().await.unwrap();
    assert_eq!(balances.len(), 2);
    // Ordered by name.
    assert_eq!(balances[0].account.id, bank.id);
    assert_eq!(balances[1].account.id, pos.id);

    let bank_stats = balances[0].stats;
    assert_eq!(bank_stats.total_purchases, Money::from_major(4800));
    assert_eq!(bank_stats.total_incoming, Money::from_major(1000));
    assert_eq!(bank_stats.net_balance, Money::from_major(-3800));

    let pos_stats = balances[1].stats;
    assert_eq!(pos_stats.total_sales, Money::from_major(3000));
    assert_eq!(pos_stats.total_outgoing, Money::from_major(1000));
    assert_eq!(pos_stats.net_balance, Money::from_major(2000));
}

#[tokio::test]
async fn balances_are_stable_without_writes() {
    let ledger = ledger().await;
    let pos = account(&ledger, "Moniepoint", AccountType::PosTerminal).await;
    let item = tissue(&ledger, [1, 0, 0]).await;
    ledger
        .create_invoice(
            InvoiceRequest::cash(CASHIER, vec![InvoiceLine::new(item.id.clone(), 4, UnitKind::Roll)])
                .paid_into(PaymentMethod::Transfer, pos.id.clone()),
        )
        .await
        .unwrap();

    let first = ledger.account_balances().await.unwrap();
    let second = ledger.account_balances().await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first[0].stats.net_balance, Money::from_major(1280));
}

#[tokio::test]
async fn profit_uses_cost_at_time_of_sale() {
    let ledger = ledger().await;
    let item = tissue(&ledger, [0, 0, 0]).await;

    restock(&ledger, &item, 1, UnitKind::Carton, 2400, None).await.unwrap();
    sell(&ledger, &item, 10, UnitKind::Unit).await.unwrap();

    // A dearer restock must not rewrite the profit already made.
    restock(&ledger, &item, 1, UnitKind::Carton, 3600, None).await.unwrap();

    let stats = ledger.profit_stats(None).await.unwrap();
    assert_eq!(stats.total_revenue, Money::from_major(300));
    assert_eq!(stats.total_cost, Money::from_major(200));
    assert_eq!(stats.total_profit, Money::from_major(100));
    assert_eq!(stats.margin.to_string(), "33.33");

    sell(&ledger, &item, 1, UnitKind::Roll).await.unwrap();
    let stats = ledger.profit_stats(None).await.unwrap();
    // 1 roll at 320 against 12 × 30.
    assert_eq!(stats.total_revenue, Money::from_major(620));
    assert_eq!(stats.total_cost, Money::from_major(560));
}

#[tokio::test]
async fn profit_respects_the_date_range() {
    let ledger = ledger().await;
    let item = tissue(&ledger, [0, 0, 10]).await;
    sell(&ledger, &item, 2, UnitKind::Unit).await.unwrap();

    let tomorrow = Utc::now() + Duration::days(1);
    let future = DateRange::new(Some(tomorrow), None);
    let stats = ledger.profit_stats(Some(future)).await.unwrap();
    assert_eq!(stats.total_revenue, Money::zero());
    assert!(stats.margin.is_zero());

    let past = DateRange::new(None, Some(tomorrow));
    let stats = ledger.profit_stats(Some(past)).await.unwrap();
    assert_eq!(stats.total_revenue, Money::from_major(60));
}

#[tokio::test]
async fn shop_worth_adds_stock_at_cost_and_cash() {
    let ledger = ledger().await;
    let pos = account(&ledger, "Moniepoint", AccountType::PosTerminal).await;
    let bank = account(&ledger, "GTBank", AccountType::BankAccount).await;
    let item = tissue(&ledger, [0, 0, 0]).await;

    restock(&ledger, &item, 2, UnitKind::Carton, 2400, Some(&bank))
        .await
        .unwrap();
    ledger
        .create_invoice(
            InvoiceRequest::cash(CASHIER, vec![InvoiceLine::new(item.id.clone(), 10, UnitKind::Unit)])
                .paid_into(PaymentMethod::Pos, pos.id.clone()),
        )
        .await
        .unwrap();

    let worth = ledger.shop_worth().await.unwrap();

    assert_eq!(worth.inventory_value, Money::from_major(230 * 20));
    assert_eq!(worth.cash_in_hand, Money::from_major(300 - 4800));
    assert_eq!(worth.shop_worth, Money::from_major(100));
}
