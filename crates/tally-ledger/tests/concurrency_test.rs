//! Many cashiers on one WAL database: stock is never oversold, no invoice
//! is half visible, and unrelated items do not block each other's sales.

mod common;

use common::{account, file_ledger, restock, sell, stock_of, tissue, units_of, CASHIER};
use tally_core::{AccountType, DateRange, InvoiceLine, InvoiceRequest, Money, PaymentMethod, UnitKind};
use tally_ledger::ErrorCode;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_sales_never_oversell() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = file_ledger(dir.path()).await;
    // 2 cartons + 3 rolls + 5 units = 281 units.
    let item = tissue(&ledger, [2, 3, 5]).await;

    let mut handles = Vec::new();
    for n in 0..24 {
        let ledger = ledger.clone();
        let item = item.clone();
        let (quantity, unit_kind) = match n % 3 {
            0 => (7, UnitKind::Unit),
            1 => (2, UnitKind::Roll),
            _ => (1, UnitKind::Carton),
        };
        handles.push(tokio::spawn(async move {
            sell(&ledger, &item, quantity, unit_kind).await
        }));
    }

    let mut sold_units = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(settled) => {
                let sale = &settled.sales[0];
                sold_units += sale.quantity
                    * match sale.unit_kind {
                        UnitKind::Carton => 120,
                        UnitKind::Roll => 12,
                        UnitKind::Unit => 1,
                    };
            }
            Err(err) => assert_eq!(err.code, ErrorCode::InsufficientStock, "{err}"),
        }
    }

    let after = stock_of(&ledger, &item).await;
    assert!(after.iter().all(|n| *n >= 0), "{after:?}");
    assert_eq!(units_of(after) + sold_units, 281);

    let recorded = ledger.sales_between(DateRange::default()).await.unwrap();
    let recorded_revenue: Money = recorded.iter().map(|s| s.total_amount).sum();
    let invoiced: Money = ledger
        .recent_invoices(Some(100))
        .await
        .unwrap()
        .iter()
        .map(|i| i.invoice.total_amount)
        .sum();
    assert_eq!(recorded_revenue, invoiced);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn last_carton_goes_to_exactly_one_buyer() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = file_ledger(dir.path()).await;
    let item = tissue(&ledger, [1, 0, 0]).await;

    let handles: Vec<_> = (0..6)
        .map(|_| {
            let ledger = ledger.clone();
            let item = item.clone();
            tokio::spawn(async move { sell(&ledger, &item, 1, UnitKind::Carton).await })
        })
        .collect();

    let mut won = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => won += 1,
            Err(err) => assert_eq!(err.code, ErrorCode::InsufficientStock),
        }
    }

    assert_eq!(won, 1);
    assert_eq!(stock_of(&ledger, &item).await, [0, 0, 0]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn restocks_and_sales_interleave_safely() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = file_ledger(dir.path()).await;
    let item = tissue(&ledger, [0, 0, 0]).await;

    let mut handles = Vec::new();
    for n in 0..10 {
        let ledger = ledger.clone();
        let item = item.clone();
        handles.push(tokio::spawn(async move {
            if n % 2 == 0 {
                restock(&ledger, &item, 1, UnitKind::Carton, 2400, None)
                    .await
                    .map(|_| 0)
            } else {
                sell(&ledger, &item, 10, UnitKind::Unit).await.map(|_| 10)
            }
        }));
    }

    let mut sold = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(units) => sold += units,
            Err(err) => assert_eq!(err.code, ErrorCode::InsufficientStock),
        }
    }

    let after = stock_of(&ledger, &item).await;
    assert!(after.iter().all(|n| *n >= 0));
    assert_eq!(units_of(after) + sold, 5 * 120);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn unrelated_items_sell_side_by_side() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = file_ledger(dir.path()).await;

    let mut items = Vec::new();
    for _ in 0..4 {
        items.push(tissue(&ledger, [1, 0, 0]).await);
    }

    let mut handles = Vec::new();
    for item in &items {
        for _ in 0..3 {
            let ledger = ledger.clone();
            let item = item.clone();
            handles.push(tokio::spawn(async move {
                sell(&ledger, &item, 2, UnitKind::Roll).await
            }));
        }
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    for item in &items {
        assert_eq!(stock_of(&ledger, item).await, [0, 4, 0]);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn balances_read_during_sales_are_consistent() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = file_ledger(dir.path()).await;
    let pos = account(&ledger, "Moniepoint", AccountType::PosTerminal).await;
    let item = tissue(&ledger, [0, 0, 40]).await;

    let writer = {
        let ledger = ledger.clone();
        let item = item.clone();
        let pos_id = pos.id.clone();
        tokio::spawn(async move {
            for _ in 0..20 {
                ledger
                    .create_invoice(
                        InvoiceRequest::cash(
                            CASHIER,
                            vec![InvoiceLine::new(item.id.clone(), 2, UnitKind::Unit)],
                        )
                        .paid_into(PaymentMethod::Pos, pos_id.clone()),
                    )
                    .await
                    .unwrap();
            }
        })
    };

    // Snapshots only ever see committed invoices.
    let mut last = Money::zero();
    while !writer.is_finished() {
        let balances = ledger.account_balances().await.unwrap();
        let seen = balances[0].stats.total_sales;
        assert!(seen >= last);
        let invoices = ledger.recent_invoices(Some(100)).await.unwrap();
        assert!(invoices.iter().all(|i| i.sales.len() == 1));
        last = seen;
        tokio::task::yield_now().await;
    }
    writer.await.unwrap();

    let balances = ledger.account_balances().await.unwrap();
    assert_eq!(balances[0].stats.total_sales, Money::from_major(20 * 60));
    assert_eq!(stock_of(&ledger, &item).await, [0, 0, 0]);
}
