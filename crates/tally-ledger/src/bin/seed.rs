//! # Seed Data Generator
//!
//! Populates a database with a small working shop for development:
//! payment accounts, a catalog of carton/roll/unit items, a restock per
//! item and a handful of invoices.
//!
//! ## Usage
//! ```bash
//! # Seed ./tally_dev.db with 3 invoices per item (default)
//! cargo run -p tally-ledger --bin seed
//!
//! # Custom amount and path
//! cargo run -p tally-ledger --bin seed -- --invoices 10 --db ./data/tally.db
//! ```

use std::env;
use tally_core::{
    AccountType, InvoiceLine, InvoiceRequest, Money, NewAccount, NewItem, PaymentMethod,
    RestockRequest, UnitKind,
};
use tally_db::{Database, DbConfig};
use tally_ledger::{init_tracing, Ledger};

/// (name, category, rolls/carton, units/roll, units/carton, carton, roll, unit, carton cost)
const CATALOG: &[(&str, &str, i64, i64, i64, i64, i64, i64, i64)] = &[
    ("Softcare Tissue", "Toiletries", 10, 12, 0, 3000, 320, 30, 2400),
    ("Rose Plus Tissue", "Toiletries", 12, 10, 0, 3400, 300, 35, 2880),
    ("Peak Milk Sachet", "Dairy", 20, 10, 0, 9500, 500, 55, 8000),
    ("Indomie Chicken", "Noodles", 0, 0, 40, 7800, 0, 210, 7000),
    ("Golden Penny Spaghetti", "Pasta", 0, 0, 20, 11500, 0, 600, 10400),
    ("Milo Refill 20g", "Beverages", 24, 12, 0, 15000, 650, 60, 13200),
    ("Maggi Cubes", "Seasoning", 50, 100, 0, 42000, 900, 10, 36000),
    ("Hypo Bleach 250ml", "Cleaning", 0, 0, 24, 5500, 0, 250, 4800),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut invoices_per_item: usize = 3;
    let mut db_path = String::from("./tally_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--invoices" | "-n" => {
                if i + 1 < args.len() {
                    invoices_per_item = args[i + 1].parse().unwrap_or(3);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Tally Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -n, --invoices <N>  Invoices per item (default: 3)");
                println!("  -d, --db <PATH>     Database file path (default: ./tally_dev.db)");
                println!("  -h, --help          Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    init_tracing();

    println!("🌱 Tally Seed Data Generator");
    println!("============================");
    println!("Database: {}", db_path);
    println!("Invoices per item: {}", invoices_per_item);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    let ledger = Ledger::new(db);

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = ledger.list_items().await?.len();
    if existing > 0 {
        println!("⚠ Database already has {} items", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let start = std::time::Instant::now();

    let pos = ledger
        .create_account(NewAccount::new("Moniepoint POS", AccountType::PosTerminal))
        .await?;
    let bank = ledger
        .create_account(NewAccount::new("GTBank Current", AccountType::BankAccount))
        .await?;
    let drawer = ledger
        .create_account(NewAccount::new("Cash Drawer", AccountType::Cash))
        .await?;
    println!("✓ Created 3 payment accounts");

    let mut sold = 0;
    for &(name, category, rpc, upr, upc, carton, roll, unit, cost) in CATALOG {
        let item = ledger
            .create_item(NewItem {
                name: name.to_string(),
                category: Some(category.to_string()),
                price_carton: Money::from_major(carton),
                price_roll: Money::from_major(roll),
                price_unit: Money::from_major(unit),
                rolls_per_carton: rpc,
                units_per_roll: upr,
                units_per_carton: (upc > 0).then_some(upc),
                ..Default::default()
            })
            .await?;

        ledger
            .restock(RestockRequest {
                item_id: item.id.clone(),
                user_id: "seed".to_string(),
                quantity: 5,
                unit_kind: UnitKind::Carton,
                cost_per_unit: Money::from_major(cost),
                payment_account_id: Some(bank.id.clone()),
                notes: Some("Opening stock".to_string()),
            })
            .await?;

        for n in 0..invoices_per_item {
            let (unit_kind, quantity) = match n % 3 {
                0 => (UnitKind::Unit, 7),
                1 if item.price_roll.is_positive() => (UnitKind::Roll, 2),
                _ => (UnitKind::Carton, 1),
            };
            let request = InvoiceRequest::cash(
                "seed",
                vec![InvoiceLine::new(item.id.clone(), quantity, unit_kind)],
            );
            let request = match n % 3 {
                0 => request.paid_into(PaymentMethod::Cash, drawer.id.clone()),
                _ => request.paid_into(PaymentMethod::Pos, pos.id.clone()),
            };

            match ledger.create_invoice(request).await {
                Ok(_) => sold += 1,
                Err(e) => println!("  ⚠ {}: {}", name, e.message),
            }
        }
        println!("  ✓ {}", name);
    }

    let worth = ledger.shop_worth().await?;

    println!();
    println!("✓ Seeded {} items and {} invoices", CATALOG.len(), sold);
    println!("  Inventory value: {}", worth.inventory_value);
    println!("  Cash in hand:    {}", worth.cash_in_hand);
    println!("  Shop worth:      {}", worth.shop_worth);
    println!("  Took {:?}", start.elapsed());

    Ok(())
}
