//! Shared fixtures for repository tests.

use chrono::Utc;
use tally_core::{AccountType, Item, Money, PaymentAccount};

use crate::repository::new_id;
use crate::{Database, DbConfig};

pub async fn test_db() -> Database {
    Database::new(DbConfig::in_memory())
        .await
        .expect("in-memory database")
}

/// Item with the given ratios and `[cartons, rolls, units]` stock.
pub fn sample_item(name: &str, rolls_per_carton: i64, units_per_roll: i64, stock: [i64; 3]) -> Item {
    let units_per_carton = if rolls_per_carton > 0 && units_per_roll > 0 {
        rolls_per_carton * units_per_roll
    } else {
        1
    };
    let now = Utc::now();

    Item {
        id: new_id(),
        name: name.to_string(),
        category: None,
        price_carton: Money::from_major(3000),
        price_roll: Money::from_major(320),
        price_unit: Money::from_major(30),
        base_unit_cost: Money::parse("21.666667").expect("valid money"),
        rolls_per_carton,
        units_per_roll,
        units_per_carton,
        stock_cartons: stock[0],
        stock_rolls: stock[1],
        stock_units: stock[2],
        stock_version: 0,
        created_at: now,
        updated_at: now,
    }
}

pub fn sample_account(name: &str, account_type: AccountType) -> PaymentAccount {
    PaymentAccount {
        id: new_id(),
        name: name.to_string(),
        account_type,
        details: None,
        created_at: Utc::now(),
    }
}
