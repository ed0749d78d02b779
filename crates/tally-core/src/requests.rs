//! # Requests
//!
//! Inputs to the ledger's operations, each with a `validate` that runs
//! before any transaction is opened.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{AccountType, PaymentMethod, UnitKind};
use crate::validation::{
    validate_id, validate_line_count, validate_name, validate_price, validate_quantity,
    validate_stock,
};

// =============================================================================
// Invoice
// =============================================================================

/// One requested invoice line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceLine {
    pub item_id: String,
    pub quantity: i64,
    pub unit_kind: UnitKind,
}

impl InvoiceLine {
    pub fn new(item_id: impl Into<String>, quantity: i64, unit_kind: UnitKind) -> Self {
        InvoiceLine {
            item_id: item_id.into(),
            quantity,
            unit_kind,
        }
    }
}

/// A sale request: header data plus lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceRequest {
    pub user_id: String,
    /// Link to a customer on file.
    #[serde(default)]
    pub customer_id: Option<String>,
    /// Free-text name for walk-in customers.
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub payment_account_id: Option<String>,
    pub lines: Vec<InvoiceLine>,
}

impl InvoiceRequest {
    /// A cash sale with no customer.
    pub fn cash(user_id: impl Into<String>, lines: Vec<InvoiceLine>) -> Self {
        InvoiceRequest {
            user_id: user_id.into(),
            customer_id: None,
            customer_name: None,
            notes: None,
            payment_method: PaymentMethod::Cash,
            payment_account_id: None,
            lines,
        }
    }

    /// Sets the payment method and the account it lands in.
    pub fn paid_into(mut self, method: PaymentMethod, account_id: impl Into<String>) -> Self {
        self.payment_method = method;
        self.payment_account_id = Some(account_id.into());
        self
    }

    /// ## Errors
    /// - `EmptyCart` - no lines
    /// - `Validation` - bad ids, quantities, or a non-cash payment without an account
    pub fn validate(&self) -> CoreResult<()> {
        if self.lines.is_empty() {
            return Err(CoreError::EmptyCart);
        }
        validate_line_count(self.lines.len())?;

        if self.user_id.trim().is_empty() {
            return Err(ValidationError::required("userId").into());
        }

        for line in &self.lines {
            validate_id("itemId", &line.item_id)?;
            validate_quantity(line.quantity)?;
        }

        match &self.payment_account_id {
            Some(id) => validate_id("paymentAccountId", id)?,
            None if self.payment_method.requires_account() => {
                return Err(ValidationError::required("paymentAccountId").into());
            }
            None => {}
        }

        if let Some(id) = &self.customer_id {
            validate_id("customerId", id)?;
        }

        Ok(())
    }
}

// =============================================================================
// Restock
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RestockRequest {
    pub item_id: String,
    pub user_id: String,
    pub quantity: i64,
    pub unit_kind: UnitKind,
    /// Cost of one `unit_kind` (one carton or one roll).
    #[ts(type = "string")]
    pub cost_per_unit: Money,
    #[serde(default)]
    pub payment_account_id: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl RestockRequest {
    pub fn validate(&self) -> CoreResult<()> {
        if self.unit_kind == UnitKind::Unit {
            return Err(CoreError::UnsupportedUnit {
                unit: self.unit_kind,
                operation: "restock".to_string(),
            });
        }
        validate_id("itemId", &self.item_id)?;
        validate_quantity(self.quantity)?;

        if !self.cost_per_unit.is_positive() {
            return Err(CoreError::invalid_amount("costPerUnit", "must be greater than zero"));
        }
        validate_price("costPerUnit", self.cost_per_unit)?;
        if self.user_id.trim().is_empty() {
            return Err(ValidationError::required("userId").into());
        }
        if let Some(id) = &self.payment_account_id {
            validate_id("paymentAccountId", id)?;
        }
        Ok(())
    }
}

// =============================================================================
// Funds Transfer
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub user_id: String,
    pub from_account_id: String,
    #[serde(default)]
    pub to_account_id: Option<String>,
    #[ts(type = "string")]
    pub amount: Money,
    #[serde(default)]
    pub is_withdrawal: bool,
    #[serde(default)]
    pub notes: Option<String>,
}

impl TransferRequest {
    /// Destination account after normalisation. Withdrawals never have one.
    pub fn destination(&self) -> Option<&str> {
        if self.is_withdrawal {
            None
        } else {
            self.to_account_id.as_deref()
        }
    }

    pub fn validate(&self) -> CoreResult<()> {
        validate_id("fromAccountId", &self.from_account_id)?;

        if !self.amount.is_positive() {
            return Err(CoreError::invalid_amount("amount", "must be greater than zero"));
        }
        validate_price("amount", self.amount)?;
        if self.user_id.trim().is_empty() {
            return Err(ValidationError::required("userId").into());
        }

        if !self.is_withdrawal {
            let to = self
                .to_account_id
                .as_deref()
                .ok_or_else(|| ValidationError::required("toAccountId"))?;
            validate_id("toAccountId", to)?;
            if to == self.from_account_id {
                return Err(ValidationError::InvalidFormat {
                    field: "toAccountId".to_string(),
                    reason: "must differ from fromAccountId".to_string(),
                }
                .into());
            }
        }
        Ok(())
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// A new item. Omitted prices mean the unit is not sold.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct NewItem {
    pub name: String,
    pub category: Option<String>,
    #[ts(type = "string")]
    pub price_carton: Money,
    #[ts(type = "string")]
    pub price_roll: Money,
    #[ts(type = "string")]
    pub price_unit: Money,
    #[ts(type = "string")]
    pub base_unit_cost: Money,
    pub rolls_per_carton: i64,
    pub units_per_roll: i64,
    pub units_per_carton: Option<i64>,
    pub stock_cartons: i64,
    pub stock_rolls: i64,
    pub stock_units: i64,
}

impl NewItem {
    pub fn validate(&self) -> CoreResult<()> {
        validate_name("name", &self.name)?;
        validate_price("priceCarton", self.price_carton)?;
        validate_price("priceRoll", self.price_roll)?;
        validate_price("priceUnit", self.price_unit)?;
        validate_price("baseUnitCost", self.base_unit_cost)?;
        validate_stock("stockCartons", self.stock_cartons)?;
        validate_stock("stockRolls", self.stock_rolls)?;
        validate_stock("stockUnits", self.stock_units)?;
        Ok(())
    }
}

/// Partial item edit. Stock counters and cost basis are not editable here.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct ItemUpdate {
    /// Recorded on the price history row when prices change.
    pub user_id: String,
    pub name: Option<String>,
    pub category: Option<String>,
    #[ts(type = "string | null")]
    pub price_carton: Option<Money>,
    #[ts(type = "string | null")]
    pub price_roll: Option<Money>,
    #[ts(type = "string | null")]
    pub price_unit: Option<Money>,
    pub rolls_per_carton: Option<i64>,
    pub units_per_roll: Option<i64>,
    pub units_per_carton: Option<i64>,
}

impl ItemUpdate {
    /// A price-only update.
    pub fn prices(
        user_id: impl Into<String>,
        carton: Option<Money>,
        roll: Option<Money>,
        unit: Option<Money>,
    ) -> Self {
        ItemUpdate {
            user_id: user_id.into(),
            price_carton: carton,
            price_roll: roll,
            price_unit: unit,
            ..Default::default()
        }
    }

    pub fn touches_prices(&self) -> bool {
        self.price_carton.is_some() || self.price_roll.is_some() || self.price_unit.is_some()
    }

    pub fn validate(&self) -> CoreResult<()> {
        if let Some(name) = &self.name {
            validate_name("name", name)?;
        }
        for (field, price) in [
            ("priceCarton", self.price_carton),
            ("priceRoll", self.price_roll),
            ("priceUnit", self.price_unit),
        ] {
            if let Some(price) = price {
                validate_price(field, price)?;
            }
        }
        if self.touches_prices() && self.user_id.trim().is_empty() {
            return Err(ValidationError::required("userId").into());
        }
        Ok(())
    }
}

// =============================================================================
// Directory
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewAccount {
    pub name: String,
    #[serde(rename = "type")]
    pub account_type: AccountType,
    #[serde(default)]
    pub details: Option<String>,
}

impl NewAccount {
    pub fn new(name: impl Into<String>, account_type: AccountType) -> Self {
        NewAccount {
            name: name.into(),
            account_type,
            details: None,
        }
    }

    pub fn validate(&self) -> CoreResult<()> {
        validate_name("name", &self.name)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct NewCustomer {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

impl NewCustomer {
    pub fn validate(&self) -> CoreResult<()> {
        validate_name("name", &self.name)?;
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
