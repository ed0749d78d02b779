//! # Invoice Processor
//!
//! Turns a cart into a settled invoice inside one write transaction.
//!
//! ## Settlement Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  request.validate()          EmptyCart / ValidationError, no tx opened  │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  BEGIN (write lock)                                                     │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  account / customer exist?   NotFound                                   │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  INSERT invoice (total = 0)                                             │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  for each line:                                                         │
//! │     load item ─► price ─► plan_debit ─► cost_at_time                    │
//! │     apply_stock (CAS on stock_version) ─► INSERT sale                   │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  UPDATE invoice total = Σ line totals                                   │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  COMMIT  (any error above drops the tx: nothing is visible)             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{NaiveDate, Utc};
use tally_core::allocation::plan_debit;
use tally_core::units::cost_at_time;
use tally_core::validation::clean_optional;
use tally_core::{
    CoreError, DateRange, Invoice, InvoiceRequest, Money, Sale, SettledInvoice,
};
use tally_db::{new_id, DbTransaction};
use tracing::{debug, info};

use crate::engine::Ledger;
use crate::error::{LedgerError, LedgerResult};

impl Ledger {
    /// Creates and settles an invoice.
    ///
    /// All lines succeed together or none do. Stock is debited with the
    /// cascading allocation; each sale freezes the unit price and the cost
    /// basis of the moment.
    ///
    /// ## Errors
    /// * `EMPTY_CART` - No lines
    /// * `VALIDATION_ERROR` - Bad ids or quantities, Pos/Transfer without an account
    /// * `NOT_FOUND` - Item, payment account or customer missing
    /// * `UNIT_NOT_SOLD` - The item has no price for a line's unit
    /// * `INSUFFICIENT_STOCK` - A line needs more than every tier holds
    /// * `CONFIGURATION_ERROR` - A ratio needed for the line is zero
    pub async fn create_invoice(&self, request: InvoiceRequest) -> LedgerResult<SettledInvoice> {
        request.validate()?;

        let request = &request;
        self.retry_policy()
            .run("create_invoice", move || self.settle_invoice(request))
            .await
    }

    async fn settle_invoice(&self, request: &InvoiceRequest) -> LedgerResult<SettledInvoice> {
        let mut tx = self.write().await?;

        if let Some(account_id) = &request.payment_account_id {
            if tx.accounts().get(account_id).await?.is_none() {
                return Err(CoreError::not_found("PaymentAccount", account_id).into());
            }
        }

        let mut customer_name = clean_optional(request.customer_name.as_deref());
        if let Some(customer_id) = &request.customer_id {
            let customer = tx
                .customers()
                .get(customer_id)
                .await?
                .ok_or_else(|| CoreError::not_found("Customer", customer_id))?;
            customer_name.get_or_insert(customer.name);
        }

        let now = Utc::now();
        let mut invoice = Invoice {
            id: new_id(),
            customer_id: request.customer_id.clone(),
            customer_name,
            notes: clean_optional(request.notes.as_deref()),
            payment_method: request.payment_method,
            payment_account_id: request.payment_account_id.clone(),
            total_amount: Money::zero(),
            created_by: request.user_id.clone(),
            created_at: now,
        };
        tx.invoices().insert(&invoice).await?;

        let mut sales = Vec::with_capacity(request.lines.len());
        let mut total = Money::zero();

        for line in &request.lines {
            let item = tx
                .items()
                .get(&line.item_id)
                .await?
                .ok_or_else(|| CoreError::ItemNotFound(line.item_id.clone()))?;

            let price = item.selling_price(line.unit_kind)?;
            let plan = plan_debit(&item, line.unit_kind, line.quantity)?;
            let cost = cost_at_time(&item, line.unit_kind)?;

            debug!(
                item_id = %item.id,
                unit = %line.unit_kind,
                quantity = line.quantity,
                movements = plan.movements.len(),
                "Debiting stock"
            );
            tx.items()
                .apply_stock(&item.id, item.stock_version, &plan.after)
                .await?;

            let total_amount = price
                .checked_mul_quantity(line.quantity)
                .ok_or_else(|| CoreError::invalid_amount("totalAmount", "exceeds the supported range"))?;
            let sale = Sale {
                id: new_id(),
                invoice_id: invoice.id.clone(),
                item_id: item.id.clone(),
                customer_id: request.customer_id.clone(),
                quantity: line.quantity,
                unit_kind: line.unit_kind,
                price_at_time: price,
                cost_at_time: cost,
                total_amount,
                created_at: now,
            };
            tx.sales().insert(&sale).await?;

            total += sale.total_amount;
            sales.push(sale);
        }

        tx.invoices().set_total(&invoice.id, total).await?;
        tx.commit().await?;

        invoice.total_amount = total;
        info!(
            invoice_id = %invoice.id,
            lines = sales.len(),
            total = %total,
            method = ?invoice.payment_method,
            "Invoice settled"
        );

        Ok(SettledInvoice { invoice, sales })
    }

    /// Invoice header with its lines.
    pub async fn get_invoice(&self, invoice_id: &str) -> LedgerResult<SettledInvoice> {
        let mut tx = self.read().await?;
        let invoice = tx
            .invoices()
            .get(invoice_id)
            .await?
            .ok_or_else(|| LedgerError::not_found("Invoice", invoice_id))?;
        let sales = tx.sales().by_invoice(&invoice.id).await?;

        Ok(SettledInvoice { invoice, sales })
    }

    /// Newest invoices first. `None` uses the configured limit.
    pub async fn recent_invoices(&self, limit: Option<i64>) -> LedgerResult<Vec<SettledInvoice>> {
        let limit = limit
            .filter(|l| *l > 0)
            .unwrap_or_else(|| self.recent_invoice_limit());

        let mut tx = self.read().await?;
        let invoices = tx.invoices().recent(limit).await?;
        with_lines(&mut tx, invoices).await
    }

    /// Sales in the range, newest first.
    pub async fn sales_between(&self, range: DateRange) -> LedgerResult<Vec<Sale>> {
        let mut tx = self.read().await?;
        Ok(tx.sales().between(range.start, range.end).await?)
    }

    /// Sales on one UTC calendar day, newest first.
    pub async fn daily_sales(&self, date: NaiveDate) -> LedgerResult<Vec<Sale>> {
        self.sales_between(DateRange::day(date)).await
    }
}

/// Attaches lines to each invoice, keeping order.
pub(crate) async fn with_lines(
    tx: &mut DbTransaction,
    invoices: Vec<Invoice>,
) -> LedgerResult<Vec<SettledInvoice>> {
    let mut settled = Vec::with_capacity(invoices.len());
    for invoice in invoices {
        let sales = tx.sales().by_invoice(&invoice.id).await?;
        settled.push(SettledInvoice { invoice, sales });
    }
    Ok(settled)
}
