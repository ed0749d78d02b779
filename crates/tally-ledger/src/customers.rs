//! # Customers
//!
//! Customer directory. Invoices may name a customer; the history view
//! returns those invoices with their lines.

use chrono::Utc;
use tally_core::validation::{clean_optional, validate_search_query};
use tally_core::{Customer, CustomerHistory, CustomerSummary, NewCustomer, ValidationError};
use tally_db::new_id;
use tracing::info;

use crate::engine::Ledger;
use crate::error::{LedgerError, LedgerResult};
use crate::invoice::with_lines;

impl Ledger {
    /// ## Errors
    /// * `VALIDATION_ERROR` - Name missing, or the phone number is already on file
    pub async fn create_customer(&self, new_customer: NewCustomer) -> LedgerResult<Customer> {
        new_customer.validate()?;

        let customer = Customer {
            id: new_id(),
            name: new_customer.name.trim().to_string(),
            phone: clean_optional(new_customer.phone.as_deref()),
            email: clean_optional(new_customer.email.as_deref()),
            address: clean_optional(new_customer.address.as_deref()),
            created_at: Utc::now(),
        };

        let mut tx = self.write().await?;
        if let Some(phone) = &customer.phone {
            if tx.customers().find_by_phone(phone).await?.is_some() {
                return Err(ValidationError::Duplicate {
                    field: "phone".to_string(),
                    value: phone.clone(),
                }
                .into());
            }
        }
        tx.customers().insert(&customer).await?;
        tx.commit().await?;

        info!(customer_id = %customer.id, name = %customer.name, "Customer created");
        Ok(customer)
    }

    /// Case-insensitive match on name or phone. `None` lists everyone,
    /// without a row cap.
    pub async fn search_customers(&self, query: Option<&str>) -> LedgerResult<Vec<CustomerSummary>> {
        let query = validate_search_query(query.unwrap_or_default())?;

        let mut tx = self.read().await?;
        Ok(tx.customers().search(&query, None).await?)
    }

    /// The customer with every invoice they appear on, newest first.
    pub async fn customer_history(&self, customer_id: &str) -> LedgerResult<CustomerHistory> {
        let mut tx = self.read().await?;
        let customer = tx
            .customers()
            .get(customer_id)
            .await?
            .ok_or_else(|| LedgerError::not_found("Customer", customer_id))?;

        let invoices = tx.invoices().by_customer(customer_id).await?;
        let invoices = with_lines(&mut tx, invoices).await?;

        Ok(CustomerHistory { customer, invoices })
    }
}
