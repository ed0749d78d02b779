//! # Customer Repository
//!
//! Customer directory with invoice counts for search results.

use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::DbResult;
use tally_core::{Customer, CustomerSummary};

#[derive(Debug)]
pub struct CustomerRepository<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> CustomerRepository<'c> {
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        CustomerRepository { conn }
    }

    /// Inserts a customer.
    ///
    /// ## Errors
    /// * `DbError::UniqueViolation` - Phone number already registered
    pub async fn insert(&mut self, customer: &Customer) -> DbResult<()> {
        debug!(id = %customer.id, name = %customer.name, "Inserting customer");

        sqlx::query(
            r#"
            INSERT INTO customers (id, name, phone, email, address, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(&customer.email)
        .bind(&customer.address)
        .bind(customer.created_at)
        .execute(&mut *self.conn)
        .await?;

        Ok(())
    }

    pub async fn get(&mut self, id: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(
            "SELECT id, name, phone, email, address, created_at FROM customers WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(customer)
    }

    pub async fn find_by_phone(&mut self, phone: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(
            "SELECT id, name, phone, email, address, created_at FROM customers WHERE phone = ?1",
        )
        .bind(phone)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(customer)
    }

    /// Case-insensitive match on name or phone. An empty query lists
    /// everyone. Ordered by name; `None` returns every match.
    pub async fn search(
        &mut self,
        query: &str,
        limit: Option<i64>,
    ) -> DbResult<Vec<CustomerSummary>> {
        let pattern = format!("%{}%", query.trim());

        debug!(query = %query, limit = ?limit, "Searching customers");

        let customers = sqlx::query_as::<_, CustomerSummary>(
            r#"
            SELECT
                c.id, c.name, c.phone, c.email, c.address, c.created_at,
                (SELECT COUNT(*) FROM invoices i WHERE i.customer_id = c.id) AS invoice_count
            FROM customers c
            WHERE c.name LIKE ?1 OR COALESCE(c.phone, '') LIKE ?1
            ORDER BY c.name COLLATE NOCASE, c.id
            LIMIT ?2
            "#,
        )
        .bind(pattern)
        // SQLite reads a negative LIMIT as no limit
        .bind(limit.unwrap_or(-1))
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(customers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::new_id;
    use crate::repository::testing::test_db;
    use crate::DbError;
    use chrono::Utc;

    fn customer(name: &str, phone: Option<&str>) -> Customer {
        Customer {
            id: new_id(),
            name: name.to_string(),
            phone: phone.map(str::to_string),
            email: None,
            address: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_search_by_name_and_phone() {
        let db = test_db().await;

        let mut tx = db.begin().await.unwrap();
        tx.customers().insert(&customer("Ada Obi", Some("08030000001"))).await.unwrap();
        tx.customers().insert(&customer("Bola Ade", Some("08030000002"))).await.unwrap();
        tx.customers().insert(&customer("Chidi", None)).await.unwrap();

        let by_name = tx.customers().search("ada", Some(10)).await.unwrap();
        let by_phone = tx.customers().search("0002", Some(10)).await.unwrap();
        let everyone = tx.customers().search("", None).await.unwrap();
        let first = tx.customers().search("", Some(1)).await.unwrap();

        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].customer.name, "Ada Obi");
        assert_eq!(by_phone.len(), 1);
        assert_eq!(by_phone[0].customer.name, "Bola Ade");
        assert_eq!(everyone.len(), 3);
        assert!(everyone.iter().all(|c| c.invoice_count == 0));
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].customer.name, "Ada Obi");
    }

    #[tokio::test]
    async fn test_duplicate_phone_is_unique_violation() {
        let db = test_db().await;

        let mut tx = db.begin().await.unwrap();
        tx.customers().insert(&customer("Ada", Some("0803"))).await.unwrap();
        let err = tx
            .customers()
            .insert(&customer("Ada Again", Some("0803")))
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::UniqueViolation { .. }));
        assert!(tx.customers().find_by_phone("0803").await.unwrap().is_some());
    }
}
