//! Order repository for order status lookups

use super::DbPool;
use crate::{Error, Result};

/// A customer order
#[derive(Debug, Clone)]
pub struct Order {
    pub order_id: String,
    pub customer_id: Option<String>,
    /// Items in the order, stored serialized as JSON text
    pub products_json: Option<String>,
    pub order_status: Option<String>,
    pub order_date: Option<String>,
}

impl Order {
    /// Extract the item names from `products_json`
    ///
    /// The column usually holds a JSON array of objects with a
    /// `product_name` key, but some records carry plain text. Plain
    /// text is returned as-is; anything unparseable yields `None`.
    #[must_use]
    pub fn item_names(&self) -> Option<String> {
        let raw = self.products_json.as_deref()?.trim();
        if raw.is_empty() {
            return None;
        }

        if !raw.starts_with('[') && !raw.starts_with('{') {
            return Some(raw.to_string());
        }

        let value: serde_json::Value = serde_json::from_str(raw).ok()?;
        let items = value.as_array()?;
        let names: Vec<&str> = items
            .iter()
            .filter_map(|item| item.get("product_name").and_then(|n| n.as_str()))
            .collect();

        if names.is_empty() {
            None
        } else {
            Some(names.join(", "))
        }
    }
}

/// Order repository
#[derive(Clone)]
pub struct OrderRepo {
    pool: DbPool,
}

impl OrderRepo {
    /// Create a new order repository
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Insert or replace an order
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn upsert(&self, order: &Order) -> Result<()> {
        let conn = self
            .pool
            .get()
            .map_err(|e| Error::Database(e.to_string()))?;

        conn.execute(
            "INSERT OR REPLACE INTO orders
             (order_id, customer_id, products_json, order_status, order_date)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![
                order.order_id,
                order.customer_id,
                order.products_json,
                order.order_status,
                order.order_date,
            ],
        )?;

        Ok(())
    }

    /// Find an order by its exact id
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn find(&self, order_id: &str) -> Result<Option<Order>> {
        let conn = self
            .pool
            .get()
            .map_err(|e| Error::Database(e.to_string()))?;

        let order = conn
            .query_row(
                "SELECT order_id, customer_id, products_json, order_status, order_date
                 FROM orders WHERE order_id = ?1",
                [order_id],
                |row| {
                    Ok(Order {
                        order_id: row.get(0)?,
                        customer_id: row.get(1)?,
                        products_json: row.get(2)?,
                        order_status: row.get(3)?,
                        order_date: row.get(4)?,
                    })
                },
            )
            .ok();

        Ok(order)
    }

    /// Count orders
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn count(&self) -> Result<usize> {
        let conn = self
            .pool
            .get()
            .map_err(|e| Error::Database(e.to_string()))?;

        let count: i64 = conn.query_row("SELECT COUNT(*) FROM orders", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }
}
