//! Catalog repository for product and FAQ lookups

use super::DbPool;
use crate::{Error, Result};

/// A product in the support catalog
#[derive(Debug, Clone)]
pub struct Product {
    pub product_id: String,
    pub product_name: String,
    pub category: Option<String>,
    pub price: Option<f64>,
    pub stock_available: Option<i64>,
    pub rating: Option<f64>,
    pub description: Option<String>,
    pub return_eligible: Option<bool>,
    pub delivery_time_days: Option<i64>,
}

/// A product FAQ entry
#[derive(Debug, Clone)]
pub struct ProductFaq {
    pub product_name: String,
    pub question: String,
    pub answer: String,
}

/// Filters for a product search
#[derive(Debug, Clone, Default)]
pub struct ProductSearch {
    /// Keyword matched against the product name
    pub query: Option<String>,
    /// Category filter (substring match)
    pub category: Option<String>,
    /// Maximum price ceiling
    pub max_price: Option<f64>,
}

/// Catalog repository
#[derive(Clone)]
pub struct CatalogRepo {
    pool: DbPool,
}

impl CatalogRepo {
    /// Create a new catalog repository
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Insert or replace a product
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn upsert_product(&self, product: &Product) -> Result<()> {
        let conn = self
            .pool
            .get()
            .map_err(|e| Error::Database(e.to_string()))?;

        conn.execute(
            "INSERT OR REPLACE INTO products
             (product_id, product_name, category, price, stock_available, rating,
              description, return_eligible, delivery_time_days)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            rusqlite::params![
                product.product_id,
                product.product_name,
                product.category,
                product.price,
                product.stock_available,
                product.rating,
                product.description,
                product.return_eligible,
                product.delivery_time_days,
            ],
        )?;

        Ok(())
    }

    /// Search products by name keyword, category, and price ceiling
    ///
    /// All filters are optional; each narrows the result set.
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn search(&self, filters: &ProductSearch) -> Result<Vec<Product>> {
        let conn = self
            .pool
            .get()
            .map_err(|e| Error::Database(e.to_string()))?;

        let mut sql = String::from(
            "SELECT product_id, product_name, category, price, stock_available, rating,
                    description, return_eligible, delivery_time_days
             FROM products WHERE 1=1",
        );
        let mut params: Vec<rusqlite::types::Value> = Vec::new();

        if let Some(query) = &filters.query {
            sql.push_str(" AND product_name LIKE ?");
            params.push(format!("%{query}%").into());
        }
        if let Some(category) = &filters.category {
            sql.push_str(" AND category LIKE ?");
            params.push(format!("%{category}%").into());
        }
        if let Some(max_price) = filters.max_price {
            sql.push_str(" AND price <= ?");
            params.push(max_price.into());
        }

        sql.push_str(" ORDER BY product_name");

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(rusqlite::params_from_iter(params), |row| {
                Ok(Product {
                    product_id: row.get(0)?,
                    product_name: row.get(1)?,
                    category: row.get(2)?,
                    price: row.get(3)?,
                    stock_available: row.get(4)?,
                    rating: row.get(5)?,
                    description: row.get(6)?,
                    return_eligible: row.get(7)?,
                    delivery_time_days: row.get(8)?,
                })
            })?
            .filter_map(std::result::Result::ok)
            .collect();

        Ok(rows)
    }

    /// Insert a FAQ row
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn insert_faq(&self, product_id: Option<&str>, faq: &ProductFaq) -> Result<()> {
        let conn = self
            .pool
            .get()
            .map_err(|e| Error::Database(e.to_string()))?;

        conn.execute(
            "INSERT INTO faqs (product_id, product_name, question, answer)
             VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![product_id, faq.product_name, faq.question, faq.answer],
        )?;

        Ok(())
    }

    /// Look up FAQs matching a product name and question topic
    ///
    /// Both filters are substring matches.
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn find_faqs(&self, product_name: &str, topic: &str) -> Result<Vec<ProductFaq>> {
        let conn = self
            .pool
            .get()
            .map_err(|e| Error::Database(e.to_string()))?;

        let mut stmt = conn.prepare(
            "SELECT product_name, question, answer FROM faqs
             WHERE product_name LIKE ?1 AND question LIKE ?2
             ORDER BY id",
        )?;

        let faqs = stmt
            .query_map(
                rusqlite::params![format!("%{product_name}%"), format!("%{topic}%")],
                |row| {
                    Ok(ProductFaq {
                        product_name: row.get(0)?,
                        question: row.get(1)?,
                        answer: row.get(2)?,
                    })
                },
            )?
            .filter_map(std::result::Result::ok)
            .collect();

        Ok(faqs)
    }

    /// Remove all FAQ rows (before a re-ingest)
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn clear_faqs(&self) -> Result<()> {
        let conn = self
            .pool
            .get()
            .map_err(|e| Error::Database(e.to_string()))?;

        conn.execute("DELETE FROM faqs", [])?;
        Ok(())
    }

    /// Count products in the catalog
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn product_count(&self) -> Result<usize> {
        let conn = self
            .pool
            .get()
            .map_err(|e| Error::Database(e.to_string()))?;

        let count: i64 = conn.query_row("SELECT COUNT(*) FROM products", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_memory;

    fn sample(id: &str, name: &str, category: &str, price: f64) -> Product {
        Product {
            product_id: id.to_string(),
            product_name: name.to_string(),
            category: Some(category.to_string()),
            price: Some(price),
            stock_available: Some(10),
            rating: Some(4.2),
            description: None,
            return_eligible: Some(true),
            delivery_time_days: Some(3),
        }
    }

    fn setup() -> CatalogRepo {
        let repo = CatalogRepo::new(init_memory().unwrap());
        repo.upsert_product(&sample("P001", "Luma Smart Camera", "Electronics", 129.99))
            .unwrap();
        repo.upsert_product(&sample("P002", "Trail Running Shoes", "Footwear", 49.50))
            .unwrap();
        repo.upsert_product(&sample("P003", "Dress Shoes", "Footwear", 89.00))
            .unwrap();
        repo
    }

    #[test]
    fn test_search_by_keyword() {
        let repo = setup();

        let results = repo
            .search(&ProductSearch {
                query: Some("shoes".to_string()),
                ..ProductSearch::default()
            })
            .unwrap();

        assert_eq!(results.len(), 2);
    }

    #[test]
    fn test_search_with_price_ceiling() {
        let repo = setup();

        let results = repo
            .search(&ProductSearch {
                query: Some("shoes".to_string()),
                max_price: Some(50.0),
                ..ProductSearch::default()
            })
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].product_name, "Trail Running Shoes");
    }

    #[test]
    fn test_search_by_category() {
        let repo = setup();

        let results = repo
            .search(&ProductSearch {
                category: Some("foot".to_string()),
                ..ProductSearch::default()
            })
            .unwrap();

        assert_eq!(results.len(), 2);
    }

    #[test]
    fn test_upsert_replaces_by_id() {
        let repo = setup();

        repo.upsert_product(&sample("P001", "Luma Smart Camera v2", "Electronics", 149.99))
            .unwrap();

        assert_eq!(repo.product_count().unwrap(), 3);
        let results = repo
            .search(&ProductSearch {
                query: Some("Luma".to_string()),
                ..ProductSearch::default()
            })
            .unwrap();
        assert_eq!(results[0].product_name, "Luma Smart Camera v2");
    }

    #[test]
    fn test_faq_lookup() {
        let repo = setup();
        repo.insert_faq(
            Some("P001"),
            &ProductFaq {
                product_name: "Luma Smart Camera".to_string(),
                question: "Does the Luma camera have night vision?".to_string(),
                answer: "Yes, up to 10 meters.".to_string(),
            },
        )
        .unwrap();

        let faqs = repo.find_faqs("Luma", "night vision").unwrap();
        assert_eq!(faqs.len(), 1);

        let none = repo.find_faqs("Luma", "waterproof").unwrap();
        assert!(none.is_empty());
    }
}
