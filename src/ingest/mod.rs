//! Support database ingestion
//!
//! Loads the product catalog, order database, and product FAQs from
//! JSON files and extracts the company policy document per page into
//! the policies table. Missing source files are skipped with a
//! warning; a malformed file fails only its own loader.

use std::path::Path;

use serde::Deserialize;

use crate::config::CatalogConfig;
use crate::db::{CatalogRepo, Order, OrderRepo, PolicyRepo, Product, ProductFaq};
use crate::{Error, Result};

/// A product record in `product_catalog.json`
#[derive(Debug, Deserialize)]
struct ProductRecord {
    product_id: String,
    product_name: String,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    price: Option<f64>,
    #[serde(default)]
    stock_available: Option<i64>,
    #[serde(default)]
    rating: Option<f64>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    return_eligible: Option<bool>,
    #[serde(default)]
    delivery_time_days: Option<i64>,
}

/// An order record in `order_database.json`
#[derive(Debug, Deserialize)]
struct OrderRecord {
    order_id: String,
    #[serde(default)]
    customer_id: Option<String>,
    /// Items kept as raw JSON; stored serialized
    #[serde(default)]
    products: serde_json::Value,
    #[serde(default)]
    order_status: Option<String>,
    #[serde(default)]
    order_date: Option<String>,
}

/// A per-product FAQ group in `product_faqs.json`
#[derive(Debug, Deserialize)]
struct FaqGroup {
    #[serde(default)]
    product_id: Option<String>,
    product_name: String,
    #[serde(default)]
    faqs: Vec<FaqEntry>,
}

/// One question/answer pair
#[derive(Debug, Deserialize)]
struct FaqEntry {
    question: String,
    answer: String,
}

/// Row counts from a completed ingest run
#[derive(Debug, Clone, Copy, Default)]
pub struct IngestSummary {
    pub products: usize,
    pub orders: usize,
    pub faqs: usize,
    pub policy_pages: usize,
}

/// Loads the support database from its source files
pub struct Ingestor {
    catalog: CatalogRepo,
    orders: OrderRepo,
    policies: PolicyRepo,
}

impl Ingestor {
    /// Create a new ingestor over the support repositories
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn new(catalog: CatalogRepo, orders: OrderRepo, policies: PolicyRepo) -> Self {
        Self {
            catalog,
            orders,
            policies,
        }
    }

    /// Run all loaders against the configured source files
    ///
    /// # Errors
    ///
    /// Returns the first loader error encountered; missing files are
    /// not errors
    pub fn run(&self, config: &CatalogConfig) -> Result<IngestSummary> {
        let summary = IngestSummary {
            products: self.load_products(&config.products_file)?,
            orders: self.load_orders(&config.orders_file)?,
            faqs: self.load_faqs(&config.faqs_file)?,
            policy_pages: self.load_policies(&config.policy_file)?,
        };

        tracing::info!(
            products = summary.products,
            orders = summary.orders,
            faqs = summary.faqs,
            policy_pages = summary.policy_pages,
            "ingest complete"
        );

        Ok(summary)
    }

    /// Load products from a JSON file (array or `{"products": [...]}`)
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be parsed
    pub fn load_products(&self, path: &Path) -> Result<usize> {
        let Some(items) = read_items(path, "products")? else {
            return Ok(0);
        };

        let mut count = 0;
        for item in items {
            let record: ProductRecord = serde_json::from_value(item)?;
            self.catalog.upsert_product(&Product {
                product_id: record.product_id,
                product_name: record.product_name,
                category: record.category,
                price: record.price,
                stock_available: record.stock_available,
                rating: record.rating,
                description: record.description,
                return_eligible: record.return_eligible,
                delivery_time_days: record.delivery_time_days,
            })?;
            count += 1;
        }

        tracing::info!(count, path = %path.display(), "loaded products");
        Ok(count)
    }

    /// Load orders from a JSON file (array or `{"orders": [...]}`)
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be parsed
    pub fn load_orders(&self, path: &Path) -> Result<usize> {
        let Some(items) = read_items(path, "orders")? else {
            return Ok(0);
        };

        let mut count = 0;
        for item in items {
            let record: OrderRecord = serde_json::from_value(item)?;
            let products_json = if record.products.is_null() {
                None
            } else {
                Some(serde_json::to_string(&record.products)?)
            };

            self.orders.upsert(&Order {
                order_id: record.order_id,
                customer_id: record.customer_id,
                products_json,
                order_status: record.order_status,
                order_date: record.order_date,
            })?;
            count += 1;
        }

        tracing::info!(count, path = %path.display(), "loaded orders");
        Ok(count)
    }

    /// Load product FAQs from a JSON file (array or `{"product_faqs": [...]}`)
    ///
    /// Existing FAQ rows are replaced so a re-ingest does not duplicate
    /// entries.
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be parsed
    pub fn load_faqs(&self, path: &Path) -> Result<usize> {
        let Some(items) = read_items(path, "product_faqs")? else {
            return Ok(0);
        };

        self.catalog.clear_faqs()?;

        let mut count = 0;
        for item in items {
            let group: FaqGroup = serde_json::from_value(item)?;
            for entry in &group.faqs {
                self.catalog.insert_faq(
                    group.product_id.as_deref(),
                    &ProductFaq {
                        product_name: group.product_name.clone(),
                        question: entry.question.clone(),
                        answer: entry.answer.clone(),
                    },
                )?;
                count += 1;
            }
        }

        tracing::info!(count, path = %path.display(), "loaded FAQs");
        Ok(count)
    }

    /// Extract the company policy PDF into per-page sections
    ///
    /// Existing sections are replaced so a re-ingest does not duplicate
    /// pages.
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be extracted
    pub fn load_policies(&self, path: &Path) -> Result<usize> {
        if !path.exists() {
            tracing::warn!(path = %path.display(), "policy file not found, skipping");
            return Ok(0);
        }

        let pages = pdf_extract::extract_text_by_pages(path)
            .map_err(|e| Error::Ingest(format!("policy PDF extraction failed: {e}")))?;

        self.policies.clear()?;

        let mut count = 0;
        for (index, text) in pages.iter().enumerate() {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                continue;
            }
            let page = i64::try_from(index + 1).unwrap_or(i64::MAX);
            self.policies.insert(trimmed, Some(page))?;
            count += 1;
        }

        tracing::info!(pages = count, path = %path.display(), "loaded policies");
        Ok(count)
    }
}

/// Read a JSON source file and return its item list
///
/// Accepts either a bare top-level array or an object wrapping the
/// array under `key`. Returns `None` for a missing file.
fn read_items(path: &Path, key: &str) -> Result<Option<Vec<serde_json::Value>>> {
    if !path.exists() {
        tracing::warn!(path = %path.display(), "source file not found, skipping");
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&content)?;

    let items = match value {
        serde_json::Value::Array(items) => items,
        serde_json::Value::Object(mut map) => match map.remove(key) {
            Some(serde_json::Value::Array(items)) => items,
            _ => {
                return Err(Error::Ingest(format!(
                    "{}: expected an array or an object with a '{key}' array",
                    path.display()
                )));
            }
        },
        _ => {
            return Err(Error::Ingest(format!(
                "{}: expected an array or an object with a '{key}' array",
                path.display()
            )));
        }
    };

    Ok(Some(items))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{self, ProductSearch};
    use std::io::Write;

    fn setup() -> (Ingestor, CatalogRepo, OrderRepo) {
        let pool = db::init_memory().unwrap();
        let catalog = CatalogRepo::new(pool.clone());
        let orders = OrderRepo::new(pool.clone());
        let policies = PolicyRepo::new(pool);
        (
            Ingestor::new(catalog.clone(), orders.clone(), policies),
            catalog,
            orders,
        )
    }

    fn write_temp(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_products_bare_array() {
        let (ingestor, catalog, _) = setup();
        let file = write_temp(
            r#"[{"product_id": "P001", "product_name": "Luma Smart Camera", "price": 129.99}]"#,
        );

        let count = ingestor.load_products(file.path()).unwrap();
        assert_eq!(count, 1);
        assert_eq!(catalog.product_count().unwrap(), 1);
    }

    #[test]
    fn test_load_products_keyed_object() {
        let (ingestor, catalog, _) = setup();
        let file = write_temp(
            r#"{"products": [
                {"product_id": "P001", "product_name": "Luma Smart Camera"},
                {"product_id": "P002", "product_name": "Trail Running Shoes"}
            ]}"#,
        );

        let count = ingestor.load_products(file.path()).unwrap();
        assert_eq!(count, 2);
        let hits = catalog
            .search(&ProductSearch {
                query: Some("Shoes".to_string()),
                ..ProductSearch::default()
            })
            .unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_load_orders_serializes_items() {
        let (ingestor, _, orders) = setup();
        let file = write_temp(
            r#"{"orders": [{
                "order_id": "O0001",
                "customer_id": "C042",
                "products": [{"product_name": "Luma Smart Camera"}],
                "order_status": "Shipped",
                "order_date": "2025-11-02"
            }]}"#,
        );

        let count = ingestor.load_orders(file.path()).unwrap();
        assert_eq!(count, 1);

        let order = orders.find("O0001").unwrap().unwrap();
        assert_eq!(order.item_names().as_deref(), Some("Luma Smart Camera"));
    }

    #[test]
    fn test_load_faqs_flattens_groups() {
        let (ingestor, catalog, _) = setup();
        let file = write_temp(
            r#"{"product_faqs": [{
                "product_id": "P001",
                "product_name": "Luma Smart Camera",
                "faqs": [
                    {"question": "Does it have night vision?", "answer": "Yes."},
                    {"question": "How long does the battery last?", "answer": "12 hours."}
                ]
            }]}"#,
        );

        let count = ingestor.load_faqs(file.path()).unwrap();
        assert_eq!(count, 2);

        let faqs = catalog.find_faqs("Luma", "battery").unwrap();
        assert_eq!(faqs.len(), 1);
    }

    #[test]
    fn test_reingest_faqs_does_not_duplicate() {
        let (ingestor, catalog, _) = setup();
        let file = write_temp(
            r#"[{"product_name": "Luma Smart Camera",
                "faqs": [{"question": "Does it have night vision?", "answer": "Yes."}]}]"#,
        );

        ingestor.load_faqs(file.path()).unwrap();
        ingestor.load_faqs(file.path()).unwrap();

        let faqs = catalog.find_faqs("Luma", "night").unwrap();
        assert_eq!(faqs.len(), 1);
    }

    #[test]
    fn test_missing_file_is_skipped() {
        let (ingestor, _, _) = setup();
        let count = ingestor
            .load_products(Path::new("/nonexistent/product_catalog.json"))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let (ingestor, _, _) = setup();
        let file = write_temp("not json at all");
        assert!(ingestor.load_products(file.path()).is_err());
    }

    #[test]
    fn test_wrong_shape_is_an_error() {
        let (ingestor, _, _) = setup();
        let file = write_temp(r#"{"catalog": []}"#);
        assert!(ingestor.load_products(file.path()).is_err());
    }
}
