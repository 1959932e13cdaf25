//! Lookup tools exposed to the model and their dispatcher
//!
//! Each tool is a single parameterized query over the local support
//! database; results are formatted as short plain-text blocks the
//! model can quote from without inventing content.

use serde::Deserialize;
use serde_json::json;

use crate::db::{CatalogRepo, OrderRepo, PolicyRepo, ProductSearch};
use crate::llm::ToolDefinition;
use crate::{Error, Result};

/// Cap on product lines returned to the model
const MAX_PRODUCT_RESULTS: usize = 5;

/// Cap on FAQ entries returned to the model
const MAX_FAQ_RESULTS: usize = 3;

/// Cap on policy excerpt length, in characters
const MAX_POLICY_CHARS: usize = 600;

/// Arguments for `search_products`
#[derive(Debug, Default, Deserialize)]
struct SearchProductsArgs {
    #[serde(default)]
    query: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    max_price: Option<f64>,
}

/// Arguments for `get_order_status`
#[derive(Debug, Default, Deserialize)]
struct OrderStatusArgs {
    #[serde(default)]
    order_id: String,
}

/// Arguments for `get_policy_info`
#[derive(Debug, Default, Deserialize)]
struct PolicyInfoArgs {
    #[serde(default)]
    topic: String,
}

/// Arguments for `get_product_faq`
#[derive(Debug, Default, Deserialize)]
struct ProductFaqArgs {
    #[serde(default)]
    product_name: String,
    #[serde(default)]
    topic: String,
}

/// Dispatches tool calls to the support database
#[derive(Clone)]
pub struct ToolExecutor {
    catalog: CatalogRepo,
    orders: OrderRepo,
    policies: PolicyRepo,
}

impl ToolExecutor {
    /// Create a new tool executor over the support repositories
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn new(catalog: CatalogRepo, orders: OrderRepo, policies: PolicyRepo) -> Self {
        Self {
            catalog,
            orders,
            policies,
        }
    }

    /// The tool definitions advertised to the model
    #[must_use]
    pub fn definitions() -> Vec<ToolDefinition> {
        vec![
            ToolDefinition::function(
                "search_products",
                "Search the product catalog. Filter by keyword, category, or maximum price.",
                json!({
                    "type": "object",
                    "properties": {
                        "query": {
                            "type": "string",
                            "description": "Search keyword matched against product names (e.g. 'battery', 'shoe')"
                        },
                        "category": {
                            "type": "string",
                            "description": "Optional category filter"
                        },
                        "max_price": {
                            "type": "number",
                            "description": "Optional maximum price"
                        }
                    },
                    "required": ["query"]
                }),
            ),
            ToolDefinition::function(
                "get_order_status",
                "Retrieve the status of a specific order by its exact order ID (like 'O0001').",
                json!({
                    "type": "object",
                    "properties": {
                        "order_id": {
                            "type": "string",
                            "description": "The exact order ID (e.g. 'O0001')"
                        }
                    },
                    "required": ["order_id"]
                }),
            ),
            ToolDefinition::function(
                "get_policy_info",
                "Retrieve company policy details for a topic such as returns, refunds, or warranty.",
                json!({
                    "type": "object",
                    "properties": {
                        "topic": {
                            "type": "string",
                            "description": "The policy topic (e.g. 'return', 'warranty')"
                        }
                    },
                    "required": ["topic"]
                }),
            ),
            ToolDefinition::function(
                "get_product_faq",
                "Look up frequently asked questions about a specific product's features.",
                json!({
                    "type": "object",
                    "properties": {
                        "product_name": {
                            "type": "string",
                            "description": "The product name (e.g. 'Luma')"
                        },
                        "topic": {
                            "type": "string",
                            "description": "The question topic (e.g. 'battery', 'charge')"
                        }
                    },
                    "required": ["product_name", "topic"]
                }),
            ),
        ]
    }

    /// Execute a tool call by name with raw JSON arguments
    ///
    /// Argument parsing is lenient: malformed JSON falls back to
    /// defaults rather than failing the turn.
    ///
    /// # Errors
    ///
    /// Returns error for unknown tool names or database failures
    pub fn execute(&self, name: &str, arguments: &str) -> Result<String> {
        tracing::debug!(tool = name, args = arguments, "executing tool");

        match name {
            "search_products" => {
                let args: SearchProductsArgs =
                    serde_json::from_str(arguments).unwrap_or_default();
                self.search_products(&args)
            }
            "get_order_status" => {
                let args: OrderStatusArgs = serde_json::from_str(arguments).unwrap_or_default();
                self.get_order_status(&args.order_id)
            }
            "get_policy_info" => {
                let args: PolicyInfoArgs = serde_json::from_str(arguments).unwrap_or_default();
                self.get_policy_info(&args.topic)
            }
            "get_product_faq" => {
                let args: ProductFaqArgs = serde_json::from_str(arguments).unwrap_or_default();
                self.get_product_faq(&args.product_name, &args.topic)
            }
            _ => Err(Error::Tool(format!("unknown tool: {name}"))),
        }
    }

    /// Search the catalog and format the top matches
    fn search_products(&self, args: &SearchProductsArgs) -> Result<String> {
        let filters = ProductSearch {
            query: args.query.clone().filter(|q| !q.is_empty()),
            category: args.category.clone().filter(|c| !c.is_empty()),
            max_price: args.max_price,
        };

        let products = self.catalog.search(&filters)?;

        if products.is_empty() {
            return Ok("No products found matching criteria.".to_string());
        }

        let lines: Vec<String> = products
            .iter()
            .take(MAX_PRODUCT_RESULTS)
            .map(|p| {
                let price = p
                    .price
                    .map_or_else(|| "n/a".to_string(), |v| format!("{v:.2}"));
                let stock = p
                    .stock_available
                    .map_or_else(|| "n/a".to_string(), |v| v.to_string());
                format!("{} (Price: {price}, Stock: {stock})", p.product_name)
            })
            .collect();

        Ok(lines.join("\n"))
    }

    /// Look up an order and format its status line
    fn get_order_status(&self, order_id: &str) -> Result<String> {
        let Some(order) = self.orders.find(order_id)? else {
            return Ok("Order ID not found in database.".to_string());
        };

        let status = order.order_status.as_deref().unwrap_or("unknown");
        let date = order.order_date.as_deref().unwrap_or("unknown date");

        Ok(order.item_names().map_or_else(
            || format!("Order {order_id}: {status}."),
            |items| format!("Order {order_id}: {status}. Placed on {date}. Items: {items}."),
        ))
    }

    /// Look up a policy excerpt for a topic
    fn get_policy_info(&self, topic: &str) -> Result<String> {
        let sections = self.policies.find_by_topic(topic)?;

        let Some(section) = sections.first() else {
            return Ok("No specific policy found for that topic.".to_string());
        };

        Ok(truncate_chars(&section.section_text, MAX_POLICY_CHARS))
    }

    /// Look up product FAQs and format them as Q/A pairs
    fn get_product_faq(&self, product_name: &str, topic: &str) -> Result<String> {
        let faqs = self.catalog.find_faqs(product_name, topic)?;

        if faqs.is_empty() {
            return Ok(format!(
                "No FAQ found for {product_name} regarding {topic}."
            ));
        }

        let entries: Vec<String> = faqs
            .iter()
            .take(MAX_FAQ_RESULTS)
            .map(|faq| format!("Q: {}\nA: {}", faq.question, faq.answer))
            .collect();

        Ok(entries.join("\n"))
    }
}

/// Truncate a string to at most `max` characters, never splitting a code point
fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
