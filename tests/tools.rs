//! Tool dispatch integration tests
//!
//! Exercises the four lookup tools end to end over a seeded database,
//! including the literal "not found" sentences the agent relays.

use nova_gateway::db::{CatalogRepo, OrderRepo, PolicyRepo, Product, ProductFaq};
use nova_gateway::ToolExecutor;

mod common;
use common::{seed_catalog, setup_test_db};

fn build_executor() -> (ToolExecutor, nova_gateway::DbPool) {
    let db = setup_test_db();
    seed_catalog(&db);
    let executor = ToolExecutor::new(
        CatalogRepo::new(db.clone()),
        OrderRepo::new(db.clone()),
        PolicyRepo::new(db.clone()),
    );
    (executor, db)
}

#[test]
fn test_search_products_by_keyword() {
    let (executor, _db) = build_executor();

    let result = executor
        .execute("search_products", r#"{"query": "shoes"}"#)
        .unwrap();

    assert!(result.contains("Trail Running Shoes"));
    assert!(result.contains("Dress Shoes"));
    assert!(!result.contains("Luma"));
}

#[test]
fn test_search_products_applies_price_ceiling() {
    let (executor, _db) = build_executor();

    let result = executor
        .execute("search_products", r#"{"query": "shoes", "max_price": 50}"#)
        .unwrap();

    assert!(result.contains("Trail Running Shoes"));
    assert!(!result.contains("Dress Shoes"));
}

#[test]
fn test_search_products_applies_category() {
    let (executor, _db) = build_executor();

    let result = executor
        .execute(
            "search_products",
            r#"{"query": "", "category": "Electronics"}"#,
        )
        .unwrap();

    assert!(result.contains("Luma Smart Camera"));
    assert!(result.contains("Noise Cancelling Headphones"));
    assert!(!result.contains("Shoes"));
}

#[test]
fn test_search_products_caps_at_five_lines() {
    let (executor, db) = build_executor();

    let catalog = CatalogRepo::new(db);
    for i in 0..7 {
        catalog
            .upsert_product(&Product {
                product_id: format!("W{i:03}"),
                product_name: format!("Widget Model {i}"),
                category: Some("Gadgets".to_string()),
                price: Some(9.99),
                stock_available: Some(100),
                rating: None,
                description: None,
                return_eligible: Some(true),
                delivery_time_days: Some(1),
            })
            .unwrap();
    }

    let result = executor
        .execute("search_products", r#"{"query": "Widget"}"#)
        .unwrap();

    assert_eq!(result.lines().count(), 5);
}

#[test]
fn test_search_products_no_match_sentence() {
    let (executor, _db) = build_executor();

    let result = executor
        .execute("search_products", r#"{"query": "submarine"}"#)
        .unwrap();

    assert_eq!(result, "No products found matching criteria.");
}

#[test]
fn test_order_status_with_items() {
    let (executor, _db) = build_executor();

    let result = executor
        .execute("get_order_status", r#"{"order_id": "O0001"}"#)
        .unwrap();

    assert_eq!(
        result,
        "Order O0001: Delivered. Placed on 2025-11-02. Items: Luma Smart Camera, Tripod."
    );
}

#[test]
fn test_order_status_unknown_id_sentence() {
    let (executor, _db) = build_executor();

    let result = executor
        .execute("get_order_status", r#"{"order_id": "O9999"}"#)
        .unwrap();

    assert_eq!(result, "Order ID not found in database.");
}

#[test]
fn test_policy_info_truncates_to_600_chars() {
    let (executor, db) = build_executor();

    let long_text = format!("Shipping insurance policy. {}", "x".repeat(700));
    PolicyRepo::new(db).insert(&long_text, Some(3)).unwrap();

    let result = executor
        .execute("get_policy_info", r#"{"topic": "insurance"}"#)
        .unwrap();

    assert_eq!(result.chars().count(), 600);
    assert!(result.starts_with("Shipping insurance policy."));
}

#[test]
fn test_policy_info_no_match_sentence() {
    let (executor, _db) = build_executor();

    let result = executor
        .execute("get_policy_info", r#"{"topic": "teleportation"}"#)
        .unwrap();

    assert_eq!(result, "No specific policy found for that topic.");
}

#[test]
fn test_product_faq_caps_at_three_entries() {
    let (executor, db) = build_executor();

    let catalog = CatalogRepo::new(db);
    for i in 0..4 {
        catalog
            .insert_faq(
                Some("P001"),
                &ProductFaq {
                    product_name: "Luma Smart Camera".to_string(),
                    question: format!("Battery question number {i}?"),
                    answer: "About 12 hours.".to_string(),
                },
            )
            .unwrap();
    }

    let result = executor
        .execute(
            "get_product_faq",
            r#"{"product_name": "Luma", "topic": "Battery"}"#,
        )
        .unwrap();

    assert_eq!(result.matches("Q: ").count(), 3);
}

#[test]
fn test_product_faq_no_match_sentence() {
    let (executor, _db) = build_executor();

    let result = executor
        .execute(
            "get_product_faq",
            r#"{"product_name": "Luma", "topic": "teleportation"}"#,
        )
        .unwrap();

    assert_eq!(result, "No FAQ found for Luma regarding teleportation.");
}

#[test]
fn test_tool_definitions_are_valid_schemas() {
    for def in ToolExecutor::definitions() {
        assert_eq!(def.tool_type, "function");
        let params = def.function.parameters.expect("missing parameters");
        assert_eq!(params["type"], "object");
        assert!(params["properties"].is_object());
    }
}

#[test]
fn test_executor_survives_model_supplied_garbage() {
    let (executor, _db) = build_executor();

    // Arbitrary malformed payloads must not panic or error the turn
    for args in ["", "{", "null", "[]", r#"{"max_price": "cheap"}"#] {
        let result = executor.execute("search_products", args);
        assert!(result.is_ok(), "args {args:?} produced {result:?}");
    }
}
