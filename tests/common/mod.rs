//! Shared test utilities

use nova_gateway::db::{self, CatalogRepo, Order, OrderRepo, PolicyRepo, Product, ProductFaq};
use nova_gateway::DbPool;

/// Set up an in-memory test database
#[must_use]
pub fn setup_test_db() -> DbPool {
    db::init_memory().expect("failed to init test db")
}

/// Seed the support catalog with a small fixture set
pub fn seed_catalog(db: &DbPool) {
    let catalog = CatalogRepo::new(db.clone());
    let orders = OrderRepo::new(db.clone());
    let policies = PolicyRepo::new(db.clone());

    let products = [
        ("P001", "Luma Smart Camera", "Electronics", 129.99, 7),
        ("P002", "Trail Running Shoes", "Footwear", 49.50, 23),
        ("P003", "Dress Shoes", "Footwear", 89.00, 4),
        ("P004", "Noise Cancelling Headphones", "Electronics", 199.00, 11),
    ];
    for (id, name, category, price, stock) in products {
        catalog
            .upsert_product(&Product {
                product_id: id.to_string(),
                product_name: name.to_string(),
                category: Some(category.to_string()),
                price: Some(price),
                stock_available: Some(stock),
                rating: Some(4.0),
                description: None,
                return_eligible: Some(true),
                delivery_time_days: Some(3),
            })
            .expect("failed to seed product");
    }

    orders
        .upsert(&Order {
            order_id: "O0001".to_string(),
            customer_id: Some("C042".to_string()),
            products_json: Some(
                r#"[{"product_name": "Luma Smart Camera"}, {"product_name": "Tripod"}]"#
                    .to_string(),
            ),
            order_status: Some("Delivered".to_string()),
            order_date: Some("2025-11-02".to_string()),
        })
        .expect("failed to seed order");

    policies
        .insert(
            "Returns are accepted within 30 days of delivery for eligible items.",
            Some(1),
        )
        .expect("failed to seed policy");

    catalog
        .insert_faq(
            Some("P001"),
            &ProductFaq {
                product_name: "Luma Smart Camera".to_string(),
                question: "Does the Luma camera have night vision?".to_string(),
                answer: "Yes, infrared night vision up to 10 meters.".to_string(),
            },
        )
        .expect("failed to seed faq");
}
