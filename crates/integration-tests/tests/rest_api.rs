//! REST catalog and cart endpoints over a real socket.

#![allow(clippy::unwrap_used)]

use serde_json::json;
use webmcp_integration_tests::{TestContext, amount};

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_endpoints() {
    let ctx = TestContext::new().await;

    let resp = ctx.client().get(ctx.url("/health")).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "ok");

    let resp = ctx.client().get(ctx.url("/health/ready")).send().await.unwrap();
    assert_eq!(resp.status(), 200);
}

// =============================================================================
// Catalog
// =============================================================================

#[tokio::test]
async fn test_search_price_range_is_inclusive() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx
        .get("products/search?min_price=9.50&max_price=15")
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["success"], true);

    let products = body["products"].as_array().unwrap();
    let names: Vec<&str> = products.iter().map(|p| p["name"].as_str().unwrap()).collect();
    assert_eq!(names, ["Blue Mug", "Red Mug"]);
    for product in products {
        let price = amount(&product["price"]["amount"]);
        assert!((9.5..=15.0).contains(&price), "{price} outside range");
    }
}

#[tokio::test]
async fn test_search_total_counts_past_limit() {
    let ctx = TestContext::new().await;

    let (_, body) = ctx.get("products/search?limit=1").await;
    assert_eq!(body["total"], 4);
    assert_eq!(body["products"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_search_by_category_and_text() {
    let ctx = TestContext::new().await;

    let (_, body) = ctx.get("products/search?category=tea").await;
    assert_eq!(body["total"], 2);

    let (_, body) = ctx.get("products/search?query=LOOSE-LEAF").await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["products"][0]["slug"], "tea-sampler");
}

#[tokio::test]
async fn test_search_rejects_inverted_range() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx.get("products/search?min_price=20&max_price=10").await;
    assert_eq!(status, 400);
    assert_eq!(body["code"], "bad_request");
}

#[tokio::test]
async fn test_product_detail_and_not_found() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx.get("products/1").await;
    assert_eq!(status, 200);
    assert_eq!(body["product"]["name"], "Blue Mug");
    assert_eq!(amount(&body["product"]["price"]["amount"]), 9.5);
    assert_eq!(
        body["product"]["permalink"],
        format!("{}/products/blue-mug", ctx.base_url())
    );

    let (status, body) = ctx.get("products/999").await;
    assert_eq!(status, 404);
    assert_eq!(body["code"], "product_not_found");
    assert!(body["message"].as_str().unwrap().contains("not found"));
}

#[tokio::test]
async fn test_categories_skip_empty() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx.get("products/categories").await;
    assert_eq!(status, 200);
    let slugs: Vec<&str> = body["categories"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["slug"].as_str().unwrap())
        .collect();
    assert_eq!(slugs, ["mugs", "tea"]);
    assert_eq!(body["categories"][0]["count"], 2);
}

// =============================================================================
// Cart
// =============================================================================

#[tokio::test]
async fn test_cart_lifecycle() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx.get("cart").await;
    assert_eq!(status, 200);
    assert_eq!(body["cart"]["item_count"], 0);

    let (status, body) = ctx
        .post("cart/add", &json!({"product_id": 1, "quantity": 2}))
        .await;
    assert_eq!(status, 200);
    let key = body["cart_item_key"].as_str().unwrap().to_string();
    assert_eq!(body["cart"]["item_count"], 2);
    assert_eq!(amount(&body["cart"]["total"]), 19.0);

    // Adding the same product again lands on the same line.
    let (_, body) = ctx.post("cart/add", &json!({"product_id": 1})).await;
    assert_eq!(body["cart_item_key"], key.as_str());
    assert_eq!(body["cart"]["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["cart"]["item_count"], 3);

    let (status, body) = ctx
        .post("cart/update", &json!({"cart_item_key": key, "quantity": 1}))
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["cart"]["items"][0]["quantity"], 1);

    let (status, body) = ctx.post("cart/remove", &json!({"cart_item_key": key})).await;
    assert_eq!(status, 200);
    assert_eq!(body["cart"]["item_count"], 0);

    let (status, body) = ctx.post("cart/remove", &json!({"cart_item_key": key})).await;
    assert_eq!(status, 404);
    assert_eq!(body["code"], "cart_item_not_found");
}

#[tokio::test]
async fn test_cart_rejections() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx.post("cart/add", &json!({"product_id": 4})).await;
    assert_eq!(status, 400);
    assert_eq!(body["code"], "cart_error");
    assert!(body["message"].as_str().unwrap().contains("out of stock"));

    let (status, body) = ctx
        .post("cart/add", &json!({"product_id": 1, "quantity": 6}))
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["code"], "cart_error");

    let (status, body) = ctx.post("cart/add", &json!({"product_id": 999})).await;
    assert_eq!(status, 404);
    assert_eq!(body["code"], "product_not_found");

    let (status, body) = ctx.post("cart/add", &json!({"quantity": 1})).await;
    assert_eq!(status, 400);
    assert_eq!(body["code"], "bad_request");
}

#[tokio::test]
async fn test_carts_are_per_session() {
    let ctx = TestContext::new().await;

    ctx.post("cart/add", &json!({"product_id": 2})).await;

    let other = TestContext::new_client();
    let (_, body) = webmcp_integration_tests::send(other.get(ctx.api("cart"))).await;
    assert_eq!(body["cart"]["item_count"], 0);

    let (_, body) = ctx.get("cart").await;
    assert_eq!(body["cart"]["item_count"], 1);
}

#[tokio::test]
async fn test_checkout_url() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx.get("checkout/url").await;
    assert_eq!(status, 200);
    assert_eq!(body["checkout_url"], format!("{}/checkout", ctx.base_url()));
    assert_eq!(body["cart"]["item_count"], 0);
}
