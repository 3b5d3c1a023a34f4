//! Tool discovery, invocation and HTTP confirmation over a real socket.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use serde_json::{Value, json};
use webmcp_integration_tests::{TestContext, send};

/// Poll until the session behind `client` has exactly one pending
/// confirmation, returning it.
async fn pending_confirmation(ctx: &TestContext, client: &reqwest::Client) -> Value {
    for _ in 0..200 {
        let (_, body) = send(client.get(ctx.api("confirmations"))).await;
        if let Some(first) = body["confirmations"].as_array().and_then(|c| c.first()) {
            return first.clone();
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("no confirmation became pending");
}

async fn resolve(ctx: &TestContext, client: &reqwest::Client, id: &str, approved: bool) -> u16 {
    let (status, _) = send(
        client
            .post(ctx.api(&format!("confirmations/{id}")))
            .json(&json!({ "approved": approved })),
    )
    .await;
    status
}

/// Start an invocation in the background with the default client's session.
fn spawn_invoke(
    ctx: &TestContext,
    operation: &str,
    arguments: Value,
) -> tokio::task::JoinHandle<Value> {
    let request = ctx
        .client()
        .post(ctx.api(&format!("tools/{operation}/invoke")))
        .json(&json!({ "arguments": arguments }));
    tokio::spawn(async move { send(request).await.1 })
}

// =============================================================================
// Discovery
// =============================================================================

#[tokio::test]
async fn test_discovery() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx.get("tools").await;
    assert_eq!(status, 200);
    let tools = body.as_array().unwrap();
    assert_eq!(tools.len(), 8);
    for tool in tools {
        let name = tool["name"].as_str().unwrap();
        let (status, described) = ctx.get(&format!("tools/{name}")).await;
        assert_eq!(status, 200);
        assert_eq!(described["name"], name);
        assert_eq!(described["input_schema"]["type"], "object");
    }

    let (status, body) = ctx.get("info").await;
    assert_eq!(status, 200);
    assert_eq!(body["currency"], "USD");
    assert_eq!(body["rest_url"], format!("{}/webmcp/v1", ctx.base_url()));
    assert_eq!(body["tools"].as_array().unwrap().len(), 8);
}

#[tokio::test]
async fn test_tools_can_be_disabled() {
    let ctx = TestContext::with_config(|config| config.tools_enabled = false).await;

    let (status, _) = ctx.get("tools").await;
    assert_eq!(status, 404);
    let (status, _) = ctx.get("info").await;
    assert_eq!(status, 404);

    let (status, _) = ctx.get("products/categories").await;
    assert_eq!(status, 200);
}

// =============================================================================
// Read-only invocations
// =============================================================================

#[tokio::test]
async fn test_read_only_invocations() {
    let ctx = TestContext::new().await;

    let result = ctx
        .invoke("search_products", json!({"min_price": 10, "max_price": 20}))
        .await;
    assert_eq!(result["ok"], true);
    let text = result["content"][0]["text"].as_str().unwrap();
    assert!(text.starts_with("Found 1 products. Showing 1."));
    assert!(text.contains("Red Mug"));

    let result = ctx.invoke("get_product", json!({"product_id": 999})).await;
    assert_eq!(result["ok"], false);
    assert_eq!(result["error_kind"], "not_found");
    assert!(result["error_message"].as_str().unwrap().contains("not found"));

    let result = ctx.invoke("get_product", json!({"product_id": "abc"})).await;
    assert_eq!(result["error_kind"], "invalid_arguments");

    let result = ctx.invoke("drop_tables", json!({})).await;
    assert_eq!(result["error_kind"], "operation_not_found");
}

#[tokio::test]
async fn test_get_cart_is_stable() {
    let ctx = TestContext::new().await;

    ctx.post("cart/add", &json!({"product_id": 2})).await;
    let first = ctx.invoke("get_cart", json!({})).await;
    let second = ctx.invoke("get_cart", json!({})).await;
    assert_eq!(first, second);
    assert!(first["content"][0]["text"].as_str().unwrap().contains("Red Mug"));
}

// =============================================================================
// Confirmation over HTTP
// =============================================================================

#[tokio::test]
async fn test_add_to_cart_approved() {
    let ctx = TestContext::new().await;
    // Establish the session before the invocation and the poller share it.
    ctx.get("cart").await;

    let invocation = spawn_invoke(&ctx, "add_to_cart", json!({"product_id": 1, "quantity": 2}));
    let pending = pending_confirmation(&ctx, ctx.client()).await;
    assert_eq!(pending["operation"], "add_to_cart");
    assert!(pending["prompt"].as_str().unwrap().contains("Blue Mug"));

    let status = resolve(&ctx, ctx.client(), pending["id"].as_str().unwrap(), true).await;
    assert_eq!(status, 204);

    let result = invocation.await.unwrap();
    assert_eq!(result["ok"], true, "{result}");

    let (_, body) = ctx.get("cart").await;
    assert_eq!(body["cart"]["item_count"], 2);
}

#[tokio::test]
async fn test_add_to_cart_declined() {
    let ctx = TestContext::new().await;
    ctx.get("cart").await;

    let invocation = spawn_invoke(&ctx, "add_to_cart", json!({"product_id": 1}));
    let pending = pending_confirmation(&ctx, ctx.client()).await;
    let id = pending["id"].as_str().unwrap().to_string();
    assert_eq!(resolve(&ctx, ctx.client(), &id, false).await, 204);

    let result = invocation.await.unwrap();
    assert_eq!(result["ok"], false);
    assert_eq!(result["error_kind"], "cancelled");

    let (_, body) = ctx.get("cart").await;
    assert_eq!(body["cart"]["item_count"], 0);

    // Already resolved.
    assert_eq!(resolve(&ctx, ctx.client(), &id, true).await, 404);
}

#[tokio::test]
async fn test_confirmations_are_private_to_the_session() {
    let ctx = TestContext::new().await;
    ctx.get("cart").await;

    let invocation = spawn_invoke(&ctx, "add_to_cart", json!({"product_id": 2}));
    let pending = pending_confirmation(&ctx, ctx.client()).await;
    let id = pending["id"].as_str().unwrap().to_string();

    let stranger = TestContext::new_client();
    let (_, body) = send(stranger.get(ctx.api("confirmations"))).await;
    assert!(body["confirmations"].as_array().unwrap().is_empty());
    assert_eq!(resolve(&ctx, &stranger, &id, true).await, 404);

    assert_eq!(resolve(&ctx, ctx.client(), &id, false).await, 204);
    assert_eq!(invocation.await.unwrap()["error_kind"], "cancelled");
}

#[tokio::test]
async fn test_unanswered_confirmation_times_out() {
    let ctx = TestContext::with_config(|config| {
        config.confirmation_timeout = Duration::from_millis(200);
    })
    .await;
    ctx.get("cart").await;

    let result = ctx.invoke("add_to_cart", json!({"product_id": 1})).await;
    assert_eq!(result["ok"], false);
    assert_eq!(result["error_kind"], "cancelled");

    let (_, body) = ctx.get("confirmations").await;
    assert!(body["confirmations"].as_array().unwrap().is_empty());
    let (_, body) = ctx.get("cart").await;
    assert_eq!(body["cart"]["item_count"], 0);
}

#[tokio::test]
async fn test_remove_from_cart_approved() {
    let ctx = TestContext::new().await;

    let (_, body) = ctx.post("cart/add", &json!({"product_id": 3})).await;
    let key = body["cart_item_key"].as_str().unwrap().to_string();

    let invocation = spawn_invoke(&ctx, "remove_from_cart", json!({"cart_item_key": key}));
    let pending = pending_confirmation(&ctx, ctx.client()).await;
    assert_eq!(
        resolve(&ctx, ctx.client(), pending["id"].as_str().unwrap(), true).await,
        204
    );
    assert_eq!(invocation.await.unwrap()["ok"], true);

    let result = ctx.invoke("get_cart", json!({})).await;
    let text = result["content"][0]["text"].as_str().unwrap();
    assert!(!text.contains(&key));
}

#[tokio::test]
async fn test_missing_line_fails_before_confirmation() {
    let ctx = TestContext::new().await;

    let result = ctx
        .invoke("update_cart_item", json!({"cart_item_key": "abc", "quantity": 2}))
        .await;
    assert_eq!(result["error_kind"], "not_found");

    let (_, body) = ctx.get("confirmations").await;
    assert!(body["confirmations"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_checkout_with_empty_cart_needs_no_confirmation() {
    let ctx = TestContext::new().await;

    let result = ctx.invoke("proceed_to_checkout", json!({})).await;
    assert_eq!(result["ok"], true);
    assert!(result["content"][0]["text"]
        .as_str()
        .unwrap()
        .contains("The cart is empty"));
}
