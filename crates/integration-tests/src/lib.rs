//! End-to-end test harness for the WebMCP server.
//!
//! [`TestContext`] binds the real router to an ephemeral port with a seeded
//! in-memory catalog. Each [`TestContext::client`] has its own cookie jar
//! and therefore its own session and cart.
//!
//! ```rust,ignore
//! #[tokio::test]
//! async fn test_health() {
//!     let ctx = TestContext::new().await;
//!     let resp = ctx.client().get(ctx.url("/health")).send().await.unwrap();
//!     assert_eq!(resp.status(), 200);
//! }
//! ```

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::task::JoinHandle;
use url::Url;
use webmcp_server::config::ServerConfig;
use webmcp_server::state::AppState;
use webmcp_tools::{CatalogSeed, MemoryCommerce};

/// Catalog served by every test server.
///
/// - 1 Blue Mug: on sale 9.50 (regular 12.00), 5 in stock
/// - 2 Red Mug: 15.00
/// - 3 Tea Sampler: 24.00
/// - 4 Green Tea: 8.00, out of stock
/// - category `gift-cards` has no products
pub const CATALOG: &str = r#"
currency: USD
categories:
  - { id: 1, name: Mugs, slug: mugs, description: Things to drink from }
  - { id: 2, name: Tea, slug: tea }
  - { id: 3, name: Gift Cards, slug: gift-cards }
products:
  - id: 1
    name: Blue Mug
    slug: blue-mug
    regular_price: "12.00"
    sale_price: "9.50"
    stock_quantity: 5
    short_description: A sturdy blue stoneware mug.
    categories: [mugs]
  - id: 2
    name: Red Mug
    slug: red-mug
    regular_price: "15.00"
    categories: [mugs]
  - id: 3
    name: Tea Sampler
    slug: tea-sampler
    regular_price: "24.00"
    description: Six loose-leaf teas in a gift box.
    categories: [tea]
  - id: 4
    name: Green Tea
    slug: green-tea
    regular_price: "8.00"
    in_stock: false
    categories: [tea]
"#;

/// A running server plus helpers to talk to it.
pub struct TestContext {
    base_url: String,
    client: reqwest::Client,
    server: JoinHandle<()>,
}

impl TestContext {
    /// Start a server with default configuration.
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Start a server after adjusting its configuration.
    pub async fn with_config(configure: impl FnOnce(&mut ServerConfig)) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local address");
        let base_url = format!("http://{addr}");

        let mut config = ServerConfig::local(Url::parse(&base_url).expect("valid base URL"));
        configure(&mut config);

        let commerce = MemoryCommerce::from_seed(
            CatalogSeed::from_yaml(CATALOG).expect("catalog parses"),
            config.public_url(),
            config.checkout_url(),
        )
        .expect("catalog is valid");
        let state = AppState::new(config, Arc::new(commerce)).expect("registry builds");
        let app = webmcp_server::app(state);

        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("server runs");
        });

        Self {
            client: Self::new_client(),
            base_url,
            server,
        }
    }

    /// A client with its own cookie jar (a separate session).
    #[must_use]
    pub fn new_client() -> reqwest::Client {
        reqwest::Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(30))
            .build()
            .expect("client builds")
    }

    /// The default client. Clones share its cookie jar.
    #[must_use]
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a path such as `/health`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Absolute URL under the API namespace.
    #[must_use]
    pub fn api(&self, path: &str) -> String {
        format!("{}/webmcp/v1/{path}", self.base_url)
    }

    /// `GET` an API path with the default client, returning status and JSON body.
    pub async fn get(&self, path: &str) -> (u16, Value) {
        send(self.client.get(self.api(path))).await
    }

    /// `POST` JSON to an API path with the default client.
    pub async fn post(&self, path: &str, body: &Value) -> (u16, Value) {
        send(self.client.post(self.api(path)).json(body)).await
    }

    /// Invoke an operation with the default client, returning the envelope.
    pub async fn invoke(&self, operation: &str, arguments: Value) -> Value {
        let (status, body) = self
            .post(
                &format!("tools/{operation}/invoke"),
                &serde_json::json!({ "arguments": arguments }),
            )
            .await;
        assert_eq!(status, 200, "invoke always answers 200: {body}");
        body
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        self.server.abort();
    }
}

/// Send a request and decode the JSON body (`Null` when there is none).
pub async fn send(request: reqwest::RequestBuilder) -> (u16, Value) {
    let response = request.send().await.expect("request succeeds");
    let status = response.status().as_u16();
    let bytes = response.bytes().await.expect("body readable");
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

/// Parse a decimal string field (prices serialize as strings).
#[must_use]
pub fn amount(value: &Value) -> f64 {
    value
        .as_str()
        .and_then(|s| s.parse().ok())
        .or_else(|| value.as_f64())
        .expect("numeric amount")
}
