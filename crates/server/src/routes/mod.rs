//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                              - Liveness check
//! GET  /health/ready                        - Readiness check (catalog reachable)
//!
//! # Catalog (REST)
//! GET  /webmcp/v1/products/search           - Search products
//! GET  /webmcp/v1/products/categories       - Categories with products
//! GET  /webmcp/v1/products/{id}             - Product detail
//!
//! # Cart (REST, bound to the session cookie)
//! GET  /webmcp/v1/cart                      - Current cart
//! POST /webmcp/v1/cart/add                  - Add a product
//! POST /webmcp/v1/cart/update               - Set a line's quantity
//! POST /webmcp/v1/cart/remove               - Remove a line
//! GET  /webmcp/v1/checkout/url              - Checkout link and cart
//!
//! # Tools (only when WEBMCP_ENABLED)
//! GET  /webmcp/v1/info                      - Shop and tool overview
//! GET  /webmcp/v1/tools                     - Operation descriptors
//! GET  /webmcp/v1/tools/{name}              - One descriptor
//! POST /webmcp/v1/tools/{name}/invoke       - Invoke an operation
//! GET  /webmcp/v1/confirmations             - Pending confirmations for this session
//! POST /webmcp/v1/confirmations/{id}        - Approve or decline
//! ```

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod confirmations;
pub mod health;
pub mod info;
pub mod tools;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the catalog routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/search", get(catalog::search))
        .route("/categories", get(catalog::categories))
        .route("/{id}", get(catalog::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
}

/// Create the tool discovery and invocation routes router.
pub fn tool_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(tools::index))
        .route("/{name}", get(tools::show))
        .route("/{name}/invoke", post(tools::invoke))
}

/// Create the confirmation routes router.
pub fn confirmation_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(confirmations::index))
        .route("/{id}", post(confirmations::resolve))
}

/// Create all routes under the API namespace.
///
/// The tool surface is mounted only when `tools_enabled` is set; the REST
/// catalog and cart endpoints are always available.
pub fn api_routes(tools_enabled: bool) -> Router<AppState> {
    let router = Router::new()
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .route("/checkout/url", get(checkout::url));

    if tools_enabled {
        router
            .route("/info", get(info::show))
            .nest("/tools", tool_routes())
            .nest("/confirmations", confirmation_routes())
    } else {
        router
    }
}
