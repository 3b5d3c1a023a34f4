//! The commerce operation set.
//!
//! Read operations (execute immediately):
//! `search_products`, `get_product`, `get_categories`, `get_cart`.
//!
//! Confirmed operations (the user approves before anything changes):
//! `add_to_cart`, `update_cart_item`, `remove_from_cart`,
//! `proceed_to_checkout`.

mod cart;
mod catalog;
mod checkout;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::instrument;
use webmcp_core::{Cart, LineKey, MAX_LINE_QUANTITY, ProductId};

use crate::adapter::CommerceAdapter;
use crate::context::SessionContext;
use crate::descriptor::OperationDescriptor;
use crate::dispatcher::{OperationHandler, Preparation};
use crate::error::InvocationError;
use crate::registry::{OperationRegistry, RegistryError};
use crate::result::ContentBlock;
use crate::schema::{Arguments, FieldType, InputSchema};

pub const SEARCH_PRODUCTS: &str = "search_products";
pub const GET_PRODUCT: &str = "get_product";
pub const GET_CATEGORIES: &str = "get_categories";
pub const ADD_TO_CART: &str = "add_to_cart";
pub const GET_CART: &str = "get_cart";
pub const UPDATE_CART_ITEM: &str = "update_cart_item";
pub const REMOVE_FROM_CART: &str = "remove_from_cart";
pub const PROCEED_TO_CHECKOUT: &str = "proceed_to_checkout";

/// Upper bound on `search_products` page size.
pub const MAX_SEARCH_LIMIT: u32 = 100;

/// Declarations for all commerce operations, in discovery order.
#[must_use]
pub fn commerce_operations() -> Vec<OperationDescriptor> {
    vec![
        OperationDescriptor::new(
            SEARCH_PRODUCTS,
            "Search products in the shop. Filter by free text, category slug and price range.",
        )
        .with_schema(
            InputSchema::empty()
                .optional(
                    "query",
                    FieldType::String,
                    "Search text (product name or description)",
                )
                .optional("category", FieldType::String, "Category slug to filter by")
                .optional("min_price", FieldType::Number, "Minimum price (inclusive)")
                .minimum(0.0)
                .optional("max_price", FieldType::Number, "Maximum price (inclusive)")
                .minimum(0.0)
                .with_default(
                    "limit",
                    FieldType::Integer,
                    "Maximum number of results",
                    json!(webmcp_core::DEFAULT_SEARCH_LIMIT),
                )
                .minimum(1.0)
                .maximum(f64::from(MAX_SEARCH_LIMIT)),
        ),
        OperationDescriptor::new(
            GET_PRODUCT,
            "Get full details of one product: price, stock, description, categories, attributes.",
        )
        .with_schema(InputSchema::empty().required(
            "product_id",
            FieldType::Integer,
            "Product ID",
        )),
        OperationDescriptor::new(
            GET_CATEGORIES,
            "List the product categories that currently hold products.",
        ),
        OperationDescriptor::new(
            ADD_TO_CART,
            "Add a product to the shopping cart. Requires user confirmation.",
        )
        .with_schema(
            InputSchema::empty()
                .required("product_id", FieldType::Integer, "Product ID to add")
                .with_default("quantity", FieldType::Integer, "Quantity to add", json!(1))
                .minimum(1.0)
                .maximum(f64::from(MAX_LINE_QUANTITY)),
        )
        .mutating(),
        OperationDescriptor::new(
            GET_CART,
            "Show the current shopping cart with line keys, quantities and totals.",
        ),
        OperationDescriptor::new(
            UPDATE_CART_ITEM,
            "Change the quantity of a cart line. Quantity 0 removes the line. Requires user confirmation.",
        )
        .with_schema(
            InputSchema::empty()
                .required(
                    "cart_item_key",
                    FieldType::String,
                    "Cart line key (from get_cart)",
                )
                .required("quantity", FieldType::Integer, "New quantity")
                .minimum(0.0)
                .maximum(f64::from(MAX_LINE_QUANTITY)),
        )
        .mutating(),
        OperationDescriptor::new(
            REMOVE_FROM_CART,
            "Remove a line from the shopping cart. Requires user confirmation.",
        )
        .with_schema(InputSchema::empty().required(
            "cart_item_key",
            FieldType::String,
            "Cart line key to remove (from get_cart)",
        ))
        .mutating(),
        OperationDescriptor::new(
            PROCEED_TO_CHECKOUT,
            "Get the checkout link to complete the purchase. Requires user confirmation.",
        )
        .confirmed(),
    ]
}

/// Build the registry of commerce operations.
///
/// # Errors
///
/// Returns [`RegistryError`] if the declaration list is inconsistent.
pub fn commerce_registry() -> Result<OperationRegistry, RegistryError> {
    OperationRegistry::new(commerce_operations())
}

/// Executes commerce operations against a [`CommerceAdapter`].
#[derive(Clone)]
pub struct CommerceTools {
    commerce: Arc<dyn CommerceAdapter>,
}

impl CommerceTools {
    #[must_use]
    pub fn new(commerce: Arc<dyn CommerceAdapter>) -> Self {
        Self { commerce }
    }
}

#[async_trait]
impl OperationHandler for CommerceTools {
    #[instrument(skip(self, operation, arguments, session), fields(tool_name = %operation.name))]
    async fn prepare(
        &self,
        operation: &OperationDescriptor,
        arguments: &Arguments,
        session: &SessionContext,
    ) -> Result<Preparation, InvocationError> {
        let commerce = self.commerce.as_ref();
        match operation.name.as_str() {
            ADD_TO_CART => cart::prepare_add(commerce, arguments).await,
            UPDATE_CART_ITEM => cart::prepare_update(commerce, arguments, session).await,
            REMOVE_FROM_CART => cart::prepare_remove(commerce, arguments, session).await,
            PROCEED_TO_CHECKOUT => checkout::prepare(commerce, session).await,
            _ => Ok(Preparation::Proceed { prompt: None }),
        }
    }

    #[instrument(skip(self, operation, arguments, session), fields(tool_name = %operation.name))]
    async fn execute(
        &self,
        operation: &OperationDescriptor,
        arguments: &Arguments,
        session: &SessionContext,
    ) -> Result<Vec<ContentBlock>, InvocationError> {
        let commerce = self.commerce.as_ref();
        match operation.name.as_str() {
            SEARCH_PRODUCTS => catalog::search_products(commerce, arguments).await,
            GET_PRODUCT => catalog::get_product(commerce, arguments).await,
            GET_CATEGORIES => catalog::get_categories(commerce).await,
            ADD_TO_CART => cart::add_to_cart(commerce, arguments, session).await,
            GET_CART => cart::get_cart(commerce, session).await,
            UPDATE_CART_ITEM => cart::update_cart_item(commerce, arguments, session).await,
            REMOVE_FROM_CART => cart::remove_from_cart(commerce, arguments, session).await,
            PROCEED_TO_CHECKOUT => checkout::proceed_to_checkout(commerce, session).await,
            other => Err(InvocationError::OperationNotFound(other.to_string())),
        }
    }
}

// =============================================================================
// Shared helpers
// =============================================================================

fn product_id(arguments: &Arguments) -> Result<ProductId, InvocationError> {
    arguments.require_i64("product_id").map(ProductId::new)
}

fn line_key(arguments: &Arguments) -> Result<LineKey, InvocationError> {
    let raw = arguments.require_str("cart_item_key")?;
    LineKey::parse(raw).map_err(|e| InvocationError::invalid("cart_item_key", e.to_string()))
}

/// "3 items, total $24.00"
fn cart_totals(cart: &Cart) -> String {
    let noun = if cart.item_count == 1 { "item" } else { "items" };
    format!(
        "{} {noun}, total {}",
        cart.item_count,
        cart.format(cart.total)
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use rust_decimal::Decimal;
    use serde_json::{Value, json};
    use webmcp_core::{
        Cart, CategorySummary, CurrencyCode, Product, SearchPage, SearchQuery, SessionId,
    };

    use super::*;
    use crate::confirmation::StaticGate;
    use crate::dispatcher::{Dispatcher, InvocationRequest};
    use crate::error::CommerceError;
    use crate::memory::{CatalogSeed, MemoryCommerce};
    use crate::result::{ErrorKind, InvocationResult};

    const SEED: &str = r#"
currency: USD
categories:
  - { id: 1, name: Mugs, slug: mugs }
  - { id: 2, name: Tea, slug: tea }
  - { id: 3, name: Empty, slug: empty }
products:
  - { id: 10, name: Blue Mug, slug: blue-mug, regular_price: "12.00", categories: [mugs], stock_quantity: 5 }
  - { id: 11, name: Red Mug, slug: red-mug, regular_price: "25.00", sale_price: "20.00", categories: [mugs] }
  - { id: 12, name: Green Tea, slug: green-tea, regular_price: "8.50", categories: [tea] }
  - { id: 13, name: Gift Box, slug: gift-box, regular_price: "45.00", in_stock: false }
"#;

    /// Delegates to an in-memory store and counts cart mutations.
    struct CountingCommerce {
        inner: MemoryCommerce,
        adds: AtomicUsize,
        removes: AtomicUsize,
    }

    #[async_trait]
    impl CommerceAdapter for CountingCommerce {
        async fn search_catalog(&self, query: &SearchQuery) -> Result<SearchPage, CommerceError> {
            self.inner.search_catalog(query).await
        }

        async fn get_product(&self, id: ProductId) -> Result<Product, CommerceError> {
            self.inner.get_product(id).await
        }

        async fn list_categories(&self) -> Result<Vec<CategorySummary>, CommerceError> {
            self.inner.list_categories().await
        }

        async fn add_to_cart(
            &self,
            session: &SessionContext,
            product_id: ProductId,
            quantity: u32,
        ) -> Result<LineKey, CommerceError> {
            self.adds.fetch_add(1, Ordering::SeqCst);
            self.inner.add_to_cart(session, product_id, quantity).await
        }

        async fn get_cart(&self, session: &SessionContext) -> Result<Cart, CommerceError> {
            self.inner.get_cart(session).await
        }

        async fn set_line_quantity(
            &self,
            session: &SessionContext,
            key: &LineKey,
            quantity: u32,
        ) -> Result<bool, CommerceError> {
            self.inner.set_line_quantity(session, key, quantity).await
        }

        async fn remove_line(
            &self,
            session: &SessionContext,
            key: &LineKey,
        ) -> Result<bool, CommerceError> {
            self.removes.fetch_add(1, Ordering::SeqCst);
            self.inner.remove_line(session, key).await
        }

        async fn checkout_url(&self, session: &SessionContext) -> Result<String, CommerceError> {
            self.inner.checkout_url(session).await
        }
    }

    struct Harness {
        dispatcher: Dispatcher,
        commerce: Arc<CountingCommerce>,
        session: SessionContext,
    }

    impl Harness {
        fn with_seed(seed: &str) -> Self {
            let seed = CatalogSeed::from_yaml(seed).unwrap();
            let inner =
                MemoryCommerce::from_seed(seed, "http://shop.test", "http://shop.test/checkout")
                    .unwrap();
            let commerce = Arc::new(CountingCommerce {
                inner,
                adds: AtomicUsize::new(0),
                removes: AtomicUsize::new(0),
            });
            let handler = Arc::new(CommerceTools::new(commerce.clone()));
            let dispatcher = Dispatcher::new(Arc::new(commerce_registry().unwrap()), handler);
            Self {
                dispatcher,
                commerce,
                session: SessionContext::new(SessionId::parse("session-a").unwrap()),
            }
        }

        fn new() -> Self {
            Self::with_seed(SEED)
        }

        async fn call(&self, operation: &str, arguments: Value, gate: StaticGate) -> InvocationResult {
            self.dispatcher
                .invoke(
                    &InvocationRequest::new(operation, arguments),
                    &self.session,
                    &gate,
                )
                .await
        }

        async fn read(&self, operation: &str, arguments: Value) -> InvocationResult {
            self.call(operation, arguments, StaticGate::decline()).await
        }

        async fn approve(&self, operation: &str, arguments: Value) -> InvocationResult {
            self.call(operation, arguments, StaticGate::approve()).await
        }
    }

    fn payload(result: &InvocationResult) -> Value {
        let block = result.content().last().unwrap();
        serde_json::from_str(block.as_text()).unwrap()
    }

    #[test]
    fn test_describe_round_trips_every_operation() {
        let registry = commerce_registry().unwrap();
        assert_eq!(registry.len(), 8);
        for op in registry.list() {
            assert_eq!(registry.describe(&op.name).unwrap().name, op.name);
        }
    }

    #[test]
    fn test_every_mutating_operation_requires_confirmation() {
        for op in commerce_operations() {
            if !op.read_only {
                assert!(op.requires_confirmation, "{} must be confirmed", op.name);
            }
        }
        let registry = commerce_registry().unwrap();
        assert!(registry.describe(UPDATE_CART_ITEM).unwrap().requires_confirmation);
        assert!(registry.describe(PROCEED_TO_CHECKOUT).unwrap().requires_confirmation);
        assert!(!registry.describe(GET_CART).unwrap().requires_confirmation);
    }

    #[tokio::test]
    async fn test_search_price_range_is_inclusive() {
        let h = Harness::new();
        let result = h
            .read(SEARCH_PRODUCTS, json!({"min_price": 10, "max_price": 20}))
            .await;
        assert!(result.is_ok());
        let data = payload(&result);
        let products = data["products"].as_array().unwrap();
        assert_eq!(products.len(), 2);
        for p in products {
            let price: Decimal = p["price"]["amount"].as_str().unwrap().parse().unwrap();
            assert!(price >= Decimal::from(10) && price <= Decimal::from(20));
        }
    }

    #[tokio::test]
    async fn test_search_fractional_bounds_are_not_widened() {
        let h = Harness::new();
        let above = h.read(SEARCH_PRODUCTS, json!({"min_price": 12.004})).await;
        let above_payload = payload(&above);
        let names: Vec<&str> = above_payload["products"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["name"].as_str().unwrap())
            .collect();
        assert!(!names.contains(&"Blue Mug"));
        assert!(names.contains(&"Red Mug"));

        let below = h.read(SEARCH_PRODUCTS, json!({"max_price": 8.496})).await;
        assert_eq!(payload(&below)["products"].as_array().unwrap().len(), 0);

        let exact = h.read(SEARCH_PRODUCTS, json!({"max_price": 8.5})).await;
        assert_eq!(payload(&exact)["products"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_search_summary_flags_out_of_stock() {
        let h = Harness::new();
        let result = h.read(SEARCH_PRODUCTS, json!({"query": "gift"})).await;
        let summary = result.content().first().unwrap().as_text();
        assert!(summary.starts_with("Found 1 products. Showing 1."));
        assert!(summary.contains("- Gift Box: $45.00 (ID: 13) [OUT OF STOCK]"));
    }

    #[tokio::test]
    async fn test_search_rejects_inverted_price_range() {
        let h = Harness::new();
        let result = h
            .read(SEARCH_PRODUCTS, json!({"min_price": 30, "max_price": 20}))
            .await;
        assert_eq!(result.error_kind(), Some(ErrorKind::InvalidArguments));
    }

    #[tokio::test]
    async fn test_search_limit_applies_after_total() {
        let h = Harness::new();
        let result = h.read(SEARCH_PRODUCTS, json!({"limit": 2})).await;
        let data = payload(&result);
        assert_eq!(data["total"], 4);
        assert_eq!(data["products"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_get_product_unknown() {
        let h = Harness::new();
        let result = h.read(GET_PRODUCT, json!({"product_id": 999})).await;
        assert!(!result.is_ok());
        assert_eq!(result.error_kind(), Some(ErrorKind::NotFound));
        assert!(result.error_message().unwrap().contains("not found"));
    }

    #[tokio::test]
    async fn test_get_product_details() {
        let h = Harness::new();
        let result = h.read(GET_PRODUCT, json!({"product_id": 11})).await;
        let text = result.content().first().unwrap().as_text();
        assert!(text.contains("Product: Red Mug"));
        assert!(text.contains("on sale"));
        assert_eq!(payload(&result)["product"]["id"], 11);
    }

    #[tokio::test]
    async fn test_get_categories_lists_only_non_empty() {
        let h = Harness::new();
        let result = h.read(GET_CATEGORIES, json!({})).await;
        let data = payload(&result);
        let slugs: Vec<&str> = data["categories"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["slug"].as_str().unwrap())
            .collect();
        assert_eq!(slugs, vec!["mugs", "tea"]);
    }

    #[tokio::test]
    async fn test_get_categories_on_empty_catalog() {
        let h = Harness::with_seed("products: []");
        let result = h.read(GET_CATEGORIES, json!({})).await;
        assert!(result.is_ok());
        assert_eq!(payload(&result), json!({"categories": []}));
    }

    #[tokio::test]
    async fn test_add_to_cart_declined_never_touches_cart() {
        let h = Harness::new();
        let result = h
            .read(ADD_TO_CART, json!({"product_id": 10, "quantity": 2}))
            .await;
        assert_eq!(result.error_kind(), Some(ErrorKind::Cancelled));
        assert_eq!(result.error_message(), Some("cancelled by user"));
        assert_eq!(h.commerce.adds.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_add_to_cart_unknown_product_fails_before_confirmation() {
        let h = Harness::new();
        // Declining gate: a NotFound (not Cancelled) proves the lookup ran first.
        let result = h.read(ADD_TO_CART, json!({"product_id": 999})).await;
        assert_eq!(result.error_kind(), Some(ErrorKind::NotFound));
        assert_eq!(h.commerce.adds.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_add_to_cart_rejects_zero_quantity() {
        let h = Harness::new();
        let result = h
            .approve(ADD_TO_CART, json!({"product_id": 10, "quantity": 0}))
            .await;
        assert_eq!(result.error_kind(), Some(ErrorKind::InvalidArguments));
        assert_eq!(h.commerce.adds.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_huge_quantities_leave_cart_usable() {
        let h = Harness::new();
        for product_id in [11, 12] {
            let arguments = json!({"product_id": product_id, "quantity": 3_000_000_000_u64});
            let result = h.approve(ADD_TO_CART, arguments).await;
            assert_eq!(result.error_kind(), Some(ErrorKind::InvalidArguments));
        }
        assert_eq!(h.commerce.adds.load(Ordering::SeqCst), 0);

        let added = h
            .approve(ADD_TO_CART, json!({"product_id": 11, "quantity": MAX_LINE_QUANTITY}))
            .await;
        assert!(added.is_ok());
        let again = h.approve(ADD_TO_CART, json!({"product_id": 11})).await;
        assert_eq!(again.error_kind(), Some(ErrorKind::CollaboratorFailure));

        let key = payload(&added)["cart_item_key"].as_str().unwrap().to_string();
        let arguments = json!({"cart_item_key": key, "quantity": 3_000_000_000_u64});
        let update = h.approve(UPDATE_CART_ITEM, arguments).await;
        assert_eq!(update.error_kind(), Some(ErrorKind::InvalidArguments));

        let cart = h.read(GET_CART, json!({})).await;
        assert!(cart.is_ok());
        assert_eq!(payload(&cart)["cart"]["item_count"], MAX_LINE_QUANTITY);
        assert!(h.approve(PROCEED_TO_CHECKOUT, json!({})).await.is_ok());
    }

    #[tokio::test]
    async fn test_add_to_cart_approved() {
        let h = Harness::new();
        let result = h
            .approve(ADD_TO_CART, json!({"product_id": 10, "quantity": 2}))
            .await;
        assert!(result.is_ok());
        let data = payload(&result);
        assert!(data["cart_item_key"].as_str().is_some());
        assert_eq!(data["cart"]["item_count"], 2);
        assert_eq!(h.commerce.adds.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_get_cart_empty_and_idempotent() {
        let h = Harness::new();
        let first = h.read(GET_CART, json!({})).await;
        assert!(first.is_ok());
        assert_eq!(first.content().first().unwrap().as_text(), "The cart is empty.");

        h.approve(ADD_TO_CART, json!({"product_id": 12})).await;
        let a = h.read(GET_CART, json!({})).await;
        let b = h.read(GET_CART, json!({})).await;
        assert_eq!(payload(&a), payload(&b));
    }

    #[tokio::test]
    async fn test_remove_from_cart_removes_line() {
        let h = Harness::new();
        let added = h.approve(ADD_TO_CART, json!({"product_id": 10})).await;
        let key = payload(&added)["cart_item_key"].as_str().unwrap().to_string();

        let result = h.approve(REMOVE_FROM_CART, json!({"cart_item_key": key})).await;
        assert!(result.is_ok());

        let cart = payload(&h.read(GET_CART, json!({})).await);
        let keys: Vec<&str> = cart["cart"]["items"]
            .as_array()
            .unwrap()
            .iter()
            .map(|line| line["line_key"].as_str().unwrap())
            .collect();
        assert!(!keys.contains(&key.as_str()));
    }

    #[tokio::test]
    async fn test_remove_unknown_line_is_not_found_without_prompt() {
        let h = Harness::new();
        let result = h.read(REMOVE_FROM_CART, json!({"cart_item_key": "abc"})).await;
        assert_eq!(result.error_kind(), Some(ErrorKind::NotFound));
        assert_eq!(h.commerce.removes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_update_cart_item_to_zero_removes_line() {
        let h = Harness::new();
        let added = h.approve(ADD_TO_CART, json!({"product_id": 10, "quantity": 3})).await;
        let key = payload(&added)["cart_item_key"].as_str().unwrap().to_string();

        let updated = h
            .approve(UPDATE_CART_ITEM, json!({"cart_item_key": key, "quantity": 1}))
            .await;
        assert_eq!(payload(&updated)["cart"]["item_count"], 1);

        let removed = h
            .approve(UPDATE_CART_ITEM, json!({"cart_item_key": key, "quantity": 0}))
            .await;
        assert!(removed.is_ok());
        assert_eq!(payload(&removed)["cart"]["item_count"], 0);
    }

    #[tokio::test]
    async fn test_update_cart_item_declined_keeps_quantity() {
        let h = Harness::new();
        let added = h.approve(ADD_TO_CART, json!({"product_id": 10, "quantity": 3})).await;
        let key = payload(&added)["cart_item_key"].as_str().unwrap().to_string();

        let result = h
            .read(UPDATE_CART_ITEM, json!({"cart_item_key": key, "quantity": 1}))
            .await;
        assert_eq!(result.error_kind(), Some(ErrorKind::Cancelled));
        let cart = payload(&h.read(GET_CART, json!({})).await);
        assert_eq!(cart["cart"]["item_count"], 3);
    }

    #[tokio::test]
    async fn test_checkout_empty_cart_finishes_without_confirmation() {
        let h = Harness::new();
        // Declining gate would yield Cancelled if confirmation were requested.
        let result = h.read(PROCEED_TO_CHECKOUT, json!({})).await;
        assert!(result.is_ok());
        assert!(result.text().contains("The cart is empty"));
    }

    #[tokio::test]
    async fn test_checkout_returns_url_after_approval() {
        let h = Harness::new();
        h.approve(ADD_TO_CART, json!({"product_id": 12, "quantity": 2})).await;

        let declined = h.read(PROCEED_TO_CHECKOUT, json!({})).await;
        assert_eq!(declined.error_kind(), Some(ErrorKind::Cancelled));

        let result = h.approve(PROCEED_TO_CHECKOUT, json!({})).await;
        assert!(result.is_ok());
        let data = payload(&result);
        assert_eq!(data["checkout_url"], "http://shop.test/checkout");
        assert_eq!(data["cart"]["item_count"], 2);
    }

    #[test]
    fn test_cart_totals_wording() {
        let cart = Cart::empty(CurrencyCode::USD);
        assert_eq!(cart_totals(&cart), "0 items, total $0.00");
    }
}
