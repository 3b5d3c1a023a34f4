//! In-memory commerce engine.
//!
//! Serves a read-only catalog loaded from a seed file and keeps one cart per
//! session in a `moka` cache. Carts that sit idle past the expiry are
//! dropped, matching the session cookie lifetime.

mod catalog;

pub use catalog::{CatalogError, CatalogSeed, CategorySeed, ProductSeed};

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use tokio::sync::Mutex;
use tracing::{debug, instrument};
use uuid::Uuid;
use webmcp_core::{
    Cart, CartLine, CategorySummary, CurrencyCode, LineKey, MAX_LINE_QUANTITY, Product, ProductId,
    SearchPage, SearchQuery, SessionId,
};

use crate::adapter::CommerceAdapter;
use crate::context::SessionContext;
use crate::error::CommerceError;
use catalog::Catalog;

/// Idle time after which an untouched cart is discarded.
pub const CART_IDLE_EXPIRY: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Upper bound on concurrently held carts.
const MAX_CARTS: u64 = 10_000;

#[derive(Debug, Clone)]
struct StoredLine {
    key: LineKey,
    product_id: ProductId,
    quantity: u32,
}

type CartLines = Arc<Mutex<Vec<StoredLine>>>;

/// Catalog and carts held in process memory.
#[derive(Clone)]
pub struct MemoryCommerce {
    inner: Arc<MemoryCommerceInner>,
}

struct MemoryCommerceInner {
    catalog: Catalog,
    carts: Cache<SessionId, CartLines>,
    checkout_url: String,
}

impl MemoryCommerce {
    /// Build from a parsed seed.
    ///
    /// `base_url` prefixes generated product permalinks.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Invalid`] if the seed fails validation.
    pub fn from_seed(
        seed: CatalogSeed,
        base_url: &str,
        checkout_url: impl Into<String>,
    ) -> Result<Self, CatalogError> {
        let catalog = Catalog::build(seed, base_url)?;
        Ok(Self::with_catalog(catalog, checkout_url.into()))
    }

    /// Load and build from a seed file.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if the file cannot be read, parsed or
    /// validated.
    pub fn from_path(
        path: impl AsRef<Path>,
        base_url: &str,
        checkout_url: impl Into<String>,
    ) -> Result<Self, CatalogError> {
        Self::from_seed(CatalogSeed::from_path(path)?, base_url, checkout_url)
    }

    /// A store with no products.
    #[must_use]
    pub fn empty(currency: CurrencyCode, checkout_url: impl Into<String>) -> Self {
        let catalog = Catalog {
            currency,
            ..Catalog::default()
        };
        Self::with_catalog(catalog, checkout_url.into())
    }

    fn with_catalog(catalog: Catalog, checkout_url: String) -> Self {
        let carts = Cache::builder()
            .max_capacity(MAX_CARTS)
            .time_to_idle(CART_IDLE_EXPIRY)
            .build();
        Self {
            inner: Arc::new(MemoryCommerceInner {
                catalog,
                carts,
                checkout_url,
            }),
        }
    }

    #[must_use]
    pub fn currency(&self) -> CurrencyCode {
        self.inner.catalog.currency
    }

    #[must_use]
    pub fn product_count(&self) -> usize {
        self.inner.catalog.products.len()
    }

    fn product(&self, id: ProductId) -> Result<&Product, CommerceError> {
        self.inner
            .catalog
            .products
            .get(&id)
            .ok_or_else(|| CommerceError::product_not_found(id))
    }

    async fn cart_lines(&self, session: &SessionContext) -> CartLines {
        self.inner
            .carts
            .get_with(session.session_id.clone(), async {
                Arc::new(Mutex::new(Vec::new()))
            })
            .await
    }

    fn snapshot(&self, lines: &[StoredLine]) -> Result<Cart, CommerceError> {
        let currency = self.inner.catalog.currency;
        let mut items = Vec::with_capacity(lines.len());
        for line in lines {
            let Some(product) = self.inner.catalog.products.get(&line.product_id) else {
                continue;
            };
            let line_total = product
                .price
                .checked_times(line.quantity)
                .ok_or_else(total_too_large)?;
            items.push(CartLine {
                line_key: line.key.clone(),
                product_id: line.product_id,
                name: product.name.clone(),
                quantity: line.quantity,
                unit_price: product.price.amount,
                line_total: line_total.amount,
                image: product.image.clone(),
            });
        }
        Cart::from_lines(items, currency).ok_or_else(total_too_large)
    }

    /// Replace a cart's lines once the candidate prices cleanly.
    fn commit(
        &self,
        lines: &mut Vec<StoredLine>,
        candidate: Vec<StoredLine>,
    ) -> Result<(), CommerceError> {
        self.snapshot(&candidate)?;
        *lines = candidate;
        Ok(())
    }
}

fn total_too_large() -> CommerceError {
    CommerceError::Rejected("cart total is too large".to_string())
}

/// Refuse quantities above the per-line limit.
fn check_line_quantity(quantity: u32) -> Result<(), CommerceError> {
    if quantity > MAX_LINE_QUANTITY {
        return Err(CommerceError::Rejected(format!(
            "quantity must be at most {MAX_LINE_QUANTITY}"
        )));
    }
    Ok(())
}

/// Refuse quantities the product cannot supply.
fn check_stock(product: &Product, quantity: u32) -> Result<(), CommerceError> {
    if !product.in_stock {
        return Err(CommerceError::Rejected(format!(
            "\"{}\" is out of stock",
            product.name
        )));
    }
    match product.stock_quantity {
        Some(available) if quantity > available => Err(CommerceError::Rejected(format!(
            "only {available} of \"{}\" available",
            product.name
        ))),
        _ => Ok(()),
    }
}

fn new_line_key() -> Result<LineKey, CommerceError> {
    LineKey::parse(Uuid::new_v4().simple().to_string())
        .map_err(|e| CommerceError::Rejected(e.to_string()))
}

#[async_trait]
impl CommerceAdapter for MemoryCommerce {
    #[instrument(skip(self))]
    async fn search_catalog(&self, query: &SearchQuery) -> Result<SearchPage, CommerceError> {
        let needle = query
            .text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase);

        let matches: Vec<&Product> = self
            .inner
            .catalog
            .products
            .values()
            .filter(|p| {
                needle.as_deref().is_none_or(|needle| {
                    [&p.name, &p.short_description, &p.description, &p.slug]
                        .iter()
                        .any(|field| field.to_lowercase().contains(needle))
                })
            })
            .filter(|p| {
                query
                    .category_slug
                    .as_deref()
                    .is_none_or(|slug| p.in_category(slug))
            })
            .filter(|p| query.price_matches(p.price.amount))
            .collect();

        let total = matches.len() as u64;
        let limit = usize::try_from(query.limit).unwrap_or(usize::MAX);
        let items = matches.into_iter().take(limit).map(Product::summary).collect();
        debug!(total, "Catalog search complete");

        Ok(SearchPage { items, total })
    }

    async fn get_product(&self, id: ProductId) -> Result<Product, CommerceError> {
        self.product(id).cloned()
    }

    async fn list_categories(&self) -> Result<Vec<CategorySummary>, CommerceError> {
        Ok(self.inner.catalog.categories.clone())
    }

    #[instrument(skip(self, session), fields(session = %session.session_id))]
    async fn add_to_cart(
        &self,
        session: &SessionContext,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<LineKey, CommerceError> {
        if quantity == 0 {
            return Err(CommerceError::Rejected(
                "quantity must be at least 1".to_string(),
            ));
        }
        let product = self.product(product_id)?;
        let cart = self.cart_lines(session).await;
        let mut lines = cart.lock().await;
        let mut candidate = lines.clone();

        if let Some(line) = candidate.iter_mut().find(|l| l.product_id == product_id) {
            let merged = line.quantity.saturating_add(quantity);
            check_line_quantity(merged)?;
            check_stock(product, merged)?;
            line.quantity = merged;
            let key = line.key.clone();
            self.commit(&mut lines, candidate)?;
            return Ok(key);
        }

        check_line_quantity(quantity)?;
        check_stock(product, quantity)?;
        let key = new_line_key()?;
        candidate.push(StoredLine {
            key: key.clone(),
            product_id,
            quantity,
        });
        self.commit(&mut lines, candidate)?;
        debug!(line_key = %key, "Cart line created");
        Ok(key)
    }

    async fn get_cart(&self, session: &SessionContext) -> Result<Cart, CommerceError> {
        let Some(cart) = self.inner.carts.get(&session.session_id).await else {
            return Ok(Cart::empty(self.inner.catalog.currency));
        };
        let lines = cart.lock().await;
        self.snapshot(&lines)
    }

    #[instrument(skip(self, session), fields(session = %session.session_id))]
    async fn set_line_quantity(
        &self,
        session: &SessionContext,
        key: &LineKey,
        quantity: u32,
    ) -> Result<bool, CommerceError> {
        let cart = self.cart_lines(session).await;
        let mut lines = cart.lock().await;

        let Some(position) = lines.iter().position(|l| &l.key == key) else {
            return Ok(false);
        };
        if quantity == 0 {
            lines.remove(position);
            return Ok(true);
        }

        check_line_quantity(quantity)?;
        let mut candidate = lines.clone();
        let Some(line) = candidate.get_mut(position) else {
            return Ok(false);
        };
        check_stock(self.product(line.product_id)?, quantity)?;
        line.quantity = quantity;
        self.commit(&mut lines, candidate)?;
        Ok(true)
    }

    #[instrument(skip(self, session), fields(session = %session.session_id))]
    async fn remove_line(
        &self,
        session: &SessionContext,
        key: &LineKey,
    ) -> Result<bool, CommerceError> {
        let cart = self.cart_lines(session).await;
        let mut lines = cart.lock().await;
        let before = lines.len();
        lines.retain(|l| &l.key != key);
        Ok(lines.len() != before)
    }

    async fn checkout_url(&self, _session: &SessionContext) -> Result<String, CommerceError> {
        Ok(self.inner.checkout_url.clone())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    const SEED: &str = r#"
categories:
  - { id: 1, name: Mugs, slug: mugs }
products:
  - { id: 1, name: Blue Mug, slug: blue-mug, regular_price: "12.00", stock_quantity: 3, categories: [mugs], description: "Glazed stoneware" }
  - { id: 2, name: Tea Towel, slug: tea-towel, regular_price: "6.00" }
  - { id: 3, name: Sold Out, slug: sold-out, regular_price: "1.00", in_stock: false }
"#;

    fn store() -> MemoryCommerce {
        MemoryCommerce::from_seed(
            CatalogSeed::from_yaml(SEED).unwrap(),
            "http://shop.test",
            "http://shop.test/checkout",
        )
        .unwrap()
    }

    fn session(id: &str) -> SessionContext {
        SessionContext::new(SessionId::parse(id).unwrap())
    }

    #[tokio::test]
    async fn test_search_matches_description_case_insensitively() {
        let store = store();
        let query = SearchQuery {
            text: Some("STONEWARE".to_string()),
            ..SearchQuery::default()
        };
        let page = store.search_catalog(&query).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items.first().unwrap().id, ProductId::new(1));
    }

    #[tokio::test]
    async fn test_empty_query_returns_everything() {
        let page = store().search_catalog(&SearchQuery::default()).await.unwrap();
        assert_eq!(page.total, 3);
    }

    #[tokio::test]
    async fn test_search_by_category() {
        let query = SearchQuery {
            category_slug: Some("mugs".to_string()),
            ..SearchQuery::default()
        };
        let page = store().search_catalog(&query).await.unwrap();
        assert_eq!(page.total, 1);
    }

    #[tokio::test]
    async fn test_add_same_product_merges_lines() {
        let store = store();
        let s = session("s1");
        let first = store.add_to_cart(&s, ProductId::new(2), 1).await.unwrap();
        let second = store.add_to_cart(&s, ProductId::new(2), 2).await.unwrap();
        assert_eq!(first, second);

        let cart = store.get_cart(&s).await.unwrap();
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.item_count, 3);
        assert_eq!(cart.total, Decimal::new(1800, 2));
    }

    #[tokio::test]
    async fn test_carts_are_isolated_per_session() {
        let store = store();
        store.add_to_cart(&session("a"), ProductId::new(2), 1).await.unwrap();
        assert!(store.get_cart(&session("b")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stock_limits_are_enforced() {
        let store = store();
        let s = session("s1");
        assert!(matches!(
            store.add_to_cart(&s, ProductId::new(3), 1).await,
            Err(CommerceError::Rejected(_))
        ));
        store.add_to_cart(&s, ProductId::new(1), 3).await.unwrap();
        assert!(matches!(
            store.add_to_cart(&s, ProductId::new(1), 1).await,
            Err(CommerceError::Rejected(_))
        ));
    }

    #[tokio::test]
    async fn test_unknown_product() {
        let err = store()
            .add_to_cart(&session("s1"), ProductId::new(99), 1)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "product 99 not found");
    }

    #[tokio::test]
    async fn test_set_quantity_and_remove() {
        let store = store();
        let s = session("s1");
        let key = store.add_to_cart(&s, ProductId::new(2), 1).await.unwrap();

        assert!(store.set_line_quantity(&s, &key, 4).await.unwrap());
        assert_eq!(store.get_cart(&s).await.unwrap().item_count, 4);

        assert!(store.set_line_quantity(&s, &key, 0).await.unwrap());
        assert!(store.get_cart(&s).await.unwrap().is_empty());

        let missing = LineKey::parse("abc").unwrap();
        assert!(!store.set_line_quantity(&s, &missing, 1).await.unwrap());
        assert!(!store.remove_line(&s, &missing).await.unwrap());
    }

    #[tokio::test]
    async fn test_line_quantity_limit() {
        let store = store();
        let s = session("s1");
        let err = store
            .add_to_cart(&s, ProductId::new(2), MAX_LINE_QUANTITY + 1)
            .await
            .unwrap_err();
        assert!(matches!(err, CommerceError::Rejected(_)));

        let key = store
            .add_to_cart(&s, ProductId::new(2), MAX_LINE_QUANTITY)
            .await
            .unwrap();
        assert!(store.add_to_cart(&s, ProductId::new(2), 1).await.is_err());
        assert!(store.set_line_quantity(&s, &key, u32::MAX).await.is_err());
        assert_eq!(
            store.get_cart(&s).await.unwrap().item_count,
            u64::from(MAX_LINE_QUANTITY)
        );
    }

    #[tokio::test]
    async fn test_overflowing_total_leaves_cart_untouched() {
        let store = MemoryCommerce::from_seed(
            CatalogSeed::from_yaml(
                r#"
products:
  - { id: 1, name: Yacht, slug: yacht, regular_price: "50000000000000000000000000000" }
  - { id: 2, name: Island, slug: island, regular_price: "50000000000000000000000000000" }
"#,
            )
            .unwrap(),
            "http://shop.test",
            "http://shop.test/checkout",
        )
        .unwrap();
        let s = session("s1");

        assert!(matches!(
            store.add_to_cart(&s, ProductId::new(1), 2).await,
            Err(CommerceError::Rejected(_))
        ));
        assert!(store.get_cart(&s).await.unwrap().is_empty());

        store.add_to_cart(&s, ProductId::new(1), 1).await.unwrap();
        assert!(matches!(
            store.add_to_cart(&s, ProductId::new(2), 1).await,
            Err(CommerceError::Rejected(_))
        ));
        let cart = store.get_cart(&s).await.unwrap();
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.item_count, 1);
    }

    #[tokio::test]
    async fn test_empty_store() {
        let store = MemoryCommerce::empty(CurrencyCode::GBP, "/checkout");
        assert!(store.list_categories().await.unwrap().is_empty());
        let cart = store.get_cart(&session("s1")).await.unwrap();
        assert_eq!(cart.currency_symbol, "£");
        assert_eq!(store.product_count(), 0);
    }
}
