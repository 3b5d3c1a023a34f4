//! Contract between the commerce operations and whatever store backs them.

use async_trait::async_trait;
use webmcp_core::{Cart, CategorySummary, LineKey, Product, ProductId, SearchPage, SearchQuery};

use crate::context::SessionContext;
use crate::error::CommerceError;

/// Catalog, cart and checkout collaborator.
///
/// Cart methods act on the cart bound to the caller's session. Implementations
/// must be safe to share across concurrently running sessions.
#[async_trait]
pub trait CommerceAdapter: Send + Sync {
    /// Search the catalog. `total` counts every match before the page limit.
    async fn search_catalog(&self, query: &SearchQuery) -> Result<SearchPage, CommerceError>;

    /// Fetch one product.
    async fn get_product(&self, id: ProductId) -> Result<Product, CommerceError>;

    /// Categories holding at least one product.
    async fn list_categories(&self) -> Result<Vec<CategorySummary>, CommerceError>;

    /// Add a product to the session's cart, returning the line it landed on.
    async fn add_to_cart(
        &self,
        session: &SessionContext,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<LineKey, CommerceError>;

    /// Current contents of the session's cart.
    async fn get_cart(&self, session: &SessionContext) -> Result<Cart, CommerceError>;

    /// Set a line's quantity; zero removes the line. Returns `false` when the
    /// line does not exist.
    async fn set_line_quantity(
        &self,
        session: &SessionContext,
        key: &LineKey,
        quantity: u32,
    ) -> Result<bool, CommerceError>;

    /// Remove a line. Returns `false` when the line does not exist.
    async fn remove_line(&self, session: &SessionContext, key: &LineKey)
    -> Result<bool, CommerceError>;

    /// Where the session's owner completes the purchase.
    async fn checkout_url(&self, session: &SessionContext) -> Result<String, CommerceError>;
}
