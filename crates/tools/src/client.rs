//! [`CommerceAdapter`] over the REST catalog and cart API.
//!
//! The server binds carts to a session cookie. Each [`SessionContext`] gets
//! its own HTTP client and cookie store, so one adapter serves any number of
//! independent carts. Catalog calls share a cookieless client.

use std::sync::Arc;

use async_trait::async_trait;
use moka::future::Cache;
use reqwest::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;
use webmcp_core::{
    Cart, CategorySummary, LineKey, Product, ProductId, SearchPage, SearchQuery, SessionId,
};

use crate::adapter::CommerceAdapter;
use crate::context::SessionContext;
use crate::error::CommerceError;
use crate::memory::CART_IDLE_EXPIRY;
use crate::rest::{
    API_NAMESPACE, AddToCartBody, CartMutationResponse, CartResponse, CategoriesResponse,
    CheckoutResponse, ErrorBody, ProductResponse, RemoveCartBody, SearchParams, SearchResponse,
    UpdateCartBody,
};

/// Upper bound on sessions holding a cookie store at once.
const MAX_SESSIONS: u64 = 10_000;

/// HTTP client for a running shop server.
#[derive(Clone)]
pub struct RestCommerceClient {
    inner: Arc<RestCommerceClientInner>,
}

struct RestCommerceClientInner {
    catalog: reqwest::Client,
    sessions: Cache<SessionId, reqwest::Client>,
    /// `{server}/webmcp/v1`
    api_base: String,
}

impl RestCommerceClient {
    /// Create a client for the server at `base_url` (e.g., `http://localhost:3000`).
    ///
    /// # Errors
    ///
    /// Returns [`CommerceError::Unavailable`] if the URL is invalid or the
    /// HTTP client cannot be built.
    pub fn new(base_url: &str) -> Result<Self, CommerceError> {
        let url = Url::parse(base_url)
            .map_err(|e| CommerceError::Unavailable(format!("invalid server URL: {e}")))?;
        let sessions = Cache::builder()
            .max_capacity(MAX_SESSIONS)
            .time_to_idle(CART_IDLE_EXPIRY)
            .build();

        Ok(Self {
            inner: Arc::new(RestCommerceClientInner {
                catalog: build_client(false)?,
                sessions,
                api_base: format!(
                    "{}{API_NAMESPACE}",
                    url.as_str().trim_end_matches('/')
                ),
            }),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.inner.api_base)
    }

    /// The cookie-carrying client bound to `session`, created on first use.
    async fn session_client(
        &self,
        session: &SessionContext,
    ) -> Result<reqwest::Client, CommerceError> {
        self.inner
            .sessions
            .try_get_with(session.session_id.clone(), async { build_client(true) })
            .await
            .map_err(|e| CommerceError::Unavailable(e.to_string()))
    }

    async fn get<T: DeserializeOwned>(
        &self,
        client: &reqwest::Client,
        path: &str,
        not_found: impl FnOnce() -> CommerceError,
    ) -> Result<T, CommerceError> {
        let response = client.get(self.url(path)).send().await?;
        decode(response, not_found).await
    }

    async fn post<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        session: &SessionContext,
        path: &str,
        body: &B,
        not_found: impl FnOnce() -> CommerceError,
    ) -> Result<T, CommerceError> {
        let response = self
            .session_client(session)
            .await?
            .post(self.url(path))
            .json(body)
            .send()
            .await?;
        decode(response, not_found).await
    }
}

fn build_client(cookies: bool) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .cookie_store(cookies)
        .user_agent(concat!("webmcp/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Decode a success body, or translate the status and error body.
async fn decode<T: DeserializeOwned>(
    response: reqwest::Response,
    not_found: impl FnOnce() -> CommerceError,
) -> Result<T, CommerceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }

    if status == StatusCode::NOT_FOUND {
        return Err(not_found());
    }

    let message = response
        .json::<ErrorBody>()
        .await
        .map_or_else(|_| status.to_string(), |body| body.message);
    debug!(%status, %message, "Request rejected");
    if status.is_server_error() {
        Err(CommerceError::Unavailable(message))
    } else {
        Err(CommerceError::Rejected(message))
    }
}

/// Treat a missing cart line as `false` instead of an error.
fn line_missing_is_false<T>(result: Result<T, CommerceError>) -> Result<bool, CommerceError> {
    match result {
        Ok(_) => Ok(true),
        Err(CommerceError::NotFound { .. }) => Ok(false),
        Err(e) => Err(e),
    }
}

#[async_trait]
impl CommerceAdapter for RestCommerceClient {
    #[instrument(skip(self))]
    async fn search_catalog(&self, query: &SearchQuery) -> Result<SearchPage, CommerceError> {
        let params = SearchParams {
            query: query.text.clone(),
            category: query.category_slug.clone(),
            min_price: query.min_price,
            max_price: query.max_price,
            limit: Some(query.limit),
        };
        let response = self
            .inner
            .catalog
            .get(self.url("products/search"))
            .query(&params)
            .send()
            .await?;
        let body: SearchResponse = decode(response, || {
            CommerceError::Rejected("search endpoint not found".to_string())
        })
        .await?;
        Ok(SearchPage {
            items: body.products,
            total: body.total,
        })
    }

    #[instrument(skip(self))]
    async fn get_product(&self, id: ProductId) -> Result<Product, CommerceError> {
        let body: ProductResponse = self
            .get(&self.inner.catalog, &format!("products/{id}"), || {
                CommerceError::product_not_found(id)
            })
            .await?;
        Ok(body.product)
    }

    async fn list_categories(&self) -> Result<Vec<CategorySummary>, CommerceError> {
        let body: CategoriesResponse = self
            .get(&self.inner.catalog, "products/categories", || {
                CommerceError::Rejected("categories endpoint not found".to_string())
            })
            .await?;
        Ok(body.categories)
    }

    #[instrument(skip(self, session), fields(session = %session.session_id))]
    async fn add_to_cart(
        &self,
        session: &SessionContext,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<LineKey, CommerceError> {
        let body: CartMutationResponse = self
            .post(
                session,
                "cart/add",
                &AddToCartBody {
                    product_id,
                    quantity,
                },
                || CommerceError::product_not_found(product_id),
            )
            .await?;
        body.cart_item_key
            .ok_or_else(|| CommerceError::Decode("cart/add response lacks cart_item_key".into()))
    }

    async fn get_cart(&self, session: &SessionContext) -> Result<Cart, CommerceError> {
        let client = self.session_client(session).await?;
        let body: CartResponse = self
            .get(&client, "cart", || {
                CommerceError::Rejected("cart endpoint not found".to_string())
            })
            .await?;
        Ok(body.cart)
    }

    #[instrument(skip(self, session), fields(session = %session.session_id))]
    async fn set_line_quantity(
        &self,
        session: &SessionContext,
        key: &LineKey,
        quantity: u32,
    ) -> Result<bool, CommerceError> {
        let body = UpdateCartBody {
            cart_item_key: key.clone(),
            quantity,
        };
        line_missing_is_false(
            self.post::<_, CartMutationResponse>(session, "cart/update", &body, || {
                CommerceError::cart_item_not_found(key)
            })
            .await,
        )
    }

    #[instrument(skip(self, session), fields(session = %session.session_id))]
    async fn remove_line(
        &self,
        session: &SessionContext,
        key: &LineKey,
    ) -> Result<bool, CommerceError> {
        let body = RemoveCartBody {
            cart_item_key: key.clone(),
        };
        line_missing_is_false(
            self.post::<_, CartMutationResponse>(session, "cart/remove", &body, || {
                CommerceError::cart_item_not_found(key)
            })
            .await,
        )
    }

    async fn checkout_url(&self, session: &SessionContext) -> Result<String, CommerceError> {
        let client = self.session_client(session).await?;
        let body: CheckoutResponse = self
            .get(&client, "checkout/url", || {
                CommerceError::Rejected("checkout endpoint not found".to_string())
            })
            .await?;
        Ok(body.checkout_url)
    }
}
