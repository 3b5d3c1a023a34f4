//! Wire types of the REST catalog and cart API.
//!
//! Shared by the HTTP server and [`RestCommerceClient`](crate::client::RestCommerceClient)
//! so both sides agree on shapes.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use webmcp_core::{Cart, CategorySummary, LineKey, Product, ProductId, ProductSummary};

/// Path prefix of every REST and tool route.
pub const API_NAMESPACE: &str = "/webmcp/v1";

/// Error codes carried in [`ErrorBody::code`].
pub mod codes {
    pub const PRODUCT_NOT_FOUND: &str = "product_not_found";
    pub const CART_ITEM_NOT_FOUND: &str = "cart_item_not_found";
    pub const OPERATION_NOT_FOUND: &str = "operation_not_found";
    pub const CONFIRMATION_NOT_FOUND: &str = "confirmation_not_found";
    pub const CART_ERROR: &str = "cart_error";
    pub const BAD_REQUEST: &str = "bad_request";
    pub const INTERNAL_ERROR: &str = "internal_error";
}

/// Query string of `GET products/search`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub success: bool,
    pub products: Vec<ProductSummary>,
    pub total: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductResponse {
    pub success: bool,
    pub product: Product,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoriesResponse {
    pub success: bool,
    pub categories: Vec<CategorySummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartResponse {
    pub success: bool,
    pub cart: Cart,
}

/// Body of `POST cart/add`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddToCartBody {
    pub product_id: ProductId,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

const fn default_quantity() -> u32 {
    1
}

/// Body of `POST cart/update`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateCartBody {
    pub cart_item_key: LineKey,
    pub quantity: u32,
}

/// Body of `POST cart/remove`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveCartBody {
    pub cart_item_key: LineKey,
}

/// Response of the cart mutation endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartMutationResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cart_item_key: Option<LineKey>,
    pub cart: Cart,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutResponse {
    pub success: bool,
    pub checkout_url: String,
    pub cart: Cart,
}

/// Body of every non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_add_body_defaults_quantity() {
        let body: AddToCartBody = serde_json::from_value(json!({"product_id": 4})).unwrap();
        assert_eq!(body.quantity, 1);
    }

    #[test]
    fn test_update_body_rejects_empty_key() {
        let body = serde_json::from_value::<UpdateCartBody>(
            json!({"cart_item_key": "", "quantity": 1}),
        );
        assert!(body.is_err());
    }

    #[test]
    fn test_search_params_skip_absent_fields() {
        let params = SearchParams {
            query: Some("mug".to_string()),
            ..SearchParams::default()
        };
        assert_eq!(serde_json::to_value(&params).unwrap(), json!({"query": "mug"}));
    }
}
