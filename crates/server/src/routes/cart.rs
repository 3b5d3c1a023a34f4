//! Cart route handlers.
//!
//! The cart is the one bound to the caller's session cookie.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use tracing::instrument;
use webmcp_core::MAX_LINE_QUANTITY;
use webmcp_tools::CommerceError;
use webmcp_tools::rest::{
    AddToCartBody, CartMutationResponse, CartResponse, RemoveCartBody, UpdateCartBody,
};

use crate::error::{AppError, Result};
use crate::middleware::ShopSession;
use crate::state::AppState;

/// Show the current cart.
#[instrument(skip(state, session), fields(session = %session.session_id))]
pub async fn show(
    State(state): State<AppState>,
    ShopSession(session): ShopSession,
) -> Result<Json<CartResponse>> {
    let cart = state.commerce().get_cart(&session).await?;
    Ok(Json(CartResponse {
        success: true,
        cart,
    }))
}

/// Add a product to the cart.
#[instrument(skip(state, session, body), fields(session = %session.session_id))]
pub async fn add(
    State(state): State<AppState>,
    ShopSession(session): ShopSession,
    body: std::result::Result<Json<AddToCartBody>, JsonRejection>,
) -> Result<Json<CartMutationResponse>> {
    let Json(body) = body?;
    if body.quantity == 0 {
        return Err(AppError::BadRequest(
            "quantity must be at least 1".to_string(),
        ));
    }
    check_quantity_limit(body.quantity)?;

    let commerce = state.commerce();
    let product = commerce.get_product(body.product_id).await?;
    let key = commerce
        .add_to_cart(&session, body.product_id, body.quantity)
        .await?;
    let cart = commerce.get_cart(&session).await?;

    tracing::info!(product_id = %body.product_id, quantity = body.quantity, "Added to cart");
    Ok(Json(CartMutationResponse {
        success: true,
        message: format!("Added {} x \"{}\" to the cart.", body.quantity, product.name),
        cart_item_key: Some(key),
        cart,
    }))
}

/// Set a line's quantity. Zero removes the line.
#[instrument(skip(state, session, body), fields(session = %session.session_id))]
pub async fn update(
    State(state): State<AppState>,
    ShopSession(session): ShopSession,
    body: std::result::Result<Json<UpdateCartBody>, JsonRejection>,
) -> Result<Json<CartMutationResponse>> {
    let Json(body) = body?;
    check_quantity_limit(body.quantity)?;
    let commerce = state.commerce();

    if !commerce
        .set_line_quantity(&session, &body.cart_item_key, body.quantity)
        .await?
    {
        return Err(CommerceError::cart_item_not_found(&body.cart_item_key).into());
    }
    let cart = commerce.get_cart(&session).await?;

    let message = if body.quantity == 0 {
        "Item removed from the cart.".to_string()
    } else {
        format!("Quantity updated to {}.", body.quantity)
    };
    Ok(Json(CartMutationResponse {
        success: true,
        message,
        cart_item_key: None,
        cart,
    }))
}

/// Remove a line from the cart.
#[instrument(skip(state, session, body), fields(session = %session.session_id))]
pub async fn remove(
    State(state): State<AppState>,
    ShopSession(session): ShopSession,
    body: std::result::Result<Json<RemoveCartBody>, JsonRejection>,
) -> Result<Json<CartMutationResponse>> {
    let Json(body) = body?;
    let commerce = state.commerce();

    if !commerce.remove_line(&session, &body.cart_item_key).await? {
        return Err(CommerceError::cart_item_not_found(&body.cart_item_key).into());
    }
    let cart = commerce.get_cart(&session).await?;

    Ok(Json(CartMutationResponse {
        success: true,
        message: "Item removed from the cart.".to_string(),
        cart_item_key: None,
        cart,
    }))
}

fn check_quantity_limit(quantity: u32) -> Result<()> {
    if quantity > MAX_LINE_QUANTITY {
        return Err(AppError::BadRequest(format!(
            "quantity must be at most {MAX_LINE_QUANTITY}"
        )));
    }
    Ok(())
}
