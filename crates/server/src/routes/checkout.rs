//! Checkout route handler.

use axum::{Json, extract::State};
use tracing::instrument;
use webmcp_tools::rest::CheckoutResponse;

use crate::error::Result;
use crate::middleware::ShopSession;
use crate::state::AppState;

/// Checkout link for the session's cart, with the cart it would buy.
#[instrument(skip(state, session), fields(session = %session.session_id))]
pub async fn url(
    State(state): State<AppState>,
    ShopSession(session): ShopSession,
) -> Result<Json<CheckoutResponse>> {
    let commerce = state.commerce();
    let cart = commerce.get_cart(&session).await?;
    let checkout_url = commerce.checkout_url(&session).await?;

    Ok(Json(CheckoutResponse {
        success: true,
        checkout_url,
        cart,
    }))
}
