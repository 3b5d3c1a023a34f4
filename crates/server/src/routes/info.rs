//! Shop and tool overview for agent hosts.

use axum::{Json, extract::State};
use serde::Serialize;
use webmcp_tools::rest::API_NAMESPACE;

use crate::error::Result;
use crate::middleware::ShopSession;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct InfoResponse {
    pub success: bool,
    pub shop_name: String,
    pub shop_url: String,
    pub currency: String,
    pub currency_symbol: String,
    pub rest_url: String,
    pub tools_enabled: bool,
    pub tools: Vec<String>,
}

/// Describe the shop and the operations it exposes.
pub async fn show(
    State(state): State<AppState>,
    ShopSession(session): ShopSession,
) -> Result<Json<InfoResponse>> {
    let config = state.config();
    // The cart reports the store currency, even when empty.
    let cart = state.commerce().get_cart(&session).await?;

    Ok(Json(InfoResponse {
        success: true,
        shop_name: config.shop_name.clone(),
        shop_url: config.public_url().to_string(),
        currency: cart.currency.code().to_string(),
        currency_symbol: cart.currency_symbol,
        rest_url: format!("{}{API_NAMESPACE}", config.public_url()),
        tools_enabled: config.tools_enabled,
        tools: state
            .dispatcher()
            .registry()
            .names()
            .into_iter()
            .map(str::to_string)
            .collect(),
    }))
}
