//! Session layer and the session extractor.
//!
//! Each browser or agent host gets a session cookie; the session carries an
//! opaque id that keys the cart and scopes pending confirmations.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::{Expiry, MemoryStore, Session, SessionManagerLayer};
use uuid::Uuid;
use webmcp_core::SessionId;
use webmcp_tools::SessionContext;

use crate::config::ServerConfig;
use crate::error::AppError;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "webmcp_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Session key holding the shop session id.
const SESSION_ID_KEY: &str = "shop_session_id";

/// Create the session layer with an in-memory store.
#[must_use]
pub fn create_session_layer(config: &ServerConfig) -> SessionManagerLayer<MemoryStore> {
    SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

/// Extractor yielding the caller's [`SessionContext`], creating a shop
/// session id on first use.
///
/// # Example
///
/// ```rust,ignore
/// async fn show_cart(ShopSession(session): ShopSession) -> impl IntoResponse {
///     format!("session {}", session.session_id)
/// }
/// ```
pub struct ShopSession(pub SessionContext);

impl<S> FromRequestParts<S> for ShopSession
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Internal("session layer missing".to_string()))?;

        if let Some(id) = session.get::<SessionId>(SESSION_ID_KEY).await? {
            return Ok(Self(SessionContext::new(id)));
        }

        let id = SessionId::parse(Uuid::new_v4().simple().to_string())
            .map_err(|e| AppError::Internal(e.to_string()))?;
        session.insert(SESSION_ID_KEY, &id).await?;
        tracing::debug!(session = %id, "New shop session");
        Ok(Self(SessionContext::new(id)))
    }
}
