//! CLI command implementations.

pub mod catalog;
pub mod invoke;
pub mod shell;
pub mod terminal;
pub mod tools;

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;
use webmcp_core::{KeyError, SessionId};
use webmcp_tools::{
    CatalogError, CommerceAdapter, CommerceError, CommerceTools, Dispatcher, ErrorKind,
    MemoryCommerce, RegistryError, RestCommerceClient, SessionContext, commerce_registry,
};

/// Server used when no backend flag is given.
const DEFAULT_SERVER_URL: &str = "http://localhost:3000";

/// Base URL for permalinks of a local catalog.
const LOCAL_BASE_URL: &str = "http://localhost:3000";

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Commerce(#[from] CommerceError),

    #[error("arguments must be JSON: {0}")]
    Arguments(#[from] serde_json::Error),

    #[error("terminal error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid session key: {0}")]
    Key(#[from] KeyError),

    #[error("unknown operation: {0}")]
    UnknownOperation(String),

    #[error("invocation failed ({kind:?})")]
    InvocationFailed { kind: ErrorKind },
}

/// Where operations get their catalog and cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    /// A running server, reached over its REST API.
    Server(String),
    /// A catalog file loaded into memory for this process.
    Catalog(PathBuf),
}

impl Backend {
    /// Resolve backend flags, falling back to `WEBMCP_SERVER_URL`.
    #[must_use]
    pub fn from_args(server: Option<String>, catalog: Option<PathBuf>) -> Self {
        match (server, catalog) {
            (_, Some(path)) => Self::Catalog(path),
            (Some(url), None) => Self::Server(url),
            (None, None) => Self::Server(
                std::env::var("WEBMCP_SERVER_URL")
                    .ok()
                    .filter(|v| !v.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string()),
            ),
        }
    }

    /// Build the commerce adapter.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded or the server URL is
    /// invalid.
    pub fn connect(&self) -> Result<Arc<dyn CommerceAdapter>, CliError> {
        match self {
            Self::Server(url) => {
                tracing::debug!(%url, "Using server backend");
                Ok(Arc::new(RestCommerceClient::new(url)?))
            }
            Self::Catalog(path) => {
                tracing::debug!(path = %path.display(), "Using local catalog");
                let checkout_url = format!("{LOCAL_BASE_URL}/checkout");
                Ok(Arc::new(MemoryCommerce::from_path(
                    path,
                    LOCAL_BASE_URL,
                    checkout_url,
                )?))
            }
        }
    }
}

/// Build a dispatcher over the commerce operations.
///
/// No confirmation timeout: the operator is at the terminal.
///
/// # Errors
///
/// Returns an error if the operation registry cannot be built.
pub fn dispatcher(commerce: Arc<dyn CommerceAdapter>) -> Result<Dispatcher, CliError> {
    let registry = Arc::new(commerce_registry()?);
    Ok(Dispatcher::new(registry, Arc::new(CommerceTools::new(commerce))))
}

/// A fresh session for one CLI run.
///
/// # Errors
///
/// Returns [`CliError::Key`] if the generated key is rejected.
pub fn new_session() -> Result<SessionContext, CliError> {
    let id = SessionId::parse(format!("cli-{}", Uuid::new_v4().simple()))?;
    Ok(SessionContext::new(id))
}
