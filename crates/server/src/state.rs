//! Application state shared across handlers.

use std::sync::Arc;

use webmcp_tools::{
    CommerceAdapter, CommerceTools, Dispatcher, RegistryError, commerce_registry,
};

use crate::config::ServerConfig;
use crate::services::ConfirmationQueue;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    commerce: Arc<dyn CommerceAdapter>,
    dispatcher: Dispatcher,
    confirmations: ConfirmationQueue,
}

impl AppState {
    /// Create the application state around a commerce backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the operation registry cannot be built.
    pub fn new(
        config: ServerConfig,
        commerce: Arc<dyn CommerceAdapter>,
    ) -> Result<Self, RegistryError> {
        let registry = Arc::new(commerce_registry()?);
        let handler = Arc::new(CommerceTools::new(Arc::clone(&commerce)));
        let dispatcher = Dispatcher::new(registry, handler)
            .with_confirmation_timeout(config.confirmation_timeout);
        let confirmations = ConfirmationQueue::new(config.confirmation_timeout);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                commerce,
                dispatcher,
                confirmations,
            }),
        })
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get the commerce backend.
    #[must_use]
    pub fn commerce(&self) -> &dyn CommerceAdapter {
        self.inner.commerce.as_ref()
    }

    /// Get the invocation dispatcher.
    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.inner.dispatcher
    }

    /// Get the pending confirmation queue.
    #[must_use]
    pub fn confirmations(&self) -> &ConfirmationQueue {
        &self.inner.confirmations
    }
}
