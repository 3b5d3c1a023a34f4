//! WebMCP commerce server.
//!
//! Serves the REST catalog and cart API and the tool surface agents use to
//! discover and invoke commerce operations.
//!
//! # Architecture
//!
//! - Axum web framework, sessions via tower-sessions (in-memory store)
//! - Operation registry and dispatcher from `webmcp-tools`
//! - In-memory catalog seeded from `WEBMCP_CATALOG_PATH`
//! - Confirmations resolved over HTTP by the session's owner

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use webmcp_core::CurrencyCode;
use webmcp_server::config::ServerConfig;
use webmcp_server::state::AppState;
use webmcp_tools::MemoryCommerce;

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ServerConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            sample_rate: config.sentry_sample_rate,
            traces_sample_rate: config.sentry_traces_sample_rate,
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

/// Build the commerce backend from the configured catalog file.
fn load_commerce(config: &ServerConfig) -> Result<MemoryCommerce, webmcp_tools::CatalogError> {
    let checkout_url = config.checkout_url();
    match &config.catalog_path {
        Some(path) => {
            let commerce = MemoryCommerce::from_path(path, config.public_url(), checkout_url)?;
            tracing::info!(
                path = %path.display(),
                products = commerce.product_count(),
                "Catalog loaded"
            );
            Ok(commerce)
        }
        None => {
            tracing::warn!("WEBMCP_CATALOG_PATH not set, serving an empty catalog");
            Ok(MemoryCommerce::empty(CurrencyCode::default(), checkout_url))
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration from environment (needed for Sentry init)
    let config = ServerConfig::from_env()?;

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "webmcp_server=info,webmcp_tools=info,tower_http=debug".into());

    // JSON output for log shipping, text format locally
    let is_json = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));
    let json_layer = is_json.then(|| tracing_subscriber::fmt::layer().json().flatten_event(true));
    let text_layer = (!is_json).then(tracing_subscriber::fmt::layer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let commerce = load_commerce(&config)?;
    let state = AppState::new(config.clone(), Arc::new(commerce))?;
    tracing::info!(
        operations = state.dispatcher().registry().len(),
        tools_enabled = config.tools_enabled,
        "Operation registry ready"
    );

    let app = webmcp_server::app(state);

    // Start server
    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("webmcp server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
