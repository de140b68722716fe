//! Credential-holding relay between chat clients and the model provider.
//!
//! The relay is stateless: every request carries the whole conversation. The
//! provider key is read once at startup and never leaves the process.

pub mod client;
pub mod credential;
pub mod handler;
pub mod types;

use crate::config::RelayConfig;
use crate::core::error::InvoiceChatError;
use crate::providers::ModelProvider;
use crate::providers::gemini::GeminiProvider;
use axum::Router;
use axum::routing::{get, post};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub use client::{HttpRelayClient, RelayClient};
pub use credential::ProviderCredential;
pub use types::{GenerateRequest, RelayReply, RequestConfig};

#[derive(Clone)]
pub struct RelayState {
    pub credential: Option<Arc<ProviderCredential>>,
    pub provider: Arc<dyn ModelProvider>,
}

impl RelayState {
    pub fn new(credential: Option<ProviderCredential>, provider: Arc<dyn ModelProvider>) -> Self {
        Self {
            credential: credential.map(Arc::new),
            provider,
        }
    }
}

/// Router with the relay endpoint mounted at `path`. Only POST is routed there;
/// axum answers every other method with 405.
pub fn build_router(state: RelayState, path: &str) -> Router {
    Router::new()
        .route(path, post(handler::relay))
        .route("/health", get(handler::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the relay until Ctrl-C.
pub async fn serve(config: &RelayConfig) -> Result<(), InvoiceChatError> {
    let credential = ProviderCredential::from_env(&config.credential_env);
    if credential.is_none() {
        tracing::warn!(
            env = %config.credential_env,
            "no provider credential found; every non-health request will fail"
        );
    }

    let provider = GeminiProvider::with_endpoint(
        config.provider_base_url.clone(),
        config.request_timeout(),
    )?;
    let state = RelayState::new(credential, Arc::new(provider));
    let router = build_router(state, &config.path);

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .map_err(|e| InvoiceChatError::Config(format!("Cannot bind {}: {}", config.bind, e)))?;
    tracing::info!(addr = %config.bind, path = %config.path, "relay listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("relay shutting down");
        })
        .await?;

    Ok(())
}
