use axum::Router;
use axum::routing::{get, post};
use mesabot_config::ServerConfig;
use mesabot_conversation::ConversationEngine;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::handler::{handle_message, health};
use crate::{Error, Result};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ConversationEngine>,
}

/// Build the webhook router, posting to `path`.
pub fn router(engine: Arc<ConversationEngine>, path: &str) -> Router {
    Router::new()
        .route(path, post(handle_message))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { engine })
}

/// HTTP front end for the conversation engine.
pub struct WebhookServer {
    engine: Arc<ConversationEngine>,
    config: ServerConfig,
}

impl WebhookServer {
    #[must_use]
    pub const fn new(engine: Arc<ConversationEngine>, config: ServerConfig) -> Self {
        Self { engine, config }
    }

    /// Serve until Ctrl-C.
    pub async fn run(self) -> Result<()> {
        if !self.config.path.starts_with('/') {
            return Err(Error::Config(format!(
                "webhook path must start with '/', got {:?}",
                self.config.path
            )));
        }

        let app = router(Arc::clone(&self.engine), &self.config.path);

        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = TcpListener::bind(&addr).await?;
        info!(
            "Webhook listening on http://{}{}",
            listener.local_addr()?,
            self.config.path
        );

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Webhook server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    wait_for_shutdown(tokio::signal::ctrl_c()).await;
}

/// Resolves when `signal` fires. Never resolves if the handler could not be
/// installed, so the server keeps running without graceful shutdown.
async fn wait_for_shutdown<F>(signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    match signal.await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            warn!("Failed to listen for Ctrl-C, graceful shutdown disabled: {e}");
            std::future::pending::<()>().await;
        }
    }
}
