//! Quiz HTTP server.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;

use crate::api;
use crate::config::QuizConfig;
use crate::error::Result;
use crate::session::SessionStore;

/// Upper bound on the time between idle-session sweeps.
const MAX_SWEEP_PERIOD: Duration = Duration::from_secs(60);

/// HTTP server owning the session store.
pub struct QuizServer {
    config: QuizConfig,
    store: Arc<SessionStore>,
}

impl QuizServer {
    /// Create a server with an empty session store.
    pub fn new(config: QuizConfig) -> Self {
        let store = Arc::new(
            SessionStore::new(config.max_sessions, config.vote_mode)
                .with_idle_timeout(config.session_ttl),
        );
        Self { config, store }
    }

    /// Shared session store (for handlers and tests).
    pub fn store(&self) -> Arc<SessionStore> {
        Arc::clone(&self.store)
    }

    /// Build the router for the server.
    pub fn router(&self) -> Router {
        api::build_router(self.store())
    }

    /// Run the server until the process is stopped.
    pub async fn serve(self) -> Result<()> {
        tracing::info!("Quiz server starting");
        tracing::info!("  API: http://{}", self.config.api_addr);
        tracing::info!("  Vote mode: {}", self.config.vote_mode);
        tracing::info!("  Max sessions: {}", self.config.max_sessions);
        tracing::info!("  Session TTL: {}s", self.config.session_ttl.as_secs());

        let listener = tokio::net::TcpListener::bind(self.config.api_addr).await?;
        tracing::info!("HTTP server listening on {}", self.config.api_addr);

        let period = sweep_period(self.config.session_ttl);
        let sweeper = Arc::clone(&self.store).spawn_sweeper(period);

        let served = axum::serve(listener, self.router()).await;
        sweeper.abort();
        served?;
        Ok(())
    }
}

fn sweep_period(ttl: Duration) -> Duration {
    ttl.clamp(Duration::from_secs(1), MAX_SWEEP_PERIOD)
}
