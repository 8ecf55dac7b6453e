//! Main HTTP Gateway Server.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, info, instrument};

use mathmentor_session::Tutor;

use crate::api;
use crate::session_registry::SessionRegistry;

/// Largest accepted image upload.
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Application state shared across routes.
#[derive(Clone)]
pub struct GatewayState {
    pub tutor: Arc<Tutor>,
    pub registry: SessionRegistry,
    pub started_at: Instant,
}

impl GatewayState {
    pub fn new(tutor: Tutor) -> Self {
        Self {
            tutor: Arc::new(tutor),
            registry: SessionRegistry::new(),
            started_at: Instant::now(),
        }
    }

    /// Drop sessions left idle for longer than `ttl`.
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.registry = SessionRegistry::with_ttl(ttl);
        self
    }
}

/// Periodically drop expired sessions so abandoned ones do not pile up.
fn spawn_session_sweeper(registry: SessionRegistry) -> tokio::task::JoinHandle<()> {
    let period = (registry.ttl() / 2).clamp(Duration::from_secs(1), Duration::from_secs(60));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            let dropped = registry.sweep_expired().await;
            if dropped > 0 {
                debug!(dropped, "Swept expired sessions");
            }
        }
    })
}

pub fn build_router(state: GatewayState) -> Router {
    Router::new()
        .route("/api/health", get(api::health))
        .route("/api/sessions", post(api::create_session))
        .route(
            "/api/sessions/:id",
            get(api::get_session).delete(api::delete_session),
        )
        .route("/api/sessions/:id/image", post(api::upload_image))
        .route("/api/sessions/:id/actions/:action", post(api::run_action))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Starts the gateway and serves until Ctrl-C.
#[instrument(skip(state))]
pub async fn start_server(addr: SocketAddr, state: GatewayState) -> Result<()> {
    let registry = state.registry.clone();
    let app = build_router(state);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind gateway on {addr}"))?;
    info!("Gateway HTTP server listening on {}", addr);
    let sweeper = spawn_session_sweeper(registry);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await?;

    sweeper.abort();
    Ok(())
}
