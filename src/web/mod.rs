//! Web server module.

mod handlers;

pub use handlers::*;

use crate::monitor::Monitor;

use axum::{
    routing::{delete, get, post},
    Router,
};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub monitor: Arc<Monitor>,
}

/// Web server exposing the status API.
pub struct Server {
    port: u16,
    state: AppState,
}

impl Server {
    /// Create a new server with the given dependencies.
    pub fn new(port: u16, monitor: Arc<Monitor>) -> Self {
        Self {
            port,
            state: AppState { monitor },
        }
    }

    /// Build the router with all routes.
    fn routes(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        Router::new()
            .route("/api/", get(handlers::handle_root))
            .route("/api/health", get(handlers::handle_health))
            .route("/api/status/websites", get(handlers::handle_get_all_status))
            .route(
                "/api/status/websites/{*website}",
                get(handlers::handle_get_website_status),
            )
            .route("/api/status/uptime", get(handlers::handle_get_uptime))
            .route("/api/status/check", post(handlers::handle_force_check))
            .route("/api/status/cleanup", delete(handlers::handle_cleanup))
            .layer(cors)
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Serve until `shutdown` resolves, then drain in-flight requests.
    pub async fn start<F>(&self, shutdown: F) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Web server listening on {}", addr);

        self.serve(listener, shutdown).await
    }

    async fn serve<F>(
        &self,
        listener: tokio::net::TcpListener,
        shutdown: F,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        axum::serve(listener, self.routes())
            .with_graceful_shutdown(shutdown)
            .await?;
        Ok(())
    }
}
