//! HTTP API Server

use std::future::Future;
use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::http::Method;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::core::ListingService;

use super::handlers::AppState;
use super::routes::create_router;

/// HTTP API server
pub struct HttpServer {
    listen_addr: String,
    cors_enabled: bool,
    service: ListingService,
}

impl HttpServer {
    pub fn new(listen_addr: impl Into<String>, service: ListingService) -> Self {
        Self {
            listen_addr: listen_addr.into(),
            cors_enabled: false,
            service,
        }
    }

    pub fn with_cors(mut self, enabled: bool) -> Self {
        self.cors_enabled = enabled;
        self
    }

    /// Router with the configured middleware layers applied.
    pub fn router(&self) -> Router {
        let mut app = create_router(AppState {
            service: self.service.clone(),
        });

        if self.cors_enabled {
            let cors = CorsLayer::new()
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers(Any)
                .allow_origin(Any);
            app = app.layer(cors);
        }

        app.layer(TraceLayer::new_for_http())
    }

    /// Bind the configured address and serve until `shutdown` resolves.
    pub async fn run<F>(&self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr: SocketAddr = self
            .listen_addr
            .parse()
            .context("Invalid HTTP listen address")?;

        let listener = TcpListener::bind(&addr)
            .await
            .context("Failed to bind HTTP server")?;

        self.serve(listener, shutdown).await
    }

    /// Serve on an already-bound listener (port 0 in tests).
    pub async fn serve<F>(&self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let local_addr = listener.local_addr().context("Listener has no local address")?;
        info!(
            "🚀 Listing API listening on http://{} (backend: {})",
            local_addr,
            self.service.backend_name()
        );

        axum::serve(listener, self.router())
            .with_graceful_shutdown(async move {
                shutdown.await;
                info!("HTTP server shutting down");
            })
            .await
            .context("HTTP server error")?;

        Ok(())
    }
}
