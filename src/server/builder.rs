//! Explicit registration builder for assembling the HTTP surface
//!
//! Routers are merged in registration order; nothing is discovered at
//! runtime. The built router carries request tracing and a permissive CORS
//! layer, and `serve` shuts down cleanly on ctrl-c.

use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::core::error::{Error, Result};
use crate::repository::Repository;
use crate::routes::descriptor::RouteDescriptor;
use crate::routes::generator::CrudGenerator;

/// Install the global tracing subscriber, filtered by `RUST_LOG`
///
/// Safe to call more than once; later calls are ignored.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

/// Assembles generated and plugin routers into one server
#[derive(Default)]
pub struct ServerBuilder {
    router: Router,
}

impl ServerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate CRUD routes for an entity and merge them in
    pub fn register_crud(
        mut self,
        repository: Arc<dyn Repository>,
        descriptor: RouteDescriptor,
    ) -> Result<Self> {
        let entity = repository.entity_name().to_string();
        let router = CrudGenerator::generate(repository, descriptor)?;
        tracing::info!(entity = %entity, "registered CRUD routes");
        self.router = self.router.merge(router);
        Ok(self)
    }

    /// Merge a pre-built router (plugin routes, ad-hoc endpoints)
    pub fn register_routes(mut self, router: Router) -> Self {
        self.router = self.router.merge(router);
        self
    }

    /// Finalize the router with tracing and CORS layers
    pub fn build(self) -> Router {
        self.router
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
    }

    /// Build, bind and serve until ctrl-c
    pub async fn serve(self, addr: &str) -> Result<()> {
        let router = self.build();
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| Error::Internal(format!("Failed to bind {addr}: {e}")))?;
        tracing::info!(addr = %addr, "server listening");
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| Error::Internal(format!("Server error: {e}")))
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install shutdown handler");
        return;
    }
    tracing::info!("shutdown signal received");
}
