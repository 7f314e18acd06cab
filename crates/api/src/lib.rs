pub mod cache;
mod error;
pub mod export;
pub mod query;
pub mod routes;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use common::{BarProvider, Result};
use strategy::ScanFileConfig;

pub use cache::BarCache;
pub use error::ApiError;

/// Shared application state injected into every route handler.
#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn BarProvider>,
    pub scan_config: Arc<ScanFileConfig>,
    pub cache: BarCache,
}

impl AppState {
    pub fn new(
        provider: Arc<dyn BarProvider>,
        scan_config: ScanFileConfig,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            provider,
            scan_config: Arc::new(scan_config),
            cache: BarCache::new(cache_ttl),
        }
    }
}

/// All dashboard routes with their middleware.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods(Any);

    Router::new()
        .merge(routes::scan_router())
        .merge(routes::health_router())
        .merge(routes::static_router())
        .with_state(state)
        .layer(CompressionLayer::new())
        .layer(cors)
}

/// Build and run the Axum API server until Ctrl-C.
pub async fn serve(state: AppState, port: u16) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = router(state);

    info!(%addr, "Dashboard API listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            warn!(error = %e, "Cannot listen for Ctrl-C, serving until killed");
            std::future::pending::<()>().await;
        }
    }
}
