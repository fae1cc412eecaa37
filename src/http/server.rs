//! HTTP server

use crate::errors::{AppError, Result};
use crate::http::routes;
use crate::service::TrademarkService;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Application state shared across handlers
pub struct AppState {
    pub service: Arc<TrademarkService>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(service: Arc<TrademarkService>) -> Self {
        Self {
            service,
            start_time: Instant::now(),
        }
    }
}

/// Serve until Ctrl-C
pub async fn run(state: AppState, addr: &str) -> Result<()> {
    let app = routes::router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| AppError::Bind {
            addr: addr.to_string(),
            source,
        })?;
    info!("listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutting down gracefully");
}
