//! API routes

use crate::http::server::AppState;
use crate::types::{AdvisoryResult, ConsultaRequest};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::warn;

type AppStateArc = Arc<AppState>;

/// Full application router
pub fn router(state: AppStateArc) -> Router {
    Router::new()
        .merge(consulta_routes())
        .merge(health_routes())
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

// ============================================================================
// Consultation
// ============================================================================

pub fn consulta_routes() -> Router<AppStateArc> {
    Router::new().route("/consultar", post(consultar))
}

/// Any malformed body is a client error; dependency failures never are.
async fn consultar(
    State(state): State<AppStateArc>,
    body: Result<Json<ConsultaRequest>, JsonRejection>,
) -> Result<Json<AdvisoryResult>, (StatusCode, Json<Value>)> {
    let Json(request) = body.map_err(|rejection| {
        warn!(error = %rejection.body_text(), "rejected consultation body");
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": rejection.body_text() })),
        )
    })?;

    let assessment = state.service.consult(&request).await;
    Ok(Json(assessment.result))
}

// ============================================================================
// Health
// ============================================================================

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    uptime_seconds: u64,
}

pub fn health_routes() -> Router<AppStateArc> {
    Router::new().route("/health", get(health))
}

async fn health(State(state): State<AppStateArc>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: state.start_time.elapsed().as_secs(),
    })
}
