use crate::AppState;

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Map, json};

/// GET /health - broadcaster summary
///
/// Always 200; `status` is `degraded` when no broadcaster can deliver.
pub async fn health_check(State(state): State<AppState>) -> Response {
    let snapshot = state.manager.status();

    let components: Map<_, _> = snapshot
        .broadcasters
        .iter()
        .map(|b| (b.name.clone(), json!(b.status.as_str())))
        .collect();

    let health = json!({
        "status": if snapshot.available_broadcasters > 0 { "healthy" } else { "degraded" },
        "version": env!("CARGO_PKG_VERSION"),
        "primary": snapshot.primary,
        "available_broadcasters": snapshot.available_broadcasters,
        "components": components,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (StatusCode::OK, Json(health)).into_response()
}

/// GET /live - Kubernetes liveness probe
pub async fn liveness_check() -> Response {
    (StatusCode::OK, "OK").into_response()
}

/// GET /ready - Kubernetes readiness probe
pub async fn readiness_check(State(state): State<AppState>) -> Response {
    if state.shutdown.is_shutdown() {
        return (StatusCode::SERVICE_UNAVAILABLE, "Shutting down").into_response();
    }

    if state.manager.is_any_available() {
        (StatusCode::OK, "Ready").into_response()
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "No broadcaster available").into_response()
    }
}
