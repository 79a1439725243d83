use crate::{
    AppState, get_broadcasters, health, publish_admin_event, publish_event, publish_log,
    update_policy,
};

use axum::{
    Router,
    routing::{get, post, put},
};
use tower_http::cors::{Any, CorsLayer};

/// Build the application router with all endpoints
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health check endpoints
        .route("/health", get(health::health_check))
        .route("/live", get(health::liveness_check))
        .route("/ready", get(health::readiness_check))
        // Broadcaster status and policy
        .route("/api/v1/broadcasters", get(get_broadcasters))
        .route("/api/v1/broadcasters/policy", put(update_policy))
        // Producers
        .route("/api/v1/logs", post(publish_log))
        .route("/api/v1/admin-events", post(publish_admin_event))
        .route("/api/v1/events/{kind}", post(publish_event))
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}
