//! Broadcaster status and delivery policy

use crate::{ApiResult, AppState, UpdatePolicyRequest};

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use herald_broadcast::ManagerSnapshot;
use log::info;

/// GET /api/v1/broadcasters
pub async fn get_broadcasters(State(state): State<AppState>) -> Json<ManagerSnapshot> {
    Json(state.manager.status())
}

/// PUT /api/v1/broadcasters/policy
///
/// Switch between fallback and fan-out delivery at runtime.
pub async fn update_policy(
    State(state): State<AppState>,
    body: Result<Json<UpdatePolicyRequest>, JsonRejection>,
) -> ApiResult<Json<ManagerSnapshot>> {
    let Json(request) = body?;
    info!(
        "Policy update requested: broadcast_to_all={}",
        request.broadcast_to_all
    );
    state.manager.set_broadcast_to_all(request.broadcast_to_all);

    Ok(Json(state.manager.status()))
}
