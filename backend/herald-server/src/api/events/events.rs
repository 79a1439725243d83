//! Producer endpoints
//!
//! Delivery failures are not HTTP errors: the response reports
//! `delivered: false` and the broadcaster status carries the cause.

use crate::{ApiError, ApiResult, AppState, DeliveryResponse};

use std::panic::Location;

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use error_location::ErrorLocation;
use herald_core::{EventKind, LogRecord};
use log::warn;
use serde_json::Value;

/// POST /api/v1/logs
pub async fn publish_log(
    State(state): State<AppState>,
    body: Result<Json<LogRecord>, JsonRejection>,
) -> ApiResult<Json<DeliveryResponse>> {
    let Json(record) = body?;
    let delivered = state.manager.broadcast_log(&record).await;
    if !delivered {
        warn!("Log event from thread {} was not delivered", record.thread_id);
    }

    Ok(Json(DeliveryResponse { delivered }))
}

/// POST /api/v1/admin-events
pub async fn publish_admin_event(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<DeliveryResponse>> {
    let Json(payload) = body?;
    let delivered = state.manager.broadcast_admin_event(&payload).await;

    Ok(Json(DeliveryResponse { delivered }))
}

/// POST /api/v1/events/{kind}
///
/// `kind` is one of `log`, `logs`, `admin`.
pub async fn publish_event(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<DeliveryResponse>> {
    let Json(payload) = body?;
    let event_kind = kind.parse::<EventKind>().map_err(|_| ApiError::Validation {
        message: format!("Unknown event kind '{}', expected log or admin", kind),
        field: Some("kind".into()),
        location: ErrorLocation::from(Location::caller()),
    })?;

    if event_kind == EventKind::Log
        && let Err(e) = serde_json::from_value::<LogRecord>(payload.clone())
    {
        return Err(ApiError::Validation {
            message: format!("Payload is not a log record: {}", e),
            field: Some("payload".into()),
            location: ErrorLocation::from(Location::caller()),
        });
    }

    let delivered = state.manager.broadcast(&kind, payload).await;

    Ok(Json(DeliveryResponse { delivered }))
}
