use crate::ApiError;

use std::panic::Location;

use axum::body::to_bytes;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use error_location::ErrorLocation;
use googletest::prelude::*;

async fn body_json(error: ApiError) -> (StatusCode, serde_json::Value) {
    let response = error.into_response();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn given_validation_error_when_rendered_then_400_with_field() {
    // Given
    let error = ApiError::Validation {
        message: "Unknown event kind 'metrics'".into(),
        field: Some("kind".into()),
        location: ErrorLocation::from(Location::caller()),
    };

    // When
    let (status, json) = body_json(error).await;

    // Then
    assert_that!(status, eq(StatusCode::BAD_REQUEST));
    assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"]["field"], "kind");
    assert!(json["error"]["message"].as_str().unwrap().contains("metrics"));
}

#[tokio::test]
async fn given_bad_request_when_rendered_then_field_is_omitted() {
    // Given
    let error = ApiError::BadRequest {
        message: "EOF while parsing".into(),
        location: ErrorLocation::from(Location::caller()),
    };

    // When
    let (status, json) = body_json(error).await;

    // Then
    assert_that!(status, eq(StatusCode::BAD_REQUEST));
    assert_eq!(json["error"]["code"], "BAD_REQUEST");
    assert!(json["error"].get("field").is_none());
}
