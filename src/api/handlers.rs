//! HTTP request handlers for the Reimbursement Engine API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use super::request::ReimbursementRequest;
use super::response::{ApiError, ApiErrorResponse, ReimbursementResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/reimburse", post(reimburse_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

/// Handler for GET /health.
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let metadata = state.engine().policy().metadata();
    Json(json!({
        "status": "ok",
        "engine_version": env!("CARGO_PKG_VERSION"),
        "policy_code": metadata.code,
        "policy_version": metadata.version,
    }))
}

/// Handler for POST /reimburse.
///
/// Accepts a trip and returns the reimbursement with its breakdown and
/// audit trace.
async fn reimburse_handler(
    State(state): State<AppState>,
    payload: Result<Json<ReimbursementRequest>, JsonRejection>,
) -> impl IntoResponse {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing reimbursement request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            let error = match rejection {
                JsonRejection::JsonDataError(err) => {
                    let body_text = err.body_text();
                    warn!(
                        correlation_id = %correlation_id,
                        error = %body_text,
                        "JSON data error"
                    );
                    if body_text.contains("missing field") {
                        ApiError::new("VALIDATION_ERROR", body_text)
                    } else {
                        ApiError::malformed_json(body_text)
                    }
                }
                JsonRejection::JsonSyntaxError(err) => {
                    warn!(
                        correlation_id = %correlation_id,
                        error = %err,
                        "JSON syntax error"
                    );
                    ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
                }
                JsonRejection::MissingJsonContentType(_) => {
                    ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
                }
                _ => ApiError::malformed_json("Failed to parse request body"),
            };
            return (
                StatusCode::BAD_REQUEST,
                [(header::CONTENT_TYPE, "application/json")],
                Json(error),
            )
                .into_response();
        }
    };

    let start_time = Instant::now();
    let engine = state.engine();
    let trip = match request.to_trip() {
        Ok(trip) => trip,
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "Rejected trip input"
            );
            let api_error: ApiErrorResponse = err.into();
            return (
                api_error.status,
                [(header::CONTENT_TYPE, "application/json")],
                Json(api_error.error),
            )
                .into_response();
        }
    };

    let reimbursement = engine.calculate(&trip);
    let duration_us = u64::try_from(start_time.elapsed().as_micros()).unwrap_or(u64::MAX);
    info!(
        correlation_id = %correlation_id,
        duration_days = trip.duration_days,
        amount = %reimbursement.result,
        duration_us,
        "Reimbursement calculated"
    );

    let response = ReimbursementResponse::new(
        correlation_id,
        &engine.policy().metadata().code,
        reimbursement,
        duration_us,
    );
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        Json(response),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ReimbursementEngine;
    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    fn create_test_router() -> Router {
        let engine = ReimbursementEngine::builtin().expect("builtin policy");
        create_router(AppState::new(engine))
    }

    async fn post_json(body: &str) -> (StatusCode, serde_json::Value) {
        let response = create_test_router()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/reimburse")
                    .header("Content-Type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_reimburse_returns_amount_and_breakdown() {
        let (status, json) = post_json(
            r#"{"trip_duration_days": 3, "miles_traveled": 100, "total_receipts_amount": 50.00}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["amount"], "126.22");
        assert_eq!(json["policy_code"], "acme_legacy");
        assert!(
            json["breakdown"]["per_diem"]
                .as_str()
                .unwrap()
                .starts_with("348.9969021")
        );
        assert_eq!(json["audit_trace"]["steps"].as_array().unwrap().len(), 6);
        assert!(json["calculation_id"].is_string());
    }

    #[tokio::test]
    async fn test_reimburse_accepts_numeric_strings() {
        let (status, json) = post_json(
            r#"{"trip_duration_days": "5", "miles_traveled": "250", "total_receipts_amount": "150.75"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["amount"], "428.97");
    }

    #[tokio::test]
    async fn test_negative_miles_is_invalid_input() {
        let (status, json) = post_json(
            r#"{"trip_duration_days": 3, "miles_traveled": -1, "total_receipts_amount": 5}"#,
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "INVALID_INPUT");
        assert!(json["message"].as_str().unwrap().contains("miles_traveled"));
    }

    #[tokio::test]
    async fn test_fractional_days_is_invalid_input() {
        let (status, json) = post_json(
            r#"{"trip_duration_days": 2.5, "miles_traveled": 10, "total_receipts_amount": 5}"#,
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "INVALID_INPUT");
    }

    #[tokio::test]
    async fn test_malformed_json_returns_400() {
        let (status, json) = post_json("{ invalid json }").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "MALFORMED_JSON");
    }

    #[tokio::test]
    async fn test_missing_field_returns_validation_error() {
        let (status, json) =
            post_json(r#"{"trip_duration_days": 3, "miles_traveled": 100}"#).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_missing_content_type_returns_400() {
        let response = create_test_router()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/reimburse")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["code"], "MISSING_CONTENT_TYPE");
    }

    #[tokio::test]
    async fn test_health_reports_policy() {
        let response = create_test_router()
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["policy_version"], "3.0.0");
    }
}
