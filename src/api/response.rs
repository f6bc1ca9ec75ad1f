//! Response types for the Reimbursement Engine API.
//!
//! This module defines the success body of `/reimburse`, the error response
//! structures, and the mapping from engine errors to HTTP statuses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EngineError;
use crate::models::{AuditTrace, Reimbursement, TripInput};

/// The partial amounts and the unrounded total of a calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breakdown {
    /// Per-diem partial.
    pub per_diem: Decimal,
    /// Mileage partial.
    pub mileage: Decimal,
    /// Receipt partial.
    pub receipts: Decimal,
    /// Interaction adjustment.
    pub adjustment: Decimal,
    /// Combined amount before rounding.
    pub combined: Decimal,
}

/// Success body of the `/reimburse` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReimbursementResponse {
    /// Unique identifier for this calculation.
    pub calculation_id: Uuid,
    /// When the calculation was performed.
    pub timestamp: DateTime<Utc>,
    /// The version of the engine that performed the calculation.
    pub engine_version: String,
    /// Code of the policy used.
    pub policy_code: String,
    /// Version of the policy used.
    pub policy_version: String,
    /// The validated trip.
    pub input: TripInput,
    /// The reimbursement amount, formatted to the currency's minor unit.
    pub amount: String,
    /// Partial amounts.
    pub breakdown: Breakdown,
    /// Audit trace of every stage.
    pub audit_trace: AuditTrace,
    /// Calculation time in microseconds.
    pub duration_us: u64,
}

impl ReimbursementResponse {
    /// Wraps a reimbursement with request metadata.
    pub fn new(
        calculation_id: Uuid,
        policy_code: &str,
        reimbursement: Reimbursement,
        duration_us: u64,
    ) -> Self {
        Self {
            calculation_id,
            timestamp: Utc::now(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            policy_code: policy_code.to_string(),
            policy_version: reimbursement.policy_version,
            input: reimbursement.input,
            amount: reimbursement.result.to_string(),
            breakdown: Breakdown {
                per_diem: reimbursement.partials.per_diem,
                mileage: reimbursement.partials.mileage,
                receipts: reimbursement.partials.receipts,
                adjustment: reimbursement.partials.adjustment,
                combined: reimbursement.combined,
            },
            audit_trace: reimbursement.audit_trace,
            duration_us,
        }
    }
}

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        match error {
            EngineError::InvalidInput { field, message } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::with_details(
                    "INVALID_INPUT",
                    format!("Invalid input '{}': {}", field, message),
                    "Trip values must be finite, non-negative numbers; duration must be whole days",
                ),
            },
            EngineError::PolicyConfiguration { section, message } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "CONFIG_ERROR",
                    "Policy configuration error",
                    format!("{}: {}", section, message),
                ),
            },
            EngineError::ConfigNotFound { path } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "CONFIG_ERROR",
                    "Configuration error",
                    format!("Configuration file not found: {}", path),
                ),
            },
            EngineError::ConfigParseError { path, message } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "CONFIG_ERROR",
                    "Configuration parse error",
                    format!("Failed to parse {}: {}", path, message),
                ),
            },
        }
    }
}
