//! Request types for the Reimbursement Engine API.
//!
//! This module defines the JSON request structure for the `/reimburse`
//! endpoint.

use serde::{Deserialize, Serialize};

use crate::calculation::validate_trip;
use crate::error::EngineResult;
use crate::models::TripInput;

/// A numeric field supplied either as a JSON number or as a numeric string.
///
/// Both forms go through the same validation as command line arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericValue {
    /// A JSON number, e.g. `50.25`.
    Number(serde_json::Number),
    /// A numeric string, e.g. `"50.25"`.
    Text(String),
}

impl NumericValue {
    /// Returns the textual form handed to the validator.
    pub fn as_text(&self) -> String {
        match self {
            NumericValue::Number(n) => n.to_string(),
            NumericValue::Text(s) => s.clone(),
        }
    }
}

/// Request body for the `/reimburse` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReimbursementRequest {
    /// Trip length in whole days.
    pub trip_duration_days: NumericValue,
    /// Distance traveled in miles.
    pub miles_traveled: NumericValue,
    /// Total of submitted receipts.
    pub total_receipts_amount: NumericValue,
}

impl ReimbursementRequest {
    /// Validates the request into a trip.
    pub fn to_trip(&self) -> EngineResult<TripInput> {
        validate_trip(
            &self.trip_duration_days.as_text(),
            &self.miles_traveled.as_text(),
            &self.total_receipts_amount.as_text(),
        )
    }
}
