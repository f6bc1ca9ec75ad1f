//! HTTP API module for the Reimbursement Engine.
//!
//! This module provides the REST endpoints for calculating reimbursements
//! over the loaded policy.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{NumericValue, ReimbursementRequest};
pub use response::{ApiError, ApiErrorResponse, Breakdown, ReimbursementResponse};
pub use state::AppState;
