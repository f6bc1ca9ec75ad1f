//! Core data models for the Reimbursement Engine.
//!
//! Every model is a plain value: each calculation creates fresh instances
//! and never mutates them after construction.

mod calculation_result;
mod partials;
mod trip;

pub use calculation_result::{
    AuditStep, AuditTrace, AuditWarning, Reimbursement, ReimbursementResult,
};
pub use partials::PartialAmounts;
pub use trip::TripInput;
