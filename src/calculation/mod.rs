//! Calculation stages of the Reimbursement Engine.
//!
//! This module contains one function per pipeline stage: input validation,
//! the per-diem allowance, tiered mileage pricing, receipt rules, the
//! cross-factor interaction adjustment, aggregation of the partial amounts,
//! and the final rounding. Each stage returns its amount together with the
//! audit step explaining it.

mod aggregate;
mod input_validation;
mod interaction;
mod mileage;
mod per_diem;
mod receipts;
mod rounding;

pub use aggregate::{
    AggregationResult, WARNING_CAPPED_AT_MAXIMUM, WARNING_RAISED_TO_MINIMUM, aggregate_partials,
};
pub use input_validation::{
    FIELD_DURATION, FIELD_MILES, FIELD_RECEIPTS, MAX_SUPPORTED_AMOUNT, validate_trip,
    validate_values,
};
pub use interaction::{
    GATE_EXPONENT_LIMIT, InteractionResult, InteractionSignals, calculate_interaction,
    derive_signals, logistic_gate,
};
pub use mileage::{MileageResult, TierCharge, calculate_mileage};
pub use per_diem::{PerDiemResult, calculate_per_diem};
pub use receipts::{ReceiptResult, calculate_receipts, select_receipt_rule};
pub use rounding::{RoundingResult, apply_rounding, round_amount};
