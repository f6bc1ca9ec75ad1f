//! Calculation result models for the Reimbursement Engine.
//!
//! This module contains the [`Reimbursement`] type and its associated
//! structures that capture all outputs of a calculation: the partial
//! amounts, the rounded result, and an audit trace explaining every stage.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{PartialAmounts, TripInput};

/// The terminal value of a calculation.
///
/// The amount is already rounded to the currency's minor unit and carries
/// exactly that many fractional digits, so its textual form is stable:
///
/// ```
/// use reimbursement_engine::models::ReimbursementResult;
/// use rust_decimal::Decimal;
///
/// let result = ReimbursementResult { amount: Decimal::new(12622, 2) };
/// assert_eq!(result.to_string(), "126.22");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReimbursementResult {
    /// The reimbursement amount.
    pub amount: Decimal,
}

impl fmt::Display for ReimbursementResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.amount)
    }
}

/// A single step in the audit trace recording a calculation decision.
///
/// Each step captures the input, output, and reasoning for a rule application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A warning generated during calculation.
///
/// Warnings flag policy limits that shaped the result, such as a total
/// raised to the configured minimum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level (e.g., "low", "medium", "high").
    pub severity: String,
}

/// The complete audit trace for a calculation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of calculation steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during calculation.
    pub warnings: Vec<AuditWarning>,
}

/// The complete result of a reimbursement calculation.
///
/// Holds no timestamps or identifiers: identical trips under the same
/// policy produce equal values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reimbursement {
    /// Version of the policy that produced this result.
    pub policy_version: String,
    /// The validated trip.
    pub input: TripInput,
    /// The partial amounts fed to the aggregator.
    pub partials: PartialAmounts,
    /// The combined amount before rounding.
    pub combined: Decimal,
    /// The rounded result.
    pub result: ReimbursementResult,
    /// Complete audit trace of calculation decisions.
    pub audit_trace: AuditTrace,
}

impl Reimbursement {
    /// The rounded reimbursement amount.
    pub fn amount(&self) -> Decimal {
        self.result.amount
    }
}
