//! Rounding of the final amount.
//!
//! Rounding happens exactly once per calculation, on the combined amount.
//! The convention is pinned by the policy; the builtin policy uses half-up
//! to cents.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::config::{RoundingMode, RoundingPolicy};
use crate::models::{AuditStep, ReimbursementResult};

/// The result of rounding.
#[derive(Debug, Clone)]
pub struct RoundingResult {
    /// The rounded result.
    pub result: ReimbursementResult,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

fn strategy_for(mode: RoundingMode) -> RoundingStrategy {
    match mode {
        RoundingMode::HalfUp => RoundingStrategy::MidpointAwayFromZero,
        RoundingMode::HalfEven => RoundingStrategy::MidpointNearestEven,
        RoundingMode::Truncate => RoundingStrategy::ToZero,
    }
}

fn mode_name(mode: RoundingMode) -> &'static str {
    match mode {
        RoundingMode::HalfUp => "half_up",
        RoundingMode::HalfEven => "half_even",
        RoundingMode::Truncate => "truncate",
    }
}

/// Rounds `value` per the policy and fixes its scale to the policy's
/// decimal places, so `0` renders as `0.00`.
///
/// Half-up rounds halves away from zero.
///
/// # Examples
///
/// ```
/// use reimbursement_engine::calculation::round_amount;
/// use reimbursement_engine::config::{RoundingMode, RoundingPolicy};
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let policy = RoundingPolicy { strategy: RoundingMode::HalfUp, decimal_places: 2 };
/// let rounded = round_amount(Decimal::from_str("126.2152587").unwrap(), &policy);
/// assert_eq!(rounded.to_string(), "126.22");
/// ```
pub fn round_amount(value: Decimal, policy: &RoundingPolicy) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(policy.decimal_places, strategy_for(policy.strategy));
    rounded.rescale(policy.decimal_places);
    rounded
}

/// Rounds the combined amount into the final result.
pub fn apply_rounding(combined: Decimal, policy: &RoundingPolicy, step_number: u32) -> RoundingResult {
    let amount = round_amount(combined, policy);

    let audit_step = AuditStep {
        step_number,
        rule_id: "rounding".to_string(),
        rule_name: "Rounding".to_string(),
        input: serde_json::json!({
            "combined": combined.normalize().to_string(),
            "strategy": mode_name(policy.strategy),
            "decimal_places": policy.decimal_places
        }),
        output: serde_json::json!({
            "amount": amount.to_string()
        }),
        reasoning: format!(
            "${} rounded {} to {} places = ${}",
            combined.normalize(),
            mode_name(policy.strategy),
            policy.decimal_places,
            amount
        ),
    };

    RoundingResult {
        result: ReimbursementResult { amount },
        audit_step,
    }
}
