//! Receipt adjustment functionality.
//!
//! Receipt rules from `receipts.yaml` are evaluated top to bottom and the
//! first rule whose conditions hold decides the receipt partial:
//!
//! ```text
//! amount = max(min(receipts, cap) × fraction, floor) − penalty
//! ```
//!
//! Unset caps, floors and penalties are skipped. A validated policy always
//! ends with an unconditional rule, so some rule always matches.

use rust_decimal::Decimal;

use crate::config::{ReceiptCondition, ReceiptPolicy, ReceiptRule};
use crate::models::{AuditStep, TripInput};

/// The result of the receipt calculation.
#[derive(Debug, Clone)]
pub struct ReceiptResult {
    /// The receipt partial amount.
    pub amount: Decimal,
    /// Id of the rule that matched, if any.
    pub rule_id: Option<String>,
    /// Whether the cap reduced the receipts considered.
    pub cap_applied: bool,
    /// Whether the floor raised the amount.
    pub floor_applied: bool,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

fn condition_matches(condition: &ReceiptCondition, trip: &TripInput, spend_rate: Decimal) -> bool {
    let amount = trip.receipts_amount;
    let days = trip.duration_days;

    condition.min_amount.is_none_or(|min| amount >= min)
        && condition.max_amount.is_none_or(|max| amount < max)
        && condition.min_days.is_none_or(|min| days >= min)
        && condition.max_days.is_none_or(|max| days < max)
        && condition.min_daily_spend.is_none_or(|min| spend_rate >= min)
        && condition.max_daily_spend.is_none_or(|max| spend_rate < max)
}

/// Returns the first rule matching the trip.
pub fn select_receipt_rule<'a>(policy: &'a ReceiptPolicy, trip: &TripInput) -> Option<&'a ReceiptRule> {
    let spend_rate = trip.receipts_amount / trip.effective_days();
    policy
        .rules
        .iter()
        .find(|rule| condition_matches(&rule.when, trip, spend_rate))
}

/// Calculates the receipt partial for a trip.
///
/// # Examples
///
/// ```
/// use reimbursement_engine::calculation::calculate_receipts;
/// use reimbursement_engine::config::{ReceiptCondition, ReceiptPolicy, ReceiptRule};
/// use reimbursement_engine::models::TripInput;
/// use rust_decimal::Decimal;
///
/// let policy = ReceiptPolicy {
///     rules: vec![ReceiptRule {
///         id: "capped".to_string(),
///         name: "Capped half share".to_string(),
///         when: ReceiptCondition::default(),
///         cap: Some(Decimal::from(1000)),
///         fraction: Decimal::new(5, 1),
///         floor: None,
///         penalty: None,
///     }],
/// };
///
/// let trip = TripInput::new(2, Decimal::ZERO, Decimal::from(1500)).unwrap();
/// let result = calculate_receipts(&trip, &policy, 3);
/// assert_eq!(result.amount, Decimal::from(500));
/// assert!(result.cap_applied);
/// ```
pub fn calculate_receipts(trip: &TripInput, policy: &ReceiptPolicy, step_number: u32) -> ReceiptResult {
    let receipts = trip.receipts_amount;

    let Some(rule) = select_receipt_rule(policy, trip) else {
        return ReceiptResult {
            amount: Decimal::ZERO,
            rule_id: None,
            cap_applied: false,
            floor_applied: false,
            audit_step: AuditStep {
                step_number,
                rule_id: "receipts".to_string(),
                rule_name: "Receipt Reimbursement".to_string(),
                input: serde_json::json!({
                    "receipts_amount": receipts.normalize().to_string()
                }),
                output: serde_json::json!({
                    "matched_rule": null,
                    "amount": "0"
                }),
                reasoning: "No receipt rule matched; receipts not reimbursed".to_string(),
            },
        };
    };

    let considered = match rule.cap {
        Some(cap) => receipts.min(cap),
        None => receipts,
    };
    let cap_applied = considered < receipts;

    let mut amount = considered * rule.fraction;
    let mut floor_applied = false;
    if let Some(floor) = rule.floor {
        if amount < floor {
            amount = floor;
            floor_applied = true;
        }
    }
    let penalty = rule.penalty.unwrap_or(Decimal::ZERO);
    amount -= penalty;

    let mut reasoning = format!(
        "Rule '{}': ${} x {}",
        rule.id,
        considered.normalize(),
        rule.fraction.normalize()
    );
    if cap_applied {
        reasoning.push_str(&format!(" (capped from ${})", receipts.normalize()));
    }
    if floor_applied {
        reasoning.push_str(&format!(", raised to floor ${}", (amount + penalty).normalize()));
    }
    if !penalty.is_zero() {
        reasoning.push_str(&format!(" - ${} penalty", penalty.normalize()));
    }
    reasoning.push_str(&format!(" = ${}", amount.normalize()));

    let audit_step = AuditStep {
        step_number,
        rule_id: "receipts".to_string(),
        rule_name: "Receipt Reimbursement".to_string(),
        input: serde_json::json!({
            "receipts_amount": receipts.normalize().to_string(),
            "duration_days": trip.duration_days
        }),
        output: serde_json::json!({
            "matched_rule": rule.id,
            "considered": considered.normalize().to_string(),
            "fraction": rule.fraction.normalize().to_string(),
            "cap_applied": cap_applied,
            "floor_applied": floor_applied,
            "penalty": penalty.normalize().to_string(),
            "amount": amount.normalize().to_string()
        }),
        reasoning,
    };

    ReceiptResult {
        amount,
        rule_id: Some(rule.id.clone()),
        cap_applied,
        floor_applied,
        audit_step,
    }
}
