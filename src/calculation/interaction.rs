//! Interaction adjustment functionality.
//!
//! The legacy policy does not treat duration, mileage and receipts as
//! independent. This stage derives three ratios from the trip and turns
//! them into a single additive correction:
//!
//! - **efficiency**: miles per day
//! - **spend rate**: receipts per day
//! - **receipts per mile**: drives the logistic receipt gate
//!
//! ## Corrections
//!
//! 1. Receipt gate: `gate = 1 / (1 + e^(-slope × (receipts_per_mile - center)))`
//!    scales the receipt partial, contributing `receipts × (gate - 1)`.
//! 2. Long-trip penalty: each day beyond the threshold deducts
//!    `penalty_per_day`, scaled by the gate when `gated` is set.
//! 3. Ratio rules: every rule whose signal falls in `[min, max)` applies its
//!    effect. Effects are computed from the base partials, so they never
//!    compound on each other.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::{AdjustmentEffect, InteractionPolicy, InteractionRule, LogisticGate, RatioSignal};
use crate::models::{AuditStep, PartialAmounts, TripInput};

/// Bound on the logistic exponent; beyond it the gate is saturated.
pub const GATE_EXPONENT_LIMIT: Decimal = Decimal::from_parts(40, 0, 0, false, 0);

/// The derived ratios of a trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionSignals {
    /// Miles per day (days floored at one).
    pub efficiency: Decimal,
    /// Receipts per day (days floored at one).
    pub spend_rate: Decimal,
    /// Receipts per mile (miles floored at the gate's `min_miles`, or one).
    pub receipts_per_mile: Decimal,
    /// Receipt gate value in `[0, 1]`; one when no gate is configured.
    pub gate: Decimal,
}

impl InteractionSignals {
    /// Returns the value of the given signal.
    pub fn value(&self, signal: RatioSignal) -> Decimal {
        match signal {
            RatioSignal::Efficiency => self.efficiency,
            RatioSignal::SpendRate => self.spend_rate,
            RatioSignal::ReceiptsPerMile => self.receipts_per_mile,
        }
    }
}

/// The result of the interaction stage.
#[derive(Debug, Clone)]
pub struct InteractionResult {
    /// The total cross-factor correction.
    pub adjustment: Decimal,
    /// The derived ratios the correction was based on.
    pub signals: InteractionSignals,
    /// Ids of the ratio rules that matched, in evaluation order.
    pub matched_rules: Vec<String>,
    /// Audit steps for the gate, the long-trip penalty and each matched rule.
    pub audit_steps: Vec<AuditStep>,
}

/// Evaluates the logistic gate at `ratio`.
///
/// # Examples
///
/// ```
/// use reimbursement_engine::calculation::logistic_gate;
/// use reimbursement_engine::config::LogisticGate;
/// use rust_decimal::Decimal;
///
/// let gate = LogisticGate {
///     center_ratio: Decimal::from(5),
///     slope: Decimal::new(7, 1),
///     min_miles: Decimal::ONE,
/// };
/// assert_eq!(logistic_gate(&gate, Decimal::from(5)), Decimal::new(5, 1));
/// ```
pub fn logistic_gate(gate: &LogisticGate, ratio: Decimal) -> Decimal {
    let exponent = gate_exponent(gate, ratio);
    Decimal::ONE / (Decimal::ONE + decimal_exp(-exponent))
}

/// `slope × (ratio - center)` clamped to the exponent limit.
///
/// Any intermediate overflow lies past the limit, so it saturates in the
/// direction of the distance from the center.
fn gate_exponent(gate: &LogisticGate, ratio: Decimal) -> Decimal {
    let saturated = |positive: bool| {
        if positive {
            GATE_EXPONENT_LIMIT
        } else {
            -GATE_EXPONENT_LIMIT
        }
    };

    let Some(distance) = ratio.checked_sub(gate.center_ratio) else {
        return saturated(ratio > gate.center_ratio);
    };
    match gate.slope.checked_mul(distance) {
        Some(exponent) => exponent.clamp(-GATE_EXPONENT_LIMIT, GATE_EXPONENT_LIMIT),
        None => saturated(distance.is_sign_positive()),
    }
}

/// `e^x` in decimal arithmetic, for `|x| <= GATE_EXPONENT_LIMIT`.
///
/// The argument is halved until `|x| <= 0.5`, the Taylor series is summed
/// until its terms vanish at 28 digits, and the result is squared back up.
/// Integer-backed arithmetic keeps the value identical on every platform.
fn decimal_exp(x: Decimal) -> Decimal {
    let half = Decimal::new(5, 1);
    let mut reduced = x;
    let mut halvings = 0;
    while reduced.abs() > half {
        reduced /= Decimal::TWO;
        halvings += 1;
    }

    let mut term = Decimal::ONE;
    let mut sum = Decimal::ONE;
    for n in 1..=60u32 {
        term = term * reduced / Decimal::from(n);
        if term.is_zero() {
            break;
        }
        sum += term;
    }

    for _ in 0..halvings {
        sum *= sum;
    }
    sum
}

/// Derives the interaction ratios for a trip.
pub fn derive_signals(trip: &TripInput, policy: &InteractionPolicy) -> InteractionSignals {
    let days = trip.effective_days();
    let min_miles = policy
        .receipt_gate
        .as_ref()
        .map_or(Decimal::ONE, |g| g.min_miles);
    // Saturates when a tiny `min_miles` pushes the ratio past Decimal range
    let receipts_per_mile = trip
        .receipts_amount
        .checked_div(trip.miles_traveled.max(min_miles))
        .unwrap_or(Decimal::MAX);
    let gate = policy
        .receipt_gate
        .as_ref()
        .map_or(Decimal::ONE, |g| logistic_gate(g, receipts_per_mile));

    InteractionSignals {
        efficiency: trip.miles_traveled / days,
        spend_rate: trip.receipts_amount / days,
        receipts_per_mile,
        gate,
    }
}

fn rule_matches(rule: &InteractionRule, signals: &InteractionSignals, days: u32) -> bool {
    let value = signals.value(rule.signal);
    rule.min.is_none_or(|min| value >= min)
        && rule.max.is_none_or(|max| value < max)
        && rule.min_days.is_none_or(|min| days >= min)
        && rule.max_days.is_none_or(|max| days < max)
}

fn signal_name(signal: RatioSignal) -> &'static str {
    match signal {
        RatioSignal::Efficiency => "efficiency",
        RatioSignal::SpendRate => "spend_rate",
        RatioSignal::ReceiptsPerMile => "receipts_per_mile",
    }
}

/// Calculates the cross-factor adjustment.
///
/// `base` must hold the per-diem, mileage and receipt partials; its
/// `adjustment` field is ignored.
///
/// # Examples
///
/// ```
/// use reimbursement_engine::calculation::calculate_interaction;
/// use reimbursement_engine::config::{InteractionPolicy, LongTripPenalty};
/// use reimbursement_engine::models::{PartialAmounts, TripInput};
/// use rust_decimal::Decimal;
///
/// let policy = InteractionPolicy {
///     receipt_gate: None,
///     long_trip: Some(LongTripPenalty {
///         threshold_days: 7,
///         penalty_per_day: Decimal::from(85),
///         gated: true,
///     }),
///     rules: vec![],
/// };
///
/// let trip = TripInput::new(9, Decimal::from(300), Decimal::from(200)).unwrap();
/// let result = calculate_interaction(&trip, &PartialAmounts::default(), &policy, 4);
/// assert_eq!(result.adjustment, Decimal::from(-170));
/// ```
pub fn calculate_interaction(
    trip: &TripInput,
    base: &PartialAmounts,
    policy: &InteractionPolicy,
    step_number_start: u32,
) -> InteractionResult {
    let signals = derive_signals(trip, policy);
    let subtotal = base.subtotal();
    let mut adjustment = Decimal::ZERO;
    let mut audit_steps = Vec::new();
    let mut matched_rules = Vec::new();
    let mut step_number = step_number_start;

    // Receipt gate
    let gate_adjustment = base.receipts * (signals.gate - Decimal::ONE);
    adjustment += gate_adjustment;
    let gate_reasoning = match &policy.receipt_gate {
        Some(gate) => format!(
            "Receipts/mile {} against center {}: gate {} keeps ${} of ${} receipt partial (adjustment ${})",
            signals.receipts_per_mile.round_dp(4).normalize(),
            gate.center_ratio.normalize(),
            signals.gate.round_dp(6).normalize(),
            (base.receipts * signals.gate).round_dp(4).normalize(),
            base.receipts.round_dp(4).normalize(),
            gate_adjustment.round_dp(4).normalize()
        ),
        None => "No receipt gate configured; receipt partial kept in full".to_string(),
    };
    audit_steps.push(AuditStep {
        step_number,
        rule_id: "receipt_gate".to_string(),
        rule_name: "Receipt Gate".to_string(),
        input: serde_json::json!({
            "efficiency": signals.efficiency.normalize().to_string(),
            "spend_rate": signals.spend_rate.normalize().to_string(),
            "receipts_per_mile": signals.receipts_per_mile.normalize().to_string(),
            "receipts_partial": base.receipts.normalize().to_string()
        }),
        output: serde_json::json!({
            "gate": signals.gate.normalize().to_string(),
            "adjustment": gate_adjustment.normalize().to_string()
        }),
        reasoning: gate_reasoning,
    });
    step_number += 1;

    // Long-trip penalty
    if let Some(long_trip) = &policy.long_trip {
        if trip.duration_days > long_trip.threshold_days {
            let extra_days = Decimal::from(trip.duration_days - long_trip.threshold_days);
            let scale = if long_trip.gated {
                signals.gate
            } else {
                Decimal::ONE
            };
            let penalty = long_trip.penalty_per_day * scale * extra_days;
            adjustment -= penalty;

            audit_steps.push(AuditStep {
                step_number,
                rule_id: "long_trip_penalty".to_string(),
                rule_name: "Long Trip Penalty".to_string(),
                input: serde_json::json!({
                    "duration_days": trip.duration_days,
                    "threshold_days": long_trip.threshold_days,
                    "gated": long_trip.gated
                }),
                output: serde_json::json!({
                    "extra_days": extra_days.to_string(),
                    "scale": scale.normalize().to_string(),
                    "penalty": penalty.normalize().to_string()
                }),
                reasoning: format!(
                    "{} days beyond {} x ${} x {} = -${}",
                    extra_days,
                    long_trip.threshold_days,
                    long_trip.penalty_per_day.normalize(),
                    scale.round_dp(6).normalize(),
                    penalty.round_dp(4).normalize()
                ),
            });
            step_number += 1;
        }
    }

    // Ratio threshold rules
    for rule in &policy.rules {
        if !rule_matches(rule, &signals, trip.duration_days) {
            continue;
        }

        let (delta, detail) = match &rule.effect {
            AdjustmentEffect::Flat { amount } => (*amount, format!("flat ${}", amount.normalize())),
            AdjustmentEffect::PerDay { amount } => (
                *amount * Decimal::from(trip.duration_days),
                format!("{} days x ${}", trip.duration_days, amount.normalize()),
            ),
            AdjustmentEffect::ScaleSubtotal { factor } => (
                subtotal * (*factor - Decimal::ONE),
                format!(
                    "subtotal ${} x ({} - 1)",
                    subtotal.round_dp(4).normalize(),
                    factor.normalize()
                ),
            ),
        };
        adjustment += delta;
        matched_rules.push(rule.id.clone());

        let value = signals.value(rule.signal);
        audit_steps.push(AuditStep {
            step_number,
            rule_id: rule.id.clone(),
            rule_name: rule.name.clone(),
            input: serde_json::json!({
                "signal": signal_name(rule.signal),
                "value": value.normalize().to_string(),
                "min": rule.min.map(|m| m.normalize().to_string()),
                "max": rule.max.map(|m| m.normalize().to_string())
            }),
            output: serde_json::json!({
                "adjustment": delta.normalize().to_string()
            }),
            reasoning: format!(
                "{} {} matched: {} = ${}",
                signal_name(rule.signal),
                value.round_dp(4).normalize(),
                detail,
                delta.round_dp(4).normalize()
            ),
        });
        step_number += 1;
    }

    InteractionResult {
        adjustment,
        signals,
        matched_rules,
        audit_steps,
    }
}
