//! Aggregation of the partial amounts.
//!
//! ```text
//! combined = clamp((per_diem + mileage + receipts + adjustment + base_offset) × scale,
//!                  minimum_total, maximum_total)
//! ```
//!
//! `scale` comes from the duration band covering the trip in
//! `aggregation.scale_bands`, or 1 when no bands are configured.

use rust_decimal::Decimal;

use crate::config::{AggregationPolicy, band_for};
use crate::models::{AuditStep, AuditWarning, PartialAmounts, TripInput};

/// Warning code recorded when the total is raised to the policy minimum.
pub const WARNING_RAISED_TO_MINIMUM: &str = "TOTAL_RAISED_TO_MINIMUM";
/// Warning code recorded when the total is capped at the policy maximum.
pub const WARNING_CAPPED_AT_MAXIMUM: &str = "TOTAL_CAPPED_AT_MAXIMUM";

/// The result of aggregation.
#[derive(Debug, Clone)]
pub struct AggregationResult {
    /// The combined, unrounded amount.
    pub combined: Decimal,
    /// The duration scale factor that was applied.
    pub scale: Decimal,
    /// Warnings raised by clamping.
    pub warnings: Vec<AuditWarning>,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Combines the partial amounts into the unrounded total.
///
/// # Examples
///
/// ```
/// use reimbursement_engine::calculation::aggregate_partials;
/// use reimbursement_engine::config::AggregationPolicy;
/// use reimbursement_engine::models::{PartialAmounts, TripInput};
/// use rust_decimal::Decimal;
///
/// let partials = PartialAmounts {
///     per_diem: Decimal::from(100),
///     mileage: Decimal::from(20),
///     receipts: Decimal::from(10),
///     adjustment: Decimal::from(-5),
/// };
/// let policy = AggregationPolicy {
///     base_offset: Decimal::from(-50),
///     ..Default::default()
/// };
/// let trip = TripInput::new(1, Decimal::from(40), Decimal::from(20)).unwrap();
///
/// let result = aggregate_partials(&partials, &trip, &policy, 6);
/// assert_eq!(result.combined, Decimal::from(75));
/// ```
pub fn aggregate_partials(
    partials: &PartialAmounts,
    trip: &TripInput,
    policy: &AggregationPolicy,
    step_number: u32,
) -> AggregationResult {
    let sum = partials.total() + policy.base_offset;
    let scale = band_for(&policy.scale_bands, trip.duration_days).map_or(Decimal::ONE, |b| b.multiplier);
    let scaled = sum * scale;

    let mut combined = scaled;
    let mut warnings = Vec::new();
    if let Some(min) = policy.minimum_total {
        if combined < min {
            warnings.push(AuditWarning {
                code: WARNING_RAISED_TO_MINIMUM.to_string(),
                message: format!(
                    "Combined amount ${} is below the policy minimum and was raised to ${}",
                    combined.round_dp(4).normalize(),
                    min.normalize()
                ),
                severity: "low".to_string(),
            });
            combined = min;
        }
    }
    if let Some(max) = policy.maximum_total {
        if combined > max {
            warnings.push(AuditWarning {
                code: WARNING_CAPPED_AT_MAXIMUM.to_string(),
                message: format!(
                    "Combined amount ${} exceeds the policy maximum and was capped at ${}",
                    combined.round_dp(4).normalize(),
                    max.normalize()
                ),
                severity: "medium".to_string(),
            });
            combined = max;
        }
    }

    let mut reasoning = format!(
        "${} + ${} + ${} + ${} + offset ${} = ${}",
        partials.per_diem.round_dp(4).normalize(),
        partials.mileage.round_dp(4).normalize(),
        partials.receipts.round_dp(4).normalize(),
        partials.adjustment.round_dp(4).normalize(),
        policy.base_offset.normalize(),
        sum.round_dp(4).normalize()
    );
    if scale != Decimal::ONE {
        reasoning.push_str(&format!(" x {} = ${}", scale.normalize(), scaled.round_dp(4).normalize()));
    }
    if combined != scaled {
        reasoning.push_str(&format!(", clamped to ${}", combined.normalize()));
    }

    let audit_step = AuditStep {
        step_number,
        rule_id: "aggregation".to_string(),
        rule_name: "Aggregation".to_string(),
        input: serde_json::json!({
            "per_diem": partials.per_diem.normalize().to_string(),
            "mileage": partials.mileage.normalize().to_string(),
            "receipts": partials.receipts.normalize().to_string(),
            "adjustment": partials.adjustment.normalize().to_string(),
            "base_offset": policy.base_offset.normalize().to_string()
        }),
        output: serde_json::json!({
            "scale": scale.normalize().to_string(),
            "combined": combined.normalize().to_string(),
            "clamped": combined != scaled
        }),
        reasoning,
    };

    AggregationResult {
        combined,
        scale,
        warnings,
        audit_step,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DurationBand;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn trip(days: u32) -> TripInput {
        TripInput::new(days, Decimal::ZERO, Decimal::ZERO).unwrap()
    }

    fn partials(per_diem: &str, mileage: &str, receipts: &str, adjustment: &str) -> PartialAmounts {
        PartialAmounts {
            per_diem: dec(per_diem),
            mileage: dec(mileage),
            receipts: dec(receipts),
            adjustment: dec(adjustment),
        }
    }

    #[test]
    fn test_default_policy_is_plain_sum() {
        let result = aggregate_partials(
            &partials("300", "45.5", "20.25", "-10"),
            &trip(3),
            &AggregationPolicy::default(),
            7,
        );
        assert_eq!(result.combined, dec("355.75"));
        assert_eq!(result.scale, Decimal::ONE);
        assert!(result.warnings.is_empty());
        assert_eq!(result.audit_step.step_number, 7);
    }

    #[test]
    fn test_legacy_offset_and_minimum() {
        let policy = AggregationPolicy {
            base_offset: dec("-268.98059207"),
            minimum_total: Some(Decimal::ZERO),
            ..Default::default()
        };
        let result = aggregate_partials(&partials("116.3323007", "0", "0", "0"), &trip(1), &policy, 7);

        assert_eq!(result.combined, Decimal::ZERO);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].code, WARNING_RAISED_TO_MINIMUM);
        assert_eq!(result.audit_step.output["clamped"], true);
    }

    #[test]
    fn test_maximum_caps_total() {
        let policy = AggregationPolicy {
            maximum_total: Some(dec("500")),
            ..Default::default()
        };
        let result = aggregate_partials(&partials("400", "200", "0", "0"), &trip(4), &policy, 7);

        assert_eq!(result.combined, dec("500"));
        assert_eq!(result.warnings[0].code, WARNING_CAPPED_AT_MAXIMUM);
        assert!(result.audit_step.reasoning.contains("clamped to $500"));
    }

    #[test]
    fn test_duration_scale_band_applied() {
        let policy = AggregationPolicy {
            scale_bands: vec![
                DurationBand {
                    min_days: 0,
                    max_days: Some(5),
                    multiplier: Decimal::ONE,
                },
                DurationBand {
                    min_days: 5,
                    max_days: None,
                    multiplier: dec("1.1"),
                },
            ],
            ..Default::default()
        };

        let short = aggregate_partials(&partials("100", "0", "0", "0"), &trip(4), &policy, 7);
        let long = aggregate_partials(&partials("100", "0", "0", "0"), &trip(5), &policy, 7);

        assert_eq!(short.combined, dec("100"));
        assert_eq!(long.combined, dec("110"));
        assert_eq!(long.scale, dec("1.1"));
    }

    #[test]
    fn test_combined_is_not_rounded() {
        let result = aggregate_partials(
            &partials("0.001", "0.0002", "0.00003", "0"),
            &trip(1),
            &AggregationPolicy::default(),
            7,
        );
        assert_eq!(result.combined, dec("0.00123"));
    }
}
