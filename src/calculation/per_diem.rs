//! Per-diem calculation functionality.
//!
//! The per-diem partial is `duration_days × daily_rate × multiplier`, where
//! the multiplier comes from the duration band covering the trip length.
//! Bonus and penalty curves for very short or very long trips are expressed
//! as bands in `per_diem.yaml`, not as code.

use rust_decimal::Decimal;

use crate::config::{PerDiemPolicy, band_for};
use crate::models::{AuditStep, TripInput};

/// The result of the per-diem calculation, including the audit step.
#[derive(Debug, Clone)]
pub struct PerDiemResult {
    /// The per-diem partial amount.
    pub amount: Decimal,
    /// The duration multiplier that was applied.
    pub multiplier: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Calculates the per-diem partial for a trip.
///
/// A validated policy always has a band covering every day count; should
/// none match, the multiplier falls back to 1.
///
/// # Examples
///
/// ```
/// use reimbursement_engine::calculation::calculate_per_diem;
/// use reimbursement_engine::config::{DurationBand, PerDiemPolicy};
/// use reimbursement_engine::models::TripInput;
/// use rust_decimal::Decimal;
///
/// let policy = PerDiemPolicy {
///     daily_rate: Decimal::from(100),
///     duration_bands: vec![
///         DurationBand { min_days: 0, max_days: Some(5), multiplier: Decimal::ONE },
///         DurationBand { min_days: 5, max_days: None, multiplier: Decimal::new(9, 1) },
///     ],
/// };
///
/// let trip = TripInput::new(6, Decimal::ZERO, Decimal::ZERO).unwrap();
/// let result = calculate_per_diem(&trip, &policy, 1);
/// assert_eq!(result.amount, Decimal::from(540));
/// ```
pub fn calculate_per_diem(trip: &TripInput, policy: &PerDiemPolicy, step_number: u32) -> PerDiemResult {
    let days = Decimal::from(trip.duration_days);
    let band = band_for(&policy.duration_bands, trip.duration_days);
    let multiplier = band.map_or(Decimal::ONE, |b| b.multiplier);
    let amount = days * policy.daily_rate * multiplier;

    let band_label = match band {
        Some(b) => match b.max_days {
            Some(max) => format!("{}-{} days", b.min_days, max - 1),
            None => format!("{}+ days", b.min_days),
        },
        None => "no band".to_string(),
    };

    let reasoning = if multiplier == Decimal::ONE {
        format!(
            "{} days x ${} = ${}",
            trip.duration_days,
            policy.daily_rate.normalize(),
            amount.normalize()
        )
    } else {
        format!(
            "{} days x ${} x {} ({}) = ${}",
            trip.duration_days,
            policy.daily_rate.normalize(),
            multiplier.normalize(),
            band_label,
            amount.normalize()
        )
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "per_diem".to_string(),
        rule_name: "Per-Diem Allowance".to_string(),
        input: serde_json::json!({
            "duration_days": trip.duration_days,
            "daily_rate": policy.daily_rate.normalize().to_string()
        }),
        output: serde_json::json!({
            "band": band_label,
            "multiplier": multiplier.normalize().to_string(),
            "amount": amount.normalize().to_string()
        }),
        reasoning,
    };

    PerDiemResult {
        amount,
        multiplier,
        audit_step,
    }
}
