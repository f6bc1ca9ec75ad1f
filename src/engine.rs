//! The reimbursement pipeline.
//!
//! [`ReimbursementEngine`] wires the stages together:
//!
//! ```text
//! validate → { per-diem, mileage, receipts } → interaction → aggregate → round
//! ```
//!
//! Every stage is a pure function of the trip and the policy. The engine
//! holds nothing but a shared, immutable policy snapshot, so one engine can
//! serve any number of threads.

use std::sync::Arc;

use tracing::debug;

use crate::calculation::{
    aggregate_partials, apply_rounding, calculate_interaction, calculate_mileage,
    calculate_per_diem, calculate_receipts, validate_trip,
};
use crate::config::{ConfigLoader, PolicyConfig};
use crate::error::EngineResult;
use crate::models::{AuditTrace, PartialAmounts, Reimbursement, TripInput};

/// Computes reimbursements under one policy.
///
/// # Example
///
/// ```
/// use reimbursement_engine::ReimbursementEngine;
///
/// let engine = ReimbursementEngine::builtin()?;
/// let reimbursement = engine.calculate_raw("3", "100", "50.00")?;
/// assert_eq!(reimbursement.result.to_string(), "126.22");
/// # Ok::<(), reimbursement_engine::error::EngineError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ReimbursementEngine {
    policy: Arc<PolicyConfig>,
}

impl ReimbursementEngine {
    /// Creates an engine over a shared policy.
    pub fn new(policy: Arc<PolicyConfig>) -> Self {
        Self { policy }
    }

    /// Creates an engine over the policy held by a loader.
    pub fn from_loader(loader: &ConfigLoader) -> Self {
        Self::new(loader.shared())
    }

    /// Creates an engine over the builtin policy.
    pub fn builtin() -> EngineResult<Self> {
        Ok(Self::from_loader(&ConfigLoader::builtin()?))
    }

    /// Returns the policy this engine calculates with.
    pub fn policy(&self) -> &PolicyConfig {
        &self.policy
    }

    /// Validates the raw arguments and calculates the reimbursement.
    ///
    /// Fails only with `InvalidInput`; no partial result is produced.
    pub fn calculate_raw(
        &self,
        duration_days: &str,
        miles: &str,
        receipts: &str,
    ) -> EngineResult<Reimbursement> {
        let trip = validate_trip(duration_days, miles, receipts)?;
        Ok(self.calculate(&trip))
    }

    /// Calculates the reimbursement for a validated trip.
    pub fn calculate(&self, trip: &TripInput) -> Reimbursement {
        let policy = &*self.policy;
        let mut steps = Vec::new();
        let mut step_number = 1;

        let per_diem = calculate_per_diem(trip, policy.per_diem(), step_number);
        steps.push(per_diem.audit_step);
        step_number += 1;

        let mileage = calculate_mileage(trip.miles_traveled, policy.mileage(), step_number);
        steps.push(mileage.audit_step);
        step_number += 1;

        let receipts = calculate_receipts(trip, policy.receipts(), step_number);
        steps.push(receipts.audit_step);
        step_number += 1;

        let base = PartialAmounts {
            per_diem: per_diem.amount,
            mileage: mileage.amount,
            receipts: receipts.amount,
            adjustment: rust_decimal::Decimal::ZERO,
        };

        let interaction = calculate_interaction(trip, &base, policy.interaction(), step_number);
        step_number += interaction.audit_steps.len() as u32;
        steps.extend(interaction.audit_steps);

        let partials = PartialAmounts {
            adjustment: interaction.adjustment,
            ..base
        };

        let aggregation = aggregate_partials(&partials, trip, policy.aggregation(), step_number);
        steps.push(aggregation.audit_step);
        step_number += 1;

        let rounding = apply_rounding(aggregation.combined, policy.rounding(), step_number);
        steps.push(rounding.audit_step);

        debug!(
            duration_days = trip.duration_days,
            miles = %trip.miles_traveled,
            receipts = %trip.receipts_amount,
            per_diem = %partials.per_diem,
            mileage = %partials.mileage,
            receipt_partial = %partials.receipts,
            adjustment = %partials.adjustment,
            gate = %interaction.signals.gate,
            combined = %aggregation.combined,
            amount = %rounding.result.amount,
            "Calculated reimbursement"
        );

        Reimbursement {
            policy_version: policy.metadata().version.clone(),
            input: *trip,
            partials,
            combined: aggregation.combined,
            result: rounding.result,
            audit_trace: AuditTrace {
                steps,
                warnings: aggregation.warnings,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn engine() -> ReimbursementEngine {
        ReimbursementEngine::builtin().unwrap()
    }

    #[test]
    fn test_reference_scenario() {
        let result = engine().calculate_raw("3", "100", "50.00").unwrap();
        assert_eq!(result.amount(), dec("126.22"));
        assert_eq!(result.result.to_string(), "126.22");
    }

    #[test]
    fn test_partials_feed_combined() {
        let result = engine().calculate_raw("3", "100", "50.00").unwrap();

        assert_eq!(result.partials.per_diem, dec("348.9969021"));
        assert_eq!(result.partials.mileage, dec("45.118319"));
        assert_eq!(result.partials.receipts, dec("26.2982745"));
        assert_eq!(
            result.combined,
            result.partials.total() + dec("-268.98059207")
        );
    }

    #[test]
    fn test_audit_trace_has_one_step_per_stage() {
        let result = engine().calculate_raw("3", "100", "50.00").unwrap();
        let ids: Vec<&str> = result
            .audit_trace
            .steps
            .iter()
            .map(|s| s.rule_id.as_str())
            .collect();
        assert_eq!(
            ids,
            vec!["per_diem", "mileage_tiers", "receipts", "receipt_gate", "aggregation", "rounding"]
        );
        let numbers: Vec<u32> = result.audit_trace.steps.iter().map(|s| s.step_number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_long_trip_adds_penalty_step() {
        let result = engine().calculate_raw("10", "200", "1500").unwrap();
        assert_eq!(result.amount(), dec("1439.48"));
        assert!(
            result
                .audit_trace
                .steps
                .iter()
                .any(|s| s.rule_id == "long_trip_penalty")
        );
    }

    #[test]
    fn test_null_trip_is_zero_with_warning() {
        let result = engine().calculate_raw("0", "0", "0").unwrap();
        assert_eq!(result.result.to_string(), "0.00");
        assert_eq!(result.audit_trace.warnings.len(), 1);
    }

    #[test]
    fn test_invalid_input_fails_fast() {
        let err = engine().calculate_raw("2", "abc", "10").unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_repeated_calculation_is_identical() {
        let engine = engine();
        let a = engine.calculate_raw("5", "250", "150.75").unwrap();
        let b = engine.calculate_raw("5", "250", "150.75").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_engine_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ReimbursementEngine>();
    }
}
