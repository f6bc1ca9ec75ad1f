//! Structural validation of a policy.
//!
//! Runs once when the policy is assembled. A policy that passes here can
//! evaluate every valid trip without further checks.

use std::collections::HashSet;

use rust_decimal::Decimal;
use tracing::warn;

use crate::error::{EngineError, EngineResult};

use super::types::{DurationBand, PolicyConfig, RateTable, ReceiptPolicy};

/// Largest number of fractional digits the rounding stage accepts.
pub const MAX_DECIMAL_PLACES: u32 = 10;

/// Validates every section of the policy.
pub fn validate_policy(config: &PolicyConfig) -> EngineResult<()> {
    let result = validate_sections(config);
    if let Err(ref err) = result {
        warn!(policy = %config.metadata().code, error = %err, "Rejected policy configuration");
    }
    result
}

fn validate_sections(config: &PolicyConfig) -> EngineResult<()> {
    let per_diem = config.per_diem();
    non_negative("per_diem", "daily_rate", per_diem.daily_rate)?;
    validate_bands("per_diem", &per_diem.duration_bands, false)?;

    validate_rate_table(config.mileage())?;
    validate_receipts(config.receipts())?;

    let interaction = config.interaction();
    if let Some(gate) = &interaction.receipt_gate {
        non_negative("interaction", "receipt_gate.slope", gate.slope)?;
        if gate.min_miles <= Decimal::ZERO {
            return Err(EngineError::policy(
                "interaction",
                "receipt_gate.min_miles must be greater than zero",
            ));
        }
    }
    if let Some(long_trip) = &interaction.long_trip {
        non_negative("interaction", "long_trip.penalty_per_day", long_trip.penalty_per_day)?;
    }
    let mut ids = HashSet::new();
    for rule in &interaction.rules {
        if !ids.insert(rule.id.as_str()) {
            return Err(EngineError::policy(
                "interaction",
                format!("duplicate rule id '{}'", rule.id),
            ));
        }
        if let (Some(min), Some(max)) = (rule.min, rule.max) {
            if min >= max {
                return Err(EngineError::policy(
                    "interaction",
                    format!("rule '{}' has min {} not below max {}", rule.id, min, max),
                ));
            }
        }
    }

    let aggregation = config.aggregation();
    if let (Some(min), Some(max)) = (aggregation.minimum_total, aggregation.maximum_total) {
        if min > max {
            return Err(EngineError::policy(
                "aggregation",
                format!("minimum_total {} exceeds maximum_total {}", min, max),
            ));
        }
    }
    validate_bands("aggregation", &aggregation.scale_bands, true)?;

    if config.rounding().decimal_places > MAX_DECIMAL_PLACES {
        return Err(EngineError::policy(
            "rounding",
            format!(
                "decimal_places {} exceeds the maximum of {}",
                config.rounding().decimal_places,
                MAX_DECIMAL_PLACES
            ),
        ));
    }

    Ok(())
}

/// Checks that mileage tiers are contiguous, non-overlapping and cover
/// `[0, ∞)` with non-negative rates.
pub fn validate_rate_table(table: &RateTable) -> EngineResult<()> {
    let Some(first) = table.tiers.first() else {
        return Err(EngineError::policy("mileage", "rate table has no tiers"));
    };
    if first.lower_bound != Decimal::ZERO {
        return Err(EngineError::policy(
            "mileage",
            format!("first tier starts at {} instead of 0", first.lower_bound),
        ));
    }

    let last_index = table.tiers.len() - 1;
    for (index, tier) in table.tiers.iter().enumerate() {
        let number = index + 1;
        non_negative("mileage", &format!("tier {} rate", number), tier.rate)?;

        match tier.upper_bound {
            Some(upper) if index == last_index => {
                return Err(EngineError::policy(
                    "mileage",
                    format!("last tier ends at {} but must be unbounded", upper),
                ));
            }
            Some(upper) => {
                if upper <= tier.lower_bound {
                    return Err(EngineError::policy(
                        "mileage",
                        format!(
                            "tier {} upper bound {} is not above its lower bound {}",
                            number, upper, tier.lower_bound
                        ),
                    ));
                }
                let next = &table.tiers[index + 1];
                if next.lower_bound != upper {
                    return Err(EngineError::policy(
                        "mileage",
                        format!(
                            "tier {} starts at {} but tier {} ends at {}",
                            number + 1,
                            next.lower_bound,
                            number,
                            upper
                        ),
                    ));
                }
            }
            None if index != last_index => {
                return Err(EngineError::policy(
                    "mileage",
                    format!("tier {} is unbounded but is not the last tier", number),
                ));
            }
            None => {}
        }
    }

    Ok(())
}

/// Checks that duration bands are contiguous from day 0 and end unbounded.
///
/// An empty list is accepted only when `allow_empty` is set.
fn validate_bands(section: &str, bands: &[DurationBand], allow_empty: bool) -> EngineResult<()> {
    if bands.is_empty() {
        return if allow_empty {
            Ok(())
        } else {
            Err(EngineError::policy(section, "no duration bands configured"))
        };
    }

    let mut expected_start = Some(0);
    for (index, band) in bands.iter().enumerate() {
        let number = index + 1;
        if expected_start != Some(band.min_days) {
            return Err(EngineError::policy(
                section,
                format!("duration band {} does not start where the previous band ends", number),
            ));
        }
        if let Some(max) = band.max_days {
            if max <= band.min_days {
                return Err(EngineError::policy(
                    section,
                    format!("duration band {} is empty", number),
                ));
            }
        }
        non_negative(section, &format!("duration band {} multiplier", number), band.multiplier)?;
        expected_start = band.max_days;
    }

    if expected_start.is_some() {
        return Err(EngineError::policy(
            section,
            "last duration band must be unbounded",
        ));
    }
    Ok(())
}

fn validate_receipts(policy: &ReceiptPolicy) -> EngineResult<()> {
    let Some(last) = policy.rules.last() else {
        return Err(EngineError::policy("receipts", "no receipt rules configured"));
    };
    if !last.when.is_unconditional() {
        return Err(EngineError::policy(
            "receipts",
            format!("last rule '{}' must not have conditions", last.id),
        ));
    }

    let mut ids = HashSet::new();
    for rule in &policy.rules {
        if !ids.insert(rule.id.as_str()) {
            return Err(EngineError::policy(
                "receipts",
                format!("duplicate rule id '{}'", rule.id),
            ));
        }
        non_negative("receipts", &format!("rule '{}' fraction", rule.id), rule.fraction)?;
        for (name, value) in [("cap", rule.cap), ("floor", rule.floor), ("penalty", rule.penalty)] {
            if let Some(value) = value {
                non_negative("receipts", &format!("rule '{}' {}", rule.id, name), value)?;
            }
        }
    }
    Ok(())
}

fn non_negative(section: &str, what: &str, value: Decimal) -> EngineResult<()> {
    if value < Decimal::ZERO {
        return Err(EngineError::policy(
            section,
            format!("{} must not be negative (got {})", what, value),
        ));
    }
    Ok(())
}
