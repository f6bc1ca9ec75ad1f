//! Mileage tier calculation functionality.
//!
//! This module prices the distance traveled against the tiered rate table
//! in `mileage.yaml`.
//!
//! ## Rate Structure
//!
//! Tiers are marginal: each tier pays its own rate only for the miles that
//! fall inside it. A tier's lower bound is inclusive and its upper bound
//! exclusive; the last tier is unbounded. With tiers `[0, 100)` at $0.58 and
//! `[100, ∞)` at $0.30, a 150 mile trip pays `100 × 0.58 + 50 × 0.30`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::RateTable;
use crate::models::AuditStep;

/// The miles priced in one tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierCharge {
    /// 1-based tier number.
    pub tier: usize,
    /// Miles priced in this tier.
    pub miles: Decimal,
    /// Rate per mile in this tier.
    pub rate: Decimal,
    /// `miles × rate`.
    pub amount: Decimal,
}

/// The result of the mileage calculation.
#[derive(Debug, Clone)]
pub struct MileageResult {
    /// The mileage partial amount.
    pub amount: Decimal,
    /// Per-tier charges; tiers with no miles are omitted.
    pub charges: Vec<TierCharge>,
    /// The tier the trip distance falls in (1-based).
    pub marginal_tier: usize,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Calculates the mileage partial by walking the rate table.
///
/// # Examples
///
/// ```
/// use reimbursement_engine::calculation::calculate_mileage;
/// use reimbursement_engine::config::{MileageTier, RateTable};
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let table = RateTable {
///     tiers: vec![
///         MileageTier {
///             lower_bound: Decimal::ZERO,
///             upper_bound: Some(Decimal::from(100)),
///             rate: Decimal::from_str("0.58").unwrap(),
///         },
///         MileageTier {
///             lower_bound: Decimal::from(100),
///             upper_bound: None,
///             rate: Decimal::from_str("0.30").unwrap(),
///         },
///     ],
/// };
///
/// let result = calculate_mileage(Decimal::from(150), &table, 2);
/// assert_eq!(result.amount, Decimal::from_str("73").unwrap());
/// assert_eq!(result.charges.len(), 2);
/// ```
pub fn calculate_mileage(miles: Decimal, table: &RateTable, step_number: u32) -> MileageResult {
    let mut charges = Vec::new();
    let mut marginal_tier = 1;

    for (index, tier) in table.tiers.iter().enumerate() {
        if miles < tier.lower_bound {
            break;
        }
        if tier.upper_bound.is_none_or(|upper| miles < upper) {
            marginal_tier = index + 1;
        }

        let reach = match tier.upper_bound {
            Some(upper) => miles.min(upper),
            None => miles,
        };
        let tier_miles = reach - tier.lower_bound;
        if tier_miles > Decimal::ZERO {
            charges.push(TierCharge {
                tier: index + 1,
                miles: tier_miles,
                rate: tier.rate,
                amount: tier_miles * tier.rate,
            });
        }
    }

    let amount: Decimal = charges.iter().map(|c| c.amount).sum();

    let reasoning = if charges.is_empty() {
        "No miles traveled".to_string()
    } else {
        let parts: Vec<String> = charges
            .iter()
            .map(|c| {
                format!(
                    "tier {}: {} mi x ${}",
                    c.tier,
                    c.miles.normalize(),
                    c.rate.normalize()
                )
            })
            .collect();
        format!("{} = ${}", parts.join(" + "), amount.normalize())
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "mileage_tiers".to_string(),
        rule_name: "Tiered Mileage".to_string(),
        input: serde_json::json!({
            "miles_traveled": miles.normalize().to_string(),
            "tier_count": table.tiers.len()
        }),
        output: serde_json::json!({
            "charges": charges.iter().map(|c| serde_json::json!({
                "tier": c.tier,
                "miles": c.miles.normalize().to_string(),
                "rate": c.rate.normalize().to_string(),
                "amount": c.amount.normalize().to_string()
            })).collect::<Vec<_>>(),
            "marginal_tier": marginal_tier,
            "amount": amount.normalize().to_string()
        }),
        reasoning,
    };

    MileageResult {
        amount,
        charges,
        marginal_tier,
        audit_step,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MileageTier;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn three_tier_table() -> RateTable {
        RateTable {
            tiers: vec![
                MileageTier {
                    lower_bound: dec("0"),
                    upper_bound: Some(dec("100")),
                    rate: dec("0.58"),
                },
                MileageTier {
                    lower_bound: dec("100"),
                    upper_bound: Some(dec("500")),
                    rate: dec("0.45"),
                },
                MileageTier {
                    lower_bound: dec("500"),
                    upper_bound: None,
                    rate: dec("0.30"),
                },
            ],
        }
    }

    fn single_tier_table() -> RateTable {
        RateTable {
            tiers: vec![MileageTier {
                lower_bound: dec("0"),
                upper_bound: None,
                rate: dec("0.45118319"),
            }],
        }
    }

    #[test]
    fn test_zero_miles_yields_zero() {
        let result = calculate_mileage(Decimal::ZERO, &three_tier_table(), 1);
        assert!(result.amount.is_zero());
        assert!(result.charges.is_empty());
        assert_eq!(result.marginal_tier, 1);
        assert_eq!(result.audit_step.reasoning, "No miles traveled");
    }

    #[test]
    fn test_single_tier_is_flat_rate() {
        let result = calculate_mileage(dec("100"), &single_tier_table(), 1);
        assert_eq!(result.amount, dec("45.118319"));
    }

    #[test]
    fn test_miles_within_first_tier() {
        let result = calculate_mileage(dec("50"), &three_tier_table(), 1);
        assert_eq!(result.amount, dec("29"));
        assert_eq!(result.charges.len(), 1);
    }

    #[test]
    fn test_marginal_pricing_across_all_tiers() {
        let result = calculate_mileage(dec("600"), &three_tier_table(), 1);
        // 100 × 0.58 + 400 × 0.45 + 100 × 0.30
        assert_eq!(result.amount, dec("268"));
        assert_eq!(result.charges.len(), 3);
        assert_eq!(result.charges[1].miles, dec("400"));
        assert_eq!(result.marginal_tier, 3);
    }

    #[test]
    fn test_boundary_belongs_to_upper_tier() {
        let below = calculate_mileage(dec("99.99"), &three_tier_table(), 1);
        let at = calculate_mileage(dec("100"), &three_tier_table(), 1);
        let above = calculate_mileage(dec("100.01"), &three_tier_table(), 1);

        assert_eq!(below.marginal_tier, 1);
        assert_eq!(below.amount, dec("57.9942"));

        assert_eq!(at.marginal_tier, 2);
        assert_eq!(at.amount, dec("58"));
        assert_eq!(at.charges.len(), 1);

        assert_eq!(above.marginal_tier, 2);
        assert_eq!(above.amount, dec("58.0045"));
        assert_eq!(above.charges.len(), 2);
    }

    #[test]
    fn test_audit_step_lists_charges() {
        let result = calculate_mileage(dec("150"), &three_tier_table(), 2);

        assert_eq!(result.audit_step.step_number, 2);
        assert_eq!(result.audit_step.rule_id, "mileage_tiers");
        assert_eq!(result.audit_step.input["tier_count"], 3);
        assert_eq!(result.audit_step.output["charges"][1]["miles"], "50");
        assert_eq!(result.audit_step.output["amount"], "80.5");
        assert!(result.audit_step.reasoning.contains("tier 2: 50 mi x $0.45"));
    }
}
