//! Configuration types for the reimbursement policy.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from the YAML policy files. Every breakpoint, rate and
//! threshold the engine uses lives here as data.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Metadata about the policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyMetadata {
    /// Short identifier of the policy (e.g., "acme_legacy").
    pub code: String,
    /// The human-readable name of the policy.
    pub name: String,
    /// The calibration version of the policy.
    pub version: String,
    /// ISO currency code the amounts are expressed in.
    pub currency: String,
}

/// A range of whole trip days and the multiplier applied within it.
///
/// `min_days` is inclusive, `max_days` is exclusive; `None` means unbounded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationBand {
    /// First day count covered by this band.
    pub min_days: u32,
    /// First day count no longer covered, or `None` for the open-ended band.
    #[serde(default)]
    pub max_days: Option<u32>,
    /// Multiplier applied to amounts falling in this band.
    pub multiplier: Decimal,
}

impl DurationBand {
    /// Returns true if `days` falls inside this band.
    pub fn contains(&self, days: u32) -> bool {
        days >= self.min_days && self.max_days.is_none_or(|max| days < max)
    }
}

/// Finds the band covering `days` in an ordered band list.
pub fn band_for(bands: &[DurationBand], days: u32) -> Option<&DurationBand> {
    bands.iter().find(|band| band.contains(days))
}

/// Per-diem configuration from per_diem.yaml.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerDiemPolicy {
    /// Allowance paid per trip day.
    pub daily_rate: Decimal,
    /// Bonus/penalty curve over trip length, ordered by `min_days`.
    pub duration_bands: Vec<DurationBand>,
}

/// A single tier of the mileage rate table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MileageTier {
    /// Inclusive lower bound in miles.
    pub lower_bound: Decimal,
    /// Exclusive upper bound in miles, or `None` for the last tier.
    #[serde(default)]
    pub upper_bound: Option<Decimal>,
    /// Marginal rate paid per mile inside this tier.
    pub rate: Decimal,
}

/// The ordered mileage rate table from mileage.yaml.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateTable {
    /// Contiguous tiers covering `[0, ∞)`.
    pub tiers: Vec<MileageTier>,
}

/// Conditions a receipt rule must satisfy to match.
///
/// Unset conditions always hold. Lower bounds are inclusive, upper bounds
/// exclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptCondition {
    /// Minimum receipts amount.
    #[serde(default)]
    pub min_amount: Option<Decimal>,
    /// Receipts amount the rule stops applying at.
    #[serde(default)]
    pub max_amount: Option<Decimal>,
    /// Minimum trip length in days.
    #[serde(default)]
    pub min_days: Option<u32>,
    /// Trip length the rule stops applying at.
    #[serde(default)]
    pub max_days: Option<u32>,
    /// Minimum receipts per day.
    #[serde(default)]
    pub min_daily_spend: Option<Decimal>,
    /// Receipts per day the rule stops applying at.
    #[serde(default)]
    pub max_daily_spend: Option<Decimal>,
}

impl ReceiptCondition {
    /// Returns true if no condition is set, i.e. the rule matches any trip.
    pub fn is_unconditional(&self) -> bool {
        self == &ReceiptCondition::default()
    }
}

/// A receipt handling rule. Rules are evaluated top to bottom and the
/// first matching rule wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptRule {
    /// Unique identifier of the rule.
    pub id: String,
    /// The human-readable name of the rule.
    pub name: String,
    /// When this rule applies.
    #[serde(default)]
    pub when: ReceiptCondition,
    /// Receipts above this amount are ignored.
    #[serde(default)]
    pub cap: Option<Decimal>,
    /// Share of the (capped) receipts that is reimbursed.
    pub fraction: Decimal,
    /// Minimum amount reimbursed when this rule applies.
    #[serde(default)]
    pub floor: Option<Decimal>,
    /// Flat amount deducted when this rule applies.
    #[serde(default)]
    pub penalty: Option<Decimal>,
}

/// Receipt configuration from receipts.yaml.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptPolicy {
    /// Ordered rules; the last one must be unconditional.
    pub rules: Vec<ReceiptRule>,
}

/// Logistic gate over the receipts-to-miles ratio.
///
/// `gate = 1 / (1 + e^(-slope * (ratio - center_ratio)))`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogisticGate {
    /// Ratio at which the gate is one half.
    pub center_ratio: Decimal,
    /// Steepness of the gate.
    pub slope: Decimal,
    /// Mileage used as divisor when fewer miles were traveled.
    pub min_miles: Decimal,
}

fn default_gated() -> bool {
    true
}

/// Per-day deduction for trips longer than a threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LongTripPenalty {
    /// Last day count that is not penalised.
    pub threshold_days: u32,
    /// Amount deducted for each day beyond the threshold.
    pub penalty_per_day: Decimal,
    /// Whether the receipt gate scales the penalty.
    #[serde(default = "default_gated")]
    pub gated: bool,
}

/// A derived ratio the interaction rules can react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatioSignal {
    /// Miles per trip day.
    Efficiency,
    /// Receipts per trip day.
    SpendRate,
    /// Receipts per mile.
    ReceiptsPerMile,
}

/// The correction an interaction rule applies when it matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AdjustmentEffect {
    /// Adds a fixed amount (negative to deduct).
    Flat {
        /// Amount added.
        amount: Decimal,
    },
    /// Adds an amount per trip day.
    PerDay {
        /// Amount added per day.
        amount: Decimal,
    },
    /// Scales the sum of the base partials by `factor`.
    ScaleSubtotal {
        /// Multiplier applied to the subtotal.
        factor: Decimal,
    },
}

/// A threshold rule over one derived ratio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionRule {
    /// Unique identifier of the rule.
    pub id: String,
    /// The human-readable name of the rule.
    pub name: String,
    /// The ratio this rule watches.
    pub signal: RatioSignal,
    /// Inclusive lower threshold.
    #[serde(default)]
    pub min: Option<Decimal>,
    /// Exclusive upper threshold.
    #[serde(default)]
    pub max: Option<Decimal>,
    /// Minimum trip length for the rule to apply.
    #[serde(default)]
    pub min_days: Option<u32>,
    /// Trip length the rule stops applying at.
    #[serde(default)]
    pub max_days: Option<u32>,
    /// What happens when the rule matches.
    pub effect: AdjustmentEffect,
}

/// Cross-factor configuration from interactions.yaml.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionPolicy {
    /// Gate scaling the receipt partial, if any.
    #[serde(default)]
    pub receipt_gate: Option<LogisticGate>,
    /// Long-trip deduction, if any.
    #[serde(default)]
    pub long_trip: Option<LongTripPenalty>,
    /// Ratio threshold rules; every matching rule applies.
    #[serde(default)]
    pub rules: Vec<InteractionRule>,
}

/// How the partial amounts are combined.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationPolicy {
    /// Fixed amount added to every trip.
    #[serde(default)]
    pub base_offset: Decimal,
    /// Lowest total the engine will report.
    #[serde(default)]
    pub minimum_total: Option<Decimal>,
    /// Highest total the engine will report.
    #[serde(default)]
    pub maximum_total: Option<Decimal>,
    /// Duration-based scale factor; empty means no scaling.
    #[serde(default)]
    pub scale_bands: Vec<DurationBand>,
}

/// The rounding convention applied to the final amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingMode {
    /// Halves round away from zero.
    HalfUp,
    /// Halves round to the even neighbour (banker's rounding).
    HalfEven,
    /// Extra digits are dropped.
    Truncate,
}

/// Rounding configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundingPolicy {
    /// The rounding convention.
    pub strategy: RoundingMode,
    /// Number of fractional digits of the currency's minor unit.
    pub decimal_places: u32,
}

/// Top-level policy.yaml structure.
#[derive(Debug, Clone, Deserialize)]
pub struct PolicyFile {
    /// Policy metadata.
    pub metadata: PolicyMetadata,
    /// Aggregation rules.
    #[serde(default)]
    pub aggregation: AggregationPolicy,
    /// Rounding rules.
    pub rounding: RoundingPolicy,
}

/// The complete, validated policy.
///
/// A `PolicyConfig` can only be obtained through [`PolicyConfig::new`],
/// which rejects structurally broken policies, so every instance in
/// circulation is safe to calculate with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyConfig {
    metadata: PolicyMetadata,
    per_diem: PerDiemPolicy,
    mileage: RateTable,
    receipts: ReceiptPolicy,
    interaction: InteractionPolicy,
    aggregation: AggregationPolicy,
    rounding: RoundingPolicy,
}

impl PolicyConfig {
    /// Assembles a policy from its sections and validates it.
    pub fn new(
        policy: PolicyFile,
        per_diem: PerDiemPolicy,
        mileage: RateTable,
        receipts: ReceiptPolicy,
        interaction: InteractionPolicy,
    ) -> crate::error::EngineResult<Self> {
        let config = Self {
            metadata: policy.metadata,
            per_diem,
            mileage,
            receipts,
            interaction,
            aggregation: policy.aggregation,
            rounding: policy.rounding,
        };
        super::validation::validate_policy(&config)?;
        Ok(config)
    }

    /// Returns the policy metadata.
    pub fn metadata(&self) -> &PolicyMetadata {
        &self.metadata
    }

    /// Returns the per-diem configuration.
    pub fn per_diem(&self) -> &PerDiemPolicy {
        &self.per_diem
    }

    /// Returns the mileage rate table.
    pub fn mileage(&self) -> &RateTable {
        &self.mileage
    }

    /// Returns the receipt rules.
    pub fn receipts(&self) -> &ReceiptPolicy {
        &self.receipts
    }

    /// Returns the interaction configuration.
    pub fn interaction(&self) -> &InteractionPolicy {
        &self.interaction
    }

    /// Returns the aggregation configuration.
    pub fn aggregation(&self) -> &AggregationPolicy {
        &self.aggregation
    }

    /// Returns the rounding configuration.
    pub fn rounding(&self) -> &RoundingPolicy {
        &self.rounding
    }
}
