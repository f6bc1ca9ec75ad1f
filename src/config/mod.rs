//! Policy configuration for the Reimbursement Engine.
//!
//! This module loads the reimbursement policy (per-diem bands, mileage
//! tiers, receipt rules, interaction rules, aggregation and rounding) from
//! YAML files and validates it once, at load time.
//!
//! # Example
//!
//! ```no_run
//! use reimbursement_engine::config::ConfigLoader;
//!
//! let loader = ConfigLoader::load("./config/acme_legacy").unwrap();
//! println!("Loaded policy: {}", loader.policy().metadata().name);
//! ```

mod loader;
mod types;
mod validation;

pub use loader::ConfigLoader;
pub use types::{
    AdjustmentEffect, AggregationPolicy, DurationBand, InteractionPolicy, InteractionRule,
    LogisticGate, LongTripPenalty, MileageTier, PerDiemPolicy, PolicyConfig, PolicyFile,
    PolicyMetadata, RateTable, RatioSignal, ReceiptCondition, ReceiptPolicy, ReceiptRule,
    RoundingMode, RoundingPolicy, band_for,
};
pub use validation::{MAX_DECIMAL_PLACES, validate_rate_table};
