//! Travel Reimbursement Engine
//!
//! This crate reproduces a legacy travel-reimbursement system. A completed
//! trip (days, miles, receipts) flows through a fixed pipeline of pure
//! stages: validation, per-diem, tiered mileage, receipt adjustment, the
//! cross-factor interaction adjustment, aggregation and rounding. Every
//! breakpoint and rate is policy data loaded from YAML, and every stage
//! records an audit step explaining its contribution.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod telemetry;

pub use engine::ReimbursementEngine;
