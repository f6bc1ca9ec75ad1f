//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading a
//! reimbursement policy from YAML files, either from disk or from the copy
//! compiled into the binary.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::info;

use crate::error::{EngineError, EngineResult};

use super::types::{
    InteractionPolicy, PerDiemPolicy, PolicyConfig, PolicyFile, RateTable, ReceiptPolicy,
};

const POLICY_FILE: &str = "policy.yaml";
const PER_DIEM_FILE: &str = "per_diem.yaml";
const MILEAGE_FILE: &str = "mileage.yaml";
const RECEIPTS_FILE: &str = "receipts.yaml";
const INTERACTIONS_FILE: &str = "interactions.yaml";

const BUILTIN_DIR: &str = "builtin:acme_legacy";
const BUILTIN_POLICY: &str = include_str!("../../config/acme_legacy/policy.yaml");
const BUILTIN_PER_DIEM: &str = include_str!("../../config/acme_legacy/per_diem.yaml");
const BUILTIN_MILEAGE: &str = include_str!("../../config/acme_legacy/mileage.yaml");
const BUILTIN_RECEIPTS: &str = include_str!("../../config/acme_legacy/receipts.yaml");
const BUILTIN_INTERACTIONS: &str = include_str!("../../config/acme_legacy/interactions.yaml");

/// Loads and provides access to a reimbursement policy.
///
/// # Directory Structure
///
/// ```text
/// config/acme_legacy/
/// ├── policy.yaml        # Metadata, aggregation and rounding
/// ├── per_diem.yaml      # Daily rate and duration bands
/// ├── mileage.yaml       # Tiered mileage rate table
/// ├── receipts.yaml      # Ordered receipt rules
/// └── interactions.yaml  # Receipt gate, long-trip penalty, ratio rules
/// ```
///
/// The loaded policy is validated before it is returned and shared behind
/// an [`Arc`], so it is cheap to hand to many engines and never changes
/// after loading.
///
/// # Example
///
/// ```
/// use reimbursement_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::builtin()?;
/// assert_eq!(loader.policy().metadata().code, "acme_legacy");
/// # Ok::<(), reimbursement_engine::error::EngineError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    policy: Arc<PolicyConfig>,
}

impl ConfigLoader {
    /// Loads a policy from the specified directory.
    ///
    /// Returns an error if any file is missing (`ConfigNotFound`), is not
    /// valid YAML for its section (`ConfigParseError`), or if the assembled
    /// policy is structurally invalid (`PolicyConfiguration`).
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let policy = Self::load_yaml::<PolicyFile>(&path.join(POLICY_FILE))?;
        let per_diem = Self::load_yaml::<PerDiemPolicy>(&path.join(PER_DIEM_FILE))?;
        let mileage = Self::load_yaml::<RateTable>(&path.join(MILEAGE_FILE))?;
        let receipts = Self::load_yaml::<ReceiptPolicy>(&path.join(RECEIPTS_FILE))?;
        let interaction = Self::load_yaml::<InteractionPolicy>(&path.join(INTERACTIONS_FILE))?;

        let config = PolicyConfig::new(policy, per_diem, mileage, receipts, interaction)?;
        info!(
            path = %path.display(),
            policy = %config.metadata().code,
            version = %config.metadata().version,
            "Loaded reimbursement policy"
        );

        Ok(Self::from_policy(config))
    }

    /// Loads the policy compiled into the crate.
    pub fn builtin() -> EngineResult<Self> {
        let policy = Self::parse_yaml::<PolicyFile>(BUILTIN_POLICY, BUILTIN_DIR, POLICY_FILE)?;
        let per_diem =
            Self::parse_yaml::<PerDiemPolicy>(BUILTIN_PER_DIEM, BUILTIN_DIR, PER_DIEM_FILE)?;
        let mileage = Self::parse_yaml::<RateTable>(BUILTIN_MILEAGE, BUILTIN_DIR, MILEAGE_FILE)?;
        let receipts =
            Self::parse_yaml::<ReceiptPolicy>(BUILTIN_RECEIPTS, BUILTIN_DIR, RECEIPTS_FILE)?;
        let interaction = Self::parse_yaml::<InteractionPolicy>(
            BUILTIN_INTERACTIONS,
            BUILTIN_DIR,
            INTERACTIONS_FILE,
        )?;

        let config = PolicyConfig::new(policy, per_diem, mileage, receipts, interaction)?;
        Ok(Self::from_policy(config))
    }

    /// Wraps an already validated policy.
    pub fn from_policy(policy: PolicyConfig) -> Self {
        Self {
            policy: Arc::new(policy),
        }
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    fn parse_yaml<T: DeserializeOwned>(content: &str, dir: &str, file: &str) -> EngineResult<T> {
        serde_yaml::from_str(content).map_err(|e| EngineError::ConfigParseError {
            path: format!("{}/{}", dir, file),
            message: e.to_string(),
        })
    }

    /// Returns the loaded policy.
    pub fn policy(&self) -> &PolicyConfig {
        &self.policy
    }

    /// Returns a shared handle to the loaded policy.
    pub fn shared(&self) -> Arc<PolicyConfig> {
        Arc::clone(&self.policy)
    }
}
