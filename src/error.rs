//! Error types for the Reimbursement Engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate.
//! Only two things can go wrong: a caller supplies bad trip input, or the
//! deployed policy is broken. The latter is detected once, when the policy
//! is loaded, never per calculation.

use thiserror::Error;

/// The main error type for the Reimbursement Engine.
///
/// # Example
///
/// ```
/// use reimbursement_engine::error::EngineError;
///
/// let error = EngineError::InvalidInput {
///     field: "miles_traveled".to_string(),
///     message: "must not be negative".to_string(),
/// };
/// assert_eq!(
///     error.to_string(),
///     "Invalid input 'miles_traveled': must not be negative"
/// );
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// A trip argument was non-numeric, negative, non-integral or out of range.
    #[error("Invalid input '{field}': {message}")]
    InvalidInput {
        /// The name of the offending argument.
        field: String,
        /// A description of what made the value invalid.
        message: String,
    },

    /// The policy configuration is structurally invalid (for example a
    /// mileage table with a gap between tiers).
    #[error("Invalid policy configuration in '{section}': {message}")]
    PolicyConfiguration {
        /// The policy section that failed validation.
        section: String,
        /// A description of the problem.
        message: String,
    },

    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },
}

impl EngineError {
    /// Builds an [`EngineError::InvalidInput`] for the given field.
    pub fn invalid_input(field: &str, message: impl Into<String>) -> Self {
        EngineError::InvalidInput {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// Builds an [`EngineError::PolicyConfiguration`] for the given section.
    pub fn policy(section: &str, message: impl Into<String>) -> Self {
        EngineError::PolicyConfiguration {
            section: section.to_string(),
            message: message.into(),
        }
    }

    /// Returns true when the error was caused by the caller's trip input
    /// rather than by the deployment.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, EngineError::InvalidInput { .. })
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_displays_field_and_message() {
        let error = EngineError::invalid_input("trip_duration_days", "must be a whole number");
        assert_eq!(
            error.to_string(),
            "Invalid input 'trip_duration_days': must be a whole number"
        );
    }

    #[test]
    fn test_policy_configuration_displays_section_and_message() {
        let error = EngineError::policy("mileage", "tier 2 does not start where tier 1 ends");
        assert_eq!(
            error.to_string(),
            "Invalid policy configuration in 'mileage': tier 2 does not start where tier 1 ends"
        );
    }

    #[test]
    fn test_config_not_found_displays_path() {
        let error = EngineError::ConfigNotFound {
            path: "/missing/policy.yaml".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Configuration file not found: /missing/policy.yaml"
        );
    }

    #[test]
    fn test_config_parse_error_displays_path_and_message() {
        let error = EngineError::ConfigParseError {
            path: "/config/bad.yaml".to_string(),
            message: "invalid YAML syntax".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to parse configuration file '/config/bad.yaml': invalid YAML syntax"
        );
    }

    #[test]
    fn test_is_invalid_input_only_for_input_errors() {
        assert!(EngineError::invalid_input("miles_traveled", "bad").is_invalid_input());
        assert!(!EngineError::policy("rounding", "bad").is_invalid_input());
        assert!(
            !EngineError::ConfigNotFound {
                path: "x".to_string()
            }
            .is_invalid_input()
        );
    }

    #[test]
    fn test_errors_implement_std_error() {
        fn assert_error<T: std::error::Error + Send + Sync + 'static>() {}
        assert_error::<EngineError>();
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn fails() -> EngineResult<()> {
            Err(EngineError::invalid_input("miles_traveled", "not a number"))
        }

        fn propagates() -> EngineResult<()> {
            fails()?;
            Ok(())
        }

        assert!(propagates().is_err());
    }
}
