//! Input validation functionality.
//!
//! This module turns the three raw trip arguments into a [`TripInput`],
//! rejecting anything that is not a finite, non-negative number (and, for
//! the duration, a whole number of days).

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::str::FromStr;
use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::models::TripInput;

/// Argument name of the trip duration.
pub const FIELD_DURATION: &str = "trip_duration_days";
/// Argument name of the distance traveled.
pub const FIELD_MILES: &str = "miles_traveled";
/// Argument name of the receipts total.
pub const FIELD_RECEIPTS: &str = "total_receipts_amount";

/// Largest miles or receipts value accepted (one trillion).
pub const MAX_SUPPORTED_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0);

const MAX_DECIMAL_PLACES: u32 = 28;

/// Parses and validates the three raw trip arguments.
///
/// Accepts plain decimals (`"50.00"`) and scientific notation (`"1e3"`),
/// with surrounding whitespace ignored.
///
/// # Errors
///
/// Returns [`EngineError::InvalidInput`] naming the first offending argument
/// when a value is empty, non-numeric, negative, out of range, or (for the
/// duration) not a whole number.
///
/// # Examples
///
/// ```
/// use reimbursement_engine::calculation::validate_trip;
///
/// let trip = validate_trip("3", "100", "50.00").unwrap();
/// assert_eq!(trip.duration_days, 3);
///
/// assert!(validate_trip("3.5", "100", "50.00").is_err());
/// assert!(validate_trip("3", "-1", "50.00").is_err());
/// ```
pub fn validate_trip(duration_days: &str, miles: &str, receipts: &str) -> EngineResult<TripInput> {
    let duration_days = parse_number(FIELD_DURATION, duration_days)?;
    let miles = parse_number(FIELD_MILES, miles)?;
    let receipts = parse_number(FIELD_RECEIPTS, receipts)?;
    validate_values(duration_days, miles, receipts)
}

/// Validates already numeric trip values.
pub fn validate_values(
    duration_days: Decimal,
    miles: Decimal,
    receipts: Decimal,
) -> EngineResult<TripInput> {
    let duration_days = whole_days(duration_days)?;
    let miles_traveled = bounded_amount(FIELD_MILES, miles)?;
    let receipts_amount = bounded_amount(FIELD_RECEIPTS, receipts)?;

    debug!(
        duration_days,
        miles = %miles_traveled,
        receipts = %receipts_amount,
        "Validated trip input"
    );

    Ok(TripInput {
        duration_days,
        miles_traveled,
        receipts_amount,
    })
}

fn parse_number(field: &str, raw: &str) -> EngineResult<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(EngineError::invalid_input(field, "value is empty"));
    }

    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| {
            // A finite float spelling that Decimal cannot hold is a range or
            // precision problem, not a malformed number
            let message = match trimmed.parse::<f64>() {
                Ok(value) if value.is_finite() => format!(
                    "'{}' is outside the supported range or precision of {} decimal places",
                    raw,
                    MAX_DECIMAL_PLACES
                ),
                _ => format!("'{}' is not a finite decimal number", raw),
            };
            EngineError::invalid_input(field, message)
        })
}

fn not_negative(field: &str, value: Decimal) -> EngineResult<()> {
    if value < Decimal::ZERO {
        return Err(EngineError::invalid_input(
            field,
            format!("must not be negative (got {})", value),
        ));
    }
    Ok(())
}

fn whole_days(value: Decimal) -> EngineResult<u32> {
    not_negative(FIELD_DURATION, value)?;
    if !value.fract().is_zero() {
        return Err(EngineError::invalid_input(
            FIELD_DURATION,
            format!("must be a whole number of days (got {})", value),
        ));
    }
    value.to_u32().ok_or_else(|| {
        EngineError::invalid_input(
            FIELD_DURATION,
            format!("exceeds the supported maximum of {} days", u32::MAX),
        )
    })
}

fn bounded_amount(field: &str, value: Decimal) -> EngineResult<Decimal> {
    not_negative(field, value)?;
    if value > MAX_SUPPORTED_AMOUNT {
        return Err(EngineError::invalid_input(
            field,
            format!("exceeds the supported maximum of {}", MAX_SUPPORTED_AMOUNT),
        ));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn expect_invalid(result: EngineResult<TripInput>, expected_field: &str, fragment: &str) {
        match result {
            Err(EngineError::InvalidInput { field, message }) => {
                assert_eq!(field, expected_field);
                assert!(message.contains(fragment), "unexpected message: {}", message);
            }
            other => panic!("Expected InvalidInput error, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_trip_parses() {
        let trip = validate_trip("3", "100", "50.00").unwrap();
        assert_eq!(trip.duration_days, 3);
        assert_eq!(trip.miles_traveled, dec("100"));
        assert_eq!(trip.receipts_amount, dec("50.00"));
    }

    #[test]
    fn test_zero_trip_is_legal() {
        let trip = validate_trip("0", "0", "0").unwrap();
        assert_eq!(trip.duration_days, 0);
        assert!(trip.miles_traveled.is_zero());
        assert!(trip.receipts_amount.is_zero());
    }

    #[test]
    fn test_whitespace_is_trimmed() {
        let trip = validate_trip(" 5 ", "\t250\n", " 150.75").unwrap();
        assert_eq!(trip.duration_days, 5);
        assert_eq!(trip.receipts_amount, dec("150.75"));
    }

    #[test]
    fn test_integral_decimal_duration_accepted() {
        assert_eq!(validate_trip("3.0", "1", "1").unwrap().duration_days, 3);
    }

    #[test]
    fn test_scientific_notation_accepted() {
        let trip = validate_trip("2", "1e3", "2.5e1").unwrap();
        assert_eq!(trip.miles_traveled, dec("1000"));
        assert_eq!(trip.receipts_amount, dec("25"));
    }

    #[test]
    fn test_fractional_duration_rejected() {
        expect_invalid(validate_trip("3.5", "100", "50"), FIELD_DURATION, "whole number");
    }

    #[test]
    fn test_negative_values_rejected() {
        expect_invalid(validate_trip("-1", "100", "50"), FIELD_DURATION, "negative");
        expect_invalid(validate_trip("1", "-0.5", "50"), FIELD_MILES, "negative");
        expect_invalid(validate_trip("1", "100", "-50"), FIELD_RECEIPTS, "negative");
    }

    #[test]
    fn test_non_numeric_rejected() {
        expect_invalid(validate_trip("three", "100", "50"), FIELD_DURATION, "not a finite");
        expect_invalid(validate_trip("3", "100mi", "50"), FIELD_MILES, "not a finite");
        expect_invalid(validate_trip("3", "100", "$50"), FIELD_RECEIPTS, "not a finite");
    }

    #[test]
    fn test_non_finite_rejected() {
        expect_invalid(validate_trip("3", "NaN", "50"), FIELD_MILES, "not a finite");
        expect_invalid(validate_trip("3", "100", "inf"), FIELD_RECEIPTS, "not a finite");
    }

    #[test]
    fn test_unrepresentable_numbers_report_precision() {
        expect_invalid(validate_trip("3", "1e-30", "50"), FIELD_MILES, "precision");
        expect_invalid(validate_trip("3", "100", "1e40"), FIELD_RECEIPTS, "range");
    }

    #[test]
    fn test_empty_value_rejected() {
        expect_invalid(validate_trip("", "100", "50"), FIELD_DURATION, "empty");
        expect_invalid(validate_trip("3", "   ", "50"), FIELD_MILES, "empty");
    }

    #[test]
    fn test_out_of_range_values_rejected() {
        expect_invalid(validate_trip("3", "1000000000001", "50"), FIELD_MILES, "maximum");
        expect_invalid(validate_trip("4294967296", "1", "1"), FIELD_DURATION, "maximum");
    }

    #[test]
    fn test_maximum_amount_is_inclusive() {
        assert!(validate_trip("1", "1000000000000", "1000000000000").is_ok());
        assert_eq!(MAX_SUPPORTED_AMOUNT, dec("1000000000000"));
    }

    #[test]
    fn test_first_invalid_field_is_reported() {
        expect_invalid(validate_trip("x", "y", "z"), FIELD_DURATION, "not a finite");
    }
}
