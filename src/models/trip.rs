//! Trip input model.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A validated completed trip.
///
/// Values of this type are produced by
/// [`validate_trip`](crate::calculation::validate_trip) or
/// [`TripInput::new`]; both guarantee finite, non-negative fields.
///
/// # Example
///
/// ```
/// use reimbursement_engine::models::TripInput;
/// use rust_decimal::Decimal;
///
/// let trip = TripInput::new(3, Decimal::from(100), Decimal::new(5000, 2)).unwrap();
/// assert_eq!(trip.duration_days, 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripInput {
    /// Length of the trip in whole days.
    pub duration_days: u32,
    /// Distance traveled in miles.
    pub miles_traveled: Decimal,
    /// Total amount of submitted receipts.
    pub receipts_amount: Decimal,
}

impl TripInput {
    /// Builds a trip from already numeric values.
    ///
    /// Returns `InvalidInput` if miles or receipts are negative or above the
    /// supported range.
    pub fn new(
        duration_days: u32,
        miles_traveled: Decimal,
        receipts_amount: Decimal,
    ) -> crate::error::EngineResult<Self> {
        crate::calculation::validate_values(
            Decimal::from(duration_days),
            miles_traveled,
            receipts_amount,
        )
    }

    /// Trip length as a decimal, floored at one day.
    ///
    /// Used as the divisor of every per-day ratio so same-day trips do not
    /// divide by zero.
    pub fn effective_days(&self) -> Decimal {
        Decimal::from(self.duration_days.max(1))
    }
}
