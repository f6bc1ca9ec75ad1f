//! Per-stage partial amounts.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The four partial amounts produced before aggregation.
///
/// Amounts are kept unrounded; rounding happens exactly once, on the
/// combined total.
///
/// # Example
///
/// ```
/// use reimbursement_engine::models::PartialAmounts;
/// use rust_decimal::Decimal;
///
/// let partials = PartialAmounts {
///     per_diem: Decimal::from(300),
///     mileage: Decimal::from(50),
///     receipts: Decimal::from(20),
///     adjustment: Decimal::from(-10),
/// };
/// assert_eq!(partials.subtotal(), Decimal::from(370));
/// assert_eq!(partials.total(), Decimal::from(360));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialAmounts {
    /// Amount derived from trip duration.
    pub per_diem: Decimal,
    /// Amount derived from the mileage rate table.
    pub mileage: Decimal,
    /// Amount derived from submitted receipts.
    pub receipts: Decimal,
    /// Cross-factor correction from the interaction stage.
    pub adjustment: Decimal,
}

impl PartialAmounts {
    /// Sum of the three independent base partials.
    pub fn subtotal(&self) -> Decimal {
        self.per_diem + self.mileage + self.receipts
    }

    /// Sum of all four partials.
    pub fn total(&self) -> Decimal {
        self.subtotal() + self.adjustment
    }
}
