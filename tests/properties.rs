//! Property tests for the reimbursement pipeline.

use proptest::prelude::*;
use rust_decimal::Decimal;

use reimbursement_engine::ReimbursementEngine;
use reimbursement_engine::calculation::{calculate_mileage, round_amount};
use reimbursement_engine::config::{MileageTier, RateTable};
use reimbursement_engine::models::TripInput;

fn engine() -> ReimbursementEngine {
    ReimbursementEngine::builtin().unwrap()
}

fn three_tier_table() -> RateTable {
    RateTable {
        tiers: vec![
            MileageTier {
                lower_bound: Decimal::ZERO,
                upper_bound: Some(Decimal::from(100)),
                rate: Decimal::new(58, 2),
            },
            MileageTier {
                lower_bound: Decimal::from(100),
                upper_bound: Some(Decimal::from(500)),
                rate: Decimal::new(45, 2),
            },
            MileageTier {
                lower_bound: Decimal::from(500),
                upper_bound: None,
                rate: Decimal::new(25, 2),
            },
        ],
    }
}

fn arb_amount(max_cents: i64) -> impl Strategy<Value = Decimal> {
    (0..=max_cents).prop_map(|cents| Decimal::new(cents, 2))
}

fn arb_trip() -> impl Strategy<Value = TripInput> {
    (0u32..=60, arb_amount(500_000), arb_amount(1_000_000)).prop_map(
        |(days, miles, receipts)| TripInput::new(days, miles, receipts).unwrap(),
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_calculation_is_deterministic(trip in arb_trip()) {
        let engine = engine();
        prop_assert_eq!(engine.calculate(&trip), engine.calculate(&trip));
    }

    #[test]
    fn prop_amount_is_never_negative(trip in arb_trip()) {
        let result = engine().calculate(&trip);
        prop_assert!(result.amount() >= Decimal::ZERO);
        prop_assert_eq!(result.amount().scale(), 2);
    }

    #[test]
    fn prop_amount_is_rounded_once(trip in arb_trip()) {
        let engine = engine();
        let result = engine.calculate(&trip);
        prop_assert_eq!(result.amount(), round_amount(result.combined, engine.policy().rounding()));
    }

    #[test]
    fn prop_mileage_is_monotonic(a in arb_amount(200_000), b in arb_amount(200_000)) {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        for table in [three_tier_table(), engine().policy().mileage().clone()] {
            let low_amount = calculate_mileage(low, &table, 1).amount;
            let high_amount = calculate_mileage(high, &table, 1).amount;
            prop_assert!(low_amount <= high_amount, "{} > {}", low_amount, high_amount);
        }
    }

    #[test]
    fn prop_tier_boundaries_are_continuous(epsilon_cents in 1i64..=100) {
        let table = three_tier_table();
        let epsilon = Decimal::new(epsilon_cents, 2);

        for (boundary, below_rate, above_rate) in [
            (Decimal::from(100), Decimal::new(58, 2), Decimal::new(45, 2)),
            (Decimal::from(500), Decimal::new(45, 2), Decimal::new(25, 2)),
        ] {
            let at = calculate_mileage(boundary, &table, 1).amount;
            let below = calculate_mileage(boundary - epsilon, &table, 1).amount;
            let above = calculate_mileage(boundary + epsilon, &table, 1).amount;

            prop_assert_eq!(at - below, epsilon * below_rate);
            prop_assert_eq!(above - at, epsilon * above_rate);
        }
    }

    #[test]
    fn prop_partials_are_never_negative(trip in arb_trip()) {
        let result = engine().calculate(&trip);
        prop_assert!(result.partials.per_diem >= Decimal::ZERO);
        prop_assert!(result.partials.mileage >= Decimal::ZERO);
        prop_assert!(result.partials.receipts >= Decimal::ZERO);
    }
}

#[test]
fn test_zero_trip_is_zero() {
    let trip = TripInput::new(0, Decimal::ZERO, Decimal::ZERO).unwrap();
    let result = engine().calculate(&trip);
    assert_eq!(result.result.to_string(), "0.00");
}
