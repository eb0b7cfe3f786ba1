//! Rental fee calculation.
//!
//! Pure policy arithmetic with no I/O and no clock reads; both timestamps
//! come from the caller so the same time source is used for persistence and
//! billing. The engine caps the result at the gear's deposit before use.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::models::enums::GearType;

/// Hourly rate by gear type.
pub fn hourly_rate(gear_type: GearType) -> Decimal {
    match gear_type {
        GearType::StandardPlastic => dec!(1.0),
        GearType::PremiumWindproof => dec!(2.0),
        GearType::Sunshade => dec!(1.5),
        GearType::Raincoat => dec!(2.0),
    }
}

/// Cost of a rental: elapsed time rounded up to whole hours, times the
/// per-type hourly rate. Non-positive elapsed time (clock skew, same-instant
/// return) costs nothing.
pub fn rental_cost(
    borrow_time: DateTime<Utc>,
    return_time: DateTime<Utc>,
    gear_type: GearType,
) -> Decimal {
    let seconds = (return_time - borrow_time).num_seconds();
    if seconds <= 0 {
        return Decimal::ZERO;
    }
    // Partial hours bill as full hours.
    let hours = (seconds + 3599) / 3600;
    Decimal::from(hours) * hourly_rate(gear_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn t0() -> DateTime<Utc> {
        "2024-06-01T08:00:00Z".parse().unwrap()
    }

    #[test]
    fn same_instant_costs_nothing() {
        assert_eq!(rental_cost(t0(), t0(), GearType::StandardPlastic), dec!(0));
    }

    #[test]
    fn clock_skew_costs_nothing() {
        let earlier = t0() - Duration::minutes(5);
        assert_eq!(
            rental_cost(t0(), earlier, GearType::PremiumWindproof),
            dec!(0)
        );
    }

    #[test]
    fn partial_hours_bill_as_full_hours() {
        let ret = t0() + Duration::minutes(210); // 3.5 h -> 4 h
        assert_eq!(rental_cost(t0(), ret, GearType::StandardPlastic), dec!(4));
    }

    #[test]
    fn exact_hours_are_not_rounded_up() {
        let ret = t0() + Duration::hours(2);
        assert_eq!(rental_cost(t0(), ret, GearType::StandardPlastic), dec!(2));
    }

    #[test]
    fn one_second_over_bills_the_next_hour() {
        let ret = t0() + Duration::hours(2) + Duration::seconds(1);
        assert_eq!(rental_cost(t0(), ret, GearType::StandardPlastic), dec!(3));
    }

    #[test]
    fn per_type_rates_apply() {
        let ret = t0() + Duration::hours(2);
        assert_eq!(rental_cost(t0(), ret, GearType::StandardPlastic), dec!(2));
        assert_eq!(rental_cost(t0(), ret, GearType::PremiumWindproof), dec!(4));
        assert_eq!(rental_cost(t0(), ret, GearType::Sunshade), dec!(3));
        assert_eq!(rental_cost(t0(), ret, GearType::Raincoat), dec!(4));
    }

    #[test]
    fn cost_is_monotonic_in_elapsed_time() {
        let mut previous = Decimal::ZERO;
        for minutes in (0..600).step_by(7) {
            let cost = rental_cost(
                t0(),
                t0() + Duration::minutes(minutes),
                GearType::Sunshade,
            );
            assert!(cost >= previous, "cost decreased at {} minutes", minutes);
            previous = cost;
        }
    }

    #[test]
    fn identical_inputs_yield_identical_output() {
        let ret = t0() + Duration::minutes(95);
        let a = rental_cost(t0(), ret, GearType::Raincoat);
        let b = rental_cost(t0(), ret, GearType::Raincoat);
        assert_eq!(a, b);
    }
}
