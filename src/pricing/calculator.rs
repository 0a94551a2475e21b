// Price Calculator
//
// Pure price arithmetic: the adjustment itself, psychological rounding and
// the zero floor.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::pricing::{
    error::{PricingError, PricingResult},
    rule::Rule,
    types::{AdjustmentKind, RoundingKind},
};

/// Stateless price arithmetic
pub struct PriceCalculator;

impl PriceCalculator {
    /// Apply the rule's adjustment to a price, without rounding or clamping
    ///
    /// * percentage: `current + current * (value / 100)`
    /// * fixed: `current + value`
    ///
    /// Fails with `InvalidRule` when the result does not fit a `Decimal`.
    pub fn compute_new_price(current: Decimal, rule: &Rule) -> PricingResult<Decimal> {
        let adjusted = match rule.adjustment_kind {
            AdjustmentKind::Percentage => (rule.adjustment_value / Decimal::ONE_HUNDRED)
                .checked_mul(current)
                .and_then(|change| current.checked_add(change)),
            AdjustmentKind::Fixed => current.checked_add(rule.adjustment_value),
        };
        adjusted.ok_or_else(out_of_range)
    }

    /// Round a price to a psychological ending
    ///
    /// Endings replace the fraction of the integer floor, so 19.999 with
    /// `end_99` is 19.99, never 20.99. A custom ending outside `[0, 1)`
    /// falls back to `.99`.
    pub fn apply_rounding(
        price: Decimal,
        kind: RoundingKind,
        custom_ending: Option<Decimal>,
    ) -> PricingResult<Decimal> {
        let ending = match kind {
            RoundingKind::Whole => {
                return Ok(price.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
            }
            RoundingKind::Custom => custom_ending
                .filter(|ending| *ending >= Decimal::ZERO && *ending < Decimal::ONE)
                .unwrap_or_else(|| Decimal::new(99, 2)),
            fixed => fixed.ending().unwrap_or_else(|| Decimal::new(99, 2)),
        };
        price.floor().checked_add(ending).ok_or_else(out_of_range)
    }

    /// Prices never go below zero
    pub fn clamp_non_negative(price: Decimal) -> Decimal {
        price.max(Decimal::ZERO)
    }

    /// Full per-field calculation: adjust, round if enabled, clamp at zero
    pub fn calculate(current: Decimal, rule: &Rule) -> PricingResult<Decimal> {
        let adjusted = Self::compute_new_price(current, rule)?;
        let rounded = if rule.apply_rounding {
            Self::apply_rounding(adjusted, rule.rounding_kind, rule.custom_ending)?
        } else {
            adjusted
        };
        Ok(Self::clamp_non_negative(rounded))
    }
}

fn out_of_range() -> PricingError {
    PricingError::InvalidRule("Adjusted price is out of range.".to_string())
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn rounding_kind_strategy() -> impl Strategy<Value = RoundingKind> {
        prop_oneof![
            Just(RoundingKind::End99),
            Just(RoundingKind::End95),
            Just(RoundingKind::End97),
            Just(RoundingKind::End89),
            Just(RoundingKind::Whole),
            Just(RoundingKind::Custom),
        ]
    }

    /// Percentage adjustment is exact in decimal arithmetic
    #[test]
    fn prop_percentage_is_exact() {
        proptest!(|(
            price_cents in 1i64..=10_000_000,
            percent in -100i64..=1000
        )| {
            prop_assume!(percent != 0);
            let current = Decimal::new(price_cents, 2);
            let value = Decimal::from(percent);
            let rule = Rule::percentage(value);

            let expected = current + current * value / Decimal::ONE_HUNDRED;
            prop_assert_eq!(PriceCalculator::compute_new_price(current, &rule).unwrap(), expected);
        });
    }

    /// Fixed adjustment is plain addition
    #[test]
    fn prop_fixed_is_exact() {
        proptest!(|(
            price_cents in 1i64..=10_000_000,
            delta_cents in -1_000_000i64..=1_000_000
        )| {
            prop_assume!(delta_cents != 0);
            let current = Decimal::new(price_cents, 2);
            let delta = Decimal::new(delta_cents, 2);

            let rule = Rule::fixed(delta);
            prop_assert_eq!(PriceCalculator::compute_new_price(current, &rule).unwrap(), current + delta);
        });
    }

    /// Rounding an already rounded price changes nothing
    #[test]
    fn prop_rounding_is_idempotent() {
        proptest!(|(
            price_millis in 0i64..=100_000_000,
            kind in rounding_kind_strategy(),
            ending_cents in 0i64..=99
        )| {
            let price = Decimal::new(price_millis, 3);
            let ending = Some(Decimal::new(ending_cents, 2));

            let once = PriceCalculator::apply_rounding(price, kind, ending).unwrap();
            let twice = PriceCalculator::apply_rounding(once, kind, ending).unwrap();
            prop_assert_eq!(once, twice);
        });
    }

    /// Fixed endings keep the integer floor of the input
    #[test]
    fn prop_endings_keep_integer_floor() {
        proptest!(|(price_millis in 0i64..=100_000_000)| {
            let price = Decimal::new(price_millis, 3);
            let rounded = PriceCalculator::apply_rounding(price, RoundingKind::End99, None).unwrap();

            prop_assert_eq!(rounded.floor(), price.floor());
            prop_assert_eq!(rounded.fract(), Decimal::new(99, 2));
        });
    }

    /// Calculated prices are never negative
    #[test]
    fn prop_calculated_price_is_non_negative() {
        proptest!(|(
            price_cents in 1i64..=1_000_000,
            delta_cents in -2_000_000i64..=-1,
            kind in rounding_kind_strategy()
        )| {
            let current = Decimal::new(price_cents, 2);
            let rule = Rule::fixed(Decimal::new(delta_cents, 2)).with_rounding(kind);

            prop_assert!(PriceCalculator::calculate(current, &rule).unwrap() >= Decimal::ZERO);
        });
    }
}
