use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};

use crate::money::Money;

/// Tip percentages offered as one-tap choices.
pub const TIP_PRESETS: [u32; 4] = [15, 18, 20, 25];

/// `base * percent / 100`, rounded half away from zero to whole cents and
/// floored at zero.
pub fn tip_for_percentage(base: Money, percent: Decimal) -> Money {
    let base = Decimal::from(base.floor_zero().cents());
    let Some(raw) = base.checked_mul(percent) else {
        tracing::debug!(%percent, "Tip percentage overflowed; using zero");
        return Money::ZERO;
    };
    let cents = (raw / Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .unwrap_or(0);
    Money::from_cents(cents).floor_zero()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TipOption {
    pub percent: u32,
    pub amount: Money,
}

pub fn tip_options(base: Money) -> Vec<TipOption> {
    TIP_PRESETS
        .iter()
        .map(|percent| TipOption {
            percent: *percent,
            amount: tip_for_percentage(base, Decimal::from(*percent)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::fifteen(4000, 15, 600)]
    #[case::eighteen(4250, 18, 765)]
    #[case::rounds_half_up(1250, 15, 188)]
    #[case::rounds_down(1001, 15, 150)]
    #[case::zero_base(0, 20, 0)]
    #[case::negative_percent(1000, -10, 0)]
    fn tip_cases(#[case] base: i64, #[case] percent: i64, #[case] expected: i64) {
        assert_eq!(
            tip_for_percentage(Money::from_cents(base), Decimal::from(percent)),
            Money::from_cents(expected)
        );
    }

    #[test]
    fn fractional_percentages_are_supported() {
        let percent = Decimal::new(125, 1);
        assert_eq!(
            tip_for_percentage(Money::from_cents(2000), percent),
            Money::from_cents(250)
        );
    }

    #[test]
    fn options_cover_every_preset() {
        let options = tip_options(Money::from_cents(10_000));
        let amounts: Vec<(u32, i64)> = options
            .iter()
            .map(|option| (option.percent, option.amount.cents()))
            .collect();
        assert_eq!(amounts, vec![(15, 1500), (18, 1800), (20, 2000), (25, 2500)]);
    }
}
