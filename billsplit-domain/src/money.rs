use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign},
};

/// Whole cents. The only representation of money inside the engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Self = Self(0);

    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub fn from_u64(cents: u64) -> Self {
        Self(i64::try_from(cents).unwrap_or(i64::MAX))
    }

    pub const fn cents(self) -> i64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Clamps negative amounts to zero.
    pub fn floor_zero(self) -> Self {
        Self(self.0.max(0))
    }

    /// Subtraction that never produces a negative amount.
    pub fn saturating_sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0).max(0))
    }

    pub fn min(self, other: Self) -> Self {
        Self(self.0.min(other.0))
    }

    pub fn max(self, other: Self) -> Self {
        Self(self.0.max(other.0))
    }

    pub fn clamp(self, low: Self, high: Self) -> Self {
        if high < low {
            return low;
        }
        Self(self.0.clamp(low.0, high.0))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_cents(*self))
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

/// Parses user-facing text such as `"$1,234.5"` into cents.
///
/// Currency symbols, whitespace and thousands separators are ignored. Digits
/// past the second decimal place are truncated, a missing fraction counts as
/// `.00`, and anything unparseable (including negative input) yields zero.
pub fn parse_to_cents(text: &str) -> Money {
    let cleaned: String = text
        .chars()
        .map(normalize_char)
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | '-'))
        .collect();

    if cleaned.starts_with('-') {
        return Money::ZERO;
    }

    let (whole, fraction) = cleaned.split_once('.').unwrap_or((cleaned.as_str(), ""));
    let dollars = whole.parse::<i64>().unwrap_or(0);

    let mut digits = fraction.chars().filter_map(|c| c.to_digit(10));
    let mut cents = 0_i64;
    for _ in 0..2 {
        cents = cents * 10 + i64::from(digits.next().unwrap_or(0));
    }

    dollars
        .checked_mul(100)
        .and_then(|value| value.checked_add(cents))
        .map_or(Money::ZERO, |value| Money(value.max(0)))
}

/// Formats cents as `$D.CC`, with a leading `-` only for negative amounts.
pub fn format_cents(amount: Money) -> String {
    let sign = if amount.0 < 0 { "-" } else { "" };
    let magnitude = amount.0.unsigned_abs();
    format!("{sign}${}.{:02}", magnitude / 100, magnitude % 100)
}

fn normalize_char(c: char) -> char {
    match c {
        '０'..='９' => char::from_digit(c as u32 - '０' as u32, 10).unwrap_or(c),
        '．' => '.',
        '，' => ',',
        _ => c,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::plain("12.34", 1234)]
    #[case::currency_symbol("$12.34", 1234)]
    #[case::thousands("$1,234.56", 123_456)]
    #[case::missing_fraction("42", 4200)]
    #[case::single_fraction_digit("3.5", 350)]
    #[case::truncates_third_digit("9.999", 999)]
    #[case::leading_point(".75", 75)]
    #[case::trailing_point("8.", 800)]
    #[case::whitespace("  7.10  ", 710)]
    #[case::fullwidth("１２．３４", 1234)]
    #[case::empty("", 0)]
    #[case::garbage("abc", 0)]
    #[case::negative("-5.00", 0)]
    #[case::negative_with_symbol("-$5.00", 0)]
    #[case::overflow("999999999999999999999", 0)]
    fn parses_user_text(#[case] input: &str, #[case] expected: i64) {
        assert_eq!(parse_to_cents(input), Money::from_cents(expected));
    }

    #[rstest]
    #[case::zero(0, "$0.00")]
    #[case::cents_only(5, "$0.05")]
    #[case::whole(1000, "$10.00")]
    #[case::mixed(123_456, "$1234.56")]
    #[case::negative(-250, "-$2.50")]
    fn formats_cents(#[case] cents: i64, #[case] expected: &str) {
        assert_eq!(format_cents(Money::from_cents(cents)), expected);
    }

    #[test]
    fn saturating_sub_never_goes_negative() {
        let small = Money::from_cents(100);
        let large = Money::from_cents(250);
        assert_eq!(small.saturating_sub(large), Money::ZERO);
        assert_eq!(large.saturating_sub(small), Money::from_cents(150));
    }

    #[test]
    fn clamp_with_inverted_bounds_returns_low() {
        let value = Money::from_cents(50);
        assert_eq!(
            value.clamp(Money::from_cents(10), Money::ZERO),
            Money::from_cents(10)
        );
    }
}
