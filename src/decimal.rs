use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, Mul, Sub, SubAssign};
use std::str::FromStr;

/// number of decimal places kept on every money value (the ledger's minor unit)
pub const MONEY_SCALE: u32 = 2;

fn round_money(d: Decimal) -> Decimal {
    d.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Money type rounded half away from zero to the ledger's minor unit.
///
/// Every arithmetic operation re-rounds, so sums of `Money` values are exact and
/// allocation splits can be checked with `==`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);
    pub const CENT: Money = Money(Decimal::from_parts(1, 0, 0, false, 2));

    /// create from decimal
    pub fn from_decimal(d: Decimal) -> Self {
        Money(round_money(d))
    }

    /// create from string with exact parsing
    pub fn from_str_exact(s: &str) -> Result<Self, rust_decimal::Error> {
        Ok(Money(round_money(Decimal::from_str(s)?)))
    }

    /// create from integer amount (shillings, dollars, etc)
    pub fn from_major(amount: i64) -> Self {
        Money(Decimal::from(amount))
    }

    /// create from minor amount (cents)
    pub fn from_minor(amount: i64) -> Self {
        Money(Decimal::new(amount, MONEY_SCALE))
    }

    /// get underlying decimal
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// check if zero
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// strictly greater than zero
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// strictly less than zero
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// absolute value
    pub fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// minimum of two values
    pub fn min(self, other: Self) -> Self {
        Money(self.0.min(other.0))
    }

    /// maximum of two values
    pub fn max(self, other: Self) -> Self {
        Money(self.0.max(other.0))
    }

    /// simple interest at an annual rate for a number of days over a day basis
    pub fn apply_rate(&self, annual_rate: Rate, days: i64, year_basis: u32) -> Self {
        if days <= 0 {
            return Money::ZERO;
        }
        let interest = self.0 * annual_rate.as_decimal() * Decimal::from(days)
            / Decimal::from(year_basis);
        Money::from_decimal(interest)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::from_str_exact(s)
    }
}

impl From<Decimal> for Money {
    fn from(d: Decimal) -> Self {
        Money::from_decimal(d)
    }
}

impl From<i32> for Money {
    fn from(i: i32) -> Self {
        Money::from_major(i as i64)
    }
}

impl From<u32> for Money {
    fn from(i: u32) -> Self {
        Money::from_major(i as i64)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, other: Money) -> Money {
        Money(round_money(self.0 + other.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Money) {
        self.0 = round_money(self.0 + other.0);
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, other: Money) -> Money {
        Money(round_money(self.0 - other.0))
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, other: Money) {
        self.0 = round_money(self.0 - other.0);
    }
}

impl Mul<Decimal> for Money {
    type Output = Money;

    fn mul(self, other: Decimal) -> Money {
        Money(round_money(self.0 * other))
    }
}

impl Div<Decimal> for Money {
    type Output = Money;

    fn div(self, other: Decimal) -> Money {
        Money(round_money(self.0 / other))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, x| acc + x)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, x| acc + *x)
    }
}

/// rate type for annual interest rates stored as a fraction (0.12 for 12%)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct Rate(Decimal);

impl Rate {
    pub const ZERO: Rate = Rate(Decimal::ZERO);

    /// create from decimal (e.g., 0.05 for 5%)
    pub fn from_decimal(d: Decimal) -> Self {
        Rate(d)
    }

    /// create from whole percentage (e.g., 5 for 5%)
    pub fn from_percentage(p: u32) -> Self {
        Rate(Decimal::from(p) / Decimal::from(100))
    }

    /// create from a fractional percentage as stored by the ledger (e.g., 12.5)
    pub fn from_percent(p: Decimal) -> Self {
        Rate(p / Decimal::from(100))
    }

    /// create from basis points (e.g., 500 for 5%)
    pub fn from_bps(bps: u32) -> Self {
        Rate(Decimal::from(bps) / Decimal::from(10000))
    }

    /// get as decimal
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// get as percentage
    pub fn as_percentage(&self) -> Decimal {
        self.0 * Decimal::from(100)
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// strictly greater than zero
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// daily rate from annual rate
    pub fn daily_rate(&self, year_basis: u32) -> Rate {
        Rate(self.0 / Decimal::from(year_basis))
    }

    /// monthly rate from annual rate
    pub fn monthly_rate(&self) -> Rate {
        Rate(self.0 / Decimal::from(12))
    }

    /// rate for a period spanning the given number of months
    pub fn period_rate(&self, months: u32) -> Rate {
        Rate(self.0 * Decimal::from(months) / Decimal::from(12))
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.as_percentage())
    }
}

impl From<Decimal> for Rate {
    fn from(d: Decimal) -> Self {
        Rate::from_decimal(d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_money_precision() {
        let m = Money::from_str_exact("100.125").unwrap();
        assert_eq!(m.to_string(), "100.13"); // half away from zero

        let m = Money::from_str_exact("-100.125").unwrap();
        assert_eq!(m.to_string(), "-100.13");
    }

    #[test]
    fn test_minor_units() {
        assert_eq!(Money::from_minor(150), Money::from_str_exact("1.50").unwrap());
        assert_eq!(Money::from_minor(1), Money::CENT);
    }

    #[test]
    fn test_sum_is_exact() {
        let parts = vec![
            Money::from_str_exact("58.42").unwrap(),
            Money::from_str_exact("1340.21").unwrap(),
            Money::from_str_exact("9321.80").unwrap(),
            Money::from_str_exact("4279.57").unwrap(),
        ];
        let total: Money = parts.iter().sum();
        assert_eq!(total, Money::from_major(15_000));
    }

    #[test]
    fn test_apply_rate() {
        let principal = Money::from_major(10_000);
        let rate = Rate::from_percentage(5);

        assert_eq!(principal.apply_rate(rate, 1, 365).to_string(), "1.37");
        assert_eq!(principal.apply_rate(rate, 365, 365), Money::from_major(500));
        assert_eq!(principal.apply_rate(rate, 0, 365), Money::ZERO);
        assert_eq!(principal.apply_rate(rate, -3, 365), Money::ZERO);
    }

    #[test]
    fn test_rate_conversions() {
        assert_eq!(Rate::from_percent(dec!(12)), Rate::from_percentage(12));
        assert_eq!(Rate::from_bps(500), Rate::from_percentage(5));
        assert_eq!(Rate::from_percentage(12).monthly_rate().as_decimal(), dec!(0.01));
        assert_eq!(Rate::from_percentage(12).period_rate(3).as_decimal(), dec!(0.03));
        assert_eq!(Rate::from_percentage(6).to_string(), "6.00%");
    }

    #[test]
    fn test_rate_sign() {
        assert!(Rate::from_percentage(6).is_positive());
        assert!(!Rate::ZERO.is_positive());
        assert!(!Rate::from_decimal(dec!(-0.01)).is_positive());
        assert!(Rate::from_decimal(dec!(-0.01)).is_negative());
    }
}
