use rust_decimal::Decimal;

use crate::decimal::{Money, Rate};
use crate::types::RepaymentFrequency;

/// calculate the equal monthly installment for a loan.
///
/// Invalid inputs (non-positive principal or term, negative rate) yield `Money::ZERO`
/// instead of an error; callers validate terms before scheduling.
pub fn calculate_emi(principal: Money, annual_rate: Rate, months: u32) -> Money {
    if !principal.is_positive() || annual_rate.is_negative() || months == 0 {
        return Money::ZERO;
    }

    annuity_payment(principal, annual_rate.monthly_rate().as_decimal(), months)
}

/// calculate the installment for any repayment frequency.
///
/// Monthly loans match `calculate_emi`. Longer periods use the annual rate scaled to the
/// period length. One-time loans repay principal plus simple interest over `periods`
/// months in a single installment.
pub fn periodic_installment(
    principal: Money,
    annual_rate: Rate,
    periods: u32,
    frequency: RepaymentFrequency,
) -> Money {
    if !principal.is_positive() || annual_rate.is_negative() || periods == 0 {
        return Money::ZERO;
    }

    match frequency {
        RepaymentFrequency::OneTime => {
            let interest = principal.as_decimal() * annual_rate.period_rate(periods).as_decimal();
            Money::from_decimal(principal.as_decimal() + interest)
        }
        RepaymentFrequency::Monthly => calculate_emi(principal, annual_rate, periods),
        _ => {
            let period_rate = annual_rate.period_rate(frequency.months_per_period());
            annuity_payment(principal, period_rate.as_decimal(), periods)
        }
    }
}

// P * r * (1 + r)^n / ((1 + r)^n - 1)
fn annuity_payment(principal: Money, period_rate: Decimal, periods: u32) -> Money {
    if period_rate.is_zero() {
        return principal / Decimal::from(periods);
    }

    let base = Decimal::ONE + period_rate;
    let mut compound = Decimal::ONE;
    for _ in 0..periods {
        compound = match compound.checked_mul(base) {
            Some(c) => c,
            None => return Money::ZERO,
        };
    }

    let denominator = compound - Decimal::ONE;
    if denominator.is_zero() {
        return Money::ZERO;
    }

    // divide first so long terms cannot overflow the numerator
    let factor = compound / denominator;
    match (principal.as_decimal() * period_rate).checked_mul(factor) {
        Some(payment) => Money::from_decimal(payment),
        None => Money::ZERO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_emi_calculation() {
        let emi = calculate_emi(Money::from_major(120_000), Rate::from_percentage(12), 12);
        assert_eq!(emi, Money::from_str_exact("10661.85").unwrap());
    }

    #[test]
    fn test_emi_zero_interest() {
        for (principal, months) in [(120_000, 12), (1_000, 3), (50_000, 7), (1, 1)] {
            let p = Money::from_major(principal);
            let emi = calculate_emi(p, Rate::ZERO, months);
            assert_eq!(emi, p / Decimal::from(months));
        }
    }

    #[test]
    fn test_invalid_terms_return_zero() {
        assert_eq!(calculate_emi(Money::ZERO, Rate::from_percentage(12), 12), Money::ZERO);
        assert_eq!(calculate_emi(Money::from_major(-5), Rate::from_percentage(12), 12), Money::ZERO);
        assert_eq!(calculate_emi(Money::from_major(1_000), Rate::from_percentage(12), 0), Money::ZERO);
        assert_eq!(
            calculate_emi(Money::from_major(1_000), Rate::from_decimal(dec!(-0.01)), 12),
            Money::ZERO
        );
    }

    #[test]
    fn test_periodic_installment_by_frequency() {
        let principal = Money::from_major(120_000);
        let rate = Rate::from_percentage(12);

        assert_eq!(
            periodic_installment(principal, rate, 12, RepaymentFrequency::Monthly),
            calculate_emi(principal, rate, 12)
        );

        // quarterly at 3% per period is larger than the monthly emi
        let quarterly = periodic_installment(principal, rate, 4, RepaymentFrequency::Quarterly);
        assert!(quarterly > Money::from_major(30_000));
        assert!(quarterly < Money::from_major(33_000));

        // single bullet: 120,000 + 12% for 6 months
        let bullet = periodic_installment(principal, rate, 6, RepaymentFrequency::OneTime);
        assert_eq!(bullet, Money::from_major(127_200));
    }

    #[test]
    fn test_long_term_at_high_rate() {
        // (1 + 1/12)^600 is around 7e20; the payment converges to principal times the period rate
        let principal = Money::from_major(1_000_000_000);
        let emi = calculate_emi(principal, Rate::from_percentage(100), 600);
        let interest_only = principal * dec!(1) / dec!(12);
        assert!(emi >= interest_only);
        assert!(emi - interest_only < Money::from_major(1));
    }
}
