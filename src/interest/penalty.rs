use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};

/// penalty configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PenaltyConfig {
    /// flat annual penalty rate charged on overdue installments
    pub penalty_rate: Rate,
    /// days per year for daily penalty and penal interest rates
    pub year_basis: u32,
    /// days after the due date before either charge starts
    pub grace_period_days: u32,
}

impl Default for PenaltyConfig {
    fn default() -> Self {
        Self {
            penalty_rate: Rate::from_percentage(5),
            year_basis: 365,
            grace_period_days: 0,
        }
    }
}

/// engine for penalty and penal interest on unpaid installments
#[derive(Debug, Clone, Default)]
pub struct PenaltyEngine {
    pub config: PenaltyConfig,
}

impl PenaltyEngine {
    pub fn new(config: PenaltyConfig) -> Self {
        Self { config }
    }

    /// charges on an installment `days_overdue` days past its due date.
    ///
    /// Penal interest runs at the loan's own annual rate, the penalty at the flat
    /// configured rate. Both are simple daily charges on the installment amount.
    pub fn calculate_penalty(
        &self,
        installment_amount: Money,
        loan_rate: Rate,
        days_overdue: i64,
    ) -> PenaltyCalculation {
        let grace = i64::from(self.config.grace_period_days);
        if days_overdue <= grace {
            return PenaltyCalculation {
                penal_interest: Money::ZERO,
                penalty: Money::ZERO,
                days_charged: 0,
                grace_applied: days_overdue > 0,
            };
        }

        let days_charged = days_overdue - grace;
        let basis = self.config.year_basis;

        PenaltyCalculation {
            penal_interest: installment_amount.apply_rate(loan_rate, days_charged, basis),
            penalty: installment_amount.apply_rate(self.config.penalty_rate, days_charged, basis),
            days_charged,
            grace_applied: false,
        }
    }
}

/// penalty calculation result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PenaltyCalculation {
    pub penal_interest: Money,
    pub penalty: Money,
    pub days_charged: i64,
    pub grace_applied: bool,
}

impl PenaltyCalculation {
    pub fn total(&self) -> Money {
        self.penal_interest + self.penalty
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_penalty() {
        let engine = PenaltyEngine::default();
        let installment = Money::from_str_exact("10661.85").unwrap();

        let result = engine.calculate_penalty(installment, Rate::from_percentage(12), 40);

        assert_eq!(result.days_charged, 40);
        assert_eq!(result.penal_interest, Money::from_str_exact("140.21").unwrap());
        assert_eq!(result.penalty, Money::from_str_exact("58.42").unwrap());
        assert_eq!(result.total(), Money::from_str_exact("198.63").unwrap());
    }

    #[test]
    fn test_not_overdue_has_no_charges() {
        let engine = PenaltyEngine::default();
        let result = engine.calculate_penalty(Money::from_major(1_000), Rate::from_percentage(12), 0);

        assert_eq!(result.total(), Money::ZERO);
        assert!(!result.grace_applied);
    }

    #[test]
    fn test_grace_period() {
        let engine = PenaltyEngine::new(PenaltyConfig {
            grace_period_days: 5,
            ..PenaltyConfig::default()
        });
        let installment = Money::from_major(1_000);

        let in_grace = engine.calculate_penalty(installment, Rate::from_percentage(12), 3);
        assert_eq!(in_grace.total(), Money::ZERO);
        assert!(in_grace.grace_applied);

        let after_grace = engine.calculate_penalty(installment, Rate::from_percentage(12), 10);
        assert_eq!(after_grace.days_charged, 5);
        assert!(!after_grace.grace_applied);
    }

    #[test]
    fn test_zero_rate_loan_still_pays_penalty() {
        let engine = PenaltyEngine::default();
        let result = engine.calculate_penalty(Money::from_major(3_650), Rate::ZERO, 10);

        assert_eq!(result.penal_interest, Money::ZERO);
        assert_eq!(result.penalty, Money::from_major(5));
    }
}
