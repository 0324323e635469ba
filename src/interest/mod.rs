pub mod accrual;
pub mod emi;
pub mod penalty;

use serde::{Deserialize, Serialize};

use crate::decimal::Money;

pub use accrual::{start_of_quarter, AccrualEngine, AccrualSummary, DepositAccrual};
pub use emi::{calculate_emi, periodic_installment};
pub use penalty::{PenaltyCalculation, PenaltyConfig, PenaltyEngine};

/// result of folding accrued interest into principal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapitalizationResult {
    pub outstanding_principal: Money,
    pub amount_capitalized: Money,
    pub new_principal: Money,
}

/// capitalize accrued interest into principal
pub fn capitalize_interest(principal: Money, accrued_interest: Money) -> CapitalizationResult {
    CapitalizationResult {
        outstanding_principal: principal,
        amount_capitalized: accrued_interest,
        new_principal: principal + accrued_interest,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capitalization() {
        let principal = Money::from_major(10_000);
        let interest = Money::from_str_exact("500.25").unwrap();

        let result = capitalize_interest(principal, interest);

        assert_eq!(result.amount_capitalized, interest);
        assert_eq!(result.new_principal, Money::from_str_exact("10500.25").unwrap());
        assert_eq!(result.new_principal - result.amount_capitalized, result.outstanding_principal);
    }
}
