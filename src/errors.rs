use thiserror::Error;
use uuid::Uuid;

use crate::decimal::Money;
use crate::types::LoanStatus;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("invalid loan terms: {message}")]
    InvalidTerms {
        message: String,
    },

    #[error("invalid payment amount: {amount}")]
    InvalidPaymentAmount {
        amount: Money,
    },

    #[error("loan not active: current status is {status:?}")]
    LoanNotActive {
        status: LoanStatus,
    },

    #[error("invalid status transition from {from:?} to {to:?}")]
    InvalidStatusTransition {
        from: LoanStatus,
        to: LoanStatus,
    },

    #[error("loan has overdue installments ({count})")]
    OverdueInstallments {
        count: usize,
    },

    #[error("loan has no outstanding balance to restructure")]
    NothingToRestructure,

    #[error("allocation does not conserve the payment: expected {expected}, allocated {actual}")]
    ConservationViolation {
        expected: Money,
        actual: Money,
    },

    #[error("unknown saving scheme: {scheme_id}")]
    UnknownScheme {
        scheme_id: Uuid,
    },

    #[error("repayment {repayment_id} does not belong to loan {loan_id}")]
    ForeignRepayment {
        repayment_id: Uuid,
        loan_id: Uuid,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },

    #[error("serialization error: {message}")]
    Serialization {
        message: String,
    },
}

impl LedgerError {
    /// internal-consistency failures that must be surfaced as a generic failure
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            LedgerError::ConservationViolation { .. } | LedgerError::Serialization { .. }
        )
    }

    /// message safe to show to a user
    pub fn user_message(&self) -> String {
        if self.is_internal() {
            "the operation could not be completed".to_string()
        } else {
            self.to_string()
        }
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(e: serde_json::Error) -> Self {
        LedgerError::Serialization {
            message: e.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_internal_errors_hide_details() {
        let err = LedgerError::ConservationViolation {
            expected: Money::from_major(100),
            actual: Money::from_major(99),
        };
        assert!(err.is_internal());
        assert_eq!(err.user_message(), "the operation could not be completed");
    }

    #[test]
    fn test_validation_errors_are_specific() {
        let err = LedgerError::OverdueInstallments { count: 2 };
        assert!(!err.is_internal());
        assert_eq!(err.user_message(), "loan has overdue installments (2)");
    }
}
