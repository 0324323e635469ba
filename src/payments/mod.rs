pub mod amortization;
pub mod recording;
pub mod waterfall;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::types::{LoanId, SchemeId};

pub use amortization::{AmortizationSchedule, InstallmentRecord, ScheduleGenerator};
pub use recording::{PaymentPlan, PaymentRecorder};
pub use waterfall::{AllocationLine, AllocationResult, PaymentProcessor, PaymentWaterfall};

/// payment request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub loan_id: LoanId,
    pub amount: Money,
    pub payment_date: NaiveDate,
    pub waive_penalty: bool,
    /// scheme credited with any overflow
    pub savings_scheme_id: SchemeId,
}

impl PaymentRequest {
    pub fn new(loan_id: LoanId, amount: Money, payment_date: NaiveDate, savings_scheme_id: SchemeId) -> Self {
        Self {
            loan_id,
            amount,
            payment_date,
            waive_penalty: false,
            savings_scheme_id,
        }
    }

    pub fn waiving_penalty(mut self) -> Self {
        self.waive_penalty = true;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.amount.is_positive() {
            return Err(LedgerError::InvalidPaymentAmount { amount: self.amount });
        }
        Ok(())
    }

    pub fn waterfall(&self) -> PaymentWaterfall {
        if self.waive_penalty {
            PaymentWaterfall::penalty_waived()
        } else {
            PaymentWaterfall::standard()
        }
    }
}
