use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::types::{Allocation, InstallmentPayment};

use super::amortization::InstallmentRecord;

/// payment waterfall configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PaymentWaterfall {
    /// skip the penalty bucket; waived penalty is recorded as zero paid
    pub waive_penalty: bool,
}

impl PaymentWaterfall {
    /// standard waterfall: penalty -> interest -> principal, per installment
    pub fn standard() -> Self {
        Self {
            waive_penalty: false,
        }
    }

    /// same order with the penalty bucket waived
    pub fn penalty_waived() -> Self {
        Self {
            waive_penalty: true,
        }
    }
}

/// portion of a payment applied to one installment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationLine {
    pub period_index: u32,
    pub due_date: NaiveDate,
    pub penalty: Money,
    pub interest: Money,
    pub principal: Money,
    pub penalty_waived: Money,
    /// every bucket of the installment was fully covered
    pub settled: bool,
}

impl AllocationLine {
    pub fn total(&self) -> Money {
        self.penalty + self.interest + self.principal
    }
}

impl From<&AllocationLine> for InstallmentPayment {
    fn from(line: &AllocationLine) -> Self {
        Self {
            period_index: line.period_index,
            penalty: line.penalty,
            interest: line.interest,
            principal: line.principal,
            penalty_waived: line.penalty_waived,
        }
    }
}

/// allocation of a payment with its per-installment breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationResult {
    pub amount: Money,
    pub allocation: Allocation,
    pub lines: Vec<AllocationLine>,
    pub penalty_waived: Money,
}

impl AllocationResult {
    pub fn installments_settled(&self) -> usize {
        self.lines.iter().filter(|l| l.settled).count()
    }
}

/// payment processor
#[derive(Debug, Clone, Default)]
pub struct PaymentProcessor {
    waterfall: PaymentWaterfall,
}

impl PaymentProcessor {
    pub fn new(waterfall: PaymentWaterfall) -> Self {
        Self { waterfall }
    }

    /// split `amount` over the due and overdue installments.
    ///
    /// Installments are drained oldest first; each one's penalty, interest (regular and
    /// penal, pooled) and principal are exhausted before moving on. Whatever is left once
    /// every installment is covered becomes overflow to savings.
    pub fn allocate(
        &self,
        amount: Money,
        installments: &[InstallmentRecord],
    ) -> Result<AllocationResult> {
        if !amount.is_positive() {
            return Err(LedgerError::InvalidPaymentAmount { amount });
        }

        let mut outstanding: Vec<&InstallmentRecord> =
            installments.iter().filter(|i| i.is_outstanding()).collect();
        outstanding.sort_by_key(|i| (i.due_date, i.period_index));

        let mut remaining = amount;
        let mut allocation = Allocation::default();
        let mut lines = Vec::new();
        let mut penalty_waived = Money::ZERO;

        for installment in outstanding {
            if remaining.is_zero() {
                break;
            }

            let mut line = AllocationLine {
                period_index: installment.period_index,
                due_date: installment.due_date,
                penalty: Money::ZERO,
                interest: Money::ZERO,
                principal: Money::ZERO,
                penalty_waived: Money::ZERO,
                settled: false,
            };

            if self.waterfall.waive_penalty {
                line.penalty_waived = installment.penalty;
            } else {
                line.penalty = take(&mut remaining, installment.penalty);
            }
            line.interest = take(&mut remaining, installment.interest_due());
            line.principal = take(&mut remaining, installment.principal_due());
            line.settled = line.principal == installment.principal_due()
                && line.interest == installment.interest_due()
                && (self.waterfall.waive_penalty || line.penalty == installment.penalty);

            allocation.penalty += line.penalty;
            allocation.interest += line.interest;
            allocation.principal += line.principal;
            penalty_waived += line.penalty_waived;
            lines.push(line);
        }

        allocation.overflow_to_savings = remaining;

        let allocated = allocation.total();
        if allocated != amount {
            error!(%amount, %allocated, "payment allocation does not conserve the payment");
            return Err(LedgerError::ConservationViolation {
                expected: amount,
                actual: allocated,
            });
        }

        debug!(
            %amount,
            penalty = %allocation.penalty,
            interest = %allocation.interest,
            principal = %allocation.principal,
            overflow = %allocation.overflow_to_savings,
            "payment allocated"
        );

        Ok(AllocationResult {
            amount,
            allocation,
            lines,
            penalty_waived,
        })
    }
}

// consume up to `balance` from `remaining`, returning what was taken
fn take(remaining: &mut Money, balance: Money) -> Money {
    let applied = (*remaining).min(balance.max(Money::ZERO));
    *remaining -= applied;
    applied
}
