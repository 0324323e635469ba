use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

use crate::config::CoreConfig;
use crate::errors::Result;
use crate::loan::{LoanRecord, StatusChange};
use crate::state::LoanPosition;
use crate::types::{InstallmentPayment, LoanId, Repayment, SavingDeposit};
use crate::unit_of_work::{LedgerAccount, LedgerEntry, LedgerWrite, UnitOfWork};

use super::amortization::ScheduleGenerator;
use super::waterfall::{AllocationResult, PaymentProcessor};
use super::PaymentRequest;

/// everything a payment needs persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentPlan {
    pub loan_id: LoanId,
    pub payment_date: NaiveDate,
    pub allocation: AllocationResult,
    /// absent when nothing was collectable and the whole amount went to savings
    pub repayment: Option<Repayment>,
    pub savings_deposit: Option<SavingDeposit>,
    pub status_change: Option<StatusChange>,
    pub unit_of_work: UnitOfWork,
}

/// plans the writes for a member payment against an active loan
#[derive(Debug, Clone, Default)]
pub struct PaymentRecorder {
    generator: ScheduleGenerator,
}

impl PaymentRecorder {
    pub fn new(config: &CoreConfig) -> Self {
        Self {
            generator: ScheduleGenerator::from_config(config),
        }
    }

    /// allocate a payment and plan the repayment, income entries, overflow deposit and,
    /// when the principal is cleared, the `PaidOff` transition
    pub fn plan_payment(
        &self,
        loan: &LoanRecord,
        repayments: &[Repayment],
        request: &PaymentRequest,
    ) -> Result<PaymentPlan> {
        loan.ensure_active()?;
        request.validate()?;

        let schedule = self.generator.for_loan(loan, repayments, request.payment_date)?;
        let processor = PaymentProcessor::new(request.waterfall());
        let allocation = processor.allocate(request.amount, &schedule.installments)?;
        let split = allocation.allocation;

        let mut uow = UnitOfWork::new();

        let repayment = if split.total_applied().is_positive() {
            let repayment = Repayment {
                id: Uuid::new_v4(),
                loan_id: loan.id,
                payment_date: request.payment_date,
                amount_paid: split.total_applied(),
                principal_paid: split.principal,
                interest_paid: split.interest,
                penalty_paid: split.penalty,
                installments: allocation.lines.iter().map(InstallmentPayment::from).collect(),
            };
            uow.push(LedgerWrite::InsertRepayment(repayment.clone()));
            Some(repayment)
        } else {
            None
        };

        let savings_deposit = if split.overflow_to_savings.is_positive() {
            let deposit = SavingDeposit {
                id: Uuid::new_v4(),
                member_id: loan.member_id,
                scheme_id: request.savings_scheme_id,
                amount: split.overflow_to_savings,
                deposit_date: request.payment_date,
            };
            uow.push(LedgerWrite::InsertSavingDeposit(deposit.clone()));
            Some(deposit)
        } else {
            None
        };

        uow.post(LedgerEntry::debit(loan.id, LedgerAccount::Cash, request.amount, "member payment"));
        uow.post(LedgerEntry::credit(loan.id, LedgerAccount::PenaltyIncome, split.penalty, "penalty collected"));
        uow.post(LedgerEntry::credit(loan.id, LedgerAccount::InterestIncome, split.interest, "interest collected"));
        uow.post(LedgerEntry::credit(loan.id, LedgerAccount::LoanPortfolio, split.principal, "principal repaid"));
        uow.post(LedgerEntry::credit(
            loan.id,
            LedgerAccount::MemberSavings,
            split.overflow_to_savings,
            "payment overflow to savings",
        ));

        if let Err(e) = uow.ensure_balanced() {
            error!(loan_id = %loan.id, error = %e, "payment entries do not balance");
            return Err(e);
        }

        let position = LoanPosition::from_schedule(loan, &schedule, repayments);
        let status_change = if split.principal.is_positive() && split.principal >= position.outstanding_principal {
            let mut closed = loan.clone();
            let change = closed.mark_paid_off()?;
            uow.push(LedgerWrite::UpdateLoanStatus(change));
            Some(change)
        } else {
            None
        };

        info!(
            loan_id = %loan.id,
            amount = %request.amount,
            overflow = %split.overflow_to_savings,
            paid_off = status_change.is_some(),
            "payment planned"
        );

        Ok(PaymentPlan {
            loan_id: loan.id,
            payment_date: request.payment_date,
            allocation,
            repayment,
            savings_deposit,
            status_change,
            unit_of_work: uow,
        })
    }
}
