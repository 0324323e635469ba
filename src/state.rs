use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::loan::LoanRecord;
use crate::payments::AmortizationSchedule;
use crate::types::{InstallmentStatus, LoanId, LoanStatus, Repayment};

/// position of a loan on a reference date, derived from its schedule and repayments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanPosition {
    pub loan_id: LoanId,
    pub status: LoanStatus,
    pub as_of: NaiveDate,

    // balances
    pub principal: Money,
    pub outstanding_principal: Money,

    // collected so far
    pub total_paid: Money,
    pub principal_paid: Money,
    pub interest_paid: Money,
    pub penalty_paid: Money,

    // schedule progress
    pub installments_paid: usize,
    pub installments_remaining: usize,
    pub overdue_installments: usize,
    pub max_days_overdue: i64,
    pub arrears: Money,
    pub next_due_date: Option<NaiveDate>,
    pub next_due_amount: Option<Money>,
}

impl LoanPosition {
    pub fn from_schedule(
        loan: &LoanRecord,
        schedule: &AmortizationSchedule,
        repayments: &[Repayment],
    ) -> Self {
        let principal_paid: Money = repayments.iter().map(|r| r.principal_paid).sum();
        let installments_paid = schedule
            .installments
            .iter()
            .filter(|i| i.status == InstallmentStatus::Paid)
            .count();

        let next = schedule
            .installments
            .iter()
            .find(|i| i.status != InstallmentStatus::Paid);

        Self {
            loan_id: loan.id,
            status: loan.status,
            as_of: schedule.as_of,
            principal: loan.terms.principal,
            outstanding_principal: (loan.terms.principal - principal_paid).max(Money::ZERO),
            total_paid: repayments.iter().map(|r| r.amount_paid).sum(),
            principal_paid,
            interest_paid: repayments.iter().map(|r| r.interest_paid).sum(),
            penalty_paid: repayments.iter().map(|r| r.penalty_paid).sum(),
            installments_paid,
            installments_remaining: schedule.installments.len() - installments_paid,
            overdue_installments: schedule.overdue_count(),
            max_days_overdue: schedule
                .installments
                .iter()
                .filter(|i| i.status == InstallmentStatus::Overdue)
                .map(|i| i.days_overdue)
                .max()
                .unwrap_or(0),
            arrears: schedule.total_arrears(),
            next_due_date: next.map(|i| i.due_date),
            next_due_amount: next.map(|i| i.total_due),
        }
    }

    pub fn is_performing(&self) -> bool {
        self.overdue_installments == 0
    }

    pub fn is_fully_repaid(&self) -> bool {
        self.outstanding_principal.is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::Rate;
    use crate::loan::LoanTerms;
    use crate::payments::ScheduleGenerator;
    use crate::types::RepaymentFrequency;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_position_after_one_payment() {
        let mut loan = LoanRecord::apply(
            Uuid::new_v4(),
            Uuid::new_v4(),
            LoanTerms::new(
                Money::from_major(120_000),
                Rate::from_percentage(12),
                12,
                date(2024, 1, 1),
                RepaymentFrequency::Monthly,
            ),
        )
        .unwrap();
        loan.approve().unwrap();

        let repayments = vec![Repayment {
            id: Uuid::new_v4(),
            loan_id: loan.id,
            payment_date: date(2024, 2, 1),
            amount_paid: Money::from_str_exact("10661.85").unwrap(),
            principal_paid: Money::from_str_exact("9461.85").unwrap(),
            interest_paid: Money::from_major(1_200),
            penalty_paid: Money::ZERO,
            installments: Vec::new(),
        }];

        // second installment (due 2024-03-01) is 14 days late
        let schedule = ScheduleGenerator::default().generate(&loan.terms, &repayments, date(2024, 3, 15));
        let position = LoanPosition::from_schedule(&loan, &schedule, &repayments);

        assert_eq!(position.outstanding_principal, Money::from_str_exact("110538.15").unwrap());
        assert_eq!(position.installments_paid, 1);
        assert_eq!(position.installments_remaining, 11);
        assert_eq!(position.overdue_installments, 1);
        assert_eq!(position.max_days_overdue, 14);
        assert_eq!(position.next_due_date, Some(date(2024, 3, 1)));
        assert_eq!(position.arrears, schedule.installments[1].total_due);
        assert!(!position.is_performing());
        assert!(!position.is_fully_repaid());
    }
}
