use chrono::NaiveDate;
use hourglass_rs::SafeTimeProvider;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::CoreConfig;
use crate::decimal::{Money, Rate};
use crate::errors::{LedgerError, Result};
use crate::interest::{capitalize_interest, CapitalizationResult};
use crate::loan::{LoanRecord, LoanTerms, StatusChange};
use crate::payments::{AmortizationSchedule, ScheduleGenerator};
use crate::state::LoanPosition;
use crate::types::{InstallmentStatus, LoanId, LoanStatus, RepaymentFrequency, Repayment, SchemeId};
use crate::unit_of_work::{LedgerAccount, LedgerEntry, LedgerWrite, UnitOfWork};

/// terms chosen for the successor loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestructureRequest {
    pub scheme_id: SchemeId,
    pub annual_rate: Rate,
    pub term_periods: u32,
    pub frequency: RepaymentFrequency,
    #[serde(default)]
    pub grace_period_periods: u32,
}

/// closing of a loan and the opening of its successor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestructuringPlan {
    pub original_loan_id: LoanId,
    pub as_of: NaiveDate,
    pub capitalization: CapitalizationResult,
    /// synthetic repayment closing the original loan
    pub settlement: Repayment,
    pub status_change: StatusChange,
    pub successor: LoanRecord,
    pub unit_of_work: UnitOfWork,
}

impl RestructuringPlan {
    pub fn outstanding_principal(&self) -> Money {
        self.capitalization.outstanding_principal
    }

    pub fn accrued_interest(&self) -> Money {
        self.capitalization.amount_capitalized
    }

    pub fn capitalized_principal(&self) -> Money {
        self.capitalization.new_principal
    }
}

/// closes an active loan and opens a successor with the balance capitalized
#[derive(Debug, Clone, Default)]
pub struct RestructuringEngine {
    generator: ScheduleGenerator,
}

impl RestructuringEngine {
    pub fn new(config: &CoreConfig) -> Self {
        Self {
            generator: ScheduleGenerator::from_config(config),
        }
    }

    /// plan the restructuring of `loan` on `as_of`.
    ///
    /// Rejected before anything is planned if the loan is not active, has overdue
    /// installments, has nothing left to capitalize or the new terms are invalid.
    pub fn plan(
        &self,
        loan: &LoanRecord,
        repayments: &[Repayment],
        request: &RestructureRequest,
        as_of: NaiveDate,
    ) -> Result<RestructuringPlan> {
        loan.ensure_active()?;

        let schedule = self.generator.for_loan(loan, repayments, as_of)?;
        let overdue = schedule.overdue_count();
        if overdue > 0 {
            warn!(loan_id = %loan.id, overdue, "restructuring blocked by overdue installments");
            return Err(LedgerError::OverdueInstallments { count: overdue });
        }

        let position = LoanPosition::from_schedule(loan, &schedule, repayments);
        let capitalization =
            capitalize_interest(position.outstanding_principal, accrued_interest(&schedule, as_of));
        let capitalized = capitalization.new_principal;
        if !capitalized.is_positive() {
            return Err(LedgerError::NothingToRestructure);
        }

        let terms = LoanTerms::new(
            capitalized,
            request.annual_rate,
            request.term_periods,
            as_of,
            request.frequency,
        )
        .with_grace_periods(request.grace_period_periods);
        terms.validate()?;

        let settlement = Repayment {
            id: Uuid::new_v4(),
            loan_id: loan.id,
            payment_date: as_of,
            amount_paid: capitalized,
            principal_paid: capitalization.outstanding_principal,
            interest_paid: capitalization.amount_capitalized,
            penalty_paid: Money::ZERO,
            installments: Vec::new(),
        };

        let mut original = loan.clone();
        let status_change = original.transition(LoanStatus::Restructured)?;

        let successor = LoanRecord {
            id: Uuid::new_v4(),
            member_id: loan.member_id,
            scheme_id: request.scheme_id,
            terms,
            status: LoanStatus::Active,
            restructured_from: Some(loan.id),
        };

        // no cash moves: the old loan is settled out and the new one disbursed in
        let mut uow = UnitOfWork::new();
        uow.push(LedgerWrite::InsertRepayment(settlement.clone()));
        uow.push(LedgerWrite::UpdateLoanStatus(status_change));
        uow.push(LedgerWrite::InsertLoan(successor.clone()));
        uow.post(LedgerEntry::credit(
            loan.id,
            LedgerAccount::LoanPortfolio,
            capitalized,
            "restructuring settlement",
        ));
        uow.post(LedgerEntry::debit(
            successor.id,
            LedgerAccount::LoanPortfolio,
            capitalized,
            "restructuring disbursement",
        ));
        uow.ensure_balanced()?;

        info!(
            original = %loan.id,
            successor = %successor.id,
            outstanding_principal = %capitalization.outstanding_principal,
            accrued_interest = %capitalization.amount_capitalized,
            capitalized = %capitalized,
            "restructuring planned"
        );

        Ok(RestructuringPlan {
            original_loan_id: loan.id,
            as_of,
            capitalization,
            settlement,
            status_change,
            successor,
            unit_of_work: uow,
        })
    }

    /// plan as of the provider's current date
    pub fn plan_now(
        &self,
        loan: &LoanRecord,
        repayments: &[Repayment],
        request: &RestructureRequest,
        time_provider: &SafeTimeProvider,
    ) -> Result<RestructuringPlan> {
        self.plan(loan, repayments, request, time_provider.now().date_naive())
    }
}

/// interest earned but not yet collected on `as_of`.
///
/// Unpaid installments already due contribute the interest still owed on them; the first
/// installment still running contributes the share of its interest for the days elapsed
/// in its period.
pub fn accrued_interest(schedule: &AmortizationSchedule, as_of: NaiveDate) -> Money {
    let matured: Money = schedule
        .installments
        .iter()
        .filter(|i| i.is_outstanding())
        .map(|i| i.interest_due())
        .sum();

    let running = schedule
        .installments
        .iter()
        .find(|i| i.status == InstallmentStatus::Upcoming)
        .filter(|i| i.period_start < as_of)
        .map(|i| {
            let elapsed = (as_of - i.period_start).num_days();
            let length = (i.due_date - i.period_start).num_days().max(1);
            i.interest_component * Decimal::from(elapsed) / Decimal::from(length)
        })
        .unwrap_or(Money::ZERO);

    matured + running
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit_of_work::EntryDirection;
    use chrono::{TimeZone, Utc};
    use hourglass_rs::TimeSource;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn active_loan() -> LoanRecord {
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
        loan
    }

    fn first_repayment(loan: &LoanRecord) -> Repayment {
        Repayment {
            id: Uuid::new_v4(),
            loan_id: loan.id,
            payment_date: date(2024, 2, 1),
            amount_paid: Money::from_str_exact("10661.85").unwrap(),
            principal_paid: Money::from_str_exact("9461.85").unwrap(),
            interest_paid: Money::from_major(1_200),
            penalty_paid: Money::ZERO,
            installments: Vec::new(),
        }
    }

    fn request() -> RestructureRequest {
        RestructureRequest {
            scheme_id: Uuid::new_v4(),
            annual_rate: Rate::from_percentage(10),
            term_periods: 24,
            frequency: RepaymentFrequency::Monthly,
            grace_period_periods: 0,
        }
    }

    #[test]
    fn test_restructure_mid_period() {
        let engine = RestructuringEngine::default();
        let loan = active_loan();
        let repayments = vec![first_repayment(&loan)];

        // 14 of the 29 days of the second period have elapsed
        let plan = engine.plan(&loan, &repayments, &request(), date(2024, 2, 15)).unwrap();

        assert_eq!(plan.outstanding_principal(), Money::from_str_exact("110538.15").unwrap());
        // 1105.38 * 14 / 29
        assert_eq!(plan.accrued_interest(), Money::from_str_exact("533.63").unwrap());
        assert_eq!(
            plan.capitalized_principal(),
            plan.outstanding_principal() + plan.accrued_interest()
        );

        assert_eq!(plan.settlement.amount_paid, plan.capitalized_principal());
        assert_eq!(plan.settlement.principal_paid, plan.outstanding_principal());
        assert_eq!(plan.settlement.interest_paid, plan.accrued_interest());
        assert_eq!(plan.settlement.penalty_paid, Money::ZERO);

        assert_eq!(plan.status_change.to, LoanStatus::Restructured);
        assert_eq!(plan.successor.status, LoanStatus::Active);
        assert_eq!(plan.successor.restructured_from, Some(loan.id));
        assert_eq!(plan.successor.terms.principal, plan.capitalized_principal());
        assert_eq!(plan.successor.terms.disbursement_date, date(2024, 2, 15));
        assert_eq!(plan.successor.member_id, loan.member_id);
    }

    #[test]
    fn test_unit_of_work_pairs_status_and_successor() {
        let engine = RestructuringEngine::default();
        let loan = active_loan();
        let plan = engine
            .plan(&loan, &[first_repayment(&loan)], &request(), date(2024, 2, 15))
            .unwrap();
        let uow = &plan.unit_of_work;

        let restructured = uow.writes().iter().any(|w| {
            matches!(w, LedgerWrite::UpdateLoanStatus(c) if c.to == LoanStatus::Restructured)
        });
        let successor = uow.writes().iter().any(|w| {
            matches!(w, LedgerWrite::InsertLoan(l) if l.restructured_from == Some(loan.id))
        });
        assert!(restructured && successor);

        assert!(uow.is_balanced());
        assert_eq!(uow.ledger_entries().count(), 2);
        assert_eq!(uow.total(EntryDirection::Debit), plan.capitalized_principal());
    }

    #[test]
    fn test_due_installment_interest_is_capitalized() {
        let engine = RestructuringEngine::default();
        let loan = active_loan();

        // first installment due today, nothing paid yet
        let plan = engine.plan(&loan, &[], &request(), date(2024, 2, 1)).unwrap();

        assert_eq!(plan.outstanding_principal(), Money::from_major(120_000));
        assert_eq!(plan.accrued_interest(), Money::from_major(1_200));
        assert_eq!(plan.capitalized_principal(), Money::from_major(121_200));
    }

    #[test]
    fn test_blocks_overdue_loan() {
        let engine = RestructuringEngine::default();
        let loan = active_loan();

        let result = engine.plan(&loan, &[], &request(), date(2024, 3, 12));
        match result {
            Err(LedgerError::OverdueInstallments { count }) => assert_eq!(count, 2),
            other => panic!("expected overdue rejection, got {other:?}"),
        }
    }

    #[test]
    fn test_blocks_inactive_loan() {
        let engine = RestructuringEngine::default();
        let mut loan = active_loan();
        loan.status = LoanStatus::Restructured;

        assert!(matches!(
            engine.plan(&loan, &[], &request(), date(2024, 1, 15)),
            Err(LedgerError::LoanNotActive { .. })
        ));
    }

    #[test]
    fn test_rejects_invalid_successor_terms() {
        let engine = RestructuringEngine::default();
        let loan = active_loan();
        let mut bad = request();
        bad.term_periods = 0;

        assert!(matches!(
            engine.plan(&loan, &[], &bad, date(2024, 1, 15)),
            Err(LedgerError::InvalidTerms { .. })
        ));
    }

    #[test]
    fn test_nothing_to_restructure() {
        let engine = RestructuringEngine::default();
        let loan = active_loan();
        let settled = Repayment {
            principal_paid: Money::from_major(120_000),
            ..first_repayment(&loan)
        };

        // still inside the first period with principal fully repaid and the first
        // installment linked, so the running period is the second one (not yet started)
        let result = engine.plan(&loan, &[settled], &request(), date(2024, 1, 20));
        assert!(matches!(result, Err(LedgerError::NothingToRestructure)));
    }

    #[test]
    fn test_plan_now_uses_provider_date() {
        let engine = RestructuringEngine::default();
        let loan = active_loan();
        let time = SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2024, 1, 16, 9, 0, 0).unwrap(),
        ));

        let plan = engine.plan_now(&loan, &[], &request(), &time).unwrap();
        assert_eq!(plan.as_of, date(2024, 1, 16));
        // 1200 * 15 / 31
        assert_eq!(plan.accrued_interest(), Money::from_str_exact("580.65").unwrap());
    }
}
