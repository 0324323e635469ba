use chrono::NaiveDate;
use hourglass_rs::SafeTimeProvider;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::CoreConfig;
use crate::decimal::{Money, Rate};
use crate::errors::{LedgerError, Result};
use crate::interest::{PenaltyConfig, PenaltyEngine};
use crate::loan::{LoanRecord, LoanTerms};
use crate::types::{InstallmentPayment, InstallmentStatus, Repayment, RepaymentId};

/// one period of the repayment schedule as seen on the reference date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallmentRecord {
    pub period_index: u32,
    pub period_start: NaiveDate,
    pub due_date: NaiveDate,
    pub opening_balance: Money,
    pub installment_amount: Money,
    pub principal_component: Money,
    pub interest_component: Money,
    pub closing_balance: Money,
    pub status: InstallmentStatus,
    pub days_overdue: i64,
    /// charges still owed, net of what earlier repayments covered
    pub penal_interest: Money,
    pub penalty: Money,
    pub total_due: Money,
    pub linked_repayment_id: Option<RepaymentId>,
    // credited by earlier repayments
    pub principal_paid: Money,
    /// regular interest first, then penal
    pub interest_paid: Money,
    pub penalty_paid: Money,
}

impl InstallmentRecord {
    /// regular and penal interest still owed, collected together
    pub fn interest_due(&self) -> Money {
        let regular_paid = self.interest_paid.min(self.interest_component);
        self.interest_component - regular_paid + self.penal_interest
    }

    /// principal still owed
    pub fn principal_due(&self) -> Money {
        (self.principal_component - self.principal_paid).max(Money::ZERO)
    }

    pub fn is_outstanding(&self) -> bool {
        self.status.is_outstanding()
    }
}

/// repayment schedule of a loan, recomputed on every read
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    pub terms: LoanTerms,
    pub as_of: NaiveDate,
    pub installment_amount: Money,
    pub installments: Vec<InstallmentRecord>,
    pub total_interest: Money,
    pub total_principal: Money,
}

impl AmortizationSchedule {
    /// get installment for specific period (1-based)
    pub fn get_installment(&self, period_index: u32) -> Option<&InstallmentRecord> {
        period_index
            .checked_sub(1)
            .and_then(|i| self.installments.get(i as usize))
    }

    /// due and overdue installments in chronological order
    pub fn outstanding(&self) -> Vec<&InstallmentRecord> {
        self.installments.iter().filter(|i| i.is_outstanding()).collect()
    }

    pub fn overdue_count(&self) -> usize {
        self.installments
            .iter()
            .filter(|i| i.status == InstallmentStatus::Overdue)
            .count()
    }

    pub fn has_overdue(&self) -> bool {
        self.overdue_count() > 0
    }

    /// first installment not yet due
    pub fn next_upcoming(&self) -> Option<&InstallmentRecord> {
        self.installments
            .iter()
            .find(|i| i.status == InstallmentStatus::Upcoming)
    }

    /// everything collectable today, charges included
    pub fn total_arrears(&self) -> Money {
        self.installments
            .iter()
            .filter(|i| i.is_outstanding())
            .map(|i| i.total_due)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.installments.is_empty()
    }

    pub fn json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// generates amortization schedules with status and overdue charges
#[derive(Debug, Clone, Default)]
pub struct ScheduleGenerator {
    penalty_engine: PenaltyEngine,
}

impl ScheduleGenerator {
    pub fn new(config: PenaltyConfig) -> Self {
        Self {
            penalty_engine: PenaltyEngine::new(config),
        }
    }

    pub fn from_config(config: &CoreConfig) -> Self {
        Self::new(config.penalty.clone())
    }

    /// schedule for `terms` as of `as_of`.
    ///
    /// Repayments carrying an installment breakdown credit the installments they name, and
    /// an installment is paid once its interest and principal are covered. Repayments
    /// without a breakdown settle the oldest open installments, one each, in chronological
    /// order. Invalid terms yield an empty schedule; use `generate_checked` to get the
    /// validation error instead.
    pub fn generate(
        &self,
        terms: &LoanTerms,
        repayments: &[Repayment],
        as_of: NaiveDate,
    ) -> AmortizationSchedule {
        let valid = terms.is_valid();
        let installment_amount = if valid { terms.installment_amount() } else { Money::ZERO };
        let mut schedule = AmortizationSchedule {
            terms: terms.clone(),
            as_of,
            installment_amount,
            installments: Vec::new(),
            total_interest: Money::ZERO,
            total_principal: Money::ZERO,
        };

        if !valid || installment_amount.is_zero() {
            return schedule;
        }

        let lines = amortize(terms, installment_amount);
        let settlements = settle(&lines, repayments);
        for (line, settlement) in lines.into_iter().zip(settlements) {
            schedule
                .installments
                .push(self.apply_status(line, settlement, terms.annual_rate, as_of));
        }

        schedule.total_interest = schedule.installments.iter().map(|i| i.interest_component).sum();
        schedule.total_principal = schedule.installments.iter().map(|i| i.principal_component).sum();

        debug!(
            installments = schedule.installments.len(),
            overdue = schedule.overdue_count(),
            %installment_amount,
            %as_of,
            "schedule generated"
        );

        schedule
    }

    /// like `generate` but rejects invalid terms
    pub fn generate_checked(
        &self,
        terms: &LoanTerms,
        repayments: &[Repayment],
        as_of: NaiveDate,
    ) -> Result<AmortizationSchedule> {
        terms.validate()?;
        Ok(self.generate(terms, repayments, as_of))
    }

    /// schedule for a stored loan, rejecting repayments recorded against another loan
    pub fn for_loan(
        &self,
        loan: &LoanRecord,
        repayments: &[Repayment],
        as_of: NaiveDate,
    ) -> Result<AmortizationSchedule> {
        if let Some(foreign) = repayments.iter().find(|r| r.loan_id != loan.id) {
            return Err(LedgerError::ForeignRepayment {
                repayment_id: foreign.id,
                loan_id: loan.id,
            });
        }
        self.generate_checked(&loan.terms, repayments, as_of)
    }

    /// schedule as of the provider's current date
    pub fn generate_now(
        &self,
        terms: &LoanTerms,
        repayments: &[Repayment],
        time_provider: &SafeTimeProvider,
    ) -> Result<AmortizationSchedule> {
        self.generate_checked(terms, repayments, time_provider.now().date_naive())
    }

    fn apply_status(
        &self,
        line: AmortizationLine,
        settlement: Settlement,
        annual_rate: Rate,
        today: NaiveDate,
    ) -> InstallmentRecord {
        let settled = settlement.covers(&line);
        let mut record = InstallmentRecord {
            period_index: line.period_index,
            period_start: line.period_start,
            due_date: line.due_date,
            opening_balance: line.opening_balance,
            installment_amount: line.installment_amount,
            principal_component: line.principal_component,
            interest_component: line.interest_component,
            closing_balance: line.closing_balance,
            status: InstallmentStatus::Upcoming,
            days_overdue: 0,
            penal_interest: Money::ZERO,
            penalty: Money::ZERO,
            total_due: line.installment_amount,
            linked_repayment_id: None,
            principal_paid: settlement.principal,
            interest_paid: settlement.interest,
            penalty_paid: settlement.penalty,
        };

        if let Some(amount_paid) = settlement.whole {
            record.status = InstallmentStatus::Paid;
            record.linked_repayment_id = settlement.repayment_id;
            record.principal_paid = line.principal_component;
            record.interest_paid = line.interest_component;
            record.total_due = amount_paid;
            return record;
        }

        if settled {
            record.status = InstallmentStatus::Paid;
            record.linked_repayment_id = settlement.repayment_id;
            record.total_due = settlement.total();
            return record;
        }

        if line.due_date > today {
            record.total_due = record.interest_due() + record.principal_due();
            return record;
        }

        record.status = if line.due_date == today {
            InstallmentStatus::Due
        } else {
            InstallmentStatus::Overdue
        };
        record.days_overdue = (today - line.due_date).num_days();

        // charges run on the full installment; what was already collected is netted off
        let charges = self.penalty_engine.calculate_penalty(
            record.installment_amount,
            annual_rate,
            record.days_overdue,
        );
        let penal_paid = (settlement.interest - line.interest_component).max(Money::ZERO);
        record.penal_interest = (charges.penal_interest - penal_paid).max(Money::ZERO);
        record.penalty =
            (charges.penalty - settlement.penalty - settlement.penalty_waived).max(Money::ZERO);
        record.total_due = record.penalty + record.interest_due() + record.principal_due();

        record
    }
}

/// what the repayment history credited to one installment
#[derive(Debug, Clone, Default)]
struct Settlement {
    principal: Money,
    interest: Money,
    penalty: Money,
    penalty_waived: Money,
    repayment_id: Option<RepaymentId>,
    /// amount of a repayment linked whole, without a breakdown
    whole: Option<Money>,
}

impl Settlement {
    fn credit(&mut self, repayment_id: RepaymentId, part: &InstallmentPayment) {
        self.principal += part.principal;
        self.interest += part.interest;
        self.penalty += part.penalty;
        self.penalty_waived += part.penalty_waived;
        self.repayment_id = Some(repayment_id);
    }

    fn covers(&self, line: &AmortizationLine) -> bool {
        self.whole.is_some()
            || (self.principal >= line.principal_component
                && self.interest >= line.interest_component)
    }

    fn total(&self) -> Money {
        self.principal + self.interest + self.penalty
    }
}

// itemized repayments credit the installments they name; the rest settle the oldest
// installments still open, one repayment each
fn settle(lines: &[AmortizationLine], repayments: &[Repayment]) -> Vec<Settlement> {
    let mut ordered: Vec<&Repayment> = repayments.iter().collect();
    ordered.sort_by_key(|r| r.payment_date);

    let mut settlements = vec![Settlement::default(); lines.len()];
    for repayment in ordered.iter().filter(|r| !r.installments.is_empty()) {
        for part in &repayment.installments {
            let Some(index) = part.period_index.checked_sub(1) else {
                continue;
            };
            if let Some(settlement) = settlements.get_mut(index as usize) {
                settlement.credit(repayment.id, part);
            }
        }
    }

    let mut unitemized = ordered.into_iter().filter(|r| r.installments.is_empty());
    for (line, settlement) in lines.iter().zip(settlements.iter_mut()) {
        if settlement.covers(line) {
            continue;
        }
        let Some(repayment) = unitemized.next() else {
            break;
        };
        settlement.repayment_id = Some(repayment.id);
        settlement.whole = Some(repayment.amount_paid);
    }

    settlements
}

/// theoretical schedule line before status is applied
#[derive(Debug, Clone, PartialEq)]
struct AmortizationLine {
    period_index: u32,
    period_start: NaiveDate,
    due_date: NaiveDate,
    opening_balance: Money,
    installment_amount: Money,
    principal_component: Money,
    interest_component: Money,
    closing_balance: Money,
}

// the final period takes whatever balance is left so principal sums exactly
fn amortize(terms: &LoanTerms, installment_amount: Money) -> Vec<AmortizationLine> {
    let period_rate = terms.annual_rate.period_rate(terms.months_per_installment());
    let count = terms.installment_count();

    let mut lines = Vec::with_capacity(count as usize);
    let mut balance = terms.principal;

    for period_index in 1..=count {
        let (Some(period_start), Some(due_date)) =
            (terms.period_start(period_index), terms.due_date(period_index))
        else {
            break;
        };

        let interest = Money::from_decimal(balance.as_decimal() * period_rate.as_decimal());
        let is_last = period_index == count;

        let (principal, installment) = if is_last {
            (balance, balance + interest)
        } else {
            let principal = (installment_amount - interest).max(Money::ZERO).min(balance);
            (principal, installment_amount)
        };

        let closing = balance - principal;
        lines.push(AmortizationLine {
            period_index,
            period_start,
            due_date,
            opening_balance: balance,
            installment_amount: installment,
            principal_component: principal,
            interest_component: interest,
            closing_balance: closing,
        });
        balance = closing;
    }

    lines
}
