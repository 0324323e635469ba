use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::decimal::{Money, Rate};
use crate::errors::{LedgerError, Result};
use crate::interest::periodic_installment;
use crate::types::{LoanId, LoanStatus, MemberId, RepaymentFrequency, SchemeId};

/// longest schedule accepted, grace months included
pub const MAX_TERM_MONTHS: u32 = 600;

/// loan terms, fixed once the loan is disbursed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub principal: Money,
    pub annual_rate: Rate,
    pub term_periods: u32,
    pub disbursement_date: NaiveDate,
    pub frequency: RepaymentFrequency,
    /// interest-free months before the first installment, monthly loans only
    #[serde(default)]
    pub grace_period_periods: u32,
}

impl LoanTerms {
    pub fn new(
        principal: Money,
        annual_rate: Rate,
        term_periods: u32,
        disbursement_date: NaiveDate,
        frequency: RepaymentFrequency,
    ) -> Self {
        Self {
            principal,
            annual_rate,
            term_periods,
            disbursement_date,
            frequency,
            grace_period_periods: 0,
        }
    }

    pub fn with_grace_periods(mut self, periods: u32) -> Self {
        self.grace_period_periods = periods;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.principal.is_positive() {
            return Err(LedgerError::InvalidTerms {
                message: format!("principal must be positive, got {}", self.principal),
            });
        }
        if self.annual_rate.is_negative() {
            return Err(LedgerError::InvalidTerms {
                message: format!("interest rate must not be negative, got {}", self.annual_rate),
            });
        }
        if self.term_periods == 0 {
            return Err(LedgerError::InvalidTerms {
                message: "term must be at least one period".to_string(),
            });
        }
        match self.term_months() {
            Some(months) if months <= MAX_TERM_MONTHS && self.grace_period_periods <= MAX_TERM_MONTHS => {}
            _ => {
                return Err(LedgerError::InvalidTerms {
                    message: format!(
                        "schedule of {} periods with {} grace months exceeds {} months",
                        self.term_periods, self.grace_period_periods, MAX_TERM_MONTHS
                    ),
                })
            }
        }
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// number of installments in the schedule
    pub fn installment_count(&self) -> u32 {
        match self.frequency {
            RepaymentFrequency::OneTime => 1,
            _ => self.term_periods,
        }
    }

    /// grace only applies to monthly loans
    pub fn effective_grace_periods(&self) -> u32 {
        match self.frequency {
            RepaymentFrequency::Monthly => self.grace_period_periods,
            _ => 0,
        }
    }

    /// equal installment amount, zero for invalid terms
    pub fn installment_amount(&self) -> Money {
        periodic_installment(self.principal, self.annual_rate, self.term_periods, self.frequency)
    }

    /// months covered by each installment's interest
    pub fn months_per_installment(&self) -> u32 {
        match self.frequency {
            RepaymentFrequency::OneTime => self.term_periods,
            other => other.months_per_period(),
        }
    }

    /// months from disbursement to the last due date
    pub fn term_months(&self) -> Option<u32> {
        self.installment_count()
            .checked_mul(self.months_per_installment())?
            .checked_add(self.effective_grace_periods())
    }

    /// due date of installment `period` (1-based), clamped to month end
    pub fn due_date(&self, period: u32) -> Option<NaiveDate> {
        self.months_until(period)
            .and_then(|months| self.disbursement_date.checked_add_months(Months::new(months)))
    }

    /// start of the interest period ending at installment `period`
    pub fn period_start(&self, period: u32) -> Option<NaiveDate> {
        self.months_until(period.saturating_sub(1))
            .and_then(|months| self.disbursement_date.checked_add_months(Months::new(months)))
    }

    fn months_until(&self, period: u32) -> Option<u32> {
        period
            .checked_mul(self.months_per_installment())?
            .checked_add(self.effective_grace_periods())
    }
}

/// status change produced by a lifecycle transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    pub loan_id: LoanId,
    pub from: LoanStatus,
    pub to: LoanStatus,
}

/// loan as held by the persistence layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanRecord {
    pub id: LoanId,
    pub member_id: MemberId,
    pub scheme_id: SchemeId,
    pub terms: LoanTerms,
    pub status: LoanStatus,
    /// loan this one replaced through restructuring
    pub restructured_from: Option<LoanId>,
}

impl LoanRecord {
    /// new loan application awaiting approval
    pub fn apply(member_id: MemberId, scheme_id: SchemeId, terms: LoanTerms) -> Result<Self> {
        terms.validate()?;

        Ok(Self {
            id: Uuid::new_v4(),
            member_id,
            scheme_id,
            terms,
            status: LoanStatus::Pending,
            restructured_from: None,
        })
    }

    pub fn is_active(&self) -> bool {
        self.status == LoanStatus::Active
    }

    pub fn ensure_active(&self) -> Result<()> {
        if !self.is_active() {
            return Err(LedgerError::LoanNotActive {
                status: self.status,
            });
        }
        Ok(())
    }

    /// move to `to` if the lifecycle allows it
    pub fn transition(&mut self, to: LoanStatus) -> Result<StatusChange> {
        if !self.status.can_transition_to(to) {
            warn!(loan_id = %self.id, from = ?self.status, to = ?to, "status transition rejected");
            return Err(LedgerError::InvalidStatusTransition {
                from: self.status,
                to,
            });
        }

        let change = StatusChange {
            loan_id: self.id,
            from: self.status,
            to,
        };
        self.status = to;
        info!(loan_id = %self.id, from = ?change.from, to = ?to, "loan status changed");
        Ok(change)
    }

    /// approve and disburse a pending application
    pub fn approve(&mut self) -> Result<StatusChange> {
        self.transition(LoanStatus::Active)
    }

    pub fn reject(&mut self) -> Result<StatusChange> {
        self.transition(LoanStatus::Rejected)
    }

    pub fn mark_paid_off(&mut self) -> Result<StatusChange> {
        self.transition(LoanStatus::PaidOff)
    }
}
