use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::{Money, Rate};

/// unique identifier for a loan
pub type LoanId = Uuid;

/// unique identifier for a recorded repayment
pub type RepaymentId = Uuid;

/// unique identifier for a cooperative member
pub type MemberId = Uuid;

/// unique identifier for a loan or saving scheme
pub type SchemeId = Uuid;

/// loan status, owned by the persistence layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoanStatus {
    /// application recorded, not yet disbursed
    Pending,
    /// disbursed and being repaid
    Active,
    /// fully repaid
    PaidOff,
    /// application declined
    Rejected,
    /// closed and replaced by a successor loan
    Restructured,
}

impl LoanStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            LoanStatus::PaidOff | LoanStatus::Rejected | LoanStatus::Restructured
        )
    }

    /// whether the lifecycle allows moving from `self` to `next`
    pub fn can_transition_to(&self, next: LoanStatus) -> bool {
        matches!(
            (self, next),
            (LoanStatus::Pending, LoanStatus::Active)
                | (LoanStatus::Pending, LoanStatus::Rejected)
                | (LoanStatus::Active, LoanStatus::PaidOff)
                | (LoanStatus::Active, LoanStatus::Rejected)
                | (LoanStatus::Active, LoanStatus::Restructured)
        )
    }
}

/// repayment frequency of a loan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RepaymentFrequency {
    Monthly,
    Quarterly,
    HalfYearly,
    Yearly,
    /// a single bullet installment at maturity
    OneTime,
}

impl RepaymentFrequency {
    /// calendar months between two installments
    pub fn months_per_period(&self) -> u32 {
        match self {
            RepaymentFrequency::Monthly => 1,
            RepaymentFrequency::Quarterly => 3,
            RepaymentFrequency::HalfYearly => 6,
            RepaymentFrequency::Yearly => 12,
            RepaymentFrequency::OneTime => 1,
        }
    }
}

/// status of a scheduled installment as of a reference date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstallmentStatus {
    Upcoming,
    Due,
    Overdue,
    Paid,
}

impl InstallmentStatus {
    /// due or overdue, i.e. collectable now
    pub fn is_outstanding(&self) -> bool {
        matches!(self, InstallmentStatus::Due | InstallmentStatus::Overdue)
    }
}

/// a recorded repayment against a loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repayment {
    pub id: RepaymentId,
    pub loan_id: LoanId,
    pub payment_date: NaiveDate,
    pub amount_paid: Money,
    pub principal_paid: Money,
    pub interest_paid: Money,
    pub penalty_paid: Money,
    /// how the payment was spread over installments; empty for history recorded
    /// outside the core, which is linked one repayment per installment
    #[serde(default)]
    pub installments: Vec<InstallmentPayment>,
}

/// part of a repayment applied to a single installment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallmentPayment {
    pub period_index: u32,
    pub penalty: Money,
    /// regular and penal interest
    pub interest: Money,
    pub principal: Money,
    #[serde(default)]
    pub penalty_waived: Money,
}

impl InstallmentPayment {
    pub fn total(&self) -> Money {
        self.penalty + self.interest + self.principal
    }
}

/// split of a single payment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Allocation {
    pub penalty: Money,
    pub interest: Money,
    pub principal: Money,
    pub overflow_to_savings: Money,
}

impl Allocation {
    /// amount applied to the loan itself
    pub fn total_applied(&self) -> Money {
        self.penalty + self.interest + self.principal
    }

    /// every bucket including overflow
    pub fn total(&self) -> Money {
        self.total_applied() + self.overflow_to_savings
    }
}

/// account type of a saving scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountType {
    /// ordinary savings, interest accrues daily
    Daily,
    /// long-term (fixed) deposit
    Ltd,
    /// current account, never earns interest
    Current,
}

/// saving scheme a deposit is held under
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingScheme {
    pub id: SchemeId,
    pub name: String,
    pub annual_rate: Rate,
    pub account_type: AccountType,
}

impl SavingScheme {
    pub fn earns_interest(&self) -> bool {
        self.account_type != AccountType::Current && self.annual_rate.is_positive()
    }
}

/// a deposit into a member's savings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingDeposit {
    pub id: Uuid,
    pub member_id: MemberId,
    pub scheme_id: SchemeId,
    pub amount: Money,
    pub deposit_date: NaiveDate,
}
