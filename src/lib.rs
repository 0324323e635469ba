pub mod config;
pub mod decimal;
pub mod errors;
pub mod interest;
pub mod loan;
pub mod payments;
pub mod restructuring;
pub mod state;
pub mod types;
pub mod unit_of_work;

// re-export key types
pub use config::{CoreConfig, SavingsConfig};
pub use decimal::{Money, Rate};
pub use errors::{LedgerError, Result};
pub use interest::{
    calculate_emi, capitalize_interest, periodic_installment, start_of_quarter, AccrualEngine,
    AccrualSummary, CapitalizationResult, DepositAccrual, PenaltyCalculation, PenaltyConfig,
    PenaltyEngine,
};
pub use loan::{LoanRecord, LoanTerms, StatusChange, MAX_TERM_MONTHS};
pub use payments::{
    AllocationLine, AllocationResult, AmortizationSchedule, InstallmentRecord, PaymentPlan,
    PaymentProcessor, PaymentRecorder, PaymentRequest, PaymentWaterfall, ScheduleGenerator,
};
pub use restructuring::{accrued_interest, RestructureRequest, RestructuringEngine, RestructuringPlan};
pub use state::LoanPosition;
pub use types::{
    AccountType, Allocation, InstallmentPayment, InstallmentStatus, LoanId, LoanStatus, MemberId,
    Repayment, RepaymentFrequency, RepaymentId, SavingDeposit, SavingScheme, SchemeId,
};
pub use unit_of_work::{EntryDirection, LedgerAccount, LedgerEntry, LedgerWrite, UnitOfWork};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
