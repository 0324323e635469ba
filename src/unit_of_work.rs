use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::loan::{LoanRecord, StatusChange};
use crate::types::{LoanId, Repayment, SavingDeposit};

/// general ledger accounts touched by the core
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LedgerAccount {
    Cash,
    LoanPortfolio,
    InterestIncome,
    PenaltyIncome,
    MemberSavings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryDirection {
    Debit,
    Credit,
}

/// a single ledger line, produced in balanced sets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: Uuid,
    pub loan_id: LoanId,
    pub account: LedgerAccount,
    pub direction: EntryDirection,
    pub amount: Money,
    pub memo: String,
}

impl LedgerEntry {
    pub fn debit(loan_id: LoanId, account: LedgerAccount, amount: Money, memo: &str) -> Self {
        Self::new(loan_id, account, EntryDirection::Debit, amount, memo)
    }

    pub fn credit(loan_id: LoanId, account: LedgerAccount, amount: Money, memo: &str) -> Self {
        Self::new(loan_id, account, EntryDirection::Credit, amount, memo)
    }

    fn new(
        loan_id: LoanId,
        account: LedgerAccount,
        direction: EntryDirection,
        amount: Money,
        memo: &str,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            loan_id,
            account,
            direction,
            amount,
            memo: memo.to_string(),
        }
    }
}

/// a write the caller must persist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LedgerWrite {
    InsertRepayment(Repayment),
    InsertLoan(LoanRecord),
    UpdateLoanStatus(StatusChange),
    InsertLedgerEntry(LedgerEntry),
    InsertSavingDeposit(SavingDeposit),
}

/// writes that must be committed together or not at all.
///
/// The core never performs I/O. Callers persist every write inside one transaction and
/// roll back completely if any of them fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitOfWork {
    pub id: Uuid,
    writes: Vec<LedgerWrite>,
}

impl Default for UnitOfWork {
    fn default() -> Self {
        Self::new()
    }
}

impl UnitOfWork {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            writes: Vec::new(),
        }
    }

    pub fn push(&mut self, write: LedgerWrite) {
        self.writes.push(write);
    }

    /// add a ledger entry, skipping zero amounts
    pub fn post(&mut self, entry: LedgerEntry) {
        if !entry.amount.is_zero() {
            self.writes.push(LedgerWrite::InsertLedgerEntry(entry));
        }
    }

    pub fn writes(&self) -> &[LedgerWrite] {
        &self.writes
    }

    pub fn take_writes(&mut self) -> Vec<LedgerWrite> {
        std::mem::take(&mut self.writes)
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn ledger_entries(&self) -> impl Iterator<Item = &LedgerEntry> {
        self.writes.iter().filter_map(|w| match w {
            LedgerWrite::InsertLedgerEntry(entry) => Some(entry),
            _ => None,
        })
    }

    pub fn total(&self, direction: EntryDirection) -> Money {
        self.ledger_entries()
            .filter(|e| e.direction == direction)
            .map(|e| e.amount)
            .sum()
    }

    /// debits equal credits
    pub fn is_balanced(&self) -> bool {
        self.total(EntryDirection::Debit) == self.total(EntryDirection::Credit)
    }

    pub fn ensure_balanced(&self) -> Result<()> {
        let debits = self.total(EntryDirection::Debit);
        let credits = self.total(EntryDirection::Credit);
        if debits != credits {
            return Err(LedgerError::ConservationViolation {
                expected: debits,
                actual: credits,
            });
        }
        Ok(())
    }

    pub fn json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balanced_entries() {
        let loan_id = Uuid::new_v4();
        let mut uow = UnitOfWork::new();

        uow.post(LedgerEntry::debit(loan_id, LedgerAccount::Cash, Money::from_major(1_500), "payment"));
        uow.post(LedgerEntry::credit(loan_id, LedgerAccount::LoanPortfolio, Money::from_major(1_000), "principal"));
        assert!(!uow.is_balanced());
        assert!(matches!(
            uow.ensure_balanced(),
            Err(LedgerError::ConservationViolation { .. })
        ));

        uow.post(LedgerEntry::credit(loan_id, LedgerAccount::InterestIncome, Money::from_major(500), "interest"));
        assert!(uow.is_balanced());
        assert!(uow.ensure_balanced().is_ok());
        assert_eq!(uow.ledger_entries().count(), 3);
    }

    #[test]
    fn test_zero_entries_are_skipped() {
        let mut uow = UnitOfWork::new();
        uow.post(LedgerEntry::credit(Uuid::new_v4(), LedgerAccount::PenaltyIncome, Money::ZERO, "penalty"));
        assert!(uow.is_empty());
    }

    #[test]
    fn test_take_writes() {
        let mut uow = UnitOfWork::default();
        uow.post(LedgerEntry::debit(Uuid::new_v4(), LedgerAccount::Cash, Money::CENT, "x"));
        assert_eq!(uow.len(), 1);

        let writes = uow.take_writes();
        assert_eq!(writes.len(), 1);
        assert!(uow.is_empty());
    }
}
