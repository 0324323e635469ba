use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use hourglass_rs::SafeTimeProvider;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::config::SavingsConfig;
use crate::decimal::{Money, Rate};
use crate::errors::{LedgerError, Result};
use crate::types::{MemberId, SavingDeposit, SavingScheme, SchemeId};

/// interest accrued on one deposit during the current quarter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepositAccrual {
    pub deposit_id: Uuid,
    pub member_id: MemberId,
    pub scheme_id: SchemeId,
    pub principal_base: Money,
    pub daily_rate: Rate,
    pub interval_start: NaiveDate,
    pub days: i64,
    pub interest_amount: Money,
}

/// accrued-but-unposted interest across a set of deposits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccrualSummary {
    pub as_of: NaiveDate,
    pub quarter_start: NaiveDate,
    pub total_accrued: Money,
    pub accruals: Vec<DepositAccrual>,
}

/// engine for accruing simple daily interest on savings deposits.
///
/// Interest posted at each calendar quarter end is assumed already paid out, so only
/// the running accrual of the current quarter is reported.
#[derive(Debug, Clone, Default)]
pub struct AccrualEngine {
    pub config: SavingsConfig,
}

impl AccrualEngine {
    pub fn new(config: SavingsConfig) -> Self {
        Self { config }
    }

    /// accrual for a single deposit, `None` when nothing has accrued yet
    pub fn accrue_deposit(
        &self,
        deposit: &SavingDeposit,
        scheme: &SavingScheme,
        as_of: NaiveDate,
    ) -> Option<DepositAccrual> {
        if !scheme.earns_interest() {
            return None;
        }

        let interval_start = deposit.deposit_date.max(start_of_quarter(as_of));
        if interval_start >= as_of {
            return None;
        }

        // both ends of the interval are counted
        let days = (as_of - interval_start).num_days() + 1;
        let interest_amount = deposit
            .amount
            .apply_rate(scheme.annual_rate, days, self.config.year_basis);

        Some(DepositAccrual {
            deposit_id: deposit.id,
            member_id: deposit.member_id,
            scheme_id: deposit.scheme_id,
            principal_base: deposit.amount,
            daily_rate: scheme.annual_rate.daily_rate(self.config.year_basis),
            interval_start,
            days,
            interest_amount,
        })
    }

    /// total unposted interest over every deposit
    pub fn accrue(
        &self,
        deposits: &[SavingDeposit],
        schemes: &HashMap<SchemeId, SavingScheme>,
        as_of: NaiveDate,
    ) -> Result<AccrualSummary> {
        let mut accruals = Vec::new();

        for deposit in deposits {
            let scheme = schemes
                .get(&deposit.scheme_id)
                .ok_or(LedgerError::UnknownScheme {
                    scheme_id: deposit.scheme_id,
                })?;

            if let Some(accrual) = self.accrue_deposit(deposit, scheme, as_of) {
                accruals.push(accrual);
            }
        }

        let total_accrued = accruals.iter().map(|a| a.interest_amount).sum();

        debug!(
            %as_of,
            deposits = deposits.len(),
            accruing = accruals.len(),
            %total_accrued,
            "savings accrual computed"
        );

        Ok(AccrualSummary {
            as_of,
            quarter_start: start_of_quarter(as_of),
            total_accrued,
            accruals,
        })
    }

    /// unposted interest for one member's deposits
    pub fn accrue_for_member(
        &self,
        member_id: MemberId,
        deposits: &[SavingDeposit],
        schemes: &HashMap<SchemeId, SavingScheme>,
        as_of: NaiveDate,
    ) -> Result<AccrualSummary> {
        let member_deposits: Vec<SavingDeposit> = deposits
            .iter()
            .filter(|d| d.member_id == member_id)
            .cloned()
            .collect();

        self.accrue(&member_deposits, schemes, as_of)
    }

    /// accrue as of the provider's current date
    pub fn accrue_now(
        &self,
        deposits: &[SavingDeposit],
        schemes: &HashMap<SchemeId, SavingScheme>,
        time_provider: &SafeTimeProvider,
    ) -> Result<AccrualSummary> {
        self.accrue(deposits, schemes, time_provider.now().date_naive())
    }
}

/// first day of the calendar quarter containing `date`
pub fn start_of_quarter(date: NaiveDate) -> NaiveDate {
    let quarter_month = (date.month0() / 3) * 3 + 1;
    NaiveDate::from_ymd_opt(date.year(), quarter_month, 1).unwrap_or(date)
}
