/// savings accrual - unposted quarter-to-date interest
use std::collections::HashMap;

use coop_credit_rs::chrono::NaiveDate;
use coop_credit_rs::{
    AccountType, AccrualEngine, CoreConfig, Money, Rate, SavingDeposit, SavingScheme, Uuid,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let config = CoreConfig::from_json(r#"{ "savings": { "year_basis": 365 } }"#)?;
    let engine = AccrualEngine::new(config.savings);

    let daily = SavingScheme {
        id: Uuid::new_v4(),
        name: "daily savings".to_string(),
        annual_rate: Rate::from_percentage(6),
        account_type: AccountType::Daily,
    };
    let current = SavingScheme {
        id: Uuid::new_v4(),
        name: "current".to_string(),
        annual_rate: Rate::from_percentage(0),
        account_type: AccountType::Current,
    };

    let member = Uuid::new_v4();
    let deposits = vec![
        SavingDeposit {
            id: Uuid::new_v4(),
            member_id: member,
            scheme_id: daily.id,
            amount: Money::from_major(50_000),
            deposit_date: NaiveDate::from_ymd_opt(2023, 11, 5).ok_or("invalid date")?,
        },
        SavingDeposit {
            id: Uuid::new_v4(),
            member_id: member,
            scheme_id: current.id,
            amount: Money::from_major(8_000),
            deposit_date: NaiveDate::from_ymd_opt(2024, 1, 2).ok_or("invalid date")?,
        },
    ];

    let schemes: HashMap<_, _> = [daily, current].into_iter().map(|s| (s.id, s)).collect();
    let as_of = NaiveDate::from_ymd_opt(2024, 2, 15).ok_or("invalid date")?;

    let summary = engine.accrue_for_member(member, &deposits, &schemes, as_of)?;
    println!("quarter started {}", summary.quarter_start);
    for accrual in &summary.accruals {
        println!("{}: {} days -> {}", accrual.deposit_id, accrual.days, accrual.interest_amount);
    }
    println!("total accrued: {}", summary.total_accrued);

    Ok(())
}
