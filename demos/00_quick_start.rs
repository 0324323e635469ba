/// quick start - build a schedule for a new loan
use coop_credit_rs::chrono::NaiveDate;
use coop_credit_rs::{LoanRecord, LoanTerms, Money, Rate, RepaymentFrequency, ScheduleGenerator, Uuid};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let disbursed = NaiveDate::from_ymd_opt(2024, 1, 1).ok_or("invalid date")?;

    // 120,000 at 12% over 12 months
    let terms = LoanTerms::new(
        Money::from_major(120_000),
        Rate::from_percentage(12),
        12,
        disbursed,
        RepaymentFrequency::Monthly,
    );
    let mut loan = LoanRecord::apply(Uuid::new_v4(), Uuid::new_v4(), terms)?;
    loan.approve()?;

    let schedule = ScheduleGenerator::default().generate(&loan.terms, &[], disbursed);
    println!("installment: {}", schedule.installment_amount);
    for installment in &schedule.installments {
        println!(
            "{:>2} {} principal {:>10} interest {:>8} balance {:>10}",
            installment.period_index,
            installment.due_date,
            installment.principal_component,
            installment.interest_component,
            installment.closing_balance,
        );
    }
    println!("total interest: {}", schedule.total_interest);

    Ok(())
}
