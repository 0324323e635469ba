/// restructuring - capitalize the balance into a new loan
use coop_credit_rs::chrono::{NaiveDate, TimeZone, Utc};
use coop_credit_rs::{
    LoanRecord, LoanTerms, Money, Rate, RepaymentFrequency, RestructureRequest,
    RestructuringEngine, SafeTimeProvider, TimeSource, Uuid,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    println!("=== restructuring example ===\n");

    let terms = LoanTerms::new(
        Money::from_major(60_000),
        Rate::from_percentage(14),
        12,
        NaiveDate::from_ymd_opt(2024, 1, 1).ok_or("invalid date")?,
        RepaymentFrequency::Monthly,
    );
    let mut loan = LoanRecord::apply(Uuid::new_v4(), Uuid::new_v4(), terms)?;
    loan.approve()?;

    // midway through the first period
    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 1, 20, 10, 0, 0)
            .single()
            .ok_or("invalid time")?,
    ));

    let request = RestructureRequest {
        scheme_id: loan.scheme_id,
        annual_rate: Rate::from_percentage(11),
        term_periods: 8,
        frequency: RepaymentFrequency::Quarterly,
        grace_period_periods: 0,
    };

    let plan = RestructuringEngine::default().plan_now(&loan, &[], &request, &time)?;
    println!("outstanding principal: {}", plan.outstanding_principal());
    println!("accrued interest:      {}", plan.accrued_interest());
    println!("new principal:         {}", plan.capitalized_principal());
    println!("successor loan:        {}", plan.successor.id);
    println!("installment:           {}", plan.successor.terms.installment_amount());

    Ok(())
}
