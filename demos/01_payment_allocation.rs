/// payment allocation - a late payment drains penalty, interest, then principal
use coop_credit_rs::chrono::NaiveDate;
use coop_credit_rs::{
    LoanRecord, LoanTerms, Money, PaymentRecorder, PaymentRequest, Rate, RepaymentFrequency, Uuid,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    println!("=== payment allocation example ===\n");

    let terms = LoanTerms::new(
        Money::from_major(120_000),
        Rate::from_percentage(12),
        12,
        NaiveDate::from_ymd_opt(2024, 1, 1).ok_or("invalid date")?,
        RepaymentFrequency::Monthly,
    );
    let mut loan = LoanRecord::apply(Uuid::new_v4(), Uuid::new_v4(), terms)?;
    loan.approve()?;

    // two installments are late by the time the member pays
    let savings_scheme = Uuid::new_v4();
    let request = PaymentRequest::new(
        loan.id,
        Money::from_major(25_000),
        NaiveDate::from_ymd_opt(2024, 3, 12).ok_or("invalid date")?,
        savings_scheme,
    );

    let plan = PaymentRecorder::default().plan_payment(&loan, &[], &request)?;
    let split = plan.allocation.allocation;
    println!("penalty:   {}", split.penalty);
    println!("interest:  {}", split.interest);
    println!("principal: {}", split.principal);
    println!("savings:   {}", split.overflow_to_savings);

    for line in &plan.allocation.lines {
        println!(
            "installment {} due {}: {} (settled: {})",
            line.period_index,
            line.due_date,
            line.total(),
            line.settled
        );
    }

    println!("\nwrites to persist together:");
    println!("{}", plan.unit_of_work.json()?);

    Ok(())
}
