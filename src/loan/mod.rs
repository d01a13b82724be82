//! Loan calculators: EMI, tenure, schedules and comparisons

mod emi;
mod schedule;
mod compare;

pub use emi::{
    calculate_emi, calculate_emi_in_advance, calculate_flat_rate_emi, calculate_tenure,
    EmiResult, EmiTiming, FlatRateResult, LoanTerms, TenureResult,
};
pub use schedule::{AmortizationSchedule, ScheduleRow, YearSummary};
pub use compare::{compare_loans, ComparedLoan, LoanComparison, LoanOffer};
