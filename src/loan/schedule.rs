//! Month-by-month amortization schedule

use super::emi::{EmiResult, EmiTiming, TenureResult};
use crate::error::Result;
use crate::tvm::monthly_rate;
use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::io::Write;

/// A single instalment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRow {
    /// Instalment number (1-indexed)
    pub month: u32,

    /// Due date, when a disbursal date was given
    pub due_date: Option<NaiveDate>,

    pub opening_balance: f64,
    pub payment: f64,
    pub interest: f64,
    pub principal: f64,
    pub closing_balance: f64,
}

/// Totals for one loan year (12 instalments, the last year may be shorter)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearSummary {
    pub year: u32,
    pub payments: f64,
    pub interest: f64,
    pub principal: f64,
    pub closing_balance: f64,
}

/// Complete amortization schedule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    pub rows: Vec<ScheduleRow>,
}

impl AmortizationSchedule {
    /// Schedule for a fixed-EMI loan
    pub fn from_emi(result: &EmiResult, disbursal: Option<NaiveDate>) -> Self {
        let terms = &result.terms;
        Self::generate(
            terms.principal,
            terms.monthly_rate(),
            result.emi,
            terms.months,
            result.timing,
            disbursal,
        )
    }

    /// Schedule for a loan whose tenure was solved from the EMI
    pub fn from_tenure(result: &TenureResult, disbursal: Option<NaiveDate>) -> Self {
        Self::generate(
            result.principal,
            monthly_rate(result.annual_rate),
            result.emi,
            result.payments,
            EmiTiming::Arrears,
            disbursal,
        )
    }

    fn generate(
        principal: f64,
        rate: f64,
        emi: f64,
        count: u32,
        timing: EmiTiming,
        disbursal: Option<NaiveDate>,
    ) -> Self {
        let mut rows = Vec::with_capacity(count as usize);
        let mut balance = principal;

        for month in 1..=count {
            let opening = balance;
            let interest = if timing == EmiTiming::Advance && month == 1 {
                0.0
            } else {
                opening * rate
            };

            // The last instalment clears whatever rounding drift is left
            let payment = if month == count { opening + interest } else { emi };
            let principal_part = payment - interest;
            let closing = if month == count { 0.0 } else { opening - principal_part };

            let offset = match timing {
                EmiTiming::Arrears => month,
                EmiTiming::Advance => month - 1,
            };
            let due_date = disbursal.and_then(|d| d.checked_add_months(Months::new(offset)));

            rows.push(ScheduleRow {
                month,
                due_date,
                opening_balance: opening,
                payment,
                interest,
                principal: principal_part,
                closing_balance: closing,
            });

            balance = closing;
        }

        Self { rows }
    }

    pub fn total_interest(&self) -> f64 {
        self.rows.iter().map(|r| r.interest).sum()
    }

    pub fn total_payment(&self) -> f64 {
        self.rows.iter().map(|r| r.payment).sum()
    }

    /// Roll the monthly rows up into loan years
    pub fn yearly(&self) -> Vec<YearSummary> {
        self.rows
            .chunks(12)
            .enumerate()
            .map(|(i, chunk)| YearSummary {
                year: i as u32 + 1,
                payments: chunk.iter().map(|r| r.payment).sum(),
                interest: chunk.iter().map(|r| r.interest).sum(),
                principal: chunk.iter().map(|r| r.principal).sum(),
                closing_balance: chunk.last().map(|r| r.closing_balance).unwrap_or(0.0),
            })
            .collect()
    }

    /// Write the monthly rows as CSV
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        for row in &self.rows {
            csv_writer.serialize(row)?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CalculatorDefaults;
    use crate::loan::emi::{calculate_emi, calculate_emi_in_advance, calculate_tenure, LoanTerms};
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_schedule_pays_off_loan() {
        let result = calculate_emi(LoanTerms::new(500_000.0, 10.0, 60)).unwrap();
        let schedule = AmortizationSchedule::from_emi(&result, None);

        assert_eq!(schedule.rows.len(), 60);
        assert_eq!(schedule.rows.last().unwrap().closing_balance, 0.0);
        assert_abs_diff_eq!(schedule.total_interest(), result.total_interest, epsilon = 1e-4);

        let principal_paid: f64 = schedule.rows.iter().map(|r| r.principal).sum();
        assert_abs_diff_eq!(principal_paid, 500_000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_first_row_interest() {
        let result = calculate_emi(LoanTerms::new(120_000.0, 12.0, 12)).unwrap();
        let schedule = AmortizationSchedule::from_emi(&result, None);
        assert_abs_diff_eq!(schedule.rows[0].interest, 1_200.0, epsilon = 1e-9);
        assert!(schedule.rows[1].interest < schedule.rows[0].interest);
    }

    #[test]
    fn test_advance_schedule_has_no_interest_in_first_row() {
        let result =
            calculate_emi_in_advance(LoanTerms::new(100_000.0, 9.0, 24), &CalculatorDefaults::default()).unwrap();
        let disbursal = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        let schedule = AmortizationSchedule::from_emi(&result, Some(disbursal));

        assert_eq!(schedule.rows[0].interest, 0.0);
        assert_eq!(schedule.rows[0].due_date, Some(disbursal));
        assert_abs_diff_eq!(schedule.rows.last().unwrap().payment, result.emi, epsilon = 1e-6);
    }

    #[test]
    fn test_due_dates_clamp_to_month_end() {
        let result = calculate_emi(LoanTerms::new(10_000.0, 10.0, 3)).unwrap();
        let disbursal = NaiveDate::from_ymd_opt(2026, 1, 31).unwrap();
        let schedule = AmortizationSchedule::from_emi(&result, Some(disbursal));
        assert_eq!(schedule.rows[0].due_date, NaiveDate::from_ymd_opt(2026, 2, 28));
        assert_eq!(schedule.rows[2].due_date, NaiveDate::from_ymd_opt(2026, 4, 30));
    }

    #[test]
    fn test_tenure_schedule_ends_with_short_payment() {
        let tenure = calculate_tenure(100_000.0, 12.0, 10_000.0).unwrap();
        let schedule = AmortizationSchedule::from_tenure(&tenure, None);
        assert_eq!(schedule.rows.len(), 11);
        assert_abs_diff_eq!(schedule.rows[10].payment, tenure.last_payment, epsilon = 1e-6);
    }

    #[test]
    fn test_yearly_rollup() {
        let result = calculate_emi(LoanTerms::new(300_000.0, 11.0, 30)).unwrap();
        let yearly = AmortizationSchedule::from_emi(&result, None).yearly();
        assert_eq!(yearly.len(), 3);
        assert_eq!(yearly[2].closing_balance, 0.0);
        let total: f64 = yearly.iter().map(|y| y.principal).sum();
        assert_abs_diff_eq!(total, 300_000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_csv_export() {
        let result = calculate_emi(LoanTerms::new(12_000.0, 0.0, 2)).unwrap();
        let schedule = AmortizationSchedule::from_emi(&result, None);

        let mut buffer = Vec::new();
        schedule.write_csv(&mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "month,due_date,opening_balance,payment,interest,principal,closing_balance"
        );
        assert_eq!(lines.count(), 2);
    }
}
