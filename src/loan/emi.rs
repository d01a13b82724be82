//! Amortization solver: EMI from tenure, tenure from EMI, EMI in advance
//! and flat-rate EMI

use crate::config::CalculatorDefaults;
use crate::error::{CalcError, Result};
use crate::form::{require_months, require_non_negative, require_positive, MAX_MONTHS};
use crate::rates::effective_rate_of_flat_loan;
use crate::summary::Breakdown;
use crate::tvm::{level_payment, monthly_rate, ZERO_RATE_EPSILON};
use serde::{Deserialize, Serialize};

/// When each instalment falls due
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EmiTiming {
    /// End of every month (standard bank loans)
    #[default]
    Arrears,
    /// First instalment collected at disbursal
    Advance,
}

/// Loan amount, annual rate (percent) and tenure in months
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub principal: f64,
    pub annual_rate: f64,
    pub months: u32,
}

impl LoanTerms {
    pub fn new(principal: f64, annual_rate: f64, months: u32) -> Self {
        Self { principal, annual_rate, months }
    }

    /// Check the terms and return them unchanged
    pub fn validated(self) -> Result<Self> {
        require_positive("Loan amount", self.principal)?;
        require_non_negative("Interest rate", self.annual_rate)?;
        require_months("Loan tenure", self.months)?;
        Ok(self)
    }

    pub fn monthly_rate(&self) -> f64 {
        monthly_rate(self.annual_rate)
    }
}

/// Result of an EMI calculation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmiResult {
    pub terms: LoanTerms,
    pub timing: EmiTiming,
    pub emi: f64,
    pub total_interest: f64,
    pub total_payment: f64,
}

impl EmiResult {
    fn from_payment(terms: LoanTerms, timing: EmiTiming, emi: f64) -> Self {
        let total_payment = emi * terms.months as f64;
        Self {
            terms,
            timing,
            emi,
            total_interest: total_payment - terms.principal,
            total_payment,
        }
    }

    /// Principal vs interest
    pub fn breakdown(&self) -> Breakdown {
        Breakdown::new(self.terms.principal, self.total_interest)
    }
}

/// Monthly instalment for a loan repaid in arrears
///
/// payment = P·r·(1+r)^n / ((1+r)^n − 1), or P/n at a zero rate.
pub fn calculate_emi(terms: LoanTerms) -> Result<EmiResult> {
    let terms = terms.validated()?;
    let emi = level_payment(terms.principal, terms.months, terms.monthly_rate());
    Ok(EmiResult::from_payment(terms, EmiTiming::Arrears, emi))
}

/// Monthly instalment when the first instalment is paid at disbursal
///
/// Refines the payment E until it equals the arrears EMI on the principal
/// left after paying E up front, over the remaining n − 1 months.
pub fn calculate_emi_in_advance(terms: LoanTerms, defaults: &CalculatorDefaults) -> Result<EmiResult> {
    let terms = terms.validated()?;
    let r = terms.monthly_rate();
    let n = terms.months;

    if n == 1 {
        return Ok(EmiResult::from_payment(terms, EmiTiming::Advance, terms.principal));
    }

    // Slope of the arrears EMI with respect to principal over n - 1 months
    let slope = level_payment(1.0, n - 1, r);
    let mut emi = level_payment(terms.principal, n, r);

    for iteration in 1..=defaults.max_iterations {
        let residual = emi - level_payment(terms.principal - emi, n - 1, r);
        let next = emi - residual / (1.0 + slope);
        let step = (next - emi).abs();
        emi = next;

        if step < defaults.solver_tolerance * emi.abs().max(1.0) {
            log::debug!("EMI in advance converged after {} iterations: {:.6}", iteration, emi);
            return Ok(EmiResult::from_payment(terms, EmiTiming::Advance, emi));
        }
    }

    log::warn!(
        "EMI in advance did not converge within {} iterations",
        defaults.max_iterations
    );
    Err(CalcError::NoConvergence { iterations: defaults.max_iterations })
}

/// Result of solving for the number of instalments
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenureResult {
    pub principal: f64,
    pub annual_rate: f64,
    pub emi: f64,

    /// Exact solution of the annuity equation, in months
    pub exact_months: f64,

    /// Whole instalments needed (the last one may be smaller)
    pub payments: u32,

    /// Size of the final instalment
    pub last_payment: f64,

    pub total_payment: f64,
    pub total_interest: f64,
}

impl TenureResult {
    pub fn years_and_months(&self) -> (u32, u32) {
        (self.payments / 12, self.payments % 12)
    }

    pub fn breakdown(&self) -> Breakdown {
        Breakdown::new(self.principal, self.total_interest)
    }
}

/// Number of months an EMI takes to repay a loan
///
/// n = −ln(1 − P·r/EMI) / ln(1+r). No result when the EMI does not exceed
/// the first month's interest.
pub fn calculate_tenure(principal: f64, annual_rate: f64, emi: f64) -> Result<TenureResult> {
    let principal = require_positive("Loan amount", principal)?;
    let annual_rate = require_non_negative("Interest rate", annual_rate)?;
    let emi = require_positive("EMI", emi)?;

    let r = monthly_rate(annual_rate);
    let first_interest = principal * r;

    let exact_months = if r < ZERO_RATE_EPSILON {
        principal / emi
    } else {
        if emi <= first_interest {
            return Err(CalcError::PaymentTooLow { payment: emi, first_interest });
        }
        -(1.0 - first_interest / emi).ln() / (1.0 + r).ln()
    };

    if !exact_months.is_finite() || exact_months > MAX_MONTHS as f64 {
        return Err(CalcError::OutOfRange { field: "Loan tenure", min: 1.0, max: MAX_MONTHS as f64 });
    }

    let payments = ((exact_months - 1e-6).ceil() as u32).max(1);

    // Balance after all but the last instalment, grown by one month
    let full = payments - 1;
    let balance = if r < ZERO_RATE_EPSILON {
        principal - emi * full as f64
    } else {
        let growth = (1.0 + r).powf(full as f64);
        principal * growth - emi * (growth - 1.0) / r
    };
    let last_payment = (balance * (1.0 + r)).max(0.0);

    let total_payment = emi * full as f64 + last_payment;

    Ok(TenureResult {
        principal,
        annual_rate,
        emi,
        exact_months,
        payments,
        last_payment,
        total_payment,
        total_interest: total_payment - principal,
    })
}

/// Result of a flat-rate loan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlatRateResult {
    pub terms: LoanTerms,
    pub emi: f64,
    pub total_interest: f64,
    pub total_payment: f64,

    /// Reducing-balance annual rate (percent) charging the same EMI
    pub effective_annual_rate: f64,
}

impl FlatRateResult {
    pub fn breakdown(&self) -> Breakdown {
        Breakdown::new(self.terms.principal, self.total_interest)
    }
}

/// Flat-rate EMI: interest on the full principal for the whole tenure
pub fn calculate_flat_rate_emi(terms: LoanTerms) -> Result<FlatRateResult> {
    let terms = terms.validated()?;

    let total_interest = terms.principal * terms.annual_rate / 100.0 * terms.months as f64 / 12.0;
    let total_payment = terms.principal + total_interest;
    let emi = total_payment / terms.months as f64;
    let effective_annual_rate =
        effective_rate_of_flat_loan(terms.principal, terms.annual_rate, terms.months)?;

    Ok(FlatRateResult {
        terms,
        emi,
        total_interest,
        total_payment,
        effective_annual_rate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn reference_terms() -> LoanTerms {
        LoanTerms::new(500_000.0, 10.0, 60)
    }

    #[test]
    fn test_reference_emi() {
        let result = calculate_emi(reference_terms()).unwrap();
        assert_abs_diff_eq!(result.emi, 10_623.52, epsilon = 0.01);
        assert_abs_diff_eq!(result.total_interest, 137_411.0, epsilon = 1.0);
    }

    #[test]
    fn test_payment_times_term_is_principal_plus_interest() {
        for (p, rate, n) in [(100_000.0, 7.5, 12), (2_500_000.0, 8.65, 240), (45_000.0, 18.0, 9)] {
            let result = calculate_emi(LoanTerms::new(p, rate, n)).unwrap();
            assert_relative_eq!(result.emi * n as f64, p + result.total_interest, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_zero_rate_emi() {
        let result = calculate_emi(LoanTerms::new(120_000.0, 0.0, 24)).unwrap();
        assert_eq!(result.emi, 5_000.0);
        assert_eq!(result.total_interest, 0.0);
    }

    #[test]
    fn test_invalid_terms_give_no_result() {
        assert!(calculate_emi(LoanTerms::new(0.0, 10.0, 60)).is_err());
        assert!(calculate_emi(LoanTerms::new(1000.0, -1.0, 60)).is_err());
        assert!(calculate_emi(LoanTerms::new(1000.0, 10.0, 0)).is_err());
        assert!(calculate_emi(LoanTerms::new(f64::NAN, 10.0, 6)).is_err());
    }

    #[test]
    fn test_tenure_inverts_emi() {
        for (p, rate, n) in [(500_000.0, 10.0, 60), (1_000_000.0, 8.4, 180), (75_000.0, 0.0, 15)] {
            let emi = calculate_emi(LoanTerms::new(p, rate, n)).unwrap().emi;
            let tenure = calculate_tenure(p, rate, emi).unwrap();
            assert_abs_diff_eq!(tenure.exact_months, n as f64, epsilon = 1e-6);
            assert_eq!(tenure.payments, n);
            assert_abs_diff_eq!(tenure.last_payment, emi, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_tenure_with_short_final_payment() {
        let tenure = calculate_tenure(100_000.0, 12.0, 10_000.0).unwrap();
        assert_eq!(tenure.payments, 11);
        assert!(tenure.last_payment > 0.0 && tenure.last_payment < 10_000.0);
        assert_eq!(tenure.years_and_months(), (0, 11));
    }

    #[test]
    fn test_tenure_rejects_payment_below_interest() {
        // First month's interest on 500000 at 12% is 5000
        let err = calculate_tenure(500_000.0, 12.0, 5_000.0).unwrap_err();
        assert!(matches!(err, CalcError::PaymentTooLow { .. }));
        assert!(calculate_tenure(500_000.0, 12.0, 4_000.0).is_err());
    }

    #[test]
    fn test_emi_in_advance_matches_closed_form() {
        let terms = reference_terms();
        let result = calculate_emi_in_advance(terms, &CalculatorDefaults::default()).unwrap();

        let r = terms.monthly_rate();
        let n = terms.months as i32;
        let expected = terms.principal * r * (1.0 + r).powi(n - 1) / ((1.0 + r).powi(n) - 1.0);
        assert_relative_eq!(result.emi, expected, max_relative = 1e-9);
        assert!(result.emi < calculate_emi(terms).unwrap().emi);
        assert_eq!(result.timing, EmiTiming::Advance);
    }

    #[test]
    fn test_emi_in_advance_single_month() {
        let result =
            calculate_emi_in_advance(LoanTerms::new(10_000.0, 12.0, 1), &CalculatorDefaults::default()).unwrap();
        assert_eq!(result.emi, 10_000.0);
        assert_eq!(result.total_interest, 0.0);
    }

    #[test]
    fn test_emi_in_advance_two_months() {
        let result =
            calculate_emi_in_advance(LoanTerms::new(10_000.0, 12.0, 2), &CalculatorDefaults::default()).unwrap();
        // E + E/1.01 = 10000
        assert_relative_eq!(result.emi, 10_000.0 / (1.0 + 1.0 / 1.01), max_relative = 1e-9);
    }

    #[test]
    fn test_emi_in_advance_stops_at_iteration_cap() {
        let capped = CalculatorDefaults { max_iterations: 1, ..CalculatorDefaults::default() };
        let err = calculate_emi_in_advance(reference_terms(), &capped).unwrap_err();
        assert!(matches!(err, CalcError::NoConvergence { iterations: 1 }));
        assert!(!err.is_validation());
    }

    #[test]
    fn test_emi_in_advance_with_zero_tolerance() {
        let strict = CalculatorDefaults { solver_tolerance: 0.0, ..CalculatorDefaults::default() };
        assert!(matches!(
            calculate_emi_in_advance(reference_terms(), &strict),
            Err(CalcError::NoConvergence { iterations: 100 })
        ));
    }

    #[test]
    fn test_tenure_longer_than_limit_is_rejected() {
        // Barely above the first month's interest: thousands of years to repay
        let err = calculate_tenure(1e6, 1.2e-6, 0.0011).unwrap_err();
        assert!(matches!(err, CalcError::OutOfRange { field: "Loan tenure", .. }));
        assert!(calculate_tenure(1e6, 0.0, 1.0).is_err());
    }

    #[test]
    fn test_terms_beyond_limit_are_rejected() {
        assert!(matches!(
            calculate_emi(LoanTerms::new(1e6, 10.0, MAX_MONTHS + 1)),
            Err(CalcError::OutOfRange { .. })
        ));
        assert!(calculate_emi(LoanTerms::new(1e6, 10.0, MAX_MONTHS)).is_ok());
    }

    #[test]
    fn test_interest_free_flat_loan_on_large_principal() {
        let result = calculate_flat_rate_emi(LoanTerms::new(30_000_000.0, 0.0, 11)).unwrap();
        assert_eq!(result.total_interest, 0.0);
        assert_eq!(result.effective_annual_rate, 0.0);
        assert_relative_eq!(result.emi * 11.0, 30_000_000.0, max_relative = 1e-12);
    }

    #[test]
    fn test_flat_rate_emi() {
        let result = calculate_flat_rate_emi(LoanTerms::new(100_000.0, 10.0, 36)).unwrap();
        assert_abs_diff_eq!(result.total_interest, 30_000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.emi, 130_000.0 / 36.0, epsilon = 1e-9);
        assert!(result.effective_annual_rate > 10.0);
    }
}
