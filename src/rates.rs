//! Rate solving from cashflow streams
//!
//! Used to back out the interest rate implied by an EMI and the effective
//! reducing-balance rate of a flat-rate loan.

use crate::error::{CalcError, Result};
use crate::form::{require_months, require_non_negative, require_positive};

const TOLERANCE: f64 = 1e-10;
const MAX_ITERATIONS: u32 = 1000;

/// Solve for the periodic rate at which the NPV of `cashflows` is zero
/// using Newton-Raphson, falling back to bisection.
///
/// `cashflows[0]` is at time 0. Returns None when the stream has no sign
/// change and therefore no rate.
pub fn solve_periodic_rate(cashflows: &[f64], initial_guess: f64) -> Option<f64> {
    if cashflows.is_empty() {
        return None;
    }

    if cashflows.iter().all(|&cf| cf.abs() < 1e-10) {
        return Some(0.0);
    }

    let has_positive = cashflows.iter().any(|&cf| cf > 1e-10);
    let has_negative = cashflows.iter().any(|&cf| cf < -1e-10);
    if !has_positive || !has_negative {
        return None;
    }

    let mut rate = initial_guess;

    for _ in 0..MAX_ITERATIONS {
        let (npv, dnpv) = npv_at_rate(cashflows, rate);

        if dnpv.abs() < 1e-20 {
            return solve_by_bisection(cashflows);
        }

        let new_rate = (rate - npv / dnpv).max(-0.99).min(10.0);

        if (new_rate - rate).abs() < TOLERANCE {
            return Some(new_rate);
        }

        rate = new_rate;
    }

    log::debug!("Newton-Raphson did not settle, falling back to bisection");
    solve_by_bisection(cashflows)
}

/// Annual effective IRR of periodic cashflows
pub fn calculate_irr(cashflows: &[f64], periods_per_year: u32) -> Option<f64> {
    let guess = 0.05 / periods_per_year as f64;
    solve_periodic_rate(cashflows, guess)
        .map(|periodic| (1.0 + periodic).powi(periods_per_year as i32) - 1.0)
}

/// Nominal annual rate (percent) at which `emi` for `months` repays `principal`
pub fn loan_rate_from_emi(principal: f64, emi: f64, months: u32) -> Result<f64> {
    let principal = require_positive("Loan amount", principal)?;
    let emi = require_positive("EMI", emi)?;
    let months = require_months("Loan tenure", months)?;

    // (P/n)·n can land a few ulps away from P
    let slack = 1e-12 * principal.max(1.0);
    let total = emi * months as f64;
    if total < principal - slack {
        return Err(CalcError::InvalidInput(format!(
            "{} payments of {:.2} do not repay {:.2}",
            months, emi, principal
        )));
    }
    if (total - principal).abs() <= slack {
        return Ok(0.0);
    }

    let mut cashflows = Vec::with_capacity(months as usize + 1);
    cashflows.push(principal);
    cashflows.extend(std::iter::repeat(-emi).take(months as usize));

    let monthly = solve_periodic_rate(&cashflows, 0.01)
        .ok_or(CalcError::NoConvergence { iterations: MAX_ITERATIONS })?;
    Ok(monthly * 12.0 * 100.0)
}

/// Reducing-balance annual rate (percent) equivalent to a flat-rate loan
pub fn effective_rate_of_flat_loan(principal: f64, flat_rate_pct: f64, months: u32) -> Result<f64> {
    if require_non_negative("Interest rate", flat_rate_pct)? == 0.0 {
        return Ok(0.0);
    }
    let interest = principal * flat_rate_pct / 100.0 * months as f64 / 12.0;
    let emi = (principal + interest) / months as f64;
    loan_rate_from_emi(principal, emi, months)
}

/// NPV of `cashflows` at a periodic `rate` and its derivative with respect to the rate
fn npv_at_rate(cashflows: &[f64], rate: f64) -> (f64, f64) {
    let v = 1.0 / (1.0 + rate);
    let mut discount = 1.0;
    let mut npv = 0.0;
    let mut dnpv = 0.0;

    for (t, &cf) in cashflows.iter().enumerate() {
        npv += cf * discount;
        dnpv -= t as f64 * cf * discount * v;
        discount *= v;
    }

    (npv, dnpv)
}

fn solve_by_bisection(cashflows: &[f64]) -> Option<f64> {
    let mut low = -0.99_f64;
    let mut high = 10.0_f64;

    let (mut npv_low, _) = npv_at_rate(cashflows, low);
    let (npv_high, _) = npv_at_rate(cashflows, high);

    if npv_low * npv_high > 0.0 {
        return None;
    }

    for _ in 0..MAX_ITERATIONS {
        let mid = (low + high) / 2.0;
        let (npv_mid, _) = npv_at_rate(cashflows, mid);

        if npv_mid.abs() < TOLERANCE || (high - low) / 2.0 < TOLERANCE {
            return Some(mid);
        }

        if npv_mid * npv_low < 0.0 {
            high = mid;
        } else {
            low = mid;
            npv_low = npv_mid;
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_simple_irr() {
        // 1000 out, 1100 back after 12 months
        let mut cashflows = vec![-1000.0];
        cashflows.extend(vec![0.0; 11]);
        cashflows.push(1100.0);

        let irr = calculate_irr(&cashflows, 12).unwrap();
        assert_abs_diff_eq!(irr, 0.10, epsilon = 0.001);
    }

    #[test]
    fn test_no_sign_change() {
        assert!(calculate_irr(&[100.0, 200.0], 12).is_none());
        assert!(calculate_irr(&[], 12).is_none());
    }

    #[test]
    fn test_rate_from_emi() {
        // 500000 over 60 months at 10% gives EMI 10623.52
        let rate = loan_rate_from_emi(500_000.0, 10_623.52, 60).unwrap();
        assert_abs_diff_eq!(rate, 10.0, epsilon = 1e-3);
    }

    #[test]
    fn test_rate_from_emi_interest_free() {
        assert_eq!(loan_rate_from_emi(1200.0, 100.0, 12).unwrap(), 0.0);
        assert!(loan_rate_from_emi(1200.0, 90.0, 12).is_err());
    }

    #[test]
    fn test_interest_free_large_principal() {
        // 3 crore over 11 months: (P/11)·11 falls just short of P
        let emi = 30_000_000.0 / 11.0;
        assert_eq!(loan_rate_from_emi(30_000_000.0, emi, 11).unwrap(), 0.0);

        for principal in [1e7, 3e7, 1e9, 1e11] {
            for months in 1..=360 {
                let rate = effective_rate_of_flat_loan(principal, 0.0, months).unwrap();
                assert_eq!(rate, 0.0, "principal {} months {}", principal, months);
            }
        }
    }

    #[test]
    fn test_npv_derivative_matches_finite_difference() {
        let cashflows = [-1000.0, 300.0, 400.0, 500.0];
        let (_, dnpv) = npv_at_rate(&cashflows, 0.05);
        let h = 1e-6;
        let numeric = (npv_at_rate(&cashflows, 0.05 + h).0 - npv_at_rate(&cashflows, 0.05 - h).0) / (2.0 * h);
        assert_abs_diff_eq!(dnpv, numeric, epsilon = 1e-4);
    }

    #[test]
    fn test_rate_from_emi_rejects_long_tenure() {
        assert!(matches!(
            loan_rate_from_emi(1e6, 1_000.0, 5_000),
            Err(CalcError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_flat_rate_costs_more_than_it_looks() {
        // A 10% flat loan over 3 years is roughly 17.6% reducing
        let effective = effective_rate_of_flat_loan(100_000.0, 10.0, 36).unwrap();
        assert!(effective > 17.0 && effective < 18.5, "got {}", effective);
    }
}
