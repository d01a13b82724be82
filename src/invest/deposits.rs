//! Recurring deposit, fixed deposit and PPF maturity

use crate::config::CalculatorDefaults;
use crate::error::{CalcError, Result};
use crate::form::{require_months, require_non_negative, require_positive, require_range, require_years};
use crate::summary::Breakdown;
use crate::tvm::{fv_annuity_due, growth_factor, Frequency, ZERO_RATE_EPSILON};
use serde::{Deserialize, Serialize};

/// Maturity of a deposit scheme
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepositResult {
    pub total_deposited: f64,
    pub maturity_value: f64,
    pub interest_earned: f64,
}

impl DepositResult {
    fn new(total_deposited: f64, maturity_value: f64) -> Self {
        Self {
            total_deposited,
            maturity_value,
            interest_earned: maturity_value - total_deposited,
        }
    }

    pub fn breakdown(&self) -> Breakdown {
        Breakdown::new(self.total_deposited, self.interest_earned)
    }
}

/// Recurring deposit: a fixed amount every month, interest compounded at
/// `compounding` (banks compound quarterly)
///
/// Each deposit grows for the months left until maturity, so the maturity
/// value is R·(q^N − 1)/(1 − 1/q) with q the one-month growth factor.
pub fn calculate_rd(
    monthly_deposit: f64,
    annual_rate: f64,
    months: u32,
    compounding: Frequency,
) -> Result<DepositResult> {
    let monthly_deposit = require_positive("Monthly deposit", monthly_deposit)?;
    let annual_rate = require_non_negative("Interest rate", annual_rate)?;
    let months = require_months("Tenure", months)?;

    let total = monthly_deposit * months as f64;
    let q = growth_factor(annual_rate, compounding, 1.0);

    let maturity = if q - 1.0 < ZERO_RATE_EPSILON {
        total
    } else {
        monthly_deposit * (q.powf(months as f64) - 1.0) / (1.0 - 1.0 / q)
    };

    Ok(DepositResult::new(total, maturity))
}

/// Fixed deposit compounded at `compounding` for `months`
pub fn calculate_fd(
    principal: f64,
    annual_rate: f64,
    months: u32,
    compounding: Frequency,
) -> Result<DepositResult> {
    let principal = require_positive("Deposit amount", principal)?;
    let annual_rate = require_non_negative("Interest rate", annual_rate)?;
    let months = require_months("Tenure", months)?;

    let maturity = principal * growth_factor(annual_rate, compounding, months as f64);
    Ok(DepositResult::new(principal, maturity))
}

/// One financial year of a PPF account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PpfYear {
    pub year: u32,
    pub opening_balance: f64,
    pub deposit: f64,
    pub interest: f64,
    pub closing_balance: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PpfResult {
    pub annual_rate: f64,
    pub total_deposited: f64,
    pub maturity_value: f64,
    pub interest_earned: f64,
    pub statement: Vec<PpfYear>,
}

impl PpfResult {
    pub fn breakdown(&self) -> Breakdown {
        Breakdown::new(self.total_deposited, self.interest_earned)
    }
}

/// PPF: yearly deposit at the start of each year, compounded annually
///
/// `annual_rate` falls back to the configured PPF rate. The account runs
/// for the lock-in period plus whole extension blocks.
pub fn calculate_ppf(
    yearly_deposit: f64,
    annual_rate: Option<f64>,
    years: u32,
    defaults: &CalculatorDefaults,
) -> Result<PpfResult> {
    let yearly_deposit = require_positive("Yearly investment", yearly_deposit)?;
    require_range(
        "Yearly investment",
        yearly_deposit,
        defaults.ppf_min_deposit,
        defaults.ppf_max_deposit,
    )?;
    let annual_rate = require_non_negative("Interest rate", annual_rate.unwrap_or(defaults.ppf_rate))?;
    let years = require_years("Time period", years)?;

    if years < defaults.ppf_min_years {
        return Err(CalcError::InvalidInput(format!(
            "PPF runs for at least {} years",
            defaults.ppf_min_years
        )));
    }
    let block = defaults.ppf_extension_block.max(1);
    if (years - defaults.ppf_min_years) % block != 0 {
        return Err(CalcError::InvalidInput(format!(
            "PPF can only be extended in blocks of {} years",
            block
        )));
    }

    let i = annual_rate / 100.0;
    let mut balance = 0.0;
    let mut statement = Vec::with_capacity(years as usize);

    for year in 1..=years {
        let opening = balance;
        let interest = (opening + yearly_deposit) * i;
        balance = opening + yearly_deposit + interest;
        statement.push(PpfYear {
            year,
            opening_balance: opening,
            deposit: yearly_deposit,
            interest,
            closing_balance: balance,
        });
    }

    let closed_form = fv_annuity_due(yearly_deposit, years, i);
    if (closed_form - balance).abs() > 1e-6 * closed_form.max(1.0) {
        log::warn!(
            "PPF statement drifted from closed form: {:.6} vs {:.6}",
            balance,
            closed_form
        );
    }

    let total_deposited = yearly_deposit * years as f64;
    Ok(PpfResult {
        annual_rate,
        total_deposited,
        maturity_value: balance,
        interest_earned: balance - total_deposited,
        statement,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tvm::monthly_rate;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn test_rd_monthly_compounding_is_annuity_due() {
        let rd = calculate_rd(2_000.0, 7.2, 36, Frequency::Monthly).unwrap();
        let expected = fv_annuity_due(2_000.0, 36, monthly_rate(7.2));
        assert_relative_eq!(rd.maturity_value, expected, max_relative = 1e-10);
        assert_eq!(rd.total_deposited, 72_000.0);
    }

    #[test]
    fn test_rd_quarterly_one_year() {
        // Twelve deposits growing for 12..1 months at 8% compounded quarterly
        let rd = calculate_rd(1_000.0, 8.0, 12, Frequency::Quarterly).unwrap();
        let expected: f64 = (1..=12).map(|k| 1_000.0 * 1.02_f64.powf(k as f64 / 3.0)).sum();
        assert_relative_eq!(rd.maturity_value, expected, max_relative = 1e-10);
    }

    #[test]
    fn test_rd_zero_rate() {
        let rd = calculate_rd(500.0, 0.0, 10, Frequency::Quarterly).unwrap();
        assert_eq!(rd.maturity_value, 5_000.0);
    }

    #[test]
    fn test_fd_quarterly() {
        let fd = calculate_fd(100_000.0, 7.0, 24, Frequency::Quarterly).unwrap();
        assert_relative_eq!(fd.maturity_value, 100_000.0 * 1.0175_f64.powi(8), max_relative = 1e-12);
        assert!(fd.interest_earned > 14_000.0);
    }

    #[test]
    fn test_fd_invalid() {
        assert!(calculate_fd(0.0, 7.0, 12, Frequency::Annually).is_err());
        assert!(calculate_fd(1_000.0, 7.0, 0, Frequency::Annually).is_err());
    }

    #[test]
    fn test_ppf_statement_matches_closed_form() {
        let defaults = CalculatorDefaults::default();
        let ppf = calculate_ppf(150_000.0, None, 15, &defaults).unwrap();

        assert_eq!(ppf.annual_rate, 7.1);
        assert_eq!(ppf.total_deposited, 2_250_000.0);
        assert_eq!(ppf.statement.len(), 15);
        assert_relative_eq!(
            ppf.maturity_value,
            fv_annuity_due(150_000.0, 15, 0.071),
            max_relative = 1e-10
        );
        // Widely quoted figure for the maximum deposit at 7.1%
        assert_abs_diff_eq!(ppf.maturity_value, 4_068_209.0, epsilon = 5.0);
    }

    #[test]
    fn test_ppf_limits() {
        let defaults = CalculatorDefaults::default();
        assert!(matches!(
            calculate_ppf(200_000.0, None, 15, &defaults),
            Err(CalcError::OutOfRange { .. })
        ));
        assert!(calculate_ppf(100.0, None, 15, &defaults).is_err());
        assert!(calculate_ppf(10_000.0, None, 10, &defaults).is_err());
        assert!(calculate_ppf(10_000.0, None, 17, &defaults).is_err());
        assert_eq!(calculate_ppf(10_000.0, None, 20, &defaults).unwrap().statement.len(), 20);
    }

    #[test]
    fn test_deposit_tenure_limits() {
        assert!(matches!(
            calculate_rd(1_000.0, 7.0, 3_000_000_000, Frequency::Quarterly),
            Err(CalcError::OutOfRange { .. })
        ));
        assert!(calculate_fd(1_000.0, 7.0, 1_201, Frequency::Quarterly).is_err());
        assert!(calculate_ppf(10_000.0, None, 105, &CalculatorDefaults::default()).is_err());
    }
}
