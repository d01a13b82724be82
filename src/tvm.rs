//! Time-value-of-money helpers
//!
//! Rates enter the calculators as annual percentages (8.5 means 8.5%).
//! Everything here works on decimal periodic rates.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Rates below this are treated as zero to avoid dividing by a vanishing rate
pub const ZERO_RATE_EPSILON: f64 = 1e-12;

/// Compounding / payment frequency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Annually,
    HalfYearly,
    Quarterly,
    Monthly,
}

impl Frequency {
    /// Number of periods in one year
    pub fn per_year(&self) -> u32 {
        match self {
            Frequency::Annually => 1,
            Frequency::HalfYearly => 2,
            Frequency::Quarterly => 4,
            Frequency::Monthly => 12,
        }
    }
}

impl Default for Frequency {
    fn default() -> Self {
        Frequency::Quarterly
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Frequency::Annually => "annually",
            Frequency::HalfYearly => "half-yearly",
            Frequency::Quarterly => "quarterly",
            Frequency::Monthly => "monthly",
        };
        f.write_str(name)
    }
}

impl FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "annually" | "annual" | "yearly" => Ok(Frequency::Annually),
            "half-yearly" | "half_yearly" | "semiannual" => Ok(Frequency::HalfYearly),
            "quarterly" => Ok(Frequency::Quarterly),
            "monthly" => Ok(Frequency::Monthly),
            other => Err(format!("Unknown frequency: {}", other)),
        }
    }
}

/// Monthly decimal rate from an annual percentage (12% -> 0.01)
pub fn monthly_rate(annual_pct: f64) -> f64 {
    annual_pct / 12.0 / 100.0
}

/// Periodic decimal rate for the given compounding frequency
pub fn periodic_rate(annual_pct: f64, frequency: Frequency) -> f64 {
    annual_pct / 100.0 / frequency.per_year() as f64
}

/// Growth factor over `months` under compounding at `frequency`
///
/// Fractional periods are compounded with a fractional exponent.
pub fn growth_factor(annual_pct: f64, frequency: Frequency, months: f64) -> f64 {
    let i = periodic_rate(annual_pct, frequency);
    let periods = frequency.per_year() as f64 * months / 12.0;
    (1.0 + i).powf(periods)
}

/// Future value of `n` level payments made at the end of each period
pub fn fv_annuity_ordinary(payment: f64, n: u32, rate: f64) -> f64 {
    if rate.abs() < ZERO_RATE_EPSILON {
        return payment * n as f64;
    }
    payment * ((1.0 + rate).powf(n as f64) - 1.0) / rate
}

/// Future value of `n` level payments made at the start of each period
pub fn fv_annuity_due(payment: f64, n: u32, rate: f64) -> f64 {
    fv_annuity_ordinary(payment, n, rate) * (1.0 + rate)
}

/// Present value of `n` level payments made at the end of each period
pub fn pv_annuity_ordinary(payment: f64, n: f64, rate: f64) -> f64 {
    if rate.abs() < ZERO_RATE_EPSILON {
        return payment * n;
    }
    payment * (1.0 - (1.0 + rate).powf(-n)) / rate
}

/// Level payment that amortizes `principal` over `n` periods in arrears
pub fn level_payment(principal: f64, n: u32, rate: f64) -> f64 {
    if n == 0 {
        return principal;
    }
    if rate.abs() < ZERO_RATE_EPSILON {
        return principal / n as f64;
    }
    let growth = (1.0 + rate).powf(n as f64);
    principal * rate * growth / (growth - 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_monthly_rate() {
        assert_relative_eq!(monthly_rate(12.0), 0.01);
    }

    #[test]
    fn test_pv_annuity() {
        // 100/month for 12 months at 6% annual
        let pv = pv_annuity_ordinary(100.0, 12.0, monthly_rate(6.0));
        assert!((pv - 1161.89).abs() < 0.01, "got {}", pv);
    }

    #[test]
    fn test_level_payment_inverts_pv() {
        let r = monthly_rate(9.0);
        let pmt = level_payment(250_000.0, 36, r);
        assert_relative_eq!(pv_annuity_ordinary(pmt, 36.0, r), 250_000.0, max_relative = 1e-12);
    }

    #[test]
    fn test_zero_rate_annuities() {
        assert_eq!(fv_annuity_due(1000.0, 12, 0.0), 12_000.0);
        assert_eq!(level_payment(1200.0, 12, 0.0), 100.0);
    }

    #[test]
    fn test_growth_factor_quarterly() {
        // 8% compounded quarterly for one year
        assert_relative_eq!(growth_factor(8.0, Frequency::Quarterly, 12.0), 1.02_f64.powi(4), max_relative = 1e-12);
    }

    #[test]
    fn test_frequency_parsing() {
        assert_eq!("Monthly".parse::<Frequency>().unwrap(), Frequency::Monthly);
        assert!("weekly".parse::<Frequency>().is_err());
    }
}
