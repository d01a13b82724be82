//! SIP, lumpsum and step-up SIP growth

use crate::error::Result;
use crate::form::{require_non_negative, require_positive, require_years, years_to_months};
use crate::summary::Breakdown;
use crate::tvm::{fv_annuity_due, monthly_rate};
use serde::{Deserialize, Serialize};

/// Result of a SIP or lumpsum projection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SipResult {
    pub total_invested: f64,
    pub maturity_value: f64,
    pub estimated_returns: f64,
}

impl SipResult {
    fn new(total_invested: f64, maturity_value: f64) -> Self {
        Self {
            total_invested,
            maturity_value,
            estimated_returns: maturity_value - total_invested,
        }
    }

    /// Invested amount vs returns
    pub fn breakdown(&self) -> Breakdown {
        Breakdown::new(self.total_invested, self.estimated_returns)
    }
}

/// Monthly SIP paid at the start of each month
///
/// FV = M·((1+i)^n − 1)/i·(1+i), with i the monthly rate and n = years·12.
pub fn calculate_sip(monthly_investment: f64, annual_return: f64, years: u32) -> Result<SipResult> {
    let monthly_investment = require_positive("Monthly investment", monthly_investment)?;
    let annual_return = require_non_negative("Expected return rate", annual_return)?;
    let n = years_to_months("Time period", years)?;

    let maturity = fv_annuity_due(monthly_investment, n, monthly_rate(annual_return));

    Ok(SipResult::new(monthly_investment * n as f64, maturity))
}

/// One-time investment compounded annually
pub fn calculate_lumpsum(amount: f64, annual_return: f64, years: u32) -> Result<SipResult> {
    let amount = require_positive("Total investment", amount)?;
    let annual_return = require_non_negative("Expected return rate", annual_return)?;
    let years = require_years("Time period", years)?;

    let maturity = amount * (1.0 + annual_return / 100.0).powf(years as f64);
    Ok(SipResult::new(amount, maturity))
}

/// How the SIP instalment grows each year
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum StepUp {
    /// Increase by a percentage of the current instalment
    Percent(f64),
    /// Increase by a fixed amount
    Amount(f64),
}

impl StepUp {
    fn apply(&self, instalment: f64) -> f64 {
        match self {
            StepUp::Percent(pct) => instalment * (1.0 + pct / 100.0),
            StepUp::Amount(amount) => instalment + amount,
        }
    }
}

/// Year-end position of a step-up SIP
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepUpYear {
    pub year: u32,
    pub monthly_instalment: f64,
    pub invested_to_date: f64,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepUpSipResult {
    pub total_invested: f64,
    pub maturity_value: f64,
    pub estimated_returns: f64,

    /// Instalment paid during the final year
    pub final_instalment: f64,

    pub years: Vec<StepUpYear>,
}

impl StepUpSipResult {
    pub fn breakdown(&self) -> Breakdown {
        Breakdown::new(self.total_invested, self.estimated_returns)
    }
}

/// SIP whose instalment steps up once every 12 months
pub fn calculate_step_up_sip(
    monthly_investment: f64,
    annual_return: f64,
    years: u32,
    step_up: StepUp,
) -> Result<StepUpSipResult> {
    let monthly_investment = require_positive("Monthly investment", monthly_investment)?;
    let annual_return = require_non_negative("Expected return rate", annual_return)?;
    let years = require_years("Time period", years)?;
    match step_up {
        StepUp::Percent(pct) => require_non_negative("Step-up percentage", pct)?,
        StepUp::Amount(amount) => require_non_negative("Step-up amount", amount)?,
    };

    let i = monthly_rate(annual_return);
    let mut instalment = monthly_investment;
    let mut balance = 0.0;
    let mut invested = 0.0;
    let mut rows = Vec::with_capacity(years as usize);

    for year in 1..=years {
        if year > 1 {
            instalment = step_up.apply(instalment);
        }
        for _ in 0..12 {
            invested += instalment;
            balance = (balance + instalment) * (1.0 + i);
        }
        rows.push(StepUpYear {
            year,
            monthly_instalment: instalment,
            invested_to_date: invested,
            value: balance,
        });
    }

    Ok(StepUpSipResult {
        total_invested: invested,
        maturity_value: balance,
        estimated_returns: balance - invested,
        final_instalment: instalment,
        years: rows,
    })
}
