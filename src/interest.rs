//! Simple and compound interest

use crate::error::Result;
use crate::form::{require_non_negative, require_positive, require_range, MAX_YEARS};
use crate::summary::Breakdown;
use crate::tvm::{growth_factor, Frequency};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterestResult {
    pub principal: f64,
    pub interest: f64,
    pub total_amount: f64,
}

impl InterestResult {
    fn new(principal: f64, interest: f64) -> Self {
        Self {
            principal,
            interest,
            total_amount: principal + interest,
        }
    }

    pub fn breakdown(&self) -> Breakdown {
        Breakdown::new(self.principal, self.interest)
    }
}

/// SI = P·r·t/100, with t in years (fractions allowed)
pub fn simple_interest(principal: f64, annual_rate: f64, years: f64) -> Result<InterestResult> {
    let principal = require_positive("Principal amount", principal)?;
    let annual_rate = require_non_negative("Rate of interest", annual_rate)?;
    let years = require_range("Time period", require_positive("Time period", years)?, 0.0, MAX_YEARS as f64)?;

    Ok(InterestResult::new(principal, principal * annual_rate * years / 100.0))
}

/// A = P·(1 + r/(100·m))^(m·t)
pub fn compound_interest(
    principal: f64,
    annual_rate: f64,
    years: f64,
    compounding: Frequency,
) -> Result<InterestResult> {
    let principal = require_positive("Principal amount", principal)?;
    let annual_rate = require_non_negative("Rate of interest", annual_rate)?;
    let years = require_range("Time period", require_positive("Time period", years)?, 0.0, MAX_YEARS as f64)?;

    let amount = principal * growth_factor(annual_rate, compounding, years * 12.0);
    Ok(InterestResult::new(principal, amount - principal))
}
