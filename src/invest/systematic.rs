//! Systematic transfer (STP) and withdrawal (SWP) plans
//!
//! Both are simulated month by month: money moves at the start of the month,
//! then every fund earns one month of interest at its own rate.

use crate::error::Result;
use crate::form::{require_months, require_non_negative, require_positive};
use crate::summary::Breakdown;
use crate::tvm::monthly_rate;
use serde::{Deserialize, Serialize};

/// Balances below this are treated as an empty fund
const EMPTY_BALANCE: f64 = 1e-9;

/// Running balances of an STP
#[derive(Debug, Clone)]
struct TransferState {
    month: u32,
    source: f64,
    target: f64,
    transferred: f64,
}

impl TransferState {
    fn new(lumpsum: f64) -> Self {
        Self {
            month: 0,
            source: lumpsum,
            target: 0.0,
            transferred: 0.0,
        }
    }

    /// Move up to `amount` from source to target, then grow both funds
    fn advance_month(&mut self, amount: f64, source_rate: f64, target_rate: f64) -> f64 {
        self.month += 1;

        let transfer = amount.min(self.source).max(0.0);
        self.source -= transfer;
        self.target += transfer;
        self.transferred += transfer;

        self.source *= 1.0 + source_rate;
        self.target *= 1.0 + target_rate;

        if self.source < EMPTY_BALANCE {
            self.source = 0.0;
        }

        transfer
    }
}

/// One month of an STP
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StpMonth {
    pub month: u32,
    pub transfer: f64,
    pub source_balance: f64,
    pub target_balance: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StpResult {
    pub lumpsum: f64,
    pub total_transferred: f64,
    pub final_source_value: f64,
    pub final_target_value: f64,
    pub total_value: f64,
    pub total_gain: f64,
    pub months: Vec<StpMonth>,
}

impl StpResult {
    pub fn breakdown(&self) -> Breakdown {
        Breakdown::new(self.lumpsum, self.total_gain)
    }
}

/// Transfer a fixed amount every month from a source fund into a target fund
pub fn calculate_stp(
    lumpsum: f64,
    monthly_transfer: f64,
    source_annual_rate: f64,
    target_annual_rate: f64,
    months: u32,
) -> Result<StpResult> {
    let lumpsum = require_positive("Investment amount", lumpsum)?;
    let monthly_transfer = require_positive("Transfer amount", monthly_transfer)?;
    let source_rate = monthly_rate(require_non_negative("Source fund return", source_annual_rate)?);
    let target_rate = monthly_rate(require_non_negative("Target fund return", target_annual_rate)?);
    let months = require_months("Transfer period", months)?;

    if monthly_transfer > lumpsum {
        log::warn!(
            "Monthly transfer {:.2} exceeds the lumpsum {:.2}; the source empties in month 1",
            monthly_transfer,
            lumpsum
        );
    }

    let mut state = TransferState::new(lumpsum);
    let mut rows = Vec::with_capacity(months as usize);

    for _ in 0..months {
        let transfer = state.advance_month(monthly_transfer, source_rate, target_rate);
        rows.push(StpMonth {
            month: state.month,
            transfer,
            source_balance: state.source,
            target_balance: state.target,
        });
    }

    let total_value = state.source + state.target;
    Ok(StpResult {
        lumpsum,
        total_transferred: state.transferred,
        final_source_value: state.source,
        final_target_value: state.target,
        total_value,
        total_gain: total_value - lumpsum,
        months: rows,
    })
}

/// One month of an SWP
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwpMonth {
    pub month: u32,
    pub opening_balance: f64,
    pub withdrawal: f64,
    pub interest: f64,
    pub closing_balance: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwpResult {
    pub initial_investment: f64,
    pub total_withdrawn: f64,
    pub total_interest: f64,
    pub final_balance: f64,

    /// Month in which the corpus ran out, if it did
    pub exhausted_in_month: Option<u32>,

    pub months: Vec<SwpMonth>,
}

impl SwpResult {
    /// Amount withdrawn vs what is left
    pub fn breakdown(&self) -> Breakdown {
        Breakdown::new(self.total_withdrawn, self.final_balance)
    }
}

/// Withdraw a fixed amount every month from an invested corpus
pub fn calculate_swp(
    initial_investment: f64,
    monthly_withdrawal: f64,
    annual_rate: f64,
    months: u32,
) -> Result<SwpResult> {
    let initial_investment = require_positive("Total investment", initial_investment)?;
    let monthly_withdrawal = require_positive("Withdrawal per month", monthly_withdrawal)?;
    let rate = monthly_rate(require_non_negative("Expected return rate", annual_rate)?);
    let months = require_months("Time period", months)?;

    let mut balance = initial_investment;
    let mut total_withdrawn = 0.0;
    let mut total_interest = 0.0;
    let mut exhausted_in_month = None;
    let mut rows = Vec::with_capacity(months as usize);

    for month in 1..=months {
        let opening = balance;
        let withdrawal = monthly_withdrawal.min(balance);
        balance -= withdrawal;

        let interest = balance * rate;
        balance += interest;

        if balance < EMPTY_BALANCE {
            balance = 0.0;
            if exhausted_in_month.is_none() {
                log::debug!("SWP corpus exhausted in month {}", month);
                exhausted_in_month = Some(month);
            }
        }

        total_withdrawn += withdrawal;
        total_interest += interest;
        rows.push(SwpMonth {
            month,
            opening_balance: opening,
            withdrawal,
            interest,
            closing_balance: balance,
        });
    }

    Ok(SwpResult {
        initial_investment,
        total_withdrawn,
        total_interest,
        final_balance: balance,
        exhausted_in_month,
        months: rows,
    })
}
