//! Serializable calculation requests and outcomes
//!
//! One request describes a snapshot of a calculator's form; evaluating it
//! runs the matching calculation. The CLI, batch runner and Lambda handler
//! all go through `CalculationRequest::evaluate`.

use crate::config::CalculatorDefaults;
use crate::error::Result;
use crate::interest::{compound_interest, simple_interest, InterestResult};
use crate::invest::{
    calculate_fd, calculate_lumpsum, calculate_ppf, calculate_rd, calculate_sip,
    calculate_step_up_sip, calculate_stp, calculate_swp, DepositResult, PpfResult, SipResult,
    StepUp, StepUpSipResult, StpResult, SwpResult,
};
use crate::loan::{
    calculate_emi, calculate_emi_in_advance, calculate_flat_rate_emi, calculate_tenure,
    compare_loans, EmiResult, EmiTiming, FlatRateResult, LoanComparison, LoanOffer, LoanTerms,
    TenureResult,
};
use crate::rates::loan_rate_from_emi;
use crate::summary::Breakdown;
use crate::tax::{calculate_gst, standard_slabs, GstResult, TaxDirection, TaxKind};
use crate::tvm::Frequency;
use serde::{Deserialize, Serialize};

fn default_ci_compounding() -> Frequency { Frequency::Annually }

/// Inputs for one calculator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "calculator", rename_all = "snake_case")]
pub enum CalculationRequest {
    Emi {
        principal: f64,
        annual_rate: f64,
        months: u32,
        #[serde(default)]
        timing: EmiTiming,
    },
    Tenure {
        principal: f64,
        annual_rate: f64,
        emi: f64,
    },
    FlatRateEmi {
        principal: f64,
        annual_rate: f64,
        months: u32,
    },
    LoanRate {
        principal: f64,
        emi: f64,
        months: u32,
    },
    CompareLoans {
        loans: Vec<LoanOffer>,
    },
    Sip {
        monthly_investment: f64,
        annual_return: f64,
        years: u32,
    },
    StepUpSip {
        monthly_investment: f64,
        annual_return: f64,
        years: u32,
        step_up: StepUp,
    },
    Lumpsum {
        amount: f64,
        annual_return: f64,
        years: u32,
    },
    Rd {
        monthly_deposit: f64,
        annual_rate: f64,
        months: u32,
        #[serde(default)]
        compounding: Option<Frequency>,
    },
    Fd {
        principal: f64,
        annual_rate: f64,
        months: u32,
        #[serde(default)]
        compounding: Option<Frequency>,
    },
    Ppf {
        yearly_deposit: f64,
        #[serde(default)]
        annual_rate: Option<f64>,
        /// Falls back to the PPF lock-in period
        #[serde(default)]
        years: Option<u32>,
    },
    Gst {
        amount: f64,
        rate: f64,
        #[serde(default)]
        direction: TaxDirection,
        #[serde(default)]
        kind: TaxKind,
    },
    SimpleInterest {
        principal: f64,
        annual_rate: f64,
        years: f64,
    },
    CompoundInterest {
        principal: f64,
        annual_rate: f64,
        years: f64,
        #[serde(default = "default_ci_compounding")]
        compounding: Frequency,
    },
    Stp {
        lumpsum: f64,
        monthly_transfer: f64,
        source_annual_rate: f64,
        target_annual_rate: f64,
        months: u32,
    },
    Swp {
        initial_investment: f64,
        monthly_withdrawal: f64,
        annual_rate: f64,
        months: u32,
    },
}

/// Result of evaluating a request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "calculator", content = "result", rename_all = "snake_case")]
pub enum CalculationOutcome {
    Emi(EmiResult),
    Tenure(TenureResult),
    FlatRateEmi(FlatRateResult),
    LoanRate { annual_rate: f64 },
    CompareLoans(LoanComparison),
    Sip(SipResult),
    StepUpSip(StepUpSipResult),
    Lumpsum(SipResult),
    Rd(DepositResult),
    Fd(DepositResult),
    Ppf(PpfResult),
    Gst(GstResult),
    SimpleInterest(InterestResult),
    CompoundInterest(InterestResult),
    Stp(StpResult),
    Swp(SwpResult),
}

impl CalculationRequest {
    /// Calculator name as used in the `calculator` tag
    pub fn name(&self) -> &'static str {
        match self {
            CalculationRequest::Emi { .. } => "emi",
            CalculationRequest::Tenure { .. } => "tenure",
            CalculationRequest::FlatRateEmi { .. } => "flat_rate_emi",
            CalculationRequest::LoanRate { .. } => "loan_rate",
            CalculationRequest::CompareLoans { .. } => "compare_loans",
            CalculationRequest::Sip { .. } => "sip",
            CalculationRequest::StepUpSip { .. } => "step_up_sip",
            CalculationRequest::Lumpsum { .. } => "lumpsum",
            CalculationRequest::Rd { .. } => "rd",
            CalculationRequest::Fd { .. } => "fd",
            CalculationRequest::Ppf { .. } => "ppf",
            CalculationRequest::Gst { .. } => "gst",
            CalculationRequest::SimpleInterest { .. } => "simple_interest",
            CalculationRequest::CompoundInterest { .. } => "compound_interest",
            CalculationRequest::Stp { .. } => "stp",
            CalculationRequest::Swp { .. } => "swp",
        }
    }

    /// Run the calculation
    pub fn evaluate(&self, defaults: &CalculatorDefaults) -> Result<CalculationOutcome> {
        log::debug!("Evaluating {} request", self.name());

        let outcome = match *self {
            CalculationRequest::Emi { principal, annual_rate, months, timing } => {
                let terms = LoanTerms::new(principal, annual_rate, months);
                let result = match timing {
                    EmiTiming::Arrears => calculate_emi(terms)?,
                    EmiTiming::Advance => calculate_emi_in_advance(terms, defaults)?,
                };
                CalculationOutcome::Emi(result)
            }
            CalculationRequest::Tenure { principal, annual_rate, emi } => {
                CalculationOutcome::Tenure(calculate_tenure(principal, annual_rate, emi)?)
            }
            CalculationRequest::FlatRateEmi { principal, annual_rate, months } => CalculationOutcome::FlatRateEmi(
                calculate_flat_rate_emi(LoanTerms::new(principal, annual_rate, months))?,
            ),
            CalculationRequest::LoanRate { principal, emi, months } => CalculationOutcome::LoanRate {
                annual_rate: loan_rate_from_emi(principal, emi, months)?,
            },
            CalculationRequest::CompareLoans { ref loans } => CalculationOutcome::CompareLoans(compare_loans(loans)?),
            CalculationRequest::Sip { monthly_investment, annual_return, years } => {
                CalculationOutcome::Sip(calculate_sip(monthly_investment, annual_return, years)?)
            }
            CalculationRequest::StepUpSip { monthly_investment, annual_return, years, step_up } => {
                CalculationOutcome::StepUpSip(calculate_step_up_sip(monthly_investment, annual_return, years, step_up)?)
            }
            CalculationRequest::Lumpsum { amount, annual_return, years } => {
                CalculationOutcome::Lumpsum(calculate_lumpsum(amount, annual_return, years)?)
            }
            CalculationRequest::Rd { monthly_deposit, annual_rate, months, compounding } => CalculationOutcome::Rd(
                calculate_rd(
                    monthly_deposit,
                    annual_rate,
                    months,
                    compounding.unwrap_or(defaults.rd_compounding),
                )?,
            ),
            CalculationRequest::Fd { principal, annual_rate, months, compounding } => CalculationOutcome::Fd(
                calculate_fd(
                    principal,
                    annual_rate,
                    months,
                    compounding.unwrap_or(defaults.fd_compounding),
                )?,
            ),
            CalculationRequest::Ppf { yearly_deposit, annual_rate, years } => {
                let years = years.unwrap_or(defaults.ppf_min_years);
                CalculationOutcome::Ppf(calculate_ppf(yearly_deposit, annual_rate, years, defaults)?)
            }
            CalculationRequest::Gst { amount, rate, direction, kind } => {
                CalculationOutcome::Gst(calculate_gst(amount, rate, direction, kind, standard_slabs(defaults))?)
            }
            CalculationRequest::SimpleInterest { principal, annual_rate, years } => {
                CalculationOutcome::SimpleInterest(simple_interest(principal, annual_rate, years)?)
            }
            CalculationRequest::CompoundInterest { principal, annual_rate, years, compounding } => {
                CalculationOutcome::CompoundInterest(compound_interest(principal, annual_rate, years, compounding)?)
            }
            CalculationRequest::Stp { lumpsum, monthly_transfer, source_annual_rate, target_annual_rate, months } => {
                CalculationOutcome::Stp(calculate_stp(
                    lumpsum,
                    monthly_transfer,
                    source_annual_rate,
                    target_annual_rate,
                    months,
                )?)
            }
            CalculationRequest::Swp { initial_investment, monthly_withdrawal, annual_rate, months } => {
                CalculationOutcome::Swp(calculate_swp(initial_investment, monthly_withdrawal, annual_rate, months)?)
            }
        };

        Ok(outcome)
    }
}

impl CalculationOutcome {
    /// Donut-chart split, for calculators that have one
    pub fn breakdown(&self) -> Option<Breakdown> {
        match self {
            CalculationOutcome::Emi(r) => Some(r.breakdown()),
            CalculationOutcome::Tenure(r) => Some(r.breakdown()),
            CalculationOutcome::FlatRateEmi(r) => Some(r.breakdown()),
            CalculationOutcome::Sip(r) | CalculationOutcome::Lumpsum(r) => Some(r.breakdown()),
            CalculationOutcome::StepUpSip(r) => Some(r.breakdown()),
            CalculationOutcome::Rd(r) | CalculationOutcome::Fd(r) => Some(r.breakdown()),
            CalculationOutcome::Ppf(r) => Some(r.breakdown()),
            CalculationOutcome::Gst(r) => Some(r.breakdown()),
            CalculationOutcome::SimpleInterest(r) | CalculationOutcome::CompoundInterest(r) => Some(r.breakdown()),
            CalculationOutcome::Stp(r) => Some(r.breakdown()),
            CalculationOutcome::Swp(r) => Some(r.breakdown()),
            CalculationOutcome::LoanRate { .. } | CalculationOutcome::CompareLoans(_) => None,
        }
    }
}
