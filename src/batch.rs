//! Batch evaluation of calculation requests
//!
//! Requests come from a JSON file (one object or an array) or, for loan
//! comparisons, from a CSV of offers. Independent requests are evaluated in
//! parallel and reported in input order.

use crate::config::CalculatorDefaults;
use crate::error::{CalcError, Result};
use crate::form::{parse_count, parse_non_negative, parse_positive};
use crate::loan::{LoanOffer, LoanTerms};
use crate::request::{CalculationOutcome, CalculationRequest};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Raw CSV row of a loan offer; numbers stay text until validated
#[derive(Debug, Deserialize)]
struct OfferRow {
    #[serde(rename = "Label")]
    label: String,
    #[serde(rename = "Principal")]
    principal: String,
    #[serde(rename = "AnnualRate")]
    annual_rate: String,
    #[serde(rename = "TenureMonths")]
    tenure_months: String,
}

impl OfferRow {
    fn to_offer(self) -> Result<LoanOffer> {
        let terms = LoanTerms::new(
            parse_positive("Principal", &self.principal)?,
            parse_non_negative("AnnualRate", &self.annual_rate)?,
            parse_count("TenureMonths", &self.tenure_months)?,
        );
        Ok(LoanOffer { label: self.label, terms })
    }
}

/// Load loan offers from CSV with columns Label,Principal,AnnualRate,TenureMonths
pub fn load_loan_offers_from_reader<R: Read>(reader: R) -> Result<Vec<LoanOffer>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut offers = Vec::new();

    for (line, result) in csv_reader.deserialize().enumerate() {
        let row: OfferRow = result?;
        let offer = row.to_offer().map_err(|e| {
            CalcError::InvalidInput(format!("row {}: {}", line + 1, e))
        })?;
        offers.push(offer);
    }

    log::debug!("Loaded {} loan offers", offers.len());
    Ok(offers)
}

pub fn load_loan_offers<P: AsRef<Path>>(path: P) -> Result<Vec<LoanOffer>> {
    load_loan_offers_from_reader(File::open(path)?)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<CalculationRequest>),
    One(CalculationRequest),
}

/// Parse a JSON document holding one request or an array of them
pub fn parse_requests(json: &str) -> Result<Vec<CalculationRequest>> {
    let parsed: OneOrMany = serde_json::from_str(json)?;
    Ok(match parsed {
        OneOrMany::Many(requests) => requests,
        OneOrMany::One(request) => vec![request],
    })
}

pub fn load_requests<P: AsRef<Path>>(path: P) -> Result<Vec<CalculationRequest>> {
    let mut text = String::new();
    File::open(path)?.read_to_string(&mut text)?;
    parse_requests(&text)
}

/// Outcome of one request in a batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchItem {
    /// Position of the request in the input
    pub index: usize,
    pub calculator: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<CalculationOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchItem {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Evaluates requests against one set of defaults
#[derive(Debug, Clone, Default)]
pub struct BatchRunner {
    defaults: CalculatorDefaults,
}

impl BatchRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults(defaults: CalculatorDefaults) -> Self {
        Self { defaults }
    }

    /// Evaluate a single request
    pub fn run(&self, request: &CalculationRequest) -> Result<CalculationOutcome> {
        request.evaluate(&self.defaults)
    }

    /// Evaluate every request in parallel; failures are reported per item
    pub fn run_batch(&self, requests: &[CalculationRequest]) -> Vec<BatchItem> {
        let items: Vec<BatchItem> = requests
            .par_iter()
            .enumerate()
            .map(|(index, request)| match self.run(request) {
                Ok(outcome) => BatchItem {
                    index,
                    calculator: request.name().to_string(),
                    outcome: Some(outcome),
                    error: None,
                },
                Err(e) => BatchItem {
                    index,
                    calculator: request.name().to_string(),
                    outcome: None,
                    error: Some(e.to_string()),
                },
            })
            .collect();

        let failed = items.iter().filter(|i| !i.is_ok()).count();
        if failed > 0 {
            log::warn!("{} of {} requests produced no result", failed, items.len());
        }
        items
    }

    pub fn defaults(&self) -> &CalculatorDefaults {
        &self.defaults
    }

    pub fn defaults_mut(&mut self) -> &mut CalculatorDefaults {
        &mut self.defaults
    }
}
