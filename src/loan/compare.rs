//! Side-by-side comparison of loan offers

use super::emi::{calculate_emi, EmiResult, LoanTerms};
use crate::error::{CalcError, Result};
use serde::{Deserialize, Serialize};

/// One loan offer to compare
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanOffer {
    pub label: String,
    #[serde(flatten)]
    pub terms: LoanTerms,
}

/// EMI figures for one offer, relative to the cheapest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparedLoan {
    pub label: String,
    pub result: EmiResult,

    /// Extra total payment over the cheapest offer
    pub extra_cost: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanComparison {
    /// Offers in input order
    pub loans: Vec<ComparedLoan>,

    /// Index into `loans` of the offer with the lowest total payment
    pub cheapest: usize,
}

impl LoanComparison {
    pub fn cheapest_loan(&self) -> &ComparedLoan {
        &self.loans[self.cheapest]
    }

    /// Interest saved by choosing the cheapest offer over the most expensive one
    pub fn max_interest_saving(&self) -> f64 {
        let cheapest = self.cheapest_loan().result.total_interest;
        self.loans
            .iter()
            .map(|l| l.result.total_interest - cheapest)
            .fold(0.0, f64::max)
    }
}

/// Compare two or more offers by total amount repaid
pub fn compare_loans(offers: &[LoanOffer]) -> Result<LoanComparison> {
    if offers.len() < 2 {
        return Err(CalcError::InvalidInput(
            "At least two loans are needed for a comparison".to_string(),
        ));
    }

    let results = offers
        .iter()
        .map(|offer| calculate_emi(offer.terms).map(|result| (offer.label.clone(), result)))
        .collect::<Result<Vec<_>>>()?;

    let cheapest = results
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.1.total_payment.total_cmp(&b.1.total_payment))
        .map(|(i, _)| i)
        .unwrap_or(0);

    let lowest = results[cheapest].1.total_payment;
    let loans = results
        .into_iter()
        .map(|(label, result)| ComparedLoan {
            label,
            extra_cost: result.total_payment - lowest,
            result,
        })
        .collect();

    Ok(LoanComparison { loans, cheapest })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offer(label: &str, principal: f64, rate: f64, months: u32) -> LoanOffer {
        LoanOffer {
            label: label.to_string(),
            terms: LoanTerms::new(principal, rate, months),
        }
    }

    #[test]
    fn test_lower_rate_wins() {
        let comparison = compare_loans(&[
            offer("Bank A", 1_000_000.0, 9.5, 120),
            offer("Bank B", 1_000_000.0, 8.75, 120),
        ])
        .unwrap();

        assert_eq!(comparison.cheapest, 1);
        assert_eq!(comparison.cheapest_loan().label, "Bank B");
        assert_eq!(comparison.loans[1].extra_cost, 0.0);
        assert!(comparison.loans[0].extra_cost > 0.0);
        assert!(comparison.max_interest_saving() > 0.0);
    }

    #[test]
    fn test_shorter_tenure_costs_less_interest() {
        let comparison = compare_loans(&[
            offer("20 years", 2_000_000.0, 8.5, 240),
            offer("15 years", 2_000_000.0, 8.5, 180),
            offer("25 years", 2_000_000.0, 8.5, 300),
        ])
        .unwrap();
        assert_eq!(comparison.cheapest_loan().label, "15 years");
    }

    #[test]
    fn test_needs_two_offers() {
        assert!(compare_loans(&[offer("Only", 1000.0, 10.0, 12)]).is_err());
    }

    #[test]
    fn test_invalid_offer_fails_comparison() {
        assert!(compare_loans(&[offer("A", 1000.0, 10.0, 12), offer("B", -5.0, 10.0, 12)]).is_err());
    }
}
