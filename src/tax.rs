//! GST and VAT: add tax to a net amount or pull it out of a gross amount

use crate::config::CalculatorDefaults;
use crate::error::Result;
use crate::form::{require_non_negative, require_positive};
use crate::summary::Breakdown;
use serde::{Deserialize, Serialize};

/// Whether the entered amount excludes or includes tax
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaxDirection {
    /// Amount is net; tax is added on top
    #[default]
    Add,
    /// Amount is gross; tax is removed from it
    Remove,
}

/// How the tax is reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaxKind {
    /// GST within a state: split equally into CGST and SGST
    #[default]
    IntraStateGst,
    /// GST across states: charged entirely as IGST
    InterStateGst,
    /// VAT: a single tax with no split
    Vat,
}

/// Components of the tax amount
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct TaxSplit {
    pub cgst: f64,
    pub sgst: f64,
    pub igst: f64,
    pub vat: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GstResult {
    pub rate: f64,
    pub direction: TaxDirection,
    pub kind: TaxKind,
    pub net_amount: f64,
    pub tax_amount: f64,
    pub gross_amount: f64,
    pub split: TaxSplit,

    /// Whether a GST rate is one of the configured slabs; None for VAT
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub standard_slab: Option<bool>,
}

impl GstResult {
    /// Net amount vs tax
    pub fn breakdown(&self) -> Breakdown {
        Breakdown::new(self.net_amount, self.tax_amount)
    }
}

/// GST slabs offered as presets
pub fn standard_slabs(defaults: &CalculatorDefaults) -> &[f64] {
    &defaults.gst_slabs
}

pub fn is_standard_slab(rate: f64, slabs: &[f64]) -> bool {
    slabs.iter().any(|&slab| (slab - rate).abs() < 1e-9)
}

/// Apply GST/VAT at `rate` percent
///
/// Add: tax = amount·r/100. Remove: net = amount·100/(100 + r). GST rates
/// outside `slabs` are still applied but flagged.
pub fn calculate_gst(
    amount: f64,
    rate: f64,
    direction: TaxDirection,
    kind: TaxKind,
    slabs: &[f64],
) -> Result<GstResult> {
    let amount = require_positive("Amount", amount)?;
    let rate = require_non_negative("GST rate", rate)?;

    let standard_slab = match kind {
        TaxKind::Vat => None,
        TaxKind::IntraStateGst | TaxKind::InterStateGst => {
            let on_slab = is_standard_slab(rate, slabs);
            if !on_slab {
                log::warn!("GST rate {}% is not one of the standard slabs {:?}", rate, slabs);
            }
            Some(on_slab)
        }
    };

    let (net_amount, tax_amount, gross_amount) = match direction {
        TaxDirection::Add => {
            let tax = amount * rate / 100.0;
            (amount, tax, amount + tax)
        }
        TaxDirection::Remove => {
            let net = amount * 100.0 / (100.0 + rate);
            (net, amount - net, amount)
        }
    };

    let split = match kind {
        TaxKind::IntraStateGst => TaxSplit {
            cgst: tax_amount / 2.0,
            sgst: tax_amount / 2.0,
            ..TaxSplit::default()
        },
        TaxKind::InterStateGst => TaxSplit {
            igst: tax_amount,
            ..TaxSplit::default()
        },
        TaxKind::Vat => TaxSplit {
            vat: tax_amount,
            ..TaxSplit::default()
        },
    };

    Ok(GstResult {
        rate,
        direction,
        kind,
        net_amount,
        tax_amount,
        gross_amount,
        split,
        standard_slab,
    })
}
