//! Form field parsing and validation
//!
//! Raw text from an input box becomes a checked number here. Blank and
//! non-numeric text, and values outside the allowed sign, are rejected with
//! a `CalcError` naming the field.

use crate::error::{CalcError, Result};

/// Longest tenure any calculator accepts, in months (100 years)
pub const MAX_MONTHS: u32 = 1200;

/// Longest tenure any calculator accepts, in years
pub const MAX_YEARS: u32 = 100;

/// Parse a free-text amount such as `"5,00,000"`, `"₹ 1200.50"` or `"10_000"`
pub fn parse_number(field: &'static str, raw: &str) -> Result<f64> {
    let cleaned: String = raw
        .trim()
        .trim_start_matches('₹')
        .trim_start_matches('$')
        .chars()
        .filter(|c| !matches!(c, ',' | '_' | ' '))
        .collect();

    if cleaned.is_empty() {
        return Err(CalcError::Blank { field });
    }

    let value: f64 = cleaned.parse().map_err(|_| CalcError::NotANumber {
        field,
        value: raw.trim().to_string(),
    })?;

    if !value.is_finite() {
        return Err(CalcError::NotANumber {
            field,
            value: raw.trim().to_string(),
        });
    }

    Ok(value)
}

/// Parse a value that must be strictly positive (amounts, tenures)
pub fn parse_positive(field: &'static str, raw: &str) -> Result<f64> {
    let value = parse_number(field, raw)?;
    require_positive(field, value)
}

/// Parse a value that may be zero but not negative (rates)
pub fn parse_non_negative(field: &'static str, raw: &str) -> Result<f64> {
    let value = parse_number(field, raw)?;
    require_non_negative(field, value)
}

/// Parse a whole number of months or years
pub fn parse_count(field: &'static str, raw: &str) -> Result<u32> {
    let value = parse_positive(field, raw)?;
    if value.fract() != 0.0 || value > u32::MAX as f64 {
        return Err(CalcError::InvalidInput(format!(
            "{} must be a whole number, got {}",
            field, value
        )));
    }
    Ok(value as u32)
}

pub fn require_positive(field: &'static str, value: f64) -> Result<f64> {
    if !value.is_finite() {
        return Err(CalcError::NotANumber { field, value: value.to_string() });
    }
    if value <= 0.0 {
        return Err(CalcError::NotPositive { field });
    }
    Ok(value)
}

pub fn require_non_negative(field: &'static str, value: f64) -> Result<f64> {
    if !value.is_finite() {
        return Err(CalcError::NotANumber { field, value: value.to_string() });
    }
    if value < 0.0 {
        return Err(CalcError::Negative { field });
    }
    Ok(value)
}

pub fn require_count(field: &'static str, value: u32) -> Result<u32> {
    if value == 0 {
        return Err(CalcError::NotPositive { field });
    }
    Ok(value)
}

/// A tenure in months, between 1 and `MAX_MONTHS`
pub fn require_months(field: &'static str, value: u32) -> Result<u32> {
    let value = require_count(field, value)?;
    if value > MAX_MONTHS {
        return Err(CalcError::OutOfRange { field, min: 1.0, max: MAX_MONTHS as f64 });
    }
    Ok(value)
}

/// A tenure in whole years, between 1 and `MAX_YEARS`
pub fn require_years(field: &'static str, value: u32) -> Result<u32> {
    let value = require_count(field, value)?;
    if value > MAX_YEARS {
        return Err(CalcError::OutOfRange { field, min: 1.0, max: MAX_YEARS as f64 });
    }
    Ok(value)
}

/// Checked tenure in years converted to months
pub fn years_to_months(field: &'static str, years: u32) -> Result<u32> {
    let years = require_years(field, years)?;
    years
        .checked_mul(12)
        .ok_or(CalcError::OutOfRange { field, min: 1.0, max: MAX_YEARS as f64 })
}

pub fn require_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<f64> {
    if !(min..=max).contains(&value) {
        return Err(CalcError::OutOfRange { field, min, max });
    }
    Ok(value)
}

/// clap value parser for amounts typed on the command line
pub fn amount_arg(raw: &str) -> Result<f64> {
    parse_positive("amount", raw)
}

/// clap value parser for percentage rates typed on the command line
pub fn rate_arg(raw: &str) -> Result<f64> {
    parse_non_negative("rate", raw.trim_end_matches('%'))
}
