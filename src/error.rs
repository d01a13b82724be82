//! Error types for calculator input validation and solving

use thiserror::Error;

/// Result type alias for calculator operations
pub type Result<T> = std::result::Result<T, CalcError>;

/// Reasons a calculation produced no result.
///
/// Every variant renders as a message that can be shown next to the
/// offending form field.
#[derive(Error, Debug)]
pub enum CalcError {

    // =============================
    // Input Validation
    // =============================

    #[error("Please enter {field}")]
    Blank { field: &'static str },

    #[error("{field} must be a number, got '{value}'")]
    NotANumber { field: &'static str, value: String },

    #[error("{field} must be greater than zero")]
    NotPositive { field: &'static str },

    #[error("{field} cannot be negative")]
    Negative { field: &'static str },

    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: &'static str, min: f64, max: f64 },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // =============================
    // Solver Failures
    // =============================

    #[error("EMI {payment:.2} does not cover the first month's interest of {first_interest:.2}")]
    PaymentTooLow { payment: f64, first_interest: f64 },

    #[error("Solver did not converge after {iterations} iterations")]
    NoConvergence { iterations: u32 },

    // =============================
    // External Library Conversions
    // =============================

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CalcError {
    /// True for errors caused by what the user typed, as opposed to IO or solver failures
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            CalcError::Blank { .. }
                | CalcError::NotANumber { .. }
                | CalcError::NotPositive { .. }
                | CalcError::Negative { .. }
                | CalcError::OutOfRange { .. }
                | CalcError::InvalidInput(_)
                | CalcError::PaymentTooLow { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_field() {
        let err = CalcError::NotPositive { field: "Loan amount" };
        assert_eq!(err.to_string(), "Loan amount must be greater than zero");

        let err = CalcError::Blank { field: "Interest rate" };
        assert_eq!(err.to_string(), "Please enter Interest rate");
    }

    #[test]
    fn test_validation_classification() {
        assert!(CalcError::Negative { field: "Rate" }.is_validation());
        assert!(!CalcError::NoConvergence { iterations: 100 }.is_validation());
    }
}
