//! Personal-finance calculators
//!
//! This library provides:
//! - Loan maths: EMI, tenure from EMI, EMI in advance, flat-rate EMI,
//!   amortization schedules and loan comparison
//! - Investment growth: SIP, step-up SIP, lumpsum, RD, FD and PPF
//! - Systematic plans: STP and SWP month-by-month simulation
//! - GST/VAT, simple and compound interest
//! - Serializable requests with parallel batch evaluation

pub mod error;
pub mod form;
pub mod config;
pub mod tvm;
pub mod rates;
pub mod summary;
pub mod loan;
pub mod invest;
pub mod interest;
pub mod tax;
pub mod request;
pub mod batch;
pub mod format;

// Re-export commonly used types
pub use error::{CalcError, Result};
pub use config::CalculatorDefaults;
pub use summary::Breakdown;
pub use tvm::Frequency;
pub use loan::{AmortizationSchedule, EmiResult, LoanTerms};
pub use request::{CalculationOutcome, CalculationRequest};
pub use batch::BatchRunner;
