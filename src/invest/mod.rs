//! Investment calculators: SIP, deposits and systematic plans

mod sip;
mod deposits;
mod systematic;

pub use sip::{calculate_lumpsum, calculate_sip, calculate_step_up_sip, SipResult, StepUp, StepUpSipResult, StepUpYear};
pub use deposits::{calculate_fd, calculate_ppf, calculate_rd, DepositResult, PpfResult, PpfYear};
pub use systematic::{calculate_stp, calculate_swp, StpMonth, StpResult, SwpMonth, SwpResult};
