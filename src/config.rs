//! Calculator defaults and limits
//!
//! Defaults live in code, can be replaced wholesale from a JSON file, and
//! individual values can be overridden through environment variables:
//!   FINCALC_PPF_RATE, FINCALC_SOLVER_TOLERANCE, FINCALC_MAX_ITERATIONS

use crate::error::Result;
use crate::tvm::Frequency;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs::File;
use std::path::Path;

/// Current PPF rate (percent, compounded annually)
pub const DEFAULT_PPF_RATE: f64 = 7.1;

/// Standard GST slabs (percent)
pub const DEFAULT_GST_SLABS: [f64; 4] = [5.0, 12.0, 18.0, 28.0];

/// Defaults shared by every calculator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculatorDefaults {
    /// PPF interest rate used when a request does not give one
    pub ppf_rate: f64,

    /// Minimum PPF deposit per financial year
    pub ppf_min_deposit: f64,

    /// Maximum PPF deposit per financial year
    pub ppf_max_deposit: f64,

    /// PPF lock-in period in years
    pub ppf_min_years: u32,

    /// PPF accounts are extended in blocks of this many years
    pub ppf_extension_block: u32,

    /// Compounding used by recurring deposits unless overridden
    pub rd_compounding: Frequency,

    /// Compounding used by fixed deposits unless overridden
    pub fd_compounding: Frequency,

    /// GST slabs offered as presets
    pub gst_slabs: Vec<f64>,

    /// Convergence tolerance for iterative solvers
    pub solver_tolerance: f64,

    /// Iteration cap for iterative solvers
    pub max_iterations: u32,
}

impl Default for CalculatorDefaults {
    fn default() -> Self {
        Self {
            ppf_rate: DEFAULT_PPF_RATE,
            ppf_min_deposit: 500.0,
            ppf_max_deposit: 150_000.0,
            ppf_min_years: 15,
            ppf_extension_block: 5,
            rd_compounding: Frequency::Quarterly,
            fd_compounding: Frequency::Quarterly,
            gst_slabs: DEFAULT_GST_SLABS.to_vec(),
            solver_tolerance: 1e-9,
            max_iterations: 100,
        }
    }
}

impl CalculatorDefaults {
    /// Load defaults from a JSON file; missing keys keep their default values
    pub fn from_json_path(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let defaults: Self = serde_json::from_reader(file)?;
        log::debug!("Loaded calculator defaults from {}", path.display());
        Ok(defaults)
    }

    /// Apply FINCALC_* environment overrides
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(rate) = env::var("FINCALC_PPF_RATE").ok().and_then(|s| s.parse().ok()) {
            self.ppf_rate = rate;
        }
        if let Some(tol) = env::var("FINCALC_SOLVER_TOLERANCE").ok().and_then(|s| s.parse().ok()) {
            self.solver_tolerance = tol;
        }
        if let Some(cap) = env::var("FINCALC_MAX_ITERATIONS").ok().and_then(|s| s.parse().ok()) {
            self.max_iterations = cap;
        }
        self
    }

    /// Defaults from an optional file, then environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let base = match path {
            Some(p) => Self::from_json_path(p)?,
            None => Self::default(),
        };
        Ok(base.with_env_overrides())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let defaults: CalculatorDefaults =
            serde_json::from_str(r#"{"ppf_rate": 7.6, "rd_compounding": "monthly"}"#).unwrap();
        assert_eq!(defaults.ppf_rate, 7.6);
        assert_eq!(defaults.rd_compounding, Frequency::Monthly);
        assert_eq!(defaults.ppf_max_deposit, 150_000.0);
        assert_eq!(defaults.max_iterations, 100);
    }

    fn write_temp_json(name: &str, body: &str) -> std::path::PathBuf {
        let path = env::temp_dir().join(format!("fincalc-{}-{}.json", name, std::process::id()));
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_from_json_path() {
        let path = write_temp_json("defaults", r#"{"ppf_min_years": 20, "gst_slabs": [5, 18]}"#);
        let defaults = CalculatorDefaults::from_json_path(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(defaults.ppf_min_years, 20);
        assert_eq!(defaults.gst_slabs, vec![5.0, 18.0]);
        assert_eq!(defaults.ppf_rate, DEFAULT_PPF_RATE);
    }

    #[test]
    fn test_missing_or_malformed_file() {
        let missing = env::temp_dir().join("fincalc-does-not-exist.json");
        assert!(matches!(
            CalculatorDefaults::from_json_path(&missing),
            Err(crate::error::CalcError::Io(_))
        ));

        let path = write_temp_json("malformed", "{ not json");
        let result = CalculatorDefaults::from_json_path(&path);
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(result, Err(crate::error::CalcError::Json(_))));
    }

    #[test]
    fn test_env_overrides() {
        // Only this test touches FINCALC_* variables
        env::set_var("FINCALC_MAX_ITERATIONS", "7");
        env::set_var("FINCALC_PPF_RATE", "not-a-rate");
        let overridden = CalculatorDefaults::default().with_env_overrides();
        let loaded = CalculatorDefaults::load(None).unwrap();
        env::remove_var("FINCALC_MAX_ITERATIONS");
        env::remove_var("FINCALC_PPF_RATE");

        assert_eq!(overridden.max_iterations, 7);
        assert_eq!(overridden.ppf_rate, DEFAULT_PPF_RATE);
        assert_eq!(loaded.max_iterations, 7);
        assert_eq!(CalculatorDefaults::default().with_env_overrides().max_iterations, 100);
    }

    #[test]
    fn test_default_slabs() {
        let defaults = CalculatorDefaults::default();
        assert_eq!(defaults.gst_slabs, vec![5.0, 12.0, 18.0, 28.0]);
    }
}
