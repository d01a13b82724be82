//! Two-slice split shown as the donut chart beside every result

use serde::{Deserialize, Serialize};

/// Split of a total into the amount put in and the amount earned or paid on top
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Breakdown {
    /// Principal borrowed or amount invested
    pub base: f64,

    /// Interest paid, returns earned or tax charged
    pub extra: f64,

    /// `base` as a percentage of the total
    pub base_share_pct: f64,

    /// `extra` as a percentage of the total
    pub extra_share_pct: f64,
}

impl Breakdown {
    pub fn new(base: f64, extra: f64) -> Self {
        let total = base + extra;
        let (base_share_pct, extra_share_pct) = if total.abs() < 1e-12 {
            (0.0, 0.0)
        } else {
            (base / total * 100.0, extra / total * 100.0)
        };

        Self {
            base,
            extra,
            base_share_pct,
            extra_share_pct,
        }
    }

    pub fn total(&self) -> f64 {
        self.base + self.extra
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shares_sum_to_hundred() {
        let b = Breakdown::new(500_000.0, 137_411.0);
        assert!((b.base_share_pct + b.extra_share_pct - 100.0).abs() < 1e-9);
        assert!(b.base_share_pct > 78.0 && b.base_share_pct < 79.0);
    }

    #[test]
    fn test_empty_total() {
        let b = Breakdown::new(0.0, 0.0);
        assert_eq!(b.base_share_pct, 0.0);
        assert_eq!(b.total(), 0.0);
    }
}
