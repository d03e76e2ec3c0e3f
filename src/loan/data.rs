//! Loan parameter records

use serde::{Deserialize, Serialize};

use crate::config::SimulationConfig;
use crate::error::{require_positive, LoanError, Result};

/// Fixed parameters of one loan
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    /// Initial balance
    pub principal: f64,

    /// Nominal interest rate for the rate's base period, as a decimal
    pub rate: f64,

    /// Recurring (minimum) payment per period
    pub payment: f64,

    /// Times interest compounds within the rate's base period
    pub compounding_per_period: u32,

    /// Fraction of the rate's base period covered by one payment
    pub period_fraction: f64,

    /// Balance ceiling above which the simulation aborts
    pub stop_threshold: f64,
}

impl LoanTerms {
    /// Terms with daily compounding, monthly payments and the default stop threshold
    pub fn new(principal: f64, rate: f64, payment: f64) -> Self {
        Self::with_config(principal, rate, payment, &SimulationConfig::default())
    }

    pub fn with_config(principal: f64, rate: f64, payment: f64, config: &SimulationConfig) -> Self {
        Self {
            principal,
            rate,
            payment,
            compounding_per_period: config.compounding_per_period,
            period_fraction: config.period_fraction,
            stop_threshold: config.stop_threshold,
        }
    }

    pub fn compounding(mut self, compounding_per_period: u32, period_fraction: f64) -> Self {
        self.compounding_per_period = compounding_per_period;
        self.period_fraction = period_fraction;
        self
    }

    pub fn stop_threshold(mut self, stop_threshold: f64) -> Self {
        self.stop_threshold = stop_threshold;
        self
    }

    /// Check every parameter is usable
    pub fn validate(&self) -> Result<()> {
        require_positive("principal", self.principal)?;
        require_positive("rate", self.rate)?;
        require_positive("payment", self.payment)?;
        require_positive("period_fraction", self.period_fraction)?;
        require_positive("stop_threshold", self.stop_threshold)?;
        if self.compounding_per_period == 0 {
            return Err(LoanError::invalid("compounding_per_period", "must be at least 1"));
        }
        Ok(())
    }

    /// Multiplier applied to a balance over one payment period
    ///
    /// A = P (1 + r/n)^(n t)
    pub fn growth_factor(&self) -> f64 {
        let n = self.compounding_per_period as f64;
        (1.0 + self.rate / n).powf(n * self.period_fraction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_defaults() {
        let terms = LoanTerms::new(10_000.0, 0.05, 200.0);

        assert_eq!(terms.compounding_per_period, 365);
        assert_relative_eq!(terms.period_fraction, 1.0 / 12.0);
        assert_eq!(terms.stop_threshold, 1_000_000.0);
        assert!(terms.validate().is_ok());
    }

    #[test]
    fn test_growth_factor_daily_monthly() {
        let terms = LoanTerms::new(10_000.0, 0.05, 200.0);
        // (1 + .05/365)^(365/12)
        assert_relative_eq!(terms.growth_factor(), 1.004175073, epsilon = 1e-8);
    }

    #[test]
    fn test_growth_factor_annual_single_compound() {
        let terms = LoanTerms::new(1_000.0, 0.10, 50.0).compounding(1, 1.0);
        assert_relative_eq!(terms.growth_factor(), 1.10);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        assert!(LoanTerms::new(0.0, 0.05, 200.0).validate().is_err());
        assert!(LoanTerms::new(10_000.0, -0.05, 200.0).validate().is_err());
        assert!(LoanTerms::new(10_000.0, 0.05, 0.0).validate().is_err());
        assert!(LoanTerms::new(10_000.0, 0.05, 200.0).compounding(0, 1.0).validate().is_err());
        assert!(LoanTerms::new(10_000.0, 0.05, 200.0).compounding(12, 0.0).validate().is_err());
        assert!(LoanTerms::new(10_000.0, 0.05, 200.0).stop_threshold(-1.0).validate().is_err());
    }
}
