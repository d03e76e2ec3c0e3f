//! Simulation defaults shared by the loader and the CLI

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;

/// Daily compounding
pub const DEFAULT_COMPOUNDING_PER_PERIOD: u32 = 365;

/// Monthly payments against an annual rate
pub const DEFAULT_PERIOD_FRACTION: f64 = 1.0 / 12.0;

/// Balance ceiling used to detect payments that never amortize
pub const DEFAULT_STOP_THRESHOLD: f64 = 1_000_000.0;

fn default_compounding_per_period() -> u32 {
    DEFAULT_COMPOUNDING_PER_PERIOD
}

fn default_period_fraction() -> f64 {
    DEFAULT_PERIOD_FRACTION
}

fn default_stop_threshold() -> f64 {
    DEFAULT_STOP_THRESHOLD
}

/// Compounding and divergence settings applied to newly built loans
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Number of times interest compounds within the rate's base period
    #[serde(default = "default_compounding_per_period")]
    pub compounding_per_period: u32,

    /// Fraction of the rate's base period covered by one payment
    #[serde(default = "default_period_fraction")]
    pub period_fraction: f64,

    /// Abort once a post-compounding balance exceeds this
    #[serde(default = "default_stop_threshold")]
    pub stop_threshold: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            compounding_per_period: DEFAULT_COMPOUNDING_PER_PERIOD,
            period_fraction: DEFAULT_PERIOD_FRACTION,
            stop_threshold: DEFAULT_STOP_THRESHOLD,
        }
    }
}

impl SimulationConfig {
    /// Load a config from a JSON file; absent fields take their defaults
    pub fn from_json_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}
