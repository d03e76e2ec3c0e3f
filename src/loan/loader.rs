//! Load loan tables from CSV
//!
//! Required columns: `principal`, `rate`, `payment`.
//! Optional columns `compounding`, `period_fraction` and `stop` override the
//! config for that row.

use csv::Reader;
use std::path::Path;

use super::LoanTerms;
use crate::config::SimulationConfig;
use crate::error::{LoanError, Result};

/// Raw CSV row
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    principal: f64,
    rate: f64,
    payment: f64,
    #[serde(default)]
    compounding: Option<u32>,
    #[serde(default)]
    period_fraction: Option<f64>,
    #[serde(default)]
    stop: Option<f64>,
}

impl CsvRow {
    fn to_terms(self, config: &SimulationConfig) -> LoanTerms {
        let mut terms = LoanTerms::with_config(self.principal, self.rate, self.payment, config);
        if let Some(n) = self.compounding {
            terms.compounding_per_period = n;
        }
        if let Some(t) = self.period_fraction {
            terms.period_fraction = t;
        }
        if let Some(stop) = self.stop {
            terms.stop_threshold = stop;
        }
        terms
    }
}

/// Load all loans from a CSV file
pub fn load_loans<P: AsRef<Path>>(path: P, config: &SimulationConfig) -> Result<Vec<LoanTerms>> {
    let reader = Reader::from_path(path)?;
    collect_terms(reader, config)
}

/// Load loans from any reader (e.g., string buffer)
pub fn load_loans_from_reader<R: std::io::Read>(
    reader: R,
    config: &SimulationConfig,
) -> Result<Vec<LoanTerms>> {
    collect_terms(Reader::from_reader(reader), config)
}

fn collect_terms<R: std::io::Read>(
    mut reader: Reader<R>,
    config: &SimulationConfig,
) -> Result<Vec<LoanTerms>> {
    let mut loans = Vec::new();

    for (index, result) in reader.deserialize().enumerate() {
        let row: CsvRow = result?;
        let terms = row.to_terms(config);
        // Row 1 is the header
        terms.validate().map_err(|err| match err {
            LoanError::InvalidInput { field, reason } => LoanError::InvalidInput {
                field: format!("row {}: {}", index + 2, field),
                reason,
            },
            other => other,
        })?;
        loans.push(terms);
    }

    log::debug!("loaded {} loans", loans.len());
    Ok(loans)
}
