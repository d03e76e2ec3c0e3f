//! Error types for loan simulation

use thiserror::Error;

/// Errors raised while building or advancing a loan simulation
#[derive(Debug, Error)]
pub enum LoanError {
    /// Balance after compounding grew past the loan's stop threshold.
    /// The payment does not cover interest accrual.
    #[error("balance {balance:.2} exceeded stop threshold {threshold:.2} in period {period}")]
    StopThresholdExceeded {
        balance: f64,
        threshold: f64,
        period: usize,
    },

    /// Payment exactly matches interest accrual, so the balance never moves
    #[error("balance stuck at {balance:.2} in period {period}: payment only covers interest")]
    NoProgress { balance: f64, period: usize },

    /// Shared budget cannot cover the sum of minimum payments
    #[error("payment budget {budget:.2} does not cover minimum payments of {required:.2}")]
    InsufficientBudget { budget: f64, required: f64 },

    /// A parameter was non-positive, non-finite, or otherwise unusable
    #[error("invalid input: {field} ({reason})")]
    InvalidInput { field: String, reason: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LoanError {
    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        LoanError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Whether a sweep should skip this point rather than abort
    pub fn is_skippable(&self) -> bool {
        matches!(
            self,
            LoanError::StopThresholdExceeded { .. }
                | LoanError::NoProgress { .. }
                | LoanError::InsufficientBudget { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, LoanError>;

/// Reject values that are not strictly positive and finite
pub(crate) fn require_positive(field: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(LoanError::invalid(field, format!("must be positive and finite, got {}", value)))
    }
}
