//! Loan payoff simulation
//!
//! This library provides:
//! - Period-by-period amortization of a single compounding loan
//! - Avalanche allocation of a shared budget across a basket of loans
//! - Payment sweeps comparing total cost across payment amounts
//! - CSV loading of loan tables

pub mod config;
pub mod error;
pub mod format;
pub mod loan;
pub mod schedule;
pub mod sweep;

// Re-export commonly used types
pub use config::SimulationConfig;
pub use error::{LoanError, Result};
pub use loan::LoanTerms;
pub use schedule::{Loan, MultiLoan, Payoff, ScheduleRow, BasketRow};
pub use sweep::{SweepResult, SweepRow, SweepRunner};
