//! Tabular projections of simulation history

use serde::{Deserialize, Serialize};

/// One period of a single loan's (or a basket's aggregate) schedule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRow {
    /// Period index; 0 is the opening balance before any payment
    pub period: usize,
    /// Balance after compounding and payment
    pub balance: f64,
    /// Payment applied this period
    pub payment: f64,
}

/// One period of one loan inside a basket
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BasketRow {
    pub period: usize,
    /// Position of the loan in the basket
    pub loan: usize,
    pub balance: f64,
    pub payment: f64,
}

/// Zip parallel balance/payment sequences into rows
pub(crate) fn schedule_rows(balances: &[f64], payments: &[f64]) -> Vec<ScheduleRow> {
    balances
        .iter()
        .zip(payments)
        .enumerate()
        .map(|(period, (&balance, &payment))| ScheduleRow { period, balance, payment })
        .collect()
}
