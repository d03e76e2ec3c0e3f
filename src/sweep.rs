//! Payment sweeps: total cost of payoff across a range of payment amounts
//!
//! Each amount runs on its own clone of the template, so points are
//! independent and evaluated in parallel.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{require_positive, LoanError, Result};
use crate::format::money;
use crate::schedule::Payoff;

/// Largest number of amounts `payment_range` will generate
pub const MAX_SWEEP_POINTS: usize = 100_000;

/// Outcome for one payment amount that reached payoff
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepRow {
    pub amount: f64,
    /// Total paid until payoff
    pub total: f64,
    /// Change in `total` relative to the previous row; `None` on the first row
    pub pct_change: Option<f64>,
    pub n_payments: usize,
}

/// Rows in the order the amounts were given, skipped amounts omitted
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SweepResult {
    rows: Vec<SweepRow>,
}

impl SweepResult {
    fn from_points(points: Vec<(f64, f64, usize)>) -> Self {
        let mut rows: Vec<SweepRow> = Vec::with_capacity(points.len());
        for (amount, total, n_payments) in points {
            let pct_change = rows.last().map(|prev| (total - prev.total) / prev.total);
            rows.push(SweepRow { amount, total, pct_change, n_payments });
        }
        Self { rows }
    }

    pub fn rows(&self) -> &[SweepRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn amounts(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.amount).collect()
    }

    pub fn totals(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.total).collect()
    }

    pub fn n_payments(&self) -> Vec<usize> {
        self.rows.iter().map(|r| r.n_payments).collect()
    }

    pub fn pct_change(&self) -> Vec<Option<f64>> {
        self.rows.iter().map(|r| r.pct_change).collect()
    }
}

/// Replays a loan or basket to payoff once per payment amount
#[derive(Debug, Clone)]
pub struct SweepRunner<T> {
    template: T,
}

impl<T: Payoff + Send + Sync> SweepRunner<T> {
    pub fn new(template: T) -> Self {
        Self { template }
    }

    pub fn template(&self) -> &T {
        &self.template
    }

    /// Run every amount; amounts that diverge or cannot cover minimums are skipped
    ///
    /// Any other error (e.g. a non-positive amount) aborts the sweep.
    pub fn run(&self, amounts: &[f64]) -> Result<SweepResult> {
        let outcomes: Vec<Result<Option<(f64, f64, usize)>>> = amounts
            .par_iter()
            .map(|&amount| self.evaluate(amount))
            .collect();

        let mut points = Vec::with_capacity(outcomes.len());
        for outcome in outcomes {
            if let Some(point) = outcome? {
                points.push(point);
            }
        }

        let result = SweepResult::from_points(points);
        log::info!("sweep finished: {} of {} amounts reached payoff", result.len(), amounts.len());
        Ok(result)
    }

    fn evaluate(&self, amount: f64) -> Result<Option<(f64, f64, usize)>> {
        let mut sim = self.template.clone();
        sim.reset();

        match sim.set_payment(amount).and_then(|_| sim.pay_remaining()) {
            Ok(()) => Ok(Some((amount, sim.total_paid(), sim.number_of_payments()))),
            Err(err) if err.is_skippable() => {
                log::warn!("skipping payment amount {}: {}", money(amount), err);
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}

/// Sweep `template` over `amounts`
pub fn sweep<T: Payoff + Send + Sync>(template: &T, amounts: &[f64]) -> Result<SweepResult> {
    SweepRunner::new(template.clone()).run(amounts)
}

/// Amounts from `low` to `high` inclusive in steps of `step`
pub fn payment_range(low: f64, high: f64, step: f64) -> Result<Vec<f64>> {
    require_positive("low", low)?;
    require_positive("step", step)?;
    if !high.is_finite() || high < low {
        return Err(LoanError::invalid("high", format!("must be at least low ({})", low)));
    }
    let steps = ((high - low) / step + 1e-9).floor();
    if steps >= MAX_SWEEP_POINTS as f64 {
        return Err(LoanError::invalid(
            "step",
            format!("range would hold more than {} amounts", MAX_SWEEP_POINTS),
        ));
    }
    let count = steps as usize + 1;
    Ok((0..count).map(|i| low + step * i as f64).collect())
}
