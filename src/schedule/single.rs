//! Single loan payoff simulation

use std::fmt;

use super::rows::{schedule_rows, ScheduleRow};
use crate::error::{require_positive, LoanError, Result};
use crate::format::money;
use crate::loan::LoanTerms;

/// One loan and its payment history
///
/// History is append-only between resets. `balances[0]` is the principal and
/// `payments[0]` is 0, so both sequences always have the same length and
/// `number_of_payments` excludes that opening entry.
#[derive(Debug, Clone)]
pub struct Loan {
    terms: LoanTerms,
    growth: f64,
    balances: Vec<f64>,
    payments: Vec<f64>,
}

impl Loan {
    /// Validate terms and open a fresh history
    pub fn new(terms: LoanTerms) -> Result<Self> {
        terms.validate()?;
        Ok(Self {
            growth: terms.growth_factor(),
            balances: vec![terms.principal],
            payments: vec![0.0],
            terms,
        })
    }

    pub fn terms(&self) -> &LoanTerms {
        &self.terms
    }

    pub fn principal(&self) -> f64 {
        self.terms.principal
    }

    pub fn rate(&self) -> f64 {
        self.terms.rate
    }

    /// Recurring payment, also the minimum when part of a basket
    pub fn payment(&self) -> f64 {
        self.terms.payment
    }

    /// Change the recurring payment; history is left alone
    pub fn set_payment(&mut self, amount: f64) -> Result<()> {
        require_positive("payment", amount)?;
        self.terms.payment = amount;
        Ok(())
    }

    /// Clear history back to the opening balance
    pub fn reset(&mut self) {
        self.balances.clear();
        self.balances.push(self.terms.principal);
        self.payments.clear();
        self.payments.push(0.0);
    }

    /// Current balance
    pub fn balance(&self) -> f64 {
        self.balances.last().copied().unwrap_or(self.terms.principal)
    }

    pub fn is_paid_off(&self) -> bool {
        self.balance() <= 0.0
    }

    pub fn balances(&self) -> &[f64] {
        &self.balances
    }

    pub fn payments(&self) -> &[f64] {
        &self.payments
    }

    pub fn total_paid(&self) -> f64 {
        self.payments.iter().sum()
    }

    pub fn number_of_payments(&self) -> usize {
        self.payments.len() - 1
    }

    /// Make one recurring payment
    pub fn pay_one(&mut self) -> Result<()> {
        self.pay_one_with(self.terms.payment)
    }

    /// Compound one period, then apply `amount`
    ///
    /// A payment larger than the compounded balance is recorded as exactly
    /// that balance and leaves the loan at 0. A paid-off loan is left as is.
    /// A payment that only covers the period's interest fails with
    /// `NoProgress`, since the balance would never move.
    pub fn pay_one_with(&mut self, amount: f64) -> Result<()> {
        if self.is_paid_off() {
            return Ok(());
        }
        require_positive("amount", amount)?;
        let compounded = self.accrue()?;
        if self.stalls(compounded, amount) {
            return Err(self.no_progress());
        }
        self.settle(compounded, amount);
        Ok(())
    }

    /// Make recurring payments until the balance reaches 0
    pub fn pay_remaining(&mut self) -> Result<()> {
        self.pay_remaining_with(self.terms.payment)
    }

    pub fn pay_remaining_with(&mut self, amount: f64) -> Result<()> {
        if self.is_paid_off() {
            return Ok(());
        }
        require_positive("amount", amount)?;
        while !self.is_paid_off() {
            self.pay_one_with(amount)?;
        }
        log::debug!(
            "loan of {} paid off in {} payments, total {}",
            money(self.terms.principal),
            self.number_of_payments(),
            money(self.total_paid()),
        );
        Ok(())
    }

    /// One row per period, including the opening balance
    pub fn schedule(&self) -> Vec<ScheduleRow> {
        schedule_rows(&self.balances, &self.payments)
    }

    /// Balance after one more period of compounding, checked against the stop threshold
    pub(crate) fn accrue(&self) -> Result<f64> {
        let compounded = self.balance() * self.growth;
        if compounded > self.terms.stop_threshold {
            return Err(LoanError::StopThresholdExceeded {
                balance: compounded,
                threshold: self.terms.stop_threshold,
                period: self.number_of_payments() + 1,
            });
        }
        Ok(compounded)
    }

    /// Whether settling `amount` would leave an open balance exactly where it is
    pub(crate) fn stalls(&self, compounded: f64, amount: f64) -> bool {
        let balance = self.balance();
        balance > 0.0 && compounded - amount == balance
    }

    pub(crate) fn no_progress(&self) -> LoanError {
        LoanError::NoProgress {
            balance: self.balance(),
            period: self.number_of_payments() + 1,
        }
    }

    /// Record a payment against an already compounded balance
    ///
    /// Paid-off loans inside a basket settle `(0, 0)` so that every loan's
    /// history keeps one entry per basket period.
    pub(crate) fn settle(&mut self, compounded: f64, amount: f64) {
        let (paid, remaining) = if compounded - amount > 0.0 {
            (amount, compounded - amount)
        } else {
            (compounded, 0.0)
        };
        self.payments.push(paid);
        self.balances.push(remaining);
    }
}

impl fmt::Display for Loan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Original principal: {}", money(self.terms.principal))?;
        writeln!(f, "Current balance: {}", money(self.balance()))?;
        writeln!(f, "Payment amount: {}", money(self.terms.payment))?;
        writeln!(f, "Total amount paid: {}", money(self.total_paid()))?;
        write!(f, "Number of payments: {}", self.number_of_payments())
    }
}
