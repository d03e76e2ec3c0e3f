//! Several loans paid from one shared budget

use std::fmt;

use super::allocator::{allocate_avalanche, Obligation};
use super::rows::{schedule_rows, BasketRow, ScheduleRow};
use super::single::Loan;
use crate::error::{require_positive, LoanError, Result};
use crate::format::money;
use crate::loan::LoanTerms;

/// A basket of loans paid off with the avalanche policy
///
/// Every loan keeps one history entry per basket period, including periods
/// after it is paid off (balance 0, payment 0), so the per-loan histories form
/// a rectangular [loan x period] matrix.
#[derive(Debug, Clone)]
pub struct MultiLoan {
    loans: Vec<Loan>,
    payment: f64,
}

impl MultiLoan {
    /// Build a basket; fails if `payment` cannot cover every minimum
    pub fn new(mut loans: Vec<Loan>, payment: f64) -> Result<Self> {
        if loans.is_empty() {
            return Err(LoanError::invalid("loans", "basket needs at least one loan"));
        }
        check_budget(&loans, payment)?;
        for loan in &mut loans {
            loan.reset();
        }
        Ok(Self { loans, payment })
    }

    /// Build a basket straight from loan parameters
    pub fn from_terms(terms: &[LoanTerms], payment: f64) -> Result<Self> {
        let loans = terms.iter().copied().map(Loan::new).collect::<Result<Vec<_>>>()?;
        Self::new(loans, payment)
    }

    pub fn loans(&self) -> &[Loan] {
        &self.loans
    }

    /// Shared budget per period
    pub fn payment(&self) -> f64 {
        self.payment
    }

    /// Sum of the loans' minimum payments
    pub fn minimum_payment(&self) -> f64 {
        self.loans.iter().map(Loan::payment).sum()
    }

    /// Change the shared budget; history is left alone
    pub fn set_payment(&mut self, payment: f64) -> Result<()> {
        check_budget(&self.loans, payment)?;
        self.payment = payment;
        Ok(())
    }

    pub fn reset(&mut self) {
        for loan in &mut self.loans {
            loan.reset();
        }
    }

    /// Current aggregate balance
    pub fn balance(&self) -> f64 {
        self.loans.iter().map(Loan::balance).sum()
    }

    pub fn is_paid_off(&self) -> bool {
        self.loans.iter().all(Loan::is_paid_off)
    }

    /// Periods elapsed
    pub fn number_of_payments(&self) -> usize {
        self.loans[0].number_of_payments()
    }

    pub fn total_paid(&self) -> f64 {
        self.loans.iter().map(Loan::total_paid).sum()
    }

    /// Balances indexed by loan, then period
    pub fn balance_matrix(&self) -> Vec<&[f64]> {
        self.loans.iter().map(Loan::balances).collect()
    }

    /// Payments indexed by loan, then period
    pub fn payment_matrix(&self) -> Vec<&[f64]> {
        self.loans.iter().map(Loan::payments).collect()
    }

    /// Sum of all loans' balances per period
    pub fn total_balances(&self) -> Vec<f64> {
        column_sums(self.loans.iter().map(Loan::balances))
    }

    /// Sum of all loans' payments per period
    pub fn total_payments(&self) -> Vec<f64> {
        column_sums(self.loans.iter().map(Loan::payments))
    }

    /// Advance every loan by one period
    ///
    /// All loans compound first. If any exceeds its stop threshold the whole
    /// period is abandoned and nothing is recorded. A period that would leave
    /// every open balance unchanged fails with `NoProgress`.
    pub fn pay_one(&mut self) -> Result<()> {
        if self.is_paid_off() {
            return Ok(());
        }

        let obligations = self
            .loans
            .iter()
            .map(|loan| -> Result<Obligation> {
                Ok(Obligation {
                    balance: loan.accrue()?,
                    minimum: loan.payment(),
                    rate: loan.rate(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let allocation = allocate_avalanche(&obligations, self.payment);

        // Allocation depends only on balances, so an unchanged basket repeats forever
        let stalled = self
            .loans
            .iter()
            .zip(&obligations)
            .zip(&allocation)
            .all(|((loan, obligation), &amount)| {
                loan.is_paid_off() || loan.stalls(obligation.balance, amount)
            });
        if stalled {
            let period = self.number_of_payments() + 1;
            return Err(LoanError::NoProgress { balance: self.balance(), period });
        }

        for ((loan, obligation), amount) in self.loans.iter_mut().zip(&obligations).zip(allocation) {
            loan.settle(obligation.balance, amount);
        }
        Ok(())
    }

    /// Advance until every loan is paid off
    pub fn pay_remaining(&mut self) -> Result<()> {
        while !self.is_paid_off() {
            self.pay_one()?;
        }
        log::debug!(
            "basket of {} loans paid off in {} periods, total {}",
            self.loans.len(),
            self.number_of_payments(),
            money(self.total_paid()),
        );
        Ok(())
    }

    /// One row per loan per period
    pub fn schedule(&self) -> Vec<BasketRow> {
        self.loans
            .iter()
            .enumerate()
            .flat_map(|(index, loan)| {
                loan.schedule().into_iter().map(move |row| BasketRow {
                    period: row.period,
                    loan: index,
                    balance: row.balance,
                    payment: row.payment,
                })
            })
            .collect()
    }

    /// Aggregate balance and payment per period
    pub fn totals(&self) -> Vec<ScheduleRow> {
        schedule_rows(&self.total_balances(), &self.total_payments())
    }
}

fn check_budget(loans: &[Loan], payment: f64) -> Result<()> {
    require_positive("payment", payment)?;
    let required: f64 = loans.iter().map(Loan::payment).sum();
    if payment < required {
        return Err(LoanError::InsufficientBudget { budget: payment, required });
    }
    Ok(())
}

fn column_sums<'a>(rows: impl Iterator<Item = &'a [f64]>) -> Vec<f64> {
    let mut sums: Vec<f64> = Vec::new();
    for row in rows {
        if sums.len() < row.len() {
            sums.resize(row.len(), 0.0);
        }
        for (sum, value) in sums.iter_mut().zip(row) {
            *sum += value;
        }
    }
    sums
}

impl fmt::Display for MultiLoan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let principal: f64 = self.loans.iter().map(Loan::principal).sum();
        writeln!(f, "Loans: {}", self.loans.len())?;
        writeln!(f, "Original principal: {}", money(principal))?;
        writeln!(f, "Current balance: {}", money(self.balance()))?;
        writeln!(f, "Payment amount: {}", money(self.payment))?;
        writeln!(f, "Total amount paid: {}", money(self.total_paid()))?;
        write!(f, "Number of payments: {}", self.number_of_payments())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn test_terms() -> Vec<LoanTerms> {
        vec![
            LoanTerms::new(1_000.0, 0.05, 50.0),
            LoanTerms::new(2_000.0, 0.03, 50.0),
            LoanTerms::new(3_000.0, 0.04, 70.0),
        ]
    }

    fn test_basket(payment: f64) -> MultiLoan {
        MultiLoan::from_terms(&test_terms(), payment).unwrap()
    }

    #[test]
    fn test_insufficient_budget() {
        let err = MultiLoan::from_terms(&test_terms(), 100.0).unwrap_err();

        match err {
            LoanError::InsufficientBudget { budget, required } => {
                assert_eq!(budget, 100.0);
                assert_eq!(required, 170.0);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_exact_minimum_budget_accepted() {
        assert!(MultiLoan::from_terms(&test_terms(), 170.0).is_ok());
    }

    #[test]
    fn test_empty_basket_rejected() {
        assert!(matches!(
            MultiLoan::new(Vec::new(), 500.0),
            Err(LoanError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_avalanche_targets_highest_rate_first() {
        let mut basket = test_basket(500.0);
        for _ in 0..2 {
            basket.pay_one().unwrap();
        }
        let payments = basket.payment_matrix();

        for period in 1..=2 {
            assert_eq!(payments[0][period], 380.0);
            assert_eq!(payments[1][period], 50.0);
            assert_eq!(payments[2][period], 70.0);
        }
    }

    #[test]
    fn test_remainder_redirects_after_payoff() {
        let mut basket = test_basket(500.0);
        while !basket.loans()[0].is_paid_off() {
            basket.pay_one().unwrap();
        }
        let payoff_period = basket.number_of_payments();
        basket.pay_one().unwrap();
        let payments = basket.payment_matrix();

        // 1000 at 380/period clears in the third period
        assert_eq!(payoff_period, 3);
        assert_eq!(payments[0][payoff_period + 1], 0.0);
        assert_eq!(payments[1][payoff_period + 1], 50.0);
        assert_abs_diff_eq!(payments[2][payoff_period + 1], 450.0, epsilon = 1e-9);
    }

    #[test]
    fn test_payoff_period_spills_into_next_rate() {
        let mut basket = test_basket(500.0);
        for _ in 0..3 {
            basket.pay_one().unwrap();
        }
        let payments = basket.payment_matrix();

        // Third period: the 0.05 loan needs less than 380, the rest goes to 0.04
        assert!(payments[0][3] < 380.0);
        assert_abs_diff_eq!(
            payments[0][3] + payments[1][3] + payments[2][3],
            500.0,
            epsilon = 1e-9
        );
        assert!(payments[2][3] > 70.0);
        assert_eq!(payments[1][3], 50.0);
    }

    #[test]
    fn test_pay_remaining_clears_all_loans() {
        let mut basket = test_basket(500.0);
        basket.pay_remaining().unwrap();

        assert!(basket.is_paid_off());
        assert_eq!(basket.balance(), 0.0);
        for loan in basket.loans() {
            assert_eq!(loan.balance(), 0.0);
            assert_eq!(loan.balances().len(), basket.number_of_payments() + 1);
            assert_eq!(loan.balances().len(), loan.payments().len());
        }
    }

    #[test]
    fn test_budget_never_exceeded() {
        let mut basket = test_basket(500.0);
        basket.pay_remaining().unwrap();

        for total in basket.total_payments() {
            assert!(total <= 500.0 + 1e-9);
        }
    }

    #[test]
    fn test_totals_are_column_sums() {
        let mut basket = test_basket(500.0);
        basket.pay_remaining().unwrap();

        let balances = basket.total_balances();
        let payments = basket.total_payments();
        assert_eq!(balances.len(), basket.number_of_payments() + 1);
        assert_eq!(balances[0], 6_000.0);
        assert_eq!(payments[0], 0.0);
        assert_eq!(*balances.last().unwrap(), 0.0);
        assert_abs_diff_eq!(payments.iter().sum::<f64>(), basket.total_paid(), epsilon = 1e-6);

        let matrix = basket.balance_matrix();
        let period = 4;
        assert_abs_diff_eq!(
            balances[period],
            matrix.iter().map(|row| row[period]).sum::<f64>(),
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_pay_one_after_payoff_is_noop() {
        let mut basket = test_basket(500.0);
        basket.pay_remaining().unwrap();
        let periods = basket.number_of_payments();

        basket.pay_one().unwrap();
        assert_eq!(basket.number_of_payments(), periods);
    }

    #[test]
    fn test_stop_threshold_aborts_whole_period() {
        let terms = vec![
            LoanTerms::new(1_000.0, 0.05, 50.0),
            LoanTerms::new(2_000.0, 0.03, 50.0).stop_threshold(2_001.0),
        ];
        let mut basket = MultiLoan::from_terms(&terms, 100.0).unwrap();
        let err = basket.pay_one().unwrap_err();

        assert!(matches!(err, LoanError::StopThresholdExceeded { .. }));
        assert_eq!(basket.number_of_payments(), 0);
        for loan in basket.loans() {
            assert_eq!(loan.balances().len(), 1);
        }
    }

    #[test]
    fn test_interest_only_budget_reports_no_progress() {
        let terms = [LoanTerms::new(1000.0, 0.10, 100.0).compounding(1, 1.0)];
        let mut basket = MultiLoan::from_terms(&terms, 100.0).unwrap();

        let err = basket.pay_remaining().unwrap_err();
        assert!(matches!(err, LoanError::NoProgress { period: 1, .. }));
        assert_eq!(basket.number_of_payments(), 0);
    }

    #[test]
    fn test_one_stalled_loan_does_not_stop_basket() {
        // The 0.10 loan only gets interest until the 0.20 loan is cleared
        let terms = [
            LoanTerms::new(1000.0, 0.10, 100.0).compounding(1, 1.0),
            LoanTerms::new(100.0, 0.20, 10.0).compounding(1, 1.0),
        ];
        let mut basket = MultiLoan::from_terms(&terms, 150.0).unwrap();
        basket.pay_remaining().unwrap();

        assert!(basket.is_paid_off());
        assert_eq!(basket.payment_matrix()[0][1], 100.0);
        assert_eq!(basket.balance_matrix()[0][1], 1000.0);
    }

    #[test]
    fn test_set_payment_validates() {
        let mut basket = test_basket(500.0);

        assert!(matches!(basket.set_payment(169.0), Err(LoanError::InsufficientBudget { .. })));
        assert_eq!(basket.payment(), 500.0);
        basket.set_payment(900.0).unwrap();
        assert_eq!(basket.payment(), 900.0);
    }

    #[test]
    fn test_larger_budget_costs_less() {
        let mut slow = test_basket(200.0);
        let mut fast = test_basket(800.0);
        slow.pay_remaining().unwrap();
        fast.pay_remaining().unwrap();

        assert!(fast.total_paid() < slow.total_paid());
        assert!(fast.number_of_payments() < slow.number_of_payments());
    }

    #[test]
    fn test_reset_clears_history() {
        let mut basket = test_basket(500.0);
        basket.pay_remaining().unwrap();
        basket.reset();

        assert_eq!(basket.number_of_payments(), 0);
        assert_eq!(basket.balance(), 6_000.0);
        assert_eq!(basket.total_paid(), 0.0);
    }

    #[test]
    fn test_schedule_projection() {
        let mut basket = test_basket(500.0);
        basket.pay_one().unwrap();
        let rows = basket.schedule();

        assert_eq!(rows.len(), 6);
        assert_eq!(rows[1].loan, 0);
        assert_eq!(rows[1].period, 1);
        assert_eq!(rows[1].payment, 380.0);
        assert_eq!(rows[5].loan, 2);

        let totals = basket.totals();
        assert_eq!(totals.len(), 2);
        assert_abs_diff_eq!(totals[1].payment, 500.0, epsilon = 1e-9);
    }
}
