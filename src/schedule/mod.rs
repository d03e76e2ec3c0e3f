//! Payoff simulation for single loans and baskets of loans

mod allocator;
mod basket;
mod rows;
mod single;

pub use allocator::{allocate_avalanche, Obligation};
pub use basket::MultiLoan;
pub use rows::{BasketRow, ScheduleRow};
pub use single::Loan;

use crate::error::Result;

/// Anything that can be driven to payoff at a chosen recurring payment
///
/// For a [`Loan`] the payment is the loan's own recurring payment; for a
/// [`MultiLoan`] it is the shared budget.
pub trait Payoff: Clone {
    fn reset(&mut self);

    fn set_payment(&mut self, amount: f64) -> Result<()>;

    fn pay_remaining(&mut self) -> Result<()>;

    fn total_paid(&self) -> f64;

    fn number_of_payments(&self) -> usize;
}

impl Payoff for Loan {
    fn reset(&mut self) {
        Loan::reset(self)
    }

    fn set_payment(&mut self, amount: f64) -> Result<()> {
        Loan::set_payment(self, amount)
    }

    fn pay_remaining(&mut self) -> Result<()> {
        Loan::pay_remaining(self)
    }

    fn total_paid(&self) -> f64 {
        Loan::total_paid(self)
    }

    fn number_of_payments(&self) -> usize {
        Loan::number_of_payments(self)
    }
}

impl Payoff for MultiLoan {
    fn reset(&mut self) {
        MultiLoan::reset(self)
    }

    fn set_payment(&mut self, amount: f64) -> Result<()> {
        MultiLoan::set_payment(self, amount)
    }

    fn pay_remaining(&mut self) -> Result<()> {
        MultiLoan::pay_remaining(self)
    }

    fn total_paid(&self) -> f64 {
        MultiLoan::total_paid(self)
    }

    fn number_of_payments(&self) -> usize {
        MultiLoan::number_of_payments(self)
    }
}
