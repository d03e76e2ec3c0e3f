//! Avalanche allocation of a shared payment budget

/// What one loan in a basket owes for the current period
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obligation {
    /// Balance after this period's compounding
    pub balance: f64,
    /// Minimum payment
    pub minimum: f64,
    pub rate: f64,
}

/// Split `budget` across loans for one period
///
/// Every loan with a balance first gets its minimum, capped at the balance.
/// Whatever remains goes to loans in descending rate order, each taking up to
/// its balance, so one period can pay off several loans. Loans with equal
/// rates keep their original order. Zero-balance loans get 0.
pub fn allocate_avalanche(obligations: &[Obligation], budget: f64) -> Vec<f64> {
    let mut payments: Vec<f64> = obligations
        .iter()
        .map(|o| if o.balance > 0.0 { o.minimum.min(o.balance) } else { 0.0 })
        .collect();

    let mut remainder = (budget - payments.iter().sum::<f64>()).max(0.0);

    let mut order: Vec<usize> = (0..obligations.len())
        .filter(|&i| obligations[i].balance > 0.0)
        .collect();
    // sort_by is stable, so ties stay in list order
    order.sort_by(|&a, &b| obligations[b].rate.total_cmp(&obligations[a].rate));

    for i in order {
        if remainder <= 0.0 {
            break;
        }
        let room = obligations[i].balance - payments[i];
        if room <= 0.0 {
            continue;
        }
        if remainder >= room {
            // Pay exactly the balance so the loan settles at 0
            payments[i] = obligations[i].balance;
            remainder -= room;
        } else {
            payments[i] += remainder;
            remainder = 0.0;
        }
    }

    payments
}
