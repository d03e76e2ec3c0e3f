//! Display helpers

/// Render an amount as dollars with thousands separators, e.g. `$1,000.24`
pub fn money(amount: f64) -> String {
    let rounded = format!("{:.2}", amount.abs());
    let (dollars, cents) = rounded.split_once('.').unwrap_or((rounded.as_str(), "00"));

    let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
    for (i, digit) in dollars.chars().enumerate() {
        if i > 0 && (dollars.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 && rounded != "0.00" { "-" } else { "" };
    format!("{}${}.{}", sign, grouped, cents)
}
