use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

/// Render a monetary total with exactly two decimal places.
///
/// Rounds half-to-even and never switches to exponent notation.
///
/// # Examples
///
/// ```
/// use invoice_core::formatting::format_amount;
/// use rust_decimal::Decimal;
///
/// assert_eq!(format_amount(Decimal::new(50, 0)), "50.00");
/// assert_eq!(format_amount(Decimal::new(25050, 2)), "250.50");
/// assert_eq!(format_amount(Decimal::new(1005, 3)), "1.00");
/// ```
pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);
    format!("{:.2}", rounded)
}

/// Parse an amount cell.
///
/// Surrounding whitespace is ignored; both plain (`"100.50"`) and scientific
/// (`"1.005e2"`) notation are accepted. Returns `None` for anything else.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}
