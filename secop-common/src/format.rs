//! Display formatting for money and dates
//!
//! Provides consistent value display across summary blocks, tables and
//! spreadsheet exports.

use chrono::NaiveDateTime;

/// Placeholder shown for monetary values that are missing or not numeric
pub const NOT_AVAILABLE: &str = "N/A";

/// Currency suffix appended to every monetary value
pub const CURRENCY_SUFFIX: &str = "COP";

/// Format a monetary value with thousands separators and two decimals.
///
/// # Examples
///
/// ```
/// use secop_common::format::format_money;
///
/// assert_eq!(format_money(1500.0), "$1,500.00 COP");
/// assert_eq!(format_money(0.5), "$0.50 COP");
/// assert_eq!(format_money(-1234567.891), "$-1,234,567.89 COP");
/// ```
pub fn format_money(value: f64) -> String {
    format!("${} {}", group_thousands(value, 2), CURRENCY_SUFFIX)
}

/// Format an optional monetary value, using [`NOT_AVAILABLE`] when absent
pub fn format_money_or_na(value: Option<f64>) -> String {
    match value {
        Some(v) => format_money(v),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Format a timestamp as day/month/year
pub fn format_date_dmy(value: &NaiveDateTime) -> String {
    value.format("%d/%m/%Y").to_string()
}

/// Render a number with `,` thousands separators and fixed decimals.
///
/// Rounding happens before grouping so `999.999` becomes `1,000.00`.
fn group_thousands(value: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let digits = int_part.as_bytes();
    let mut grouped = String::with_capacity(fixed.len() + digits.len() / 3 + 1);
    for (i, digit) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*digit as char);
    }
    if let Some(frac) = frac_part {
        grouped.push('.');
        grouped.push_str(frac);
    }

    // Negative zero after rounding prints without a sign
    let is_zero = fixed.bytes().all(|b| b == b'0' || b == b'.');
    if value.is_sign_negative() && !is_zero {
        grouped.insert(0, '-');
    }
    grouped
}
