use chrono::NaiveDate;

/// Formats an amount with two decimals and the configured currency code.
pub fn format_amount(value: f64, currency: &str) -> String {
    format!("{:.2} {}", value, currency)
}

/// Formats a date as `YYYY-MM-DD`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Formats a percentage with one decimal.
pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", value)
}
