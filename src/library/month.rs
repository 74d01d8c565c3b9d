//! Reading-month keys (`YYYY-MM-01`).

use chrono::{Datelike, NaiveDate};

/// Parse a month key into the first day of that month.
///
/// Accepts `YYYY-MM-DD` (any day) and `YYYY-MM`.
pub fn parse_month(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(&format!("{}-01", value), "%Y-%m-%d"))
        .ok()?;
    date.with_day(1)
}

/// Normalise a month input to `YYYY-MM-01`.
pub fn normalize_month(value: &str) -> Option<String> {
    parse_month(value).map(month_key)
}

/// Storage key for the month containing `date`.
pub fn month_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}-01", date.year(), date.month())
}

/// Human label such as "March 2024"; unparseable keys are returned as-is.
pub fn format_month_label(value: &str) -> String {
    parse_month(value)
        .map(|date| date.format("%B %Y").to_string())
        .unwrap_or_else(|| value.to_string())
}

/// Months offered by the add-book form, most recent first.
///
/// Covers January two years before `today` through December of next year.
pub fn month_options(today: NaiveDate) -> Vec<(String, String)> {
    let mut options = Vec::with_capacity(48);
    for year in (today.year() - 2)..=(today.year() + 1) {
        for month in 1..=12 {
            if let Some(date) = NaiveDate::from_ymd_opt(year, month, 1) {
                options.push((month_key(date), date.format("%B %Y").to_string()));
            }
        }
    }
    options.reverse();
    options
}
