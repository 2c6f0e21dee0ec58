//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Formats a timestamp the way the sales ledger shows it,
/// e.g. `23-08-2026 05:30 PM`.
///
/// Usage in templates: `{{ sale.created_at|ledger_date }}`
#[askama::filter_fn]
pub fn ledger_date(
    value: &chrono::DateTime<chrono::Utc>,
    _env: &dyn askama::Values,
) -> askama::Result<String> {
    Ok(value.format("%d-%m-%Y %I:%M %p").to_string())
}
