//! Value formatting for report cells

use chrono::{DateTime, NaiveDateTime};

use crate::models::de::parse_date;

/// Placeholder for averages over empty series
pub const NOT_AVAILABLE: &str = "N/A";

/// Label substituted for unset filter dimensions
pub const ALL: &str = "All";

/// Maximum displayed name length before truncation
const NAME_LIMIT: usize = 20;

pub fn currency(amount: f64) -> String {
    format!("${:.2}", amount)
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Series average to two decimals, or `N/A` for an empty series
pub fn average(values: &[f64]) -> String {
    decimal(mean(values))
}

pub fn decimal(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.2}", v))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Names longer than 20 characters become their first 18 plus `...`
pub fn truncate_name(name: &str) -> String {
    if name.chars().count() > NAME_LIMIT {
        let head: String = name.chars().take(NAME_LIMIT - 2).collect();
        format!("{}...", head)
    } else {
        name.to_string()
    }
}

/// `dd/mm/yyyy` when the input parses as a date, otherwise the input unchanged
pub fn display_date(raw: &str) -> String {
    parse_date(raw)
        .map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| raw.to_string())
}

/// `dd/mm/yyyy HH:MM` for timestamps, falling back to [`display_date`]
pub fn display_timestamp(raw: &str) -> String {
    let trimmed = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(trimmed) {
        return ts.format("%d/%m/%Y %H:%M").to_string();
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S") {
        return ts.format("%d/%m/%Y %H:%M").to_string();
    }
    display_date(trimmed)
}

/// Optional measurement with a unit suffix, `N/A` when absent
pub fn measurement(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) if v.fract() == 0.0 => format!("{} {}", v as i64, unit),
        Some(v) => format!("{:.1} {}", v, unit),
        None => NOT_AVAILABLE.to_string(),
    }
}
