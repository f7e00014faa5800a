//! Cell value normalization: raw spreadsheet cells into optional strings and floats.
//!
//! Nothing here fails. A malformed cell degrades to `None` so one bad value
//! cannot take down a whole workbook load.

use crate::sheet_parser::Cell;

/// Markers that mean "no value" in numeric columns (compared lowercased).
const MISSING_MARKERS: [&str; 4] = ["na", "n/a", "none", "-"];

/// Currency symbol used in the source exports.
const CURRENCY_SYMBOL: &str = "₹";

/// Trimmed text of a cell, or `None` for blanks and the `-` placeholder.
pub fn normalize_string(cell: &Cell) -> Option<String> {
    let text = cell.as_text()?;
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed == "-" {
        return None;
    }
    Some(trimmed.to_string())
}

/// Numeric value of a cell.
///
/// Numbers pass through. Text has thousands separators and the currency symbol
/// removed; a trailing `%` is dropped and the rest is taken literally (`"45%"`
/// is `45.0`, not `0.45`). Booleans and unparseable text are `None`.
pub fn normalize_number(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Empty | Cell::Bool(_) => None,
        Cell::Number(n) => Some(*n),
        Cell::Text(text) => parse_number_text(text),
    }
}

fn parse_number_text(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    if MISSING_MARKERS.contains(&trimmed.to_lowercase().as_str()) {
        return None;
    }

    let cleaned = trimmed.replace(',', "").replace(CURRENCY_SYMBOL, "");
    let cleaned = cleaned.trim();

    let digits = match cleaned.strip_suffix('%') {
        Some(rest) => rest.trim(),
        None => cleaned,
    };
    digits.parse::<f64>().ok()
}

/// Round to two decimal places. Non-finite input has no rounded value.
///
/// Rounds the exact binary value with ties to even, so `80.125` becomes
/// `80.12` and `2.675` (stored just below) becomes `2.67`.
pub fn round2(value: Option<f64>) -> Option<f64> {
    let v = value?;
    if !v.is_finite() {
        return None;
    }
    format!("{:.2}", v).parse::<f64>().ok()
}

pub fn safe_divide(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    match (numerator, denominator) {
        (Some(n), Some(d)) if d != 0.0 => Some(n / d),
        _ => None,
    }
}

/// Arithmetic mean of the present values, `None` when there are none.
pub fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let (sum, count) = values
        .into_iter()
        .flatten()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}
