// Parsing and formatting helpers.
//
// All the "dirty" value handling lives here. Parsers return an explicit
// `Result` per cell; the decision to turn a failure into a missing cell is
// made at the call site, never inside the parser.
use chrono::NaiveDate;
use num_format::{Locale, ToFormattedString};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("`{0}` is not a number")]
    Number(String),
    #[error("`{0}` is not a date")]
    Date(String),
}

/// Parse a plain numeric string into `f64`.
///
/// - Trims whitespace.
/// - Rejects empty strings and anything with alphabetic characters (so
///   `"inf"`, `"nan"` and free text all fail instead of sneaking through).
pub fn parse_number(s: &str) -> Result<f64, ParseError> {
    let trimmed = s.trim();
    if trimmed.is_empty() || trimmed.chars().any(|c| c.is_ascii_alphabetic()) {
        return Err(ParseError::Number(s.to_string()));
    }
    trimmed
        .parse::<f64>()
        .map_err(|_| ParseError::Number(s.to_string()))
}

/// Symbols removed from price text before the numeric parse. Covers the
/// locales seen in the source exports plus thousands separators.
const PRICE_SYMBOLS: [char; 3] = ['$', '€', ','];

/// Parse price text like `"$1,200.50"` or `"1.234,00 €"`-style exports that
/// use `$`/`€` markers and comma separators.
pub fn parse_price(s: &str) -> Result<f64, ParseError> {
    let stripped: String = s.chars().filter(|c| !PRICE_SYMBOLS.contains(c)).collect();
    parse_number(stripped.trim())
}

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y-%m-%d %H:%M:%S", "%d/%m/%Y"];

/// Parse date text, accepting the formats observed in the source CSVs.
pub fn parse_date(s: &str) -> Result<NaiveDate, ParseError> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(ParseError::Date(s.to_string()));
    }
    for format in DATE_FORMATS {
        // `NaiveDate` parses and discards any time-of-day fields.
        if let Ok(d) = NaiveDate::parse_from_str(trimmed, format) {
            return Ok(d);
        }
    }
    Err(ParseError::Date(s.to_string()))
}

pub fn average(v: &[f64]) -> f64 {
    // Standard arithmetic mean; returns 0 for an empty slice to avoid NaNs.
    if v.is_empty() {
        return 0.0;
    }
    let sum: f64 = v.iter().copied().sum();
    sum / v.len() as f64
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Format a floating-point value with:
    // - a fixed number of decimal places, and
    // - locale-aware thousands separators (e.g., `1,234,567.89`).
    let neg = n.is_sign_negative();
    let abs_n = n.abs();
    let s = format!("{:.*}", decimals, abs_n);
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    // Use `num-format` to insert commas into the integer portion.
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    } else if decimals > 0 {
        res.push('.');
        res.push_str(&"0".repeat(decimals));
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Thin wrapper around `num-format` for integer-like values, used for
    // row counts in console messages (e.g., `9,855 rows loaded`).
    n.to_formatted_string(&Locale::en)
}
