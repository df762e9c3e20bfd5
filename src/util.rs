// Utility helpers for parsing and normalizing loosely-typed cell data.
//
// This module centralizes all the "dirty" header/number/string handling so
// the rest of the code can assume clean, typed values.
use num_format::{Locale, ToFormattedString};

/// Canonical form of a column header: lower-cased with every whitespace
/// character removed, so `"Product Name"`, `"product name"` and
/// `"ProductName"` compare equal.
pub fn normalize_header(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Canonical form of a cell value used for filter comparisons: trimmed and
/// lower-cased.
pub fn normalize_value(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Parse a string-like value into `f64` while being forgiving about
/// formatting issues that are common in spreadsheet exports.
///
/// - Trims whitespace and a leading currency symbol.
/// - Rejects values that contain alphabetic characters.
/// - Strips thousands separators like `","` before parsing.
/// - Returns `None` for anything that cannot be safely parsed or is not finite.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    let s = s.trim_start_matches(&['₹', '$'][..]).trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let s = s.replace(',', "");
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Round to two decimal places, mapping non-finite input to zero.
pub fn round2(n: f64) -> f64 {
    if !n.is_finite() {
        return 0.0;
    }
    (n * 100.0).round() / 100.0
}

/// Render a number without a trailing `.0` when it is integral, the way a
/// spreadsheet shows a numeric label such as a year.
pub fn number_label(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Format a floating-point value with:
    // - a fixed number of decimal places, and
    // - Indian digit grouping (e.g., `12,34,567.89`).
    let neg = n.is_sign_negative() && n != 0.0;
    let abs_n = n.abs();
    let s = format!("{:.*}", decimals, abs_n);
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en_IN);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
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
    // Thin wrapper around `num-format` for counts in console messages
    // (e.g., `9,855 rows loaded`).
    n.to_formatted_string(&Locale::en_IN)
}
