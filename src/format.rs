//! Currency scaling for chart axes and labels (thousands / lakhs / crores).

use num_format::{Locale, ToFormattedString};
use serde::{Deserialize, Serialize};

pub const CURRENCY_SYMBOL: &str = "₹";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueUnit {
    #[serde(rename = "K")]
    Thousands,
    #[serde(rename = "L")]
    Lakhs,
    #[serde(rename = "Cr")]
    Crores,
}

impl ValueUnit {
    pub fn parse(code: &str) -> Option<ValueUnit> {
        match code.trim() {
            "K" | "k" => Some(ValueUnit::Thousands),
            "L" | "l" => Some(ValueUnit::Lakhs),
            "Cr" | "CR" | "cr" => Some(ValueUnit::Crores),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            ValueUnit::Thousands => "K",
            ValueUnit::Lakhs => "L",
            ValueUnit::Crores => "Cr",
        }
    }

    pub fn divisor(self) -> f64 {
        match self {
            ValueUnit::Thousands => 1e3,
            ValueUnit::Lakhs => 1e5,
            ValueUnit::Crores => 1e7,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ValueUnit::Thousands => "Thousands",
            ValueUnit::Lakhs => "Lakhs",
            ValueUnit::Crores => "Crores",
        }
    }
}

/// `₹` plus the scaled amount to two decimals. An unrecognized unit code
/// falls back to the unscaled amount with Indian digit grouping.
pub fn format_value(value: f64, unit: &str) -> String {
    match ValueUnit::parse(unit) {
        Some(u) => {
            let scaled = if value.is_finite() { value / u.divisor() } else { 0.0 };
            format!("{}{:.2}", CURRENCY_SYMBOL, scaled)
        }
        None => {
            let whole = if value.is_finite() { value.round() as i64 } else { 0 };
            format!("{}{}", CURRENCY_SYMBOL, whole.to_formatted_string(&Locale::en_IN))
        }
    }
}

pub fn unit_label(unit: &str) -> &'static str {
    ValueUnit::parse(unit).map(ValueUnit::label).unwrap_or("Units")
}

pub fn convert_value(value: f64, unit: &str) -> f64 {
    match ValueUnit::parse(unit) {
        Some(u) => value / u.divisor(),
        None => value,
    }
}

pub fn format_for_chart(value: f64, unit: &str) -> String {
    format!("{} {}", format_value(value, unit), unit_label(unit))
}
