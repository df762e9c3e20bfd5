//! Declarative column-alias table and the lookup rule over [`FlatRecord`]s.
//!
//! Every logical field owns an ordered list of accepted headers. A lookup
//! first tries each alias as an exact normalized header match, then falls back
//! to the first header that merely contains an alias. Exclusions keep the
//! substring pass from wandering into a neighbouring column (for instance
//! `Premium` must not pick up `Gross Premium`).

use crate::types::{CellValue, Column, FlatRecord};
use crate::util::{normalize_header, number_label, parse_f64_safe};

/// Logical fields the pipeline reads from a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Duration,
    Region,
    ClientType,
    ProductName,
    InsurerName,
    PolicyType,
    LobName,
    BusinessVertical,
    PolicyCount,
    PolicyNumber,
    NetPremium,
    Revenue,
    GrossPremium,
    RevenuePercentage,
    Color,
}

impl From<Column> for Field {
    fn from(column: Column) -> Self {
        match column {
            Column::Duration => Field::Duration,
            Column::Region => Field::Region,
            Column::ClientType => Field::ClientType,
            Column::Product => Field::ProductName,
            Column::Insurer => Field::InsurerName,
            Column::PolicyType => Field::PolicyType,
            Column::Lob => Field::LobName,
            Column::BusinessVertical => Field::BusinessVertical,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub aliases: &'static [&'static str],
    /// Header fragments that disqualify a substring match.
    pub excludes: &'static [&'static str],
}

pub fn spec_for(field: Field) -> ColumnSpec {
    let (aliases, excludes): (&'static [&'static str], &'static [&'static str]) = match field {
        Field::Duration => (&["Duration", "Period"], &[]),
        Field::Region => (&["Region", "Zone"], &[]),
        Field::ClientType => (&["Client Type", "Customer Type", "ClientType"], &[]),
        Field::ProductName => (&["Product Name", "Product name", "ProductName", "Product"], &[]),
        Field::InsurerName => (
            &["Insurer Name", "Insurer name", "InsurerName", "Insurer", "Insurance Company"],
            &[],
        ),
        Field::PolicyType => (&["Policy Type", "PolicyType"], &[]),
        Field::LobName => (
            &["LOB Name", "LOB name", "LOBName", "LOB", "Line of Business"],
            &["global", "lobby"],
        ),
        Field::BusinessVertical => (
            &[
                "Business Vertical",
                "Bussiness Vertical",
                "BusinessVertical",
                "Vertical",
            ],
            &[],
        ),
        Field::PolicyCount => (
            &[
                "No.of Policies",
                "No. of Policies",
                "Number of Policies",
                "Policy Count",
                "Policies",
            ],
            &[],
        ),
        Field::PolicyNumber => (&["Policy No", "Policy Number", "Policy No."], &["type"]),
        Field::NetPremium => (&["Net Premium", "NetPremium", "Premium"], &["gross"]),
        Field::Revenue => (
            &["Gross Premium", "GrossPremium", "Revenue"],
            &["percent", "%", "share"],
        ),
        Field::GrossPremium => (&["Gross Premium", "GrossPremium", "Gross Prem"], &[]),
        Field::RevenuePercentage => (
            &["Revenue Percentage", "RevenuePercentage", "Percentage", "Share %"],
            &[],
        ),
        Field::Color => (&["Color", "Colour"], &[]),
    };
    ColumnSpec { aliases, excludes }
}

/// Locate the raw cell for a logical field, or `None` when no header
/// qualifies.
pub fn lookup(record: &FlatRecord, field: Field) -> Option<&CellValue> {
    let spec = spec_for(field);
    let headers: Vec<(String, &CellValue)> = record
        .cells()
        .map(|(h, v)| (normalize_header(h), v))
        .collect();

    for alias in spec.aliases {
        let alias = normalize_header(alias);
        if let Some((_, v)) = headers.iter().find(|(h, _)| *h == alias) {
            return Some(*v);
        }
    }

    let excludes: Vec<String> = spec.excludes.iter().map(|e| normalize_header(e)).collect();
    for alias in spec.aliases {
        let alias = normalize_header(alias);
        let hit = headers.iter().find(|(h, _)| {
            h.contains(alias.as_str()) && !excludes.iter().any(|e| h.contains(e.as_str()))
        });
        if let Some((_, v)) = hit {
            return Some(*v);
        }
    }
    None
}

/// Trimmed, non-blank text for a field. Numbers render as plain labels.
pub fn resolve_text(record: &FlatRecord, field: Field) -> Option<String> {
    match lookup(record, field)? {
        CellValue::Text(s) => {
            let s = s.trim();
            if s.is_empty() {
                None
            } else {
                Some(s.to_string())
            }
        }
        CellValue::Number(n) if n.is_finite() => Some(number_label(*n)),
        CellValue::Number(_) => None,
        CellValue::Bool(b) => Some(b.to_string()),
    }
}

/// Finite numeric value for a field; unparsable cells count as absent.
pub fn resolve_number(record: &FlatRecord, field: Field) -> Option<f64> {
    match lookup(record, field)? {
        CellValue::Number(n) if n.is_finite() => Some(*n),
        CellValue::Number(_) | CellValue::Bool(_) => None,
        CellValue::Text(s) => parse_f64_safe(Some(s)),
    }
}

/// How many policies a record stands for: an explicit count when present,
/// else one when it carries a policy number, else zero.
pub fn policy_contribution(record: &FlatRecord) -> u64 {
    if let Some(count) = resolve_number(record, Field::PolicyCount) {
        return count.max(0.0).round() as u64;
    }
    if resolve_text(record, Field::PolicyNumber).is_some() {
        1
    } else {
        0
    }
}
