use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::util::normalize_header;

/// A single spreadsheet cell as it arrives from an import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Bool(bool),
    Text(String),
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Number(n as f64)
    }
}

/// One raw transactional row. Headers are kept verbatim and in import order;
/// lookups go through [`crate::columns`] so header drift is tolerated.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FlatRecord {
    cells: Vec<(String, CellValue)>,
}

impl FlatRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert. A header that normalizes to an existing one
    /// replaces that cell in place.
    pub fn with(mut self, header: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.insert(header, value);
        self
    }

    pub fn insert(&mut self, header: impl Into<String>, value: impl Into<CellValue>) {
        let header = header.into();
        let value = value.into();
        let key = normalize_header(&header);
        match self
            .cells
            .iter_mut()
            .find(|(h, _)| normalize_header(h) == key)
        {
            Some(cell) => *cell = (header, value),
            None => self.cells.push((header, value)),
        }
    }

    pub fn cells(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.cells.iter().map(|(h, v)| (h.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<H: Into<String>, V: Into<CellValue>> FromIterator<(H, V)> for FlatRecord {
    fn from_iter<I: IntoIterator<Item = (H, V)>>(iter: I) -> Self {
        let mut record = FlatRecord::new();
        for (h, v) in iter {
            record.insert(h, v);
        }
        record
    }
}

impl Serialize for FlatRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (h, v) in &self.cells {
            map.serialize_entry(h, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for FlatRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RecordVisitor;

        impl<'de> Visitor<'de> for RecordVisitor {
            type Value = FlatRecord;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object of column headers to cell values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<FlatRecord, A::Error> {
                let mut record = FlatRecord::new();
                // Document order is preserved; nulls are simply absent cells.
                while let Some((header, value)) = access.next_entry::<String, Option<CellValue>>()? {
                    if let Some(value) = value {
                        record.insert(header, value);
                    }
                }
                Ok(record)
            }
        }

        deserializer.deserialize_map(RecordVisitor)
    }
}

/// The eight filterable logical columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Column {
    Duration,
    Region,
    ClientType,
    Product,
    Insurer,
    PolicyType,
    Lob,
    BusinessVertical,
}

impl Column {
    pub const ALL: [Column; 8] = [
        Column::Duration,
        Column::Region,
        Column::ClientType,
        Column::Product,
        Column::Insurer,
        Column::PolicyType,
        Column::Lob,
        Column::BusinessVertical,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Column::Duration => "Duration",
            Column::Region => "Region",
            Column::ClientType => "Client Type",
            Column::Product => "Product",
            Column::Insurer => "Insurer",
            Column::PolicyType => "Policy Type",
            Column::Lob => "LOB",
            Column::BusinessVertical => "Business Vertical",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One aggregated output row, shaped for generic chart consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSummary {
    pub name: String,
    pub policies: u64,
    pub premium: f64,
    pub gross_premium: f64,
    pub revenue: f64,
    pub revenue_percentage: f64,
    pub color: String,
    /// Mirrors `revenue`.
    pub value: f64,
    /// Mirrors `revenue_percentage`.
    pub percentage: f64,
}

/// Headline totals shown above the charts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_records: usize,
    pub total_policies: u64,
    pub total_premium: f64,
    pub total_revenue: f64,
    pub total_products: usize,
    pub total_insurers: usize,
}

/// Distinct observed values per filterable column, sorted.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterOptions {
    pub durations: Vec<String>,
    pub regions: Vec<String>,
    pub client_types: Vec<String>,
    pub products: Vec<String>,
    pub insurers: Vec<String>,
    pub policy_types: Vec<String>,
    pub lobs: Vec<String>,
    pub business_verticals: Vec<String>,
}

impl FilterOptions {
    pub fn values(&self, column: Column) -> &[String] {
        match column {
            Column::Duration => &self.durations,
            Column::Region => &self.regions,
            Column::ClientType => &self.client_types,
            Column::Product => &self.products,
            Column::Insurer => &self.insurers,
            Column::PolicyType => &self.policy_types,
            Column::Lob => &self.lobs,
            Column::BusinessVertical => &self.business_verticals,
        }
    }

    pub fn values_mut(&mut self, column: Column) -> &mut Vec<String> {
        match column {
            Column::Duration => &mut self.durations,
            Column::Region => &mut self.regions,
            Column::ClientType => &mut self.client_types,
            Column::Product => &mut self.products,
            Column::Insurer => &mut self.insurers,
            Column::PolicyType => &mut self.policy_types,
            Column::Lob => &mut self.lobs,
            Column::BusinessVertical => &mut self.business_verticals,
        }
    }
}

/// Chosen values per column. An empty list imposes no restriction.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterSelection {
    pub durations: Vec<String>,
    pub regions: Vec<String>,
    pub client_types: Vec<String>,
    pub products: Vec<String>,
    pub insurers: Vec<String>,
    pub policy_types: Vec<String>,
    pub lobs: Vec<String>,
    pub business_verticals: Vec<String>,
}

impl FilterSelection {
    pub fn values(&self, column: Column) -> &[String] {
        match column {
            Column::Duration => &self.durations,
            Column::Region => &self.regions,
            Column::ClientType => &self.client_types,
            Column::Product => &self.products,
            Column::Insurer => &self.insurers,
            Column::PolicyType => &self.policy_types,
            Column::Lob => &self.lobs,
            Column::BusinessVertical => &self.business_verticals,
        }
    }

    pub fn values_mut(&mut self, column: Column) -> &mut Vec<String> {
        match column {
            Column::Duration => &mut self.durations,
            Column::Region => &mut self.regions,
            Column::ClientType => &mut self.client_types,
            Column::Product => &mut self.products,
            Column::Insurer => &mut self.insurers,
            Column::PolicyType => &mut self.policy_types,
            Column::Lob => &mut self.lobs,
            Column::BusinessVertical => &mut self.business_verticals,
        }
    }

    pub fn is_empty(&self) -> bool {
        Column::ALL.iter().all(|c| self.values(*c).is_empty())
    }
}

/// Named dashboard views, each bound to one grouping column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportType {
    #[serde(rename = "Revenue by Products")]
    Products,
    #[serde(rename = "Revenue by Insurers")]
    Insurers,
    #[serde(rename = "Revenue by Policy Type")]
    PolicyType,
    #[serde(rename = "Revenue by LOB")]
    Lob,
    #[serde(rename = "Revenue by Vertical")]
    Vertical,
}

impl ReportType {
    pub const ALL: [ReportType; 5] = [
        ReportType::Products,
        ReportType::Insurers,
        ReportType::PolicyType,
        ReportType::Lob,
        ReportType::Vertical,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ReportType::Products => "Revenue by Products",
            ReportType::Insurers => "Revenue by Insurers",
            ReportType::PolicyType => "Revenue by Policy Type",
            ReportType::Lob => "Revenue by LOB",
            ReportType::Vertical => "Revenue by Vertical",
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            ReportType::Products => "products",
            ReportType::Insurers => "insurers",
            ReportType::PolicyType => "policy-type",
            ReportType::Lob => "lob",
            ReportType::Vertical => "vertical",
        }
    }

    pub fn column(self) -> Column {
        match self {
            ReportType::Products => Column::Product,
            ReportType::Insurers => Column::Insurer,
            ReportType::PolicyType => Column::PolicyType,
            ReportType::Lob => Column::Lob,
            ReportType::Vertical => Column::BusinessVertical,
        }
    }

    /// Accepts either the display label or the short key, ignoring case and
    /// whitespace.
    pub fn from_label(label: &str) -> Option<ReportType> {
        let wanted = normalize_header(label);
        ReportType::ALL.into_iter().find(|r| {
            normalize_header(r.label()) == wanted || normalize_header(r.key()) == wanted
        })
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_insert_replaces_equivalent_header() {
        let r = FlatRecord::new()
            .with("Product Name", "Health")
            .with("product name", "Motor");
        assert_eq!(r.len(), 1);
        let (h, v) = r.cells().next().unwrap();
        assert_eq!(h, "product name");
        assert_eq!(v, &CellValue::Text("Motor".into()));
    }

    #[test]
    fn record_json_keeps_document_order_and_drops_nulls() {
        let r: FlatRecord =
            serde_json::from_str(r#"{"Zeta": 1, "Alpha": "x", "Gone": null, "Flag": true}"#)
                .unwrap();
        let headers: Vec<&str> = r.cells().map(|(h, _)| h).collect();
        assert_eq!(headers, vec!["Zeta", "Alpha", "Flag"]);
        assert_eq!(
            serde_json::to_string(&r).unwrap(),
            r#"{"Zeta":1.0,"Alpha":"x","Flag":true}"#
        );
    }

    #[test]
    fn report_type_lookup_accepts_label_and_key() {
        assert_eq!(
            ReportType::from_label("Revenue by Products"),
            Some(ReportType::Products)
        );
        assert_eq!(
            ReportType::from_label("revenue  by   policy type"),
            Some(ReportType::PolicyType)
        );
        assert_eq!(ReportType::from_label("LOB"), Some(ReportType::Lob));
        assert_eq!(ReportType::from_label("Revenue by Region"), None);
    }

    #[test]
    fn selection_serde_defaults_missing_columns() {
        let s: FilterSelection = serde_json::from_str(r#"{"regions":["Delhi"]}"#).unwrap();
        assert_eq!(s.regions, vec!["Delhi".to_string()]);
        assert!(s.products.is_empty());
        assert!(!s.is_empty());
        assert!(FilterSelection::default().is_empty());
    }
}
