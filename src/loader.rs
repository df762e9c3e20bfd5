use crate::error::Result;
use crate::types::{CellValue, FlatRecord};
use csv::ReaderBuilder;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub loaded_rows: usize,
    pub empty_rows: usize,
    pub parse_errors: usize,
}

/// Load flat records from a `.json` array of objects or, for any other
/// extension, a CSV file whose first row is the header.
pub fn load_records(path: impl AsRef<Path>) -> Result<(Vec<FlatRecord>, LoadReport)> {
    let path = path.as_ref();
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let loaded = if is_json {
        records_from_json(&std::fs::read_to_string(path)?)?
    } else {
        records_from_csv(std::fs::File::open(path)?)?
    };
    tracing::info!(
        path = %path.display(),
        total = loaded.1.total_rows,
        loaded = loaded.1.loaded_rows,
        errors = loaded.1.parse_errors,
        "loaded records"
    );
    Ok(loaded)
}

/// Every non-blank cell becomes a text cell under its header; numeric
/// interpretation happens at lookup time.
pub fn records_from_csv<R: std::io::Read>(reader: R) -> Result<(Vec<FlatRecord>, LoadReport)> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = rdr.headers()?.clone();
    let mut report = LoadReport::default();
    let mut records = Vec::new();

    for result in rdr.records() {
        report.total_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(row = report.total_rows, error = %e, "skipping unreadable row");
                report.parse_errors += 1;
                continue;
            }
        };

        let record: FlatRecord = headers
            .iter()
            .zip(row.iter())
            .filter(|(h, v)| !h.trim().is_empty() && !v.trim().is_empty())
            .map(|(h, v)| (h.trim().to_string(), CellValue::Text(v.trim().to_string())))
            .collect();

        if record.is_empty() {
            report.empty_rows += 1;
            continue;
        }
        records.push(record);
    }

    report.loaded_rows = records.len();
    Ok((records, report))
}

pub fn records_from_json(json: &str) -> Result<(Vec<FlatRecord>, LoadReport)> {
    let parsed: Vec<FlatRecord> = serde_json::from_str(json)?;
    let total_rows = parsed.len();
    let records: Vec<FlatRecord> = parsed.into_iter().filter(|r| !r.is_empty()).collect();
    let report = LoadReport {
        total_rows,
        loaded_rows: records.len(),
        empty_rows: total_rows - records.len(),
        parse_errors: 0,
    };
    Ok((records, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::{resolve_number, resolve_text, Field};

    #[test]
    fn csv_rows_become_records() {
        let data = "Product Name,Region,Gross Premium\nHealth, West ,\"1,200\"\n,,\nMotor,East,300\n";
        let (records, report) = records_from_csv(data.as_bytes()).unwrap();
        assert_eq!(report.total_rows, 3);
        assert_eq!(report.loaded_rows, 2);
        assert_eq!(report.empty_rows, 1);
        assert_eq!(resolve_text(&records[0], Field::Region).as_deref(), Some("West"));
        assert_eq!(resolve_number(&records[0], Field::Revenue), Some(1200.0));
    }

    #[test]
    fn short_rows_are_tolerated() {
        let data = "Product Name,Region,Gross Premium\nHealth\n";
        let (records, _) = records_from_csv(data.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].len(), 1);
    }

    #[test]
    fn json_array_of_objects() {
        let json = r#"[{"Product Name": "Health", "Gross Premium": 300}, {}]"#;
        let (records, report) = records_from_json(json).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(report.empty_rows, 1);
        assert!(records_from_json("{\"not\": \"an array\"}").is_err());
    }

    #[test]
    fn load_records_picks_format_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.json");
        std::fs::write(&path, r#"[{"Insurer": "Acme"}]"#).unwrap();
        let (records, _) = load_records(&path).unwrap();
        assert_eq!(resolve_text(&records[0], Field::InsurerName).as_deref(), Some("Acme"));
        assert!(load_records(dir.path().join("missing.csv")).is_err());
    }
}
