use serde::Serialize;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

use crate::error::Result;
use crate::format::format_value;
use crate::types::GroupSummary;
use crate::util::{format_int, format_number};

/// Display shape of a group for console previews, amounts scaled to the
/// chosen unit.
#[derive(Debug, Clone, Tabled)]
pub struct ReportRow {
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Policies")]
    pub policies: String,
    #[tabled(rename = "Premium")]
    pub premium: String,
    #[tabled(rename = "Revenue")]
    pub revenue: String,
    #[tabled(rename = "Share %")]
    pub share: String,
    #[tabled(rename = "Color")]
    pub color: String,
}

impl ReportRow {
    pub fn from_summary(g: &GroupSummary, unit: &str) -> Self {
        Self {
            name: g.name.clone(),
            policies: format_int(g.policies),
            premium: format_value(g.premium, unit),
            revenue: format_value(g.revenue, unit),
            share: format_number(g.revenue_percentage, 2),
            color: g.color.clone(),
        }
    }
}

pub fn report_rows(groups: &[GroupSummary], unit: &str) -> Vec<ReportRow> {
    groups.iter().map(|g| ReportRow::from_summary(g, unit)).collect()
}

pub fn write_csv<T: Serialize>(path: impl AsRef<Path>, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: impl AsRef<Path>, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

pub fn render_table<T>(rows: &[T], max_rows: usize) -> String
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    if slice.is_empty() {
        return "(no rows)".to_string();
    }
    Table::new(slice).with(Style::markdown()).to_string()
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    println!("{}\n", render_table(rows, max_rows));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::fallback_color;

    fn group(name: &str, revenue: f64, pct: f64) -> GroupSummary {
        GroupSummary {
            name: name.into(),
            policies: 1200,
            premium: 0.0,
            gross_premium: revenue,
            revenue,
            revenue_percentage: pct,
            color: fallback_color(0),
            value: revenue,
            percentage: pct,
        }
    }

    #[test]
    fn rows_scale_amounts_to_unit() {
        let row = ReportRow::from_summary(&group("Health", 25_000_000.0, 62.5), "Cr");
        assert_eq!(row.revenue, "₹2.50");
        assert_eq!(row.policies, "1,200");
        assert_eq!(row.share, "62.50");
    }

    #[test]
    fn render_truncates_and_handles_empty() {
        let rows = report_rows(&[group("A", 2.0, 50.0), group("B", 2.0, 50.0)], "K");
        let table = render_table(&rows, 1);
        assert!(table.contains("| A "));
        assert!(!table.contains("| B "));
        assert_eq!(render_table::<ReportRow>(&[], 5), "(no rows)");
    }

    #[test]
    fn csv_export_uses_camel_case_headers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");
        write_csv(&path, &[group("Health", 10.0, 100.0)]).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let header = text.lines().next().unwrap();
        assert_eq!(
            header,
            "name,policies,premium,grossPremium,revenue,revenuePercentage,color,value,percentage"
        );
    }
}
