use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use crate::columns::{policy_contribution, resolve_number, resolve_text, Field};
use crate::types::{Column, DashboardSummary, FlatRecord, GroupSummary, ReportType};
use crate::util::round2;

/// What to do with a record that has no value for the grouping column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissingKeyPolicy {
    /// Count it under the given label.
    Bucket(String),
    /// Leave it out of the result entirely.
    Exclude,
}

/// How `revenue_percentage` is derived for each group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PercentageBasis {
    /// Mean of the percentage column over the group's records that carry one.
    AverageOfInputs,
    /// Group revenue over the summed revenue of every group in the result.
    ShareOfGroupTotal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupOptions {
    pub missing_key: MissingKeyPolicy,
    pub percentage_basis: PercentageBasis,
}

pub const UNKNOWN_GROUP: &str = "Unknown";

impl Default for GroupOptions {
    fn default() -> Self {
        Self {
            missing_key: MissingKeyPolicy::Bucket(UNKNOWN_GROUP.to_string()),
            percentage_basis: PercentageBasis::ShareOfGroupTotal,
        }
    }
}

impl GroupOptions {
    /// Report views drop unnamed rows so their shares renormalize over what
    /// is actually shown.
    pub fn report() -> Self {
        Self {
            missing_key: MissingKeyPolicy::Exclude,
            percentage_basis: PercentageBasis::ShareOfGroupTotal,
        }
    }

    /// Historical dashboard behavior: "Unknown" bucket and averaged input
    /// percentages.
    pub fn legacy() -> Self {
        Self {
            missing_key: MissingKeyPolicy::Bucket(UNKNOWN_GROUP.to_string()),
            percentage_basis: PercentageBasis::AverageOfInputs,
        }
    }
}

/// Deterministic palette entry for the group first seen at `index`.
pub fn fallback_color(index: usize) -> String {
    let hue = (index as f64 * 137.5) % 360.0;
    format!("hsl({}, 70%, 50%)", hue)
}

/// Aggregate records per distinct value of `column`, sorted by revenue
/// descending with ties kept in encounter order.
pub fn group_records(
    records: &[FlatRecord],
    column: Column,
    options: &GroupOptions,
) -> Vec<GroupSummary> {
    #[derive(Default)]
    struct Acc {
        name: String,
        policies: u64,
        premium: f64,
        gross_premium: f64,
        revenue: f64,
        pct_sum: f64,
        pct_count: usize,
        color: Option<String>,
    }

    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<Acc> = Vec::new();
    let mut skipped = 0usize;

    for r in records {
        let name = match resolve_text(r, column.into()) {
            Some(name) => name,
            None => match &options.missing_key {
                MissingKeyPolicy::Bucket(label) => label.clone(),
                MissingKeyPolicy::Exclude => {
                    skipped += 1;
                    continue;
                }
            },
        };

        let slot = *index.entry(name.clone()).or_insert_with(|| {
            groups.push(Acc {
                name,
                ..Acc::default()
            });
            groups.len() - 1
        });
        let e = &mut groups[slot];

        e.policies = e.policies.saturating_add(policy_contribution(r));
        if let Some(v) = resolve_number(r, Field::NetPremium) {
            e.premium += v;
        }
        if let Some(v) = resolve_number(r, Field::GrossPremium) {
            e.gross_premium += v;
        }
        if let Some(v) = resolve_number(r, Field::Revenue) {
            e.revenue += v;
        }
        if let Some(v) = resolve_number(r, Field::RevenuePercentage) {
            e.pct_sum += v;
            e.pct_count += 1;
        }
        if e.color.is_none() {
            e.color = resolve_text(r, Field::Color);
        }
    }

    let total_revenue: f64 = groups.iter().map(|g| g.revenue).sum();

    let mut out: Vec<GroupSummary> = groups
        .into_iter()
        .enumerate()
        .map(|(idx, acc)| {
            let pct = match options.percentage_basis {
                PercentageBasis::ShareOfGroupTotal => {
                    if total_revenue.abs() < f64::EPSILON {
                        0.0
                    } else {
                        round2(acc.revenue / total_revenue * 100.0)
                    }
                }
                PercentageBasis::AverageOfInputs => {
                    if acc.pct_count == 0 {
                        0.0
                    } else {
                        round2(acc.pct_sum / acc.pct_count as f64)
                    }
                }
            };
            GroupSummary {
                name: acc.name,
                policies: acc.policies,
                premium: acc.premium,
                gross_premium: acc.gross_premium,
                revenue: acc.revenue,
                revenue_percentage: pct,
                color: acc.color.unwrap_or_else(|| fallback_color(idx)),
                value: acc.revenue,
                percentage: pct,
            }
        })
        .collect();

    // `sort_by` is stable, so equal revenues keep their first-seen order.
    out.sort_by(|a, b| b.revenue.partial_cmp(&a.revenue).unwrap_or(Ordering::Equal));

    tracing::debug!(
        column = %column,
        records = records.len(),
        groups = out.len(),
        skipped,
        "grouped records"
    );
    out
}

/// Group by any column, bucketing unnamed rows under "Unknown".
pub fn group_by(records: &[FlatRecord], column: Column) -> Vec<GroupSummary> {
    group_records(records, column, &GroupOptions::default())
}

pub fn regroup(records: &[FlatRecord], report: ReportType) -> Vec<GroupSummary> {
    group_records(records, report.column(), &GroupOptions::report())
}

/// Regroup for a named report view; an unknown name yields no groups.
pub fn regroup_for_report_type(records: &[FlatRecord], report_type: &str) -> Vec<GroupSummary> {
    match ReportType::from_label(report_type) {
        Some(report) => regroup(records, report),
        None => {
            tracing::debug!(report_type, "unknown report type");
            Vec::new()
        }
    }
}

/// Headline totals for the dashboard header.
pub fn generate_summary(records: &[FlatRecord]) -> DashboardSummary {
    let mut products: HashSet<String> = HashSet::new();
    let mut insurers: HashSet<String> = HashSet::new();
    let mut total_policies = 0u64;
    let mut total_premium = 0.0;
    let mut total_revenue = 0.0;

    for r in records {
        total_policies = total_policies.saturating_add(policy_contribution(r));
        total_premium += resolve_number(r, Field::NetPremium).unwrap_or(0.0);
        total_revenue += resolve_number(r, Field::Revenue).unwrap_or(0.0);
        if let Some(p) = resolve_text(r, Field::ProductName) {
            products.insert(p);
        }
        if let Some(i) = resolve_text(r, Field::InsurerName) {
            insurers.insert(i);
        }
    }

    DashboardSummary {
        total_records: records.len(),
        total_policies,
        total_premium,
        total_revenue,
        total_products: products.len(),
        total_insurers: insurers.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sale(product: Option<&str>, revenue: f64) -> FlatRecord {
        let mut r = FlatRecord::new().with("Gross Premium", revenue);
        if let Some(p) = product {
            r.insert("Product Name", p);
        }
        r
    }

    #[test]
    fn fallback_palette_steps_by_golden_angle() {
        assert_eq!(fallback_color(0), "hsl(0, 70%, 50%)");
        assert_eq!(fallback_color(1), "hsl(137.5, 70%, 50%)");
        assert_eq!(fallback_color(3), "hsl(52.5, 70%, 50%)");
    }

    #[test]
    fn group_by_buckets_missing_names_as_unknown() {
        let records = vec![sale(Some("Health"), 100.0), sale(None, 300.0)];
        let groups = group_by(&records, Column::Product);
        let names: Vec<&str> = groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Unknown", "Health"]);
        assert_eq!(groups[0].revenue_percentage, 75.0);
        assert_eq!(groups[1].revenue_percentage, 25.0);
    }

    #[test]
    fn report_view_excludes_missing_names_and_renormalizes() {
        let records = vec![
            sale(Some("Health"), 100.0),
            sale(None, 300.0),
            sale(Some("Motor"), 300.0),
        ];
        let groups = regroup(&records, ReportType::Products);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].name, "Motor");
        assert_eq!(groups[0].revenue_percentage, 75.0);
        assert_eq!(groups[0].percentage, 75.0);
        assert_eq!(groups[0].value, 300.0);
        assert_eq!(groups[1].revenue_percentage, 25.0);
    }

    #[test]
    fn legacy_percentage_averages_inputs() {
        let records = vec![
            sale(Some("Health"), 100.0).with("Revenue Percentage", 10.0),
            sale(Some("Health"), 100.0).with("Revenue Percentage", 20.0),
            sale(Some("Motor"), 50.0),
        ];
        let groups = group_records(&records, Column::Product, &GroupOptions::legacy());
        assert_eq!(groups[0].name, "Health");
        assert_eq!(groups[0].revenue_percentage, 15.0);
        assert_eq!(groups[1].revenue_percentage, 0.0);
    }

    #[test]
    fn explicit_color_wins_over_palette() {
        let records = vec![
            sale(Some("Health"), 10.0),
            sale(Some("Health"), 10.0).with("Color", "#ff0000"),
            sale(Some("Motor"), 5.0),
        ];
        let groups = group_by(&records, Column::Product);
        assert_eq!(groups[0].color, "#ff0000");
        assert_eq!(groups[1].color, fallback_color(1));
    }

    #[test]
    fn zero_revenue_gives_zero_percentages() {
        let records = vec![FlatRecord::new().with("Product Name", "Health").with("Policy No", "P1")];
        let groups = regroup(&records, ReportType::Products);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].revenue, 0.0);
        assert_eq!(groups[0].premium, 0.0);
        assert_eq!(groups[0].revenue_percentage, 0.0);
        assert_eq!(groups[0].policies, 1);
    }

    #[test]
    fn premium_and_gross_premium_accumulate_separately() {
        let records = vec![
            FlatRecord::new()
                .with("Insurer", "Acme")
                .with("Net Premium", 80.0)
                .with("Gross Premium", 100.0),
            FlatRecord::new()
                .with("Insurer", "Acme")
                .with("Revenue", "250"),
        ];
        let groups = regroup(&records, ReportType::Insurers);
        assert_eq!(groups[0].premium, 80.0);
        assert_eq!(groups[0].gross_premium, 100.0);
        assert_eq!(groups[0].revenue, 350.0);
    }

    #[test]
    fn oversized_policy_counts_saturate() {
        let big = || {
            FlatRecord::new()
                .with("Product Name", "Health")
                .with("No.of Policies", "100000000000000000000")
        };
        let records = vec![big(), big()];
        let groups = regroup(&records, ReportType::Products);
        assert_eq!(groups[0].policies, u64::MAX);
        assert_eq!(generate_summary(&records).total_policies, u64::MAX);
    }

    #[test]
    fn unknown_report_type_is_empty() {
        let records = vec![sale(Some("Health"), 1.0)];
        assert!(regroup_for_report_type(&records, "Revenue by Weather").is_empty());
    }

    #[test]
    fn summary_totals() {
        let records = vec![
            sale(Some("Health"), 100.0).with("Insurer", "Acme").with("Policy No", "P1"),
            sale(Some("Motor"), 50.0).with("Insurer", "Acme").with("Net Premium", 40.0),
        ];
        let s = generate_summary(&records);
        assert_eq!(s.total_records, 2);
        assert_eq!(s.total_policies, 1);
        assert_eq!(s.total_revenue, 150.0);
        assert_eq!(s.total_premium, 40.0);
        assert_eq!(s.total_products, 2);
        assert_eq!(s.total_insurers, 1);
    }
}
