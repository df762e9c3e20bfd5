use std::collections::HashSet;

use crate::columns::resolve_text;
use crate::types::{Column, FilterOptions, FlatRecord};
use crate::util::normalize_value;

/// Collect the distinct values observed for every filterable column, sorted
/// lexicographically. Values that differ only in case or surrounding spaces
/// are one choice, spelled the way they were first seen. Columns that never
/// appear yield empty lists.
pub fn extract_options(records: &[FlatRecord]) -> FilterOptions {
    let mut options = FilterOptions::default();
    if records.is_empty() {
        return options;
    }

    for column in Column::ALL {
        let mut seen: HashSet<String> = HashSet::new();
        let mut distinct: Vec<String> = records
            .iter()
            .filter_map(|r| resolve_text(r, column.into()))
            .filter(|v| seen.insert(normalize_value(v)))
            .collect();
        distinct.sort();
        *options.values_mut(column) = distinct;
    }

    tracing::debug!(
        records = records.len(),
        products = options.products.len(),
        insurers = options.insurers.len(),
        "extracted filter options"
    );
    options
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_empty_lists() {
        assert_eq!(extract_options(&[]), FilterOptions::default());
    }

    #[test]
    fn distinct_sorted_values_across_aliases() {
        let records = vec![
            FlatRecord::new().with("Region", "West").with("Product Name", "Motor"),
            FlatRecord::new().with("region", " East ").with("Product name", "Health"),
            FlatRecord::new().with("Region", "West").with("Bussiness Vertical", "SME"),
            FlatRecord::new().with("Duration", 2023.0),
        ];
        let options = extract_options(&records);
        assert_eq!(options.regions, vec!["East", "West"]);
        assert_eq!(options.products, vec!["Health", "Motor"]);
        assert_eq!(options.business_verticals, vec!["SME"]);
        assert_eq!(options.durations, vec!["2023"]);
        assert!(options.insurers.is_empty());
    }

    #[test]
    fn case_variants_collapse_to_first_spelling() {
        let records = vec![
            FlatRecord::new().with("Region", "delhi"),
            FlatRecord::new().with("Region", "Delhi "),
            FlatRecord::new().with("Region", "DELHI"),
            FlatRecord::new().with("Region", "Agra"),
        ];
        assert_eq!(extract_options(&records).regions, vec!["Agra", "delhi"]);
    }
}
