use std::collections::HashSet;

use crate::columns::resolve_text;
use crate::types::{Column, FilterSelection, FlatRecord};
use crate::util::normalize_value;

/// Keep the records matching every restricted column. Within a column any
/// selected value matches; comparisons ignore case and surrounding spaces.
/// Input order is preserved.
pub fn apply_filters(records: &[FlatRecord], selection: &FilterSelection) -> Vec<FlatRecord> {
    let active: Vec<(Column, HashSet<String>)> = Column::ALL
        .into_iter()
        .filter_map(|column| {
            let wanted: HashSet<String> = selection
                .values(column)
                .iter()
                .map(|v| normalize_value(v))
                .collect();
            if wanted.is_empty() {
                None
            } else {
                Some((column, wanted))
            }
        })
        .collect();

    if active.is_empty() {
        return records.to_vec();
    }

    let kept: Vec<FlatRecord> = records
        .iter()
        .filter(|record| {
            active.iter().all(|(column, wanted)| {
                resolve_text(record, (*column).into())
                    .map(|v| wanted.contains(&normalize_value(&v)))
                    .unwrap_or(false)
            })
        })
        .cloned()
        .collect();

    tracing::debug!(
        input = records.len(),
        kept = kept.len(),
        columns = active.len(),
        "applied filters"
    );
    kept
}
