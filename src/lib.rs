//! Filter-and-regroup pipeline behind the brokerage analytics dashboard.
//!
//! Flat records from an import are narrowed with [`filter::apply_filters`],
//! aggregated per dimension with [`reports::group_records`] (or the report
//! shortcuts), and rendered by whatever consumes the resulting
//! [`types::GroupSummary`] rows. Everything in the pipeline is a pure
//! function of its inputs.

pub mod columns;
pub mod config;
pub mod entity_filter;
pub mod error;
pub mod filter;
pub mod format;
pub mod loader;
pub mod options;
pub mod output;
pub mod playlist;
pub mod reports;
pub mod store;
pub mod types;
pub mod util;

pub use error::{DashboardError, Result};
pub use filter::apply_filters;
pub use options::extract_options;
pub use reports::{group_by, group_records, regroup, regroup_for_report_type};
pub use types::{
    CellValue, Column, FilterOptions, FilterSelection, FlatRecord, GroupSummary, ReportType,
};
