//! Query description for operator console listings.

use akademik_core::admin::OrderTerm;
use akademik_core::types::Timestamp;

/// A single listing filter on a console field.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleFilter {
    /// The column's text form equals `value` (e.g. `"true"`, `"dosen"`, `"3"`).
    Equals { field: &'static str, value: String },
    /// The column is NULL.
    IsNull { field: &'static str },
    /// The timestamp column falls in `[start, end)`.
    Range {
        field: &'static str,
        start: Timestamp,
        end: Timestamp,
    },
}

/// Search, filters, ordering and paging for one console listing.
///
/// Field names are the console's names (`user__full_name`, `dosen_wali`, ...);
/// each repository maps them onto SQL columns.
#[derive(Debug, Clone)]
pub struct ConsoleQuery {
    /// Whitespace-separated terms; every term must match at least one search field.
    pub search: Option<String>,
    pub search_fields: &'static [&'static str],
    pub filters: Vec<ConsoleFilter>,
    pub ordering: Vec<OrderTerm>,
    pub limit: i64,
    pub offset: i64,
}
