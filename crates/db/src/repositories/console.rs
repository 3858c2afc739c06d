//! Dynamic WHERE / ORDER BY construction for console listings.
//!
//! Repositories supply a mapping from console field names to SQL column
//! expressions; values are always bound, never interpolated.

use akademik_core::search::contains_pattern;
use akademik_core::types::Timestamp;
use sqlx::postgres::PgArguments;
use sqlx::query::QueryAs;
use sqlx::Postgres;

use crate::models::console::{ConsoleFilter, ConsoleQuery};

/// A positional parameter produced while building the clauses.
pub(crate) enum Bind {
    Text(String),
    Timestamp(Timestamp),
}

/// Generated clauses plus the binds they reference, in order.
pub(crate) struct ConsoleSql {
    pub where_clause: String,
    pub order_clause: String,
    pub binds: Vec<Bind>,
    /// Next free `$n` index (for LIMIT / OFFSET).
    pub next_idx: u32,
}

impl ConsoleSql {
    /// Attach the collected binds, then `limit` and `offset`, to `query`.
    pub fn bind_to<'q, O>(
        self,
        mut query: QueryAs<'q, Postgres, O, PgArguments>,
        limit: i64,
        offset: i64,
    ) -> QueryAs<'q, Postgres, O, PgArguments> {
        for bind in self.binds {
            query = match bind {
                Bind::Text(value) => query.bind(value),
                Bind::Timestamp(value) => query.bind(value),
            };
        }
        query.bind(limit).bind(offset)
    }

    /// `LIMIT $n OFFSET $n+1` using the next free indices.
    pub fn page_clause(&self) -> String {
        format!("LIMIT ${} OFFSET ${}", self.next_idx, self.next_idx + 1)
    }
}

fn unknown(field: &str) -> sqlx::Error {
    sqlx::Error::ColumnNotFound(field.to_string())
}

/// Build the clauses for `query`.
///
/// `column` maps a console field to a column expression; `tiebreaker` is
/// appended to the ORDER BY so paging is stable.
pub(crate) fn build(
    query: &ConsoleQuery,
    column: impl Fn(&str) -> Option<&'static str>,
    tiebreaker: &str,
) -> Result<ConsoleSql, sqlx::Error> {
    let mut conditions = Vec::new();
    let mut binds = Vec::new();
    let mut bind_idx = 1u32;

    if let Some(search) = &query.search {
        for term in search.split_whitespace() {
            let ors = query
                .search_fields
                .iter()
                .map(|f| {
                    column(f)
                        .map(|col| format!("{col} ILIKE ${bind_idx} ESCAPE '\\'"))
                        .ok_or_else(|| unknown(f))
                })
                .collect::<Result<Vec<_>, _>>()?;
            if ors.is_empty() {
                continue;
            }
            conditions.push(format!("({})", ors.join(" OR ")));
            binds.push(Bind::Text(contains_pattern(term)));
            bind_idx += 1;
        }
    }

    for filter in &query.filters {
        match filter {
            ConsoleFilter::Equals { field, value } => {
                let col = column(field).ok_or_else(|| unknown(field))?;
                conditions.push(format!("CAST({col} AS TEXT) = ${bind_idx}"));
                binds.push(Bind::Text(value.clone()));
                bind_idx += 1;
            }
            ConsoleFilter::IsNull { field } => {
                let col = column(field).ok_or_else(|| unknown(field))?;
                conditions.push(format!("{col} IS NULL"));
            }
            ConsoleFilter::Range { field, start, end } => {
                let col = column(field).ok_or_else(|| unknown(field))?;
                conditions.push(format!(
                    "{col} >= ${bind_idx} AND {col} < ${}",
                    bind_idx + 1
                ));
                binds.push(Bind::Timestamp(*start));
                binds.push(Bind::Timestamp(*end));
                bind_idx += 2;
            }
        }
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    let mut order_terms = query
        .ordering
        .iter()
        .map(|term| {
            let col = column(term.field).ok_or_else(|| unknown(term.field))?;
            let dir = if term.descending { "DESC" } else { "ASC" };
            Ok(format!("{col} {dir}"))
        })
        .collect::<Result<Vec<_>, sqlx::Error>>()?;
    order_terms.push(format!("{tiebreaker} DESC"));
    let order_clause = format!("ORDER BY {}", order_terms.join(", "));

    tracing::debug!(%where_clause, %order_clause, "Built console listing clauses");

    Ok(ConsoleSql {
        where_clause,
        order_clause,
        binds,
        next_idx: bind_idx,
    })
}
