//! SQL query builder for store filters.
//!
//! Renders a [`StorageFilter`] into a parameterized SQLite statement over the
//! `annotations` table, whose `doc` column holds each record as JSON.
//! Values are always bound as `?` parameters, never inlined.

use super::filters::{Condition, MatchOp, StorageFilter};

/// Build the SQL query for a filter.
///
/// Returns a tuple of (SQL SELECT statement, parameters). Rows come back in
/// insertion order.
///
/// # Examples
///
/// ```
/// use annosearch::search::{build_sql_query, parse, translate};
///
/// let filter = translate(&parse("creator:jane@example.org").unwrap()).unwrap();
/// let (sql, params) = build_sql_query(&filter);
/// assert!(sql.contains("WHERE"));
/// assert_eq!(params, vec!["jane@example.org".to_string()]);
/// ```
pub fn build_sql_query(filter: &StorageFilter) -> (String, Vec<String>) {
    let mut params = Vec::new();
    let where_clause = render(filter, &mut params);

    let sql = format!(
        "SELECT doc FROM annotations WHERE {} ORDER BY seq",
        where_clause
    );

    (sql, params)
}

fn render(filter: &StorageFilter, params: &mut Vec<String>) -> String {
    match filter {
        StorageFilter::Condition(condition) => render_condition(condition, params),
        StorageFilter::And(left, right) => {
            let left = render(left, params);
            let right = render(right, params);
            format!("({} AND {})", left, right)
        }
        StorageFilter::Or(left, right) => {
            let left = render(left, params);
            let right = render(right, params);
            format!("({} OR {})", left, right)
        }
        StorageFilter::Not(inner) => format!("(NOT {})", render(inner, params)),
    }
}

/// Render one condition.
///
/// Every condition evaluates to 0 or 1, never NULL, so `NOT` also matches
/// records where the attribute is missing.
fn render_condition(condition: &Condition, params: &mut Vec<String>) -> String {
    params.push(condition.value.clone());
    let path = condition.path.json_path();
    match condition.op {
        MatchOp::Equals => format!("coalesce(json_extract(doc, '{}') = ?, 0)", path),
        MatchOp::Contains => format!(
            "EXISTS (SELECT 1 FROM json_each(doc, '{}') WHERE json_each.value = ?)",
            path
        ),
    }
}
