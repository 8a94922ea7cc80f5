//! Row-limit rewriting for ad-hoc queries.
//!
//! Every interactive query is bounded before it reaches the engine. The
//! rewriter wraps the user's SQL in an outer `SELECT * FROM (...) LIMIT n`,
//! with two refinements:
//!
//! - A query that already carries a `LIMIT` (or `FETCH FIRST`) no larger than
//!   the requested bound is sent unchanged.
//! - A query with an `ORDER BY` has that clause re-applied on the outer
//!   select, since ordering inside a derived table is not guaranteed to
//!   survive the wrap.
//!
//! Anything the parser cannot make sense of is wrapped unconditionally.
//!
//! ```text
//! SELECT id FROM users ORDER BY id DESC      (limit 50)
//!                  │
//!                  ▼
//! SELECT * FROM (
//! SELECT id FROM users ORDER BY id DESC
//! ) ORDER BY id DESC LIMIT 50
//! ```

use sqlparser::ast::{OrderByExpr, Query, Statement};
use sqlparser::parser::Parser;
use tracing::{debug, warn};

use super::parser_dialect;

/// Statement prefixes that are never row-limited.
const METADATA_PREFIXES: [&str; 3] = ["SHOW ", "DESCRIBE ", "EXPLAIN "];

/// Returns true for SHOW, DESCRIBE and EXPLAIN commands.
///
/// Matching is case-insensitive and ignores surrounding whitespace.
pub fn is_metadata_command(sql: &str) -> bool {
    let upper = sql.trim().to_uppercase();
    METADATA_PREFIXES
        .iter()
        .any(|prefix| upper.starts_with(prefix))
}

/// Returns true for SHOW and DESCRIBE commands, whose results are cached.
pub fn is_introspection_command(sql: &str) -> bool {
    let upper = sql.trim().to_uppercase();
    upper.starts_with("SHOW ") || upper.starts_with("DESCRIBE ")
}

/// Apply the metadata bypass, then the row-limit rewrite.
///
/// This is the SQL that actually goes over the wire for a bounded query.
pub fn bound_query(sql: &str, limit: u64) -> String {
    if is_metadata_command(sql) {
        sql.to_string()
    } else {
        rewrite_with_limit(sql, limit)
    }
}

/// Rewrite `sql` so that it returns at most `limit` rows.
///
/// Never fails: parse errors, multi-statement batches and non-query
/// statements all fall back to plain wrapping. Trailing semicolons are
/// dropped so they never end up inside the subselect.
pub fn rewrite_with_limit(sql: &str, limit: u64) -> String {
    let sql = strip_trailing_semicolons(sql);
    let statements = match Parser::parse_sql(&parser_dialect(), sql) {
        Ok(statements) => statements,
        Err(e) => {
            warn!(error = %e, "SQL parsing failed, falling back to simple wrapping");
            return wrap(sql, limit);
        }
    };

    match statements.as_slice() {
        [Statement::Query(query)] => rewrite_query(query, sql, limit),
        [_] => {
            debug!("not a query statement, wrapping");
            wrap(sql, limit)
        }
        _ => {
            debug!(statements = statements.len(), "multi-statement input, wrapping");
            wrap(sql, limit)
        }
    }
}

fn rewrite_query(query: &Query, original: &str, limit: u64) -> String {
    if let Some(existing) = existing_limit(query) {
        if existing <= limit {
            return original.to_string();
        }
    }

    if let Some(order_by) = &query.order_by {
        if !order_by.exprs.is_empty() {
            match render_order_by(&order_by.exprs) {
                Some(clause) => {
                    return format!(
                        "SELECT * FROM (\n{original}\n) ORDER BY {clause} LIMIT {limit}"
                    );
                }
                None => warn!("failed to re-render ORDER BY clause, using plain wrapping"),
            }
        }
    }

    wrap(original, limit)
}

/// The numeric row bound already present on the query, if any.
///
/// Non-literal bounds (`LIMIT ALL`, parameters, expressions) count as absent.
fn existing_limit(query: &Query) -> Option<u64> {
    let limit = query
        .limit
        .as_ref()
        .and_then(|expr| expr.to_string().parse::<u64>().ok());

    let fetch = query
        .fetch
        .as_ref()
        .filter(|fetch| !fetch.percent)
        .and_then(|fetch| fetch.quantity.as_ref())
        .and_then(|expr| expr.to_string().parse::<u64>().ok());

    match (limit, fetch) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

/// Render ORDER BY items through the parser's printer.
///
/// The rendered clause is re-parsed on a throwaway select; if it does not
/// survive the round trip it is not safe to emit on the outer query.
fn render_order_by(exprs: &[OrderByExpr]) -> Option<String> {
    let clause = exprs
        .iter()
        .map(|expr| expr.to_string())
        .collect::<Vec<_>>()
        .join(", ");

    let probe = format!("SELECT 1 FROM probe ORDER BY {clause}");
    let statements = Parser::parse_sql(&parser_dialect(), &probe).ok()?;
    match statements.as_slice() {
        [Statement::Query(query)] => {
            let reparsed = query.order_by.as_ref()?;
            Some(
                reparsed
                    .exprs
                    .iter()
                    .map(|expr| expr.to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
            )
        }
        _ => None,
    }
}

fn strip_trailing_semicolons(sql: &str) -> &str {
    sql.trim_end_matches(|c: char| c == ';' || c.is_whitespace())
}

fn wrap(sql: &str, limit: u64) -> String {
    format!("SELECT * FROM (\n{sql}\n) LIMIT {limit}")
}
