//! Read-only query validation.
//!
//! Used to gate SQL issued on the user's behalf (for example by the chat
//! assistant): only SELECT, DESCRIBE and SHOW statements are accepted.

use sqlparser::ast::{Query, SetExpr, Statement};
use sqlparser::parser::Parser;
use thiserror::Error;

use super::parser_dialect;

/// Why a query was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Empty query")]
    Empty,

    #[error("{operation} operations are not allowed. Only SELECT queries are permitted.")]
    Disallowed {
        /// Leading keyword of the offending statement, uppercased.
        operation: String,
    },

    #[error("SQL parsing failed: {0}")]
    Parse(String),
}

/// Check that `sql` only reads data.
///
/// Every statement of a multi-statement batch must pass; the first violation
/// is returned.
pub fn validate_select_only(sql: &str) -> Result<(), ValidationError> {
    if is_single_metadata_statement(sql) {
        return Ok(());
    }

    let trimmed = sql.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty);
    }

    let statements = Parser::parse_sql(&parser_dialect(), trimmed)
        .map_err(|e| ValidationError::Parse(e.to_string()))?;

    statements.iter().try_for_each(validate_statement)
}

/// DESCRIBE/SHOW dialect variants the parser may not know (e.g. `SHOW
/// CATALOGS`, `DESCRIBE OUTPUT`) are accepted as long as there is no
/// statement separator.
fn is_single_metadata_statement(sql: &str) -> bool {
    let upper = sql.trim_start().to_uppercase();
    (upper.starts_with("DESCRIBE ") || upper.starts_with("SHOW ")) && !sql.contains(';')
}

fn validate_statement(statement: &Statement) -> Result<(), ValidationError> {
    if let Statement::Query(query) = statement {
        return validate_query(query);
    }

    let operation = leading_keyword(statement);
    match operation.as_str() {
        "SHOW" | "DESCRIBE" | "DESC" => Ok(()),
        _ => Err(ValidationError::Disallowed { operation }),
    }
}

/// A query statement may still carry a write: `WITH ... INSERT` and
/// `WITH ... UPDATE` parse as queries whose body is the DML statement.
fn validate_query(query: &Query) -> Result<(), ValidationError> {
    if let Some(with) = &query.with {
        for cte in &with.cte_tables {
            validate_query(&cte.query)?;
        }
    }
    validate_set_expr(&query.body)
}

fn validate_set_expr(body: &SetExpr) -> Result<(), ValidationError> {
    match body {
        SetExpr::Query(query) => validate_query(query),
        SetExpr::SetOperation { left, right, .. } => {
            validate_set_expr(left)?;
            validate_set_expr(right)
        }
        SetExpr::Insert(statement) | SetExpr::Update(statement) => {
            Err(ValidationError::Disallowed {
                operation: leading_keyword(statement),
            })
        }
        _ => Ok(()),
    }
}

fn leading_keyword(statement: &Statement) -> String {
    statement
        .to_string()
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_uppercase()
}
