//! Query results rendered for the chat assistant.
//!
//! The assistant sees a short text instead of the full result: the rows
//! themselves for schema discovery (SHOW/DESCRIBE), and only the schema and
//! row count for everything else.

use serde_json::Value;

use crate::result::{QueryResult, RowTable};

/// Tool name used when the caller has none.
pub const DEFAULT_TOOL_NAME: &str = "execute_sql_query";

const CELL_SEPARATOR: &str = "|";

/// Text the assistant receives for `query`'s outcome.
pub fn format_tool_result(query: &str, result: &QueryResult) -> String {
    match result {
        QueryResult::Failure { error } => format!("Error: {error}"),
        QueryResult::Success(table) if is_discovery_query(query) => format_rows(table),
        QueryResult::Success(table) => format_summary(table),
    }
}

/// Prefix tool content with the tool name, as the assistant protocol expects.
pub fn tool_message(function_name: Option<&str>, content: &str) -> String {
    format!(
        "{}:\n{}",
        function_name.unwrap_or(DEFAULT_TOOL_NAME),
        content
    )
}

fn is_discovery_query(query: &str) -> bool {
    let upper = query.trim().to_uppercase();
    upper.starts_with("SHOW") || upper.starts_with("DESCRIBE")
}

fn format_rows(table: &RowTable) -> String {
    let mut lines = vec![table.columns.join(CELL_SEPARATOR)];
    lines.extend(table.positional_rows().map(|row| {
        row.iter()
            .map(render_cell)
            .collect::<Vec<_>>()
            .join(CELL_SEPARATOR)
    }));
    format!("Query successful:\n\n{}", lines.join("\n"))
}

fn format_summary(table: &RowTable) -> String {
    format!(
        "Query successful.\n\n- Schema: {}\n- Rows: {}",
        table.columns.join(CELL_SEPARATOR),
        table.num_rows()
    )
}

fn render_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
