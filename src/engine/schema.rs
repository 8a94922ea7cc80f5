//! Output schemas of ad-hoc SQL blocks.
//!
//! The engine reports a query's output columns through
//! `PREPARE <name> FROM <sql>` followed by `DESCRIBE OUTPUT <name>`. The
//! statement name is random per call and never reused.

use rand::distr::Alphanumeric;
use rand::Rng;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use super::capability::RunSqlResult;

const STATEMENT_PREFIX: &str = "sqlbench_stmt_";
const STATEMENT_SUFFIX_LEN: usize = 21;

/// Fresh prepared-statement name, e.g. `sqlbench_stmt_Xb3k...`.
pub fn statement_name() -> String {
    let suffix: String = rand::rng()
        .sample_iter(Alphanumeric)
        .take(STATEMENT_SUFFIX_LEN)
        .map(char::from)
        .collect();
    format!("{STATEMENT_PREFIX}{suffix}")
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("failed to prepare query: {0}")]
    Prepare(String),

    #[error("failed to describe query output: {0}")]
    Describe(String),
}

/// Compiler-facing category of an engine type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    String,
    Number,
    Boolean,
    Date,
    Timestamp,
    Json,
    Unsupported,
}

impl FieldKind {
    /// Classify an engine type name such as `varchar(10)` or
    /// `timestamp(3) with time zone`.
    pub fn from_engine_type(raw: &str) -> Self {
        let lower = raw.trim().to_ascii_lowercase();
        let base = lower
            .split(|c: char| c == '(' || c.is_whitespace())
            .next()
            .unwrap_or_default();

        match base {
            "varchar" | "char" | "uuid" | "ipaddress" => Self::String,
            "tinyint" | "smallint" | "integer" | "int" | "bigint" | "real" | "double"
            | "decimal" => Self::Number,
            "boolean" => Self::Boolean,
            "date" => Self::Date,
            "timestamp" => Self::Timestamp,
            "json" => Self::Json,
            _ => Self::Unsupported,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaField {
    pub name: String,
    pub raw_type: String,
    pub kind: FieldKind,
}

/// Output columns of a SQL block, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SqlBlockSchema {
    pub fields: Vec<SchemaField>,
}

impl SqlBlockSchema {
    /// Build from a `DESCRIBE OUTPUT` result.
    ///
    /// Columns are found by header (`Column Name`, `Type`); unnamed results
    /// fall back to the engine's fixed positions (0 and 4). Rows without a
    /// name are skipped.
    pub fn from_describe_output(result: &RunSqlResult) -> Self {
        let name_index = result.column_index("Column Name").unwrap_or(0);
        let type_index = result.column_index("Type").unwrap_or(4);

        let fields = result
            .rows
            .iter()
            .filter_map(|row| {
                let name = row.get(name_index).and_then(Value::as_str)?;
                let raw_type = row
                    .get(type_index)
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                Some(SchemaField {
                    name: name.to_string(),
                    raw_type: raw_type.to_string(),
                    kind: FieldKind::from_engine_type(raw_type),
                })
            })
            .collect();

        Self { fields }
    }

    pub fn field(&self, name: &str) -> Option<&SchemaField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
