//! Normalized query results.
//!
//! Both transport formats end up as a [`RowTable`]: ordered column names, a
//! parallel list of engine type names, and rows keyed by column name.
//! [`QueryResult`] is the outward shape consumed by presentation and the
//! chat assistant.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// A single row, keyed by column name.
pub type Row = Map<String, Value>;

/// Row-oriented result table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RowTable {
    /// Column names, in declaration order.
    #[serde(default)]
    pub columns: Vec<String>,

    /// Engine type names, parallel to `columns`.
    #[serde(default, deserialize_with = "type_names")]
    pub types: Vec<String>,

    #[serde(default)]
    pub rows: Vec<Row>,
}

impl RowTable {
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Type name for a column, if the engine reported one.
    pub fn column_type(&self, index: usize) -> Option<&str> {
        self.types.get(index).map(String::as_str)
    }

    /// Rows as positional tuples in column order.
    ///
    /// Missing keys become `null`.
    pub fn positional_rows(&self) -> impl Iterator<Item = Vec<Value>> + '_ {
        self.rows.iter().map(|row| {
            self.columns
                .iter()
                .map(|name| row.get(name).cloned().unwrap_or(Value::Null))
                .collect()
        })
    }
}

/// Engines report type codes either as strings or as structured values.
fn type_names<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<Vec<Value>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|value| match value {
            Value::String(s) => s,
            other => other.to_string(),
        })
        .collect())
}

/// Outcome of a query, as handed to presentation layers.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    Success(RowTable),
    Failure { error: String },
}

impl QueryResult {
    pub fn failure(error: impl Into<String>) -> Self {
        Self::Failure {
            error: error.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn table(&self) -> Option<&RowTable> {
        match self {
            Self::Success(table) => Some(table),
            Self::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Success(_) => None,
            Self::Failure { error } => Some(error),
        }
    }
}

/// Serializes as `{success: true, columns, types, rows}` or
/// `{success: false, error}`.
impl Serialize for QueryResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Success(table) => {
                let mut map = serializer.serialize_map(Some(4))?;
                map.serialize_entry("success", &true)?;
                map.serialize_entry("columns", &table.columns)?;
                map.serialize_entry("types", &table.types)?;
                map.serialize_entry("rows", &table.rows)?;
                map.end()
            }
            Self::Failure { error } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("success", &false)?;
                map.serialize_entry("error", error)?;
                map.end()
            }
        }
    }
}
