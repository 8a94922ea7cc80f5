//! Capability contracts the semantic compiler is written against.
//!
//! The compiler needs exactly two things from an engine: run SQL and read a
//! named resource. Both are small traits so the adapter can be assembled by
//! composition.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::resource::{ResourceContents, ResourceFetcher, ResourceReader, ResourceResult};
use crate::result::RowTable;

/// Per-call options for [`SqlRunner::run_sql`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSqlOptions {
    /// Row cap. `None` uses the runner's default limit and skips truncation.
    pub row_limit: Option<u64>,

    /// Send the statement as written, without row-limit rewriting.
    pub passthrough: bool,
}

impl RunSqlOptions {
    pub fn with_row_limit(row_limit: u64) -> Self {
        Self {
            row_limit: Some(row_limit),
            passthrough: false,
        }
    }

    pub fn passthrough() -> Self {
        Self {
            row_limit: None,
            passthrough: true,
        }
    }
}

/// A named, typed output column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
}

/// Columns plus positional rows, or an error message.
///
/// Execution failures are reported here instead of as `Err` so the compiler
/// can inspect every outcome the same way.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSqlResult {
    pub columns: Vec<ColumnInfo>,
    pub rows: Vec<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RunSqlResult {
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
            error: Some(message.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Positional view of `table`, keeping at most `row_limit` rows.
    pub fn from_table(table: &RowTable, row_limit: Option<u64>) -> Self {
        let columns = table
            .columns
            .iter()
            .enumerate()
            .map(|(index, name)| ColumnInfo {
                name: name.clone(),
                type_name: table.column_type(index).unwrap_or_default().to_string(),
            })
            .collect();

        let cap = row_limit
            .and_then(|limit| usize::try_from(limit).ok())
            .unwrap_or(usize::MAX);
        let rows = table.positional_rows().take(cap).collect();

        Self {
            columns,
            rows,
            error: None,
        }
    }

    /// Index of a column by case-insensitive name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|column| column.name.eq_ignore_ascii_case(name))
    }
}

/// Executes SQL for the compiler.
#[async_trait]
pub trait SqlRunner: Send + Sync {
    async fn run_sql(&self, sql: &str, options: &RunSqlOptions) -> RunSqlResult;
}

#[async_trait]
impl<T: SqlRunner + ?Sized> SqlRunner for Arc<T> {
    async fn run_sql(&self, sql: &str, options: &RunSqlOptions) -> RunSqlResult {
        (**self).run_sql(sql, options).await
    }
}

/// Reads named resources for the compiler.
#[async_trait]
pub trait UrlReader: Send + Sync {
    async fn read_url(&self, locator: &str) -> ResourceResult<ResourceContents>;

    async fn invalidation_key(&self, locator: &str) -> ResourceResult<Option<String>> {
        self.read_url(locator)
            .await
            .map(|read| read.invalidation_key)
    }
}

#[async_trait]
impl<T: UrlReader + ?Sized> UrlReader for Arc<T> {
    async fn read_url(&self, locator: &str) -> ResourceResult<ResourceContents> {
        (**self).read_url(locator).await
    }

    async fn invalidation_key(&self, locator: &str) -> ResourceResult<Option<String>> {
        (**self).invalidation_key(locator).await
    }
}

#[async_trait]
impl<F: ResourceFetcher> UrlReader for ResourceReader<F> {
    async fn read_url(&self, locator: &str) -> ResourceResult<ResourceContents> {
        self.read_resource(locator).await
    }

    async fn invalidation_key(&self, locator: &str) -> ResourceResult<Option<String>> {
        ResourceReader::invalidation_key(self, locator).await
    }
}
