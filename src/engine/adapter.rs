//! Compiler-facing connection assembled from the two capabilities.

use async_trait::async_trait;
use tracing::debug;

use super::capability::{RunSqlOptions, RunSqlResult, SqlRunner, UrlReader};
use super::schema::{statement_name, SchemaError, SqlBlockSchema};
use crate::resource::{ResourceContents, ResourceResult};

/// Dialect reported to the semantic compiler.
pub const DIALECT_NAME: &str = "trino";

/// What the semantic compiler calls.
#[async_trait]
pub trait SemanticConnection: Send + Sync {
    fn dialect_name(&self) -> &str;

    async fn run_sql(&self, sql: &str, options: &RunSqlOptions) -> RunSqlResult;

    async fn read_url(&self, locator: &str) -> ResourceResult<ResourceContents>;

    async fn invalidation_key(&self, locator: &str) -> ResourceResult<Option<String>>;

    async fn fetch_schema_for_sql_block(&self, sql: &str) -> Result<SqlBlockSchema, SchemaError>;
}

/// Delegates SQL to `R` and resources to `U`.
pub struct EngineAdapter<R, U> {
    runner: R,
    reader: U,
}

impl<R: SqlRunner, U: UrlReader> EngineAdapter<R, U> {
    pub fn new(runner: R, reader: U) -> Self {
        Self { runner, reader }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn reader(&self) -> &U {
        &self.reader
    }
}

#[async_trait]
impl<R: SqlRunner, U: UrlReader> SemanticConnection for EngineAdapter<R, U> {
    fn dialect_name(&self) -> &str {
        DIALECT_NAME
    }

    async fn run_sql(&self, sql: &str, options: &RunSqlOptions) -> RunSqlResult {
        self.runner.run_sql(sql, options).await
    }

    async fn read_url(&self, locator: &str) -> ResourceResult<ResourceContents> {
        self.reader.read_url(locator).await
    }

    async fn invalidation_key(&self, locator: &str) -> ResourceResult<Option<String>> {
        self.reader.invalidation_key(locator).await
    }

    async fn fetch_schema_for_sql_block(&self, sql: &str) -> Result<SqlBlockSchema, SchemaError> {
        let name = statement_name();
        debug!(statement = %name, "describing SQL block");

        let prepared = self
            .runner
            .run_sql(
                &format!("PREPARE {name} FROM {sql}"),
                &RunSqlOptions::passthrough(),
            )
            .await;
        if let Some(error) = prepared.error {
            return Err(SchemaError::Prepare(error));
        }

        let described = self
            .runner
            .run_sql(&format!("DESCRIBE OUTPUT {name}"), &RunSqlOptions::default())
            .await;
        if let Some(error) = described.error {
            return Err(SchemaError::Describe(error));
        }

        Ok(SqlBlockSchema::from_describe_output(&described))
    }
}
