//! SQL runner backed by the remote query endpoint.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::capability::{RunSqlOptions, RunSqlResult, SqlRunner};
use crate::cache::{describe_cache_key, DescribeCache};
use crate::result::RowTable;
use crate::sql::is_introspection_command;
use crate::transport::{QueryClient, QueryTransport, ResultFormat, Session};

/// Row limit used when the caller does not pass one.
pub const DEFAULT_ROW_LIMIT: u64 = 1000;

/// Runs SQL for one user session, with DESCRIBE/SHOW results served from a
/// shared [`DescribeCache`].
pub struct RemoteRunner<T> {
    client: QueryClient<T>,
    describe_cache: Arc<DescribeCache>,
    session: Session,
    default_limit: u64,
    format: ResultFormat,
}

impl<T: QueryTransport> RemoteRunner<T> {
    pub fn new(transport: T, session: Session, describe_cache: Arc<DescribeCache>) -> Self {
        Self {
            client: QueryClient::new(transport),
            describe_cache,
            session,
            default_limit: DEFAULT_ROW_LIMIT,
            format: ResultFormat::Json,
        }
    }

    pub fn with_default_limit(mut self, default_limit: u64) -> Self {
        self.default_limit = default_limit;
        self
    }

    pub fn with_format(mut self, format: ResultFormat) -> Self {
        self.format = format;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn client(&self) -> &QueryClient<T> {
        &self.client
    }

    fn cache_key(&self, sql: &str) -> Option<String> {
        is_cacheable(sql).then(|| {
            describe_cache_key(
                &self.session.environment,
                &self.session.credentials.principal,
                sql,
            )
        })
    }

    async fn fetch_table(&self, sql: &str, options: &RunSqlOptions) -> Result<RowTable, String> {
        let response = if options.passthrough {
            self.client
                .execute_statement(sql, &self.session, self.format)
                .await
        } else {
            let limit = options.row_limit.unwrap_or(self.default_limit);
            self.client
                .execute(sql, limit, &self.session, self.format)
                .await
        };

        response.map_err(|e| e.to_string())?.into_table().map_err(|e| {
            warn!(error = %e, "failed to decode query result");
            e.to_string()
        })
    }
}

/// DESCRIBE/SHOW results are cached. `DESCRIBE OUTPUT` names a per-call
/// prepared statement, so it never repeats.
fn is_cacheable(sql: &str) -> bool {
    is_introspection_command(sql)
        && !sql
            .trim_start()
            .to_uppercase()
            .starts_with("DESCRIBE OUTPUT ")
}

#[async_trait]
impl<T: QueryTransport> SqlRunner for RemoteRunner<T> {
    async fn run_sql(&self, sql: &str, options: &RunSqlOptions) -> RunSqlResult {
        let cache_key = self.cache_key(sql);

        if let Some(key) = &cache_key {
            if let Some(table) = self.describe_cache.get(key) {
                debug!("serving introspection result from cache");
                return RunSqlResult::from_table(&table, options.row_limit);
            }
        }

        let table = match self.fetch_table(sql, options).await {
            Ok(table) => table,
            Err(message) => return RunSqlResult::failed(message),
        };

        if let Some(key) = cache_key {
            self.describe_cache.put(key, table.clone());
        }
        RunSqlResult::from_table(&table, options.row_limit)
    }
}
