//! Query client: rewrite, send, and time a query.

use std::time::Instant;

use tracing::{debug, info, warn};

use super::error::TransportResult;
use super::http::QueryTransport;
use super::protocol::{QueryRequest, QueryResponse, ResultFormat, Session};
use crate::result::QueryResult;
use crate::sql::bound_query;

/// Executes SQL against the remote engine through a [`QueryTransport`].
///
/// Bounded queries go through the metadata bypass and the row-limit
/// rewriter before being sent. Columnar responses are returned undecoded so
/// callers that want raw Arrow bytes (e.g. to bulk-load a local store) can
/// have them; use [`QueryResponse::into_table`] or [`Self::query_table`]
/// for rows.
pub struct QueryClient<T> {
    transport: T,
}

impl<T: QueryTransport> QueryClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Run `sql` with at most `limit` rows.
    pub async fn execute(
        &self,
        sql: &str,
        limit: u64,
        session: &Session,
        format: ResultFormat,
    ) -> TransportResult<QueryResponse> {
        let final_sql = bound_query(sql, limit);
        if final_sql != sql {
            debug!(sql = %final_sql, "rewritten query");
        }
        self.send(final_sql, session, format).await
    }

    /// Run a statement exactly as given, without row-limit rewriting.
    ///
    /// For statements whose result is not a row set, such as `PREPARE`.
    pub async fn execute_statement(
        &self,
        sql: &str,
        session: &Session,
        format: ResultFormat,
    ) -> TransportResult<QueryResponse> {
        self.send(sql.to_string(), session, format).await
    }

    /// Execute and decode into the outward `{success, ...}` shape.
    pub async fn query_table(
        &self,
        sql: &str,
        limit: u64,
        session: &Session,
        format: ResultFormat,
    ) -> QueryResult {
        let response = match self.execute(sql, limit, session, format).await {
            Ok(response) => response,
            Err(e) => return QueryResult::failure(e.to_string()),
        };

        match response.into_table() {
            Ok(table) => QueryResult::Success(table),
            Err(e) => {
                warn!(error = %e, "failed to decode query result");
                QueryResult::failure(e.to_string())
            }
        }
    }

    async fn send(
        &self,
        sql: String,
        session: &Session,
        format: ResultFormat,
    ) -> TransportResult<QueryResponse> {
        info!(
            sql = %preview(&sql),
            user = %session.credentials.principal,
            environment = %session.environment,
            %format,
            "running query"
        );

        let request = QueryRequest::new(sql, session, format);
        let start = Instant::now();
        let result = self.transport.send(request).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        match &result {
            Ok(_) => debug!(elapsed_ms, "query finished"),
            Err(e) if e.is_engine_error() => info!(elapsed_ms, error = %e, "query rejected"),
            Err(e) => warn!(elapsed_ms, retriable = e.is_retriable(), error = %e, "query failed"),
        }
        result
    }
}

/// Single-line SQL preview for logs.
fn preview(sql: &str) -> String {
    let flat = sql.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() > 80 {
        format!("{}...", flat.chars().take(80).collect::<String>())
    } else {
        flat
    }
}
