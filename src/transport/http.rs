//! HTTP transport to the query server.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::error::{TransportError, TransportResult};
use super::protocol::{ErrorBody, JsonResultBody, QueryRequest, QueryResponse, ResultFormat};

/// Default path of the query endpoint on the server.
pub const DEFAULT_QUERY_PATH: &str = "/trino";

/// Sends a single query request and returns the undecoded response.
///
/// Implemented by [`HttpTransport`]; tests substitute in-memory fakes.
#[async_trait]
pub trait QueryTransport: Send + Sync {
    async fn send(&self, request: QueryRequest) -> TransportResult<QueryResponse>;
}

#[async_trait]
impl<T: QueryTransport + ?Sized> QueryTransport for Arc<T> {
    async fn send(&self, request: QueryRequest) -> TransportResult<QueryResponse> {
        (**self).send(request).await
    }
}

/// JSON-over-HTTP transport.
///
/// # Example
///
/// ```ignore
/// use sqlbench::transport::{HttpTransport, QueryClient};
///
/// let client = QueryClient::new(HttpTransport::new("http://localhost:8888"));
/// ```
#[derive(Clone)]
pub struct HttpTransport {
    endpoint: String,
    http_client: reqwest::Client,
}

impl HttpTransport {
    /// Transport for `{base_url}/trino`.
    pub fn new(base_url: &str) -> Self {
        Self::with_path(base_url, DEFAULT_QUERY_PATH)
    }

    pub fn with_path(base_url: &str, path: &str) -> Self {
        Self::with_client(join_url(base_url, path), reqwest::Client::new())
    }

    /// Use a preconfigured client (proxies, TLS roots, timeouts).
    pub fn with_client(endpoint: impl Into<String>, http_client: reqwest::Client) -> Self {
        Self {
            endpoint: endpoint.into(),
            http_client,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl QueryTransport for HttpTransport {
    async fn send(&self, request: QueryRequest) -> TransportResult<QueryResponse> {
        debug!(endpoint = %self.endpoint, format = %request.format, "sending query");

        let response = self
            .http_client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = error_from_body(status.as_u16(), body);
            warn!(status = status.as_u16(), error = %err, "query server returned an error");
            return Err(err);
        }

        match request.format {
            ResultFormat::Arrow => {
                let bytes = response.bytes().await?;
                Ok(QueryResponse::Columnar(bytes.to_vec()))
            }
            ResultFormat::Json => {
                let bytes = response.bytes().await?;
                let body: JsonResultBody = serde_json::from_slice(&bytes)?;
                body.into_response()
            }
        }
    }
}

/// Prefer the server's `{"error": ...}` message; fall back to the raw body.
fn error_from_body(status: u16, body: String) -> TransportError {
    match serde_json::from_str::<ErrorBody>(&body) {
        Ok(ErrorBody {
            error: Some(message),
        }) => TransportError::Engine {
            status: Some(status),
            message,
        },
        _ => TransportError::Status { status, body },
    }
}

pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
