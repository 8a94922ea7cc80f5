//! Wire types for the query server.
//!
//! The server accepts a JSON POST and answers with either an Arrow IPC
//! stream (`format = "arrow"`) or a JSON table (`format = "json"`). Failures
//! come back as `{"error": "..."}` with a non-2xx status.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::TransportError;
use crate::columnar::{self, DecodeResult};
use crate::result::RowTable;

// ============================================================================
// Request
// ============================================================================

/// Result encoding requested from the server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultFormat {
    /// Columnar Arrow IPC stream.
    #[default]
    Arrow,
    /// Row-oriented JSON.
    Json,
}

impl ResultFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Arrow => "arrow",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for ResultFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResultFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "arrow" => Ok(Self::Arrow),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown result format: {other}")),
        }
    }
}

/// Principal and secret forwarded to the engine.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub principal: String,
    pub secret: String,
}

impl Credentials {
    pub fn new(principal: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            principal: principal.into(),
            secret: secret.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("principal", &self.principal)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Opaque key/value pair forwarded as an engine extra credential.
pub type ExtraCredential = (String, String);

/// Who runs queries, and where.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub credentials: Credentials,
    /// Target environment id (e.g. "uat").
    pub environment: String,
    pub extra_credentials: Vec<ExtraCredential>,
}

impl Session {
    pub fn new(credentials: Credentials, environment: impl Into<String>) -> Self {
        Self {
            credentials,
            environment: environment.into(),
            extra_credentials: Vec::new(),
        }
    }

    pub fn with_extra_credentials(mut self, extra: Vec<ExtraCredential>) -> Self {
        self.extra_credentials = extra;
        self
    }
}

/// Body of a query POST. Built fresh for every execution.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    /// Final SQL, after any rewriting.
    pub query: String,
    pub user: String,
    pub password: String,
    pub environment: String,
    pub format: ResultFormat,
    /// Serialized as `[[key, value], ...]`.
    pub extra_credentials: Vec<ExtraCredential>,
}

impl QueryRequest {
    pub fn new(sql: impl Into<String>, session: &Session, format: ResultFormat) -> Self {
        Self {
            query: sql.into(),
            user: session.credentials.principal.clone(),
            password: session.credentials.secret.clone(),
            environment: session.environment.clone(),
            format,
            extra_credentials: session.extra_credentials.clone(),
        }
    }
}

impl fmt::Debug for QueryRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryRequest")
            .field("query", &self.query)
            .field("user", &self.user)
            .field("environment", &self.environment)
            .field("format", &self.format)
            .field("extra_credentials", &self.extra_credentials.len())
            .finish()
    }
}

// ============================================================================
// Response
// ============================================================================

/// Successful server answer, before any decoding.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResponse {
    /// Raw Arrow IPC stream bytes.
    Columnar(Vec<u8>),
    /// Already row-oriented JSON table.
    Table(RowTable),
}

impl QueryResponse {
    /// Normalize to a row table, decoding columnar payloads.
    pub fn into_table(self) -> DecodeResult<RowTable> {
        match self {
            Self::Columnar(bytes) => columnar::decode(&bytes),
            Self::Table(table) => Ok(table),
        }
    }
}

/// Error body on non-success responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

/// JSON success body: `{success?, columns, types, rows, error?}`.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonResultBody {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(flatten)]
    pub table: RowTable,
}

impl JsonResultBody {
    /// Some servers report engine errors inside a 200 body.
    pub fn into_response(self) -> Result<QueryResponse, TransportError> {
        match (self.error, self.success) {
            (Some(message), _) => Err(TransportError::engine(message)),
            (None, Some(false)) => Err(TransportError::engine("query failed")),
            (None, _) => Ok(QueryResponse::Table(self.table)),
        }
    }
}
