//! Transport to the remote SQL engine.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         QueryClient                             │
//! │  - metadata bypass / row-limit rewrite (crate::sql)             │
//! │  - builds a fresh QueryRequest per call                         │
//! │  - logs elapsed wall-clock time                                 │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//!                                ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                 QueryTransport (HttpTransport)                  │
//! │  POST {base}/trino  {query, user, password, environment,        │
//! │                      format, extraCredentials}                  │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//!               arrow bytes ─────┴───── JSON {columns, types, rows}
//! ```
//!
//! # Example
//!
//! ```ignore
//! use sqlbench::transport::*;
//!
//! let client = QueryClient::new(HttpTransport::new("http://localhost:8888"));
//! let session = Session::new(Credentials::new("alice", "secret"), "uat");
//!
//! let response = client
//!     .execute("SELECT * FROM orders", 1000, &session, ResultFormat::Arrow)
//!     .await?;
//! let table = response.into_table()?;
//! ```

mod client;
mod error;
mod http;
pub mod protocol;

pub use client::QueryClient;
pub use error::{TransportError, TransportResult};
pub use http::{HttpTransport, QueryTransport, DEFAULT_QUERY_PATH};
pub(crate) use http::join_url;
pub use protocol::{
    Credentials, ExtraCredential, QueryRequest, QueryResponse, ResultFormat, Session,
};
