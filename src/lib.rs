//! # sqlbench
//!
//! Query-execution bridge between a SQL workbench and a remote distributed
//! SQL engine.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │        Semantic compiler / CLI / chat assistant          │
//! └─────────────────────────────────────────────────────────┘
//!            │ run_sql                       │ read_url
//!            ▼                               ▼
//! ┌──────────────────────────┐   ┌──────────────────────────┐
//! │  engine::RemoteRunner     │   │  resource::ResourceReader │
//! │  + cache::DescribeCache   │   │  (5 min TTL, content key) │
//! └──────────────────────────┘   └──────────────────────────┘
//!            │                               │
//!            ▼ [sql: bypass / rewrite]       ▼ GET
//! ┌──────────────────────────┐
//! │  transport::QueryClient   │──► POST {base}/trino
//! └──────────────────────────┘
//!            │ arrow bytes | json rows
//!            ▼ [columnar]
//! ┌─────────────────────────────────────────────────────────┐
//! │        result::RowTable  →  {columns, types, rows}       │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`sql`]: metadata bypass, row-limit rewriting, read-only validation
//! - [`transport`]: wire protocol and HTTP client
//! - [`columnar`]: Arrow IPC decoding
//! - [`result`]: normalized result types
//! - [`cache`]: TTL caches with an injectable clock
//! - [`resource`]: cached semantic-model source reading
//! - [`engine`]: the semantic compiler's capability adapter
//! - [`tool_result`]: text rendering for the chat assistant
//! - [`config`]: settings file and environments

pub mod cache;
pub mod columnar;
pub mod config;
pub mod engine;
pub mod resource;
pub mod result;
pub mod sql;
pub mod tool_result;
pub mod transport;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::cache::{DescribeCache, ManualClock, TtlCache};
    pub use crate::config::Settings;
    pub use crate::engine::{
        EngineAdapter, RemoteRunner, RunSqlOptions, RunSqlResult, SemanticConnection, SqlRunner,
        UrlReader,
    };
    pub use crate::resource::{HttpFetcher, ResourceContents, ResourceReader};
    pub use crate::result::{QueryResult, RowTable};
    pub use crate::sql::{bound_query, is_metadata_command, rewrite_with_limit, validate_select_only};
    pub use crate::transport::{Credentials, HttpTransport, QueryClient, ResultFormat, Session};
}
