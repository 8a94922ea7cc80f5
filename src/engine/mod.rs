//! Semantic-engine adapter.
//!
//! Implements the semantic compiler's capability pair on top of the
//! transport, decoder and caches:
//!
//! ```text
//! SemanticConnection (EngineAdapter)
//!   ├── run_sql ────────► SqlRunner (RemoteRunner)
//!   │                        ├── DescribeCache (DESCRIBE/SHOW only)
//!   │                        └── QueryClient ─► QueryTransport
//!   ├── read_url ───────► UrlReader (ResourceReader)
//!   └── fetch_schema_for_sql_block
//!          PREPARE <name> FROM <sql>; DESCRIBE OUTPUT <name>
//! ```
//!
//! Query failures come back as [`RunSqlResult::error`]; only resource reads
//! and schema lookups return `Err`.

mod adapter;
mod capability;
mod runner;
mod schema;

pub use adapter::{EngineAdapter, SemanticConnection, DIALECT_NAME};
pub use capability::{ColumnInfo, RunSqlOptions, RunSqlResult, SqlRunner, UrlReader};
pub use runner::{RemoteRunner, DEFAULT_ROW_LIMIT};
pub use schema::{statement_name, FieldKind, SchemaError, SchemaField, SqlBlockSchema};
