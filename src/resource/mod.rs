//! Semantic-model source reading with caching.
//!
//! The semantic compiler asks for model files by locator and gets back the
//! text plus an invalidation key it uses to decide whether to re-parse.
//!
//! ```text
//! locator ──► ResourceReader ──(miss)──► resolve ──► ResourceFetcher (GET)
//!                  │                        │
//!                  │ (hit)                  └─ internal:// and malloy:// map
//!                  ▼                           to same-origin asset paths
//!       {contents, invalidation_key}
//! ```
//!
//! Invalidation keys are `None` for internal locators (treated as
//! immutable) and a SHA-256 content hash for everything else.

mod fetch;
mod reader;

pub use fetch::{HttpFetcher, ResourceFetcher};
pub use reader::{
    invalidation_key_for, is_internal_locator, resolve_locator, ResourceContents, ResourceReader,
    INTERNAL_SCHEMES, RESOURCE_CACHE_TTL,
};

/// Result type for resource reads.
pub type ResourceResult<T> = Result<T, ResourceError>;

/// Why a fetch failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP {status} {reason}")]
    Status { status: u16, reason: String },

    #[error("{0}")]
    Network(String),
}

/// Errors surfaced to the semantic compiler when a resource cannot be read.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResourceError {
    #[error("failed to fetch {locator}: {source}")]
    Fetch {
        locator: String,
        #[source]
        source: FetchError,
    },
}

impl ResourceError {
    pub fn locator(&self) -> &str {
        match self {
            Self::Fetch { locator, .. } => locator,
        }
    }
}
