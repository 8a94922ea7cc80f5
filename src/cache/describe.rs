//! Cache for schema-introspection (DESCRIBE/SHOW) results.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use super::clock::Clock;
use super::ttl::TtlCache;
use crate::result::RowTable;

/// Default lifetime of a describe result (2 hours).
pub const DESCRIBE_CACHE_TTL: Duration = Duration::from_secs(2 * 60 * 60);

/// Cache key: `{environment}:{principal}:{SQL trimmed and uppercased}`.
///
/// Case and surrounding whitespace differences in the SQL collide on
/// purpose.
pub fn describe_cache_key(environment: &str, principal: &str, sql: &str) -> String {
    format!("{}:{}:{}", environment, principal, sql.trim().to_uppercase())
}

/// Process-wide cache of introspection results.
///
/// Only metadata commands read or write it; ordinary SELECT results are
/// never cached. Construct once and share by `Arc`.
#[derive(Debug)]
pub struct DescribeCache {
    entries: TtlCache<String, RowTable>,
}

impl DescribeCache {
    pub fn new() -> Self {
        Self::with_ttl(DESCRIBE_CACHE_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: TtlCache::new(ttl),
        }
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: TtlCache::with_clock(ttl, clock),
        }
    }

    /// Lifetime of new entries.
    pub fn ttl(&self) -> Duration {
        self.entries.ttl()
    }

    pub fn get(&self, key: &str) -> Option<RowTable> {
        let hit = self.entries.get(key);
        debug!(key, hit = hit.is_some(), "describe cache lookup");
        hit
    }

    pub fn put(&self, key: impl Into<String>, result: RowTable) {
        self.entries.insert(key.into(), result);
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for DescribeCache {
    fn default() -> Self {
        Self::new()
    }
}
