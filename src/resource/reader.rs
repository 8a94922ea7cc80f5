//! Cached resource reader.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use super::fetch::ResourceFetcher;
use super::{ResourceError, ResourceResult};
use crate::cache::{content_hash, Clock, SystemClock, TtlCache};
use crate::transport::join_url;

/// Default lifetime of cached resource text (5 minutes).
pub const RESOURCE_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// Locator schemes for co-located shared assets.
pub const INTERNAL_SCHEMES: [&str; 2] = ["internal://", "malloy://"];

/// Text of a resource plus the key the compiler uses to detect changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceContents {
    pub contents: String,
    /// `None` means "never changes".
    pub invalidation_key: Option<String>,
}

impl ResourceContents {
    fn for_locator(locator: &str, contents: String) -> Self {
        let invalidation_key = invalidation_key_for(locator, &contents);
        Self {
            contents,
            invalidation_key,
        }
    }
}

pub fn is_internal_locator(locator: &str) -> bool {
    INTERNAL_SCHEMES
        .iter()
        .any(|scheme| locator.starts_with(scheme))
}

/// `None` for internal locators, otherwise the SHA-256 hex of `contents`.
pub fn invalidation_key_for(locator: &str, contents: &str) -> Option<String> {
    if is_internal_locator(locator) {
        None
    } else {
        Some(content_hash(contents))
    }
}

/// Map an internal locator onto `asset_base_url`. Other locators are
/// fetched as written.
///
/// ```
/// use sqlbench::resource::resolve_locator;
///
/// assert_eq!(
///     resolve_locator("malloy://models/flights.malloy", "http://app/assets"),
///     "http://app/assets/models/flights.malloy"
/// );
/// assert_eq!(
///     resolve_locator("https://host/a.malloy", "http://app/assets"),
///     "https://host/a.malloy"
/// );
/// ```
pub fn resolve_locator(locator: &str, asset_base_url: &str) -> String {
    INTERNAL_SCHEMES
        .iter()
        .find_map(|scheme| locator.strip_prefix(scheme))
        .map(|rest| join_url(asset_base_url, rest))
        .unwrap_or_else(|| locator.to_string())
}

/// Reads semantic-model sources through a TTL cache.
///
/// Failed fetches are never cached, so the next read retries.
pub struct ResourceReader<F> {
    fetcher: F,
    cache: TtlCache<String, String>,
    asset_base_url: String,
}

impl<F: ResourceFetcher> ResourceReader<F> {
    pub fn new(fetcher: F, asset_base_url: impl Into<String>) -> Self {
        Self::with_ttl(fetcher, asset_base_url, RESOURCE_CACHE_TTL)
    }

    pub fn with_ttl(fetcher: F, asset_base_url: impl Into<String>, ttl: Duration) -> Self {
        Self::with_clock(fetcher, asset_base_url, ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(
        fetcher: F,
        asset_base_url: impl Into<String>,
        ttl: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            fetcher,
            cache: TtlCache::with_clock(ttl, clock),
            asset_base_url: asset_base_url.into(),
        }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn ttl(&self) -> Duration {
        self.cache.ttl()
    }

    /// Contents and invalidation key for `locator`, fetching on a miss.
    pub async fn read_resource(&self, locator: &str) -> ResourceResult<ResourceContents> {
        if let Some(contents) = self.cache.get(locator) {
            debug!(locator, "resource cache hit");
            return Ok(ResourceContents::for_locator(locator, contents));
        }

        let url = resolve_locator(locator, &self.asset_base_url);
        debug!(locator, url = %url, "resource cache miss");

        let contents = self.fetcher.fetch(&url).await.map_err(|source| {
            warn!(locator, error = %source, "resource fetch failed");
            ResourceError::Fetch {
                locator: locator.to_string(),
                source,
            }
        })?;

        self.cache.insert(locator.to_string(), contents.clone());
        Ok(ResourceContents::for_locator(locator, contents))
    }

    /// Invalidation key only. Uses a live entry when there is one.
    pub async fn invalidation_key(&self, locator: &str) -> ResourceResult<Option<String>> {
        if let Some(contents) = self.cache.get(locator) {
            return Ok(invalidation_key_for(locator, &contents));
        }
        self.read_resource(locator)
            .await
            .map(|read| read.invalidation_key)
    }

    pub fn clear(&self) {
        self.cache.clear();
    }
}
