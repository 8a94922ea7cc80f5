//! In-process, time-bounded caches.
//!
//! Two caches sit in front of expensive round trips:
//!
//! - [`DescribeCache`]: DESCRIBE/SHOW results, 2 hour TTL.
//! - The resource cache inside [`crate::resource::ResourceReader`]:
//!   semantic-model source text, 5 minute TTL.
//!
//! # Design
//!
//! - Explicit cache objects with an injected [`Clock`], created once per
//!   process and shared by reference
//! - Lazy expiry: checked on read, expired entries evicted individually
//! - No bulk clearing except an explicit `clear()`
//! - Concurrent requests for the same key are not deduplicated
//!
//! # Key Format
//!
//! ```text
//! {environment}:{principal}:{UPPERCASED TRIMMED SQL}   -> RowTable
//! {resource locator, exact string}                     -> source text
//! ```

mod clock;
mod describe;
mod hash;
mod ttl;

pub use clock::{Clock, ManualClock, SystemClock};
pub use describe::{describe_cache_key, DescribeCache, DESCRIBE_CACHE_TTL};
pub use hash::content_hash;
pub use ttl::{CacheEntry, TtlCache};
