mod disk_cache;
mod durable;
mod memory_cache;
mod store;

pub use disk_cache::*;
pub use durable::*;
pub use memory_cache::*;
pub use store::*;

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Reserved prefix for every durable key written by this crate. `clear` and
/// `cleanup` never touch keys without it.
pub const KEY_PREFIX: &str = "github-media-";

pub const DEFAULT_TTL: Duration = CacheTtl::ONE_HOUR;
pub const DEFAULT_MEMORY_CAPACITY: usize = 128;

/// Named TTL presets.
pub struct CacheTtl;

impl CacheTtl {
    pub const FIVE_MINUTES: Duration = Duration::from_secs(5 * 60);
    pub const FIFTEEN_MINUTES: Duration = Duration::from_secs(15 * 60);
    pub const THIRTY_MINUTES: Duration = Duration::from_secs(30 * 60);
    pub const ONE_HOUR: Duration = Duration::from_secs(60 * 60);
    pub const TWO_HOURS: Duration = Duration::from_secs(2 * 60 * 60);
    pub const SIX_HOURS: Duration = Duration::from_secs(6 * 60 * 60);
    pub const TWELVE_HOURS: Duration = Duration::from_secs(12 * 60 * 60);
    pub const ONE_DAY: Duration = Duration::from_secs(24 * 60 * 60);
}

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("durable storage IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cache entry serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Stored bytes exist but are not a cache entry.
    #[error("malformed cache entry for {0}")]
    ParseFailure(String),
}

/// A cached payload with its own creation time and lifetime, both in
/// milliseconds so durable copies can be judged without the writer's clock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    #[serde(rename = "data")]
    pub payload: T,
    /// Unix epoch milliseconds.
    pub timestamp: i64,
    /// Milliseconds.
    pub ttl: u64,
}

impl<T> CacheEntry<T> {
    pub fn new(payload: T, ttl: Duration) -> Self {
        Self {
            payload,
            timestamp: now_millis(),
            ttl: duration_millis(ttl),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(now_millis())
    }

    /// Valid iff `now - timestamp < ttl`.
    pub fn is_valid_at(&self, now: i64) -> bool {
        (now as i128 - self.timestamp as i128) < self.ttl as i128
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub memory_entries: usize,
    /// Durable entries carrying [`KEY_PREFIX`].
    pub durable_entries: usize,
}

/// Derives the cache key of a catalog listing.
///
/// The readable shape is `github-media-<owner>-<repo>-<path>`. `-` and `%`
/// inside a component are percent-escaped so that `("a-b", "c")` and
/// `("a", "b-c")` cannot meet on the same key.
pub fn cache_key(owner: &str, repo: &str, path: &str) -> String {
    format!(
        "{}{}-{}-{}",
        KEY_PREFIX,
        escape_component(owner),
        escape_component(repo),
        escape_component(path)
    )
}

fn escape_component(component: &str) -> String {
    let mut escaped = String::with_capacity(component.len());
    for c in component.chars() {
        match c {
            '%' => escaped.push_str("%25"),
            '-' => escaped.push_str("%2D"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Human-readable TTL, using the largest whole unit.
pub fn format_ttl(ttl: Duration) -> String {
    let seconds = ttl.as_secs();
    let minutes = seconds / 60;
    let hours = minutes / 60;
    let days = hours / 24;

    let (amount, unit) = if days > 0 {
        (days, "day")
    } else if hours > 0 {
        (hours, "hour")
    } else if minutes > 0 {
        (minutes, "minute")
    } else {
        (seconds, "second")
    };
    format!("{} {}{}", amount, unit, if amount > 1 { "s" } else { "" })
}

pub(crate) fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

pub(crate) fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
