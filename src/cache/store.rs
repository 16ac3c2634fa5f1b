use super::{
    cache_key, now_millis, CacheEntry, CacheStats, DurableBackend, MemoryTier,
    DEFAULT_MEMORY_CAPACITY, KEY_PREFIX,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, warn};

/// Two-tier TTL cache: a volatile in-memory tier in front of an optional
/// durable tier.
///
/// Durable storage is best-effort. Its failures are logged and treated as
/// misses; they never fail a call or undo a volatile write. Without a durable
/// backend the store is a plain memory cache with the same contract.
pub struct CacheStore<T> {
    memory: Mutex<MemoryTier<T>>,
    durable: Option<Arc<dyn DurableBackend>>,
}

impl<T> CacheStore<T>
where
    T: Clone + Serialize + DeserializeOwned + Send + Sync,
{
    pub fn new(capacity: usize) -> Self {
        Self {
            memory: Mutex::new(MemoryTier::new(capacity)),
            durable: None,
        }
    }

    pub fn memory_only() -> Self {
        Self::new(DEFAULT_MEMORY_CAPACITY)
    }

    pub fn with_durable(capacity: usize, durable: Arc<dyn DurableBackend>) -> Self {
        Self {
            memory: Mutex::new(MemoryTier::new(capacity)),
            durable: Some(durable),
        }
    }

    pub fn has_durable(&self) -> bool {
        self.durable.is_some()
    }

    // The guard is never held across an await point.
    fn memory(&self) -> MutexGuard<'_, MemoryTier<T>> {
        self.memory.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub async fn set(&self, key: &str, value: T, ttl: Duration) {
        let entry = CacheEntry::new(value, ttl);
        let serialized = self.durable.is_some().then(|| serde_json::to_string(&entry));
        self.memory().put(key.to_string(), entry);

        let (Some(durable), Some(serialized)) = (&self.durable, serialized) else {
            return;
        };
        match serialized {
            Ok(json) => {
                if let Err(e) = durable.set_item(key, &json).await {
                    warn!("Failed to store cache entry {} in durable storage: {}", key, e);
                }
            }
            Err(e) => warn!("Failed to serialize cache entry {}: {}", key, e),
        }
    }

    pub async fn get(&self, key: &str) -> Option<T> {
        let now = now_millis();
        {
            let mut memory = self.memory();
            match memory.get(key) {
                Some(entry) if entry.is_valid_at(now) => return Some(entry.payload),
                Some(_) => {
                    memory.remove(key);
                }
                None => {}
            }
        }

        let durable = self.durable.as_ref()?;
        let raw = match durable.get_item(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!("Failed to read cache entry {} from durable storage: {}", key, e);
                return None;
            }
        };

        let entry: CacheEntry<T> = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                debug!("Ignoring malformed durable cache entry {}: {}", key, e);
                return None;
            }
        };

        if entry.is_valid_at(now) {
            debug!("Promoting durable cache entry {} to memory", key);
            let payload = entry.payload.clone();
            self.memory().put(key.to_string(), entry);
            Some(payload)
        } else {
            if let Err(e) = durable.remove_item(key).await {
                warn!("Failed to remove expired cache entry {}: {}", key, e);
            }
            None
        }
    }

    pub async fn remove(&self, key: &str) {
        self.memory().remove(key);
        if let Some(durable) = &self.durable {
            if let Err(e) = durable.remove_item(key).await {
                warn!("Failed to remove cache entry {} from durable storage: {}", key, e);
            }
        }
    }

    /// Drops the cached catalog of one `(owner, repo, path)` listing.
    pub async fn invalidate_catalog(&self, owner: &str, repo: &str, path: &str) {
        self.remove(&cache_key(owner, repo, path)).await;
    }

    /// Empties memory and removes every prefixed durable entry. Durable keys
    /// of other consumers are left alone.
    pub async fn clear(&self) {
        self.memory().clear();
        let Some(durable) = &self.durable else {
            return;
        };
        for key in self.owned_durable_keys(durable.as_ref()).await {
            if let Err(e) = durable.remove_item(&key).await {
                warn!("Failed to clear cache entry {}: {}", key, e);
            }
        }
    }

    /// Sweeps both tiers for expired entries. Durable entries that do not
    /// decode as a `T` entry count as expired.
    pub async fn cleanup(&self) {
        let now = now_millis();
        let swept = self.memory().remove_expired(now);
        if swept > 0 {
            debug!("Swept {} expired entries from memory", swept);
        }

        let Some(durable) = &self.durable else {
            return;
        };
        for key in self.owned_durable_keys(durable.as_ref()).await {
            let expired = match durable.get_item(&key).await {
                Ok(Some(raw)) => serde_json::from_str::<CacheEntry<T>>(&raw)
                    .map(|entry| !entry.is_valid_at(now))
                    .unwrap_or(true),
                Ok(None) => false,
                Err(e) => {
                    warn!("Failed to read cache entry {} during cleanup: {}", key, e);
                    false
                }
            };
            if expired {
                debug!("Removing expired durable cache entry {}", key);
                if let Err(e) = durable.remove_item(&key).await {
                    warn!("Failed to remove expired cache entry {}: {}", key, e);
                }
            }
        }
    }

    pub async fn stats(&self) -> CacheStats {
        let memory_entries = self.memory().len();
        let durable_entries = match &self.durable {
            Some(durable) => self.owned_durable_keys(durable.as_ref()).await.len(),
            None => 0,
        };
        CacheStats {
            memory_entries,
            durable_entries,
        }
    }

    async fn owned_durable_keys(&self, durable: &dyn DurableBackend) -> Vec<String> {
        match durable.keys().await {
            Ok(keys) => keys.into_iter().filter(|key| key.starts_with(KEY_PREFIX)).collect(),
            Err(e) => {
                warn!("Failed to list durable cache keys: {}", e);
                Vec::new()
            }
        }
    }
}
