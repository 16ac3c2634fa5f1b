use super::CacheError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Durable tier: string key/value storage that outlives the process and may be
/// shared with unrelated consumers.
///
/// Every operation may fail (quota, disabled storage, IO); the cache store
/// treats those failures as misses and keeps working from memory.
#[async_trait]
pub trait DurableBackend: Send + Sync {
    async fn get_item(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn set_item(&self, key: &str, value: &str) -> Result<(), CacheError>;

    /// Removing a missing key is not an error.
    async fn remove_item(&self, key: &str) -> Result<(), CacheError>;

    /// All keys currently stored, including those of other consumers.
    async fn keys(&self) -> Result<Vec<String>, CacheError>;
}

/// In-process durable backend. Clones share the same map, which makes it a
/// stand-in for storage shared by several cache stores.
#[derive(Debug, Clone, Default)]
pub struct SharedMemoryBackend {
    items: Arc<Mutex<HashMap<String, String>>>,
}

impl SharedMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl DurableBackend for SharedMemoryBackend {
    async fn get_item(&self, key: &str) -> Result<Option<String>, CacheError> {
        let items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(items.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), CacheError> {
        let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), CacheError> {
        let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        items.remove(key);
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>, CacheError> {
        let items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(items.keys().cloned().collect())
    }
}
