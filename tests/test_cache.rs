use media_catalog::cache::{
    cache_key, CacheEntry, CacheStore, DurableBackend, FileBackend, SharedMemoryBackend,
};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

const HOUR: Duration = Duration::from_secs(3600);

async fn create_file_store() -> (TempDir, FileBackend, CacheStore<Vec<String>>) {
    let temp_dir = tempfile::tempdir().unwrap();
    let backend = FileBackend::new(temp_dir.path()).await.unwrap();
    let store = CacheStore::with_durable(16, Arc::new(backend.clone()));
    (temp_dir, backend, store)
}

fn expired_entry_json(value: &str) -> String {
    let entry = CacheEntry {
        payload: vec![value.to_string()],
        timestamp: chrono::Utc::now().timestamp_millis() - 10_000,
        ttl: 1_000,
    };
    serde_json::to_string(&entry).unwrap()
}

#[tokio::test]
async fn test_set_then_get_returns_value() {
    let (_dir, _backend, store) = create_file_store().await;
    let key = cache_key("octo", "library", "media");
    let value = vec!["a".to_string(), "b".to_string()];

    store.set(&key, value.clone(), HOUR).await;
    assert_eq!(store.get(&key).await, Some(value));
}

#[tokio::test]
async fn test_durable_copy_survives_a_new_store() {
    let (dir, _backend, store) = create_file_store().await;
    let key = cache_key("octo", "library", "media");
    store.set(&key, vec!["x".to_string()], HOUR).await;
    drop(store);

    let backend = FileBackend::new(dir.path()).await.unwrap();
    let reopened: CacheStore<Vec<String>> = CacheStore::with_durable(16, Arc::new(backend));
    assert_eq!(reopened.get(&key).await, Some(vec!["x".to_string()]));
    assert_eq!(reopened.stats().await.memory_entries, 1);
}

#[tokio::test]
async fn test_memory_entry_expires() {
    let store: CacheStore<Vec<String>> = CacheStore::memory_only();
    store.set("github-media-k", vec!["v".into()], Duration::from_millis(30)).await;
    assert!(store.get("github-media-k").await.is_some());

    tokio::time::sleep(Duration::from_millis(60)).await;
    assert!(store.get("github-media-k").await.is_none());
}

#[tokio::test]
async fn test_expired_durable_entry_is_absent_and_removed() {
    let (_dir, backend, store) = create_file_store().await;
    let key = cache_key("octo", "library", "old");
    backend.set_item(&key, &expired_entry_json("stale")).await.unwrap();

    assert!(store.get(&key).await.is_none());
    assert!(backend.get_item(&key).await.unwrap().is_none());
}

#[tokio::test]
async fn test_each_tier_judges_its_own_entry() {
    let shared = SharedMemoryBackend::new();
    let store: CacheStore<Vec<String>> = CacheStore::with_durable(16, Arc::new(shared.clone()));
    let key = cache_key("octo", "library", "media");

    // Memory copy expires quickly while the durable copy is overwritten with
    // a long-lived entry written by someone else.
    store.set(&key, vec!["memory".into()], Duration::from_millis(20)).await;
    let fresh = CacheEntry::new(vec!["durable".to_string()], HOUR);
    shared
        .set_item(&key, &serde_json::to_string(&fresh).unwrap())
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(40)).await;

    assert_eq!(store.get(&key).await, Some(vec!["durable".to_string()]));
}

#[tokio::test]
async fn test_remove_deletes_from_both_tiers() {
    let (_dir, backend, store) = create_file_store().await;
    let key = cache_key("octo", "library", "media");
    store.set(&key, vec!["v".into()], HOUR).await;

    store.remove(&key).await;
    assert!(store.get(&key).await.is_none());
    assert!(backend.get_item(&key).await.unwrap().is_none());
}

#[tokio::test]
async fn test_cleanup_only_removes_expired_entries() {
    let (_dir, backend, store) = create_file_store().await;
    let live = cache_key("octo", "library", "live");
    let stale = cache_key("octo", "library", "stale");
    let broken = cache_key("octo", "library", "broken");

    store.set(&live, vec!["live".into()], HOUR).await;
    backend.set_item(&stale, &expired_entry_json("stale")).await.unwrap();
    backend.set_item(&broken, "{ not json").await.unwrap();
    backend.set_item("other-app-setting", "{ not json").await.unwrap();

    store.cleanup().await;

    assert!(backend.get_item(&live).await.unwrap().is_some());
    assert!(backend.get_item(&stale).await.unwrap().is_none());
    assert!(backend.get_item(&broken).await.unwrap().is_none());
    assert!(backend.get_item("other-app-setting").await.unwrap().is_some());
    assert_eq!(store.get(&live).await, Some(vec!["live".to_string()]));
}

#[tokio::test]
async fn test_cleanup_sweeps_memory() {
    let store: CacheStore<Vec<String>> = CacheStore::memory_only();
    store.set("github-media-a", vec![], Duration::ZERO).await;
    store.set("github-media-b", vec![], HOUR).await;

    store.cleanup().await;
    assert_eq!(store.stats().await.memory_entries, 1);
}

#[tokio::test]
async fn test_clear_leaves_unrelated_durable_entries() {
    let shared = SharedMemoryBackend::new();
    shared.set_item("theme", "dark").await.unwrap();
    let store: CacheStore<Vec<String>> = CacheStore::with_durable(16, Arc::new(shared.clone()));
    store.set(&cache_key("a", "b", "c"), vec![], HOUR).await;
    store.set(&cache_key("a", "b", "d"), vec![], HOUR).await;
    assert_eq!(store.stats().await.durable_entries, 2);

    store.clear().await;

    assert_eq!(shared.keys().await.unwrap(), vec!["theme".to_string()]);
    let stats = store.stats().await;
    assert_eq!(stats.memory_entries, 0);
    assert_eq!(stats.durable_entries, 0);
}

#[tokio::test]
async fn test_clear_skips_foreign_files_in_cache_dir() {
    let (dir, backend, store) = create_file_store().await;
    let key = cache_key("octo", "library", "media");
    store.set(&key, vec!["v".to_string()], HOUR).await;
    tokio::fs::write(dir.path().join("thumbcache"), "x").await.unwrap();
    tokio::fs::write(dir.path().join("thumbcache.meta"), b"\xff\xfe\x00")
        .await
        .unwrap();

    store.clear().await;

    assert!(backend.get_item(&key).await.unwrap().is_none());
    let fresh: CacheStore<Vec<String>> = CacheStore::with_durable(16, Arc::new(backend));
    assert!(fresh.get(&key).await.is_none());
    assert!(dir.path().join("thumbcache").exists());
}

#[tokio::test]
async fn test_clear_reaches_every_store_on_shared_storage() {
    let shared = SharedMemoryBackend::new();
    let first: CacheStore<Vec<String>> = CacheStore::with_durable(16, Arc::new(shared.clone()));
    let second: CacheStore<Vec<String>> = CacheStore::with_durable(16, Arc::new(shared.clone()));
    let key = cache_key("octo", "other", "media");
    second.set(&key, vec!["v".into()], HOUR).await;

    first.clear().await;
    assert!(shared.get_item(&key).await.unwrap().is_none());
}

#[tokio::test]
async fn test_invalidate_catalog_uses_derived_key() {
    let store: CacheStore<Vec<String>> = CacheStore::memory_only();
    store.set(&cache_key("octo", "library", "media"), vec!["v".into()], HOUR).await;

    store.invalidate_catalog("octo", "library", "media").await;
    assert!(store.get(&cache_key("octo", "library", "media")).await.is_none());
}
