use super::{CacheError, DurableBackend};
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio_stream::wrappers::ReadDirStream;
use tokio_stream::StreamExt;
use tracing::debug;

const META_EXTENSION: &str = "meta";

/// Durable backend keeping one file per key in a directory.
///
/// Files are named by the SHA-256 of the key; a `.meta` sidecar holds the key
/// itself so that the key space can be listed back.
#[derive(Debug, Clone)]
pub struct FileBackend {
    cache_dir: PathBuf,
}

impl FileBackend {
    pub async fn new(cache_dir: impl Into<PathBuf>) -> io::Result<Self> {
        let cache_dir = cache_dir.into();
        if !cache_dir.exists() {
            fs::create_dir_all(&cache_dir).await?;
        }
        Ok(Self { cache_dir })
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    fn get_cache_path(&self, key: &str) -> PathBuf {
        let mut hasher = Sha256::new();
        hasher.update(key.as_bytes());
        let hash = hex::encode(hasher.finalize());
        self.cache_dir.join(hash)
    }
}

async fn remove_if_present(path: &Path) -> io::Result<()> {
    match fs::remove_file(path).await {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

#[async_trait]
impl DurableBackend for FileBackend {
    async fn get_item(&self, key: &str) -> Result<Option<String>, CacheError> {
        let cache_path = self.get_cache_path(key);
        match fs::read_to_string(&cache_path).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), CacheError> {
        let cache_path = self.get_cache_path(key);
        fs::write(&cache_path, value).await?;
        // A data file is never left without its sidecar.
        if let Err(e) = fs::write(cache_path.with_extension(META_EXTENSION), key).await {
            let _ = remove_if_present(&cache_path).await;
            return Err(e.into());
        }
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), CacheError> {
        let cache_path = self.get_cache_path(key);
        remove_if_present(&cache_path).await?;
        remove_if_present(&cache_path.with_extension(META_EXTENSION)).await?;
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>, CacheError> {
        let mut entries = ReadDirStream::new(fs::read_dir(&self.cache_dir).await?);
        let mut keys = Vec::new();
        while let Some(entry) = entries.next().await {
            let path = match entry {
                Ok(entry) => entry.path(),
                Err(e) => {
                    debug!("Skipping unreadable cache directory entry: {}", e);
                    continue;
                }
            };
            if path.extension().and_then(|ext| ext.to_str()) != Some(META_EXTENSION) {
                continue;
            }
            // A sidecar without its data file is a half-removed entry.
            if !path.with_extension("").exists() {
                continue;
            }
            // Files of other tools, or a sidecar removed under us.
            match fs::read_to_string(&path).await {
                Ok(key) => keys.push(key),
                Err(e) => debug!("Skipping unreadable sidecar {}: {}", path.display(), e),
            }
        }
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn items_round_trip_through_files() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::new(dir.path()).await.unwrap();

        backend.set_item("github-media-a", "{\"x\":1}").await.unwrap();
        assert_eq!(
            backend.get_item("github-media-a").await.unwrap().as_deref(),
            Some("{\"x\":1}")
        );
        assert_eq!(backend.keys().await.unwrap(), vec!["github-media-a".to_string()]);

        backend.remove_item("github-media-a").await.unwrap();
        assert!(backend.get_item("github-media-a").await.unwrap().is_none());
        assert!(backend.keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn removing_missing_key_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::new(dir.path().join("nested")).await.unwrap();
        backend.remove_item("nope").await.unwrap();
        assert!(backend.cache_dir().exists());
    }

    #[tokio::test]
    async fn failed_sidecar_write_leaves_no_data_file() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::new(dir.path()).await.unwrap();
        let cache_path = backend.get_cache_path("github-media-a");
        fs::create_dir(cache_path.with_extension(META_EXTENSION)).await.unwrap();

        assert!(backend.set_item("github-media-a", "{}").await.is_err());
        assert!(!cache_path.exists());
        assert!(backend.get_item("github-media-a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn undecodable_sidecar_is_skipped_when_listing() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::new(dir.path()).await.unwrap();
        backend.set_item("github-media-a", "{}").await.unwrap();
        fs::write(dir.path().join("thumbcache"), "x").await.unwrap();
        fs::write(dir.path().join("thumbcache.meta"), b"\xff\xfe\x00").await.unwrap();

        assert_eq!(backend.keys().await.unwrap(), vec!["github-media-a".to_string()]);
    }
}
