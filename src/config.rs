use crate::cache::{duration_millis, DEFAULT_TTL};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_MEDIA_FOLDER: &str = "media";
pub const DEFAULT_THUMBNAIL_FOLDER: &str = "thumbnails";
pub const DEFAULT_BRANCH: &str = "main";
pub const DEFAULT_RAW_CONTENT_BASE: &str = "https://raw.githubusercontent.com";

/// Options of one catalog: which folder of which repository, and how long a
/// listing stays cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CatalogConfig {
    pub owner: String,
    pub repo: String,
    pub media_folder_path: String,
    pub thumbnail_folder_path: String,
    /// Branch segment of raw thumbnail URLs.
    pub branch: String,
    pub raw_content_base: String,
    /// Passed to the listing provider untouched.
    #[serde(skip_serializing)]
    pub credential: Option<String>,
    /// Presentation fallback; carried through, never used to build URLs.
    pub default_thumbnail_url: Option<String>,
    /// Milliseconds.
    pub cache_ttl: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            owner: String::new(),
            repo: String::new(),
            media_folder_path: DEFAULT_MEDIA_FOLDER.to_string(),
            thumbnail_folder_path: DEFAULT_THUMBNAIL_FOLDER.to_string(),
            branch: DEFAULT_BRANCH.to_string(),
            raw_content_base: DEFAULT_RAW_CONTENT_BASE.to_string(),
            credential: None,
            default_thumbnail_url: None,
            cache_ttl: duration_millis(DEFAULT_TTL),
        }
    }
}

impl CatalogConfig {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            ..Self::default()
        }
    }

    pub fn with_media_folder(mut self, path: impl Into<String>) -> Self {
        self.media_folder_path = path.into();
        self
    }

    pub fn with_thumbnail_folder(mut self, path: impl Into<String>) -> Self {
        self.thumbnail_folder_path = path.into();
        self
    }

    pub fn with_credential(mut self, credential: impl Into<String>) -> Self {
        self.credential = Some(credential.into());
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = duration_millis(ttl);
        self
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_fields() {
        let config: CatalogConfig =
            serde_json::from_str(r#"{"owner": "octo", "repo": "library"}"#).unwrap();
        assert_eq!(config.media_folder_path, "media");
        assert_eq!(config.thumbnail_folder_path, "thumbnails");
        assert_eq!(config.cache_ttl(), Duration::from_secs(3600));
        assert!(config.credential.is_none());
    }

    #[test]
    fn ttl_is_read_in_milliseconds() {
        let config: CatalogConfig =
            serde_json::from_str(r#"{"owner": "o", "repo": "r", "cacheTtl": 300000}"#).unwrap();
        assert_eq!(config.cache_ttl(), Duration::from_secs(300));
    }

    #[test]
    fn credential_is_never_serialized() {
        let config = CatalogConfig::new("o", "r").with_credential("secret");
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("secret"));
    }
}
