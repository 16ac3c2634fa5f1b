use super::strip_media_extension;
use crate::config::CatalogConfig;
use crate::error::Result;
use crate::provider::DirEntry;
use std::fmt;
use std::sync::Arc;
use url::Url;

pub const THUMBNAIL_EXTENSION: &str = "jpg";

/// Maps a thumbnail filename (`<name>.jpg`) to the URL it is served from.
/// The returned string is used verbatim.
pub trait ThumbnailResolver: Send + Sync {
    fn thumbnail_url(&self, thumbnail_file_name: &str) -> String;
}

impl<F> ThumbnailResolver for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn thumbnail_url(&self, thumbnail_file_name: &str) -> String {
        self(thumbnail_file_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedUrls {
    pub thumbnail_url: String,
    pub media_url: String,
}

/// `clip.mp4` -> `clip.jpg`.
pub fn thumbnail_file_name(file_name: &str) -> String {
    format!("{}.{}", strip_media_extension(file_name), THUMBNAIL_EXTENSION)
}

/// Primary thumbnail and playback URLs of listing entries. Fallback
/// thumbnails are a presentation concern and never produced here.
#[derive(Clone)]
pub struct UrlResolver {
    raw_base: Url,
    owner: String,
    repo: String,
    branch: String,
    thumbnail_folder_path: String,
    custom: Option<Arc<dyn ThumbnailResolver>>,
}

impl fmt::Debug for UrlResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UrlResolver")
            .field("raw_base", &self.raw_base.as_str())
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("branch", &self.branch)
            .field("thumbnail_folder_path", &self.thumbnail_folder_path)
            .field("custom", &self.custom.is_some())
            .finish()
    }
}

impl UrlResolver {
    pub fn new(config: &CatalogConfig, custom: Option<Arc<dyn ThumbnailResolver>>) -> Result<Self> {
        Ok(Self {
            raw_base: Url::parse(&config.raw_content_base)?,
            owner: config.owner.clone(),
            repo: config.repo.clone(),
            branch: config.branch.clone(),
            thumbnail_folder_path: config.thumbnail_folder_path.clone(),
            custom,
        })
    }

    pub fn thumbnail_url(&self, file_name: &str) -> String {
        let thumbnail = thumbnail_file_name(file_name);
        match &self.custom {
            Some(custom) => custom.thumbnail_url(&thumbnail),
            None => self.raw_url(&thumbnail),
        }
    }

    /// `<host>/<owner>/<repo>/<branch>/<thumbnail folder>/<name>`.
    fn raw_url(&self, file_name: &str) -> String {
        let mut url = self.raw_base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend([self.owner.as_str(), self.repo.as_str(), self.branch.as_str()])
                .extend(self.thumbnail_folder_path.split('/').filter(|s| !s.is_empty()))
                .push(file_name);
        }
        url.into()
    }

    pub fn resolve(&self, entry: &DirEntry) -> ResolvedUrls {
        ResolvedUrls {
            thumbnail_url: self.thumbnail_url(&entry.name),
            media_url: entry.download_url.clone().unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> CatalogConfig {
        CatalogConfig::new("octo", "library")
    }

    fn entry(name: &str, download_url: Option<&str>) -> DirEntry {
        DirEntry {
            name: name.into(),
            entry_type: "file".into(),
            size: Some(1),
            content_id: "sha".into(),
            download_url: download_url.map(str::to_string),
        }
    }

    #[test]
    fn default_thumbnail_is_raw_content_url() {
        let resolver = UrlResolver::new(&config(), None).unwrap();
        let urls = resolver.resolve(&entry("Talk_Title_Ann.MP4", Some("https://dl/x.mp4")));
        assert_eq!(
            urls.thumbnail_url,
            "https://raw.githubusercontent.com/octo/library/main/thumbnails/Talk_Title_Ann.jpg"
        );
        assert_eq!(urls.media_url, "https://dl/x.mp4");
    }

    #[test]
    fn nested_thumbnail_folder_and_branch() {
        let mut config = config();
        config.thumbnail_folder_path = "assets/thumbs/".into();
        config.branch = "gh-pages".into();
        let resolver = UrlResolver::new(&config, None).unwrap();
        assert_eq!(
            resolver.thumbnail_url("a.ogg"),
            "https://raw.githubusercontent.com/octo/library/gh-pages/assets/thumbs/a.jpg"
        );
    }

    #[test]
    fn custom_resolver_result_is_used_verbatim() {
        let custom: Arc<dyn ThumbnailResolver> =
            Arc::new(|name: &str| format!("cdn://thumbs/{}?v=1", name));
        let resolver = UrlResolver::new(&config(), Some(custom)).unwrap();
        assert_eq!(resolver.thumbnail_url("song.wav"), "cdn://thumbs/song.jpg?v=1");
    }

    #[test]
    fn missing_download_url_is_empty() {
        let resolver = UrlResolver::new(&config(), None).unwrap();
        assert_eq!(resolver.resolve(&entry("a.mp3", None)).media_url, "");
    }
}
