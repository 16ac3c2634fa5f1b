//! Media catalog assembly: filename metadata, URL resolution, error
//! classification and the fetcher that ties them to the cache.

mod classify;
mod display;
mod fetcher;
mod parser;
mod urls;

pub use classify::*;
pub use display::*;
pub use fetcher::*;
pub use parser::*;
pub use urls::*;

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Recognized media extensions, lowercase.
pub const SUPPORTED_EXTENSIONS: [&str; 6] = ["mp4", "wav", "mp3", "m4a", "webm", "ogg"];

pub const VIDEO_EXTENSIONS: [&str; 2] = ["mp4", "webm"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Audio,
    Video,
}

impl MediaKind {
    /// Kind of a supported media file, from its extension alone.
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let ext = media_extension(file_name)?;
        if VIDEO_EXTENSIONS.contains(&ext) {
            Some(MediaKind::Video)
        } else {
            Some(MediaKind::Audio)
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Audio => "audio",
            MediaKind::Video => "video",
        }
    }
}

/// One playable file of a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    /// `<index>-<content id>`; unique within one catalog snapshot.
    pub id: String,
    pub title: String,
    pub author: String,
    pub category: String,
    pub date: Option<String>,
    #[serde(rename = "mediaType")]
    pub kind: MediaKind,
    pub media_url: String,
    pub thumbnail_url: String,
    pub file_name: String,
    pub size: Option<u64>,
    /// RFC 3339 time the item was assembled.
    pub created_at: Option<String>,
}

/// Observable state of a catalog fetcher.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogState {
    pub items: Arc<Vec<MediaItem>>,
    pub loading: bool,
    pub error: Option<String>,
}

/// The recognized media extension of `file_name`, lowercased.
pub fn media_extension(file_name: &str) -> Option<&'static str> {
    let (_, ext) = file_name.rsplit_once('.')?;
    SUPPORTED_EXTENSIONS
        .iter()
        .copied()
        .find(|supported| supported.eq_ignore_ascii_case(ext))
}

pub fn is_supported_media(file_name: &str) -> bool {
    media_extension(file_name).is_some()
}

pub fn is_video_kind(file_name: &str) -> bool {
    MediaKind::from_file_name(file_name) == Some(MediaKind::Video)
}
