mod github;

pub use github::*;

use async_trait::async_trait;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One entry of a remote directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirEntry {
    pub name: String,
    /// Provider-reported type: "file", "dir", "symlink", "submodule".
    #[serde(rename = "type")]
    pub entry_type: String,
    #[serde(default)]
    pub size: Option<u64>,
    /// Stable content identifier (the blob sha for git hosts).
    #[serde(rename = "sha")]
    pub content_id: String,
    #[serde(default)]
    pub download_url: Option<String>,
}

impl DirEntry {
    pub fn is_file(&self) -> bool {
        self.entry_type == "file"
    }
}

/// What a provider returns for a path: a directory's entries, or the
/// descriptor of the single file living at that path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing {
    Directory(Vec<DirEntry>),
    File(DirEntry),
}

/// Raw failure reported by a listing provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingError {
    pub status: Option<StatusCode>,
    pub message: Option<String>,
}

impl ListingError {
    pub fn new(status: Option<StatusCode>, message: Option<String>) -> Self {
        Self { status, message }
    }

    pub fn status(status: StatusCode, message: impl Into<String>) -> Self {
        Self::new(Some(status), Some(message.into()))
    }

    /// A failure that never reached the remote (timeout, DNS, TLS...).
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(None, Some(message.into()))
    }
}

impl fmt::Display for ListingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.status, self.message.as_deref()) {
            (Some(status), Some(message)) => write!(f, "{} ({})", message, status.as_u16()),
            (Some(status), None) => write!(f, "provider returned {}", status),
            (None, Some(message)) => f.write_str(message),
            (None, None) => f.write_str("provider failed"),
        }
    }
}

impl std::error::Error for ListingError {}

/// Lists directory entries under a path of a hosted repository.
#[async_trait]
pub trait ListingProvider: Send + Sync {
    async fn list_directory(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        credential: Option<&str>,
    ) -> Result<Listing, ListingError>;
}
