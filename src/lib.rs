//! Browse a folder of audio/video files hosted in a source repository: list
//! it through a [`provider::ListingProvider`], derive display metadata from
//! filenames, resolve thumbnail and playback URLs, and keep the resulting
//! catalog in a two-tier TTL cache.

pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod provider;

pub use cache::{cache_key, CacheStore, CacheTtl, FileBackend, SharedMemoryBackend};
pub use catalog::{CatalogFetcher, CatalogState, MediaItem, MediaKind};
pub use config::CatalogConfig;
pub use error::{CatalogError, Result};
