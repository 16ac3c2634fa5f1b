use super::{
    classify_catalog_error, friendly_message, CatalogState, DefaultFileNameParser, FileNameParser,
    MediaItem, MediaKind, ThumbnailResolver, UrlResolver,
};
use crate::cache::{cache_key, CacheStore};
use crate::config::CatalogConfig;
use crate::error::{CatalogError, Result};
use crate::provider::{DirEntry, GithubContents, Listing, ListingProvider};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::watch;
use tracing::{debug, error, info};

pub type CatalogCache = CacheStore<Vec<MediaItem>>;

struct Settings {
    config: CatalogConfig,
    urls: UrlResolver,
}

impl Settings {
    fn cache_key(&self) -> String {
        let config = &self.config;
        cache_key(&config.owner, &config.repo, &config.media_folder_path)
    }
}

/// Loads the catalog of one repository folder, through the cache, and
/// publishes `loading / items / error` state.
///
/// Every trigger ([`refetch`](Self::refetch), [`set_config`](Self::set_config),
/// [`hard_refresh`](Self::hard_refresh)) re-enters loading. Overlapping
/// fetches are not coalesced; each one takes a sequence number and only the
/// most recently started one may publish its outcome. Items of the last
/// success stay visible through later loads and failures.
pub struct CatalogFetcher {
    cache: Arc<CatalogCache>,
    provider: Arc<dyn ListingProvider>,
    parser: Arc<dyn FileNameParser>,
    thumbnails: Option<Arc<dyn ThumbnailResolver>>,
    settings: RwLock<Arc<Settings>>,
    state: watch::Sender<CatalogState>,
    sequence: AtomicU64,
    closed: AtomicBool,
}

impl CatalogFetcher {
    pub fn builder(config: CatalogConfig) -> CatalogFetcherBuilder {
        CatalogFetcherBuilder::new(config)
    }

    fn settings(&self) -> Arc<Settings> {
        self.settings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn config(&self) -> CatalogConfig {
        self.settings().config.clone()
    }

    pub fn cache(&self) -> &Arc<CatalogCache> {
        &self.cache
    }

    /// Cache key of the folder currently configured.
    pub fn cache_key(&self) -> String {
        self.settings().cache_key()
    }

    pub fn state(&self) -> CatalogState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<CatalogState> {
        self.state.subscribe()
    }

    pub fn items(&self) -> Arc<Vec<MediaItem>> {
        self.state.borrow().items.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.borrow().error.clone()
    }

    /// Current error rewritten as end-user copy.
    pub fn friendly_error(&self) -> Option<String> {
        self.state.borrow().error.as_deref().map(friendly_message)
    }

    /// Loads the catalog again. A fresh cache entry still wins; use
    /// [`hard_refresh`](Self::hard_refresh) to go to the provider.
    pub async fn refetch(&self) -> CatalogState {
        if self.closed.load(Ordering::Acquire) {
            return self.state();
        }
        let seq = self.sequence.fetch_add(1, Ordering::AcqRel) + 1;
        let settings = self.settings();

        self.state.send_modify(|state| {
            state.loading = true;
            state.error = None;
        });

        let outcome = self.load(&settings).await;

        if self.closed.load(Ordering::Acquire) {
            debug!("Catalog fetcher shut down, dropping fetch #{}", seq);
            return self.state();
        }
        if self.sequence.load(Ordering::Acquire) != seq {
            debug!("Fetch #{} superseded, dropping its outcome", seq);
            return self.state();
        }

        match outcome {
            Ok(items) => {
                self.state.send_modify(|state| {
                    state.items = items;
                    state.loading = false;
                    state.error = None;
                });
            }
            Err(err) => {
                let classified = classify_catalog_error(&err);
                error!("Error fetching media for {}: {}", settings.cache_key(), err);
                self.state.send_modify(|state| {
                    state.loading = false;
                    state.error = Some(classified.message);
                });
            }
        }
        self.state()
    }

    /// Drops the cached listing of the configured folder, then refetches.
    pub async fn hard_refresh(&self) -> CatalogState {
        self.cache.remove(&self.cache_key()).await;
        self.refetch().await
    }

    /// Switches to another folder or repository and loads it.
    pub async fn set_config(&self, config: CatalogConfig) -> Result<CatalogState> {
        let urls = UrlResolver::new(&config, self.thumbnails.clone())?;
        *self.settings.write().unwrap_or_else(PoisonError::into_inner) =
            Arc::new(Settings { config, urls });
        Ok(self.refetch().await)
    }

    /// Marks the fetcher as torn down: fetches still in flight complete but
    /// no longer touch the published state.
    pub fn shutdown(&self) {
        self.closed.store(true, Ordering::Release);
    }

    pub fn is_shut_down(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    async fn load(&self, settings: &Settings) -> Result<Arc<Vec<MediaItem>>> {
        let config = &settings.config;
        self.cache.cleanup().await;

        let key = settings.cache_key();
        if let Some(items) = self.cache.get(&key).await {
            debug!("Cache hit: {}", key);
            return Ok(Arc::new(items));
        }

        info!(
            "Cache miss, listing {}/{}/{}",
            config.owner, config.repo, config.media_folder_path
        );
        let listing = self
            .provider
            .list_directory(
                &config.owner,
                &config.repo,
                &config.media_folder_path,
                config.credential.as_deref(),
            )
            .await?;

        let entries = match listing {
            Listing::Directory(entries) => entries,
            Listing::File(entry) => {
                debug!("{} is a file, not a folder; catalog is empty", entry.name);
                return Ok(Arc::new(Vec::new()));
            }
        };

        let items = build_catalog(&entries, self.parser.as_ref(), &settings.urls)?;
        info!("Fetched {} media items into {}", items.len(), key);
        self.cache.set(&key, items.clone(), config.cache_ttl()).await;
        Ok(Arc::new(items))
    }
}

/// Turns a directory listing into catalog items: supported files only,
/// numbered in listing order.
pub fn build_catalog(
    entries: &[DirEntry],
    parser: &dyn FileNameParser,
    urls: &UrlResolver,
) -> Result<Vec<MediaItem>> {
    let created_at = chrono::Utc::now().to_rfc3339();
    entries
        .iter()
        .filter(|entry| entry.is_file())
        .filter_map(|entry| MediaKind::from_file_name(&entry.name).map(|kind| (entry, kind)))
        .enumerate()
        .map(|(index, (entry, kind))| -> Result<MediaItem> {
            let parsed = parser
                .parse(&entry.name)
                .map_err(|e| CatalogError::ItemConstruction {
                    file_name: entry.name.clone(),
                    message: e.to_string(),
                })?;
            let resolved = urls.resolve(entry);
            Ok(MediaItem {
                id: format!("{}-{}", index, entry.content_id),
                title: parsed.title,
                author: parsed.author,
                category: parsed.category,
                date: parsed.date,
                kind,
                media_url: resolved.media_url,
                thumbnail_url: resolved.thumbnail_url,
                file_name: entry.name.clone(),
                size: entry.size,
                created_at: Some(created_at.clone()),
            })
        })
        .collect()
}

pub struct CatalogFetcherBuilder {
    config: CatalogConfig,
    cache: Option<Arc<CatalogCache>>,
    provider: Option<Arc<dyn ListingProvider>>,
    parser: Option<Arc<dyn FileNameParser>>,
    thumbnails: Option<Arc<dyn ThumbnailResolver>>,
}

impl CatalogFetcherBuilder {
    pub fn new(config: CatalogConfig) -> Self {
        Self {
            config,
            cache: None,
            provider: None,
            parser: None,
            thumbnails: None,
        }
    }

    /// Shares a cache between fetchers. Defaults to a private memory-only store.
    pub fn cache(mut self, cache: Arc<CatalogCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Defaults to [`GithubContents`].
    pub fn provider(mut self, provider: Arc<dyn ListingProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn parser(mut self, parser: Arc<dyn FileNameParser>) -> Self {
        self.parser = Some(parser);
        self
    }

    pub fn thumbnail_resolver(mut self, resolver: Arc<dyn ThumbnailResolver>) -> Self {
        self.thumbnails = Some(resolver);
        self
    }

    pub fn build(self) -> Result<CatalogFetcher> {
        let provider = match self.provider {
            Some(provider) => provider,
            None => Arc::new(GithubContents::new()?),
        };
        let urls = UrlResolver::new(&self.config, self.thumbnails.clone())?;
        let (state, _) = watch::channel(CatalogState::default());

        Ok(CatalogFetcher {
            cache: self
                .cache
                .unwrap_or_else(|| Arc::new(CacheStore::memory_only())),
            provider,
            parser: self
                .parser
                .unwrap_or_else(|| Arc::new(DefaultFileNameParser)),
            thumbnails: self.thumbnails,
            settings: RwLock::new(Arc::new(Settings {
                config: self.config,
                urls,
            })),
            state,
            sequence: AtomicU64::new(0),
            closed: AtomicBool::new(false),
        })
    }
}
