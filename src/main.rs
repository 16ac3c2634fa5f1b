use clap::Parser;
use media_catalog::cache::{format_ttl, DEFAULT_MEMORY_CAPACITY};
use media_catalog::catalog::friendly_message;
use media_catalog::provider::{GithubContents, DEFAULT_API_BASE};
use media_catalog::{CacheStore, CatalogConfig, CatalogFetcher, FileBackend};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Print the media catalog of a repository folder as JSON.
#[derive(Debug, Parser)]
#[command(name = "media_catalog", version)]
struct Args {
    /// Repository owner.
    #[arg(long, env = "MEDIA_CATALOG_OWNER")]
    owner: String,

    /// Repository name.
    #[arg(long, env = "MEDIA_CATALOG_REPO")]
    repo: String,

    #[arg(long, default_value = "media")]
    media_folder: String,

    #[arg(long, default_value = "thumbnails")]
    thumbnail_folder: String,

    /// Branch used in thumbnail URLs.
    #[arg(long, default_value = "main")]
    branch: String,

    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Directory of the durable cache tier; memory only when omitted.
    #[arg(long, env = "MEDIA_CATALOG_CACHE_DIR")]
    cache_dir: Option<PathBuf>,

    /// Cache lifetime in seconds.
    #[arg(long, default_value_t = 3600)]
    ttl_secs: u64,

    #[arg(long, default_value = DEFAULT_API_BASE)]
    api_base: String,

    /// Ignore any cached listing.
    #[arg(long)]
    hard_refresh: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let ttl = Duration::from_secs(args.ttl_secs);

    let cache = match &args.cache_dir {
        Some(dir) => {
            let backend = FileBackend::new(dir).await?;
            CacheStore::with_durable(DEFAULT_MEMORY_CAPACITY, Arc::new(backend))
        }
        None => CacheStore::memory_only(),
    };

    let mut config = CatalogConfig::new(args.owner, args.repo)
        .with_media_folder(args.media_folder)
        .with_thumbnail_folder(args.thumbnail_folder)
        .with_cache_ttl(ttl);
    config.branch = args.branch;
    config.credential = args.token;

    let provider = GithubContents::builder().api_base(args.api_base).build()?;
    let fetcher = CatalogFetcher::builder(config)
        .cache(Arc::new(cache))
        .provider(Arc::new(provider))
        .build()?;

    info!("Cache lifetime: {}", format_ttl(ttl));
    let state = if args.hard_refresh {
        fetcher.hard_refresh().await
    } else {
        fetcher.refetch().await
    };

    let stats = fetcher.cache().stats().await;
    info!(
        "Cache holds {} entries in memory, {} on disk",
        stats.memory_entries, stats.durable_entries
    );

    if let Some(error) = state.error {
        return Err(friendly_message(&error).into());
    }
    println!("{}", serde_json::to_string_pretty(&*state.items)?);
    Ok(())
}
