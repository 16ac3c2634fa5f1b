use super::{DirEntry, Listing, ListingError, ListingProvider};
use crate::error::{CatalogError, Result};
use async_trait::async_trait;
use http::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use url::Url;

pub const DEFAULT_API_BASE: &str = "https://api.github.com";

// Listing calls are small JSON documents; anything slower is treated as a failure.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub const DEFAULT_USER_AGENT: &str = concat!("media_catalog/", env!("CARGO_PKG_VERSION"));

const GITHUB_JSON: &str = "application/vnd.github+json";

#[derive(Deserialize)]
#[serde(untagged)]
enum ContentsResponse {
    Directory(Vec<DirEntry>),
    File(DirEntry),
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

/// Listing provider backed by the GitHub repository contents API.
#[derive(Debug, Clone)]
pub struct GithubContents {
    client: Client,
    api_base: Url,
}

impl GithubContents {
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    pub fn builder() -> GithubContentsBuilder {
        GithubContentsBuilder::default()
    }

    pub fn api_base(&self) -> &Url {
        &self.api_base
    }

    fn contents_url(&self, owner: &str, repo: &str, path: &str) -> std::result::Result<Url, ListingError> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| ListingError::transport(format!("Invalid API base: {}", self.api_base)))?
            .pop_if_empty()
            .extend(["repos", owner, repo, "contents"])
            .extend(path.split('/').filter(|segment| !segment.is_empty()));
        Ok(url)
    }
}

#[async_trait]
impl ListingProvider for GithubContents {
    async fn list_directory(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        credential: Option<&str>,
    ) -> std::result::Result<Listing, ListingError> {
        let url = self.contents_url(owner, repo, path)?;
        debug!("listing {}", url);

        let mut request = self.client.get(url).header(ACCEPT, GITHUB_JSON);
        if let Some(token) = credential.filter(|token| !token.is_empty()) {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ApiErrorBody>()
                .await
                .ok()
                .and_then(|body| body.message)
                .or_else(|| status.canonical_reason().map(str::to_string));
            return Err(ListingError::new(Some(status), message));
        }

        match response.json::<ContentsResponse>().await.map_err(transport_error)? {
            ContentsResponse::Directory(entries) => Ok(Listing::Directory(entries)),
            ContentsResponse::File(entry) => Ok(Listing::File(entry)),
        }
    }
}

fn transport_error(err: reqwest::Error) -> ListingError {
    if err.is_timeout() {
        ListingError::transport("Request timed out")
    } else if err.is_decode() {
        ListingError::transport(format!("Unexpected listing response: {}", err))
    } else {
        ListingError::transport(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct GithubContentsBuilder {
    api_base: String,
    timeout: Duration,
    user_agent: String,
}

impl Default for GithubContentsBuilder {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: REQUEST_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl GithubContentsBuilder {
    /// Point at another API host (GitHub Enterprise, a mirror, a test server).
    pub fn api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn build(self) -> Result<GithubContents> {
        let api_base = Url::parse(&self.api_base)?;
        let user_agent = HeaderValue::from_str(&self.user_agent)
            .map_err(|_| CatalogError::InvalidConfig(format!("invalid user agent: {}", self.user_agent)))?;
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, user_agent);

        let client = Client::builder()
            .timeout(self.timeout)
            .default_headers(headers)
            .build()?;
        Ok(GithubContents { client, api_base })
    }
}
