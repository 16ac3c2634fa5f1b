use crate::provider::ListingError;

pub type Result<T> = std::result::Result<T, CatalogError>;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The listing provider failed; classified before it reaches the caller.
    #[error(transparent)]
    Listing(#[from] ListingError),

    /// A caller-supplied filename parser rejected an entry.
    #[error("Failed to build media item for {file_name}: {message}")]
    ItemConstruction { file_name: String, message: String },

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
