use crate::error::CatalogError;
use crate::provider::ListingError;
use http::StatusCode;
use serde::Serialize;

pub const RATE_LIMIT_MESSAGE: &str =
    "API rate limit exceeded. Please try again later or use a GitHub token.";
pub const NOT_FOUND_MESSAGE: &str =
    "Repository or folder not found. Please check the repository name and media folder path.";
pub const UNAUTHORIZED_MESSAGE: &str =
    "Unauthorized access. Please check your GitHub token permissions.";
pub const GENERIC_MESSAGE: &str = "Failed to fetch media files.";

pub const FRIENDLY_RATE_LIMIT: &str =
    "The limit to watch the media library within the last hour has been reached. Please try again later.";
pub const FRIENDLY_NOT_FOUND: &str =
    "The specified repository or folder could not be found. Please contact the administrator.";
pub const FRIENDLY_UNAUTHORIZED: &str =
    "Unauthorized access. Please check your GitHub token permissions.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    RateLimited,
    NotFound,
    Unauthorized,
    ProviderError,
    /// A custom filename parser refused an entry.
    ItemConstruction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedError {
    pub category: ErrorCategory,
    pub message: String,
}

/// Maps a raw provider failure to a stable category and message.
///
/// Checked in order: 403 with a rate-limit phrase, 404, 401; anything else
/// keeps its own message.
pub fn classify(error: &ListingError) -> ClassifiedError {
    let message = error.message.as_deref().filter(|m| !m.is_empty());
    let rate_limited = error.status == Some(StatusCode::FORBIDDEN)
        && message.is_some_and(|m| m.to_lowercase().contains("api rate limit"));

    let (category, message) = if rate_limited {
        (ErrorCategory::RateLimited, RATE_LIMIT_MESSAGE.to_string())
    } else if error.status == Some(StatusCode::NOT_FOUND) {
        (ErrorCategory::NotFound, NOT_FOUND_MESSAGE.to_string())
    } else if error.status == Some(StatusCode::UNAUTHORIZED) {
        (ErrorCategory::Unauthorized, UNAUTHORIZED_MESSAGE.to_string())
    } else {
        (
            ErrorCategory::ProviderError,
            message.unwrap_or(GENERIC_MESSAGE).to_string(),
        )
    };
    ClassifiedError { category, message }
}

/// Classifies any error a fetch can end with.
pub fn classify_catalog_error(error: &CatalogError) -> ClassifiedError {
    match error {
        CatalogError::Listing(listing) => classify(listing),
        CatalogError::ItemConstruction { .. } => ClassifiedError {
            category: ErrorCategory::ItemConstruction,
            message: error.to_string(),
        },
        other => ClassifiedError {
            category: ErrorCategory::ProviderError,
            message: other.to_string(),
        },
    }
}

/// End-user copy for a classified message, matched by substring.
///
/// Rate limit is tested before not found before unauthorized: messages are
/// free text and may contain more than one phrase.
pub fn friendly_message(message: &str) -> String {
    let lower = message.to_lowercase();
    if lower.contains("rate limit") {
        FRIENDLY_RATE_LIMIT.to_string()
    } else if lower.contains("not found") {
        FRIENDLY_NOT_FOUND.to_string()
    } else if lower.contains("unauthorized") {
        FRIENDLY_UNAUTHORIZED.to_string()
    } else {
        message.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(status: Option<u16>, message: Option<&str>) -> ListingError {
        ListingError::new(
            status.and_then(|s| StatusCode::from_u16(s).ok()),
            message.map(str::to_string),
        )
    }

    #[test]
    fn forbidden_with_rate_limit_phrase() {
        let classified = classify(&failure(Some(403), Some("API rate limit exceeded for 1.2.3.4")));
        assert_eq!(classified.category, ErrorCategory::RateLimited);
        assert_eq!(classified.message, RATE_LIMIT_MESSAGE);
    }

    #[test]
    fn forbidden_without_phrase_passes_through() {
        let classified = classify(&failure(Some(403), Some("Resource not accessible")));
        assert_eq!(classified.category, ErrorCategory::ProviderError);
        assert_eq!(classified.message, "Resource not accessible");
    }

    #[test]
    fn status_categories() {
        assert_eq!(classify(&failure(Some(404), Some("Not Found"))).category, ErrorCategory::NotFound);
        assert_eq!(classify(&failure(Some(401), None)).category, ErrorCategory::Unauthorized);
    }

    #[test]
    fn other_errors_keep_their_message() {
        let classified = classify(&failure(Some(500), Some("Server Error")));
        assert_eq!(classified.message, "Server Error");
        let classified = classify(&failure(None, Some("Request timed out")));
        assert_eq!(classified.message, "Request timed out");
    }

    #[test]
    fn missing_message_uses_generic_fallback() {
        assert_eq!(classify(&failure(Some(502), None)).message, GENERIC_MESSAGE);
        assert_eq!(classify(&failure(None, Some(""))).message, GENERIC_MESSAGE);
    }

    #[test]
    fn friendly_stage_prefers_rate_limit() {
        assert_eq!(friendly_message("Rate limit: repository not found"), FRIENDLY_RATE_LIMIT);
        assert_eq!(friendly_message(NOT_FOUND_MESSAGE), FRIENDLY_NOT_FOUND);
        assert_eq!(friendly_message("UNAUTHORIZED"), FRIENDLY_UNAUTHORIZED);
        assert_eq!(friendly_message("disk on fire"), "disk on fire");
    }

    #[test]
    fn parser_failures_have_their_own_category() {
        let error = CatalogError::ItemConstruction {
            file_name: "a.mp3".into(),
            message: "bad".into(),
        };
        let classified = classify_catalog_error(&error);
        assert_eq!(classified.category, ErrorCategory::ItemConstruction);
        assert!(classified.message.contains("a.mp3"));
    }
}
