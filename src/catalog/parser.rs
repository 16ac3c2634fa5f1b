use super::media_extension;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CATEGORY: &str = "General";
pub const UNKNOWN_AUTHOR: &str = "Unknown";
pub const UNKNOWN_DATE: &str = "Unknown";

/// Display metadata derived from a media filename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedName {
    pub category: String,
    pub title: String,
    pub author: String,
    pub date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ParseNameError(pub String);

impl ParseNameError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Turns a raw filename into display metadata.
///
/// A custom implementation fully replaces [`DefaultFileNameParser`]. Its
/// errors are not recovered: the fetch that hit them fails.
pub trait FileNameParser: Send + Sync {
    fn parse(&self, file_name: &str) -> Result<ParsedName, ParseNameError>;
}

impl<F> FileNameParser for F
where
    F: Fn(&str) -> Result<ParsedName, ParseNameError> + Send + Sync,
{
    fn parse(&self, file_name: &str) -> Result<ParsedName, ParseNameError> {
        self(file_name)
    }
}

/// `Category_Title_Author[_Author...][_YYYY-MM-DD].ext`, dashes read as spaces.
///
/// Names with fewer than three underscore segments become
/// `General / <whole name> / Unknown`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFileNameParser;

impl DefaultFileNameParser {
    pub fn parse_name(&self, file_name: &str) -> ParsedName {
        let stem = strip_media_extension(file_name);
        let mut parts: Vec<&str> = stem.split('_').collect();

        let mut date = None;
        if parts.len() >= 4 && parts.last().is_some_and(|last| is_date_shaped(last)) {
            date = parts
                .pop()
                .filter(|segment| NaiveDate::parse_from_str(segment, "%Y-%m-%d").is_ok())
                .map(str::to_string);
        }

        if parts.len() >= 3 {
            ParsedName {
                category: dashes_to_spaces(parts[0]),
                title: dashes_to_spaces(parts[1]),
                author: dashes_to_spaces(&parts[2..].join(" ")),
                date: Some(date.unwrap_or_else(|| UNKNOWN_DATE.to_string())),
            }
        } else {
            ParsedName {
                category: DEFAULT_CATEGORY.to_string(),
                title: dashes_to_spaces(stem),
                author: UNKNOWN_AUTHOR.to_string(),
                date: Some(UNKNOWN_DATE.to_string()),
            }
        }
    }
}

impl FileNameParser for DefaultFileNameParser {
    fn parse(&self, file_name: &str) -> Result<ParsedName, ParseNameError> {
        Ok(self.parse_name(file_name))
    }
}

/// `file_name` without its recognized media extension; other names are
/// returned whole.
pub fn strip_media_extension(file_name: &str) -> &str {
    match media_extension(file_name) {
        Some(ext) => &file_name[..file_name.len() - ext.len() - 1],
        None => file_name,
    }
}

fn dashes_to_spaces(s: &str) -> String {
    s.replace('-', " ")
}

/// `YYYY-MM-DD` by shape; calendar validity is checked separately.
fn is_date_shaped(segment: &str) -> bool {
    let bytes = segment.as_bytes();
    bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit())
}
