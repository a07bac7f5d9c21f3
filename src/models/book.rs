use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};
use crate::tracker::TrackerError;

/// Catalog entry shared by every reader who adds it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: Option<String>,
    pub editor: Option<String>,
    pub total_pages: u32,
    pub cover_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Raw book input, checked by [`NewBook::validate`] before it reaches the store.
#[derive(Debug, Clone, Default)]
pub struct NewBook {
    pub title: String,
    pub author: Option<String>,
    pub editor: Option<String>,
    pub total_pages: i64,
    pub cover_url: Option<String>,
}

/// A `NewBook` whose fields passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidBook {
    pub title: String,
    pub author: Option<String>,
    pub editor: Option<String>,
    pub total_pages: u32,
    pub cover_url: Option<String>,
}

impl NewBook {
    /// Parses the `Title;Author;Editor;Pages[;CoverUrl]` shorthand used by the
    /// add prompt and the `--add` flag. Empty segments become `None`.
    pub fn parse_line(line: &str) -> Result<Self> {
        let parts: Vec<&str> = line.split(';').map(str::trim).collect();
        if parts.len() < 4 {
            return Err(AppError::Validation(
                "expected Title;Author;Editor;Pages[;CoverUrl]".to_string(),
            ));
        }

        let total_pages = parts[3]
            .parse::<i64>()
            .map_err(|_| AppError::Validation(format!("'{}' is not a page count", parts[3])))?;

        Ok(Self {
            title: parts[0].to_string(),
            author: non_empty(parts[1]),
            editor: non_empty(parts[2]),
            total_pages,
            cover_url: parts.get(4).and_then(|s| non_empty(s)),
        })
    }

    pub fn validate(self) -> Result<ValidBook> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(AppError::Validation("Please enter a book title".to_string()));
        }

        let total_pages = positive_pages(self.total_pages)?;

        let cover_url = match self.cover_url.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => {
                let parsed = Url::parse(raw)
                    .map_err(|e| AppError::Validation(format!("invalid cover URL: {e}")))?;
                Some(parsed.to_string())
            }
            _ => None,
        };

        Ok(ValidBook {
            title,
            author: self.author.as_deref().and_then(non_empty),
            editor: self.editor.as_deref().and_then(non_empty),
            total_pages,
            cover_url,
        })
    }
}

fn positive_pages(pages: i64) -> std::result::Result<u32, TrackerError> {
    if pages <= 0 {
        return Err(TrackerError::InvalidTotalPages(pages));
    }
    u32::try_from(pages).map_err(|_| TrackerError::InvalidTotalPages(pages))
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
