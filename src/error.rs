use thiserror::Error;

use crate::tracker::{AdvanceError, TrackerError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database connection error: {0}")]
    Connection(#[from] tokio_rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Total pages must be a positive number (got {0})")]
    InvalidTotalPages(i64),

    #[error("\"{title}\" is already in your collection")]
    DuplicateCollectionEntry { title: String },

    #[error("Book {0} not found")]
    BookNotFound(i64),

    #[error("Book {0} is not in your collection yet")]
    NotInCollection(i64),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error(transparent)]
    Advance(#[from] AdvanceError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<TrackerError> for AppError {
    fn from(err: TrackerError) -> Self {
        match err {
            TrackerError::InvalidTotalPages(pages) => AppError::InvalidTotalPages(pages),
        }
    }
}

impl AppError {
    /// HTTP-class status a caller should surface for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::InvalidTotalPages(_)
            | AppError::NotInCollection(_)
            | AppError::Validation(_)
            | AppError::Advance(_) => 400,
            AppError::BookNotFound(_) => 404,
            AppError::DuplicateCollectionEntry { .. } => 409,
            _ => 500,
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
