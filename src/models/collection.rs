use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Listing order for a reader's collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionSort {
    DateAsc,
    #[default]
    DateDesc,
    NameAsc,
    NameDesc,
}

impl CollectionSort {
    /// Unknown keys fall back to newest first.
    pub fn parse_or_default(s: &str) -> Self {
        match s {
            "date_asc" => CollectionSort::DateAsc,
            "date_desc" => CollectionSort::DateDesc,
            "name_asc" => CollectionSort::NameAsc,
            "name_desc" => CollectionSort::NameDesc,
            _ => CollectionSort::default(),
        }
    }

    pub fn cycle(&self) -> Self {
        match self {
            CollectionSort::DateDesc => CollectionSort::DateAsc,
            CollectionSort::DateAsc => CollectionSort::NameAsc,
            CollectionSort::NameAsc => CollectionSort::NameDesc,
            CollectionSort::NameDesc => CollectionSort::DateDesc,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CollectionSort::DateAsc => "Oldest",
            CollectionSort::DateDesc => "Newest",
            CollectionSort::NameAsc => "A-Z",
            CollectionSort::NameDesc => "Z-A",
        }
    }

    pub(crate) fn order_clause(&self) -> &'static str {
        match self {
            CollectionSort::DateAsc => "r.created_at ASC, r.id ASC",
            CollectionSort::DateDesc => "r.created_at DESC, r.id DESC",
            CollectionSort::NameAsc => "b.title COLLATE NOCASE ASC, r.id ASC",
            CollectionSort::NameDesc => "b.title COLLATE NOCASE DESC, r.id DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupBy {
    Author,
    Editor,
}

impl std::str::FromStr for GroupBy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "author" => Ok(GroupBy::Author),
            "editor" => Ok(GroupBy::Editor),
            other => Err(AppError::Validation(format!("cannot group by '{other}'"))),
        }
    }
}

/// Which home shelf the list pane shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShelfFilter {
    #[default]
    All,
    Reading,
    ToRead,
    Finished,
}

impl ShelfFilter {
    pub fn cycle(&self) -> Self {
        match self {
            ShelfFilter::All => ShelfFilter::Reading,
            ShelfFilter::Reading => ShelfFilter::ToRead,
            ShelfFilter::ToRead => ShelfFilter::Finished,
            ShelfFilter::Finished => ShelfFilter::All,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ShelfFilter::All => "All",
            ShelfFilter::Reading => "Reading",
            ShelfFilter::ToRead => "To Read",
            ShelfFilter::Finished => "Finished",
        }
    }
}
