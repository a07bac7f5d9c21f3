use std::collections::HashMap;

use serde::Serialize;

use crate::models::{CollectionEntry, GroupBy, ShelfFilter};

const UNKNOWN_GROUP: &str = "Unknown";

/// Home-screen shelf a book sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Shelf {
    Reading,
    ToRead,
    Finished,
}

impl Shelf {
    pub fn label(&self) -> &'static str {
        match self {
            Shelf::Reading => "Reading",
            Shelf::ToRead => "To Read",
            Shelf::Finished => "Finished",
        }
    }
}

pub fn shelf_for(entry: &CollectionEntry) -> Shelf {
    let total_pages = entry.book.total_pages;
    let record = &entry.record;
    let progress = record.progress.unwrap_or(0.0);

    if total_pages > 0 && (progress >= 100.0 || record.current_page >= total_pages) {
        Shelf::Finished
    } else if record.daily_goal.unwrap_or(0) > 0 {
        Shelf::Reading
    } else {
        Shelf::ToRead
    }
}

impl ShelfFilter {
    pub fn admits(&self, entry: &CollectionEntry) -> bool {
        match self {
            ShelfFilter::All => true,
            ShelfFilter::Reading => shelf_for(entry) == Shelf::Reading,
            ShelfFilter::ToRead => shelf_for(entry) == Shelf::ToRead,
            ShelfFilter::Finished => shelf_for(entry) == Shelf::Finished,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShelfGroups {
    pub reading: Vec<CollectionEntry>,
    pub to_read: Vec<CollectionEntry>,
    pub finished: Vec<CollectionEntry>,
}

/// Splits a listing into shelves, preserving the listing order on each.
pub fn sort_into_shelves(entries: &[CollectionEntry]) -> ShelfGroups {
    let mut groups = ShelfGroups::default();
    for entry in entries {
        let shelf = match shelf_for(entry) {
            Shelf::Reading => &mut groups.reading,
            Shelf::ToRead => &mut groups.to_read,
            Shelf::Finished => &mut groups.finished,
        };
        shelf.push(entry.clone());
    }
    groups
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionGroup {
    pub name: String,
    pub entries: Vec<CollectionEntry>,
}

/// Groups a listing by author or editor. Groups appear in first-seen order.
pub fn group_entries(entries: &[CollectionEntry], by: GroupBy) -> Vec<CollectionGroup> {
    let mut groups: Vec<CollectionGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for entry in entries {
        let key = match by {
            GroupBy::Author => entry.book.author.as_deref(),
            GroupBy::Editor => entry.book.editor.as_deref(),
        }
        .filter(|s| !s.is_empty())
        .unwrap_or(UNKNOWN_GROUP);

        match index.get(key) {
            Some(&i) => groups[i].entries.push(entry.clone()),
            None => {
                index.insert(key.to_string(), groups.len());
                groups.push(CollectionGroup {
                    name: key.to_string(),
                    entries: vec![entry.clone()],
                });
            }
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Book, ReadingRecord};
    use chrono::{NaiveDate, Utc};

    fn entry(title: &str, author: Option<&str>, editor: Option<&str>, total: u32) -> CollectionEntry {
        CollectionEntry {
            record: ReadingRecord::new(1, 1, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()),
            book: Book {
                id: 1,
                title: title.into(),
                author: author.map(Into::into),
                editor: editor.map(Into::into),
                total_pages: total,
                cover_url: None,
                created_at: Utc::now(),
            },
            note_count: 0,
        }
    }

    #[test]
    fn shelf_rules() {
        let to_read = entry("a", None, None, 100);
        assert_eq!(shelf_for(&to_read), Shelf::ToRead);

        let mut reading = entry("b", None, None, 100);
        reading.record.daily_goal = Some(10);
        reading.record.current_page = 40;
        assert_eq!(shelf_for(&reading), Shelf::Reading);

        let mut done = reading.clone();
        done.record.current_page = 100;
        assert_eq!(shelf_for(&done), Shelf::Finished);

        let mut by_progress = entry("c", None, None, 100);
        by_progress.record.progress = Some(100.0);
        assert_eq!(shelf_for(&by_progress), Shelf::Finished);

        assert!(ShelfFilter::Finished.admits(&done));
        assert!(!ShelfFilter::Reading.admits(&done));
        assert!(ShelfFilter::All.admits(&to_read));
    }

    #[test]
    fn shelves_keep_listing_order() {
        let mut first = entry("first", None, None, 100);
        first.record.daily_goal = Some(5);
        let mut second = entry("second", None, None, 100);
        second.record.daily_goal = Some(5);
        let idle = entry("idle", None, None, 100);

        let shelves = sort_into_shelves(&[first, idle, second]);
        let titles: Vec<&str> = shelves.reading.iter().map(|e| e.book.title.as_str()).collect();
        assert_eq!(titles, vec!["first", "second"]);
        assert_eq!(shelves.to_read.len(), 1);
        assert!(shelves.finished.is_empty());
    }

    #[test]
    fn grouping_uses_unknown_for_missing_values() {
        let entries = vec![
            entry("Dune", Some("Herbert"), Some("Ace"), 400),
            entry("Anonymous", None, Some("Ace"), 100),
            entry("Children of Dune", Some("Herbert"), None, 300),
        ];

        let by_author = group_entries(&entries, GroupBy::Author);
        let summary: Vec<(&str, usize)> =
            by_author.iter().map(|g| (g.name.as_str(), g.entries.len())).collect();
        assert_eq!(summary, vec![("Herbert", 2), ("Unknown", 1)]);

        let by_editor = group_entries(&entries, GroupBy::Editor);
        let summary: Vec<(&str, usize)> =
            by_editor.iter().map(|g| (g.name.as_str(), g.entries.len())).collect();
        assert_eq!(summary, vec![("Ace", 2), ("Unknown", 1)]);
    }
}
