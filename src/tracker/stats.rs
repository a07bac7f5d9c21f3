use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::Serialize;

use super::{percent_of, whole_days_between};
use crate::models::CollectionEntry;

pub const UPCOMING_DEADLINE_LIMIT: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsReport {
    pub totals: Totals,
    pub pages: PageStats,
    pub progress: ProgressStats,
    pub timeline: Timeline,
    pub deadlines: Vec<UpcomingDeadline>,
    pub speed_score: f64,
    pub fun_fact: FunFact,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub books: usize,
    pub completed: usize,
    pub current_reads: usize,
    pub notes: usize,
    pub favorite_author: Option<AuthorCount>,
    pub longest_book: Option<BookLength>,
    pub shortest_book: Option<BookLength>,
    pub average_pages: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorCount {
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookLength {
    pub title: String,
    pub pages: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageStats {
    pub read: u64,
    pub remaining: u64,
    pub total: u64,
    pub daily_goal_total: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressStats {
    pub average: u32,
    pub completion_rate: u32,
    pub buckets: ProgressBuckets,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ProgressBuckets {
    #[serde(rename = "0-25%")]
    pub quarter: usize,
    #[serde(rename = "25-50%")]
    pub half: usize,
    #[serde(rename = "50-75%")]
    pub three_quarters: usize,
    #[serde(rename = "75-99%")]
    pub nearly_done: usize,
    #[serde(rename = "100%")]
    pub complete: usize,
}

impl ProgressBuckets {
    pub fn total(&self) -> usize {
        self.quarter + self.half + self.three_quarters + self.nearly_done + self.complete
    }

    /// Buckets in ascending order with their display labels.
    pub fn labelled(&self) -> [(&'static str, usize); 5] {
        [
            ("0-25%", self.quarter),
            ("25-50%", self.half),
            ("50-75%", self.three_quarters),
            ("75-99%", self.nearly_done),
            ("100%", self.complete),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Timeline {
    pub reading_since: Option<NaiveDate>,
    pub days_active: u64,
    pub books_by_month: Vec<MonthCount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthCount {
    /// `YYYY-MM`
    pub key: String,
    /// e.g. `Jan 2024`
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingDeadline {
    pub title: String,
    pub deadline: NaiveDate,
    pub remaining_days: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FunFact {
    #[serde(rename = "just beginning")]
    JustBeginning,
    #[serde(rename = "page slayer")]
    PageSlayer,
    #[serde(rename = "reflection master")]
    ReflectionMaster,
    #[serde(rename = "epic saga survivor")]
    EpicSagaSurvivor,
    #[serde(rename = "steady explorer")]
    SteadyExplorer,
}

impl FunFact {
    fn classify(pages_read: u64, completion_rate: u32, note_count: usize) -> Self {
        if pages_read == 0 {
            FunFact::JustBeginning
        } else if completion_rate >= 80 {
            FunFact::PageSlayer
        } else if note_count >= 10 {
            FunFact::ReflectionMaster
        } else if pages_read >= 5000 {
            FunFact::EpicSagaSurvivor
        } else {
            FunFact::SteadyExplorer
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FunFact::JustBeginning => "just beginning",
            FunFact::PageSlayer => "page slayer",
            FunFact::ReflectionMaster => "reflection master",
            FunFact::EpicSagaSurvivor => "epic saga survivor",
            FunFact::SteadyExplorer => "steady explorer",
        }
    }

    pub fn headline(&self) -> &'static str {
        match self {
            FunFact::JustBeginning => "Your adventure is just beginning",
            FunFact::PageSlayer => "Certified Page Slayer",
            FunFact::ReflectionMaster => "Reflection Master: your books are practically journals!",
            FunFact::EpicSagaSurvivor => "Epic Saga Survivor: that's a mountain of pages!",
            FunFact::SteadyExplorer => "Steady Explorer: consistency beats speed every time.",
        }
    }
}

pub fn aggregate(entries: &[CollectionEntry], today: NaiveDate) -> StatsReport {
    aggregate_with_limit(entries, today, UPCOMING_DEADLINE_LIMIT)
}

/// Folds a reader's whole collection into a [`StatsReport`], keeping at most
/// `deadline_limit` upcoming deadlines.
pub fn aggregate_with_limit(
    entries: &[CollectionEntry],
    today: NaiveDate,
    deadline_limit: usize,
) -> StatsReport {
    let total_books = entries.len();
    let mut completed = 0usize;
    let mut current_reads = 0usize;
    let mut pages_read = 0u64;
    let mut total_pages_in_collection = 0u64;
    let mut progress_sum = 0f64;
    let mut daily_goal_total = 0u64;
    let mut note_count = 0usize;
    let mut buckets = ProgressBuckets::default();

    let mut authors: Vec<AuthorCount> = Vec::new();
    let mut author_index: HashMap<&str, usize> = HashMap::new();
    let mut longest: Option<BookLength> = None;
    let mut shortest: Option<BookLength> = None;
    let mut by_month: BTreeMap<String, MonthCount> = BTreeMap::new();
    let mut earliest: Option<NaiveDate> = None;
    let mut deadlines: Vec<UpcomingDeadline> = Vec::new();

    for entry in entries {
        let record = &entry.record;
        let book = &entry.book;
        let total_pages = book.total_pages;
        let current_page = record.current_page;

        total_pages_in_collection += u64::from(total_pages);
        pages_read += u64::from(if total_pages > 0 {
            current_page.min(total_pages)
        } else {
            current_page
        });

        let progress = record
            .progress
            .or_else(|| percent_of(current_page, total_pages))
            .unwrap_or(0.0);
        progress_sum += progress;

        if progress >= 100.0 || (total_pages > 0 && current_page >= total_pages) {
            completed += 1;
            buckets.complete += 1;
        } else if progress >= 75.0 {
            buckets.nearly_done += 1;
            current_reads += 1;
        } else if progress >= 50.0 {
            buckets.three_quarters += 1;
            current_reads += 1;
        } else if progress >= 25.0 {
            buckets.half += 1;
            current_reads += 1;
        } else {
            buckets.quarter += 1;
            if current_page > 0 {
                current_reads += 1;
            }
        }

        if let Some(goal) = record.daily_goal {
            daily_goal_total += u64::from(goal);
        }

        if let Some(author) = book.author.as_deref().filter(|a| !a.is_empty()) {
            match author_index.get(author) {
                Some(&i) => authors[i].count += 1,
                None => {
                    author_index.insert(author, authors.len());
                    authors.push(AuthorCount {
                        name: author.to_string(),
                        count: 1,
                    });
                }
            }
        }

        note_count += entry.note_count;

        if total_pages > 0 {
            if longest.as_ref().map_or(true, |b| total_pages > b.pages) {
                longest = Some(BookLength {
                    title: book.title.clone(),
                    pages: total_pages,
                });
            }
            if shortest.as_ref().map_or(true, |b| total_pages < b.pages) {
                shortest = Some(BookLength {
                    title: book.title.clone(),
                    pages: total_pages,
                });
            }
        }

        let created_at = record.created_at;
        let key = created_at.format("%Y-%m").to_string();
        by_month
            .entry(key.clone())
            .or_insert_with(|| MonthCount {
                key,
                label: created_at.format("%b %Y").to_string(),
                count: 0,
            })
            .count += 1;
        if earliest.map_or(true, |e| created_at < e) {
            earliest = Some(created_at);
        }

        if let Some(deadline) = record.deadline.filter(|d| *d >= today) {
            deadlines.push(UpcomingDeadline {
                title: book.title.clone(),
                deadline,
                remaining_days: whole_days_between(today, deadline),
            });
        }
    }

    deadlines.sort_by_key(|d| d.deadline);
    deadlines.truncate(deadline_limit);

    let favorite_author = authors.into_iter().fold(None, |best: Option<AuthorCount>, a| {
        match best {
            Some(b) if b.count >= a.count => Some(b),
            _ => Some(a),
        }
    });

    let average_progress = ratio_rounded(progress_sum, total_books);
    let completion_rate = ratio_rounded(completed as f64 * 100.0, total_books);
    let average_pages = ratio_rounded(total_pages_in_collection as f64, total_books) as u64;
    let pages_remaining = total_pages_in_collection.saturating_sub(pages_read);

    let days_active = earliest
        .map(|e| whole_days_between(e, today).max(0) as u64 + 1)
        .unwrap_or(0);
    let speed_score = if days_active > 0 {
        (pages_read as f64 / days_active as f64 * 10.0).round() / 10.0
    } else {
        0.0
    };

    StatsReport {
        totals: Totals {
            books: total_books,
            completed,
            current_reads,
            notes: note_count,
            favorite_author,
            longest_book: longest,
            shortest_book: shortest,
            average_pages,
        },
        pages: PageStats {
            read: pages_read,
            remaining: pages_remaining,
            total: total_pages_in_collection,
            daily_goal_total,
        },
        progress: ProgressStats {
            average: average_progress,
            completion_rate,
            buckets,
        },
        timeline: Timeline {
            reading_since: earliest,
            days_active,
            books_by_month: by_month.into_values().collect(),
        },
        deadlines,
        speed_score,
        fun_fact: FunFact::classify(pages_read, completion_rate, note_count),
    }
}

fn ratio_rounded(sum: f64, count: usize) -> u32 {
    if count == 0 {
        return 0;
    }
    (sum / count as f64).round() as u32
}
