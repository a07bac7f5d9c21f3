//! Reading-progress engine.
//!
//! Everything in here is synchronous and free of I/O: callers load records,
//! hand them to these functions and persist whatever comes back.

mod advance;
mod objective;
mod shelves;
mod stats;

use thiserror::Error;

pub use advance::{advance, advance_with, AdvanceError, AdvanceOutcome, AdvancePolicy};
pub use objective::{reconcile, reconcile_record, whole_days_between, Objective};
pub use shelves::{group_entries, shelf_for, sort_into_shelves, CollectionGroup, Shelf, ShelfGroups};
pub use stats::{
    aggregate, aggregate_with_limit, AuthorCount, BookLength, FunFact, MonthCount, PageStats,
    ProgressBuckets, ProgressStats, StatsReport, Timeline, Totals, UpcomingDeadline,
    UPCOMING_DEADLINE_LIMIT,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackerError {
    #[error("total pages must be positive (got {0})")]
    InvalidTotalPages(i64),
}

/// `current / total * 100`, capped at 100. `None` when the book has no pages.
pub fn percent_of(current_page: u32, total_pages: u32) -> Option<f64> {
    if total_pages == 0 {
        return None;
    }
    Some((f64::from(current_page) / f64::from(total_pages) * 100.0).min(100.0))
}
