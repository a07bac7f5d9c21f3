use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use super::percent_of;
use crate::models::{Book, ReadingRecord};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdvanceError {
    #[error("Daily goal or total pages missing.")]
    MissingGoalOrPages,

    #[error("Daily progress was already added on {0}.")]
    AlreadyAdvancedToday(NaiveDate),
}

/// Result body of a daily advance.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvanceOutcome {
    pub current_page: u32,
    pub total_pages: u32,
    pub progress_percent: u32,
    pub is_complete: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AdvancePolicy {
    /// Refuse a second advance on the same calendar day.
    pub once_per_day: bool,
}

/// Adds one day's worth of pages with the default (unguarded) policy.
pub fn advance(
    record: &mut ReadingRecord,
    book: &Book,
    today: NaiveDate,
) -> Result<AdvanceOutcome, AdvanceError> {
    advance_with(record, book, today, AdvancePolicy::default())
}

pub fn advance_with(
    record: &mut ReadingRecord,
    book: &Book,
    today: NaiveDate,
    policy: AdvancePolicy,
) -> Result<AdvanceOutcome, AdvanceError> {
    let total_pages = book.total_pages;
    let daily_goal = match record.daily_goal {
        Some(goal) if goal > 0 && total_pages > 0 => goal,
        _ => return Err(AdvanceError::MissingGoalOrPages),
    };

    let remaining = total_pages.saturating_sub(record.current_page);
    if remaining == 0 {
        return Ok(AdvanceOutcome {
            current_page: record.current_page,
            total_pages,
            progress_percent: rounded(record.current_page, total_pages),
            is_complete: true,
            message: Some("You have already finished this book.".to_string()),
        });
    }

    if policy.once_per_day && record.last_advanced_on == Some(today) {
        return Err(AdvanceError::AlreadyAdvancedToday(today));
    }

    let pages_to_add = daily_goal.min(remaining);
    record.current_page += pages_to_add;
    record.progress = percent_of(record.current_page, total_pages);
    record.last_advanced_on = Some(today);

    debug!(
        record_id = record.id,
        pages_to_add,
        current_page = record.current_page,
        "advanced daily progress"
    );

    Ok(AdvanceOutcome {
        current_page: record.current_page,
        total_pages,
        progress_percent: rounded(record.current_page, total_pages),
        is_complete: record.current_page >= total_pages,
        message: None,
    })
}

fn rounded(current_page: u32, total_pages: u32) -> u32 {
    percent_of(current_page, total_pages)
        .map(|p| p.round() as u32)
        .unwrap_or(0)
}
