use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::book::Book;
use crate::error::{AppError, Result};

/// Which objective field the reader set explicitly; the other one is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectiveType {
    #[default]
    DailyGoal,
    Deadline,
}

impl ObjectiveType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectiveType::DailyGoal => "daily_goal",
            ObjectiveType::Deadline => "deadline",
        }
    }
}

impl std::str::FromStr for ObjectiveType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "daily_goal" => Ok(ObjectiveType::DailyGoal),
            "deadline" => Ok(ObjectiveType::Deadline),
            other => Err(AppError::Validation(format!("unknown objective type '{other}'"))),
        }
    }
}

/// One objective submission: the chosen mode plus whatever values came with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ObjectiveRequest {
    pub objective: ObjectiveType,
    pub daily_goal: Option<u32>,
    pub deadline: Option<NaiveDate>,
}

impl ObjectiveRequest {
    pub fn daily_goal(pages: u32) -> Self {
        Self {
            objective: ObjectiveType::DailyGoal,
            daily_goal: Some(pages),
            deadline: None,
        }
    }

    pub fn deadline(date: NaiveDate) -> Self {
        Self {
            objective: ObjectiveType::Deadline,
            daily_goal: None,
            deadline: Some(date),
        }
    }

    /// Whether the request brings a value for its own mode.
    pub fn carries_value(&self) -> bool {
        match self.objective {
            ObjectiveType::DailyGoal => self.daily_goal.is_some_and(|goal| goal > 0),
            ObjectiveType::Deadline => self.deadline.is_some(),
        }
    }
}

/// A reader's progress state for one book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingRecord {
    pub id: i64,
    pub user_id: i64,
    pub book_id: i64,
    pub current_page: u32,
    pub daily_goal: Option<u32>,
    pub deadline: Option<NaiveDate>,
    /// The mode the reader chose last; the other objective field is derived.
    pub objective_type: Option<ObjectiveType>,
    /// Cached percentage, full precision.
    pub progress: Option<f64>,
    pub last_advanced_on: Option<NaiveDate>,
    pub created_at: NaiveDate,
}

impl ReadingRecord {
    /// Fresh record for a book just added to a collection.
    pub fn new(user_id: i64, book_id: i64, created_at: NaiveDate) -> Self {
        Self {
            id: 0,
            user_id,
            book_id,
            current_page: 0,
            daily_goal: None,
            deadline: None,
            objective_type: None,
            progress: None,
            last_advanced_on: None,
            created_at,
        }
    }

    /// Rebuilds the reader's last objective from the stored mode, used when a
    /// page edit needs a recompute without an explicit objective submission.
    pub fn current_objective(&self) -> Option<ObjectiveRequest> {
        match self.objective_type? {
            ObjectiveType::DailyGoal => self.daily_goal.map(ObjectiveRequest::daily_goal),
            ObjectiveType::Deadline => self.deadline.map(ObjectiveRequest::deadline),
        }
    }

    pub fn progress_percent(&self) -> Option<u32> {
        self.progress.map(|p| p.round() as u32)
    }
}

/// A record joined with its book and the number of notes it owns.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionEntry {
    pub record: ReadingRecord,
    pub book: Book,
    pub note_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: i64,
    pub record_id: i64,
    pub page: Option<u32>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct NewNote {
    pub page: Option<i64>,
    pub content: String,
}

impl NewNote {
    /// Parses `[page:] text`, e.g. `"42: great chapter"`.
    pub fn parse_line(line: &str) -> Self {
        if let Some((head, rest)) = line.split_once(':') {
            if let Ok(page) = head.trim().parse::<i64>() {
                return Self {
                    page: Some(page),
                    content: rest.trim().to_string(),
                };
            }
        }
        Self {
            page: None,
            content: line.trim().to_string(),
        }
    }

    pub fn validate(&self) -> Result<(Option<u32>, String)> {
        let content = self.content.trim();
        if content.is_empty() {
            return Err(AppError::Validation("note content cannot be empty".to_string()));
        }
        let page = match self.page {
            Some(p) if p >= 1 => Some(
                u32::try_from(p).map_err(|_| AppError::Validation(format!("page {p} is out of range")))?,
            ),
            Some(p) => return Err(AppError::Validation(format!("page {p} must be at least 1"))),
            None => None,
        };
        Ok((page, content.to_string()))
    }
}
