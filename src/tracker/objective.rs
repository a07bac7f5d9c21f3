use chrono::{Days, NaiveDate};
use tracing::debug;

use super::{percent_of, TrackerError};
use crate::models::{Book, ObjectiveRequest, ObjectiveType, ReadingRecord};

/// The objective fields of a reading record.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Objective {
    pub daily_goal: Option<u32>,
    pub deadline: Option<NaiveDate>,
    pub progress: Option<f64>,
}

impl Objective {
    pub fn of(record: &ReadingRecord) -> Self {
        Self {
            daily_goal: record.daily_goal,
            deadline: record.deadline,
            progress: record.progress,
        }
    }
}

/// Signed number of whole days from `from` to `to`.
pub fn whole_days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// Recomputes the derived objective field and progress from the one the
/// reader chose. `total_pages` must be positive and `current_page` already
/// clamped to it.
pub fn reconcile(
    total_pages: u32,
    current_page: u32,
    request: &ObjectiveRequest,
    prior: Objective,
    today: NaiveDate,
) -> Objective {
    debug_assert!(total_pages > 0);
    let remaining = total_pages.saturating_sub(current_page);

    if remaining == 0 {
        return Objective {
            daily_goal: None,
            deadline: None,
            progress: Some(100.0),
        };
    }

    let mut next = prior;

    match request.objective {
        ObjectiveType::DailyGoal => {
            if let Some(goal) = request.daily_goal.filter(|g| *g > 0) {
                let days_needed = remaining.div_ceil(goal);
                next.daily_goal = Some(goal);
                next.deadline = Some(
                    today
                        .checked_add_days(Days::new(u64::from(days_needed)))
                        .unwrap_or(NaiveDate::MAX),
                );
            }
        }
        ObjectiveType::Deadline => {
            if let Some(deadline) = request.deadline {
                // Today or past deadlines collapse to a single day.
                let days_remaining = whole_days_between(today, deadline).max(1) as u64;
                let goal = u64::from(remaining).div_ceil(days_remaining);
                next.daily_goal = Some(u32::try_from(goal).unwrap_or(u32::MAX));
                next.deadline = Some(deadline);
            }
        }
    }

    next.progress = if current_page > 0 {
        percent_of(current_page, total_pages)
    } else if prior.progress.is_some() {
        Some(0.0)
    } else {
        None
    };

    next
}

/// Applies [`reconcile`] to a stored record. Nothing is written when the
/// book's page count is invalid.
pub fn reconcile_record(
    record: &mut ReadingRecord,
    book: &Book,
    request: &ObjectiveRequest,
    today: NaiveDate,
) -> Result<(), TrackerError> {
    if book.total_pages == 0 {
        return Err(TrackerError::InvalidTotalPages(0));
    }

    let current_page = record.current_page.min(book.total_pages);
    let next = reconcile(
        book.total_pages,
        current_page,
        request,
        Objective::of(record),
        today,
    );

    debug!(
        record_id = record.id,
        objective = request.objective.as_str(),
        daily_goal = ?next.daily_goal,
        deadline = ?next.deadline,
        "reconciled objective"
    );

    record.current_page = current_page;
    record.daily_goal = next.daily_goal;
    record.deadline = next.deadline;
    record.progress = next.progress;
    if request.carries_value() {
        record.objective_type = Some(request.objective);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn book(total_pages: u32) -> Book {
        Book {
            id: 1,
            title: "Middlemarch".into(),
            author: Some("George Eliot".into()),
            editor: None,
            total_pages,
            cover_url: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn daily_goal_sets_deadline_and_leaves_progress_unset() {
        let out = reconcile(
            300,
            0,
            &ObjectiveRequest::daily_goal(30),
            Objective::default(),
            date(2024, 1, 1),
        );
        assert_eq!(out.daily_goal, Some(30));
        assert_eq!(out.deadline, Some(date(2024, 1, 11)));
        assert_eq!(out.progress, None);
    }

    #[test]
    fn deadline_sets_daily_goal() {
        let out = reconcile(
            200,
            50,
            &ObjectiveRequest::deadline(date(2024, 1, 21)),
            Objective::default(),
            date(2024, 1, 1),
        );
        assert_eq!(out.daily_goal, Some(8));
        assert_eq!(out.deadline, Some(date(2024, 1, 21)));
        assert_eq!(out.progress, Some(25.0));
    }

    #[test]
    fn finished_book_clears_objective() {
        let prior = Objective {
            daily_goal: Some(10),
            deadline: Some(date(2024, 3, 1)),
            progress: Some(90.0),
        };
        for current in [200, 250] {
            for request in [
                ObjectiveRequest::daily_goal(5),
                ObjectiveRequest::deadline(date(2024, 2, 1)),
                ObjectiveRequest::default(),
            ] {
                let out = reconcile(200, current.min(200), &request, prior, date(2024, 1, 1));
                assert_eq!(
                    out,
                    Objective {
                        daily_goal: None,
                        deadline: None,
                        progress: Some(100.0)
                    }
                );
            }
        }
    }

    #[test]
    fn past_or_same_day_deadline_uses_one_day() {
        let today = date(2024, 5, 10);
        for deadline in [today, date(2024, 5, 1)] {
            let out = reconcile(
                100,
                40,
                &ObjectiveRequest::deadline(deadline),
                Objective::default(),
                today,
            );
            assert_eq!(out.daily_goal, Some(60));
            assert_eq!(out.deadline, Some(deadline));
        }
    }

    #[test]
    fn missing_value_keeps_previous_objective() {
        let prior = Objective {
            daily_goal: Some(12),
            deadline: Some(date(2024, 2, 1)),
            progress: Some(10.0),
        };
        let request = ObjectiveRequest {
            objective: ObjectiveType::Deadline,
            daily_goal: Some(99),
            deadline: None,
        };
        let out = reconcile(100, 20, &request, prior, date(2024, 1, 1));
        assert_eq!(out.daily_goal, Some(12));
        assert_eq!(out.deadline, Some(date(2024, 2, 1)));
        assert_eq!(out.progress, Some(20.0));
    }

    #[test]
    fn zero_goal_is_ignored() {
        let out = reconcile(
            100,
            0,
            &ObjectiveRequest::daily_goal(0),
            Objective::default(),
            date(2024, 1, 1),
        );
        assert_eq!(out, Objective::default());
    }

    #[test]
    fn page_reset_to_zero_resets_cached_progress() {
        let prior = Objective {
            daily_goal: Some(10),
            deadline: None,
            progress: Some(40.0),
        };
        let out = reconcile(100, 0, &ObjectiveRequest::daily_goal(10), prior, date(2024, 1, 1));
        assert_eq!(out.progress, Some(0.0));
        assert_eq!(out.deadline, Some(date(2024, 1, 11)));
    }

    #[test]
    fn goal_deadline_round_trip_never_raises_goal() {
        let today = date(2024, 1, 1);
        for total in [1u32, 7, 99, 300, 1234] {
            for current in [0, total / 3, total.saturating_sub(1)] {
                for goal in [1u32, 3, 8, 25, 400] {
                    let forward = reconcile(
                        total,
                        current,
                        &ObjectiveRequest::daily_goal(goal),
                        Objective::default(),
                        today,
                    );
                    let deadline = forward.deadline.unwrap();
                    let back = reconcile(
                        total,
                        current,
                        &ObjectiveRequest::deadline(deadline),
                        forward,
                        today,
                    );
                    assert!(back.daily_goal.unwrap() <= goal, "total={total} current={current} goal={goal}");
                }
            }
        }
    }

    #[test]
    fn reconcile_record_clamps_page_and_rejects_empty_book() {
        let mut record = ReadingRecord::new(1, 1, date(2024, 1, 1));
        record.current_page = 500;
        reconcile_record(
            &mut record,
            &book(300),
            &ObjectiveRequest::daily_goal(20),
            date(2024, 1, 1),
        )
        .unwrap();
        assert_eq!(record.current_page, 300);
        assert_eq!(record.daily_goal, None);
        assert_eq!(record.deadline, None);
        assert_eq!(record.progress, Some(100.0));

        let before = record.clone();
        let err = reconcile_record(
            &mut record,
            &book(0),
            &ObjectiveRequest::daily_goal(20),
            date(2024, 1, 1),
        )
        .unwrap_err();
        assert_eq!(err, TrackerError::InvalidTotalPages(0));
        assert_eq!(record, before);
    }

    #[test]
    fn reconcile_record_remembers_chosen_mode() {
        let mut record = ReadingRecord::new(1, 1, date(2024, 1, 1));
        record.current_page = 50;
        reconcile_record(
            &mut record,
            &book(200),
            &ObjectiveRequest::deadline(date(2024, 1, 21)),
            date(2024, 1, 1),
        )
        .unwrap();
        assert_eq!(record.objective_type, Some(ObjectiveType::Deadline));
        assert_eq!(record.daily_goal, Some(8));

        record.current_page = 60;
        let request = record.current_objective().unwrap();
        reconcile_record(&mut record, &book(200), &request, date(2024, 1, 1)).unwrap();
        assert_eq!(record.deadline, Some(date(2024, 1, 21)));
        assert_eq!(record.daily_goal, Some(7));
        assert_eq!(record.objective_type, Some(ObjectiveType::Deadline));

        reconcile_record(
            &mut record,
            &book(200),
            &ObjectiveRequest::default(),
            date(2024, 1, 1),
        )
        .unwrap();
        assert_eq!(record.objective_type, Some(ObjectiveType::Deadline));
    }
}
