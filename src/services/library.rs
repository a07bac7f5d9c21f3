use chrono::{NaiveDate, Utc};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::db::Repository;
use crate::error::{AppError, Result};
use crate::models::{
    CollectionEntry, CollectionSort, GroupBy, NewBook, NewNote, Note, ObjectiveRequest,
    ReadingRecord,
};
use crate::tracker::{
    self, AdvanceOutcome, AdvancePolicy, CollectionGroup, ShelfGroups, StatsReport,
};

/// One reader's view of the catalog: every operation is scoped to `user_id`.
pub struct Library {
    repository: Repository,
    user_id: i64,
    policy: AdvancePolicy,
    deadline_limit: usize,
}

impl Library {
    pub async fn open(config: &Config) -> Result<Self> {
        let repository = Repository::new(&config.db_path).await?;
        let user_id = repository.ensure_user(&config.reader_name).await?;
        Ok(Self {
            repository,
            user_id,
            policy: AdvancePolicy {
                once_per_day: config.advance_once_per_day,
            },
            deadline_limit: config.upcoming_deadline_limit,
        })
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    /// Adds a book to the collection, reusing a catalog entry with the same
    /// title and author when one exists.
    pub async fn add_book(&self, book: NewBook, today: NaiveDate) -> Result<CollectionEntry> {
        let book = book.validate()?;

        let book_id = match self
            .repository
            .find_existing_book(&book.title, book.author.as_deref())
            .await?
        {
            Some(existing) => {
                debug!(book_id = existing.id, "reusing catalog entry");
                existing.id
            }
            None => self.repository.insert_book(book.clone()).await?,
        };

        let record = ReadingRecord::new(self.user_id, book_id, today);
        if self.repository.insert_record(record).await?.is_none() {
            warn!(book_id, "book already in collection");
            return Err(AppError::DuplicateCollectionEntry { title: book.title });
        }

        info!(book_id, title = %book.title, "added book to collection");
        self.entry(book_id).await
    }

    pub async fn collection(&self, sort: CollectionSort) -> Result<Vec<CollectionEntry>> {
        self.repository.get_collection(self.user_id, sort).await
    }

    pub async fn grouped_collection(
        &self,
        sort: CollectionSort,
        by: GroupBy,
    ) -> Result<Vec<CollectionGroup>> {
        let entries = self.collection(sort).await?;
        Ok(tracker::group_entries(&entries, by))
    }

    /// Home shelves, newest additions first.
    pub async fn shelves(&self) -> Result<ShelfGroups> {
        let entries = self.collection(CollectionSort::DateDesc).await?;
        Ok(tracker::sort_into_shelves(&entries))
    }

    pub async fn entry(&self, book_id: i64) -> Result<CollectionEntry> {
        match self.repository.get_entry(self.user_id, book_id).await? {
            Some(entry) => Ok(entry),
            None if self.repository.get_book(book_id).await?.is_some() => {
                Err(AppError::NotInCollection(book_id))
            }
            None => Err(AppError::BookNotFound(book_id)),
        }
    }

    /// Stores a new objective and the fields derived from it.
    pub async fn set_objective(
        &self,
        book_id: i64,
        request: ObjectiveRequest,
        today: NaiveDate,
    ) -> Result<ReadingRecord> {
        if request.daily_goal == Some(0) {
            return Err(AppError::Validation(
                "Daily goal must be a positive number".to_string(),
            ));
        }

        let CollectionEntry { mut record, book, .. } = self.entry(book_id).await?;
        tracker::reconcile_record(&mut record, &book, &request, today)?;
        self.repository.save_record(&record).await?;

        info!(
            book_id,
            objective = request.objective.as_str(),
            daily_goal = ?record.daily_goal,
            deadline = ?record.deadline,
            "objective updated"
        );
        Ok(record)
    }

    /// Records the page the reader is on and re-derives the objective in the
    /// mode the reader last chose, keeping that mode's value.
    pub async fn update_current_page(
        &self,
        book_id: i64,
        page: i64,
        today: NaiveDate,
    ) -> Result<ReadingRecord> {
        let CollectionEntry { mut record, book, .. } = self.entry(book_id).await?;

        let page = u32::try_from(page)
            .map_err(|_| AppError::Validation(format!("page {page} cannot be negative")))?;
        if page > book.total_pages {
            return Err(AppError::Validation(format!(
                "page {page} is past the end of the book ({} pages)",
                book.total_pages
            )));
        }

        record.current_page = page;
        let request = record.current_objective().unwrap_or_default();
        tracker::reconcile_record(&mut record, &book, &request, today)?;
        self.repository.save_record(&record).await?;

        info!(book_id, current_page = page, "current page updated");
        Ok(record)
    }

    pub async fn advance_daily(&self, book_id: i64, today: NaiveDate) -> Result<AdvanceOutcome> {
        let CollectionEntry { mut record, book, .. } = self.entry(book_id).await?;

        let outcome = tracker::advance_with(&mut record, &book, today, self.policy)?;
        if outcome.message.is_none() {
            self.repository.save_record(&record).await?;
        }

        info!(
            book_id,
            current_page = outcome.current_page,
            complete = outcome.is_complete,
            "daily progress applied"
        );
        Ok(outcome)
    }

    pub async fn add_note(&self, book_id: i64, note: NewNote) -> Result<Note> {
        let (page, content) = note.validate()?;
        let entry = self.entry(book_id).await?;

        let id = self
            .repository
            .insert_note(entry.record.id, page, content.clone())
            .await?;

        debug!(book_id, note_id = id, "note added");
        Ok(Note {
            id,
            record_id: entry.record.id,
            page,
            content,
            created_at: Utc::now(),
        })
    }

    /// Notes for a book in the collection, newest first.
    pub async fn notes(&self, book_id: i64) -> Result<Vec<Note>> {
        let entry = self.entry(book_id).await?;
        self.repository.get_notes(entry.record.id).await
    }

    /// Drops a book from the collection together with its notes. The shared
    /// catalog entry stays.
    pub async fn remove(&self, book_id: i64) -> Result<()> {
        let entry = self.entry(book_id).await?;
        self.repository.delete_record(entry.record.id).await?;
        info!(book_id, "removed book from collection");
        Ok(())
    }

    pub async fn stats(&self, today: NaiveDate) -> Result<StatsReport> {
        let entries = self.collection(CollectionSort::DateDesc).await?;
        let report = tracker::aggregate_with_limit(&entries, today, self.deadline_limit);
        debug!(
            books = report.totals.books,
            fun_fact = report.fun_fact.as_str(),
            "stats computed"
        );
        Ok(report)
    }
}
