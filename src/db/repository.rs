use chrono::{DateTime, Local, NaiveDate, Utc};
use rusqlite::{params, OptionalExtension, Row};
use tokio_rusqlite::Connection;

use crate::error::Result;
use crate::models::{Book, CollectionEntry, CollectionSort, Note, ReadingRecord, ValidBook};

use super::schema::SCHEMA;

const DATE_FORMAT: &str = "%Y-%m-%d";

const RECORD_COLUMNS: &str = "r.id, r.user_id, r.book_id, r.current_page, r.daily_goal, r.deadline, \
     r.objective_type, r.progress, r.last_advanced_on, r.created_at";
const BOOK_COLUMNS: &str = "b.id, b.title, b.author, b.editor, b.total_pages, b.cover_url, b.created_at";

pub struct Repository {
    conn: Connection,
}

impl Repository {
    pub async fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path).await?;

        conn.call(|conn| {
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await?;

        Ok(Self { conn })
    }

    // User operations

    /// Returns the id for `name`, creating the user on first use.
    pub async fn ensure_user(&self, name: &str) -> Result<i64> {
        let name = name.to_string();
        let id = self
            .conn
            .call(move |conn| {
                conn.execute(
                    "INSERT OR IGNORE INTO users (name) VALUES (?1)",
                    params![name],
                )?;
                let id = conn.query_row(
                    "SELECT id FROM users WHERE name = ?1",
                    params![name],
                    |row| row.get(0),
                )?;
                Ok(id)
            })
            .await?;
        Ok(id)
    }

    // Book operations

    /// Looks a book up by exact title and author; a missing author only
    /// matches another missing author.
    pub async fn find_existing_book(
        &self,
        title: &str,
        author: Option<&str>,
    ) -> Result<Option<Book>> {
        let title = title.to_string();
        let author = author.map(str::to_string);
        let book = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {BOOK_COLUMNS} FROM books b WHERE b.title = ?1 AND b.author IS ?2 \
                     ORDER BY b.id LIMIT 1"
                ))?;
                let book = stmt
                    .query_row(params![title, author], |row| book_from_row(row, 0))
                    .optional()?;
                Ok(book)
            })
            .await?;
        Ok(book)
    }

    pub async fn insert_book(&self, book: ValidBook) -> Result<i64> {
        let id = self
            .conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO books (title, author, editor, total_pages, cover_url) \
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![book.title, book.author, book.editor, book.total_pages, book.cover_url],
                )?;
                Ok(conn.last_insert_rowid())
            })
            .await?;
        Ok(id)
    }

    pub async fn get_book(&self, id: i64) -> Result<Option<Book>> {
        let book = self
            .conn
            .call(move |conn| {
                let mut stmt =
                    conn.prepare(&format!("SELECT {BOOK_COLUMNS} FROM books b WHERE b.id = ?1"))?;
                let book = stmt
                    .query_row(params![id], |row| book_from_row(row, 0))
                    .optional()?;
                Ok(book)
            })
            .await?;
        Ok(book)
    }

    // Reading record operations

    /// Inserts a record; returns `None` when the user already has the book.
    pub async fn insert_record(&self, record: ReadingRecord) -> Result<Option<i64>> {
        let id = self
            .conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                let exists: i64 = tx.query_row(
                    "SELECT COUNT(*) FROM reading_records WHERE user_id = ?1 AND book_id = ?2",
                    params![record.user_id, record.book_id],
                    |row| row.get(0),
                )?;
                if exists > 0 {
                    return Ok(None);
                }
                tx.execute(
                    r#"INSERT INTO reading_records
                           (user_id, book_id, current_page, daily_goal, deadline,
                            objective_type, progress, last_advanced_on, created_at)
                       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"#,
                    params![
                        record.user_id,
                        record.book_id,
                        record.current_page,
                        record.daily_goal,
                        record.deadline.map(format_date),
                        record.objective_type.map(|t| t.as_str()),
                        record.progress,
                        record.last_advanced_on.map(format_date),
                        format_date(record.created_at),
                    ],
                )?;
                let id = tx.last_insert_rowid();
                tx.commit()?;
                Ok(Some(id))
            })
            .await?;
        Ok(id)
    }

    /// The user's record for `book_id`, joined with its book and note count.
    pub async fn get_entry(&self, user_id: i64, book_id: i64) -> Result<Option<CollectionEntry>> {
        let entry = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    r#"SELECT {RECORD_COLUMNS}, {BOOK_COLUMNS},
                              (SELECT COUNT(*) FROM notes n WHERE n.record_id = r.id)
                       FROM reading_records r
                       JOIN books b ON r.book_id = b.id
                       WHERE r.user_id = ?1 AND r.book_id = ?2"#
                ))?;
                let entry = stmt
                    .query_row(params![user_id, book_id], entry_from_row)
                    .optional()?;
                Ok(entry)
            })
            .await?;
        Ok(entry)
    }

    pub async fn get_collection(
        &self,
        user_id: i64,
        sort: CollectionSort,
    ) -> Result<Vec<CollectionEntry>> {
        let entries = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    r#"SELECT {RECORD_COLUMNS}, {BOOK_COLUMNS},
                              (SELECT COUNT(*) FROM notes n WHERE n.record_id = r.id)
                       FROM reading_records r
                       JOIN books b ON r.book_id = b.id
                       WHERE r.user_id = ?1
                       ORDER BY {}"#,
                    sort.order_clause()
                ))?;
                let entries = stmt
                    .query_map(params![user_id], entry_from_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(entries)
            })
            .await?;
        Ok(entries)
    }

    /// Persists the mutable progress fields of a record.
    pub async fn save_record(&self, record: &ReadingRecord) -> Result<()> {
        let record = record.clone();
        self.conn
            .call(move |conn| {
                conn.execute(
                    r#"UPDATE reading_records
                       SET current_page = ?1, daily_goal = ?2, deadline = ?3,
                           objective_type = ?4, progress = ?5, last_advanced_on = ?6
                       WHERE id = ?7"#,
                    params![
                        record.current_page,
                        record.daily_goal,
                        record.deadline.map(format_date),
                        record.objective_type.map(|t| t.as_str()),
                        record.progress,
                        record.last_advanced_on.map(format_date),
                        record.id,
                    ],
                )?;
                Ok(())
            })
            .await?;
        Ok(())
    }

    /// Removes a record; its notes go with it.
    pub async fn delete_record(&self, id: i64) -> Result<()> {
        self.conn
            .call(move |conn| {
                conn.execute("DELETE FROM reading_records WHERE id = ?1", params![id])?;
                Ok(())
            })
            .await?;
        Ok(())
    }

    // Note operations

    pub async fn insert_note(&self, record_id: i64, page: Option<u32>, content: String) -> Result<i64> {
        let created_at = Utc::now().to_rfc3339();
        let id = self
            .conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO notes (record_id, page, content, created_at) VALUES (?1, ?2, ?3, ?4)",
                    params![record_id, page, content, created_at],
                )?;
                Ok(conn.last_insert_rowid())
            })
            .await?;
        Ok(id)
    }

    /// Notes for a record, newest first.
    pub async fn get_notes(&self, record_id: i64) -> Result<Vec<Note>> {
        let notes = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, record_id, page, content, created_at FROM notes \
                     WHERE record_id = ?1 ORDER BY created_at DESC, id DESC",
                )?;
                let notes = stmt
                    .query_map(params![record_id], note_from_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(notes)
            })
            .await?;
        Ok(notes)
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .ok()
        .or_else(|| parse_datetime(s).map(|dt| dt.date_naive()))
}

fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    // RFC3339 from our own inserts, e.g. "2026-01-11T12:34:56.123+00:00"
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    // SQLite datetime('now') default, e.g. "2026-01-11 12:34:56"
    if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    None
}

fn book_from_row(row: &Row, base: usize) -> rusqlite::Result<Book> {
    Ok(Book {
        id: row.get(base)?,
        title: row.get(base + 1)?,
        author: row.get(base + 2)?,
        editor: row.get(base + 3)?,
        total_pages: row.get(base + 4)?,
        cover_url: row.get(base + 5)?,
        created_at: row
            .get::<_, String>(base + 6)
            .ok()
            .and_then(|s| parse_datetime(&s))
            .unwrap_or_else(Utc::now),
    })
}

fn record_from_row(row: &Row) -> rusqlite::Result<ReadingRecord> {
    Ok(ReadingRecord {
        id: row.get(0)?,
        user_id: row.get(1)?,
        book_id: row.get(2)?,
        current_page: row.get(3)?,
        daily_goal: row.get(4)?,
        deadline: row
            .get::<_, Option<String>>(5)?
            .and_then(|s| parse_date(&s)),
        objective_type: row
            .get::<_, Option<String>>(6)?
            .and_then(|s| s.parse().ok()),
        progress: row.get(7)?,
        last_advanced_on: row
            .get::<_, Option<String>>(8)?
            .and_then(|s| parse_date(&s)),
        created_at: row
            .get::<_, String>(9)
            .ok()
            .and_then(|s| parse_date(&s))
            .unwrap_or_else(|| Local::now().date_naive()),
    })
}

fn entry_from_row(row: &Row) -> rusqlite::Result<CollectionEntry> {
    let note_count: i64 = row.get(17)?;
    Ok(CollectionEntry {
        record: record_from_row(row)?,
        book: book_from_row(row, 10)?,
        note_count: usize::try_from(note_count).unwrap_or(0),
    })
}

fn note_from_row(row: &Row) -> rusqlite::Result<Note> {
    Ok(Note {
        id: row.get(0)?,
        record_id: row.get(1)?,
        page: row.get(2)?,
        content: row.get(3)?,
        created_at: row
            .get::<_, String>(4)
            .ok()
            .and_then(|s| parse_datetime(&s))
            .unwrap_or_else(Utc::now),
    })
}
