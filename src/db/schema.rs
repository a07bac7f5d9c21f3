pub const SCHEMA: &str = r#"
PRAGMA foreign_keys = ON;

-- users table
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- books table (shared catalog, deduplicated on title + author)
CREATE TABLE IF NOT EXISTS books (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    author TEXT,
    editor TEXT,
    total_pages INTEGER NOT NULL CHECK (total_pages > 0),
    cover_url TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_books_title_author ON books(title, author);

-- reading_records table (one per user and book)
CREATE TABLE IF NOT EXISTS reading_records (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    book_id INTEGER NOT NULL REFERENCES books(id) ON DELETE CASCADE,
    current_page INTEGER NOT NULL DEFAULT 0 CHECK (current_page >= 0),
    daily_goal INTEGER CHECK (daily_goal IS NULL OR daily_goal > 0),
    deadline TEXT,
    objective_type TEXT CHECK (objective_type IS NULL OR objective_type IN ('daily_goal', 'deadline')),
    progress REAL,
    last_advanced_on TEXT,
    created_at TEXT NOT NULL,
    UNIQUE(user_id, book_id)
);

CREATE INDEX IF NOT EXISTS idx_reading_records_user_id ON reading_records(user_id);

-- notes table
CREATE TABLE IF NOT EXISTS notes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    record_id INTEGER NOT NULL REFERENCES reading_records(id) ON DELETE CASCADE,
    page INTEGER,
    content TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_notes_record_id ON notes(record_id, created_at DESC);
"#;
