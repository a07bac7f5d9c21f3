use chrono::NaiveDate;
use tempfile::TempDir;

use bookpace::config::Config;
use bookpace::error::AppError;
use bookpace::models::{
    CollectionSort, GroupBy, NewBook, NewNote, ObjectiveRequest, ObjectiveType,
};
use bookpace::services::Library;
use bookpace::tracker::{AdvanceError, FunFact};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn config(dir: &TempDir, reader: &str) -> Config {
    Config {
        db_path: dir.path().join("library.db").to_string_lossy().to_string(),
        reader_name: reader.to_string(),
        default_sort: CollectionSort::DateDesc,
        advance_once_per_day: false,
        upcoming_deadline_limit: 4,
    }
}

fn book(title: &str, author: Option<&str>, pages: i64) -> NewBook {
    NewBook {
        title: title.to_string(),
        author: author.map(str::to_string),
        editor: None,
        total_pages: pages,
        cover_url: None,
    }
}

async fn open(dir: &TempDir) -> Library {
    Library::open(&config(dir, "reader")).await.unwrap()
}

#[tokio::test]
async fn duplicate_add_is_rejected_but_catalog_is_shared() {
    let dir = TempDir::new().unwrap();
    let alice = Library::open(&config(&dir, "alice")).await.unwrap();
    let bob = Library::open(&config(&dir, "bob")).await.unwrap();
    let today = date(2024, 1, 1);

    let first = alice.add_book(book("Dune", Some("Frank Herbert"), 412), today).await.unwrap();
    let err = alice
        .add_book(book("Dune", Some("Frank Herbert"), 412), today)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::DuplicateCollectionEntry { ref title } if title == "Dune"));
    assert_eq!(err.status_code(), 409);

    let shared = bob.add_book(book("Dune", Some("Frank Herbert"), 412), today).await.unwrap();
    assert_eq!(shared.book.id, first.book.id);
    assert_ne!(shared.record.id, first.record.id);

    let other_author = alice.add_book(book("Dune", None, 412), today).await.unwrap();
    assert_ne!(other_author.book.id, first.book.id);

    assert_eq!(alice.collection(CollectionSort::DateDesc).await.unwrap().len(), 2);
    assert_eq!(bob.collection(CollectionSort::DateDesc).await.unwrap().len(), 1);
}

#[tokio::test]
async fn invalid_books_never_reach_the_store() {
    let dir = TempDir::new().unwrap();
    let library = open(&dir).await;

    let err = library.add_book(book("Nothing", None, 0), date(2024, 1, 1)).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidTotalPages(0)));
    assert!(library.collection(CollectionSort::DateDesc).await.unwrap().is_empty());
}

#[tokio::test]
async fn daily_goal_objective_derives_deadline() {
    let dir = TempDir::new().unwrap();
    let library = open(&dir).await;
    let today = date(2024, 1, 1);
    let entry = library.add_book(book("Anna Karenina", None, 300), today).await.unwrap();

    let record = library
        .set_objective(entry.book.id, ObjectiveRequest::daily_goal(30), today)
        .await
        .unwrap();
    assert_eq!(record.daily_goal, Some(30));
    assert_eq!(record.deadline, Some(date(2024, 1, 11)));
    assert_eq!(record.progress, None);

    let stored = library.entry(entry.book.id).await.unwrap().record;
    assert_eq!(stored, record);
}

#[tokio::test]
async fn deadline_objective_derives_daily_goal() {
    let dir = TempDir::new().unwrap();
    let library = open(&dir).await;
    let today = date(2024, 1, 1);
    let entry = library.add_book(book("Emma", None, 200), today).await.unwrap();

    library.update_current_page(entry.book.id, 50, today).await.unwrap();
    let record = library
        .set_objective(entry.book.id, ObjectiveRequest::deadline(date(2024, 1, 21)), today)
        .await
        .unwrap();
    assert_eq!(record.daily_goal, Some(8));
    assert_eq!(record.deadline, Some(date(2024, 1, 21)));
    assert_eq!(record.progress, Some(25.0));
}

#[tokio::test]
async fn page_updates_are_checked_and_rederive_objective() {
    let dir = TempDir::new().unwrap();
    let library = open(&dir).await;
    let today = date(2024, 1, 1);
    let id = library.add_book(book("Persuasion", None, 100), today).await.unwrap().book.id;

    library
        .set_objective(id, ObjectiveRequest::daily_goal(10), today)
        .await
        .unwrap();

    let record = library.update_current_page(id, 60, today).await.unwrap();
    assert_eq!(record.deadline, Some(date(2024, 1, 5)));
    assert_eq!(record.progress, Some(60.0));

    assert!(matches!(
        library.update_current_page(id, 101, today).await,
        Err(AppError::Validation(_))
    ));
    assert!(matches!(
        library.update_current_page(id, -1, today).await,
        Err(AppError::Validation(_))
    ));

    let finished = library.update_current_page(id, 100, today).await.unwrap();
    assert_eq!(finished.daily_goal, None);
    assert_eq!(finished.deadline, None);
    assert_eq!(finished.progress, Some(100.0));
}

#[tokio::test]
async fn page_update_keeps_the_chosen_deadline() {
    let dir = TempDir::new().unwrap();
    let library = open(&dir).await;
    let today = date(2024, 1, 1);
    let id = library.add_book(book("Emma", None, 200), today).await.unwrap().book.id;

    library.update_current_page(id, 50, today).await.unwrap();
    let set = library
        .set_objective(id, ObjectiveRequest::deadline(date(2024, 1, 21)), today)
        .await
        .unwrap();
    assert_eq!(set.daily_goal, Some(8));
    assert_eq!(set.objective_type, Some(ObjectiveType::Deadline));

    let record = library.update_current_page(id, 60, today).await.unwrap();
    assert_eq!(record.deadline, Some(date(2024, 1, 21)));
    assert_eq!(record.daily_goal, Some(7));

    let stored = library.entry(id).await.unwrap().record;
    assert_eq!(stored.deadline, Some(date(2024, 1, 21)));
    assert_eq!(stored.objective_type, Some(ObjectiveType::Deadline));

    let later = library.update_current_page(id, 100, date(2024, 1, 11)).await.unwrap();
    assert_eq!(later.deadline, Some(date(2024, 1, 21)));
    assert_eq!(later.daily_goal, Some(10));
}

#[tokio::test]
async fn advance_adds_goal_and_stops_at_the_end() {
    let dir = TempDir::new().unwrap();
    let library = open(&dir).await;
    let today = date(2024, 1, 1);
    let id = library.add_book(book("Ulysses", None, 200), today).await.unwrap().book.id;

    library
        .set_objective(id, ObjectiveRequest::daily_goal(8), today)
        .await
        .unwrap();
    library.update_current_page(id, 190, today).await.unwrap();

    let out = library.advance_daily(id, today).await.unwrap();
    assert_eq!((out.current_page, out.progress_percent, out.is_complete), (198, 99, false));

    let out = library.advance_daily(id, today).await.unwrap();
    assert_eq!((out.current_page, out.progress_percent, out.is_complete), (200, 100, true));

    let again = library.advance_daily(id, today).await.unwrap();
    assert_eq!(again.current_page, 200);
    assert!(again.is_complete);
    assert!(again.message.is_some());

    assert_eq!(library.entry(id).await.unwrap().record.current_page, 200);
}

#[tokio::test]
async fn advance_without_goal_is_a_client_error() {
    let dir = TempDir::new().unwrap();
    let library = open(&dir).await;
    let today = date(2024, 1, 1);
    let entry = library.add_book(book("Walden", None, 150), today).await.unwrap();

    let err = library.advance_daily(entry.book.id, today).await.unwrap_err();
    assert!(matches!(err, AppError::Advance(AdvanceError::MissingGoalOrPages)));
    assert_eq!(err.status_code(), 400);
    assert_eq!(library.entry(entry.book.id).await.unwrap().record, entry.record);
}

#[tokio::test]
async fn once_per_day_guard_is_opt_in() {
    let dir = TempDir::new().unwrap();
    let mut cfg = config(&dir, "reader");
    cfg.advance_once_per_day = true;
    let library = Library::open(&cfg).await.unwrap();
    let today = date(2024, 1, 1);
    let id = library.add_book(book("Beloved", None, 300), today).await.unwrap().book.id;
    library
        .set_objective(id, ObjectiveRequest::daily_goal(20), today)
        .await
        .unwrap();

    library.advance_daily(id, today).await.unwrap();
    let err = library.advance_daily(id, today).await.unwrap_err();
    assert!(matches!(err, AppError::Advance(AdvanceError::AlreadyAdvancedToday(d)) if d == today));

    let next = library.advance_daily(id, date(2024, 1, 2)).await.unwrap();
    assert_eq!(next.current_page, 40);
}

#[tokio::test]
async fn notes_are_listed_newest_first_and_removed_with_the_record() {
    let dir = TempDir::new().unwrap();
    let library = open(&dir).await;
    let today = date(2024, 1, 1);
    let id = library.add_book(book("Moby-Dick", None, 600), today).await.unwrap().book.id;

    library.add_note(id, NewNote::parse_line("12: Call me Ishmael")).await.unwrap();
    library.add_note(id, NewNote::parse_line("the whale, finally")).await.unwrap();
    assert!(matches!(
        library.add_note(id, NewNote::parse_line("   ")).await,
        Err(AppError::Validation(_))
    ));

    let notes = library.notes(id).await.unwrap();
    let contents: Vec<&str> = notes.iter().map(|n| n.content.as_str()).collect();
    assert_eq!(contents, vec!["the whale, finally", "Call me Ishmael"]);
    assert_eq!(notes[1].page, Some(12));
    assert_eq!(library.entry(id).await.unwrap().note_count, 2);

    library.remove(id).await.unwrap();
    assert!(matches!(library.notes(id).await, Err(AppError::NotInCollection(_))));

    let readded = library.add_book(book("Moby-Dick", None, 600), today).await.unwrap();
    assert_eq!(readded.book.id, id);
    assert_eq!(readded.note_count, 0);
    assert!(library.notes(id).await.unwrap().is_empty());
}

#[tokio::test]
async fn unknown_book_is_not_found() {
    let dir = TempDir::new().unwrap();
    let library = open(&dir).await;
    let err = library.entry(9999).await.unwrap_err();
    assert!(matches!(err, AppError::BookNotFound(9999)));
    assert_eq!(err.status_code(), 404);
}

#[tokio::test]
async fn collection_sorting_and_grouping() {
    let dir = TempDir::new().unwrap();
    let library = open(&dir).await;

    library.add_book(book("Middlemarch", Some("George Eliot"), 880), date(2024, 1, 1)).await.unwrap();
    library.add_book(book("Adam Bede", Some("George Eliot"), 600), date(2024, 2, 1)).await.unwrap();
    library.add_book(book("Sula", Some("Toni Morrison"), 192), date(2024, 3, 1)).await.unwrap();

    let titles = |entries: Vec<bookpace::models::CollectionEntry>| {
        entries.into_iter().map(|e| e.book.title).collect::<Vec<_>>()
    };

    assert_eq!(
        titles(library.collection(CollectionSort::DateDesc).await.unwrap()),
        vec!["Sula", "Adam Bede", "Middlemarch"]
    );
    assert_eq!(
        titles(library.collection(CollectionSort::NameAsc).await.unwrap()),
        vec!["Adam Bede", "Middlemarch", "Sula"]
    );

    let groups = library
        .grouped_collection(CollectionSort::DateAsc, GroupBy::Author)
        .await
        .unwrap();
    let summary: Vec<(String, usize)> = groups.into_iter().map(|g| (g.name, g.entries.len())).collect();
    assert_eq!(
        summary,
        vec![("George Eliot".to_string(), 2), ("Toni Morrison".to_string(), 1)]
    );

    let shelves = library.shelves().await.unwrap();
    assert_eq!(shelves.to_read.len(), 3);
}

#[tokio::test]
async fn stats_over_empty_and_populated_collections() {
    let dir = TempDir::new().unwrap();
    let library = open(&dir).await;

    let empty = library.stats(date(2024, 1, 1)).await.unwrap();
    assert_eq!(empty.totals.books, 0);
    assert_eq!(empty.progress.average, 0);
    assert_eq!(empty.progress.completion_rate, 0);
    assert_eq!(empty.fun_fact, FunFact::JustBeginning);

    let start = date(2024, 1, 1);
    let done = library.add_book(book("Sula", Some("Toni Morrison"), 192), start).await.unwrap();
    library.update_current_page(done.book.id, 192, start).await.unwrap();
    let reading = library.add_book(book("Beloved", Some("Toni Morrison"), 324), start).await.unwrap();
    library.update_current_page(reading.book.id, 100, start).await.unwrap();
    library
        .set_objective(reading.book.id, ObjectiveRequest::deadline(date(2024, 1, 20)), start)
        .await
        .unwrap();

    let report = library.stats(date(2024, 1, 10)).await.unwrap();
    assert_eq!(report.totals.books, 2);
    assert_eq!(report.totals.completed, 1);
    assert_eq!(report.totals.current_reads, 1);
    assert_eq!(report.pages.read, 292);
    assert_eq!(report.pages.remaining, 224);
    assert_eq!(report.progress.completion_rate, 50);
    assert_eq!(report.progress.buckets.total(), 2);
    assert_eq!(report.timeline.days_active, 10);
    assert_eq!(report.speed_score, 29.2);
    assert_eq!(report.deadlines.len(), 1);
    assert_eq!(report.deadlines[0].remaining_days, 10);
    assert_eq!(
        report.totals.favorite_author.as_ref().map(|a| a.name.as_str()),
        Some("Toni Morrison")
    );
    assert_eq!(report.fun_fact, FunFact::SteadyExplorer);
}
