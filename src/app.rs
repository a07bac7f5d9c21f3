use chrono::{Local, NaiveDate};

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::{
    CollectionEntry, CollectionSort, NewBook, NewNote, Note, ObjectiveRequest, ShelfFilter,
};
use crate::services::Library;
use crate::tracker::StatsReport;
use crate::tui::AppAction;

/// What the single-line prompt is collecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    AddBook,
    CurrentPage,
    DailyGoal,
    Deadline,
    Note,
}

impl InputMode {
    pub fn prompt(&self) -> &'static str {
        match self {
            InputMode::AddBook => " Add book: Title;Author;Editor;Pages[;CoverUrl] ",
            InputMode::CurrentPage => " Current page ",
            InputMode::DailyGoal => " Pages per day ",
            InputMode::Deadline => " Finish by (YYYY-MM-DD) ",
            InputMode::Note => " Note ([page:] text) ",
        }
    }

    fn needs_selection(&self) -> bool {
        !matches!(self, InputMode::AddBook)
    }
}

pub struct App {
    // Data
    pub entries: Vec<CollectionEntry>,
    pub notes: Vec<Note>,
    pub stats: Option<StatsReport>,

    // UI State
    pub selected_index: usize,
    pub filter: ShelfFilter,
    pub sort: CollectionSort,
    pub show_help: bool,
    pub input_mode: Option<InputMode>,
    pub input: String,
    pub status: Option<String>,

    // Services
    library: Library,
}

impl App {
    pub async fn new(config: &Config) -> Result<Self> {
        let library = Library::open(config).await?;
        let entries = library.collection(config.default_sort).await?;

        let mut app = Self {
            entries,
            notes: Vec::new(),
            stats: None,
            selected_index: 0,
            filter: ShelfFilter::All,
            sort: config.default_sort,
            show_help: false,
            input_mode: None,
            input: String::new(),
            status: None,
            library,
        };
        app.on_selection_changed().await?;
        Ok(app)
    }

    pub fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    pub fn filtered_entries(&self) -> Vec<&CollectionEntry> {
        self.entries
            .iter()
            .filter(|e| self.filter.admits(e))
            .collect()
    }

    pub fn selected_entry(&self) -> Option<&CollectionEntry> {
        let entries = self.filtered_entries();
        entries.get(self.selected_index).copied()
    }

    pub fn input_active(&self) -> bool {
        self.input_mode.is_some()
    }

    pub async fn handle_action(&mut self, action: AppAction) -> Result<bool> {
        match action {
            AppAction::Quit => return Ok(true),

            AppAction::MoveUp => {
                if self.selected_index > 0 {
                    self.selected_index -= 1;
                    self.on_selection_changed().await?;
                }
            }

            AppAction::MoveDown => {
                let len = self.filtered_entries().len();
                if len > 0 && self.selected_index < len - 1 {
                    self.selected_index += 1;
                    self.on_selection_changed().await?;
                }
            }

            AppAction::MoveToTop => {
                self.selected_index = 0;
                self.on_selection_changed().await?;
            }

            AppAction::MoveToBottom => {
                self.selected_index = self.filtered_entries().len().saturating_sub(1);
                self.on_selection_changed().await?;
            }

            AppAction::AdvanceDaily => {
                if let Some(book_id) = self.selected_book_id() {
                    let result = self.library.advance_daily(book_id, Self::today()).await;
                    if let Some(outcome) = self.surface(result)? {
                        self.status = Some(outcome.message.unwrap_or_else(|| {
                            format!(
                                "Page {}/{} ({}%){}",
                                outcome.current_page,
                                outcome.total_pages,
                                outcome.progress_percent,
                                if outcome.is_complete { " - finished!" } else { "" }
                            )
                        }));
                        self.reload_entries().await?;
                    }
                }
            }

            AppAction::CycleFilter => {
                self.filter = self.filter.cycle();
                self.selected_index = 0;
                self.on_selection_changed().await?;
            }

            AppAction::CycleSort => {
                self.sort = self.sort.cycle();
                self.reload_entries().await?;
            }

            AppAction::OpenCover => {
                if let Some(url) = self.selected_entry().and_then(|e| e.book.cover_url.clone()) {
                    if let Err(e) = open::that(&url) {
                        tracing::warn!("Failed to open cover {}: {}", url, e);
                    }
                }
            }

            AppAction::RemoveBook => {
                if let Some(book_id) = self.selected_book_id() {
                    let result = self.library.remove(book_id).await;
                    if self.surface(result)?.is_some() {
                        self.status = Some("Removed from your collection".to_string());
                        self.reload_entries().await?;
                    }
                }
            }

            AppAction::ShowStats => {
                self.stats = Some(self.library.stats(Self::today()).await?);
            }

            AppAction::HideStats => {
                self.stats = None;
            }

            AppAction::ShowHelp => {
                self.show_help = true;
            }

            AppAction::HideHelp => {
                self.show_help = false;
            }

            AppAction::StartInput(mode) => {
                if !mode.needs_selection() || self.selected_entry().is_some() {
                    self.input_mode = Some(mode);
                    self.input.clear();
                }
            }

            AppAction::InputChar(c) => {
                self.input.push(c);
            }

            AppAction::InputBackspace => {
                self.input.pop();
            }

            AppAction::InputConfirm => {
                if let Some(mode) = self.input_mode.take() {
                    let line = std::mem::take(&mut self.input);
                    self.submit_input(mode, line.trim()).await?;
                }
            }

            AppAction::InputCancel => {
                self.input_mode = None;
                self.input.clear();
            }
        }

        Ok(false)
    }

    async fn submit_input(&mut self, mode: InputMode, line: &str) -> Result<()> {
        let result = self.apply_input(mode, line).await;
        if let Some(message) = self.surface(result)? {
            self.status = Some(message);
            self.reload_entries().await?;
        }
        Ok(())
    }

    /// Applies one confirmed prompt and returns the status line to show.
    async fn apply_input(&self, mode: InputMode, line: &str) -> Result<String> {
        let today = Self::today();

        if mode == InputMode::AddBook {
            let entry = self.library.add_book(NewBook::parse_line(line)?, today).await?;
            return Ok(format!("Added \"{}\"", entry.book.title));
        }

        let book_id = self
            .selected_book_id()
            .ok_or_else(|| AppError::Validation("No book selected".to_string()))?;

        let message = match mode {
            InputMode::CurrentPage => {
                let page = parse_number(line)?;
                self.library.update_current_page(book_id, page, today).await?;
                "Current page saved"
            }
            InputMode::DailyGoal => {
                let goal = positive_goal(parse_number(line)?)?;
                self.library
                    .set_objective(book_id, ObjectiveRequest::daily_goal(goal), today)
                    .await?;
                "Objectives updated"
            }
            InputMode::Deadline => {
                let date = parse_future_date(line, today)?;
                self.library
                    .set_objective(book_id, ObjectiveRequest::deadline(date), today)
                    .await?;
                "Objectives updated"
            }
            InputMode::Note => {
                self.library.add_note(book_id, NewNote::parse_line(line)).await?;
                "Note added"
            }
            InputMode::AddBook => return Ok(String::new()),
        };
        Ok(message.to_string())
    }

    /// Shows client-side errors in the status line; anything else propagates.
    fn surface<T>(&mut self, result: Result<T>) -> Result<Option<T>> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.status_code() < 500 => {
                self.status = Some(e.to_string());
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn selected_book_id(&self) -> Option<i64> {
        self.selected_entry().map(|e| e.book.id)
    }

    async fn on_selection_changed(&mut self) -> Result<()> {
        self.notes = match self.selected_book_id() {
            Some(book_id) => self.library.notes(book_id).await?,
            None => Vec::new(),
        };
        Ok(())
    }

    async fn reload_entries(&mut self) -> Result<()> {
        let selected = self.selected_book_id();
        self.entries = self.library.collection(self.sort).await?;

        let index = {
            let entries = self.filtered_entries();
            selected
                .and_then(|id| entries.iter().position(|e| e.book.id == id))
                .unwrap_or_else(|| self.selected_index.min(entries.len().saturating_sub(1)))
        };
        self.selected_index = index;

        self.on_selection_changed().await
    }
}

fn parse_number(line: &str) -> Result<i64> {
    line.parse::<i64>()
        .map_err(|_| AppError::Validation(format!("'{line}' is not a number")))
}

fn positive_goal(goal: i64) -> Result<u32> {
    match u32::try_from(goal) {
        Ok(goal) if goal > 0 => Ok(goal),
        _ => Err(AppError::Validation(
            "Daily goal must be a positive number".to_string(),
        )),
    }
}

fn parse_future_date(line: &str, today: NaiveDate) -> Result<NaiveDate> {
    let date = NaiveDate::parse_from_str(line, "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("'{line}' is not a YYYY-MM-DD date")))?;
    if date <= today {
        return Err(AppError::Validation("Deadline must be in the future".to_string()));
    }
    Ok(date)
}
