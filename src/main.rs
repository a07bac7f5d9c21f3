use std::io;
use std::time::Duration;

use crossterm::event::KeyEventKind;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use serde::Serialize;

use bookpace::app::App;
use bookpace::config::Config;
use bookpace::error::{AppError, Result};
use bookpace::models::{CollectionSort, GroupBy, NewBook};
use bookpace::services::Library;
use bookpace::tui::{draw, handle_key_event};

/// Headless invocations that print JSON and exit instead of opening the TUI.
enum Command {
    Add(String),
    Advance(i64),
    Stats,
    Collection {
        sort: CollectionSort,
        group_by: Option<GroupBy>,
    },
}

fn parse_command(args: &[String]) -> Result<Option<Command>> {
    let Some(flag) = args.get(1) else {
        return Ok(None);
    };

    let command = match flag.as_str() {
        "--add" => {
            let line = args
                .get(2)
                .ok_or_else(|| AppError::Validation("--add needs \"Title;Author;Editor;Pages\"".into()))?;
            Command::Add(line.clone())
        }
        "--advance" => {
            let id = args
                .get(2)
                .and_then(|s| s.parse::<i64>().ok())
                .ok_or_else(|| AppError::Validation("--advance needs a book id".into()))?;
            Command::Advance(id)
        }
        "--stats" => Command::Stats,
        "--collection" => Command::Collection {
            sort: args
                .get(2)
                .map(|s| CollectionSort::parse_or_default(s))
                .unwrap_or_default(),
            group_by: args.get(3).map(|s| s.parse::<GroupBy>()).transpose()?,
        },
        _ => return Ok(None),
    };

    Ok(Some(command))
}

#[derive(Debug, PartialEq, Serialize)]
struct ErrorBody {
    message: String,
    status: u16,
}

impl From<&AppError> for ErrorBody {
    fn from(err: &AppError) -> Self {
        Self {
            message: err.to_string(),
            status: err.status_code(),
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn execute(command: Command, config: &Config) -> Result<()> {
    let library = Library::open(config).await?;
    let today = App::today();

    match command {
        Command::Add(line) => {
            let book = NewBook::parse_line(&line)?;
            print_json(&library.add_book(book, today).await?)
        }
        Command::Advance(book_id) => print_json(&library.advance_daily(book_id, today).await?),
        Command::Stats => print_json(&library.stats(today).await?),
        Command::Collection { sort, group_by } => match group_by {
            Some(by) => print_json(&library.grouped_collection(sort, by).await?),
            None => print_json(&library.collection(sort).await?),
        },
    }
}

/// Runs a headless command; any failure is printed as an error body and the
/// process exits non-zero.
async fn run_command(command: Command, config: &Config) -> Result<()> {
    if let Err(e) = execute(command, config).await {
        tracing::warn!(status = e.status_code(), "headless command failed: {}", e);
        print_json(&ErrorBody::from(&e))?;
        std::process::exit(1);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (only show warnings and errors by default)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    let config = Config::load()?;

    if let Some(command) = parse_command(&args)? {
        tracing::debug!(db = %config.db_path, "running headless command");
        return run_command(command, &config).await;
    }

    let mut app = App::new(&config).await?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    Ok(())
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|frame| draw(frame, app))?;

        if event::poll(Duration::from_millis(250))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    if let Some(action) = handle_key_event(
                        key,
                        app.input_active(),
                        app.stats.is_some(),
                        app.show_help,
                    ) {
                        let should_quit = app.handle_action(action).await?;
                        if should_quit {
                            return Ok(());
                        }
                    }
                }
            }
        }
    }
}
