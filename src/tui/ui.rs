use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::tracker::{shelf_for, Shelf, StatsReport};

pub fn draw(frame: &mut Frame, app: &App) {
    // Main horizontal split: 1/3 left, 2/3 right
    let main_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3), // Left pane: collection
            Constraint::Ratio(2, 3), // Right pane: selected book
        ])
        .split(frame.area());

    let left_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Min(0),    // Book list
            Constraint::Length(1), // Key hints
        ])
        .split(main_chunks[0]);

    let right_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(8), // Book details
            Constraint::Length(3), // Progress gauge
            Constraint::Min(0),    // Notes
            Constraint::Length(1), // Status message
        ])
        .split(main_chunks[1]);

    render_header(frame, app, left_chunks[0]);
    render_book_list(frame, app, left_chunks[1]);
    render_key_hints(frame, left_chunks[2]);

    render_details(frame, app, right_chunks[0]);
    render_progress(frame, app, right_chunks[1]);
    render_notes(frame, app, right_chunks[2]);
    render_status(frame, app, right_chunks[3]);

    if let Some(mode) = app.input_mode {
        render_input(frame, mode.prompt(), &app.input);
    }

    if let Some(stats) = &app.stats {
        render_stats(frame, stats);
    }

    if app.show_help {
        render_help(frame);
    }
}

fn shelf_color(shelf: Shelf) -> Color {
    match shelf {
        Shelf::Reading => Color::Green,
        Shelf::ToRead => Color::Blue,
        Shelf::Finished => Color::DarkGray,
    }
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let finished = app
        .entries
        .iter()
        .filter(|e| shelf_for(e) == Shelf::Finished)
        .count();

    let title = format!(" Bookpace [{}] [{}] ", app.filter.label(), app.sort.label());
    let stats = format!(" {} Books | {} Finished", app.entries.len(), finished);

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let paragraph = Paragraph::new(stats).style(Style::default().fg(Color::White));
    frame.render_widget(paragraph, inner);
}

fn render_book_list(frame: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .filtered_entries()
        .into_iter()
        .map(|entry| {
            let shelf = shelf_for(entry);
            let percent = entry
                .record
                .progress_percent()
                .map(|p| format!("{p:>3}% "))
                .unwrap_or_else(|| "  -  ".to_string());

            let line = Line::from(vec![
                Span::styled(percent, Style::default().fg(shelf_color(shelf))),
                Span::styled(entry.book.title.as_str(), Style::default().fg(Color::White)),
            ]);
            ListItem::new(line)
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(Some(app.selected_index));

    frame.render_stateful_widget(list, area, &mut state);
}

fn render_key_hints(frame: &mut Frame, area: Rect) {
    let paragraph = Paragraph::new("j/k:nav  enter:+daily  a:add  v:stats  ?:help  q:quit")
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(paragraph, area);
}

fn render_details(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Book ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));

    let Some(entry) = app.selected_entry() else {
        let paragraph = Paragraph::new("Your collection is empty. Press 'a' to add a book.")
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
        return;
    };

    let book = &entry.book;
    let record = &entry.record;
    let label = Style::default().fg(Color::DarkGray);

    let objective = match (record.daily_goal, record.deadline) {
        (Some(goal), Some(deadline)) => format!("{goal} pages/day, finish by {deadline}"),
        (Some(goal), None) => format!("{goal} pages/day"),
        (None, Some(deadline)) => format!("finish by {deadline}"),
        (None, None) => "none set".to_string(),
    };

    let lines = vec![
        Line::from(Span::styled(
            book.title.as_str(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled("Author:    ", label),
            Span::raw(book.author.as_deref().unwrap_or("Unknown")),
        ]),
        Line::from(vec![
            Span::styled("Publisher: ", label),
            Span::raw(book.editor.as_deref().unwrap_or("Unknown")),
        ]),
        Line::from(vec![
            Span::styled("Shelf:     ", label),
            Span::styled(shelf_for(entry).label(), Style::default().fg(shelf_color(shelf_for(entry)))),
        ]),
        Line::from(vec![Span::styled("Objective: ", label), Span::raw(objective)]),
        Line::from(vec![
            Span::styled("Added:     ", label),
            Span::raw(record.created_at.format("%d %b %Y").to_string()),
        ]),
    ];

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn render_progress(frame: &mut Frame, app: &App, area: Rect) {
    let (ratio, label) = match app.selected_entry() {
        Some(entry) => {
            let total = entry.book.total_pages.max(1);
            let page = entry.record.current_page.min(total);
            (
                f64::from(page) / f64::from(total),
                format!(
                    "page {} of {} ({}%)",
                    entry.record.current_page,
                    entry.book.total_pages,
                    entry.record.progress_percent().unwrap_or(0)
                ),
            )
        }
        None => (0.0, String::new()),
    };

    let gauge = Gauge::default()
        .block(Block::default().title(" Progress ").borders(Borders::ALL))
        .gauge_style(Style::default().fg(Color::Yellow))
        .ratio(ratio)
        .label(label);

    frame.render_widget(gauge, area);
}

fn render_notes(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(format!(" Notes ({}) ", app.notes.len()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta));

    let width = usize::from(block.inner(area).width.max(10));
    let mut lines: Vec<Line> = Vec::new();

    for note in &app.notes {
        let heading = match note.page {
            Some(page) => format!("{} - p.{}", note.created_at.format("%d %b %Y %H:%M"), page),
            None => note.created_at.format("%d %b %Y %H:%M").to_string(),
        };
        lines.push(Line::from(Span::styled(heading, Style::default().fg(Color::DarkGray))));
        for wrapped in textwrap::wrap(&note.content, width) {
            lines.push(Line::from(wrapped.into_owned()));
        }
        lines.push(Line::from(""));
    }

    if lines.is_empty() {
        lines.push(Line::from("No notes yet. Press 'n' to write one."));
    }

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
    let text = app.status.as_deref().unwrap_or("");
    let paragraph = Paragraph::new(text).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(paragraph, area);
}

fn render_input(frame: &mut Frame, prompt: &str, input: &str) {
    let area = centered_rect(60, 20, frame.area());

    let block = Block::default()
        .title(prompt)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let inner = block.inner(area);

    frame.render_widget(Clear, area);
    frame.render_widget(block, area);

    let paragraph = Paragraph::new(format!("> {input}_")).style(Style::default().fg(Color::White));
    frame.render_widget(paragraph, inner);
}

fn render_stats(frame: &mut Frame, stats: &StatsReport) {
    let area = centered_rect(70, 80, frame.area());
    let label = Style::default().fg(Color::DarkGray);

    let mut lines = vec![
        Line::from(Span::styled(
            stats.fun_fact.headline(),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled(" Books:        ", label),
            Span::raw(format!(
                "{} ({} finished, {} in progress, {} notes)",
                stats.totals.books,
                stats.totals.completed,
                stats.totals.current_reads,
                stats.totals.notes
            )),
        ]),
        Line::from(vec![
            Span::styled(" Pages:        ", label),
            Span::raw(format!(
                "{} read of {} ({} to go, {} per day planned)",
                stats.pages.read, stats.pages.total, stats.pages.remaining, stats.pages.daily_goal_total
            )),
        ]),
        Line::from(vec![
            Span::styled(" Progress:     ", label),
            Span::raw(format!(
                "{}% average, {}% completed",
                stats.progress.average, stats.progress.completion_rate
            )),
        ]),
        Line::from(vec![
            Span::styled(" Speed:        ", label),
            Span::raw(format!(
                "{:.1} pages/day over {} days",
                stats.speed_score, stats.timeline.days_active
            )),
        ]),
    ];

    if let Some(author) = &stats.totals.favorite_author {
        lines.push(Line::from(vec![
            Span::styled(" Favorite:     ", label),
            Span::raw(format!("{} ({} books)", author.name, author.count)),
        ]));
    }
    if let (Some(longest), Some(shortest)) = (&stats.totals.longest_book, &stats.totals.shortest_book) {
        lines.push(Line::from(vec![
            Span::styled(" Longest:      ", label),
            Span::raw(format!("{} ({} pages)", longest.title, longest.pages)),
        ]));
        lines.push(Line::from(vec![
            Span::styled(" Shortest:     ", label),
            Span::raw(format!("{} ({} pages)", shortest.title, shortest.pages)),
        ]));
    }
    if let Some(since) = stats.timeline.reading_since {
        lines.push(Line::from(vec![
            Span::styled(" Reading since:", label),
            Span::raw(format!(" {}", since.format("%d %b %Y"))),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(" Progress buckets", label)));
    let max = stats.progress.buckets.total().max(1);
    for (name, count) in stats.progress.buckets.labelled() {
        let bar = "#".repeat(count * 20 / max);
        lines.push(Line::from(format!("   {name:>7} {bar} {count}")));
    }

    if !stats.timeline.books_by_month.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(" Books added", label)));
        for month in &stats.timeline.books_by_month {
            lines.push(Line::from(format!("   {:>8}  {}", month.label, month.count)));
        }
    }

    if !stats.deadlines.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(" Upcoming deadlines", label)));
        for deadline in &stats.deadlines {
            lines.push(Line::from(format!(
                "   {} - {} ({} days)",
                deadline.deadline, deadline.title, deadline.remaining_days
            )));
        }
    }

    let block = Block::default()
        .title(" Reading Stats ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: false }), area);
}

fn render_help(frame: &mut Frame) {
    let area = centered_rect(50, 70, frame.area());

    let help_text = vec![
        "",
        " Navigation:",
        "   j / ↓    Move down",
        "   k / ↑    Move up",
        "   < / >    Jump to top / bottom",
        "",
        " Reading:",
        "   Enter/+  Add today's pages",
        "   p        Set current page",
        "   g        Set pages per day",
        "   t        Set finish-by date",
        "   n        Write a note",
        "",
        " Collection:",
        "   a        Add a book",
        "   d        Remove from collection",
        "   o        Open cover image",
        "   f        Cycle shelf filter",
        "   s        Cycle sort order",
        "   v        Reading stats",
        "",
        " General:",
        "   ?        Toggle this help",
        "   q        Quit",
        "",
        " Press any key to close",
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let paragraph = Paragraph::new(help_text.join("\n"))
        .block(block)
        .style(Style::default().fg(Color::White));

    frame.render_widget(Clear, area);
    frame.render_widget(paragraph, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
