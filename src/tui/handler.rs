use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::InputMode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    Quit,
    MoveUp,
    MoveDown,
    MoveToTop,
    MoveToBottom,
    AdvanceDaily,
    CycleFilter,
    CycleSort,
    OpenCover,
    RemoveBook,
    ShowStats,
    HideStats,
    ShowHelp,
    HideHelp,
    // Prompt actions
    StartInput(InputMode),
    InputChar(char),
    InputBackspace,
    InputConfirm,
    InputCancel,
}

pub fn handle_key_event(
    key: KeyEvent,
    input_active: bool,
    show_stats: bool,
    show_help: bool,
) -> Option<AppAction> {
    // If help is showing, any key closes it
    if show_help {
        return Some(AppAction::HideHelp);
    }

    if show_stats {
        return Some(AppAction::HideStats);
    }

    if input_active {
        return match key.code {
            KeyCode::Enter => Some(AppAction::InputConfirm),
            KeyCode::Esc => Some(AppAction::InputCancel),
            KeyCode::Backspace => Some(AppAction::InputBackspace),
            KeyCode::Char(c) => Some(AppAction::InputChar(c)),
            _ => None,
        };
    }

    // Normal mode
    match (key.code, key.modifiers) {
        (KeyCode::Char('q'), _) => Some(AppAction::Quit),
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => Some(AppAction::Quit),

        (KeyCode::Char('j'), _) | (KeyCode::Down, _) => Some(AppAction::MoveDown),
        (KeyCode::Char('k'), _) | (KeyCode::Up, _) => Some(AppAction::MoveUp),
        (KeyCode::Char('<'), _) => Some(AppAction::MoveToTop),
        (KeyCode::Char('>'), _) => Some(AppAction::MoveToBottom),

        (KeyCode::Enter, _) | (KeyCode::Char('+'), _) => Some(AppAction::AdvanceDaily),

        (KeyCode::Char('a'), _) => Some(AppAction::StartInput(InputMode::AddBook)),
        (KeyCode::Char('p'), _) => Some(AppAction::StartInput(InputMode::CurrentPage)),
        (KeyCode::Char('g'), _) => Some(AppAction::StartInput(InputMode::DailyGoal)),
        (KeyCode::Char('t'), _) => Some(AppAction::StartInput(InputMode::Deadline)),
        (KeyCode::Char('n'), _) => Some(AppAction::StartInput(InputMode::Note)),

        (KeyCode::Char('f'), _) => Some(AppAction::CycleFilter),
        (KeyCode::Char('s'), _) => Some(AppAction::CycleSort),
        (KeyCode::Char('o'), _) => Some(AppAction::OpenCover),
        (KeyCode::Char('d'), KeyModifiers::NONE) => Some(AppAction::RemoveBook),
        (KeyCode::Char('v'), _) => Some(AppAction::ShowStats),

        (KeyCode::Char('?'), _) => Some(AppAction::ShowHelp),

        _ => None,
    }
}
