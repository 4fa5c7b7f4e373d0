use crossterm::event::{KeyCode, KeyEvent};

use crate::flow::{FlowKind, Ticket};
use crate::terminal::state::{AppState, Screen};

/// Side effects the event loop has to perform after a key press.
#[derive(Debug)]
pub enum Command {
    None,
    Quit,
    SignIn,
    SignOut,
    Dispatch(Ticket),
}

impl From<Option<Ticket>> for Command {
    fn from(t: Option<Ticket>) -> Self {
        t.map(Command::Dispatch).unwrap_or(Command::None)
    }
}

pub fn handle_key(key: KeyEvent, state: &mut AppState) -> Command {
    if key.code == KeyCode::Char('q') {
        return Command::Quit;
    }

    match state.screen {
        Screen::Login => handle_login_keys(key),
        Screen::Home => handle_home_keys(key, state),
        Screen::Flow => handle_flow_keys(key, state),
    }
}

fn handle_login_keys(key: KeyEvent) -> Command {
    match key.code {
        KeyCode::Enter => Command::SignIn,
        KeyCode::Esc => Command::Quit,
        _ => Command::None,
    }
}

fn handle_home_keys(key: KeyEvent, state: &mut AppState) -> Command {
    match key.code {
        KeyCode::Char('d') => state.open_flow(FlowKind::Duplicates).into(),
        KeyCode::Char('u') => state.open_flow(FlowKind::Unsubscribe).into(),
        KeyCode::Char('s') => Command::SignOut,
        KeyCode::Esc => Command::Quit,
        _ => Command::None,
    }
}

fn handle_flow_keys(key: KeyEvent, state: &mut AppState) -> Command {
    match key.code {
        KeyCode::Down | KeyCode::Char('j') => state.move_cursor(1),
        KeyCode::Up | KeyCode::Char('k') => state.move_cursor(-1),
        KeyCode::Char(' ') => state.toggle_current(),
        KeyCode::Char('a') => state.select_all(),
        KeyCode::Char('n') => state.clear_selection(),
        KeyCode::Enter => return state.submit().into(),
        KeyCode::Char('r') => return state.retry().into(),
        KeyCode::Esc | KeyCode::Char('c') => state.close_flow(),
        _ => {}
    }
    Command::None
}
