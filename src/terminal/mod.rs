pub mod events;
pub mod state;
pub mod ui;

use color_eyre::eyre::Result;
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use log::info;
use ratatui::DefaultTerminal;
use std::io;
use std::sync::mpsc::Receiver;
use std::time::Duration;

use crate::auth::{IdentityProvider, Session};
use crate::flow::{Completion, Dispatcher, PostSubmit};
use crate::terminal::events::{Command, handle_key};
use crate::terminal::state::AppState;

const TICK: Duration = Duration::from_millis(100);

/// Run the interactive UI until the user quits.
pub fn run_tui<P: IdentityProvider>(
    session: &mut Session<P>,
    dispatcher: &Dispatcher,
    completions: &Receiver<Completion>,
    post_submit: PostSubmit,
) -> Result<()> {
    color_eyre::install()?;

    let mut state = AppState::new(session.identity().clone(), post_submit);

    let mut terminal = ratatui::init();
    let result = run(&mut terminal, &mut state, session, dispatcher, completions);

    ratatui::restore();

    result
}

fn run<P: IdentityProvider>(
    terminal: &mut DefaultTerminal,
    state: &mut AppState,
    session: &mut Session<P>,
    dispatcher: &Dispatcher,
    completions: &Receiver<Completion>,
) -> Result<()> {
    loop {
        // results are applied here, on the thread that owns `state`
        while let Ok(done) = completions.try_recv() {
            if let Some(ticket) = state.apply_completion(done) {
                dispatcher.dispatch(ticket);
            }
        }

        terminal.draw(|f| ui::render(f, state))?;

        if !event::poll(TICK)? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match handle_key(key, state) {
            Command::None => {}
            Command::Quit => break,
            Command::Dispatch(ticket) => dispatcher.dispatch(ticket),
            Command::SignIn => {
                // the browser flow prints to the terminal, so give it back meanwhile
                suspend()?;
                let result = session.sign_in().cloned();
                resume(terminal)?;
                state.on_sign_in(result);
            }
            Command::SignOut => {
                session.sign_out();
                info!("signed out");
                state.notice = "Signed out.".to_string();
                state.set_identity(session.identity().clone());
            }
        }
    }
    Ok(())
}

// Leaves the panic hook installed by `ratatui::init` in place.
fn suspend() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)
}

fn resume(terminal: &mut DefaultTerminal) -> io::Result<()> {
    enable_raw_mode()?;
    execute!(io::stdout(), EnterAlternateScreen)?;
    terminal.clear()
}
