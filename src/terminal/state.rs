use ratatui::widgets::ListState;

use crate::auth::SessionIdentity;
use crate::error::ClientError;
use crate::flow::{ActionFlow, Completion, FlowKind, PostSubmit, Ticket};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Home,
    Flow,
}

pub struct AppState {
    pub screen: Screen,
    pub identity: SessionIdentity,

    /// The open duplicates/unsubscribe flow, if any.
    pub flow: Option<ActionFlow>,
    pub list_state: ListState,

    /// One-line message for the login and home screens.
    pub notice: String,
    post_submit: PostSubmit,
}

impl AppState {
    pub fn new(identity: SessionIdentity, post_submit: PostSubmit) -> Self {
        let mut s = Self {
            screen: Screen::Login,
            identity: SessionIdentity::default(),
            flow: None,
            list_state: ListState::default(),
            notice: String::new(),
            post_submit,
        };
        s.set_identity(identity);
        s
    }

    pub fn set_identity(&mut self, identity: SessionIdentity) {
        self.close_flow();
        self.screen = if identity.is_authenticated {
            Screen::Home
        } else {
            Screen::Login
        };
        self.identity = identity;
    }

    pub fn on_sign_in(&mut self, result: Result<SessionIdentity, ClientError>) {
        match result {
            Ok(id) => {
                self.notice = format!("Signed in as {}", id.email);
                self.set_identity(id);
            }
            Err(e) => {
                self.notice = e.to_string();
                self.set_identity(SessionIdentity::default());
            }
        }
    }

    /// Open a fresh flow and hand back its first fetch.
    pub fn open_flow(&mut self, kind: FlowKind) -> Option<Ticket> {
        if !self.identity.is_authenticated {
            return None;
        }
        self.close_flow();

        let mut flow = ActionFlow::new(kind, self.identity.email.clone(), self.post_submit);
        let ticket = flow.activate();
        self.flow = Some(flow);
        self.list_state.select(None);
        self.screen = Screen::Flow;
        ticket
    }

    pub fn close_flow(&mut self) {
        if let Some(mut flow) = self.flow.take() {
            flow.cancel();
        }
        self.list_state.select(None);
        if self.screen == Screen::Flow {
            self.screen = Screen::Home;
        }
    }

    pub fn apply_completion(&mut self, done: Completion) -> Option<Ticket> {
        let flow = self.flow.as_mut()?;
        if flow.kind() != done.kind {
            return None;
        }
        let follow = flow.apply(done.generation, done.outcome);
        self.clamp_cursor();
        follow
    }

    pub fn submit(&mut self) -> Option<Ticket> {
        self.flow.as_mut()?.submit()
    }

    pub fn retry(&mut self) -> Option<Ticket> {
        let ticket = self.flow.as_mut()?.activate();
        self.clamp_cursor();
        ticket
    }

    pub fn move_cursor(&mut self, delta: i32) {
        let len = self.flow.as_ref().map(|f| f.list().len()).unwrap_or(0);
        if len == 0 {
            self.list_state.select(None);
            return;
        }
        let cur = self.list_state.selected().unwrap_or(0) as i32;
        let next = (cur + delta).clamp(0, len as i32 - 1) as usize;
        self.list_state.select(Some(next));
    }

    pub fn toggle_current(&mut self) {
        let Some(idx) = self.list_state.selected() else {
            return;
        };
        if let Some(flow) = self.flow.as_mut() {
            flow.toggle_at(idx);
        }
    }

    pub fn select_all(&mut self) {
        if let Some(flow) = self.flow.as_mut() {
            flow.select_all();
        }
    }

    pub fn clear_selection(&mut self) {
        if let Some(flow) = self.flow.as_mut() {
            flow.clear_selection();
        }
    }

    fn clamp_cursor(&mut self) {
        let len = self.flow.as_ref().map(|f| f.list().len()).unwrap_or(0);
        match (len, self.list_state.selected()) {
            (0, _) => self.list_state.select(None),
            (_, None) => self.list_state.select(Some(0)),
            (n, Some(i)) if i >= n => self.list_state.select(Some(n - 1)),
            _ => {}
        }
    }
}
