//! Load → select → submit orchestration shared by the duplicates and
//! unsubscribe screens.
//!
//! An [`ActionFlow`] never touches the network itself. Each transition that
//! needs the backend hands out a [`Ticket`]; whoever runs the ticket feeds
//! the result back through [`ActionFlow::apply`] on the thread that owns the
//! flow. Tickets carry a generation number and results for anything but the
//! latest ticket are dropped, so a dismissed or restarted flow can never be
//! overwritten by a late answer.

pub mod dispatch;

use std::sync::atomic::{AtomicU64, Ordering};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::domain::record::MailRecord;
use crate::error::ClientError;
use crate::remote::{ListAction, RequestIntent, SubmitAction};
use crate::selection::SelectableList;

pub use dispatch::{Completion, Dispatcher};

// Shared by all flows so a recreated flow never reuses an older number.
static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

fn next_generation() -> u64 {
    NEXT_GENERATION.fetch_add(1, Ordering::Relaxed)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowKind {
    Duplicates,
    Unsubscribe,
}

impl FlowKind {
    pub fn list_action(self) -> ListAction {
        match self {
            FlowKind::Duplicates => ListAction::GetDuplicates,
            FlowKind::Unsubscribe => ListAction::GetUnsubEmails,
        }
    }

    pub fn submit_action(self) -> SubmitAction {
        match self {
            FlowKind::Duplicates => SubmitAction::RemoveSelected,
            FlowKind::Unsubscribe => SubmitAction::UnsubscribeSelected,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            FlowKind::Duplicates => "Confirm or Deny Deletion",
            FlowKind::Unsubscribe => "Mass Unsubscribe",
        }
    }

    pub fn submit_label(self) -> &'static str {
        match self {
            FlowKind::Duplicates => "Delete Selected",
            FlowKind::Unsubscribe => "Unsubscribe Selected",
        }
    }

    fn loading_status(self) -> &'static str {
        match self {
            FlowKind::Duplicates => "Loading duplicates...",
            FlowKind::Unsubscribe => "Loading unsubscribable emails...",
        }
    }

    fn loaded_status(self) -> &'static str {
        match self {
            FlowKind::Duplicates => "Duplicates loaded.",
            FlowKind::Unsubscribe => "Unsubscribe list loaded.",
        }
    }

    fn submitting_status(self) -> &'static str {
        match self {
            FlowKind::Duplicates => "Removing selected...",
            FlowKind::Unsubscribe => "Unsubscribing selected...",
        }
    }
}

/// Which request an `Error` phase came out of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Load,
    Submit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlowPhase {
    #[default]
    Idle,
    Loading,
    Ready,
    Submitting,
    Error(Stage),
    Closed,
}

/// What happens to the list after the server accepted a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostSubmit {
    /// Leave list and selection as they are. Removed items stay visible
    /// until the flow is reopened.
    #[default]
    Keep,
    ClearSelection,
    Reload,
}

/// A request the flow is waiting on.
#[derive(Debug, Clone)]
pub struct Ticket {
    pub kind: FlowKind,
    pub generation: u64,
    pub intent: RequestIntent,
}

#[derive(Debug, Clone)]
pub enum Outcome {
    Listed(Result<Vec<MailRecord>, ClientError>),
    Submitted(Result<String, ClientError>),
}

#[derive(Debug)]
pub struct ActionFlow {
    kind: FlowKind,
    email: String,
    phase: FlowPhase,
    list: SelectableList,
    status: String,
    generation: u64,
    post_submit: PostSubmit,
    // Server text to show once a post-submit reload lands.
    carried_status: Option<String>,
}

impl ActionFlow {
    pub fn new(kind: FlowKind, email: impl Into<String>, post_submit: PostSubmit) -> Self {
        Self {
            kind,
            email: email.into(),
            phase: FlowPhase::Idle,
            list: SelectableList::new(),
            status: String::new(),
            generation: 0,
            post_submit,
            carried_status: None,
        }
    }

    pub fn kind(&self) -> FlowKind {
        self.kind
    }

    pub fn phase(&self) -> FlowPhase {
        self.phase
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn list(&self) -> &SelectableList {
        &self.list
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Start (or restart after an error) by fetching the list.
    pub fn activate(&mut self) -> Option<Ticket> {
        match self.phase {
            FlowPhase::Idle | FlowPhase::Error(_) | FlowPhase::Closed => {
                self.phase = FlowPhase::Idle;
                Some(self.start_load())
            }
            FlowPhase::Loading | FlowPhase::Ready | FlowPhase::Submitting => None,
        }
    }

    /// Send the current selection. Valid from `Ready`, and from an error
    /// raised by a previous submission since the list is still loaded.
    pub fn submit(&mut self) -> Option<Ticket> {
        match self.phase {
            FlowPhase::Ready | FlowPhase::Error(Stage::Submit) => {}
            FlowPhase::Error(Stage::Load) => {
                self.phase = FlowPhase::Idle;
                return None;
            }
            _ => return None,
        }

        self.generation = next_generation();
        self.phase = FlowPhase::Submitting;
        self.status = self.kind.submitting_status().to_string();

        let message_ids = self.list.selected_message_ids();
        info!(
            "{:?}: submitting {} message(s)",
            self.kind,
            message_ids.len()
        );

        Some(Ticket {
            kind: self.kind,
            generation: self.generation,
            intent: RequestIntent::SubmitSelection {
                action: self.kind.submit_action(),
                email: self.email.clone(),
                message_ids,
            },
        })
    }

    /// Close the flow. Data stays untouched; anything in flight is ignored
    /// when it arrives.
    pub fn cancel(&mut self) {
        self.generation = next_generation();
        self.phase = FlowPhase::Closed;
        self.carried_status = None;
    }

    pub fn toggle_at(&mut self, index: usize) -> bool {
        self.list.toggle_at(index)
    }

    pub fn select_all(&mut self) {
        self.list.select_all();
    }

    pub fn clear_selection(&mut self) {
        self.list.clear();
    }

    /// Apply a finished request. Returns a follow-up ticket when the
    /// post-submit policy asks for a reload.
    pub fn apply(&mut self, generation: u64, outcome: Outcome) -> Option<Ticket> {
        if generation != self.generation {
            debug!(
                "{:?}: dropping result of generation {generation} (current {})",
                self.kind, self.generation
            );
            return None;
        }

        match (self.phase, outcome) {
            (FlowPhase::Loading, Outcome::Listed(Ok(items))) => {
                info!("{:?}: loaded {} record(s)", self.kind, items.len());
                self.list.load(items);
                self.phase = FlowPhase::Ready;
                self.status = self
                    .carried_status
                    .take()
                    .unwrap_or_else(|| self.kind.loaded_status().to_string());
                None
            }
            (FlowPhase::Loading, Outcome::Listed(Err(e))) => {
                warn!("{:?}: load failed: {e}", self.kind);
                self.list.load(Vec::new());
                self.phase = FlowPhase::Error(Stage::Load);
                self.carried_status = None;
                self.status = e.to_string();
                None
            }
            (FlowPhase::Submitting, Outcome::Submitted(Ok(text))) => {
                self.phase = FlowPhase::Ready;
                self.status = text;
                match self.post_submit {
                    PostSubmit::Keep => None,
                    PostSubmit::ClearSelection => {
                        self.list.clear();
                        None
                    }
                    PostSubmit::Reload => {
                        let note = self.status.clone();
                        let ticket = self.start_load();
                        self.status = note.clone();
                        self.carried_status = Some(note);
                        Some(ticket)
                    }
                }
            }
            (FlowPhase::Submitting, Outcome::Submitted(Err(e))) => {
                warn!("{:?}: submit failed: {e}", self.kind);
                self.phase = FlowPhase::Error(Stage::Submit);
                self.status = e.to_string();
                None
            }
            (phase, _) => {
                debug!("{:?}: ignoring result in phase {phase:?}", self.kind);
                None
            }
        }
    }

    fn start_load(&mut self) -> Ticket {
        self.generation = next_generation();
        self.phase = FlowPhase::Loading;
        self.status = self.kind.loading_status().to_string();
        self.list.load(Vec::new());

        Ticket {
            kind: self.kind,
            generation: self.generation,
            intent: RequestIntent::FetchList {
                action: self.kind.list_action(),
                email: self.email.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dup(id: &str) -> MailRecord {
        MailRecord::new(id, "a@x.com", Some("Sale".into()), "Buy now")
    }

    fn ready_flow(kind: FlowKind, post: PostSubmit, items: Vec<MailRecord>) -> ActionFlow {
        let mut flow = ActionFlow::new(kind, "me@example.com", post);
        let t = flow.activate().unwrap();
        flow.apply(t.generation, Outcome::Listed(Ok(items)));
        assert_eq!(flow.phase(), FlowPhase::Ready);
        flow
    }

    #[test]
    fn activation_fetches_with_flow_action() {
        let mut flow = ActionFlow::new(FlowKind::Unsubscribe, "me@example.com", PostSubmit::Keep);
        let t = flow.activate().unwrap();

        assert_eq!(flow.phase(), FlowPhase::Loading);
        assert_eq!(flow.status(), "Loading unsubscribable emails...");
        assert_eq!(
            t.intent,
            RequestIntent::FetchList {
                action: ListAction::GetUnsubEmails,
                email: "me@example.com".into()
            }
        );
        assert!(flow.activate().is_none());
    }

    #[test]
    fn successful_load_is_ready() {
        let flow = ready_flow(FlowKind::Duplicates, PostSubmit::Keep, vec![dup("m1")]);
        assert_eq!(flow.status(), "Duplicates loaded.");
        assert_eq!(flow.list().len(), 1);
    }

    #[test]
    fn decode_failure_enters_error_with_empty_list() {
        let mut flow = ActionFlow::new(FlowKind::Duplicates, "me@example.com", PostSubmit::Keep);
        let t = flow.activate().unwrap();
        flow.apply(
            t.generation,
            Outcome::Listed(Err(ClientError::Decode("expected value".into()))),
        );

        assert_eq!(flow.phase(), FlowPhase::Error(Stage::Load));
        assert!(flow.status().starts_with("Decode error"));
        assert!(flow.list().is_empty());
    }

    #[test]
    fn error_recovers_through_idle_on_next_activation() {
        let mut flow = ActionFlow::new(FlowKind::Duplicates, "me@example.com", PostSubmit::Keep);
        let t = flow.activate().unwrap();
        flow.apply(
            t.generation,
            Outcome::Listed(Err(ClientError::Network("offline".into()))),
        );

        assert!(flow.submit().is_none());
        assert_eq!(flow.phase(), FlowPhase::Idle);

        let t = flow.activate().unwrap();
        flow.apply(t.generation, Outcome::Listed(Ok(vec![dup("m1")])));
        assert_eq!(flow.phase(), FlowPhase::Ready);
    }

    #[test]
    fn submit_only_from_ready() {
        let mut flow = ActionFlow::new(FlowKind::Duplicates, "me@example.com", PostSubmit::Keep);
        assert!(flow.submit().is_none());
        flow.activate();
        assert!(flow.submit().is_none());
        assert_eq!(flow.phase(), FlowPhase::Loading);
    }

    #[test]
    fn submit_sends_selection_and_keeps_it_afterwards() {
        let mut flow = ready_flow(
            FlowKind::Duplicates,
            PostSubmit::Keep,
            vec![dup("m1"), dup("m2")],
        );
        flow.toggle_at(1);

        let t = flow.submit().unwrap();
        assert_eq!(flow.phase(), FlowPhase::Submitting);
        assert_eq!(flow.status(), "Removing selected...");
        match &t.intent {
            RequestIntent::SubmitSelection {
                action,
                message_ids,
                ..
            } => {
                assert_eq!(*action, SubmitAction::RemoveSelected);
                assert_eq!(message_ids, &vec!["m2".to_string()]);
            }
            other => panic!("unexpected intent {other:?}"),
        }

        let follow = flow.apply(t.generation, Outcome::Submitted(Ok("Removed 1".into())));
        assert!(follow.is_none());
        assert_eq!(flow.phase(), FlowPhase::Ready);
        assert_eq!(flow.status(), "Removed 1");
        assert_eq!(flow.list().len(), 2);
        assert_eq!(flow.list().selected_message_ids(), vec!["m2".to_string()]);
    }

    #[test]
    fn empty_selection_submits_empty_ids() {
        let mut flow = ready_flow(FlowKind::Unsubscribe, PostSubmit::Keep, vec![dup("m1")]);
        let t = flow.submit().unwrap();
        match t.intent {
            RequestIntent::SubmitSelection { message_ids, .. } => assert!(message_ids.is_empty()),
            other => panic!("unexpected intent {other:?}"),
        }
        flow.apply(t.generation, Outcome::Submitted(Ok(String::new())));
        assert_eq!(flow.phase(), FlowPhase::Ready);
    }

    #[test]
    fn submit_failure_keeps_list_and_can_be_retried() {
        let mut flow = ready_flow(FlowKind::Duplicates, PostSubmit::Keep, vec![dup("m1")]);
        flow.toggle_at(0);
        let t = flow.submit().unwrap();
        flow.apply(
            t.generation,
            Outcome::Submitted(Err(ClientError::Network("timed out".into()))),
        );

        assert_eq!(flow.phase(), FlowPhase::Error(Stage::Submit));
        assert_eq!(flow.list().selected_count(), 1);

        let retry = flow.submit().unwrap();
        assert_eq!(flow.phase(), FlowPhase::Submitting);
        assert_ne!(retry.generation, t.generation);
    }

    #[test]
    fn clear_selection_policy() {
        let mut flow = ready_flow(
            FlowKind::Duplicates,
            PostSubmit::ClearSelection,
            vec![dup("m1")],
        );
        flow.select_all();
        let t = flow.submit().unwrap();
        flow.apply(t.generation, Outcome::Submitted(Ok("ok".into())));

        assert_eq!(flow.list().selected_count(), 0);
        assert_eq!(flow.list().len(), 1);
    }

    #[test]
    fn reload_policy_refetches_and_keeps_server_text() {
        let mut flow = ready_flow(
            FlowKind::Unsubscribe,
            PostSubmit::Reload,
            vec![dup("m1"), dup("m2")],
        );
        flow.select_all();
        let t = flow.submit().unwrap();

        let reload = flow
            .apply(t.generation, Outcome::Submitted(Ok("Unsubscribed 2".into())))
            .unwrap();
        assert_eq!(flow.phase(), FlowPhase::Loading);
        assert_eq!(flow.status(), "Unsubscribed 2");
        assert!(matches!(reload.intent, RequestIntent::FetchList { .. }));

        flow.apply(reload.generation, Outcome::Listed(Ok(vec![])));
        assert_eq!(flow.phase(), FlowPhase::Ready);
        assert_eq!(flow.status(), "Unsubscribed 2");
        assert!(flow.list().is_empty());
    }

    #[test]
    fn stale_generation_is_dropped() {
        let mut flow = ActionFlow::new(FlowKind::Duplicates, "me@example.com", PostSubmit::Keep);
        let first = flow.activate().unwrap();
        flow.apply(
            first.generation,
            Outcome::Listed(Err(ClientError::Network("x".into()))),
        );
        let second = flow.activate().unwrap();

        flow.apply(first.generation, Outcome::Listed(Ok(vec![dup("old")])));
        assert_eq!(flow.phase(), FlowPhase::Loading);

        flow.apply(second.generation, Outcome::Listed(Ok(vec![dup("new")])));
        assert_eq!(flow.list().records()[0].message_id, "new");
    }

    #[test]
    fn cancel_discards_in_flight_result() {
        let mut flow = ready_flow(FlowKind::Duplicates, PostSubmit::Keep, vec![dup("m1")]);
        flow.toggle_at(0);
        let t = flow.submit().unwrap();
        flow.cancel();

        flow.apply(t.generation, Outcome::Submitted(Ok("late".into())));
        assert_eq!(flow.phase(), FlowPhase::Closed);
        assert_ne!(flow.status(), "late");
        assert_eq!(flow.list().selected_count(), 1);
    }

    #[test]
    fn mismatched_outcome_is_ignored() {
        let mut flow = ActionFlow::new(FlowKind::Duplicates, "me@example.com", PostSubmit::Keep);
        let t = flow.activate().unwrap();
        flow.apply(t.generation, Outcome::Submitted(Ok("??".into())));
        assert_eq!(flow.phase(), FlowPhase::Loading);
    }

    #[test]
    fn recreated_flow_never_accepts_old_tickets() {
        let mut old = ActionFlow::new(FlowKind::Duplicates, "me@example.com", PostSubmit::Keep);
        let stale = old.activate().unwrap();

        let mut fresh = ActionFlow::new(FlowKind::Duplicates, "me@example.com", PostSubmit::Keep);
        fresh.activate().unwrap();

        fresh.apply(stale.generation, Outcome::Listed(Ok(vec![dup("m1")])));
        assert_eq!(fresh.phase(), FlowPhase::Loading);
    }
}
