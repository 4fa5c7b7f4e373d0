use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use log::debug;

use crate::flow::{FlowKind, Outcome, Ticket};
use crate::remote::{RemoteActions, RequestIntent};

/// A finished request, addressed to the flow that issued it.
#[derive(Debug)]
pub struct Completion {
    pub kind: FlowKind,
    pub generation: u64,
    pub outcome: Outcome,
}

/// Run a request on the calling thread.
pub fn execute(remote: &dyn RemoteActions, intent: &RequestIntent) -> Outcome {
    match intent {
        RequestIntent::FetchList { action, email } => {
            Outcome::Listed(remote.fetch_list(*action, email))
        }
        RequestIntent::SubmitSelection {
            action,
            email,
            message_ids,
        } => Outcome::Submitted(remote.submit_selection(*action, email, message_ids)),
    }
}

/// Runs tickets on worker threads and posts completions to one channel,
/// drained by the thread that owns the flows.
#[derive(Clone)]
pub struct Dispatcher {
    remote: Arc<dyn RemoteActions>,
    tx: Sender<Completion>,
}

impl Dispatcher {
    pub fn new(remote: Arc<dyn RemoteActions>) -> (Self, Receiver<Completion>) {
        let (tx, rx) = mpsc::channel();
        (Self { remote, tx }, rx)
    }

    pub fn dispatch(&self, ticket: Ticket) {
        let remote = Arc::clone(&self.remote);
        let tx = self.tx.clone();

        thread::spawn(move || {
            let outcome = execute(remote.as_ref(), &ticket.intent);
            let done = Completion {
                kind: ticket.kind,
                generation: ticket.generation,
                outcome,
            };
            if tx.send(done).is_err() {
                debug!("{:?}: nobody is listening for this result", ticket.kind);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    use crate::domain::record::MailRecord;
    use crate::error::ClientError;
    use crate::flow::{ActionFlow, FlowPhase, PostSubmit};
    use crate::remote::{ListAction, SubmitAction};

    #[derive(Default)]
    struct FakeRemote {
        submitted: Mutex<Vec<(SubmitAction, String, Vec<String>)>>,
    }

    impl RemoteActions for FakeRemote {
        fn fetch_list(
            &self,
            action: ListAction,
            _email: &str,
        ) -> Result<Vec<MailRecord>, ClientError> {
            match action {
                ListAction::GetDuplicates => Ok(vec![MailRecord::new(
                    "m1",
                    "a@x.com",
                    Some("Sale".into()),
                    "Buy now",
                )]),
                ListAction::GetUnsubEmails => Err(ClientError::Network("offline".into())),
            }
        }

        fn submit_selection(
            &self,
            action: SubmitAction,
            email: &str,
            message_ids: &[String],
        ) -> Result<String, ClientError> {
            self.submitted
                .lock()
                .unwrap()
                .push((action, email.to_string(), message_ids.to_vec()));
            Ok(format!("done {}", message_ids.len()))
        }
    }

    fn pump(flow: &mut ActionFlow, rx: &Receiver<Completion>) -> Option<Ticket> {
        let c = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(c.kind, flow.kind());
        flow.apply(c.generation, c.outcome)
    }

    #[test]
    fn completions_come_back_over_the_channel() {
        let remote = Arc::new(FakeRemote::default());
        let (dispatcher, rx) = Dispatcher::new(remote.clone());

        let mut flow = ActionFlow::new(FlowKind::Duplicates, "me@example.com", PostSubmit::Keep);
        dispatcher.dispatch(flow.activate().unwrap());
        pump(&mut flow, &rx);
        assert_eq!(flow.phase(), FlowPhase::Ready);

        flow.toggle_at(0);
        dispatcher.dispatch(flow.submit().unwrap());
        pump(&mut flow, &rx);
        assert_eq!(flow.status(), "done 1");

        let calls = remote.submitted.lock().unwrap();
        assert_eq!(
            calls[0],
            (
                SubmitAction::RemoveSelected,
                "me@example.com".to_string(),
                vec!["m1".to_string()]
            )
        );
    }

    #[test]
    fn two_flows_run_independently() {
        let (dispatcher, rx) = Dispatcher::new(Arc::new(FakeRemote::default()));

        let mut dups = ActionFlow::new(FlowKind::Duplicates, "me@example.com", PostSubmit::Keep);
        let mut unsub =
            ActionFlow::new(FlowKind::Unsubscribe, "me@example.com", PostSubmit::Keep);
        dispatcher.dispatch(dups.activate().unwrap());
        dispatcher.dispatch(unsub.activate().unwrap());

        for _ in 0..2 {
            let c = rx.recv_timeout(Duration::from_secs(5)).unwrap();
            match c.kind {
                FlowKind::Duplicates => dups.apply(c.generation, c.outcome),
                FlowKind::Unsubscribe => unsub.apply(c.generation, c.outcome),
            };
        }

        assert_eq!(dups.phase(), FlowPhase::Ready);
        assert!(matches!(unsub.phase(), FlowPhase::Error(_)));
        assert!(unsub.list().is_empty());
    }

    #[test]
    fn dropped_receiver_does_not_panic_worker() {
        let (dispatcher, rx) = Dispatcher::new(Arc::new(FakeRemote::default()));
        drop(rx);

        let mut flow = ActionFlow::new(FlowKind::Duplicates, "me@example.com", PostSubmit::Keep);
        dispatcher.dispatch(flow.activate().unwrap());
        thread::sleep(Duration::from_millis(50));
    }
}
