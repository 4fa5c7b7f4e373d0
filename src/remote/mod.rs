pub mod action;
pub mod client;
pub mod wire;

use crate::domain::record::MailRecord;
use crate::error::ClientError;

pub use action::{ListAction, RequestIntent, SubmitAction};
pub use client::RemoteActionClient;

/// The two calls the backend script answers. Implemented by the HTTP client
/// and by fakes in tests.
pub trait RemoteActions: Send + Sync {
    fn fetch_list(&self, action: ListAction, email: &str) -> Result<Vec<MailRecord>, ClientError>;

    fn submit_selection(
        &self,
        action: SubmitAction,
        email: &str,
        message_ids: &[String],
    ) -> Result<String, ClientError>;
}
