use std::hash::{Hash, Hasher};

use uuid::Uuid;

/// One server-reported mail item shown in a selectable list.
///
/// `local_id` is minted per decode and only identifies the row locally; it
/// takes no part in equality or hashing and is never sent to the server.
#[derive(Debug, Clone)]
pub struct MailRecord {
    pub local_id: Uuid,
    pub message_id: String,
    pub from: String,
    /// Only the duplicates listing carries a subject.
    pub subject: Option<String>,
    /// Content preview (duplicates) or unsubscribe link (unsubscribe).
    pub detail: String,
}

impl MailRecord {
    pub fn new(
        message_id: impl Into<String>,
        from: impl Into<String>,
        subject: Option<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            local_id: Uuid::new_v4(),
            message_id: message_id.into(),
            from: from.into(),
            subject,
            detail: detail.into(),
        }
    }
}

impl PartialEq for MailRecord {
    fn eq(&self, other: &Self) -> bool {
        self.message_id == other.message_id
            && self.from == other.from
            && self.subject == other.subject
            && self.detail == other.detail
    }
}

impl Eq for MailRecord {}

impl Hash for MailRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.message_id.hash(state);
        self.from.hash(state);
        self.subject.hash(state);
        self.detail.hash(state);
    }
}
