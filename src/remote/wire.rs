use std::collections::HashSet;

use serde::Deserialize;

use crate::domain::record::MailRecord;
use crate::error::ClientError;
use crate::remote::action::ListAction;

/// Element of the `getDuplicates` response.
#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(test, derive(serde::Serialize))]
#[serde(rename_all = "camelCase")]
pub struct DuplicateEmail {
    pub message_id: String,
    pub from: String,
    pub subject: String,
    pub preview: String,
}

/// Element of the `getUnsubEmails` response.
#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(test, derive(serde::Serialize))]
#[serde(rename_all = "camelCase")]
pub struct UnsubscribeEmail {
    pub message_id: String,
    pub from: String,
    pub unsubscribe_link: String,
}

impl From<DuplicateEmail> for MailRecord {
    fn from(d: DuplicateEmail) -> Self {
        MailRecord::new(d.message_id, d.from, Some(d.subject), d.preview)
    }
}

impl From<UnsubscribeEmail> for MailRecord {
    fn from(u: UnsubscribeEmail) -> Self {
        MailRecord::new(u.message_id, u.from, None, u.unsubscribe_link)
    }
}

/// Strictly decode a list response: one bad element fails the whole body.
/// `messageId` must be non-empty and unique within the response.
pub fn decode_list(action: ListAction, body: &[u8]) -> Result<Vec<MailRecord>, ClientError> {
    let records: Vec<MailRecord> = match action {
        ListAction::GetDuplicates => serde_json::from_slice::<Vec<DuplicateEmail>>(body)?
            .into_iter()
            .map(MailRecord::from)
            .collect(),
        ListAction::GetUnsubEmails => serde_json::from_slice::<Vec<UnsubscribeEmail>>(body)?
            .into_iter()
            .map(MailRecord::from)
            .collect(),
    };

    if let Some(pos) = records.iter().position(|r| r.message_id.is_empty()) {
        return Err(ClientError::Decode(format!(
            "element {pos} has an empty messageId"
        )));
    }

    let mut seen = HashSet::with_capacity(records.len());
    if let Some(pos) = records.iter().position(|r| !seen.insert(r.message_id.as_str())) {
        return Err(ClientError::Decode(format!(
            "element {pos} repeats messageId {:?}",
            records[pos].message_id
        )));
    }

    Ok(records)
}
