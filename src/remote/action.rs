use url::Url;

/// Backend operations that answer with a JSON list of records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListAction {
    GetDuplicates,
    GetUnsubEmails,
}

impl ListAction {
    pub fn as_str(self) -> &'static str {
        match self {
            ListAction::GetDuplicates => "getDuplicates",
            ListAction::GetUnsubEmails => "getUnsubEmails",
        }
    }
}

/// Backend operations that take a list of message ids and answer with text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitAction {
    RemoveSelected,
    UnsubscribeSelected,
}

impl SubmitAction {
    pub fn as_str(self) -> &'static str {
        match self {
            SubmitAction::RemoveSelected => "removeSelected",
            SubmitAction::UnsubscribeSelected => "unsubscribeSelected",
        }
    }
}

/// An outgoing call, built fresh for every user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestIntent {
    FetchList {
        action: ListAction,
        email: String,
    },
    SubmitSelection {
        action: SubmitAction,
        email: String,
        message_ids: Vec<String>,
    },
}

impl RequestIntent {
    pub fn action_name(&self) -> &'static str {
        match self {
            RequestIntent::FetchList { action, .. } => action.as_str(),
            RequestIntent::SubmitSelection { action, .. } => action.as_str(),
        }
    }

    /// Appends `action`, `email` and, for submissions, the comma-joined
    /// `ids` to the base endpoint. Existing query pairs on `base` are kept.
    pub fn to_url(&self, base: &Url) -> Url {
        let mut url = base.clone();
        {
            let mut q = url.query_pairs_mut();
            match self {
                RequestIntent::FetchList { action, email } => {
                    q.append_pair("action", action.as_str());
                    q.append_pair("email", email);
                }
                RequestIntent::SubmitSelection {
                    action,
                    email,
                    message_ids,
                } => {
                    q.append_pair("action", action.as_str());
                    q.append_pair("email", email);
                    q.append_pair("ids", &message_ids.join(","));
                }
            }
        }
        url
    }
}
