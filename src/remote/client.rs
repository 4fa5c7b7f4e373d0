use anyhow::{Result, anyhow};
use log::{debug, info};
use reqwest::blocking::Client;
use url::Url;

use crate::domain::record::MailRecord;
use crate::error::ClientError;
use crate::remote::RemoteActions;
use crate::remote::action::{ListAction, RequestIntent, SubmitAction};
use crate::remote::wire::decode_list;

/// Hosted script every action is sent to unless the config overrides it.
pub const DEFAULT_ENDPOINT: &str = "https://script.google.com/macros/s/AKfycbyP1wB2Es-8C-e0EeMcRn1wVKAOgJrgCiIirKdU53V38-zmHslREqDh-UbbrZzRetSz/exec";

/// Blocking GET client for the backend script. One attempt per call, no
/// retries, default timeouts.
#[derive(Clone)]
pub struct RemoteActionClient {
    base: Url,
    http: Client,
}

impl RemoteActionClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let base =
            Url::parse(base_url).map_err(|e| anyhow!("Invalid endpoint_url '{base_url}': {e}"))?;
        Ok(Self::with_client(base, Client::new()))
    }

    pub fn with_client(base: Url, http: Client) -> Self {
        Self { base, http }
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn get(&self, intent: &RequestIntent) -> Result<Vec<u8>, ClientError> {
        let url = intent.to_url(&self.base);

        let resp = self
            .http
            .get(url)
            .send()
            .map_err(|e| ClientError::Network(e.to_string()))?;

        debug!("{} answered {}", intent.action_name(), resp.status());

        let body = resp
            .bytes()
            .map_err(|e| ClientError::Network(e.to_string()))?;
        Ok(body.to_vec())
    }
}

impl RemoteActions for RemoteActionClient {
    fn fetch_list(&self, action: ListAction, email: &str) -> Result<Vec<MailRecord>, ClientError> {
        info!("{} for {email}", action.as_str());

        let body = self.get(&RequestIntent::FetchList {
            action,
            email: email.to_string(),
        })?;
        decode_list(action, &body)
    }

    fn submit_selection(
        &self,
        action: SubmitAction,
        email: &str,
        message_ids: &[String],
    ) -> Result<String, ClientError> {
        info!(
            "{} for {email} ({} message(s))",
            action.as_str(),
            message_ids.len()
        );

        let body = self.get(&RequestIntent::SubmitSelection {
            action,
            email: email.to_string(),
            message_ids: message_ids.to_vec(),
        })?;

        // Any answer from the server is a status line to show, whatever the HTTP status.
        String::from_utf8(body)
            .map_err(|_| ClientError::Decode("response body is not UTF-8 text".into()))
    }
}
