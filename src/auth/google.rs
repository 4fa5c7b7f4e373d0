use anyhow::{Result, anyhow};
use log::{info, warn};
use serde::Deserialize;
use std::path::PathBuf;

use crate::auth::oauth::{self, AuthRequest, Tokens};
use crate::auth::provider::IdentityProvider;
use crate::auth::{session_file, token_store};
use crate::config::Config;
use crate::error::ClientError;

const USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";

pub const BASE_SCOPES: &[&str] = &["openid", "email"];

/// Mail scopes the backend script needs on top of the base identity.
pub const MAIL_SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/gmail.readonly",
    "https://www.googleapis.com/auth/gmail.modify",
];

#[derive(Debug, Deserialize)]
struct UserInfo {
    email: String,
}

/// Google sign-in through the browser with a loopback redirect.
pub struct GoogleIdentity {
    pub client_id: String,
    pub client_secret: Option<String>,
    pub redirect_uri: String,
    session_path: PathBuf,
}

impl GoogleIdentity {
    pub fn from_config(cfg: &Config) -> Result<Self> {
        let client_secret = token_store::load_client_secret(&cfg.client_id)?
            .or_else(|| std::env::var("OAUTH_CLIENT_SECRET").ok());

        Ok(Self {
            client_id: cfg.client_id.clone(),
            client_secret,
            redirect_uri: cfg.redirect_uri().to_string(),
            session_path: session_file::session_path()?,
        })
    }

    fn authorize(&self, scopes: &[&str], extra_params: &[(&str, &str)]) -> Result<Tokens> {
        oauth::perform_pkce_flow(&AuthRequest {
            client_id: &self.client_id,
            client_secret: self.client_secret.as_deref(),
            redirect_uri: &self.redirect_uri,
            scopes,
            extra_params,
        })
    }

    fn interactive_sign_in(&self) -> Result<String> {
        // 1) base identity
        let base = self.authorize(BASE_SCOPES, &[])?;
        let email = fetch_email(&base.access_token)?;
        info!("base sign-in done for {email}");

        // 2) incremental grant of the mail scopes
        let granted = self.authorize(
            MAIL_SCOPES,
            &[("include_granted_scopes", "true"), ("login_hint", email.as_str())],
        )?;
        if !granted.has_scopes(MAIL_SCOPES) {
            return Err(anyhow!("mail access was not granted"));
        }

        // 3) remember who we are for restore()
        match &granted.refresh_token {
            Some(rt) => {
                if let Err(e) = token_store::save_refresh_token(&email, rt) {
                    warn!("couldn't save refresh token to keyring: {e}");
                }
            }
            None => warn!("no refresh token returned; the session will not be restorable"),
        }
        session_file::save(
            &self.session_path,
            &session_file::SessionFile {
                email: Some(email.clone()),
            },
        )?;

        Ok(email)
    }

    fn resume(&self) -> Result<Option<String>> {
        let Some(sf) = session_file::load(&self.session_path)? else {
            return Ok(None);
        };
        let Some(email) = sf.email else {
            return Ok(None);
        };
        let Some(rt) = token_store::load_refresh_token(&email)? else {
            return Ok(None);
        };

        let tokens = oauth::refresh_access_token(&self.client_id, self.client_secret.as_deref(), &rt)?;
        if !tokens.has_scopes(MAIL_SCOPES) {
            return Err(anyhow!("stored grant no longer covers mail access"));
        }

        let current = fetch_email(&tokens.access_token)?;
        if current != email {
            return Err(anyhow!("stored session belongs to {email}, token to {current}"));
        }
        Ok(Some(current))
    }

    fn forget(&self) -> Result<()> {
        if let Some(sf) = session_file::load(&self.session_path)? {
            if let Some(email) = sf.email {
                token_store::delete_refresh_token(&email)?;
            }
        }
        session_file::remove(&self.session_path)
    }
}

fn fetch_email(access_token: &str) -> Result<String> {
    let info: UserInfo = reqwest::blocking::Client::new()
        .get(USERINFO_URL)
        .bearer_auth(access_token)
        .send()?
        .error_for_status()?
        .json()?;
    if info.email.is_empty() {
        return Err(anyhow!("userinfo carried no email"));
    }
    Ok(info.email)
}

fn auth_err(e: anyhow::Error) -> ClientError {
    ClientError::Auth(format!("{e:#}"))
}

impl IdentityProvider for GoogleIdentity {
    fn sign_in(&self) -> Result<String, ClientError> {
        self.interactive_sign_in().map_err(auth_err)
    }

    fn restore(&self) -> Result<Option<String>, ClientError> {
        self.resume().map_err(auth_err)
    }

    fn sign_out(&self) -> Result<(), ClientError> {
        self.forget().map_err(auth_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity_with_session(path: PathBuf) -> GoogleIdentity {
        GoogleIdentity {
            client_id: "x.apps.googleusercontent.com".into(),
            client_secret: None,
            redirect_uri: "http://127.0.0.1:8080/callback".into(),
            session_path: path,
        }
    }

    #[test]
    fn restore_without_session_file_is_none() {
        let path = std::env::temp_dir()
            .join(format!("mail_assistant_g_{}", uuid::Uuid::new_v4()))
            .join("session.json");
        let g = identity_with_session(path);
        assert_eq!(g.restore().unwrap(), None);
    }

    #[test]
    fn session_file_without_email_is_none() {
        let dir = std::env::temp_dir().join(format!("mail_assistant_g_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("session.json");
        session_file::save(&path, &session_file::SessionFile::default()).unwrap();

        let g = identity_with_session(path);
        assert_eq!(g.restore().unwrap(), None);
    }
}
