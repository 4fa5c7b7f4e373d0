use anyhow::{Result, anyhow};
use keyring::{Entry, Error as KeyringError};

const SERVICE: &str = "mail_assistant";

/// What a keyring entry holds. Each kind gets its own key prefix so a
/// refresh token and a client secret never share an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Secret {
    RefreshToken,
    ClientSecret,
}

fn key(kind: Secret, owner: &str) -> String {
    match kind {
        Secret::RefreshToken => format!("refresh:{owner}"),
        Secret::ClientSecret => format!("client_secret:{owner}"),
    }
}

fn entry(kind: Secret, owner: &str) -> Result<Entry> {
    Entry::new(SERVICE, &key(kind, owner)).map_err(|e| anyhow!(e.to_string()))
}

fn store(kind: Secret, owner: &str, secret: &str) -> Result<()> {
    entry(kind, owner)?
        .set_password(secret)
        .map_err(|e| anyhow!(e.to_string()))
}

fn load(kind: Secret, owner: &str) -> Result<Option<String>> {
    match entry(kind, owner)?.get_password() {
        Ok(v) => Ok(Some(v)),
        Err(KeyringError::NoEntry) => Ok(None),
        Err(e) => Err(anyhow!(e.to_string())),
    }
}

fn forget(kind: Secret, owner: &str) -> Result<()> {
    match entry(kind, owner)?.delete_credential() {
        Ok(()) | Err(KeyringError::NoEntry) => Ok(()),
        Err(e) => Err(anyhow!(e.to_string())),
    }
}

/// Keep the refresh token of a signed-in account.
pub fn save_refresh_token(email: &str, refresh_token: &str) -> Result<()> {
    store(Secret::RefreshToken, email, refresh_token)
}

pub fn load_refresh_token(email: &str) -> Result<Option<String>> {
    load(Secret::RefreshToken, email)
}

/// Missing entries are fine.
pub fn delete_refresh_token(email: &str) -> Result<()> {
    forget(Secret::RefreshToken, email)
}

/// Keep the OAuth client secret, keyed by client id.
pub fn save_client_secret(client_id: &str, client_secret: &str) -> Result<()> {
    store(Secret::ClientSecret, client_id, client_secret)
}

pub fn load_client_secret(client_id: &str) -> Result<Option<String>> {
    load(Secret::ClientSecret, client_id)
}
