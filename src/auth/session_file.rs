use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::config_dir;

/// Non-secret session metadata stored in ~/.config/mail_assistant/session.json
#[derive(Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionFile {
    /// Account the keyring refresh token belongs to.
    pub email: Option<String>,
}

pub fn session_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("session.json"))
}

pub fn save(path: &Path, sf: &SessionFile) -> Result<()> {
    let s = serde_json::to_string_pretty(sf)?;
    fs::write(path, s)?;
    Ok(())
}

/// Load the session file if present
pub fn load(path: &Path) -> Result<Option<SessionFile>> {
    if !path.exists() {
        return Ok(None);
    }
    let s = fs::read_to_string(path)?;
    let sf: SessionFile = serde_json::from_str(&s)?;
    Ok(Some(sf))
}

pub fn remove(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_load_remove() {
        let dir = std::env::temp_dir().join(format!("mail_assistant_sess_{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("session.json");

        assert_eq!(load(&path).unwrap(), None);

        let sf = SessionFile {
            email: Some("me@example.com".into()),
        };
        save(&path, &sf).unwrap();
        assert_eq!(load(&path).unwrap(), Some(sf));

        remove(&path).unwrap();
        remove(&path).unwrap();
        assert_eq!(load(&path).unwrap(), None);
    }
}
