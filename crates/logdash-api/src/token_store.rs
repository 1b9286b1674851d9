//! Persisted sign-in state
//!
//! Stores the bearer token together with the last known user record so the
//! client can resume a session on startup without a server round trip.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use logdash_types::User;

const SESSION_DIR: &str = ".logdash";
const SESSION_FILE: &str = "session.json";

/// Stored session entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    pub token: String,
    pub user: Option<User>,
    /// Unix seconds when the token was saved
    pub saved_at: u64,
}

impl StoredSession {
    pub fn new(token: String, user: Option<User>) -> Self {
        let saved_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        Self {
            token,
            user,
            saved_at,
        }
    }
}

/// Session file on disk
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `~/.logdash/session.json`, or the working directory if there is no home
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(SESSION_DIR)
            .join(SESSION_FILE)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored session; a missing or corrupt file yields `None`
    pub fn load(&self) -> Option<StoredSession> {
        let content = fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str::<StoredSession>(&content) {
            Ok(session) if !session.token.is_empty() => Some(session),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "ignoring unreadable session file");
                None
            }
        }
    }

    /// Save the session, creating parent directories as needed
    pub fn save(&self, session: &StoredSession) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(session).map_err(io::Error::other)?;
        fs::write(&self.path, content)?;
        restrict_permissions(&self.path)?;
        Ok(())
    }

    /// Delete the stored session; a missing file is fine
    pub fn clear(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> io::Result<()> {
    Ok(())
}
