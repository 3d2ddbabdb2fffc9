//! Session persistence
//!
//! Lets a later process restore the signed-in user without asking for
//! credentials again.

use super::identity::Identity;
use crate::error::{AcademyError, AcademyResult};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Provider tokens and identity persisted between runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSession {
    pub identity: Identity,
    pub refresh_token: String,
    #[serde(default)]
    pub id_token: Option<String>,
    /// When `id_token` stops being accepted
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl StoredSession {
    /// Whether the id token is usable for at least `margin_secs` more seconds
    pub fn has_live_token(&self, margin_secs: i64) -> bool {
        match (&self.id_token, self.expires_at) {
            (Some(_), Some(expires_at)) => {
                expires_at - chrono::Duration::seconds(margin_secs) > Utc::now()
            }
            _ => false,
        }
    }
}

/// Session storage interface
pub trait SessionStorage: Send + Sync {
    /// Load the stored session, if any
    fn load(&self) -> AcademyResult<Option<StoredSession>>;

    /// Replace the stored session
    fn save(&self, session: &StoredSession) -> AcademyResult<()>;

    /// Forget the stored session
    fn clear(&self) -> AcademyResult<()>;
}

/// File-based session storage
#[derive(Debug, Clone)]
pub struct FileSessionStorage {
    path: PathBuf,
}

impl FileSessionStorage {
    /// Store the session in the given file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `~/.academy/session.json`, creating the directory with owner-only access
    pub fn default_location() -> AcademyResult<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| AcademyError::storage("Cannot find home directory"))?;
        let dir = home.join(".academy");
        create_private_dir(&dir)?;
        Ok(Self::new(dir.join("session.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn storage_error(&self, error: impl std::fmt::Display) -> AcademyError {
        AcademyError::storage_at(error.to_string(), self.path.display().to_string())
    }
}

fn create_private_dir(dir: &Path) -> AcademyResult<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::{DirBuilderExt, PermissionsExt};
        std::fs::DirBuilder::new()
            .recursive(true)
            .mode(0o700)
            .create(dir)
            .map_err(|e| AcademyError::storage_at(e.to_string(), dir.display().to_string()))?;

        let mode = std::fs::metadata(dir)?.permissions().mode() & 0o777;
        if mode != 0o700 {
            tracing::warn!(
                "Session directory has insecure permissions: {:o}. Expected 0700. Fixing...",
                mode
            );
            std::fs::set_permissions(dir, std::fs::Permissions::from_mode(0o700))?;
        }
    }

    #[cfg(not(unix))]
    {
        std::fs::create_dir_all(dir)?;
    }

    Ok(())
}

impl SessionStorage for FileSessionStorage {
    fn load(&self) -> AcademyResult<Option<StoredSession>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&self.path).map_err(|e| self.storage_error(e))?;
        match serde_json::from_str(&content) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                // A corrupt file is treated as "signed out"
                tracing::warn!(path = %self.path.display(), "Ignoring unreadable session file: {}", e);
                Ok(None)
            }
        }
    }

    fn save(&self, session: &StoredSession) -> AcademyResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| self.storage_error(e))?;
        }

        let content = serde_json::to_string_pretty(session)?;
        std::fs::write(&self.path, content).map_err(|e| self.storage_error(e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))
                .map_err(|e| self.storage_error(e))?;
        }

        Ok(())
    }

    fn clear(&self) -> AcademyResult<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path).map_err(|e| self.storage_error(e))?;
        }
        Ok(())
    }
}

/// In-memory session storage for tests and throwaway sessions
#[derive(Debug, Default)]
pub struct MemorySessionStorage {
    session: Mutex<Option<StoredSession>>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a stored session
    pub fn with_session(session: StoredSession) -> Self {
        Self {
            session: Mutex::new(Some(session)),
        }
    }
}

impl SessionStorage for MemorySessionStorage {
    fn load(&self) -> AcademyResult<Option<StoredSession>> {
        Ok(self.session.lock().clone())
    }

    fn save(&self, session: &StoredSession) -> AcademyResult<()> {
        *self.session.lock() = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> AcademyResult<()> {
        *self.session.lock() = None;
        Ok(())
    }
}
