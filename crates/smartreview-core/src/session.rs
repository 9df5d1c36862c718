//! Session state and durable storage.
//!
//! The session (bearer token + cached identity snapshot) lives in
//! `${SMARTREVIEW_HOME}/session.json` with restricted permissions (0600).
//! Tokens are never logged or displayed in full.
//!
//! Durable storage is only a cache: the persisted snapshot may be rendered
//! while offline, but access decisions are made from the identity the
//! backend confirmed during the current run.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::api::{BackendClient, User};
use crate::config::paths;

/// On-disk session shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SessionFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user: Option<User>,
}

/// The client's authentication state.
///
/// `user()` only returns an identity confirmed by the backend since this
/// store was created; `snapshot()` is the persisted copy from an earlier
/// run, suitable for optimistic display but never for authorization.
#[derive(Debug)]
pub struct SessionStore {
    path: PathBuf,
    token: Option<String>,
    user: Option<User>,
    snapshot: Option<User>,
}

impl SessionStore {
    /// Loads the session from the default location.
    ///
    /// # Errors
    /// Returns an error if an existing session file cannot be read.
    pub fn load() -> Result<Self> {
        Self::load_from(paths::session_path())
    }

    /// Loads the session from an explicit path (missing file means a fresh,
    /// signed-out session).
    ///
    /// # Errors
    /// Returns an error if an existing session file cannot be read.
    pub fn load_from(path: PathBuf) -> Result<Self> {
        let stored = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read session from {}", path.display()))?;
            // A corrupt session file is treated as signed-out, not fatal.
            serde_json::from_str(&contents).unwrap_or_else(|e| {
                warn!("discarding unreadable session file: {e}");
                SessionFile::default()
            })
        } else {
            SessionFile::default()
        };

        Ok(Self {
            path,
            token: stored.token,
            user: None,
            snapshot: stored.user,
        })
    }

    /// The bearer token, if any. Presence does not imply validity.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// The backend-confirmed identity, if resolution succeeded.
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// The persisted identity snapshot, for display only.
    pub fn snapshot(&self) -> Option<&User> {
        self.snapshot.as_ref()
    }

    /// Resolves the current user against the backend.
    ///
    /// - Success confirms the identity and refreshes the snapshot.
    /// - A 401 invalidates the whole session (token and snapshot cleared).
    /// - Any other failure resolves to "no user" but keeps the snapshot so
    ///   the UI can still show who was signed in.
    ///
    /// Never returns an error: resolution failure is a signed-out state.
    pub async fn bootstrap(&mut self, backend: &BackendClient) -> Option<User> {
        match backend.fetch_user(self.token.as_deref()).await {
            Ok(user) => {
                self.user = Some(user.clone());
                self.snapshot = Some(user.clone());
                if let Err(e) = self.persist() {
                    warn!("failed to persist session: {e:#}");
                }
                Some(user)
            }
            Err(e) if e.is_unauthorized() => {
                debug!("session rejected by backend, clearing");
                self.clear();
                None
            }
            Err(e) => {
                warn!("identity check failed: {e}");
                self.user = None;
                None
            }
        }
    }

    /// Commits a token received from an OAuth redirect to durable storage.
    ///
    /// Must complete before any identity fetch that depends on the token is
    /// issued; the previously confirmed user is dropped so the next
    /// `bootstrap` re-resolves under the new token.
    ///
    /// # Errors
    /// Returns an error if the session file cannot be written.
    pub fn apply_redirect_token(&mut self, token: String) -> Result<()> {
        self.token = Some(token);
        self.user = None;
        self.persist()
    }

    /// Signs out: best-effort server logout, then local teardown.
    ///
    /// The logout call's outcome is ignored; after this returns, no caller
    /// can observe a token or a user from this store.
    pub async fn sign_out(&mut self, backend: &BackendClient) {
        if let Err(e) = backend.logout(self.token.as_deref()).await {
            debug!("logout request failed (ignored): {e}");
        }
        self.clear();
    }

    fn clear(&mut self) {
        self.token = None;
        self.user = None;
        self.snapshot = None;
        if let Err(e) = self.persist() {
            warn!("failed to clear session file: {e:#}");
        }
    }

    /// Persists the session with restricted permissions (0600).
    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let stored = SessionFile {
            token: self.token.clone(),
            user: self.snapshot.clone(),
        };
        let contents =
            serde_json::to_string_pretty(&stored).context("Failed to serialize session")?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(&self.path)
                .with_context(|| format!("Failed to open {} for writing", self.path.display()))?;
            file.write_all(contents.as_bytes())
                .with_context(|| format!("Failed to write to {}", self.path.display()))?;
        }

        #[cfg(not(unix))]
        {
            fs::write(&self.path, contents)
                .with_context(|| format!("Failed to write to {}", self.path.display()))?;
        }

        Ok(())
    }
}

/// Returns a masked version of a token for display (first 8 chars + ...).
pub fn mask_token(token: &str) -> String {
    if token.len() <= 12 {
        return "***".to_string();
    }
    format!("{}...", &token[..8])
}
