use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::vault::SessionVault;

/// Session file name in the cache root
const SESSION_FILE: &str = "session.bin";

/// Token expiry time in minutes.
/// Campfire tokens expire after ~60 minutes of inactivity.
const TOKEN_EXPIRY_MINUTES: i64 = 60;

/// Buffer time before expiry to trigger refresh (5 minutes)
const TOKEN_REFRESH_BUFFER_MINUTES: i64 = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    pub token: String,
    pub account_guid: String,
    pub user_id: i64,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl SessionData {
    pub fn is_expired(&self) -> bool {
        let expiry = self.created_at + Duration::minutes(TOKEN_EXPIRY_MINUTES);
        Utc::now() > expiry
    }

    /// Check if the session will expire soon and should be refreshed
    pub fn needs_refresh(&self) -> bool {
        let refresh_at = self.created_at
            + Duration::minutes(TOKEN_EXPIRY_MINUTES - TOKEN_REFRESH_BUFFER_MINUTES);
        Utc::now() > refresh_at
    }

    pub fn time_until_expiry(&self) -> Duration {
        let expiry = self.created_at + Duration::minutes(TOKEN_EXPIRY_MINUTES);
        expiry - Utc::now()
    }

    /// Get minutes remaining until expiry (for display)
    pub fn minutes_until_expiry(&self) -> i64 {
        self.time_until_expiry().num_minutes().max(0)
    }
}

/// Read interface the request authorizer consumes. Implementations must
/// return a consistent snapshot without blocking on other readers.
pub trait CredentialProvider: Send + Sync {
    /// The current bearer credential, if a session is active.
    fn current_credential(&self) -> Option<String>;
}

/// The session store.
///
/// Holds the current session behind a short-lived RwLock so that many
/// in-flight requests can snapshot it concurrently while login, refresh,
/// and logout (which arrive one at a time from user actions) replace the
/// whole value atomically. Cloning shares the underlying store.
#[derive(Clone)]
pub struct Session {
    cache_dir: PathBuf,
    data: Arc<RwLock<Option<Arc<SessionData>>>>,
}

impl Session {
    pub fn new(cache_dir: PathBuf) -> Self {
        Self {
            cache_dir,
            data: Arc::new(RwLock::new(None)),
        }
    }

    /// Load a sealed session from disk. An unreadable or tampered blob, or
    /// an expired session, leaves the store signed out; only the first of
    /// those removes the file, since an expired blob is still well-formed.
    pub fn load(&self, vault: &SessionVault) -> Result<bool> {
        let path = self.session_path();
        if !path.exists() {
            return Ok(false);
        }

        let blob = std::fs::read(&path).context("Failed to read session file")?;
        let plaintext = match vault.open(&blob) {
            Ok(plaintext) => plaintext,
            Err(e) => {
                warn!(error = %e, "Stored session could not be opened, discarding");
                let _ = std::fs::remove_file(&path);
                return Ok(false);
            }
        };

        let data: SessionData = match serde_json::from_slice(&plaintext) {
            Ok(data) => data,
            Err(e) => {
                warn!(error = %e, "Stored session could not be parsed, discarding");
                let _ = std::fs::remove_file(&path);
                return Ok(false);
            }
        };

        if data.is_expired() {
            return Ok(false);
        }

        *self.data.write() = Some(Arc::new(data));
        Ok(true)
    }

    /// Seal and save the current session to disk
    pub fn save(&self, vault: &SessionVault) -> Result<()> {
        if let Some(data) = self.snapshot() {
            let plaintext =
                serde_json::to_vec(data.as_ref()).context("Failed to serialize session")?;
            let blob = vault.seal(&plaintext)?;

            let path = self.session_path();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, blob)?;
        }
        Ok(())
    }

    /// Clear session data, in memory and on disk
    pub fn clear(&self) -> Result<()> {
        *self.data.write() = None;
        let path = self.session_path();
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }

    /// Replace the session with new data (login or token refresh)
    pub fn update(&self, data: SessionData) {
        *self.data.write() = Some(Arc::new(data));
    }

    /// Consistent snapshot of the whole session value. Requests already
    /// holding a snapshot are unaffected by a later update or clear.
    pub fn snapshot(&self) -> Option<Arc<SessionData>> {
        self.data.read().clone()
    }

    /// Get the bearer token if a session is active
    pub fn token(&self) -> Option<String> {
        self.data.read().as_ref().map(|d| d.token.clone())
    }

    /// Get the user ID if a session is active
    pub fn user_id(&self) -> Option<i64> {
        self.data.read().as_ref().map(|d| d.user_id)
    }

    /// Check if a session is active and not expired
    pub fn is_valid(&self) -> bool {
        self.data
            .read()
            .as_ref()
            .map(|d| !d.is_expired())
            .unwrap_or(false)
    }

    fn session_path(&self) -> PathBuf {
        self.cache_dir.join(SESSION_FILE)
    }
}

impl CredentialProvider for Session {
    fn current_credential(&self) -> Option<String> {
        self.token()
    }
}
