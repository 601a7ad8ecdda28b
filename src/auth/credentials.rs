use anyhow::{Context, Result};
use keyring::Entry;
use rand::RngCore;
use tracing::warn;

use super::vault::SESSION_KEY_LEN;

const SERVICE_NAME: &str = "campfire";

/// Keyring user under which the session-vault key is stored
const SESSION_KEY_USER: &str = "session-key";

pub struct CredentialStore;

impl CredentialStore {
    /// Store username and password in the OS keychain
    pub fn store(username: &str, password: &str) -> Result<()> {
        let entry = Entry::new(SERVICE_NAME, username)
            .context("Failed to create keyring entry")?;
        entry
            .set_password(password)
            .context("Failed to store password in keychain")?;
        Ok(())
    }

    /// Retrieve password for a username from the OS keychain
    pub fn get_password(username: &str) -> Result<String> {
        let entry = Entry::new(SERVICE_NAME, username)
            .context("Failed to create keyring entry")?;
        entry
            .get_password()
            .context("Failed to retrieve password from keychain")
    }

    /// Delete stored credentials for a username
    pub fn delete(username: &str) -> Result<()> {
        let entry = Entry::new(SERVICE_NAME, username)
            .context("Failed to create keyring entry")?;
        entry
            .delete_credential()
            .context("Failed to delete credential from keychain")?;
        Ok(())
    }

    /// Check if credentials exist for a username
    pub fn has_credentials(username: &str) -> bool {
        if let Ok(entry) = Entry::new(SERVICE_NAME, username) {
            entry.get_password().is_ok()
        } else {
            false
        }
    }

    /// Fetch the session-vault key, generating and storing one on first use.
    /// The key never touches disk; a key of the wrong size is treated as
    /// corrupt and replaced, which invalidates any previously sealed session.
    pub fn session_key() -> Result<[u8; SESSION_KEY_LEN]> {
        let entry = Entry::new(SERVICE_NAME, SESSION_KEY_USER)
            .context("Failed to create keyring entry for session key")?;

        match entry.get_secret() {
            Ok(bytes) if bytes.len() == SESSION_KEY_LEN => {
                let mut key = [0u8; SESSION_KEY_LEN];
                key.copy_from_slice(&bytes);
                Ok(key)
            }
            Ok(bytes) => {
                warn!(len = bytes.len(), "Stored session key has wrong size, regenerating");
                Self::generate_session_key(&entry)
            }
            Err(keyring::Error::NoEntry) => Self::generate_session_key(&entry),
            Err(e) => Err(e).context("Failed to read session key from keychain"),
        }
    }

    fn generate_session_key(entry: &Entry) -> Result<[u8; SESSION_KEY_LEN]> {
        let mut key = [0u8; SESSION_KEY_LEN];
        rand::rngs::OsRng.fill_bytes(&mut key);
        entry
            .set_secret(&key)
            .context("Failed to store session key in keychain")?;
        Ok(key)
    }
}
