//! Authentication module for managing user sessions and credentials.
//!
//! This module provides:
//! - `Session`: the session store — holds the current bearer credential,
//!   hands out consistent snapshots to concurrent requests, and persists
//!   encrypted between runs
//! - `SessionVault`: XChaCha20-Poly1305 sealing of the persisted session
//! - `CredentialStore`: secure OS-level storage via keyring for the login
//!   password and the vault key
//! - `CredentialProvider`: the snapshot-read interface the request
//!   authorizer consumes

pub mod credentials;
pub mod session;
pub mod vault;

pub use credentials::CredentialStore;
pub use session::{CredentialProvider, Session, SessionData};
pub use vault::SessionVault;
