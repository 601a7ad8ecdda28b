//! Sealing of the persisted session blob.
//!
//! The session file carries a bearer token, so it is never written in
//! cleartext. Blobs are sealed with XChaCha20-Poly1305 under a key held in
//! the OS keychain; the on-disk format is the 24-byte nonce followed by the
//! ciphertext.

use anyhow::{anyhow, Result};
use chacha20poly1305::aead::{Aead, AeadCore, KeyInit, OsRng};
use chacha20poly1305::{Key, XChaCha20Poly1305, XNonce};

/// Vault key size in bytes
pub const SESSION_KEY_LEN: usize = 32;

/// XChaCha20 nonce size in bytes
const NONCE_LEN: usize = 24;

pub struct SessionVault {
    cipher: XChaCha20Poly1305,
}

impl SessionVault {
    pub fn new(key: &[u8; SESSION_KEY_LEN]) -> Self {
        Self {
            cipher: XChaCha20Poly1305::new(Key::from_slice(key)),
        }
    }

    /// Seal a plaintext blob. A fresh nonce is drawn per call, so sealing
    /// the same plaintext twice yields different blobs.
    pub fn seal(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let nonce = XChaCha20Poly1305::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext)
            .map_err(|_| anyhow!("Failed to seal session data"))?;

        let mut blob = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        blob.extend_from_slice(nonce.as_slice());
        blob.extend_from_slice(&ciphertext);
        Ok(blob)
    }

    /// Open a sealed blob. Fails on truncation, tampering, or a key change;
    /// callers treat any failure as "no stored session".
    pub fn open(&self, blob: &[u8]) -> Result<Vec<u8>> {
        if blob.len() <= NONCE_LEN {
            return Err(anyhow!("Sealed session blob is truncated"));
        }
        let (nonce, ciphertext) = blob.split_at(NONCE_LEN);
        self.cipher
            .decrypt(XNonce::from_slice(nonce), ciphertext)
            .map_err(|_| anyhow!("Failed to open sealed session data"))
    }
}
