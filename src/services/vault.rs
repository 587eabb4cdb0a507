// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Credential encryption service (AES-256-GCM).
//!
//! Holds the single symmetric key for the process, derived once at
//! startup from the configured key source. Every encryption uses a fresh
//! random 96-bit nonce; the stored envelope is
//! base64(`nonce || ciphertext || tag`).

use std::fmt;
use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use hkdf::Hkdf;
use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM};
use ring::rand::{SecureRandom, SystemRandom};
use sha2::Sha256;

use crate::config::KeySource;

/// AEAD nonce length (96 bits).
const NONCE_LEN: usize = 12;

/// HKDF context binding the derived key to this use. Changing it would
/// orphan every stored ciphertext.
const KEY_CONTEXT: &[u8] = b"lockbox credential key v1";

/// Vault errors.
///
/// Everything except [`VaultError::Decrypt`] can only happen at
/// construction time and is startup-fatal.
#[derive(Debug, thiserror::Error)]
pub enum VaultError {
    #[error("Credential key file unreadable: {0}")]
    UnreadableKeyFile(#[source] std::io::Error),

    #[error("Credential key material unusable: {0}")]
    InvalidKey(String),

    #[error("Encryption failed")]
    Encrypt,

    #[error("Decryption failed: wrong key or corrupted ciphertext")]
    Decrypt,
}

/// Credential encryption service.
#[derive(Clone)]
pub struct CredentialVault {
    key: Arc<LessSafeKey>,
}

impl CredentialVault {
    /// Build the vault from the configured key source.
    ///
    /// Key material may be any length; the 32-byte AES-256-GCM key is
    /// derived from it with HKDF-SHA256 under a fixed context string.
    pub fn new(source: &KeySource) -> Result<Self, VaultError> {
        let material = match source {
            KeySource::Inline(b64) => BASE64
                .decode(b64.trim())
                .map_err(|e| VaultError::InvalidKey(format!("bad base64: {}", e)))?,
            KeySource::File(path) => std::fs::read(path).map_err(VaultError::UnreadableKeyFile)?,
        };
        if material.is_empty() {
            return Err(VaultError::InvalidKey("empty key material".to_string()));
        }

        let hkdf = Hkdf::<Sha256>::new(None, &material);
        let mut key_bytes = [0u8; 32];
        hkdf.expand(KEY_CONTEXT, &mut key_bytes)
            .map_err(|_| VaultError::InvalidKey("key derivation failed".to_string()))?;

        let unbound = UnboundKey::new(&AES_256_GCM, &key_bytes)
            .map_err(|_| VaultError::InvalidKey("AES-256-GCM key rejected".to_string()))?;

        Ok(Self {
            key: Arc::new(LessSafeKey::new(unbound)),
        })
    }

    /// Encrypt a plaintext secret.
    /// Returns the base64 envelope stored in place of the plaintext.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, VaultError> {
        let rng = SystemRandom::new();
        let mut nonce_bytes = [0u8; NONCE_LEN];
        rng.fill(&mut nonce_bytes).map_err(|_| VaultError::Encrypt)?;
        let nonce = Nonce::assume_unique_for_key(nonce_bytes);

        // Seal in place: the buffer is extended with the 16-byte tag.
        let mut in_out = plaintext.as_bytes().to_vec();
        self.key
            .seal_in_place_append_tag(nonce, Aad::empty(), &mut in_out)
            .map_err(|_| VaultError::Encrypt)?;

        let mut envelope = Vec::with_capacity(NONCE_LEN + in_out.len());
        envelope.extend_from_slice(&nonce_bytes);
        envelope.extend_from_slice(&in_out);
        Ok(BASE64.encode(envelope))
    }

    /// Decrypt a base64 envelope produced by [`Self::encrypt`].
    ///
    /// Fails with [`VaultError::Decrypt`] when the envelope is malformed
    /// or was sealed under a different key. Callers treat that as an
    /// operational fault (key rotation gone wrong), never as user input
    /// error.
    pub fn decrypt(&self, envelope_b64: &str) -> Result<String, VaultError> {
        let envelope = BASE64
            .decode(envelope_b64)
            .map_err(|_| VaultError::Decrypt)?;
        if envelope.len() < NONCE_LEN + AES_256_GCM.tag_len() {
            return Err(VaultError::Decrypt);
        }

        let (nonce_bytes, ciphertext) = envelope.split_at(NONCE_LEN);
        let nonce =
            Nonce::try_assume_unique_for_key(nonce_bytes).map_err(|_| VaultError::Decrypt)?;

        let mut in_out = ciphertext.to_vec();
        let plaintext = self
            .key
            .open_in_place(nonce, Aad::empty(), &mut in_out)
            .map_err(|_| VaultError::Decrypt)?;

        String::from_utf8(plaintext.to_vec()).map_err(|_| VaultError::Decrypt)
    }
}

impl fmt::Debug for CredentialVault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialVault")
            .field("key", &"[REDACTED]")
            .finish()
    }
}
