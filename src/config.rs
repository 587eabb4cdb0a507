//! Store configuration loaded from environment variables.
//!
//! The credential-encryption key is resolved once at startup. Exactly one
//! of the two key sources must be configured; refusing to guess between
//! them keeps a misconfigured deployment from silently encrypting with the
//! wrong key.

use std::env;
use std::path::PathBuf;

/// Where the vault key material comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySource {
    /// Base64 key material passed directly in the environment.
    Inline(String),
    /// Path to a file holding raw key bytes.
    File(PathBuf),
}

/// Store configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Source of the credential-encryption key.
    pub key_source: KeySource,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            key_source: KeySource::Inline(
                "bG9ja2JveC10ZXN0LWtleS1tYXRlcmlhbC0zMmIhIQ==".to_string(),
            ),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// `LOCKBOX_CREDENTIAL_KEY` carries base64 key material inline;
    /// `LOCKBOX_CREDENTIAL_KEY_FILE` points at a file of raw key bytes.
    /// Setting neither or both is a startup error.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let inline = env::var("LOCKBOX_CREDENTIAL_KEY").ok();
        let file = env::var("LOCKBOX_CREDENTIAL_KEY_FILE").ok();

        let key_source = match (inline, file) {
            (Some(key), None) => KeySource::Inline(key.trim().to_string()),
            (None, Some(path)) => KeySource::File(PathBuf::from(path)),
            (Some(_), Some(_)) => return Err(ConfigError::ConflictingKeySources),
            (None, None) => return Err(ConfigError::MissingKeySource),
        };

        Ok(Self { key_source })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing credential key: set LOCKBOX_CREDENTIAL_KEY or LOCKBOX_CREDENTIAL_KEY_FILE")]
    MissingKeySource,

    #[error("LOCKBOX_CREDENTIAL_KEY and LOCKBOX_CREDENTIAL_KEY_FILE are mutually exclusive")]
    ConflictingKeySources,
}
