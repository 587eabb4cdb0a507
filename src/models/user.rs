//! Account record and partial-update types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Cap on the per-account failure log; oldest entries drop first.
pub const MAX_FAILURE_ENTRIES: usize = 20;

/// Protected account record, stored keyed by `token`.
///
/// `login` and `password` are only ever present together, after the pair
/// passed identity-provider verification. `password` holds vault
/// ciphertext, never plaintext.
#[derive(Clone, Serialize, Deserialize)]
pub struct User {
    /// Opaque bearer token (64 hex chars, also the document key)
    pub token: String,
    /// Provider login, digits only
    pub login: Option<String>,
    /// Encrypted provider password (base64 ciphertext)
    pub password: Option<String>,
    /// Enrolled course codes; `None` while population is pending
    pub courses: Option<Vec<String>>,
    /// Email reported by the provider at last verification
    pub email: Option<String>,
    /// Administrative enable flag
    #[serde(default = "default_active")]
    pub active: bool,
    /// Recent background-task failures (bounded)
    #[serde(default)]
    pub errors: Vec<FailureEntry>,
}

fn default_active() -> bool {
    true
}

impl User {
    /// Blank record as `create_account` persists it.
    pub fn new(token: String) -> Self {
        Self {
            token,
            login: None,
            password: None,
            courses: None,
            email: None,
            active: true,
            errors: Vec::new(),
        }
    }

    /// Whether a verified login/password pair is on file.
    pub fn credentials_set(&self) -> bool {
        self.login.is_some() && self.password.is_some()
    }

    /// Append a failure entry, dropping the oldest past the cap.
    pub fn record_failure(&mut self, entry: FailureEntry) {
        self.errors.push(entry);
        if self.errors.len() > MAX_FAILURE_ENTRIES {
            let excess = self.errors.len() - MAX_FAILURE_ENTRIES;
            self.errors.drain(..excess);
        }
    }

    /// Remove the failure entry with the given id.
    ///
    /// Returns `false` if no entry matched.
    pub fn remove_failure(&mut self, error_id: &str) -> bool {
        let before = self.errors.len();
        self.errors.retain(|e| e.id != error_id);
        self.errors.len() != before
    }
}

impl fmt::Debug for User {
    // Ciphertext stays out of Debug output and therefore out of logs.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("token", &self.token)
            .field("login", &self.login)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("courses", &self.courses)
            .field("email", &self.email)
            .field("active", &self.active)
            .field("errors", &self.errors.len())
            .finish()
    }
}

/// One recorded background failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureEntry {
    /// Entry id (24 hex chars), the handle `delete_account_error` takes
    pub id: String,
    /// When the failure was recorded (ISO 8601)
    pub time_logged: String,
    /// Failure category
    pub kind: FailureKind,
    /// Human-readable detail
    pub message: String,
}

/// Failure categories recorded on the account log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureKind {
    Unknown,
    Internal,
    BadUserInfo,
    IdentityProvider,
    Config,
    FormGeometry,
}

/// Partial update for `modify_account`; `None` means "field not supplied".
#[derive(Clone, Default)]
pub struct AccountUpdate {
    /// New provider login (digits only)
    pub login: Option<String>,
    /// New provider password (plaintext in, encrypted at rest)
    pub password: Option<String>,
    /// New administrative flag
    pub active: Option<bool>,
}

impl AccountUpdate {
    /// Whether this update supplies either credential field.
    pub fn touches_credentials(&self) -> bool {
        self.login.is_some() || self.password.is_some()
    }
}

impl fmt::Debug for AccountUpdate {
    // The plaintext password passes through here; never let it print.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountUpdate")
            .field("login", &self.login)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("active", &self.active)
            .finish()
    }
}
