// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Form-geometry extractor seam.
//!
//! Resolution drives a headless browser against the form URL, which is
//! synchronous and slow; the cache runs it on a blocking worker. The
//! concrete extractor lives outside this crate.

use std::fmt;

use crate::models::GeometryField;

/// Credentials handed to the extractor for sign-in-gated forms.
pub struct FormCredentials {
    /// Email tied to the account, when verification recorded one
    pub email: Option<String>,
    /// Provider login
    pub login: String,
    /// Provider password (plaintext, decrypted just for this call)
    pub password: String,
}

impl fmt::Debug for FormCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormCredentials")
            .field("email", &self.email)
            .field("login", &self.login)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// What a successful extraction yields.
#[derive(Debug, Clone)]
pub struct ExtractedForm {
    /// Whether the form demanded provider sign-in before rendering
    pub auth_required: bool,
    /// Fillable fields in render order
    pub fields: Vec<GeometryField>,
}

/// Extractor failures, split by the status recorded on the cache entry.
#[derive(Debug, thiserror::Error)]
pub enum ExtractorError {
    /// Sign-in was demanded and the credentials did not satisfy it.
    /// Recorded as status 403.
    #[error("Form sign-in failed: {0}")]
    AuthFailed(String),

    /// The page loaded but is not a form this extractor understands.
    /// Recorded as status 400.
    #[error("Form not usable: {0}")]
    InvalidForm(String),
}

/// External geometry extractor consumed at its interface boundary.
pub trait GeometryExtractor: Send + Sync {
    /// Resolve the fillable-field layout of a form URL.
    ///
    /// Blocking; callers run it under `spawn_blocking`.
    fn resolve(
        &self,
        url: &str,
        credentials: &FormCredentials,
    ) -> Result<ExtractedForm, ExtractorError>;
}
