// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Store-wide error types with stable machine-readable codes.

use std::fmt;

/// Resource kinds a lookup can miss.
///
/// `delete_account_error` has to tell "no such account" apart from
/// "account exists but holds no failure entry with that id"; both
/// surface as [`LockboxError::NotFound`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingResource {
    Account,
    ErrorEntry,
}

impl fmt::Display for MissingResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingResource::Account => write!(f, "account"),
            MissingResource::ErrorEntry => write!(f, "error entry"),
        }
    }
}

/// Store operation error type.
#[derive(Debug, thiserror::Error)]
pub enum LockboxError {
    #[error("{0} not found")]
    NotFound(MissingResource),

    #[error("Invalid field: {0}")]
    InvalidField(String),

    #[error("Identity provider rejected the credentials")]
    InvalidCredentials,

    #[error("Identity provider error: {0}")]
    Upstream(String),

    #[error("State conflict: {0}")]
    StateConflict(String),

    #[error("Too many outstanding geometry requests")]
    RateLimitExceeded,

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl LockboxError {
    /// Stable code for embedding layers that map errors onto a wire
    /// protocol. Messages may change; these strings do not.
    pub fn code(&self) -> &'static str {
        match self {
            LockboxError::NotFound(_) => "not_found",
            LockboxError::InvalidField(_) => "invalid_field",
            LockboxError::InvalidCredentials => "invalid_credentials",
            LockboxError::Upstream(_) => "upstream_error",
            LockboxError::StateConflict(_) => "state_conflict",
            LockboxError::RateLimitExceeded => "rate_limit_exceeded",
            LockboxError::Internal(_) => "internal_error",
        }
    }
}

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, LockboxError>;
