// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Protected-record store for account credentials.
//!
//! Handles the credential workflow:
//! 1. Look up the record and validate supplied fields
//! 2. Verify the post-update login/password pair with the identity
//!    provider when the call supplied a credential and the pair is
//!    complete
//! 3. Commit only the fields this call changes, then hand the verified
//!    pair to the course synchronizer
//!
//! A rejected verification persists nothing: the stored record keeps
//! its pre-call values, including any previously verified pair.

use std::sync::Arc;
use std::sync::LazyLock;

use regex::Regex;

use crate::db::MemoryDb;
use crate::error::{LockboxError, MissingResource, Result};
use crate::models::{AccountUpdate, User};
use crate::services::courses::CourseSynchronizer;
use crate::services::identity::{IdentityError, IdentityProvider};
use crate::services::vault::CredentialVault;
use crate::services::{random_hex_id, token_prefix};

/// Account tokens are 64 hex chars.
const TOKEN_BYTES: usize = 32;

/// Provider logins are decimal student numbers.
static LOGIN_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]+$").unwrap());

/// Token-keyed CRUD over protected account records.
#[derive(Clone)]
pub struct AccountStore {
    db: MemoryDb,
    vault: CredentialVault,
    provider: Arc<dyn IdentityProvider>,
    synchronizer: CourseSynchronizer,
}

impl AccountStore {
    pub fn new(
        db: MemoryDb,
        vault: CredentialVault,
        provider: Arc<dyn IdentityProvider>,
        synchronizer: CourseSynchronizer,
    ) -> Self {
        Self {
            db,
            vault,
            provider,
            synchronizer,
        }
    }

    /// Create a blank account and return its bearer token.
    pub fn create(&self) -> Result<String> {
        let token = random_hex_id(TOKEN_BYTES)?;
        self.db.insert_account(User::new(token.clone()));
        tracing::info!(token_prefix = token_prefix(&token), "Account created");
        Ok(token)
    }

    /// Apply a partial update, verifying credentials when they change.
    pub async fn modify(&self, token: &str, update: AccountUpdate) -> Result<()> {
        // 1. The record must exist before field validation is reported;
        //    nothing persists until verification (when owed) has passed
        let current = self
            .db
            .get_account(token)
            .ok_or(LockboxError::NotFound(MissingResource::Account))?;

        if let Some(login) = update.login.as_deref() {
            if !LOGIN_PATTERN.is_match(login) {
                return Err(LockboxError::InvalidField(
                    "login must be decimal digits".to_string(),
                ));
            }
        }

        let supplied_credentials = update.touches_credentials();

        let password_ciphertext = match update.password.as_deref() {
            Some(password) => Some(self.vault.encrypt(password).map_err(|e| {
                LockboxError::Internal(anyhow::anyhow!("credential encryption failed: {}", e))
            })?),
            None => None,
        };

        // 2. A supplied credential completing the post-update pair means
        //    the pair must verify before anything lands
        let verified = if supplied_credentials {
            let login = update.login.as_ref().or(current.login.as_ref());

            // Plaintext for the provider: the supplied password, or the
            // stored one when only the login changed
            let password = match (&update.password, &current.password) {
                (Some(plaintext), _) => Some(plaintext.clone()),
                (None, Some(ciphertext)) => {
                    Some(self.vault.decrypt(ciphertext).map_err(|e| {
                        LockboxError::Internal(anyhow::anyhow!(
                            "stored credential unreadable: {}",
                            e
                        ))
                    })?)
                }
                (None, None) => None,
            };

            match (login, password) {
                (Some(login), Some(password)) => {
                    let info =
                        self.provider
                            .login(login, &password)
                            .await
                            .map_err(|e| match e {
                                IdentityError::Auth { status } => {
                                    tracing::info!(
                                        token_prefix = token_prefix(token),
                                        status,
                                        "Credential verification rejected"
                                    );
                                    LockboxError::InvalidCredentials
                                }
                                IdentityError::Transport(message) => {
                                    LockboxError::Upstream(message)
                                }
                            })?;
                    Some((login.clone(), password, info.email))
                }
                _ => None,
            }
        } else {
            None
        };

        let (sync_pair, verified_email) = match verified {
            Some((login, password, email)) => (Some((login, password)), Some(email)),
            None => (None, None),
        };

        // 3. Commit only the fields this call changes. Replacing the
        //    whole record would revert targeted writes that landed while
        //    verification was in flight, such as an error entry deleted
        //    mid-call or a course list committed by a finishing sync.
        //    Commit-then-spawn: the sync task only ever sees persisted
        //    state.
        let committed = self.db.update_account(token, |user| {
            if let Some(login) = update.login {
                user.login = Some(login);
            }
            if let Some(ciphertext) = password_ciphertext {
                user.password = Some(ciphertext);
            }
            if let Some(active) = update.active {
                user.active = active;
            }
            if let Some(email) = verified_email {
                user.email = Some(email);
                user.courses = None; // population restarts from scratch
            }
        });
        if !committed {
            return Err(LockboxError::NotFound(MissingResource::Account));
        }

        if let Some((login, password)) = sync_pair {
            tracing::info!(
                token_prefix = token_prefix(token),
                "Credentials verified; course synchronization queued"
            );
            self.synchronizer
                .spawn_sync(token.to_string(), login, password);
        }

        Ok(())
    }

    /// Fetch a snapshot of an account.
    pub fn get(&self, token: &str) -> Result<User> {
        self.db
            .get_account(token)
            .ok_or(LockboxError::NotFound(MissingResource::Account))
    }

    /// Delete an account. Terminal: in-flight background tasks find the
    /// record gone and drop their results.
    pub fn delete(&self, token: &str) -> Result<()> {
        if self.db.delete_account(token) {
            tracing::info!(token_prefix = token_prefix(token), "Account deleted");
            Ok(())
        } else {
            Err(LockboxError::NotFound(MissingResource::Account))
        }
    }

    /// Remove one entry from the account's failure log.
    pub fn delete_error(&self, token: &str, error_id: &str) -> Result<()> {
        let mut removed = false;
        let found = self.db.update_account(token, |user| {
            removed = user.remove_failure(error_id);
        });

        if !found {
            return Err(LockboxError::NotFound(MissingResource::Account));
        }
        if !removed {
            return Err(LockboxError::NotFound(MissingResource::ErrorEntry));
        }
        Ok(())
    }

    /// Re-run course population from the stored credentials.
    pub async fn refresh_courses(&self, token: &str) -> Result<()> {
        // 1. Stored credentials are a precondition
        let user = self
            .db
            .get_account(token)
            .ok_or(LockboxError::NotFound(MissingResource::Account))?;
        let (login, ciphertext) = match (&user.login, &user.password) {
            (Some(login), Some(ciphertext)) => (login.clone(), ciphertext.clone()),
            _ => {
                return Err(LockboxError::StateConflict(
                    "account has no stored credentials".to_string(),
                ))
            }
        };

        // 2. Decrypt before resetting anything; a key mismatch is an
        //    operational fault the caller cannot fix
        let password = self.vault.decrypt(&ciphertext).map_err(|e| {
            LockboxError::Internal(anyhow::anyhow!("stored credential unreadable: {}", e))
        })?;

        // 3. Reset to pending, commit, then spawn
        let committed = self.db.update_account(token, |user| user.courses = None);
        if !committed {
            return Err(LockboxError::NotFound(MissingResource::Account));
        }

        tracing::info!(
            token_prefix = token_prefix(token),
            "Course refresh queued"
        );
        self.synchronizer
            .spawn_sync(token.to_string(), login, password);
        Ok(())
    }
}
