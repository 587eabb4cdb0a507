// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Form-geometry cache.
//!
//! Entry lifecycle per URL: absent, pending, ready or failed, evicted
//! after a TTL. Handles the workflow:
//! 1. Requester checks (account, credentials, URL shape, rate limit)
//! 2. Exactly-once pending-entry creation per URL
//! 3. Extraction on a blocking worker, result committed to the entry
//! 4. Deferred eviction a fixed TTL after resolution lands
//!
//! Extraction failures are recorded on the entry and surfaced through
//! later reads; the requester that triggered resolution only ever gets
//! the pending indicator back.

use std::sync::Arc;
use std::time::Duration;

use validator::ValidateUrl;

use crate::db::MemoryDb;
use crate::error::{LockboxError, MissingResource, Result};
use crate::models::{CachedGeometry, GeometryResult};
use crate::services::extractor::{ExtractorError, FormCredentials, GeometryExtractor};
use crate::services::token_prefix;
use crate::services::vault::CredentialVault;

/// How long a resolved entry stays cached before eviction.
pub const DEFAULT_TTL: Duration = Duration::from_secs(15 * 60);

/// Outstanding-entry allowance for ordinary requesters.
const BASE_ENTRY_LIMIT: usize = 1;
/// Outstanding-entry allowance for privileged requesters.
const PRIVILEGED_ENTRY_LIMIT: usize = 5;

/// URL-keyed cache of resolved form geometry.
#[derive(Clone)]
pub struct GeometryCache {
    db: MemoryDb,
    vault: CredentialVault,
    extractor: Arc<dyn GeometryExtractor>,
    ttl: Duration,
}

impl GeometryCache {
    pub fn new(
        db: MemoryDb,
        vault: CredentialVault,
        extractor: Arc<dyn GeometryExtractor>,
    ) -> Self {
        Self::with_ttl(db, vault, extractor, DEFAULT_TTL)
    }

    /// Same cache with a custom eviction TTL.
    pub fn with_ttl(
        db: MemoryDb,
        vault: CredentialVault,
        extractor: Arc<dyn GeometryExtractor>,
        ttl: Duration,
    ) -> Self {
        Self {
            db,
            vault,
            extractor,
            ttl,
        }
    }

    /// Look up or start resolution of a form URL for a requester.
    pub async fn resolve(
        &self,
        url: &str,
        requester_token: &str,
        requester_is_admin: bool,
    ) -> Result<GeometryResult> {
        // 1. The requester must exist and hold verified credentials
        let user = self
            .db
            .get_account(requester_token)
            .ok_or(LockboxError::NotFound(MissingResource::Account))?;
        let (login, password_ciphertext) = match (&user.login, &user.password) {
            (Some(login), Some(password)) => (login.clone(), password.clone()),
            _ => {
                return Err(LockboxError::StateConflict(
                    "account has no stored credentials".to_string(),
                ))
            }
        };

        // 2. Decrypt up front; a key mismatch is an operational fault,
        //    never the caller's
        let password = self.vault.decrypt(&password_ciphertext).map_err(|e| {
            LockboxError::Internal(anyhow::anyhow!("credential decryption failed: {}", e))
        })?;

        // 3. The URL has to look like one before it takes a cache slot
        if !url.validate_url() {
            return Err(LockboxError::InvalidField(format!(
                "not a valid form URL: {}",
                url
            )));
        }

        // 4. Serve whatever state the entry is already in
        if let Some(entry) = self.db.get_geometry(url) {
            return Ok(entry.to_result());
        }

        // 5. Per-requester allowance, checked before creating the entry.
        //    Best-effort: racing calls may slip one extra entry through.
        let limit = if requester_is_admin {
            PRIVILEGED_ENTRY_LIMIT
        } else {
            BASE_ENTRY_LIMIT
        };
        if self.db.count_geometry_requested_by(requester_token) >= limit {
            return Err(LockboxError::RateLimitExceeded);
        }

        // 6. Exactly one caller creates the pending entry; losing the
        //    race means another requester's resolution is in flight and
        //    pending is still the right answer
        let created = self
            .db
            .insert_geometry_if_absent(CachedGeometry::pending(url, requester_token));
        if created {
            tracing::info!(
                url = %url,
                token_prefix = token_prefix(requester_token),
                "Form geometry resolution started"
            );
            self.spawn_resolution(
                url.to_string(),
                FormCredentials {
                    email: user.email.clone(),
                    login,
                    password,
                },
            );
        }

        Ok(GeometryResult::Pending)
    }

    /// Run extraction on a blocking worker and commit the outcome.
    fn spawn_resolution(&self, url: String, credentials: FormCredentials) {
        let cache = self.clone();
        tokio::spawn(async move {
            let extractor = cache.extractor.clone();
            let target = url.clone();
            let outcome =
                tokio::task::spawn_blocking(move || extractor.resolve(&target, &credentials))
                    .await;

            let committed = match outcome {
                Ok(Ok(form)) => {
                    tracing::info!(
                        url = %url,
                        fields = form.fields.len(),
                        "Form geometry resolved"
                    );
                    cache.db.update_geometry(&url, |entry| {
                        entry.geometry = Some(form.fields);
                        entry.auth_required = Some(form.auth_required);
                    })
                }
                Ok(Err(e)) => {
                    let status = match &e {
                        ExtractorError::AuthFailed(_) => 403,
                        ExtractorError::InvalidForm(_) => 400,
                    };
                    tracing::warn!(
                        url = %url,
                        status,
                        error = %e,
                        "Form geometry resolution failed"
                    );
                    cache.db.update_geometry(&url, |entry| {
                        entry.response_status = Some(status);
                        entry.error = Some(e.to_string());
                    })
                }
                Err(join_error) => {
                    // A panicking extractor must not leave the entry
                    // pending forever; record it and let the TTL clear it
                    tracing::error!(
                        url = %url,
                        error = %join_error,
                        "Geometry extraction worker failed"
                    );
                    cache.db.update_geometry(&url, |entry| {
                        entry.response_status = Some(500);
                        entry.error = Some("extraction worker failed".to_string());
                    })
                }
            };

            // Entry already gone means someone deleted it manually and
            // there is nothing left to evict
            if committed {
                cache.schedule_eviction(url);
            }
        });
    }

    /// Schedule unconditional eviction once the TTL elapses.
    ///
    /// Deletion is idempotent, so a timer firing after a manual delete
    /// is a no-op.
    fn schedule_eviction(&self, url: String) {
        let db = self.db.clone();
        let ttl = self.ttl;
        tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            if db.delete_geometry(&url) {
                tracing::debug!(url = %url, "Cached form geometry evicted");
            }
        });
    }
}
