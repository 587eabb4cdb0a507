// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Store facade composing the vault, record store, and caches.
//!
//! The embedding API layer holds one `LockboxStore` and calls these
//! operations; everything else in the crate hangs off it.

use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::db::MemoryDb;
use crate::error::Result;
use crate::models::{AccountUpdate, GeometryResult, User};
use crate::services::extractor::GeometryExtractor;
use crate::services::geometry;
use crate::services::identity::IdentityProvider;
use crate::services::vault::{CredentialVault, VaultError};
use crate::services::{AccountStore, CourseSynchronizer, GeometryCache};

/// Shared store state. Cheap to clone; clones share everything.
#[derive(Clone)]
pub struct LockboxStore {
    pub db: MemoryDb,
    pub accounts: AccountStore,
    pub geometry: GeometryCache,
}

impl LockboxStore {
    /// Wire up a store from configuration and collaborators.
    ///
    /// The only failure is unusable key material, which is
    /// startup-fatal; nothing else is allowed to half-construct.
    pub fn new(
        config: &Config,
        provider: Arc<dyn IdentityProvider>,
        extractor: Arc<dyn GeometryExtractor>,
    ) -> std::result::Result<Self, VaultError> {
        Self::with_geometry_ttl(config, provider, extractor, geometry::DEFAULT_TTL)
    }

    /// Same store with a custom geometry-eviction TTL.
    pub fn with_geometry_ttl(
        config: &Config,
        provider: Arc<dyn IdentityProvider>,
        extractor: Arc<dyn GeometryExtractor>,
        geometry_ttl: Duration,
    ) -> std::result::Result<Self, VaultError> {
        let vault = CredentialVault::new(&config.key_source)?;
        let db = MemoryDb::new();

        let synchronizer = CourseSynchronizer::new(db.clone(), provider.clone());
        let accounts = AccountStore::new(db.clone(), vault.clone(), provider, synchronizer);
        let geometry = GeometryCache::with_ttl(db.clone(), vault, extractor, geometry_ttl);

        Ok(Self {
            db,
            accounts,
            geometry,
        })
    }

    // ─── Account Operations ──────────────────────────────────────

    /// Create a blank account and return its bearer token.
    pub fn create_account(&self) -> Result<String> {
        self.accounts.create()
    }

    /// Apply a partial update, verifying credentials when they change.
    pub async fn modify_account(&self, token: &str, update: AccountUpdate) -> Result<()> {
        self.accounts.modify(token, update).await
    }

    /// Fetch a snapshot of an account.
    pub fn get_account(&self, token: &str) -> Result<User> {
        self.accounts.get(token)
    }

    /// Delete an account, terminally.
    pub fn delete_account(&self, token: &str) -> Result<()> {
        self.accounts.delete(token)
    }

    /// Remove one entry from an account's failure log.
    pub fn delete_account_error(&self, token: &str, error_id: &str) -> Result<()> {
        self.accounts.delete_error(token, error_id)
    }

    /// Re-run course population from the stored credentials.
    pub async fn refresh_courses(&self, token: &str) -> Result<()> {
        self.accounts.refresh_courses(token).await
    }

    // ─── Geometry Operations ─────────────────────────────────────

    /// Look up or start resolution of a form URL for a requester.
    pub async fn resolve_geometry(
        &self,
        url: &str,
        requester_token: &str,
        requester_is_admin: bool,
    ) -> Result<GeometryResult> {
        self.geometry
            .resolve(url, requester_token, requester_is_admin)
            .await
    }
}
