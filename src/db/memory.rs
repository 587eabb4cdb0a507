// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process concurrent document store.
//!
//! Provides typed operations for:
//! - Accounts (token-keyed protected records)
//! - Courses (shared catalog, keyed by course code)
//! - Geometry (form-URL-keyed cache entries)
//!
//! DashMap gives per-key atomic read-modify-write, which is the only
//! coordination background tasks rely on. Durability across process
//! restarts is intentionally not provided.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::models::{CachedGeometry, Course, User};

/// Concurrent document store shared by every service.
#[derive(Clone, Default)]
pub struct MemoryDb {
    accounts: Arc<DashMap<String, User>>,
    courses: Arc<DashMap<String, Course>>,
    geometry: Arc<DashMap<String, CachedGeometry>>,
}

impl MemoryDb {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // ─── Account Operations ──────────────────────────────────────

    /// Insert a fresh account record.
    pub fn insert_account(&self, user: User) {
        self.accounts.insert(user.token.clone(), user);
    }

    /// Fetch a snapshot of an account by token.
    pub fn get_account(&self, token: &str) -> Option<User> {
        self.accounts.get(token).map(|r| r.clone())
    }

    /// Atomically mutate an account in place.
    ///
    /// Returns `false` when the token matches no record, in which case
    /// `mutate` never ran. Never inserts: a deleted account stays
    /// deleted even if a background task commits late.
    ///
    /// `mutate` runs under the entry lock and must not call back into
    /// the store.
    pub fn update_account(&self, token: &str, mutate: impl FnOnce(&mut User)) -> bool {
        match self.accounts.get_mut(token) {
            Some(mut record) => {
                mutate(&mut record);
                true
            }
            None => false,
        }
    }

    /// Delete an account.
    ///
    /// Returns `false` if the token matched nothing.
    pub fn delete_account(&self, token: &str) -> bool {
        self.accounts.remove(token).is_some()
    }

    // ─── Course Operations ───────────────────────────────────────

    /// Atomically create-or-update the catalog entry for a course code.
    ///
    /// The closure runs under the entry lock, so concurrent
    /// observations of one course serialize instead of clobbering each
    /// other. `apply` must not call back into the store.
    pub fn upsert_course(&self, course_code: &str, apply: impl FnOnce(&mut Course)) {
        let mut entry = self
            .courses
            .entry(course_code.to_string())
            .or_insert_with(|| Course::new(course_code));
        apply(&mut entry);
    }

    /// Fetch a snapshot of a catalog entry.
    pub fn get_course(&self, course_code: &str) -> Option<Course> {
        self.courses.get(course_code).map(|r| r.clone())
    }

    // ─── Geometry Operations ─────────────────────────────────────

    /// Insert a pending entry unless the URL is already cached.
    ///
    /// Returns `true` when this call created the entry. Exactly one
    /// caller wins a concurrent race; the rest observe the existing
    /// entry.
    pub fn insert_geometry_if_absent(&self, entry: CachedGeometry) -> bool {
        match self.geometry.entry(entry.url.clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(entry);
                true
            }
        }
    }

    /// Fetch a snapshot of a cache entry.
    pub fn get_geometry(&self, url: &str) -> Option<CachedGeometry> {
        self.geometry.get(url).map(|r| r.clone())
    }

    /// Atomically mutate a cache entry in place.
    ///
    /// Returns `false` when the entry was already evicted; `mutate`
    /// never ran and nothing is re-created.
    pub fn update_geometry(&self, url: &str, mutate: impl FnOnce(&mut CachedGeometry)) -> bool {
        match self.geometry.get_mut(url) {
            Some(mut entry) => {
                mutate(&mut entry);
                true
            }
            None => false,
        }
    }

    /// Remove a cache entry.
    ///
    /// Removing an absent entry is a no-op, so eviction timers may fire
    /// unconditionally.
    pub fn delete_geometry(&self, url: &str) -> bool {
        self.geometry.remove(url).is_some()
    }

    /// Count cache entries attributed to one requester token.
    pub fn count_geometry_requested_by(&self, token: &str) -> usize {
        self.geometry
            .iter()
            .filter(|entry| entry.requested_by == token)
            .count()
    }
}
