// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Course synchronization service.
//!
//! Runs off the request path after credentials verify:
//! 1. Fetch the account's full timetable from the identity provider
//! 2. Merge each observation into the shared course catalog
//! 3. Commit the account's course list once at the end
//!
//! All-or-nothing: nothing is written until the fetch succeeds, so a
//! provider failure leaves `courses` at the pending sentinel instead of
//! a truncated list. Failures land on the account's error log, never on
//! whoever triggered the sync.

use std::sync::Arc;

use crate::db::MemoryDb;
use crate::models::{FailureEntry, FailureKind};
use crate::services::identity::{IdentityError, IdentityProvider};
use crate::services::{random_hex_id, token_prefix};

/// Failure entry ids are 24 hex chars.
const FAILURE_ID_BYTES: usize = 12;

/// Background timetable reconciliation.
#[derive(Clone)]
pub struct CourseSynchronizer {
    db: MemoryDb,
    provider: Arc<dyn IdentityProvider>,
}

impl CourseSynchronizer {
    pub fn new(db: MemoryDb, provider: Arc<dyn IdentityProvider>) -> Self {
        Self { db, provider }
    }

    /// Launch a fire-and-forget synchronization for one account.
    ///
    /// The caller has already committed the record with `courses` reset
    /// to pending; nothing here reports back to it.
    pub fn spawn_sync(&self, token: String, login: String, password: String) {
        let sync = self.clone();
        tokio::spawn(async move {
            if let Err(e) = sync.sync_account(&token, &login, &password).await {
                tracing::warn!(
                    token_prefix = token_prefix(&token),
                    error = %e,
                    "Course synchronization failed"
                );
                sync.record_failure(&token, &e);
            }
        });
    }

    /// Reconcile one account's timetable into the store.
    pub async fn sync_account(
        &self,
        token: &str,
        login: &str,
        password: &str,
    ) -> Result<(), IdentityError> {
        // 1. Fetch the full timetable before touching any record
        let observations = self
            .provider
            .fetch_timetable(login, password, true)
            .await?;

        // 2. Merge observations into the shared catalog, collecting the
        //    account's course list in timetable order
        let mut course_codes: Vec<String> = Vec::new();
        for obs in &observations {
            self.db.upsert_course(&obs.course_code, |course| {
                course.observe(&obs.teacher_name, &obs.slot_token());
            });
            if !course_codes.contains(&obs.course_code) {
                course_codes.push(obs.course_code.clone());
            }
        }

        // 3. Commit the account's list once. An account deleted
        //    mid-flight stays deleted; the shared catalog keeps what it
        //    learned either way.
        let count = course_codes.len();
        let committed = self
            .db
            .update_account(token, |user| user.courses = Some(course_codes));

        if committed {
            tracing::info!(
                token_prefix = token_prefix(token),
                courses = count,
                "Courses synchronized"
            );
        } else {
            tracing::debug!(
                token_prefix = token_prefix(token),
                "Account deleted during synchronization; dropping result"
            );
        }

        Ok(())
    }

    /// Append a failure entry to the account's bounded error log.
    fn record_failure(&self, token: &str, error: &IdentityError) {
        let id = match random_hex_id(FAILURE_ID_BYTES) {
            Ok(id) => id,
            Err(e) => {
                tracing::error!(error = %e, "Could not mint a failure entry id");
                return;
            }
        };

        let kind = match error {
            IdentityError::Auth { .. } => FailureKind::BadUserInfo,
            IdentityError::Transport(_) => FailureKind::IdentityProvider,
        };
        let entry = FailureEntry {
            id,
            time_logged: chrono::Utc::now().to_rfc3339(),
            kind,
            message: error.to_string(),
        };

        // The account may be gone by now; nothing to record onto then
        self.db
            .update_account(token, |user| user.record_failure(entry));
    }
}
