// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity-provider seam.
//!
//! The store never talks to the provider directly; it consumes an
//! [`IdentityProvider`] trait object for the two calls it needs:
//! credential verification and timetable fetch. The concrete client
//! lives outside this crate.

use async_trait::async_trait;

/// Provider-side identity of a verified account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserInfo {
    /// Email address on file with the provider
    pub email: String,
}

/// One timetable entry as the provider reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseObservation {
    /// Course code, e.g. "MATH1"
    pub course_code: String,
    /// Teacher name as listed; may be empty
    pub teacher_name: String,
    /// Cycle day the slot falls on, e.g. "Day1"
    pub cycle_day: String,
    /// Period within the day, e.g. "P1" or "P1a"
    pub period: String,
}

impl CourseObservation {
    /// Slot token stored on the shared course record.
    pub fn slot_token(&self) -> String {
        format!("{}-{}", self.cycle_day, self.period)
    }
}

/// Identity-provider failures, split by how the store reacts.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// The provider understood the request and said no.
    #[error("Provider rejected the credentials (status {status})")]
    Auth { status: u16 },

    /// The provider was unreachable or answered garbage; retryable.
    #[error("Provider request failed: {0}")]
    Transport(String),
}

/// External identity provider consumed at its interface boundary.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Verify a login/password pair.
    ///
    /// Success proves the pair and returns the provider-side identity;
    /// [`IdentityError::Auth`] means the pair is wrong, anything else is
    /// a transport fault.
    async fn login(&self, login: &str, password: &str) -> Result<UserInfo, IdentityError>;

    /// Fetch the enrolled timetable for a verified pair.
    ///
    /// `include_all_slots` asks for every scheduled slot of a course,
    /// not just the next occurrence.
    async fn fetch_timetable(
        &self,
        login: &str,
        password: &str,
        include_all_slots: bool,
    ) -> Result<Vec<CourseObservation>, IdentityError>;
}
