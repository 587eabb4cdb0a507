// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared fixtures: scriptable collaborator mocks and store factories.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use lockbox::config::Config;
use lockbox::models::{FieldKind, GeometryField};
use lockbox::services::{
    CourseObservation, ExtractedForm, ExtractorError, FormCredentials, GeometryExtractor,
    IdentityError, IdentityProvider, UserInfo,
};
use lockbox::LockboxStore;

/// What a scripted collaborator call should do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(dead_code)]
pub enum Script {
    Accept,
    Reject,
    Unreachable,
}

/// Scriptable identity provider.
///
/// Flip the scripts mid-test to change behavior; the counters say how
/// often each call actually ran.
pub struct MockProvider {
    pub email: String,
    pub login_script: Mutex<Script>,
    pub timetable_script: Mutex<Script>,
    pub observations: Mutex<Vec<CourseObservation>>,
    pub login_delay: Mutex<Option<Duration>>,
    pub timetable_delay: Mutex<Option<Duration>>,
    pub login_calls: AtomicUsize,
    pub timetable_calls: AtomicUsize,
}

#[allow(dead_code)]
impl MockProvider {
    pub fn accepting(email: &str, observations: Vec<CourseObservation>) -> Arc<Self> {
        Arc::new(Self {
            email: email.to_string(),
            login_script: Mutex::new(Script::Accept),
            timetable_script: Mutex::new(Script::Accept),
            observations: Mutex::new(observations),
            login_delay: Mutex::new(None),
            timetable_delay: Mutex::new(None),
            login_calls: AtomicUsize::new(0),
            timetable_calls: AtomicUsize::new(0),
        })
    }

    pub fn rejecting() -> Arc<Self> {
        let provider = Self::accepting("unused@example.com", Vec::new());
        *provider.login_script.lock().unwrap() = Script::Reject;
        *provider.timetable_script.lock().unwrap() = Script::Reject;
        provider
    }

    pub fn set_login_script(&self, script: Script) {
        *self.login_script.lock().unwrap() = script;
    }

    pub fn set_timetable_script(&self, script: Script) {
        *self.timetable_script.lock().unwrap() = script;
    }

    pub fn set_observations(&self, observations: Vec<CourseObservation>) {
        *self.observations.lock().unwrap() = observations;
    }

    pub fn set_login_delay(&self, delay: Duration) {
        *self.login_delay.lock().unwrap() = Some(delay);
    }

    pub fn set_timetable_delay(&self, delay: Duration) {
        *self.timetable_delay.lock().unwrap() = Some(delay);
    }
}

#[async_trait]
impl IdentityProvider for MockProvider {
    async fn login(&self, _login: &str, _password: &str) -> Result<UserInfo, IdentityError> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.login_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let script = *self.login_script.lock().unwrap();
        match script {
            Script::Accept => Ok(UserInfo {
                email: self.email.clone(),
            }),
            Script::Reject => Err(IdentityError::Auth { status: 401 }),
            Script::Unreachable => Err(IdentityError::Transport("connection refused".to_string())),
        }
    }

    async fn fetch_timetable(
        &self,
        _login: &str,
        _password: &str,
        _include_all_slots: bool,
    ) -> Result<Vec<CourseObservation>, IdentityError> {
        self.timetable_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.timetable_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let script = *self.timetable_script.lock().unwrap();
        match script {
            Script::Accept => Ok(self.observations.lock().unwrap().clone()),
            Script::Reject => Err(IdentityError::Auth { status: 401 }),
            Script::Unreachable => Err(IdentityError::Transport("connection refused".to_string())),
        }
    }
}

/// Scriptable geometry extractor. Runs on a blocking worker, so the
/// optional delay is a real thread sleep.
pub struct MockExtractor {
    pub script: Mutex<Script>,
    pub fields: Vec<GeometryField>,
    pub auth_required: bool,
    pub delay: Option<Duration>,
    pub calls: AtomicUsize,
}

#[allow(dead_code)]
impl MockExtractor {
    pub fn succeeding(fields: Vec<GeometryField>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(Script::Accept),
            fields,
            auth_required: false,
            delay: None,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn succeeding_after(fields: Vec<GeometryField>, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(Script::Accept),
            fields,
            auth_required: false,
            delay: Some(delay),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing(script: Script) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script),
            fields: Vec::new(),
            auth_required: false,
            delay: None,
            calls: AtomicUsize::new(0),
        })
    }
}

impl GeometryExtractor for MockExtractor {
    fn resolve(
        &self,
        _url: &str,
        _credentials: &FormCredentials,
    ) -> Result<ExtractedForm, ExtractorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        let script = *self.script.lock().unwrap();
        match script {
            Script::Accept => Ok(ExtractedForm {
                auth_required: self.auth_required,
                fields: self.fields.clone(),
            }),
            Script::Reject => Err(ExtractorError::AuthFailed("sign-in rejected".to_string())),
            Script::Unreachable => Err(ExtractorError::InvalidForm("no form here".to_string())),
        }
    }
}

/// Store wired to the given mocks, test-default key material.
#[allow(dead_code)]
pub fn test_store(provider: Arc<MockProvider>, extractor: Arc<MockExtractor>) -> LockboxStore {
    test_store_with_ttl(provider, extractor, Duration::from_secs(300))
}

/// Store with a short geometry TTL for eviction tests.
#[allow(dead_code)]
pub fn test_store_with_ttl(
    provider: Arc<MockProvider>,
    extractor: Arc<MockExtractor>,
    geometry_ttl: Duration,
) -> LockboxStore {
    let config = Config::default();
    LockboxStore::with_geometry_ttl(&config, provider, extractor, geometry_ttl)
        .expect("test store should construct")
}

/// Poll until `check` passes or the timeout elapses.
#[allow(dead_code)]
pub async fn wait_for<F: Fn() -> bool>(check: F, timeout: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}

/// Timetable observation shorthand.
#[allow(dead_code)]
pub fn obs(code: &str, teacher: &str, day: &str, period: &str) -> CourseObservation {
    CourseObservation {
        course_code: code.to_string(),
        teacher_name: teacher.to_string(),
        cycle_day: day.to_string(),
        period: period.to_string(),
    }
}

/// Text form field shorthand.
#[allow(dead_code)]
pub fn text_field(index: u32, title: &str) -> GeometryField {
    GeometryField {
        index,
        title: title.to_string(),
        kind: FieldKind::Text,
    }
}
