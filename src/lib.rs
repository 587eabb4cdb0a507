// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Lockbox: credential vault plus asynchronous derived-data caches.
//!
//! Holds third-party account credentials encrypted at rest, verifies
//! them against the identity provider on change, and drives two
//! background pipelines off the verified pair: enrolled-course
//! population and form-geometry resolution. The HTTP layer lives
//! outside this crate and embeds [`LockboxStore`].

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod store;

pub use config::{Config, ConfigError, KeySource};
pub use error::{LockboxError, MissingResource, Result};
pub use store::LockboxStore;
