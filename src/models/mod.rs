// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the store.

pub mod course;
pub mod geometry;
pub mod user;

pub use course::Course;
pub use geometry::{CachedGeometry, FieldKind, GeometryField, GeometryResult};
pub use user::{AccountUpdate, FailureEntry, FailureKind, User, MAX_FAILURE_ENTRIES};
