// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Cached form-geometry entry and its caller-facing read model.

use serde::{Deserialize, Serialize};

/// Field kinds a resolved form can contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldKind {
    Text,
    LongText,
    Date,
    MultipleChoice,
    Checkbox,
    Dropdown,
}

/// One fillable field of a resolved form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometryField {
    /// Position of the field on the form
    pub index: u32,
    /// Field title as rendered
    pub title: String,
    /// Field kind
    pub kind: FieldKind,
}

/// Cache entry for one form URL.
///
/// Lifecycle: created pending (neither `geometry` nor `response_status`
/// set), resolved to exactly one of ready (`geometry` set) or failed
/// (`response_status` and `error` set), evicted after the TTL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedGeometry {
    /// Form URL (document key)
    pub url: String,
    /// Token of the account whose request created the entry
    pub requested_by: String,
    /// Resolved fields, present once ready
    pub geometry: Option<Vec<GeometryField>>,
    /// Whether the form demanded provider sign-in
    pub auth_required: Option<bool>,
    /// Failure status (403 extractor auth, 400 unusable form)
    pub response_status: Option<u16>,
    /// Failure detail
    pub error: Option<String>,
}

impl CachedGeometry {
    /// Entry as first inserted, before resolution lands.
    pub fn pending(url: &str, requested_by: &str) -> Self {
        Self {
            url: url.to_string(),
            requested_by: requested_by.to_string(),
            geometry: None,
            auth_required: None,
            response_status: None,
            error: None,
        }
    }

    /// Whether resolution has not landed yet.
    pub fn is_pending(&self) -> bool {
        self.geometry.is_none() && self.response_status.is_none()
    }

    /// Snapshot this entry into the caller-facing read model.
    pub fn to_result(&self) -> GeometryResult {
        if let Some(status) = self.response_status {
            return GeometryResult::Failed {
                geometry: self.geometry.clone(),
                auth_required: self.auth_required,
                error: self.error.clone().unwrap_or_default(),
                response_status: status,
            };
        }
        match &self.geometry {
            Some(fields) => GeometryResult::Ready {
                geometry: fields.clone(),
                auth_required: self.auth_required,
            },
            None => GeometryResult::Pending,
        }
    }
}

/// What `resolve_geometry` reports back to the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum GeometryResult {
    /// Resolution in flight; ask again later
    Pending,
    /// Resolution finished successfully
    Ready {
        geometry: Vec<GeometryField>,
        auth_required: Option<bool>,
    },
    /// Resolution failed; the entry stays until eviction
    Failed {
        geometry: Option<Vec<GeometryField>>,
        auth_required: Option<bool>,
        error: String,
        response_status: u16,
    },
}
