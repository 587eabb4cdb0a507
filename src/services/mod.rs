// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod accounts;
pub mod courses;
pub mod extractor;
pub mod geometry;
pub mod identity;
pub mod vault;

pub use accounts::AccountStore;
pub use courses::CourseSynchronizer;
pub use extractor::{ExtractedForm, ExtractorError, FormCredentials, GeometryExtractor};
pub use geometry::GeometryCache;
pub use identity::{CourseObservation, IdentityError, IdentityProvider, UserInfo};
pub use vault::{CredentialVault, VaultError};

use ring::rand::{SecureRandom, SystemRandom};

use crate::error::{LockboxError, Result};

/// Mint a random lowercase-hex identifier of `n_bytes * 2` characters.
pub(crate) fn random_hex_id(n_bytes: usize) -> Result<String> {
    let rng = SystemRandom::new();
    let mut bytes = vec![0u8; n_bytes];
    rng.fill(&mut bytes)
        .map_err(|_| LockboxError::Internal(anyhow::anyhow!("system CSPRNG unavailable")))?;
    Ok(hex::encode(bytes))
}

/// Leading characters of a token, safe to put in logs.
pub(crate) fn token_prefix(token: &str) -> &str {
    token.get(..8).unwrap_or(token)
}
