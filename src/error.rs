// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

/// Failures surfaced by the settlement core and the store behind it.
///
/// Consistency problems found in a settlement are not errors: they are
/// reported through [`crate::validator::ValidationResult`].
#[derive(Error, Debug)]
pub enum HaulError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[from] rusqlite::Error),

    #[error("Session expired for operator '{0}'")]
    SessionExpired(String),

    #[error("Corrupt stored value: {0}")]
    Corrupt(String),
}

pub type Result<T> = std::result::Result<T, HaulError>;

impl HaulError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        HaulError::InvalidInput(msg.into())
    }

    pub fn not_found(entity: &'static str, id: i64) -> Self {
        HaulError::NotFound { entity, id }
    }
}
