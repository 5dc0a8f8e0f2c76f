// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{Duration, NaiveDateTime};

use crate::error::{HaulError, Result};

/// Operator session, created at login and handed to every command that writes.
#[derive(Debug, Clone)]
pub struct Session {
    operator: String,
    started_at: NaiveDateTime,
    expires_at: NaiveDateTime,
    active: bool,
}

impl Session {
    pub fn login(operator: &str, ttl: Duration, now: NaiveDateTime) -> Result<Self> {
        let operator = operator.trim();
        if operator.is_empty() {
            return Err(HaulError::invalid("Operator name is required"));
        }
        if ttl <= Duration::zero() {
            return Err(HaulError::invalid("Session lifetime must be positive"));
        }
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or_else(|| HaulError::invalid("Session lifetime is out of range"))?;
        tracing::debug!(operator, "session started");
        Ok(Self {
            operator: operator.to_string(),
            started_at: now,
            expires_at,
            active: true,
        })
    }

    pub fn operator(&self) -> &str {
        &self.operator
    }

    pub fn started_at(&self) -> NaiveDateTime {
        self.started_at
    }

    pub fn is_active(&self, now: NaiveDateTime) -> bool {
        self.active && now < self.expires_at
    }

    /// The operator name, if the session may still write.
    pub fn ensure_active(&self, now: NaiveDateTime) -> Result<&str> {
        if self.is_active(now) {
            Ok(&self.operator)
        } else {
            Err(HaulError::SessionExpired(self.operator.clone()))
        }
    }

    pub fn logout(&mut self) {
        if self.active {
            tracing::debug!(operator = %self.operator, "session ended");
        }
        self.active = false;
    }
}
