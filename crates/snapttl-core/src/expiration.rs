//! Expiration arithmetic: creation time plus a configured time-to-live.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::CoreError;

/// Snapshot time-to-live in whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ttl(u64);

impl Ttl {
    pub const fn from_secs(secs: u64) -> Self {
        Self(secs)
    }

    pub const fn as_secs(self) -> u64 {
        self.0
    }
}

impl FromStr for Ttl {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|e| CoreError::InvalidTtl {
                value: s.to_string(),
                reason: e.to_string(),
            })
    }
}

impl fmt::Display for Ttl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

/// Expiration fixed once per invocation. The timestamp never changes after construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpirationPolicy {
    ttl: Ttl,
    created_at: DateTime<Utc>,
    expiration_timestamp: i64,
}

impl ExpirationPolicy {
    /// Read the wall clock once and expire `ttl` later.
    pub fn starting_now(ttl: Ttl) -> Result<Self, CoreError> {
        Self::starting_at(Utc::now(), ttl)
    }

    pub fn starting_at(created_at: DateTime<Utc>, ttl: Ttl) -> Result<Self, CoreError> {
        let overflow = || CoreError::ExpirationOverflow {
            created_at: created_at.timestamp(),
            ttl_seconds: ttl.as_secs(),
        };
        let ttl_secs = i64::try_from(ttl.as_secs()).map_err(|_| overflow())?;
        let expiration_timestamp = created_at
            .timestamp()
            .checked_add(ttl_secs)
            .ok_or_else(overflow)?;

        Ok(Self {
            ttl,
            created_at,
            expiration_timestamp,
        })
    }

    pub fn ttl(&self) -> Ttl {
        self.ttl
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Unix seconds after which the snapshot may be swept.
    pub fn expiration_timestamp(&self) -> i64 {
        self.expiration_timestamp
    }
}
