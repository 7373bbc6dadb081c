//! # Temporal Types
//!
//! Unix timestamps with second precision. The escrow compares timestamps
//! and adds durations to them; it never reads the clock itself. Hosts pass
//! the current time into each operation, optionally sourced from
//! [`UnixTimestamp::now`].
//!
//! All arithmetic is checked: an unlock time near `i64::MAX` plus a grace
//! period must not wrap around into the past.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Seconds since the Unix epoch (UTC).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UnixTimestamp(i64);

impl UnixTimestamp {
    /// Create a timestamp from seconds since the epoch.
    pub const fn from_secs(secs: i64) -> Self {
        Self(secs)
    }

    /// The current wall-clock time, truncated to seconds.
    pub fn now() -> Self {
        Self(Utc::now().timestamp())
    }

    /// Seconds since the epoch.
    pub const fn as_secs(&self) -> i64 {
        self.0
    }

    /// Add a number of seconds, returning `None` on overflow.
    pub fn checked_add_secs(&self, secs: i64) -> Option<Self> {
        self.0.checked_add(secs).map(Self)
    }

    /// Add a number of seconds, clamping at the representable bounds.
    pub fn saturating_add_secs(&self, secs: i64) -> Self {
        Self(self.0.saturating_add(secs))
    }

    /// Seconds from `earlier` to `self`, returning `None` on overflow.
    pub fn checked_secs_since(&self, earlier: UnixTimestamp) -> Option<i64> {
        self.0.checked_sub(earlier.0)
    }

    /// Convert to a `chrono` datetime.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::TimestampOutOfRange`] for values chrono
    /// cannot represent.
    pub fn to_datetime(&self) -> Result<DateTime<Utc>, ValidationError> {
        DateTime::<Utc>::from_timestamp(self.0, 0)
            .ok_or(ValidationError::TimestampOutOfRange(self.0))
    }

    /// ISO 8601 rendering with `Z` suffix, or the raw seconds when the
    /// value is outside chrono's range.
    pub fn to_rfc3339(&self) -> String {
        match self.to_datetime() {
            Ok(dt) => dt.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            Err(_) => self.0.to_string(),
        }
    }
}

impl std::fmt::Display for UnixTimestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<DateTime<Utc>> for UnixTimestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt.timestamp())
    }
}

impl From<i64> for UnixTimestamp {
    fn from(secs: i64) -> Self {
        Self(secs)
    }
}
