//! # Escrow Policy
//!
//! The four escrow constants plus the host's per-record storage deposit.
//! Values are policy, not mechanism: they are bound once when the escrow
//! engine is constructed and never change for its lifetime.
//!
//! Defaults match the deployed program:
//!
//! | Constant | Default |
//! |----------|---------|
//! | `MIN_DEPOSIT` | 1 000 000 units |
//! | `MIN_LOCK` | 60 s |
//! | `MAX_LOCK` | 100 years |
//! | `CLOSE_GRACE` | 1 year |
//! | storage deposit | 890 880 units |

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Minimum user deposit in smallest units.
pub const MIN_DEPOSIT: u64 = 1_000_000;

/// Minimum lock duration in seconds.
pub const MIN_LOCK_SECS: i64 = 60;

/// Maximum lock duration in seconds (100 years of 365 days).
pub const MAX_LOCK_SECS: i64 = 100 * 365 * 24 * 60 * 60;

/// Time after unlock before anyone may close a record (365 days).
pub const CLOSE_GRACE_SECS: i64 = 365 * 24 * 60 * 60;

/// Value the host requires to keep one deposit record stored.
pub const STORAGE_DEPOSIT: u64 = 890_880;

/// Escrow policy bound at engine construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EscrowPolicy {
    /// Smallest depositable amount.
    pub min_deposit: u64,
    /// Shortest permitted lock, in seconds.
    pub min_lock_secs: i64,
    /// Longest permitted lock, in seconds.
    pub max_lock_secs: i64,
    /// Delay after unlock before a record may be closed by anyone.
    pub close_grace_secs: i64,
    /// Storage cost charged to the sender on top of the amount and
    /// rebated on close.
    pub storage_deposit: u64,
}

impl Default for EscrowPolicy {
    fn default() -> Self {
        Self {
            min_deposit: MIN_DEPOSIT,
            min_lock_secs: MIN_LOCK_SECS,
            max_lock_secs: MAX_LOCK_SECS,
            close_grace_secs: CLOSE_GRACE_SECS,
            storage_deposit: STORAGE_DEPOSIT,
        }
    }
}

impl EscrowPolicy {
    /// Load the policy from environment variables.
    ///
    /// Variables (each optional, falling back to the default):
    /// - `FUTURITY_MIN_DEPOSIT`
    /// - `FUTURITY_MIN_LOCK_SECS`
    /// - `FUTURITY_MAX_LOCK_SECS`
    /// - `FUTURITY_CLOSE_GRACE_SECS`
    /// - `FUTURITY_STORAGE_DEPOSIT`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnv`] for unparsable values and
    /// [`ConfigError::Inconsistent`] if the result fails [`validate`](Self::validate).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load the policy through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let policy = Self {
            min_deposit: env_value(&lookup, "FUTURITY_MIN_DEPOSIT", defaults.min_deposit)?,
            min_lock_secs: env_value(&lookup, "FUTURITY_MIN_LOCK_SECS", defaults.min_lock_secs)?,
            max_lock_secs: env_value(&lookup, "FUTURITY_MAX_LOCK_SECS", defaults.max_lock_secs)?,
            close_grace_secs: env_value(
                &lookup,
                "FUTURITY_CLOSE_GRACE_SECS",
                defaults.close_grace_secs,
            )?,
            storage_deposit: env_value(
                &lookup,
                "FUTURITY_STORAGE_DEPOSIT",
                defaults.storage_deposit,
            )?,
        };
        policy.validate()?;
        tracing::debug!(?policy, "loaded escrow policy from environment");
        Ok(policy)
    }

    /// Parse a YAML policy document. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] for malformed documents and
    /// [`ConfigError::Inconsistent`] if the result fails [`validate`](Self::validate).
    pub fn from_yaml_str(doc: &str) -> Result<Self, ConfigError> {
        let policy: Self = serde_yaml::from_str(doc)?;
        policy.validate()?;
        tracing::debug!(?policy, "loaded escrow policy from yaml");
        Ok(policy)
    }

    /// Check that the values are mutually consistent.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Inconsistent`] describing the first violated rule.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_deposit == 0 {
            return Err(ConfigError::Inconsistent(
                "min_deposit must be positive".to_string(),
            ));
        }
        if self.min_deposit < self.storage_deposit {
            return Err(ConfigError::Inconsistent(format!(
                "min_deposit {} is below the storage deposit {}",
                self.min_deposit, self.storage_deposit
            )));
        }
        if self.min_lock_secs <= 0 {
            return Err(ConfigError::Inconsistent(format!(
                "min_lock_secs must be positive, got {}",
                self.min_lock_secs
            )));
        }
        if self.max_lock_secs < self.min_lock_secs {
            return Err(ConfigError::Inconsistent(format!(
                "max_lock_secs {} is below min_lock_secs {}",
                self.max_lock_secs, self.min_lock_secs
            )));
        }
        if self.close_grace_secs < 0 {
            return Err(ConfigError::Inconsistent(format!(
                "close_grace_secs must not be negative, got {}",
                self.close_grace_secs
            )));
        }
        Ok(())
    }

    /// The smallest amount a deposit may lock: the larger of
    /// `min_deposit` and the storage deposit.
    pub fn effective_min_deposit(&self) -> u64 {
        self.min_deposit.max(self.storage_deposit)
    }
}

fn env_value<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(var) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidEnv {
            var: var.to_string(),
            value: raw,
        }),
    }
}
