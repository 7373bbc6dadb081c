//! # Error Hierarchy
//!
//! Structured error types for the foundational layer, built with `thiserror`.
//! No `Box<dyn Error>`, no `.unwrap()` outside tests.
//!
//! Each variant carries the offending input so that operators can diagnose
//! misconfiguration without guesswork.

use thiserror::Error;

/// Top-level error type for `futurity-core`.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Domain primitive validation failure.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Escrow policy could not be loaded or is inconsistent.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Validation errors for domain primitive newtypes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Address string is not 64 hex characters.
    #[error("invalid address: \"{value}\" ({reason})")]
    InvalidAddress {
        /// The string that failed to parse.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Timestamp is outside the range representable as a calendar date.
    #[error("timestamp {0} is out of range")]
    TimestampOutOfRange(i64),
}

/// Errors loading or validating an [`EscrowPolicy`](crate::EscrowPolicy).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// An environment variable was set but could not be parsed.
    #[error("invalid value for {var}: \"{value}\"")]
    InvalidEnv {
        /// The variable name.
        var: String,
        /// The raw value found in the environment.
        value: String,
    },

    /// A YAML policy document could not be parsed.
    #[error("invalid policy document: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The policy values contradict each other.
    #[error("inconsistent escrow policy: {0}")]
    Inconsistent(String),
}
