//! # Addresses
//!
//! A 32-byte address naming either an identity (sender, recipient, closer,
//! rent receiver) or a deposit record. The host ledger uses a single
//! address space for both, so this crate does too.
//!
//! Addresses render as 64 lowercase hex characters and serialize as that
//! string.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::digest::sha256_raw;
use crate::error::ValidationError;

/// A 32-byte ledger address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address([u8; 32]);

impl Address {
    /// Create an address from raw bytes.
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Deterministic address for a human-readable label.
    ///
    /// Hashes the label with SHA-256. Used for fixtures and local tooling
    /// where a stable, named identity is more useful than random bytes.
    pub fn from_seed(label: &str) -> Self {
        Self(sha256_raw(label.as_bytes()))
    }

    /// Return the raw 32 bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Render the address as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Parse an address from a 64-character hex string.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidAddress`] if the input is not
    /// exactly 64 hex characters.
    pub fn from_hex(hex: &str) -> Result<Self, ValidationError> {
        let trimmed = hex.trim();
        if trimmed.len() != 64 {
            return Err(ValidationError::InvalidAddress {
                value: hex.to_string(),
                reason: format!("expected 64 hex characters, got {}", trimmed.len()),
            });
        }
        if !trimmed.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ValidationError::InvalidAddress {
                value: hex.to_string(),
                reason: "non-hex character".to_string(),
            });
        }
        let mut bytes = [0u8; 32];
        for (i, byte) in bytes.iter_mut().enumerate() {
            let pair = &trimmed[i * 2..i * 2 + 2];
            *byte = u8::from_str_radix(pair, 16).map_err(|e| ValidationError::InvalidAddress {
                value: hex.to_string(),
                reason: format!("invalid hex at position {}: {e}", i * 2),
            })?;
        }
        Ok(Self(bytes))
    }

    /// First eight hex characters, for compact log output.
    pub fn short(&self) -> String {
        self.to_hex()[..8].to_string()
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for Address {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl std::str::FromStr for Address {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl std::fmt::Debug for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Address({}...)", self.short())
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Self::from_hex(&hex).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_roundtrip() {
        let addr = Address::from_seed("alice");
        let parsed: Address = addr.to_hex().parse().unwrap();
        assert_eq!(parsed, addr);
    }

    #[test]
    fn from_seed_is_deterministic_and_distinct() {
        assert_eq!(Address::from_seed("alice"), Address::from_seed("alice"));
        assert_ne!(Address::from_seed("alice"), Address::from_seed("bob"));
    }

    #[test]
    fn from_hex_accepts_uppercase() {
        let addr = Address::new([0xab; 32]);
        let upper = addr.to_hex().to_uppercase();
        assert_eq!(Address::from_hex(&upper).unwrap(), addr);
    }

    #[test]
    fn from_hex_rejects_wrong_length() {
        assert!(Address::from_hex("").is_err());
        assert!(Address::from_hex("abcd").is_err());
        assert!(Address::from_hex(&"a".repeat(66)).is_err());
    }

    #[test]
    fn from_hex_rejects_non_hex() {
        let bad = format!("{}zz", "0".repeat(62));
        let err = Address::from_hex(&bad).unwrap_err();
        assert!(format!("{err}").contains("non-hex"));
    }

    #[test]
    fn from_hex_rejects_multibyte_input_without_panicking() {
        let bad = format!("{}é", "0".repeat(62));
        assert!(Address::from_hex(&bad).is_err());
    }

    #[test]
    fn serde_uses_hex_string() {
        let addr = Address::new([1u8; 32]);
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"{}\"", "01".repeat(32)));
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }

    #[test]
    fn debug_is_abbreviated() {
        let addr = Address::new([0xff; 32]);
        assert_eq!(format!("{addr:?}"), "Address(ffffffff...)");
    }
}
