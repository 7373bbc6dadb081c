//! # Deterministic Address Derivation
//!
//! Every deposit record lives at an address derived from the tuple
//! `(sender, recipient, amount, unlock_time)`. Two deposits with the same
//! tuple collide on the same address, so at most one such deposit can be
//! open at a time.
//!
//! ## Derivation
//!
//! ```text
//! SHA-256( "futurity_escrow" || sender[32] || recipient[32]
//!          || amount.to_le_bytes() || unlock_time.to_le_bytes() )
//! ```
//!
//! The seed layout matches the host ledger's program-derived addresses
//! so that clients can compute the key before submitting a deposit.

use sha2::{Digest, Sha256};

use crate::address::Address;
use crate::temporal::UnixTimestamp;

/// Domain separator prepended to every deposit address derivation.
pub const DEPOSIT_SEED_PREFIX: &[u8] = b"futurity_escrow";

/// SHA-256 helper returning raw 32 bytes.
pub fn sha256_raw(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Incremental SHA-256 over a sequence of seed slices.
#[derive(Clone, Default)]
pub struct Sha256Accumulator {
    hasher: Sha256,
}

impl Sha256Accumulator {
    /// Start an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one seed.
    pub fn update(&mut self, data: &[u8]) -> &mut Self {
        self.hasher.update(data);
        self
    }

    /// Consume the accumulator and return the 32-byte digest.
    pub fn finalize(self) -> [u8; 32] {
        self.hasher.finalize().into()
    }
}

/// Derive the record address for a deposit.
pub fn derive_deposit_address(
    sender: &Address,
    recipient: &Address,
    amount: u64,
    unlock_time: UnixTimestamp,
) -> Address {
    let mut acc = Sha256Accumulator::new();
    acc.update(DEPOSIT_SEED_PREFIX)
        .update(sender.as_bytes())
        .update(recipient.as_bytes())
        .update(&amount.to_le_bytes())
        .update(&unlock_time.as_secs().to_le_bytes());
    Address::new(acc.finalize())
}
