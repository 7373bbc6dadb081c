#![deny(missing_docs)]

//! # futurity-core: Foundational Types for the Futurity Escrow
//!
//! This crate defines the types every other crate in the workspace depends
//! on. It has no internal crate dependencies, only `serde`, `serde_yaml`,
//! `thiserror`, `chrono`, `sha2` and `tracing` from the external ecosystem.
//!
//! ## Design Principles
//!
//! 1. **One address type.** Identities and deposit records share the
//!    32-byte [`Address`] space, exactly as the host ledger does. Record
//!    addresses are never chosen by callers; they are derived with
//!    [`derive_deposit_address`].
//!
//! 2. **Time is an input.** [`UnixTimestamp`] is a plain value. The escrow
//!    never reads the clock on its own; the host passes `now` into every
//!    operation.
//!
//! 3. **Policy is configuration.** `MIN_DEPOSIT`, `MIN_LOCK`, `MAX_LOCK`,
//!    `CLOSE_GRACE` and the storage deposit live in [`EscrowPolicy`], bound
//!    once when the escrow engine is constructed.
//!
//! 4. **[`CoreError`] hierarchy.** Structured errors with `thiserror`. No
//!    `Box<dyn Error>`, no `.unwrap()` outside tests.

pub mod address;
pub mod digest;
pub mod error;
pub mod policy;
pub mod temporal;

// Re-export primary types at crate root for ergonomic imports.
pub use address::Address;
pub use digest::{derive_deposit_address, sha256_raw, Sha256Accumulator, DEPOSIT_SEED_PREFIX};
pub use error::{ConfigError, CoreError, ValidationError};
pub use policy::{
    EscrowPolicy, CLOSE_GRACE_SECS, MAX_LOCK_SECS, MIN_DEPOSIT, MIN_LOCK_SECS, STORAGE_DEPOSIT,
};
pub use temporal::UnixTimestamp;
