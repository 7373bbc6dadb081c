//! # futurity-escrow: Time-Locked Escrow
//!
//! A sender locks value for a recipient until a future timestamp. The
//! recipient may withdraw exactly once after unlock. Once a long grace
//! period past unlock has elapsed, anyone may close the record and
//! reclaim its storage deposit.
//!
//! - **Deposit** ([`deposit`]): The record and its lifecycle state.
//!
//! - **Rules** ([`rules`]): Pure precondition checks for each transition,
//!   evaluated in a fixed order so callers can assert on the cause.
//!
//! - **Custody** ([`custody`]): The host's value-custody seam and an
//!   in-memory ledger implementing it.
//!
//! - **Engine** ([`engine`]): [`TimeLockEscrow`], which owns the records
//!   and applies each transition and its transfers atomically.
//!
//! - **Events** ([`event`]): Receipts returned by each transition and kept
//!   in the engine's journal.
//!
//! ## Lifecycle
//!
//! ```text
//! Nonexistent ──create──▶ Locked ──withdraw──▶ Withdrawn
//!                            │                     │
//!                            └──────close──────────┴──▶ (record deleted)
//! ```

pub mod custody;
pub mod deposit;
pub mod engine;
pub mod error;
pub mod event;
pub mod rules;

// Re-export primary types.
pub use custody::{Custody, CustodyError, InMemoryCustody, Transfer};
pub use deposit::{DepositRecord, DepositState};
pub use engine::TimeLockEscrow;
pub use error::{EscrowError, EscrowErrorKind};
pub use event::{DepositClosed, DepositCreated, DepositWithdrawn, EscrowEvent};
