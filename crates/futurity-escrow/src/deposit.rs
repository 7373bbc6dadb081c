//! # Deposit Records
//!
//! One [`DepositRecord`] per escrow, keyed by the address derived from its
//! defining parameters. The defining fields are immutable once created;
//! only the withdrawal fields change, and only once.
//!
//! State machine: `Locked → Withdrawn`. Closing deletes the record from
//! either state, so there is no `Closed` variant.

use futurity_core::{Address, EscrowPolicy, UnixTimestamp};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a stored deposit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DepositState {
    /// Funds are held for the recipient.
    Locked,
    /// The recipient has taken the funds. Only closing remains.
    Withdrawn,
}

impl DepositState {
    /// Whether the recipient has already been paid.
    pub fn is_withdrawn(&self) -> bool {
        matches!(self, Self::Withdrawn)
    }

    /// The canonical string name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Locked => "LOCKED",
            Self::Withdrawn => "WITHDRAWN",
        }
    }
}

impl std::fmt::Display for DepositState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A time-locked deposit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositRecord {
    address: Address,
    sender: Address,
    recipient: Address,
    amount: u64,
    unlock_time: UnixTimestamp,
    created_at: UnixTimestamp,
    is_withdrawn: bool,
    withdrawn_by: Option<Address>,
    withdrawn_at: Option<UnixTimestamp>,
}

impl DepositRecord {
    pub(crate) fn new(
        address: Address,
        sender: Address,
        recipient: Address,
        amount: u64,
        unlock_time: UnixTimestamp,
        created_at: UnixTimestamp,
    ) -> Self {
        Self {
            address,
            sender,
            recipient,
            amount,
            unlock_time,
            created_at,
            is_withdrawn: false,
            withdrawn_by: None,
            withdrawn_at: None,
        }
    }

    /// The record's derived address.
    pub fn address(&self) -> Address {
        self.address
    }

    /// The depositor.
    pub fn sender(&self) -> Address {
        self.sender
    }

    /// The only identity allowed to withdraw.
    pub fn recipient(&self) -> Address {
        self.recipient
    }

    /// The locked amount.
    pub fn amount(&self) -> u64 {
        self.amount
    }

    /// Earliest withdrawal time.
    pub fn unlock_time(&self) -> UnixTimestamp {
        self.unlock_time
    }

    /// Host time at creation.
    pub fn created_at(&self) -> UnixTimestamp {
        self.created_at
    }

    /// Whether the withdrawal has happened.
    pub fn is_withdrawn(&self) -> bool {
        self.is_withdrawn
    }

    /// Who withdrew, once withdrawn.
    pub fn withdrawn_by(&self) -> Option<Address> {
        self.withdrawn_by
    }

    /// When the withdrawal happened.
    pub fn withdrawn_at(&self) -> Option<UnixTimestamp> {
        self.withdrawn_at
    }

    /// Current lifecycle state.
    pub fn state(&self) -> DepositState {
        if self.is_withdrawn {
            DepositState::Withdrawn
        } else {
            DepositState::Locked
        }
    }

    /// Whether `now` is at or past the unlock time.
    pub fn is_unlocked(&self, now: UnixTimestamp) -> bool {
        now >= self.unlock_time
    }

    /// Earliest time anyone may close the record, or `None` if the
    /// deadline is not representable.
    pub fn closeable_at(&self, policy: &EscrowPolicy) -> Option<UnixTimestamp> {
        self.unlock_time.checked_add_secs(policy.close_grace_secs)
    }

    pub(crate) fn mark_withdrawn(&mut self, by: Address, at: UnixTimestamp) {
        self.is_withdrawn = true;
        self.withdrawn_by = Some(by);
        self.withdrawn_at = Some(at);
    }
}
