//! # Escrow Events
//!
//! Each successful transition returns a receipt and appends the same
//! value to the engine's journal. Receipts carry the amounts actually
//! moved, which may differ from the recorded amount when the escrow
//! account was short or over-funded.

use futurity_core::{Address, UnixTimestamp};
use serde::{Deserialize, Serialize};

/// A deposit was created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositCreated {
    /// Derived record address.
    pub address: Address,
    /// Depositor.
    pub sender: Address,
    /// Beneficiary.
    pub recipient: Address,
    /// Locked amount.
    pub amount: u64,
    /// Storage deposit charged on top of the amount.
    pub storage_deposit: u64,
    /// Earliest withdrawal time.
    pub unlock_time: UnixTimestamp,
    /// Host time at creation.
    pub created_at: UnixTimestamp,
}

/// A deposit was withdrawn by its recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositWithdrawn {
    /// Record address.
    pub address: Address,
    /// The recipient.
    pub recipient: Address,
    /// Amount paid out.
    pub amount: u64,
    /// Host time of the withdrawal.
    pub withdrawn_at: UnixTimestamp,
}

/// A deposit record was closed and its account emptied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositClosed {
    /// Record address.
    pub address: Address,
    /// Whoever invoked the close.
    pub closer: Address,
    /// Receiver of the storage rebate.
    pub rent_receiver: Address,
    /// The original depositor.
    pub sender: Address,
    /// Amount returned to the sender. Zero once withdrawn.
    pub refunded_to_sender: u64,
    /// Amount paid to the rent receiver.
    pub rent_rebate: u64,
    /// Whether the recipient had withdrawn before the close.
    pub was_withdrawn: bool,
    /// Host time of the close.
    pub closed_at: UnixTimestamp,
}

/// Journal entry for any escrow transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EscrowEvent {
    /// See [`DepositCreated`].
    Created(DepositCreated),
    /// See [`DepositWithdrawn`].
    Withdrawn(DepositWithdrawn),
    /// See [`DepositClosed`].
    Closed(DepositClosed),
}

impl EscrowEvent {
    /// Address of the record the event concerns.
    pub fn address(&self) -> Address {
        match self {
            Self::Created(e) => e.address,
            Self::Withdrawn(e) => e.address,
            Self::Closed(e) => e.address,
        }
    }

    /// Short event name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Created(_) => "created",
            Self::Withdrawn(_) => "withdrawn",
            Self::Closed(_) => "closed",
        }
    }
}

impl From<DepositCreated> for EscrowEvent {
    fn from(e: DepositCreated) -> Self {
        Self::Created(e)
    }
}

impl From<DepositWithdrawn> for EscrowEvent {
    fn from(e: DepositWithdrawn) -> Self {
        Self::Withdrawn(e)
    }
}

impl From<DepositClosed> for EscrowEvent {
    fn from(e: DepositClosed) -> Self {
        Self::Closed(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tagged_serialization() {
        let event = EscrowEvent::from(DepositWithdrawn {
            address: Address::from_seed("deposit"),
            recipient: Address::from_seed("bob"),
            amount: 1_010_000,
            withdrawn_at: UnixTimestamp::from_secs(66),
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "withdrawn");
        assert_eq!(json["amount"], 1_010_000);
        assert_eq!(json["withdrawn_at"], 66);
        let back: EscrowEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn address_and_name() {
        let event = EscrowEvent::from(DepositClosed {
            address: Address::from_seed("deposit"),
            closer: Address::from_seed("carol"),
            rent_receiver: Address::from_seed("carol"),
            sender: Address::from_seed("alice"),
            refunded_to_sender: 0,
            rent_rebate: 890_880,
            was_withdrawn: true,
            closed_at: UnixTimestamp::from_secs(1),
        });
        assert_eq!(event.address(), Address::from_seed("deposit"));
        assert_eq!(event.name(), "closed");
    }
}
