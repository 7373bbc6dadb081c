//! # Escrow Error Types
//!
//! Every rejected operation returns one [`EscrowError`] variant carrying
//! the values that caused the rejection. A rejected operation never
//! changes a record or moves value.
//!
//! [`EscrowError::kind`] strips the context down to a fieldless
//! [`EscrowErrorKind`] for callers that only need to branch on the cause.

use futurity_core::{Address, UnixTimestamp};
use thiserror::Error;

use crate::custody::CustodyError;

/// Errors arising from escrow operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EscrowError {
    /// Deposit amount is below the policy minimum.
    #[error("amount {amount} is below the minimum deposit {minimum}")]
    InsufficientAmount {
        /// The requested amount.
        amount: u64,
        /// The effective minimum.
        minimum: u64,
    },

    /// Unlock time is not in the future.
    #[error("unlock time {unlock_time} is not after current time {now}")]
    InvalidUnlockTime {
        /// The requested unlock time.
        unlock_time: UnixTimestamp,
        /// The host time at the call.
        now: UnixTimestamp,
    },

    /// Lock duration is shorter than the policy minimum.
    #[error("lock duration of {lock_secs}s is below the minimum of {minimum_secs}s")]
    InsufficientLockTime {
        /// Requested lock duration.
        lock_secs: i64,
        /// Policy minimum.
        minimum_secs: i64,
    },

    /// Lock duration exceeds the policy maximum.
    #[error("unlock time {unlock_time} exceeds the maximum lock of {maximum_secs}s from {now}")]
    ExcessiveUnlockTime {
        /// The requested unlock time.
        unlock_time: UnixTimestamp,
        /// The host time at the call.
        now: UnixTimestamp,
        /// Policy maximum.
        maximum_secs: i64,
    },

    /// A record already exists at the derived address.
    #[error("deposit {address} already exists")]
    RecordAlreadyExists {
        /// The derived record address.
        address: Address,
    },

    /// No record exists at the address.
    #[error("deposit {address} not found")]
    RecordNotFound {
        /// The requested record address.
        address: Address,
    },

    /// Sender cannot cover the amount plus the storage deposit.
    #[error("account {account} holds {available}, needs {required}")]
    InsufficientBalance {
        /// The sender.
        account: Address,
        /// Current balance.
        available: u64,
        /// Amount plus storage deposit.
        required: u64,
    },

    /// Caller is not permitted to perform the operation.
    #[error("{caller} is not authorized to {operation} deposit {address}")]
    Unauthorized {
        /// The record address.
        address: Address,
        /// The authenticated caller.
        caller: Address,
        /// The attempted operation.
        operation: &'static str,
    },

    /// The record has already been withdrawn.
    #[error("deposit {address} has already been withdrawn")]
    AlreadyWithdrawn {
        /// The record address.
        address: Address,
    },

    /// Withdrawal attempted before the unlock time.
    #[error("deposit {address} is locked until {unlock_time} (now {now})")]
    StillLocked {
        /// The record address.
        address: Address,
        /// When the record unlocks.
        unlock_time: UnixTimestamp,
        /// The host time at the call.
        now: UnixTimestamp,
    },

    /// Escrow account holds nothing above its storage deposit.
    #[error("deposit {address} has no withdrawable funds (balance {available})")]
    InsufficientFunds {
        /// The record address.
        address: Address,
        /// The escrow account balance.
        available: u64,
    },

    /// Close attempted before unlock time plus grace period.
    #[error("deposit {address} cannot be closed before {closeable_at} (now {now})")]
    NotYetCloseable {
        /// The record address.
        address: Address,
        /// Earliest close time.
        closeable_at: UnixTimestamp,
        /// The host time at the call.
        now: UnixTimestamp,
    },

    /// The rent receiver is the record being closed.
    #[error("deposit {address} cannot receive its own storage rebate")]
    InvalidRentReceiver {
        /// The record address.
        address: Address,
    },

    /// A balance computation overflowed.
    #[error("arithmetic overflow computing {context}")]
    ArithmeticOverflow {
        /// What was being computed.
        context: &'static str,
    },

    /// The custody ledger refused a transfer batch.
    #[error("custody error: {0}")]
    Custody(#[from] CustodyError),
}

/// The cause of an [`EscrowError`] without its context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EscrowErrorKind {
    /// See [`EscrowError::InsufficientAmount`].
    InsufficientAmount,
    /// See [`EscrowError::InvalidUnlockTime`].
    InvalidUnlockTime,
    /// See [`EscrowError::InsufficientLockTime`].
    InsufficientLockTime,
    /// See [`EscrowError::ExcessiveUnlockTime`].
    ExcessiveUnlockTime,
    /// See [`EscrowError::RecordAlreadyExists`].
    RecordAlreadyExists,
    /// See [`EscrowError::RecordNotFound`].
    RecordNotFound,
    /// See [`EscrowError::InsufficientBalance`].
    InsufficientBalance,
    /// See [`EscrowError::Unauthorized`].
    Unauthorized,
    /// See [`EscrowError::AlreadyWithdrawn`].
    AlreadyWithdrawn,
    /// See [`EscrowError::StillLocked`].
    StillLocked,
    /// See [`EscrowError::InsufficientFunds`].
    InsufficientFunds,
    /// See [`EscrowError::NotYetCloseable`].
    NotYetCloseable,
    /// See [`EscrowError::InvalidRentReceiver`].
    InvalidRentReceiver,
    /// See [`EscrowError::ArithmeticOverflow`].
    ArithmeticOverflow,
    /// See [`EscrowError::Custody`].
    Custody,
}

impl EscrowErrorKind {
    /// The variant name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InsufficientAmount => "InsufficientAmount",
            Self::InvalidUnlockTime => "InvalidUnlockTime",
            Self::InsufficientLockTime => "InsufficientLockTime",
            Self::ExcessiveUnlockTime => "ExcessiveUnlockTime",
            Self::RecordAlreadyExists => "RecordAlreadyExists",
            Self::RecordNotFound => "RecordNotFound",
            Self::InsufficientBalance => "InsufficientBalance",
            Self::Unauthorized => "Unauthorized",
            Self::AlreadyWithdrawn => "AlreadyWithdrawn",
            Self::StillLocked => "StillLocked",
            Self::InsufficientFunds => "InsufficientFunds",
            Self::NotYetCloseable => "NotYetCloseable",
            Self::InvalidRentReceiver => "InvalidRentReceiver",
            Self::ArithmeticOverflow => "ArithmeticOverflow",
            Self::Custody => "Custody",
        }
    }
}

impl std::fmt::Display for EscrowErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl EscrowError {
    /// The cause of this error.
    pub fn kind(&self) -> EscrowErrorKind {
        match self {
            Self::InsufficientAmount { .. } => EscrowErrorKind::InsufficientAmount,
            Self::InvalidUnlockTime { .. } => EscrowErrorKind::InvalidUnlockTime,
            Self::InsufficientLockTime { .. } => EscrowErrorKind::InsufficientLockTime,
            Self::ExcessiveUnlockTime { .. } => EscrowErrorKind::ExcessiveUnlockTime,
            Self::RecordAlreadyExists { .. } => EscrowErrorKind::RecordAlreadyExists,
            Self::RecordNotFound { .. } => EscrowErrorKind::RecordNotFound,
            Self::InsufficientBalance { .. } => EscrowErrorKind::InsufficientBalance,
            Self::Unauthorized { .. } => EscrowErrorKind::Unauthorized,
            Self::AlreadyWithdrawn { .. } => EscrowErrorKind::AlreadyWithdrawn,
            Self::StillLocked { .. } => EscrowErrorKind::StillLocked,
            Self::InsufficientFunds { .. } => EscrowErrorKind::InsufficientFunds,
            Self::NotYetCloseable { .. } => EscrowErrorKind::NotYetCloseable,
            Self::InvalidRentReceiver { .. } => EscrowErrorKind::InvalidRentReceiver,
            Self::ArithmeticOverflow { .. } => EscrowErrorKind::ArithmeticOverflow,
            Self::Custody(_) => EscrowErrorKind::Custody,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(label: &str) -> Address {
        Address::from_seed(label)
    }

    #[test]
    fn insufficient_amount_display() {
        let err = EscrowError::InsufficientAmount {
            amount: 1,
            minimum: 1_000_000,
        };
        let msg = format!("{err}");
        assert!(msg.contains('1'));
        assert!(msg.contains("1000000"));
        assert_eq!(err.kind(), EscrowErrorKind::InsufficientAmount);
    }

    #[test]
    fn still_locked_display() {
        let err = EscrowError::StillLocked {
            address: addr("deposit"),
            unlock_time: UnixTimestamp::from_secs(165),
            now: UnixTimestamp::from_secs(100),
        };
        let msg = format!("{err}");
        assert!(msg.contains("165"));
        assert!(msg.contains("100"));
        assert!(msg.contains(&addr("deposit").to_hex()));
    }

    #[test]
    fn unauthorized_display() {
        let err = EscrowError::Unauthorized {
            address: addr("deposit"),
            caller: addr("mallory"),
            operation: "withdraw",
        };
        let msg = format!("{err}");
        assert!(msg.contains("withdraw"));
        assert!(msg.contains(&addr("mallory").to_hex()));
        assert_eq!(err.kind(), EscrowErrorKind::Unauthorized);
    }

    #[test]
    fn custody_error_converts() {
        let err: EscrowError = CustodyError::Overflow {
            account: addr("whale"),
        }
        .into();
        assert_eq!(err.kind(), EscrowErrorKind::Custody);
        assert!(format!("{err}").starts_with("custody error"));
    }

    #[test]
    fn kind_names_match_variants() {
        assert_eq!(EscrowErrorKind::AlreadyWithdrawn.as_str(), "AlreadyWithdrawn");
        assert_eq!(format!("{}", EscrowErrorKind::NotYetCloseable), "NotYetCloseable");
        assert_eq!(
            EscrowError::RecordNotFound {
                address: addr("gone")
            }
            .kind()
            .as_str(),
            "RecordNotFound"
        );
    }
}
