//! # Transition Rules
//!
//! Pure precondition checks for each escrow transition. Nothing here
//! touches the record store or moves value; the engine calls these under
//! its lock and commits only if they pass.
//!
//! Checks run in a fixed order, so the same inputs always produce the same
//! error:
//!
//! - create: amount, unlock in future, minimum lock, maximum lock
//! - withdraw: already withdrawn, caller, unlock reached
//! - close: grace elapsed, rent receiver
//!
//! Record existence and sender balance depend on engine state and are
//! checked by the engine between these steps.

use futurity_core::{Address, EscrowPolicy, UnixTimestamp};

use crate::deposit::DepositRecord;
use crate::error::EscrowError;

/// Validate the parameters of a new deposit against the policy.
pub fn check_create(
    policy: &EscrowPolicy,
    amount: u64,
    unlock_time: UnixTimestamp,
    now: UnixTimestamp,
) -> Result<(), EscrowError> {
    let minimum = policy.effective_min_deposit();
    if amount < minimum {
        return Err(EscrowError::InsufficientAmount { amount, minimum });
    }
    if unlock_time <= now {
        return Err(EscrowError::InvalidUnlockTime { unlock_time, now });
    }
    let excessive = EscrowError::ExcessiveUnlockTime {
        unlock_time,
        now,
        maximum_secs: policy.max_lock_secs,
    };
    // Overflow here means the gap exceeds i64, which is past any maximum.
    let lock_secs = unlock_time.checked_secs_since(now).ok_or(excessive.clone())?;
    if lock_secs < policy.min_lock_secs {
        return Err(EscrowError::InsufficientLockTime {
            lock_secs,
            minimum_secs: policy.min_lock_secs,
        });
    }
    if lock_secs > policy.max_lock_secs {
        return Err(excessive);
    }
    Ok(())
}

/// Value the sender must hold to create a deposit of `amount`.
pub fn required_funding(policy: &EscrowPolicy, amount: u64) -> Result<u64, EscrowError> {
    amount
        .checked_add(policy.storage_deposit)
        .ok_or(EscrowError::ArithmeticOverflow {
            context: "deposit amount plus storage deposit",
        })
}

/// Check that `withdrawer` may withdraw `record` at `now`.
pub fn check_withdraw(
    record: &DepositRecord,
    withdrawer: &Address,
    now: UnixTimestamp,
) -> Result<(), EscrowError> {
    if record.is_withdrawn() {
        return Err(EscrowError::AlreadyWithdrawn {
            address: record.address(),
        });
    }
    if *withdrawer != record.recipient() {
        return Err(EscrowError::Unauthorized {
            address: record.address(),
            caller: *withdrawer,
            operation: "withdraw",
        });
    }
    if !record.is_unlocked(now) {
        return Err(EscrowError::StillLocked {
            address: record.address(),
            unlock_time: record.unlock_time(),
            now,
        });
    }
    Ok(())
}

/// Amount payable to the recipient given the escrow account's balance.
///
/// Never more than the recorded amount, and never dipping into the
/// storage deposit.
pub fn withdrawable_amount(
    policy: &EscrowPolicy,
    record: &DepositRecord,
    escrow_balance: u64,
) -> Result<u64, EscrowError> {
    let payable = escrow_balance
        .saturating_sub(policy.storage_deposit)
        .min(record.amount());
    if payable == 0 {
        return Err(EscrowError::InsufficientFunds {
            address: record.address(),
            available: escrow_balance,
        });
    }
    Ok(payable)
}

/// Check that `record` may be closed at `now`, paying `rent_receiver`.
pub fn check_close(
    policy: &EscrowPolicy,
    record: &DepositRecord,
    rent_receiver: &Address,
    now: UnixTimestamp,
) -> Result<(), EscrowError> {
    // An unrepresentable deadline is never reached.
    let closeable = record
        .closeable_at(policy)
        .map(|deadline| now >= deadline)
        .unwrap_or(false);
    if !closeable {
        return Err(EscrowError::NotYetCloseable {
            address: record.address(),
            closeable_at: record
                .unlock_time()
                .saturating_add_secs(policy.close_grace_secs),
            now,
        });
    }
    if *rent_receiver == record.address() {
        return Err(EscrowError::InvalidRentReceiver {
            address: record.address(),
        });
    }
    Ok(())
}

/// How a closing escrow account's balance is split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClosePayout {
    /// Returned to the sender of a never-withdrawn deposit.
    pub refund: u64,
    /// Everything else, paid to the rent receiver.
    pub rebate: u64,
}

/// Split the escrow balance on close.
pub fn close_payout(policy: &EscrowPolicy, record: &DepositRecord, escrow_balance: u64) -> ClosePayout {
    let refund = if record.is_withdrawn() {
        0
    } else {
        escrow_balance
            .saturating_sub(policy.storage_deposit)
            .min(record.amount())
    };
    ClosePayout {
        refund,
        rebate: escrow_balance - refund,
    }
}
