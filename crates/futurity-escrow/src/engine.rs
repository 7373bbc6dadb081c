//! # Escrow Engine
//!
//! [`TimeLockEscrow`] owns the deposit records, the custody ledger and the
//! event journal behind a single `parking_lot::Mutex`. Every operation
//! takes the lock once, runs its checks, and then mutates the record and
//! moves value before releasing it. A rejected operation returns before
//! any mutation, so records and balances are untouched.
//!
//! Callers supply the authenticated caller identity and the current time;
//! the engine trusts both.

use std::collections::HashMap;

use futurity_core::{derive_deposit_address, Address, ConfigError, EscrowPolicy, UnixTimestamp};
use parking_lot::Mutex;

use crate::custody::{Custody, InMemoryCustody, Transfer};
use crate::deposit::DepositRecord;
use crate::error::EscrowError;
use crate::event::{DepositClosed, DepositCreated, DepositWithdrawn, EscrowEvent};
use crate::rules;

#[derive(Debug)]
struct Ledger<C> {
    records: HashMap<Address, DepositRecord>,
    custody: C,
    journal: Vec<EscrowEvent>,
}

/// The time-locked escrow state machine.
///
/// Shareable across threads behind `Arc` when the custody is `Send`.
#[derive(Debug)]
pub struct TimeLockEscrow<C: Custody = InMemoryCustody> {
    policy: EscrowPolicy,
    ledger: Mutex<Ledger<C>>,
}

impl TimeLockEscrow<InMemoryCustody> {
    /// An escrow over an empty in-memory ledger.
    pub fn in_memory(policy: EscrowPolicy) -> Result<Self, ConfigError> {
        Self::new(policy, InMemoryCustody::new())
    }
}

impl<C: Custody> TimeLockEscrow<C> {
    /// Bind a policy and a custody ledger.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Inconsistent`] if the policy fails validation.
    pub fn new(policy: EscrowPolicy, custody: C) -> Result<Self, ConfigError> {
        policy.validate()?;
        tracing::debug!(?policy, "escrow engine constructed");
        Ok(Self {
            policy,
            ledger: Mutex::new(Ledger {
                records: HashMap::new(),
                custody,
                journal: Vec::new(),
            }),
        })
    }

    /// The policy bound at construction.
    pub fn policy(&self) -> &EscrowPolicy {
        &self.policy
    }

    /// The record address for a set of deposit parameters.
    pub fn deposit_address(
        &self,
        sender: &Address,
        recipient: &Address,
        amount: u64,
        unlock_time: UnixTimestamp,
    ) -> Address {
        derive_deposit_address(sender, recipient, amount, unlock_time)
    }

    /// Lock `amount` from `sender` for `recipient` until `unlock_time`.
    ///
    /// Moves `amount` plus the storage deposit from the sender into the
    /// record's own account.
    ///
    /// # Errors
    ///
    /// In order: [`InsufficientAmount`](EscrowError::InsufficientAmount),
    /// [`InvalidUnlockTime`](EscrowError::InvalidUnlockTime),
    /// [`InsufficientLockTime`](EscrowError::InsufficientLockTime),
    /// [`ExcessiveUnlockTime`](EscrowError::ExcessiveUnlockTime),
    /// [`RecordAlreadyExists`](EscrowError::RecordAlreadyExists),
    /// [`InsufficientBalance`](EscrowError::InsufficientBalance).
    pub fn create_deposit(
        &self,
        sender: Address,
        recipient: Address,
        amount: u64,
        unlock_time: UnixTimestamp,
        now: UnixTimestamp,
    ) -> Result<DepositCreated, EscrowError> {
        let mut guard = self.ledger.lock();
        let ledger = &mut *guard;

        let event = self
            .create_in(ledger, sender, recipient, amount, unlock_time, now)
            .map_err(|e| rejected("create", e))?;

        tracing::info!(
            address = %event.address,
            sender = %sender,
            recipient = %recipient,
            amount,
            unlock_time = %unlock_time,
            "deposit created"
        );
        ledger.journal.push(event.clone().into());
        Ok(event)
    }

    fn create_in(
        &self,
        ledger: &mut Ledger<C>,
        sender: Address,
        recipient: Address,
        amount: u64,
        unlock_time: UnixTimestamp,
        now: UnixTimestamp,
    ) -> Result<DepositCreated, EscrowError> {
        rules::check_create(&self.policy, amount, unlock_time, now)?;

        let address = self.deposit_address(&sender, &recipient, amount, unlock_time);
        if ledger.records.contains_key(&address) {
            return Err(EscrowError::RecordAlreadyExists { address });
        }

        let required = rules::required_funding(&self.policy, amount)?;
        let available = ledger.custody.balance(&sender);
        if available < required {
            return Err(EscrowError::InsufficientBalance {
                account: sender,
                available,
                required,
            });
        }
        ledger.custody.transfer(sender, address, required)?;

        let record = DepositRecord::new(address, sender, recipient, amount, unlock_time, now);
        ledger.records.insert(address, record);

        Ok(DepositCreated {
            address,
            sender,
            recipient,
            amount,
            storage_deposit: self.policy.storage_deposit,
            unlock_time,
            created_at: now,
        })
    }

    /// Pay a deposit out to its recipient.
    ///
    /// # Errors
    ///
    /// In order: [`RecordNotFound`](EscrowError::RecordNotFound),
    /// [`AlreadyWithdrawn`](EscrowError::AlreadyWithdrawn),
    /// [`Unauthorized`](EscrowError::Unauthorized),
    /// [`StillLocked`](EscrowError::StillLocked),
    /// [`InsufficientFunds`](EscrowError::InsufficientFunds).
    pub fn withdraw_deposit(
        &self,
        withdrawer: Address,
        address: Address,
        now: UnixTimestamp,
    ) -> Result<DepositWithdrawn, EscrowError> {
        let mut guard = self.ledger.lock();
        let ledger = &mut *guard;

        let event = self
            .withdraw_in(ledger, withdrawer, address, now)
            .map_err(|e| rejected("withdraw", e))?;

        tracing::info!(
            address = %address,
            recipient = %event.recipient,
            amount = event.amount,
            "deposit withdrawn"
        );
        ledger.journal.push(event.clone().into());
        Ok(event)
    }

    fn withdraw_in(
        &self,
        ledger: &mut Ledger<C>,
        withdrawer: Address,
        address: Address,
        now: UnixTimestamp,
    ) -> Result<DepositWithdrawn, EscrowError> {
        let record = ledger
            .records
            .get_mut(&address)
            .ok_or(EscrowError::RecordNotFound { address })?;
        rules::check_withdraw(record, &withdrawer, now)?;

        let balance = ledger.custody.balance(&address);
        let payable = rules::withdrawable_amount(&self.policy, record, balance)?;
        ledger
            .custody
            .transfer(address, record.recipient(), payable)?;
        record.mark_withdrawn(withdrawer, now);

        Ok(DepositWithdrawn {
            address,
            recipient: record.recipient(),
            amount: payable,
            withdrawn_at: now,
        })
    }

    /// Delete an expired record, refunding an unclaimed deposit to its
    /// sender and paying the rest of the account to `rent_receiver`.
    ///
    /// Anyone may close a record once the grace period after unlock has
    /// elapsed, whether or not it was withdrawn. The address may then be
    /// reused by a new deposit with the same parameters.
    ///
    /// # Errors
    ///
    /// In order: [`RecordNotFound`](EscrowError::RecordNotFound),
    /// [`NotYetCloseable`](EscrowError::NotYetCloseable),
    /// [`InvalidRentReceiver`](EscrowError::InvalidRentReceiver).
    pub fn close_expired_deposit(
        &self,
        closer: Address,
        address: Address,
        rent_receiver: Address,
        now: UnixTimestamp,
    ) -> Result<DepositClosed, EscrowError> {
        let mut guard = self.ledger.lock();
        let ledger = &mut *guard;

        let event = self
            .close_in(ledger, closer, address, rent_receiver, now)
            .map_err(|e| rejected("close", e))?;

        tracing::info!(
            address = %address,
            closer = %closer,
            rent_receiver = %rent_receiver,
            refunded = event.refunded_to_sender,
            rebate = event.rent_rebate,
            was_withdrawn = event.was_withdrawn,
            "deposit closed"
        );
        ledger.journal.push(event.clone().into());
        Ok(event)
    }

    fn close_in(
        &self,
        ledger: &mut Ledger<C>,
        closer: Address,
        address: Address,
        rent_receiver: Address,
        now: UnixTimestamp,
    ) -> Result<DepositClosed, EscrowError> {
        let record = ledger
            .records
            .get(&address)
            .ok_or(EscrowError::RecordNotFound { address })?;
        rules::check_close(&self.policy, record, &rent_receiver, now)?;

        let balance = ledger.custody.balance(&address);
        let payout = rules::close_payout(&self.policy, record, balance);
        ledger.custody.apply(&[
            Transfer::new(address, record.sender(), payout.refund),
            Transfer::new(address, rent_receiver, payout.rebate),
        ])?;

        let event = DepositClosed {
            address,
            closer,
            rent_receiver,
            sender: record.sender(),
            refunded_to_sender: payout.refund,
            rent_rebate: payout.rebate,
            was_withdrawn: record.is_withdrawn(),
            closed_at: now,
        };
        ledger.records.remove(&address);
        Ok(event)
    }

    /// A copy of the record at `address`.
    ///
    /// # Errors
    ///
    /// Returns [`EscrowError::RecordNotFound`] if no record exists.
    pub fn get_deposit(&self, address: &Address) -> Result<DepositRecord, EscrowError> {
        self.ledger
            .lock()
            .records
            .get(address)
            .cloned()
            .ok_or(EscrowError::RecordNotFound { address: *address })
    }

    /// Whether a record exists at `address`.
    pub fn contains(&self, address: &Address) -> bool {
        self.ledger.lock().records.contains_key(address)
    }

    /// Number of live records.
    pub fn len(&self) -> usize {
        self.ledger.lock().records.len()
    }

    /// Whether no records exist.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Custody balance of `account`.
    pub fn balance(&self, account: &Address) -> u64 {
        self.ledger.lock().custody.balance(account)
    }

    /// Run `f` against the custody ledger under the engine lock.
    pub fn with_custody<R>(&self, f: impl FnOnce(&mut C) -> R) -> R {
        f(&mut self.ledger.lock().custody)
    }

    /// All events emitted so far, oldest first.
    pub fn events(&self) -> Vec<EscrowEvent> {
        self.ledger.lock().journal.clone()
    }
}

fn rejected(operation: &'static str, err: EscrowError) -> EscrowError {
    tracing::warn!(operation, kind = %err.kind(), error = %err, "escrow operation rejected");
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EscrowErrorKind;
    use futurity_core::STORAGE_DEPOSIT;

    const T0: UnixTimestamp = UnixTimestamp::from_secs(1_700_000_000);

    fn alice() -> Address {
        Address::from_seed("alice")
    }

    fn bob() -> Address {
        Address::from_seed("bob")
    }

    fn escrow() -> TimeLockEscrow {
        let custody = InMemoryCustody::new()
            .with_balance(alice(), 10_000_000)
            .unwrap();
        TimeLockEscrow::new(EscrowPolicy::default(), custody).unwrap()
    }

    fn at(secs: i64) -> UnixTimestamp {
        T0.saturating_add_secs(secs)
    }

    #[test]
    fn rejects_invalid_policy() {
        let policy = EscrowPolicy {
            min_lock_secs: 0,
            ..EscrowPolicy::default()
        };
        assert!(TimeLockEscrow::in_memory(policy).is_err());
    }

    #[test]
    fn create_moves_amount_and_storage() {
        let escrow = escrow();
        let created = escrow
            .create_deposit(alice(), bob(), 1_010_000, at(65), T0)
            .unwrap();
        assert_eq!(
            created.address,
            escrow.deposit_address(&alice(), &bob(), 1_010_000, at(65))
        );
        assert_eq!(escrow.balance(&created.address), 1_010_000 + STORAGE_DEPOSIT);
        assert_eq!(
            escrow.balance(&alice()),
            10_000_000 - 1_010_000 - STORAGE_DEPOSIT
        );

        let record = escrow.get_deposit(&created.address).unwrap();
        assert_eq!(record.sender(), alice());
        assert_eq!(record.recipient(), bob());
        assert_eq!(record.unlock_time(), at(65));
        assert_eq!(record.created_at(), T0);
        assert!(!record.is_withdrawn());
    }

    #[test]
    fn duplicate_create_is_rejected() {
        let escrow = escrow();
        escrow
            .create_deposit(alice(), bob(), 1_010_000, at(65), T0)
            .unwrap();
        let err = escrow
            .create_deposit(alice(), bob(), 1_010_000, at(65), T0)
            .unwrap_err();
        assert_eq!(err.kind(), EscrowErrorKind::RecordAlreadyExists);
        assert_eq!(escrow.len(), 1);
    }

    #[test]
    fn create_requires_balance_for_storage_too() {
        let custody = InMemoryCustody::new()
            .with_balance(alice(), 1_000_000)
            .unwrap();
        let escrow = TimeLockEscrow::new(EscrowPolicy::default(), custody).unwrap();
        let err = escrow
            .create_deposit(alice(), bob(), 1_000_000, at(65), T0)
            .unwrap_err();
        assert_eq!(
            err,
            EscrowError::InsufficientBalance {
                account: alice(),
                available: 1_000_000,
                required: 1_000_000 + STORAGE_DEPOSIT,
            }
        );
        assert!(escrow.is_empty());
        assert_eq!(escrow.balance(&alice()), 1_000_000);
    }

    #[test]
    fn self_deposit_is_allowed() {
        let escrow = escrow();
        let created = escrow
            .create_deposit(alice(), alice(), 1_000_000, at(60), T0)
            .unwrap();
        escrow
            .withdraw_deposit(alice(), created.address, at(60))
            .unwrap();
        assert_eq!(escrow.balance(&alice()), 10_000_000 - STORAGE_DEPOSIT);
    }

    #[test]
    fn withdraw_pays_recipient_once() {
        let escrow = escrow();
        let address = escrow
            .create_deposit(alice(), bob(), 1_010_000, at(65), T0)
            .unwrap()
            .address;

        let withdrawn = escrow.withdraw_deposit(bob(), address, at(65)).unwrap();
        assert_eq!(withdrawn.amount, 1_010_000);
        assert_eq!(escrow.balance(&bob()), 1_010_000);
        assert_eq!(escrow.balance(&address), STORAGE_DEPOSIT);

        let record = escrow.get_deposit(&address).unwrap();
        assert_eq!(record.withdrawn_by(), Some(bob()));
        assert_eq!(record.withdrawn_at(), Some(at(65)));

        assert_eq!(
            escrow
                .withdraw_deposit(bob(), address, at(66))
                .unwrap_err()
                .kind(),
            EscrowErrorKind::AlreadyWithdrawn
        );
    }

    #[test]
    fn withdraw_caps_at_recorded_amount() {
        let escrow = escrow();
        let address = escrow
            .create_deposit(alice(), bob(), 1_010_000, at(65), T0)
            .unwrap()
            .address;
        escrow.with_custody(|c| c.credit(address, 777)).unwrap();

        let withdrawn = escrow.withdraw_deposit(bob(), address, at(65)).unwrap();
        assert_eq!(withdrawn.amount, 1_010_000);
        assert_eq!(escrow.balance(&address), STORAGE_DEPOSIT + 777);
    }

    #[test]
    fn missing_record() {
        let escrow = escrow();
        let nowhere = Address::from_seed("nowhere");
        assert_eq!(
            escrow.get_deposit(&nowhere).unwrap_err().kind(),
            EscrowErrorKind::RecordNotFound
        );
        assert_eq!(
            escrow.withdraw_deposit(bob(), nowhere, T0).unwrap_err().kind(),
            EscrowErrorKind::RecordNotFound
        );
        assert_eq!(
            escrow
                .close_expired_deposit(bob(), nowhere, bob(), T0)
                .unwrap_err()
                .kind(),
            EscrowErrorKind::RecordNotFound
        );
    }

    #[test]
    fn close_frees_the_address() {
        let escrow = escrow();
        let grace = escrow.policy().close_grace_secs;
        let address = escrow
            .create_deposit(alice(), bob(), 1_010_000, at(65), T0)
            .unwrap()
            .address;
        escrow
            .close_expired_deposit(bob(), address, bob(), at(65 + grace))
            .unwrap();
        assert!(!escrow.contains(&address));
        assert_eq!(escrow.balance(&address), 0);

        let again = escrow
            .create_deposit(alice(), bob(), 1_010_000, at(65), at(0))
            .unwrap();
        assert_eq!(again.address, address);
    }

    #[test]
    fn journal_records_each_transition() {
        let escrow = escrow();
        let grace = escrow.policy().close_grace_secs;
        let address = escrow
            .create_deposit(alice(), bob(), 1_010_000, at(65), T0)
            .unwrap()
            .address;
        let _ = escrow.withdraw_deposit(bob(), address, T0);
        escrow.withdraw_deposit(bob(), address, at(65)).unwrap();
        escrow
            .close_expired_deposit(alice(), address, alice(), at(65 + grace))
            .unwrap();

        let names: Vec<_> = escrow.events().iter().map(EscrowEvent::name).collect();
        assert_eq!(names, ["created", "withdrawn", "closed"]);
        assert!(escrow.events().iter().all(|e| e.address() == address));
    }
}
