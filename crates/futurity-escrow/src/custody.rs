//! # Value Custody
//!
//! The escrow never holds balances itself. It asks a [`Custody`]
//! implementation for balances and hands it batches of [`Transfer`]s,
//! which must commit all together or not at all.
//!
//! [`InMemoryCustody`] is the reference ledger used by tests and by hosts
//! that keep balances in process.

use std::collections::HashMap;

use futurity_core::Address;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by a custody ledger.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CustodyError {
    /// The source account cannot cover the transfer.
    #[error("account {account} holds {available}, cannot debit {requested}")]
    InsufficientBalance {
        /// The debited account.
        account: Address,
        /// Its balance at the point of failure.
        available: u64,
        /// The amount requested.
        requested: u64,
    },

    /// Crediting the account would overflow its balance.
    #[error("balance overflow crediting account {account}")]
    Overflow {
        /// The credited account.
        account: Address,
    },
}

/// One movement of value between two accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    /// Debited account.
    pub from: Address,
    /// Credited account.
    pub to: Address,
    /// Amount moved.
    pub amount: u64,
}

impl Transfer {
    /// Construct a transfer.
    pub fn new(from: Address, to: Address, amount: u64) -> Self {
        Self { from, to, amount }
    }
}

/// Host-side value custody.
pub trait Custody {
    /// Current balance of `account`. Unknown accounts hold zero.
    fn balance(&self, account: &Address) -> u64;

    /// Apply a batch of transfers in order.
    ///
    /// # Errors
    ///
    /// If any transfer fails, none of the batch is applied.
    fn apply(&mut self, transfers: &[Transfer]) -> Result<(), CustodyError>;

    /// Apply a single transfer.
    fn transfer(&mut self, from: Address, to: Address, amount: u64) -> Result<(), CustodyError> {
        self.apply(&[Transfer::new(from, to, amount)])
    }
}

/// In-process balance ledger.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InMemoryCustody {
    balances: HashMap<Address, u64>,
}

impl InMemoryCustody {
    /// An empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint `amount` into `account`.
    pub fn credit(&mut self, account: Address, amount: u64) -> Result<(), CustodyError> {
        if amount == 0 {
            return Ok(());
        }
        let credited = self
            .balance(&account)
            .checked_add(amount)
            .ok_or(CustodyError::Overflow { account })?;
        self.balances.insert(account, credited);
        Ok(())
    }

    /// Builder form of [`credit`](Self::credit) for test fixtures.
    pub fn with_balance(mut self, account: Address, amount: u64) -> Result<Self, CustodyError> {
        self.credit(account, amount)?;
        Ok(self)
    }

    /// Sum of all balances. Every escrow operation leaves this unchanged.
    pub fn total(&self) -> u128 {
        self.balances.values().map(|&b| u128::from(b)).sum()
    }

    /// Number of accounts with a nonzero balance.
    pub fn account_count(&self) -> usize {
        self.balances.len()
    }
}

impl Custody for InMemoryCustody {
    fn balance(&self, account: &Address) -> u64 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    fn apply(&mut self, transfers: &[Transfer]) -> Result<(), CustodyError> {
        // Stage every touched balance, commit only after the whole batch passes.
        let mut staged: HashMap<Address, u64> = HashMap::new();
        for t in transfers {
            if t.amount == 0 || t.from == t.to {
                continue;
            }
            let from_balance = *staged
                .entry(t.from)
                .or_insert_with(|| self.balance(&t.from));
            let debited =
                from_balance
                    .checked_sub(t.amount)
                    .ok_or(CustodyError::InsufficientBalance {
                        account: t.from,
                        available: from_balance,
                        requested: t.amount,
                    })?;
            staged.insert(t.from, debited);

            let to_balance = *staged.entry(t.to).or_insert_with(|| self.balance(&t.to));
            let credited = to_balance
                .checked_add(t.amount)
                .ok_or(CustodyError::Overflow { account: t.to })?;
            staged.insert(t.to, credited);
        }
        for (account, balance) in staged {
            if balance == 0 {
                self.balances.remove(&account);
            } else {
                self.balances.insert(account, balance);
            }
        }
        Ok(())
    }
}
