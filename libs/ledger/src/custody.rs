//! Custody seam: the external fungible-token ledger.
//!
//! The pool ledger never holds tokens itself; it settles against a custody
//! collaborator behind the [`Custody`] trait. Deposits are pulled in with
//! `transfer_from` (allowance-gated), withdrawals and swap proceeds are paid
//! out with `transfer`, and recorded reserves are reconciled against
//! `balance_of` rather than trusting caller-declared amounts.

use std::collections::HashMap;

use thiserror::Error;

use crate::address::Address;

/// Custody-layer failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CustodyError {
    /// A transfer exceeded the sender's token balance.
    #[error("custody transfer exceeds balance")]
    InsufficientBalance,

    /// A pull exceeded the allowance the owner granted the spender.
    #[error("custody pull exceeds approved allowance")]
    InsufficientAllowance,
}

/// External fungible-token ledger.
///
/// `transfer_from(token, owner, spender, value)` moves `value` from `owner`
/// to `spender`, consuming the allowance `owner` granted `spender`. This is
/// how a pool vault pulls an approved deposit in.
pub trait Custody {
    /// Current balance of `owner` in `token`.
    fn balance_of(&self, token: Address, owner: Address) -> u128;

    /// Move `value` of `token` from `from` to `to`.
    fn transfer(
        &mut self,
        token: Address,
        from: Address,
        to: Address,
        value: u128,
    ) -> Result<(), CustodyError>;

    /// Pull `value` of `token` from `owner` to `spender` against the
    /// allowance `owner` granted `spender`.
    fn transfer_from(
        &mut self,
        token: Address,
        owner: Address,
        spender: Address,
        value: u128,
    ) -> Result<(), CustodyError>;

    /// Let `spender` pull up to `value` of `owner`'s `token`.
    fn approve(&mut self, token: Address, owner: Address, spender: Address, value: u128);
}

/// In-memory custody ledger: balances plus allowances, with a mint faucet.
///
/// Stands in for the mock tokens of a real deployment; the pool ledger's
/// tests and any host without an external token ledger run against it.
#[derive(Debug, Default)]
pub struct MemoryCustody {
    /// (token, owner) -> balance
    balances: HashMap<(Address, Address), u128>,
    /// (token, owner, spender) -> remaining allowance
    allowances: HashMap<(Address, Address, Address), u128>,
}

impl MemoryCustody {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create `value` units of `token` for `owner` out of thin air.
    pub fn mint(&mut self, token: Address, owner: Address, value: u128) {
        let balance = self.balances.entry((token, owner)).or_default();
        *balance = balance.saturating_add(value);
    }

    /// Remaining allowance `owner` has granted `spender` for `token`.
    pub fn allowance(&self, token: Address, owner: Address, spender: Address) -> u128 {
        self.allowances
            .get(&(token, owner, spender))
            .copied()
            .unwrap_or(0)
    }
}

impl Custody for MemoryCustody {
    fn balance_of(&self, token: Address, owner: Address) -> u128 {
        self.balances.get(&(token, owner)).copied().unwrap_or(0)
    }

    fn transfer(
        &mut self,
        token: Address,
        from: Address,
        to: Address,
        value: u128,
    ) -> Result<(), CustodyError> {
        let available = self.balance_of(token, from);
        if available < value {
            return Err(CustodyError::InsufficientBalance);
        }
        self.balances.insert((token, from), available - value);
        let credited = self.balances.entry((token, to)).or_default();
        *credited = credited.saturating_add(value);
        Ok(())
    }

    fn transfer_from(
        &mut self,
        token: Address,
        owner: Address,
        spender: Address,
        value: u128,
    ) -> Result<(), CustodyError> {
        let key = (token, owner, spender);
        let allowed = self.allowances.get(&key).copied().unwrap_or(0);
        if allowed < value {
            return Err(CustodyError::InsufficientAllowance);
        }
        self.transfer(token, owner, spender, value)?;
        self.allowances.insert(key, allowed - value);
        Ok(())
    }

    fn approve(&mut self, token: Address, owner: Address, spender: Address, value: u128) {
        self.allowances.insert((token, owner, spender), value);
    }
}
