//! Shared ledger handle for concurrent hosts.
//!
//! The accounting model is serialized by construction: each state-changing
//! operation runs to completion before the next begins. `SharedLedger` keeps
//! that guarantee across threads by holding the whole ledger behind a single
//! lock; pairs are few and coupled through shared custody balances, so
//! per-pair locking buys nothing here.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::address::Address;
use crate::custody::Custody;
use crate::ledger::{AddLiquidityParams, LedgerError, LiquidityAdded, LiquidityRemoved, PoolLedger};

/// Cloneable handle to a [`PoolLedger`] behind one lock.
#[derive(Clone, Default)]
pub struct SharedLedger {
    inner: Arc<Mutex<PoolLedger>>,
}

impl SharedLedger {
    pub fn new(ledger: PoolLedger) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ledger)),
        }
    }

    /// Run `f` with exclusive access to the ledger. Escape hatch for hosts
    /// that need multi-call atomicity (e.g. persistence snapshots).
    pub fn with<R>(&self, f: impl FnOnce(&mut PoolLedger) -> R) -> R {
        f(&mut self.inner.lock())
    }

    pub fn add_liquidity(
        &self,
        custody: &mut dyn Custody,
        token_a: Address,
        token_b: Address,
        provider: Address,
        params: AddLiquidityParams,
    ) -> Result<LiquidityAdded, LedgerError> {
        self.inner
            .lock()
            .add_liquidity(custody, token_a, token_b, provider, params)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn remove_liquidity(
        &self,
        custody: &mut dyn Custody,
        token_a: Address,
        token_b: Address,
        owner: Address,
        shares: u128,
        amount_a_min: u128,
        amount_b_min: u128,
        recipient: Address,
    ) -> Result<LiquidityRemoved, LedgerError> {
        self.inner.lock().remove_liquidity(
            custody, token_a, token_b, owner, shares, amount_a_min, amount_b_min, recipient,
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub fn swap(
        &self,
        custody: &mut dyn Custody,
        token_in: Address,
        amount_in: u128,
        token_out: Address,
        amount_out_min: u128,
        caller: Address,
        recipient: Address,
    ) -> Result<u128, LedgerError> {
        self.inner.lock().swap(
            custody,
            token_in,
            amount_in,
            token_out,
            amount_out_min,
            caller,
            recipient,
        )
    }

    pub fn get_reserves(
        &self,
        token_a: Address,
        token_b: Address,
    ) -> Result<(u128, u128), LedgerError> {
        self.inner.lock().get_reserves(token_a, token_b)
    }

    pub fn quote(
        &self,
        token_a: Address,
        amount_a: u128,
        token_b: Address,
    ) -> Result<u128, LedgerError> {
        self.inner.lock().quote(token_a, amount_a, token_b)
    }

    pub fn amount_out(
        &self,
        token_in: Address,
        amount_in: u128,
        token_out: Address,
    ) -> Result<u128, LedgerError> {
        self.inner.lock().amount_out(token_in, amount_in, token_out)
    }

    pub fn price(&self, token_a: Address, token_b: Address) -> Result<u128, LedgerError> {
        self.inner.lock().price(token_a, token_b)
    }

    pub fn share_balance(
        &self,
        token_a: Address,
        token_b: Address,
        owner: Address,
    ) -> Result<u128, LedgerError> {
        self.inner.lock().share_balance(token_a, token_b, owner)
    }

    pub fn total_shares(&self, token_a: Address, token_b: Address) -> Result<u128, LedgerError> {
        self.inner.lock().total_shares(token_a, token_b)
    }
}
