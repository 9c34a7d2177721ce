//! Per-pair pool records.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::address::Address;

/// State owned per pair key: reserves in canonical order, total issued
/// liquidity shares, and per-provider share balances.
///
/// Invariants maintained by the ledger's transitions:
/// - the reserve product never decreases across a fee-bearing swap;
/// - adds and removes on a non-empty pool preserve the reserve ratio within
///   integer flooring;
/// - `total_shares == 0` exactly when both reserves are zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Pool {
    pub(crate) reserve0: u128,
    pub(crate) reserve1: u128,
    pub(crate) total_shares: u128,
    pub(crate) shares: HashMap<Address, u128>,
}

impl Pool {
    /// Reserves in canonical `(token0, token1)` order.
    pub fn reserves(&self) -> (u128, u128) {
        (self.reserve0, self.reserve1)
    }

    /// Total liquidity shares issued for this pool.
    pub fn total_shares(&self) -> u128 {
        self.total_shares
    }

    /// Liquidity shares held by `owner`.
    pub fn shares_of(&self, owner: Address) -> u128 {
        self.shares.get(&owner).copied().unwrap_or(0)
    }

    /// True if the pool holds no reserves (never seeded, or fully drained).
    pub fn is_empty(&self) -> bool {
        self.reserve0 == 0 && self.reserve1 == 0
    }

    /// Reserves viewed from the caller's orientation: `(reserve_a, reserve_b)`
    /// where the A side is canonical token0 iff `a_is_token0`.
    pub(crate) fn oriented(&self, a_is_token0: bool) -> (u128, u128) {
        if a_is_token0 {
            (self.reserve0, self.reserve1)
        } else {
            (self.reserve1, self.reserve0)
        }
    }
}
