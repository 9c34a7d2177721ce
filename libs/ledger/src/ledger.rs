//! The pool ledger: all pair state and the transitions that preserve the
//! constant-product invariant.
//!
//! One `PoolLedger` value owns every pool record; nothing else mutates
//! reserves or share balances. Operations take `&mut self`, so a single
//! ledger is serialized by construction; wrap it in [`crate::SharedLedger`]
//! to keep that guarantee across threads.
//!
//! Ordering discipline (checks-effects-interactions): every precondition
//! check and amount computation completes before the first custody call, and
//! ledger state is written before the outbound pay-out call. The only custody
//! interaction ahead of a ledger write is the inbound debit; in
//! `add_liquidity` the reserve reconciliation reads custody balances directly
//! after that debit, with no other call interleaved.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use reservoir_amm::{CpmmMath, MathError, BOOTSTRAP_SHARES};

use crate::address::Address;
use crate::custody::{Custody, CustodyError};
use crate::pair::{canonical_order, PairKey};
use crate::pool::Pool;

/// Ledger-level error taxonomy. All variants are pre-commit: a failed
/// operation leaves ledger state exactly as it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Math(#[from] MathError),

    /// Computed A-side amount fell below the caller's minimum.
    #[error("insufficient A-side amount: computed amount below minimum")]
    InsufficientAAmount,

    /// Computed B-side amount fell below the caller's minimum.
    #[error("insufficient B-side amount: computed amount below minimum")]
    InsufficientBAmount,

    /// Swap output fell below the caller's minimum.
    #[error("insufficient output amount: swap output below minimum")]
    InsufficientOutputAmount,

    /// A deposit computed to zero liquidity shares.
    #[error("insufficient liquidity minted: deposit computed to zero shares")]
    InsufficientLiquidityMinted,

    /// A pair requires two distinct assets.
    #[error("identical tokens: a pair requires two distinct assets")]
    IdenticalTokens,

    /// An internal consistency check failed. Surfaced rather than ignored:
    /// swallowing it would hide an invariant violation.
    #[error("ledger invariant violated: {0}")]
    Logic(&'static str),

    #[error("custody: {0}")]
    Custody(#[from] CustodyError),
}

/// First-deposit share policy.
///
/// `FixedBootstrap` mints [`BOOTSTRAP_SHARES`] regardless of the deposited
/// amounts (the reference behavior); `GeometricMean` mints
/// `isqrt(amount_a * amount_b)` (the documented alternative). Neither changes
/// anything after the first deposit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MintPolicy {
    #[default]
    FixedBootstrap,
    GeometricMean,
}

/// Desired and minimum-acceptable deposit amounts, and the share recipient.
#[derive(Debug, Clone, Copy)]
pub struct AddLiquidityParams {
    pub amount_a_desired: u128,
    pub amount_b_desired: u128,
    pub amount_a_min: u128,
    pub amount_b_min: u128,
    pub recipient: Address,
}

/// Realized amounts of a committed deposit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiquidityAdded {
    pub amount_a: u128,
    pub amount_b: u128,
    pub shares: u128,
}

/// Realized amounts of a committed withdrawal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiquidityRemoved {
    pub amount_a: u128,
    pub amount_b: u128,
}

/// Process-wide collection of pools, keyed by pair key.
///
/// Created empty; pools appear lazily on first deposit and are kept once
/// drained. An explicit store rather than ambient module state, so hosts and
/// tests can run any number of independent ledgers.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PoolLedger {
    pools: HashMap<PairKey, Pool>,
    mint_policy: MintPolicy,
}

impl PoolLedger {
    /// Empty ledger with the reference fixed-bootstrap mint policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty ledger with an explicit first-deposit policy.
    pub fn with_mint_policy(mint_policy: MintPolicy) -> Self {
        Self {
            pools: HashMap::new(),
            mint_policy,
        }
    }

    pub fn mint_policy(&self) -> MintPolicy {
        self.mint_policy
    }

    /// Key and orientation for a caller-ordered pair. `a_is_token0` records
    /// whether the caller's A side is canonical token0.
    fn pair(token_a: Address, token_b: Address) -> Result<(PairKey, bool), LedgerError> {
        if token_a == token_b {
            return Err(LedgerError::IdenticalTokens);
        }
        let (token0, _) = canonical_order(token_a, token_b);
        Ok((PairKey::new(token_a, token_b), token_a == token0))
    }

    /// The custody account that holds the pair's reserves. Providers approve
    /// this account before depositing.
    pub fn vault_account(token_a: Address, token_b: Address) -> Result<Address, LedgerError> {
        let (key, _) = Self::pair(token_a, token_b)?;
        Ok(key.vault_account())
    }

    /// Read-only pool record access for hosts (persistence, dashboards).
    pub fn pool(&self, token_a: Address, token_b: Address) -> Option<&Pool> {
        let key = PairKey::new(token_a, token_b);
        self.pools.get(&key)
    }

    /// Reserves in the caller's requested order; `(0, 0)` for a pair that
    /// was never seeded.
    pub fn get_reserves(
        &self,
        token_a: Address,
        token_b: Address,
    ) -> Result<(u128, u128), LedgerError> {
        let (key, a_first) = Self::pair(token_a, token_b)?;
        Ok(self
            .pools
            .get(&key)
            .map(|pool| pool.oriented(a_first))
            .unwrap_or((0, 0)))
    }

    /// Proportional B-side amount for an A-side amount at the pair's current
    /// ratio.
    pub fn quote(
        &self,
        token_a: Address,
        amount_a: u128,
        token_b: Address,
    ) -> Result<u128, LedgerError> {
        let (reserve_a, reserve_b) = self.get_reserves(token_a, token_b)?;
        Ok(CpmmMath::quote(amount_a, reserve_a, reserve_b)?)
    }

    /// Swap output for `amount_in` against the pair's current reserves,
    /// without executing.
    pub fn amount_out(
        &self,
        token_in: Address,
        amount_in: u128,
        token_out: Address,
    ) -> Result<u128, LedgerError> {
        let (reserve_in, reserve_out) = self.get_reserves(token_in, token_out)?;
        Ok(CpmmMath::amount_out(amount_in, reserve_in, reserve_out)?)
    }

    /// Spot price of `token_a` in units of `token_b`, scaled by
    /// [`crate::PRICE_SCALE`].
    pub fn price(&self, token_a: Address, token_b: Address) -> Result<u128, LedgerError> {
        let (reserve_a, reserve_b) = self.get_reserves(token_a, token_b)?;
        Ok(CpmmMath::spot_price(reserve_a, reserve_b)?)
    }

    /// Liquidity shares `owner` holds in the pair's pool.
    pub fn share_balance(
        &self,
        token_a: Address,
        token_b: Address,
        owner: Address,
    ) -> Result<u128, LedgerError> {
        let (key, _) = Self::pair(token_a, token_b)?;
        Ok(self
            .pools
            .get(&key)
            .map(|pool| pool.shares_of(owner))
            .unwrap_or(0))
    }

    /// Total liquidity shares issued for the pair's pool.
    pub fn total_shares(&self, token_a: Address, token_b: Address) -> Result<u128, LedgerError> {
        let (key, _) = Self::pair(token_a, token_b)?;
        Ok(self
            .pools
            .get(&key)
            .map(|pool| pool.total_shares())
            .unwrap_or(0))
    }

    /// Deposit liquidity at the pool's current price ratio.
    ///
    /// The first deposit seeds the pool at the caller's chosen ratio and
    /// mints per the ledger's [`MintPolicy`]; later deposits settle on the
    /// two-branch optimal-amount selection, so the provider never deposits
    /// more than desired on either side. Debits `provider` via custody and
    /// credits shares to `params.recipient`.
    pub fn add_liquidity(
        &mut self,
        custody: &mut dyn Custody,
        token_a: Address,
        token_b: Address,
        provider: Address,
        params: AddLiquidityParams,
    ) -> Result<LiquidityAdded, LedgerError> {
        let (key, a_first) = Self::pair(token_a, token_b)?;
        if params.amount_a_desired == 0 || params.amount_b_desired == 0 {
            return Err(MathError::InsufficientAmount.into());
        }

        let (reserve_a, reserve_b) = self
            .pools
            .get(&key)
            .map(|pool| pool.oriented(a_first))
            .unwrap_or((0, 0));

        // Amount selection at the current ratio (first deposit sets the ratio).
        let (amount_a, amount_b) = if reserve_a == 0 && reserve_b == 0 {
            (params.amount_a_desired, params.amount_b_desired)
        } else {
            let b_optimal = CpmmMath::quote(params.amount_a_desired, reserve_a, reserve_b)?;
            if b_optimal <= params.amount_b_desired {
                if b_optimal < params.amount_b_min {
                    return Err(LedgerError::InsufficientBAmount);
                }
                (params.amount_a_desired, b_optimal)
            } else {
                let a_optimal = CpmmMath::quote(params.amount_b_desired, reserve_b, reserve_a)?;
                // Unreachable given the branch condition; surfaced, not dropped.
                if a_optimal > params.amount_a_desired {
                    return Err(LedgerError::Logic("optimal A amount exceeds desired A"));
                }
                if a_optimal < params.amount_a_min {
                    return Err(LedgerError::InsufficientAAmount);
                }
                (a_optimal, params.amount_b_desired)
            }
        };

        // Shares are computed against pre-transfer reserves, and every
        // failure precedes the custody debits.
        let total_shares = self
            .pools
            .get(&key)
            .map(|pool| pool.total_shares())
            .unwrap_or(0);
        let minted = if total_shares == 0 {
            match self.mint_policy {
                MintPolicy::FixedBootstrap => BOOTSTRAP_SHARES,
                MintPolicy::GeometricMean => CpmmMath::geometric_shares(amount_a, amount_b)?,
            }
        } else {
            CpmmMath::shares_for_deposit(amount_a, amount_b, reserve_a, reserve_b, total_shares)?
        };
        if minted == 0 {
            return Err(LedgerError::InsufficientLiquidityMinted);
        }
        let recipient_shares = self
            .pools
            .get(&key)
            .map(|pool| pool.shares_of(params.recipient))
            .unwrap_or(0)
            .checked_add(minted)
            .ok_or(LedgerError::Logic("share balance overflow"))?;
        let new_total_shares = total_shares
            .checked_add(minted)
            .ok_or(LedgerError::Logic("total share overflow"))?;

        let vault = key.vault_account();
        custody.transfer_from(token_a, provider, vault, amount_a)?;
        custody.transfer_from(token_b, provider, vault, amount_b)?;

        // Reserves reconcile from the vault's post-transfer balances, never
        // from naive addition of the requested amounts.
        let balance_a = custody.balance_of(token_a, vault);
        let balance_b = custody.balance_of(token_b, vault);

        let pool = self.pools.entry(key).or_default();
        let (reserve0, reserve1) = if a_first {
            (balance_a, balance_b)
        } else {
            (balance_b, balance_a)
        };
        pool.reserve0 = reserve0;
        pool.reserve1 = reserve1;
        pool.shares.insert(params.recipient, recipient_shares);
        pool.total_shares = new_total_shares;

        info!(
            "liquidity added to pair {}: amount_a={} amount_b={} shares={} recipient={}",
            key, amount_a, amount_b, minted, params.recipient
        );
        Ok(LiquidityAdded {
            amount_a,
            amount_b,
            shares: minted,
        })
    }

    /// Burn `shares` of the owner's pool stake for a proportional payout.
    ///
    /// Exact inverse of the proportional mint: the price ratio is unchanged
    /// within integer flooring. Pays `recipient` via custody after the burn
    /// is recorded.
    #[allow(clippy::too_many_arguments)]
    pub fn remove_liquidity(
        &mut self,
        custody: &mut dyn Custody,
        token_a: Address,
        token_b: Address,
        owner: Address,
        shares: u128,
        amount_a_min: u128,
        amount_b_min: u128,
        recipient: Address,
    ) -> Result<LiquidityRemoved, LedgerError> {
        let (key, a_first) = Self::pair(token_a, token_b)?;
        if shares == 0 {
            return Err(MathError::InsufficientAmount.into());
        }
        let Some(pool) = self.pools.get_mut(&key) else {
            return Err(MathError::InsufficientLiquidity.into());
        };
        let owner_shares = pool.shares_of(owner);
        if owner_shares < shares {
            return Err(MathError::InsufficientLiquidity.into());
        }

        let (reserve_a, reserve_b) = pool.oriented(a_first);
        let (amount_a, amount_b) =
            CpmmMath::amounts_for_shares(shares, reserve_a, reserve_b, pool.total_shares())?;
        if amount_a < amount_a_min {
            return Err(LedgerError::InsufficientAAmount);
        }
        if amount_b < amount_b_min {
            return Err(LedgerError::InsufficientBAmount);
        }
        let (out0, out1) = if a_first {
            (amount_a, amount_b)
        } else {
            (amount_b, amount_a)
        };
        let new_reserve0 = pool
            .reserve0
            .checked_sub(out0)
            .ok_or(LedgerError::Logic("withdrawal exceeds reserve0"))?;
        let new_reserve1 = pool
            .reserve1
            .checked_sub(out1)
            .ok_or(LedgerError::Logic("withdrawal exceeds reserve1"))?;
        let new_total_shares = pool
            .total_shares
            .checked_sub(shares)
            .ok_or(LedgerError::Logic("burn exceeds total shares"))?;

        // Effects before interactions: record the burn, then pay out.
        pool.reserve0 = new_reserve0;
        pool.reserve1 = new_reserve1;
        pool.total_shares = new_total_shares;
        let remaining = owner_shares - shares;
        if remaining == 0 {
            pool.shares.remove(&owner);
        } else {
            pool.shares.insert(owner, remaining);
        }

        let vault = key.vault_account();
        custody.transfer(token_a, vault, recipient, amount_a)?;
        custody.transfer(token_b, vault, recipient, amount_b)?;

        info!(
            "liquidity removed from pair {}: shares={} amount_a={} amount_b={} recipient={}",
            key, shares, amount_a, amount_b, recipient
        );
        Ok(LiquidityRemoved { amount_a, amount_b })
    }

    /// Execute a fee-bearing swap of `amount_in` `token_in` for `token_out`.
    ///
    /// Debits `caller` via custody, pays `recipient`, and grows the in-side
    /// reserve by the full fee-inclusive input, so the reserve product
    /// strictly increases on every successful swap.
    #[allow(clippy::too_many_arguments)]
    pub fn swap(
        &mut self,
        custody: &mut dyn Custody,
        token_in: Address,
        amount_in: u128,
        token_out: Address,
        amount_out_min: u128,
        caller: Address,
        recipient: Address,
    ) -> Result<u128, LedgerError> {
        let (key, in_first) = Self::pair(token_in, token_out)?;
        if amount_in == 0 {
            return Err(MathError::InsufficientInputAmount.into());
        }
        let Some(pool) = self.pools.get_mut(&key) else {
            return Err(MathError::InsufficientLiquidity.into());
        };
        let (reserve_in, reserve_out) = pool.oriented(in_first);

        // amount_out rejects empty reserves before computing.
        let amount_out = CpmmMath::amount_out(amount_in, reserve_in, reserve_out)?;
        if amount_out < amount_out_min {
            return Err(LedgerError::InsufficientOutputAmount);
        }
        let new_reserve_in = reserve_in
            .checked_add(amount_in)
            .ok_or(MathError::Overflow)?;
        let new_reserve_out = reserve_out
            .checked_sub(amount_out)
            .ok_or(LedgerError::Logic("swap output exceeds reserve"))?;

        let vault = key.vault_account();
        custody.transfer_from(token_in, caller, vault, amount_in)?;

        let (reserve0, reserve1) = if in_first {
            (new_reserve_in, new_reserve_out)
        } else {
            (new_reserve_out, new_reserve_in)
        };
        pool.reserve0 = reserve0;
        pool.reserve1 = reserve1;

        custody.transfer(token_out, vault, recipient, amount_out)?;

        debug!(
            "swap on pair {}: amount_in={} amount_out={} recipient={}",
            key, amount_in, amount_out, recipient
        );
        Ok(amount_out)
    }
}
