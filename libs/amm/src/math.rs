//! Constant-product AMM math with exact integer calculations
//!
//! All quantities are `u128` base units. Every derived amount floor-divides,
//! matching the ledger's accounting rule that rounding losses accrue to the
//! pool, never to the caller.

use crate::error::MathError;

/// Trade fee retained by the pool, as a 997/1000 multiplier (0.3%).
pub const FEE_NUMERATOR: u128 = 997;
pub const FEE_DENOMINATOR: u128 = 1000;

/// Fixed-point unit for spot-price queries (18 decimals).
pub const PRICE_SCALE: u128 = 1_000_000_000_000_000_000;

/// Shares minted for the first deposit into an empty pool under the
/// fixed-bootstrap policy, independent of the deposited amounts.
pub const BOOTSTRAP_SHARES: u128 = 1000 * PRICE_SCALE;

/// Constant-product math functions over pool reserves
pub struct CpmmMath;

impl CpmmMath {
    /// Proportional B-side amount for an A-side amount at the current ratio:
    /// `floor(amount_a * reserve_b / reserve_a)`.
    ///
    /// Only meaningful for an already-seeded pool; preserves the existing
    /// price ratio.
    pub fn quote(amount_a: u128, reserve_a: u128, reserve_b: u128) -> Result<u128, MathError> {
        if amount_a == 0 {
            return Err(MathError::InsufficientAmount);
        }
        if reserve_a == 0 || reserve_b == 0 {
            return Err(MathError::InsufficientLiquidity);
        }
        let numerator = amount_a.checked_mul(reserve_b).ok_or(MathError::Overflow)?;
        Ok(numerator / reserve_a)
    }

    /// Exact swap output under the fee-adjusted constant-product formula:
    ///
    /// ```text
    /// amount_in_with_fee = amount_in * 997
    /// amount_out = amount_in_with_fee * reserve_out
    ///            / (reserve_in * 1000 + amount_in_with_fee)
    /// ```
    pub fn amount_out(
        amount_in: u128,
        reserve_in: u128,
        reserve_out: u128,
    ) -> Result<u128, MathError> {
        if amount_in == 0 {
            return Err(MathError::InsufficientInputAmount);
        }
        if reserve_in == 0 || reserve_out == 0 {
            return Err(MathError::InsufficientLiquidity);
        }
        let amount_in_with_fee = amount_in
            .checked_mul(FEE_NUMERATOR)
            .ok_or(MathError::Overflow)?;
        let numerator = amount_in_with_fee
            .checked_mul(reserve_out)
            .ok_or(MathError::Overflow)?;
        let denominator = reserve_in
            .checked_mul(FEE_DENOMINATOR)
            .and_then(|scaled| scaled.checked_add(amount_in_with_fee))
            .ok_or(MathError::Overflow)?;
        Ok(numerator / denominator)
    }

    /// Smallest input amount whose swap output meets `amount_out` (reverse of
    /// [`CpmmMath::amount_out`]); rounded up so the target is always reached.
    pub fn amount_in(
        amount_out: u128,
        reserve_in: u128,
        reserve_out: u128,
    ) -> Result<u128, MathError> {
        if amount_out == 0 {
            return Err(MathError::InsufficientAmount);
        }
        if reserve_in == 0 || reserve_out == 0 || amount_out >= reserve_out {
            return Err(MathError::InsufficientLiquidity);
        }
        let numerator = reserve_in
            .checked_mul(amount_out)
            .and_then(|v| v.checked_mul(FEE_DENOMINATOR))
            .ok_or(MathError::Overflow)?;
        let denominator = (reserve_out - amount_out)
            .checked_mul(FEE_NUMERATOR)
            .ok_or(MathError::Overflow)?;
        (numerator / denominator)
            .checked_add(1)
            .ok_or(MathError::Overflow)
    }

    /// Shares minted for a deposit into a non-empty pool: the minimum of the
    /// two proportional claims, so a provider never mints more than the
    /// weaker-sided contribution justifies.
    pub fn shares_for_deposit(
        amount_a: u128,
        amount_b: u128,
        reserve_a: u128,
        reserve_b: u128,
        total_shares: u128,
    ) -> Result<u128, MathError> {
        if reserve_a == 0 || reserve_b == 0 || total_shares == 0 {
            return Err(MathError::InsufficientLiquidity);
        }
        let by_a = amount_a
            .checked_mul(total_shares)
            .ok_or(MathError::Overflow)?
            / reserve_a;
        let by_b = amount_b
            .checked_mul(total_shares)
            .ok_or(MathError::Overflow)?
            / reserve_b;
        Ok(by_a.min(by_b))
    }

    /// Proportional reserve payout for burning `shares` of `total_shares`.
    /// Exact inverse of [`CpmmMath::shares_for_deposit`] up to flooring.
    pub fn amounts_for_shares(
        shares: u128,
        reserve_a: u128,
        reserve_b: u128,
        total_shares: u128,
    ) -> Result<(u128, u128), MathError> {
        if total_shares == 0 {
            return Err(MathError::InsufficientLiquidity);
        }
        let amount_a = shares
            .checked_mul(reserve_a)
            .ok_or(MathError::Overflow)?
            / total_shares;
        let amount_b = shares
            .checked_mul(reserve_b)
            .ok_or(MathError::Overflow)?
            / total_shares;
        Ok((amount_a, amount_b))
    }

    /// Geometric-mean bootstrap mint: `isqrt(amount_a * amount_b)`.
    ///
    /// The alternative first-deposit policy; the default fixed-bootstrap
    /// policy uses [`BOOTSTRAP_SHARES`] instead.
    pub fn geometric_shares(amount_a: u128, amount_b: u128) -> Result<u128, MathError> {
        let product = amount_a.checked_mul(amount_b).ok_or(MathError::Overflow)?;
        Ok(Self::integer_sqrt(product))
    }

    /// Spot price of A in units of B, scaled by [`PRICE_SCALE`]:
    /// `reserve_b * PRICE_SCALE / reserve_a`.
    pub fn spot_price(reserve_a: u128, reserve_b: u128) -> Result<u128, MathError> {
        if reserve_a == 0 {
            return Err(MathError::NoReserves);
        }
        let scaled = reserve_b
            .checked_mul(PRICE_SCALE)
            .ok_or(MathError::Overflow)?;
        Ok(scaled / reserve_a)
    }

    /// Integer square root via the Babylonian method.
    fn integer_sqrt(value: u128) -> u128 {
        if value <= 1 {
            return value;
        }
        let mut x0 = value / 2;
        let mut x1 = (x0 + value / x0) / 2;
        while x1 < x0 {
            x0 = x1;
            x1 = (x0 + value / x0) / 2;
        }
        x0
    }
}
