//! Math-layer error taxonomy.

use thiserror::Error;

/// Failures of the pure math operations.
///
/// All variants are pre-commit: callers see them before any state they own
/// has been touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MathError {
    /// A required amount argument was zero.
    #[error("insufficient amount: value must be greater than zero")]
    InsufficientAmount,

    /// A swap input amount was zero.
    #[error("insufficient input amount: swap input must be greater than zero")]
    InsufficientInputAmount,

    /// The referenced pool has a zero reserve on the relevant side.
    #[error("insufficient liquidity: a pool reserve is zero")]
    InsufficientLiquidity,

    /// Price query against an empty pool.
    #[error("no reserves: cannot price an empty pool")]
    NoReserves,

    /// A checked multiplication or addition exceeded u128 range.
    #[error("arithmetic overflow")]
    Overflow,
}
