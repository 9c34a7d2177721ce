//! # Reservoir Pool Ledger - Constant-Product AMM Accounting
//!
//! ## Purpose
//!
//! Owns all pair state for a constant-product automated market maker and
//! exposes the state transitions that preserve its invariant: proportional
//! liquidity deposits and withdrawals, fee-bearing swaps, and read-only
//! reserve/price queries. Token custody itself is an external collaborator
//! reached through the [`Custody`] trait; the ledger pulls deposits in,
//! pays withdrawals and swap proceeds out, and reconciles its recorded
//! reserves against custody balances rather than trusting caller-declared
//! amounts.
//!
//! ## Integration Points
//!
//! - **Input Sources**: deposit/withdraw/swap requests with slippage bounds
//! - **Output Destinations**: realized amounts to callers, transfers to the
//!   custody collaborator, serde-able pool records for host persistence
//! - **Execution Model**: single-threaded and serialized by construction
//!   (`&mut self` operations); [`SharedLedger`] reproduces the same guarantee
//!   behind one lock for concurrent hosts
//! - **Failure Model**: every error is synchronous and pre-commit - a failed
//!   operation leaves ledger state exactly as it was

pub mod address;
pub mod custody;
pub mod ledger;
pub mod pair;
pub mod pool;
pub mod shared;

pub use address::Address;
pub use custody::{Custody, CustodyError, MemoryCustody};
pub use ledger::{
    AddLiquidityParams, LedgerError, LiquidityAdded, LiquidityRemoved, MintPolicy, PoolLedger,
};
pub use pair::{canonical_order, PairKey};
pub use pool::Pool;
pub use shared::SharedLedger;

// Math re-exports for callers that quote without a ledger instance
pub use reservoir_amm::{CpmmMath, MathError, BOOTSTRAP_SHARES, PRICE_SCALE};
