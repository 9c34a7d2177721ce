//! # Reservoir AMM Library - Constant-Product Mathematics
//!
//! ## Purpose
//!
//! Stateless mathematical core for the constant-product pool ledger: swap
//! output/input amounts under the fee-adjusted x*y=k rule, proportional
//! liquidity-share mint and burn quantities, and fixed-point spot prices.
//! All arithmetic is exact `u128` integer math with floor division, so every
//! derived amount is reproducible to the unit.
//!
//! ## Integration Points
//!
//! - **Input Sources**: reserve pairs and trade parameters from the pool ledger
//! - **Output Destinations**: ledger state transitions, read-only quote APIs
//! - **Precision**: integer base units throughout; no floating point, no
//!   decimal rounding modes
//! - **Validation**: every operation rejects zero amounts and empty reserves
//!   before computing, and overflow is a typed error rather than a panic

pub mod error;
pub mod math;

pub use error::MathError;
pub use math::{CpmmMath, BOOTSTRAP_SHARES, FEE_DENOMINATOR, FEE_NUMERATOR, PRICE_SCALE};
