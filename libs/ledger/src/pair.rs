//! Canonical pair identity.
//!
//! A pair key is the keccak-256 hash of the two token addresses in canonical
//! (sorted) order, so `PairKey::new(a, b) == PairKey::new(b, a)` and a key
//! never encodes the caller's argument order. The key's leading 20 bytes
//! double as the pool's dedicated custody account, giving every pool its own
//! token balances to reconcile reserves against.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha3::{Digest, Keccak256};
use thiserror::Error;

use crate::address::Address;

/// Sort two token addresses into canonical `(token0, token1)` order.
pub fn canonical_order(a: Address, b: Address) -> (Address, Address) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Canonical identifier for an unordered two-asset combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PairKey([u8; 32]);

impl PairKey {
    /// Derive the key for the unordered pair `{a, b}`:
    /// `keccak256(token0 || token1)` over the canonical order.
    pub fn new(a: Address, b: Address) -> Self {
        let (token0, token1) = canonical_order(a, b);
        let mut hasher = Keccak256::new();
        hasher.update(token0.as_bytes());
        hasher.update(token1.as_bytes());
        Self(hasher.finalize().into())
    }

    /// The custody account holding this pool's reserves: the key truncated
    /// to address width.
    pub fn vault_account(&self) -> Address {
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&self.0[..20]);
        Address::new(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// Failure to parse a pair key from its hex form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid pair key {input:?}: {reason}")]
pub struct ParsePairKeyError {
    input: String,
    reason: String,
}

impl FromStr for PairKey {
    type Err = ParsePairKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(raw).map_err(|e| ParsePairKeyError {
            input: s.to_string(),
            reason: e.to_string(),
        })?;
        let bytes: [u8; 32] = bytes.try_into().map_err(|v: Vec<u8>| ParsePairKeyError {
            input: s.to_string(),
            reason: format!("expected 32 bytes, got {}", v.len()),
        })?;
        Ok(Self(bytes))
    }
}

// Hex-string serde so pools can be persisted keyed by pair key.
impl Serialize for PairKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PairKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
