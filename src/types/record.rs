//! Remaining-amount records and the audit commitment over them.
//!
//! ## Sentinel Encoding
//!
//! Each record stores `remaining + 1`:
//!
//! | Raw value | Meaning |
//! |-----------|---------|
//! | 0 | never seen |
//! | 1 | fully filled or cancelled |
//! | n + 1 | n maker units remain |
//!
//! Records are never deleted, so the full set forms a permanent audit trail.
//! [`state_root`] commits to it with SHA-256 over the SSZ encoding of every
//! record, sorted by order hash.

use alloy::primitives::{B256, U256};
use sha2::{Digest, Sha256};
use ssz_rs::prelude::*;

use crate::error::ProtocolError;

/// Raw sentinel of an order that was never filled
pub const ORDER_UNSEEN: U256 = U256::ZERO;

/// Raw sentinel of an order that is fully filled or cancelled
pub const ORDER_FILLED: U256 = U256::from_limbs([1, 0, 0, 0]);

/// Lifecycle state decoded from a raw sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemainingState {
    /// No fill has happened yet
    Unseen,
    /// `n` maker units remain
    Partial(U256),
    /// Terminal: exhausted or cancelled
    Filled,
}

impl RemainingState {
    /// Decode a raw storage value
    pub fn from_raw(raw: U256) -> Self {
        if raw == ORDER_UNSEEN {
            RemainingState::Unseen
        } else if raw == ORDER_FILLED {
            RemainingState::Filled
        } else {
            RemainingState::Partial(raw - ORDER_FILLED)
        }
    }
}

/// SSZ form of one record: `(order_hash, raw_sentinel)`.
///
/// ## SSZ Layout
///
/// Fixed-size container, 64 bytes: hash (32) + big-endian sentinel (32).
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct RemainingEntry {
    /// Order hash
    pub order_hash: [u8; 32],

    /// Raw sentinel, big-endian
    pub sentinel: [u8; 32],
}

impl RemainingEntry {
    /// Build an entry from typed values
    pub fn new(order_hash: B256, sentinel: U256) -> Self {
        Self {
            order_hash: order_hash.0,
            sentinel: sentinel.to_be_bytes::<32>(),
        }
    }
}

/// SHA-256 over the concatenated SSZ encodings of `entries` sorted by hash.
///
/// An empty set commits to `sha256("")`.
pub fn state_root(mut entries: Vec<RemainingEntry>) -> crate::error::Result<[u8; 32]> {
    entries.sort_by(|a, b| a.order_hash.cmp(&b.order_hash));

    let mut hasher = Sha256::new();
    for entry in &entries {
        let bytes =
            ssz_rs::serialize(entry).map_err(|e| ProtocolError::Encoding(format!("{e:?}")))?;
        hasher.update(&bytes);
    }

    let mut root = [0u8; 32];
    root.copy_from_slice(&hasher.finalize());
    Ok(root)
}

// ============================================================================
// Unit Tests
// ============================================================================
