//! Protocol storage with a write journal.
//!
//! ## Components
//!
//! - [`RemainingBook`]: `remaining + 1` sentinels per limit order hash
//! - nonces: per-maker counters read by `nonceEquals` predicates
//! - invalidators: per-maker RFQ bitmaps, 256 orders per slot
//! - events: the exchange log
//!
//! ## Transactions
//!
//! Every write records the value it replaced. [`ProtocolState::checkpoint`]
//! marks a position in the journal; [`ProtocolState::revert_to`] undoes all
//! writes after it. The journal is dropped once the outermost checkpoint
//! commits, so nested (reentrant) calls roll back with their parent.

pub mod remaining;

pub use remaining::{RemainingBook, RemainingRecord};

use std::collections::HashMap;

use alloy::primitives::{Address, B256, U256};

use crate::types::Event;

/// Journal entry: enough to undo one write.
#[derive(Debug, Clone)]
enum JournalEntry {
    Remaining { order_hash: B256, previous: Option<U256> },
    Nonce { maker: Address, previous: U256 },
    Invalidator { key: (Address, u64), previous: U256 },
    Event,
}

/// Position in the journal returned by [`ProtocolState::checkpoint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint(usize);

/// All mutable protocol state.
#[derive(Debug, Default)]
pub struct ProtocolState {
    remaining: RemainingBook,
    nonces: HashMap<Address, U256>,
    invalidators: HashMap<(Address, u64), U256>,
    events: Vec<Event>,
    journal: Vec<JournalEntry>,
    depth: usize,
}

impl ProtocolState {
    /// Create empty state
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Remaining-amount records
    #[inline]
    pub fn remaining(&self) -> &RemainingBook {
        &self.remaining
    }

    /// Raw sentinel for an order hash
    #[inline]
    pub fn remaining_raw(&self, order_hash: &B256) -> U256 {
        self.remaining.raw(order_hash)
    }

    /// Current nonce of `maker`
    #[inline]
    pub fn nonce(&self, maker: &Address) -> U256 {
        self.nonces.get(maker).copied().unwrap_or_default()
    }

    /// RFQ invalidator bitmap of `maker` at `slot`
    #[inline]
    pub fn invalidator(&self, maker: &Address, slot: u64) -> U256 {
        self.invalidators
            .get(&(*maker, slot))
            .copied()
            .unwrap_or_default()
    }

    /// Emitted events, oldest first
    #[inline]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    // ========================================================================
    // Writes
    // ========================================================================

    /// Store a raw sentinel
    pub fn set_remaining_raw(&mut self, order_hash: B256, raw: U256) {
        let previous = self.remaining.set_raw(order_hash, raw);
        self.record(JournalEntry::Remaining {
            order_hash,
            previous,
        });
    }

    /// Store a nonce
    pub fn set_nonce(&mut self, maker: Address, nonce: U256) {
        let previous = self.nonces.insert(maker, nonce).unwrap_or_default();
        self.record(JournalEntry::Nonce { maker, previous });
    }

    /// Store an invalidator bitmap
    pub fn set_invalidator(&mut self, maker: Address, slot: u64, bitmap: U256) {
        let key = (maker, slot);
        let previous = self.invalidators.insert(key, bitmap).unwrap_or_default();
        self.record(JournalEntry::Invalidator { key, previous });
    }

    /// Append an event to the log
    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
        self.record(JournalEntry::Event);
    }

    // ========================================================================
    // Journal
    // ========================================================================

    /// Open a (possibly nested) transaction
    pub fn checkpoint(&mut self) -> Checkpoint {
        self.depth += 1;
        Checkpoint(self.journal.len())
    }

    /// Close a transaction, keeping its writes
    pub fn commit(&mut self, _checkpoint: Checkpoint) {
        self.depth = self.depth.saturating_sub(1);
        if self.depth == 0 {
            self.journal.clear();
        }
    }

    /// Close a transaction, undoing every write made since `checkpoint`
    pub fn revert_to(&mut self, checkpoint: Checkpoint) {
        while self.journal.len() > checkpoint.0 {
            let Some(entry) = self.journal.pop() else { break };
            match entry {
                JournalEntry::Remaining {
                    order_hash,
                    previous,
                } => self.remaining.restore(order_hash, previous),
                JournalEntry::Nonce { maker, previous } => {
                    self.nonces.insert(maker, previous);
                }
                JournalEntry::Invalidator { key, previous } => {
                    self.invalidators.insert(key, previous);
                }
                JournalEntry::Event => {
                    self.events.pop();
                }
            }
        }
        self.depth = self.depth.saturating_sub(1);
        if self.depth == 0 {
            self.journal.clear();
        }
    }

    fn record(&mut self, entry: JournalEntry) {
        if self.depth > 0 {
            self.journal.push(entry);
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
