//! Remaining-amount book.
//!
//! ## Architecture
//!
//! One record per order hash, stored in an arena:
//!
//! - **Slab**: Pre-allocated record storage, O(1) insert and lookup
//! - **HashMap**: Order hash to slab key mapping
//!
//! Records are never deleted during normal operation. The only removal path
//! is [`RemainingBook::restore`] undoing the creation of a record when the
//! transaction that created it is rolled back.
//!
//! ## Example
//!
//! ```
//! use alloy::primitives::{B256, U256};
//! use limit_order_protocol::storage::RemainingBook;
//!
//! let mut book = RemainingBook::with_capacity(16);
//! let hash = B256::repeat_byte(1);
//!
//! assert_eq!(book.raw(&hash), U256::ZERO);
//! book.set_raw(hash, U256::from(71u64));
//! assert_eq!(book.raw(&hash), U256::from(71u64));
//! ```

use std::collections::HashMap;

use alloy::primitives::{B256, U256};
use slab::Slab;

use crate::types::{RemainingEntry, ORDER_UNSEEN};

/// A single remaining-amount record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemainingRecord {
    /// Order hash the record belongs to
    pub order_hash: B256,
    /// Raw `remaining + 1` sentinel
    pub raw: U256,
}

/// Arena of remaining-amount records keyed by order hash.
#[derive(Debug, Default)]
pub struct RemainingBook {
    /// Record storage
    /// Key: slab index, Value: RemainingRecord
    records: Slab<RemainingRecord>,

    /// Order hash to slab key mapping
    index: HashMap<B256, usize>,
}

impl RemainingBook {
    /// Create an empty book
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a book with pre-allocated capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Slab::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    /// Number of orders ever touched
    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if no order was ever touched
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Raw sentinel for `order_hash` (0 when unseen)
    #[inline]
    pub fn raw(&self, order_hash: &B256) -> U256 {
        self.index
            .get(order_hash)
            .and_then(|&key| self.records.get(key))
            .map_or(ORDER_UNSEEN, |record| record.raw)
    }

    /// Write a raw sentinel, returning the previous record value if any
    pub fn set_raw(&mut self, order_hash: B256, raw: U256) -> Option<U256> {
        match self.index.get(&order_hash) {
            Some(&key) => {
                let record = &mut self.records[key];
                Some(std::mem::replace(&mut record.raw, raw))
            }
            None => {
                let key = self.records.insert(RemainingRecord { order_hash, raw });
                self.index.insert(order_hash, key);
                None
            }
        }
    }

    /// Undo a write: `None` removes the record the write created
    pub fn restore(&mut self, order_hash: B256, previous: Option<U256>) {
        match previous {
            Some(raw) => {
                self.set_raw(order_hash, raw);
            }
            None => {
                if let Some(key) = self.index.remove(&order_hash) {
                    self.records.remove(key);
                }
            }
        }
    }

    /// Iterate over all records
    pub fn iter(&self) -> impl Iterator<Item = &RemainingRecord> {
        self.records.iter().map(|(_, record)| record)
    }

    /// SSZ entries for the audit commitment
    pub fn entries(&self) -> Vec<RemainingEntry> {
        self.iter()
            .map(|record| RemainingEntry::new(record.order_hash, record.raw))
            .collect()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_book_new() {
        let book = RemainingBook::new();
        assert!(book.is_empty());
        assert_eq!(book.raw(&B256::ZERO), U256::ZERO);
    }

    #[test]
    fn test_set_and_overwrite() {
        let mut book = RemainingBook::with_capacity(4);
        let hash = B256::repeat_byte(3);

        assert_eq!(book.set_raw(hash, U256::from(101u64)), None);
        assert_eq!(book.set_raw(hash, U256::from(71u64)), Some(U256::from(101u64)));
        assert_eq!(book.raw(&hash), U256::from(71u64));
        assert_eq!(book.len(), 1);
    }

    #[test]
    fn test_restore_removes_created_record() {
        let mut book = RemainingBook::new();
        let hash = B256::repeat_byte(3);

        let previous = book.set_raw(hash, U256::from(11u64));
        book.restore(hash, previous);

        assert!(book.is_empty());
        assert_eq!(book.raw(&hash), U256::ZERO);
    }

    #[test]
    fn test_restore_previous_value() {
        let mut book = RemainingBook::new();
        let hash = B256::repeat_byte(3);

        book.set_raw(hash, U256::from(11u64));
        let previous = book.set_raw(hash, U256::from(1u64));
        book.restore(hash, previous);

        assert_eq!(book.raw(&hash), U256::from(11u64));
    }

    #[test]
    fn test_entries() {
        let mut book = RemainingBook::new();
        book.set_raw(B256::repeat_byte(1), U256::from(2u64));
        book.set_raw(B256::repeat_byte(2), U256::from(1u64));

        assert_eq!(book.entries().len(), 2);
    }
}
