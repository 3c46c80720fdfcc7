//! Events emitted by the exchange.
//!
//! Events are appended to the exchange log as part of the enclosing
//! transaction and disappear with it when the transaction is rolled back.

use alloy::primitives::{Address, B256, U256};

/// A protocol event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A limit order was (partially) filled
    OrderFilled {
        /// Order maker
        maker: Address,
        /// Order hash
        order_hash: B256,
        /// Maker units left after this fill
        remaining: U256,
    },

    /// A limit order was cancelled by its maker
    OrderCanceled {
        /// Order maker
        maker: Address,
        /// Order hash
        order_hash: B256,
        /// Raw sentinel before cancellation (0 = never filled, n + 1 = n left)
        remaining_raw: U256,
    },

    /// An RFQ order was filled
    OrderFilledRFQ {
        /// Order hash
        order_hash: B256,
        /// Maker units transferred
        making_amount: U256,
    },

    /// A maker bumped their nonce
    NonceIncreased {
        /// Maker
        maker: Address,
        /// Nonce after the bump
        new_nonce: U256,
    },
}

impl Event {
    /// Order hash carried by the event, if any
    pub fn order_hash(&self) -> Option<B256> {
        match self {
            Event::OrderFilled { order_hash, .. }
            | Event::OrderCanceled { order_hash, .. }
            | Event::OrderFilledRFQ { order_hash, .. } => Some(*order_hash),
            Event::NonceIncreased { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_hash_accessor() {
        let hash = B256::repeat_byte(7);
        let filled = Event::OrderFilled {
            maker: Address::ZERO,
            order_hash: hash,
            remaining: U256::ZERO,
        };
        assert_eq!(filled.order_hash(), Some(hash));

        let nonce = Event::NonceIncreased {
            maker: Address::ZERO,
            new_nonce: U256::from(1u64),
        };
        assert_eq!(nonce.order_hash(), None);
    }
}
