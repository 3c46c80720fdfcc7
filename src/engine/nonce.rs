//! Per-maker nonces.
//!
//! Orders whose predicate contains `nonceEquals(maker, n)` stop being
//! fillable once the maker moves their nonce past `n`, which lets a maker
//! cancel a whole batch of orders with one call.

use alloy::primitives::{Address, U256};
use tracing::info;

use crate::engine::LimitOrderProtocol;
use crate::error::{ProtocolError, Result};
use crate::types::Event;

impl LimitOrderProtocol {
    /// Bump `caller`'s nonce by one
    pub fn increase_nonce(&mut self, caller: Address) -> Result<U256> {
        self.advance_nonce(caller, 1)
    }

    /// Bump `caller`'s nonce by `amount`
    pub fn advance_nonce(&mut self, caller: Address, amount: u8) -> Result<U256> {
        let new_nonce = self
            .nonce(caller)
            .checked_add(U256::from(amount))
            .ok_or(ProtocolError::ArithmeticOverflow)?;

        let state = self.state_mut();
        state.set_nonce(caller, new_nonce);
        state.emit(Event::NonceIncreased {
            maker: caller,
            new_nonce,
        });
        info!(maker = %caller, %new_nonce, "nonce advanced");
        Ok(new_nonce)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
